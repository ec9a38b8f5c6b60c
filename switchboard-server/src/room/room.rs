use crate::error::{DeliveryError, RoomError};
use crate::room::member_set::{control_frame, Failed, MemberSet};
use crate::room::room_command::{JoinReply, RoomCommand};
use crate::room::stream_fanout::StreamFanout;
use crate::room::RoomSnapshot;
use crate::transport::Outbox;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use switchboard_core::{ConnectionId, ControlEvent, IceServerConfig, Role, RoomId, StreamId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// A room's state, owned by a single task. Handles talk to it only through
/// `RoomCommand`s, so every membership change and every fan-out is applied
/// in one total order.
pub(crate) struct Room {
    room_id: RoomId,
    peers: MemberSet,
    chat: MemberSet,
    stream: StreamFanout,
    retired: Arc<AtomicBool>,
    ice_servers: Vec<IceServerConfig>,
    command_rx: mpsc::Receiver<RoomCommand>,
}

impl Room {
    pub(crate) fn new(
        room_id: RoomId,
        stream_id: StreamId,
        retired: Arc<AtomicBool>,
        ice_servers: Vec<IceServerConfig>,
        command_rx: mpsc::Receiver<RoomCommand>,
    ) -> Self {
        Self {
            room_id,
            peers: MemberSet::default(),
            chat: MemberSet::default(),
            stream: StreamFanout::new(stream_id),
            retired,
            ice_servers,
            command_rx,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Room {} event loop started", self.room_id);

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }

        info!("Room {} event loop finished", self.room_id);
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                connection,
                role,
                outbox,
                reply,
            } => {
                let result = self.join(connection, role, outbox);
                let _ = reply.send(result);
            }

            RoomCommand::Leave { connection, reply } => {
                let left = self.leave(&connection);
                let _ = reply.send(left);
            }

            RoomCommand::Broadcast {
                role,
                frame,
                exclude,
                origin,
            } => {
                if !self.accepts(origin) {
                    return;
                }
                let mut failed = Failed::new();
                self.broadcast(role, &frame, exclude.as_ref(), &mut failed);
                self.evict(failed);
            }

            RoomCommand::Relay {
                target,
                frame,
                origin,
            } => {
                if !self.accepts(origin) {
                    return;
                }
                if let Some(from) = origin {
                    let roles = (self.role_of(&from), self.role_of(&target));
                    if let (Some(sender), Some(receiver)) = roles {
                        if !reaches(sender, receiver) {
                            warn!(
                                "Dropping relay from {} {} to {} {} in room {}",
                                sender, from, receiver, target, self.room_id
                            );
                            return;
                        }
                    }
                }
                match self.send(&target, frame) {
                    Some(Ok(())) => {}
                    Some(Err(e)) => self.evict(vec![(target, e)]),
                    None => debug!(
                        "Relay target {} is not in room {}; dropping",
                        target, self.room_id
                    ),
                }
            }

            RoomCommand::Publish { from, frame } => {
                if !self.stream.is_broadcaster(&from) {
                    warn!(
                        "{} published on stream {} without holding it",
                        from,
                        self.stream.stream_id()
                    );
                    return;
                }
                let mut failed = Failed::new();
                self.stream.publish(&frame, None, &mut failed);
                self.evict(failed);
            }

            RoomCommand::ToBroadcaster { from, frame } => {
                if !self.stream.is_viewer(&from) {
                    return;
                }
                match self.stream.to_broadcaster(frame) {
                    Some(Ok(())) => {}
                    Some(Err(e)) => {
                        if let Some(id) = self.stream.broadcaster_id() {
                            self.evict(vec![(id, e)]);
                        }
                    }
                    None => debug!(
                        "No broadcaster on stream {}; dropping frame from {}",
                        self.stream.stream_id(),
                        from
                    ),
                }
            }

            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }

            RoomCommand::RetireIfEmpty { reply } => {
                let _ = reply.send(self.retire_if_empty());
            }
        }
    }

    fn join(&mut self, connection: ConnectionId, role: Role, outbox: Outbox) -> JoinReply {
        if self.retired.load(Ordering::Acquire) {
            return Err((RoomError::Retired(self.room_id.clone()), outbox));
        }

        if role == Role::Stream {
            if let Some(holder) = self.stream.broadcaster_id() {
                if holder != connection {
                    warn!(
                        "{} tried to broadcast on stream {} held by {}",
                        connection,
                        self.stream.stream_id(),
                        holder
                    );
                    let conflict = RoomError::Conflict {
                        stream_id: self.stream.stream_id().clone(),
                    };
                    return Err((conflict, outbox));
                }
            }
        }

        if let Some(previous) = self.role_of(&connection) {
            info!(
                "{} re-joined room {}; replacing its {} membership",
                connection, self.room_id, previous
            );
            self.leave(&connection);
        }

        let peers = match role {
            Role::Peer => self.peers.ids(),
            _ => Vec::new(),
        };
        let welcome = ControlEvent::Welcome {
            connection_id: connection,
            room_id: self.room_id.clone(),
            stream_id: self.stream.stream_id().clone(),
            role,
            ice_servers: self.ice_servers.clone(),
            peers,
        };
        if let Some(frame) = control_frame(&welcome) {
            if let Err(e) = outbox.deliver(frame) {
                warn!("Failed to welcome {} to room {}: {}", connection, self.room_id, e);
            }
        }

        let mut failed = Failed::new();
        match role {
            Role::Peer => {
                if let Some(frame) = control_frame(&ControlEvent::PeerJoined {
                    connection_id: connection,
                }) {
                    self.peers.broadcast(&frame, None, &mut failed);
                }
                self.peers.insert(connection, outbox);
            }
            Role::Chat => {
                self.chat.insert(connection, outbox);
            }
            Role::Stream => {
                self.stream.claim(connection, outbox)?;
                self.stream.notify_viewer_count(&mut failed);
            }
            Role::Viewer => {
                self.stream.add_viewer(connection, outbox);
                self.stream.notify_viewer_count(&mut failed);
            }
        }

        info!("{} joined room {} as {}", connection, self.room_id, role);
        self.evict(failed);
        Ok(())
    }

    fn leave(&mut self, connection: &ConnectionId) -> bool {
        match self.detach(connection) {
            Some(failed) => {
                self.evict(failed);
                true
            }
            None => false,
        }
    }

    /// Remove one member and notify whoever needs to know. `None` when the
    /// connection was not a member.
    fn detach(&mut self, connection: &ConnectionId) -> Option<Failed> {
        let mut failed = Failed::new();

        if self.peers.remove(connection).is_some() {
            info!("Peer {} left room {}", connection, self.room_id);
            if let Some(frame) = control_frame(&ControlEvent::PeerLeft {
                connection_id: *connection,
            }) {
                self.peers.broadcast(&frame, None, &mut failed);
            }
        } else if self.chat.remove(connection).is_some() {
            info!("Chat member {} left room {}", connection, self.room_id);
        } else if self.stream.remove_broadcaster(connection) {
            info!(
                "Broadcaster {} left stream {}",
                connection,
                self.stream.stream_id()
            );
            self.stream.notify_ended(&mut failed);
        } else if self.stream.remove_viewer(connection) {
            info!(
                "Viewer {} left stream {}",
                connection,
                self.stream.stream_id()
            );
            self.stream.notify_viewer_count(&mut failed);
        } else {
            return None;
        }

        Some(failed)
    }

    /// Drop connections that could not take a frame. Their removal notices
    /// may fail in turn, so keep going until nothing is left.
    fn evict(&mut self, mut pending: Failed) {
        while let Some((connection, reason)) = pending.pop() {
            if let Some(failed) = self.detach(&connection) {
                warn!(
                    "Evicted {} from room {}: {}",
                    connection, self.room_id, reason
                );
                pending.extend(failed);
            }
        }
    }

    fn broadcast(
        &self,
        role: Role,
        frame: &Bytes,
        exclude: Option<&ConnectionId>,
        failed: &mut Failed,
    ) {
        match role {
            Role::Peer => self.peers.broadcast(frame, exclude, failed),
            Role::Chat => self.chat.broadcast(frame, exclude, failed),
            Role::Viewer => self.stream.publish(frame, exclude, failed),
            Role::Stream => {
                if let Some(id) = self.stream.broadcaster_id() {
                    if Some(&id) == exclude {
                        return;
                    }
                    if let Some(Err(e)) = self.stream.to_broadcaster(frame.clone()) {
                        failed.push((id, e));
                    }
                }
            }
        }
    }

    fn send(&self, target: &ConnectionId, frame: Bytes) -> Option<Result<(), DeliveryError>> {
        if self.peers.contains(target) {
            return self.peers.send(target, frame);
        }
        if self.chat.contains(target) {
            return self.chat.send(target, frame);
        }
        self.stream.send(target, frame)
    }

    fn accepts(&self, origin: Option<ConnectionId>) -> bool {
        match origin {
            Some(id) if self.role_of(&id).is_none() => {
                debug!("Dropping frame from {} which is not in room {}", id, self.room_id);
                false
            }
            _ => true,
        }
    }

    fn role_of(&self, connection: &ConnectionId) -> Option<Role> {
        if self.peers.contains(connection) {
            Some(Role::Peer)
        } else if self.chat.contains(connection) {
            Some(Role::Chat)
        } else if self.stream.is_broadcaster(connection) {
            Some(Role::Stream)
        } else if self.stream.is_viewer(connection) {
            Some(Role::Viewer)
        } else {
            None
        }
    }

    fn is_empty(&self) -> bool {
        self.peers.is_empty() && self.chat.is_empty() && self.stream.is_empty()
    }

    fn retire_if_empty(&mut self) -> bool {
        if self.retired.load(Ordering::Acquire) {
            return true;
        }
        if !self.is_empty() {
            return false;
        }
        self.retired.store(true, Ordering::Release);
        info!("Room {} is empty and retired", self.room_id);
        true
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id.clone(),
            stream_id: self.stream.stream_id().clone(),
            peers: self.peers.ids(),
            chat: self.chat.ids(),
            broadcaster: self.stream.broadcaster_id(),
            viewers: self.stream.viewer_ids(),
        }
    }
}

/// Roles a member may address directly: peers negotiate with peers, and a
/// broadcaster with its viewers.
fn reaches(from: Role, to: Role) -> bool {
    matches!(
        (from, to),
        (Role::Peer, Role::Peer) | (Role::Stream, Role::Viewer) | (Role::Viewer, Role::Stream)
    )
}

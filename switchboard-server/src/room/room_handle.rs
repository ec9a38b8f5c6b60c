use crate::error::RoomError;
use crate::room::room_command::RoomCommand;
use crate::transport::Outbox;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use switchboard_core::{ConnectionId, Role, RoomId, StreamId};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// Shared, cloneable reference to a running room.
#[derive(Clone)]
pub struct RoomHandle {
    shared: Arc<Shared>,
}

struct Shared {
    room_id: RoomId,
    stream_id: StreamId,
    command_tx: mpsc::Sender<RoomCommand>,
    retired: Arc<AtomicBool>,
}

impl RoomHandle {
    pub(crate) fn new(
        room_id: RoomId,
        stream_id: StreamId,
        command_tx: mpsc::Sender<RoomCommand>,
        retired: Arc<AtomicBool>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                room_id,
                stream_id,
                command_tx,
                retired,
            }),
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.shared.room_id
    }

    pub fn stream_id(&self) -> &StreamId {
        &self.shared.stream_id
    }

    /// A retired room rejects joins and will be replaced in the registry.
    pub fn is_retired(&self) -> bool {
        self.shared.retired.load(Ordering::Acquire)
    }

    /// Whether both handles refer to the same room instance.
    pub fn ptr_eq(&self, other: &RoomHandle) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Add `connection` with `role`. Server events for it go to `outbox`.
    ///
    /// Joining again with the same id replaces the earlier membership.
    pub async fn join(
        &self,
        connection: ConnectionId,
        role: Role,
        outbox: Outbox,
    ) -> Result<Membership, RoomError> {
        self.try_join(connection, role, outbox)
            .await
            .map_err(|(e, _)| e)
    }

    /// Like `join`, but hands the outbox back when the room turned it away.
    pub(crate) async fn try_join(
        &self,
        connection: ConnectionId,
        role: Role,
        outbox: Outbox,
    ) -> Result<Membership, (RoomError, Option<Outbox>)> {
        let (reply, reply_rx) = oneshot::channel();
        let cmd = RoomCommand::Join {
            connection,
            role,
            outbox,
            reply,
        };
        if self.shared.command_tx.send(cmd).await.is_err() {
            return Err((self.closed(), None));
        }

        match reply_rx.await {
            Ok(Ok(())) => Ok(Membership {
                room: self.clone(),
                connection,
                role,
            }),
            Ok(Err((e, outbox))) => Err((e, Some(outbox))),
            Err(_) => Err((self.closed(), None)),
        }
    }

    /// Remove `connection`. Returns `false` if it was not a member, which
    /// makes repeated calls harmless.
    pub async fn leave(&self, connection: ConnectionId) -> bool {
        let (reply, reply_rx) = oneshot::channel();
        if !self.send(RoomCommand::Leave { connection, reply }).await {
            return false;
        }
        reply_rx.await.unwrap_or(false)
    }

    /// Deliver `frame` to every member holding `role`, except `exclude`.
    pub async fn broadcast(&self, role: Role, frame: Bytes, exclude: Option<ConnectionId>) {
        self.send(RoomCommand::Broadcast {
            role,
            frame,
            exclude,
            origin: None,
        })
        .await;
    }

    /// Deliver `frame` to one member. Unknown targets are dropped.
    pub async fn relay(&self, target: ConnectionId, frame: Bytes) {
        self.send(RoomCommand::Relay {
            target,
            frame,
            origin: None,
        })
        .await;
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        if !self.send(RoomCommand::Snapshot { reply }).await {
            return Err(self.closed());
        }
        reply_rx.await.map_err(|_| self.closed())
    }

    pub(crate) async fn retire_if_empty(&self) -> bool {
        let (reply, reply_rx) = oneshot::channel();
        if !self.send(RoomCommand::RetireIfEmpty { reply }).await {
            return false;
        }
        reply_rx.await.unwrap_or(false)
    }

    async fn send(&self, cmd: RoomCommand) -> bool {
        if self.shared.command_tx.send(cmd).await.is_err() {
            warn!("Room {} is no longer running", self.shared.room_id);
            return false;
        }
        true
    }

    fn closed(&self) -> RoomError {
        RoomError::Closed(self.shared.room_id.clone())
    }
}

impl std::fmt::Debug for RoomHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomHandle")
            .field("room_id", &self.shared.room_id)
            .field("stream_id", &self.shared.stream_id)
            .field("retired", &self.is_retired())
            .finish()
    }
}

/// Proof that a connection joined a room in a given role. Everything the
/// connection sends goes through it, tagged with its id, so the room can
/// drop frames from members that already left.
#[derive(Debug)]
pub struct Membership {
    room: RoomHandle,
    connection: ConnectionId,
    role: Role,
}

impl Membership {
    pub fn room(&self) -> &RoomHandle {
        &self.room
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// To every member of `role` except this connection.
    pub async fn broadcast(&self, role: Role, frame: Bytes) {
        self.room
            .send(RoomCommand::Broadcast {
                role,
                frame,
                exclude: Some(self.connection),
                origin: Some(self.connection),
            })
            .await;
    }

    pub async fn relay(&self, target: ConnectionId, frame: Bytes) {
        self.room
            .send(RoomCommand::Relay {
                target,
                frame,
                origin: Some(self.connection),
            })
            .await;
    }

    /// Broadcaster to every viewer. Ignored unless this connection holds the
    /// stream.
    pub async fn publish(&self, frame: Bytes) {
        self.room
            .send(RoomCommand::Publish {
                from: self.connection,
                frame,
            })
            .await;
    }

    /// Viewer to the broadcaster. Dropped while the stream has none.
    pub async fn send_to_broadcaster(&self, frame: Bytes) {
        self.room
            .send(RoomCommand::ToBroadcaster {
                from: self.connection,
                frame,
            })
            .await;
    }

    pub async fn leave(&self) -> bool {
        self.room.leave(self.connection).await
    }
}

/// Point-in-time view of a room's members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub stream_id: StreamId,
    pub peers: Vec<ConnectionId>,
    pub chat: Vec<ConnectionId>,
    pub broadcaster: Option<ConnectionId>,
    pub viewers: Vec<ConnectionId>,
}

impl RoomSnapshot {
    pub fn member_count(&self) -> usize {
        self.peers.len() + self.chat.len() + self.viewers.len() + usize::from(self.broadcaster.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.member_count() == 0
    }

    pub fn role_of(&self, connection: &ConnectionId) -> Option<Role> {
        if self.peers.contains(connection) {
            Some(Role::Peer)
        } else if self.chat.contains(connection) {
            Some(Role::Chat)
        } else if self.broadcaster.as_ref() == Some(connection) {
            Some(Role::Stream)
        } else if self.viewers.contains(connection) {
            Some(Role::Viewer)
        } else {
            None
        }
    }
}

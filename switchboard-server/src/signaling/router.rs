use crate::error::{RoomError, SessionError};
use crate::room::{control_frame, AttachTarget, Membership, RoomRegistry};
use crate::transport::{outbox, ConnectionAdapter, FrameSink, FrameStream};
use bytes::Bytes;
use switchboard_core::{
    codec, ConnectionId, ControlCommand, ControlEvent, ErrorCode, MessageKind, Role,
};
use tracing::{debug, error, info, warn};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The client closed its side of the connection.
    ClientClosed,
    /// The client sent a `leave` control command.
    ClientLeft,
    /// The hub stopped writing to the client: the connection failed or the
    /// room evicted it.
    Disconnected,
}

/// Where an inbound message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Relay(ConnectionId),
    Broadcast(Role),
    Publish,
    ToBroadcaster,
    Discard,
}

/// Pick the route for a message of `kind` sent by a connection holding
/// `role`.
///
/// Viewers can only talk to the broadcaster. Chat goes to chat members, who
/// send nothing else. A target means point-to-point. A broadcaster without
/// a target reaches every viewer; a peer reaches the other peers.
pub(crate) fn classify(role: Role, kind: MessageKind, target: Option<ConnectionId>) -> Route {
    match (role, kind, target) {
        (Role::Viewer, _, _) => Route::ToBroadcaster,
        (_, MessageKind::Chat, _) => Route::Broadcast(Role::Chat),
        (Role::Chat, _, _) => Route::Discard,
        (_, _, Some(target)) => Route::Relay(target),
        (Role::Stream, _, None) => Route::Publish,
        (_, _, None) => Route::Broadcast(Role::Peer),
    }
}

enum Flow {
    Continue,
    Leave,
}

/// Drive one connection from attach to detach.
///
/// Frames the room addresses to this connection are written by a separate
/// task, so a slow client never blocks the reader or the room.
pub(crate) async fn run_session<A: ConnectionAdapter>(
    registry: &RoomRegistry,
    adapter: A,
    target: AttachTarget,
    role: Role,
) -> Result<SessionOutcome, SessionError> {
    let connection = ConnectionId::new();
    let (mut sink, mut stream) = adapter.split();
    let (outbox, mut outbox_rx) = outbox(registry.config().outbound_capacity);

    let membership = match registry.join(&target, connection, role, outbox).await {
        Ok(membership) => membership,
        Err(e) => {
            warn!("{} rejected from {:?} as {}: {}", connection, target, role, e);
            if let Some(frame) = rejection_frame(&e) {
                let _ = sink.send(frame).await;
            }
            sink.close().await;
            return Err(e.into());
        }
    };

    info!(
        "{} attached to room {} as {}",
        connection,
        membership.room().room_id(),
        role
    );

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbox_rx.recv().await {
            if let Err(e) = sink.send(frame).await {
                debug!("Write to {} failed: {}", connection, e);
                break;
            }
        }
        sink.close().await;
    });

    let outcome = loop {
        tokio::select! {
            inbound = stream.receive() => match inbound {
                Some(frame) => {
                    if let Flow::Leave = dispatch(&membership, &frame).await {
                        break SessionOutcome::ClientLeft;
                    }
                }
                None => break SessionOutcome::ClientClosed,
            },
            _ = &mut writer => break SessionOutcome::Disconnected,
        }
    };

    membership.leave().await;
    if outcome == SessionOutcome::ClientClosed {
        writer.abort();
    }
    registry.release(membership.room()).await;

    info!(
        "{} detached from room {}: {:?}",
        connection,
        membership.room().room_id(),
        outcome
    );
    Ok(outcome)
}

async fn dispatch(membership: &Membership, frame: &Bytes) -> Flow {
    let connection = membership.connection_id();

    let message = match codec::decode_inbound(frame) {
        Ok(message) => message,
        Err(e) => {
            warn!("Invalid frame from {}: {}", connection, e);
            return Flow::Continue;
        }
    };

    match message.kind {
        MessageKind::Control => match codec::decode_command(message.payload.as_deref()) {
            ControlCommand::Leave => return Flow::Leave,
            ControlCommand::Unknown => warn!("Unknown control command from {}", connection),
        },
        MessageKind::Unknown => warn!("Dropping message of unknown kind from {}", connection),
        kind => {
            let forwarded =
                match codec::encode_forward(kind, connection, message.payload.as_deref()) {
                    Ok(forwarded) => forwarded,
                    Err(e) => {
                        error!("Failed to encode {:?} from {}: {}", kind, connection, e);
                        return Flow::Continue;
                    }
                };

            match classify(membership.role(), kind, message.target) {
                Route::Relay(target) => membership.relay(target, forwarded).await,
                Route::Broadcast(role) => membership.broadcast(role, forwarded).await,
                Route::Publish => membership.publish(forwarded).await,
                Route::ToBroadcaster => membership.send_to_broadcaster(forwarded).await,
                Route::Discard => warn!("Dropping {:?} from chat member {}", kind, connection),
            }
        }
    }

    Flow::Continue
}

fn rejection_frame(err: &RoomError) -> Option<Bytes> {
    let code = match err {
        RoomError::Conflict { .. } => ErrorCode::Conflict,
        RoomError::Retired(_) | RoomError::Closed(_) => ErrorCode::Unavailable,
    };
    control_frame(&ControlEvent::Error {
        code,
        message: err.to_string(),
    })
}

use crate::error::RoomError;
use crate::room::RoomSnapshot;
use crate::transport::Outbox;
use bytes::Bytes;
use switchboard_core::{ConnectionId, Role};
use tokio::sync::oneshot;

/// A rejected join hands the outbox back so the caller can retry elsewhere.
pub(crate) type JoinReply = Result<(), (RoomError, Outbox)>;

/// Everything a room does happens through one of these, in arrival order.
#[derive(Debug)]
pub(crate) enum RoomCommand {
    Join {
        connection: ConnectionId,
        role: Role,
        outbox: Outbox,
        reply: oneshot::Sender<JoinReply>,
    },

    /// Replies whether the connection was a member.
    Leave {
        connection: ConnectionId,
        reply: oneshot::Sender<bool>,
    },

    /// Fan out to every member of `role`. With an `origin`, the frame is
    /// dropped unless the origin is still a member.
    Broadcast {
        role: Role,
        frame: Bytes,
        exclude: Option<ConnectionId>,
        origin: Option<ConnectionId>,
    },

    Relay {
        target: ConnectionId,
        frame: Bytes,
        origin: Option<ConnectionId>,
    },

    /// Broadcaster to viewers.
    Publish { from: ConnectionId, frame: Bytes },

    /// Viewer to broadcaster.
    ToBroadcaster { from: ConnectionId, frame: Bytes },

    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },

    /// Retire the room if it has no members. Replies whether it is retired.
    RetireIfEmpty { reply: oneshot::Sender<bool> },
}

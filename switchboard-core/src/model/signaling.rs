use crate::model::connection::ConnectionId;
use crate::model::role::Role;
use crate::model::room::{RoomId, StreamId};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Discriminator of every frame on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Offer,
    Answer,
    Candidate,
    Chat,
    Control,
    /// Any kind this build does not know. Dropped by the router, never fatal.
    #[serde(other)]
    Unknown,
}

impl MessageKind {
    /// Offer, answer or candidate.
    pub fn is_negotiation(self) -> bool {
        matches!(
            self,
            MessageKind::Offer | MessageKind::Answer | MessageKind::Candidate
        )
    }
}

/// A frame sent by a client.
///
/// `payload` is kept as raw JSON text so it can be forwarded byte for byte.
#[derive(Debug, Deserialize)]
pub struct SignalMessage {
    pub kind: MessageKind,
    #[serde(default)]
    pub target: Option<ConnectionId>,
    #[serde(default)]
    pub payload: Option<Box<RawValue>>,
}

/// Commands carried by `control` frames from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlCommand {
    Leave,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// The stream already has an active broadcaster.
    Conflict,
    /// The room could not take the connection.
    Unavailable,
}

/// Events the server emits inside `control` frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ControlEvent {
    Welcome {
        connection_id: ConnectionId,
        room_id: RoomId,
        stream_id: StreamId,
        role: Role,
        ice_servers: Vec<IceServerConfig>,
        /// Other peers already in the room (only filled for `Role::Peer`).
        peers: Vec<ConnectionId>,
    },
    PeerJoined {
        connection_id: ConnectionId,
    },
    PeerLeft {
        connection_id: ConnectionId,
    },
    StreamEnded {
        stream_id: StreamId,
    },
    ViewerCount {
        count: usize,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

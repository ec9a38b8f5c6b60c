use serde::{Deserialize, Serialize};
use std::fmt;

/// The membership set a connection is attached to inside a room.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Negotiation participant (offers, answers, candidates).
    Peer,
    /// Text chat participant.
    Chat,
    /// The single broadcaster of the room's stream.
    Stream,
    /// Receives broadcaster-originated stream messages only.
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Peer => "peer",
            Role::Chat => "chat",
            Role::Stream => "stream",
            Role::Viewer => "viewer",
        };
        f.write_str(name)
    }
}

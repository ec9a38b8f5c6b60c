mod connection;
mod role;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use role::Role;
pub use room::{RoomId, StreamId};
pub use signaling::{
    ControlCommand, ControlEvent, ErrorCode, IceServerConfig, MessageKind, SignalMessage,
};

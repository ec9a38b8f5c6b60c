use switchboard_core::{RoomId, StreamId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// Only one broadcaster may hold a stream at a time.
    #[error("stream {stream_id} already has an active broadcaster")]
    Conflict { stream_id: StreamId },

    /// The room was found empty and reclaimed; resolve it again.
    #[error("room {0} was retired")]
    Retired(RoomId),

    /// The room task is gone.
    #[error("room {0} is no longer running")]
    Closed(RoomId),
}

/// Failure to hand a frame to one connection's outbound buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("outbound buffer is full")]
    Overflow,

    #[error("connection is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection is closed")]
    Closed,

    #[error("frame is not valid UTF-8")]
    NotUtf8,

    #[error("websocket error: {0}")]
    Websocket(#[from] axum::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Join(#[from] RoomError),
}

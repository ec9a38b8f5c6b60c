use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;

/// Write half of a client connection.
#[async_trait]
pub trait FrameSink: Send + 'static {
    /// Deliver one encoded frame to the client.
    async fn send(&mut self, frame: Bytes) -> Result<(), TransportError>;

    /// Close the connection. Calling it on a closed connection is harmless.
    async fn close(&mut self);
}

/// Read half of a client connection: a lazy, non-restartable sequence of
/// inbound frames.
#[async_trait]
pub trait FrameStream: Send + 'static {
    /// Next frame from the client, or `None` once the connection is closed.
    async fn receive(&mut self) -> Option<Bytes>;
}

/// One physical bidirectional connection, split so that the session can read
/// and write concurrently.
pub trait ConnectionAdapter: Send + 'static {
    type Sink: FrameSink;
    type Stream: FrameStream;

    fn split(self) -> (Self::Sink, Self::Stream);
}

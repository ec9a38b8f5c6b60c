use crate::error::TransportError;
use crate::transport::adapter::{ConnectionAdapter, FrameSink, FrameStream};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

/// Server side of an in-process connection.
///
/// Useful for embedding the hub behind a transport that already delivers
/// whole frames, and for driving sessions in tests.
pub struct MemoryConnection {
    to_client: mpsc::UnboundedSender<Bytes>,
    from_client: mpsc::UnboundedReceiver<Bytes>,
}

/// Client side of an in-process connection. Dropping it closes the
/// connection from the server's point of view.
pub struct MemoryClient {
    to_server: mpsc::UnboundedSender<Bytes>,
    from_server: mpsc::UnboundedReceiver<Bytes>,
}

pub fn memory_pair() -> (MemoryConnection, MemoryClient) {
    let (to_client, from_server) = mpsc::unbounded_channel();
    let (to_server, from_client) = mpsc::unbounded_channel();

    (
        MemoryConnection {
            to_client,
            from_client,
        },
        MemoryClient {
            to_server,
            from_server,
        },
    )
}

impl MemoryClient {
    /// Returns `false` once the server stopped reading.
    pub fn send(&self, frame: impl Into<Bytes>) -> bool {
        self.to_server.send(frame.into()).is_ok()
    }

    /// Next frame from the server, `None` after the server closed.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.from_server.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Bytes> {
        self.from_server.try_recv().ok()
    }
}

pub struct MemorySink {
    tx: Option<mpsc::UnboundedSender<Bytes>>,
}

pub struct MemoryStream {
    rx: mpsc::UnboundedReceiver<Bytes>,
}

impl ConnectionAdapter for MemoryConnection {
    type Sink = MemorySink;
    type Stream = MemoryStream;

    fn split(self) -> (MemorySink, MemoryStream) {
        (
            MemorySink {
                tx: Some(self.to_client),
            },
            MemoryStream {
                rx: self.from_client,
            },
        )
    }
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send(&mut self, frame: Bytes) -> Result<(), TransportError> {
        let Some(tx) = &self.tx else {
            return Err(TransportError::Closed);
        };
        tx.send(frame).map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) {
        self.tx = None;
    }
}

#[async_trait]
impl FrameStream for MemoryStream {
    async fn receive(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }
}

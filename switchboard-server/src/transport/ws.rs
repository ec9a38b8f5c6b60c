use crate::error::TransportError;
use crate::transport::adapter::{ConnectionAdapter, FrameSink, FrameStream};
use async_trait::async_trait;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tracing::debug;

/// Adapter over an upgraded axum websocket. Frames go out as text messages;
/// both text and binary messages are accepted inbound. Ping/pong is answered
/// by axum itself.
pub struct WsConnection {
    socket: WebSocket,
}

impl WsConnection {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

pub struct WsSink {
    sender: SplitSink<WebSocket, Message>,
}

pub struct WsStream {
    receiver: SplitStream<WebSocket>,
}

impl ConnectionAdapter for WsConnection {
    type Sink = WsSink;
    type Stream = WsStream;

    fn split(self) -> (WsSink, WsStream) {
        let (sender, receiver) = self.socket.split();
        (WsSink { sender }, WsStream { receiver })
    }
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send(&mut self, frame: Bytes) -> Result<(), TransportError> {
        self.sender.send(text_message(frame)?).await?;
        Ok(())
    }

    async fn close(&mut self) {
        let _ = self.sender.close().await;
    }
}

/// Wrap an outbound frame as a text message without copying it.
fn text_message(frame: Bytes) -> Result<Message, TransportError> {
    let text = Utf8Bytes::try_from(frame).map_err(|_| TransportError::NotUtf8)?;
    Ok(Message::Text(text))
}

#[async_trait]
impl FrameStream for WsStream {
    async fn receive(&mut self) -> Option<Bytes> {
        while let Some(msg) = self.receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => return Some(Bytes::from(text)),
                Ok(Message::Binary(data)) => return Some(data),
                Ok(Message::Close(_)) => return None,
                Ok(_) => {}
                Err(e) => {
                    debug!("WebSocket read failed: {}", e);
                    return None;
                }
            }
        }
        None
    }
}

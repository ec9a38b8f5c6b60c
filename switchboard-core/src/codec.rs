//! JSON text framing of signaling messages.
//!
//! Frames are encoded once into [`Bytes`] so a fan-out to many connections
//! only clones a reference-counted buffer. Payloads travel as raw JSON and
//! are never re-encoded.

use crate::model::{ConnectionId, ControlCommand, ControlEvent, MessageKind, SignalMessage};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ForwardFrame<'a> {
    kind: MessageKind,
    from: ConnectionId,
    payload: Option<&'a RawValue>,
}

#[derive(Serialize)]
struct ControlFrame<'a> {
    kind: MessageKind,
    payload: &'a ControlEvent,
}

/// Parse a frame received from a client.
pub fn decode_inbound(frame: &[u8]) -> Result<SignalMessage, DecodeError> {
    Ok(serde_json::from_slice(frame)?)
}

/// Interpret the payload of a `control` frame. Anything that is not a known
/// command string maps to [`ControlCommand::Unknown`].
pub fn decode_command(payload: Option<&RawValue>) -> ControlCommand {
    payload
        .and_then(|raw| serde_json::from_str(raw.get()).ok())
        .unwrap_or(ControlCommand::Unknown)
}

/// Encode a client message for delivery to other members, stamped with the
/// sender. The payload is copied verbatim.
pub fn encode_forward(
    kind: MessageKind,
    from: ConnectionId,
    payload: Option<&RawValue>,
) -> Result<Bytes, serde_json::Error> {
    let frame = ForwardFrame {
        kind,
        from,
        payload,
    };
    serde_json::to_vec(&frame).map(Bytes::from)
}

pub fn encode_control(event: &ControlEvent) -> Result<Bytes, serde_json::Error> {
    let frame = ControlFrame {
        kind: MessageKind::Control,
        payload: event,
    };
    serde_json::to_vec(&frame).map(Bytes::from)
}

/// A frame as seen by a client: either a forwarded message or a control event.
#[derive(Debug, Deserialize)]
pub struct Delivered {
    pub kind: MessageKind,
    #[serde(default)]
    pub from: Option<ConnectionId>,
    #[serde(default)]
    pub payload: Option<Box<RawValue>>,
}

impl Delivered {
    pub fn decode(frame: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(frame)?)
    }

    /// Raw payload text, exactly as the sender wrote it.
    pub fn payload_str(&self) -> Option<&str> {
        self.payload.as_deref().map(RawValue::get)
    }

    /// The control event, if this is a well-formed `control` frame.
    pub fn control_event(&self) -> Option<ControlEvent> {
        if self.kind != MessageKind::Control {
            return None;
        }
        let raw = self.payload.as_deref()?;
        serde_json::from_str(raw.get()).ok()
    }
}

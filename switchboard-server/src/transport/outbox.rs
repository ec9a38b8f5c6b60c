use crate::error::DeliveryError;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Bounded outbound buffer of one connection.
///
/// The room owns the only `Outbox` of a member. Dropping it (on leave or
/// eviction) ends the receiving writer task once the buffer is drained.
#[derive(Debug)]
pub struct Outbox {
    tx: mpsc::Sender<Bytes>,
}

/// Create an outbox holding at most `capacity` frames (at least one).
pub fn outbox(capacity: usize) -> (Outbox, mpsc::Receiver<Bytes>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Outbox { tx }, rx)
}

impl Outbox {
    /// Queue a frame without waiting. A full buffer is reported instead of
    /// blocking the caller.
    pub fn deliver(&self, frame: Bytes) -> Result<(), DeliveryError> {
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DeliveryError::Overflow),
            Err(TrySendError::Closed(_)) => Err(DeliveryError::Closed),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

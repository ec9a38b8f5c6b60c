use crate::error::DeliveryError;
use crate::transport::Outbox;
use bytes::Bytes;
use std::collections::HashMap;
use switchboard_core::{codec, ConnectionId, ControlEvent};
use tracing::error;

/// Connections whose delivery failed, with the reason. The room evicts them
/// once the current operation is done.
pub(crate) type Failed = Vec<(ConnectionId, DeliveryError)>;

/// One role's members inside a room.
#[derive(Debug, Default)]
pub(crate) struct MemberSet {
    members: HashMap<ConnectionId, Outbox>,
}

impl MemberSet {
    pub(crate) fn insert(&mut self, id: ConnectionId, outbox: Outbox) -> Option<Outbox> {
        self.members.insert(id, outbox)
    }

    pub(crate) fn remove(&mut self, id: &ConnectionId) -> Option<Outbox> {
        self.members.remove(id)
    }

    pub(crate) fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn ids(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<_> = self.members.keys().copied().collect();
        ids.sort();
        ids
    }

    /// `None` when `id` is not in this set.
    pub(crate) fn send(&self, id: &ConnectionId, frame: Bytes) -> Option<Result<(), DeliveryError>> {
        self.members.get(id).map(|outbox| outbox.deliver(frame))
    }

    /// Deliver `frame` to every member except `exclude`.
    pub(crate) fn broadcast(&self, frame: &Bytes, exclude: Option<&ConnectionId>, failed: &mut Failed) {
        for (id, outbox) in &self.members {
            if Some(id) == exclude {
                continue;
            }
            if let Err(e) = outbox.deliver(frame.clone()) {
                failed.push((*id, e));
            }
        }
    }
}

/// Encode a server event. Encoding failures are logged and the event skipped.
pub(crate) fn control_frame(event: &ControlEvent) -> Option<Bytes> {
    match codec::encode_control(event) {
        Ok(frame) => Some(frame),
        Err(e) => {
            error!("Failed to encode control event {:?}: {}", event, e);
            None
        }
    }
}

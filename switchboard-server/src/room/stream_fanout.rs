use crate::error::{DeliveryError, RoomError};
use crate::room::member_set::{control_frame, Failed, MemberSet};
use crate::transport::Outbox;
use bytes::Bytes;
use switchboard_core::{ConnectionId, ControlEvent, StreamId};

/// The one-to-many side of a room: at most one broadcaster and any number
/// of viewers. Viewers may arrive before the broadcaster and stay after it
/// leaves.
#[derive(Debug)]
pub(crate) struct StreamFanout {
    stream_id: StreamId,
    broadcaster: Option<(ConnectionId, Outbox)>,
    viewers: MemberSet,
}

impl StreamFanout {
    pub(crate) fn new(stream_id: StreamId) -> Self {
        Self {
            stream_id,
            broadcaster: None,
            viewers: MemberSet::default(),
        }
    }

    pub(crate) fn stream_id(&self) -> &StreamId {
        &self.stream_id
    }

    pub(crate) fn broadcaster_id(&self) -> Option<ConnectionId> {
        self.broadcaster.as_ref().map(|(id, _)| *id)
    }

    pub(crate) fn is_broadcaster(&self, id: &ConnectionId) -> bool {
        self.broadcaster_id().as_ref() == Some(id)
    }

    pub(crate) fn is_viewer(&self, id: &ConnectionId) -> bool {
        self.viewers.contains(id)
    }

    pub(crate) fn viewer_ids(&self) -> Vec<ConnectionId> {
        self.viewers.ids()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.broadcaster.is_none() && self.viewers.is_empty()
    }

    /// Take the broadcaster slot. A held slot is a conflict, even for the
    /// holder itself; the caller releases it first on re-join.
    pub(crate) fn claim(&mut self, id: ConnectionId, outbox: Outbox) -> Result<(), (RoomError, Outbox)> {
        if self.broadcaster.is_some() {
            let conflict = RoomError::Conflict {
                stream_id: self.stream_id.clone(),
            };
            return Err((conflict, outbox));
        }
        self.broadcaster = Some((id, outbox));
        Ok(())
    }

    pub(crate) fn add_viewer(&mut self, id: ConnectionId, outbox: Outbox) {
        self.viewers.insert(id, outbox);
    }

    pub(crate) fn remove_broadcaster(&mut self, id: &ConnectionId) -> bool {
        if !self.is_broadcaster(id) {
            return false;
        }
        self.broadcaster = None;
        true
    }

    pub(crate) fn remove_viewer(&mut self, id: &ConnectionId) -> bool {
        self.viewers.remove(id).is_some()
    }

    /// Broadcaster to every viewer.
    pub(crate) fn publish(&self, frame: &Bytes, exclude: Option<&ConnectionId>, failed: &mut Failed) {
        self.viewers.broadcast(frame, exclude, failed);
    }

    /// `None` while no broadcaster holds the stream.
    pub(crate) fn to_broadcaster(&self, frame: Bytes) -> Option<Result<(), DeliveryError>> {
        self.broadcaster
            .as_ref()
            .map(|(_, outbox)| outbox.deliver(frame))
    }

    /// Direct delivery to the broadcaster or one viewer.
    pub(crate) fn send(&self, id: &ConnectionId, frame: Bytes) -> Option<Result<(), DeliveryError>> {
        match &self.broadcaster {
            Some((broadcaster, outbox)) if broadcaster == id => Some(outbox.deliver(frame)),
            _ => self.viewers.send(id, frame),
        }
    }

    /// Tell the broadcaster how many viewers are watching.
    pub(crate) fn notify_viewer_count(&self, failed: &mut Failed) {
        let Some((id, outbox)) = &self.broadcaster else {
            return;
        };
        let Some(frame) = control_frame(&ControlEvent::ViewerCount {
            count: self.viewers.len(),
        }) else {
            return;
        };
        if let Err(e) = outbox.deliver(frame) {
            failed.push((*id, e));
        }
    }

    /// Tell every current viewer the broadcast is over.
    pub(crate) fn notify_ended(&self, failed: &mut Failed) {
        let Some(frame) = control_frame(&ControlEvent::StreamEnded {
            stream_id: self.stream_id.clone(),
        }) else {
            return;
        };
        self.viewers.broadcast(&frame, None, failed);
    }
}

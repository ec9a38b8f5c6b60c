use crate::config::HubConfig;
use crate::error::RoomError;
use crate::room::room::Room;
use crate::room::{Membership, RoomHandle};
use crate::transport::Outbox;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use switchboard_core::{ConnectionId, Role, RoomId, StreamId};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Where a connection asked to attach.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttachTarget {
    Room(RoomId),
    Stream(StreamId),
}

/// Process-wide map of live rooms, indexed by room id and by stream id.
///
/// Rooms are created on first use and reclaimed by `release` once empty.
/// Lookups never return a retired room.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomId, RoomHandle>>,
    streams: Arc<DashMap<StreamId, RoomHandle>>,
    config: Arc<HubConfig>,
}

impl RoomRegistry {
    pub fn new(config: HubConfig) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            streams: Arc::new(DashMap::new()),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// The live room for `room_id`, created with a fresh stream id if there
    /// is none. Concurrent callers always get the same instance.
    ///
    /// Must be called within a Tokio runtime.
    pub fn get_or_create(&self, room_id: &RoomId) -> RoomHandle {
        if let Some(room) = self.get(room_id) {
            return room;
        }

        let room = match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(entry) if !entry.get().is_retired() => return entry.get().clone(),
            entry => {
                info!("Creating new room: {}", room_id);
                let room = self.spawn_room(room_id.clone(), StreamId::generate());
                entry.insert(room.clone());
                room
            }
        };

        // The stream id is fresh, so nobody can race for it.
        self.streams.insert(room.stream_id().clone(), room.clone());
        room
    }

    /// The live room owning `stream_id`. A stream nobody created yet gets a
    /// room of its own under a generated room id.
    pub fn get_or_create_stream(&self, stream_id: &StreamId) -> RoomHandle {
        if let Some(room) = self.get_stream(stream_id) {
            return room;
        }

        match self.streams.entry(stream_id.clone()) {
            Entry::Occupied(entry) if !entry.get().is_retired() => entry.get().clone(),
            entry => {
                let room_id = RoomId::generate();
                info!("Creating new room {} for stream {}", room_id, stream_id);
                let room = self.spawn_room(room_id.clone(), stream_id.clone());
                // Only place both maps are locked at once, always streams first.
                self.rooms.insert(room_id, room.clone());
                entry.insert(room.clone());
                room
            }
        }
    }

    pub fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms
            .get(room_id)
            .filter(|room| !room.is_retired())
            .map(|room| room.clone())
    }

    pub fn get_stream(&self, stream_id: &StreamId) -> Option<RoomHandle> {
        self.streams
            .get(stream_id)
            .filter(|room| !room.is_retired())
            .map(|room| room.clone())
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.get(room_id).is_some()
    }

    /// Number of registered rooms, including any retired one not yet removed.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn resolve(&self, target: &AttachTarget) -> RoomHandle {
        match target {
            AttachTarget::Room(room_id) => self.get_or_create(room_id),
            AttachTarget::Stream(stream_id) => self.get_or_create_stream(stream_id),
        }
    }

    /// Resolve `target` and join it. A room retired between lookup and join
    /// is replaced and the join retried.
    pub async fn join(
        &self,
        target: &AttachTarget,
        connection: ConnectionId,
        role: Role,
        mut outbox: Outbox,
    ) -> Result<Membership, RoomError> {
        loop {
            let room = self.resolve(target);
            match room.try_join(connection, role, outbox).await {
                Ok(membership) => return Ok(membership),
                Err((RoomError::Retired(room_id), Some(returned))) => {
                    debug!("Room {} retired during join of {}; retrying", room_id, connection);
                    outbox = returned;
                }
                Err((e, _)) => return Err(e),
            }
        }
    }

    /// Retire `room` if it is empty and drop it from both indexes. Returns
    /// whether it is retired. Safe to call from every departing session.
    pub async fn release(&self, room: &RoomHandle) -> bool {
        if !room.retire_if_empty().await {
            return false;
        }

        let removed = self
            .rooms
            .remove_if(room.room_id(), |_, current| current.ptr_eq(room))
            .is_some();
        self.streams
            .remove_if(room.stream_id(), |_, current| current.ptr_eq(room));

        if removed {
            info!("Room {} reclaimed", room.room_id());
        }
        true
    }

    fn spawn_room(&self, room_id: RoomId, stream_id: StreamId) -> RoomHandle {
        let (tx, rx) = mpsc::channel(self.config.room_command_capacity.max(1));
        let retired = Arc::new(AtomicBool::new(false));

        let room = Room::new(
            room_id.clone(),
            stream_id.clone(),
            retired.clone(),
            self.config.ice_servers.clone(),
            rx,
        );
        tokio::spawn(room.run());

        RoomHandle::new(room_id, stream_id, tx, retired)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

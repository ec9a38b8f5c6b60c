use crate::config::HubConfig;
use crate::error::SessionError;
use crate::room::{AttachTarget, RoomRegistry};
use crate::signaling::router::{self, SessionOutcome};
use crate::transport::ConnectionAdapter;
use switchboard_core::{Role, RoomId};

/// Entry point for transports: hands each accepted connection to a room.
#[derive(Clone, Default)]
pub struct SignalingService {
    registry: RoomRegistry,
}

impl SignalingService {
    pub fn new(config: HubConfig) -> Self {
        Self::with_registry(RoomRegistry::new(config))
    }

    pub fn with_registry(registry: RoomRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// A fresh room id. Nothing is registered until the first connection
    /// attaches to it, so unused ids cost nothing.
    pub fn create_room(&self) -> RoomId {
        RoomId::generate()
    }

    /// Attach a connection to `target` in `role` and serve it until it
    /// closes, leaves, or is disconnected.
    ///
    /// Fails only when the room refuses the join, e.g. a second broadcaster
    /// on a stream. The client is told why before the connection is closed.
    pub async fn attach<A: ConnectionAdapter>(
        &self,
        adapter: A,
        target: AttachTarget,
        role: Role,
    ) -> Result<SessionOutcome, SessionError> {
        router::run_session(&self.registry, adapter, target, role).await
    }
}

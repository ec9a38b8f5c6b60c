use serde::Deserialize;
use switchboard_core::IceServerConfig;

/// Settings shared by the registry, every room and every session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Frames buffered per connection before it is treated as unresponsive
    /// and disconnected.
    pub outbound_capacity: usize,

    /// Depth of each room's command queue.
    pub room_command_capacity: usize,

    /// Advertised to clients in the welcome event. Never relayed by the hub.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: 64,
            room_command_capacity: 100,
            ice_servers: vec![IceServerConfig {
                urls: vec!["stun:stun.l.google.com:19302".to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}

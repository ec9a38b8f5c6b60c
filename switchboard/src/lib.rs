pub use switchboard_core::model::{ConnectionId, Role, RoomId, StreamId};

pub mod model {
    pub use switchboard_core::model::*;
}

pub mod codec {
    pub use switchboard_core::codec::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use switchboard_server::*;
}

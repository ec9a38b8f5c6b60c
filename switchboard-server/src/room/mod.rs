mod member_set;
mod room;
mod room_command;
mod room_handle;
mod room_registry;
mod stream_fanout;

pub(crate) use member_set::control_frame;
pub use room_handle::*;
pub use room_registry::*;

mod adapter;
mod memory;
mod outbox;
mod ws;

pub use adapter::*;
pub use memory::*;
pub use outbox::*;
pub use ws::*;

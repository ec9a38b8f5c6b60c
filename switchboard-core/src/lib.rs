pub mod codec;
pub mod model;

pub use codec::{DecodeError, Delivered};
pub use model::*;

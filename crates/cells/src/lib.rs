pub mod cell;
pub mod engine;

pub use cell::*;
pub use engine::*;

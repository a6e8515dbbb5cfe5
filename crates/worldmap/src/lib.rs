pub mod config;
pub mod error;
pub mod map;

pub use config::*;
pub use error::*;
pub use map::*;

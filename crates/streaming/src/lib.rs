pub mod controller;
pub mod error;
pub mod land;
pub mod source;

pub use controller::*;
pub use error::*;
pub use land::*;
pub use source::*;

pub mod builder;
pub mod catalog;
pub mod path;
pub mod projection;
pub mod raw;

pub use builder::*;
pub use catalog::*;
pub use path::*;
pub use projection::*;
pub use raw::*;

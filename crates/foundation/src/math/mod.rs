pub mod rotation;
pub mod spherical;
pub mod vec;

pub use rotation::*;
pub use spherical::*;
pub use vec::*;

pub mod gate;
pub mod layout;
pub mod memo;

pub use gate::*;
pub use layout::*;
pub use memo::*;

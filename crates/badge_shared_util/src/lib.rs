pub mod flags;
pub mod wrappers;

pub use flags::*;
pub use wrappers::*;

pub mod util;

mod counter;
pub use counter::*;

mod error;
pub use error::*;

mod event;
pub use event::*;

mod menu;
pub use menu::*;

mod session;
pub use session::*;

mod source;
pub use source::*;

mod tracker;
pub use tracker::*;

pub use badge_shared_util::{AccountId, CounterSourceId};

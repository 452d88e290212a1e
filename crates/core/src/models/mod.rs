//! Data models for Tavern

mod card;
mod event;
mod record;
mod table;
mod user;

pub use card::*;
pub use event::*;
pub use record::*;
pub use table::*;
pub use user::*;

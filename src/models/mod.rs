//! Plain data records shared by every stage of a scrape run
//!
//! - [`Source`]: one configured brewery or venue
//! - [`Event`]: one normalized occurrence produced by a parser

mod event;
mod source;

pub use event::{Event, EventCategory};
pub use source::Source;

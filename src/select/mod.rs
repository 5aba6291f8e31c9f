//! Selection criteria: tag queries and retention windows.

pub mod tags;
pub mod window;

pub use tags::{Combinator, TagQuery, Taggable, matches};
pub use window::{DateSpec, RetentionWindow, format_date, parse_date, resolve_window};

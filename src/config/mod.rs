//! Settings for Proctor.
//!
//! Every command reads one [`Settings`] value built at startup from three
//! layers:
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags the user explicitly passed (overrides, this invocation only)
//! 2. `settings.kdl` in the user config directory (persisted by `proctor settings`)
//! 3. Built-in defaults
//!
//! Raw tokens become typed values through [`value::coerce`]; the recognized
//! names and defaults live in [`schema`].

pub mod resolver;
pub mod schema;
pub mod value;

pub use resolver::{Resolved, SettingOverrides, Settings, ValueSource, parse_update};
pub use schema::{DATE_FORMAT, Defaults, Layer, Setting};
pub use value::{TypedValue, coerce};

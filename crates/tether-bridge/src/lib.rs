//! tether-bridge: turns VT engine state into what a renderer consumes.
//!
//! A [`Session`] wraps a [`tether_vt::VtEngine`] and answers the questions a
//! UI asks each frame: which rows changed, how far the viewport scrolled,
//! what each row says and how it is colored. It also encodes named keys
//! into the bytes the application expects.

pub mod config;
pub mod dirty;
pub mod error;
pub mod hyperlink;
pub mod keys;
pub mod palette;
pub mod runs;
pub mod scroll;
pub mod session;
pub mod style;

#[cfg(test)]
mod testing;

pub use config::{load_config, load_config_from_path, parse_color, parse_config, TerminalConfig};
pub use error::{ConfigError, Error};
pub use keys::{encode_key, Key, KeyAction, KeyEncoder, KeyEvent, Modifiers};
pub use palette::{Palette, DEFAULT_PALETTE, PALETTE_SIZE};
pub use runs::{encode_style_runs, expand_style_runs, StyleRun, MAX_RUN_WIDTH};
pub use scroll::ScrollTracker;
pub use session::Session;
pub use style::{resolve, resolve_color, DefaultColors, ResolvedStyle, StyleFlags};
pub use tether_vt::{Rgb, VtTerminal};

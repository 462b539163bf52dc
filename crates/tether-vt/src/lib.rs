//! tether-vt: the VT engine seam for Tether.
//!
//! Defines the [`VtEngine`] capability trait the bridge is written against,
//! the cell/style/damage vocabulary it speaks, and [`VtTerminal`], an engine
//! built on `alacritty_terminal`. Also hosts the scalar UTF-8 decoder used
//! for printable runs.

pub mod cell;
pub mod damage;
pub mod engine;
mod modes;
mod screen;
pub mod terminal;
pub mod utf8;

pub use cell::{Cell, CellWidth, ColorRef, Rgb, Style, StyleAttrs, Underline};
pub use damage::{DamageState, RedrawReasons};
pub use engine::{
    ColorQuery, ColorSlot, CursorPoint, EngineError, EngineEvent, InputModes, PaletteEvent,
    ViewportScroll, VtEngine,
};
pub use terminal::{VtTerminal, DEFAULT_SCROLLBACK};

//! The capability surface the bridge needs from a VT engine.
//!
//! The bridge never looks inside an engine; it feeds bytes, reads cells and
//! cursor state, consumes damage and drains events. [`crate::VtTerminal`] is
//! the production implementation, and tests substitute their own.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::cell::{Cell, Rgb};
use crate::damage::DamageState;

/// Errors reported by an engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid terminal size {cols}x{rows}")]
    InvalidSize { cols: u16, rows: u16 },
    #[error("row {row} is outside the viewport ({rows} rows)")]
    RowOutOfRange { row: u16, rows: u16 },
}

/// A request to move the viewport through scrollback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewportScroll {
    /// Move by a number of lines; negative moves toward older history.
    Delta(i32),
    /// Jump to the oldest retained line.
    Top,
    /// Jump back to the active screen.
    Bottom,
}

/// A change the engine made to its 256-color palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteEvent {
    Set { index: u8, color: Rgb },
    Reset(u8),
    /// Every explicitly set entry returned to its default.
    ResetAll,
}

/// The color a query asks about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSlot {
    Palette(u8),
    Foreground,
    Background,
    Cursor,
}

/// A color query from the application (`OSC 4/10/11/12 ; ?`).
///
/// The engine knows the reply syntax; the session knows the color.
#[derive(Clone)]
pub struct ColorQuery {
    pub slot: ColorSlot,
    format: Arc<dyn Fn(Rgb) -> String + Send + Sync>,
}

impl ColorQuery {
    pub fn new(slot: ColorSlot, format: Arc<dyn Fn(Rgb) -> String + Send + Sync>) -> Self {
        Self { slot, format }
    }

    /// Render the reply for `color`.
    pub fn respond(&self, color: Rgb) -> String {
        (self.format)(color)
    }
}

impl fmt::Debug for ColorQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorQuery").field("slot", &self.slot).finish()
    }
}

/// Something the engine observed while parsing that the host must act on.
#[derive(Clone, Debug)]
pub enum EngineEvent {
    Palette(PaletteEvent),
    /// `None` resets the title.
    Title(Option<String>),
    Bell,
    ClipboardStore(String),
    /// Bytes the engine wants written back to the application.
    PtyWrite(Vec<u8>),
    ColorQuery(ColorQuery),
}

/// Terminal modes that change how input is encoded or displayed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputModes {
    pub app_cursor: bool,
    pub bracketed_paste: bool,
    pub mouse_x10: bool,
    pub mouse_button_event: bool,
    pub mouse_any_event: bool,
    pub mouse_sgr: bool,
    pub reverse_video: bool,
}

impl InputModes {
    pub fn mouse_reporting(&self) -> bool {
        self.mouse_x10 || self.mouse_button_event || self.mouse_any_event
    }
}

/// Cursor location in the active area, 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorPoint {
    pub row: u16,
    pub col: u16,
}

/// A terminal emulation engine as seen by the bridge.
///
/// Coordinates are 0-based. Viewport rows count from the top of what is
/// currently displayed, which differs from the active area while scrolled
/// back.
pub trait VtEngine {
    /// Parse `bytes` in order. A failure may leave a prefix applied.
    fn feed(&mut self, bytes: &[u8]) -> Result<(), EngineError>;

    fn resize(&mut self, cols: u16, rows: u16) -> Result<(), EngineError>;

    fn scroll_viewport(&mut self, scroll: ViewportScroll) -> Result<(), EngineError>;

    fn cols(&self) -> u16;

    fn rows(&self) -> u16;

    /// Cursor position in the active area, if the engine can report one.
    fn cursor(&self) -> Option<CursorPoint>;

    /// The cell at a viewport coordinate, or `None` outside the viewport.
    fn cell(&self, row: u16, col: u16) -> Option<Cell>;

    /// URI of the hyperlink attached to a viewport cell.
    ///
    /// May be `None` even for a cell flagged with a hyperlink if the engine
    /// no longer has the entry.
    fn hyperlink_uri(&self, row: u16, col: u16) -> Option<String>;

    /// Absolute index of the row at the top of the viewport, counted from
    /// the oldest retained row.
    fn viewport_top_row(&self) -> u64;

    fn input_modes(&self) -> InputModes;

    fn damage(&self) -> &DamageState;

    fn damage_mut(&mut self) -> &mut DamageState;

    /// Drain events observed since the last call, in order.
    fn take_events(&mut self) -> Vec<EngineEvent>;

    /// All cells of a viewport row.
    fn row_cells(&self, row: u16) -> Result<Vec<Cell>, EngineError> {
        let rows = self.rows();
        if row >= rows {
            return Err(EngineError::RowOutOfRange { row, rows });
        }
        Ok((0..self.cols())
            .map(|col| self.cell(row, col).unwrap_or_default())
            .collect())
    }

    /// Text of a viewport row with trailing blanks removed.
    fn row_text(&self, row: u16) -> Result<String, EngineError> {
        let mut text = String::with_capacity(self.cols() as usize);
        for cell in self.row_cells(row)? {
            cell.push_text(&mut text);
        }
        let trimmed = text.trim_end_matches(' ').len();
        text.truncate(trimmed);
        Ok(text)
    }
}

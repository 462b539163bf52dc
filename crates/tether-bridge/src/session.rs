//! The terminal session: an engine plus everything the host-side
//! renderer needs to know about it.

use log::{debug, trace};
use tether_vt::{
    ColorSlot, EngineEvent, InputModes, RedrawReasons, Rgb, ViewportScroll, VtEngine, VtTerminal,
};

use crate::config::TerminalConfig;
use crate::dirty::take_dirty_rows;
use crate::error::Error;
use crate::hyperlink::hyperlink_at;
use crate::keys::{KeyEncoder, Modifiers};
use crate::palette::Palette;
use crate::runs::{encode_style_runs, StyleRun};
use crate::scroll::ScrollTracker;
use crate::style::{resolve, DefaultColors, ResolvedStyle};

/// One terminal instance.
///
/// Owns the engine, the palette and default colors used to resolve styles,
/// and the state the engine reports as events (title, bell, clipboard
/// writes and replies owed to the application).
pub struct Session<E: VtEngine = VtTerminal> {
    engine: E,
    palette: Palette,
    defaults: DefaultColors,
    scroll: ScrollTracker,
    preedit: Option<String>,
    title: Option<String>,
    clipboard_write: Option<String>,
    bell: bool,
    pty_responses: Vec<u8>,
}

impl Session<VtTerminal> {
    /// Create a session with default colors and scrollback.
    pub fn new(cols: u16, rows: u16) -> Result<Self, Error> {
        let engine = VtTerminal::new(cols, rows).map_err(Error::Create)?;
        debug!("session created: {cols}x{rows}");
        Ok(Self::from_engine(engine))
    }

    pub fn with_config(config: &TerminalConfig) -> Result<Self, Error> {
        let engine = VtTerminal::with_scrollback(config.cols, config.rows, config.scrollback_lines)
            .map_err(Error::Create)?;
        debug!(
            "session created from config: {}x{}, {} lines of scrollback",
            config.cols, config.rows, config.scrollback_lines
        );
        let mut session = Self::from_engine(engine);
        session.defaults = config.default_colors();
        Ok(session)
    }
}

impl<E: VtEngine> Session<E> {
    pub fn from_engine(engine: E) -> Self {
        Self {
            engine,
            palette: Palette::default(),
            defaults: DefaultColors::default(),
            scroll: ScrollTracker::new(),
            preedit: None,
            title: None,
            clipboard_write: None,
            bell: false,
            pty_responses: Vec::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn cols(&self) -> u16 {
        self.engine.cols()
    }

    pub fn rows(&self) -> u16 {
        self.engine.rows()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The configured default colors.
    pub fn default_colors(&self) -> DefaultColors {
        self.defaults
    }

    /// Default colors as currently displayed, swapped under reverse video.
    pub fn effective_default_colors(&self) -> DefaultColors {
        if self.engine.input_modes().reverse_video {
            self.defaults.swapped()
        } else {
            self.defaults
        }
    }

    /// Change the default colors. Every default-colored cell changes, so
    /// this forces a full redraw.
    pub fn set_default_colors(&mut self, fg: Rgb, bg: Rgb) {
        let defaults = DefaultColors { fg, bg };
        if defaults == self.defaults {
            return;
        }
        debug!("default colors changed: fg={fg:?} bg={bg:?}");
        self.defaults = defaults;
        self.engine.damage_mut().raise(RedrawReasons::PALETTE);
    }

    /// Feed output from the application.
    ///
    /// Events the engine produced are applied even if the feed failed part
    /// way through.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let result = self.engine.feed(bytes);
        self.process_events();
        result.map_err(Error::Feed)
    }

    /// Feed output and hand any replies owed to the application to `send`.
    pub fn feed_with_pty_responses(
        &mut self,
        bytes: &[u8],
        mut send: impl FnMut(&[u8]),
    ) -> Result<(), Error> {
        let result = self.feed(bytes);
        let responses = self.take_pty_responses();
        if !responses.is_empty() {
            send(&responses);
        }
        result
    }

    fn process_events(&mut self) {
        for event in self.engine.take_events() {
            match event {
                EngineEvent::Palette(change) => {
                    trace!("palette event: {change:?}");
                    self.palette.apply(change);
                }
                EngineEvent::Title(title) => self.title = title,
                EngineEvent::Bell => self.bell = true,
                EngineEvent::ClipboardStore(text) => self.clipboard_write = Some(text),
                EngineEvent::PtyWrite(bytes) => {
                    trace!("pty response: {} bytes", bytes.len());
                    self.pty_responses.extend_from_slice(&bytes);
                }
                EngineEvent::ColorQuery(query) => {
                    let color = match query.slot {
                        ColorSlot::Palette(index) => self.palette.get(index),
                        ColorSlot::Foreground | ColorSlot::Cursor => self.defaults.fg,
                        ColorSlot::Background => self.defaults.bg,
                    };
                    trace!("answering color query for {:?}", query.slot);
                    self.pty_responses
                        .extend_from_slice(query.respond(color).as_bytes());
                }
            }
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) -> Result<(), Error> {
        self.engine.resize(cols, rows).map_err(Error::Resize)?;
        debug!("session resized: {cols}x{rows}");
        Ok(())
    }

    /// Scroll the viewport; negative moves toward older lines.
    pub fn scroll_viewport(&mut self, delta_lines: i32) -> Result<(), Error> {
        self.engine
            .scroll_viewport(ViewportScroll::Delta(delta_lines))
            .map_err(Error::Scroll)
    }

    pub fn scroll_viewport_top(&mut self) -> Result<(), Error> {
        self.engine
            .scroll_viewport(ViewportScroll::Top)
            .map_err(Error::Scroll)
    }

    pub fn scroll_viewport_bottom(&mut self) -> Result<(), Error> {
        self.engine
            .scroll_viewport(ViewportScroll::Bottom)
            .map_err(Error::Scroll)
    }

    /// Cursor as 1-based `(col, row)`.
    pub fn cursor_position(&self) -> Option<(u16, u16)> {
        let cursor = self.engine.cursor()?;
        Some((cursor.col.checked_add(1)?, cursor.row.checked_add(1)?))
    }

    /// Viewport text, one line per row.
    pub fn dump_viewport(&self) -> Result<String, Error> {
        let mut lines = Vec::with_capacity(self.rows() as usize);
        for row in 0..self.rows() {
            lines.push(self.dump_row(row)?);
        }
        Ok(lines.join("\n"))
    }

    /// Text of one viewport row (0-based), trailing blanks removed.
    pub fn dump_row(&self, row: u16) -> Result<String, Error> {
        self.engine
            .row_text(row)
            .map_err(|source| Error::Dump { row, source })
    }

    /// Resolved style of every cell in a viewport row (0-based).
    pub fn dump_row_cell_styles(&self, row: u16) -> Result<Vec<ResolvedStyle>, Error> {
        let cells = self
            .engine
            .row_cells(row)
            .map_err(|source| Error::Dump { row, source })?;
        let defaults = self.effective_default_colors();
        Ok(cells
            .iter()
            .map(|cell| resolve(&cell.style, &self.palette, defaults))
            .collect())
    }

    /// Style runs of a viewport row (0-based).
    pub fn dump_row_style_runs(&self, row: u16) -> Result<Vec<StyleRun>, Error> {
        let cells = self
            .engine
            .row_cells(row)
            .map_err(|source| Error::Dump { row, source })?;
        Ok(encode_style_runs(
            cells.iter().map(|cell| cell.style),
            &self.palette,
            self.effective_default_colors(),
        ))
    }

    /// Viewport rows that need repainting, out of the first `rows` rows.
    pub fn take_dirty_rows(&mut self, rows: u16) -> Vec<u16> {
        take_dirty_rows(self.engine.damage_mut(), rows)
    }

    /// Rows the viewport top moved since the previous call.
    pub fn take_viewport_scroll_delta(&mut self) -> i32 {
        let delta = self.scroll.take_delta(self.engine.viewport_top_row());
        if delta != 0 {
            trace!("viewport scrolled by {delta}");
        }
        delta
    }

    /// Hyperlink URI at a 1-based viewport coordinate.
    pub fn hyperlink_at(&self, col: u16, row: u16) -> Option<String> {
        hyperlink_at(&self.engine, col, row)
    }

    /// Encode a named key for the application, honoring cursor-key mode.
    pub fn encode_key(&self, name: &str, mods: Modifiers) -> Option<Vec<u8>> {
        let encoder = KeyEncoder {
            app_cursor: self.engine.input_modes().app_cursor,
            ..KeyEncoder::default()
        };
        encoder.encode_named(name, mods)
    }

    pub fn input_modes(&self) -> InputModes {
        self.engine.input_modes()
    }

    /// Set or clear the IME composition text.
    pub fn set_preedit(&mut self, text: Option<String>) {
        if self.preedit == text {
            return;
        }
        self.preedit = text;
        self.engine.damage_mut().raise(RedrawReasons::PREEDIT);
    }

    pub fn preedit(&self) -> Option<&str> {
        self.preedit.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn take_clipboard_write(&mut self) -> Option<String> {
        self.clipboard_write.take()
    }

    /// Whether the bell rang since the last call.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    /// Replies owed to the application, in order.
    pub fn take_pty_responses(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pty_responses)
    }
}

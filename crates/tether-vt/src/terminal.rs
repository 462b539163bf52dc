use std::sync::{Arc, Mutex, PoisonError};

use alacritty_terminal::event::{Event, EventListener};
use alacritty_terminal::grid::{Dimensions, Scroll};
use alacritty_terminal::index::{Column, Line, Point};
use alacritty_terminal::term::cell::Cell as AlacCell;
use alacritty_terminal::term::{Config, Term, TermDamage, TermMode};
use alacritty_terminal::vte::ansi::{self, NamedColor, Rgb as AlacRgb};

use crate::cell::{Cell, Rgb};
use crate::damage::{DamageState, RedrawReasons};
use crate::engine::{
    ColorQuery, ColorSlot, CursorPoint, EngineError, EngineEvent, InputModes, ViewportScroll,
    VtEngine,
};
use crate::modes::ModeTracker;
use crate::screen::{convert_cell, PaletteSnapshot, PALETTE_LEN};

/// Lines of scrollback kept when none is configured.
pub const DEFAULT_SCROLLBACK: usize = 10_000;

/// Cursor location and the cell under it, taken before a mutation.
///
/// Alacritty damages the cursor cell on every damage read, so a line whose
/// only damage is that untouched cell did not change.
struct CursorMark {
    point: Point,
    cell: AlacCell,
}

/// Events captured from the terminal, in arrival order.
#[derive(Default)]
struct EventState {
    events: Vec<EngineEvent>,
}

/// Event proxy that captures terminal events.
///
/// Must be `Clone` because `Term` requires `T: EventListener`. We use
/// interior mutability via `Arc<Mutex<_>>`.
#[derive(Clone)]
pub struct EventProxy {
    state: Arc<Mutex<EventState>>,
}

impl EventProxy {
    fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(EventState::default())),
        }
    }

    fn push(&self, event: EngineEvent) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.events.push(event);
    }

    fn drain(&self) -> Vec<EngineEvent> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut state.events)
    }
}

impl EventListener for EventProxy {
    fn send_event(&self, event: Event) {
        let event = match event {
            Event::Title(title) => EngineEvent::Title(Some(title)),
            Event::ResetTitle => EngineEvent::Title(None),
            Event::Bell => EngineEvent::Bell,
            Event::PtyWrite(data) => EngineEvent::PtyWrite(data.into_bytes()),
            Event::ClipboardStore(_, data) => EngineEvent::ClipboardStore(data),
            Event::ColorRequest(index, format) => {
                let Some(slot) = color_slot(index) else {
                    log::trace!("ignoring color request for slot {index}");
                    return;
                };
                let respond = move |color: Rgb| {
                    format(AlacRgb {
                        r: color.r,
                        g: color.g,
                        b: color.b,
                    })
                };
                EngineEvent::ColorQuery(ColorQuery::new(slot, Arc::new(respond)))
            }
            // We don't act on other events.
            _ => return,
        };
        self.push(event);
    }
}

fn color_slot(index: usize) -> Option<ColorSlot> {
    if index < PALETTE_LEN {
        return Some(ColorSlot::Palette(index as u8));
    }
    if index == NamedColor::Foreground as usize {
        Some(ColorSlot::Foreground)
    } else if index == NamedColor::Background as usize {
        Some(ColorSlot::Background)
    } else if index == NamedColor::Cursor as usize {
        Some(ColorSlot::Cursor)
    } else {
        None
    }
}

/// Dimensions helper for creating / resizing the terminal.
struct TermSize {
    columns: usize,
    screen_lines: usize,
}

impl Dimensions for TermSize {
    fn total_lines(&self) -> usize {
        self.screen_lines
    }

    fn screen_lines(&self) -> usize {
        self.screen_lines
    }

    fn columns(&self) -> usize {
        self.columns
    }
}

fn check_size(cols: u16, rows: u16) -> Result<TermSize, EngineError> {
    // Column numbers of style runs must fit `cols + 1` in a u16.
    if cols == 0 || rows == 0 || cols == u16::MAX {
        return Err(EngineError::InvalidSize { cols, rows });
    }
    Ok(TermSize {
        columns: cols as usize,
        screen_lines: rows as usize,
    })
}

/// The production VT engine.
///
/// Wraps `alacritty_terminal::Term` and a VTE parser, translating its damage,
/// palette changes and events into the [`VtEngine`] vocabulary.
pub struct VtTerminal {
    term: Term<EventProxy>,
    parser: ansi::Processor,
    event_proxy: EventProxy,
    modes: ModeTracker,
    palette: PaletteSnapshot,
    damage: DamageState,
}

impl VtTerminal {
    /// Create a new terminal with the given dimensions.
    ///
    /// Uses [`DEFAULT_SCROLLBACK`] lines of scrollback history.
    pub fn new(cols: u16, rows: u16) -> Result<Self, EngineError> {
        Self::with_scrollback(cols, rows, DEFAULT_SCROLLBACK)
    }

    pub fn with_scrollback(cols: u16, rows: u16, scrollback: usize) -> Result<Self, EngineError> {
        let size = check_size(cols, rows)?;
        let config = Config {
            scrolling_history: scrollback,
            ..Config::default()
        };

        let event_proxy = EventProxy::new();
        let term = Term::new(config, &size, event_proxy.clone());

        let mut terminal = Self {
            term,
            parser: ansi::Processor::new(),
            event_proxy,
            modes: ModeTracker::new(),
            palette: PaletteSnapshot::new(),
            damage: DamageState::new(rows),
        };
        // A fresh terminal starts fully damaged.
        terminal.harvest_damage(None);
        Ok(terminal)
    }

    fn cursor_mark(&self) -> CursorMark {
        let point = self.term.grid().cursor.point;
        CursorMark {
            point,
            cell: self.term.grid()[point.line][point.column].clone(),
        }
    }

    /// Viewport line of `mark` if the cursor is still there and its cell is
    /// unchanged.
    fn idle_cursor_line(&self, mark: Option<&CursorMark>) -> Option<usize> {
        let mark = mark?;
        let grid = self.term.grid();
        let cell = &grid[mark.point.line][mark.point.column];
        if grid.cursor.point != mark.point || *cell != mark.cell {
            return None;
        }
        usize::try_from(mark.point.line.0)
            .ok()
            .map(|line| line + grid.display_offset())
    }

    /// Move the terminal's own damage into our row bits and reset it.
    ///
    /// Only called after mutations: querying alacritty's damage always
    /// re-damages the cursor line. With a `mark`, that line is skipped when
    /// its only damage is the untouched cursor cell.
    fn harvest_damage(&mut self, mark: Option<&CursorMark>) {
        let idle = self.idle_cursor_line(mark);
        let cursor_col = self.term.grid().cursor.point.column.0;
        let lines = match self.term.damage() {
            TermDamage::Full => None,
            TermDamage::Partial(iter) => Some(
                iter.filter(|d| {
                    Some(d.line) != idle || d.left != cursor_col || d.right != cursor_col
                })
                .map(|d| d.line)
                .collect::<Vec<_>>(),
            ),
        };
        match lines {
            None => self.damage.raise(RedrawReasons::CLEAR),
            Some(lines) => {
                for line in lines {
                    if let Ok(row) = u16::try_from(line) {
                        self.damage.mark_row(row);
                    }
                }
            }
        }
        self.term.reset_damage();
    }

    fn display_offset(&self) -> usize {
        self.term.grid().display_offset()
    }

    fn viewport_cell(&self, row: u16, col: u16) -> Option<&AlacCell> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        let line = Line(i32::from(row) - self.display_offset() as i32);
        Some(&self.term.grid()[line][Column(col as usize)])
    }
}

impl VtEngine for VtTerminal {
    /// Feed raw PTY output bytes into the terminal.
    fn feed(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        if bytes.is_empty() {
            return Ok(());
        }
        let mark = self.cursor_mark();
        self.parser.advance(&mut self.term, bytes);

        if self.modes.advance(bytes) {
            self.damage.raise(RedrawReasons::REVERSE_COLORS);
        }

        let changes = self.palette.update(self.term.colors());
        if !changes.is_empty() {
            log::trace!("palette changed: {changes:?}");
            self.damage.raise(RedrawReasons::PALETTE);
            for change in changes {
                self.event_proxy.push(EngineEvent::Palette(change));
            }
        }

        self.harvest_damage(Some(&mark));
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) -> Result<(), EngineError> {
        let size = check_size(cols, rows)?;
        self.term.resize(size);
        self.damage.resize(rows);
        self.damage.raise(RedrawReasons::CLEAR);
        self.term.reset_damage();
        Ok(())
    }

    fn scroll_viewport(&mut self, scroll: ViewportScroll) -> Result<(), EngineError> {
        let before = self.viewport_top_row();
        let mark = self.cursor_mark();
        let scroll = match scroll {
            // Alacritty counts positive deltas toward history.
            ViewportScroll::Delta(lines) => Scroll::Delta(lines.saturating_neg()),
            ViewportScroll::Top => Scroll::Top,
            ViewportScroll::Bottom => Scroll::Bottom,
        };
        self.term.scroll_display(scroll);
        if self.viewport_top_row() != before {
            self.damage.raise(RedrawReasons::CLEAR);
        }
        self.harvest_damage(Some(&mark));
        Ok(())
    }

    fn cols(&self) -> u16 {
        self.term.columns() as u16
    }

    fn rows(&self) -> u16 {
        self.term.screen_lines() as u16
    }

    fn cursor(&self) -> Option<CursorPoint> {
        let point = self.term.grid().cursor.point;
        Some(CursorPoint {
            row: u16::try_from(point.line.0).ok()?,
            col: u16::try_from(point.column.0).ok()?,
        })
    }

    fn cell(&self, row: u16, col: u16) -> Option<Cell> {
        self.viewport_cell(row, col).map(convert_cell)
    }

    fn hyperlink_uri(&self, row: u16, col: u16) -> Option<String> {
        let link = self.viewport_cell(row, col)?.hyperlink()?;
        Some(link.uri().to_owned())
    }

    fn viewport_top_row(&self) -> u64 {
        let grid = self.term.grid();
        grid.history_size().saturating_sub(grid.display_offset()) as u64
    }

    fn input_modes(&self) -> InputModes {
        let mode = *self.term.mode();
        InputModes {
            app_cursor: mode.contains(TermMode::APP_CURSOR),
            bracketed_paste: mode.contains(TermMode::BRACKETED_PASTE),
            mouse_x10: mode.contains(TermMode::MOUSE_REPORT_CLICK),
            mouse_button_event: mode.contains(TermMode::MOUSE_DRAG),
            mouse_any_event: mode.contains(TermMode::MOUSE_MOTION),
            mouse_sgr: mode.contains(TermMode::SGR_MOUSE),
            reverse_video: self.modes.reverse_video(),
        }
    }

    fn damage(&self) -> &DamageState {
        &self.damage
    }

    fn damage_mut(&mut self) -> &mut DamageState {
        &mut self.damage
    }

    fn take_events(&mut self) -> Vec<EngineEvent> {
        self.event_proxy.drain()
    }
}

//! A scriptable engine for exercising bridge logic without a real parser.
//!
//! History is kept as a chain of variable-size row segments, the way paged
//! engines store scrollback, so absolute row counting has to walk segments.

use std::collections::HashMap;

use tether_vt::{
    Cell, CursorPoint, DamageState, EngineError, EngineEvent, InputModes, ViewportScroll,
    VtEngine,
};

pub(crate) struct FakeEngine {
    cols: u16,
    rows: u16,
    /// Row counts of each storage segment, oldest first.
    segments: Vec<u64>,
    /// Viewport top as (segment, row within segment).
    top: (usize, u64),
    cells: Vec<Vec<Cell>>,
    links: HashMap<(u16, u16), String>,
    cursor: Option<CursorPoint>,
    modes: InputModes,
    damage: DamageState,
    pending: Vec<EngineEvent>,
    events: Vec<EngineEvent>,
    fed: Vec<u8>,
    fail_feed: bool,
}

impl FakeEngine {
    pub(crate) fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            segments: vec![rows as u64],
            top: (0, 0),
            cells: vec![vec![Cell::default(); cols as usize]; rows as usize],
            links: HashMap::new(),
            cursor: Some(CursorPoint { row: 0, col: 0 }),
            modes: InputModes::default(),
            damage: DamageState::new(rows),
            pending: Vec::new(),
            events: Vec::new(),
            fed: Vec::new(),
            fail_feed: false,
        }
    }

    fn total_rows(&self) -> u64 {
        self.segments.iter().sum()
    }

    fn bottom_top_row(&self) -> u64 {
        self.total_rows().saturating_sub(self.rows as u64)
    }

    /// Locate an absolute row in the segment chain.
    fn locate(&self, mut absolute: u64) -> (usize, u64) {
        for (index, &len) in self.segments.iter().enumerate() {
            if absolute < len {
                return (index, absolute);
            }
            absolute -= len;
        }
        let last = self.segments.len() - 1;
        (last, self.segments[last].saturating_sub(1))
    }

    /// Append a segment of `rows` rows and follow the output.
    pub(crate) fn push_segment(&mut self, rows: u64) {
        self.segments.push(rows);
        self.top = self.locate(self.bottom_top_row());
    }

    pub(crate) fn set_cell(&mut self, row: u16, col: u16, cell: Cell) {
        self.cells[row as usize][col as usize] = cell;
        self.damage.mark_row(row);
    }

    pub(crate) fn set_text(&mut self, row: u16, text: &str) {
        for (col, c) in text.chars().enumerate() {
            let mut cell = self.cells[row as usize][col].clone();
            cell.c = c;
            self.set_cell(row, col as u16, cell);
        }
    }

    /// Flag a cell as linked, optionally recording its URI.
    pub(crate) fn set_hyperlink(&mut self, row: u16, col: u16, uri: Option<&str>) {
        self.cells[row as usize][col as usize].hyperlink = true;
        match uri {
            Some(uri) => {
                self.links.insert((row, col), uri.to_owned());
            }
            None => {
                self.links.remove(&(row, col));
            }
        }
    }

    pub(crate) fn set_cursor(&mut self, cursor: Option<CursorPoint>) {
        self.cursor = cursor;
    }

    pub(crate) fn set_modes(&mut self, modes: InputModes) {
        self.modes = modes;
    }

    /// Queue an event for delivery by the next feed.
    pub(crate) fn queue_event(&mut self, event: EngineEvent) {
        self.pending.push(event);
    }

    pub(crate) fn fail_next_feed(&mut self) {
        self.fail_feed = true;
    }

    pub(crate) fn fed(&self) -> &[u8] {
        &self.fed
    }
}

impl VtEngine for FakeEngine {
    fn feed(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        self.events.append(&mut self.pending);
        if std::mem::take(&mut self.fail_feed) {
            return Err(EngineError::InvalidSize {
                cols: self.cols,
                rows: self.rows,
            });
        }
        self.fed.extend_from_slice(bytes);
        if let Some(cursor) = self.cursor {
            self.damage.mark_row(cursor.row);
        }
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) -> Result<(), EngineError> {
        if cols == 0 || rows == 0 {
            return Err(EngineError::InvalidSize { cols, rows });
        }
        self.cols = cols;
        self.rows = rows;
        self.cells = vec![vec![Cell::default(); cols as usize]; rows as usize];
        self.links.clear();
        self.damage.resize(rows);
        self.damage.raise(tether_vt::RedrawReasons::CLEAR);
        Ok(())
    }

    fn scroll_viewport(&mut self, scroll: ViewportScroll) -> Result<(), EngineError> {
        let current = self.viewport_top_row();
        let bottom = self.bottom_top_row();
        let target = match scroll {
            ViewportScroll::Top => 0,
            ViewportScroll::Bottom => bottom,
            ViewportScroll::Delta(lines) => {
                (current as i64 + lines as i64).clamp(0, bottom as i64) as u64
            }
        };
        self.top = self.locate(target);
        Ok(())
    }

    fn cols(&self) -> u16 {
        self.cols
    }

    fn rows(&self) -> u16 {
        self.rows
    }

    fn cursor(&self) -> Option<CursorPoint> {
        self.cursor
    }

    fn cell(&self, row: u16, col: u16) -> Option<Cell> {
        self.cells.get(row as usize)?.get(col as usize).cloned()
    }

    fn hyperlink_uri(&self, row: u16, col: u16) -> Option<String> {
        self.links.get(&(row, col)).cloned()
    }

    fn viewport_top_row(&self) -> u64 {
        let (segment, offset) = self.top;
        let mut absolute = offset;
        let mut index = segment;
        while index > 0 {
            index -= 1;
            absolute += self.segments[index];
        }
        absolute
    }

    fn input_modes(&self) -> InputModes {
        self.modes
    }

    fn damage(&self) -> &DamageState {
        &self.damage
    }

    fn damage_mut(&mut self) -> &mut DamageState {
        &mut self.damage
    }

    fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_walk_counts_absolute_rows() {
        let mut engine = FakeEngine::new(4, 2);
        assert_eq!(engine.viewport_top_row(), 0);

        engine.push_segment(5);
        engine.push_segment(3);
        // 2 + 5 + 3 rows, viewport of 2 at the bottom.
        assert_eq!(engine.viewport_top_row(), 8);

        engine.scroll_viewport(ViewportScroll::Delta(-4)).unwrap();
        assert_eq!(engine.viewport_top_row(), 4);
        assert_eq!(engine.top, (1, 2));

        engine.scroll_viewport(ViewportScroll::Top).unwrap();
        assert_eq!(engine.viewport_top_row(), 0);
        engine.scroll_viewport(ViewportScroll::Delta(100)).unwrap();
        assert_eq!(engine.viewport_top_row(), 8);
    }
}

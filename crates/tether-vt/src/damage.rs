//! Per-row damage bits and the sticky reasons that force a full redraw.

use bitflags::bitflags;

bitflags! {
    /// Reasons the whole viewport must be redrawn on the next report.
    ///
    /// Each reason is sticky until a dirty-row report consumes it.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RedrawReasons: u8 {
        /// The screen was cleared, resized or otherwise fully damaged.
        const CLEAR          = 0b0001;
        /// A palette entry or a default color changed.
        const PALETTE        = 0b0010;
        /// Reverse video (DECSCNM) was toggled.
        const REVERSE_COLORS = 0b0100;
        /// The IME preedit overlay changed.
        const PREEDIT        = 0b1000;
    }
}

/// Damage bookkeeping an engine exposes to the dirty-row tracker.
///
/// Rows are viewport-relative and 0-based.
#[derive(Clone, Debug, Default)]
pub struct DamageState {
    rows: Vec<bool>,
    reasons: RedrawReasons,
}

impl DamageState {
    /// Create state for `rows` viewport rows, all clean.
    pub fn new(rows: u16) -> Self {
        Self {
            rows: vec![false; rows as usize],
            reasons: RedrawReasons::empty(),
        }
    }

    /// Number of rows tracked.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Dirty bit of `row`, or `None` if the row does not exist.
    pub fn is_row_dirty(&self, row: u16) -> Option<bool> {
        self.rows.get(row as usize).copied()
    }

    /// Mark `row` dirty. Rows outside the viewport are ignored.
    pub fn mark_row(&mut self, row: u16) {
        if let Some(bit) = self.rows.get_mut(row as usize) {
            *bit = true;
        }
    }

    pub fn clear_row(&mut self, row: u16) {
        if let Some(bit) = self.rows.get_mut(row as usize) {
            *bit = false;
        }
    }

    /// Currently pending full-redraw reasons.
    pub fn reasons(&self) -> RedrawReasons {
        self.reasons
    }

    /// Add a full-redraw reason.
    pub fn raise(&mut self, reason: RedrawReasons) {
        self.reasons |= reason;
    }

    /// Return and clear all pending full-redraw reasons.
    pub fn take_reasons(&mut self) -> RedrawReasons {
        std::mem::take(&mut self.reasons)
    }

    /// Track a new viewport height.
    ///
    /// Row bits are preserved where rows still exist; the caller is expected
    /// to raise [`RedrawReasons::CLEAR`] after a resize.
    pub fn resize(&mut self, rows: u16) {
        self.rows.resize(rows as usize, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_clean() {
        let state = DamageState::new(4);
        assert_eq!(state.len(), 4);
        assert!((0..4).all(|row| state.is_row_dirty(row) == Some(false)));
        assert!(state.reasons().is_empty());
    }

    #[test]
    fn test_out_of_range_rows_are_absent() {
        let mut state = DamageState::new(2);
        state.mark_row(5);
        assert_eq!(state.is_row_dirty(5), None);
        assert_eq!(state.is_row_dirty(1), Some(false));
    }

    #[test]
    fn test_take_reasons_is_one_shot() {
        let mut state = DamageState::new(1);
        state.raise(RedrawReasons::PALETTE);
        state.raise(RedrawReasons::PREEDIT);
        assert_eq!(
            state.take_reasons(),
            RedrawReasons::PALETTE | RedrawReasons::PREEDIT
        );
        assert!(state.take_reasons().is_empty());
    }

    #[test]
    fn test_resize_keeps_surviving_bits() {
        let mut state = DamageState::new(3);
        state.mark_row(1);
        state.resize(5);
        assert_eq!(state.is_row_dirty(1), Some(true));
        assert_eq!(state.is_row_dirty(4), Some(false));
        state.resize(1);
        assert_eq!(state.is_row_dirty(1), None);
    }
}

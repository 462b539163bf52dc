//! Hyperlink lookup at a screen coordinate.

use tether_vt::VtEngine;

/// URI of the hyperlink under a 1-based viewport coordinate.
///
/// Column or row 0, coordinates outside the viewport, unlinked cells and
/// cells whose link the engine no longer knows all yield `None`.
pub fn hyperlink_at<E: VtEngine + ?Sized>(engine: &E, col: u16, row: u16) -> Option<String> {
    if col == 0 || row == 0 {
        return None;
    }
    let (col, row) = (col - 1, row - 1);

    let cell = engine.cell(row, col)?;
    if !cell.hyperlink {
        return None;
    }
    engine.hyperlink_uri(row, col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEngine;

    #[test]
    fn test_origin_is_rejected() {
        let mut engine = FakeEngine::new(4, 2);
        engine.set_hyperlink(0, 0, Some("https://example.com"));
        assert_eq!(hyperlink_at(&engine, 0, 1), None);
        assert_eq!(hyperlink_at(&engine, 1, 0), None);
        assert_eq!(
            hyperlink_at(&engine, 1, 1).as_deref(),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_unlinked_and_out_of_range_cells() {
        let mut engine = FakeEngine::new(4, 2);
        engine.set_hyperlink(1, 3, Some("https://example.com"));
        assert_eq!(hyperlink_at(&engine, 1, 1), None);
        assert_eq!(hyperlink_at(&engine, 5, 1), None);
        assert_eq!(hyperlink_at(&engine, 1, 3), None);
        assert!(hyperlink_at(&engine, 4, 2).is_some());
    }

    #[test]
    fn test_marker_without_table_entry_is_none() {
        let mut engine = FakeEngine::new(2, 1);
        engine.set_hyperlink(0, 1, None);
        assert!(engine.cell(0, 1).map(|c| c.hyperlink).unwrap_or(false));
        assert_eq!(hyperlink_at(&engine, 2, 1), None);
    }
}

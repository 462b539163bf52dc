//! Reporting which viewport rows need repainting.

use log::trace;
use tether_vt::DamageState;

/// Report the rows that changed since the previous report, ascending and
/// 0-based, and clear their dirty bits.
///
/// Any pending full-redraw reason makes every row dirty for this one report
/// and is consumed by it. Rows past the end of the engine's damage state
/// are never reported.
pub fn take_dirty_rows(damage: &mut DamageState, rows: u16) -> Vec<u16> {
    let reasons = damage.take_reasons();
    let forced = !reasons.is_empty();
    if forced {
        trace!("full redraw requested: {:?}", reasons);
    }

    let mut dirty = Vec::new();
    for row in 0..rows {
        match damage.is_row_dirty(row) {
            None => continue,
            Some(bit) if bit || forced => {
                dirty.push(row);
                damage.clear_row(row);
            }
            Some(_) => {}
        }
    }
    dirty
}

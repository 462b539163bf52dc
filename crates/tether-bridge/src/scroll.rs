//! Tracking how far the viewport top moved between reports.

/// Remembers the absolute viewport top row seen at the previous report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollTracker {
    last_top_row: Option<u64>,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signed movement of the viewport top since the previous call.
    ///
    /// Positive means the top moved toward newer rows. The first call only
    /// records a baseline and returns 0. Movements beyond the `i32` range
    /// saturate.
    pub fn take_delta(&mut self, current: u64) -> i32 {
        let delta = match self.last_top_row {
            None => 0,
            Some(last) => {
                let diff = i128::from(current) - i128::from(last);
                diff.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32
            }
        };
        self.last_top_row = Some(current);
        delta
    }

    /// The top row recorded by the last report, if any.
    pub fn last_top_row(&self) -> Option<u64> {
        self.last_top_row
    }
}

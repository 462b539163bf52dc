//! Run-length compression of a row's resolved styles.
//!
//! Columns in a [`StyleRun`] are 1-based and half-open: a run covers
//! `start_col..end_col`. The runs of a row of width `w` partition `1..w + 1`.
//! Index `i` of a per-cell style dump corresponds to column `i + 1`.

use serde::Serialize;
use tether_vt::Style;

use crate::palette::Palette;
use crate::style::{resolve, DefaultColors, ResolvedStyle};

/// Widest row [`encode_style_runs`] covers; its last run ends at `u16::MAX`.
pub const MAX_RUN_WIDTH: usize = u16::MAX as usize - 1;

/// A maximal range of columns sharing one resolved style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StyleRun {
    /// First column, 1-based, inclusive.
    pub start_col: u16,
    /// One past the last column.
    pub end_col: u16,
    #[serde(flatten)]
    pub style: ResolvedStyle,
}

impl StyleRun {
    /// Number of columns covered.
    pub fn len(&self) -> u16 {
        self.end_col - self.start_col
    }

    pub fn is_empty(&self) -> bool {
        self.end_col == self.start_col
    }

    /// Whether 1-based column `col` falls inside this run.
    pub fn contains(&self, col: u16) -> bool {
        (self.start_col..self.end_col).contains(&col)
    }
}

/// Compress a row of cell styles into runs.
///
/// Every cell is resolved and compared on its resolved colors and flags, so
/// cells that share a style identity still split when their resolved values
/// differ, and distinct styles that resolve alike merge.
///
/// Cells past [`MAX_RUN_WIDTH`] are ignored.
pub fn encode_style_runs<I>(styles: I, palette: &Palette, defaults: DefaultColors) -> Vec<StyleRun>
where
    I: IntoIterator<Item = Style>,
{
    let mut runs = Vec::new();
    let mut styles = styles.into_iter();

    let Some(first) = styles.next() else {
        return runs;
    };
    let mut current = StyleRun {
        start_col: 1,
        end_col: 1,
        style: resolve(&first, palette, defaults),
    };

    let mut col: u16 = 2;
    for style in styles.take(MAX_RUN_WIDTH - 1) {
        let resolved = resolve(&style, palette, defaults);
        if resolved != current.style {
            current.end_col = col;
            runs.push(current);
            current = StyleRun {
                start_col: col,
                end_col: col,
                style: resolved,
            };
        }
        col += 1;
    }

    current.end_col = col;
    runs.push(current);
    runs
}

/// Expand runs back to one resolved style per column.
pub fn expand_style_runs(runs: &[StyleRun]) -> Vec<ResolvedStyle> {
    runs.iter()
        .flat_map(|run| std::iter::repeat(run.style).take(run.len() as usize))
        .collect()
}

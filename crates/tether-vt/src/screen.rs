use alacritty_terminal::term::cell::{Cell as AlacCell, Flags as AlacFlags};
use alacritty_terminal::term::color::Colors;
use alacritty_terminal::vte::ansi::{Color, NamedColor, Rgb as AlacRgb};

use crate::cell::{Cell, CellWidth, ColorRef, Rgb, Style, StyleAttrs, Underline};
use crate::engine::PaletteEvent;

/// Number of indexed palette entries tracked for change events.
pub(crate) const PALETTE_LEN: usize = 256;

/// Map an alacritty color to a reference the bridge can resolve against its
/// own palette and defaults.
pub(crate) fn convert_color(color: &Color) -> ColorRef {
    match color {
        Color::Spec(rgb) => ColorRef::Rgb(Rgb::new(rgb.r, rgb.g, rgb.b)),
        Color::Indexed(idx) => ColorRef::Palette(*idx),
        Color::Named(named) => {
            let idx = *named as usize;
            let dim_black = NamedColor::DimBlack as usize;
            let dim_white = NamedColor::DimWhite as usize;
            if idx < 16 {
                ColorRef::Palette(idx as u8)
            } else if (dim_black..=dim_white).contains(&idx) {
                // Dim variants share the slot of their normal color; faint is
                // carried separately as an attribute.
                ColorRef::Palette((idx - dim_black) as u8)
            } else {
                ColorRef::Default
            }
        }
    }
}

fn convert_style(cell: &AlacCell) -> Style {
    let flags = cell.flags;
    let mut attrs = StyleAttrs::empty();
    if flags.contains(AlacFlags::BOLD) {
        attrs |= StyleAttrs::BOLD;
    }
    if flags.contains(AlacFlags::ITALIC) {
        attrs |= StyleAttrs::ITALIC;
    }
    if flags.contains(AlacFlags::DIM) {
        attrs |= StyleAttrs::FAINT;
    }
    if flags.contains(AlacFlags::INVERSE) {
        attrs |= StyleAttrs::INVERSE;
    }
    if flags.contains(AlacFlags::HIDDEN) {
        attrs |= StyleAttrs::INVISIBLE;
    }
    if flags.contains(AlacFlags::STRIKEOUT) {
        attrs |= StyleAttrs::STRIKETHROUGH;
    }

    let underline = if flags.contains(AlacFlags::DOUBLE_UNDERLINE) {
        Underline::Double
    } else if flags.contains(AlacFlags::UNDERCURL) {
        Underline::Curly
    } else if flags.contains(AlacFlags::DOTTED_UNDERLINE) {
        Underline::Dotted
    } else if flags.contains(AlacFlags::DASHED_UNDERLINE) {
        Underline::Dashed
    } else if flags.contains(AlacFlags::UNDERLINE) {
        Underline::Single
    } else {
        Underline::None
    };

    Style {
        fg: convert_color(&cell.fg),
        bg: convert_color(&cell.bg),
        attrs,
        underline,
    }
}

/// Convert an alacritty Cell to our Cell.
pub(crate) fn convert_cell(cell: &AlacCell) -> Cell {
    let width = if cell.flags.contains(AlacFlags::WIDE_CHAR) {
        CellWidth::Wide
    } else if cell
        .flags
        .intersects(AlacFlags::WIDE_CHAR_SPACER | AlacFlags::LEADING_WIDE_CHAR_SPACER)
    {
        CellWidth::Spacer
    } else {
        CellWidth::Narrow
    };

    Cell {
        c: cell.c,
        zerowidth: cell.zerowidth().map(<[char]>::to_vec).unwrap_or_default(),
        style: convert_style(cell),
        width,
        hyperlink: cell.hyperlink().is_some(),
    }
}

/// Last observed state of the indexed palette.
pub(crate) struct PaletteSnapshot {
    entries: [Option<AlacRgb>; PALETTE_LEN],
}

impl PaletteSnapshot {
    pub(crate) fn new() -> Self {
        Self {
            entries: [None; PALETTE_LEN],
        }
    }

    /// Diff `colors` against the snapshot, record it, and describe the change.
    pub(crate) fn update(&mut self, colors: &Colors) -> Vec<PaletteEvent> {
        let mut events = Vec::new();
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            let current = colors[idx];
            if current == *entry {
                continue;
            }
            *entry = current;
            let index = idx as u8;
            events.push(match current {
                Some(rgb) => PaletteEvent::Set {
                    index,
                    color: Rgb::new(rgb.r, rgb.g, rgb.b),
                },
                None => PaletteEvent::Reset(index),
            });
        }

        let all_resets = events
            .iter()
            .all(|event| matches!(event, PaletteEvent::Reset(_)));
        if events.len() > 1 && all_resets && self.entries.iter().all(Option::is_none) {
            return vec![PaletteEvent::ResetAll];
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors_map_to_palette_slots() {
        assert_eq!(
            convert_color(&Color::Named(NamedColor::Red)),
            ColorRef::Palette(1)
        );
        assert_eq!(
            convert_color(&Color::Named(NamedColor::BrightRed)),
            ColorRef::Palette(9)
        );
        assert_eq!(
            convert_color(&Color::Named(NamedColor::DimRed)),
            ColorRef::Palette(1)
        );
        assert_eq!(
            convert_color(&Color::Named(NamedColor::Foreground)),
            ColorRef::Default
        );
        assert_eq!(
            convert_color(&Color::Named(NamedColor::Background)),
            ColorRef::Default
        );
    }

    #[test]
    fn test_indexed_and_direct_colors() {
        assert_eq!(convert_color(&Color::Indexed(200)), ColorRef::Palette(200));
        assert_eq!(
            convert_color(&Color::Spec(AlacRgb { r: 1, g: 2, b: 3 })),
            ColorRef::Rgb(Rgb::new(1, 2, 3))
        );
    }

    #[test]
    fn test_cell_flags_convert() {
        let mut cell = AlacCell::default();
        cell.c = 'x';
        cell.flags = AlacFlags::BOLD | AlacFlags::UNDERCURL | AlacFlags::HIDDEN;
        let converted = convert_cell(&cell);
        assert_eq!(converted.c, 'x');
        assert_eq!(
            converted.style.attrs,
            StyleAttrs::BOLD | StyleAttrs::INVISIBLE
        );
        assert_eq!(converted.style.underline, Underline::Curly);
        assert_eq!(converted.width, CellWidth::Narrow);
        assert!(!converted.hyperlink);
    }

    #[test]
    fn test_palette_snapshot_reports_changes_once() {
        let mut snapshot = PaletteSnapshot::new();
        let mut colors = Colors::default();
        assert!(snapshot.update(&colors).is_empty());

        colors[3] = Some(AlacRgb { r: 1, g: 2, b: 3 });
        assert_eq!(
            snapshot.update(&colors),
            vec![PaletteEvent::Set {
                index: 3,
                color: Rgb::new(1, 2, 3)
            }]
        );
        assert!(snapshot.update(&colors).is_empty());

        colors[3] = None;
        assert_eq!(snapshot.update(&colors), vec![PaletteEvent::Reset(3)]);
    }

    #[test]
    fn test_palette_snapshot_collapses_full_reset() {
        let mut snapshot = PaletteSnapshot::new();
        let mut colors = Colors::default();
        colors[1] = Some(AlacRgb { r: 9, g: 9, b: 9 });
        colors[2] = Some(AlacRgb { r: 8, g: 8, b: 8 });
        snapshot.update(&colors);

        colors[1] = None;
        colors[2] = None;
        assert_eq!(snapshot.update(&colors), vec![PaletteEvent::ResetAll]);
    }
}

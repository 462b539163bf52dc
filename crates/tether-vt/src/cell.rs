use bitflags::bitflags;
use serde::Serialize;

/// RGB color value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a packed `0xRRGGBB` value.
    pub const fn from_u32(hex: u32) -> Self {
        Self {
            r: (hex >> 16) as u8,
            g: (hex >> 8) as u8,
            b: hex as u8,
        }
    }
}

bitflags! {
    /// Text attributes carried by a style, as set by SGR.
    ///
    /// Underline is not part of this set; see [`Underline`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StyleAttrs: u8 {
        const BOLD          = 0b0000_0001;
        const ITALIC        = 0b0000_0010;
        const FAINT         = 0b0000_0100;
        const BLINK         = 0b0000_1000;
        const INVERSE       = 0b0001_0000;
        const INVISIBLE     = 0b0010_0000;
        const STRIKETHROUGH = 0b0100_0000;
    }
}

/// Underline kind of a style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

/// Reference to a color as stored by the engine, before palette lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorRef {
    /// The configured default foreground or background.
    #[default]
    Default,
    /// An entry of the 256-color palette.
    Palette(u8),
    /// A direct 24-bit color.
    Rgb(Rgb),
}

/// Style descriptor attached to a cell.
///
/// Two cells with equal `Style` values share a style identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: ColorRef,
    pub bg: ColorRef,
    pub attrs: StyleAttrs,
    pub underline: Underline,
}

/// How many columns a cell's glyph occupies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellWidth {
    #[default]
    Narrow,
    /// First column of a double-width glyph.
    Wide,
    /// Placeholder column after a wide glyph (or before one that wrapped).
    Spacer,
}

/// A single cell of the viewport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// The character displayed in this cell.
    pub c: char,
    /// Combining characters stacked on `c`.
    pub zerowidth: Vec<char>,
    pub style: Style,
    pub width: CellWidth,
    /// Whether an OSC 8 hyperlink is attached to this cell.
    pub hyperlink: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            c: ' ',
            zerowidth: Vec::new(),
            style: Style::default(),
            width: CellWidth::Narrow,
            hyperlink: false,
        }
    }
}

impl Cell {
    /// Append the visible text of this cell to `out`.
    ///
    /// Spacer cells contribute nothing.
    pub fn push_text(&self, out: &mut String) {
        if self.width == CellWidth::Spacer {
            return;
        }
        out.push(self.c);
        out.extend(self.zerowidth.iter());
    }
}

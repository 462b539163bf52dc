//! Color and style resolution.
//!
//! Resolution is a pure function of the style, the palette and the default
//! colors, which is what lets style runs compare resolved values.

use bitflags::bitflags;
use serde::{Serialize, Serializer};
use tether_vt::{ColorRef, Rgb, Style, StyleAttrs, Underline};

use crate::palette::Palette;

bitflags! {
    /// Attribute byte of a resolved style.
    ///
    /// Bit positions are part of the external record format. Bit 7 is
    /// reserved and always zero.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StyleFlags: u8 {
        const INVERSE       = 0x01;
        const BOLD          = 0x02;
        const ITALIC        = 0x04;
        const UNDERLINE     = 0x08;
        const FAINT         = 0x10;
        const INVISIBLE     = 0x20;
        const STRIKETHROUGH = 0x40;
    }
}

impl StyleFlags {
    /// Flags describing the style's own attributes.
    ///
    /// Any underline kind maps to [`StyleFlags::UNDERLINE`].
    pub fn from_style(style: &Style) -> Self {
        let attrs = style.attrs;
        let mut flags = StyleFlags::empty();
        flags.set(StyleFlags::INVERSE, attrs.contains(StyleAttrs::INVERSE));
        flags.set(StyleFlags::BOLD, attrs.contains(StyleAttrs::BOLD));
        flags.set(StyleFlags::ITALIC, attrs.contains(StyleAttrs::ITALIC));
        flags.set(StyleFlags::UNDERLINE, style.underline != Underline::None);
        flags.set(StyleFlags::FAINT, attrs.contains(StyleAttrs::FAINT));
        flags.set(StyleFlags::INVISIBLE, attrs.contains(StyleAttrs::INVISIBLE));
        flags.set(
            StyleFlags::STRIKETHROUGH,
            attrs.contains(StyleAttrs::STRIKETHROUGH),
        );
        flags
    }
}

fn serialize_flags<S: Serializer>(flags: &StyleFlags, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(flags.bits())
}

/// Foreground and background used where a style names no color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefaultColors {
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Default for DefaultColors {
    fn default() -> Self {
        Self {
            fg: Rgb::new(0xFF, 0xFF, 0xFF),
            bg: Rgb::new(0x00, 0x00, 0x00),
        }
    }
}

impl DefaultColors {
    /// The pair with foreground and background exchanged (reverse video).
    pub fn swapped(self) -> Self {
        Self {
            fg: self.bg,
            bg: self.fg,
        }
    }
}

/// Final colors and attribute flags of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedStyle {
    pub fg: Rgb,
    pub bg: Rgb,
    #[serde(serialize_with = "serialize_flags")]
    pub flags: StyleFlags,
}

/// Look up a color reference, falling back to `default`.
pub fn resolve_color(color: ColorRef, palette: &Palette, default: Rgb) -> Rgb {
    match color {
        ColorRef::Rgb(rgb) => rgb,
        ColorRef::Palette(index) => palette.get(index),
        ColorRef::Default => default,
    }
}

/// Resolve a style to concrete colors.
///
/// Inverse swaps the colors first; invisible then paints the foreground
/// with the (possibly swapped) background. Flags always describe the
/// original style.
pub fn resolve(style: &Style, palette: &Palette, defaults: DefaultColors) -> ResolvedStyle {
    let mut fg = resolve_color(style.fg, palette, defaults.fg);
    let mut bg = resolve_color(style.bg, palette, defaults.bg);

    if style.attrs.contains(StyleAttrs::INVERSE) {
        std::mem::swap(&mut fg, &mut bg);
    }
    if style.attrs.contains(StyleAttrs::INVISIBLE) {
        fg = bg;
    }

    ResolvedStyle {
        fg,
        bg,
        flags: StyleFlags::from_style(style),
    }
}

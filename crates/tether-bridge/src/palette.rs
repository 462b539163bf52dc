//! The session-owned 256-color palette.

use tether_vt::{PaletteEvent, Rgb};

pub const PALETTE_SIZE: usize = 256;

/// Base 16 colors ("Tomorrow Night").
const BASE16: [u32; 16] = [
    0x1D1F21, // Black
    0xCC6666, // Red
    0xB5BD68, // Green
    0xF0C674, // Yellow
    0x81A2BE, // Blue
    0xB294BB, // Magenta
    0x8ABEB7, // Cyan
    0xC5C8C6, // White
    0x666666, // Bright Black
    0xD54E53, // Bright Red
    0xB9CA4A, // Bright Green
    0xE7C547, // Bright Yellow
    0x7AA6DA, // Bright Blue
    0xC397D8, // Bright Magenta
    0x70C0B1, // Bright Cyan
    0xEAEAEA, // Bright White
];

const fn cube_level(v: usize) -> u8 {
    if v == 0 {
        0
    } else {
        (55 + 40 * v) as u8
    }
}

const fn build_default_palette() -> [Rgb; PALETTE_SIZE] {
    let mut colors = [Rgb::new(0, 0, 0); PALETTE_SIZE];

    let mut i = 0;
    while i < 16 {
        colors[i] = Rgb::from_u32(BASE16[i]);
        i += 1;
    }

    // 216-color cube (indices 16..232).
    let mut n = 0;
    while n < 216 {
        colors[16 + n] = Rgb::new(
            cube_level(n / 36),
            cube_level((n / 6) % 6),
            cube_level(n % 6),
        );
        n += 1;
    }

    // Grayscale ramp (indices 232..256).
    let mut g = 0;
    while g < 24 {
        let v = (8 + 10 * g) as u8;
        colors[232 + g] = Rgb::new(v, v, v);
        g += 1;
    }

    colors
}

/// Colors every palette entry returns to when reset.
pub const DEFAULT_PALETTE: [Rgb; PALETTE_SIZE] = build_default_palette();

/// The active palette plus a mask of entries explicitly changed by the
/// application.
///
/// A mask bit is set iff the entry differs from [`DEFAULT_PALETTE`] because
/// of an explicit set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
    mask: [u64; PALETTE_SIZE / 64],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE,
            mask: [0; PALETTE_SIZE / 64],
        }
    }
}

impl Palette {
    pub fn get(&self, index: u8) -> Rgb {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.colors
    }

    /// Whether `index` holds an explicitly set, non-default color.
    pub fn is_set(&self, index: u8) -> bool {
        let (word, bit) = mask_position(index);
        self.mask[word] & bit != 0
    }

    fn set_mask(&mut self, index: u8, on: bool) {
        let (word, bit) = mask_position(index);
        if on {
            self.mask[word] |= bit;
        } else {
            self.mask[word] &= !bit;
        }
    }

    /// Set an entry. Returns whether the visible color changed.
    pub fn set(&mut self, index: u8, color: Rgb) -> bool {
        let changed = self.colors[index as usize] != color;
        self.colors[index as usize] = color;
        self.set_mask(index, color != DEFAULT_PALETTE[index as usize]);
        changed
    }

    /// Restore one entry from the default table.
    pub fn reset(&mut self, index: u8) -> bool {
        self.set(index, DEFAULT_PALETTE[index as usize])
    }

    /// Restore every masked entry and clear the mask.
    pub fn reset_all(&mut self) -> bool {
        let mut changed = false;
        for index in 0..=u8::MAX {
            if self.is_set(index) {
                changed |= self.reset(index);
            }
        }
        self.mask = [0; PALETTE_SIZE / 64];
        changed
    }

    /// Apply a palette change reported by the engine.
    pub fn apply(&mut self, event: PaletteEvent) -> bool {
        match event {
            PaletteEvent::Set { index, color } => self.set(index, color),
            PaletteEvent::Reset(index) => self.reset(index),
            PaletteEvent::ResetAll => self.reset_all(),
        }
    }
}

fn mask_position(index: u8) -> (usize, u64) {
    (index as usize / 64, 1u64 << (index % 64))
}

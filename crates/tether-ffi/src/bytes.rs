//! Owned byte buffers handed across the C boundary, and the fixed-size
//! records packed into them.

use std::ptr;

use tether_bridge::{ResolvedStyle, StyleRun};

/// A byte buffer owned by the library until released with
/// `tether_vt_bytes_free`.
///
/// A null `ptr` means "no result". A non-null `ptr` with `len == 0` is an
/// empty but present result and must still be released.
#[repr(C)]
#[derive(Debug)]
pub struct TetherBytes {
    pub ptr: *const u8,
    pub len: usize,
}

impl TetherBytes {
    pub fn null() -> Self {
        Self {
            ptr: ptr::null(),
            len: 0,
        }
    }

    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let boxed = bytes.into_boxed_slice();
        let len = boxed.len();
        let ptr = Box::into_raw(boxed) as *const u8;
        Self { ptr, len }
    }

    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Release a buffer produced by [`TetherBytes::from_vec`].
    ///
    /// # Safety
    ///
    /// `self` must come from `from_vec` and not have been released already.
    pub unsafe fn release(self) {
        if self.ptr.is_null() {
            return;
        }
        let slice = ptr::slice_from_raw_parts_mut(self.ptr as *mut u8, self.len);
        drop(Box::from_raw(slice));
    }
}

impl From<Option<Vec<u8>>> for TetherBytes {
    fn from(bytes: Option<Vec<u8>>) -> Self {
        bytes.map_or_else(Self::null, Self::from_vec)
    }
}

/// Size of one packed cell style: fg rgb, bg rgb, flags, reserved.
pub const CELL_STYLE_LEN: usize = 8;

/// Size of one packed style run: start and end column (u16 LE), then a
/// cell style record.
pub const STYLE_RUN_LEN: usize = 4 + CELL_STYLE_LEN;

pub fn push_cell_style(out: &mut Vec<u8>, style: &ResolvedStyle) {
    out.extend_from_slice(&[
        style.fg.r,
        style.fg.g,
        style.fg.b,
        style.bg.r,
        style.bg.g,
        style.bg.b,
        style.flags.bits(),
        0,
    ]);
}

pub fn encode_cell_styles(styles: &[ResolvedStyle]) -> Vec<u8> {
    let mut out = Vec::with_capacity(styles.len() * CELL_STYLE_LEN);
    for style in styles {
        push_cell_style(&mut out, style);
    }
    out
}

pub fn encode_style_runs(runs: &[StyleRun]) -> Vec<u8> {
    let mut out = Vec::with_capacity(runs.len() * STYLE_RUN_LEN);
    for run in runs {
        out.extend_from_slice(&run.start_col.to_le_bytes());
        out.extend_from_slice(&run.end_col.to_le_bytes());
        push_cell_style(&mut out, &run.style);
    }
    out
}

/// Row indices as consecutive little-endian u16 values.
pub fn encode_rows(rows: &[u16]) -> Vec<u8> {
    rows.iter().flat_map(|row| row.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_bridge::{Rgb, StyleFlags};

    fn style() -> ResolvedStyle {
        ResolvedStyle {
            fg: Rgb::new(1, 2, 3),
            bg: Rgb::new(4, 5, 6),
            flags: StyleFlags::BOLD | StyleFlags::UNDERLINE,
        }
    }

    #[test]
    fn test_cell_style_record() {
        assert_eq!(encode_cell_styles(&[style()]), vec![1, 2, 3, 4, 5, 6, 0x0A, 0]);
    }

    #[test]
    fn test_style_run_record() {
        let run = StyleRun {
            start_col: 1,
            end_col: 0x0102,
            style: style(),
        };
        assert_eq!(
            encode_style_runs(&[run]),
            vec![1, 0, 0x02, 0x01, 1, 2, 3, 4, 5, 6, 0x0A, 0]
        );
    }

    #[test]
    fn test_rows_little_endian() {
        assert_eq!(encode_rows(&[1, 0x0203]), vec![1, 0, 3, 2]);
    }

    #[test]
    fn test_header_matches_record_layout() {
        let header = include_str!("../include/tether_vt.h");
        assert!(header.contains(&format!("#define TETHER_VT_CELL_STYLE_LEN {CELL_STYLE_LEN}")));
        assert!(header.contains(&format!("#define TETHER_VT_STYLE_RUN_LEN {STYLE_RUN_LEN}")));
        for (name, flag) in [
            ("INVERSE", StyleFlags::INVERSE),
            ("BOLD", StyleFlags::BOLD),
            ("ITALIC", StyleFlags::ITALIC),
            ("UNDERLINE", StyleFlags::UNDERLINE),
            ("FAINT", StyleFlags::FAINT),
            ("INVISIBLE", StyleFlags::INVISIBLE),
            ("STRIKETHROUGH", StyleFlags::STRIKETHROUGH),
        ] {
            let line = format!("#define TETHER_VT_STYLE_{name} {:#04x}", flag.bits());
            assert!(header.contains(&line), "missing {line}");
        }
    }

    #[test]
    fn test_empty_result_is_present() {
        let bytes = TetherBytes::from_vec(Vec::new());
        assert!(!bytes.is_null());
        assert_eq!(bytes.len, 0);
        unsafe { bytes.release() };

        let none = TetherBytes::from(None);
        assert!(none.is_null());
        unsafe { none.release() };
    }
}

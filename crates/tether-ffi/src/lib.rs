//! C ABI for tether sessions.
//!
//! Every function accepts a null terminal handle and reports failure
//! instead of crashing: `int` returns are `0` on success and `-1` on
//! failure, buffer returns are null. Panics never cross the boundary.

#![allow(clippy::missing_safety_doc)]

mod bytes;

use std::os::raw::c_int;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::slice;

use log::warn;
use tether_bridge::{encode_key, Modifiers, Rgb, Session};

pub use bytes::{TetherBytes, CELL_STYLE_LEN, STYLE_RUN_LEN};

/// Opaque terminal handle.
pub type TetherTerminal = Session;

const OK: c_int = 0;
const ERR: c_int = -1;

/// Run `f`, turning a panic into `fallback`.
fn guard<T>(name: &str, fallback: T, f: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            warn!("{name}: panic caught at the C boundary");
            fallback
        }
    }
}

unsafe fn terminal_ref<'a>(name: &str, terminal: *const TetherTerminal) -> Option<&'a TetherTerminal> {
    let terminal = terminal.as_ref();
    if terminal.is_none() {
        warn!("{name}: null terminal handle");
    }
    terminal
}

unsafe fn terminal_mut<'a>(
    name: &str,
    terminal: *mut TetherTerminal,
) -> Option<&'a mut TetherTerminal> {
    let terminal = terminal.as_mut();
    if terminal.is_none() {
        warn!("{name}: null terminal handle");
    }
    terminal
}

fn status<E: std::fmt::Display>(name: &str, result: Result<(), E>) -> c_int {
    match result {
        Ok(()) => OK,
        Err(err) => {
            warn!("{name}: {err}");
            ERR
        }
    }
}

/// Create a terminal. Returns null on invalid dimensions.
#[no_mangle]
pub extern "C" fn tether_vt_terminal_new(cols: u16, rows: u16) -> *mut TetherTerminal {
    guard("terminal_new", std::ptr::null_mut(), || {
        match Session::new(cols, rows) {
            Ok(session) => Box::into_raw(Box::new(session)),
            Err(err) => {
                warn!("terminal_new: {err}");
                std::ptr::null_mut()
            }
        }
    })
}

/// Destroy a terminal. Null is ignored.
#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_free(terminal: *mut TetherTerminal) {
    if !terminal.is_null() {
        drop(Box::from_raw(terminal));
    }
}

#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_set_default_colors(
    terminal: *mut TetherTerminal,
    fg_r: u8,
    fg_g: u8,
    fg_b: u8,
    bg_r: u8,
    bg_g: u8,
    bg_b: u8,
) {
    let Some(session) = terminal_mut("set_default_colors", terminal) else {
        return;
    };
    guard("set_default_colors", (), || {
        session.set_default_colors(Rgb::new(fg_r, fg_g, fg_b), Rgb::new(bg_r, bg_g, bg_b));
    })
}

#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_feed(
    terminal: *mut TetherTerminal,
    bytes: *const u8,
    len: usize,
) -> c_int {
    let Some(session) = terminal_mut("feed", terminal) else {
        return ERR;
    };
    let input = match (bytes.is_null(), len) {
        (_, 0) => &[][..],
        (true, _) => {
            warn!("feed: null buffer with length {len}");
            return ERR;
        }
        (false, _) => slice::from_raw_parts(bytes, len),
    };
    guard("feed", ERR, || status("feed", session.feed(input)))
}

#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_resize(
    terminal: *mut TetherTerminal,
    cols: u16,
    rows: u16,
) -> c_int {
    let Some(session) = terminal_mut("resize", terminal) else {
        return ERR;
    };
    guard("resize", ERR, || status("resize", session.resize(cols, rows)))
}

#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_scroll_viewport(
    terminal: *mut TetherTerminal,
    delta_lines: i32,
) -> c_int {
    let Some(session) = terminal_mut("scroll_viewport", terminal) else {
        return ERR;
    };
    guard("scroll_viewport", ERR, || {
        status("scroll_viewport", session.scroll_viewport(delta_lines))
    })
}

#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_scroll_viewport_top(
    terminal: *mut TetherTerminal,
) -> c_int {
    let Some(session) = terminal_mut("scroll_viewport_top", terminal) else {
        return ERR;
    };
    guard("scroll_viewport_top", ERR, || {
        status("scroll_viewport_top", session.scroll_viewport_top())
    })
}

#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_scroll_viewport_bottom(
    terminal: *mut TetherTerminal,
) -> c_int {
    let Some(session) = terminal_mut("scroll_viewport_bottom", terminal) else {
        return ERR;
    };
    guard("scroll_viewport_bottom", ERR, || {
        status("scroll_viewport_bottom", session.scroll_viewport_bottom())
    })
}

/// Write the 1-based cursor position. Returns false when unavailable; the
/// outputs are left untouched in that case.
#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_cursor_position(
    terminal: *const TetherTerminal,
    col_out: *mut u16,
    row_out: *mut u16,
) -> bool {
    let Some(session) = terminal_ref("cursor_position", terminal) else {
        return false;
    };
    if col_out.is_null() || row_out.is_null() {
        warn!("cursor_position: null output pointer");
        return false;
    }
    match guard("cursor_position", None, || session.cursor_position()) {
        Some((col, row)) => {
            *col_out = col;
            *row_out = row;
            true
        }
        None => false,
    }
}

/// Viewport text as UTF-8, rows separated by `\n`.
#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_dump_viewport(
    terminal: *const TetherTerminal,
) -> TetherBytes {
    let Some(session) = terminal_ref("dump_viewport", terminal) else {
        return TetherBytes::null();
    };
    guard("dump_viewport", TetherBytes::null(), || {
        session
            .dump_viewport()
            .map_err(|err| warn!("dump_viewport: {err}"))
            .ok()
            .map(String::into_bytes)
            .into()
    })
}

#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_dump_viewport_row(
    terminal: *const TetherTerminal,
    row: u16,
) -> TetherBytes {
    let Some(session) = terminal_ref("dump_viewport_row", terminal) else {
        return TetherBytes::null();
    };
    guard("dump_viewport_row", TetherBytes::null(), || {
        session
            .dump_row(row)
            .map_err(|err| warn!("dump_viewport_row: {err}"))
            .ok()
            .map(String::into_bytes)
            .into()
    })
}

/// One [`CELL_STYLE_LEN`]-byte record per column.
#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_dump_viewport_row_cell_styles(
    terminal: *const TetherTerminal,
    row: u16,
) -> TetherBytes {
    let Some(session) = terminal_ref("dump_viewport_row_cell_styles", terminal) else {
        return TetherBytes::null();
    };
    guard("dump_viewport_row_cell_styles", TetherBytes::null(), || {
        session
            .dump_row_cell_styles(row)
            .map_err(|err| warn!("dump_viewport_row_cell_styles: {err}"))
            .ok()
            .map(|styles| bytes::encode_cell_styles(&styles))
            .into()
    })
}

/// One [`STYLE_RUN_LEN`]-byte record per run.
#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_dump_viewport_row_style_runs(
    terminal: *const TetherTerminal,
    row: u16,
) -> TetherBytes {
    let Some(session) = terminal_ref("dump_viewport_row_style_runs", terminal) else {
        return TetherBytes::null();
    };
    guard("dump_viewport_row_style_runs", TetherBytes::null(), || {
        session
            .dump_row_style_runs(row)
            .map_err(|err| warn!("dump_viewport_row_style_runs: {err}"))
            .ok()
            .map(|runs| bytes::encode_style_runs(&runs))
            .into()
    })
}

/// Dirty rows as little-endian u16 values. Clean viewports yield an empty
/// (non-null) buffer.
#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_take_dirty_viewport_rows(
    terminal: *mut TetherTerminal,
    rows: u16,
) -> TetherBytes {
    let Some(session) = terminal_mut("take_dirty_viewport_rows", terminal) else {
        return TetherBytes::null();
    };
    guard("take_dirty_viewport_rows", TetherBytes::null(), || {
        TetherBytes::from_vec(bytes::encode_rows(&session.take_dirty_rows(rows)))
    })
}

#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_take_viewport_scroll_delta(
    terminal: *mut TetherTerminal,
) -> i32 {
    let Some(session) = terminal_mut("take_viewport_scroll_delta", terminal) else {
        return 0;
    };
    guard("take_viewport_scroll_delta", 0, || {
        session.take_viewport_scroll_delta()
    })
}

/// URI under a 1-based coordinate, or null.
#[no_mangle]
pub unsafe extern "C" fn tether_vt_terminal_hyperlink_at(
    terminal: *const TetherTerminal,
    col: u16,
    row: u16,
) -> TetherBytes {
    let Some(session) = terminal_ref("hyperlink_at", terminal) else {
        return TetherBytes::null();
    };
    guard("hyperlink_at", TetherBytes::null(), || {
        session.hyperlink_at(col, row).map(String::into_bytes).into()
    })
}

/// Encode a named key. `name` is UTF-8 and need not be NUL-terminated.
/// Returns null for unknown names.
#[no_mangle]
pub unsafe extern "C" fn tether_vt_encode_key_named(
    name: *const u8,
    name_len: usize,
    modifiers: u16,
) -> TetherBytes {
    if name.is_null() {
        warn!("encode_key_named: null name");
        return TetherBytes::null();
    }
    let Ok(name) = std::str::from_utf8(slice::from_raw_parts(name, name_len)) else {
        warn!("encode_key_named: name is not UTF-8");
        return TetherBytes::null();
    };
    guard("encode_key_named", TetherBytes::null(), || {
        encode_key(name, Modifiers::from_bits_truncate(modifiers)).into()
    })
}

/// Release a buffer returned by any function above. Null is ignored.
#[no_mangle]
pub unsafe extern "C" fn tether_vt_bytes_free(bytes: TetherBytes) {
    bytes.release();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    unsafe fn take(bytes: TetherBytes) -> Option<Vec<u8>> {
        if bytes.is_null() {
            return None;
        }
        let out = slice::from_raw_parts(bytes.ptr, bytes.len).to_vec();
        tether_vt_bytes_free(bytes);
        Some(out)
    }

    #[test]
    fn test_lifecycle_and_dump() {
        unsafe {
            let term = tether_vt_terminal_new(10, 3);
            assert!(!term.is_null());

            let input = b"hi\r\nthere";
            assert_eq!(tether_vt_terminal_feed(term, input.as_ptr(), input.len()), 0);
            assert_eq!(
                take(tether_vt_terminal_dump_viewport_row(term, 1)),
                Some(b"there".to_vec())
            );
            assert_eq!(
                take(tether_vt_terminal_dump_viewport(term)),
                Some(b"hi\nthere\n".to_vec())
            );
            assert_eq!(take(tether_vt_terminal_dump_viewport_row(term, 3)), None);

            let (mut col, mut row) = (0u16, 0u16);
            assert!(tether_vt_terminal_cursor_position(term, &mut col, &mut row));
            assert_eq!((col, row), (6, 2));

            tether_vt_terminal_free(term);
        }
    }

    #[test]
    fn test_invalid_size_returns_null() {
        assert!(tether_vt_terminal_new(0, 3).is_null());
    }

    #[test]
    fn test_null_handle_is_rejected() {
        unsafe {
            let input = b"x";
            assert_eq!(
                tether_vt_terminal_feed(ptr::null_mut(), input.as_ptr(), 1),
                -1
            );
            assert_eq!(tether_vt_terminal_resize(ptr::null_mut(), 10, 10), -1);
            assert_eq!(tether_vt_terminal_take_viewport_scroll_delta(ptr::null_mut()), 0);
            assert!(tether_vt_terminal_dump_viewport(ptr::null()).is_null());
            tether_vt_terminal_free(ptr::null_mut());
        }
    }

    #[test]
    fn test_dirty_rows_and_styles() {
        unsafe {
            let term = tether_vt_terminal_new(4, 2);
            let rows = take(tether_vt_terminal_take_dirty_viewport_rows(term, 2)).unwrap();
            assert_eq!(rows, vec![0, 0, 1, 0]);
            assert_eq!(
                take(tether_vt_terminal_take_dirty_viewport_rows(term, 2)),
                Some(Vec::new())
            );

            let input = b"\x1b[41mA\x1b[0m";
            assert_eq!(tether_vt_terminal_feed(term, input.as_ptr(), input.len()), 0);

            let styles = take(tether_vt_terminal_dump_viewport_row_cell_styles(term, 0)).unwrap();
            assert_eq!(styles.len(), 4 * CELL_STYLE_LEN);
            assert_eq!(&styles[..8], &[0xFF, 0xFF, 0xFF, 0xCC, 0x66, 0x66, 0, 0]);

            let runs = take(tether_vt_terminal_dump_viewport_row_style_runs(term, 0)).unwrap();
            assert_eq!(runs.len(), 2 * STYLE_RUN_LEN);
            assert_eq!(&runs[..4], &[1, 0, 2, 0]);
            assert_eq!(&runs[STYLE_RUN_LEN..STYLE_RUN_LEN + 4], &[2, 0, 5, 0]);

            tether_vt_terminal_free(term);
        }
    }

    #[test]
    fn test_default_colors() {
        unsafe {
            let term = tether_vt_terminal_new(2, 1);
            tether_vt_terminal_set_default_colors(term, 1, 2, 3, 4, 5, 6);
            let styles = take(tether_vt_terminal_dump_viewport_row_cell_styles(term, 0)).unwrap();
            assert_eq!(&styles[..6], &[1, 2, 3, 4, 5, 6]);
            tether_vt_terminal_free(term);
        }
    }

    #[test]
    fn test_scroll_and_hyperlink() {
        unsafe {
            let term = tether_vt_terminal_new(20, 2);
            assert_eq!(tether_vt_terminal_take_viewport_scroll_delta(term), 0);

            let input = b"\x1b]8;;https://example.com\x07go\x1b]8;;\x07\r\n\r\n\r\n";
            assert_eq!(tether_vt_terminal_feed(term, input.as_ptr(), input.len()), 0);
            assert_eq!(tether_vt_terminal_take_viewport_scroll_delta(term), 2);

            assert_eq!(tether_vt_terminal_scroll_viewport(term, -2), 0);
            assert_eq!(tether_vt_terminal_take_viewport_scroll_delta(term), -2);
            assert_eq!(
                take(tether_vt_terminal_hyperlink_at(term, 1, 1)),
                Some(b"https://example.com".to_vec())
            );
            assert_eq!(take(tether_vt_terminal_hyperlink_at(term, 0, 1)), None);

            assert_eq!(tether_vt_terminal_scroll_viewport_top(term), 0);
            assert_eq!(tether_vt_terminal_scroll_viewport_bottom(term), 0);
            assert_eq!(tether_vt_terminal_take_viewport_scroll_delta(term), 2);

            tether_vt_terminal_free(term);
        }
    }

    #[test]
    fn test_encode_key_named() {
        unsafe {
            let name = b"up";
            assert_eq!(
                take(tether_vt_encode_key_named(name.as_ptr(), name.len(), 0)),
                Some(b"\x1b[A".to_vec())
            );
            assert_eq!(
                take(tether_vt_encode_key_named(name.as_ptr(), name.len(), 0b0010)),
                Some(b"\x1b[1;5A".to_vec())
            );
            let unknown = b"f13";
            assert_eq!(
                take(tether_vt_encode_key_named(unknown.as_ptr(), unknown.len(), 0)),
                None
            );
            assert!(tether_vt_encode_key_named(ptr::null(), 0, 0).is_null());
        }
    }

    #[test]
    fn test_feed_accepts_empty_null_buffer() {
        unsafe {
            let term = tether_vt_terminal_new(2, 1);
            assert_eq!(tether_vt_terminal_feed(term, ptr::null(), 0), 0);
            assert_eq!(tether_vt_terminal_feed(term, ptr::null(), 3), -1);
            tether_vt_terminal_free(term);
        }
    }
}

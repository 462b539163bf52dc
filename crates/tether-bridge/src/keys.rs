//! Symbolic key names to the byte sequences a terminal application expects.
//!
//! Follows xterm conventions: modified cursor and function keys carry the
//! modifier parameter `1 + shift + 2*alt + 4*ctrl + 8*super`, while alt on a
//! single-byte key is sent as an ESC prefix.

use bitflags::bitflags;

bitflags! {
    /// Modifier bitmask as passed across the boundary.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Modifiers: u16 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const SUPER = 0b1000;
    }
}

impl Modifiers {
    /// xterm modifier parameter, or `None` when no modifier is held.
    fn xterm_param(self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let mut param = 1;
        if self.contains(Modifiers::SHIFT) {
            param += 1;
        }
        if self.contains(Modifiers::ALT) {
            param += 2;
        }
        if self.contains(Modifiers::CTRL) {
            param += 4;
        }
        if self.contains(Modifiers::SUPER) {
            param += 8;
        }
        Some(param)
    }
}

/// Keys that have a symbolic name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Enter,
    Tab,
    Backspace,
    Escape,
    /// F1 through F12.
    F(u8),
}

impl Key {
    /// Look up a key by its exact name.
    pub fn from_name(name: &str) -> Option<Key> {
        let key = match name {
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "page-up" | "page_up" => Key::PageUp,
            "pagedown" | "page-down" | "page_down" => Key::PageDown,
            "insert" => Key::Insert,
            "delete" => Key::Delete,
            "enter" => Key::Enter,
            "tab" => Key::Tab,
            "backspace" => Key::Backspace,
            "escape" => Key::Escape,
            _ => return name.strip_prefix('f').and_then(parse_function_key),
        };
        Some(key)
    }
}

/// `"1"`..`"9"` directly, or `"1"` followed by `0`..`2` for F10-F12.
fn parse_function_key(digits: &str) -> Option<Key> {
    match digits.as_bytes() {
        [d @ b'1'..=b'9'] => Some(Key::F(d - b'0')),
        [b'1', d @ b'0'..=b'2'] => Some(Key::F(10 + (d - b'0'))),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyAction {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A key transition to encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub mods: Modifiers,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn press(key: Key, mods: Modifiers) -> Self {
        Self {
            key,
            mods,
            action: KeyAction::Press,
        }
    }
}

/// Terminal-side settings that change key encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEncoder {
    /// DECCKM: cursor keys, home and end use SS3 when unmodified.
    pub app_cursor: bool,
    /// Send alt on single-byte keys as a leading ESC.
    pub alt_esc_prefix: bool,
}

impl Default for KeyEncoder {
    fn default() -> Self {
        Self {
            app_cursor: false,
            alt_esc_prefix: true,
        }
    }
}

impl KeyEncoder {
    /// Bytes for `event`. Releases encode to nothing.
    pub fn encode(&self, event: &KeyEvent) -> Vec<u8> {
        if event.action == KeyAction::Release {
            return Vec::new();
        }
        let mods = event.mods;

        match event.key {
            Key::Up => self.cursor_key(b'A', mods),
            Key::Down => self.cursor_key(b'B', mods),
            Key::Right => self.cursor_key(b'C', mods),
            Key::Left => self.cursor_key(b'D', mods),
            Key::Home => self.cursor_key(b'H', mods),
            Key::End => self.cursor_key(b'F', mods),
            Key::Insert => tilde_key(2, mods),
            Key::Delete => tilde_key(3, mods),
            Key::PageUp => tilde_key(5, mods),
            Key::PageDown => tilde_key(6, mods),
            Key::F(n) => function_key(n, mods),
            Key::Enter => self.single_byte(b'\r', mods),
            Key::Tab if mods.contains(Modifiers::SHIFT) => b"\x1b[Z".to_vec(),
            Key::Tab => self.single_byte(b'\t', mods),
            Key::Backspace if mods.contains(Modifiers::CTRL) => self.single_byte(0x08, mods),
            Key::Backspace => self.single_byte(0x7F, mods),
            Key::Escape => self.single_byte(0x1B, mods),
        }
    }

    /// Encode a key press by name. Unknown names and empty encodings are
    /// both `None`.
    pub fn encode_named(&self, name: &str, mods: Modifiers) -> Option<Vec<u8>> {
        let key = Key::from_name(name)?;
        let bytes = self.encode(&KeyEvent::press(key, mods));
        if bytes.is_empty() {
            None
        } else {
            Some(bytes)
        }
    }

    fn cursor_key(&self, code: u8, mods: Modifiers) -> Vec<u8> {
        match mods.xterm_param() {
            Some(param) => format!("\x1b[1;{}{}", param, code as char).into_bytes(),
            None if self.app_cursor => vec![0x1B, b'O', code],
            None => vec![0x1B, b'[', code],
        }
    }

    fn single_byte(&self, byte: u8, mods: Modifiers) -> Vec<u8> {
        if self.alt_esc_prefix && mods.contains(Modifiers::ALT) {
            vec![0x1B, byte]
        } else {
            vec![byte]
        }
    }
}

fn tilde_key(code: u8, mods: Modifiers) -> Vec<u8> {
    match mods.xterm_param() {
        Some(param) => format!("\x1b[{};{}~", code, param).into_bytes(),
        None => format!("\x1b[{}~", code).into_bytes(),
    }
}

fn function_key(n: u8, mods: Modifiers) -> Vec<u8> {
    // F1-F4 are SS3 unmodified and CSI 1;m P..S with modifiers.
    if let 1..=4 = n {
        let code = b'P' + (n - 1);
        return match mods.xterm_param() {
            Some(param) => format!("\x1b[1;{}{}", param, code as char).into_bytes(),
            None => vec![0x1B, b'O', code],
        };
    }

    let code = match n {
        5 => 15,
        6 => 17,
        7 => 18,
        8 => 19,
        9 => 20,
        10 => 21,
        11 => 23,
        12 => 24,
        _ => return Vec::new(),
    };
    tilde_key(code, mods)
}

/// Encode a named key press in normal (non-application) cursor mode.
pub fn encode_key(name: &str, mods: Modifiers) -> Option<Vec<u8>> {
    KeyEncoder::default().encode_named(name, mods)
}

//! Tracking of modes the underlying emulator does not model.
//!
//! Reverse video (DECSCNM, `CSI ? 5 h` / `CSI ? 5 l`) is followed with a
//! second `vte` parser fed the same bytes, so sequences split across feeds
//! are still recognized.

use vte::{Params, Parser, Perform};

const DECSCNM: u16 = 5;

/// Watches the output stream for reverse-video changes.
pub(crate) struct ModeTracker {
    parser: Parser,
    state: ModeState,
}

#[derive(Default)]
struct ModeState {
    reverse_video: bool,
}

impl ModeTracker {
    pub(crate) fn new() -> Self {
        Self {
            parser: Parser::new(),
            state: ModeState::default(),
        }
    }

    /// Scan `bytes` and report whether reverse video flipped.
    pub(crate) fn advance(&mut self, bytes: &[u8]) -> bool {
        let before = self.state.reverse_video;
        self.parser.advance(&mut self.state, bytes);
        before != self.state.reverse_video
    }

    pub(crate) fn reverse_video(&self) -> bool {
        self.state.reverse_video
    }
}

impl Perform for ModeState {
    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], ignore: bool, action: char) {
        if ignore || intermediates != b"?" {
            return;
        }
        let enable = match action {
            'h' => true,
            'l' => false,
            _ => return,
        };
        if params.iter().any(|param| param.first() == Some(&DECSCNM)) {
            self.reverse_video = enable;
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], ignore: bool, byte: u8) {
        // RIS
        if !ignore && intermediates.is_empty() && byte == b'c' {
            self.reverse_video = false;
        }
    }
}

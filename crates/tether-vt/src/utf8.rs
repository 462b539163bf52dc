//! Scalar UTF-8 decoding for printable runs.
//!
//! Decodes until the next escape byte so a caller can hand the codepoints to
//! a print fast path and the escape sequence to the parser. Partial sequences
//! at the end of the input are left unconsumed for the next call.

/// Codepoint substituted for malformed input.
pub const REPLACEMENT: u32 = 0xFFFD;

const ESC: u8 = 0x1B;

/// Progress made by [`decode_until_esc`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Input bytes consumed.
    pub consumed: usize,
    /// Codepoints written to the output.
    pub produced: usize,
}

/// Decode `input` into `out` until an ESC byte, the end of a complete
/// sequence run, or `out` is full.
///
/// A malformed sequence yields [`REPLACEMENT`] and consumes only its lead
/// byte, so decoding resynchronizes on the next byte.
pub fn decode_until_esc(input: &[u8], out: &mut [u32]) -> Decoded {
    let mut consumed = 0;
    let mut produced = 0;

    while consumed < input.len() && produced < out.len() {
        let lead = input[consumed];
        if lead == ESC {
            break;
        }

        let len = sequence_len(lead);
        if len == 0 {
            out[produced] = REPLACEMENT;
            produced += 1;
            consumed += 1;
            continue;
        }
        // The whole sequence must be present before it is validated.
        if consumed + len > input.len() {
            break;
        }

        match decode_sequence(&input[consumed..consumed + len]) {
            Some(cp) => {
                out[produced] = cp;
                consumed += len;
            }
            None => {
                out[produced] = REPLACEMENT;
                consumed += 1;
            }
        }
        produced += 1;
    }

    Decoded { consumed, produced }
}

/// Total sequence length implied by a lead byte, 0 if it cannot lead.
fn sequence_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

fn decode_sequence(seq: &[u8]) -> Option<u32> {
    if seq[1..].iter().any(|&b| b & 0xC0 != 0x80) {
        return None;
    }

    let cont = |b: u8| u32::from(b & 0x3F);
    let (cp, min) = match *seq {
        [a] => return Some(u32::from(a)),
        [a, b] => ((u32::from(a & 0x1F) << 6) | cont(b), 0x80),
        [a, b, c] => (
            (u32::from(a & 0x0F) << 12) | (cont(b) << 6) | cont(c),
            0x800,
        ),
        [a, b, c, d] => (
            (u32::from(a & 0x07) << 18) | (cont(b) << 12) | (cont(c) << 6) | cont(d),
            0x1_0000,
        ),
        _ => return None,
    };

    // Overlong encodings, surrogates and values past U+10FFFF are malformed.
    if cp < min || (0xD800..=0xDFFF).contains(&cp) || cp > 0x10_FFFF {
        return None;
    }
    Some(cp)
}

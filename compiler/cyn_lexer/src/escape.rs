//! Escape-sequence decoding shared by the character and string analyzers.

use cyn_diagnostic::{DiagnosticEngine, DiagnosticKind, SourceLocation};
use cyn_lexer_core::{try_read_ucn, CharReader, Peeked};

/// What an escape sequence decoded to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Decoded {
    /// A raw code unit (simple, octal, or hex escape). Written to the output
    /// as-is, whatever the literal's encoding.
    CodeUnit(u64),
    /// A Unicode code point from a UCN. Re-encoded to the literal's
    /// execution encoding by the caller.
    CodePoint(u32),
}

/// Result of decoding one escape sequence.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Escape {
    pub value: Decoded,
    pub has_error: bool,
}

impl Escape {
    fn unit(value: u64) -> Escape {
        Escape {
            value: Decoded::CodeUnit(value),
            has_error: false,
        }
    }

    fn error(value: u64) -> Escape {
        Escape {
            value: Decoded::CodeUnit(value),
            has_error: true,
        }
    }
}

/// Decode one escape sequence whose introducing `\` has already been
/// consumed; `pos` points at the selector character.
///
/// `base_offset` is the byte offset of the spelling's first byte within the
/// original source buffer, so diagnostics land on real locations. All walks
/// go through the logical layer: an escaped newline between the backslash
/// and the selector (or between hex digits) splices before anything is
/// classified.
pub(crate) fn decode_escape(
    reader: &CharReader<'_>,
    pos: &mut u32,
    base_offset: u32,
    engine: &DiagnosticEngine,
) -> Escape {
    let escape_loc = SourceLocation::from_offset(base_offset + *pos);
    let selector = reader.peek(*pos);
    match selector.ch {
        // Simple escapes, conventional C values.
        b'\'' => simple(pos, selector, 0x27),
        b'"' => simple(pos, selector, 0x22),
        b'?' => simple(pos, selector, 0x3F),
        b'\\' => simple(pos, selector, 0x5C),
        b'a' => simple(pos, selector, 0x07),
        b'b' => simple(pos, selector, 0x08),
        b'f' => simple(pos, selector, 0x0C),
        b'n' => simple(pos, selector, 0x0A),
        b'r' => simple(pos, selector, 0x0D),
        b't' => simple(pos, selector, 0x09),
        b'v' => simple(pos, selector, 0x0B),

        // Octal escape: one to three octal digits.
        b'0'..=b'7' => {
            let mut value: u64 = 0;
            let mut count = 0;
            loop {
                let digit = reader.peek(*pos);
                if count == 3 || !(b'0'..=b'7').contains(&digit.ch) {
                    break;
                }
                value = (value << 3) | u64::from(digit.ch - b'0');
                *pos += digit.size;
                count += 1;
            }
            Escape::unit(value)
        }

        // Hex escape: \x followed by one or more hex digits.
        b'x' => {
            *pos += selector.size;
            let mut value: u64 = 0;
            let mut count = 0;
            let mut overflowed = false;
            loop {
                let digit = reader.peek(*pos);
                let Some(digit_value) = (digit.ch as char).to_digit(16) else {
                    break;
                };
                if value >> 60 != 0 {
                    overflowed = true;
                }
                value = (value << 4) | u64::from(digit_value);
                *pos += digit.size;
                count += 1;
            }
            if count == 0 {
                engine.report(escape_loc, DiagnosticKind::InvalidHexEscape);
                return Escape::error(0);
            }
            if overflowed {
                return Escape::error(u64::MAX);
            }
            Escape::unit(value)
        }

        // Universal character name.
        b'u' | b'U' => {
            let before = *pos;
            let code_point = try_read_ucn(reader, pos, escape_loc, engine, None);
            if code_point != 0 {
                return Escape {
                    value: Decoded::CodePoint(code_point),
                    has_error: false,
                };
            }
            if *pos == before {
                // Incomplete: the decoder refused to consume; skip the
                // selector so decoding can continue past it.
                *pos += selector.size;
            }
            Escape::error(0)
        }

        // Not an escape C knows; use the character itself and move on.
        // (The scanner never errors here either; C leaves it undefined.)
        other => simple(pos, selector, u64::from(other)),
    }
}

fn simple(pos: &mut u32, selector: Peeked, value: u64) -> Escape {
    *pos += selector.size;
    Escape::unit(value)
}

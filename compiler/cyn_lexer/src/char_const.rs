//! Character constant analysis (C11 6.4.4.4).
//!
//! Decodes the spelling of a character constant (prefix, quotes, escapes)
//! into a single 64-bit value. Multi-character constants pack code units
//! with `value = (value << 8*width) | unit`, where `width` is one byte for
//! plain constants and the target's character width otherwise. That packing
//! is implementation-defined in C; it is pinned here and any downstream
//! consumer must agree with it.

use cyn_diagnostic::{DiagnosticEngine, DiagnosticKind, SourceLocation};
use cyn_lexer_core::{CharReader, TokenKind};
use tracing::trace;

use crate::escape::{decode_escape, Decoded};
use crate::target::{LiteralEncoding, TargetInfo};

/// The decoded value of one character constant.
#[derive(Clone, Copy, Debug)]
pub struct CharConstant {
    /// The packed code-unit value.
    pub value: u64,
    /// Which execution encoding the constant uses.
    pub encoding: LiteralEncoding,
    pub has_error: bool,
}

impl CharConstant {
    /// Decode a character constant from its spelling (prefix and quotes
    /// included).
    ///
    /// `kind` must be one of the character-constant token kinds; `loc` is
    /// the token's source location.
    pub fn parse(
        spelling: &str,
        loc: SourceLocation,
        kind: TokenKind,
        engine: &DiagnosticEngine,
        target: &TargetInfo,
    ) -> CharConstant {
        debug_assert!(kind.is_char_constant(), "not a character constant: {kind:?}");
        trace!(spelling, ?kind, "analyzing character constant");

        let encoding = LiteralEncoding::for_token(kind).unwrap_or(LiteralEncoding::Utf8);
        let mut result = CharConstant {
            value: 0,
            encoding,
            has_error: false,
        };

        let reader = CharReader::new(spelling.as_bytes());
        let mut pos = 0u32;

        // Skip the encoding prefix (if any) and the opening quote.
        loop {
            let p = reader.peek(pos);
            if p.ch == 0 {
                // Malformed spelling; the scanner never produces this.
                result.has_error = true;
                return result;
            }
            pos += p.size;
            if p.ch == b'\'' {
                break;
            }
        }

        let width = encoding.char_byte_width(target);
        let max_unit = encoding.max_code_unit(target);
        let shift = 8 * width;
        let mut unit_count = 0u32;
        let mut overflowed = false;

        loop {
            let p = reader.peek(pos);
            let unit = match p.ch {
                b'\'' | 0 => break,
                b'\\' => {
                    pos += p.size;
                    let escape = decode_escape(&reader, &mut pos, loc.offset(), engine);
                    result.has_error |= escape.has_error;
                    match escape.value {
                        Decoded::CodeUnit(v) => v,
                        Decoded::CodePoint(cp) => u64::from(cp),
                    }
                }
                byte => {
                    pos += p.size;
                    u64::from(byte)
                }
            };

            if unit > max_unit {
                overflowed = true;
            }
            // Shifting out set bits means the accumulator ran out of room.
            if unit_count > 0 && result.value >> (64 - shift) != 0 {
                overflowed = true;
            }
            result.value = (result.value << shift) | unit;
            unit_count += 1;
        }

        if unit_count == 0 {
            engine.report(loc, DiagnosticKind::EmptyCharacter);
            result.has_error = true;
        }
        if overflowed {
            engine.report(loc, DiagnosticKind::CharConstOverflow);
            result.has_error = true;
        }
        result
    }
}

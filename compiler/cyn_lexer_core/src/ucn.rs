//! Universal character names (C11 6.4.3).
//!
//! `\u` followed by exactly 4 hex digits, or `\U` followed by exactly 8,
//! denotes a code point. The same decoder serves identifier scanning and the
//! escape decoding done by the literal analyzers; both peek through escaped
//! newlines, so a UCN may be split across spliced lines.

use cyn_diagnostic::{DiagnosticEngine, DiagnosticKind, SourceLocation};

use crate::char_reader::CharReader;
use crate::token::TokenFlags;

/// Read a UCN whose `u`/`U` kind character is at `*pos` (just past the
/// backslash), returning the code point.
///
/// - Not a `u`/`U` at all: returns 0, consumes nothing, reports nothing.
/// - Too few hex digits: reports `warn_ucn_incomplete` at `slash_loc`,
///   refuses to consume, returns 0.
/// - All digits present but the code point is outside what C11 6.4.3
///   permits (below U+00A0 other than `$`, `@`, `` ` ``, or a surrogate):
///   reports `err_ucn_invalid`, *does* consume, returns 0.
/// - Otherwise: consumes, sets `HAS_UCN` (and `IS_DIRTY` if an escaped
///   newline interrupted the digits) on `flags`, returns the code point.
///
/// A valid code point is never 0, so 0 is unambiguous as a failure value.
pub fn try_read_ucn(
    reader: &CharReader<'_>,
    pos: &mut u32,
    slash_loc: SourceLocation,
    engine: &DiagnosticEngine,
    flags: Option<&mut TokenFlags>,
) -> u32 {
    let kind = reader.peek(*pos);
    let num_hexdigits = match kind.ch {
        b'u' => 4,
        b'U' => 8,
        _ => return 0,
    };

    let mut cur = *pos + kind.size;
    let mut dirty = kind.size != 1;
    let mut code_point: u32 = 0;

    for _ in 0..num_hexdigits {
        let digit = reader.peek(cur);
        let Some(value) = (digit.ch as char).to_digit(16) else {
            engine.report(slash_loc, DiagnosticKind::UcnIncomplete);
            return 0;
        };
        code_point = (code_point << 4) + value;
        dirty |= digit.size != 1;
        cur += digit.size;
    }

    // C11 6.4.3/2: below 00A0 only $ (0024), @ (0040), and ` (0060) are
    // permitted; the surrogate range D800-DFFF never is.
    let valid = if code_point < 0xA0 {
        matches!(code_point, 0x24 | 0x40 | 0x60)
    } else {
        !(0xD800..=0xDFFF).contains(&code_point)
    };
    if !valid {
        engine.report(slash_loc, DiagnosticKind::UcnInvalid);
        *pos = cur;
        return 0;
    }

    if let Some(f) = flags {
        f.set(TokenFlags::HAS_UCN);
        if dirty {
            f.set(TokenFlags::IS_DIRTY);
        }
    }
    *pos = cur;
    code_point
}

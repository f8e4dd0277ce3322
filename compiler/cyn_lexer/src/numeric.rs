//! Numeric constant analysis (C11 6.4.4.1, 6.4.4.2).
//!
//! The tokenizer gross-matches numeric constants without validating them;
//! this analyzer determines the radix, locates the digit range, classifies
//! the suffix set, and evaluates integer values. The spelling may be dirty,
//! so every walk goes through the logical-character layer.

use cyn_diagnostic::{DiagnosticEngine, DiagnosticKind, SourceLocation};
use cyn_lexer_core::CharReader;
use tracing::trace;

/// The analyzed shape of one numeric constant.
///
/// Borrows the spelling for its lifetime; `digit_begin..digit_end` is the
/// interior byte range holding the meaningful digits (prefix and suffix
/// excluded). If `has_error` is false, the suffix letters and digit set are
/// consistent with `radix` and the floating/integer shape.
#[derive(Debug)]
pub struct NumericConstant<'a> {
    spelling: &'a str,
    /// First byte of the digit range within the spelling.
    pub digit_begin: u32,
    /// One past the last digit byte (= first byte of the suffix).
    pub digit_end: u32,
    /// 8, 10, or 16.
    pub radix: u32,
    pub has_period: bool,
    pub has_exponent: bool,
    pub is_unsigned: bool,
    pub is_long: bool,
    pub is_long_long: bool,
    pub is_float: bool,
    pub has_error: bool,
}

impl<'a> NumericConstant<'a> {
    /// Analyze a numeric constant token's spelling.
    ///
    /// `loc` is the token's source location; diagnostics are offset from it.
    pub fn parse(
        spelling: &'a str,
        loc: SourceLocation,
        engine: &DiagnosticEngine,
    ) -> NumericConstant<'a> {
        trace!(spelling, "analyzing numeric constant");
        let reader = CharReader::new(spelling.as_bytes());
        let mut result = NumericConstant {
            spelling,
            digit_begin: 0,
            digit_end: 0,
            radix: 10,
            has_period: false,
            has_exponent: false,
            is_unsigned: false,
            is_long: false,
            is_long_long: false,
            is_float: false,
            has_error: false,
        };
        let mut pos = 0u32;

        let first = reader.peek(pos);
        if first.ch == b'0' {
            let after_zero = pos + first.size;
            let second = reader.peek(after_zero);
            let third = reader.peek(after_zero + second.size);
            if matches!(second.ch, b'x' | b'X')
                && (third.ch.is_ascii_hexdigit() || third.ch == b'.')
            {
                result.radix = 16;
                pos = after_zero + second.size;
                result.digit_begin = pos;
                result.parse_hex(&reader, &mut pos, loc, engine);
            } else {
                // Leading zero: octal, unless a period or exponent later
                // turns the whole thing into a decimal floating constant.
                // A bare `0x` lands here too: the `x` becomes a bad suffix.
                result.radix = 8;
                pos = after_zero;
                result.digit_begin = pos;
                result.parse_octal(&reader, &mut pos, loc, engine);
            }
        } else {
            result.digit_begin = pos;
            skip_digits(&reader, &mut pos, 10);
            result.parse_decimal_tail(&reader, &mut pos, loc, engine);
        }

        result.digit_end = pos;
        result.parse_suffix(&reader, &mut pos, loc, engine);
        result
    }

    /// Whether the constant is a floating constant.
    pub fn is_floating_literal(&self) -> bool {
        self.has_period || self.has_exponent
    }

    /// Whether the constant is an integer constant.
    pub fn is_integer_literal(&self) -> bool {
        !self.is_floating_literal()
    }

    /// Evaluate the digit range as an integer in the detected radix.
    ///
    /// Returns `(value, overflowed)`; on overflow the value saturates at
    /// `u64::MAX`. No diagnostic is emitted here; whether overflow matters
    /// depends on the type the caller assigns, so that policy stays upstream.
    pub fn eval_to_integer(&self) -> (u64, bool) {
        debug_assert!(self.is_integer_literal());
        let reader = CharReader::new(self.spelling.as_bytes());
        let radix = u64::from(self.radix);
        let mut pos = self.digit_begin;
        let mut value: u64 = 0;
        let mut overflowed = false;
        while pos < self.digit_end {
            let p = reader.peek(pos);
            pos += p.size;
            let Some(digit) = (p.ch as char).to_digit(self.radix) else {
                continue;
            };
            let (shifted, mul_overflow) = value.overflowing_mul(radix);
            let (next, add_overflow) = shifted.overflowing_add(u64::from(digit));
            overflowed |= mul_overflow || add_overflow;
            value = next;
        }
        if overflowed {
            (u64::MAX, true)
        } else {
            (value, false)
        }
    }

    fn parse_octal(
        &mut self,
        reader: &CharReader<'_>,
        pos: &mut u32,
        loc: SourceLocation,
        engine: &DiagnosticEngine,
    ) {
        skip_digits(reader, pos, 8);

        // An 8 or 9 here is only an error if the constant stays an octal
        // integer; `01238.` is a perfectly fine decimal double.
        let mut bad_digit = None;
        let p = reader.peek(*pos);
        if matches!(p.ch, b'8' | b'9') {
            bad_digit = Some((*pos, p.ch as char));
            skip_digits(reader, pos, 10);
        }

        let p = reader.peek(*pos);
        if p.ch == b'.' || matches!(p.ch, b'e' | b'E') {
            self.radix = 10;
            self.parse_decimal_tail(reader, pos, loc, engine);
            return;
        }

        if let Some((bad_pos, digit)) = bad_digit {
            engine.report(offset_loc(loc, bad_pos), DiagnosticKind::InvalidDigit {
                digit,
                radix: 8,
            });
            self.has_error = true;
        }
    }

    /// Fraction and exponent of a decimal constant; digits before the period
    /// are already consumed.
    fn parse_decimal_tail(
        &mut self,
        reader: &CharReader<'_>,
        pos: &mut u32,
        loc: SourceLocation,
        engine: &DiagnosticEngine,
    ) {
        let p = reader.peek(*pos);
        if p.ch == b'.' {
            self.has_period = true;
            *pos += p.size;
            skip_digits(reader, pos, 10);
        }

        let p = reader.peek(*pos);
        if matches!(p.ch, b'e' | b'E') {
            let exponent_pos = *pos;
            let mut look = *pos + p.size;
            let sign = reader.peek(look);
            if matches!(sign.ch, b'+' | b'-') {
                look += sign.size;
            }
            if reader.peek(look).ch.is_ascii_digit() {
                self.has_exponent = true;
                *pos = look;
                skip_digits(reader, pos, 10);
            } else {
                engine.report(offset_loc(loc, exponent_pos), DiagnosticKind::MissingExponent);
                self.has_error = true;
                *pos += p.size;
            }
        }
    }

    fn parse_hex(
        &mut self,
        reader: &CharReader<'_>,
        pos: &mut u32,
        loc: SourceLocation,
        engine: &DiagnosticEngine,
    ) {
        skip_digits(reader, pos, 16);

        let p = reader.peek(*pos);
        if p.ch == b'.' {
            self.has_period = true;
            *pos += p.size;
            skip_digits(reader, pos, 16);
        }

        let p = reader.peek(*pos);
        if matches!(p.ch, b'p' | b'P') {
            let exponent_pos = *pos;
            let mut look = *pos + p.size;
            let sign = reader.peek(look);
            if matches!(sign.ch, b'+' | b'-') {
                look += sign.size;
            }
            if reader.peek(look).ch.is_ascii_digit() {
                self.has_exponent = true;
                *pos = look;
                skip_digits(reader, pos, 10);
            } else {
                engine.report(offset_loc(loc, exponent_pos), DiagnosticKind::MissingExponent);
                self.has_error = true;
                *pos += p.size;
            }
        } else if self.has_period {
            // A hexadecimal floating constant requires a binary exponent.
            engine.report(offset_loc(loc, *pos), DiagnosticKind::MissingExponent);
            self.has_error = true;
        }
    }

    /// Classify the suffix region. Each letter may appear at most once,
    /// `ll`/`LL` must be a same-case pair, `f`/`F` needs a floating shape,
    /// and `u`/`U` an integer one.
    fn parse_suffix(
        &mut self,
        reader: &CharReader<'_>,
        pos: &mut u32,
        loc: SourceLocation,
        engine: &DiagnosticEngine,
    ) {
        let floating = self.is_floating_literal();
        loop {
            let p = reader.peek(*pos);
            match p.ch {
                0 => return,
                b'u' | b'U' if !self.is_unsigned && !floating => {
                    self.is_unsigned = true;
                    *pos += p.size;
                }
                b'l' | b'L' if !self.is_long && !self.is_long_long => {
                    let second = reader.peek(*pos + p.size);
                    if second.ch == p.ch {
                        // Same-case pair: long long. There is no
                        // `long long double`.
                        if floating {
                            self.report_bad_suffix(loc, *pos, p.ch, engine);
                            return;
                        }
                        self.is_long_long = true;
                        *pos += p.size + second.size;
                    } else {
                        self.is_long = true;
                        *pos += p.size;
                    }
                }
                b'f' | b'F' if floating && !self.is_float => {
                    self.is_float = true;
                    *pos += p.size;
                }
                other => {
                    self.report_bad_suffix(loc, *pos, other, engine);
                    return;
                }
            }
        }
    }

    fn report_bad_suffix(
        &mut self,
        loc: SourceLocation,
        pos: u32,
        suffix: u8,
        engine: &DiagnosticEngine,
    ) {
        engine.report(offset_loc(loc, pos), DiagnosticKind::InvalidSuffix {
            suffix: suffix as char,
        });
        self.has_error = true;
    }
}

/// Advance past digits valid in `radix`, returning how many were consumed.
fn skip_digits(reader: &CharReader<'_>, pos: &mut u32, radix: u32) -> u32 {
    let mut count = 0;
    loop {
        let p = reader.peek(*pos);
        if (p.ch as char).to_digit(radix).is_none() {
            return count;
        }
        *pos += p.size;
        count += 1;
    }
}

fn offset_loc(loc: SourceLocation, pos: u32) -> SourceLocation {
    SourceLocation::from_offset(loc.offset() + pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(spelling: &str) -> (NumericConstant<'_>, DiagnosticEngine) {
        let engine = DiagnosticEngine::new();
        let result = NumericConstant::parse(spelling, SourceLocation::from_offset(0), &engine);
        (result, engine)
    }

    #[test]
    fn decimal_with_unsigned_long_suffix() {
        let (n, engine) = parse("42uL");
        assert!(!n.has_error);
        assert!(n.is_integer_literal());
        assert_eq!(n.radix, 10);
        assert!(n.is_unsigned);
        assert!(n.is_long);
        assert!(!n.is_long_long);
        assert_eq!(n.eval_to_integer(), (42, false));
        assert!(!engine.has_errors());
    }

    #[test]
    fn decimal_with_ull_suffix() {
        let (n, _) = parse("42ULL");
        assert!(!n.has_error);
        assert!(n.is_unsigned);
        assert!(n.is_long_long);
        assert!(!n.is_long);
        assert_eq!(n.eval_to_integer(), (42, false));
    }

    #[test]
    fn octal_constant() {
        let (n, _) = parse("042");
        assert!(!n.has_error);
        assert!(n.is_integer_literal());
        assert_eq!(n.radix, 8);
        assert!(!n.is_unsigned && !n.is_long && !n.is_long_long);
        assert_eq!(n.eval_to_integer(), (34, false));
    }

    #[test]
    fn hex_constant_with_llu_suffix() {
        let (n, _) = parse("0xDEADc0dellu");
        assert!(!n.has_error);
        assert_eq!(n.radix, 16);
        assert!(n.is_integer_literal());
        assert!(n.is_unsigned);
        assert!(n.is_long_long);
        assert!(!n.is_long);
        assert_eq!(n.eval_to_integer(), (0xDEAD_C0DE, false));
    }

    #[test]
    fn duplicate_unsigned_suffix_is_an_error() {
        let (n, engine) = parse("0uU");
        assert!(n.has_error);
        assert_eq!(engine.diagnostics()[0].code(), "err_invalid_suffix");
    }

    #[test]
    fn triple_l_suffix_is_an_error() {
        let (n, engine) = parse("0LLL");
        assert!(n.has_error);
        assert_eq!(engine.diagnostics()[0].code(), "err_invalid_suffix");
    }

    #[test]
    fn mixed_case_long_long_is_an_error() {
        for spelling in ["0lL", "0Ll"] {
            let (n, engine) = parse(spelling);
            assert!(n.has_error, "{spelling}");
            assert_eq!(engine.diagnostics()[0].code(), "err_invalid_suffix");
        }
    }

    #[test]
    fn octal_with_decimal_digit_is_an_error() {
        let (n, engine) = parse("0128");
        assert!(n.has_error);
        let diag = engine.diagnostics()[0];
        assert_eq!(diag.code(), "err_invalid_digit");
        assert_eq!(diag.loc.offset(), 3);
    }

    #[test]
    fn decimal_double_with_exponent() {
        let (n, _) = parse("314e10");
        assert!(!n.has_error);
        assert_eq!(n.radix, 10);
        assert!(n.is_floating_literal());
        assert!(n.has_exponent);
        assert!(!n.has_period);
        assert!(!n.is_long);
        assert!(!n.is_float);
    }

    #[test]
    fn float_with_period_and_f_suffix() {
        let (n, _) = parse("1.f");
        assert!(!n.has_error);
        assert_eq!(n.radix, 10);
        assert!(n.is_floating_literal());
        assert!(n.has_period);
        assert!(n.is_float);
        assert!(!n.has_exponent);
    }

    #[test]
    fn empty_exponent_is_an_error() {
        let (n, engine) = parse("1.ef");
        assert!(n.has_error);
        assert_eq!(engine.diagnostics()[0].code(), "err_missing_exponent");
    }

    #[test]
    fn leading_period_double() {
        let (n, _) = parse(".0");
        assert!(!n.has_error);
        assert_eq!(n.radix, 10);
        assert!(n.is_floating_literal());
        assert!(n.has_period);
    }

    #[test]
    fn octal_looking_double() {
        let (n, _) = parse("01238.");
        assert!(!n.has_error);
        assert_eq!(n.radix, 10);
        assert!(n.is_floating_literal());
        assert!(n.has_period);
    }

    #[test]
    fn hex_float_with_period_and_exponent() {
        let (n, _) = parse("0xabcde.ffP+1");
        assert!(!n.has_error);
        assert_eq!(n.radix, 16);
        assert!(n.is_floating_literal());
        assert!(n.has_period);
        assert!(n.has_exponent);
    }

    #[test]
    fn hex_float_without_period() {
        let (n, _) = parse("0xep1f");
        assert!(!n.has_error);
        assert_eq!(n.radix, 16);
        assert!(n.is_floating_literal());
        assert!(!n.has_period);
        assert!(n.has_exponent);
        assert!(n.is_float);
    }

    #[test]
    fn hex_period_without_exponent_is_an_error() {
        let (n, engine) = parse("0x.f");
        assert!(n.has_error);
        assert_eq!(engine.diagnostics()[0].code(), "err_missing_exponent");
    }

    #[test]
    fn bare_hex_prefix_is_a_bad_suffix() {
        let (n, engine) = parse("0x");
        assert!(n.has_error);
        assert_eq!(engine.diagnostics()[0].code(), "err_invalid_suffix");
    }

    #[test]
    fn unsigned_on_floating_is_an_error() {
        let (n, engine) = parse("1.5u");
        assert!(n.has_error);
        assert_eq!(engine.diagnostics()[0].code(), "err_invalid_suffix");
    }

    #[test]
    fn float_suffix_on_integer_is_an_error() {
        let (n, engine) = parse("42f");
        assert!(n.has_error);
        assert_eq!(engine.diagnostics()[0].code(), "err_invalid_suffix");
    }

    #[test]
    fn long_double_suffix_is_fine() {
        let (n, _) = parse("1.5L");
        assert!(!n.has_error);
        assert!(n.is_long);
        assert!(!n.is_float);
    }

    #[test]
    fn long_long_on_floating_is_an_error() {
        let (n, engine) = parse("1.5LL");
        assert!(n.has_error);
        assert_eq!(engine.diagnostics()[0].code(), "err_invalid_suffix");
    }

    #[test]
    fn overflow_saturates_and_flags() {
        let (n, _) = parse("18446744073709551616ull");
        assert!(!n.has_error);
        let (value, overflowed) = n.eval_to_integer();
        assert!(overflowed);
        assert_eq!(value, u64::MAX);
    }

    #[test]
    fn u64_max_does_not_overflow() {
        let (n, _) = parse("18446744073709551615");
        assert_eq!(n.eval_to_integer(), (u64::MAX, false));
    }

    #[test]
    fn hex_eval() {
        let (n, _) = parse("0xFFFFFFFFFFFFFFFF");
        assert_eq!(n.eval_to_integer(), (u64::MAX, false));
        let (n, _) = parse("0x10000000000000000");
        assert!(n.eval_to_integer().1);
    }

    #[test]
    fn dirty_spelling_evaluates_through_splices() {
        // 4\<LF>2ULL, an escaped newline in the middle of the digits.
        let (n, engine) = parse("4\\\n2ULL");
        assert!(!n.has_error, "{:?}", engine.diagnostics());
        assert!(n.is_unsigned && n.is_long_long);
        assert_eq!(n.eval_to_integer(), (42, false));
    }

    #[test]
    fn plain_zero_is_octal() {
        let (n, _) = parse("0");
        assert!(!n.has_error);
        assert_eq!(n.radix, 8);
        assert_eq!(n.eval_to_integer(), (0, false));
    }
}

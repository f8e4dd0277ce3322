//! String literal concatenation and decoding (C11 6.4.5, 5.1.1.2 phase 6).
//!
//! Adjacent string literals concatenate into one object. The tokens keep
//! their own encodings until this analyzer reconciles them, decodes each
//! body, and writes the result as code units of the combined encoding, in
//! target byte order, with a trailing null code unit.

use cyn_diagnostic::{DiagnosticEngine, DiagnosticKind, SourceLocation};
use cyn_lexer_core::{CharReader, SourceBuffer, Token};
use tracing::trace;

use crate::escape::{decode_escape, Decoded};
use crate::target::{Endianness, LiteralEncoding, TargetInfo};

/// The decoded contents of a run of adjacent string literals.
#[derive(Debug)]
pub struct StringConcatenation {
    /// Decoded code units in target byte order, null terminator included.
    /// Always a whole number of code units.
    pub result_buf: Vec<u8>,
    /// Bytes per code unit: 1, 2, or 4.
    pub char_byte_width: u32,
    /// The reconciled encoding of the concatenation.
    pub encoding: LiteralEncoding,
    pub has_error: bool,
}

impl StringConcatenation {
    /// Concatenate and decode adjacent string-literal tokens.
    ///
    /// Every token must be a string literal lexed from `buffer`. Decoding is
    /// best-effort: errors are reported and recorded, then decoding
    /// continues so one run can surface several problems.
    pub fn parse(
        tokens: &[Token],
        buffer: &SourceBuffer,
        engine: &DiagnosticEngine,
        target: &TargetInfo,
    ) -> StringConcatenation {
        debug_assert!(!tokens.is_empty(), "empty string concatenation");
        trace!(count = tokens.len(), "concatenating string literals");

        // Reconcile encodings: narrow is absorbed by anything, identical
        // prefixed encodings merge, everything else conflicts.
        let mut encoding = LiteralEncoding::Narrow;
        let mut has_error = false;
        for tok in tokens {
            debug_assert!(tok.kind.is_string_literal(), "not a string: {:?}", tok.kind);
            let Some(tok_encoding) = LiteralEncoding::for_token(tok.kind) else {
                continue;
            };
            match combine(encoding, tok_encoding) {
                Some(combined) => encoding = combined,
                None => {
                    engine.report(
                        buffer.location_for_offset(tok.span.start),
                        DiagnosticKind::NonstandardStringConcat,
                    );
                    has_error = true;
                }
            }
        }

        let char_byte_width = encoding.char_byte_width(target);
        let max_unit = encoding.max_code_unit(target);

        // Generous upper bound: decoding never grows a spelling, and the
        // terminator needs one more unit.
        let spelled: usize = tokens.iter().map(|t| t.span.len() as usize).sum();
        let mut out = Writer {
            buf: Vec::with_capacity(spelled * char_byte_width as usize + char_byte_width as usize),
            width: char_byte_width,
            endianness: target.endianness,
        };

        for tok in tokens {
            let spelling = tok.spelling(buffer);
            has_error |= decode_one(
                spelling,
                tok.span.start,
                max_unit,
                &mut out,
                engine,
            );
        }

        out.push_unit(0);

        StringConcatenation {
            result_buf: out.buf,
            char_byte_width,
            encoding,
            has_error,
        }
    }
}

/// Encoding closure for one concatenation step.
fn combine(a: LiteralEncoding, b: LiteralEncoding) -> Option<LiteralEncoding> {
    if a == b {
        Some(a)
    } else if a == LiteralEncoding::Narrow {
        Some(b)
    } else if b == LiteralEncoding::Narrow {
        Some(a)
    } else {
        None
    }
}

/// Decode one token body into `out`; returns whether an error occurred.
fn decode_one(
    spelling: &str,
    base_offset: u32,
    max_unit: u64,
    out: &mut Writer,
    engine: &DiagnosticEngine,
) -> bool {
    let reader = CharReader::new(spelling.as_bytes());
    let mut pos = 0u32;
    let mut has_error = false;

    // Skip the encoding prefix (if any) and the opening quote.
    loop {
        let p = reader.peek(pos);
        if p.ch == 0 {
            return has_error;
        }
        pos += p.size;
        if p.ch == b'"' {
            break;
        }
    }

    loop {
        let p = reader.peek(pos);
        match p.ch {
            // Closing quote or (defensively) a truncated spelling.
            b'"' | 0 => break,
            b'\\' => {
                pos += p.size;
                let escape = decode_escape(&reader, &mut pos, base_offset, engine);
                has_error |= escape.has_error;
                match escape.value {
                    Decoded::CodeUnit(unit) => {
                        if unit > max_unit {
                            engine.report(
                                SourceLocation::from_offset(base_offset),
                                DiagnosticKind::CharConstOverflow,
                            );
                            has_error = true;
                        }
                        out.push_unit(truncate(unit));
                    }
                    Decoded::CodePoint(code_point) => {
                        has_error |=
                            out.push_code_point(code_point, base_offset, engine);
                    }
                }
            }
            byte if byte < 0x80 || out.width == 1 => {
                // Plain bytes pass through unchanged for single-byte
                // encodings; ASCII is a single code unit everywhere.
                pos += p.size;
                out.push_unit(u32::from(byte));
            }
            lead => {
                // Multi-byte UTF-8 source character, re-encoded to the
                // target width.
                let char_start = pos + p.size - 1;
                let width = utf8_char_width(lead);
                let code_point = decode_utf8(&reader, char_start, width);
                pos = char_start + width;
                has_error |= out.push_code_point(code_point, base_offset, engine);
            }
        }
    }
    has_error
}

/// Writes code units into the result buffer in target byte order.
struct Writer {
    buf: Vec<u8>,
    width: u32,
    endianness: Endianness,
}

impl Writer {
    fn push_unit(&mut self, unit: u32) {
        match (self.width, self.endianness) {
            (1, _) => self.buf.push(unit as u8),
            (2, Endianness::Little) => self.buf.extend_from_slice(&(unit as u16).to_le_bytes()),
            (2, Endianness::Big) => self.buf.extend_from_slice(&(unit as u16).to_be_bytes()),
            (_, Endianness::Little) => self.buf.extend_from_slice(&unit.to_le_bytes()),
            (_, Endianness::Big) => self.buf.extend_from_slice(&unit.to_be_bytes()),
        }
    }

    /// Encode a code point into the output encoding; returns whether an
    /// error occurred.
    fn push_code_point(
        &mut self,
        code_point: u32,
        base_offset: u32,
        engine: &DiagnosticEngine,
    ) -> bool {
        match self.width {
            1 => {
                // Narrow and UTF-8 strings carry UCNs as UTF-8 bytes.
                if let Some(c) = char::from_u32(code_point) {
                    let mut utf8 = [0u8; 4];
                    for byte in c.encode_utf8(&mut utf8).bytes() {
                        self.buf.push(byte);
                    }
                    false
                } else {
                    self.report_unencodable(base_offset, engine);
                    self.push_unit(code_point);
                    true
                }
            }
            2 => {
                if let Some(c) = char::from_u32(code_point) {
                    let mut utf16 = [0u16; 2];
                    for unit in c.encode_utf16(&mut utf16) {
                        self.push_unit(u32::from(*unit));
                    }
                    false
                } else {
                    self.report_unencodable(base_offset, engine);
                    self.push_unit(code_point);
                    true
                }
            }
            _ => {
                self.push_unit(code_point);
                false
            }
        }
    }

    fn report_unencodable(&self, base_offset: u32, engine: &DiagnosticEngine) {
        engine.report(
            SourceLocation::from_offset(base_offset),
            DiagnosticKind::CharConstOverflow,
        );
    }
}

fn truncate(unit: u64) -> u32 {
    (unit & 0xFFFF_FFFF) as u32
}

fn utf8_char_width(lead: u8) -> u32 {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

fn decode_utf8(reader: &CharReader<'_>, start: u32, width: u32) -> u32 {
    let mut bytes = [0u8; 4];
    for (i, slot) in bytes.iter_mut().enumerate().take(width as usize) {
        *slot = reader.byte(start + i as u32);
    }
    std::str::from_utf8(&bytes[..width as usize])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(u32::from(char::REPLACEMENT_CHARACTER), u32::from)
}

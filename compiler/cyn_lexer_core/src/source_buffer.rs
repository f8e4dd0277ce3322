//! Sentinel-terminated source buffer with line/column lookup.
//!
//! The buffer guarantees a `0x00` byte after the source content, so the
//! scanner can detect end of input without explicit bounds checking. The
//! total allocation is rounded up to the next 64-byte boundary; the padding
//! is zero-filled, which also makes multi-byte lookahead near the end of the
//! buffer safe.
//!
//! A `0x00` byte *inside* the source is indistinguishable from the sentinel
//! on purpose: the tokenizer treats any NUL as end of input, matching the
//! dispatch rule for `\0`.

use cyn_diagnostic::{SourceLocation, Span};
use std::cell::OnceCell;

use crate::char_reader::CharReader;

/// Cache line size in bytes, used for buffer padding.
const CACHE_LINE: usize = 64;

/// Sentinel-terminated source buffer.
///
/// # Layout
///
/// ```text
/// [source_bytes..., 0x00, zero padding...]
///  ^                ^     ^
///  0           source_len rounded up to a 64-byte boundary
/// ```
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    /// Owned buffer: source bytes, sentinel, zero padding.
    buf: Vec<u8>,
    /// Length of the source content (excludes sentinel and padding).
    source_len: u32,
    /// Byte offsets of line starts, built on first line/column query.
    line_starts: OnceCell<Vec<u32>>,
}

impl SourceBuffer {
    /// Create a buffer from source text.
    ///
    /// Sources larger than `u32::MAX` bytes saturate `len()`; a front-end
    /// driver is expected to reject such files before lexing.
    pub fn from_source(source: &str) -> SourceBuffer {
        let source_bytes = source.as_bytes();
        let source_len = source_bytes.len();

        // Round up to the next 64-byte boundary (minimum: source + sentinel).
        let padded_len = (source_len + 1 + CACHE_LINE - 1) & !(CACHE_LINE - 1);

        let mut buf = vec![0u8; padded_len];
        buf[..source_len].copy_from_slice(source_bytes);

        SourceBuffer {
            buf,
            source_len: u32::try_from(source_len).unwrap_or(u32::MAX),
            line_starts: OnceCell::new(),
        }
    }

    /// Length of the source content in bytes.
    pub fn len(&self) -> u32 {
        self.source_len
    }

    /// Whether the source content is empty.
    pub fn is_empty(&self) -> bool {
        self.source_len == 0
    }

    /// The source bytes (without sentinel or padding).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.source_len as usize]
    }

    /// The full buffer including sentinel and padding.
    ///
    /// The byte at index [`len()`](Self::len) is the sentinel (`0x00`).
    pub fn as_sentinel_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Create a [`CharReader`] over the padded buffer.
    pub fn reader(&self) -> CharReader<'_> {
        CharReader::new(&self.buf)
    }

    /// Extract the spelling of a span.
    ///
    /// # Contract
    ///
    /// `span` must come from a token produced over this buffer; the scanner
    /// only forms token boundaries on UTF-8 character boundaries.
    #[allow(unsafe_code)]
    pub fn text_slice(&self, span: Span) -> &str {
        debug_assert!(
            span.end <= self.source_len,
            "span end {} exceeds source length {}",
            span.end,
            self.source_len
        );
        let bytes = &self.buf[span.start as usize..span.end as usize];
        debug_assert!(
            std::str::from_utf8(bytes).is_ok(),
            "token span {}..{} is not on UTF-8 boundaries",
            span.start,
            span.end
        );
        // SAFETY: the buffer was constructed from `&str` (valid UTF-8) and
        // the scanner forms token boundaries only at character boundaries.
        unsafe { std::str::from_utf8_unchecked(bytes) }
    }

    /// Location handle for a byte offset.
    pub fn location_for_offset(&self, offset: u32) -> SourceLocation {
        debug_assert!(offset <= self.source_len);
        SourceLocation::from_offset(offset)
    }

    /// Convert a location to 1-based line and column numbers.
    ///
    /// Column counts bytes from the line start; multi-byte characters are a
    /// presentation concern left to the diagnostic renderer.
    pub fn line_col(&self, loc: SourceLocation) -> (u32, u32) {
        let starts = self.line_starts.get_or_init(|| self.compute_line_starts());
        let offset = loc.offset().min(self.source_len);
        // partition_point returns the number of line starts <= offset;
        // that count is the 1-based line number.
        let line = starts.partition_point(|&s| s <= offset);
        let line_start = starts[line - 1];
        (
            u32::try_from(line).unwrap_or(u32::MAX),
            offset - line_start + 1,
        )
    }

    fn compute_line_starts(&self) -> Vec<u32> {
        let mut starts = vec![0u32];
        let source = self.as_bytes();
        let mut base = 0usize;
        while let Some(found) = memchr::memchr(b'\n', &source[base..]) {
            let next = base + found + 1;
            starts.push(u32::try_from(next).unwrap_or(u32::MAX));
            base = next;
        }
        starts
    }
}

//! The logical-character layer.
//!
//! C's translation phase 2 splices lines: a backslash immediately followed by
//! a newline sequence disappears, and the surrounding lines become one. The
//! splice may land inside any token, which is what makes a byte-by-byte
//! C tokenizer wrong. This module is the single place that knows about
//! escaped newlines: it exposes "peek one logical character and its byte
//! width" and "advance past one logical character", and everything above it
//! works on the idealized stream while source ranges stay byte-exact.
//!
//! The `?` byte takes the same slow path as `\` as a placeholder for
//! trigraph support; today it behaves like any other byte.
//!
//! The reader works over any byte slice: the scanner hands it the
//! sentinel-padded buffer, and the literal analyzers hand it a bare token
//! spelling. Reads past the end of the slice yield `0`, so a spelling slice
//! behaves exactly like a sentinel-terminated buffer.

use crate::token::TokenFlags;

/// A peeked logical character: the byte value and how many raw bytes it
/// occupies (escaped newlines included).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Peeked {
    /// The logical character.
    pub ch: u8,
    /// Raw bytes to skip to get past it.
    pub size: u32,
}

/// Whether a byte can be handled by the fast path.
///
/// `\` may start an escaped newline; `?` is reserved for trigraphs.
#[inline]
const fn is_trivial(byte: u8) -> bool {
    byte != b'?' && byte != b'\\'
}

#[inline]
const fn is_newline(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

#[inline]
const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\x0b' | b'\x0c') || is_newline(byte)
}

/// Pure function layer over a byte buffer, yielding logical characters.
#[derive(Clone, Copy, Debug)]
pub struct CharReader<'a> {
    bytes: &'a [u8],
}

impl<'a> CharReader<'a> {
    /// Create a reader over a buffer or spelling slice.
    pub fn new(bytes: &'a [u8]) -> CharReader<'a> {
        CharReader { bytes }
    }

    /// Raw byte at `pos`; `0` past the end.
    #[inline]
    pub fn byte(&self, pos: u32) -> u8 {
        self.bytes.get(pos as usize).copied().unwrap_or(0)
    }

    /// Peek the logical character at `pos`.
    ///
    /// Fast path: a trivial byte is itself, with size 1. The slow path
    /// resolves escaped newlines; the dirty bit is *not* recorded here.
    /// That happens on [`consume`](Self::consume) or
    /// [`advance`](Self::advance), which know what token is being formed.
    #[inline]
    pub fn peek(&self, pos: u32) -> Peeked {
        let byte = self.byte(pos);
        if is_trivial(byte) {
            return Peeked { ch: byte, size: 1 };
        }
        self.peek_nontrivial(pos, None)
    }

    /// Consume a previously peeked character, returning the new position.
    ///
    /// If the peek was not a single plain byte, the character is re-peeked
    /// so that any escaped newline marks the token dirty.
    #[inline]
    pub fn consume(&self, pos: u32, peeked: Peeked, flags: &mut TokenFlags) -> u32 {
        if peeked.size == 1 {
            return pos + 1;
        }
        let repeeked = self.peek_nontrivial(pos, Some(flags));
        pos + repeeked.size
    }

    /// Peek and consume one logical character in a single step.
    #[inline]
    pub fn advance(&self, pos: &mut u32, flags: &mut TokenFlags) -> u8 {
        let byte = self.byte(*pos);
        if is_trivial(byte) {
            *pos += 1;
            return byte;
        }
        let peeked = self.peek_nontrivial(*pos, Some(flags));
        *pos += peeked.size;
        peeked.ch
    }

    /// Slow path: resolve escaped newlines (and, one day, trigraphs).
    ///
    /// Each escaped newline skips `\` plus the newline sequence and the scan
    /// continues at the following byte, accumulating the total width.
    fn peek_nontrivial(&self, start: u32, mut flags: Option<&mut TokenFlags>) -> Peeked {
        let mut pos = start;
        loop {
            let byte = self.byte(pos);
            if byte == b'\\' {
                let next = self.byte(pos + 1);
                // Only whitespace ever needs escaping; a backslash before
                // anything else is an ordinary (likely UCN) backslash.
                if is_whitespace(next) {
                    let nl = self.escaped_newline_size(pos + 1);
                    if nl > 0 {
                        if let Some(f) = flags.as_deref_mut() {
                            f.set(TokenFlags::IS_DIRTY);
                        }
                        pos += 1 + nl;
                        continue;
                    }
                }
                return Peeked {
                    ch: b'\\',
                    size: pos - start + 1,
                };
            }
            // `?` placeholder for trigraphs: currently a plain byte.
            return Peeked {
                ch: byte,
                size: pos - start + 1,
            };
        }
    }

    /// Width of the newline sequence at `pos`, or 0 if there is none.
    ///
    /// `\n`, `\r`, `\r\n`, and `\n\r` all count as one escaped newline.
    fn escaped_newline_size(&self, pos: u32) -> u32 {
        let first = self.byte(pos);
        if !is_newline(first) {
            return 0;
        }
        let second = self.byte(pos + 1);
        if is_newline(second) && second != first {
            2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peek_str(source: &str, pos: u32) -> Peeked {
        CharReader::new(source.as_bytes()).peek(pos)
    }

    #[test]
    fn trivial_byte_has_size_one() {
        assert_eq!(peek_str("abc", 0), Peeked { ch: b'a', size: 1 });
        assert_eq!(peek_str("abc", 2), Peeked { ch: b'c', size: 1 });
    }

    #[test]
    fn past_end_yields_zero() {
        assert_eq!(peek_str("x", 1), Peeked { ch: 0, size: 1 });
        assert_eq!(peek_str("x", 99), Peeked { ch: 0, size: 1 });
    }

    #[test]
    fn escaped_lf_splices() {
        // "a\<LF>b": peeking at the backslash yields 'b' spanning 3 bytes.
        assert_eq!(peek_str("a\\\nb", 1), Peeked { ch: b'b', size: 3 });
    }

    #[test]
    fn escaped_crlf_and_lfcr_splice() {
        assert_eq!(peek_str("\\\r\nx", 0), Peeked { ch: b'x', size: 4 });
        assert_eq!(peek_str("\\\n\rx", 0), Peeked { ch: b'x', size: 4 });
    }

    #[test]
    fn lone_cr_splices() {
        assert_eq!(peek_str("\\\rx", 0), Peeked { ch: b'x', size: 3 });
    }

    #[test]
    fn two_same_newlines_are_one_each() {
        // "\<LF><LF>x": only the first LF belongs to the splice; the peeked
        // character is the second LF.
        assert_eq!(peek_str("\\\n\nx", 0), Peeked { ch: b'\n', size: 3 });
    }

    #[test]
    fn consecutive_escaped_newlines_splice_through() {
        assert_eq!(peek_str("\\\n\\\nz", 0), Peeked { ch: b'z', size: 5 });
    }

    #[test]
    fn backslash_before_nonwhitespace_is_itself() {
        assert_eq!(peek_str("\\u1234", 0), Peeked { ch: b'\\', size: 1 });
    }

    #[test]
    fn backslash_before_space_is_itself() {
        assert_eq!(peek_str("\\ x", 0), Peeked { ch: b'\\', size: 1 });
    }

    #[test]
    fn backslash_at_end_is_itself() {
        assert_eq!(peek_str("\\", 0), Peeked { ch: b'\\', size: 1 });
    }

    #[test]
    fn question_mark_is_currently_trivial() {
        assert_eq!(peek_str("??=", 0), Peeked { ch: b'?', size: 1 });
    }

    #[test]
    fn consume_plain_advances_one() {
        let reader = CharReader::new(b"ab");
        let mut flags = TokenFlags::EMPTY;
        let p = reader.peek(0);
        assert_eq!(reader.consume(0, p, &mut flags), 1);
        assert!(!flags.is_dirty());
    }

    #[test]
    fn consume_spliced_sets_dirty() {
        let reader = CharReader::new(b"\\\nx");
        let mut flags = TokenFlags::EMPTY;
        let p = reader.peek(0);
        assert_eq!(p.ch, b'x');
        assert_eq!(reader.consume(0, p, &mut flags), 3);
        assert!(flags.is_dirty());
    }

    #[test]
    fn advance_walks_logical_characters() {
        let reader = CharReader::new(b"a\\\nbc");
        let mut flags = TokenFlags::EMPTY;
        let mut pos = 0;
        assert_eq!(reader.advance(&mut pos, &mut flags), b'a');
        assert!(!flags.is_dirty());
        assert_eq!(reader.advance(&mut pos, &mut flags), b'b');
        assert!(flags.is_dirty());
        assert_eq!(reader.advance(&mut pos, &mut flags), b'c');
        assert_eq!(pos, 5);
    }

    mod proptest_reader {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Advancing logical characters always terminates and covers the
            /// whole input: widths are positive and sum to the byte length
            /// once the trailing zero region is reached.
            #[test]
            fn advance_terminates_and_is_positive(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
                let reader = CharReader::new(&bytes);
                let mut flags = TokenFlags::EMPTY;
                let mut pos = 0u32;
                let mut steps = 0usize;
                while (pos as usize) < bytes.len() {
                    let before = pos;
                    reader.advance(&mut pos, &mut flags);
                    prop_assert!(pos > before);
                    steps += 1;
                    prop_assert!(steps <= bytes.len() + 1);
                }
            }

            /// peek followed by consume lands at the same position as advance.
            #[test]
            fn peek_consume_matches_advance(bytes in proptest::collection::vec(any::<u8>(), 0..64), start in 0u32..64) {
                let reader = CharReader::new(&bytes);
                let mut f1 = TokenFlags::EMPTY;
                let mut f2 = TokenFlags::EMPTY;
                let peeked = reader.peek(start);
                let consumed = reader.consume(start, peeked, &mut f1);
                let mut pos = start;
                let ch = reader.advance(&mut pos, &mut f2);
                prop_assert_eq!(consumed, pos);
                prop_assert_eq!(peeked.ch, ch);
                prop_assert_eq!(f1, f2);
            }
        }
    }
}

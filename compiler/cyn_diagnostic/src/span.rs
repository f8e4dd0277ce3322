//! Byte spans and source locations.

/// Half-open byte interval `[start, end)` into a source buffer.
///
/// Spans use `u32` offsets to keep tokens compact; a single translation unit
/// is limited to 4 GiB of source, which the buffer layer enforces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// First byte of the interval.
    pub start: u32,
    /// One past the last byte of the interval.
    pub end: u32,
}

impl Span {
    /// Placeholder span for synthesized tokens (e.g. the `eof` sentinel).
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    /// Create a span from start and end offsets.
    ///
    /// Debug-asserts `start <= end`; an empty span is valid only for
    /// synthesized tokens.
    #[inline]
    pub fn new(start: u32, end: u32) -> Span {
        debug_assert!(start <= end, "span start {start} exceeds end {end}");
        Span { start, end }
    }

    /// Length of the interval in bytes.
    #[inline]
    pub fn len(self) -> u32 {
        self.end - self.start
    }

    /// Whether the interval is empty.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Location of the first byte.
    #[inline]
    pub fn location(self) -> SourceLocation {
        SourceLocation::from_offset(self.start)
    }
}

/// Opaque handle to a position in the source buffer.
///
/// Conceptually a byte offset; the source buffer converts it to line/column
/// on demand. Kept distinct from a raw `u32` so positions cannot be mixed up
/// with lengths or counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SourceLocation(u32);

impl SourceLocation {
    /// Create a location from a byte offset.
    #[inline]
    pub const fn from_offset(offset: u32) -> SourceLocation {
        SourceLocation(offset)
    }

    /// The byte offset this location stands for.
    #[inline]
    pub const fn offset(self) -> u32 {
        self.0
    }
}

// Size assertions: spans are 8 bytes, locations 4.
const _: () = assert!(std::mem::size_of::<Span>() == 8);
const _: () = assert!(std::mem::size_of::<SourceLocation>() == 4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_len() {
        assert_eq!(Span::new(3, 8).len(), 5);
        assert_eq!(Span::new(4, 4).len(), 0);
        assert!(Span::new(4, 4).is_empty());
    }

    #[test]
    fn span_location_is_start() {
        assert_eq!(Span::new(7, 9).location(), SourceLocation::from_offset(7));
    }

    #[test]
    fn location_roundtrip() {
        assert_eq!(SourceLocation::from_offset(42).offset(), 42);
    }
}

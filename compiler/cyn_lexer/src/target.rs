//! Target description consumed by the literal analyzers.

use cyn_lexer_core::TokenKind;

/// Byte order of the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// The slice of target information the lexer cares about: character type
/// widths and byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetInfo {
    /// Width of `wchar_t` in bytes.
    pub wide_char_width: u32,
    /// Width of `char16_t` in bytes.
    pub char16_width: u32,
    /// Width of `char32_t` in bytes.
    pub char32_width: u32,
    /// Byte order used when writing decoded string buffers.
    pub endianness: Endianness,
}

impl Default for TargetInfo {
    /// A typical hosted target: 4-byte `wchar_t`, UTF-16/UTF-32 character
    /// types at their natural widths, host byte order.
    fn default() -> TargetInfo {
        TargetInfo {
            wide_char_width: 4,
            char16_width: 2,
            char32_width: 4,
            endianness: if cfg!(target_endian = "big") {
                Endianness::Big
            } else {
                Endianness::Little
            },
        }
    }
}

/// Which execution encoding a literal token uses.
///
/// `Narrow` is a plain, prefixless literal; it is absorbed by any prefixed
/// encoding during string concatenation. A plain character constant lexes as
/// [`TokenKind::Utf8CharConstant`], so `Narrow` only arises from plain
/// string literals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralEncoding {
    /// `"…"`
    Narrow,
    /// `'…'` and `u8"…"`
    Utf8,
    /// `u'…'` and `u"…"`
    Utf16,
    /// `U'…'` and `U"…"`
    Utf32,
    /// `L'…'` and `L"…"`
    Wide,
}

impl LiteralEncoding {
    /// The encoding of a literal token kind, if it is one.
    pub fn for_token(kind: TokenKind) -> Option<LiteralEncoding> {
        match kind {
            TokenKind::StringLiteral => Some(LiteralEncoding::Narrow),
            TokenKind::Utf8CharConstant | TokenKind::Utf8StringLiteral => {
                Some(LiteralEncoding::Utf8)
            }
            TokenKind::Utf16CharConstant | TokenKind::Utf16StringLiteral => {
                Some(LiteralEncoding::Utf16)
            }
            TokenKind::Utf32CharConstant | TokenKind::Utf32StringLiteral => {
                Some(LiteralEncoding::Utf32)
            }
            TokenKind::WideCharConstant | TokenKind::WideStringLiteral => {
                Some(LiteralEncoding::Wide)
            }
            _ => None,
        }
    }

    /// Width in bytes of one code unit of this encoding.
    pub fn char_byte_width(self, target: &TargetInfo) -> u32 {
        match self {
            LiteralEncoding::Narrow | LiteralEncoding::Utf8 => 1,
            LiteralEncoding::Utf16 => target.char16_width,
            LiteralEncoding::Utf32 => target.char32_width,
            LiteralEncoding::Wide => target.wide_char_width,
        }
    }

    /// Largest value a single code unit of this encoding can hold, given the
    /// target widths.
    pub fn max_code_unit(self, target: &TargetInfo) -> u64 {
        match self.char_byte_width(target) {
            1 => 0xFF,
            2 => 0xFFFF,
            _ => 0xFFFF_FFFF,
        }
    }

    /// The string-literal token kind that carries this encoding.
    pub fn string_token_kind(self) -> TokenKind {
        match self {
            LiteralEncoding::Narrow => TokenKind::StringLiteral,
            LiteralEncoding::Utf8 => TokenKind::Utf8StringLiteral,
            LiteralEncoding::Utf16 => TokenKind::Utf16StringLiteral,
            LiteralEncoding::Utf32 => TokenKind::Utf32StringLiteral,
            LiteralEncoding::Wide => TokenKind::WideStringLiteral,
        }
    }
}

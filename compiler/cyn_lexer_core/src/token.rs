//! Token kinds, flags, and the token value itself.

use cyn_diagnostic::Span;
use std::fmt;

use crate::source_buffer::SourceBuffer;

/// The closed set of token kinds.
///
/// Keywords are resolved by the identifier scanner; dirty or UCN-bearing
/// identifiers deliberately stay [`Identifier`](TokenKind::Identifier) and
/// are left to a later normalization pass. Digraphs never get kinds of their
/// own; `<:` produces [`LBracket`](TokenKind::LBracket) and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Keywords (C11 6.4.1) ===
    KwAuto,
    KwBreak,
    KwCase,
    KwChar,
    KwConst,
    KwContinue,
    KwDefault,
    KwDo,
    KwDouble,
    KwElse,
    KwEnum,
    KwExtern,
    KwFloat,
    KwFor,
    KwGoto,
    KwIf,
    KwInline,
    KwInt,
    KwLong,
    KwRegister,
    KwRestrict,
    KwReturn,
    KwShort,
    KwSigned,
    KwSizeof,
    KwStatic,
    KwStruct,
    KwSwitch,
    KwTypedef,
    KwUnion,
    KwUnsigned,
    KwVoid,
    KwVolatile,
    KwWhile,
    KwAlignas,
    KwAlignof,
    KwAtomic,
    KwBool,
    KwComplex,
    KwGeneric,
    KwImaginary,
    KwNoreturn,
    KwStaticAssert,
    KwThreadLocal,

    // === Identifiers & literal categories ===
    Identifier,
    NumericConstant,
    /// `'…'` (a plain character constant lexes with UTF-8 semantics).
    Utf8CharConstant,
    /// `u'…'`
    Utf16CharConstant,
    /// `U'…'`
    Utf32CharConstant,
    /// `L'…'`
    WideCharConstant,
    /// `"…"`, with no encoding prefix.
    StringLiteral,
    /// `u8"…"`
    Utf8StringLiteral,
    /// `u"…"`
    Utf16StringLiteral,
    /// `U"…"`
    Utf32StringLiteral,
    /// `L"…"`
    WideStringLiteral,

    // === Punctuators (C11 6.4.6) ===
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Period,
    Arrow,
    PlusPlus,
    MinusMinus,
    Amp,
    Star,
    Plus,
    Minus,
    Tilde,
    Exclaim,
    Slash,
    Percent,
    LessLess,
    GreaterGreater,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    EqualEqual,
    ExclaimEqual,
    Caret,
    Pipe,
    AmpAmp,
    PipePipe,
    Question,
    Colon,
    Semi,
    Ellipsis,
    Equal,
    StarEqual,
    SlashEqual,
    PercentEqual,
    PlusEqual,
    MinusEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    AmpEqual,
    CaretEqual,
    PipeEqual,
    Comma,
    Hash,
    HashHash,

    // === Sentinels ===
    Unknown,
    Eof,
}

impl TokenKind {
    /// Canonical printed form of this kind.
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            KwAuto => "auto",
            KwBreak => "break",
            KwCase => "case",
            KwChar => "char",
            KwConst => "const",
            KwContinue => "continue",
            KwDefault => "default",
            KwDo => "do",
            KwDouble => "double",
            KwElse => "else",
            KwEnum => "enum",
            KwExtern => "extern",
            KwFloat => "float",
            KwFor => "for",
            KwGoto => "goto",
            KwIf => "if",
            KwInline => "inline",
            KwInt => "int",
            KwLong => "long",
            KwRegister => "register",
            KwRestrict => "restrict",
            KwReturn => "return",
            KwShort => "short",
            KwSigned => "signed",
            KwSizeof => "sizeof",
            KwStatic => "static",
            KwStruct => "struct",
            KwSwitch => "switch",
            KwTypedef => "typedef",
            KwUnion => "union",
            KwUnsigned => "unsigned",
            KwVoid => "void",
            KwVolatile => "volatile",
            KwWhile => "while",
            KwAlignas => "_Alignas",
            KwAlignof => "_Alignof",
            KwAtomic => "_Atomic",
            KwBool => "_Bool",
            KwComplex => "_Complex",
            KwGeneric => "_Generic",
            KwImaginary => "_Imaginary",
            KwNoreturn => "_Noreturn",
            KwStaticAssert => "_Static_assert",
            KwThreadLocal => "_Thread_local",
            Identifier => "identifier",
            NumericConstant => "numeric constant",
            Utf8CharConstant => "character constant",
            Utf16CharConstant => "char16_t character constant",
            Utf32CharConstant => "char32_t character constant",
            WideCharConstant => "wide character constant",
            StringLiteral => "string literal",
            Utf8StringLiteral => "UTF-8 string literal",
            Utf16StringLiteral => "char16_t string literal",
            Utf32StringLiteral => "char32_t string literal",
            WideStringLiteral => "wide string literal",
            LBracket => "[",
            RBracket => "]",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            Period => ".",
            Arrow => "->",
            PlusPlus => "++",
            MinusMinus => "--",
            Amp => "&",
            Star => "*",
            Plus => "+",
            Minus => "-",
            Tilde => "~",
            Exclaim => "!",
            Slash => "/",
            Percent => "%",
            LessLess => "<<",
            GreaterGreater => ">>",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            EqualEqual => "==",
            ExclaimEqual => "!=",
            Caret => "^",
            Pipe => "|",
            AmpAmp => "&&",
            PipePipe => "||",
            Question => "?",
            Colon => ":",
            Semi => ";",
            Ellipsis => "...",
            Equal => "=",
            StarEqual => "*=",
            SlashEqual => "/=",
            PercentEqual => "%=",
            PlusEqual => "+=",
            MinusEqual => "-=",
            LessLessEqual => "<<=",
            GreaterGreaterEqual => ">>=",
            AmpEqual => "&=",
            CaretEqual => "^=",
            PipeEqual => "|=",
            Comma => ",",
            Hash => "#",
            HashHash => "##",
            Unknown => "<unknown>",
            Eof => "<end of input>",
        }
    }

    /// Whether this kind is a keyword.
    ///
    /// Keywords are declared first, so a discriminant comparison suffices.
    pub fn is_keyword(self) -> bool {
        self as u8 <= TokenKind::KwThreadLocal as u8
    }

    /// Whether this kind is a character constant of any encoding.
    pub fn is_char_constant(self) -> bool {
        matches!(
            self,
            TokenKind::Utf8CharConstant
                | TokenKind::Utf16CharConstant
                | TokenKind::Utf32CharConstant
                | TokenKind::WideCharConstant
        )
    }

    /// Whether this kind is a string literal of any encoding.
    pub fn is_string_literal(self) -> bool {
        matches!(
            self,
            TokenKind::StringLiteral
                | TokenKind::Utf8StringLiteral
                | TokenKind::Utf16StringLiteral
                | TokenKind::Utf32StringLiteral
                | TokenKind::WideStringLiteral
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve an identifier spelling to a keyword kind.
///
/// Length-bucketed: keywords are 2–14 bytes, so most identifiers are
/// rejected on length alone. Observably identical to a linear scan over the
/// keyword list.
pub fn keyword_lookup(text: &str) -> Option<TokenKind> {
    use TokenKind::*;
    let kind = match text.len() {
        2 => match text {
            "do" => KwDo,
            "if" => KwIf,
            _ => return None,
        },
        3 => match text {
            "for" => KwFor,
            "int" => KwInt,
            _ => return None,
        },
        4 => match text {
            "auto" => KwAuto,
            "case" => KwCase,
            "char" => KwChar,
            "else" => KwElse,
            "enum" => KwEnum,
            "goto" => KwGoto,
            "long" => KwLong,
            "void" => KwVoid,
            _ => return None,
        },
        5 => match text {
            "break" => KwBreak,
            "const" => KwConst,
            "float" => KwFloat,
            "short" => KwShort,
            "union" => KwUnion,
            "while" => KwWhile,
            "_Bool" => KwBool,
            _ => return None,
        },
        6 => match text {
            "double" => KwDouble,
            "extern" => KwExtern,
            "inline" => KwInline,
            "return" => KwReturn,
            "signed" => KwSigned,
            "sizeof" => KwSizeof,
            "static" => KwStatic,
            "struct" => KwStruct,
            "switch" => KwSwitch,
            _ => return None,
        },
        7 => match text {
            "default" => KwDefault,
            "typedef" => KwTypedef,
            "_Atomic" => KwAtomic,
            _ => return None,
        },
        8 => match text {
            "continue" => KwContinue,
            "register" => KwRegister,
            "restrict" => KwRestrict,
            "unsigned" => KwUnsigned,
            "volatile" => KwVolatile,
            "_Alignas" => KwAlignas,
            "_Alignof" => KwAlignof,
            "_Complex" => KwComplex,
            "_Generic" => KwGeneric,
            _ => return None,
        },
        9 => match text {
            "_Noreturn" => KwNoreturn,
            _ => return None,
        },
        10 => match text {
            "_Imaginary" => KwImaginary,
            _ => return None,
        },
        13 => match text {
            "_Thread_local" => KwThreadLocal,
            _ => return None,
        },
        14 => match text {
            "_Static_assert" => KwStaticAssert,
            _ => return None,
        },
        _ => return None,
    };
    Some(kind)
}

/// Per-token metadata flags packed into a single byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TokenFlags(u8);

impl TokenFlags {
    /// The token's spelling contains at least one escaped newline, so its
    /// raw byte range does not equal its logical content.
    pub const IS_DIRTY: u8 = 1 << 0;
    /// The token's spelling contains a universal character name.
    pub const HAS_UCN: u8 = 1 << 1;
    /// Numeric, character, or string literal.
    pub const IS_LITERAL: u8 = 1 << 2;

    /// No flags set.
    pub const EMPTY: TokenFlags = TokenFlags(0);

    /// Create flags from raw bits.
    #[inline]
    pub const fn from_bits(bits: u8) -> TokenFlags {
        TokenFlags(bits)
    }

    /// The raw bits.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether a specific flag is set.
    #[inline]
    pub const fn contains(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Set a flag.
    #[inline]
    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    /// Whether the spelling contains an escaped newline.
    #[inline]
    pub const fn is_dirty(self) -> bool {
        self.contains(Self::IS_DIRTY)
    }

    /// Whether the spelling contains a UCN.
    #[inline]
    pub const fn has_ucn(self) -> bool {
        self.contains(Self::HAS_UCN)
    }

    /// Whether the token is a literal.
    #[inline]
    pub const fn is_literal(self) -> bool {
        self.contains(Self::IS_LITERAL)
    }
}

/// A classified token: kind, byte range, flags.
///
/// Tokens borrow nothing; the spelling is recovered from the buffer via the
/// span. Given the flags, the spelling is sufficient to re-derive any
/// interior structure (the literal analyzers rely on this).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Half-open byte range into the source buffer.
    pub span: Span,
    /// Dirty / UCN / literal bits.
    pub flags: TokenFlags,
}

impl Token {
    /// Create a token with no flags.
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            span,
            flags: TokenFlags::EMPTY,
        }
    }

    /// Whether this token has the given kind.
    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Whether this token does not have the given kind.
    #[inline]
    pub fn is_not(&self, kind: TokenKind) -> bool {
        self.kind != kind
    }

    /// The exact source bytes that produced this token.
    pub fn spelling<'s>(&self, buffer: &'s SourceBuffer) -> &'s str {
        buffer.text_slice(self.span)
    }
}

// Size assertions: kind fits a byte, flags are one byte, tokens are small.
const _: () = assert!(std::mem::size_of::<TokenKind>() == 1);
const _: () = assert!(std::mem::size_of::<TokenFlags>() == 1);
const _: () = assert!(std::mem::size_of::<Token>() <= 12);

//! The closed set of lexical diagnostics.
//!
//! Each variant carries its parameters as fields; [`DiagnosticKind::code`]
//! returns the stable identifier used in tests and tooling, and
//! [`DiagnosticKind::severity`] classifies it. Message rendering lives here
//! too so report sites stay free of formatting.

use std::fmt;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The construct is ill-formed; compilation should not succeed.
    Error,
    /// Suspicious but recoverable; lexing proceeds with a fallback.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Which comment form a diagnostic refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// `//` to end of line.
    Line,
    /// `/*` to `*/`.
    Block,
}

impl CommentKind {
    fn as_str(self) -> &'static str {
        match self {
            CommentKind::Line => "line",
            CommentKind::Block => "block",
        }
    }
}

/// What went wrong, with parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A byte that starts no token.
    UnknownCharacter { ch: char },
    /// Comment with no terminator before end of input.
    UnterminatedComment { kind: CommentKind },
    /// Character constant with no closing `'` before a newline or EOF.
    UnterminatedCharConst,
    /// String literal with no closing `"` before a newline or EOF.
    UnterminatedString,
    /// `''` has no value.
    EmptyCharacter,
    /// UCN code point outside the ranges C11 6.4.3 permits.
    UcnInvalid,
    /// `\u`/`\U` with fewer hex digits than required.
    UcnIncomplete,
    /// A digit that is not valid for the literal's radix.
    InvalidDigit { digit: char, radix: u32 },
    /// A malformed literal suffix (duplicate, conflicting, or unrecognized).
    InvalidSuffix { suffix: char },
    /// `e`/`E`/`p`/`P` with no digits following.
    MissingExponent,
    /// `\x` with no hex digits.
    InvalidHexEscape,
    /// Character constant value exceeds what its encoding can hold.
    CharConstOverflow,
    /// Adjacent string literals with conflicting encoding prefixes.
    NonstandardStringConcat,
}

impl DiagnosticKind {
    /// Stable identifier for this diagnostic.
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::UnknownCharacter { .. } => "err_unknown_character",
            DiagnosticKind::UnterminatedComment { .. } => "err_unterminated_comment",
            DiagnosticKind::UnterminatedCharConst => "err_unterminated_char_const",
            DiagnosticKind::UnterminatedString => "err_unterminated_string",
            DiagnosticKind::EmptyCharacter => "err_empty_character",
            DiagnosticKind::UcnInvalid => "err_ucn_invalid",
            DiagnosticKind::UcnIncomplete => "warn_ucn_incomplete",
            DiagnosticKind::InvalidDigit { .. } => "err_invalid_digit",
            DiagnosticKind::InvalidSuffix { .. } => "err_invalid_suffix",
            DiagnosticKind::MissingExponent => "err_missing_exponent",
            DiagnosticKind::InvalidHexEscape => "err_invalid_hex_escape",
            DiagnosticKind::CharConstOverflow => "err_char_const_overflow",
            DiagnosticKind::NonstandardStringConcat => "err_nonstandard_string_concat",
        }
    }

    /// Severity of this diagnostic.
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::UcnIncomplete => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DiagnosticKind::UnknownCharacter { ch } => {
                write!(f, "unknown character {ch:?}")
            }
            DiagnosticKind::UnterminatedComment { kind } => {
                write!(f, "unterminated {} comment", kind.as_str())
            }
            DiagnosticKind::UnterminatedCharConst => {
                write!(f, "missing terminating ' character")
            }
            DiagnosticKind::UnterminatedString => {
                write!(f, "missing terminating \" character")
            }
            DiagnosticKind::EmptyCharacter => write!(f, "empty character constant"),
            DiagnosticKind::UcnInvalid => {
                write!(f, "invalid universal character name")
            }
            DiagnosticKind::UcnIncomplete => {
                write!(f, "incomplete universal character name")
            }
            DiagnosticKind::InvalidDigit { digit, radix } => {
                write!(f, "invalid digit '{digit}' in base-{radix} constant")
            }
            DiagnosticKind::InvalidSuffix { suffix } => {
                write!(f, "invalid suffix '{suffix}' on literal")
            }
            DiagnosticKind::MissingExponent => {
                write!(f, "exponent has no digits")
            }
            DiagnosticKind::InvalidHexEscape => {
                write!(f, "\\x used with no following hex digits")
            }
            DiagnosticKind::CharConstOverflow => {
                write!(f, "character constant too large for its type")
            }
            DiagnosticKind::NonstandardStringConcat => {
                write!(
                    f,
                    "concatenation of string literals with conflicting encoding prefixes"
                )
            }
        }
    }
}

//! Literal analyzers for the Cyn C11 front-end.
//!
//! The tokenizer in `cyn_lexer_core` classifies literals without validating
//! them; the analyzers here run afterwards, on demand, over the already-lexed
//! *spelling* of a token (or a run of adjacent string tokens):
//!
//! - [`NumericConstant`]: radix and suffix classification of integer and
//!   floating constants, plus integer evaluation with overflow detection.
//! - [`CharConstant`]: escape decoding and code-unit packing for character
//!   constants of every encoding.
//! - [`StringConcatenation`]: joins adjacent string literals, reconciles
//!   mixed encodings, and writes the decoded, null-terminated buffer.
//!
//! Spellings may be *dirty* (contain escaped newlines), so every walk here
//! goes through the same logical-character layer the tokenizer uses. Errors
//! never abort an analyzer: it records `has_error`, reports a diagnostic,
//! and keeps decoding so one literal can surface several problems.

mod char_const;
mod escape;
mod numeric;
mod string;
mod target;

pub use char_const::CharConstant;
pub use numeric::NumericConstant;
pub use string::StringConcatenation;
pub use target::{Endianness, LiteralEncoding, TargetInfo};

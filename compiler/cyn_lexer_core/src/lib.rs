//! Byte-level tokenizer for the Cyn C11 front-end.
//!
//! This crate turns a raw source buffer into a stream of classified tokens
//! with byte-exact source ranges. It is the "raw" half of the lexer; the
//! literal analyzers in `cyn_lexer` decode the values of numeric, character,
//! and string constants after the fact, over token spellings.
//!
//! # Architecture
//!
//! ```text
//! bytes → SourceBuffer → CharReader → Scanner → TokenStream → parser
//!                                        │
//!                                        └──→ DiagnosticEngine (sideways)
//! ```
//!
//! - [`SourceBuffer`]: sentinel-terminated byte buffer with a line table.
//!   The `0x00` sentinel lets the scanner detect end of input without bounds
//!   checks.
//! - [`CharReader`]: the logical-character layer. C's escaped newlines may
//!   split any token, so the rest of the tokenizer works on an idealized
//!   stream of logical characters and this is the only place that knows how
//!   the splice works.
//! - [`Scanner`]: produces one [`Token`] per call, dispatching on the first
//!   logical character. Errors become `unknown` tokens plus a diagnostic;
//!   lexing always continues.
//! - [`TokenStream`]: one-token lookahead adapter (`peek`/`consume`/`empty`).
//!
//! Tokens borrow nothing: they carry a byte [`Span`](cyn_diagnostic::Span)
//! into the buffer, and `SourceBuffer::text_slice` recovers the spelling.

mod char_reader;
mod scanner;
mod source_buffer;
mod stream;
mod token;
mod ucn;

pub use char_reader::{CharReader, Peeked};
pub use scanner::Scanner;
pub use source_buffer::SourceBuffer;
pub use stream::TokenStream;
pub use token::{keyword_lookup, Token, TokenFlags, TokenKind};
pub use ucn::try_read_ucn;

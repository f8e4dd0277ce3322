//! Diagnostics for the Cyn lexical analysis core.
//!
//! Every component of the lexer reports problems sideways into a shared
//! [`DiagnosticEngine`] instead of failing: the tokenizer synthesizes an
//! `unknown` token and keeps going, the literal analyzers set `has_error` on
//! their results and keep decoding. A diagnostic is a stable code
//! ([`DiagnosticKind`]) plus a [`SourceLocation`]; rendering to text happens
//! at the edge, not at the report site.
//!
//! # Ordering
//!
//! The tokenizer emits diagnostics in source order. The literal analyzers run
//! after the fact (driven by the parser) and may report out of lex order;
//! the engine preserves insertion order and makes no attempt to sort.

mod code;
mod engine;
mod span;

pub use code::{CommentKind, DiagnosticKind, Severity};
pub use engine::{Diagnostic, DiagnosticEngine};
pub use span::{SourceLocation, Span};

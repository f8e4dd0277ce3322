//! One-token-lookahead adapter over the scanner.

use cyn_diagnostic::{DiagnosticEngine, Span};
use tracing::debug;

use crate::scanner::Scanner;
use crate::source_buffer::SourceBuffer;
use crate::token::{Token, TokenKind};

/// A stream of tokens with single-slot lookahead.
///
/// Created from a source buffer, drained until [`empty`](Self::empty)
/// observes the `eof` sentinel; not restartable. Once `consume` returns a
/// token, the scanner emits no further diagnostic for any position before
/// that token's range.
pub struct TokenStream<'a> {
    scanner: Scanner<'a>,
    lookahead: Option<Token>,
}

impl<'a> TokenStream<'a> {
    /// Tokenize a buffer, reporting into `engine`.
    pub fn tokenize(buffer: &'a SourceBuffer, engine: &'a DiagnosticEngine) -> TokenStream<'a> {
        debug!(source_len = buffer.len(), "tokenizing source buffer");
        TokenStream {
            scanner: Scanner::new(buffer, engine),
            lookahead: None,
        }
    }

    /// The next token, without consuming it.
    ///
    /// At end of input this is an `eof` sentinel with an empty span at the
    /// stream's final position.
    pub fn peek(&mut self) -> Token {
        if let Some(tok) = self.lookahead {
            return tok;
        }
        let mut tok = Token::new(TokenKind::Eof, Span::DUMMY);
        if !self.scanner.lex(&mut tok) {
            let end = self.scanner.position();
            tok = Token::new(TokenKind::Eof, Span::new(end, end));
        }
        self.lookahead = Some(tok);
        tok
    }

    /// Consume and return the next token.
    ///
    /// Precondition: the stream is not empty.
    pub fn consume(&mut self) -> Token {
        let tok = self.peek();
        debug_assert!(
            tok.is_not(TokenKind::Eof),
            "consume called on an empty token stream"
        );
        self.lookahead = None;
        tok
    }

    /// Whether the next token is the `eof` sentinel.
    pub fn empty(&mut self) -> bool {
        self.peek().is(TokenKind::Eof)
    }
}

//! The tokenizer.
//!
//! One call to [`Scanner::lex`] produces one token. The scanner owns the
//! current buffer position and dispatches on the first logical character of
//! each token: punctuators (digraphs included) are matched with one or two
//! characters of lookahead, comments are skipped and lexing restarts,
//! identifiers, numeric constants, and character/string constants get
//! dedicated scanners. Everything reads through the [`CharReader`] logical
//! layer, so escaped newlines may split any token and only mark it dirty.
//!
//! Errors never stop the scanner: it reports a diagnostic, synthesizes an
//! `unknown` token over the offending bytes, and continues from the best
//! recovery position.

use cyn_diagnostic::{CommentKind, DiagnosticEngine, DiagnosticKind, SourceLocation, Span};

use crate::char_reader::{CharReader, Peeked};
use crate::source_buffer::SourceBuffer;
use crate::token::{keyword_lookup, Token, TokenFlags, TokenKind};
use crate::ucn::try_read_ucn;

#[inline]
fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[inline]
fn is_newline(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

#[inline]
fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\x0b' | b'\x0c') || is_newline(byte)
}

/// Width in bytes of the UTF-8 character introduced by `byte`.
#[inline]
fn utf8_char_width(byte: u8) -> u32 {
    match byte {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// Produces tokens from a source buffer.
pub struct Scanner<'a> {
    reader: CharReader<'a>,
    buffer: &'a SourceBuffer,
    engine: &'a DiagnosticEngine,
    /// Byte position of the next character to lex.
    pos: u32,
}

impl<'a> Scanner<'a> {
    /// Create a scanner positioned at the start of the buffer.
    pub fn new(buffer: &'a SourceBuffer, engine: &'a DiagnosticEngine) -> Scanner<'a> {
        Scanner {
            reader: buffer.reader(),
            buffer,
            engine,
            pos: 0,
        }
    }

    /// Current byte position.
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Lex the next token into `out`.
    ///
    /// Returns `false` iff end of input is reached (no token produced).
    pub fn lex(&mut self, out: &mut Token) -> bool {
        loop {
            self.skip_whitespace();
            let start = self.pos;
            let mut flags = TokenFlags::EMPTY;

            let first = self.reader.peek(self.pos);
            if first.ch == 0 {
                return false;
            }
            if is_whitespace(first.ch) {
                // Only reachable when an escaped newline splices into more
                // whitespace; treat it like the whitespace it is.
                self.consume_peeked(first, &mut flags);
                continue;
            }
            self.consume_peeked(first, &mut flags);

            let kind = match first.ch {
                b'[' => TokenKind::LBracket,
                b']' => TokenKind::RBracket,
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b'{' => TokenKind::LBrace,
                b'}' => TokenKind::RBrace,
                b'~' => TokenKind::Tilde,
                b'?' => TokenKind::Question,
                b';' => TokenKind::Semi,
                b',' => TokenKind::Comma,

                b'.' => {
                    let p = self.peek();
                    if p.ch.is_ascii_digit() {
                        self.consume_peeked(p, &mut flags);
                        return self.lex_numeric_constant(start, p.ch, flags, out);
                    }
                    if p.ch == b'.' {
                        let after = self.reader.peek(self.pos + p.size);
                        if after.ch == b'.' {
                            self.consume_peeked(p, &mut flags);
                            self.consume_peeked(after, &mut flags);
                            TokenKind::Ellipsis
                        } else {
                            TokenKind::Period
                        }
                    } else {
                        TokenKind::Period
                    }
                }

                b'-' => {
                    let p = self.peek();
                    match p.ch {
                        b'>' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::Arrow
                        }
                        b'-' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::MinusMinus
                        }
                        b'=' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::MinusEqual
                        }
                        _ => TokenKind::Minus,
                    }
                }

                b'+' => {
                    let p = self.peek();
                    match p.ch {
                        b'+' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::PlusPlus
                        }
                        b'=' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::PlusEqual
                        }
                        _ => TokenKind::Plus,
                    }
                }

                b'&' => {
                    let p = self.peek();
                    match p.ch {
                        b'&' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::AmpAmp
                        }
                        b'=' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::AmpEqual
                        }
                        _ => TokenKind::Amp,
                    }
                }

                b'*' => {
                    let p = self.peek();
                    if p.ch == b'=' {
                        self.consume_peeked(p, &mut flags);
                        TokenKind::StarEqual
                    } else {
                        TokenKind::Star
                    }
                }

                b'/' => {
                    let p = self.peek();
                    match p.ch {
                        b'/' => {
                            self.consume_peeked(p, &mut flags);
                            self.skip_line_comment();
                            continue;
                        }
                        b'*' => {
                            self.consume_peeked(p, &mut flags);
                            self.skip_block_comment();
                            continue;
                        }
                        b'=' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::SlashEqual
                        }
                        _ => TokenKind::Slash,
                    }
                }

                b'%' => {
                    let p = self.peek();
                    match p.ch {
                        b'=' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::PercentEqual
                        }
                        // %> digraph
                        b'>' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::RBrace
                        }
                        // %: and %:%: digraphs
                        b':' => {
                            self.consume_peeked(p, &mut flags);
                            let q = self.peek();
                            if q.ch == b'%' && self.reader.peek(self.pos + q.size).ch == b':' {
                                let r = self.reader.peek(self.pos + q.size);
                                self.consume_peeked(q, &mut flags);
                                self.consume_peeked(r, &mut flags);
                                TokenKind::HashHash
                            } else {
                                TokenKind::Hash
                            }
                        }
                        _ => TokenKind::Percent,
                    }
                }

                b'<' => {
                    let p = self.peek();
                    match p.ch {
                        b'<' => {
                            let after = self.reader.peek(self.pos + p.size);
                            if after.ch == b'=' {
                                self.consume_peeked(p, &mut flags);
                                self.consume_peeked(after, &mut flags);
                                TokenKind::LessLessEqual
                            } else {
                                self.consume_peeked(p, &mut flags);
                                TokenKind::LessLess
                            }
                        }
                        b'=' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::LessEqual
                        }
                        // <: digraph
                        b':' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::LBracket
                        }
                        // <% digraph
                        b'%' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::LBrace
                        }
                        _ => TokenKind::Less,
                    }
                }

                b'>' => {
                    let p = self.peek();
                    match p.ch {
                        b'>' => {
                            let after = self.reader.peek(self.pos + p.size);
                            if after.ch == b'=' {
                                self.consume_peeked(p, &mut flags);
                                self.consume_peeked(after, &mut flags);
                                TokenKind::GreaterGreaterEqual
                            } else {
                                self.consume_peeked(p, &mut flags);
                                TokenKind::GreaterGreater
                            }
                        }
                        b'=' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::GreaterEqual
                        }
                        _ => TokenKind::Greater,
                    }
                }

                b'=' => {
                    let p = self.peek();
                    if p.ch == b'=' {
                        self.consume_peeked(p, &mut flags);
                        TokenKind::EqualEqual
                    } else {
                        TokenKind::Equal
                    }
                }

                b'!' => {
                    let p = self.peek();
                    if p.ch == b'=' {
                        self.consume_peeked(p, &mut flags);
                        TokenKind::ExclaimEqual
                    } else {
                        TokenKind::Exclaim
                    }
                }

                b'^' => {
                    let p = self.peek();
                    if p.ch == b'=' {
                        self.consume_peeked(p, &mut flags);
                        TokenKind::CaretEqual
                    } else {
                        TokenKind::Caret
                    }
                }

                b'|' => {
                    let p = self.peek();
                    match p.ch {
                        b'|' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::PipePipe
                        }
                        b'=' => {
                            self.consume_peeked(p, &mut flags);
                            TokenKind::PipeEqual
                        }
                        _ => TokenKind::Pipe,
                    }
                }

                b':' => {
                    let p = self.peek();
                    // :> digraph
                    if p.ch == b'>' {
                        self.consume_peeked(p, &mut flags);
                        TokenKind::RBracket
                    } else {
                        TokenKind::Colon
                    }
                }

                b'#' => {
                    let p = self.peek();
                    if p.ch == b'#' {
                        self.consume_peeked(p, &mut flags);
                        TokenKind::HashHash
                    } else {
                        TokenKind::Hash
                    }
                }

                b'0'..=b'9' => {
                    return self.lex_numeric_constant(start, first.ch, flags, out);
                }

                b'L' => {
                    let p = self.peek();
                    match p.ch {
                        b'\'' => {
                            self.consume_peeked(p, &mut flags);
                            return self.lex_char_constant(
                                start,
                                flags,
                                TokenKind::WideCharConstant,
                                out,
                            );
                        }
                        b'"' => {
                            self.consume_peeked(p, &mut flags);
                            return self.lex_string_literal(
                                start,
                                flags,
                                TokenKind::WideStringLiteral,
                                out,
                            );
                        }
                        _ => return self.lex_identifier(start, flags, out),
                    }
                }

                b'u' => {
                    let p = self.peek();
                    match p.ch {
                        b'\'' => {
                            self.consume_peeked(p, &mut flags);
                            return self.lex_char_constant(
                                start,
                                flags,
                                TokenKind::Utf16CharConstant,
                                out,
                            );
                        }
                        b'"' => {
                            self.consume_peeked(p, &mut flags);
                            return self.lex_string_literal(
                                start,
                                flags,
                                TokenKind::Utf16StringLiteral,
                                out,
                            );
                        }
                        // u8 is a string-only prefix; u8'…' stays an
                        // identifier followed by a character constant.
                        b'8' if self.reader.peek(self.pos + p.size).ch == b'"' => {
                            let after = self.reader.peek(self.pos + p.size);
                            self.consume_peeked(p, &mut flags);
                            self.consume_peeked(after, &mut flags);
                            return self.lex_string_literal(
                                start,
                                flags,
                                TokenKind::Utf8StringLiteral,
                                out,
                            );
                        }
                        _ => return self.lex_identifier(start, flags, out),
                    }
                }

                b'U' => {
                    let p = self.peek();
                    match p.ch {
                        b'\'' => {
                            self.consume_peeked(p, &mut flags);
                            return self.lex_char_constant(
                                start,
                                flags,
                                TokenKind::Utf32CharConstant,
                                out,
                            );
                        }
                        b'"' => {
                            self.consume_peeked(p, &mut flags);
                            return self.lex_string_literal(
                                start,
                                flags,
                                TokenKind::Utf32StringLiteral,
                                out,
                            );
                        }
                        _ => return self.lex_identifier(start, flags, out),
                    }
                }

                b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                    return self.lex_identifier(start, flags, out);
                }

                b'\'' => {
                    return self.lex_char_constant(start, flags, TokenKind::Utf8CharConstant, out);
                }

                b'"' => {
                    return self.lex_string_literal(start, flags, TokenKind::StringLiteral, out);
                }

                b'\\' => {
                    // A backslash that starts a valid UCN begins an
                    // identifier; otherwise it is an unknown character.
                    let mut ucn_end = self.pos;
                    let code_point = try_read_ucn(
                        &self.reader,
                        &mut ucn_end,
                        self.loc(start),
                        self.engine,
                        Some(&mut flags),
                    );
                    self.pos = ucn_end;
                    if code_point != 0 {
                        return self.lex_identifier(start, flags, out);
                    }
                    self.engine
                        .report(self.loc(start), DiagnosticKind::UnknownCharacter { ch: '\\' });
                    TokenKind::Unknown
                }

                other => {
                    // Keep the unknown token on UTF-8 character boundaries.
                    let ch = if other >= 0x80 {
                        let width = utf8_char_width(other);
                        let char_start = self.pos - 1;
                        self.pos += width - 1;
                        self.decode_utf8(char_start, width)
                    } else {
                        other as char
                    };
                    self.engine
                        .report(self.loc(start), DiagnosticKind::UnknownCharacter { ch });
                    TokenKind::Unknown
                }
            };

            self.form_token(out, start, kind, flags);
            return true;
        }
    }

    // ─── Identifiers ────────────────────────────────────────────────────

    /// Lex an identifier whose head is already consumed, then resolve
    /// keywords.
    ///
    /// Dirty or UCN-bearing spellings skip the keyword check on purpose;
    /// equivalence for those is the business of a later normalization pass.
    fn lex_identifier(&mut self, start: u32, mut flags: TokenFlags, out: &mut Token) -> bool {
        // Fast path: maximal run of plain identifier bytes.
        let mut byte = self.reader.byte(self.pos);
        while is_ident_byte(byte) {
            self.pos += 1;
            byte = self.reader.byte(self.pos);
        }

        if byte == b'\\' {
            // Slow path: UCNs and escaped newlines.
            let mut p = self.peek();
            loop {
                if p.ch == b'\\' && self.try_advance_identifier_ucn(p.size, &mut flags) {
                    p = self.peek();
                } else if is_ident_byte(p.ch) {
                    self.consume_peeked(p, &mut flags);
                    p = self.peek();
                } else {
                    break;
                }
            }
        }

        let mut kind = TokenKind::Identifier;
        if !flags.has_ucn() && !flags.is_dirty() {
            let spelling = self.buffer.text_slice(Span::new(start, self.pos));
            if let Some(keyword) = keyword_lookup(spelling) {
                kind = keyword;
            }
        }
        self.form_token(out, start, kind, flags);
        true
    }

    /// Advance past `\uXXXX`/`\UXXXXXXXX` if it forms a valid identifier
    /// UCN. `slash_size` is the peeked width of the backslash (which may
    /// have followed spliced newlines).
    fn try_advance_identifier_ucn(&mut self, slash_size: u32, flags: &mut TokenFlags) -> bool {
        let mut ucn_end = self.pos + slash_size;
        let slash_loc = self.loc(self.pos);
        let code_point = try_read_ucn(
            &self.reader,
            &mut ucn_end,
            slash_loc,
            self.engine,
            Some(flags),
        );
        if code_point == 0 {
            return false;
        }
        if slash_size != 1 {
            flags.set(TokenFlags::IS_DIRTY);
        }
        self.pos = ucn_end;
        true
    }

    // ─── Numeric constants ──────────────────────────────────────────────

    /// Gross-match a numeric constant; `first` is the already-consumed head.
    ///
    /// Matches `[0-9A-Za-z_.]*`, extended by a sign directly after an
    /// exponent letter and by identifier UCNs. No validation happens here;
    /// that is the numeric analyzer's job.
    fn lex_numeric_constant(
        &mut self,
        start: u32,
        first: u8,
        mut flags: TokenFlags,
        out: &mut Token,
    ) -> bool {
        let mut prev = first;
        loop {
            let p = self.peek();
            let c = p.ch;
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' {
                self.consume_peeked(p, &mut flags);
                prev = c;
            } else if (c == b'+' || c == b'-') && matches!(prev, b'e' | b'E' | b'p' | b'P') {
                self.consume_peeked(p, &mut flags);
                prev = c;
            } else if c == b'\\' && self.try_advance_identifier_ucn(p.size, &mut flags) {
                prev = 0;
            } else {
                break;
            }
        }
        flags.set(TokenFlags::IS_LITERAL);
        self.form_token(out, start, TokenKind::NumericConstant, flags);
        true
    }

    // ─── Character and string constants ─────────────────────────────────

    /// Gross-match a character constant; opening quote (and prefix) already
    /// consumed. Escape decoding is deferred to the character analyzer.
    fn lex_char_constant(
        &mut self,
        start: u32,
        mut flags: TokenFlags,
        kind: TokenKind,
        out: &mut Token,
    ) -> bool {
        let p = self.peek();
        if p.ch == b'\'' {
            self.consume_peeked(p, &mut flags);
            self.engine
                .report(self.loc(start), DiagnosticKind::EmptyCharacter);
            self.form_token(out, start, TokenKind::Unknown, flags);
            return true;
        }
        if self.scan_literal_body(b'\'', &mut flags) {
            flags.set(TokenFlags::IS_LITERAL);
            self.form_token(out, start, kind, flags);
        } else {
            self.engine
                .report(self.loc(start), DiagnosticKind::UnterminatedCharConst);
            self.form_token(out, start, TokenKind::Unknown, flags);
        }
        true
    }

    /// Gross-match a string literal; opening quote (and prefix) already
    /// consumed. One token per literal: concatenation of adjacent strings
    /// belongs to the string analyzer, not the tokenizer.
    fn lex_string_literal(
        &mut self,
        start: u32,
        mut flags: TokenFlags,
        kind: TokenKind,
        out: &mut Token,
    ) -> bool {
        if self.scan_literal_body(b'"', &mut flags) {
            flags.set(TokenFlags::IS_LITERAL);
            self.form_token(out, start, kind, flags);
        } else {
            self.engine
                .report(self.loc(start), DiagnosticKind::UnterminatedString);
            self.form_token(out, start, TokenKind::Unknown, flags);
        }
        true
    }

    /// Consume logical characters up to and including `delim`.
    ///
    /// Returns `false` on an unescaped newline or end of input, leaving the
    /// position before the newline as the recovery point. A `\` skips the
    /// following character through the logical layer, so an escaped newline
    /// between the backslash and the escape letter splices before the
    /// escape is considered.
    fn scan_literal_body(&mut self, delim: u8, flags: &mut TokenFlags) -> bool {
        loop {
            let p = self.peek();
            match p.ch {
                c if c == delim => {
                    self.consume_peeked(p, flags);
                    return true;
                }
                b'\\' => {
                    self.consume_peeked(p, flags);
                    let escaped = self.peek();
                    if escaped.ch != 0 && !is_newline(escaped.ch) {
                        self.consume_peeked(escaped, flags);
                    }
                    // A newline or EOF right after the backslash falls out
                    // to the unterminated arm on the next iteration.
                }
                0 | b'\n' | b'\r' => return false,
                _ => self.consume_peeked(p, flags),
            }
        }
    }

    // ─── Comments ───────────────────────────────────────────────────────

    /// Skip past `// …` including the terminating newline. The comment body
    /// is read through the logical layer, so an escaped newline continues
    /// the comment onto the next line.
    fn skip_line_comment(&mut self) {
        let mut scratch = TokenFlags::EMPTY;
        loop {
            let p = self.peek();
            if is_newline(p.ch) {
                self.consume_peeked(p, &mut scratch);
                return;
            }
            if p.ch == 0 {
                self.engine.report(
                    self.loc(self.pos),
                    DiagnosticKind::UnterminatedComment {
                        kind: CommentKind::Line,
                    },
                );
                return;
            }
            self.consume_peeked(p, &mut scratch);
        }
    }

    /// Skip past `/* … */`. Comments do not nest.
    fn skip_block_comment(&mut self) {
        let mut scratch = TokenFlags::EMPTY;
        let mut p = self.peek();
        let mut prev = p.ch;
        loop {
            if p.ch == b'/' && prev == b'*' {
                self.consume_peeked(p, &mut scratch);
                return;
            }
            if p.ch == 0 {
                self.engine.report(
                    self.loc(self.pos),
                    DiagnosticKind::UnterminatedComment {
                        kind: CommentKind::Block,
                    },
                );
                return;
            }
            prev = p.ch;
            self.consume_peeked(p, &mut scratch);
            p = self.peek();
        }
    }

    // ─── Helpers ────────────────────────────────────────────────────────

    #[inline]
    fn peek(&self) -> Peeked {
        self.reader.peek(self.pos)
    }

    #[inline]
    fn consume_peeked(&mut self, peeked: Peeked, flags: &mut TokenFlags) {
        self.pos = self.reader.consume(self.pos, peeked, flags);
    }

    fn skip_whitespace(&mut self) {
        while is_whitespace(self.reader.byte(self.pos)) {
            self.pos += 1;
        }
    }

    fn loc(&self, offset: u32) -> SourceLocation {
        self.buffer
            .location_for_offset(offset.min(self.buffer.len()))
    }

    fn decode_utf8(&self, start: u32, width: u32) -> char {
        let mut bytes = [0u8; 4];
        for (i, slot) in bytes.iter_mut().enumerate().take(width as usize) {
            *slot = self.reader.byte(start + i as u32);
        }
        std::str::from_utf8(&bytes[..width as usize])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn form_token(&self, out: &mut Token, start: u32, kind: TokenKind, flags: TokenFlags) {
        *out = Token {
            kind,
            span: Span::new(start, self.pos),
            flags,
        };
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let mut tok = Token::new(TokenKind::Eof, Span::DUMMY);
        if self.lex(&mut tok) {
            Some(tok)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scanned {
        tokens: Vec<Token>,
        spellings: Vec<String>,
        engine: DiagnosticEngine,
    }

    fn scan(source: &str) -> Scanned {
        let buffer = SourceBuffer::from_source(source);
        let engine = DiagnosticEngine::new();
        let mut tokens = Vec::new();
        let mut spellings = Vec::new();
        {
            let mut scanner = Scanner::new(&buffer, &engine);
            let mut tok = Token::new(TokenKind::Eof, Span::DUMMY);
            while scanner.lex(&mut tok) {
                tokens.push(tok);
                spellings.push(tok.spelling(&buffer).to_string());
            }
        }
        Scanned {
            tokens,
            spellings,
            engine,
        }
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_and_whitespace_only() {
        assert!(kinds("").is_empty());
        assert!(kinds("  \t\n \r\n \x0b\x0c ").is_empty());
    }

    #[test]
    fn lex_after_end_keeps_returning_false() {
        let buffer = SourceBuffer::from_source("x");
        let engine = DiagnosticEngine::new();
        let mut scanner = Scanner::new(&buffer, &engine);
        let mut tok = Token::new(TokenKind::Eof, Span::DUMMY);
        assert!(scanner.lex(&mut tok));
        for _ in 0..4 {
            assert!(!scanner.lex(&mut tok));
        }
    }

    #[test]
    fn keywords_and_identifiers() {
        let s = scan("int\n_abc123 escaped\\\nnewline\n");
        assert_eq!(
            s.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            [
                TokenKind::KwInt,
                TokenKind::Identifier,
                TokenKind::Identifier
            ]
        );
        assert_eq!(s.spellings, ["int", "_abc123", "escaped\\\nnewline"]);
        assert!(!s.tokens[1].flags.is_dirty());
        assert!(s.tokens[2].flags.is_dirty());
        assert!(!s.engine.has_errors() && !s.engine.has_warnings());
    }

    #[test]
    fn dirty_keyword_spelling_stays_identifier() {
        let s = scan("in\\\nt");
        assert_eq!(s.tokens[0].kind, TokenKind::Identifier);
        assert!(s.tokens[0].flags.is_dirty());
    }

    #[test]
    fn ucn_identifiers() {
        let s = scan("\\u1234 \\UAABBCCDD \\UABCD\n");
        assert_eq!(
            s.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            [
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Unknown,
                TokenKind::Identifier
            ]
        );
        assert_eq!(s.spellings, ["\\u1234", "\\UAABBCCDD", "\\", "UABCD"]);
        assert!(s.tokens[0].flags.has_ucn());
        assert!(s.engine.has_warnings());
    }

    #[test]
    fn ucn_continuing_an_identifier() {
        let s = scan("abc\\u00C0def");
        assert_eq!(s.tokens.len(), 1);
        assert_eq!(s.tokens[0].kind, TokenKind::Identifier);
        assert!(s.tokens[0].flags.has_ucn());
        assert_eq!(s.spellings[0], "abc\\u00C0def");
    }

    #[test]
    fn numeric_constant_spellings() {
        let s = scan("42ULL 3.14f 161.80e-3 1.9E377P+1 .999\n");
        assert_eq!(s.tokens.len(), 5);
        for tok in &s.tokens {
            assert_eq!(tok.kind, TokenKind::NumericConstant);
            assert!(tok.flags.is_literal());
        }
        assert_eq!(
            s.spellings,
            ["42ULL", "3.14f", "161.80e-3", "1.9E377P+1", ".999"]
        );
        assert!(!s.engine.has_errors() && !s.engine.has_warnings());
    }

    #[test]
    fn plus_after_non_exponent_ends_the_number() {
        assert_eq!(
            kinds("1+2"),
            [
                TokenKind::NumericConstant,
                TokenKind::Plus,
                TokenKind::NumericConstant
            ]
        );
    }

    #[test]
    fn trailing_e_does_not_eat_whitespace() {
        // `1e` is one (malformed) numeric token; the analyzer flags it later.
        let s = scan("1e x");
        assert_eq!(
            s.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            [TokenKind::NumericConstant, TokenKind::Identifier]
        );
        assert_eq!(s.spellings[0], "1e");
    }

    #[test]
    fn comments_are_skipped() {
        let source = "\
dont_skip_1 // this should be skipped, \\
WE GET SIGNAL!
// skip this \\too
/\\
/ and this too
dont_skip_2
// */         // comment, not syntax error
f = g/**//h   // f = g / h
//\\
x             // first two-line comment
/\\
/ y           // second two-line comment
/*//*/ z      // z
m = n//**/o
  + p         // m = n + p
";
        let s = scan(source);
        let expected = [
            ("dont_skip_1", TokenKind::Identifier),
            ("dont_skip_2", TokenKind::Identifier),
            ("f", TokenKind::Identifier),
            ("=", TokenKind::Equal),
            ("g", TokenKind::Identifier),
            ("/", TokenKind::Slash),
            ("h", TokenKind::Identifier),
            ("z", TokenKind::Identifier),
            ("m", TokenKind::Identifier),
            ("=", TokenKind::Equal),
            ("n", TokenKind::Identifier),
            ("+", TokenKind::Plus),
            ("p", TokenKind::Identifier),
        ];
        assert_eq!(s.tokens.len(), expected.len());
        for (i, (spelling, kind)) in expected.iter().enumerate() {
            assert_eq!(s.tokens[i].kind, *kind, "token {i}");
            assert_eq!(s.spellings[i], *spelling, "token {i}");
        }
        assert!(!s.engine.has_errors() && !s.engine.has_warnings());
    }

    #[test]
    fn unterminated_block_comment() {
        let s = scan("a /* never closed");
        assert_eq!(s.tokens.len(), 1);
        assert_eq!(
            s.engine.diagnostics()[0].code(),
            "err_unterminated_comment"
        );
    }

    #[test]
    fn punctuators_compound_forms() {
        let cases: &[(&str, TokenKind)] = &[
            ("...", TokenKind::Ellipsis),
            ("<<=", TokenKind::LessLessEqual),
            (">>=", TokenKind::GreaterGreaterEqual),
            ("->", TokenKind::Arrow),
            ("++", TokenKind::PlusPlus),
            ("--", TokenKind::MinusMinus),
            ("&&", TokenKind::AmpAmp),
            ("||", TokenKind::PipePipe),
            ("<=", TokenKind::LessEqual),
            (">=", TokenKind::GreaterEqual),
            ("==", TokenKind::EqualEqual),
            ("!=", TokenKind::ExclaimEqual),
            ("*=", TokenKind::StarEqual),
            ("/=", TokenKind::SlashEqual),
            ("%=", TokenKind::PercentEqual),
            ("+=", TokenKind::PlusEqual),
            ("-=", TokenKind::MinusEqual),
            ("<<", TokenKind::LessLess),
            (">>", TokenKind::GreaterGreater),
            ("&=", TokenKind::AmpEqual),
            ("^=", TokenKind::CaretEqual),
            ("|=", TokenKind::PipeEqual),
            ("##", TokenKind::HashHash),
        ];
        for (source, kind) in cases {
            assert_eq!(kinds(source), [*kind], "{source}");
        }
    }

    #[test]
    fn punctuators_single_forms() {
        assert_eq!(
            kinds("[](){}.&*+-~!/%<>^|?:;=,#"),
            [
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Period,
                TokenKind::Amp,
                TokenKind::Star,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Tilde,
                TokenKind::Exclaim,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Caret,
                TokenKind::Pipe,
                TokenKind::Question,
                TokenKind::Colon,
                TokenKind::Semi,
                TokenKind::Equal,
                TokenKind::Comma,
            ]
        );
    }

    #[test]
    fn digraphs_alias_primary_punctuators() {
        assert_eq!(kinds("<:"), [TokenKind::LBracket]);
        assert_eq!(kinds(":>"), [TokenKind::RBracket]);
        assert_eq!(kinds("<%"), [TokenKind::LBrace]);
        assert_eq!(kinds("%>"), [TokenKind::RBrace]);
        assert_eq!(kinds("%:"), [TokenKind::Hash]);
        assert_eq!(kinds("%:%:"), [TokenKind::HashHash]);
    }

    #[test]
    fn lone_percent_colon_pair_is_hash_then_rest() {
        // %:% is # followed by %
        assert_eq!(kinds("%:%"), [TokenKind::Hash, TokenKind::Percent]);
    }

    #[test]
    fn two_dots_are_two_periods() {
        assert_eq!(kinds(".."), [TokenKind::Period, TokenKind::Period]);
    }

    #[test]
    fn dirty_punctuator() {
        let s = scan("<\\\n<");
        assert_eq!(s.tokens[0].kind, TokenKind::LessLess);
        assert!(s.tokens[0].flags.is_dirty());
        assert_eq!(s.spellings[0], "<\\\n<");
    }

    #[test]
    fn char_constants_with_prefixes() {
        let s = scan("'a' L'b' u'c' U'd'");
        assert_eq!(
            s.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            [
                TokenKind::Utf8CharConstant,
                TokenKind::WideCharConstant,
                TokenKind::Utf16CharConstant,
                TokenKind::Utf32CharConstant
            ]
        );
        assert!(s.tokens.iter().all(|t| t.flags.is_literal()));
    }

    #[test]
    fn u8_is_not_a_char_prefix() {
        assert_eq!(
            kinds("u8'a'"),
            [TokenKind::Identifier, TokenKind::Utf8CharConstant]
        );
    }

    #[test]
    fn string_literals_with_prefixes() {
        let s = scan(r#""plain" u8"eight" u"sixteen" U"thirtytwo" L"wide""#);
        assert_eq!(
            s.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            [
                TokenKind::StringLiteral,
                TokenKind::Utf8StringLiteral,
                TokenKind::Utf16StringLiteral,
                TokenKind::Utf32StringLiteral,
                TokenKind::WideStringLiteral
            ]
        );
    }

    #[test]
    fn escaped_quote_stays_inside_literal() {
        let s = scan(r#""a\"b" '\''"#);
        assert_eq!(
            s.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            [TokenKind::StringLiteral, TokenKind::Utf8CharConstant]
        );
        assert_eq!(s.spellings[0], r#""a\"b""#);
        assert_eq!(s.spellings[1], r"'\''");
    }

    #[test]
    fn empty_char_constant_is_unknown() {
        let s = scan("'' x");
        assert_eq!(s.tokens[0].kind, TokenKind::Unknown);
        assert_eq!(s.engine.diagnostics()[0].code(), "err_empty_character");
        assert_eq!(s.tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn unterminated_char_constant_recovers_at_newline() {
        let s = scan("'a\nnext");
        assert_eq!(s.tokens[0].kind, TokenKind::Unknown);
        assert_eq!(
            s.engine.diagnostics()[0].code(),
            "err_unterminated_char_const"
        );
        assert_eq!(s.tokens[1].kind, TokenKind::Identifier);
        assert_eq!(s.spellings[1], "next");
    }

    #[test]
    fn unterminated_string_literal() {
        let s = scan("\"abc\nnext");
        assert_eq!(s.tokens[0].kind, TokenKind::Unknown);
        assert_eq!(s.engine.diagnostics()[0].code(), "err_unterminated_string");
        assert_eq!(s.tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn string_with_escaped_newline_in_escape() {
        // backslash, escaped newline, `n`: still one string literal.
        let s = scan("\"\\\\\nn\"");
        assert_eq!(s.tokens.len(), 1);
        assert_eq!(s.tokens[0].kind, TokenKind::StringLiteral);
        assert!(s.tokens[0].flags.is_dirty());
        assert!(!s.engine.has_errors());
    }

    #[test]
    fn unknown_characters() {
        let s = scan("@ ` $");
        assert_eq!(
            s.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            [TokenKind::Unknown, TokenKind::Unknown, TokenKind::Unknown]
        );
        assert_eq!(s.engine.error_count(), 3);
        assert!(s
            .engine
            .diagnostics()
            .iter()
            .all(|d| d.code() == "err_unknown_character"));
    }

    #[test]
    fn non_ascii_unknown_token_covers_whole_character() {
        let s = scan("é x");
        assert_eq!(s.tokens[0].kind, TokenKind::Unknown);
        assert_eq!(s.tokens[0].span.len(), 2);
        assert_eq!(s.spellings[0], "é");
        assert_eq!(s.tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn spans_are_adjacent_modulo_skipped_bytes() {
        let source = "int main(void) { return 1.5e3 + 'a'; } // end\n";
        let s = scan(source);
        let mut last_end = 0;
        for tok in &s.tokens {
            assert!(tok.span.start >= last_end);
            assert!(tok.span.end > tok.span.start);
            last_end = tok.span.end;
        }
        assert!(last_end <= u32::try_from(source.len()).unwrap_or(u32::MAX));
    }

    mod proptest_scanner {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The scanner terminates on arbitrary printable-ASCII input and
            /// produces strictly advancing, in-bounds tokens.
            #[test]
            fn scanner_terminates_with_sane_spans(
                source in "[ -~\\n\\t]{0,80}"
            ) {
                let buffer = SourceBuffer::from_source(&source);
                let engine = DiagnosticEngine::new();
                let mut scanner = Scanner::new(&buffer, &engine);
                let mut tok = Token::new(TokenKind::Eof, Span::DUMMY);
                let mut last_end = 0u32;
                let mut count = 0usize;
                while scanner.lex(&mut tok) {
                    prop_assert!(tok.span.end > tok.span.start);
                    prop_assert!(tok.span.start >= last_end);
                    prop_assert!(tok.span.end <= buffer.len());
                    last_end = tok.span.end;
                    count += 1;
                    prop_assert!(count <= source.len() + 1);
                }
            }

            /// A lexed identifier with no backslash round-trips to exactly
            /// one token with the same spelling.
            #[test]
            fn plain_identifier_roundtrip(ident in "[A-Za-z_][A-Za-z0-9_]{0,12}") {
                let s = scan(&ident);
                prop_assert_eq!(s.tokens.len(), 1);
                prop_assert!(
                    s.tokens[0].kind == TokenKind::Identifier
                        || s.tokens[0].kind.is_keyword()
                );
                prop_assert_eq!(&s.spellings[0], &ident);
            }
        }
    }
}

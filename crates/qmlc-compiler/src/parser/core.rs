//! Parser state machine and low-level operations.

use rowan::{TextRange, TextSize};

use super::ast::Program;
use super::lexer::{Token, TokenKind, token_text};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::{Error, PassResult};

/// Recursive-descent parser over pre-lexed tokens.
///
/// Trivia is dropped up front; the only thing kept from it is whether a line
/// break separated a token from its predecessor, which terminates statements
/// the way JavaScript's automatic semicolon insertion does.
pub struct Parser<'src> {
    pub(super) source: &'src str,
    tokens: Vec<Token>,
    newline_before: Vec<bool>,
    pub(super) pos: usize,
    pub(super) diagnostics: Diagnostics,
    depth: u32,
    last_diagnostic_pos: Option<TextSize>,
    exec_fuel_remaining: Option<u32>,
    recursion_fuel_limit: Option<u32>,
    fatal_error: Option<Error>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        let mut significant = Vec::with_capacity(tokens.len());
        let mut newline_before = Vec::with_capacity(tokens.len());
        let mut pending_newline = false;
        for token in tokens {
            match token.kind {
                TokenKind::Newline => pending_newline = true,
                TokenKind::BlockComment if token_text(source, &token).contains('\n') => {
                    pending_newline = true;
                }
                kind if kind.is_trivia() => {}
                _ => {
                    significant.push(token);
                    newline_before.push(pending_newline);
                    pending_newline = false;
                }
            }
        }

        Self {
            source,
            tokens: significant,
            newline_before,
            pos: 0,
            diagnostics: Diagnostics::new(),
            depth: 0,
            last_diagnostic_pos: None,
            exec_fuel_remaining: None,
            recursion_fuel_limit: None,
            fatal_error: None,
        }
    }

    pub fn with_exec_fuel(mut self, limit: Option<u32>) -> Self {
        self.exec_fuel_remaining = limit;
        self
    }

    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.recursion_fuel_limit = limit;
        self
    }

    pub fn parse(mut self) -> PassResult<Program> {
        let program = self.parse_program();
        let diagnostics = self.finish()?;
        Ok((program, diagnostics))
    }

    fn finish(self) -> Result<Diagnostics, Error> {
        if let Some(err) = self.fatal_error {
            return Err(err);
        }
        Ok(self.diagnostics)
    }

    pub(super) fn has_fatal_error(&self) -> bool {
        self.fatal_error.is_some()
    }

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn should_stop(&self) -> bool {
        self.eof() || self.has_fatal_error()
    }

    pub(super) fn current(&self) -> Option<TokenKind> {
        self.nth(0)
    }

    pub(super) fn nth(&self, lookahead: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + lookahead).map(|t| t.kind)
    }

    pub(super) fn currently_is(&self, kind: TokenKind) -> bool {
        self.current() == Some(kind)
    }

    pub(super) fn next_is(&self, kind: TokenKind) -> bool {
        self.nth(1) == Some(kind)
    }

    pub(super) fn nth_text(&self, lookahead: usize) -> &'src str {
        self.tokens
            .get(self.pos + lookahead)
            .map_or("", |t| token_text(self.source, t))
    }

    pub(super) fn current_text(&self) -> &'src str {
        self.nth_text(0)
    }

    /// Current token is an identifier spelled `word`.
    pub(super) fn at_word(&self, word: &str) -> bool {
        self.currently_is(TokenKind::Ident) && self.current_text() == word
    }

    pub(super) fn nth_is_word(&self, lookahead: usize, word: &str) -> bool {
        self.nth(lookahead) == Some(TokenKind::Ident) && self.nth_text(lookahead) == word
    }

    pub(super) fn current_span(&self) -> TextRange {
        self.tokens
            .get(self.pos)
            .map_or_else(|| TextRange::empty(self.eof_offset()), |t| t.span)
    }

    pub(super) fn eof_offset(&self) -> TextSize {
        TextSize::from(self.source.len() as u32)
    }

    /// A line break separates the current token from the previous one.
    /// End of input counts as a line break.
    pub(super) fn at_line_break(&self) -> bool {
        self.newline_before.get(self.pos).copied().unwrap_or(true)
    }

    /// End of the last consumed token.
    pub(super) fn prev_end(&self) -> TextSize {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span.end(),
            None => TextSize::from(0),
        }
    }

    fn consume_exec_fuel(&mut self) {
        if let Some(ref mut remaining) = self.exec_fuel_remaining {
            if *remaining == 0 {
                if self.fatal_error.is_none() {
                    self.fatal_error = Some(Error::ExecFuelExhausted);
                }
                return;
            }
            *remaining -= 1;
        }
    }

    pub(super) fn bump(&mut self) -> Token {
        assert!(!self.eof(), "bump called at EOF");
        self.consume_exec_fuel();
        let token = self.tokens[self.pos];
        self.pos += 1;
        token
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.currently_is(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    /// On mismatch: emit diagnostic but don't consume.
    pub(super) fn expect(&mut self, kind: TokenKind, what: &str) -> Option<Token> {
        if let Some(token) = self.eat(kind) {
            return Some(token);
        }
        self.error_msg(DiagnosticKind::UnexpectedToken, format!("expected {what}"));
        None
    }

    pub(super) fn bump_ident(&mut self) -> super::ast::Ident {
        let token = self.bump();
        super::ast::Ident::new(token_text(self.source, &token), token.span)
    }

    pub(super) fn expect_ident(&mut self) -> Option<super::ast::Ident> {
        if self.currently_is(TokenKind::Ident) {
            return Some(self.bump_ident());
        }
        self.error(DiagnosticKind::ExpectedIdentifier);
        None
    }

    fn should_report(&mut self, pos: TextSize) -> bool {
        if self.last_diagnostic_pos == Some(pos) {
            return false;
        }
        self.last_diagnostic_pos = Some(pos);
        true
    }

    pub(super) fn error(&mut self, kind: DiagnosticKind) {
        let range = self.current_span();
        if !self.should_report(range.start()) {
            return;
        }
        self.diagnostics.report(kind, range).emit();
    }

    pub(super) fn error_msg(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let range = self.current_span();
        if !self.should_report(range.start()) {
            return;
        }
        self.diagnostics.report(kind, range).message(message).emit();
    }

    /// Report the current token as unexpected, naming what was expected.
    pub(super) fn error_unexpected(&mut self, expected: &str) {
        if self.currently_is(TokenKind::UnterminatedString) {
            self.error(DiagnosticKind::UnterminatedString);
            return;
        }
        let found = if self.eof() {
            "end of input".to_string()
        } else {
            format!("`{}`", self.current_text())
        };
        self.error_msg(
            DiagnosticKind::UnexpectedToken,
            format!("expected {expected}, found {found}"),
        );
    }

    pub(super) fn error_unclosed_delimiter(&mut self, kind: DiagnosticKind, open: TextRange) {
        let current = self.current_span();
        if !self.should_report(current.start()) {
            return;
        }
        let full_range = TextRange::new(open.start(), current.end());
        self.diagnostics
            .report(kind, full_range)
            .related_to("opened here", open)
            .emit();
    }

    pub(super) fn enter_recursion(&mut self) -> bool {
        if let Some(limit) = self.recursion_fuel_limit
            && self.depth >= limit
        {
            if self.fatal_error.is_none() {
                self.fatal_error = Some(Error::RecursionLimitExceeded);
            }
            return false;
        }
        self.depth += 1;
        true
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Consume a bracketed group starting at the current open delimiter,
    /// including everything nested inside. Returns the group's range.
    pub(super) fn skip_balanced(&mut self) -> TextRange {
        let open = self.bump();
        let mut stack = vec![open];
        while let Some(&top) = stack.last() {
            if self.should_stop() {
                self.error_unclosed_delimiter(unclosed_kind(top.kind), top.span);
                break;
            }
            match self.current() {
                Some(TokenKind::BraceOpen | TokenKind::BracketOpen | TokenKind::ParenOpen) => {
                    let token = self.bump();
                    stack.push(token);
                }
                Some(
                    close @ (TokenKind::BraceClose | TokenKind::BracketClose | TokenKind::ParenClose),
                ) => {
                    if closes(top.kind, close) {
                        stack.pop();
                        self.bump();
                        continue;
                    }
                    self.error_unclosed_delimiter(unclosed_kind(top.kind), top.span);
                    stack.pop();
                    if !stack.iter().any(|t| closes(t.kind, close)) {
                        if close == TokenKind::BraceClose {
                            // Belongs to the enclosing object.
                            break;
                        }
                        self.bump();
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }
        TextRange::new(open.span.start(), self.prev_end())
    }
}

fn closes(open: TokenKind, close: TokenKind) -> bool {
    matches!(
        (open, close),
        (TokenKind::BraceOpen, TokenKind::BraceClose)
            | (TokenKind::BracketOpen, TokenKind::BracketClose)
            | (TokenKind::ParenOpen, TokenKind::ParenClose)
    )
}

fn unclosed_kind(open: TokenKind) -> DiagnosticKind {
    match open {
        TokenKind::BraceOpen => DiagnosticKind::UnclosedBrace,
        TokenKind::BracketOpen => DiagnosticKind::UnclosedBracket,
        _ => DiagnosticKind::UnclosedParen,
    }
}

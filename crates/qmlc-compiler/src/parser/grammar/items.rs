use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::ast::{
    Import, ImportSource, ObjectDefinition, ObjectInitializer, Pragma, Program, QualifiedId,
};
use crate::parser::lexer::{TokenKind, token_text, unescape_string};

impl Parser<'_> {
    pub(crate) fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.should_stop() {
            match self.current() {
                Some(TokenKind::KwImport) => {
                    if let Some(import) = self.parse_import() {
                        program.imports.push(import);
                    }
                }
                Some(TokenKind::KwPragma) => program.pragmas.push(self.parse_pragma()),
                _ => break,
            }
        }

        while !self.should_stop() {
            if self.currently_is(TokenKind::Ident) {
                if let Some(object) = self.parse_root_object() {
                    program.objects.push(object);
                }
                continue;
            }
            self.error_unexpected("an object definition");
            self.bump();
        }

        if program.objects.is_empty() && !self.has_fatal_error() {
            self.error(DiagnosticKind::ExpectedRootObject);
        }

        program
    }

    fn parse_root_object(&mut self) -> Option<ObjectDefinition> {
        let type_name = self.parse_qualified_id();
        if !self.currently_is(TokenKind::BraceOpen) {
            self.error_unexpected("`{`");
            return None;
        }
        let initializer = self.parse_initializer();
        Some(ObjectDefinition {
            type_name,
            initializer,
        })
    }

    /// `import QtQuick 2.0 as QQ` / `import "file.js" as Js`
    fn parse_import(&mut self) -> Option<Import> {
        let import_token = self.bump().span;

        let source = match self.current() {
            Some(TokenKind::String) => {
                let token = self.bump();
                ImportSource::File {
                    path: unescape_string(token_text(self.source, &token)),
                    range: token.span,
                }
            }
            Some(TokenKind::Ident) => ImportSource::Uri(self.parse_qualified_id()),
            _ => {
                self.error_unexpected("a module URI or file path");
                self.skip_rest_of_line();
                return None;
            }
        };

        let version = if self.currently_is(TokenKind::Number) {
            Some(self.bump_ident())
        } else {
            None
        };

        let qualifier = if self.at_word("as") {
            self.bump();
            self.expect_ident()
        } else {
            None
        };

        self.finish_header_line();
        Some(Import {
            import_token,
            source,
            version,
            qualifier,
        })
    }

    /// `pragma Singleton`
    fn parse_pragma(&mut self) -> Pragma {
        let pragma_token = self.bump().span;
        let name = if self.currently_is(TokenKind::Ident) {
            Some(self.bump_ident())
        } else {
            self.error_unexpected("a pragma name");
            None
        };
        self.finish_header_line();
        Pragma { pragma_token, name }
    }

    fn finish_header_line(&mut self) {
        if self.eat(TokenKind::Semicolon).is_some() || self.at_line_break() {
            return;
        }
        self.error_unexpected("end of line");
        self.skip_rest_of_line();
    }

    /// Skip tokens up to the next line break, always consuming at least one.
    pub(crate) fn skip_rest_of_line(&mut self) {
        while !self.should_stop() {
            self.bump();
            if self.at_line_break() {
                break;
            }
        }
    }

    /// `a.b.c`. The current token must be an identifier.
    pub(crate) fn parse_qualified_id(&mut self) -> QualifiedId {
        let mut parts = vec![self.bump_ident()];
        while self.currently_is(TokenKind::Dot) && self.next_is(TokenKind::Ident) {
            self.bump();
            parts.push(self.bump_ident());
        }
        QualifiedId::new(parts)
    }

    /// Whether `Type.Name {` starts at `lookahead`.
    pub(crate) fn object_definition_ahead(&self, lookahead: usize) -> bool {
        if self.nth(lookahead) != Some(TokenKind::Ident) {
            return false;
        }
        let mut n = lookahead;
        while self.nth(n + 1) == Some(TokenKind::Dot) && self.nth(n + 2) == Some(TokenKind::Ident) {
            n += 2;
        }
        self.nth(n + 1) == Some(TokenKind::BraceOpen)
    }

    /// `{ member* }`. The current token must be `{`.
    pub(crate) fn parse_initializer(&mut self) -> ObjectInitializer {
        let lbrace = self.bump().span;
        let mut members = Vec::new();

        if !self.enter_recursion() {
            return ObjectInitializer { lbrace, members };
        }

        loop {
            if self.has_fatal_error() {
                break;
            }
            if self.eof() {
                self.error_unclosed_delimiter(DiagnosticKind::UnclosedBrace, lbrace);
                break;
            }
            if self.eat(TokenKind::BraceClose).is_some() {
                break;
            }
            if self.eat(TokenKind::Semicolon).is_some() {
                continue;
            }

            let start = self.pos;
            match self.parse_member() {
                Some(member) => members.push(member),
                None => self.recover_member(start),
            }
        }

        self.exit_recursion();
        ObjectInitializer { lbrace, members }
    }

    /// Skip to the start of the next member: a new line, `;`, or the
    /// enclosing `}`.
    fn recover_member(&mut self, start: usize) {
        let mut consumed = self.pos > start;
        while !self.should_stop() {
            if self.currently_is(TokenKind::BraceClose) || (consumed && self.at_line_break()) {
                break;
            }
            match self.current() {
                Some(TokenKind::BraceOpen | TokenKind::BracketOpen | TokenKind::ParenOpen) => {
                    self.skip_balanced();
                }
                Some(TokenKind::Semicolon) => {
                    self.bump();
                    break;
                }
                _ => {
                    self.bump();
                }
            }
            consumed = true;
        }
    }
}

use rowan::TextRange;

use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::ast::{
    ArrayBinding, FunctionDeclaration, Ident, ObjectBinding, ObjectDefinition, ObjectMember,
    Parameter, PropertyInitializer, PublicMember, PublicMemberKind, QualifiedId, ScriptBinding,
    SourceElement, SourceElementKind,
};
use crate::parser::lexer::TokenKind;

const JS_DECLARATION_WORDS: &[&str] = &["var", "let", "const"];

impl Parser<'_> {
    pub(super) fn parse_member(&mut self) -> Option<ObjectMember> {
        match self.current()? {
            TokenKind::KwFunction => self
                .parse_function_declaration()
                .map(ObjectMember::SourceElement),
            TokenKind::KwIf => Some(ObjectMember::SourceElement(self.parse_stray_statement())),
            TokenKind::Ident => {
                if self.at_property_declaration() {
                    return self
                        .parse_property_declaration()
                        .map(ObjectMember::PublicMember);
                }
                if self.at_word("signal") && self.next_is(TokenKind::Ident) {
                    return Some(ObjectMember::PublicMember(self.parse_signal_declaration()));
                }
                if JS_DECLARATION_WORDS.contains(&self.current_text())
                    && self.next_is(TokenKind::Ident)
                {
                    return Some(ObjectMember::SourceElement(self.parse_stray_statement()));
                }
                self.parse_binding_or_object()
            }
            _ => {
                self.error_unexpected("an object member");
                None
            }
        }
    }

    /// `[default] [readonly] property <type> <name>`
    fn at_property_declaration(&self) -> bool {
        let mut n = 0;
        while n < 2 && (self.nth_is_word(n, "default") || self.nth_is_word(n, "readonly")) {
            n += 1;
        }
        self.nth_is_word(n, "property") && self.nth(n + 1) == Some(TokenKind::Ident)
    }

    fn parse_binding_or_object(&mut self) -> Option<ObjectMember> {
        let qualified_id = self.parse_qualified_id();

        match self.current() {
            Some(TokenKind::BraceOpen) => {
                let initializer = self.parse_initializer();
                Some(ObjectMember::ObjectDefinition(ObjectDefinition {
                    type_name: qualified_id,
                    initializer,
                }))
            }
            Some(TokenKind::Ident) if self.at_word("on") => {
                self.bump();
                if !self.currently_is(TokenKind::Ident) {
                    self.error(DiagnosticKind::ExpectedIdentifier);
                    return None;
                }
                let target = self.parse_qualified_id();
                if !self.currently_is(TokenKind::BraceOpen) {
                    self.error_unexpected("`{`");
                    return None;
                }
                let initializer = self.parse_initializer();
                Some(ObjectMember::ObjectBinding(ObjectBinding {
                    qualified_id: target,
                    type_name: qualified_id,
                    has_on_token: true,
                    initializer,
                }))
            }
            Some(TokenKind::Colon) => {
                self.bump();
                self.parse_binding_value(qualified_id)
            }
            _ => {
                self.error_unexpected("`:` or `{`");
                None
            }
        }
    }

    fn parse_binding_value(&mut self, qualified_id: QualifiedId) -> Option<ObjectMember> {
        if self.object_definition_ahead(0) {
            return Some(ObjectMember::ObjectBinding(
                self.parse_object_binding(qualified_id),
            ));
        }
        if self.array_binding_ahead() {
            return Some(ObjectMember::ArrayBinding(
                self.parse_array_binding(qualified_id),
            ));
        }
        let statement = self.parse_statement()?;
        Some(ObjectMember::ScriptBinding(ScriptBinding {
            qualified_id,
            statement,
        }))
    }

    fn parse_object_binding(&mut self, qualified_id: QualifiedId) -> ObjectBinding {
        let type_name = self.parse_qualified_id();
        let initializer = self.parse_initializer();
        ObjectBinding {
            qualified_id,
            type_name,
            has_on_token: false,
            initializer,
        }
    }

    /// `[ Type {` (an array literal of anything else is a script value)
    fn array_binding_ahead(&self) -> bool {
        self.currently_is(TokenKind::BracketOpen) && self.object_definition_ahead(1)
    }

    /// `[ Type { ... }, Type { ... } ]`. The current token must be `[`.
    fn parse_array_binding(&mut self, qualified_id: QualifiedId) -> ArrayBinding {
        let lbracket = self.bump().span;
        let mut members = Vec::new();

        loop {
            if self.should_stop() {
                self.error_unclosed_delimiter(DiagnosticKind::UnclosedBracket, lbracket);
                break;
            }
            if !self.object_definition_ahead(0) {
                self.error_unexpected("an object definition");
                self.skip_to_bracket_close();
                break;
            }
            let type_name = self.parse_qualified_id();
            let initializer = self.parse_initializer();
            members.push(ObjectDefinition {
                type_name,
                initializer,
            });

            if self.eat(TokenKind::Comma).is_some() {
                continue;
            }
            if self.eat(TokenKind::BracketClose).is_some() {
                break;
            }
            self.error_unexpected("`,` or `]`");
            self.skip_to_bracket_close();
            break;
        }

        ArrayBinding {
            qualified_id,
            lbracket,
            members,
        }
    }

    fn skip_to_bracket_close(&mut self) {
        while !self.should_stop() {
            match self.current() {
                Some(TokenKind::BracketClose) => {
                    self.bump();
                    return;
                }
                Some(TokenKind::BraceClose) => return,
                Some(TokenKind::BraceOpen | TokenKind::BracketOpen | TokenKind::ParenOpen) => {
                    self.skip_balanced();
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn parse_property_declaration(&mut self) -> Option<PublicMember> {
        let first_token = self.current_span();
        let mut default_token = None;
        let mut readonly_token = None;
        loop {
            if default_token.is_none() && self.at_word("default") {
                default_token = Some(self.bump().span);
            } else if readonly_token.is_none() && self.at_word("readonly") {
                readonly_token = Some(self.bump().span);
            } else {
                break;
            }
        }
        let keyword = self.bump().span;

        let written_type = self.parse_qualified_id();
        let (member_type, type_modifier) = if self.eat(TokenKind::Lt).is_some() {
            let inner = if self.currently_is(TokenKind::Ident) {
                Some(self.parse_qualified_id())
            } else {
                self.error(DiagnosticKind::ExpectedIdentifier);
                None
            };
            self.expect(TokenKind::Gt, "`>`")?;
            (inner, Some(written_type.parts.into_iter().next()?))
        } else {
            (Some(written_type), None)
        };

        let name = self.expect_ident()?;

        let initializer = if self.eat(TokenKind::Colon).is_some() {
            Some(self.parse_property_initializer(&name)?)
        } else {
            self.finish_declaration_line();
            None
        };

        Some(PublicMember {
            kind: PublicMemberKind::Property {
                member_type,
                type_modifier,
                default_token,
                readonly_token,
                initializer,
            },
            first_token,
            keyword,
            name,
        })
    }

    fn parse_property_initializer(&mut self, name: &Ident) -> Option<PropertyInitializer> {
        let qualified_id = QualifiedId::new(vec![name.clone()]);
        if self.object_definition_ahead(0) {
            return Some(PropertyInitializer::Object(
                self.parse_object_binding(qualified_id),
            ));
        }
        if self.array_binding_ahead() {
            return Some(PropertyInitializer::Array(
                self.parse_array_binding(qualified_id),
            ));
        }
        self.parse_statement().map(PropertyInitializer::Statement)
    }

    /// `signal name` / `signal name(type a, type b)` / `signal name(a: type)`
    fn parse_signal_declaration(&mut self) -> PublicMember {
        let keyword = self.bump().span;
        let name = self.bump_ident();
        let mut parameters = Vec::new();

        if self.eat(TokenKind::ParenOpen).is_some() && self.eat(TokenKind::ParenClose).is_none() {
            loop {
                match self.parse_parameter() {
                    Some(parameter) => parameters.push(parameter),
                    None => {
                        self.skip_to_paren_close();
                        break;
                    }
                }
                if self.eat(TokenKind::Comma).is_some() {
                    continue;
                }
                if self.eat(TokenKind::ParenClose).is_some() {
                    break;
                }
                self.error_unexpected("`,` or `)`");
                self.skip_to_paren_close();
                break;
            }
        }

        self.finish_declaration_line();
        PublicMember {
            kind: PublicMemberKind::Signal { parameters },
            first_token: keyword,
            keyword,
            name,
        }
    }

    fn parse_parameter(&mut self) -> Option<Parameter> {
        if !self.currently_is(TokenKind::Ident) {
            self.error(DiagnosticKind::ExpectedIdentifier);
            return None;
        }
        let mut first = self.parse_qualified_id();

        if self.currently_is(TokenKind::Ident) {
            let name = self.bump_ident();
            return Some(Parameter {
                ty: Some(first),
                name,
            });
        }

        if first.parts.len() != 1 {
            self.error(DiagnosticKind::ExpectedIdentifier);
            return None;
        }
        let name = first.parts.pop()?;

        if self.eat(TokenKind::Colon).is_some() {
            if !self.currently_is(TokenKind::Ident) {
                self.error(DiagnosticKind::ExpectedIdentifier);
                return None;
            }
            let ty = self.parse_qualified_id();
            return Some(Parameter { ty: Some(ty), name });
        }

        Some(Parameter { ty: None, name })
    }

    fn skip_to_paren_close(&mut self) {
        while !self.should_stop() {
            match self.current() {
                Some(TokenKind::ParenClose) => {
                    self.bump();
                    return;
                }
                Some(TokenKind::BraceClose) => return,
                Some(TokenKind::BraceOpen | TokenKind::BracketOpen | TokenKind::ParenOpen) => {
                    self.skip_balanced();
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn finish_declaration_line(&mut self) {
        if self.eat(TokenKind::Semicolon).is_some()
            || self.currently_is(TokenKind::BraceClose)
            || self.at_line_break()
        {
            return;
        }
        self.error_unexpected("end of declaration");
        self.skip_rest_of_line();
    }

    /// `function name(a, b) { ... }`, with optional type annotations.
    fn parse_function_declaration(&mut self) -> Option<SourceElement> {
        let function_token = self.bump().span;
        let name = self.expect_ident()?;
        self.expect(TokenKind::ParenOpen, "`(`")?;

        let mut formals = Vec::new();
        if self.eat(TokenKind::ParenClose).is_none() {
            loop {
                formals.push(self.expect_ident()?);
                self.skip_type_annotation();
                if self.eat(TokenKind::Comma).is_some() {
                    continue;
                }
                if self.eat(TokenKind::ParenClose).is_some() {
                    break;
                }
                self.error_unexpected("`,` or `)`");
                return None;
            }
        }
        self.skip_type_annotation();

        if !self.currently_is(TokenKind::BraceOpen) {
            self.error_unexpected("`{`");
            return None;
        }
        let body = self.skip_balanced();

        Some(SourceElement {
            kind: SourceElementKind::Function(FunctionDeclaration {
                function_token,
                name,
                formals,
                body,
            }),
            range: function_token.cover(body),
        })
    }

    fn skip_type_annotation(&mut self) {
        if self.currently_is(TokenKind::Colon) && self.next_is(TokenKind::Ident) {
            self.bump();
            self.parse_qualified_id();
        }
    }

    /// A JavaScript statement where a member was expected.
    fn parse_stray_statement(&mut self) -> SourceElement {
        let start = self.current_span().start();
        if self.parse_statement().is_none() {
            self.skip_statement_tail();
        }
        SourceElement {
            kind: SourceElementKind::Statement,
            range: TextRange::new(start, self.prev_end().max(start)),
        }
    }
}

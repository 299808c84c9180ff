//! Statements and expressions on the right-hand side of bindings.
//!
//! The grammar is structural: precedence is ignored and every compound
//! expression collapses into `ExpressionKind::Other`. What survives is the
//! shape the builder inspects: literals, unary minus, identifier chains and
//! calls.

use rowan::TextRange;

use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::ast::{Expression, ExpressionKind, Ident, Statement, StatementKind};
use crate::parser::lexer::{TokenKind, number_value, unescape_string};

/// Words that start a statement rather than an expression.
const STATEMENT_WORDS: &[&str] = &[
    "var", "let", "const", "return", "throw", "for", "while", "do", "switch", "try",
];

const PREFIX_WORDS: &[&str] = &["typeof", "void", "delete", "new"];
const INFIX_WORDS: &[&str] = &["instanceof", "in"];

impl Parser<'_> {
    pub(crate) fn parse_statement(&mut self) -> Option<Statement> {
        let start = self.current_span().start();
        match self.current() {
            Some(TokenKind::BraceOpen) => {
                let range = self.skip_balanced();
                Some(Statement {
                    kind: StatementKind::Block,
                    range,
                })
            }
            Some(TokenKind::KwIf) => {
                self.bump();
                if !self.currently_is(TokenKind::ParenOpen) {
                    self.error_unexpected("`(`");
                    return None;
                }
                self.skip_balanced();
                self.parse_nested_statement()?;
                if self.eat(TokenKind::KwElse).is_some() {
                    self.parse_nested_statement()?;
                }
                Some(Statement {
                    kind: StatementKind::Other,
                    range: TextRange::new(start, self.prev_end()),
                })
            }
            Some(TokenKind::Ident) if STATEMENT_WORDS.contains(&self.current_text()) => {
                self.skip_statement_tail();
                Some(Statement {
                    kind: StatementKind::Other,
                    range: TextRange::new(start, self.prev_end()),
                })
            }
            _ => {
                let expression = self.parse_expression()?;
                self.finish_statement();
                Some(Statement {
                    range: expression.range,
                    kind: StatementKind::Expression(expression),
                })
            }
        }
    }

    fn parse_nested_statement(&mut self) -> Option<Statement> {
        if !self.enter_recursion() {
            return None;
        }
        let statement = self.parse_statement();
        self.exit_recursion();
        statement
    }

    fn finish_statement(&mut self) {
        if self.eat(TokenKind::Semicolon).is_some()
            || self.currently_is(TokenKind::BraceClose)
            || self.at_line_break()
        {
            return;
        }
        self.error_unexpected("`;` or a line break");
        self.skip_statement_tail();
    }

    /// Skip to the end of the current statement: past a `;`, or up to a
    /// line break or the enclosing `}`.
    pub(crate) fn skip_statement_tail(&mut self) {
        while !self.should_stop() && !self.currently_is(TokenKind::BraceClose) {
            match self.current() {
                Some(TokenKind::BraceOpen | TokenKind::BracketOpen | TokenKind::ParenOpen) => {
                    self.skip_balanced();
                }
                Some(TokenKind::Semicolon) => {
                    self.bump();
                    return;
                }
                _ => {
                    self.bump();
                }
            }
            if self.at_line_break() {
                return;
            }
        }
    }

    pub(crate) fn parse_expression(&mut self) -> Option<Expression> {
        if !self.enter_recursion() {
            return None;
        }
        let result = self.parse_conditional();
        self.exit_recursion();
        result
    }

    fn parse_conditional(&mut self) -> Option<Expression> {
        let condition = self.parse_binary()?;
        if self.eat(TokenKind::Question).is_none() {
            return Some(condition);
        }
        self.parse_expression()?;
        self.expect(TokenKind::Colon, "`:`")?;
        let alternative = self.parse_expression()?;
        Some(Expression::new(
            ExpressionKind::Other,
            condition.range.cover(alternative.range),
        ))
    }

    fn parse_binary(&mut self) -> Option<Expression> {
        let mut expression = self.parse_unary()?;
        while self.at_infix_operator() {
            self.bump();
            let rhs = self.parse_unary()?;
            expression = Expression::new(ExpressionKind::Other, expression.range.cover(rhs.range));
        }
        Some(expression)
    }

    fn at_infix_operator(&self) -> bool {
        match self.current() {
            Some(TokenKind::Minus | TokenKind::Lt | TokenKind::Gt) => true,
            Some(TokenKind::Operator) => !matches!(self.current_text(), "!" | "~"),
            Some(TokenKind::Ident) => INFIX_WORDS.contains(&self.current_text()),
            _ => false,
        }
    }

    fn parse_unary(&mut self) -> Option<Expression> {
        let op = self.current_span();
        let is_minus = match self.current() {
            Some(TokenKind::Minus) => true,
            Some(TokenKind::Operator) => false,
            Some(TokenKind::Ident) if PREFIX_WORDS.contains(&self.current_text()) => false,
            _ => return self.parse_postfix(),
        };
        self.bump();

        if !self.enter_recursion() {
            return None;
        }
        let operand = self.parse_unary();
        self.exit_recursion();
        let operand = operand?;

        let range = op.cover(operand.range);
        let kind = if is_minus {
            ExpressionKind::UnaryMinus(Box::new(operand))
        } else {
            ExpressionKind::Other
        };
        Some(Expression::new(kind, range))
    }

    fn parse_postfix(&mut self) -> Option<Expression> {
        let mut expression = self.parse_primary()?;
        loop {
            match self.current() {
                Some(TokenKind::Dot) => {
                    self.bump();
                    let name = self.parse_member_name()?;
                    let range = expression.range.cover(name.range);
                    expression = Expression::new(
                        ExpressionKind::FieldMember {
                            base: Box::new(expression),
                            name,
                        },
                        range,
                    );
                }
                Some(TokenKind::ParenOpen) => {
                    let arguments = self.parse_arguments()?;
                    let range = TextRange::new(expression.range.start(), self.prev_end());
                    expression = Expression::new(
                        ExpressionKind::Call {
                            callee: Box::new(expression),
                            arguments,
                        },
                        range,
                    );
                }
                Some(TokenKind::BracketOpen) if !self.at_line_break() => {
                    let index = self.skip_balanced();
                    expression =
                        Expression::new(ExpressionKind::Other, expression.range.cover(index));
                }
                _ => return Some(expression),
            }
        }
    }

    /// Property names after `.` may be reserved words.
    fn parse_member_name(&mut self) -> Option<Ident> {
        match self.current() {
            Some(
                TokenKind::Ident
                | TokenKind::KwImport
                | TokenKind::KwPragma
                | TokenKind::KwFunction
                | TokenKind::KwTrue
                | TokenKind::KwFalse
                | TokenKind::KwNull
                | TokenKind::KwIf
                | TokenKind::KwElse,
            ) => Some(self.bump_ident()),
            _ => {
                self.error(DiagnosticKind::ExpectedIdentifier);
                None
            }
        }
    }

    /// `( expr, ... )`. The current token must be `(`.
    fn parse_arguments(&mut self) -> Option<Vec<Expression>> {
        let open = self.bump().span;
        let mut arguments = Vec::new();
        if self.eat(TokenKind::ParenClose).is_some() {
            return Some(arguments);
        }
        loop {
            if self.eof() {
                self.error_unclosed_delimiter(DiagnosticKind::UnclosedParen, open);
                return None;
            }
            arguments.push(self.parse_expression()?);
            if self.eat(TokenKind::Comma).is_some() {
                continue;
            }
            if self.eat(TokenKind::ParenClose).is_some() {
                return Some(arguments);
            }
            if self.eof() {
                self.error_unclosed_delimiter(DiagnosticKind::UnclosedParen, open);
            } else {
                self.error_unexpected("`,` or `)`");
            }
            return None;
        }
    }

    fn parse_primary(&mut self) -> Option<Expression> {
        let Some(kind) = self.current() else {
            self.error(DiagnosticKind::ExpectedExpression);
            return None;
        };

        let simple = match kind {
            TokenKind::Number => Some(ExpressionKind::Number(number_value(self.current_text()))),
            TokenKind::String => Some(ExpressionKind::String(unescape_string(
                self.current_text(),
            ))),
            TokenKind::KwTrue => Some(ExpressionKind::True),
            TokenKind::KwFalse => Some(ExpressionKind::False),
            TokenKind::KwNull => Some(ExpressionKind::Null),
            TokenKind::Ident => Some(ExpressionKind::Identifier(self.current_text().to_string())),
            _ => None,
        };
        if let Some(simple) = simple {
            let span = self.bump().span;
            return Some(Expression::new(simple, span));
        }

        match kind {
            TokenKind::ParenOpen | TokenKind::BracketOpen | TokenKind::BraceOpen => {
                let range = self.skip_balanced();
                Some(Expression::new(ExpressionKind::Other, range))
            }
            TokenKind::KwFunction => {
                let start = self.bump().span.start();
                if self.currently_is(TokenKind::Ident) {
                    self.bump();
                }
                if self.currently_is(TokenKind::ParenOpen) {
                    self.skip_balanced();
                }
                if !self.currently_is(TokenKind::BraceOpen) {
                    self.error_unexpected("`{`");
                    return None;
                }
                self.skip_balanced();
                Some(Expression::new(
                    ExpressionKind::Other,
                    TextRange::new(start, self.prev_end()),
                ))
            }
            TokenKind::UnterminatedString => {
                self.error(DiagnosticKind::UnterminatedString);
                self.bump();
                None
            }
            _ => {
                self.error(DiagnosticKind::ExpectedExpression);
                None
            }
        }
    }
}

//! Lexer for QML documents.
//!
//! Produces span-based tokens without storing text; text is sliced from the
//! source only when needed.
//!
//! QML words such as `property`, `signal`, `readonly`, `on` and `as` are
//! contextual (they are valid property names), so they lex as plain
//! identifiers and the parser checks their text. Only words that can never
//! name a property get their own token kind.
//!
//! Consecutive unrecognized characters are coalesced into a single `Garbage`
//! token.

use logos::Logos;
use rowan::TextRange;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token("-")]
    Minus,
    #[token("<", priority = 3)]
    Lt,
    #[token(">", priority = 3)]
    Gt,

    /// Any other operator run (`+`, `==`, `&&`, `>=`, `=>` ...).
    #[regex(r"[+*/%=!&|^~<>]+")]
    Operator,

    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"0[xX][0-9a-fA-F]+")]
    Number,

    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    #[regex(r"'(?:[^'\\\n]|\\.)*'")]
    String,

    /// A string literal missing its closing quote before the end of line.
    #[regex(r#""(?:[^"\\\n]|\\.)*"#)]
    #[regex(r"'(?:[^'\\\n]|\\.)*")]
    UnterminatedString,

    #[token("import")]
    KwImport,
    #[token("pragma")]
    KwPragma,
    #[token("function")]
    KwFunction,
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,
    #[token("null")]
    KwNull,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,

    /// Defined after keywords so they take precedence.
    #[regex(r"[\p{L}_$][\p{L}\p{N}_$]*")]
    Ident,

    #[regex(r"[ \t\f]+")]
    Whitespace,

    #[token("\n")]
    #[token("\r\n")]
    Newline,

    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*(?:[^*]|\*+[^*/])*\*+/")]
    BlockComment,

    /// Coalesced unrecognized characters
    Garbage,
}

impl TokenKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::Newline | Self::LineComment | Self::BlockComment
        )
    }
}

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes source into a vector of span-based tokens, trivia included.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    let end = lexer.span().start;
                    tokens.push(Token::new(
                        TokenKind::Garbage,
                        range_to_text_range(start..end),
                    ));
                }
                tokens.push(Token::new(kind, range_to_text_range(lexer.span())));
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token::new(
                        TokenKind::Garbage,
                        range_to_text_range(start..source.len()),
                    ));
                }
                break;
            }
        }
    }

    tokens
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[std::ops::Range::<usize>::from(token.span)]
}

/// Decode the value of a `String` token (quotes stripped, escapes resolved).
pub fn unescape_string(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Numeric value of a `Number` token.
pub fn number_value(text: &str) -> f64 {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |v| v as f64);
    }
    text.parse().unwrap_or(f64::NAN)
}

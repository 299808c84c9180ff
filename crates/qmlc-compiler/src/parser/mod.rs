//! Parser infrastructure for QML documents.
//!
//! # Architecture
//!
//! - Zero-copy lexing: tokens carry spans, text sliced only when building AST nodes
//! - Trivia is dropped before parsing; line breaks are remembered per token
//!   so statements can end at a newline
//! - The AST owns its text, so the builder never needs the token stream
//!
//! # Recovery Strategy
//!
//! The parser is resilient: it always produces a `Program`.
//!
//! 1. A member that fails to parse is skipped up to the next line, `;` or `}`
//! 2. Missing expected tokens emit a diagnostic but don't consume
//! 3. Unclosed delimiters are reported against their opening token
//!
//! However, fuel exhaustion (exec_fuel, recursion_fuel) returns an actual error immediately.

pub mod ast;
pub mod lexer;

mod core;
mod grammar;


pub use ast::Program;
pub use core::Parser;

use crate::PassResult;
use lexer::lex;

/// Main entry point. Returns Err on fuel exhaustion.
pub fn parse(source: &str) -> PassResult<Program> {
    Parser::new(source, lex(source)).parse()
}

/// Parse with explicit fuel limits.
pub fn parse_with_limits(
    source: &str,
    exec_fuel: Option<u32>,
    recursion_fuel: Option<u32>,
) -> PassResult<Program> {
    Parser::new(source, lex(source))
        .with_exec_fuel(exec_fuel)
        .with_recursion_fuel(recursion_fuel)
        .parse()
}

//! qmlc compiler: parser, IR builder, and compiled unit generator.
//!
//! This crate provides the compilation pipeline for QML documents:
//! - `parser` - lexer and declaration-level AST construction
//! - `builder` - AST to IR lowering with semantic validation
//! - `ir` - the in-memory document model
//! - `generate` - compiled unit layout and serialization
//! - `diagnostics` - error reporting
//! - `compiler` - high-level `QmlCompiler` facade

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod builder;
pub mod compiler;
pub mod diagnostics;
pub mod generate;
pub mod ir;
pub mod parser;

#[cfg(test)]
mod compiler_tests;
#[cfg(test)]
pub mod test_utils;

/// Result type for passes that produce both output and diagnostics.
///
/// Fatal errors (like fuel exhaustion) use the outer `Result`.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;

pub use builder::IrBuilder;
pub use compiler::{CompileConfig, CompileOutput, QmlCompiler};
pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter};
pub use generate::{FunctionIndexMap, SequentialFunctionIndices, UnitGenerator};
pub use ir::Document;

/// Errors that can occur while compiling a document.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Execution fuel exhausted (too many parser operations).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (input nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    #[error("parsing failed with {} errors", .0.error_count())]
    ParseError(Diagnostics),

    #[error("building failed with {} errors", .0.error_count())]
    BuildError(Diagnostics),
}

impl Error {
    /// Diagnostics carried by the error, if it is a user-facing failure.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::ParseError(d) | Self::BuildError(d) => Some(d),
            Self::ExecFuelExhausted | Self::RecursionLimitExceeded => None,
        }
    }
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Compiler facade: parse, build and generate with one configuration.

use crate::builder::IrBuilder;
use crate::generate::UnitGenerator;
use crate::ir::Document;
use crate::parser::{self, Program};
use crate::{Error, Result};

const DEFAULT_EXEC_FUEL: u32 = 1_000_000;
const DEFAULT_RECURSION_FUEL: u32 = 4096;

/// Globals of the JavaScript environment. An id or member with one of these
/// names would shadow it inside binding expressions.
pub const DEFAULT_ILLEGAL_NAMES: &[&str] = &[
    "Array",
    "Boolean",
    "Date",
    "Error",
    "EvalError",
    "Function",
    "Infinity",
    "JSON",
    "Math",
    "NaN",
    "Number",
    "Object",
    "RangeError",
    "ReferenceError",
    "RegExp",
    "String",
    "SyntaxError",
    "TypeError",
    "URIError",
    "console",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
    "escape",
    "eval",
    "gc",
    "isFinite",
    "isNaN",
    "parseFloat",
    "parseInt",
    "print",
    "qsTr",
    "qsTrId",
    "undefined",
    "unescape",
];

#[derive(Clone, Debug)]
pub struct CompileConfig {
    /// Parser step limit; `None` is unlimited.
    pub exec_fuel: Option<u32>,
    /// Nesting limit; `None` is unlimited.
    pub recursion_fuel: Option<u32>,
    pub illegal_names: Vec<String>,
    pub url: String,
    pub dependency_checksum: Option<[u8; 16]>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            exec_fuel: Some(DEFAULT_EXEC_FUEL),
            recursion_fuel: Some(DEFAULT_RECURSION_FUEL),
            illegal_names: DEFAULT_ILLEGAL_NAMES.iter().map(|s| s.to_string()).collect(),
            url: String::new(),
            dependency_checksum: None,
        }
    }
}

/// Compiles one QML document.
///
/// ```ignore
/// let output = QmlCompiler::new("Item { width: 100 }")
///     .with_url("Main.qml")
///     .compile()?;
/// ```
pub struct QmlCompiler<'s> {
    source: &'s str,
    config: CompileConfig,
}

/// Result of a full compilation.
#[derive(Debug)]
pub struct CompileOutput {
    pub document: Document,
    pub unit: Vec<u8>,
}

impl<'s> QmlCompiler<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            config: CompileConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CompileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    pub fn with_exec_fuel(mut self, fuel: Option<u32>) -> Self {
        self.config.exec_fuel = fuel;
        self
    }

    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.config.recursion_fuel = limit;
        self
    }

    pub fn with_illegal_names<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.config.illegal_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dependency_checksum(mut self, checksum: [u8; 16]) -> Self {
        self.config.dependency_checksum = Some(checksum);
        self
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Render `error` against this compiler's source, labelled with the
    /// configured url when there is one.
    pub fn render_error(&self, error: &Error, colored: bool) -> String {
        let Some(diagnostics) = error.diagnostics() else {
            return error.to_string();
        };
        let mut printer = diagnostics.printer(self.source).colored(colored);
        if !self.config.url.is_empty() {
            printer = printer.url(&self.config.url);
        }
        printer.render()
    }

    /// Parse only. Syntax errors fail with [`Error::ParseError`].
    pub fn parse(&self) -> Result<Program> {
        let (program, diagnostics) = parser::parse_with_limits(
            self.source,
            self.config.exec_fuel,
            self.config.recursion_fuel,
        )?;
        if diagnostics.has_errors() {
            return Err(Error::ParseError(diagnostics));
        }
        Ok(program)
    }

    /// Parse and lower into a document.
    pub fn build(&self) -> Result<Document> {
        let program = self.parse()?;
        IrBuilder::new(self.config.illegal_names.iter().cloned())
            .build(&program, self.source, &self.config.url)
            .map_err(Error::BuildError)
    }

    /// Parse, build and generate the compiled unit.
    pub fn compile(&self) -> Result<CompileOutput> {
        let document = self.build()?;
        let unit = UnitGenerator::new(&document)
            .with_dependency_checksum(self.config.dependency_checksum)
            .generate();
        Ok(CompileOutput { document, unit })
    }
}

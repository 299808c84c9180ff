use rowan::TextRange;

/// Diagnostic kinds, grouped by the stage that reports them.
///
/// Builder messages are the exact texts QML tooling users know from `qmlscene`
/// and `qmllint`, so they are kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum DiagnosticKind {
    // Parser: delimiters
    UnclosedBrace,
    UnclosedBracket,
    UnclosedParen,

    // Parser: missing pieces
    ExpectedRootObject,
    ExpectedIdentifier,
    ExpectedExpression,
    UnexpectedToken,
    UnterminatedString,

    // Document structure
    UnexpectedObjectDefinition,
    JsDeclarationOutsideScript,

    // Imports and pragmas
    InvalidImportQualifier,
    ReservedImportQualifier,
    DuplicateScriptQualifier,
    ScriptImportNeedsQualifier,
    LibraryImportNeedsVersion,
    InvalidPragma,

    // Qualified names and bindings
    ExpectedTypeName,
    InvalidIdUse,
    InvalidComponentId,
    PropertyValueSetMultipleTimes,

    // Ids
    EmptyId,
    IdStartsUppercase,
    IdBadStart,
    IdBadChar,
    IdMasksGlobal,
    IdNotUnique,

    // Properties
    ExpectedPropertyType,
    InvalidTypeModifier,
    UnexpectedTypeModifier,
    IllegalPropertyName,
    DuplicatePropertyName,
    PropertyNameUppercase,
    DuplicateDefaultProperty,

    // Aliases
    NoAliasLocation,
    InvalidAliasReference,
    InvalidAliasLocation,
    DuplicateAliasName,
    AliasNameUppercase,

    // Signals
    ExpectedParameterType,
    InvalidSignalParameterType,
    SignalNameUppercase,
    IllegalSignalName,
    DuplicateSignalName,

    // Methods
    DuplicateMethodName,
    MethodNameUppercase,
    IllegalMethodName,
}

impl DiagnosticKind {
    /// Parser diagnostics, as opposed to semantic ones from the builder.
    pub fn is_syntax_error(&self) -> bool {
        *self <= Self::UnterminatedString
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnclosedBrace => "missing closing `}`",
            Self::UnclosedBracket => "missing closing `]`",
            Self::UnclosedParen => "missing closing `)`",

            Self::ExpectedRootObject => "expected a root object definition",
            Self::ExpectedIdentifier => "expected identifier",
            Self::ExpectedExpression => "expected an expression",
            Self::UnexpectedToken => "unexpected token",
            Self::UnterminatedString => "unterminated string literal",

            Self::UnexpectedObjectDefinition => "Unexpected object definition",
            Self::JsDeclarationOutsideScript => "JavaScript declaration outside Script element",

            Self::InvalidImportQualifier => "Invalid import qualifier ID",
            Self::ReservedImportQualifier => {
                "Reserved name \"Qt\" cannot be used as an qualifier"
            }
            Self::DuplicateScriptQualifier => "Script import qualifiers must be unique.",
            Self::ScriptImportNeedsQualifier => "Script import requires a qualifier",
            Self::LibraryImportNeedsVersion => "Library import requires a version",
            Self::InvalidPragma => "Pragma requires a valid qualifier",

            Self::ExpectedTypeName => "Expected type name",
            Self::InvalidIdUse => "Invalid use of id property",
            Self::InvalidComponentId => "Invalid component id specification",
            Self::PropertyValueSetMultipleTimes => "Property value set multiple times",

            Self::EmptyId => "Invalid empty ID",
            Self::IdStartsUppercase => "IDs cannot start with an uppercase letter",
            Self::IdBadStart => "IDs must start with a letter or underscore",
            Self::IdBadChar => "IDs must contain only letters, numbers, and underscores",
            Self::IdMasksGlobal => "ID illegally masks global JavaScript property",
            Self::IdNotUnique => "id is not unique",

            Self::ExpectedPropertyType => "Expected property type",
            Self::InvalidTypeModifier => "Invalid property type modifier",
            Self::UnexpectedTypeModifier => "Unexpected property type modifier",
            Self::IllegalPropertyName => "Illegal property name",
            Self::DuplicatePropertyName => "Duplicate property name",
            Self::PropertyNameUppercase => "Property names cannot begin with an upper case letter",
            Self::DuplicateDefaultProperty => "Duplicate default property",

            Self::NoAliasLocation => "No property alias location",
            Self::InvalidAliasReference => {
                "Invalid alias reference. An alias reference must be specified as <id>, <id>.<property> or <id>.<value property>.<property>"
            }
            Self::InvalidAliasLocation => "Invalid alias location",
            Self::DuplicateAliasName => "Duplicate alias name",
            Self::AliasNameUppercase => "Alias names cannot begin with an upper case letter",

            Self::ExpectedParameterType => "Expected parameter type",
            Self::InvalidSignalParameterType => "Invalid signal parameter type",
            Self::SignalNameUppercase => "Signal names cannot begin with an upper case letter",
            Self::IllegalSignalName => "Illegal signal name",
            Self::DuplicateSignalName => "Duplicate signal name",

            Self::DuplicateMethodName => "Duplicate method name",
            Self::MethodNameUppercase => "Method names cannot begin with an upper case letter",
            Self::IllegalMethodName => "Illegal method name",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnexpectedToken => "{}".to_string(),
            Self::InvalidSignalParameterType => "Invalid signal parameter type: {}".to_string(),
            Self::IdNotUnique => "id `{}` is not unique".to_string(),

            Self::UnclosedBrace | Self::UnclosedBracket | Self::UnclosedParen => {
                format!("{}; {{}}", self.fallback_message())
            }

            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// The range shown to the user (underlined in output).
    pub(crate) range: TextRange,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind, range: TextRange) -> Self {
        Self::new(kind, range, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error at {}..{}: {}",
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        Ok(())
    }
}

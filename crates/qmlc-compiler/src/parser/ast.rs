//! Declaration AST consumed by the IR builder.
//!
//! Nodes own their text and carry `TextRange` spans into the source. Only the
//! declaration grammar is modeled in detail; JavaScript is kept structural,
//! just enough to tell literals and simple references apart from everything
//! else.

use rowan::{TextRange, TextSize};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub imports: Vec<Import>,
    pub pragmas: Vec<Pragma>,
    /// Top-level object definitions. A well-formed document has exactly one.
    pub objects: Vec<ObjectDefinition>,
}

impl Program {
    pub fn root(&self) -> Option<&ObjectDefinition> {
        self.objects.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub text: String,
    pub range: TextRange,
}

impl Ident {
    pub fn new(text: impl Into<String>, range: TextRange) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Dotted name such as `anchors.top` or `QtQuick.Item`. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedId {
    pub parts: Vec<Ident>,
}

impl QualifiedId {
    pub fn new(parts: Vec<Ident>) -> Self {
        debug_assert!(!parts.is_empty(), "qualified id without components");
        Self { parts }
    }

    pub fn first(&self) -> &Ident {
        &self.parts[0]
    }

    pub fn last(&self) -> &Ident {
        &self.parts[self.parts.len() - 1]
    }

    pub fn range(&self) -> TextRange {
        self.first().range.cover(self.last().range)
    }

    /// Components joined with `.`.
    pub fn joined(&self) -> String {
        let mut out = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&part.text);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSource {
    /// `import QtQuick 2.0`
    Uri(QualifiedId),
    /// `import "file.js" as Js` (unescaped path)
    File { path: String, range: TextRange },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub import_token: TextRange,
    pub source: ImportSource,
    pub version: Option<Ident>,
    pub qualifier: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pragma {
    pub pragma_token: TextRange,
    pub name: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDefinition {
    pub type_name: QualifiedId,
    pub initializer: ObjectInitializer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInitializer {
    pub lbrace: TextRange,
    pub members: Vec<ObjectMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    /// `Type { ... }` or `group { ... }`
    ObjectDefinition(ObjectDefinition),
    /// `name: Type { ... }` or `Type on name { ... }`
    ObjectBinding(ObjectBinding),
    /// `name: expression`
    ScriptBinding(ScriptBinding),
    /// `name: [ Type { ... }, ... ]`
    ArrayBinding(ArrayBinding),
    /// `property ...` or `signal ...`
    PublicMember(PublicMember),
    /// Function declaration or a stray JavaScript statement.
    SourceElement(SourceElement),
}

impl ObjectMember {
    pub fn start(&self) -> TextSize {
        match self {
            Self::ObjectDefinition(def) => def.type_name.range().start(),
            Self::ObjectBinding(binding) => binding
                .qualified_id
                .range()
                .start()
                .min(binding.type_name.range().start()),
            Self::ScriptBinding(binding) => binding.qualified_id.range().start(),
            Self::ArrayBinding(binding) => binding.qualified_id.range().start(),
            Self::PublicMember(member) => member.first_token.start(),
            Self::SourceElement(element) => element.range.start(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectBinding {
    pub qualified_id: QualifiedId,
    pub type_name: QualifiedId,
    pub has_on_token: bool,
    pub initializer: ObjectInitializer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptBinding {
    pub qualified_id: QualifiedId,
    pub statement: Statement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayBinding {
    pub qualified_id: QualifiedId,
    pub lbracket: TextRange,
    pub members: Vec<ObjectDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PublicMemberKind {
    Property {
        /// `Item` in `property list<Item> items`.
        member_type: Option<QualifiedId>,
        /// `list` in `property list<Item> items`.
        type_modifier: Option<Ident>,
        default_token: Option<TextRange>,
        readonly_token: Option<TextRange>,
        /// Initializer after `:`, if present.
        initializer: Option<PropertyInitializer>,
    },
    Signal {
        parameters: Vec<Parameter>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyInitializer {
    Statement(Statement),
    Object(ObjectBinding),
    Array(ArrayBinding),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublicMember {
    pub kind: PublicMemberKind,
    /// First token of the declaration (`default`, `readonly`, `property` or `signal`).
    pub first_token: TextRange,
    /// The `property`/`signal` keyword.
    pub keyword: TextRange,
    pub name: Ident,
}

impl PublicMember {
    pub fn is_signal(&self) -> bool {
        matches!(self.kind, PublicMemberKind::Signal { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// `None` when only a name was written.
    pub ty: Option<QualifiedId>,
    pub name: Ident,
}

impl Parameter {
    pub fn range(&self) -> TextRange {
        match &self.ty {
            Some(ty) => ty.range().cover(self.name.range),
            None => self.name.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceElementKind {
    Function(FunctionDeclaration),
    /// Any other statement (`var x = 1`, `if (...) ...`).
    Statement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceElement {
    pub kind: SourceElementKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub function_token: TextRange,
    pub name: Ident,
    pub formals: Vec<Ident>,
    pub body: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Expression(Expression),
    Block,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub range: TextRange,
}

impl Statement {
    pub fn expression(&self) -> Option<&Expression> {
        match &self.kind {
            StatementKind::Expression(expr) => Some(expr),
            StatementKind::Block | StatementKind::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    String(String),
    Number(f64),
    True,
    False,
    Null,
    Identifier(String),
    FieldMember {
        base: Box<Expression>,
        name: Ident,
    },
    UnaryMinus(Box<Expression>),
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// Anything the structural grammar does not model.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub range: TextRange,
}

impl Expression {
    pub fn new(kind: ExpressionKind, range: TextRange) -> Self {
        Self { kind, range }
    }

    pub fn as_string(&self) -> Option<&str> {
        match &self.kind {
            ExpressionKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.kind {
            ExpressionKind::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Flattens `a.b.c` into its components, or `None` if the expression is
    /// not a plain identifier chain.
    pub fn as_reference_chain(&self) -> Option<Vec<Ident>> {
        match &self.kind {
            ExpressionKind::Identifier(name) => Some(vec![Ident::new(name.clone(), self.range)]),
            ExpressionKind::FieldMember { base, name } => {
                let mut chain = base.as_reference_chain()?;
                chain.push(name.clone());
                Some(chain)
            }
            _ => None,
        }
    }

    /// Source text of the expression, as written.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[std::ops::Range::<usize>::from(self.range)]
    }

    /// String, number, boolean or negated number: values stored directly
    /// instead of being compiled.
    pub fn is_constant(&self) -> bool {
        match &self.kind {
            ExpressionKind::String(_)
            | ExpressionKind::Number(_)
            | ExpressionKind::True
            | ExpressionKind::False => true,
            ExpressionKind::UnaryMinus(operand) => operand.as_number().is_some(),
            _ => false,
        }
    }
}

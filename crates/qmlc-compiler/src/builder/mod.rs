//! AST to IR lowering.
//!
//! One recursive walk over the declaration AST. The object being filled and
//! the property declaration being initialized travel down the walk as an
//! explicit [`Scope`]; nothing is swapped in and out of shared state.
//!
//! Every rule violation is reported into [`Diagnostics`] and aborts only the
//! declaration it belongs to, so one run reports as many problems as
//! possible. Any diagnostic fails the whole build.

mod finalize;
mod headers;
mod members;
mod objects;

#[cfg(test)]
mod members_tests;

use indexmap::{IndexMap, IndexSet};

use qmlc_core::{LineIndex, Location, StringId};
use rowan::{TextRange, TextSize};
use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::ir::{Document, ObjectId};
use crate::parser::{self, Program};
use crate::{Error, Result};

/// Builds a [`Document`] from a parsed program.
///
/// The builder itself only holds configuration and can be reused for any
/// number of documents.
#[derive(Debug, Clone, Default)]
pub struct IrBuilder {
    illegal_names: IndexSet<String>,
}

impl IrBuilder {
    /// `illegal_names` are reserved identifiers (typically JavaScript
    /// globals) that may not be used as ids, property, signal or method names.
    pub fn new<I>(illegal_names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            illegal_names: illegal_names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn illegal_names(&self) -> &IndexSet<String> {
        &self.illegal_names
    }

    /// Lower `program`, parsed from `source`, into a document.
    pub fn build(
        &self,
        program: &Program,
        source: &str,
        url: &str,
    ) -> std::result::Result<Document, Diagnostics> {
        let _span = tracing::debug_span!("build", url).entered();

        let mut lowering = Lowering::new(source, url, &self.illegal_names);
        lowering.lower_program(program);
        if lowering.diagnostics.has_errors() {
            debug!(errors = lowering.diagnostics.len(), "build failed");
            return Err(lowering.diagnostics);
        }

        lowering.finalize();
        debug!(
            objects = lowering.doc.objects.len(),
            strings = lowering.doc.strings.len(),
            "built document"
        );
        Ok(lowering.doc)
    }

    /// Parse and lower QML source text.
    pub fn generate_from_qml(&self, source: &str, url: &str) -> Result<Document> {
        let (program, diagnostics) = parser::parse(source)?;
        if diagnostics.has_errors() {
            return Err(Error::ParseError(diagnostics));
        }
        self.build(&program, source, url).map_err(Error::BuildError)
    }
}

/// What a member is being lowered into.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Scope {
    pub object: ObjectId,
    /// Set while lowering the initializer of a `property` declaration.
    pub property: Option<PropertyScope>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct PropertyScope {
    pub read_only: bool,
}

impl Scope {
    fn object(object: ObjectId) -> Self {
        Self {
            object,
            property: None,
        }
    }

    /// Same declaration context, different object.
    fn retarget(self, object: ObjectId) -> Self {
        Self { object, ..self }
    }

    fn initializes_read_only(&self) -> bool {
        self.property.is_some_and(|p| p.read_only)
    }
}

/// State of one build.
pub(crate) struct Lowering<'a> {
    source: &'a str,
    lines: LineIndex<'a>,
    illegal_names: &'a IndexSet<String>,
    doc: Document,
    diagnostics: Diagnostics,
    /// For each object, the component whose id namespace its `id:` joins.
    id_scope: Vec<ObjectId>,
    /// First declaration of each id, per component.
    ids: IndexMap<(ObjectId, StringId), TextRange>,
}

impl<'a> Lowering<'a> {
    fn new(source: &'a str, url: &str, illegal_names: &'a IndexSet<String>) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            illegal_names,
            doc: Document::new(url),
            diagnostics: Diagnostics::new(),
            id_scope: Vec::new(),
            ids: IndexMap::new(),
        }
    }

    fn lower_program(&mut self, program: &Program) {
        for import in &program.imports {
            self.lower_import(import);
        }
        for pragma in &program.pragmas {
            self.lower_pragma(pragma);
        }

        let Some(root) = program.root() else {
            let end = TextSize::of(self.source);
            self.error(DiagnosticKind::ExpectedRootObject, TextRange::empty(end));
            return;
        };
        if let Some(second) = program.objects.get(1) {
            self.error(
                DiagnosticKind::UnexpectedObjectDefinition,
                second.type_name.first().range,
            );
            return;
        }

        if let Some(id) = self.define_object(
            None,
            Some(&root.type_name),
            root.type_name.range().start(),
            Some(&root.initializer),
            None,
        ) {
            self.doc.index_of_root_object = id;
        }
    }

    fn location(&self, offset: TextSize) -> Location {
        self.lines.location(offset.into())
    }

    fn location_of(&self, range: TextRange) -> Location {
        self.location(range.start())
    }

    fn error(&mut self, kind: DiagnosticKind, range: TextRange) {
        self.diagnostics.report(kind, range).emit();
    }

    fn is_illegal(&self, name: &str) -> bool {
        self.illegal_names.contains(name)
    }

    fn intern(&mut self, s: &str) -> StringId {
        self.doc.intern(s)
    }

    /// Object that receives bindings made in `scope`.
    ///
    /// Inside a property declaration on a group container, the initializer
    /// binds on the object the declaration went to.
    fn bindings_target(&self, scope: Scope) -> ObjectId {
        if scope.property.is_some()
            && let Some(target) = self.doc.object(scope.object).declarations_override
        {
            return target;
        }
        scope.object
    }
}

//! Imports and pragmas.

use qmlc_core::StringId;
use qmlc_core::utils::{parse_version, starts_uppercase};
use qmlc_unit::ImportKind;
use tracing::trace;

use super::Lowering;
use crate::diagnostics::DiagnosticKind;
use crate::ir::{Import, Pragma, PragmaKind};
use crate::parser::ast;

impl Lowering<'_> {
    pub(super) fn lower_import(&mut self, import: &ast::Import) {
        let (kind, uri, uri_range) = match &import.source {
            ast::ImportSource::File { path, range } => {
                let kind = if path.ends_with(".js") {
                    ImportKind::Script
                } else {
                    ImportKind::File
                };
                (kind, path.clone(), *range)
            }
            ast::ImportSource::Uri(uri) => (ImportKind::Library, uri.joined(), uri.range()),
        };

        let mut qualifier = StringId::EMPTY;
        if let Some(q) = &import.qualifier {
            if !starts_uppercase(q.as_str()) {
                self.error(DiagnosticKind::InvalidImportQualifier, q.range);
                return;
            }
            if q.as_str() == "Qt" {
                self.error(DiagnosticKind::ReservedImportQualifier, q.range);
                return;
            }
            let is_script = kind == ImportKind::Script;
            let clash = self.doc.imports.iter().any(|other| {
                (is_script || other.kind == ImportKind::Script)
                    && self.doc.text(other.qualifier) == q.as_str()
            });
            if clash {
                self.error(DiagnosticKind::DuplicateScriptQualifier, q.range);
                return;
            }
            qualifier = self.intern(q.as_str());
        } else if kind == ImportKind::Script {
            self.error(DiagnosticKind::ScriptImportNeedsQualifier, uri_range);
            return;
        }

        let (major, minor) = match &import.version {
            Some(version) => parse_version(version.as_str()),
            None if kind == ImportKind::Library => {
                self.error(DiagnosticKind::LibraryImportNeedsVersion, uri_range);
                return;
            }
            None => (-1, -1),
        };

        let uri = self.intern(&uri);
        let location = self.location_of(import.import_token);
        trace!(uri = self.doc.text(uri), kind = kind.name(), "import");
        self.doc.imports.push(Import {
            kind,
            uri,
            qualifier,
            major,
            minor,
            location,
        });
    }

    /// Only `pragma Singleton` exists; repeating it changes nothing.
    pub(super) fn lower_pragma(&mut self, pragma: &ast::Pragma) {
        match &pragma.name {
            Some(name) if name.as_str() == "Singleton" => {
                if self.doc.is_singleton() {
                    return;
                }
                let location = self.location_of(pragma.pragma_token);
                self.doc.pragmas.push(Pragma {
                    kind: PragmaKind::Singleton,
                    location,
                });
            }
            _ => self.error(DiagnosticKind::InvalidPragma, pragma.pragma_token),
        }
    }
}

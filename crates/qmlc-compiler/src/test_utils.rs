//! Test helpers shared by the builder and generator tests.

use qmlc_unit::{Unit, dump};

use crate::compiler::{CompileOutput, QmlCompiler};
use crate::ir::Document;

impl QmlCompiler<'_> {
    #[track_caller]
    pub fn expect_valid(src: &str) -> Document {
        match QmlCompiler::new(src).build() {
            Ok(document) => document,
            Err(err) => panic!("Expected valid document, got error:\n{}", render(src, &err)),
        }
    }

    #[track_caller]
    pub fn expect_valid_unit(src: &str) -> CompileOutput {
        match QmlCompiler::new(src).compile() {
            Ok(output) => output,
            Err(err) => panic!("Expected valid document, got error:\n{}", render(src, &err)),
        }
    }

    /// Compile, load the unit back and dump it.
    #[track_caller]
    pub fn expect_valid_dump(src: &str) -> String {
        let output = Self::expect_valid_unit(src);
        let unit = Unit::from_bytes(output.unit).expect("generated unit must load");
        dump(&unit)
    }

    /// `line:column: message` for every diagnostic.
    #[track_caller]
    pub fn expect_invalid(src: &str) -> String {
        match QmlCompiler::new(src).build() {
            Ok(_) => panic!("Expected invalid document, got valid:\n{src}"),
            Err(err) => render(src, &err),
        }
    }
}

fn render(src: &str, err: &crate::Error) -> String {
    let Some(diagnostics) = err.diagnostics() else {
        return err.to_string();
    };
    diagnostics
        .locations(src)
        .into_iter()
        .map(|(location, message)| format!("{location}: {message}\n"))
        .collect()
}

use qmlc_unit::Unit;

use crate::Error;
use crate::compiler::{CompileConfig, DEFAULT_ILLEGAL_NAMES, QmlCompiler};

#[test]
fn default_config() {
    let config = CompileConfig::default();
    assert!(config.exec_fuel.is_some());
    assert!(config.recursion_fuel.is_some());
    assert_eq!(config.illegal_names.len(), DEFAULT_ILLEGAL_NAMES.len());
    assert!(config.url.is_empty());
    assert!(config.dependency_checksum.is_none());
}

#[test]
fn compile_produces_document_and_unit() {
    let output = QmlCompiler::new("Item { width: 100 }")
        .with_url("Main.qml")
        .with_dependency_checksum([1; 16])
        .compile()
        .unwrap();

    assert_eq!(output.document.url, "Main.qml");
    let unit = Unit::from_bytes(output.unit).unwrap();
    assert_eq!(unit.object_count(), output.document.objects.len());
    assert_eq!(unit.header().dependency_checksum, [1; 16]);
}

#[test]
fn illegal_names_are_configurable() {
    let source = "Item { id: eval }";
    assert!(QmlCompiler::new(source).build().is_err());

    let doc = QmlCompiler::new(source)
        .with_illegal_names(Vec::<String>::new())
        .build()
        .unwrap();
    assert_eq!(doc.text(doc.root().id_name), "eval");
}

#[test]
fn recursion_fuel_is_passed_to_the_parser() {
    let source = "Item { Item { Item {} } }";
    let err = QmlCompiler::new(source)
        .with_recursion_fuel(Some(2))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::RecursionLimitExceeded));

    let compiler = QmlCompiler::new(source).with_recursion_fuel(Some(2));
    assert_eq!(compiler.render_error(&err, false), "recursion limit exceeded");

    assert!(
        QmlCompiler::new(source)
            .with_recursion_fuel(None)
            .build()
            .is_ok()
    );
}

#[test]
fn parse_errors_stop_before_building() {
    let err = QmlCompiler::new("Item {").build().unwrap_err();
    assert!(matches!(err, Error::ParseError(_)));
    assert!(err.diagnostics().is_some_and(|d| d.has_errors()));
}

#[test]
fn render_error_uses_the_url() {
    let compiler = QmlCompiler::new("Item { signal a; signal a }").with_url("Main.qml");
    let err = compiler.build().unwrap_err();
    assert!(matches!(err, Error::BuildError(_)));

    let rendered = compiler.render_error(&err, false);
    assert!(rendered.contains("error: Duplicate signal name"));
    assert!(rendered.contains("--> Main.qml:1:25"));

    let anonymous = QmlCompiler::new("Item { signal a; signal a }");
    assert!(!anonymous.render_error(&err, false).contains("-->"));
}

use indoc::indoc;
use qmlc_core::StringId;
use qmlc_unit::{BindingClass, PropertyType, alias_flags, binding_flags, property_flags};

use crate::compiler::QmlCompiler;
use crate::diagnostics::DiagnosticKind;
use crate::ir::{BindingValue, CodeKind, ObjectId};

fn error_at(location: &str, kind: DiagnosticKind) -> String {
    format!("{location}: {}\n", kind.fallback_message())
}

#[test]
fn property_types() {
    let input = indoc! {r#"
    Item {
        property int a
        property real b
        property Item c
        property list<Item> d
        readonly property string e: "x"
        default property var f
    }
    "#};

    let doc = QmlCompiler::expect_valid(input);
    let root = doc.root();
    let types: Vec<_> = root.properties.iter().map(|p| p.ty).collect();
    assert_eq!(
        types,
        [
            PropertyType::Int,
            PropertyType::Real,
            PropertyType::Custom,
            PropertyType::CustomList,
            PropertyType::String,
            PropertyType::Var,
        ]
    );

    let item = doc.strings.get("Item").unwrap();
    assert_eq!(root.properties[2].custom_type_name, item);
    assert_eq!(root.properties[3].custom_type_name, item);
    assert_eq!(root.properties[0].custom_type_name, StringId::EMPTY);

    assert_eq!(root.properties[4].flags, property_flags::IS_READ_ONLY);
    assert_eq!(root.properties[0].flags, 0);
    assert_eq!(root.index_of_default_property_or_alias, 5);
    assert!(!root.default_property_is_alias);
    assert_eq!(doc.text(root.default_property().unwrap().name), "f");

    let [init] = root.bindings.as_slice() else {
        panic!("expected one initializer binding");
    };
    assert_eq!(doc.text(init.property_name), "e");
    assert!(init.has_flag(binding_flags::INITIALIZER_FOR_READ_ONLY_DECLARATION));
    assert!(matches!(init.value, BindingValue::String(_)));
}

#[test]
fn property_location_starts_at_first_modifier() {
    let doc = QmlCompiler::expect_valid("Item { readonly property int x: 1 }");
    let property = &doc.root().properties[0];
    assert_eq!(property.location.column, 8);
}

#[test]
fn redundant_null_initializer() {
    let doc = QmlCompiler::expect_valid("Item { property Item child: null; property var v: null }");
    let root = doc.root();
    assert_eq!(root.properties.len(), 2);

    let [binding] = root.bindings.as_slice() else {
        panic!("expected one binding");
    };
    assert_eq!(doc.text(binding.property_name), "v");
    assert!(matches!(binding.value, BindingValue::Script(_)));
}

#[test]
fn object_initializer() {
    let doc = QmlCompiler::expect_valid("Item { readonly property Item child: Rectangle {} }");
    let root = doc.root();
    let [binding] = root.bindings.as_slice() else {
        panic!("expected one binding");
    };
    assert_eq!(doc.text(binding.property_name), "child");
    assert_eq!(binding.value, BindingValue::Object(ObjectId::new(1)));
    assert!(binding.has_flag(binding_flags::INITIALIZER_FOR_READ_ONLY_DECLARATION));
}

#[test]
fn list_initializer() {
    let doc = QmlCompiler::expect_valid("Item { property list<Item> items: [ Item {}, Item {} ] }");
    let root = doc.root();
    assert_eq!(root.bindings.len(), 2);
    assert!(
        root.bindings
            .iter()
            .all(|b| b.has_flag(binding_flags::IS_LIST_ITEM))
    );
}

#[test]
fn duplicate_property() {
    let input = indoc! {r#"
    Item {
        property int x
        property string x
    }
    "#};

    assert_eq!(
        QmlCompiler::expect_invalid(input),
        "3:21: Duplicate property name\n"
    );
    assert!(QmlCompiler::new(input).compile().is_err());
}

#[test]
fn property_type_errors() {
    assert_eq!(
        QmlCompiler::expect_invalid("Item { property foo x }"),
        error_at("1:17", DiagnosticKind::ExpectedPropertyType)
    );
    assert_eq!(
        QmlCompiler::expect_invalid("Item { property list<int> x }"),
        error_at("1:17", DiagnosticKind::UnexpectedTypeModifier)
    );
    assert_eq!(
        QmlCompiler::expect_invalid("Item { property vector<Item> x }"),
        error_at("1:17", DiagnosticKind::InvalidTypeModifier)
    );
}

#[test]
fn property_naming_rules() {
    assert_eq!(
        QmlCompiler::expect_invalid("Item { property int X }"),
        "1:21: Property names cannot begin with an upper case letter\n"
    );
    assert_eq!(
        QmlCompiler::expect_invalid("Item { property int eval }"),
        "1:21: Illegal property name\n"
    );
}

#[test]
fn duplicate_default_property() {
    let input = indoc! {r#"
    Item {
        default property var a
        default property var b
    }
    "#};

    assert_eq!(
        QmlCompiler::expect_invalid(input),
        "3:5: Duplicate default property\n"
    );
}

#[test]
fn members_share_one_namespace() {
    let signal_then_property = indoc! {r#"
    Item {
        signal done
        property int done
    }
    "#};
    assert_eq!(
        QmlCompiler::expect_invalid(signal_then_property),
        "3:18: Duplicate property name\n"
    );

    let property_then_method = indoc! {r#"
    Item {
        property int f
        function f() {}
    }
    "#};
    assert_eq!(
        QmlCompiler::expect_invalid(property_then_method),
        "3:14: Duplicate method name\n"
    );

    let property_then_alias = indoc! {r#"
    Item {
        id: root
        property int a
        property alias a: root
    }
    "#};
    assert_eq!(
        QmlCompiler::expect_invalid(property_then_alias),
        "4:20: Duplicate alias name\n"
    );
}

#[test]
fn alias_shapes() {
    let input = indoc! {r#"
    Item {
        id: root
        property alias a: root
        property alias b: root.width
        readonly property alias c: root.font.bold
    }
    "#};

    let doc = QmlCompiler::expect_valid(input);
    let aliases = &doc.root().aliases;
    assert_eq!(aliases.len(), 3);

    let root = doc.strings.get("root").unwrap();
    assert!(aliases.iter().all(|a| a.id == root));

    let paths: Vec<_> = aliases.iter().map(|a| doc.text(a.property_name)).collect();
    assert_eq!(paths, ["", "width", "font.bold"]);
    assert_eq!(aliases[2].flags, alias_flags::IS_READ_ONLY);
    assert_eq!(aliases[1].reference_location.line, 4);
    assert_eq!(aliases[1].reference_location.column, 23);
}

#[test]
fn alias_with_four_components() {
    assert_eq!(
        QmlCompiler::expect_invalid("Item { property alias d: root.a.b.c }"),
        error_at("1:26", DiagnosticKind::InvalidAliasReference)
    );
}

#[test]
fn alias_errors() {
    assert_eq!(
        QmlCompiler::expect_invalid("Item { property alias d }"),
        "1:8: No property alias location\n"
    );
    assert_eq!(
        QmlCompiler::expect_invalid("Item { property alias d: 5 }"),
        "1:26: Invalid alias location\n"
    );
    assert_eq!(
        QmlCompiler::expect_invalid("Item { property alias d: a + b }"),
        error_at("1:26", DiagnosticKind::InvalidAliasReference)
    );
    assert_eq!(
        QmlCompiler::expect_invalid("Item { property alias D: a }"),
        "1:23: Alias names cannot begin with an upper case letter\n"
    );
}

#[test]
fn default_alias() {
    let input = indoc! {r#"
    Item {
        default property alias content: inner.data
        Item { id: inner }
    }
    "#};

    let doc = QmlCompiler::expect_valid(input);
    let root = doc.root();
    assert!(root.default_property_is_alias);
    assert_eq!(root.index_of_default_property_or_alias, 0);
    assert_eq!(doc.text(root.default_alias().unwrap().name), "content");
    assert!(root.default_property().is_none());
}

#[test]
fn binding_to_alias() {
    let input = indoc! {r#"
    Item {
        property alias label: text.value
        label: "hi"
        width: 5
        Text { id: text }
    }
    "#};

    let doc = QmlCompiler::expect_valid(input);
    let root = doc.root();
    let label = root.find_binding(doc.strings.get("label").unwrap()).unwrap();
    assert!(label.has_flag(binding_flags::IS_BINDING_TO_ALIAS));
    assert_eq!(label.class(), BindingClass::ValueToAlias);

    let width = root.find_binding(doc.strings.get("width").unwrap()).unwrap();
    assert_eq!(width.class(), BindingClass::Value);
}

#[test]
fn signals() {
    let input = indoc! {r#"
    Item {
        signal clicked
        signal moved(int x, real y)
        signal picked(item: Item)
    }
    "#};

    let doc = QmlCompiler::expect_valid(input);
    let root = doc.root();
    let counts: Vec<_> = root.signals.iter().map(|s| s.parameters.len()).collect();
    assert_eq!(counts, [0, 2, 1]);
    assert_eq!(root.signal_parameter_count(), 3);

    let moved = &root.signals[1];
    assert_eq!(doc.text(moved.name), "moved");
    assert_eq!(moved.parameters[1].ty, PropertyType::Real);
    assert_eq!(doc.text(moved.parameters[1].name), "y");

    let picked = &root.signals[2].parameters[0];
    assert_eq!(picked.ty, PropertyType::Custom);
    assert_eq!(doc.text(picked.custom_type_name), "Item");
}

#[test]
fn signal_errors() {
    assert_eq!(
        QmlCompiler::expect_invalid("Item { signal s(foo x) }"),
        "1:8: Invalid signal parameter type: foo\n"
    );
    assert_eq!(
        QmlCompiler::expect_invalid("Item { signal s(a) }"),
        "1:8: Expected parameter type\n"
    );
    assert_eq!(
        QmlCompiler::expect_invalid("Item { signal Done }"),
        "1:15: Signal names cannot begin with an upper case letter\n"
    );
    assert_eq!(
        QmlCompiler::expect_invalid("Item { signal eval }"),
        "1:15: Illegal signal name\n"
    );
    assert_eq!(
        QmlCompiler::expect_invalid("Item { signal a; signal a(int x) }"),
        "1:25: Duplicate signal name\n"
    );
}

#[test]
fn functions() {
    let input = indoc! {r#"
    Item {
        width: 5 * 2
        function add(a, b) { return a + b }
    }
    "#};

    let doc = QmlCompiler::expect_valid(input);
    let root = doc.root();
    let kinds: Vec<_> = root.functions_and_expressions.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, [CodeKind::Binding, CodeKind::Function]);

    let [add] = root.functions.as_slice() else {
        panic!("expected one function");
    };
    assert_eq!(doc.text(add.name), "add");
    assert_eq!(add.index, 1);
    let formals: Vec<_> = add.formals.iter().map(|&f| doc.text(f)).collect();
    assert_eq!(formals, ["a", "b"]);

    let slot = &root.functions_and_expressions[1];
    assert_eq!(
        &input[slot.start as usize..slot.end as usize],
        "function add(a, b) { return a + b }"
    );
}

#[test]
fn functions_inside_groups_go_to_the_object() {
    let doc = QmlCompiler::expect_valid("Item { font { function f() {} } }");
    let root = doc.root();
    assert_eq!(root.functions.len(), 1);
    assert_eq!(root.functions_and_expressions.len(), 1);
    assert!(doc.object(ObjectId::new(1)).functions.is_empty());
}

#[test]
fn function_errors() {
    assert_eq!(
        QmlCompiler::expect_invalid("Item { function Foo() {} }"),
        "1:17: Method names cannot begin with an upper case letter\n"
    );
    assert_eq!(
        QmlCompiler::expect_invalid("Item { function eval() {} }"),
        "1:17: Illegal method name\n"
    );
    assert_eq!(
        QmlCompiler::expect_invalid("Item { var x = 5 }"),
        "1:8: JavaScript declaration outside Script element\n"
    );
}

#[test]
fn uppercase_check_order_depends_on_declaration_kind() {
    let reported = |source: &str| {
        let err = QmlCompiler::new(source)
            .with_illegal_names(["Eval"])
            .build()
            .unwrap_err();
        let diagnostics = err.diagnostics().unwrap();
        [
            DiagnosticKind::PropertyNameUppercase,
            DiagnosticKind::IllegalPropertyName,
            DiagnosticKind::SignalNameUppercase,
            DiagnosticKind::IllegalSignalName,
            DiagnosticKind::MethodNameUppercase,
            DiagnosticKind::IllegalMethodName,
        ]
        .into_iter()
        .filter(|&kind| diagnostics.contains(kind))
        .collect::<Vec<_>>()
    };

    assert_eq!(
        reported("Item { signal Eval }"),
        [DiagnosticKind::SignalNameUppercase]
    );
    assert_eq!(
        reported("Item { function Eval() {} }"),
        [DiagnosticKind::MethodNameUppercase]
    );
    assert_eq!(
        reported("Item { property int Eval }"),
        [DiagnosticKind::IllegalPropertyName]
    );
}

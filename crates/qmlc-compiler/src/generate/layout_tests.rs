use indoc::indoc;
use qmlc_unit::{
    ALIAS_SIZE, BINDING_SIZE, HEADER_SIZE, IMPORT_SIZE, INDEX_SIZE, OBJECT_SIZE, PARAMETER_SIZE,
    PROPERTY_SIZE, SIGNAL_SIZE, Table,
};

use super::UnitLayout;
use crate::compiler::QmlCompiler;

#[test]
fn single_empty_object() {
    let doc = QmlCompiler::expect_valid("Item {}");
    let layout = UnitLayout::compute(&doc);

    assert_eq!(layout.offset_to_imports, HEADER_SIZE);
    assert_eq!(layout.import_count, 0);
    assert_eq!(layout.offset_to_objects, HEADER_SIZE);
    assert_eq!(layout.objects_start(), 68);

    let [object] = layout.objects.as_slice() else {
        panic!("expected one object");
    };
    assert_eq!(object.offset, 68);
    assert_eq!(object.size, OBJECT_SIZE);
    let empty = Table::new(0, OBJECT_SIZE as u32);
    assert_eq!(object.functions, empty);
    assert_eq!(object.bindings, empty);
    assert_eq!(object.named_objects, empty);

    // "" and "Item": two directory slots, a 4-byte and an 8-byte record.
    assert_eq!(layout.offset_to_string_table, 156);
    assert_eq!(layout.string_table_size, 20);
    assert_eq!(layout.unit_size, 176);
}

#[test]
fn tables_follow_the_header_in_order() {
    let input = indoc! {r#"
    Item {
        id: root
        property int x: 1
        property alias y: root.x
        signal moved(int dx, int dy)
        function f() {}
    }
    "#};

    let doc = QmlCompiler::expect_valid(input);
    let layout = UnitLayout::compute(&doc);
    let object = &layout.objects[0];

    let functions = OBJECT_SIZE;
    let properties = functions + INDEX_SIZE;
    let aliases = properties + PROPERTY_SIZE;
    let signals = aliases + ALIAS_SIZE;
    let bindings = signals + INDEX_SIZE;
    let named = bindings + BINDING_SIZE;
    let payload = named + INDEX_SIZE;

    assert_eq!(object.functions, Table::new(1, functions as u32));
    assert_eq!(object.properties, Table::new(1, properties as u32));
    assert_eq!(object.aliases, Table::new(1, aliases as u32));
    assert_eq!(object.signals, Table::new(1, signals as u32));
    assert_eq!(object.bindings, Table::new(1, bindings as u32));
    assert_eq!(object.named_objects, Table::new(1, named as u32));
    assert_eq!(object.signal_offsets, [payload as u32]);
    assert_eq!(object.size, payload + SIGNAL_SIZE + 2 * PARAMETER_SIZE);
}

#[test]
fn signals_without_parameters_keep_their_own_record() {
    let doc = QmlCompiler::expect_valid("Item { signal a; signal b(int x, int y) }");
    let layout = UnitLayout::compute(&doc);
    let object = &layout.objects[0];

    assert_eq!(object.signal_offsets, [96, 112]);
    assert_eq!(object.size, 168);
}

#[test]
fn sections_are_contiguous() {
    let input = indoc! {r#"
    import QtQuick 2.0
    import "util.js" as Util
    Item {
        anchors.fill: parent
        Rectangle { signal s(string a) }
        Text { text: "hi"; onClicked: go() }
    }
    "#};

    let doc = QmlCompiler::expect_valid(input);
    let layout = UnitLayout::compute(&doc);

    assert_eq!(layout.offset_to_objects, HEADER_SIZE + 2 * IMPORT_SIZE);
    let mut expected = layout.objects_start();
    for object in &layout.objects {
        assert_eq!(object.offset, expected);
        expected = object.end();
    }
    assert_eq!(layout.offset_to_string_table, expected);

    let bodies: usize = layout.objects.iter().map(|o| o.size).sum();
    assert_eq!(
        layout.unit_size,
        HEADER_SIZE
            + doc.imports.len() * IMPORT_SIZE
            + doc.objects.len() * INDEX_SIZE
            + bodies
            + doc.strings.serialized_size()
    );
}

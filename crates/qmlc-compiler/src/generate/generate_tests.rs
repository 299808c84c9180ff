use indoc::indoc;
use qmlc_unit::{
    ALIAS_SIZE, BINDING_SIZE, BindingType, HEADER_SIZE, IMPORT_SIZE, INDEX_SIZE, OBJECT_SIZE,
    PROPERTY_SIZE, SignalRecord, Unit, binding_flags,
};

use super::{FunctionIndexMap, SequentialFunctionIndices, UnitGenerator};
use crate::compiler::QmlCompiler;
use crate::ir::{BindingValue, Document, Object, ObjectId};

fn load(bytes: Vec<u8>) -> Unit {
    Unit::from_bytes(bytes).expect("generated unit must load")
}

#[test]
fn generation_is_deterministic() {
    let input = indoc! {r#"
    import QtQuick 2.0
    Item {
        id: root
        property int x: 5
        anchors.fill: parent
        Text { text: qsTr("hi") }
    }
    "#};

    let doc = QmlCompiler::expect_valid(input);
    let first = UnitGenerator::new(&doc).generate();
    let second = UnitGenerator::new(&doc).generate();
    assert_eq!(first, second);

    let recompiled = QmlCompiler::expect_valid_unit(input).unit;
    assert_eq!(first, recompiled);
}

#[test]
fn unit_size_matches_layout() {
    let doc = QmlCompiler::expect_valid("Item { Rectangle { signal s(int a) } }");
    let generator = UnitGenerator::new(&doc);
    let layout = generator.layout();
    let bytes = generator.generate();
    assert_eq!(bytes.len(), layout.unit_size);

    let unit = load(bytes);
    assert_eq!(unit.header().unit_size as usize, layout.unit_size);
    assert_eq!(
        unit.header().offset_to_string_table as usize,
        layout.offset_to_string_table
    );
    assert_eq!(unit.object_offset(1), layout.objects[1].offset);
}

#[test]
fn minimal_document_round_trip() {
    let output =
        QmlCompiler::expect_valid_unit("Item { id: root; property int x: 5; width: x * 2 }");
    let unit = load(output.unit);
    let strings = unit.strings();
    let root = unit.root_object();

    assert_eq!(strings.get(root.record().id_name), "root");
    assert_eq!(strings.get(root.record().inherited_type_name), "Item");

    let properties: Vec<_> = root.properties().collect();
    assert_eq!(properties.len(), 1);
    assert_eq!(strings.get(properties[0].name), "x");

    let bindings: Vec<_> = root.bindings().collect();
    let x = bindings
        .iter()
        .find(|b| strings.get(b.property_name) == "x")
        .unwrap();
    assert_eq!(x.ty, BindingType::Number);
    assert_eq!(x.as_number(), 5.0);

    let width = bindings
        .iter()
        .find(|b| strings.get(b.property_name) == "width")
        .unwrap();
    assert_eq!(width.ty, BindingType::Script);
    assert_eq!(width.as_index(), 0);

    for name in ["Item", "root", "x", "width"] {
        let count = strings.iter().filter(|&(_, s)| s == name).count();
        assert_eq!(count, 1, "{name}");
    }
}

#[test]
fn minimal_document_dump() {
    let dump =
        QmlCompiler::expect_valid_dump("Item { id: root; property int x: 5; width: x * 2 }");
    assert_eq!(
        dump,
        indoc! {r#"
            [header]
            singleton = false
            root = O0

            [objects]
            O0 Item id=root#0
              property int x
              width: F0
              x: 5
              named O0

            [strings]
            S0 ""
            S1 "Item"
            S2 "root"
            S3 "x"
            S4 "width"
            S5 "expression for width"
        "#}
    );
}

#[test]
fn imports_signals_and_functions_dump() {
    let input = indoc! {r#"
    import QtQuick 2.0
    pragma Singleton
    Item {
        signal moved(int x, Item target)
        function go() {}
        onMoved: go()
    }
    "#};

    assert_eq!(
        QmlCompiler::expect_valid_dump(input),
        indoc! {r#"
            [header]
            singleton = true
            root = O0

            [imports]
            I0 library "QtQuick" 2.0

            [objects]
            O0 Item
              function F0
              signal moved(int x, Item target)
              onMoved: F1 [handler]

            [strings]
            S0 ""
            S1 "QtQuick"
            S2 "Item"
            S3 "x"
            S4 "target"
            S5 "moved"
            S6 "go"
            S7 "onMoved"
            S8 "expression for onMoved"
        "#}
    );
}

#[test]
fn bindings_are_written_in_class_runs() {
    let input = indoc! {r#"
    Item {
        property alias label: inner.text
        Keys.onPressed: foo()
        anchors.fill: parent
        onClicked: bar()
        label: "x"
        width: 5
        Text { id: inner }
    }
    "#};

    let unit = load(QmlCompiler::expect_valid_unit(input).unit);
    let strings = unit.strings();
    let names: Vec<_> = unit
        .root_object()
        .bindings()
        .map(|b| strings.get(b.property_name))
        .collect();
    assert_eq!(names, ["width", "", "onClicked", "Keys", "anchors", "label"]);

    let label = unit.root_object().bindings().last().unwrap();
    assert!(label.has_flag(binding_flags::IS_BINDING_TO_ALIAS));
}

#[test]
fn object_and_container_bindings_hold_object_indices() {
    let input = indoc! {r#"
    Item {
        anchors.fill: parent
        Rectangle {}
    }
    "#};

    let unit = load(QmlCompiler::expect_valid_unit(input).unit);
    let bindings: Vec<_> = unit.root_object().bindings().collect();
    assert_eq!(bindings[0].ty, BindingType::Object);
    assert_eq!(bindings[0].as_index(), 2);
    assert_eq!(bindings[1].ty, BindingType::GroupProperty);
    assert_eq!(bindings[1].as_index(), 1);
    assert!(unit.object(1).record().inherited_type_name.is_empty());
}

#[test]
fn translations_pack_comment_and_number() {
    let unit = load(
        QmlCompiler::expect_valid_unit(r#"Item { a: qsTr("text", "note", 3); b: qsTrId("key") }"#)
            .unit,
    );
    let strings = unit.strings();
    let bindings: Vec<_> = unit.root_object().bindings().collect();

    let b = &bindings[0];
    assert_eq!(b.ty, BindingType::TranslationById);
    assert_eq!(strings.get(b.string_index), "key");
    assert_eq!(b.as_translation().1, -1);

    let a = &bindings[1];
    assert_eq!(a.ty, BindingType::Translation);
    assert_eq!(strings.get(a.string_index), "text");
    let (comment, number) = a.as_translation();
    assert_eq!(strings.get(comment), "note");
    assert_eq!(number, 3);
}

#[test]
fn script_string_index_is_empty() {
    let unit = load(QmlCompiler::expect_valid_unit("Item { width: parent.width / 2 }").unit);
    let binding = unit.root_object().bindings().next().unwrap();
    assert_eq!(binding.ty, BindingType::Script);
    assert!(binding.string_index.is_empty());
}

#[test]
fn empty_objects_still_get_a_header() {
    let doc = QmlCompiler::expect_valid("Item { Item {} Item {} }");
    let layout = UnitGenerator::new(&doc).layout();
    assert_eq!(layout.objects[1].size, OBJECT_SIZE);
    assert_eq!(layout.objects[2].size, OBJECT_SIZE);

    let unit = load(UnitGenerator::new(&doc).generate());
    assert_eq!(unit.object_count(), 3);
    assert_eq!(unit.object(2).bindings().count(), 0);
}

#[test]
fn zero_parameter_signal() {
    let unit = load(QmlCompiler::expect_valid_unit("Item { signal done }").unit);
    let signals: Vec<_> = unit.root_object().signals().collect();
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].record().parameter_count, 0);
    assert_eq!(signals[0].parameters().count(), 0);
}

#[test]
fn singleton_flag() {
    let singleton = load(QmlCompiler::expect_valid_unit("pragma Singleton\nItem {}").unit);
    assert!(singleton.is_singleton());
    assert!(singleton.header().is_qml());

    let plain = load(QmlCompiler::expect_valid_unit("Item {}").unit);
    assert!(!plain.is_singleton());
    assert!(plain.header().is_qml());
}

#[test]
fn dependency_checksum_is_stored() {
    let doc = QmlCompiler::expect_valid("Item {}");
    let unit = load(
        UnitGenerator::new(&doc)
            .with_dependency_checksum(Some([7; 16]))
            .generate(),
    );
    assert_eq!(unit.header().dependency_checksum, [7; 16]);

    let unit = load(UnitGenerator::new(&doc).generate());
    assert_eq!(unit.header().dependency_checksum, [0; 16]);
}

#[test]
fn checksum_covers_structure() {
    let doc = QmlCompiler::expect_valid("Item { width: 5 }");
    let mut bytes = UnitGenerator::new(&doc).generate();
    bytes[HEADER_SIZE + 4] ^= 0x01;
    assert!(Unit::from_bytes(bytes).is_err());
}

#[test]
fn sequential_indices_span_objects() {
    let input = indoc! {r#"
    Item {
        width: a + b
        function f() {}
        Item { height: c * 2 }
    }
    "#};

    let doc = QmlCompiler::expect_valid(input);
    let indices = SequentialFunctionIndices::new(&doc);
    assert_eq!(indices.len(), 3);
    assert_eq!(indices.runtime_index(ObjectId::new(0), 1), 1);
    assert_eq!(indices.runtime_index(ObjectId::new(1), 0), 2);

    let unit = load(UnitGenerator::new(&doc).generate());
    let child = unit.object(1).bindings().next().unwrap();
    assert_eq!(child.as_index(), 2);
    assert_eq!(unit.root_object().functions().collect::<Vec<_>>(), [1]);
}

struct Offset(u32);

impl FunctionIndexMap for Offset {
    fn runtime_index(&self, _object: ObjectId, local: u32) -> u32 {
        local + self.0
    }
}

#[test]
fn custom_function_index_map() {
    let doc = QmlCompiler::expect_valid("Item { width: a + b; function f() {} }");
    let unit = load(UnitGenerator::new(&doc).generate_with(&Offset(100)));
    let root = unit.root_object();
    assert_eq!(root.functions().collect::<Vec<_>>(), [101]);
    assert_eq!(root.bindings().next().unwrap().as_index(), 100);
}

#[test]
#[should_panic(expected = "binds invalid object")]
fn dangling_object_reference_is_a_bug() {
    let mut doc = QmlCompiler::expect_valid("Item { Item {} }");
    doc.objects[0].bindings[0].value = BindingValue::Object(ObjectId::new(7));
    UnitGenerator::new(&doc).generate();
}

#[test]
fn object_bound_through_a_group_precedes_its_container() {
    let output = QmlCompiler::expect_valid_unit("Item { anchors.fill: Rectangle {} }");
    let doc = &output.document;
    assert_eq!(doc.objects.len(), 3);

    let unit = load(output.unit);
    let strings = unit.strings();
    let group = unit.root_object().bindings().next().unwrap();
    assert_eq!(group.ty, BindingType::GroupProperty);
    assert_eq!(strings.get(group.property_name), "anchors");
    assert_eq!(group.as_index(), 2);

    let fill = unit.object(2).bindings().next().unwrap();
    assert_eq!(fill.ty, BindingType::Object);
    assert_eq!(strings.get(fill.property_name), "fill");
    assert_eq!(fill.as_index(), 1);
    assert_eq!(strings.get(unit.object(1).record().inherited_type_name), "Rectangle");
}

#[test]
fn group_definition_under_a_dotted_name() {
    let output = QmlCompiler::expect_valid_unit("Item { anchors.foo { x: 1 } }");
    let unit = load(output.unit);
    assert_eq!(unit.object_count(), 3);

    let anchors = unit.root_object().bindings().next().unwrap();
    assert_eq!(anchors.ty, BindingType::GroupProperty);
    assert_eq!(anchors.as_index(), 2);

    let foo = unit.object(2).bindings().next().unwrap();
    assert_eq!(foo.ty, BindingType::GroupProperty);
    assert_eq!(foo.as_index(), 1);
    let x = unit.object(1).bindings().next().unwrap();
    assert_eq!(x.as_number(), 1.0);
}

const IMPORTS: [&str; 3] = [
    "",
    "import QtQuick 2.0\n",
    "import QtQuick 2.0 as Q\nimport \"util.js\" as Util\n",
];

const MEMBERS: [&str; 15] = [
    "id: root",
    "property int count: 3",
    "property alias total: root.count",
    "signal moved(int dx, real dy, Item by)",
    "signal done",
    "function go(a) { return a }",
    "anchors.fill: Rectangle { width: 2 }",
    "Keys.onPressed: go(event)",
    "states: [ State { name: \"a\" }, State {} ]",
    "font { bold: true; family: \"x\" }",
    "Text { id: label; text: qsTr(\"hi\") }",
    "Component { Item { id: inner; anchors.left.margin: 1 } }",
    "NumberAnimation on x { to: 5 }",
    "width: parent.width / 2",
    "Item { signal picked(string s); Keys.onReleased: done(); height: 4 }",
];

/// Deterministic xorshift stream of member subsets.
fn member_masks(count: usize) -> impl Iterator<Item = u32> {
    let mut state = 0x9e37_79b9u32;
    (0..count).map(move |_| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state & ((1 << MEMBERS.len()) - 1)
    })
}

fn document_source(mask: u32, imports: &str) -> String {
    let members: Vec<_> = MEMBERS
        .iter()
        .enumerate()
        .filter(|&(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, member)| format!("    {member}\n"))
        .collect();
    format!("{imports}Item {{\n{}}}\n", members.concat())
}

fn object_size(object: &Object) -> usize {
    OBJECT_SIZE
        + INDEX_SIZE * object.functions.len()
        + PROPERTY_SIZE * object.properties.len()
        + ALIAS_SIZE * object.aliases.len()
        + INDEX_SIZE * object.signals.len()
        + BINDING_SIZE * object.bindings.len()
        + INDEX_SIZE * object.named_objects_in_component.len()
        + object
            .signals
            .iter()
            .map(|s| SignalRecord::size_with(s.parameters.len()))
            .sum::<usize>()
}

fn expected_unit_size(doc: &Document) -> usize {
    HEADER_SIZE
        + IMPORT_SIZE * doc.imports.len()
        + INDEX_SIZE * doc.objects.len()
        + doc.objects.iter().map(object_size).sum::<usize>()
        + doc.strings.serialized_size()
}

#[test]
fn unit_size_has_no_slack_across_document_shapes() {
    let masks = [0, (1 << MEMBERS.len()) - 1]
        .into_iter()
        .chain((0..MEMBERS.len()).map(|bit| 1 << bit))
        .chain(member_masks(200));

    for (case, mask) in masks.enumerate() {
        let source = document_source(mask, IMPORTS[case % IMPORTS.len()]);
        let doc = QmlCompiler::expect_valid(&source);
        let generator = UnitGenerator::new(&doc);
        let layout = generator.layout();

        let expected = expected_unit_size(&doc);
        assert_eq!(layout.unit_size, expected, "{source}");
        for (object, object_layout) in doc.objects.iter().zip(&layout.objects) {
            assert_eq!(object_layout.size, object_size(object), "{source}");
        }

        let bytes = generator.generate();
        assert_eq!(bytes.len(), expected, "{source}");
        assert_eq!(bytes, generator.generate(), "{source}");

        let unit = Unit::from_bytes(bytes)
            .unwrap_or_else(|err| panic!("{err} while loading unit for:\n{source}"));
        assert_eq!(unit.object_count(), doc.objects.len());
        assert_eq!(unit.import_count(), doc.imports.len());
        for (index, object_layout) in layout.objects.iter().enumerate() {
            assert_eq!(unit.object_offset(index), object_layout.offset, "{source}");
            assert_eq!(
                unit.object(index).bindings().count(),
                doc.objects[index].bindings.len(),
                "{source}"
            );
        }
    }
}

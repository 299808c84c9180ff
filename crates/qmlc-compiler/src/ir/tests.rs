use qmlc_core::{Location, StringId, StringTable};
use qmlc_unit::{BindingClass, BindingType, binding_flags};

use super::*;

fn binding(name: StringId, value: BindingValue, offset: u32) -> Binding {
    Binding {
        property_name: name,
        value,
        flags: 0,
        offset,
        location: Location::new(1, offset + 1),
        value_location: Location::new(1, offset + 1),
    }
}

fn offsets(object: &Object) -> Vec<u32> {
    object.bindings.iter().map(|b| b.offset).collect()
}

#[test]
fn default_bindings_sorted_by_offset() {
    let mut object = Object::new(StringId::EMPTY, Location::default());
    for (i, offset) in [30, 10, 20, 10].into_iter().enumerate() {
        let value = BindingValue::Object(ObjectId::new(i));
        object
            .append_binding(binding(StringId::EMPTY, value, offset), false)
            .unwrap();
    }

    assert_eq!(offsets(&object), [10, 10, 20, 30]);
    // Equal offsets keep arrival order.
    assert_eq!(object.bindings[0].value, BindingValue::Object(ObjectId::new(1)));
    assert_eq!(object.bindings[1].value, BindingValue::Object(ObjectId::new(3)));
}

#[test]
fn named_bindings_prepended() {
    let mut strings = StringTable::new();
    let mut object = Object::new(StringId::EMPTY, Location::default());
    for (name, offset) in [("a", 1), ("b", 2), ("c", 3)] {
        let name = strings.intern(name);
        object
            .append_binding(binding(name, BindingValue::Number(1.0), offset), false)
            .unwrap();
    }

    assert_eq!(offsets(&object), [3, 2, 1]);
}

#[test]
fn second_value_binding_rejected() {
    let mut strings = StringTable::new();
    let width = strings.intern("width");
    let mut object = Object::new(StringId::EMPTY, Location::default());

    object
        .append_binding(binding(width, BindingValue::Number(1.0), 0), false)
        .unwrap();
    let err = object
        .append_binding(binding(width, BindingValue::Script(0), 10), false)
        .unwrap_err();

    assert_eq!(err, DiagnosticKind::PropertyValueSetMultipleTimes);
    assert_eq!(object.bindings.len(), 1);
}

#[test]
fn list_and_on_bindings_skip_duplicate_check() {
    let mut strings = StringTable::new();
    let states = strings.intern("states");
    let x = strings.intern("x");
    let mut object = Object::new(StringId::EMPTY, Location::default());

    for offset in [0, 5] {
        let mut b = binding(states, BindingValue::Object(ObjectId::new(1)), offset);
        b.flags |= binding_flags::IS_LIST_ITEM;
        object.append_binding(b, true).unwrap();
    }

    object
        .append_binding(binding(x, BindingValue::Number(0.0), 10), false)
        .unwrap();
    let mut animation = binding(x, BindingValue::Object(ObjectId::new(2)), 20);
    animation.flags |= binding_flags::IS_ON_ASSIGNMENT;
    object.append_binding(animation, false).unwrap();

    assert_eq!(offsets(&object), [20, 10, 5, 0]);
}

#[test]
fn group_binding_coexists_with_value_binding() {
    let mut strings = StringTable::new();
    let font = strings.intern("font");
    let mut object = Object::new(StringId::EMPTY, Location::default());

    object
        .append_binding(binding(font, BindingValue::Script(0), 0), false)
        .unwrap();
    object
        .append_binding(
            binding(font, BindingValue::GroupProperty(ObjectId::new(1)), 10),
            false,
        )
        .unwrap();

    assert_eq!(object.bindings.len(), 2);
}

#[test]
fn binding_classes() {
    let name = StringId::from_raw(1);
    let group = binding(name, BindingValue::GroupProperty(ObjectId::new(1)), 0);
    let attached = binding(name, BindingValue::AttachedProperty(ObjectId::new(1)), 0);
    let mut handler = binding(name, BindingValue::Script(0), 0);
    handler.flags |= binding_flags::IS_SIGNAL_HANDLER_EXPRESSION;
    let mut to_alias = binding(name, BindingValue::Number(1.0), 0);
    to_alias.flags |= binding_flags::IS_BINDING_TO_ALIAS;
    let value = binding(name, BindingValue::String(name), 0);

    assert_eq!(group.class(), BindingClass::GroupProperty);
    assert_eq!(attached.class(), BindingClass::AttachedProperty);
    assert_eq!(handler.class(), BindingClass::SignalHandler);
    assert_eq!(to_alias.class(), BindingClass::ValueToAlias);
    assert_eq!(value.class(), BindingClass::Value);

    assert!(!handler.is_value_binding());
    assert!(!group.is_value_binding());
    assert!(to_alias.is_value_binding());
    assert_eq!(attached.binding_type(), BindingType::AttachedProperty);
}

#[test]
fn declarations_target_follows_override() {
    let mut doc = Document::new("test.qml");
    let item = doc.intern("Item");
    let root = doc.push_object(Object::new(item, Location::new(1, 1)));
    let mut group = Object::new(StringId::EMPTY, Location::new(2, 5));
    group.declarations_override = Some(root);
    let group = doc.push_object(group);

    assert_eq!(doc.declarations_target(group), root);
    assert_eq!(doc.declarations_target(root), root);
    assert!(doc.object(group).is_group());
    assert_eq!(doc.root().inherited_type_name, item);
}

#[test]
fn binding_values_serialize_externally_tagged() {
    let values = [
        BindingValue::Invalid,
        BindingValue::Script(3),
        BindingValue::Object(ObjectId::new(2)),
        BindingValue::Translation {
            text: StringId::from_raw(1),
            comment: StringId::EMPTY,
            number: -1,
        },
    ];
    let json = serde_json::to_string(&values).unwrap();
    assert_eq!(
        json,
        r#"["Invalid",{"Script":3},{"Object":2},{"Translation":{"text":1,"comment":0,"number":-1}}]"#
    );
}

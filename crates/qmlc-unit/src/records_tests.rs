use qmlc_core::{Location, StringId};

use crate::codec::ByteWriter;
use crate::records::*;
use crate::{BINDING_SIZE, IMPORT_SIZE, OBJECT_SIZE, PARAMETER_SIZE, SIGNAL_SIZE};

fn sid(i: u32) -> StringId {
    StringId::from_raw(i)
}

#[test]
fn import_record_layout() {
    let import = ImportRecord {
        kind: ImportKind::Library,
        uri: sid(3),
        qualifier: sid(0),
        major: 2,
        minor: 15,
        location: Location::new(1, 1),
    };
    let mut buf = [0u8; IMPORT_SIZE];
    let mut w = ByteWriter::new(&mut buf);
    import.encode(&mut w);
    assert_eq!(w.position(), IMPORT_SIZE);

    assert_eq!(&buf[0..4], &1u32.to_le_bytes());
    assert_eq!(&buf[4..8], &3u32.to_le_bytes());
    assert_eq!(&buf[12..16], &2i32.to_le_bytes());
    assert_eq!(&buf[16..20], &15i32.to_le_bytes());
    assert_eq!(ImportRecord::decode(&buf), Some(import));
}

#[test]
fn import_record_rejects_unknown_kind() {
    let mut buf = [0u8; IMPORT_SIZE];
    buf[0] = 9;
    assert_eq!(ImportRecord::decode(&buf), None);
}

#[test]
fn object_record_is_88_bytes() {
    let object = ObjectRecord {
        inherited_type_name: sid(1),
        id_name: sid(2),
        id: 0,
        flags: object_flags::IS_COMPONENT,
        index_of_default_property_or_alias: -1,
        default_property_is_alias: false,
        functions: Table::new(1, 88),
        properties: Table::new(2, 92),
        aliases: Table::new(0, 140),
        signals: Table::new(0, 140),
        bindings: Table::new(3, 140),
        named_objects: Table::new(1, 260),
        location: Location::new(4, 5),
        location_of_id_property: Location::new(5, 9),
    };
    let mut buf = [0u8; OBJECT_SIZE];
    let mut w = ByteWriter::new(&mut buf);
    object.encode(&mut w);

    assert_eq!(&buf[16..20], &(-1i32).to_le_bytes());
    assert_eq!(ObjectRecord::decode(&buf), object);
}

#[test]
fn signal_size_accounts_for_parameters() {
    assert_eq!(SignalRecord::size_with(0), SIGNAL_SIZE);
    assert_eq!(SignalRecord::size_with(3), SIGNAL_SIZE + 3 * PARAMETER_SIZE);
}

#[test]
fn binding_number_value_is_f64_bits() {
    let binding = BindingRecord {
        property_name: sid(4),
        ty: BindingType::Number,
        flags: 0,
        string_index: StringId::EMPTY,
        value: (-2.5f64).to_bits(),
        location: Location::new(2, 3),
        value_location: Location::new(2, 6),
    };
    let mut buf = [0u8; BINDING_SIZE];
    binding.encode(&mut ByteWriter::new(&mut buf));

    let decoded = BindingRecord::decode(&buf).unwrap();
    assert_eq!(decoded.as_number(), -2.5);
    assert_eq!(decoded.value_location, Location::new(2, 6));
}

#[test]
fn translation_packing() {
    let packed = BindingRecord::pack_translation(sid(7), -1);
    assert_eq!(packed & 0xFFFF_FFFF, 7);
    assert_eq!(packed >> 32, 0xFFFF_FFFF);

    let binding = BindingRecord {
        property_name: sid(1),
        ty: BindingType::Translation,
        flags: 0,
        string_index: sid(2),
        value: BindingRecord::pack_translation(sid(7), 3),
        location: Location::default(),
        value_location: Location::default(),
    };
    assert_eq!(binding.as_translation(), (sid(7), 3));
}

#[test]
fn binding_classes_are_exclusive() {
    use binding_flags::*;

    let cases = [
        (BindingType::Number, 0, BindingClass::Value),
        (BindingType::Object, IS_LIST_ITEM, BindingClass::Value),
        (
            BindingType::Script,
            IS_SIGNAL_HANDLER_EXPRESSION,
            BindingClass::SignalHandler,
        ),
        (
            BindingType::Object,
            IS_SIGNAL_HANDLER_OBJECT,
            BindingClass::SignalHandler,
        ),
        (BindingType::AttachedProperty, 0, BindingClass::AttachedProperty),
        (BindingType::GroupProperty, 0, BindingClass::GroupProperty),
        (
            BindingType::String,
            IS_BINDING_TO_ALIAS,
            BindingClass::ValueToAlias,
        ),
    ];
    for (ty, flags, expected) in cases {
        assert_eq!(BindingClass::classify(ty, flags), expected, "{ty:?} {flags:#x}");
    }

    assert_eq!(BindingClass::EMIT_ORDER[0], BindingClass::Value);
    assert_eq!(BindingClass::EMIT_ORDER[4], BindingClass::ValueToAlias);
}

#[test]
fn property_type_codes() {
    assert_eq!(PropertyType::Var as u32, 0);
    assert_eq!(PropertyType::Custom as u32, 18);
    assert_eq!(PropertyType::CustomList as u32, 19);
    assert_eq!(PropertyType::from_u32(4), Some(PropertyType::Real));
    assert_eq!(PropertyType::from_u32(20), None);
    assert!(PropertyType::CustomList.is_custom());
    assert!(!PropertyType::Int.is_custom());
}

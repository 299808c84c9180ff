//! Fixed-size records stored in a compiled unit.
//!
//! Every record is encoded field by field in little-endian order through a
//! [`ByteWriter`]; `decode` reads from a slice that starts at the record.
//! Callers (the [`Unit`](crate::Unit) loader) bounds-check before decoding.

use qmlc_core::{Location, StringId};

use super::codec::{
    ByteWriter, read_i32_le, read_location, read_string_id, read_u32_le, read_u64_le,
};
use super::{
    ALIAS_SIZE, BINDING_SIZE, IMPORT_SIZE, OBJECT_SIZE, PARAMETER_SIZE, PROPERTY_SIZE, SIGNAL_SIZE,
};

/// Object flags.
pub mod object_flags {
    /// The object is the root of an inline `Component { ... }`.
    pub const IS_COMPONENT: u32 = 0x1;
}

/// Property flags.
pub mod property_flags {
    pub const IS_READ_ONLY: u32 = 0x1;
}

/// Alias flags.
pub mod alias_flags {
    pub const IS_READ_ONLY: u32 = 0x1;
}

/// Binding flags.
pub mod binding_flags {
    pub const IS_SIGNAL_HANDLER_EXPRESSION: u32 = 0x1;
    pub const IS_SIGNAL_HANDLER_OBJECT: u32 = 0x2;
    pub const IS_ON_ASSIGNMENT: u32 = 0x4;
    pub const INITIALIZER_FOR_READ_ONLY_DECLARATION: u32 = 0x8;
    pub const IS_LIST_ITEM: u32 = 0x20;
    pub const IS_BINDING_TO_ALIAS: u32 = 0x40;

    /// Either signal-handler bit.
    pub const SIGNAL_HANDLER: u32 = IS_SIGNAL_HANDLER_EXPRESSION | IS_SIGNAL_HANDLER_OBJECT;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize)]
#[repr(u32)]
pub enum ImportKind {
    Library = 1,
    File = 2,
    Script = 3,
}

impl ImportKind {
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            1 => Some(Self::Library),
            2 => Some(Self::File),
            3 => Some(Self::Script),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::File => "file",
            Self::Script => "script",
        }
    }
}

/// Declared type of a property or signal parameter.
#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize)]
#[repr(u32)]
pub enum PropertyType {
    Var = 0,
    Variant,
    Int,
    Bool,
    Real,
    String,
    Url,
    Color,
    Font,
    DateTime,
    Rect,
    Point,
    Size,
    Vector2D,
    Vector3D,
    Vector4D,
    Matrix4x4,
    Quaternion,
    /// A user type, named by `custom_type_name`.
    Custom,
    /// `list<T>` of a user type.
    CustomList,
}

impl PropertyType {
    const ALL: [Self; 20] = [
        Self::Var,
        Self::Variant,
        Self::Int,
        Self::Bool,
        Self::Real,
        Self::String,
        Self::Url,
        Self::Color,
        Self::Font,
        Self::DateTime,
        Self::Rect,
        Self::Point,
        Self::Size,
        Self::Vector2D,
        Self::Vector3D,
        Self::Vector4D,
        Self::Matrix4x4,
        Self::Quaternion,
        Self::Custom,
        Self::CustomList,
    ];

    pub fn from_u32(v: u32) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }

    pub fn is_custom(self) -> bool {
        matches!(self, Self::Custom | Self::CustomList)
    }

    /// Spelling used in dumps.
    pub fn name(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Variant => "variant",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Real => "real",
            Self::String => "string",
            Self::Url => "url",
            Self::Color => "color",
            Self::Font => "font",
            Self::DateTime => "date",
            Self::Rect => "rect",
            Self::Point => "point",
            Self::Size => "size",
            Self::Vector2D => "vector2d",
            Self::Vector3D => "vector3d",
            Self::Vector4D => "vector4d",
            Self::Matrix4x4 => "matrix4x4",
            Self::Quaternion => "quaternion",
            Self::Custom => "custom",
            Self::CustomList => "list",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize)]
#[repr(u32)]
pub enum BindingType {
    Invalid = 0,
    Boolean,
    Number,
    String,
    Translation,
    TranslationById,
    Script,
    Object,
    AttachedProperty,
    GroupProperty,
}

impl BindingType {
    pub fn from_u32(v: u32) -> Option<Self> {
        Some(match v {
            0 => Self::Invalid,
            1 => Self::Boolean,
            2 => Self::Number,
            3 => Self::String,
            4 => Self::Translation,
            5 => Self::TranslationById,
            6 => Self::Script,
            7 => Self::Object,
            8 => Self::AttachedProperty,
            9 => Self::GroupProperty,
            _ => return None,
        })
    }

    /// Whether `value` holds an object index.
    pub fn refers_to_object(self) -> bool {
        matches!(
            self,
            Self::Object | Self::AttachedProperty | Self::GroupProperty
        )
    }
}

/// Serialization class of a binding. Exactly one holds for every binding;
/// bindings are written in contiguous runs following [`EMIT_ORDER`](Self::EMIT_ORDER).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BindingClass {
    Value,
    SignalHandler,
    AttachedProperty,
    GroupProperty,
    ValueToAlias,
}

impl BindingClass {
    pub const EMIT_ORDER: [Self; 5] = [
        Self::Value,
        Self::SignalHandler,
        Self::AttachedProperty,
        Self::GroupProperty,
        Self::ValueToAlias,
    ];

    pub fn classify(ty: BindingType, flags: u32) -> Self {
        if flags & binding_flags::SIGNAL_HANDLER != 0 {
            return Self::SignalHandler;
        }
        match ty {
            BindingType::AttachedProperty => Self::AttachedProperty,
            BindingType::GroupProperty => Self::GroupProperty,
            _ if flags & binding_flags::IS_BINDING_TO_ALIAS != 0 => Self::ValueToAlias,
            _ => Self::Value,
        }
    }

    pub fn is_value(self) -> bool {
        matches!(self, Self::Value | Self::ValueToAlias)
    }
}

/// Import record (28 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ImportRecord {
    pub kind: ImportKind,
    pub uri: StringId,
    pub qualifier: StringId,
    pub major: i32,
    pub minor: i32,
    pub location: Location,
}

impl ImportRecord {
    pub fn encode(&self, w: &mut ByteWriter<'_>) {
        w.put_u32(self.kind as u32);
        w.put_string_id(self.uri);
        w.put_string_id(self.qualifier);
        w.put_i32(self.major);
        w.put_i32(self.minor);
        w.put_location(self.location);
    }

    /// Returns None on an unknown kind.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        debug_assert!(bytes.len() >= IMPORT_SIZE);
        Some(Self {
            kind: ImportKind::from_u32(read_u32_le(bytes, 0))?,
            uri: read_string_id(bytes, 4),
            qualifier: read_string_id(bytes, 8),
            major: read_i32_le(bytes, 12),
            minor: read_i32_le(bytes, 16),
            location: read_location(bytes, 20),
        })
    }
}

/// A `(count, offset)` pair. Offsets are relative to the owning object.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Table {
    pub count: u32,
    pub offset: u32,
}

impl Table {
    pub fn new(count: u32, offset: u32) -> Self {
        Self { count, offset }
    }
}

/// Fixed object header (88 bytes). The sub-tables follow it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ObjectRecord {
    pub inherited_type_name: StringId,
    pub id_name: StringId,
    /// Per-component object id, or -1.
    pub id: i32,
    pub flags: u32,
    /// Index into properties or aliases (see `default_property_is_alias`), or -1.
    pub index_of_default_property_or_alias: i32,
    pub default_property_is_alias: bool,
    /// `u32` runtime function indices.
    pub functions: Table,
    pub properties: Table,
    pub aliases: Table,
    /// `u32` object-relative offsets, one per signal.
    pub signals: Table,
    pub bindings: Table,
    /// `u32` object indices.
    pub named_objects: Table,
    pub location: Location,
    pub location_of_id_property: Location,
}

impl ObjectRecord {
    pub fn encode(&self, w: &mut ByteWriter<'_>) {
        let start = w.position();
        w.put_string_id(self.inherited_type_name);
        w.put_string_id(self.id_name);
        w.put_i32(self.id);
        w.put_u32(self.flags);
        w.put_i32(self.index_of_default_property_or_alias);
        w.put_u32(self.default_property_is_alias as u32);
        for table in self.tables() {
            w.put_u32(table.count);
            w.put_u32(table.offset);
        }
        w.put_location(self.location);
        w.put_location(self.location_of_id_property);
        w.expect_position(start + OBJECT_SIZE, "object header");
    }

    pub fn decode(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() >= OBJECT_SIZE);
        let table = |at: usize| Table::new(read_u32_le(bytes, at), read_u32_le(bytes, at + 4));
        Self {
            inherited_type_name: read_string_id(bytes, 0),
            id_name: read_string_id(bytes, 4),
            id: read_i32_le(bytes, 8),
            flags: read_u32_le(bytes, 12),
            index_of_default_property_or_alias: read_i32_le(bytes, 16),
            default_property_is_alias: read_u32_le(bytes, 20) != 0,
            functions: table(24),
            properties: table(32),
            aliases: table(40),
            signals: table(48),
            bindings: table(56),
            named_objects: table(64),
            location: read_location(bytes, 72),
            location_of_id_property: read_location(bytes, 80),
        }
    }

    fn tables(&self) -> [Table; 6] {
        [
            self.functions,
            self.properties,
            self.aliases,
            self.signals,
            self.bindings,
            self.named_objects,
        ]
    }
}

/// Property record (24 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PropertyRecord {
    pub ty: PropertyType,
    pub name: StringId,
    pub custom_type_name: StringId,
    pub flags: u32,
    pub location: Location,
}

impl PropertyRecord {
    pub fn encode(&self, w: &mut ByteWriter<'_>) {
        w.put_u32(self.ty as u32);
        w.put_string_id(self.name);
        w.put_string_id(self.custom_type_name);
        w.put_u32(self.flags);
        w.put_location(self.location);
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        debug_assert!(bytes.len() >= PROPERTY_SIZE);
        Some(Self {
            ty: PropertyType::from_u32(read_u32_le(bytes, 0))?,
            name: read_string_id(bytes, 4),
            custom_type_name: read_string_id(bytes, 8),
            flags: read_u32_le(bytes, 12),
            location: read_location(bytes, 16),
        })
    }

    pub fn is_read_only(&self) -> bool {
        self.flags & property_flags::IS_READ_ONLY != 0
    }
}

/// Alias record (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AliasRecord {
    pub name: StringId,
    pub flags: u32,
    /// The target object's id.
    pub id: StringId,
    /// Dotted property path after the id; empty for `alias a: obj`.
    pub property_name: StringId,
    pub location: Location,
    pub reference_location: Location,
}

impl AliasRecord {
    pub fn encode(&self, w: &mut ByteWriter<'_>) {
        w.put_string_id(self.name);
        w.put_u32(self.flags);
        w.put_string_id(self.id);
        w.put_string_id(self.property_name);
        w.put_location(self.location);
        w.put_location(self.reference_location);
    }

    pub fn decode(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() >= ALIAS_SIZE);
        Self {
            name: read_string_id(bytes, 0),
            flags: read_u32_le(bytes, 4),
            id: read_string_id(bytes, 8),
            property_name: read_string_id(bytes, 12),
            location: read_location(bytes, 16),
            reference_location: read_location(bytes, 24),
        }
    }
}

/// Signal record header (16 bytes), followed by `parameter_count` parameters.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SignalRecord {
    pub name: StringId,
    pub parameter_count: u32,
    pub location: Location,
}

impl SignalRecord {
    /// Bytes occupied by a signal with `parameter_count` parameters.
    pub fn size_with(parameter_count: usize) -> usize {
        SIGNAL_SIZE + parameter_count * PARAMETER_SIZE
    }

    pub fn encode(&self, w: &mut ByteWriter<'_>) {
        w.put_string_id(self.name);
        w.put_u32(self.parameter_count);
        w.put_location(self.location);
    }

    pub fn decode(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() >= SIGNAL_SIZE);
        Self {
            name: read_string_id(bytes, 0),
            parameter_count: read_u32_le(bytes, 4),
            location: read_location(bytes, 8),
        }
    }
}

/// Signal parameter record (20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ParameterRecord {
    pub ty: PropertyType,
    pub name: StringId,
    pub custom_type_name: StringId,
    pub location: Location,
}

impl ParameterRecord {
    pub fn encode(&self, w: &mut ByteWriter<'_>) {
        w.put_u32(self.ty as u32);
        w.put_string_id(self.name);
        w.put_string_id(self.custom_type_name);
        w.put_location(self.location);
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        debug_assert!(bytes.len() >= PARAMETER_SIZE);
        Some(Self {
            ty: PropertyType::from_u32(read_u32_le(bytes, 0))?,
            name: read_string_id(bytes, 4),
            custom_type_name: read_string_id(bytes, 8),
            location: read_location(bytes, 12),
        })
    }
}

/// Binding record (40 bytes).
///
/// `value` depends on `ty`:
/// - `Boolean`: 0 or 1
/// - `Number`: `f64` bits
/// - `Object`, `AttachedProperty`, `GroupProperty`: object index
/// - `Script`: runtime function index
/// - `Translation`, `TranslationById`: comment string id in the low word,
///   plural number (`i32`, -1 when absent) in the high word
///
/// `string_index` holds the string value, the translation text or the
/// translation id, and is empty for every other type.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BindingRecord {
    pub property_name: StringId,
    pub ty: BindingType,
    pub flags: u32,
    pub string_index: StringId,
    pub value: u64,
    pub location: Location,
    pub value_location: Location,
}

impl BindingRecord {
    pub fn encode(&self, w: &mut ByteWriter<'_>) {
        w.put_string_id(self.property_name);
        w.put_u32(self.ty as u32);
        w.put_u32(self.flags);
        w.put_string_id(self.string_index);
        w.put_u64(self.value);
        w.put_location(self.location);
        w.put_location(self.value_location);
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        debug_assert!(bytes.len() >= BINDING_SIZE);
        Some(Self {
            property_name: read_string_id(bytes, 0),
            ty: BindingType::from_u32(read_u32_le(bytes, 4))?,
            flags: read_u32_le(bytes, 8),
            string_index: read_string_id(bytes, 12),
            value: read_u64_le(bytes, 16),
            location: read_location(bytes, 24),
            value_location: read_location(bytes, 32),
        })
    }

    pub fn class(&self) -> BindingClass {
        BindingClass::classify(self.ty, self.flags)
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    pub fn as_bool(&self) -> bool {
        self.value != 0
    }

    pub fn as_number(&self) -> f64 {
        f64::from_bits(self.value)
    }

    /// Object or function index.
    pub fn as_index(&self) -> u32 {
        self.value as u32
    }

    /// `(comment, number)` of a translation binding.
    pub fn as_translation(&self) -> (StringId, i32) {
        (
            StringId::from_raw(self.value as u32),
            (self.value >> 32) as u32 as i32,
        )
    }

    pub fn pack_translation(comment: StringId, number: i32) -> u64 {
        comment.as_u32() as u64 | ((number as u32 as u64) << 32)
    }
}

//! In-memory document model produced by the builder.
//!
//! Objects live in one arena on the [`Document`] and refer to each other by
//! [`ObjectId`]. Everything the unit generator needs is reachable from the
//! document; nothing points back into the AST.

#[cfg(test)]
mod tests;

use qmlc_core::{Location, StringId, StringTable};
use qmlc_unit::{BindingClass, BindingType, ImportKind, PropertyType, binding_flags};
use serde::Serialize;

use crate::diagnostics::DiagnosticKind;

/// Index of an object in [`Document::objects`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
#[serde(transparent)]
pub struct ObjectId(u32);

impl ObjectId {
    pub const ROOT: Self = Self(0);

    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// One compiled QML document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    pub url: String,
    #[serde(skip)]
    pub strings: StringTable,
    pub imports: Vec<Import>,
    pub pragmas: Vec<Pragma>,
    /// Creation order. A group or attached container made for a dotted
    /// binding name comes after the object bound through it.
    pub objects: Vec<Object>,
    pub index_of_root_object: ObjectId,
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::ROOT
    }
}

impl Document {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.index()]
    }

    pub fn object_mut(&mut self, id: ObjectId) -> &mut Object {
        &mut self.objects[id.index()]
    }

    pub fn root(&self) -> &Object {
        self.object(self.index_of_root_object)
    }

    pub fn push_object(&mut self, object: Object) -> ObjectId {
        let id = ObjectId::new(self.objects.len());
        self.objects.push(object);
        id
    }

    /// Object that receives declarations made inside `id`.
    ///
    /// Group containers forward their declarations to the enclosing object.
    pub fn declarations_target(&self, id: ObjectId) -> ObjectId {
        self.object(id).declarations_override.unwrap_or(id)
    }

    pub fn is_singleton(&self) -> bool {
        self.pragmas
            .iter()
            .any(|p| p.kind == PragmaKind::Singleton)
    }

    pub fn intern(&mut self, s: &str) -> StringId {
        self.strings.intern(s)
    }

    pub fn text(&self, id: StringId) -> &str {
        self.strings.text_for(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Import {
    pub kind: ImportKind,
    /// Dotted module name, or the file path as written.
    pub uri: StringId,
    pub qualifier: StringId,
    /// -1 when no version was given.
    pub major: i32,
    pub minor: i32,
    pub location: Location,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PragmaKind {
    Singleton,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pragma {
    pub kind: PragmaKind,
    pub location: Location,
}

/// A `Type { ... }` literal, or a group/attached container created for a
/// dotted binding name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Object {
    /// Empty for group and attached containers.
    pub inherited_type_name: StringId,
    pub id_name: StringId,
    /// Per-component object id, -1 until assigned.
    pub id: i32,
    pub flags: u32,
    pub index_of_default_property_or_alias: i32,
    pub default_property_is_alias: bool,
    pub location: Location,
    pub location_of_id_property: Location,
    pub declarations_override: Option<ObjectId>,
    pub properties: Vec<Property>,
    pub aliases: Vec<Alias>,
    pub signals: Vec<Signal>,
    /// Named bindings newest first; default-property bindings ordered by
    /// source offset.
    pub bindings: Vec<Binding>,
    pub functions: Vec<Function>,
    pub functions_and_expressions: Vec<CompiledFunctionOrExpression>,
    /// Filled on component roots only.
    pub named_objects_in_component: Vec<ObjectId>,
}

impl Object {
    pub fn new(inherited_type_name: StringId, location: Location) -> Self {
        Self {
            inherited_type_name,
            id_name: StringId::EMPTY,
            id: -1,
            flags: 0,
            index_of_default_property_or_alias: -1,
            default_property_is_alias: false,
            location,
            location_of_id_property: Location::default(),
            declarations_override: None,
            properties: Vec::new(),
            aliases: Vec::new(),
            signals: Vec::new(),
            bindings: Vec::new(),
            functions: Vec::new(),
            functions_and_expressions: Vec::new(),
            named_objects_in_component: Vec::new(),
        }
    }

    /// Group or attached container.
    pub fn is_group(&self) -> bool {
        self.inherited_type_name.is_empty()
    }

    pub fn find_binding(&self, name: StringId) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.property_name == name)
    }

    /// Add a binding, enforcing the single-assignment rule.
    ///
    /// Default-property bindings are kept sorted by source offset; every
    /// other binding goes to the front of the list.
    pub fn append_binding(
        &mut self,
        binding: Binding,
        is_list_binding: bool,
    ) -> Result<(), DiagnosticKind> {
        let to_default = binding.is_default_property();
        if !is_list_binding
            && !to_default
            && !binding.value.is_container()
            && !binding.has_flag(binding_flags::IS_ON_ASSIGNMENT)
            && let Some(existing) = self.find_binding(binding.property_name)
            && existing.is_value_binding() == binding.is_value_binding()
            && !existing.has_flag(binding_flags::IS_ON_ASSIGNMENT)
        {
            return Err(DiagnosticKind::PropertyValueSetMultipleTimes);
        }

        if to_default {
            self.insert_sorted(binding);
        } else {
            self.bindings.insert(0, binding);
        }
        Ok(())
    }

    /// Insert after the last binding whose offset does not exceed the new one.
    fn insert_sorted(&mut self, binding: Binding) {
        let at = self
            .bindings
            .iter()
            .position(|b| b.offset > binding.offset)
            .unwrap_or(self.bindings.len());
        self.bindings.insert(at, binding);
    }

    pub fn default_property(&self) -> Option<&Property> {
        if self.default_property_is_alias {
            return None;
        }
        usize::try_from(self.index_of_default_property_or_alias)
            .ok()
            .and_then(|i| self.properties.get(i))
    }

    pub fn default_alias(&self) -> Option<&Alias> {
        if !self.default_property_is_alias {
            return None;
        }
        usize::try_from(self.index_of_default_property_or_alias)
            .ok()
            .and_then(|i| self.aliases.get(i))
    }

    /// Total parameter payload of all signals, in records.
    pub fn signal_parameter_count(&self) -> usize {
        self.signals.iter().map(|s| s.parameters.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub ty: PropertyType,
    pub name: StringId,
    /// Set for `Custom` and `CustomList` only.
    pub custom_type_name: StringId,
    pub flags: u32,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alias {
    pub name: StringId,
    pub flags: u32,
    /// Id of the target object.
    pub id: StringId,
    /// `prop` or `prop.sub`; empty when the alias names the object itself.
    pub property_name: StringId,
    pub location: Location,
    pub reference_location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub name: StringId,
    pub parameters: Vec<SignalParameter>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalParameter {
    pub ty: PropertyType,
    pub name: StringId,
    pub custom_type_name: StringId,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: StringId,
    /// Index into the owning object's `functions_and_expressions`.
    pub index: u32,
    pub formals: Vec<StringId>,
    pub location: Location,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CodeKind {
    Function,
    /// Right-hand side of a script binding.
    Binding,
}

/// JavaScript handed to the expression compiler, addressed by source range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledFunctionOrExpression {
    pub name: StringId,
    pub kind: CodeKind,
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    /// Empty for the default property.
    pub property_name: StringId,
    pub value: BindingValue,
    pub flags: u32,
    /// Byte offset of the binding name, the sort key for default-property
    /// bindings.
    pub offset: u32,
    pub location: Location,
    pub value_location: Location,
}

impl Binding {
    pub fn is_default_property(&self) -> bool {
        self.property_name.is_empty()
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    pub fn binding_type(&self) -> BindingType {
        self.value.binding_type()
    }

    pub fn class(&self) -> BindingClass {
        BindingClass::classify(self.binding_type(), self.flags)
    }

    /// Neither a signal handler nor a group/attached container.
    pub fn is_value_binding(&self) -> bool {
        !self.value.is_container() && !self.has_flag(binding_flags::SIGNAL_HANDLER)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BindingValue {
    Invalid,
    Boolean(bool),
    Number(f64),
    String(StringId),
    /// Object-local index into `functions_and_expressions`.
    Script(u32),
    Object(ObjectId),
    AttachedProperty(ObjectId),
    GroupProperty(ObjectId),
    Translation {
        text: StringId,
        comment: StringId,
        /// -1 when absent.
        number: i32,
    },
    TranslationById {
        id: StringId,
        number: i32,
    },
}

impl BindingValue {
    pub fn binding_type(&self) -> BindingType {
        match self {
            Self::Invalid => BindingType::Invalid,
            Self::Boolean(_) => BindingType::Boolean,
            Self::Number(_) => BindingType::Number,
            Self::String(_) => BindingType::String,
            Self::Script(_) => BindingType::Script,
            Self::Object(_) => BindingType::Object,
            Self::AttachedProperty(_) => BindingType::AttachedProperty,
            Self::GroupProperty(_) => BindingType::GroupProperty,
            Self::Translation { .. } => BindingType::Translation,
            Self::TranslationById { .. } => BindingType::TranslationById,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::AttachedProperty(_) | Self::GroupProperty(_))
    }

    /// Object referenced by an object, group or attached binding.
    pub fn object(&self) -> Option<ObjectId> {
        match *self {
            Self::Object(id) | Self::AttachedProperty(id) | Self::GroupProperty(id) => Some(id),
            _ => None,
        }
    }
}

//! Serialization of a document into a compiled unit.

use qmlc_core::StringId;
use qmlc_unit::header::flags;
use qmlc_unit::{
    AliasRecord, BindingClass, BindingRecord, ByteWriter, HEADER_SIZE, Header, ImportRecord,
    ObjectRecord, ParameterRecord, PropertyRecord, SignalRecord, structural_checksum,
};
use tracing::debug;

use super::functions::{FunctionIndexMap, SequentialFunctionIndices};
use super::layout::{ObjectLayout, UnitLayout};
use super::verify::debug_verify_document;
use crate::ir::{Binding, BindingValue, Document, Object, ObjectId};

/// Writes a built [`Document`] as one compiled unit buffer.
///
/// The document must come out of a successful build; generation has no
/// error path and asserts on layout mismatches.
#[derive(Clone, Copy, Debug)]
pub struct UnitGenerator<'d> {
    document: &'d Document,
    dependency_checksum: Option<[u8; 16]>,
}

impl<'d> UnitGenerator<'d> {
    pub fn new(document: &'d Document) -> Self {
        Self {
            document,
            dependency_checksum: None,
        }
    }

    /// Checksum over the types the document depends on, computed by the
    /// caller and stored in the header as is.
    pub fn with_dependency_checksum(mut self, checksum: Option<[u8; 16]>) -> Self {
        self.dependency_checksum = checksum;
        self
    }

    pub fn layout(&self) -> UnitLayout {
        UnitLayout::compute(self.document)
    }

    /// Generate with every object's code slots numbered consecutively.
    pub fn generate(&self) -> Vec<u8> {
        self.generate_with(&SequentialFunctionIndices::new(self.document))
    }

    pub fn generate_with<F>(&self, functions: &F) -> Vec<u8>
    where
        F: FunctionIndexMap + ?Sized,
    {
        let _span = tracing::debug_span!("generate", url = %self.document.url).entered();
        debug_verify_document(self.document);

        let layout = self.layout();
        let mut buf = vec![0u8; layout.unit_size];
        let mut w = ByteWriter::at(&mut buf, layout.offset_to_imports);

        for import in &self.document.imports {
            ImportRecord {
                kind: import.kind,
                uri: import.uri,
                qualifier: import.qualifier,
                major: import.major,
                minor: import.minor,
                location: import.location,
            }
            .encode(&mut w);
        }
        w.expect_position(layout.offset_to_objects, "imports");

        for object in &layout.objects {
            w.put_u32(object.offset as u32);
        }
        w.expect_position(layout.objects_start(), "object offset table");

        for (index, (object, object_layout)) in
            self.document.objects.iter().zip(&layout.objects).enumerate()
        {
            let writer = ObjectWriter {
                id: ObjectId::new(index),
                object,
                layout: object_layout,
                functions,
            };
            writer.write(&mut w);
        }
        w.expect_position(layout.offset_to_string_table, "objects");

        let end = self
            .document
            .strings
            .serialize_into(&mut buf, layout.offset_to_string_table);
        assert_eq!(end, layout.unit_size, "string table ends before the unit");

        let header = self.header(&layout, &buf);
        buf[..HEADER_SIZE].copy_from_slice(&header.to_bytes());

        debug!(
            size = layout.unit_size,
            objects = layout.objects.len(),
            strings = self.document.strings.len(),
            "generated unit"
        );
        buf
    }

    fn header(&self, layout: &UnitLayout, buf: &[u8]) -> Header {
        let mut header = Header {
            unit_size: layout.unit_size as u32,
            flags: flags::IS_QML,
            checksum: structural_checksum(buf, layout.offset_to_string_table),
            offset_to_imports: layout.offset_to_imports as u32,
            import_count: layout.import_count as u32,
            offset_to_objects: layout.offset_to_objects as u32,
            object_count: layout.objects.len() as u32,
            index_of_root_object: self.document.index_of_root_object.as_u32(),
            offset_to_string_table: layout.offset_to_string_table as u32,
            string_count: self.document.strings.len() as u32,
            dependency_checksum: self.dependency_checksum.unwrap_or_default(),
            ..Default::default()
        };
        if self.document.is_singleton() {
            header.set_singleton(true);
        }
        header
    }
}

struct ObjectWriter<'a, F: ?Sized> {
    id: ObjectId,
    object: &'a Object,
    layout: &'a ObjectLayout,
    functions: &'a F,
}

impl<F: FunctionIndexMap + ?Sized> ObjectWriter<'_, F> {
    fn write(&self, w: &mut ByteWriter<'_>) {
        let object = self.object;
        let layout = self.layout;
        let start = layout.offset;
        w.expect_position(start, "object start");

        ObjectRecord {
            inherited_type_name: object.inherited_type_name,
            id_name: object.id_name,
            id: object.id,
            flags: object.flags,
            index_of_default_property_or_alias: object.index_of_default_property_or_alias,
            default_property_is_alias: object.default_property_is_alias,
            functions: layout.functions,
            properties: layout.properties,
            aliases: layout.aliases,
            signals: layout.signals,
            bindings: layout.bindings,
            named_objects: layout.named_objects,
            location: object.location,
            location_of_id_property: object.location_of_id_property,
        }
        .encode(w);

        w.expect_position(start + layout.functions.offset as usize, "function table");
        for function in &object.functions {
            w.put_u32(self.functions.runtime_index(self.id, function.index));
        }

        w.expect_position(start + layout.properties.offset as usize, "property table");
        for property in &object.properties {
            PropertyRecord {
                ty: property.ty,
                name: property.name,
                custom_type_name: property.custom_type_name,
                flags: property.flags,
                location: property.location,
            }
            .encode(w);
        }

        w.expect_position(start + layout.aliases.offset as usize, "alias table");
        for alias in &object.aliases {
            AliasRecord {
                name: alias.name,
                flags: alias.flags,
                id: alias.id,
                property_name: alias.property_name,
                location: alias.location,
                reference_location: alias.reference_location,
            }
            .encode(w);
        }

        w.expect_position(start + layout.signals.offset as usize, "signal table");
        for &offset in &layout.signal_offsets {
            w.put_u32(offset);
        }

        w.expect_position(start + layout.bindings.offset as usize, "binding table");
        for class in BindingClass::EMIT_ORDER {
            for binding in object.bindings.iter().filter(|b| b.class() == class) {
                self.binding_record(binding).encode(w);
            }
        }

        w.expect_position(start + layout.named_objects.offset as usize, "named objects");
        for named in &object.named_objects_in_component {
            w.put_u32(named.as_u32());
        }

        for (signal, &offset) in object.signals.iter().zip(&layout.signal_offsets) {
            w.expect_position(start + offset as usize, "signal");
            SignalRecord {
                name: signal.name,
                parameter_count: signal.parameters.len() as u32,
                location: signal.location,
            }
            .encode(w);
            for parameter in &signal.parameters {
                ParameterRecord {
                    ty: parameter.ty,
                    name: parameter.name,
                    custom_type_name: parameter.custom_type_name,
                    location: parameter.location,
                }
                .encode(w);
            }
        }

        w.expect_position(layout.end(), "object end");
    }

    fn binding_record(&self, binding: &Binding) -> BindingRecord {
        let (string_index, value) = match binding.value {
            BindingValue::Invalid => (StringId::EMPTY, 0),
            BindingValue::Boolean(b) => (StringId::EMPTY, b as u64),
            BindingValue::Number(n) => (StringId::EMPTY, n.to_bits()),
            BindingValue::String(s) => (s, 0),
            BindingValue::Script(local) => (
                StringId::EMPTY,
                self.functions.runtime_index(self.id, local) as u64,
            ),
            BindingValue::Object(o)
            | BindingValue::AttachedProperty(o)
            | BindingValue::GroupProperty(o) => (StringId::EMPTY, o.as_u32() as u64),
            BindingValue::Translation {
                text,
                comment,
                number,
            } => (text, BindingRecord::pack_translation(comment, number)),
            BindingValue::TranslationById { id, number } => (
                id,
                BindingRecord::pack_translation(StringId::EMPTY, number),
            ),
        };
        BindingRecord {
            property_name: binding.property_name,
            ty: binding.binding_type(),
            flags: binding.flags,
            string_index,
            value,
            location: binding.location,
            value_location: binding.value_location,
        }
    }
}

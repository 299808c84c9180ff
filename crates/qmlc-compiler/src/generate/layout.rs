//! Byte layout of a compiled unit.
//!
//! Every offset is computed here, before a single byte is written. The
//! writer then only fills in records and checks that its cursor lands on
//! the boundaries recorded in [`UnitLayout`].

use qmlc_unit::{
    ALIAS_SIZE, BINDING_SIZE, HEADER_SIZE, IMPORT_SIZE, INDEX_SIZE, OBJECT_SIZE, PROPERTY_SIZE,
    RECORD_ALIGN, SignalRecord, Table,
};

use crate::ir::{Document, Object};

/// Placement of one object and its sub-tables.
///
/// Table offsets are relative to the object's start, as stored in the unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectLayout {
    /// Absolute offset of the object header.
    pub offset: usize,
    pub functions: Table,
    pub properties: Table,
    pub aliases: Table,
    pub signals: Table,
    pub bindings: Table,
    pub named_objects: Table,
    /// Object-relative offset of each signal record, in declaration order.
    pub signal_offsets: Vec<u32>,
    /// Header, tables and signal payload together.
    pub size: usize,
}

impl ObjectLayout {
    fn compute(object: &Object, offset: usize) -> Self {
        let mut cursor = OBJECT_SIZE;
        let mut table = |count: usize, record_size: usize| {
            let t = Table::new(count as u32, cursor as u32);
            cursor += count * record_size;
            t
        };

        let functions = table(object.functions.len(), INDEX_SIZE);
        let properties = table(object.properties.len(), PROPERTY_SIZE);
        let aliases = table(object.aliases.len(), ALIAS_SIZE);
        let signals = table(object.signals.len(), INDEX_SIZE);
        let bindings = table(object.bindings.len(), BINDING_SIZE);
        let named_objects = table(object.named_objects_in_component.len(), INDEX_SIZE);

        // Signal payloads follow the fixed-width tables. A signal without
        // parameters still gets its own record.
        let mut signal_offsets = Vec::with_capacity(object.signals.len());
        for signal in &object.signals {
            signal_offsets.push(cursor as u32);
            cursor += SignalRecord::size_with(signal.parameters.len());
        }

        debug_assert_eq!(cursor % RECORD_ALIGN, 0);
        Self {
            offset,
            functions,
            properties,
            aliases,
            signals,
            bindings,
            named_objects,
            signal_offsets,
            size: cursor,
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// Section offsets of a whole unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitLayout {
    pub offset_to_imports: usize,
    pub import_count: usize,
    /// Start of the object offset table.
    pub offset_to_objects: usize,
    pub objects: Vec<ObjectLayout>,
    pub offset_to_string_table: usize,
    pub string_table_size: usize,
    pub unit_size: usize,
}

impl UnitLayout {
    pub fn compute(document: &Document) -> Self {
        let offset_to_imports = HEADER_SIZE;
        let import_count = document.imports.len();
        let offset_to_objects = offset_to_imports + import_count * IMPORT_SIZE;

        let mut cursor = offset_to_objects + document.objects.len() * INDEX_SIZE;
        let mut objects = Vec::with_capacity(document.objects.len());
        for object in &document.objects {
            let layout = ObjectLayout::compute(object, cursor);
            cursor = layout.end();
            objects.push(layout);
        }

        let offset_to_string_table = cursor;
        let string_table_size = document.strings.serialized_size();
        Self {
            offset_to_imports,
            import_count,
            offset_to_objects,
            objects,
            offset_to_string_table,
            string_table_size,
            unit_size: offset_to_string_table + string_table_size,
        }
    }

    /// Start of the first object, right after the offset table.
    pub fn objects_start(&self) -> usize {
        self.offset_to_objects + self.objects.len() * INDEX_SIZE
    }
}

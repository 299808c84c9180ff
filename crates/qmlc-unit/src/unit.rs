//! Compiled unit loader.
//!
//! [`Unit`] validates a buffer once on load (header, section bounds, every
//! record and string reference) and then hands out cheap typed views.

use qmlc_core::StringId;

use super::codec::read_u32_le;
use super::header::Header;
use super::records::{
    AliasRecord, BindingRecord, ImportRecord, ObjectRecord, ParameterRecord, PropertyRecord,
    SignalRecord, Table,
};
use super::{
    ALIAS_SIZE, BINDING_SIZE, HEADER_SIZE, IMPORT_SIZE, INDEX_SIZE, OBJECT_SIZE, PARAMETER_SIZE,
    PROPERTY_SIZE, SIGNAL_SIZE, VERSION,
};

/// Unit load error.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("invalid magic: expected QMLU")]
    InvalidMagic,
    #[error("unsupported version: {0} (expected {VERSION})")]
    UnsupportedVersion(u32),
    #[error("unit too small: {0} bytes (minimum {HEADER_SIZE})")]
    TooSmall(usize),
    #[error("size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },
    #[error("checksum mismatch: header says {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("{what} at {start}..{end} is out of bounds")]
    OutOfBounds {
        what: &'static str,
        start: usize,
        end: usize,
    },
    #[error("malformed {0} record")]
    Malformed(&'static str),
    #[error("string index {0} out of range")]
    BadString(u32),
}

/// CRC-32 over the structural portion of a unit: everything between the
/// header and the string table.
pub fn structural_checksum(bytes: &[u8], offset_to_string_table: usize) -> u32 {
    crc32fast::hash(&bytes[HEADER_SIZE..offset_to_string_table])
}

/// A validated compiled unit.
#[derive(Debug)]
pub struct Unit {
    bytes: Vec<u8>,
    header: Header,
}

impl Unit {
    /// Load and validate a unit from owned bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, UnitError> {
        if bytes.len() < HEADER_SIZE {
            return Err(UnitError::TooSmall(bytes.len()));
        }

        let header = Header::from_bytes(&bytes[..HEADER_SIZE]);

        if !header.validate_magic() {
            return Err(UnitError::InvalidMagic);
        }
        if !header.validate_version() {
            return Err(UnitError::UnsupportedVersion(header.version));
        }
        if header.unit_size as usize != bytes.len() {
            return Err(UnitError::SizeMismatch {
                header: header.unit_size,
                actual: bytes.len(),
            });
        }

        let unit = Self { bytes, header };
        unit.validate()?;
        Ok(unit)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn is_singleton(&self) -> bool {
        self.header.is_singleton()
    }

    pub fn strings(&self) -> StringsView<'_> {
        StringsView {
            bytes: &self.bytes,
            directory: self.header.offset_to_string_table as usize,
            count: self.header.string_count as usize,
        }
    }

    pub fn import_count(&self) -> usize {
        self.header.import_count as usize
    }

    pub fn import(&self, idx: usize) -> ImportRecord {
        assert!(idx < self.import_count(), "import index out of bounds");
        let at = self.header.offset_to_imports as usize + idx * IMPORT_SIZE;
        ImportRecord::decode(&self.bytes[at..]).expect("import validated at load")
    }

    pub fn imports(&self) -> impl Iterator<Item = ImportRecord> + '_ {
        (0..self.import_count()).map(|i| self.import(i))
    }

    pub fn object_count(&self) -> usize {
        self.header.object_count as usize
    }

    pub fn object(&self, idx: usize) -> ObjectView<'_> {
        assert!(idx < self.object_count(), "object index out of bounds");
        let start = self.object_offset(idx);
        ObjectView {
            index: idx,
            bytes: &self.bytes[start..],
            record: ObjectRecord::decode(&self.bytes[start..]),
        }
    }

    pub fn objects(&self) -> impl Iterator<Item = ObjectView<'_>> + '_ {
        (0..self.object_count()).map(|i| self.object(i))
    }

    pub fn root_object(&self) -> ObjectView<'_> {
        self.object(self.header.index_of_root_object as usize)
    }

    /// Absolute offset of object `idx`, from the object offset table.
    pub fn object_offset(&self, idx: usize) -> usize {
        read_u32_le(
            &self.bytes,
            self.header.offset_to_objects as usize + idx * INDEX_SIZE,
        ) as usize
    }

    fn validate(&self) -> Result<(), UnitError> {
        let h = &self.header;
        let string_table = h.offset_to_string_table as usize;
        let limit = self.bytes.len();

        if string_table < HEADER_SIZE || string_table > limit {
            return Err(UnitError::OutOfBounds {
                what: "string table",
                start: string_table,
                end: limit,
            });
        }
        let expected = structural_checksum(&self.bytes, string_table);
        if expected != h.checksum {
            return Err(UnitError::ChecksumMismatch {
                expected: h.checksum,
                actual: expected,
            });
        }

        check_range(
            "string directory",
            string_table,
            h.string_count as usize * INDEX_SIZE,
            limit,
        )?;
        for idx in 0..h.string_count as usize {
            let record = read_u32_le(&self.bytes, string_table + idx * INDEX_SIZE) as usize;
            check_range("string record", record, 4, limit)?;
            let len = read_u32_le(&self.bytes, record) as usize;
            check_range("string payload", record + 4, len, limit)?;
            std::str::from_utf8(&self.bytes[record + 4..record + 4 + len])
                .map_err(|_| UnitError::Malformed("string"))?;
        }

        check_range(
            "import table",
            h.offset_to_imports as usize,
            self.import_count() * IMPORT_SIZE,
            string_table,
        )?;
        for idx in 0..self.import_count() {
            let at = h.offset_to_imports as usize + idx * IMPORT_SIZE;
            let import =
                ImportRecord::decode(&self.bytes[at..]).ok_or(UnitError::Malformed("import"))?;
            self.check_string(import.uri)?;
            self.check_string(import.qualifier)?;
        }

        check_range(
            "object offset table",
            h.offset_to_objects as usize,
            self.object_count() * INDEX_SIZE,
            string_table,
        )?;
        if self.object_count() > 0 && h.index_of_root_object as usize >= self.object_count() {
            return Err(UnitError::Malformed("root object index"));
        }
        for idx in 0..self.object_count() {
            self.validate_object(self.object_offset(idx), string_table)?;
        }
        Ok(())
    }

    fn validate_object(&self, start: usize, limit: usize) -> Result<(), UnitError> {
        check_range("object", start, OBJECT_SIZE, limit)?;
        let object = ObjectRecord::decode(&self.bytes[start..]);
        self.check_string(object.inherited_type_name)?;
        self.check_string(object.id_name)?;

        let table = |what, t: Table, size: usize| {
            check_range(what, start + t.offset as usize, t.count as usize * size, limit)
        };
        table("function table", object.functions, INDEX_SIZE)?;
        table("property table", object.properties, PROPERTY_SIZE)?;
        table("alias table", object.aliases, ALIAS_SIZE)?;
        table("signal table", object.signals, INDEX_SIZE)?;
        table("binding table", object.bindings, BINDING_SIZE)?;
        table("named object table", object.named_objects, INDEX_SIZE)?;

        let at = |t: Table, size: usize, i: usize| start + t.offset as usize + i * size;

        for i in 0..object.properties.count as usize {
            let p = PropertyRecord::decode(&self.bytes[at(object.properties, PROPERTY_SIZE, i)..])
                .ok_or(UnitError::Malformed("property"))?;
            self.check_string(p.name)?;
            self.check_string(p.custom_type_name)?;
        }
        for i in 0..object.aliases.count as usize {
            let a = AliasRecord::decode(&self.bytes[at(object.aliases, ALIAS_SIZE, i)..]);
            self.check_string(a.name)?;
            self.check_string(a.id)?;
            self.check_string(a.property_name)?;
        }
        for i in 0..object.signals.count as usize {
            let signal_at =
                start + read_u32_le(&self.bytes, at(object.signals, INDEX_SIZE, i)) as usize;
            check_range("signal", signal_at, SIGNAL_SIZE, limit)?;
            let s = SignalRecord::decode(&self.bytes[signal_at..]);
            self.check_string(s.name)?;
            check_range(
                "signal parameters",
                signal_at + SIGNAL_SIZE,
                s.parameter_count as usize * PARAMETER_SIZE,
                limit,
            )?;
            for p in 0..s.parameter_count as usize {
                let param_at = signal_at + SIGNAL_SIZE + p * PARAMETER_SIZE;
                let param = ParameterRecord::decode(&self.bytes[param_at..])
                    .ok_or(UnitError::Malformed("signal parameter"))?;
                self.check_string(param.name)?;
                self.check_string(param.custom_type_name)?;
            }
        }
        for i in 0..object.bindings.count as usize {
            let b = BindingRecord::decode(&self.bytes[at(object.bindings, BINDING_SIZE, i)..])
                .ok_or(UnitError::Malformed("binding"))?;
            self.check_string(b.property_name)?;
            self.check_string(b.string_index)?;
            if b.ty.refers_to_object() && b.as_index() as usize >= self.object_count() {
                return Err(UnitError::Malformed("binding object index"));
            }
        }
        Ok(())
    }

    fn check_string(&self, id: StringId) -> Result<(), UnitError> {
        if id.as_u32() >= self.header.string_count {
            return Err(UnitError::BadString(id.as_u32()));
        }
        Ok(())
    }
}

fn check_range(what: &'static str, start: usize, len: usize, limit: usize) -> Result<(), UnitError> {
    let end = start.saturating_add(len);
    if start < HEADER_SIZE || end > limit {
        return Err(UnitError::OutOfBounds { what, start, end });
    }
    Ok(())
}

/// View into the string table.
#[derive(Clone, Copy)]
pub struct StringsView<'a> {
    bytes: &'a [u8],
    directory: usize,
    count: usize,
}

impl<'a> StringsView<'a> {
    /// Resolve a string id.
    ///
    /// # Panics
    /// Panics if `id` is out of range. Ids read from records are checked at load.
    pub fn get(&self, id: StringId) -> &'a str {
        let idx = id.as_u32() as usize;
        assert!(idx < self.count, "string index out of bounds");
        let record = read_u32_le(self.bytes, self.directory + idx * INDEX_SIZE) as usize;
        let len = read_u32_le(self.bytes, record) as usize;
        std::str::from_utf8(&self.bytes[record + 4..record + 4 + len])
            .expect("string table validated at load")
    }

    /// Index of `text`, if present.
    pub fn find(&self, text: &str) -> Option<StringId> {
        (0..self.count as u32)
            .map(StringId::from_raw)
            .find(|&id| self.get(id) == text)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (StringId, &'a str)> + '_ {
        (0..self.count as u32).map(|i| {
            let id = StringId::from_raw(i);
            (id, self.get(id))
        })
    }
}

/// View into one serialized object.
#[derive(Clone, Copy)]
pub struct ObjectView<'a> {
    index: usize,
    /// Unit bytes starting at the object.
    bytes: &'a [u8],
    record: ObjectRecord,
}

impl<'a> ObjectView<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn record(&self) -> &ObjectRecord {
        &self.record
    }

    /// Runtime function indices.
    pub fn functions(&self) -> impl Iterator<Item = u32> + 'a {
        self.indices(self.record.functions)
    }

    pub fn properties(&self) -> impl Iterator<Item = PropertyRecord> + 'a {
        let bytes = self.bytes;
        let t = self.record.properties;
        (0..t.count as usize).map(move |i| {
            PropertyRecord::decode(&bytes[t.offset as usize + i * PROPERTY_SIZE..])
                .expect("property validated at load")
        })
    }

    pub fn aliases(&self) -> impl Iterator<Item = AliasRecord> + 'a {
        let bytes = self.bytes;
        let t = self.record.aliases;
        (0..t.count as usize)
            .map(move |i| AliasRecord::decode(&bytes[t.offset as usize + i * ALIAS_SIZE..]))
    }

    pub fn signals(&self) -> impl Iterator<Item = SignalView<'a>> + 'a {
        let bytes = self.bytes;
        self.indices(self.record.signals).map(move |offset| {
            let bytes = &bytes[offset as usize..];
            SignalView {
                record: SignalRecord::decode(bytes),
                bytes,
            }
        })
    }

    pub fn bindings(&self) -> impl Iterator<Item = BindingRecord> + 'a {
        let bytes = self.bytes;
        let t = self.record.bindings;
        (0..t.count as usize).map(move |i| {
            BindingRecord::decode(&bytes[t.offset as usize + i * BINDING_SIZE..])
                .expect("binding validated at load")
        })
    }

    /// Object indices of the named objects of this component.
    pub fn named_objects(&self) -> impl Iterator<Item = u32> + 'a {
        self.indices(self.record.named_objects)
    }

    fn indices(&self, t: Table) -> impl Iterator<Item = u32> + 'a {
        let bytes = self.bytes;
        (0..t.count as usize).map(move |i| read_u32_le(bytes, t.offset as usize + i * INDEX_SIZE))
    }
}

/// View into one signal and its parameters.
#[derive(Clone, Copy)]
pub struct SignalView<'a> {
    record: SignalRecord,
    bytes: &'a [u8],
}

impl<'a> SignalView<'a> {
    pub fn record(&self) -> &SignalRecord {
        &self.record
    }

    pub fn parameters(&self) -> impl Iterator<Item = ParameterRecord> + 'a {
        let bytes = self.bytes;
        (0..self.record.parameter_count as usize).map(move |i| {
            ParameterRecord::decode(&bytes[SIGNAL_SIZE + i * PARAMETER_SIZE..])
                .expect("signal parameter validated at load")
        })
    }
}

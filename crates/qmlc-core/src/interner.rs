//! String interning for the compiled unit's string table.
//!
//! Converts strings into cheap integer handles (`StringId`). Index 0 is always
//! the empty string, so "no name" and "empty name" share one id.
//!
//! The table serializes into the unit as an offset directory followed by
//! length-prefixed UTF-8 records, each padded to a 4-byte boundary.

use indexmap::IndexSet;

/// A lightweight handle to an interned string.
///
/// Ids are assigned in insertion order; `StringId::EMPTY` is the empty string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(serde::Serialize)]
#[serde(transparent)]
pub struct StringId(u32);

impl StringId {
    /// The pre-interned empty string.
    pub const EMPTY: Self = Self(0);

    /// Raw index for serialization/debugging.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Create a StringId from a raw index. Use only for deserialization.
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// De-duplicating, append-only string table.
#[derive(Debug, Clone)]
pub struct StringTable {
    strings: IndexSet<Box<str>>,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    pub fn new() -> Self {
        let mut strings = IndexSet::new();
        strings.insert(Box::from(""));
        Self { strings }
    }

    /// Intern a string, returning its id.
    /// If the string was already interned, returns the existing id.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(index) = self.strings.get_index_of(s) {
            return StringId(index as u32);
        }
        let (index, _) = self.strings.insert_full(Box::from(s));
        StringId(index as u32)
    }

    /// Look up an already interned string without inserting it.
    pub fn get(&self, s: &str) -> Option<StringId> {
        self.strings.get_index_of(s).map(|i| StringId(i as u32))
    }

    /// Resolve an id back to its string.
    ///
    /// # Panics
    /// Panics if the id was not created by this table.
    #[inline]
    pub fn text_for(&self, id: StringId) -> &str {
        self.try_text_for(id)
            .unwrap_or_else(|| panic!("StringTable: {id:?} out of range ({})", self.len()))
    }

    /// Try to resolve an id, returning None if invalid.
    #[inline]
    pub fn try_text_for(&self, id: StringId) -> Option<&str> {
        self.strings.get_index(id.0 as usize).map(|s| &**s)
    }

    /// Number of interned strings, including the empty string.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Always false: the empty string is interned on construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterate over all interned strings with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (StringId, &str)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, s)| (StringId(i as u32), &**s))
    }

    /// Exact number of bytes [`serialize_into`](Self::serialize_into) writes.
    pub fn serialized_size(&self) -> usize {
        let directory = self.strings.len() * 4;
        let records: usize = self.strings.iter().map(|s| record_size(s.len())).sum();
        directory + records
    }

    /// Write the table into `buf` starting at `base`.
    ///
    /// Directory entries are absolute offsets into `buf`, so the table can be
    /// read back from anywhere in the unit. Returns the end offset.
    ///
    /// # Panics
    /// Panics if `buf` is too small to hold [`serialized_size`](Self::serialized_size) bytes.
    pub fn serialize_into(&self, buf: &mut [u8], base: usize) -> usize {
        let end = base + self.serialized_size();
        assert!(
            end <= buf.len(),
            "string table overflows buffer: needs {end} bytes, have {}",
            buf.len()
        );

        let mut record = base + self.strings.len() * 4;
        for (i, s) in self.strings.iter().enumerate() {
            let slot = base + i * 4;
            buf[slot..slot + 4].copy_from_slice(&(record as u32).to_le_bytes());

            let bytes = s.as_bytes();
            buf[record..record + 4].copy_from_slice(&(bytes.len() as u32).to_le_bytes());
            buf[record + 4..record + 4 + bytes.len()].copy_from_slice(bytes);
            let padded = record_size(bytes.len());
            buf[record + 4 + bytes.len()..record + padded].fill(0);
            record += padded;
        }

        debug_assert_eq!(record, end);
        end
    }
}

/// Size of one length-prefixed record, padded to 4 bytes.
#[inline]
pub fn record_size(byte_len: usize) -> usize {
    (4 + byte_len).next_multiple_of(4)
}

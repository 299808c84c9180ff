//! Compiled unit format constants.

/// Magic bytes identifying a compiled QML unit.
pub const MAGIC: [u8; 4] = *b"QMLU";

/// Current unit format version.
pub const VERSION: u32 = 1;

/// Size of the unit header in bytes.
pub const HEADER_SIZE: usize = 64;

/// Every record and section starts on a 4-byte boundary.
pub const RECORD_ALIGN: usize = 4;

/// Location record: line u32 + column u32.
pub const LOCATION_SIZE: usize = 8;

pub const IMPORT_SIZE: usize = 28;
pub const OBJECT_SIZE: usize = 88;
pub const PROPERTY_SIZE: usize = 24;
pub const ALIAS_SIZE: usize = 32;
pub const SIGNAL_SIZE: usize = 16;
pub const PARAMETER_SIZE: usize = 20;
pub const BINDING_SIZE: usize = 40;

/// Size of one entry in the object offset table, the function table, the
/// signal offset table and the named-object table.
pub const INDEX_SIZE: usize = 4;

/// Marker for "no default property" / "no id".
pub const NO_INDEX: i32 = -1;

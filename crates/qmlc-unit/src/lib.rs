#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Compiled QML unit format.
//!
//! A unit is one flat little-endian buffer:
//!
//! ```text
//! header | imports | object offset table | objects ... | string table
//! ```
//!
//! Each object is its fixed header followed by its function, property,
//! alias, signal-offset, binding and named-object tables, then the signal
//! payloads. Offsets inside an object are relative to the object's start.

pub mod codec;
pub mod constants;
pub mod dump;
pub mod header;
pub mod records;
pub mod unit;

#[cfg(test)]
mod records_tests;

pub use constants::{
    ALIAS_SIZE, BINDING_SIZE, HEADER_SIZE, IMPORT_SIZE, INDEX_SIZE, LOCATION_SIZE, MAGIC,
    NO_INDEX, OBJECT_SIZE, PARAMETER_SIZE, PROPERTY_SIZE, RECORD_ALIGN, SIGNAL_SIZE, VERSION,
};

pub use codec::ByteWriter;
pub use dump::dump;
pub use header::Header;
pub use records::{
    AliasRecord, BindingClass, BindingRecord, BindingType, ImportKind, ImportRecord, ObjectRecord,
    ParameterRecord, PropertyRecord, PropertyType, SignalRecord, Table, alias_flags,
    binding_flags, object_flags, property_flags,
};
pub use unit::{ObjectView, SignalView, StringsView, Unit, UnitError, structural_checksum};

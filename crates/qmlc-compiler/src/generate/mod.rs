//! Compiled unit generation.
//!
//! Two phases:
//! - [`UnitLayout::compute`] measures every section and object and fixes
//!   all offsets
//! - [`UnitGenerator`] writes typed records at those offsets through a
//!   bounds-checked [`ByteWriter`](qmlc_unit::ByteWriter)
//!
//! Bindings are written in runs, one per [`BindingClass`](qmlc_unit::BindingClass),
//! each run keeping the document's order. The string table goes last.

mod functions;
pub mod layout;
mod verify;
mod writer;

#[cfg(test)]
mod generate_tests;
#[cfg(test)]
mod layout_tests;

pub use functions::{FunctionIndexMap, SequentialFunctionIndices};
pub use layout::{ObjectLayout, UnitLayout};
pub use writer::UnitGenerator;

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the qmlc compiler and the unit format.
//!
//! - [`StringTable`]: interned strings, serialized into every compiled unit
//! - [`LineIndex`] / [`Location`]: byte offsets to 1-based line/column pairs
//! - [`utils`]: identifier shape predicates used by the QML naming rules

pub mod interner;
pub mod location;
pub mod utils;

#[cfg(test)]
mod location_tests;

pub use interner::{StringId, StringTable};
pub use location::{LineIndex, Location};

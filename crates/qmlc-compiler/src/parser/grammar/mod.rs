//! Grammar productions for QML documents.
//!
//! This module implements all `parse_*` methods as an extension of `Parser`.
//! Declarations are parsed in full; JavaScript statements and expressions
//! only structurally, enough to classify binding values.

mod expressions;
mod items;
mod members;

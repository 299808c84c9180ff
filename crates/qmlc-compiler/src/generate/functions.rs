//! Mapping from object-local code slots to runtime function indices.

use crate::ir::{Document, ObjectId};

/// Translates an object's `functions_and_expressions` index into the index
/// of the compiled function in the unit's runtime function table.
///
/// The table itself is produced by the JavaScript code generator; the unit
/// generator only looks indices up.
pub trait FunctionIndexMap {
    fn runtime_index(&self, object: ObjectId, local: u32) -> u32;
}

/// Numbers every slot of every object consecutively, in object order.
///
/// This is the table a code generator produces when it compiles each
/// object's slots in turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequentialFunctionIndices {
    /// First runtime index of each object.
    bases: Vec<u32>,
    total: u32,
}

impl SequentialFunctionIndices {
    pub fn new(document: &Document) -> Self {
        let mut bases = Vec::with_capacity(document.objects.len());
        let mut total = 0u32;
        for object in &document.objects {
            bases.push(total);
            total += object.functions_and_expressions.len() as u32;
        }
        Self { bases, total }
    }

    /// Number of runtime functions across the document.
    pub fn len(&self) -> u32 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl FunctionIndexMap for SequentialFunctionIndices {
    fn runtime_index(&self, object: ObjectId, local: u32) -> u32 {
        self.bases[object.index()] + local
    }
}

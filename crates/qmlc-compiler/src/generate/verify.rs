//! Debug-only structural checks on a document about to be serialized.
//!
//! The builder enforces these as it goes; a violation here is a builder bug,
//! never a user error. Zero-cost in release builds.

#[cfg(debug_assertions)]
use indexmap::IndexSet;

use crate::ir::Document;
#[cfg(debug_assertions)]
use crate::ir::{BindingValue, Object, ObjectId};

#[cfg(not(debug_assertions))]
#[inline(always)]
pub fn debug_verify_document(_document: &Document) {}

#[cfg(debug_assertions)]
pub fn debug_verify_document(document: &Document) {
    let count = document.objects.len();
    let root = document.index_of_root_object;
    assert!(root.index() < count, "root object {} out of range", root.index());

    let mut referenced = vec![0u32; count];
    for (index, object) in document.objects.iter().enumerate() {
        verify_members(index, object);
        for binding in &object.bindings {
            let (BindingValue::Object(child)
            | BindingValue::AttachedProperty(child)
            | BindingValue::GroupProperty(child)) = binding.value
            else {
                continue;
            };
            assert!(
                child.index() != index && child.index() < count,
                "object {index} binds invalid object {}",
                child.index()
            );
            referenced[child.index()] += 1;
        }
        for named in &object.named_objects_in_component {
            assert!(named.index() < count, "named object {} out of range", named.index());
        }
    }

    for (index, &references) in referenced.iter().enumerate() {
        let expected = u32::from(ObjectId::new(index) != root);
        assert_eq!(
            references, expected,
            "object {index} is bound {references} times"
        );
    }
}

#[cfg(debug_assertions)]
fn verify_members(index: usize, object: &Object) {
    let mut names = IndexSet::new();
    let declared = object
        .properties
        .iter()
        .map(|p| p.name)
        .chain(object.aliases.iter().map(|a| a.name))
        .chain(object.signals.iter().map(|s| s.name))
        .chain(object.functions.iter().map(|f| f.name));
    for name in declared {
        assert!(
            names.insert(name),
            "object {index} declares member {} twice",
            name.as_u32()
        );
    }

    if let Ok(default) = usize::try_from(object.index_of_default_property_or_alias) {
        let len = if object.default_property_is_alias {
            object.aliases.len()
        } else {
            object.properties.len()
        };
        assert!(default < len, "object {index} default member {default} out of range");
    }

    assert_eq!(
        object.id_name.is_empty(),
        object.id < 0,
        "object {index} id without a number"
    );

    let slots = object.functions_and_expressions.len() as u32;
    for function in &object.functions {
        assert!(function.index < slots, "object {index} function slot out of range");
    }
    for binding in &object.bindings {
        if let BindingValue::Script(slot) = binding.value {
            assert!(slot < slots, "object {index} script slot out of range");
        }
    }

    let defaults = object
        .bindings
        .iter()
        .filter(|b| b.is_default_property())
        .map(|b| b.offset);
    let mut last = 0;
    for offset in defaults {
        assert!(offset >= last, "object {index} default bindings out of order");
        last = offset;
    }
}

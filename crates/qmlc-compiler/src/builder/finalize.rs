//! Whole-document steps that run once every object exists.

use qmlc_core::utils::is_signal_handler_name;
use qmlc_unit::binding_flags;
use tracing::trace;

use super::Lowering;
use crate::ir::{BindingValue, ObjectId};

impl Lowering<'_> {
    pub(super) fn finalize(&mut self) {
        self.mark_bindings();
        self.assign_object_ids();
    }

    /// Derive the signal-handler and binding-to-alias flags from names.
    fn mark_bindings(&mut self) {
        let strings = &self.doc.strings;
        for object in &mut self.doc.objects {
            let aliases: Vec<_> = object.aliases.iter().map(|a| a.name).collect();
            for binding in &mut object.bindings {
                if binding.value.is_container() {
                    continue;
                }
                let name = strings.text_for(binding.property_name);
                if matches!(binding.value, BindingValue::Script(_)) && is_signal_handler_name(name)
                {
                    binding.flags |= binding_flags::IS_SIGNAL_HANDLER_EXPRESSION;
                } else if aliases.contains(&binding.property_name) {
                    binding.flags |= binding_flags::IS_BINDING_TO_ALIAS;
                }
            }
        }
    }

    /// Number objects with an id per component, in document order.
    fn assign_object_ids(&mut self) {
        let mut named: Vec<Vec<ObjectId>> = vec![Vec::new(); self.doc.objects.len()];
        for (index, object) in self.doc.objects.iter_mut().enumerate() {
            if object.id_name.is_empty() {
                continue;
            }
            let component = &mut named[self.id_scope[index].index()];
            object.id = component.len() as i32;
            component.push(ObjectId::new(index));
        }

        for (object, named) in self.doc.objects.iter_mut().zip(named) {
            if !named.is_empty() {
                trace!(count = named.len(), "named objects in component");
            }
            object.named_objects_in_component = named;
        }
    }
}

//! Objects, bindings and dotted binding names.

use qmlc_core::utils::{IdShapeError, check_id_shape, starts_uppercase};
use qmlc_core::{Location, StringId};
use qmlc_unit::{binding_flags, object_flags};
use rowan::{TextRange, TextSize};
use tracing::trace;

use super::{Lowering, Scope};
use crate::diagnostics::DiagnosticKind;
use crate::ir::{Binding, BindingValue, CodeKind, CompiledFunctionOrExpression, Object, ObjectId};
use crate::parser::ast::{
    ArrayBinding, Expression, ExpressionKind, Ident, ObjectBinding, ObjectDefinition,
    ObjectInitializer, ObjectMember, QualifiedId, Statement,
};

impl Lowering<'_> {
    /// Create an object, lower its initializer, and return its index.
    ///
    /// Returns `None` when the type name is not a type, or when the build
    /// already has errors; callers then skip binding the object.
    pub(super) fn define_object(
        &mut self,
        parent: Option<ObjectId>,
        type_name: Option<&QualifiedId>,
        location: TextSize,
        initializer: Option<&ObjectInitializer>,
        declarations_override: Option<ObjectId>,
    ) -> Option<ObjectId> {
        if let Some(type_name) = type_name {
            let last = type_name.last();
            if !starts_uppercase(last.as_str()) {
                self.error(DiagnosticKind::ExpectedTypeName, last.range);
                return None;
            }
        }

        let name = match type_name {
            Some(type_name) => self.intern(&type_name.joined()),
            None => StringId::EMPTY,
        };
        let location = if initializer.is_some() {
            self.location(location)
        } else {
            Location::default()
        };
        let mut object = Object::new(name, location);
        object.declarations_override = declarations_override;
        if type_name.is_some_and(|t| t.last().as_str() == "Component") {
            object.flags |= object_flags::IS_COMPONENT;
        }

        let id = self.doc.push_object(object);
        let id_scope = match parent {
            Some(parent) => self.children_id_scope(parent),
            None => id,
        };
        self.id_scope.push(id_scope);
        trace!(object = id.as_u32(), "define object");

        if let Some(initializer) = initializer {
            let scope = Scope::object(id);
            for member in &initializer.members {
                self.lower_member(scope, member);
            }
        }

        if self.diagnostics.has_errors() {
            return None;
        }
        Some(id)
    }

    /// Id namespace for objects created inside `parent`.
    fn children_id_scope(&self, parent: ObjectId) -> ObjectId {
        let is_component_root = self.id_scope[parent.index()] == parent
            || self.doc.object(parent).flags & object_flags::IS_COMPONENT != 0;
        if is_component_root {
            parent
        } else {
            self.id_scope[parent.index()]
        }
    }

    fn lower_member(&mut self, scope: Scope, member: &ObjectMember) {
        match member {
            ObjectMember::ObjectDefinition(def) => self.lower_object_definition(scope, def),
            ObjectMember::ObjectBinding(binding) => self.lower_object_binding(scope, binding),
            ObjectMember::ScriptBinding(binding) => {
                self.lower_script_binding(scope, &binding.qualified_id, &binding.statement)
            }
            ObjectMember::ArrayBinding(binding) => self.lower_array_binding(scope, binding),
            ObjectMember::PublicMember(member) => self.lower_public_member(scope, member),
            ObjectMember::SourceElement(element) => self.lower_source_element(scope, element),
        }
    }

    /// `Type { ... }` binds a new object to the default property;
    /// `group { ... }` binds into the property group `group`.
    fn lower_object_definition(&mut self, scope: Scope, def: &ObjectDefinition) {
        let start = def.type_name.range().start();
        if starts_uppercase(def.type_name.last().as_str()) {
            let Some(object) = self.define_object(
                Some(scope.object),
                Some(&def.type_name),
                start,
                Some(&def.initializer),
                None,
            ) else {
                return;
            };
            let name = def.type_name.first().range;
            self.append_object_binding(scope, name, name, StringId::EMPTY, object, false, false);
            return;
        }

        let declarations = self.doc.declarations_target(scope.object);
        let Some(object) = self.define_object(
            Some(scope.object),
            None,
            start,
            Some(&def.initializer),
            Some(declarations),
        ) else {
            return;
        };
        self.bind_object(scope, &def.type_name, object, false);
    }

    /// `name: Type { ... }` and `Type on name { ... }`.
    pub(super) fn lower_object_binding(&mut self, scope: Scope, binding: &ObjectBinding) {
        let Some(object) = self.define_object(
            Some(scope.object),
            Some(&binding.type_name),
            binding.type_name.range().start(),
            Some(&binding.initializer),
            None,
        ) else {
            return;
        };
        self.bind_object(scope, &binding.qualified_id, object, binding.has_on_token);
    }

    fn bind_object(
        &mut self,
        scope: Scope,
        qualified_id: &QualifiedId,
        object: ObjectId,
        on_assignment: bool,
    ) {
        let qualified_name = qualified_id.first().range;
        let Some((target, name)) = self.resolve_qualified_id(scope.object, qualified_id, on_assignment)
        else {
            return;
        };
        let property_name = self.intern(name.as_str());
        self.append_object_binding(
            scope.retarget(target),
            qualified_name,
            name.range,
            property_name,
            object,
            false,
            on_assignment,
        );
    }

    /// `name: [ Type { ... }, ... ]`
    pub(super) fn lower_array_binding(&mut self, scope: Scope, binding: &ArrayBinding) {
        let qualified_name = binding.qualified_id.first().range;
        let Some((target, name)) = self.resolve_qualified_id(scope.object, &binding.qualified_id, false)
        else {
            return;
        };
        let scope = scope.retarget(target);
        let property_name = self.intern(name.as_str());

        let bindings_target = self.bindings_target(scope);
        if self
            .doc
            .object(bindings_target)
            .find_binding(property_name)
            .is_some()
        {
            self.error(DiagnosticKind::PropertyValueSetMultipleTimes, name.range);
            return;
        }

        // Each item is prepended, so the list ends up last item first.
        for member in &binding.members {
            let Some(object) = self.define_object(
                Some(target),
                Some(&member.type_name),
                member.type_name.range().start(),
                Some(&member.initializer),
                None,
            ) else {
                return;
            };
            self.append_object_binding(
                scope,
                qualified_name,
                name.range,
                property_name,
                object,
                true,
                false,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn append_object_binding(
        &mut self,
        scope: Scope,
        qualified_name: TextRange,
        name: TextRange,
        property_name: StringId,
        object: ObjectId,
        is_list_item: bool,
        on_assignment: bool,
    ) {
        if self.doc.text(property_name) == "id" {
            self.error(DiagnosticKind::InvalidComponentId, name);
            return;
        }

        let child = self.doc.object(object);
        let value = if child.is_group() {
            BindingValue::GroupProperty(object)
        } else {
            BindingValue::Object(object)
        };
        let value_location = child.location;

        let mut flags = 0;
        if scope.initializes_read_only() {
            flags |= binding_flags::INITIALIZER_FOR_READ_ONLY_DECLARATION;
        }
        if on_assignment {
            flags |= binding_flags::IS_ON_ASSIGNMENT;
        }
        if is_list_item {
            flags |= binding_flags::IS_LIST_ITEM;
        }

        let binding = Binding {
            property_name,
            value,
            flags,
            offset: name.start().into(),
            location: self.location_of(name),
            value_location,
        };
        let target = self.bindings_target(scope);
        if let Err(kind) = self.doc.object_mut(target).append_binding(binding, is_list_item) {
            self.error(kind, qualified_name);
        }
    }

    /// `name: expression`, including `id: name`.
    pub(super) fn lower_script_binding(
        &mut self,
        scope: Scope,
        qualified_id: &QualifiedId,
        statement: &Statement,
    ) {
        let qualified_name = qualified_id.first().range;
        let Some((target, name)) = self.resolve_qualified_id(scope.object, qualified_id, false)
        else {
            return;
        };
        if target == scope.object && name.as_str() == "id" {
            self.set_id(scope.object, name.range, statement);
            return;
        }
        let property_name = self.intern(name.as_str());
        self.append_script_binding(
            scope.retarget(target),
            qualified_name,
            name.range,
            property_name,
            statement,
        );
    }

    pub(super) fn append_script_binding(
        &mut self,
        scope: Scope,
        qualified_name: TextRange,
        name: TextRange,
        property_name: StringId,
        statement: &Statement,
    ) {
        let mut flags = 0;
        if scope.initializes_read_only() {
            flags |= binding_flags::INITIALIZER_FOR_READ_ONLY_DECLARATION;
        }
        let value = self.binding_value(scope, property_name, statement);
        let binding = Binding {
            property_name,
            value,
            flags,
            offset: name.start().into(),
            location: self.location_of(name),
            value_location: self.location_of(statement.range),
        };
        let target = self.bindings_target(scope);
        if let Err(kind) = self.doc.object_mut(target).append_binding(binding, false) {
            self.error(kind, qualified_name);
        }
    }

    /// Store constants directly; everything else becomes a script slot for
    /// the expression compiler.
    fn binding_value(
        &mut self,
        scope: Scope,
        property_name: StringId,
        statement: &Statement,
    ) -> BindingValue {
        if let Some(value) = statement.expression().and_then(|e| self.constant_value(e)) {
            return value;
        }

        let name = format!("expression for {}", self.doc.text(property_name));
        let name = self.intern(&name);
        let target = self.bindings_target(scope);
        let slots = &mut self.doc.object_mut(target).functions_and_expressions;
        slots.push(CompiledFunctionOrExpression {
            name,
            kind: CodeKind::Binding,
            start: statement.range.start().into(),
            end: statement.range.end().into(),
        });
        BindingValue::Script(slots.len() as u32 - 1)
    }

    fn constant_value(&mut self, expr: &Expression) -> Option<BindingValue> {
        match &expr.kind {
            ExpressionKind::String(s) => Some(BindingValue::String(self.intern(s))),
            ExpressionKind::True => Some(BindingValue::Boolean(true)),
            ExpressionKind::False => Some(BindingValue::Boolean(false)),
            ExpressionKind::Number(n) => Some(BindingValue::Number(*n)),
            ExpressionKind::UnaryMinus(operand) => operand.as_number().map(|n| BindingValue::Number(-n)),
            ExpressionKind::Call { callee, arguments } => self.translation(callee, arguments),
            _ => None,
        }
    }

    /// `qsTr("text"[, "comment"[, n]])` or `qsTrId("id"[, n])` with literal
    /// arguments.
    fn translation(&mut self, callee: &Expression, arguments: &[Expression]) -> Option<BindingValue> {
        let ExpressionKind::Identifier(function) = &callee.kind else {
            return None;
        };
        match (function.as_str(), arguments) {
            ("qsTr", [text, rest @ ..]) if rest.len() <= 2 => {
                let text = text.as_string()?;
                let comment = match rest.first() {
                    Some(comment) => comment.as_string()?,
                    None => "",
                };
                let number = match rest.get(1) {
                    Some(n) => plural_number(n)?,
                    None => -1,
                };
                Some(BindingValue::Translation {
                    text: self.intern(text),
                    comment: self.intern(comment),
                    number,
                })
            }
            ("qsTrId", [id, rest @ ..]) if rest.len() <= 1 => {
                let id = id.as_string()?;
                let number = match rest.first() {
                    Some(n) => plural_number(n)?,
                    None => -1,
                };
                Some(BindingValue::TranslationById {
                    id: self.intern(id),
                    number,
                })
            }
            _ => None,
        }
    }

    /// Walk a dotted binding name down to the object that owns its last
    /// component.
    ///
    /// Every intermediate component is a group (`anchors.top`) or attached
    /// (`Keys.onPressed`) container, created on first use. A leading import
    /// qualifier folds into the next component: `Q.Keys.onPressed` attaches
    /// `Q.Keys`.
    pub(super) fn resolve_qualified_id<'q>(
        &mut self,
        object: ObjectId,
        qualified_id: &'q QualifiedId,
        on_assignment: bool,
    ) -> Option<(ObjectId, &'q Ident)> {
        let parts = &qualified_id.parts;
        let first = qualified_id.first();
        if first.as_str() == "id" && parts.len() > 1 {
            self.error(DiagnosticKind::InvalidIdUse, first.range);
            return None;
        }

        let mut index = 0;
        let mut current_name = first.text.clone();
        if parts.len() > 1 && self.is_import_qualifier(first.as_str()) {
            index = 1;
            let next = &parts[1];
            current_name = format!("{current_name}.{}", next.text);
            if !starts_uppercase(next.as_str()) {
                self.error(DiagnosticKind::ExpectedTypeName, next.range);
                return None;
            }
        }

        let mut object = object;
        while index + 1 < parts.len() {
            let part = &parts[index];
            let name = self.intern(&current_name);
            let attached = starts_uppercase(part.as_str());

            let existing = self
                .doc
                .object(object)
                .find_binding(name)
                .and_then(|b| match b.value {
                    BindingValue::AttachedProperty(o) if attached => Some(o),
                    BindingValue::GroupProperty(o) if !attached => Some(o),
                    _ => None,
                });

            object = match existing {
                Some(container) => container,
                None => {
                    let container = self.define_object(Some(object), None, part.range.start(), None, None)?;
                    let value = if attached {
                        BindingValue::AttachedProperty(container)
                    } else {
                        BindingValue::GroupProperty(container)
                    };
                    let flags = if on_assignment {
                        binding_flags::IS_ON_ASSIGNMENT
                    } else {
                        0
                    };
                    let binding = Binding {
                        property_name: name,
                        value,
                        flags,
                        offset: part.range.start().into(),
                        location: self.location_of(part.range),
                        value_location: self.location_of(parts[index + 1].range),
                    };
                    if let Err(kind) = self.doc.object_mut(object).append_binding(binding, false) {
                        self.error(kind, part.range);
                        return None;
                    }
                    container
                }
            };

            index += 1;
            current_name = parts[index].text.clone();
        }

        Some((object, &parts[index]))
    }

    fn is_import_qualifier(&self, name: &str) -> bool {
        self.doc
            .imports
            .iter()
            .any(|import| !import.qualifier.is_empty() && self.doc.text(import.qualifier) == name)
    }

    /// `id: name`. The value may be written bare or as a string literal.
    fn set_id(&mut self, object: ObjectId, id_location: TextRange, statement: &Statement) {
        let range = statement.range;
        let source = self.source;
        let text = match statement.expression() {
            Some(expr) => expr.as_string().unwrap_or_else(|| expr.text(source)),
            None => &source[std::ops::Range::<usize>::from(range)],
        };

        if let Err(err) = check_id_shape(text) {
            let kind = match err {
                IdShapeError::Empty => DiagnosticKind::EmptyId,
                IdShapeError::StartsUppercase => DiagnosticKind::IdStartsUppercase,
                IdShapeError::BadStart => DiagnosticKind::IdBadStart,
                IdShapeError::BadChar => DiagnosticKind::IdBadChar,
            };
            self.error(kind, range);
            return;
        }
        if self.is_illegal(text) {
            self.error(DiagnosticKind::IdMasksGlobal, range);
            return;
        }
        if !self.doc.object(object).id_name.is_empty() {
            self.error(DiagnosticKind::PropertyValueSetMultipleTimes, id_location);
            return;
        }

        let name = self.intern(text);
        let component = self.id_scope[object.index()];
        if let Some(&first) = self.ids.get(&(component, name)) {
            self.diagnostics
                .report(DiagnosticKind::IdNotUnique, range)
                .message(text)
                .related_to("first declared here", first)
                .emit();
            return;
        }
        self.ids.insert((component, name), range);

        let location = self.location_of(id_location);
        let object = self.doc.object_mut(object);
        object.id_name = name;
        object.location_of_id_property = location;
    }
}

/// Plural argument of a translation call: an integral number literal.
fn plural_number(expr: &Expression) -> Option<i32> {
    let n = expr.as_number()?;
    if n.fract() != 0.0 || n < 0.0 || n > i32::MAX as f64 {
        return None;
    }
    Some(n as i32)
}

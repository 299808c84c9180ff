//! `property`, `alias`, `signal` and function declarations.
//!
//! Declarations made inside a group container land on the enclosing object.
//! Property, alias, signal and method names share one namespace per object;
//! a clash is reported in terms of the declaration that came second.

use qmlc_core::StringId;
use qmlc_core::utils::starts_uppercase;
use qmlc_unit::{PropertyType, alias_flags, property_flags};
use rowan::TextRange;

use super::{Lowering, PropertyScope, Scope};
use crate::diagnostics::DiagnosticKind;
use crate::ir::{
    Alias, CodeKind, CompiledFunctionOrExpression, Function, ObjectId, Property, Signal,
    SignalParameter,
};
use crate::parser::ast::{
    ExpressionKind, Ident, Parameter, PropertyInitializer, PublicMember, PublicMemberKind,
    QualifiedId, SourceElement, SourceElementKind,
};

/// Built-in property type keywords.
const PROPERTY_TYPES: &[(&str, PropertyType)] = &[
    ("int", PropertyType::Int),
    ("bool", PropertyType::Bool),
    ("double", PropertyType::Real),
    ("real", PropertyType::Real),
    ("string", PropertyType::String),
    ("url", PropertyType::Url),
    ("color", PropertyType::Color),
    ("date", PropertyType::DateTime),
    ("rect", PropertyType::Rect),
    ("point", PropertyType::Point),
    ("size", PropertyType::Size),
    ("font", PropertyType::Font),
    ("vector2d", PropertyType::Vector2D),
    ("vector3d", PropertyType::Vector3D),
    ("vector4d", PropertyType::Vector4D),
    ("quaternion", PropertyType::Quaternion),
    ("matrix4x4", PropertyType::Matrix4x4),
    ("variant", PropertyType::Variant),
    ("var", PropertyType::Var),
];

fn builtin_type(name: &str) -> Option<PropertyType> {
    PROPERTY_TYPES
        .iter()
        .find(|(keyword, _)| *keyword == name)
        .map(|&(_, ty)| ty)
}

/// Kind of declaration, for picking the clash diagnostic.
#[derive(Clone, Copy)]
enum Declaration {
    Property,
    Alias,
    Signal,
    Method,
}

impl Declaration {
    fn duplicate(self) -> DiagnosticKind {
        match self {
            Self::Property => DiagnosticKind::DuplicatePropertyName,
            Self::Alias => DiagnosticKind::DuplicateAliasName,
            Self::Signal => DiagnosticKind::DuplicateSignalName,
            Self::Method => DiagnosticKind::DuplicateMethodName,
        }
    }

    fn uppercase(self) -> DiagnosticKind {
        match self {
            Self::Property => DiagnosticKind::PropertyNameUppercase,
            Self::Alias => DiagnosticKind::AliasNameUppercase,
            Self::Signal => DiagnosticKind::SignalNameUppercase,
            Self::Method => DiagnosticKind::MethodNameUppercase,
        }
    }

    fn illegal(self) -> DiagnosticKind {
        match self {
            Self::Property | Self::Alias => DiagnosticKind::IllegalPropertyName,
            Self::Signal => DiagnosticKind::IllegalSignalName,
            Self::Method => DiagnosticKind::IllegalMethodName,
        }
    }

    /// Order in which naming rules are tried; the first violation wins.
    fn checks(self) -> [NameCheck; 3] {
        use NameCheck::*;
        match self {
            Self::Property | Self::Alias => [Illegal, Duplicate, Uppercase],
            Self::Signal => [Uppercase, Illegal, Duplicate],
            Self::Method => [Duplicate, Uppercase, Illegal],
        }
    }

    fn diagnostic(self, check: NameCheck) -> DiagnosticKind {
        match check {
            NameCheck::Illegal => self.illegal(),
            NameCheck::Duplicate => self.duplicate(),
            NameCheck::Uppercase => self.uppercase(),
        }
    }
}

#[derive(Clone, Copy)]
enum NameCheck {
    Illegal,
    Duplicate,
    Uppercase,
}

impl Lowering<'_> {
    pub(super) fn lower_public_member(&mut self, scope: Scope, member: &PublicMember) {
        match &member.kind {
            PublicMemberKind::Signal { parameters } => self.lower_signal(scope, member, parameters),
            PublicMemberKind::Property {
                member_type,
                type_modifier,
                default_token,
                readonly_token,
                initializer,
            } => {
                let Some(member_type) = member_type else {
                    return;
                };
                let declared = DeclaredMember {
                    member,
                    default_token: *default_token,
                    read_only: readonly_token.is_some(),
                    initializer: initializer.as_ref(),
                };
                if member_type.joined() == "alias" {
                    self.lower_alias(scope, declared);
                } else {
                    self.lower_property(scope, declared, member_type, type_modifier.as_ref());
                }
            }
        }
    }

    fn lower_property(
        &mut self,
        scope: Scope,
        declared: DeclaredMember<'_>,
        member_type: &QualifiedId,
        type_modifier: Option<&Ident>,
    ) {
        let type_text = member_type.joined();
        let ty = match (builtin_type(&type_text), type_modifier) {
            (Some(ty), None) => ty,
            (None, modifier) if starts_uppercase(&type_text) => match modifier {
                None => PropertyType::Custom,
                Some(m) if m.as_str() == "list" => PropertyType::CustomList,
                Some(m) => {
                    self.error(DiagnosticKind::InvalidTypeModifier, m.range);
                    return;
                }
            },
            (_, Some(m)) => {
                self.error(DiagnosticKind::UnexpectedTypeModifier, m.range);
                return;
            }
            (None, None) => {
                self.error(DiagnosticKind::ExpectedPropertyType, member_type.range());
                return;
            }
        };

        let member = declared.member;
        let name = &member.name;
        let target = self.doc.declarations_target(scope.object);
        if !self.check_declaration(target, Declaration::Property, name) {
            return;
        }
        if declared.default_token.is_some() && !self.claim_default(target, declared) {
            return;
        }

        let custom_type_name = if ty.is_custom() {
            self.intern(&type_text)
        } else {
            StringId::EMPTY
        };
        let name_id = self.intern(name.as_str());
        let property = Property {
            ty,
            name: name_id,
            custom_type_name,
            flags: if declared.read_only {
                property_flags::IS_READ_ONLY
            } else {
                0
            },
            location: self.location_of(member.first_token),
        };
        let object = self.doc.object_mut(target);
        object.properties.push(property);
        if declared.default_token.is_some() {
            object.index_of_default_property_or_alias = object.properties.len() as i32 - 1;
            object.default_property_is_alias = false;
        }

        let scope = Scope {
            property: Some(PropertyScope {
                read_only: declared.read_only,
            }),
            ..scope
        };
        match declared.initializer {
            Some(PropertyInitializer::Object(binding)) => self.lower_object_binding(scope, binding),
            Some(PropertyInitializer::Array(binding)) => self.lower_array_binding(scope, binding),
            Some(PropertyInitializer::Statement(statement)) => {
                let redundant_null = ty == PropertyType::Custom
                    && statement
                        .expression()
                        .is_some_and(|e| matches!(e.kind, ExpressionKind::Null));
                if !redundant_null {
                    self.append_script_binding(scope, name.range, name.range, name_id, statement);
                }
            }
            None => {}
        }
    }

    /// `property alias name: id[.prop[.sub]]`
    fn lower_alias(&mut self, scope: Scope, declared: DeclaredMember<'_>) {
        let member = declared.member;
        let Some(initializer) = declared.initializer else {
            self.error(DiagnosticKind::NoAliasLocation, member.first_token);
            return;
        };

        let rhs = match initializer {
            PropertyInitializer::Statement(statement) => statement.range,
            PropertyInitializer::Object(binding) => binding.type_name.range(),
            PropertyInitializer::Array(binding) => binding.lbracket,
        };
        let expression = match initializer {
            PropertyInitializer::Statement(statement) => statement.expression(),
            PropertyInitializer::Object(_) | PropertyInitializer::Array(_) => None,
        };
        let chain = match expression {
            Some(expr) => match expr.as_reference_chain() {
                Some(chain) => chain,
                None if expr.is_constant() => {
                    self.error(DiagnosticKind::InvalidAliasLocation, rhs);
                    return;
                }
                None => {
                    self.error(DiagnosticKind::InvalidAliasReference, rhs);
                    return;
                }
            },
            None => {
                self.error(DiagnosticKind::InvalidAliasReference, rhs);
                return;
            }
        };
        if chain.len() > 3 {
            self.error(DiagnosticKind::InvalidAliasReference, rhs);
            return;
        }

        let id = self.intern(chain[0].as_str());
        let property_path = chain[1..]
            .iter()
            .map(Ident::as_str)
            .collect::<Vec<_>>()
            .join(".");
        let property_name = self.intern(&property_path);

        let target = self.doc.declarations_target(scope.object);
        if !self.check_declaration(target, Declaration::Alias, &member.name) {
            return;
        }
        if declared.default_token.is_some() && !self.claim_default(target, declared) {
            return;
        }

        let alias = Alias {
            name: self.intern(member.name.as_str()),
            flags: if declared.read_only {
                alias_flags::IS_READ_ONLY
            } else {
                0
            },
            id,
            property_name,
            location: self.location_of(member.first_token),
            reference_location: self.location_of(rhs),
        };
        let object = self.doc.object_mut(target);
        object.aliases.push(alias);
        if declared.default_token.is_some() {
            object.index_of_default_property_or_alias = object.aliases.len() as i32 - 1;
            object.default_property_is_alias = true;
        }
    }

    fn lower_signal(&mut self, scope: Scope, member: &PublicMember, parameters: &[Parameter]) {
        let mut lowered = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let Some(ty) = &parameter.ty else {
                self.error(DiagnosticKind::ExpectedParameterType, member.keyword);
                return;
            };
            let type_text = ty.joined();
            let (ty, custom_type_name) = match builtin_type(&type_text) {
                Some(ty) => (ty, StringId::EMPTY),
                None if starts_uppercase(&type_text) => {
                    (PropertyType::Custom, self.intern(&type_text))
                }
                None => {
                    self.diagnostics
                        .report(DiagnosticKind::InvalidSignalParameterType, member.keyword)
                        .message(type_text)
                        .emit();
                    return;
                }
            };
            lowered.push(SignalParameter {
                ty,
                name: self.intern(parameter.name.as_str()),
                custom_type_name,
                location: self.location_of(parameter.name.range),
            });
        }

        let target = self.doc.declarations_target(scope.object);
        if !self.check_declaration(target, Declaration::Signal, &member.name) {
            return;
        }
        let signal = Signal {
            name: self.intern(member.name.as_str()),
            parameters: lowered,
            location: self.location_of(member.keyword),
        };
        self.doc.object_mut(target).signals.push(signal);
    }

    pub(super) fn lower_source_element(&mut self, scope: Scope, element: &SourceElement) {
        let SourceElementKind::Function(function) = &element.kind else {
            self.error(DiagnosticKind::JsDeclarationOutsideScript, element.range);
            return;
        };

        let target = self.doc.declarations_target(scope.object);
        if !self.check_declaration(target, Declaration::Method, &function.name) {
            return;
        }

        let name = self.intern(function.name.as_str());
        let formals = function
            .formals
            .iter()
            .map(|formal| self.intern(formal.as_str()))
            .collect();
        let location = self.location_of(function.name.range);

        let object = self.doc.object_mut(target);
        object.functions_and_expressions.push(CompiledFunctionOrExpression {
            name,
            kind: CodeKind::Function,
            start: element.range.start().into(),
            end: element.range.end().into(),
        });
        let index = object.functions_and_expressions.len() as u32 - 1;
        object.functions.push(Function {
            name,
            index,
            formals,
            location,
        });
    }

    /// Naming rules shared by every declaration kind, applied in the kind's
    /// order. Reports and returns false on the first violation.
    fn check_declaration(&mut self, target: ObjectId, kind: Declaration, name: &Ident) -> bool {
        let text = name.as_str();
        let error = kind.checks().into_iter().find_map(|check| {
            let violated = match check {
                NameCheck::Illegal => self.is_illegal(text),
                NameCheck::Duplicate => self.is_declared(target, text),
                NameCheck::Uppercase => starts_uppercase(text),
            };
            violated.then(|| kind.diagnostic(check))
        });
        match error {
            Some(error) => {
                self.error(error, name.range);
                false
            }
            None => true,
        }
    }

    fn is_declared(&self, target: ObjectId, name: &str) -> bool {
        let Some(name) = self.doc.strings.get(name) else {
            return false;
        };
        let object = self.doc.object(target);
        object.properties.iter().any(|p| p.name == name)
            || object.aliases.iter().any(|a| a.name == name)
            || object.signals.iter().any(|s| s.name == name)
            || object.functions.iter().any(|f| f.name == name)
    }

    fn claim_default(&mut self, target: ObjectId, declared: DeclaredMember<'_>) -> bool {
        if self.doc.object(target).index_of_default_property_or_alias == -1 {
            return true;
        }
        let range = declared.default_token.unwrap_or(declared.member.name.range);
        self.error(DiagnosticKind::DuplicateDefaultProperty, range);
        false
    }
}

/// A `property` declaration, alias or not.
#[derive(Clone, Copy)]
struct DeclaredMember<'m> {
    member: &'m PublicMember,
    default_token: Option<TextRange>,
    read_only: bool,
    initializer: Option<&'m PropertyInitializer>,
}

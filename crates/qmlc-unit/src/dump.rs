//! Human-readable dump of a compiled unit, for debugging and tests.

use std::fmt::Write as _;

use qmlc_core::StringId;

use super::records::{BindingRecord, BindingType, PropertyType, binding_flags, object_flags};
use super::unit::{StringsView, Unit};

/// Generate a deterministic text dump of the unit.
pub fn dump(unit: &Unit) -> String {
    let mut out = String::new();
    let strings = unit.strings();

    dump_header(&mut out, unit);
    dump_imports(&mut out, unit, strings);
    dump_objects(&mut out, unit, strings);
    dump_strings(&mut out, strings);

    out
}

fn dump_header(out: &mut String, unit: &Unit) {
    let header = unit.header();
    out.push_str("[header]\n");
    writeln!(out, "singleton = {}", header.is_singleton()).unwrap();
    writeln!(out, "root = O{}", header.index_of_root_object).unwrap();
    out.push('\n');
}

fn dump_imports(out: &mut String, unit: &Unit, strings: StringsView<'_>) {
    if unit.import_count() == 0 {
        return;
    }
    out.push_str("[imports]\n");
    for (i, import) in unit.imports().enumerate() {
        write!(
            out,
            "I{i} {} {:?}",
            import.kind.name(),
            strings.get(import.uri)
        )
        .unwrap();
        if import.major >= 0 {
            write!(out, " {}.{}", import.major, import.minor).unwrap();
        }
        if !import.qualifier.is_empty() {
            write!(out, " as {}", strings.get(import.qualifier)).unwrap();
        }
        out.push('\n');
    }
    out.push('\n');
}

fn dump_objects(out: &mut String, unit: &Unit, strings: StringsView<'_>) {
    out.push_str("[objects]\n");
    for object in unit.objects() {
        let record = object.record();
        write!(out, "O{}", object.index()).unwrap();
        if record.inherited_type_name.is_empty() {
            out.push_str(" <group>");
        } else {
            write!(out, " {}", strings.get(record.inherited_type_name)).unwrap();
        }
        if !record.id_name.is_empty() {
            write!(out, " id={}#{}", strings.get(record.id_name), record.id).unwrap();
        }
        if record.flags & object_flags::IS_COMPONENT != 0 {
            out.push_str(" component");
        }
        if record.index_of_default_property_or_alias >= 0 {
            let kind = if record.default_property_is_alias {
                "alias"
            } else {
                "property"
            };
            write!(
                out,
                " default={kind}#{}",
                record.index_of_default_property_or_alias
            )
            .unwrap();
        }
        out.push('\n');

        for f in object.functions() {
            writeln!(out, "  function F{f}").unwrap();
        }
        for p in object.properties() {
            out.push_str("  ");
            if p.is_read_only() {
                out.push_str("readonly ");
            }
            writeln!(
                out,
                "property {} {}",
                type_name(p.ty, p.custom_type_name, strings),
                strings.get(p.name)
            )
            .unwrap();
        }
        for a in object.aliases() {
            write!(
                out,
                "  alias {}: {}",
                strings.get(a.name),
                strings.get(a.id)
            )
            .unwrap();
            if !a.property_name.is_empty() {
                write!(out, ".{}", strings.get(a.property_name)).unwrap();
            }
            out.push('\n');
        }
        for s in object.signals() {
            let params: Vec<String> = s
                .parameters()
                .map(|p| {
                    format!(
                        "{} {}",
                        type_name(p.ty, p.custom_type_name, strings),
                        strings.get(p.name)
                    )
                })
                .collect();
            writeln!(
                out,
                "  signal {}({})",
                strings.get(s.record().name),
                params.join(", ")
            )
            .unwrap();
        }
        for b in object.bindings() {
            dump_binding(out, &b, strings);
        }
        let named: Vec<String> = object.named_objects().map(|o| format!("O{o}")).collect();
        if !named.is_empty() {
            writeln!(out, "  named {}", named.join(" ")).unwrap();
        }
    }
    out.push('\n');
}

fn dump_binding(out: &mut String, b: &BindingRecord, strings: StringsView<'_>) {
    let name = if b.property_name.is_empty() {
        "<default>"
    } else {
        strings.get(b.property_name)
    };
    write!(out, "  {name}: ").unwrap();
    match b.ty {
        BindingType::Invalid => out.push_str("<invalid>"),
        BindingType::Boolean => write!(out, "{}", b.as_bool()).unwrap(),
        BindingType::Number => write!(out, "{}", b.as_number()).unwrap(),
        BindingType::String => write!(out, "{:?}", strings.get(b.string_index)).unwrap(),
        BindingType::Translation | BindingType::TranslationById => {
            let func = if b.ty == BindingType::Translation {
                "qsTr"
            } else {
                "qsTrId"
            };
            let (comment, number) = b.as_translation();
            write!(out, "{func}({:?}", strings.get(b.string_index)).unwrap();
            if !comment.is_empty() {
                write!(out, ", {:?}", strings.get(comment)).unwrap();
            }
            if number >= 0 {
                write!(out, ", {number}").unwrap();
            }
            out.push(')');
        }
        BindingType::Script => write!(out, "F{}", b.as_index()).unwrap(),
        BindingType::Object => write!(out, "O{}", b.as_index()).unwrap(),
        BindingType::AttachedProperty => write!(out, "attached O{}", b.as_index()).unwrap(),
        BindingType::GroupProperty => write!(out, "group O{}", b.as_index()).unwrap(),
    }

    let flags: Vec<&str> = [
        (binding_flags::IS_SIGNAL_HANDLER_EXPRESSION, "handler"),
        (binding_flags::IS_SIGNAL_HANDLER_OBJECT, "handler-object"),
        (binding_flags::IS_ON_ASSIGNMENT, "on"),
        (binding_flags::INITIALIZER_FOR_READ_ONLY_DECLARATION, "readonly-init"),
        (binding_flags::IS_LIST_ITEM, "list"),
        (binding_flags::IS_BINDING_TO_ALIAS, "alias"),
    ]
    .into_iter()
    .filter(|&(bit, _)| b.has_flag(bit))
    .map(|(_, name)| name)
    .collect();
    if !flags.is_empty() {
        write!(out, " [{}]", flags.join(" ")).unwrap();
    }
    out.push('\n');
}

fn dump_strings(out: &mut String, strings: StringsView<'_>) {
    out.push_str("[strings]\n");
    let width = strings.len().saturating_sub(1).to_string().len();
    for (id, text) in strings.iter() {
        writeln!(out, "S{:0width$} {text:?}", id.as_u32()).unwrap();
    }
}

fn type_name(ty: PropertyType, custom: StringId, strings: StringsView<'_>) -> String {
    match ty {
        PropertyType::Custom => strings.get(custom).to_string(),
        PropertyType::CustomList => format!("list<{}>", strings.get(custom)),
        _ => ty.name().to_string(),
    }
}

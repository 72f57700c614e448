use typesync_core::{MemberDef, Result, TypeDef, TypeRef};

use super::{quote, EmitContext, Library};
use crate::classify::{COMPONENT_MODEL, FORM_SCRIPT};
use crate::writer::CodeWriter;

const EDITOR_TYPE: &str = "EditorTypeAttribute";
const IGNORE: &str = "IgnoreAttribute";

/// Emit a form interface with editor-typed members and its context class.
pub fn emit(
    ty: &TypeDef,
    identifier: &str,
    ctx: &mut EmitContext<'_>,
    w: &mut CodeWriter,
) -> Result<()> {
    let form_key = match ty.attr(COMPONENT_MODEL, FORM_SCRIPT) {
        Some(attr) => attr.string_arg(&["0", "key"])?.map(str::to_string),
        None => None,
    }
    .unwrap_or_else(|| ty.full_name());

    let mut fields = Vec::new();
    for member in ty.properties().filter(|m| m.attr(COMPONENT_MODEL, IGNORE).is_none()) {
        fields.push((member.name.as_str(), editor_type(member, ctx)?));
    }
    let context = ctx.lib(Library::Core, "PrefixedContext");

    w.doc(ty.doc.as_deref());
    w.in_brace(&format!("export interface {}", identifier), |w| {
        for (name, editor) in &fields {
            w.line(format!("{}: {};", name, editor));
        }
        Ok(())
    })?;
    w.blank();
    w.in_brace(
        &format!("export class {} extends {}", identifier, context),
        |w| {
            w.line(format!("static readonly formKey = {};", quote(&form_key)));
            Ok(())
        },
    )
}

/// Editor widget for a form member: explicit `EditorType`, else inferred.
fn editor_type(member: &MemberDef, ctx: &mut EmitContext<'_>) -> Result<String> {
    if let Some(attr) = member.attr(COMPONENT_MODEL, EDITOR_TYPE) {
        if let Some(key) = attr.string_arg(&["0", "editorType"])? {
            if key.contains('.') {
                return Ok(ctx.type_name(&TypeRef::named(key)));
            }
            let symbol = if key.ends_with("Editor") {
                key.to_string()
            } else {
                format!("{}Editor", key)
            };
            return Ok(ctx.lib(Library::Core, &symbol));
        }
    }

    let symbol = match member.type_ref.element() {
        TypeRef::Int32 | TypeRef::Int64 => "IntegerEditor",
        TypeRef::Double | TypeRef::Decimal => "DecimalEditor",
        TypeRef::Bool => "BooleanEditor",
        TypeRef::DateTime => "DateEditor",
        TypeRef::Named { name, .. } if ctx.source.resolve(name).is_some_and(|t| t.is_enum()) => {
            "EnumEditor"
        }
        _ => "StringEditor",
    };
    Ok(ctx.lib(Library::Core, symbol))
}

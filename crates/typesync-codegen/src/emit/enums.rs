use typesync_core::{Result, TypeDef, TypesyncError};

use super::{quote, EmitContext, Library};
use crate::classify::COMPONENT_MODEL;
use crate::writer::CodeWriter;

const ENUM_KEY: &str = "EnumKeyAttribute";

/// Emit an `export enum` with explicit values and its registration call.
pub fn emit(ty: &TypeDef, ctx: &mut EmitContext<'_>, w: &mut CodeWriter) -> Result<()> {
    let enum_key = match ty.attr(COMPONENT_MODEL, ENUM_KEY) {
        Some(attr) => attr.string_arg(&["0", "value"])?.map(str::to_string),
        None => None,
    }
    .unwrap_or_else(|| ty.full_name());

    let values = enum_values(ty)?;

    w.doc(ty.doc.as_deref());
    w.in_brace(&format!("export enum {}", ty.name), |w| {
        w.comma_lines(
            values
                .iter()
                .map(|(name, value)| format!("{} = {}", name, value)),
        );
        Ok(())
    })?;

    let decorators = ctx.lib(Library::Core, "Decorators");
    w.line(format!(
        "{}.registerEnumType({}, {});",
        decorators,
        ty.name,
        quote(&enum_key)
    ));
    Ok(())
}

/// Member values, numbering implicit members after the previous one.
fn enum_values(ty: &TypeDef) -> Result<Vec<(&str, i64)>> {
    let mut next = Some(0i64);
    let mut values = Vec::with_capacity(ty.members.len());

    for member in &ty.members {
        let value = match &member.value {
            None => next.ok_or_else(|| {
                TypesyncError::extraction(format!(
                    "enum member {}.{} follows {} and has no representable value",
                    ty.name,
                    member.name,
                    i64::MAX
                ))
            })?,
            Some(v) => v.as_i64().ok_or_else(|| {
                TypesyncError::extraction(format!(
                    "enum member {}.{} has non-integer value {}",
                    ty.name, member.name, v
                ))
            })?,
        };
        values.push((member.name.as_str(), value));
        next = value.checked_add(1);
    }

    Ok(values)
}

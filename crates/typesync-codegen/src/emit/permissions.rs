use typesync_core::{MemberKind, Result, TypeDef, TypesyncError};

use super::{quote, EmitContext};
use crate::writer::CodeWriter;

/// Emit a permission key group and its nested groups as `export namespace`
/// blocks of string constants.
pub fn emit(ty: &TypeDef, _ctx: &mut EmitContext<'_>, w: &mut CodeWriter) -> Result<()> {
    w.doc(ty.doc.as_deref());
    emit_group(ty, w)
}

fn emit_group(group: &TypeDef, w: &mut CodeWriter) -> Result<()> {
    w.in_brace(&format!("export namespace {}", group.name), |w| {
        for member in group.members.iter().filter(|m| m.kind == MemberKind::Constant) {
            let value = member
                .value
                .as_ref()
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    TypesyncError::extraction(format!(
                        "permission key {}.{} is not a string constant",
                        group.name, member.name
                    ))
                })?;
            w.doc(member.doc.as_deref());
            w.line(format!("export const {} = {};", member.name, quote(value)));
        }

        for nested in &group.nested {
            emit_group(nested, w)?;
        }
        Ok(())
    })
}

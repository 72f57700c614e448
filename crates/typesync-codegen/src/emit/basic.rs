use typesync_core::{Result, TypeDef, TypeRef, TypesyncError};

use super::EmitContext;
use crate::writer::CodeWriter;

/// Emit a plain interface with optional members.
pub fn emit(ty: &TypeDef, ctx: &mut EmitContext<'_>, w: &mut CodeWriter) -> Result<()> {
    let mut header = format!("export interface {}", ty.name);
    if !ty.generic_params.is_empty() {
        header.push_str(&format!("<{}>", ty.generic_params.join(", ")));
    }
    if let Some(base) = extends(ty, ctx)? {
        header.push_str(&format!(" extends {}", base));
    }

    let mut members = Vec::new();
    for member in ty.properties() {
        members.push((member, ctx.type_name(&member.type_ref)));
    }

    w.doc(ty.doc.as_deref());
    w.in_brace(&header, |w| {
        for (member, type_name) in &members {
            w.doc(member.doc.as_deref());
            w.line(format!("{}?: {};", member.name, type_name));
        }
        Ok(())
    })
}

fn extends(ty: &TypeDef, ctx: &mut EmitContext<'_>) -> Result<Option<String>> {
    match &ty.base {
        None | Some(TypeRef::Object) => Ok(None),
        Some(TypeRef::Named { name, args }) => ctx.reference(name, args).map(Some).ok_or_else(|| {
            TypesyncError::extraction(format!(
                "base type {} of {} cannot be resolved",
                name,
                ty.full_name()
            ))
        }),
        Some(other) => Err(TypesyncError::extraction(format!(
            "{} cannot extend {}",
            ty.full_name(),
            other
        ))),
    }
}

use typesync_core::{Result, TypeDef, TypeRef};

use super::{quote, EmitContext, Library};
use crate::classify::{COLUMNS_SCRIPT, COMPONENT_MODEL};
use crate::writer::CodeWriter;

const BASED_ON_ROW: &str = "BasedOnRowAttribute";

/// Emit a column list interface and its keyed columns class.
pub fn emit(
    ty: &TypeDef,
    identifier: &str,
    ctx: &mut EmitContext<'_>,
    w: &mut CodeWriter,
) -> Result<()> {
    let columns_key = match ty.attr(COMPONENT_MODEL, COLUMNS_SCRIPT) {
        Some(attr) => attr.string_arg(&["0", "key"])?.map(str::to_string),
        None => None,
    }
    .unwrap_or_else(|| ty.full_name());

    let row_type = match ty.attr(COMPONENT_MODEL, BASED_ON_ROW) {
        Some(attr) => attr
            .string_arg(&["0", "rowType"])?
            .map(|row| ctx.type_name(&TypeRef::named(row))),
        None => None,
    }
    .unwrap_or_else(|| "any".to_string());

    let column = ctx.lib(Library::Grid, "Column");
    let columns_base = ctx.lib(Library::Core, "ColumnsBase");
    let names: Vec<&str> = ty.properties().map(|m| m.name.as_str()).collect();

    w.doc(ty.doc.as_deref());
    w.in_brace(&format!("export interface {}", identifier), |w| {
        for name in &names {
            w.line(format!("{}: {}<{}>;", name, column, row_type));
        }
        Ok(())
    })?;
    w.blank();
    w.in_brace(
        &format!("export class {} extends {}<{}>", identifier, columns_base, row_type),
        |w| {
            w.line(format!("static readonly columnsKey = {};", quote(&columns_key)));
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use typesync_core::{AttrDef, MemberDef, TypeDef, TypeRef};

    use crate::emit::test_support::render;
    use crate::output::OutputMode;

    fn customer_columns() -> TypeDef {
        let mut def = TypeDef::new("Acme.Northwind", "CustomerColumns");
        def.attributes.push(
            AttrDef::new("Serenity.ComponentModel", "ColumnsScriptAttribute")
                .with_arg("0", "Northwind.Customer"),
        );
        def.attributes.push(
            AttrDef::new("Serenity.ComponentModel", "BasedOnRowAttribute")
                .with_arg("0", "Acme.Northwind.CustomerRow"),
        );
        def.members.push(MemberDef::property("CustomerID", TypeRef::String));
        def.members.push(MemberDef::property("CompanyName", TypeRef::String));
        def
    }

    #[test]
    fn test_columns_namespace_mode() {
        let (body, _) = render(
            vec![customer_columns(), TypeDef::new("Acme.Northwind", "CustomerRow")],
            "Acme.Northwind.CustomerColumns",
            OutputMode::Namespace,
        );

        assert!(body.contains("CustomerID: Slick.Column<CustomerRow>;"));
        assert!(body.contains(
            "export class CustomerColumns extends Serenity.ColumnsBase<CustomerRow> {\n    static readonly columnsKey = 'Northwind.Customer';"
        ));
    }

    #[test]
    fn test_columns_module_mode() {
        let (_, imports) = render(
            vec![customer_columns(), TypeDef::new("Acme.Northwind", "CustomerRow")],
            "Acme.Northwind.CustomerColumns",
            OutputMode::Module,
        );

        assert!(imports.contains("CustomerRow from ./CustomerRow"));
        assert!(imports.contains("ColumnsBase from @serenity-is/corelib"));
        assert!(imports.contains("Column from @serenity-is/sleekgrid"));
    }

    #[test]
    fn test_unresolved_row_is_any() {
        let (body, _) = render(
            vec![customer_columns()],
            "Acme.Northwind.CustomerColumns",
            OutputMode::Namespace,
        );
        assert!(body.contains("CompanyName: Slick.Column<any>;"));
    }
}

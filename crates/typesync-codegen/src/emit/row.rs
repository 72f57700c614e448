use typesync_core::{AttrDef, Result, TypeDef, TypesyncError};

use super::{quote, EmitContext};
use crate::classify::COMPONENT_MODEL;
use crate::output::OutputPaths;
use crate::writer::CodeWriter;

const DATA: &str = "Serenity.Data";
const MAPPING: &str = "Serenity.Data.Mapping";

const ID_PROPERTY: &str = "IdPropertyAttribute";
const NAME_PROPERTY: &str = "NamePropertyAttribute";
const NOT_MAPPED: &str = "NotMappedAttribute";
const LOCAL_TEXT_PREFIX: &str = "LocalTextPrefixAttribute";
const LOOKUP_SCRIPT: &str = "LookupScriptAttribute";
const MODULE: &str = "ModuleAttribute";

const READ_PERMISSION: &str = "ReadPermissionAttribute";
const MODIFY_PERMISSION: &str = "ModifyPermissionAttribute";
const INSERT_PERMISSION: &str = "InsertPermissionAttribute";
const UPDATE_PERMISSION: &str = "UpdatePermissionAttribute";
const DELETE_PERMISSION: &str = "DeletePermissionAttribute";

/// Row facts extracted once per row type and shared by every mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowMetadata {
    pub id_property: Option<String>,
    pub name_property: Option<String>,
    pub local_text_prefix: String,
    pub lookup_key: Option<String>,
    pub read_permission: Option<String>,
    pub insert_permission: Option<String>,
    pub update_permission: Option<String>,
    pub delete_permission: Option<String>,
    /// Mapped property names in declaration order.
    pub fields: Vec<String>,
}

/// Extract row metadata from attributes on the row and its properties.
pub fn extract_row_metadata(ty: &TypeDef, paths: &OutputPaths) -> Result<RowMetadata> {
    let default_key = default_key(ty, paths)?;

    let local_text_prefix = match ty.attr(COMPONENT_MODEL, LOCAL_TEXT_PREFIX) {
        Some(attr) => attr.string_arg(&["0", "value"])?.map(str::to_string),
        None => None,
    }
    .unwrap_or_else(|| default_key.clone());

    let lookup_key = match ty.attr(COMPONENT_MODEL, LOOKUP_SCRIPT) {
        Some(attr) => Some(
            attr.string_arg(&["0", "key"])?
                .map(str::to_string)
                .unwrap_or_else(|| default_key.clone()),
        ),
        None => None,
    };

    let modify = permission(ty, MODIFY_PERMISSION)?;

    Ok(RowMetadata {
        id_property: single_marked(ty, ID_PROPERTY)?,
        name_property: single_marked(ty, NAME_PROPERTY)?,
        local_text_prefix,
        lookup_key,
        read_permission: permission(ty, READ_PERMISSION)?,
        insert_permission: permission(ty, INSERT_PERMISSION)?.or_else(|| modify.clone()),
        update_permission: permission(ty, UPDATE_PERMISSION)?.or_else(|| modify.clone()),
        delete_permission: permission(ty, DELETE_PERMISSION)?.or(modify),
        fields: ty
            .properties()
            .filter(|m| m.attr(MAPPING, NOT_MAPPED).is_none())
            .map(|m| m.name.clone())
            .collect(),
    })
}

/// `<module>.<row name without "Row">`, where the module comes from a
/// `Module` attribute or the last segment of the relative namespace.
fn default_key(ty: &TypeDef, paths: &OutputPaths) -> Result<String> {
    let module = match ty.attr(COMPONENT_MODEL, MODULE) {
        Some(attr) => attr.string_arg(&["0", "value"])?.map(str::to_string),
        None => None,
    }
    .or_else(|| {
        paths
            .relative_namespace(&ty.namespace)
            .rsplit('.')
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    });

    let stem = ty.name.strip_suffix("Row").unwrap_or(&ty.name);
    Ok(match module {
        Some(module) => format!("{}.{}", module, stem),
        None => stem.to_string(),
    })
}

/// The one property carrying `marker`, if any. More than one is malformed.
fn single_marked(ty: &TypeDef, marker: &str) -> Result<Option<String>> {
    let marked: Vec<&str> = ty
        .properties()
        .filter(|m| m.attr(MAPPING, marker).is_some())
        .map(|m| m.name.as_str())
        .collect();

    match marked.as_slice() {
        [] => Ok(None),
        [one] => Ok(Some(one.to_string())),
        many => Err(TypesyncError::extraction(format!(
            "row {} has {} properties marked with {}: {}",
            ty.full_name(),
            many.len(),
            marker,
            many.join(", ")
        ))),
    }
}

fn permission(ty: &TypeDef, name: &str) -> Result<Option<String>> {
    ty.attr(DATA, name)
        .map(|attr: &AttrDef| attr.string_arg(&["0", "permission"]))
        .transpose()
        .map(Option::flatten)
        .map(|p| p.map(str::to_string))
}

/// Emit the row interface with every member optional.
pub fn emit_row(ty: &TypeDef, ctx: &mut EmitContext<'_>, w: &mut CodeWriter) -> Result<()> {
    let mut members = Vec::new();
    for member in ty.properties() {
        members.push((member, ctx.type_name(&member.type_ref)));
    }

    w.doc(ty.doc.as_deref());
    w.in_brace(&format!("export interface {}", ty.name), |w| {
        for (member, type_name) in &members {
            w.doc(member.doc.as_deref());
            w.line(format!("{}?: {};", member.name, type_name));
        }
        Ok(())
    })
}

/// Emit the row metadata namespace merged with the row interface.
pub fn emit_row_metadata(ty: &TypeDef, meta: &RowMetadata, w: &mut CodeWriter) -> Result<()> {
    w.in_brace(&format!("export namespace {}", ty.name), |w| {
        let constants = [
            ("idProperty", meta.id_property.as_deref()),
            ("nameProperty", meta.name_property.as_deref()),
            ("localTextPrefix", Some(meta.local_text_prefix.as_str())),
            ("lookupKey", meta.lookup_key.as_deref()),
            ("readPermission", meta.read_permission.as_deref()),
            ("insertPermission", meta.insert_permission.as_deref()),
            ("updatePermission", meta.update_permission.as_deref()),
            ("deletePermission", meta.delete_permission.as_deref()),
        ];
        for (name, value) in constants {
            if let Some(value) = value {
                w.line(format!("export const {} = {};", name, quote(value)));
            }
        }

        w.blank();
        w.in_brace("export declare const enum Fields", |w| {
            w.comma_lines(meta.fields.iter().map(|f| format!("{} = {}", f, quote(f))));
            Ok(())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use typesync_core::{MemberDef, TypeRef};

    use crate::emit::test_support::render;
    use crate::output::OutputMode;

    fn customer_row() -> TypeDef {
        let mut def = TypeDef::new("Acme.Northwind", "CustomerRow");
        def.base = Some(TypeRef::from_type_string(
            "Serenity.Data.Row<Acme.Northwind.CustomerRow>",
        ));
        def.attributes.push(
            AttrDef::new("Serenity.Data", "ReadPermissionAttribute").with_arg("0", "Northwind:General"),
        );
        def.attributes.push(
            AttrDef::new("Serenity.Data", "ModifyPermissionAttribute").with_arg("0", "Northwind:Modify"),
        );
        def.attributes
            .push(AttrDef::new("Serenity.ComponentModel", "LookupScriptAttribute"));

        let mut id = MemberDef::property("CustomerID", TypeRef::String)
            .with_attr(AttrDef::new("Serenity.Data.Mapping", "IdPropertyAttribute"));
        id.doc = Some("Customer Id".to_string());
        def.members.push(id);
        def.members.push(
            MemberDef::property("CompanyName", TypeRef::String)
                .with_attr(AttrDef::new("Serenity.Data.Mapping", "NamePropertyAttribute")),
        );
        def.members.push(MemberDef::property(
            "Orders",
            TypeRef::from_type_string("List<Acme.Northwind.OrderRow>"),
        ));
        def.members.push(
            MemberDef::property("Scratch", TypeRef::Int32)
                .with_attr(AttrDef::new("Serenity.Data.Mapping", "NotMappedAttribute")),
        );
        def
    }

    fn order_row() -> TypeDef {
        let mut def = TypeDef::new("Acme.Northwind", "OrderRow");
        def.base = Some(TypeRef::from_type_string("Serenity.Data.Row<Acme.Northwind.OrderRow>"));
        def
    }

    #[test]
    fn test_extract_defaults() {
        let paths = OutputPaths::new(Some("Acme".to_string()));
        let meta = extract_row_metadata(&customer_row(), &paths).unwrap();

        assert_eq!(meta.id_property.as_deref(), Some("CustomerID"));
        assert_eq!(meta.name_property.as_deref(), Some("CompanyName"));
        assert_eq!(meta.local_text_prefix, "Northwind.Customer");
        assert_eq!(meta.lookup_key.as_deref(), Some("Northwind.Customer"));
        assert_eq!(meta.read_permission.as_deref(), Some("Northwind:General"));
        assert_eq!(meta.insert_permission.as_deref(), Some("Northwind:Modify"));
        assert_eq!(meta.delete_permission.as_deref(), Some("Northwind:Modify"));
        assert_eq!(meta.fields, vec!["CustomerID", "CompanyName", "Orders"]);
    }

    #[test]
    fn test_module_attribute_and_explicit_prefix() {
        let mut def = customer_row();
        def.attributes
            .push(AttrDef::new("Serenity.ComponentModel", "ModuleAttribute").with_arg("0", "Sales"));
        def.attributes.push(
            AttrDef::new("Serenity.ComponentModel", "LocalTextPrefixAttribute").with_arg("0", "Db.Customers"),
        );

        let meta = extract_row_metadata(&def, &OutputPaths::default()).unwrap();
        assert_eq!(meta.local_text_prefix, "Db.Customers");
        assert_eq!(meta.lookup_key.as_deref(), Some("Sales.Customer"));
    }

    #[test]
    fn test_two_id_properties_is_an_extraction_error() {
        let mut def = customer_row();
        def.members.push(
            MemberDef::property("AltId", TypeRef::Int32)
                .with_attr(AttrDef::new("Serenity.Data.Mapping", "IdPropertyAttribute")),
        );

        let err = extract_row_metadata(&def, &OutputPaths::default()).unwrap_err();
        assert!(matches!(err, TypesyncError::MetadataExtraction(_)));
    }

    #[test]
    fn test_row_with_metadata() {
        let (body, _) = render(
            vec![customer_row(), order_row()],
            "Acme.Northwind.CustomerRow",
            OutputMode::Namespace,
        );

        assert!(body.starts_with(
            "export interface CustomerRow {\n    /** Customer Id */\n    CustomerID?: string;\n"
        ));
        assert!(body.contains("    Orders?: OrderRow[];\n"));
        assert!(body.contains("}\n\nexport namespace CustomerRow {\n"));
        assert!(body.contains("    export const idProperty = 'CustomerID';\n"));
        assert!(body.contains("    export const lookupKey = 'Northwind.Customer';\n"));
        assert!(body.contains(
            "    export declare const enum Fields {\n        CustomerID = 'CustomerID',\n        CompanyName = 'CompanyName',\n        Orders = 'Orders'\n    }\n"
        ));
    }

    #[test]
    fn test_row_module_imports_referenced_rows() {
        let (_, imports) = render(
            vec![customer_row(), order_row()],
            "Acme.Northwind.CustomerRow",
            OutputMode::Module,
        );
        assert_eq!(imports, "OrderRow from ./OrderRow");
    }
}

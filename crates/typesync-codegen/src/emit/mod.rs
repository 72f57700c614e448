//! Declaration emitters, one per strategy.
//!
//! Each emitter writes the unwrapped declaration for one type. The
//! [`EmitContext`] hides the difference between namespace and module output:
//! it qualifies or imports library symbols and references to other generated
//! types.

mod basic;
mod columns;
mod enums;
mod form;
mod permissions;
mod row;
mod service;

pub use row::{extract_row_metadata, RowMetadata};

use std::collections::{BTreeMap, BTreeSet};

use typesync_core::{Result, TypeDef, TypeRef, TypeSource};

use crate::classify::{Selection, Strategy};
use crate::output::{Imports, OutputMode, OutputPaths};
use crate::writer::CodeWriter;

/// Client-side library a symbol is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Library {
    /// Core widgets, services and decorators.
    Core,
    /// Grid column types.
    Grid,
}

impl Library {
    /// Global namespace used in namespace mode.
    pub fn namespace(&self) -> &'static str {
        match self {
            Library::Core => "Serenity",
            Library::Grid => "Slick",
        }
    }

    /// Module specifier used in module mode.
    pub fn module(&self) -> &'static str {
        match self {
            Library::Core => "@serenity-is/corelib",
            Library::Grid => "@serenity-is/sleekgrid",
        }
    }
}

/// Server types with a fixed client-side counterpart in the core library.
const LIBRARY_TYPES: &[(&str, &str)] = &[
    ("Serenity.Services.ServiceRequest", "ServiceRequest"),
    ("Serenity.Services.ServiceResponse", "ServiceResponse"),
    ("Serenity.Services.SaveRequest", "SaveRequest"),
    ("Serenity.Services.SaveResponse", "SaveResponse"),
    ("Serenity.Services.RetrieveRequest", "RetrieveRequest"),
    ("Serenity.Services.RetrieveResponse", "RetrieveResponse"),
    ("Serenity.Services.ListRequest", "ListRequest"),
    ("Serenity.Services.ListResponse", "ListResponse"),
    ("Serenity.Services.DeleteRequest", "DeleteRequest"),
    ("Serenity.Services.DeleteResponse", "DeleteResponse"),
    ("Serenity.Services.UndeleteRequest", "UndeleteRequest"),
    ("Serenity.Services.UndeleteResponse", "UndeleteResponse"),
];

/// Per-(type, mode) emission state.
pub struct EmitContext<'a> {
    pub source: &'a dyn TypeSource,
    pub paths: &'a OutputPaths,
    pub mode: OutputMode,
    /// Type being emitted.
    pub current: &'a TypeDef,
    imports: Imports,
    referenced: BTreeSet<String>,
    /// Module-scope names in use, mapped to the symbol they bind.
    taken: BTreeMap<String, String>,
    /// Symbol identity to the local name it was bound under.
    bound: BTreeMap<String, String>,
}

impl<'a> EmitContext<'a> {
    pub fn new(
        source: &'a dyn TypeSource,
        paths: &'a OutputPaths,
        mode: OutputMode,
        current: &'a TypeDef,
    ) -> Self {
        let mut ctx = Self {
            source,
            paths,
            mode,
            current,
            imports: Imports::new(),
            referenced: BTreeSet::new(),
            taken: BTreeMap::new(),
            bound: BTreeMap::new(),
        };
        let own = current.full_name();
        ctx.taken.insert(current.name.clone(), own.clone());
        ctx.bound.insert(own, current.name.clone());
        for param in &current.generic_params {
            ctx.taken.insert(param.clone(), format!("<{}>", param));
        }
        ctx
    }

    /// Claim a name declared by the file itself, so imports never shadow it.
    pub fn reserve(&mut self, name: &str) {
        let own = self.current.full_name();
        self.taken.entry(name.to_string()).or_insert(own);
    }

    /// Reference a library symbol, importing it in module mode.
    pub fn lib(&mut self, library: Library, symbol: &str) -> String {
        match self.mode {
            OutputMode::Namespace => format!("{}.{}", library.namespace(), symbol),
            OutputMode::Module => {
                let identity = format!("{}:{}", library.module(), symbol);
                let prefix = library.namespace().to_string();
                self.import(library.module(), symbol, &identity, &prefix)
            }
        }
    }

    /// Import `name` from `specifier` and return its local name, aliased as
    /// `<prefix>_<name>` when another symbol already uses `name`.
    fn import(&mut self, specifier: &str, name: &str, identity: &str, prefix: &str) -> String {
        if let Some(local) = self.bound.get(identity) {
            return local.clone();
        }

        let mut local = name.to_string();
        if self.taken.contains_key(&local) {
            let alias = format!("{}_{}", prefix, name);
            local = alias.clone();
            let mut n = 2;
            while self.taken.contains_key(&local) {
                local = format!("{}{}", alias, n);
                n += 1;
            }
        }

        let entry = if local == name {
            name.to_string()
        } else {
            format!("{} as {}", name, local)
        };
        self.imports
            .entry(specifier.to_string())
            .or_default()
            .insert(entry);
        self.taken.insert(local.clone(), identity.to_string());
        self.bound.insert(identity.to_string(), local.clone());
        local
    }

    /// TypeScript spelling of a member type.
    pub fn type_name(&mut self, type_ref: &TypeRef) -> String {
        match type_ref {
            TypeRef::String | TypeRef::Guid | TypeRef::DateTime | TypeRef::TimeSpan => {
                "string".to_string()
            }
            TypeRef::Bytes => "string".to_string(),
            TypeRef::Int32 | TypeRef::Int64 | TypeRef::Double | TypeRef::Decimal => {
                "number".to_string()
            }
            TypeRef::Bool => "boolean".to_string(),
            TypeRef::Object => "any".to_string(),
            TypeRef::Option(inner) => self.type_name(inner),
            TypeRef::List(inner) => {
                let element = self.type_name(inner);
                if element.contains(' ') {
                    format!("({})[]", element)
                } else {
                    format!("{}[]", element)
                }
            }
            TypeRef::Map(_, value) => format!("{{ [key: string]: {} }}", self.type_name(value)),
            TypeRef::Named { name, args } => self.reference(name, args).unwrap_or_else(|| {
                tracing::debug!(
                    type_name = %self.current.full_name(),
                    reference = %name,
                    "Unresolved member type emitted as any"
                );
                "any".to_string()
            }),
        }
    }

    /// Reference a named type if it is a generic parameter, a library type or
    /// a type the source can resolve. `None` when it is none of these.
    pub fn reference(&mut self, name: &str, args: &[TypeRef]) -> Option<String> {
        if args.is_empty() && self.current.generic_params.iter().any(|p| p == name) {
            return Some(name.to_string());
        }

        let base = if let Some(&(_, symbol)) = LIBRARY_TYPES.iter().find(|(n, _)| *n == name) {
            self.lib(Library::Core, symbol)
        } else {
            let source = self.source;
            let target = source.resolve(name)?;
            self.local_reference(target)
        };

        if args.is_empty() {
            return Some(base);
        }
        let args: Vec<String> = args.iter().map(|a| self.type_name(a)).collect();
        Some(format!("{}<{}>", base, args.join(", ")))
    }

    fn local_reference(&mut self, target: &TypeDef) -> String {
        let current = self.current;
        if target.full_name() != current.full_name() {
            self.referenced.insert(target.full_name());
        }
        match self.mode {
            OutputMode::Namespace if target.namespace == current.namespace => target.name.clone(),
            OutputMode::Namespace => target.full_name(),
            OutputMode::Module => {
                let specifier = self.paths.module_specifier(
                    &current.namespace,
                    &target.namespace,
                    &target.name,
                );
                let prefix = match self.paths.relative_namespace(&target.namespace) {
                    "" => "Root".to_string(),
                    relative => relative.replace('.', "_"),
                };
                self.import(&specifier, &target.name, &target.full_name(), &prefix)
            }
        }
    }

    /// Relative namespace of the current type, for keys and URLs.
    pub fn relative_namespace(&self) -> &'a str {
        let (paths, current) = (self.paths, self.current);
        paths.relative_namespace(&current.namespace)
    }

    /// Full names of other generated types this declaration refers to.
    pub fn referenced(&self) -> &BTreeSet<String> {
        &self.referenced
    }

    pub fn into_imports(self) -> Imports {
        self.imports
    }
}

/// Emit one selected strategy for the context's current type.
pub fn emit(
    selection: &Selection,
    row_metadata: Option<&RowMetadata>,
    ctx: &mut EmitContext<'_>,
    w: &mut CodeWriter,
) -> Result<()> {
    let ty = ctx.current;
    ctx.reserve(&selection.identifier);
    match selection.strategy {
        Strategy::Enum => enums::emit(ty, ctx, w),
        Strategy::Service => service::emit(ty, &selection.identifier, ctx, w),
        Strategy::Form => form::emit(ty, &selection.identifier, ctx, w),
        Strategy::Columns => columns::emit(ty, &selection.identifier, ctx, w),
        Strategy::PermissionKeys => permissions::emit(ty, ctx, w),
        Strategy::Row => {
            row::emit_row(ty, ctx, w)?;
            if let Some(metadata) = row_metadata {
                w.blank();
                row::emit_row_metadata(ty, metadata, w)?;
            }
            Ok(())
        }
        Strategy::Basic => basic::emit(ty, ctx, w),
    }
}

/// Quote a string as a single-quoted TypeScript literal.
pub(crate) fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Words that cannot name a `const` or `namespace` declaration.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Whether `s` can be used as a bare TypeScript identifier.
pub(crate) fn is_identifier(s: &str) -> bool {
    if RESERVED_WORDS.contains(&s) {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
pub(crate) mod test_support {
    use typesync_core::{TypeDef, TypeRegistry, TypeSource};

    use super::{emit, EmitContext};
    use crate::classify::Classifier;
    use crate::output::{OutputMode, OutputPaths};
    use crate::writer::CodeWriter;

    /// Classify and emit `full_name` in `mode`, returning body and imports.
    pub fn render(types: Vec<TypeDef>, full_name: &str, mode: OutputMode) -> (String, String) {
        let registry: TypeRegistry = types.into_iter().collect();
        let paths = OutputPaths::new(Some("Acme".to_string()));
        let ty = registry.resolve(full_name).unwrap();
        let classification = Classifier::new(&registry, "Request").classify(ty).unwrap();
        let metadata = super::extract_row_metadata(ty, &paths).unwrap();

        let mut ctx = EmitContext::new(&registry, &paths, mode, ty);
        let mut w = CodeWriter::new();
        emit(classification.primary(), Some(&metadata), &mut ctx, &mut w).unwrap();

        let imports = ctx
            .into_imports()
            .into_iter()
            .map(|(spec, names)| {
                let names: Vec<String> = names.into_iter().collect();
                format!("{} from {}", names.join(", "), spec)
            })
            .collect::<Vec<_>>()
            .join("\n");
        (w.into_string(), imports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typesync_core::TypeRegistry;

    fn context_types() -> TypeRegistry {
        let mut order = TypeDef::new("Acme.Northwind", "OrderRow");
        order.base = Some(TypeRef::from_type_string("Serenity.Data.Row<Acme.Northwind.OrderRow>"));
        vec![
            TypeDef::new("Acme.Northwind", "CustomerRow"),
            order,
            TypeDef::new("Acme.Common", "Gender"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_primitive_mapping() {
        let registry = context_types();
        let paths = OutputPaths::default();
        let current = registry.resolve("Acme.Northwind.CustomerRow").unwrap();
        let mut ctx = EmitContext::new(&registry, &paths, OutputMode::Namespace, current);

        assert_eq!(ctx.type_name(&TypeRef::from_type_string("String")), "string");
        assert_eq!(ctx.type_name(&TypeRef::from_type_string("Option<Int32>")), "number");
        assert_eq!(ctx.type_name(&TypeRef::from_type_string("List<Boolean>")), "boolean[]");
        assert_eq!(
            ctx.type_name(&TypeRef::from_type_string("Map<String, Decimal>")),
            "{ [key: string]: number }"
        );
        assert_eq!(ctx.type_name(&TypeRef::from_type_string("Unknown.Thing")), "any");
    }

    #[test]
    fn test_namespace_mode_qualifies_foreign_types() {
        let registry = context_types();
        let paths = OutputPaths::default();
        let current = registry.resolve("Acme.Northwind.CustomerRow").unwrap();
        let mut ctx = EmitContext::new(&registry, &paths, OutputMode::Namespace, current);

        assert_eq!(ctx.type_name(&TypeRef::named("Acme.Northwind.OrderRow")), "OrderRow");
        assert_eq!(ctx.type_name(&TypeRef::named("Acme.Common.Gender")), "Acme.Common.Gender");
        assert_eq!(
            ctx.type_name(&TypeRef::from_type_string(
                "Serenity.Services.ListResponse<Acme.Northwind.OrderRow>"
            )),
            "Serenity.ListResponse<OrderRow>"
        );
        assert!(ctx.referenced().contains("Acme.Common.Gender"));
        assert!(ctx.into_imports().is_empty());
    }

    #[test]
    fn test_module_mode_imports() {
        let registry = context_types();
        let paths = OutputPaths::new(Some("Acme".to_string()));
        let current = registry.resolve("Acme.Northwind.CustomerRow").unwrap();
        let mut ctx = EmitContext::new(&registry, &paths, OutputMode::Module, current);

        assert_eq!(ctx.type_name(&TypeRef::named("Acme.Common.Gender")), "Gender");
        assert_eq!(ctx.type_name(&TypeRef::named("Acme.Northwind.CustomerRow")), "CustomerRow");
        assert_eq!(ctx.lib(Library::Core, "StringEditor"), "StringEditor");

        let imports = ctx.into_imports();
        assert!(imports["../Common/Gender"].contains("Gender"));
        assert!(imports["@serenity-is/corelib"].contains("StringEditor"));
        // no self-import
        assert_eq!(imports.len(), 2);
    }

    #[test]
    fn test_generic_params_resolve_by_name() {
        let mut generic = TypeDef::new("Acme", "Page");
        generic.generic_params.push("T".to_string());
        let registry: TypeRegistry = vec![generic].into_iter().collect();
        let paths = OutputPaths::default();
        let current = registry.resolve("Acme.Page").unwrap();
        let mut ctx = EmitContext::new(&registry, &paths, OutputMode::Namespace, current);

        assert_eq!(ctx.type_name(&TypeRef::from_type_string("List<T>")), "T[]");
    }

    #[test]
    fn test_module_mode_aliases_clashing_names() {
        let registry: TypeRegistry = vec![
            TypeDef::new("Acme.Orders", "Holder"),
            TypeDef::new("Acme.Common", "Status"),
            TypeDef::new("Acme.Orders", "Status"),
            TypeDef::new("Acme.Common", "Holder"),
        ]
        .into_iter()
        .collect();
        let paths = OutputPaths::new(Some("Acme".to_string()));
        let current = registry.resolve("Acme.Orders.Holder").unwrap();
        let mut ctx = EmitContext::new(&registry, &paths, OutputMode::Module, current);

        assert_eq!(ctx.type_name(&TypeRef::named("Acme.Common.Status")), "Status");
        assert_eq!(ctx.type_name(&TypeRef::named("Acme.Orders.Status")), "Orders_Status");
        assert_eq!(ctx.type_name(&TypeRef::named("Acme.Orders.Status")), "Orders_Status");
        assert_eq!(ctx.type_name(&TypeRef::named("Acme.Common.Holder")), "Common_Holder");
        assert_eq!(ctx.type_name(&TypeRef::named("Acme.Orders.Holder")), "Holder");

        let imports = ctx.into_imports();
        assert_eq!(imports["../Common/Status"].len(), 1);
        assert!(imports["../Common/Status"].contains("Status"));
        assert!(imports["./Status"].contains("Status as Orders_Status"));
        assert!(imports["../Common/Holder"].contains("Holder as Common_Holder"));
        assert_eq!(imports.len(), 3);
    }

    #[test]
    fn test_reserved_identifier_is_not_shadowed() {
        let registry: TypeRegistry = vec![
            TypeDef::new("Acme.Northwind", "CustomerRequest"),
            TypeDef::new("Acme.Common", "CustomerForm"),
        ]
        .into_iter()
        .collect();
        let paths = OutputPaths::new(Some("Acme".to_string()));
        let current = registry.resolve("Acme.Northwind.CustomerRequest").unwrap();
        let mut ctx = EmitContext::new(&registry, &paths, OutputMode::Module, current);
        ctx.reserve("CustomerForm");

        assert_eq!(
            ctx.type_name(&TypeRef::named("Acme.Common.CustomerForm")),
            "Common_CustomerForm"
        );
    }

    #[test]
    fn test_helpers() {
        assert_eq!(quote("it's"), "'it\\'s'");
        assert!(is_identifier("Title"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("has-dash"));
        assert!(!is_identifier("delete"));
        assert!(is_identifier("Delete"));
    }
}

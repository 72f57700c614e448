use std::fmt;

use serde::{Deserialize, Serialize};

/// A reference to a type as it appears in server metadata.
///
/// Serialized as its compact string form, e.g. `List<Acme.Northwind.OrderRow>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeRef {
    /// Text
    String,
    /// Globally unique identifier
    Guid,
    /// 32-bit integer (and narrower)
    Int32,
    /// 64-bit integer
    Int64,
    /// Binary floating point
    Double,
    /// Decimal number
    Decimal,
    /// Boolean
    Bool,
    /// Date and time
    DateTime,
    /// Duration
    TimeSpan,
    /// Untyped value
    #[default]
    Object,
    /// Byte array
    Bytes,
    /// Nullable wrapper
    Option(Box<TypeRef>),
    /// Sequence wrapper
    List(Box<TypeRef>),
    /// Keyed map
    Map(Box<TypeRef>, Box<TypeRef>),
    /// Any other type, by dotted full name, with generic arguments
    Named { name: String, args: Vec<TypeRef> },
}

impl TypeRef {
    /// Shorthand for a non-generic named reference.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Parse a type string into a TypeRef.
    pub fn from_type_string(type_str: &str) -> Self {
        let s = type_str.trim();

        if let Some(element) = s.strip_suffix("[]") {
            return match element.trim() {
                "Byte" | "System.Byte" | "u8" => TypeRef::Bytes,
                inner => TypeRef::List(Box::new(TypeRef::from_type_string(inner))),
            };
        }

        let (raw_base, args) = split_generic(s);
        let base = raw_base.strip_prefix("System.").unwrap_or(raw_base);

        match (base, args.len()) {
            ("String" | "string" | "Char", 0) => TypeRef::String,
            ("Guid", 0) => TypeRef::Guid,
            ("Int32" | "Int16" | "Byte" | "SByte" | "UInt16" | "UInt32" | "int" | "i32", 0) => {
                TypeRef::Int32
            }
            ("Int64" | "UInt64" | "long" | "i64", 0) => TypeRef::Int64,
            ("Double" | "Single" | "double" | "float" | "f64" | "f32", 0) => TypeRef::Double,
            ("Decimal" | "decimal", 0) => TypeRef::Decimal,
            ("Boolean" | "Bool" | "bool", 0) => TypeRef::Bool,
            ("DateTime" | "DateTimeOffset" | "DateOnly", 0) => TypeRef::DateTime,
            ("TimeSpan" | "TimeOnly", 0) => TypeRef::TimeSpan,
            ("Object" | "object", 0) => TypeRef::Object,
            ("Bytes", 0) => TypeRef::Bytes,
            ("Option" | "Nullable", 1) => {
                TypeRef::Option(Box::new(TypeRef::from_type_string(args[0])))
            }
            (
                "List" | "Vec" | "IList" | "IEnumerable" | "ICollection" | "IReadOnlyList"
                | "Collections.Generic.List" | "Collections.Generic.IEnumerable",
                1,
            ) => TypeRef::List(Box::new(TypeRef::from_type_string(args[0]))),
            (
                "Map" | "Dictionary" | "IDictionary" | "Collections.Generic.Dictionary",
                2,
            ) => TypeRef::Map(
                Box::new(TypeRef::from_type_string(args[0])),
                Box::new(TypeRef::from_type_string(args[1])),
            ),
            _ => TypeRef::Named {
                name: strip_arity(raw_base).to_string(),
                args: args.into_iter().map(TypeRef::from_type_string).collect(),
            },
        }
    }

    /// Strip nullable and sequence wrappers down to the element type.
    pub fn element(&self) -> &TypeRef {
        match self {
            TypeRef::Option(inner) | TypeRef::List(inner) => inner.element(),
            other => other,
        }
    }

    /// All named types referenced anywhere in this reference, in order.
    pub fn named_refs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_named(&mut out);
        out
    }

    fn collect_named<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeRef::Option(inner) | TypeRef::List(inner) => inner.collect_named(out),
            TypeRef::Map(key, value) => {
                key.collect_named(out);
                value.collect_named(out);
            }
            TypeRef::Named { name, args } => {
                out.push(name);
                for arg in args {
                    arg.collect_named(out);
                }
            }
            _ => {}
        }
    }
}

/// Split `Name<A, B<C>>` into `("Name", ["A", "B<C>"])`.
fn split_generic(s: &str) -> (&str, Vec<&str>) {
    let Some(open) = s.find('<') else {
        return (s, Vec::new());
    };
    let Some(body) = s[open + 1..].strip_suffix('>') else {
        return (s, Vec::new());
    };

    let mut args = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                args.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(body[start..].trim());

    (s[..open].trim(), args)
}

/// `Row`1` and `Row` name the same generic definition.
fn strip_arity(name: &str) -> &str {
    name.split('`').next().unwrap_or(name)
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::String => write!(f, "String"),
            TypeRef::Guid => write!(f, "Guid"),
            TypeRef::Int32 => write!(f, "Int32"),
            TypeRef::Int64 => write!(f, "Int64"),
            TypeRef::Double => write!(f, "Double"),
            TypeRef::Decimal => write!(f, "Decimal"),
            TypeRef::Bool => write!(f, "Boolean"),
            TypeRef::DateTime => write!(f, "DateTime"),
            TypeRef::TimeSpan => write!(f, "TimeSpan"),
            TypeRef::Object => write!(f, "Object"),
            TypeRef::Bytes => write!(f, "Bytes"),
            TypeRef::Option(inner) => write!(f, "Option<{}>", inner),
            TypeRef::List(inner) => write!(f, "List<{}>", inner),
            TypeRef::Map(key, value) => write!(f, "Map<{}, {}>", key, value),
            TypeRef::Named { name, args } if args.is_empty() => write!(f, "{}", name),
            TypeRef::Named { name, args } => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{}<{}>", name, args.join(", "))
            }
        }
    }
}

impl From<String> for TypeRef {
    fn from(s: String) -> Self {
        TypeRef::from_type_string(&s)
    }
}

impl From<TypeRef> for String {
    fn from(t: TypeRef) -> Self {
        t.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_parsing() {
        assert_eq!(TypeRef::from_type_string("String"), TypeRef::String);
        assert_eq!(TypeRef::from_type_string("System.Int32"), TypeRef::Int32);
        assert_eq!(
            TypeRef::from_type_string("Nullable<Int32>"),
            TypeRef::Option(Box::new(TypeRef::Int32))
        );
        assert_eq!(
            TypeRef::from_type_string("Acme.OrderRow[]"),
            TypeRef::List(Box::new(TypeRef::named("Acme.OrderRow")))
        );
        assert_eq!(TypeRef::from_type_string("Byte[]"), TypeRef::Bytes);
    }

    #[test]
    fn test_nested_generic_parsing() {
        let parsed = TypeRef::from_type_string("Serenity.Services.SaveRequest<Map<String, List<Acme.X>>>");
        let TypeRef::Named { name, args } = &parsed else {
            panic!("expected named type, got {:?}", parsed);
        };
        assert_eq!(name, "Serenity.Services.SaveRequest");
        assert_eq!(args.len(), 1);
        assert_eq!(parsed.named_refs(), vec!["Serenity.Services.SaveRequest", "Acme.X"]);
    }

    #[test]
    fn test_arity_suffix_is_dropped() {
        assert_eq!(
            TypeRef::from_type_string("Serenity.Data.Row`1"),
            TypeRef::named("Serenity.Data.Row")
        );
    }

    #[test]
    fn test_display_is_parseable() {
        let original = TypeRef::from_type_string("Map<String, Option<Acme.Gender>>");
        assert_eq!(original.to_string(), "Map<String, Option<Acme.Gender>>");
        assert_eq!(TypeRef::from_type_string(&original.to_string()), original);
    }

    #[test]
    fn test_element_unwraps_wrappers() {
        let t = TypeRef::from_type_string("Option<List<Acme.OrderRow>>");
        assert_eq!(t.element(), &TypeRef::named("Acme.OrderRow"));
    }
}

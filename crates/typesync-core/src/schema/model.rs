use serde::{Deserialize, Serialize};

use super::attribute::{find_attr, AttrDef};
use super::types::TypeRef;

/// Kind of a type definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Enum,
    Interface,
}

/// A type definition supplied by the metadata source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    /// Dotted namespace, possibly empty.
    #[serde(default)]
    pub namespace: String,

    /// Simple type name, without generic arity.
    pub name: String,

    #[serde(default)]
    pub kind: TypeKind,

    /// Direct base type, if any.
    #[serde(default)]
    pub base: Option<TypeRef>,

    /// Generic parameter names of a generic definition.
    #[serde(default)]
    pub generic_params: Vec<String>,

    /// Ordered members.
    #[serde(default)]
    pub members: Vec<MemberDef>,

    #[serde(default)]
    pub attributes: Vec<AttrDef>,

    /// Nested type definitions (permission key groups).
    #[serde(default)]
    pub nested: Vec<TypeDef>,

    /// Documentation comment.
    #[serde(default)]
    pub doc: Option<String>,
}

impl TypeDef {
    /// Create a new class definition.
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind: TypeKind::Class,
            base: None,
            generic_params: Vec::new(),
            members: Vec::new(),
            attributes: Vec::new(),
            nested: Vec::new(),
            doc: None,
        }
    }

    /// Dotted full name, the identity used for lookups and deduplication.
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    /// Find an attribute on this type.
    pub fn attr(&self, namespace: &str, name: &str) -> Option<&AttrDef> {
        find_attr(&self.attributes, namespace, name)
    }

    /// Members that describe data shape (properties and fields).
    pub fn properties(&self) -> impl Iterator<Item = &MemberDef> {
        self.members
            .iter()
            .filter(|m| m.kind == MemberKind::Property)
    }

    /// Methods (endpoint actions on controllers).
    pub fn methods(&self) -> impl Iterator<Item = &MemberDef> {
        self.members.iter().filter(|m| m.kind == MemberKind::Method)
    }
}

/// Kind of a member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    #[default]
    Property,
    Method,
    Constant,
}

/// A member of a type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDef {
    pub name: String,

    #[serde(default)]
    pub kind: MemberKind,

    /// Property type, or return type for methods.
    #[serde(rename = "type", default)]
    pub type_ref: TypeRef,

    /// Method parameters.
    #[serde(default)]
    pub params: Vec<ParamDef>,

    /// Constant value (enum values, permission keys).
    #[serde(default)]
    pub value: Option<serde_json::Value>,

    #[serde(default)]
    pub attributes: Vec<AttrDef>,

    #[serde(default)]
    pub doc: Option<String>,
}

impl MemberDef {
    /// Create a property member.
    pub fn property(name: &str, type_ref: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            kind: MemberKind::Property,
            type_ref,
            params: Vec::new(),
            value: None,
            attributes: Vec::new(),
            doc: None,
        }
    }

    /// Create a constant member.
    pub fn constant(name: &str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            kind: MemberKind::Constant,
            value: Some(value.into()),
            ..Self::property(name, TypeRef::Object)
        }
    }

    /// Create a method member with a single request parameter.
    pub fn method(name: &str, request: TypeRef, response: TypeRef) -> Self {
        Self {
            kind: MemberKind::Method,
            params: vec![ParamDef {
                name: "request".to_string(),
                type_ref: request,
            }],
            ..Self::property(name, response)
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, attr: AttrDef) -> Self {
        self.attributes.push(attr);
        self
    }

    /// Find an attribute on this member.
    pub fn attr(&self, namespace: &str, name: &str) -> Option<&AttrDef> {
        find_attr(&self.attributes, namespace, name)
    }
}

/// A method parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
}

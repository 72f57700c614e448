use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypesyncError};

/// An attribute annotation attached to a type or member.
///
/// Positional constructor arguments are keyed `"0"`, `"1"`, and so on;
/// named arguments use their property name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrDef {
    /// Namespace declaring the attribute class.
    #[serde(default)]
    pub namespace: String,

    /// Attribute class name, e.g. `FormScriptAttribute`.
    pub name: String,

    /// Keyed arguments.
    #[serde(default)]
    pub args: BTreeMap<String, serde_json::Value>,
}

impl AttrDef {
    /// Create an attribute with no arguments.
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            args: BTreeMap::new(),
        }
    }

    /// Builder-style argument setter.
    pub fn with_arg(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.args.insert(key.to_string(), value.into());
        self
    }

    /// Check whether this is the attribute `namespace.name`.
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }

    /// First present string argument among `keys`.
    ///
    /// A present argument that is not a string (or null) is malformed.
    pub fn string_arg(&self, keys: &[&str]) -> Result<Option<&str>> {
        for key in keys {
            match self.args.get(*key) {
                None | Some(serde_json::Value::Null) => continue,
                Some(serde_json::Value::String(s)) => return Ok(Some(s)),
                Some(other) => {
                    return Err(TypesyncError::extraction(format!(
                        "argument `{}` of {} must be a string, found {}",
                        key, self.name, other
                    )))
                }
            }
        }
        Ok(None)
    }
}

/// Find the first attribute named `namespace.name`.
pub fn find_attr<'a>(attrs: &'a [AttrDef], namespace: &str, name: &str) -> Option<&'a AttrDef> {
    attrs.iter().find(|a| a.is(namespace, name))
}

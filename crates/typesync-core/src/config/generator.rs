use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Flags and naming conventions for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Emit the local text catalog.
    #[serde(default)]
    pub local_texts: bool,

    /// Emit per-namespace re-export files (module typings only).
    #[serde(default = "default_true")]
    pub module_re_exports: bool,

    /// Emit module-scoped declarations.
    #[serde(default)]
    pub module_typings: bool,

    /// Emit namespace-scoped declarations.
    #[serde(default = "default_true")]
    pub namespace_typings: bool,

    /// Package prefixes selecting local text keys. Empty means all.
    #[serde(default)]
    pub local_text_filters: BTreeSet<String>,

    /// Suffix stripped from request-shaped form types.
    #[serde(default = "default_request_suffix")]
    pub request_suffix: String,

    /// Namespace prefix stripped when computing output paths.
    #[serde(default)]
    pub root_namespace: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            local_texts: false,
            module_re_exports: default_true(),
            module_typings: false,
            namespace_typings: default_true(),
            local_text_filters: BTreeSet::new(),
            request_suffix: default_request_suffix(),
            root_namespace: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_request_suffix() -> String {
    "Request".to_string()
}

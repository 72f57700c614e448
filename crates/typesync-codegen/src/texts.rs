//! Local text catalog declarations and package filter loading.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use typesync_core::{Result, TypesyncError};

use crate::emit::{is_identifier, Library};
use crate::output::{Chunk, Imports, OutputMode, OutputPaths};
use crate::writer::CodeWriter;

/// Owner recorded on text catalog files.
pub const TEXTS_OWNER: &str = "<texts>";

const PACKAGES_KEY: &str = "LocalTextPackages";
const APP_SETTINGS_KEY: &str = "AppSettings";

/// Read the package prefixes from a settings document.
///
/// `LocalTextPackages` is looked up at the top level, then under
/// `AppSettings`. Every string found beneath it is a prefix.
pub fn local_text_packages(settings: &str) -> Result<Vec<String>> {
    let document: Value = serde_json::from_str(settings)
        .map_err(|e| TypesyncError::SettingsLoad(format!("Failed to parse settings: {}", e)))?;

    let packages = document
        .get(PACKAGES_KEY)
        .or_else(|| document.get(APP_SETTINGS_KEY)?.get(PACKAGES_KEY))
        .ok_or_else(|| {
            TypesyncError::SettingsLoad(format!("{} not found in settings", PACKAGES_KEY))
        })?;

    let mut prefixes = Vec::new();
    collect_strings(packages, &mut prefixes);
    Ok(prefixes)
}

fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

/// Whether `key` is selected by `filters`. An empty filter set selects all.
pub fn is_selected(key: &str, filters: &BTreeSet<String>) -> bool {
    filters.is_empty() || filters.iter().any(|prefix| key.starts_with(prefix.as_str()))
}

#[derive(Debug, Default)]
struct TextNode {
    children: BTreeMap<String, TextNode>,
}

impl TextNode {
    fn insert(&mut self, segments: &[&str]) {
        if let Some((first, rest)) = segments.split_first() {
            self.children
                .entry(first.to_string())
                .or_default()
                .insert(rest);
        }
    }

    /// Proxy structure: `1` for leaves, nested objects for groups.
    fn structure(&self) -> Value {
        let map: Map<String, Value> = self
            .children
            .iter()
            .map(|(name, node)| {
                let value = if node.children.is_empty() {
                    Value::from(1)
                } else {
                    node.structure()
                };
                (name.clone(), value)
            })
            .collect();
        Value::Object(map)
    }

    fn declare(&self, w: &mut CodeWriter) -> Result<()> {
        for (name, node) in &self.children {
            if node.children.is_empty() {
                w.line(format!("export const {}: string;", name));
            } else {
                w.in_brace(&format!("namespace {}", name), |w| node.declare(w))?;
            }
        }
        Ok(())
    }
}

/// Build the key tree from the selected text keys.
///
/// Keys with a segment that is not a valid identifier, or is a reserved
/// word, are skipped. A key
/// that is also the prefix of another key is declared as a group only.
fn build_tree<'k>(keys: impl IntoIterator<Item = &'k str>, filters: &BTreeSet<String>) -> TextNode {
    let mut root = TextNode::default();
    let mut selected = 0usize;
    for key in keys {
        if !is_selected(key, filters) {
            continue;
        }
        let segments: Vec<&str> = key.split('.').collect();
        if !segments.iter().all(|s| is_identifier(s)) {
            tracing::debug!(key = %key, "Skipping text key that is not a valid identifier path");
            continue;
        }
        root.insert(&segments);
        selected += 1;
    }
    tracing::debug!(selected, filters = filters.len(), "Built local text tree");
    root
}

/// Stage the text catalog declaration for one mode.
pub fn text_chunk<'k>(
    keys: impl IntoIterator<Item = &'k str>,
    filters: &BTreeSet<String>,
    paths: &OutputPaths,
    root_namespace: Option<&str>,
    mode: OutputMode,
) -> Result<Chunk> {
    let tree = build_tree(keys, filters);
    let structure = serde_json::to_string(&tree.structure())?;

    let mut imports = Imports::new();
    let proxy = match mode {
        OutputMode::Namespace => format!("{}.proxyTexts", Library::Core.namespace()),
        OutputMode::Module => {
            imports
                .entry(Library::Core.module().to_string())
                .or_default()
                .insert("proxyTexts".to_string());
            "proxyTexts".to_string()
        }
    };

    let write_body = |w: &mut CodeWriter| -> Result<()> {
        w.in_brace("declare namespace texts", |w| tree.declare(w))?;
        w.blank();
        w.line(format!(
            "export const Texts: typeof texts = {}({{}}, '', {}) as any;",
            proxy, structure
        ));
        Ok(())
    };

    let mut w = CodeWriter::new();
    match mode {
        OutputMode::Namespace => {
            let wrapper = root_namespace.filter(|r| !r.is_empty()).unwrap_or("ServerTypes");
            w.in_brace(&format!("namespace {}", wrapper), write_body)?;
        }
        OutputMode::Module => write_body(&mut w)?,
    }

    Ok(Chunk {
        path: paths.texts_path(mode),
        mode,
        owner: TEXTS_OWNER.to_string(),
        namespace: String::new(),
        identifier: "Texts".to_string(),
        exportable: false,
        imports,
        body: w.into_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> Vec<&'static str> {
        vec!["Site.Title", "Site.Dashboard.Header", "Admin.Label", "Bad-Key.Text"]
    }

    #[test]
    fn test_packages_at_top_level() {
        let prefixes = local_text_packages(r#"{"LocalTextPackages": {"p1": "Site"}}"#).unwrap();
        assert_eq!(prefixes, vec!["Site"]);
    }

    #[test]
    fn test_packages_under_app_settings() {
        let prefixes = local_text_packages(
            r#"{"AppSettings": {"LocalTextPackages": {"p1": ["Site.", "Db."], "p2": "Forms."}}}"#,
        )
        .unwrap();
        assert_eq!(prefixes, vec!["Site.", "Db.", "Forms."]);
    }

    #[test]
    fn test_unparseable_or_missing_settings() {
        let err = local_text_packages("{ not json").unwrap_err();
        assert!(matches!(err, TypesyncError::SettingsLoad(_)));

        let err = local_text_packages(r#"{"Other": 1}"#).unwrap_err();
        assert!(matches!(err, TypesyncError::SettingsLoad(_)));
    }

    #[test]
    fn test_filtered_namespace_catalog() {
        let filters: BTreeSet<String> = ["Site".to_string()].into();
        let chunk = text_chunk(
            keys(),
            &filters,
            &OutputPaths::default(),
            Some("Acme"),
            OutputMode::Namespace,
        )
        .unwrap();

        assert_eq!(chunk.path, "ServerTypings/Texts.ts");
        assert!(chunk.body.starts_with("namespace Acme {\n    declare namespace texts {\n"));
        assert!(chunk.body.contains("export const Title: string;"));
        assert!(chunk.body.contains("namespace Dashboard {"));
        assert!(!chunk.body.contains("Admin"));
        assert!(chunk.body.contains(
            "Serenity.proxyTexts({}, '', {\"Site\":{\"Dashboard\":{\"Header\":1},\"Title\":1}}) as any;"
        ));
    }

    #[test]
    fn test_module_catalog_imports_proxy() {
        let chunk = text_chunk(
            keys(),
            &BTreeSet::new(),
            &OutputPaths::default(),
            None,
            OutputMode::Module,
        )
        .unwrap();

        assert_eq!(chunk.path, "ServerTypes/Texts.ts");
        assert!(chunk.body.starts_with("declare namespace texts {\n"));
        assert!(chunk.body.contains("namespace Admin {"));
        assert!(!chunk.body.contains("Bad-Key"));
        assert!(chunk.imports["@serenity-is/corelib"].contains("proxyTexts"));
    }

    #[test]
    fn test_reserved_word_keys_are_skipped() {
        let tree = build_tree(["Site.delete", "Forms.class.Title", "Site.Title"], &BTreeSet::new());
        let mut w = CodeWriter::new();
        tree.declare(&mut w).unwrap();
        let text = w.into_string();
        assert!(text.contains("export const Title: string;"));
        assert!(!text.contains("delete"));
        assert!(!text.contains("Forms"));
    }

    #[test]
    fn test_leaf_with_children_becomes_group() {
        let tree = build_tree(["Db.Customer", "Db.Customer.Name"], &BTreeSet::new());
        let mut w = CodeWriter::new();
        tree.declare(&mut w).unwrap();
        let text = w.into_string();
        assert!(text.contains("namespace Customer {"));
        assert!(!text.contains("export const Customer"));
    }
}

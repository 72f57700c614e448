//! JSON metadata documents and local text catalogs.

use std::path::Path;

use serde::{Deserialize, Serialize};
use typesync_core::{Result, TypeDef, TypeRegistry, TypesyncError};
use walkdir::WalkDir;

/// Type metadata extracted from one compiled unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Name of the compiled unit.
    pub unit: String,

    /// Types generated from this unit.
    #[serde(default)]
    pub types: Vec<TypeDef>,

    /// Types from dependencies, resolvable but not visited directly.
    #[serde(default)]
    pub references: Vec<TypeDef>,
}

impl MetadataDocument {
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| TypesyncError::Metadata(format!("Invalid metadata document: {}", e)))
    }
}

/// Load every `*.json` document under `dir`, in file name order.
///
/// Primary types of all units are registered before any reference type, so a
/// unit's own definition wins over another unit's reference copy.
pub fn load_metadata_dir(dir: &Path) -> Result<TypeRegistry> {
    if !dir.is_dir() {
        return Err(TypesyncError::Metadata(format!(
            "Metadata directory not found: {}",
            dir.display()
        )));
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| TypesyncError::Metadata(e.to_string()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            TypesyncError::Metadata(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let document = MetadataDocument::parse(&content).map_err(|e| {
            TypesyncError::Metadata(format!("{}: {}", path.display(), e))
        })?;
        documents.push(document);
    }

    let mut registry = TypeRegistry::new();
    let mut references = Vec::new();
    for document in documents {
        registry.register_unit(&document.unit, document.types);
        references.extend(document.references);
    }
    for def in references {
        registry.register_reference(def);
    }

    tracing::info!(
        types = registry.len(),
        references = registry.reference_count(),
        "Loaded type metadata"
    );
    Ok(registry)
}

/// Load the keys of a local text catalog, a JSON object of key to text.
///
/// Nested objects are flattened with dots.
pub fn load_local_texts(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let serde_json::Value::Object(map) = value else {
        return Err(TypesyncError::Serialization(format!(
            "Local text catalog {} is not a JSON object",
            path.display()
        )));
    };

    let mut keys = Vec::new();
    flatten_keys("", &map, &mut keys);
    Ok(keys)
}

fn flatten_keys(prefix: &str, map: &serde_json::Map<String, serde_json::Value>, out: &mut Vec<String>) {
    for (key, value) in map {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            serde_json::Value::Object(nested) => flatten_keys(&key, nested, out),
            serde_json::Value::String(_) => out.push(key),
            _ => tracing::debug!(key = %key, "Ignoring non-string local text"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use typesync_core::TypeSource;

    #[test]
    fn test_load_metadata_dir_in_file_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"{"unit": "B", "types": [{"namespace": "Acme", "name": "Second"}]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"unit": "A",
                "types": [{"namespace": "Acme", "name": "First"}],
                "references": [{"namespace": "Acme", "name": "Second"}, {"namespace": "Vendor", "name": "Gender", "kind": "enum"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let registry = load_metadata_dir(dir.path()).unwrap();
        let names: Vec<&str> = registry.types().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(registry.reference_count(), 1);
        assert!(registry.resolve("Vendor.Gender").unwrap().is_enum());
    }

    #[test]
    fn test_bad_document_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "{ broken").unwrap();

        let err = load_metadata_dir(dir.path()).unwrap_err();
        assert!(matches!(err, TypesyncError::Metadata(_)));
    }

    #[test]
    fn test_missing_dir_is_fatal() {
        let dir = tempdir().unwrap();
        let err = load_metadata_dir(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, TypesyncError::Metadata(_)));
    }

    #[test]
    fn test_load_local_texts_flattens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("texts.json");
        fs::write(
            &path,
            r#"{"Site.Title": "Home", "Db": {"Customer": {"Name": "Name"}}, "Count": 3}"#,
        )
        .unwrap();

        let mut keys = load_local_texts(&path).unwrap();
        keys.sort();
        assert_eq!(keys, vec!["Db.Customer.Name", "Site.Title"]);
    }
}

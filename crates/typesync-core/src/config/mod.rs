mod generator;

pub use generator::GeneratorConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TypesyncError};

/// Root configuration for typesync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypesyncConfig {
    /// Generation flags.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Input locations.
    #[serde(default)]
    pub input: InputConfig,

    /// Output location.
    #[serde(default)]
    pub output: OutputConfig,
}

impl TypesyncConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| TypesyncError::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content);

        toml::from_str(&content)
            .map_err(|e| TypesyncError::Config(format!("Failed to parse config: {}", e)))
    }
}

/// Where metadata, texts and settings are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory of JSON metadata documents, one per compiled unit.
    #[serde(default = "default_metadata_dir")]
    pub metadata: PathBuf,

    /// Local text catalog (JSON object of key to text).
    #[serde(default)]
    pub local_texts: Option<PathBuf>,

    /// Application settings document carrying `LocalTextPackages`.
    #[serde(default)]
    pub settings: Option<PathBuf>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            metadata: default_metadata_dir(),
            local_texts: None,
            settings: None,
        }
    }
}

fn default_metadata_dir() -> PathBuf {
    PathBuf::from("metadata")
}

/// Where generated files are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("Imports")
}

/// Substitute environment variables in the format ${VAR_NAME}.
fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let Ok(re) = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
        return result;
    };

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}

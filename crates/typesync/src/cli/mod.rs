mod classify;
mod generate;

pub use classify::ClassifyCommand;
pub use generate::GenerateCommand;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use typesync_core::TypesyncConfig;

/// typesync - TypeScript typings from server type metadata
#[derive(Parser)]
#[command(name = "typesync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generate declaration files.
    Generate(GenerateCommand),

    /// Show the strategy chosen for every type.
    Classify(ClassifyCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Generate(cmd) => cmd.execute().await,
            Commands::Classify(cmd) => cmd.execute().await,
        }
    }
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Configuration file.
    #[arg(short, long, default_value = "typesync.toml")]
    pub config: PathBuf,

    /// Directory of JSON metadata documents (overrides the config file).
    #[arg(short, long)]
    pub metadata: Option<PathBuf>,

    /// Namespace prefix stripped from output paths.
    #[arg(long)]
    pub root_namespace: Option<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}

impl CommonArgs {
    /// Load the config file if present, then apply command-line overrides.
    pub fn load_config(&self) -> Result<TypesyncConfig> {
        let mut config = if self.config.exists() {
            TypesyncConfig::from_file(&self.config)?
        } else {
            tracing::debug!(path = %self.config.display(), "No config file, using defaults");
            TypesyncConfig::default()
        };

        if let Some(metadata) = &self.metadata {
            config.input.metadata = metadata.clone();
        }
        if let Some(root) = &self.root_namespace {
            config.generator.root_namespace = Some(root.clone());
        }
        Ok(config)
    }

    /// Install the global tracing subscriber, writing to stderr.
    pub fn init_tracing(&self) {
        let level = if self.verbose { "debug" } else { "info" };
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        let installed = if self.json_logs {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        if installed.is_err() {
            tracing::debug!("Tracing subscriber already installed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parse_generate() {
        let cli = Cli::try_parse_from(["typesync", "generate", "--modules", "-o", "out"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_parse_classify() {
        let cli = Cli::try_parse_from(["typesync", "classify", "--json", "-m", "meta"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["typesync", "publish"]).is_err());
    }

    #[test]
    fn test_load_config_with_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("typesync.toml");
        std::fs::write(
            &path,
            "[generator]\nmodule_typings = true\nroot_namespace = \"Acme\"\n\n[input]\nmetadata = \"meta\"\n",
        )
        .unwrap();

        let args = CommonArgs {
            config: path,
            metadata: Some(PathBuf::from("other")),
            root_namespace: None,
            verbose: false,
            json_logs: false,
        };
        let config = args.load_config().unwrap();
        assert!(config.generator.module_typings);
        assert_eq!(config.generator.root_namespace.as_deref(), Some("Acme"));
        assert_eq!(config.input.metadata, PathBuf::from("other"));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let args = CommonArgs {
            config: dir.path().join("missing.toml"),
            metadata: None,
            root_namespace: Some("Acme".to_string()),
            verbose: false,
            json_logs: false,
        };
        let config = args.load_config().unwrap();
        assert!(config.generator.namespace_typings);
        assert_eq!(config.generator.root_namespace.as_deref(), Some("Acme"));
    }
}

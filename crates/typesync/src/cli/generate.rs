use anyhow::{bail, Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use typesync_codegen::{load_local_texts, load_metadata_dir, GeneratedFile, GenerationOutput, TypingsGenerator};
use typesync_core::{TypesyncConfig, TypesyncError};

use super::CommonArgs;

/// Generate declaration files.
#[derive(Parser)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output directory (defaults to the config file's output.dir).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable module-scoped typings.
    #[arg(long)]
    pub modules: bool,

    /// Disable namespace-scoped typings.
    #[arg(long)]
    pub no_namespaces: bool,

    /// Disable per-namespace re-export files.
    #[arg(long)]
    pub no_re_exports: bool,

    /// Local text catalog to generate texts from.
    #[arg(long)]
    pub texts: Option<PathBuf>,

    /// Settings document carrying LocalTextPackages.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Exit with an error when any diagnostic is reported.
    #[arg(long)]
    pub strict: bool,

    /// List the files that would change without writing them.
    #[arg(long)]
    pub dry_run: bool,
}

/// Counts from writing one run's files.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<String>,
    pub unchanged: usize,
}

impl GenerateCommand {
    /// Execute the generate command.
    pub async fn execute(self) -> Result<()> {
        self.common.init_tracing();

        let mut config = self.common.load_config()?;
        self.apply_overrides(&mut config);
        let output_dir = config.output.dir.clone();

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Generating typings...");

        let cancel = CancellationToken::new();
        let on_ctrl_c = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_ctrl_c.cancel();
            }
        });

        let run_config = config.clone();
        let result = tokio::task::spawn_blocking(move || run_generation(&run_config, cancel)).await;
        watcher.abort();
        let output = result.context("Generation task failed")??;

        pb.set_message("Writing files...");
        let summary = if self.dry_run {
            changed_files(&output_dir, &output.files)
        } else {
            write_files(&output_dir, &output.files)?
        };
        pb.finish_and_clear();

        print_summary(&output, &summary, &output_dir, self.dry_run);
        outcome(&output, self.strict)
    }

    fn apply_overrides(&self, config: &mut TypesyncConfig) {
        if let Some(output) = &self.output {
            config.output.dir = output.clone();
        }
        if self.modules {
            config.generator.module_typings = true;
        }
        if self.no_namespaces {
            config.generator.namespace_typings = false;
        }
        if self.no_re_exports {
            config.generator.module_re_exports = false;
        }
        if let Some(texts) = &self.texts {
            config.input.local_texts = Some(texts.clone());
            config.generator.local_texts = true;
        }
        if let Some(settings) = &self.settings {
            config.input.settings = Some(settings.clone());
        }
    }
}

/// Load inputs and run the generator. Blocking.
fn run_generation(config: &TypesyncConfig, cancel: CancellationToken) -> Result<GenerationOutput> {
    let registry = load_metadata_dir(&config.input.metadata)?;

    let keys = match &config.input.local_texts {
        Some(path) if config.generator.local_texts => load_local_texts(path)
            .with_context(|| format!("Failed to load local texts from {}", path.display()))?,
        _ => Vec::new(),
    };

    let mut generator = TypingsGenerator::new(&registry, config.generator.clone())
        .with_local_texts(keys)
        .with_cancellation(cancel);

    if let Some(settings) = &config.input.settings {
        if let Err(e) = generator.set_local_text_filters_from(settings) {
            tracing::warn!(error = %e, "Ignoring local text package filters");
        }
    }

    Ok(generator.generate())
}

/// Exit status of a finished run.
fn outcome(output: &GenerationOutput, strict: bool) -> Result<()> {
    if output.cancelled {
        return Err(TypesyncError::Cancelled.into());
    }
    if strict && !output.diagnostics.is_empty() {
        bail!("{} diagnostic(s) reported", output.diagnostics.len());
    }
    Ok(())
}

/// Write files under `dir`, leaving files with identical content untouched.
fn write_files(dir: &Path, files: &[GeneratedFile]) -> Result<WriteSummary> {
    let mut summary = WriteSummary::default();
    for file in files {
        let path = dir.join(&file.path);
        if fs::read_to_string(&path).is_ok_and(|existing| existing == file.content) {
            summary.unchanged += 1;
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(path = %file.path, "Wrote file");
        summary.written.push(file.path.clone());
    }
    Ok(summary)
}

/// Same as [`write_files`] without touching the filesystem.
fn changed_files(dir: &Path, files: &[GeneratedFile]) -> WriteSummary {
    let mut summary = WriteSummary::default();
    for file in files {
        if fs::read_to_string(dir.join(&file.path)).is_ok_and(|existing| existing == file.content) {
            summary.unchanged += 1;
        } else {
            summary.written.push(file.path.clone());
        }
    }
    summary
}

fn print_summary(output: &GenerationOutput, summary: &WriteSummary, dir: &Path, dry_run: bool) {
    println!();
    let verb = if dry_run { "Would write" } else { "Wrote" };
    for path in &summary.written {
        println!("  {} {}", style("+").green(), path);
    }
    println!(
        "  {} {} {} file(s), {} unchanged",
        style("✓").green(),
        verb,
        style(summary.written.len()).cyan(),
        style(summary.unchanged).cyan()
    );

    if !output.diagnostics.is_empty() {
        println!();
        println!(
            "  {} {} diagnostic(s):",
            style("⚠").yellow(),
            output.diagnostics.len()
        );
        for diagnostic in &output.diagnostics {
            println!("    {}", diagnostic);
        }
    }

    if output.cancelled {
        println!();
        println!(
            "  {} Cancelled: only completed types were written",
            style("⚠").yellow()
        );
    }

    println!("  {} Output: {}", style("📁").dim(), style(dir.display()).cyan());
    println!();
}

//! The generation run: classify, emit per mode, close over references, then
//! emit the run-level text catalog and re-export files.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use tokio_util::sync::CancellationToken;
use typesync_core::{GeneratorConfig, Result, TypeDef, TypeSource, TypesyncError};

use crate::classify::{Classification, Classifier, Strategy};
use crate::emit::{self, extract_row_metadata, EmitContext, RowMetadata};
use crate::output::{Chunk, GeneratedFile, OutputMode, OutputPaths, OutputSet};
use crate::reexport::{re_export_chunks, RE_EXPORT_OWNER};
use crate::texts::{local_text_packages, text_chunk, TEXTS_OWNER};
use crate::worklist::Worklist;
use crate::writer::CodeWriter;

/// Category of a per-type failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    ClassificationGap,
    MetadataExtraction,
    DuplicateFile,
    Other,
}

impl From<&TypesyncError> for DiagnosticKind {
    fn from(err: &TypesyncError) -> Self {
        match err {
            TypesyncError::ClassificationGap(_) => DiagnosticKind::ClassificationGap,
            TypesyncError::MetadataExtraction(_) => DiagnosticKind::MetadataExtraction,
            TypesyncError::DuplicateFile { .. } => DiagnosticKind::DuplicateFile,
            _ => DiagnosticKind::Other,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::ClassificationGap => "classification-gap",
            DiagnosticKind::MetadataExtraction => "metadata-extraction",
            DiagnosticKind::DuplicateFile => "duplicate-file",
            DiagnosticKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// A failure isolated to one type (or one run-level pass).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Full name of the offending type, or the run-level owner.
    pub type_name: String,
    pub kind: DiagnosticKind,
    /// Mode of the failed task; `None` when every mode failed together.
    pub mode: Option<OutputMode>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Some(mode) => write!(f, "{} [{}, {}]: {}", self.type_name, self.kind, mode, self.message),
            None => write!(f, "{} [{}]: {}", self.type_name, self.kind, self.message),
        }
    }
}

/// Result of one generation run.
#[derive(Debug, Default)]
pub struct GenerationOutput {
    /// Completed files, sorted by path.
    pub files: Vec<GeneratedFile>,
    pub diagnostics: Vec<Diagnostic>,
    /// Whether the run stopped early on cancellation.
    pub cancelled: bool,
}

/// Typings generator over one type source.
///
/// Every run owns its output set, worklist and diagnostics; independent
/// generators share nothing mutable.
pub struct TypingsGenerator<'a> {
    source: &'a dyn TypeSource,
    config: GeneratorConfig,
    paths: OutputPaths,
    local_texts: Vec<String>,
    cancel: CancellationToken,
}

impl<'a> TypingsGenerator<'a> {
    pub fn new(source: &'a dyn TypeSource, config: GeneratorConfig) -> Self {
        let paths = OutputPaths::new(config.root_namespace.clone());
        Self {
            source,
            config,
            paths,
            local_texts: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Supply the local text keys available to the catalog.
    pub fn with_local_texts(mut self, keys: Vec<String>) -> Self {
        self.local_texts = keys;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Add `LocalTextPackages` prefixes from a settings document.
    ///
    /// Does nothing when local texts are disabled or the document does not
    /// exist. On failure the filter set is left unchanged and a
    /// [`TypesyncError::SettingsLoad`] is returned for the caller to log.
    pub fn set_local_text_filters_from(&mut self, path: &Path) -> Result<usize> {
        if !self.config.local_texts || !path.exists() {
            return Ok(0);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            TypesyncError::SettingsLoad(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let prefixes = local_text_packages(&content)?;

        let before = self.config.local_text_filters.len();
        self.config.local_text_filters.extend(prefixes);
        let added = self.config.local_text_filters.len() - before;
        tracing::debug!(path = %path.display(), added, "Loaded local text filters");
        Ok(added)
    }

    /// Modes enabled by configuration, namespace first.
    pub fn enabled_modes(&self) -> Vec<OutputMode> {
        let mut modes = Vec::new();
        if self.config.namespace_typings {
            modes.push(OutputMode::Namespace);
        }
        if self.config.module_typings {
            modes.push(OutputMode::Module);
        }
        modes
    }

    /// Classify every primary type without emitting anything.
    pub fn classify_all(&self) -> Vec<(String, Result<Classification>)> {
        let classifier = Classifier::new(self.source, &self.config.request_suffix);
        self.source
            .types()
            .iter()
            .map(|ty| (ty.full_name(), classifier.classify(ty)))
            .collect()
    }

    /// Run generation over every primary type and everything they reference.
    pub fn generate(&self) -> GenerationOutput {
        let modes = self.enabled_modes();
        if modes.is_empty() {
            tracing::warn!("Neither namespace nor module typings are enabled");
        }

        let mut run = Run {
            generator: self,
            classifier: Classifier::new(self.source, &self.config.request_suffix),
            output: OutputSet::new(),
            worklist: Worklist::new(),
            diagnostics: Vec::new(),
        };

        let mut cancelled = false;
        for ty in self.source.types() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            run.visit(ty, &modes);
        }

        while !cancelled {
            let Some((name, pending)) = run.worklist.next() else {
                break;
            };
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            if let Some(ty) = self.source.resolve(&name) {
                run.visit(ty, &pending);
            }
        }

        if cancelled {
            tracing::info!(files = run.output.len(), "Generation cancelled");
        } else {
            if self.config.local_texts {
                run.emit_texts(&modes);
            }
            if self.config.module_typings && self.config.module_re_exports {
                run.emit_re_exports();
            }
            tracing::info!(
                types = run.worklist.generated_count(),
                files = run.output.len(),
                diagnostics = run.diagnostics.len(),
                "Generation finished"
            );
        }

        GenerationOutput {
            files: run.output.into_files(),
            diagnostics: run.diagnostics,
            cancelled,
        }
    }
}

/// Mutable state of one generation run.
struct Run<'g, 'a> {
    generator: &'g TypingsGenerator<'a>,
    classifier: Classifier<'g>,
    output: OutputSet,
    worklist: Worklist,
    diagnostics: Vec<Diagnostic>,
}

impl<'g, 'a> Run<'g, 'a> {
    fn visit(&mut self, ty: &TypeDef, modes: &[OutputMode]) {
        let full_name = ty.full_name();
        let modes = self.worklist.ungenerated(&full_name, modes);
        if modes.is_empty() {
            tracing::debug!(type_name = %full_name, "Type already generated");
            return;
        }
        for &mode in &modes {
            self.worklist.mark_generated(&full_name, mode);
        }

        let classification = match self.classifier.classify(ty) {
            Ok(classification) => classification,
            Err(e) => return self.report(&full_name, None, e),
        };
        let primary = classification.primary().strategy;
        tracing::debug!(type_name = %full_name, strategy = %primary, "Visiting type");

        if primary.enqueues_members() {
            self.enqueue_member_types(ty, &modes);
        }

        let row_metadata = if primary == Strategy::Row {
            match extract_row_metadata(ty, &self.generator.paths) {
                Ok(metadata) => Some(metadata),
                Err(e) => return self.report(&full_name, None, e),
            }
        } else {
            None
        };

        for mode in modes {
            let result = self
                .stage(ty, &classification, row_metadata.as_ref(), mode)
                .and_then(|(chunks, referenced)| {
                    self.output.commit(chunks)?;
                    Ok(referenced)
                });
            match result {
                Ok(referenced) => {
                    for name in referenced {
                        self.worklist.enqueue(&name, &[mode]);
                    }
                }
                Err(e) => self.report(&full_name, Some(mode), e),
            }
        }
    }

    fn enqueue_member_types(&mut self, ty: &TypeDef, modes: &[OutputMode]) {
        let source = self.generator.source;
        for member in ty.properties() {
            for name in member.type_ref.named_refs() {
                if source.resolve(name).is_some() {
                    self.worklist.enqueue(name, modes);
                }
            }
        }
    }

    /// Emit every selection of `ty` for `mode` into staged chunks, returning
    /// them with the generated types they reference.
    fn stage(
        &self,
        ty: &TypeDef,
        classification: &Classification,
        row_metadata: Option<&RowMetadata>,
        mode: OutputMode,
    ) -> Result<(Vec<Chunk>, BTreeSet<String>)> {
        let paths = &self.generator.paths;
        let mut chunks = Vec::with_capacity(classification.selections.len());
        let mut referenced = BTreeSet::new();

        for selection in &classification.selections {
            let mut ctx = EmitContext::new(self.generator.source, paths, mode, ty);
            let mut w = CodeWriter::new();
            match mode {
                OutputMode::Namespace if !ty.namespace.is_empty() => {
                    w.in_brace(&format!("namespace {}", ty.namespace), |w| {
                        emit::emit(selection, row_metadata, &mut ctx, w)
                    })?;
                }
                _ => emit::emit(selection, row_metadata, &mut ctx, &mut w)?,
            }

            referenced.extend(ctx.referenced().iter().cloned());
            chunks.push(Chunk {
                path: paths.file_path(&ty.namespace, &selection.identifier, mode),
                mode,
                owner: ty.full_name(),
                namespace: paths.relative_namespace(&ty.namespace).to_string(),
                identifier: selection.identifier.clone(),
                exportable: true,
                imports: ctx.into_imports(),
                body: w.into_string(),
            });
        }

        Ok((chunks, referenced))
    }

    fn emit_texts(&mut self, modes: &[OutputMode]) {
        let generator = self.generator;
        for &mode in modes {
            let result = text_chunk(
                generator.local_texts.iter().map(String::as_str),
                &generator.config.local_text_filters,
                &generator.paths,
                generator.config.root_namespace.as_deref(),
                mode,
            )
            .and_then(|chunk| self.output.commit(vec![chunk]));

            if let Err(e) = result {
                self.report(TEXTS_OWNER, Some(mode), e);
            }
        }
    }

    fn emit_re_exports(&mut self) {
        for chunk in re_export_chunks(&self.output, &self.generator.paths) {
            if let Err(e) = self.output.commit(vec![chunk]) {
                self.report(RE_EXPORT_OWNER, Some(OutputMode::Module), e);
            }
        }
    }

    fn report(&mut self, type_name: &str, mode: Option<OutputMode>, err: TypesyncError) {
        let diagnostic = Diagnostic {
            type_name: type_name.to_string(),
            kind: DiagnosticKind::from(&err),
            mode,
            message: err.to_string(),
        };
        tracing::warn!(
            type_name = %diagnostic.type_name,
            kind = %diagnostic.kind,
            mode = ?diagnostic.mode,
            "{}",
            diagnostic.message
        );
        self.diagnostics.push(diagnostic);
    }
}

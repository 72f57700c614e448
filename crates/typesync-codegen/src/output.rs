//! Output modes, path conventions and the per-run file set.
//!
//! Every produced file is an append-only buffer owned by exactly one type
//! (or one run-level pass such as the text catalog). Content is staged per
//! `(type, mode)` task and committed atomically, so a failed task never leaves
//! a partially written file behind.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use typesync_core::{Result, TypesyncError};

/// Header written at the top of every generated file.
pub const FILE_HEADER: &str = "// Auto-generated by typesync - DO NOT EDIT";

const NAMESPACE_ROOT: &str = "ServerTypings";
const MODULE_ROOT: &str = "ServerTypes";

/// Declaration wrapping and path convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputMode {
    /// Global `namespace X { ... }` declarations.
    Namespace,
    /// ES module declarations with imports.
    Module,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Namespace => "namespace",
            OutputMode::Module => "module",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deterministic path computation for generated files.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    root_namespace: Option<String>,
}

impl OutputPaths {
    pub fn new(root_namespace: Option<String>) -> Self {
        Self {
            root_namespace: root_namespace.filter(|r| !r.is_empty()),
        }
    }

    /// Namespace with the configured root prefix removed.
    pub fn relative_namespace<'n>(&self, namespace: &'n str) -> &'n str {
        let Some(root) = self.root_namespace.as_deref() else {
            return namespace;
        };
        if namespace == root {
            return "";
        }
        namespace
            .strip_prefix(root)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(namespace)
    }

    /// Path of the file holding `identifier` from `namespace` in `mode`.
    pub fn file_path(&self, namespace: &str, identifier: &str, mode: OutputMode) -> String {
        let relative = self.relative_namespace(namespace);
        match mode {
            OutputMode::Namespace if relative.is_empty() => {
                format!("{}/{}.ts", NAMESPACE_ROOT, identifier)
            }
            OutputMode::Namespace => format!("{}/{}.{}.ts", NAMESPACE_ROOT, relative, identifier),
            OutputMode::Module => {
                let mut segments = module_dir(relative);
                segments.push(identifier);
                format!("{}/{}.ts", MODULE_ROOT, segments.join("/"))
            }
        }
    }

    /// Import specifier for `identifier` in `to_namespace`, as seen from a
    /// module file in `from_namespace`.
    pub fn module_specifier(&self, from_namespace: &str, to_namespace: &str, identifier: &str) -> String {
        let from = module_dir(self.relative_namespace(from_namespace));
        let to = module_dir(self.relative_namespace(to_namespace));

        let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
        let mut parts: Vec<&str> = std::iter::repeat("..").take(from.len() - common).collect();
        parts.extend(&to[common..]);
        parts.push(identifier);

        if from.len() == common {
            format!("./{}", parts.join("/"))
        } else {
            parts.join("/")
        }
    }

    /// Path of the local text catalog file.
    pub fn texts_path(&self, mode: OutputMode) -> String {
        match mode {
            OutputMode::Namespace => format!("{}/Texts.ts", NAMESPACE_ROOT),
            OutputMode::Module => format!("{}/Texts.ts", MODULE_ROOT),
        }
    }

    /// Path of the re-export aggregator for a relative namespace.
    pub fn re_export_path(&self, relative_namespace: &str) -> String {
        if relative_namespace.is_empty() {
            format!("{}/index.ts", MODULE_ROOT)
        } else {
            format!("{}/{}.ts", MODULE_ROOT, module_dir(relative_namespace).join("/"))
        }
    }

    /// Specifier used by a re-export aggregator to reach one module file.
    pub fn re_export_specifier(&self, relative_namespace: &str, identifier: &str) -> String {
        match module_dir(relative_namespace).last() {
            Some(last) => format!("./{}/{}", last, identifier),
            None => format!("./{}", identifier),
        }
    }
}

fn module_dir(relative_namespace: &str) -> Vec<&str> {
    relative_namespace
        .split('.')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Import table of a module-mode file: specifier to imported names.
pub type Imports = BTreeMap<String, BTreeSet<String>>;

/// Content staged by one task for one file, not yet committed.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub path: String,
    pub mode: OutputMode,
    /// Identity of the producing type or pass.
    pub owner: String,
    /// Relative namespace, used for re-export grouping.
    pub namespace: String,
    pub identifier: String,
    /// Whether the chunk is a type declaration eligible for re-export.
    pub exportable: bool,
    pub imports: Imports,
    pub body: String,
}

/// One output file accumulated during a run.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: String,
    pub mode: OutputMode,
    pub owner: String,
    pub namespace: String,
    pub identifier: String,
    pub exportable: bool,
    imports: Imports,
    body: String,
}

impl OutputFile {
    fn from_chunk(chunk: Chunk) -> Self {
        Self {
            path: chunk.path,
            mode: chunk.mode,
            owner: chunk.owner,
            namespace: chunk.namespace,
            identifier: chunk.identifier,
            exportable: chunk.exportable,
            imports: chunk.imports,
            body: chunk.body,
        }
    }

    fn append(&mut self, chunk: Chunk) {
        for (specifier, names) in chunk.imports {
            self.imports.entry(specifier).or_default().extend(names);
        }
        if !self.body.is_empty() {
            self.body.push('\n');
        }
        self.body.push_str(&chunk.body);
    }

    /// Render the final file content.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(FILE_HEADER);
        out.push_str("\n\n");

        if !self.imports.is_empty() {
            for (specifier, names) in &self.imports {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                out.push_str(&format!(
                    "import {{ {} }} from \"{}\";\n",
                    names.join(", "),
                    specifier
                ));
            }
            out.push('\n');
        }

        out.push_str(&self.body);
        out
    }
}

/// A finished file handed to the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub mode: OutputMode,
    pub content: String,
}

/// All output files of one run, keyed by path.
#[derive(Debug, Default)]
pub struct OutputSet {
    files: BTreeMap<String, OutputFile>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit every chunk of one task, or none of them.
    ///
    /// A chunk whose path is already owned by a different producer is a
    /// [`TypesyncError::DuplicateFile`].
    pub fn commit(&mut self, chunks: Vec<Chunk>) -> Result<()> {
        for chunk in &chunks {
            if let Some(existing) = self.files.get(&chunk.path) {
                if existing.owner != chunk.owner {
                    return Err(TypesyncError::DuplicateFile {
                        path: chunk.path.clone(),
                        owner: existing.owner.clone(),
                    });
                }
            }
        }

        for chunk in chunks {
            match self.files.get_mut(&chunk.path) {
                Some(file) => file.append(chunk),
                None => {
                    self.files
                        .insert(chunk.path.clone(), OutputFile::from_chunk(chunk));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.files.len()
    }

    /// Identifiers of exportable module-mode files grouped by relative namespace.
    pub fn module_exports(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for file in self.files.values() {
            if file.mode == OutputMode::Module && file.exportable {
                grouped
                    .entry(file.namespace.clone())
                    .or_default()
                    .insert(file.identifier.clone());
            }
        }
        grouped
    }

    /// Seal the set into rendered files, sorted by path.
    pub fn into_files(self) -> Vec<GeneratedFile> {
        self.files
            .into_values()
            .map(|file| GeneratedFile {
                content: file.render(),
                path: file.path,
                mode: file.mode,
            })
            .collect()
    }
}

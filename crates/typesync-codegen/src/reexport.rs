use crate::output::{Chunk, Imports, OutputMode, OutputPaths, OutputSet};
use crate::writer::CodeWriter;

/// Owner recorded on re-export aggregator files.
pub const RE_EXPORT_OWNER: &str = "<re-exports>";

/// Stage one re-export file per namespace with module-mode declarations.
///
/// Namespaces with no exportable module file produce nothing.
pub fn re_export_chunks(output: &OutputSet, paths: &OutputPaths) -> Vec<Chunk> {
    output
        .module_exports()
        .into_iter()
        .map(|(namespace, identifiers)| {
            let mut w = CodeWriter::new();
            for identifier in &identifiers {
                w.line(format!(
                    "export * from \"{}\";",
                    paths.re_export_specifier(&namespace, identifier)
                ));
            }
            tracing::debug!(
                namespace = %namespace,
                count = identifiers.len(),
                "Staged module re-exports"
            );

            Chunk {
                path: paths.re_export_path(&namespace),
                mode: OutputMode::Module,
                owner: RE_EXPORT_OWNER.to_string(),
                namespace,
                identifier: String::new(),
                exportable: false,
                imports: Imports::new(),
                body: w.into_string(),
            }
        })
        .collect()
}

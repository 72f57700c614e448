//! TypeScript typings generation from server type metadata.
//!
//! Types are classified into a single strategy (enum, service, form,
//! columns, permission keys, row or basic interface), emitted once per
//! enabled output mode, and closed over the types they reference.

pub mod classify;
pub mod emit;
pub mod generator;
pub mod output;
pub mod reexport;
pub mod source;
pub mod texts;
pub mod worklist;
pub mod writer;

pub use classify::{Classification, Classifier, Selection, Strategy};
pub use generator::{Diagnostic, DiagnosticKind, GenerationOutput, TypingsGenerator};
pub use output::{GeneratedFile, OutputMode, OutputPaths};
pub use source::{load_local_texts, load_metadata_dir, MetadataDocument};

//! Name resolution and scope analysis backend for Links editor tooling.
//!
//! The pipeline for one document:
//!
//! 1. `syntax` turns the external parser's JSON tree into an arena and
//!    repairs its spans against the source text.
//! 2. `binder` resolves every variable and function occurrence to the binder
//!    it refers to and records the results in a `BindingIndex`.
//! 3. `lsp` runs the structural checks and answers navigation requests
//!    against the resulting `DocumentAnalysis` snapshot.

// Shared positions, diagnostics catalogue, options and limits
pub use linkscope_common as common;
pub use linkscope_common::{AnalysisOptions, Location, NativePosition, NativeSpan, Position, Range};

// Tree adapter and position reconciler
pub use linkscope_syntax as syntax;
pub use linkscope_syntax::{Classification, PositionShift, SyntaxTree, TreeError};

// Scope resolver and binding index
pub use linkscope_binder as binder;
pub use linkscope_binder::{BindingIndex, ScopeResolver};

// Diagnostics and navigation features
pub use linkscope_lsp as lsp;
pub use linkscope_lsp::{DocumentAnalysis, DocumentStore, LspDiagnostic};

// Tracing subscriber setup for binaries
pub mod tracing_config;

/// Analyse one document from the parser's JSON tree.
pub fn analyze_document(
    uri: &str,
    source: &str,
    tree_json: &str,
    options: &AnalysisOptions,
) -> Result<DocumentAnalysis, TreeError> {
    DocumentAnalysis::analyze(uri, source, tree_json, options)
}

//! Editor features for Links documents.
//!
//! This crate provides:
//! - Document analysis snapshots and the document store
//! - Structural diagnostics and the best-effort runtime check
//! - Go to definition
//! - Find references
//! - Rename
//! - Hover information
//! - Semantic tokens
//! - Document symbols

pub mod document;
pub use document::{DocumentAnalysis, DocumentStore, DocumentUpdate, UpdateError};

pub mod diagnostics;
pub use diagnostics::{
    DIAGNOSTIC_SOURCE, Diagnostic, DiagnosticSeverity, DiagnosticsEngine, LspDiagnostic,
    LspDiagnosticRelatedInformation,
};

pub mod runtime_check;
pub use runtime_check::{PendingRuntimeCheck, RuntimeCheck, RuntimeError};

pub mod definition;
pub use definition::GoToDefinition;

pub mod references;
pub use references::{FindReferences, ReferenceInfo};

pub mod rename;
pub use rename::{RenameProvider, TextEdit, WorkspaceEdit};

pub mod hover;
pub use hover::{HoverInfo, HoverProvider};

pub mod semantic_tokens;
pub use semantic_tokens::{
    SemanticTokenType, SemanticTokensBuilder, SemanticTokensLegend, SemanticTokensProvider,
    semantic_token_modifiers,
};

pub mod document_symbols;
pub use document_symbols::{DocumentSymbol, DocumentSymbolsProvider, SymbolKind};

pub mod utils;

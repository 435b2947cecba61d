//! Per-document analysis snapshots.
//!
//! A `DocumentAnalysis` is built in one synchronous pass (tree, binding index,
//! structural diagnostics) and never mutated afterwards. The store publishes
//! snapshots behind `Arc`, so readers either see the previous analysis or the
//! new one, never a half-built index.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use linkscope_binder::BindingIndex;
use linkscope_common::{AnalysisOptions, LineMap, Position};
use linkscope_syntax::{NodeIndex, PositionShift, Reconciler, SyntaxTree, TreeError};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::diagnostics::{DiagnosticsEngine, LspDiagnostic};
use crate::runtime_check::{PendingRuntimeCheck, RuntimeCheck};
use crate::utils::identifier_at;

/// Everything the features need to answer queries about one document.
#[derive(Debug)]
pub struct DocumentAnalysis {
    pub uri: String,
    pub source: String,
    pub line_map: LineMap,
    pub tree: SyntaxTree,
    pub index: BindingIndex,
    pub options: AnalysisOptions,
    /// Structural diagnostics, ordered by range.
    pub diagnostics: Vec<LspDiagnostic>,
}

impl DocumentAnalysis {
    /// Build the tree from the parser's JSON and analyse it.
    #[tracing::instrument(level = "debug", skip(source, tree_json, options))]
    pub fn analyze(
        uri: &str,
        source: &str,
        tree_json: &str,
        options: &AnalysisOptions,
    ) -> Result<DocumentAnalysis, TreeError> {
        let shift = PositionShift::from_config(&options.position_shift);
        let tree = SyntaxTree::from_json(tree_json, source, shift)?;
        Ok(Self::from_tree(uri, source, tree, options))
    }

    /// Analyse an already built tree.
    pub fn from_tree(
        uri: &str,
        source: &str,
        tree: SyntaxTree,
        options: &AnalysisOptions,
    ) -> DocumentAnalysis {
        let line_map = LineMap::build(source);
        let index = BindingIndex::build(&tree.arena, tree.root, &options.wrapper_name);
        let mut analysis = DocumentAnalysis {
            uri: uri.to_string(),
            source: source.to_string(),
            line_map,
            tree,
            index,
            options: options.clone(),
            diagnostics: Vec::new(),
        };
        analysis.diagnostics = analysis.compute_diagnostics();
        debug!(
            uri,
            nodes = analysis.tree.arena.len(),
            diagnostics = analysis.diagnostics.len(),
            "document analysed"
        );
        analysis
    }

    fn compute_diagnostics(&self) -> Vec<LspDiagnostic> {
        let reconciler = self.reconciler();
        DiagnosticsEngine::new(
            &self.tree.arena,
            &self.index,
            &self.options,
            &reconciler,
            &self.uri,
        )
        .structural_diagnostics()
    }

    pub fn shift(&self) -> PositionShift {
        PositionShift::from_config(&self.options.position_shift)
    }

    pub fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(self.shift(), &self.source, &self.line_map)
    }

    /// The identifier node under an editor position.
    pub fn identifier_at(&self, position: Position) -> Option<NodeIndex> {
        identifier_at(self, position)
    }

    /// Start the best-effort runtime check when it is enabled.
    pub fn spawn_runtime_check(&self) -> Option<PendingRuntimeCheck> {
        let options = &self.options.runtime_check;
        options
            .enabled
            .then(|| RuntimeCheck::spawn(options, &self.uri, &self.source))
    }

    /// Source text of an editor line.
    pub fn line_text(&self, line: u32) -> &str {
        self.line_map
            .line_text(line as usize, &self.source)
            .unwrap_or_default()
    }
}

/// One document to (re)analyse.
#[derive(Clone, Debug)]
pub struct DocumentUpdate {
    pub uri: String,
    /// Editor document version; later edits carry higher numbers.
    pub version: i32,
    pub source: String,
    pub tree_json: String,
}

/// Why an update was not published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// The tree could not be built; the previous analysis stays current.
    Tree(TreeError),
    /// A newer version of the document is already published.
    Stale { version: i32, current: i32 },
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::Tree(err) => write!(f, "{err}"),
            UpdateError::Stale { version, current } => {
                write!(f, "version {version} is older than the published version {current}")
            }
        }
    }
}

impl std::error::Error for UpdateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpdateError::Tree(err) => Some(err),
            UpdateError::Stale { .. } => None,
        }
    }
}

impl From<TreeError> for UpdateError {
    fn from(err: TreeError) -> Self {
        UpdateError::Tree(err)
    }
}

#[derive(Debug)]
struct StoredDocument {
    version: i32,
    analysis: Arc<DocumentAnalysis>,
}

/// Latest good analysis of every open document.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<String, StoredDocument>,
    options: AnalysisOptions,
}

impl DocumentStore {
    pub fn new(options: AnalysisOptions) -> Self {
        DocumentStore {
            documents: DashMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Version of the published analysis of `uri`.
    pub fn version(&self, uri: &str) -> Option<i32> {
        self.documents.get(uri).map(|entry| entry.version)
    }

    /// Re-analyse a document at `version`.
    ///
    /// The new analysis replaces the published one only if `version` is not
    /// older than it, so an analysis that finishes late never overwrites a
    /// newer edit. On a tree error the previous analysis stays in place.
    pub fn update(
        &self,
        uri: &str,
        version: i32,
        source: &str,
        tree_json: &str,
    ) -> Result<Arc<DocumentAnalysis>, UpdateError> {
        if let Some(current) = self.version(uri).filter(|&current| current > version) {
            debug!(uri, version, current, "skipping stale update");
            return Err(UpdateError::Stale { version, current });
        }

        let analysis = match DocumentAnalysis::analyze(uri, source, tree_json, &self.options) {
            Ok(analysis) => Arc::new(analysis),
            Err(err) => {
                warn!(uri, version, error = %err, "tree rebuild failed, keeping previous analysis");
                return Err(err.into());
            }
        };

        let stored = StoredDocument {
            version,
            analysis: Arc::clone(&analysis),
        };
        match self.documents.entry(uri.to_string()) {
            Entry::Occupied(mut entry) => {
                let current = entry.get().version;
                if current > version {
                    debug!(uri, version, current, "discarding analysis of a stale version");
                    return Err(UpdateError::Stale { version, current });
                }
                entry.insert(stored);
            }
            Entry::Vacant(entry) => {
                entry.insert(stored);
            }
        }
        Ok(analysis)
    }

    /// Analyse independent documents in parallel.
    pub fn update_many(
        &self,
        updates: &[DocumentUpdate],
    ) -> Vec<(String, Result<Arc<DocumentAnalysis>, UpdateError>)> {
        updates
            .par_iter()
            .map(|u| {
                let result = self.update(&u.uri, u.version, &u.source, &u.tree_json);
                (u.uri.clone(), result)
            })
            .collect()
    }

    pub fn get(&self, uri: &str) -> Option<Arc<DocumentAnalysis>> {
        self.documents.get(uri).map(|entry| Arc::clone(&entry.analysis))
    }

    pub fn remove(&self, uri: &str) -> Option<Arc<DocumentAnalysis>> {
        self.documents.remove(uri).map(|(_, stored)| stored.analysis)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.documents.iter().map(|e| e.key().clone()).collect();
        uris.sort();
        uris
    }
}

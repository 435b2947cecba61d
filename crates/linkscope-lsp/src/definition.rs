//! Go-to-Definition.
//!
//! Given a position in the source, finds the binder or function name that the
//! identifier at that position resolves to.

use linkscope_common::{Location, Position};
use tracing::trace;

use crate::document::DocumentAnalysis;

/// Go-to-Definition provider.
pub struct GoToDefinition<'a> {
    analysis: &'a DocumentAnalysis,
}

impl<'a> GoToDefinition<'a> {
    pub fn new(analysis: &'a DocumentAnalysis) -> Self {
        Self { analysis }
    }

    /// Location of the declaration for the identifier at `position`.
    ///
    /// Returns `None` for built-ins, unresolved names and positions that are
    /// not on an identifier. A declaration resolves to itself.
    pub fn definition(&self, position: Position) -> Option<Location> {
        let node = self.analysis.identifier_at(position)?;
        let Some(declaration) = self.analysis.index.declaration_for(node) else {
            trace!(?position, "identifier has no declaration");
            return None;
        };
        let range = self
            .analysis
            .reconciler()
            .name_range(&self.analysis.tree.arena, declaration.node)?;
        Some(Location::new(self.analysis.uri.clone(), range))
    }
}

//! Find References.
//!
//! Given a position in the source, finds every resolved use of the declaration
//! under it, plus the declaration itself. Returns detailed reference
//! information including:
//! - `isWriteAccess`: whether the reference introduces the binding
//! - `isDefinition`: whether the reference is the declaration site
//! - `lineText`: the full text of the line containing the reference

use linkscope_common::{Location, Position, Range};
use linkscope_syntax::NodeIndex;

use crate::document::DocumentAnalysis;

/// Detailed information about a single reference to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceInfo {
    /// The location (file + range) of this reference.
    #[serde(flatten)]
    pub location: Location,
    pub is_write_access: bool,
    pub is_definition: bool,
    /// The full text of the line containing this reference.
    pub line_text: String,
}

impl ReferenceInfo {
    pub fn new(
        location: Location,
        is_write_access: bool,
        is_definition: bool,
        line_text: String,
    ) -> Self {
        Self {
            location,
            is_write_access,
            is_definition,
            line_text,
        }
    }
}

/// Find References provider.
pub struct FindReferences<'a> {
    analysis: &'a DocumentAnalysis,
}

impl<'a> FindReferences<'a> {
    pub fn new(analysis: &'a DocumentAnalysis) -> Self {
        Self { analysis }
    }

    /// All references to the declaration the identifier at `position`
    /// resolves to, ordered by position. Empty when nothing resolves.
    pub fn references(&self, position: Position) -> Vec<ReferenceInfo> {
        let Some(declaration) = self.target_declaration(position) else {
            return Vec::new();
        };
        let mut out: Vec<ReferenceInfo> = self
            .reference_ranges(declaration)
            .into_iter()
            .map(|(range, is_definition)| {
                ReferenceInfo::new(
                    Location::new(self.analysis.uri.clone(), range),
                    is_definition,
                    is_definition,
                    self.analysis.line_text(range.start.line).to_string(),
                )
            })
            .collect();
        out.sort_by_key(|r| (r.location.range.start, r.location.range.end));
        out
    }

    /// Declaration node behind the identifier at `position`.
    pub fn target_declaration(&self, position: Position) -> Option<NodeIndex> {
        let node = self.analysis.identifier_at(position)?;
        self.analysis.index.declaration_for(node).map(|d| d.node)
    }

    /// Narrowed ranges of a declaration and its resolved uses, flagged with
    /// whether each is the declaration site.
    pub fn reference_ranges(&self, declaration: NodeIndex) -> Vec<(Range, bool)> {
        let arena = &self.analysis.tree.arena;
        let reconciler = self.analysis.reconciler();
        let mut ranges = Vec::new();
        if let Some(range) = reconciler.name_range(arena, declaration) {
            ranges.push((range, true));
        }
        ranges.extend(
            self.analysis
                .index
                .occurrences_of(declaration)
                .filter_map(|o| reconciler.name_range(arena, o.node))
                .map(|range| (range, false)),
        );
        ranges
    }
}

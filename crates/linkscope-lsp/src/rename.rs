//! Rename.
//!
//! A rename touches exactly the declaration under the cursor and the
//! occurrences the binding index resolved to it. Same-named declarations in
//! other scopes, and unresolved uses of the name, are left alone.

use linkscope_common::{Position, Range};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::document::DocumentAnalysis;
use crate::references::FindReferences;
use crate::utils::is_valid_identifier;

/// A single text edit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    /// The range to replace.
    pub range: Range,
    /// The new text.
    pub new_text: String,
}

impl TextEdit {
    pub fn new(range: Range, new_text: String) -> Self {
        Self { range, new_text }
    }
}

/// Edits keyed by document URI.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct WorkspaceEdit {
    pub changes: FxHashMap<String, Vec<TextEdit>>,
}

impl WorkspaceEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edit(&mut self, uri: String, edit: TextEdit) {
        self.changes.entry(uri).or_default().push(edit);
    }

    /// Edits for one document, empty when it is untouched.
    pub fn edits_for(&self, uri: &str) -> &[TextEdit] {
        self.changes.get(uri).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Provider for rename.
pub struct RenameProvider<'a> {
    analysis: &'a DocumentAnalysis,
}

impl<'a> RenameProvider<'a> {
    pub fn new(analysis: &'a DocumentAnalysis) -> Self {
        Self { analysis }
    }

    /// Range of the identifier at `position` when it can be renamed: it
    /// must be a declaration, or resolve to one.
    pub fn prepare_rename(&self, position: Position) -> Option<Range> {
        let node = self.analysis.identifier_at(position)?;
        self.analysis.index.declaration_for(node)?;
        self.analysis
            .reconciler()
            .name_range(&self.analysis.tree.arena, node)
    }

    /// Rename the declaration at `position`. `None` when the request is
    /// rejected.
    pub fn rename(&self, position: Position, new_name: &str) -> Option<WorkspaceEdit> {
        self.provide_rename_edits(position, new_name)
            .map_err(|reason| debug!(?position, new_name, reason, "rename rejected"))
            .ok()
    }

    /// Perform the rename, or explain why it cannot be done.
    pub fn provide_rename_edits(
        &self,
        position: Position,
        new_name: &str,
    ) -> Result<WorkspaceEdit, String> {
        let new_name = new_name.trim();
        if !is_valid_identifier(new_name) {
            return Err(format!("'{new_name}' is not a valid identifier."));
        }

        let references = FindReferences::new(self.analysis);
        let declaration = references
            .target_declaration(position)
            .ok_or_else(|| "You cannot rename this element.".to_string())?;

        let mut ranges = references.reference_ranges(declaration);
        if !ranges.iter().any(|&(_, is_definition)| is_definition) {
            return Err("The declaration could not be located in the source.".to_string());
        }
        ranges.sort_by_key(|&(range, _)| (range.start, range.end));
        ranges.dedup_by_key(|&mut (range, _)| range);

        let mut edit = WorkspaceEdit::new();
        for (range, _) in ranges {
            edit.add_edit(
                self.analysis.uri.clone(),
                TextEdit::new(range, new_name.to_string()),
            );
        }
        Ok(edit)
    }
}

//! Hover.
//!
//! Shows the signature of a library function, or the kind and parameter
//! list of a user declaration.

use linkscope_binder::{DeclarationKind, builtins};
use linkscope_common::{Position, Range};
use linkscope_syntax::{NodeArena, NodeIndex, NodeKind};

use crate::document::DocumentAnalysis;

/// Information returned for a hover request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HoverInfo {
    /// Markdown paragraphs.
    pub contents: Vec<String>,
    /// The range of the identifier being hovered.
    pub range: Option<Range>,
}

/// Hover provider.
pub struct HoverProvider<'a> {
    analysis: &'a DocumentAnalysis,
}

impl<'a> HoverProvider<'a> {
    pub fn new(analysis: &'a DocumentAnalysis) -> Self {
        Self { analysis }
    }

    pub fn hover(&self, position: Position) -> Option<HoverInfo> {
        let arena = &self.analysis.tree.arena;
        let node = self.analysis.identifier_at(position)?;
        let range = self.analysis.reconciler().name_range(arena, node);

        if let Some(declaration) = self.analysis.index.declaration_for(node) {
            let signature = match declaration.kind {
                DeclarationKind::Function => self.function_signature(declaration.node)?,
                _ => declaration.name.clone(),
            };
            return Some(HoverInfo {
                contents: vec![
                    format!("```links\n{signature}\n```"),
                    format!("({})", declaration.kind.describe()),
                ],
                range,
            });
        }

        let name = arena.kind(node)?.identifier()?;
        let builtin = builtins::lookup(name)?;
        Some(HoverInfo {
            contents: vec![
                format!("```links\n{} : {}\n```", builtin.name, builtin.signature),
                "(library function)".to_string(),
            ],
            range,
        })
    }

    /// `fun name(a, b)` for a function declaration node.
    pub fn function_signature(&self, fun: NodeIndex) -> Option<String> {
        let arena = &self.analysis.tree.arena;
        let Some(NodeKind::Fun { name }) = arena.kind(fun) else {
            return None;
        };
        Some(format!("fun {name}({})", parameter_names(arena, fun).join(", ")))
    }
}

/// Names of the first parameter group; a pattern shows the binders inside it.
fn parameter_names(arena: &NodeArena, fun: NodeIndex) -> Vec<String> {
    let Some(params) = arena
        .children(fun)
        .iter()
        .copied()
        .find(|&c| matches!(arena.kind(c), Some(NodeKind::Params)))
    else {
        return Vec::new();
    };

    arena
        .children(params)
        .iter()
        .map(|&param| match arena.kind(param) {
            Some(NodeKind::Binder { name, .. }) => name.clone(),
            _ => {
                let inner: Vec<&str> = arena
                    .preorder(param)
                    .into_iter()
                    .filter_map(|idx| match arena.kind(idx) {
                        Some(NodeKind::Binder { name, .. }) => Some(name.as_str()),
                        _ => None,
                    })
                    .collect();
                if inner.is_empty() {
                    "_".to_string()
                } else {
                    format!("({})", inner.join(", "))
                }
            }
        })
        .collect()
}

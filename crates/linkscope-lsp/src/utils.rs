//! Node lookup helpers shared by the navigation features.

use linkscope_common::Position;
use linkscope_syntax::{NodeIndex, NodeKind};

use crate::document::DocumentAnalysis;

/// The identifier (variable, binder or function name) whose narrowed range
/// contains `position`. The last match in document order wins, so a binder
/// nested in a function header beats the header itself.
pub fn identifier_at(analysis: &DocumentAnalysis, position: Position) -> Option<NodeIndex> {
    let arena = &analysis.tree.arena;
    let reconciler = analysis.reconciler();
    arena
        .preorder(analysis.tree.root)
        .into_iter()
        .filter(|&idx| {
            matches!(
                arena.kind(idx),
                Some(NodeKind::Fun { .. } | NodeKind::Variable { .. } | NodeKind::Binder { .. })
            )
        })
        .filter(|&idx| {
            reconciler
                .name_range(arena, idx)
                .is_some_and(|range| range.contains(position))
        })
        .last()
}

/// Whether `name` is a valid Links identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '\'')
        && !is_keyword(name)
}

const KEYWORDS: &[&str] = &[
    "alien", "as", "case", "client", "database", "default", "delete", "do", "else", "false",
    "for", "form", "formlet", "from", "fun", "if", "in", "insert", "linfun", "module", "mutual",
    "native", "nil", "on", "op", "orderby", "page", "query", "readonly", "receive", "returning",
    "server", "set", "sig", "switch", "table", "true", "typename", "update", "values", "var",
    "where", "with", "yields",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(is_valid_identifier("total"));
        assert!(is_valid_identifier("x'"));
        assert!(is_valid_identifier("_tmp1"));
        assert!(!is_valid_identifier("1x"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("has space"));
        assert!(!is_valid_identifier("fun"));
    }
}

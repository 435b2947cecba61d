//! Document symbols.
//!
//! Outline of a Links document: functions, with the functions and `var`
//! bindings declared inside their bodies nested beneath them.
//!
//! - `range` encloses the whole declaration
//! - `selection_range` is just the identifier
//! - `container_name` names the enclosing function, for flat symbol lists

use linkscope_binder::DeclarationKind;
use linkscope_common::Range;
use linkscope_syntax::NodeIndex;
use rustc_hash::FxHashSet;

use crate::document::DocumentAnalysis;
use crate::hover::HoverProvider;

/// A symbol kind (matches LSP SymbolKind values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum SymbolKind {
    Function = 12,
    Variable = 13,
}

impl From<SymbolKind> for u8 {
    fn from(kind: SymbolKind) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for SymbolKind {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            12 => Ok(Self::Function),
            13 => Ok(Self::Variable),
            _ => Err("unsupported symbol kind"),
        }
    }
}

/// An entry in the document outline.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSymbol {
    pub name: String,
    /// The signature of a function.
    pub detail: Option<String>,
    pub kind: SymbolKind,
    pub range: Range,
    pub selection_range: Range,
    pub container_name: Option<String>,
    pub children: Vec<Self>,
}

impl DocumentSymbol {
    pub fn new(name: String, kind: SymbolKind, range: Range, selection_range: Range) -> Self {
        Self {
            name,
            detail: None,
            kind,
            range,
            selection_range,
            container_name: None,
            children: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_container_name(mut self, container: String) -> Self {
        self.container_name = Some(container);
        self
    }
}

/// Document symbols provider.
pub struct DocumentSymbolsProvider<'a> {
    analysis: &'a DocumentAnalysis,
}

impl<'a> DocumentSymbolsProvider<'a> {
    pub fn new(analysis: &'a DocumentAnalysis) -> Self {
        Self { analysis }
    }

    pub fn document_symbols(&self) -> Vec<DocumentSymbol> {
        let mut visited = FxHashSet::default();
        self.collect(self.analysis.tree.root, None, &mut visited)
    }

    /// Symbols declared below `node`, stopping at each declaration's own
    /// subtree, which becomes that symbol's children.
    fn collect(
        &self,
        node: NodeIndex,
        container: Option<&str>,
        visited: &mut FxHashSet<NodeIndex>,
    ) -> Vec<DocumentSymbol> {
        let arena = &self.analysis.tree.arena;
        let mut out = Vec::new();
        for &child in arena.children(node) {
            if !visited.insert(child) {
                continue;
            }
            match self.symbol_for(child) {
                Some(mut symbol) => {
                    if let Some(container) = container {
                        symbol = symbol.with_container_name(container.to_string());
                    }
                    if symbol.kind == SymbolKind::Function {
                        let name = symbol.name.clone();
                        symbol.children = self.collect(child, Some(&name), visited);
                    }
                    out.push(symbol);
                }
                None => out.extend(self.collect(child, container, visited)),
            }
        }
        out
    }

    fn symbol_for(&self, node: NodeIndex) -> Option<DocumentSymbol> {
        let arena = &self.analysis.tree.arena;
        let declaration = self.analysis.index.declaration_at(node)?;
        let kind = match declaration.kind {
            DeclarationKind::Function => SymbolKind::Function,
            DeclarationKind::Let => SymbolKind::Variable,
            _ => return None,
        };
        let reconciler = self.analysis.reconciler();
        let selection_range = reconciler.name_range(arena, node)?;
        let range = arena
            .span(node)
            .map(|span| reconciler.reconcile_span(span))
            .unwrap_or(selection_range);

        let symbol = DocumentSymbol::new(declaration.name.clone(), kind, range, selection_range);
        if kind != SymbolKind::Function {
            return Some(symbol);
        }
        let detail = HoverProvider::new(self.analysis).function_signature(node);
        Some(match detail {
            Some(detail) => symbol.with_detail(detail),
            None => symbol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_kind_serializes_as_lsp_number() {
        assert_eq!(serde_json::to_string(&SymbolKind::Function).unwrap(), "12");
        assert_eq!(serde_json::to_string(&SymbolKind::Variable).unwrap(), "13");
        let back: SymbolKind = serde_json::from_str("13").unwrap();
        assert_eq!(back, SymbolKind::Variable);
        assert!(serde_json::from_str::<SymbolKind>("5").is_err());
    }
}

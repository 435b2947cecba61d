//! Semantic tokens.
//!
//! Classifies identifiers, constants and markup using the binding index, then
//! narrows each node to the exact columns the editor should colour.
//!
//! # Encoding
//! `semantic_tokens` returns a flat list of integers in delta-encoded format:
//! `[deltaLine, deltaStartChar, length, tokenType, tokenModifiers]`
//!
//! Each token is encoded relative to the previous token.

use linkscope_binder::{OccurrenceKind, builtins};
use linkscope_common::Range;
use linkscope_syntax::{Classification, Literal, NodeIndex, NodeKind};
use serde::Serialize;

use crate::document::DocumentAnalysis;

/// Token types in legend order.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticTokenType {
    Variable = 0,
    Function = 1,
    String = 2,
    Number = 3,
    Property = 4,
    EnumMember = 5,
    Type = 6,
}

impl SemanticTokenType {
    pub const ALL: [SemanticTokenType; 7] = [
        SemanticTokenType::Variable,
        SemanticTokenType::Function,
        SemanticTokenType::String,
        SemanticTokenType::Number,
        SemanticTokenType::Property,
        SemanticTokenType::EnumMember,
        SemanticTokenType::Type,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SemanticTokenType::Variable => "variable",
            SemanticTokenType::Function => "function",
            SemanticTokenType::String => "string",
            SemanticTokenType::Number => "number",
            SemanticTokenType::Property => "property",
            SemanticTokenType::EnumMember => "enumMember",
            SemanticTokenType::Type => "type",
        }
    }
}

/// Token modifiers (bit flags, legend order).
pub mod semantic_token_modifiers {
    pub const DECLARATION: u32 = 1 << 0;
    pub const UNUSED: u32 = 1 << 1;
    pub const DEFAULT_LIBRARY: u32 = 1 << 2;

    pub const NAMES: [&str; 3] = ["declaration", "unused", "defaultLibrary"];
}

/// Names the client needs to decode token types and modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticTokensLegend {
    pub token_types: Vec<&'static str>,
    pub token_modifiers: Vec<&'static str>,
}

pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: SemanticTokenType::ALL.iter().map(|t| t.name()).collect(),
        token_modifiers: semantic_token_modifiers::NAMES.to_vec(),
    }
}

/// Token type and modifiers for a classification.
pub fn token_for(classification: Classification) -> (SemanticTokenType, u32) {
    use semantic_token_modifiers::{DECLARATION, UNUSED};
    match classification {
        Classification::UsedVariable => (SemanticTokenType::Variable, 0),
        Classification::UnusedVariable => (SemanticTokenType::Variable, UNUSED),
        Classification::UsedFunction => (SemanticTokenType::Function, DECLARATION),
        Classification::UnusedFunction => (SemanticTokenType::Function, DECLARATION | UNUSED),
        Classification::FunctionCall => (SemanticTokenType::Function, 0),
        Classification::StringConstant => (SemanticTokenType::String, 0),
        Classification::NumberConstant => (SemanticTokenType::Number, 0),
        Classification::Projection => (SemanticTokenType::Property, 0),
        Classification::VariantTag => (SemanticTokenType::EnumMember, 0),
        Classification::MarkupDeclaration | Classification::MarkupTag => {
            (SemanticTokenType::Type, 0)
        }
        Classification::MarkupAttribute => (SemanticTokenType::Property, 0),
    }
}

/// Builder for the delta-encoded token array.
///
/// Tokens must be pushed in order of appearance in the file (by line, then by column).
#[derive(Debug, Default)]
pub struct SemanticTokensBuilder {
    data: Vec<u32>,
    prev_line: u32,
    prev_char: u32,
}

impl SemanticTokensBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        line: u32,
        start_char: u32,
        length: u32,
        token_type: SemanticTokenType,
        modifiers: u32,
    ) {
        let delta_line = line.saturating_sub(self.prev_line);
        let delta_start = if delta_line == 0 {
            start_char.saturating_sub(self.prev_char)
        } else {
            start_char
        };

        self.data.push(delta_line);
        self.data.push(delta_start);
        self.data.push(length);
        self.data.push(token_type as u32);
        self.data.push(modifiers);

        self.prev_line = line;
        self.prev_char = start_char;
    }

    pub fn build(self) -> Vec<u32> {
        self.data
    }
}

/// Provider for semantic tokens.
pub struct SemanticTokensProvider<'a> {
    analysis: &'a DocumentAnalysis,
}

impl<'a> SemanticTokensProvider<'a> {
    pub fn new(analysis: &'a DocumentAnalysis) -> Self {
        Self { analysis }
    }

    /// Every classified range in the document, ordered by position. Each
    /// range is classified once; the first classification in document order
    /// wins.
    pub fn classify(&self) -> Vec<(Range, Classification)> {
        let mut out: Vec<(Range, Classification)> = self
            .classified_nodes()
            .into_iter()
            .flat_map(|(node, classification)| {
                self.analysis
                    .reconciler()
                    .narrow(&self.analysis.tree.arena, node, classification)
                    .into_iter()
                    .filter(|range| range.start < range.end)
                    .map(move |range| (range, classification))
            })
            .collect();
        out.sort_by_key(|&(range, _)| (range.start, range.end));
        out.dedup_by_key(|&mut (range, _)| range);
        out
    }

    /// Delta-encoded tokens for `classify`.
    pub fn semantic_tokens(&self) -> Vec<u32> {
        let arena = &self.analysis.tree.arena;
        let library_calls: Vec<Range> = self
            .analysis
            .index
            .unresolved()
            .filter(|o| o.kind == OccurrenceKind::Call && builtins::is_builtin(&o.name))
            .filter_map(|o| self.analysis.reconciler().name_range(arena, o.node))
            .collect();

        let mut builder = SemanticTokensBuilder::new();
        for (range, classification) in self.classify() {
            if !range.is_single_line() {
                continue;
            }
            let (token_type, mut modifiers) = token_for(classification);
            if classification == Classification::FunctionCall && library_calls.contains(&range) {
                modifiers |= semantic_token_modifiers::DEFAULT_LIBRARY;
            }
            builder.push(
                range.start.line,
                range.start.character,
                range.end.character - range.start.character,
                token_type,
                modifiers,
            );
        }
        builder.build()
    }

    /// Nodes to highlight and how, in document order.
    fn classified_nodes(&self) -> Vec<(NodeIndex, Classification)> {
        let arena = &self.analysis.tree.arena;
        let index = &self.analysis.index;
        let mut out = Vec::new();

        for node in arena.preorder(self.analysis.tree.root) {
            if let Some(declaration) = index.declaration_at(node) {
                let used = index.is_used(node);
                let classification = match (declaration.kind.is_function(), used) {
                    (true, true) => Classification::UsedFunction,
                    (true, false) => Classification::UnusedFunction,
                    (false, true) => Classification::UsedVariable,
                    (false, false) => Classification::UnusedVariable,
                };
                out.push((node, classification));
                continue;
            }
            if let Some(occurrence) = index.occurrence_at(node) {
                let classification = match occurrence.kind {
                    OccurrenceKind::Variable => Classification::UsedVariable,
                    OccurrenceKind::Call | OccurrenceKind::HandlerReference => {
                        Classification::FunctionCall
                    }
                };
                out.push((node, classification));
                continue;
            }

            match arena.kind(node) {
                Some(NodeKind::Constant(Literal::String(_))) => {
                    out.push((node, Classification::StringConstant));
                }
                Some(NodeKind::Constant(Literal::Number(_))) => {
                    out.push((node, Classification::NumberConstant));
                }
                Some(NodeKind::Projection { .. }) => out.push((node, Classification::Projection)),
                Some(NodeKind::Constructor { .. }) => out.push((node, Classification::VariantTag)),
                Some(NodeKind::Xml { .. }) => {
                    out.push((node, Classification::MarkupDeclaration));
                    out.push((node, Classification::MarkupTag));
                }
                Some(NodeKind::XmlAttr { .. }) => out.push((node, Classification::MarkupAttribute)),
                _ => {}
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_delta_encodes() {
        let mut builder = SemanticTokensBuilder::new();
        builder.push(0, 4, 3, SemanticTokenType::Function, semantic_token_modifiers::DECLARATION);
        builder.push(0, 10, 1, SemanticTokenType::Variable, 0);
        builder.push(2, 2, 5, SemanticTokenType::String, 0);
        assert_eq!(
            builder.build(),
            vec![0, 4, 3, 1, 1, 0, 6, 1, 0, 0, 2, 2, 5, 2, 0]
        );
    }

    #[test]
    fn test_legend_matches_enum_order() {
        let legend = legend();
        for token in SemanticTokenType::ALL {
            assert_eq!(legend.token_types[token as usize], token.name());
        }
        assert_eq!(legend.token_modifiers.len(), 3);
    }
}

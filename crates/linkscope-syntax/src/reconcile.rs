//! Position reconciliation.
//!
//! The parser wraps each document in a synthetic function before parsing, so
//! every position it reports is shifted by a fixed number of lines and by the
//! parser's column origin. `PositionShift` undoes that shift.
//!
//! Reconciliation is a single-application transform: it consumes native
//! coordinates (`NativePosition`/`NativeSpan`) and produces editor
//! coordinates (`Position`/`Range`). Shifting an editor range again is not a
//! no-op, which is why the two coordinate systems are separate types.
//!
//! The second half of this module narrows a coarse node span to the exact
//! sub-span a highlighting classification needs: only a function's name,
//! only a call's callee, only a string's quoted text.

use linkscope_common::config::PositionShiftConfig;
use linkscope_common::position::{byte_to_utf16_column, utf16_len, utf16_to_byte_index};
use linkscope_common::{LineMap, NativePosition, NativeSpan, Position, Range};
use memchr::memmem;
use serde::Serialize;
use smallvec::SmallVec;

use crate::node::{Literal, NodeArena, NodeIndex, NodeKind};

/// Width of the `fun ` keyword that precedes a function name.
pub const FUN_KEYWORD_WIDTH: u32 = 4;

/// Narrowed ranges for one node; most classifications produce one.
pub type NarrowedRanges = SmallVec<[Range; 2]>;

/// Fixed offset between parser-native and editor coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionShift {
    pub line: u32,
    pub column: u32,
}

impl Default for PositionShift {
    fn default() -> Self {
        PositionShift::from_config(&PositionShiftConfig::default())
    }
}

impl PositionShift {
    pub const fn new(line: u32, column: u32) -> Self {
        PositionShift { line, column }
    }

    pub fn from_config(config: &PositionShiftConfig) -> Self {
        PositionShift {
            line: config.line,
            column: config.column,
        }
    }

    /// Map a native position to editor coordinates.
    pub fn reconcile(self, position: NativePosition) -> Position {
        Position::new(
            position.line.saturating_sub(self.line),
            position.column.saturating_sub(self.column),
        )
    }

    pub fn reconcile_span(self, span: NativeSpan) -> Range {
        Range::new(self.reconcile(span.start), self.reconcile(span.end))
    }

    /// Map an editor request position into the tree's coordinates.
    pub fn to_native(self, position: Position) -> NativePosition {
        NativePosition::new(
            position.line.saturating_add(self.line),
            position.character.saturating_add(self.column),
        )
    }

    /// Editor line of a native line, `None` for lines the wrapper added.
    pub fn editor_line(self, native_line: u32) -> Option<u32> {
        native_line.checked_sub(self.line)
    }
}

/// Semantic-highlighting classification of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Classification {
    UsedVariable,
    UnusedVariable,
    UsedFunction,
    UnusedFunction,
    FunctionCall,
    StringConstant,
    NumberConstant,
    Projection,
    VariantTag,
    MarkupDeclaration,
    MarkupTag,
    MarkupAttribute,
}

/// Reconciles and narrows spans of one document.
pub struct Reconciler<'a> {
    shift: PositionShift,
    source: &'a str,
    line_map: &'a LineMap,
}

impl<'a> Reconciler<'a> {
    pub fn new(shift: PositionShift, source: &'a str, line_map: &'a LineMap) -> Self {
        Self {
            shift,
            source,
            line_map,
        }
    }

    pub fn shift(&self) -> PositionShift {
        self.shift
    }

    pub fn reconcile(&self, position: NativePosition) -> Position {
        self.shift.reconcile(position)
    }

    pub fn reconcile_span(&self, span: NativeSpan) -> Range {
        self.shift.reconcile_span(span)
    }

    /// Source text of the editor line holding native line `native_line`.
    pub fn native_line_text(&self, native_line: u32) -> Option<&'a str> {
        let line = self.shift.editor_line(native_line)?;
        self.line_map.line_text(line as usize, self.source)
    }

    /// Single-line range of `length` columns starting at `start`.
    fn run(&self, start: NativePosition, length: u32) -> Range {
        let start = self.reconcile(start);
        Range::on_line(start.line, start.character, length)
    }

    /// Range of the identifier a node introduces or references.
    ///
    /// For function declarations this is the name after the `fun` keyword.
    pub fn name_range(&self, arena: &NodeArena, node: NodeIndex) -> Option<Range> {
        let n = arena.get(node)?;
        match &n.kind {
            NodeKind::Fun { name } => self.function_name_range(n.span, name),
            NodeKind::Variable { name } | NodeKind::Binder { name, .. } => {
                Some(self.run(n.span.start, utf16_len(name)))
            }
            _ => None,
        }
    }

    /// Narrow `node` to the sub-spans `classification` highlights.
    pub fn narrow(
        &self,
        arena: &NodeArena,
        node: NodeIndex,
        classification: Classification,
    ) -> NarrowedRanges {
        let mut out = NarrowedRanges::new();
        let Some(n) = arena.get(node) else {
            return out;
        };

        let range = match (classification, &n.kind) {
            (
                Classification::UsedVariable
                | Classification::UnusedVariable
                | Classification::UsedFunction
                | Classification::UnusedFunction,
                NodeKind::Fun { .. } | NodeKind::Variable { .. } | NodeKind::Binder { .. },
            ) => self.name_range(arena, node),
            (Classification::FunctionCall, NodeKind::FunCall) => {
                let callee = arena.children(node).first().copied();
                match callee.and_then(|c| arena.kind(c)) {
                    Some(NodeKind::Variable { name }) => Some(self.run(n.span.start, utf16_len(name))),
                    _ => None,
                }
            }
            (Classification::FunctionCall, NodeKind::Variable { name }) => {
                Some(self.run(n.span.start, utf16_len(name)))
            }
            (Classification::StringConstant, NodeKind::Constant(Literal::String(text))) => {
                self.locate_literal(n.span, text)
            }
            (Classification::NumberConstant, NodeKind::Constant(Literal::Number(text))) => {
                Some(self.run(n.span.start, utf16_len(text)))
            }
            (Classification::Projection, NodeKind::Projection { field }) => {
                let length = utf16_len(field);
                let start = NativePosition::new(n.span.end.line, n.span.end.column.saturating_sub(length));
                Some(self.run(start, length))
            }
            (Classification::VariantTag, NodeKind::Constructor { tag }) => {
                Some(self.run(n.span.start, utf16_len(tag)))
            }
            (Classification::MarkupDeclaration, NodeKind::Xml { tag }) => {
                Some(self.run(n.span.start.advance(1), utf16_len(tag)))
            }
            (Classification::MarkupTag, NodeKind::Xml { tag }) => self.closing_tag_range(n.span, tag),
            (Classification::MarkupAttribute, NodeKind::XmlAttr { name }) => {
                Some(self.run(n.span.start, utf16_len(name)))
            }
            _ => None,
        };

        if let Some(range) = range {
            out.push(range);
        }
        out
    }

    /// `fun name(...)`: the name starts after the keyword. When the source
    /// disagrees (annotations, odd spacing) the name is searched on the line.
    fn function_name_range(&self, span: NativeSpan, name: &str) -> Option<Range> {
        let length = utf16_len(name);
        let guess = span.start.advance(FUN_KEYWORD_WIDTH);
        // The wrapper function starts above the document.
        let line = self.shift.editor_line(span.start.line)?;
        let Some(line_text) = self.native_line_text(span.start.line) else {
            return Some(self.run(guess, length));
        };

        let guess_column = guess.column.saturating_sub(self.shift.column);
        if let Some(byte) = utf16_to_byte_index(line_text, guess_column) {
            if line_text[byte..].starts_with(name) && is_word_end(line_text, byte + name.len()) {
                return Some(self.run(guess, length));
            }
        }

        let from_column = span.start.column.saturating_sub(self.shift.column);
        let from = utf16_to_byte_index(line_text, from_column).unwrap_or(0);
        let byte = find_word(line_text, name, from)?;
        let column = byte_to_utf16_column(line_text, byte);
        Some(Range::on_line(line, column, length))
    }

    /// Locate a string literal's text on its source line. The parser's
    /// columns inside quoted content are unreliable, so search inside the
    /// node span first and fall back to the whole line.
    fn locate_literal(&self, span: NativeSpan, text: &str) -> Option<Range> {
        let line = self.shift.editor_line(span.start.line)?;
        let line_text = self.native_line_text(span.start.line)?;
        let length = utf16_len(text);

        let from_column = span.start.column.saturating_sub(self.shift.column);
        let from = utf16_to_byte_index(line_text, from_column).unwrap_or(line_text.len());
        let within = if span.is_single_line() {
            let to_column = span.end.column.saturating_sub(self.shift.column);
            utf16_to_byte_index(line_text, to_column).unwrap_or(line_text.len())
        } else {
            line_text.len()
        };

        let found = line_text
            .get(from..within.max(from))
            .and_then(|window| memmem::find(window.as_bytes(), text.as_bytes()))
            .map(|offset| from + offset)
            .or_else(|| memmem::find(line_text.as_bytes(), text.as_bytes()))?;

        let column = byte_to_utf16_column(line_text, found);
        Some(Range::on_line(line, column, length))
    }

    /// The name inside `</tag>` when the element ends with a closing tag.
    fn closing_tag_range(&self, span: NativeSpan, tag: &str) -> Option<Range> {
        let line_text = self.native_line_text(span.end.line)?;
        let end_column = span.end.column.saturating_sub(self.shift.column);
        let end = utf16_to_byte_index(line_text, end_column)?;
        let closing = format!("</{tag}>");
        if !line_text[..end].ends_with(&closing) {
            return None;
        }
        let length = utf16_len(tag);
        let start = NativePosition::new(span.end.line, span.end.column.saturating_sub(length + 1));
        Some(self.run(start, length))
    }
}

/// Pure form of `Reconciler::narrow` for callers that hold no reconciler.
pub fn narrow(
    arena: &NodeArena,
    node: NodeIndex,
    classification: Classification,
    source: &str,
    shift: PositionShift,
) -> NarrowedRanges {
    let line_map = LineMap::build(source);
    Reconciler::new(shift, source, &line_map).narrow(arena, node, classification)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '\''
}

fn is_word_end(text: &str, byte: usize) -> bool {
    text[byte..].chars().next().is_none_or(|ch| !is_ident_char(ch))
}

/// Byte index of the first whole-word occurrence of `word` at or after `from`.
pub fn find_word(text: &str, word: &str, from: usize) -> Option<usize> {
    if word.is_empty() {
        return None;
    }
    let haystack = text.get(from..)?;
    let finder = memmem::Finder::new(word.as_bytes());
    for offset in finder.find_iter(haystack.as_bytes()) {
        let byte = from + offset;
        let starts_word = text[..byte].chars().next_back().is_none_or(|ch| !is_ident_char(ch));
        if starts_word && is_word_end(text, byte + word.len()) {
            return Some(byte);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_subtracts_shift() {
        let shift = PositionShift::new(1, 1);
        assert_eq!(shift.reconcile(NativePosition::new(3, 5)), Position::new(2, 4));
        assert_eq!(shift.to_native(Position::new(2, 4)), NativePosition::new(3, 5));
    }

    #[test]
    fn test_reconcile_saturates_on_wrapper_lines() {
        let shift = PositionShift::new(1, 1);
        assert_eq!(shift.reconcile(NativePosition::new(0, 0)), Position::new(0, 0));
        assert_eq!(shift.editor_line(0), None);
    }

    #[test]
    fn test_find_word_respects_boundaries() {
        assert_eq!(find_word("max x", "x", 0), Some(4));
        assert_eq!(find_word("x'", "x", 0), None);
        assert_eq!(find_word("f(x, x)", "x", 3), Some(5));
    }
}

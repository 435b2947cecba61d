//! Helpers for building parser-shaped trees in tests.
//!
//! Spans are computed from the source text the way the parser reports them:
//! editor coordinates shifted by the default `PositionShift`, with the whole
//! document wrapped in a `Fun: dummy_wrapper` node one line above the text.

use linkscope_common::config::DEFAULT_WRAPPER_NAME;
use linkscope_common::{LineMap, NativePosition, NativeSpan, Position};

use crate::adapter::{SyntaxTree, TreeError};
use crate::raw::RawNode;
use crate::reconcile::PositionShift;

pub fn leaf(label: impl Into<String>, span: NativeSpan) -> RawNode {
    RawNode::leaf(label, span)
}

pub fn node(label: impl Into<String>, span: NativeSpan, children: Vec<RawNode>) -> RawNode {
    RawNode::interior(label, span, children)
}

/// A source document plus span helpers.
pub struct Fixture {
    pub source: String,
    pub shift: PositionShift,
    line_map: LineMap,
}

impl Fixture {
    pub fn new(source: &str) -> Self {
        Fixture {
            source: source.to_string(),
            shift: PositionShift::default(),
            line_map: LineMap::build(source),
        }
    }

    /// Native position of a byte offset.
    pub fn native_at(&self, offset: usize) -> NativePosition {
        self.shift
            .to_native(self.line_map.offset_to_position(offset as u32, &self.source))
    }

    /// Editor position of the `nth` (0-based) occurrence of `needle`.
    pub fn position_of(&self, needle: &str, nth: usize) -> Position {
        let offset = self.offset_of(needle, nth);
        self.line_map.offset_to_position(offset as u32, &self.source)
    }

    fn offset_of(&self, needle: &str, nth: usize) -> usize {
        self.source
            .match_indices(needle)
            .nth(nth)
            .map(|(offset, _)| offset)
            .unwrap_or_else(|| panic!("fixture source has no occurrence {nth} of {needle:?}"))
    }

    /// Native span covering the `nth` occurrence of `needle`.
    pub fn word_span(&self, needle: &str, nth: usize) -> NativeSpan {
        let offset = self.offset_of(needle, nth);
        NativeSpan::new(self.native_at(offset), self.native_at(offset + needle.len()))
    }

    /// From the start of occurrence `start_nth` of `from` to the end of
    /// occurrence `end_nth` of `to`.
    pub fn span_between(&self, from: &str, start_nth: usize, to: &str, end_nth: usize) -> NativeSpan {
        let start = self.offset_of(from, start_nth);
        let end = self.offset_of(to, end_nth) + to.len();
        NativeSpan::new(self.native_at(start), self.native_at(end))
    }

    /// Span of the synthetic wrapper: from the line above the document to one
    /// past its last line.
    pub fn document_span(&self) -> NativeSpan {
        let last = self.line_map.line_count() as u32;
        NativeSpan::new(
            NativePosition::new(self.shift.line - 1, self.shift.column),
            NativePosition::new(last + self.shift.line, self.shift.column + 1),
        )
    }

    /// Wrap top-level statements in the synthetic wrapper function.
    pub fn wrap(&self, statements: Vec<RawNode>) -> RawNode {
        node(
            format!("Fun: {DEFAULT_WRAPPER_NAME}"),
            self.document_span(),
            vec![node("Block", self.document_span(), statements)],
        )
    }

    pub fn build(&self, raw: &RawNode) -> Result<SyntaxTree, TreeError> {
        SyntaxTree::build(raw, &self.source, self.shift)
    }

    /// Wrap and build, panicking on malformed fixtures.
    pub fn tree(&self, statements: Vec<RawNode>) -> SyntaxTree {
        let raw = self.wrap(statements);
        self.build(&raw)
            .unwrap_or_else(|e| panic!("fixture tree failed to build: {e}"))
    }

    /// Wrapped statements in the parser's JSON form.
    pub fn tree_json(&self, statements: Vec<RawNode>) -> String {
        self.wrap(statements).to_json()
    }

    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }
}

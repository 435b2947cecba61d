//! Span repair passes run once by the adapter after the arena is built.
//!
//! The parser reports imprecise spans in two places: the value pieces of a
//! markup attribute, and literals or markup text spanning several lines.

use linkscope_common::position::{byte_to_utf16_column, utf16_len};
use linkscope_common::{LineMap, NativePosition, NativeSpan};
use tracing::trace;

use crate::node::{Literal, Node, NodeArena, NodeIndex, NodeKind, NodeShape};
use crate::reconcile::PositionShift;

/// Byte offset of a native position in `source`.
fn native_to_offset(
    position: NativePosition,
    source: &str,
    line_map: &LineMap,
    shift: PositionShift,
) -> Option<usize> {
    shift.editor_line(position.line)?;
    let editor = shift.reconcile(position);
    line_map
        .position_to_offset(editor, source)
        .map(|offset| offset as usize)
}

fn offset_to_native(
    offset: usize,
    source: &str,
    line_map: &LineMap,
    shift: PositionShift,
) -> NativePosition {
    shift.to_native(line_map.offset_to_position(offset as u32, source))
}

/// Recompute the spans of constant value pieces inside `name="..."`.
///
/// The first piece starts right after the opening quote, every later piece
/// right after its previous sibling. A constant ends where its next sibling
/// starts; the last one ends at the attribute's closing quote, found by
/// scanning back from the attribute's next sibling (or the attribute end).
pub fn repair_attribute_content(
    arena: &mut NodeArena,
    root: NodeIndex,
    source: &str,
    line_map: &LineMap,
    shift: PositionShift,
) {
    let attributes: Vec<NodeIndex> = arena
        .preorder(root)
        .into_iter()
        .filter(|&idx| matches!(arena.kind(idx), Some(NodeKind::XmlAttr { .. })))
        .collect();

    for attr in attributes {
        let Some(node) = arena.get(attr) else {
            continue;
        };
        let NodeKind::XmlAttr { name } = &node.kind else {
            continue;
        };
        let attr_span = node.span;
        // `name="` precedes the first piece.
        let value_start = attr_span.start.advance(utf16_len(name) + 2);

        let limit = arena
            .next_sibling(attr)
            .and_then(|s| arena.span(s))
            .map_or(attr_span.end, |s| s.start.min(attr_span.end).max(attr_span.start));
        let closing = closing_quote(limit, attr_span.start, source, line_map, shift).unwrap_or(limit);

        let children = arena.children(attr).to_vec();
        let mut cursor = value_start;
        for (i, &child) in children.iter().enumerate() {
            let is_constant = matches!(arena.kind(child), Some(NodeKind::Constant(_)));
            if !is_constant {
                if let Some(span) = arena.span(child) {
                    cursor = span.end;
                }
                continue;
            }
            let end = children
                .get(i + 1)
                .and_then(|&next| arena.span(next))
                .map_or(closing, |s| s.start)
                .max(cursor);
            let repaired = NativeSpan::new(cursor, end);
            if let Some(n) = arena.get_mut(child) {
                trace!(from = %n.span, to = %repaired, "attribute piece repaired");
                n.span = repaired;
            }
            cursor = end;
        }
    }
}

/// Position of the last `"` strictly before `limit` and not before `floor`.
fn closing_quote(
    limit: NativePosition,
    floor: NativePosition,
    source: &str,
    line_map: &LineMap,
    shift: PositionShift,
) -> Option<NativePosition> {
    let end = native_to_offset(limit, source, line_map, shift)?;
    let start = native_to_offset(floor, source, line_map, shift).unwrap_or(0);
    let window = source.as_bytes().get(start..end)?;
    let quote = memchr::memrchr(b'"', window)?;
    Some(offset_to_native(start + quote, source, line_map, shift))
}

/// Replace every string constant or markup text containing a newline by one
/// leaf per line. The first piece keeps the original node slot; the others
/// are inserted right after it in the parent's child list. The root is never
/// split.
pub fn split_multiline_literals(
    arena: &mut NodeArena,
    root: NodeIndex,
    source: &str,
    line_map: &LineMap,
    shift: PositionShift,
) {
    let candidates: Vec<NodeIndex> = arena
        .preorder(root)
        .into_iter()
        .filter(|&idx| idx != root)
        .filter(|&idx| match arena.kind(idx) {
            Some(NodeKind::Constant(Literal::String(text))) | Some(NodeKind::Text { text }) => {
                text.contains('\n')
            }
            _ => false,
        })
        .collect();

    for node in candidates {
        split_node(arena, node, source, line_map, shift);
    }
}

fn split_node(
    arena: &mut NodeArena,
    index: NodeIndex,
    source: &str,
    line_map: &LineMap,
    shift: PositionShift,
) {
    let Some(node) = arena.get(index) else {
        return;
    };
    let (text, is_string) = match &node.kind {
        NodeKind::Constant(Literal::String(text)) => (text.clone(), true),
        NodeKind::Text { text } => (text.clone(), false),
        _ => return,
    };
    let start = node.span.start;
    let parent = node.parent;

    let mut pieces: Vec<(String, NativeSpan)> = Vec::new();
    for (i, raw_line) in text.split('\n').enumerate() {
        let line_text = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        if i == 0 {
            let span = NativeSpan::new(start, start.advance(utf16_len(line_text)));
            pieces.push((line_text.to_string(), span));
            continue;
        }

        let piece = line_text.trim_start();
        if piece.is_empty() {
            continue;
        }
        let native_line = start.line + i as u32;
        let indent = shift
            .editor_line(native_line)
            .and_then(|line| line_map.line_text(line as usize, source))
            .map_or(0, |source_line| {
                let trimmed = source_line.len() - source_line.trim_start().len();
                byte_to_utf16_column(source_line, trimmed)
            });
        let piece_start = NativePosition::new(native_line, indent + shift.column);
        let span = NativeSpan::new(piece_start, piece_start.advance(utf16_len(piece)));
        pieces.push((piece.to_string(), span));
    }

    let make_kind = |piece: String| {
        if is_string {
            NodeKind::Constant(Literal::String(piece))
        } else {
            NodeKind::Text { text: piece }
        }
    };

    let mut pieces = pieces.into_iter();
    let Some((first_text, first_span)) = pieces.next() else {
        return;
    };
    if let Some(n) = arena.get_mut(index) {
        n.kind = make_kind(first_text);
        n.span = first_span;
    }

    let mut inserted = Vec::new();
    for (piece, span) in pieces {
        inserted.push(arena.add(Node {
            shape: NodeShape::Leaf,
            kind: make_kind(piece),
            span,
            parent,
            children: Vec::new(),
        }));
    }
    trace!(pieces = inserted.len() + 1, "multi-line literal split");
    if inserted.is_empty() {
        return;
    }

    let Some(position) = arena.child_position(index) else {
        return;
    };
    if let Some(p) = arena.get_mut(parent) {
        let tail = p.children.split_off(position + 1);
        p.children.extend(inserted);
        p.children.extend(tail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SyntaxTree;
    use crate::raw::{RawNode, decode_span};

    fn span(s: &str) -> NativeSpan {
        decode_span(s).unwrap()
    }

    fn texts(tree: &SyntaxTree, parent: NodeIndex) -> Vec<(String, String)> {
        tree.arena
            .children(parent)
            .iter()
            .map(|&c| {
                let n = tree.arena.get(c).unwrap();
                let text = match &n.kind {
                    NodeKind::Constant(lit) => lit.text().to_string(),
                    NodeKind::Text { text } => text.clone(),
                    other => format!("{other:?}"),
                };
                (text, n.span.to_string())
            })
            .collect()
    }

    #[test]
    fn test_split_string_constant() {
        // editor lines: 0 `var s = "ab`, 1 `   cd";`
        let source = "var s = \"ab\n   cd\";\n";
        let raw = RawNode::interior(
            "Val",
            span("1:1-2:8"),
            vec![
                RawNode::leaf("Binder: s", span("1:5-1:6")),
                RawNode::leaf("Constant: \"ab\n   cd\"", span("1:9-2:7")),
            ],
        );
        let tree = SyntaxTree::build(&raw, source, PositionShift::default()).unwrap();
        let pieces = texts(&tree, tree.root);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[1], ("\"ab".to_string(), "1:9-1:12".to_string()));
        assert_eq!(pieces[2], ("cd\"".to_string(), "2:4-2:7".to_string()));
    }

    #[test]
    fn test_split_skips_blank_lines() {
        let source = "<p>one\n\n  two</p>\n";
        let raw = RawNode::interior(
            "Xml: p",
            span("1:1-3:11"),
            vec![RawNode::leaf("TextNode: one\n\n  two", span("1:4-3:6"))],
        );
        let tree = SyntaxTree::build(&raw, source, PositionShift::default()).unwrap();
        let pieces = texts(&tree, tree.root);
        assert_eq!(
            pieces,
            vec![
                ("one".to_string(), "1:4-1:7".to_string()),
                ("two".to_string(), "3:3-3:6".to_string()),
            ]
        );
        let second = tree.arena.children(tree.root)[1];
        assert_eq!(tree.arena.parent(second), tree.root);
    }

    #[test]
    fn test_attribute_pieces_are_respanned() {
        // <a href="x{y}z">
        let source = "<a href=\"x{y}z\">link</a>\n";
        let raw = RawNode::interior(
            "Xml: a",
            span("1:1-1:25"),
            vec![
                RawNode::interior(
                    "XmlAttr: href",
                    span("1:4-1:16"),
                    vec![
                        RawNode::leaf("Constant: \"x\"", span("1:1-1:1")),
                        RawNode::leaf("Variable: y", span("1:12-1:13")),
                        RawNode::leaf("Constant: \"z\"", span("1:1-1:1")),
                    ],
                ),
                RawNode::leaf("TextNode: link", span("1:17-1:21")),
            ],
        );
        let tree = SyntaxTree::build(&raw, source, PositionShift::default()).unwrap();
        let attr = tree.arena.children(tree.root)[0];
        let spans: Vec<String> = tree
            .arena
            .children(attr)
            .iter()
            .map(|&c| tree.arena.span(c).unwrap().to_string())
            .collect();
        assert_eq!(spans, vec!["1:10-1:12", "1:12-1:13", "1:13-1:15"]);
    }
}

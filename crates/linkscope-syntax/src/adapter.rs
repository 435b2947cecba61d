//! Tree adapter.
//!
//! Turns the parser's structured output into a `NodeArena` with parent
//! back-references, then runs the two repair passes (attribute content and
//! multi-line literals). Malformed input aborts the whole build; there is no
//! partial recovery.

use std::fmt;

use linkscope_common::LineMap;
use linkscope_common::limits::MAX_TREE_DEPTH;
use tracing::{debug, trace};

use crate::label::decode_label;
use crate::node::{BinderRole, Node, NodeArena, NodeIndex, NodeKind};
use crate::raw::{RawNode, path_string};
use crate::reconcile::PositionShift;
use crate::repair;

/// Error raised when the structured parser output cannot be turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The payload is not valid JSON.
    InvalidJson(String),
    /// A node does not have the `[kind, label, span, children]` shape.
    MalformedNode { path: String, reason: String },
    /// A span could not be decoded, or ends before it starts.
    InvalidSpan { path: String, span: String },
    /// A label could not be decoded.
    InvalidLabel {
        path: String,
        label: String,
        reason: String,
    },
    /// A leaf-only label carries children.
    UnexpectedChildren { path: String, label: String },
    /// Nesting exceeds `MAX_TREE_DEPTH`.
    TooDeep { depth: usize },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::InvalidJson(reason) => write!(f, "invalid tree JSON: {reason}"),
            TreeError::MalformedNode { path, reason } => {
                write!(f, "malformed node at {path}: {reason}")
            }
            TreeError::InvalidSpan { path, span } => {
                write!(f, "invalid span '{span}' at {path}")
            }
            TreeError::InvalidLabel {
                path,
                label,
                reason,
            } => write!(f, "invalid label '{label}' at {path}: {reason}"),
            TreeError::UnexpectedChildren { path, label } => {
                write!(f, "leaf label '{label}' at {path} has children")
            }
            TreeError::TooDeep { depth } => {
                write!(f, "tree nesting depth {depth} exceeds the limit of {MAX_TREE_DEPTH}")
            }
        }
    }
}

impl std::error::Error for TreeError {}

/// A fully constructed and repaired syntax tree.
#[derive(Debug)]
pub struct SyntaxTree {
    pub arena: NodeArena,
    pub root: NodeIndex,
}

impl SyntaxTree {
    /// Decode the parser's JSON output and build the tree.
    pub fn from_json(json: &str, source: &str, shift: PositionShift) -> Result<Self, TreeError> {
        let raw = RawNode::from_json(json)?;
        Self::build(&raw, source, shift)
    }

    /// Build the arena from an already decoded tree and run the repair passes.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(raw: &RawNode, source: &str, shift: PositionShift) -> Result<Self, TreeError> {
        let mut arena = NodeArena::with_capacity(count_nodes(raw));
        let mut path = Vec::new();
        let root = add_node(&mut arena, raw, NodeIndex::NONE, &mut path)?;

        let line_map = LineMap::build(source);
        repair::repair_attribute_content(&mut arena, root, source, &line_map, shift);
        repair::split_multiline_literals(&mut arena, root, source, &line_map, shift);

        debug!(nodes = arena.len(), "syntax tree built");
        Ok(SyntaxTree { arena, root })
    }

    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.arena.get(index)
    }
}

fn count_nodes(raw: &RawNode) -> usize {
    let mut count = 0;
    let mut stack = vec![raw];
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.children.iter());
    }
    count
}

/// Add `raw` under `parent`. The parent already lives in the arena when its
/// children are created, so every back-reference is valid on construction.
fn add_node(
    arena: &mut NodeArena,
    raw: &RawNode,
    parent: NodeIndex,
    path: &mut Vec<usize>,
) -> Result<NodeIndex, TreeError> {
    if path.len() > MAX_TREE_DEPTH {
        return Err(TreeError::TooDeep { depth: path.len() });
    }

    let mut kind = decode_label(&raw.label).map_err(|reason| TreeError::InvalidLabel {
        path: path_string(path),
        label: raw.label.clone(),
        reason,
    })?;
    if kind.is_leaf_kind() && !raw.children.is_empty() {
        return Err(TreeError::UnexpectedChildren {
            path: path_string(path),
            label: raw.label.clone(),
        });
    }
    if let NodeKind::Binder { role, .. } = &mut kind {
        *role = BinderRole::for_binder_under(arena, parent);
    }
    trace!(label = %raw.label, span = %raw.span, "adding node");

    let index = arena.add(Node {
        shape: raw.shape,
        kind,
        span: raw.span,
        parent,
        children: Vec::with_capacity(raw.children.len()),
    });

    for (i, child) in raw.children.iter().enumerate() {
        path.push(i);
        let child_index = add_node(arena, child, index, path);
        path.pop();
        let child_index = child_index?;
        if let Some(node) = arena.get_mut(index) {
            node.children.push(child_index);
        }
    }

    Ok(index)
}


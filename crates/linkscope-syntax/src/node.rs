//! Arena-backed syntax tree.
//!
//! Nodes are stored contiguously in a `NodeArena` and referenced by
//! `NodeIndex`. Children are the owning edges; `parent` is a plain index used
//! only to climb towards enclosing scopes.

use linkscope_common::NativeSpan;
use serde::Serialize;

/// Index of a node in its `NodeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// Whether the parser reported the node as an interior node or a leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NodeShape {
    Interior,
    Leaf,
}

/// How a binder introduces its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BinderRole {
    /// `var x = ...`
    Let,
    /// A function parameter.
    Parameter,
    /// `for (x <- xs)`
    LoopVariable,
    /// `{ expr -> x }` inside a formlet.
    FormBinding,
    /// The row cursor of `update (r <-- t)` / `delete (r <-- t)`.
    UpdateCursor,
}

impl BinderRole {
    /// Role introduced by a binder-introducing construct, if `kind` is one.
    fn introduced_by(kind: &NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Params => Some(BinderRole::Parameter),
            NodeKind::Generator => Some(BinderRole::LoopVariable),
            NodeKind::FormBinding => Some(BinderRole::FormBinding),
            NodeKind::DbUpdate | NodeKind::DbDelete => Some(BinderRole::UpdateCursor),
            _ => None,
        }
    }

    /// Role of a binder placed under `parent`. Patterns may sit between the
    /// binder and the construct that introduces it, so the nearest
    /// introducing ancestor decides; a `Val` or a scope boundary in between
    /// makes it a plain `Let`.
    pub fn for_binder_under(arena: &NodeArena, parent: NodeIndex) -> Self {
        let mut current = parent;
        while let Some(kind) = arena.kind(current) {
            if let Some(role) = Self::introduced_by(kind) {
                return role;
            }
            if matches!(kind, NodeKind::Val) || kind.is_scope_boundary() {
                break;
            }
            current = arena.parent(current);
        }
        BinderRole::Let
    }
}

/// A literal constant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Literal {
    /// Source text of a string literal, quotes included. After multi-line
    /// splitting each piece holds the text visible on its own line.
    String(String),
    Number(String),
    /// Booleans, unit and anything else the parser prints as a constant.
    Other(String),
}

impl Literal {
    pub fn text(&self) -> &str {
        match self {
            Literal::String(text) | Literal::Number(text) | Literal::Other(text) => text,
        }
    }
}

/// Decoded node label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Fun { name: String },
    Funs,
    FunLit,
    Params,
    Block,
    Val,
    FunCall,
    Iteration,
    Generator,
    Formlet,
    FormBinding,
    FormletPlacement,
    DbUpdate,
    DbDelete,
    Projection { field: String },
    Constructor { tag: String },
    Xml { tag: String },
    XmlAttr { name: String },
    Variable { name: String },
    Binder { name: String, role: BinderRole },
    Constant(Literal),
    Text { text: String },
    Other { tag: String, payload: Option<String> },
}

impl NodeKind {
    /// Function declarations and the two function-signature marker kinds.
    pub fn is_scope_boundary(&self) -> bool {
        matches!(self, NodeKind::Fun { .. } | NodeKind::Funs | NodeKind::FunLit)
    }

    /// Kinds that only make sense as leaves.
    pub fn is_leaf_kind(&self) -> bool {
        matches!(
            self,
            NodeKind::Variable { .. }
                | NodeKind::Binder { .. }
                | NodeKind::Constant(_)
                | NodeKind::Text { .. }
        )
    }

    /// The identifier introduced or referenced by this node, if any.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            NodeKind::Fun { name } | NodeKind::Variable { name } | NodeKind::Binder { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }
}

/// A node in the syntax tree.
#[derive(Clone, Debug, Serialize)]
pub struct Node {
    pub shape: NodeShape,
    pub kind: NodeKind,
    pub span: NativeSpan,
    pub parent: NodeIndex,
    pub children: Vec<NodeIndex>,
}

/// Arena-based storage for syntax nodes.
#[derive(Debug, Default, Serialize)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena { nodes: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Add a node to the arena and return its index.
    pub fn add(&mut self, node: Node) -> NodeIndex {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        NodeIndex(index)
    }

    /// Get a node by index.
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    /// Get a mutable node by index.
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, index: NodeIndex) -> Option<&NodeKind> {
        self.get(index).map(|n| &n.kind)
    }

    pub fn span(&self, index: NodeIndex) -> Option<NativeSpan> {
        self.get(index).map(|n| n.span)
    }

    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        self.get(index).map_or(NodeIndex::NONE, |n| n.parent)
    }

    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.get(index).map_or(&[], |n| n.children.as_slice())
    }

    /// Position of `index` among its parent's children.
    pub fn child_position(&self, index: NodeIndex) -> Option<usize> {
        let parent = self.parent(index);
        self.children(parent).iter().position(|&c| c == index)
    }

    /// The next sibling of `index` in document order.
    pub fn next_sibling(&self, index: NodeIndex) -> Option<NodeIndex> {
        let position = self.child_position(index)?;
        self.children(self.parent(index)).get(position + 1).copied()
    }

    /// Iterate over the ancestors of `index`, nearest first.
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            current: self.parent(index),
        }
    }

    /// Nearest ancestor whose kind satisfies `pred`.
    pub fn nearest_ancestor(
        &self,
        index: NodeIndex,
        pred: impl Fn(&NodeKind) -> bool,
    ) -> Option<NodeIndex> {
        self.ancestors(index)
            .find(|&a| self.kind(a).is_some_and(|k| pred(k)))
    }

    /// All nodes reachable from `root`, in document (pre-)order.
    pub fn preorder(&self, root: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let Some(node) = self.get(idx) else {
                continue;
            };
            out.push(idx);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }
}

/// Iterator returned by `NodeArena::ancestors`.
pub struct Ancestors<'a> {
    arena: &'a NodeArena,
    current: NodeIndex,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        if self.current.is_none() {
            return None;
        }
        let idx = self.current;
        self.current = self.arena.parent(idx);
        Some(idx)
    }
}

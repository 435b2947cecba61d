//! Binding index.
//!
//! Built once per tree in a single document-order pass. Every feature that
//! needs to know what a name refers to queries this index instead of walking
//! the tree again.

use linkscope_common::NativeSpan;
use linkscope_syntax::{BinderRole, NodeArena, NodeIndex, NodeKind};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::scope::{Namespace, ScopeResolver};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Let,
    Parameter,
    LoopVariable,
    FormBinding,
    UpdateCursor,
    Function,
}

impl From<BinderRole> for DeclarationKind {
    fn from(role: BinderRole) -> Self {
        match role {
            BinderRole::Let => DeclarationKind::Let,
            BinderRole::Parameter => DeclarationKind::Parameter,
            BinderRole::LoopVariable => DeclarationKind::LoopVariable,
            BinderRole::FormBinding => DeclarationKind::FormBinding,
            BinderRole::UpdateCursor => DeclarationKind::UpdateCursor,
        }
    }
}

impl DeclarationKind {
    pub fn is_function(self) -> bool {
        self == DeclarationKind::Function
    }

    pub fn describe(self) -> &'static str {
        match self {
            DeclarationKind::Let => "variable",
            DeclarationKind::Parameter => "parameter",
            DeclarationKind::LoopVariable => "loop variable",
            DeclarationKind::FormBinding => "form binding",
            DeclarationKind::UpdateCursor => "update cursor",
            DeclarationKind::Function => "function",
        }
    }
}

/// A binder or function declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub node: NodeIndex,
    pub name: String,
    pub kind: DeclarationKind,
    /// Where the declaration is visible, against its own nearest scope.
    pub validity: NativeSpan,
    /// Parameters in the first parameter group (functions only).
    pub parameter_count: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OccurrenceKind {
    Variable,
    /// Callee of a call; never counted as a variable use.
    Call,
    /// `formlet => handler`: the handler names a function.
    HandlerReference,
}

impl OccurrenceKind {
    pub fn namespace(self) -> Namespace {
        match self {
            OccurrenceKind::Variable => Namespace::Value,
            OccurrenceKind::Call | OccurrenceKind::HandlerReference => Namespace::Function,
        }
    }
}

/// A use of a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    pub node: NodeIndex,
    pub name: String,
    pub kind: OccurrenceKind,
    /// The enclosing `FunCall` for call occurrences.
    pub call: Option<NodeIndex>,
    pub argument_count: Option<usize>,
    /// Validity scope of the declaration this occurrence resolved to.
    pub resolved_in: Option<NativeSpan>,
}

impl Occurrence {
    pub fn is_resolved(&self) -> bool {
        self.resolved_in.is_some()
    }
}

/// Name -> declarations, name -> occurrences and occurrence -> declaration
/// maps for one tree. Immutable once built.
#[derive(Debug, Default)]
pub struct BindingIndex {
    declarations: Vec<Declaration>,
    occurrences: Vec<Occurrence>,
    declarations_by_name: FxHashMap<String, SmallVec<[usize; 2]>>,
    declaration_by_node: FxHashMap<NodeIndex, usize>,
    /// Resolved occurrences only.
    occurrences_by_name: FxHashMap<String, Vec<usize>>,
    occurrence_by_node: FxHashMap<NodeIndex, usize>,
    uses_by_declaration: FxHashMap<NodeIndex, Vec<usize>>,
    unresolved: Vec<usize>,
    resolved: FxHashMap<NodeIndex, NodeIndex>,
}

impl BindingIndex {
    #[tracing::instrument(level = "debug", skip(arena))]
    pub fn build(arena: &NodeArena, root: NodeIndex, wrapper_name: &str) -> BindingIndex {
        let resolver = ScopeResolver::new(arena, root, wrapper_name);
        let mut index = BindingIndex::default();

        for idx in arena.preorder(root) {
            let Some(node) = arena.get(idx) else {
                continue;
            };
            match &node.kind {
                NodeKind::Fun { name } => {
                    if idx == root || name == wrapper_name {
                        continue;
                    }
                    let Some(validity) = resolver.declaration_validity(idx) else {
                        continue;
                    };
                    index.add_declaration(Declaration {
                        node: idx,
                        name: name.clone(),
                        kind: DeclarationKind::Function,
                        validity,
                        parameter_count: resolver.parameter_count(idx),
                    });
                }
                NodeKind::Binder { name, role } => {
                    let Some(validity) = resolver.declaration_validity(idx) else {
                        continue;
                    };
                    index.add_declaration(Declaration {
                        node: idx,
                        name: name.clone(),
                        kind: (*role).into(),
                        validity,
                        parameter_count: None,
                    });
                }
                NodeKind::Variable { name } => {
                    let (kind, call, argument_count) = classify_occurrence(arena, idx);
                    let resolution = resolver.resolve(idx, kind.namespace());
                    let occurrence = Occurrence {
                        node: idx,
                        name: name.clone(),
                        kind,
                        call,
                        argument_count,
                        resolved_in: resolution.map(|r| r.validity),
                    };
                    index.add_occurrence(occurrence, resolution.map(|r| r.declaration));
                }
                _ => {}
            }
        }

        debug!(
            declarations = index.declarations.len(),
            occurrences = index.occurrences.len(),
            unresolved = index.unresolved.len(),
            "binding index built"
        );
        index
    }

    fn add_declaration(&mut self, declaration: Declaration) {
        let slot = self.declarations.len();
        self.declarations_by_name
            .entry(declaration.name.clone())
            .or_default()
            .push(slot);
        self.declaration_by_node.insert(declaration.node, slot);
        self.declarations.push(declaration);
    }

    fn add_occurrence(&mut self, occurrence: Occurrence, declaration: Option<NodeIndex>) {
        let slot = self.occurrences.len();
        self.occurrence_by_node.insert(occurrence.node, slot);
        match declaration {
            Some(decl) => {
                self.resolved.insert(occurrence.node, decl);
                self.uses_by_declaration.entry(decl).or_default().push(slot);
                self.occurrences_by_name
                    .entry(occurrence.name.clone())
                    .or_default()
                    .push(slot);
            }
            None => self.unresolved.push(slot),
        }
        self.occurrences.push(occurrence);
    }

    /// The declaration `node` refers to: the resolved declaration of an
    /// occurrence, or the declaration itself.
    pub fn declaration_for(&self, node: NodeIndex) -> Option<&Declaration> {
        let decl = self.resolved.get(&node).copied().unwrap_or(node);
        self.declaration_at(decl)
    }

    /// The declaration whose binder is exactly `node`.
    pub fn declaration_at(&self, node: NodeIndex) -> Option<&Declaration> {
        self.declaration_by_node
            .get(&node)
            .map(|&slot| &self.declarations[slot])
    }

    pub fn occurrence_at(&self, node: NodeIndex) -> Option<&Occurrence> {
        self.occurrence_by_node
            .get(&node)
            .map(|&slot| &self.occurrences[slot])
    }

    /// Resolved uses of the declaration at `declaration`, in document order.
    pub fn occurrences_of(&self, declaration: NodeIndex) -> impl Iterator<Item = &Occurrence> {
        self.uses_by_declaration
            .get(&declaration)
            .into_iter()
            .flatten()
            .map(|&slot| &self.occurrences[slot])
    }

    pub fn is_used(&self, declaration: NodeIndex) -> bool {
        self.uses_by_declaration
            .get(&declaration)
            .is_some_and(|uses| !uses.is_empty())
    }

    /// Whether any function in the document is declared as `name`.
    pub fn is_known_function(&self, name: &str) -> bool {
        self.declarations(name).any(|d| d.kind.is_function())
    }

    pub fn declarations(&self, name: &str) -> impl Iterator<Item = &Declaration> {
        self.declarations_by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&slot| &self.declarations[slot])
    }

    /// Resolved occurrences of `name`.
    pub fn occurrences(&self, name: &str) -> impl Iterator<Item = &Occurrence> {
        self.occurrences_by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&slot| &self.occurrences[slot])
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &Occurrence> {
        self.unresolved.iter().map(|&slot| &self.occurrences[slot])
    }

    /// Declaration node an occurrence resolved to.
    pub fn resolved_declaration(&self, occurrence: NodeIndex) -> Option<NodeIndex> {
        self.resolved.get(&occurrence).copied()
    }

    pub fn all_declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn all_occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }
}

/// Classify a `Variable` by its position under its parent.
fn classify_occurrence(
    arena: &NodeArena,
    node: NodeIndex,
) -> (OccurrenceKind, Option<NodeIndex>, Option<usize>) {
    let parent = arena.parent(node);
    let position = arena.child_position(node);
    match (arena.kind(parent), position) {
        (Some(NodeKind::FunCall), Some(0)) => {
            let arguments = arena.children(parent).len().saturating_sub(1);
            (OccurrenceKind::Call, Some(parent), Some(arguments))
        }
        (Some(NodeKind::FormletPlacement), Some(p)) if p >= 1 => {
            (OccurrenceKind::HandlerReference, None, None)
        }
        _ => (OccurrenceKind::Variable, None, None),
    }
}

//! Scope resolution.
//!
//! Links binds names sequentially: a declaration is visible from the point it
//! is written to the end of its scope, and a use can never see a declaration
//! that appears after it in the text. Scopes are function bodies (`Fun`,
//! `Funs`, `FunLit`); resolution climbs from the occurrence to each enclosing
//! scope in turn until a declaration is found or the synthetic wrapper
//! function is reached.
//!
//! Loop variables, form bindings and update cursors are narrower than their
//! function: they are only visible inside the construct that introduces them.

use linkscope_common::limits::MAX_SCOPE_CLIMB;
use linkscope_common::position::utf16_len;
use linkscope_common::NativeSpan;
use linkscope_syntax::{BinderRole, FUN_KEYWORD_WIDTH, NodeArena, NodeIndex, NodeKind};
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Which kind of name an occurrence refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Variable uses. Nested function bodies are opaque.
    Value,
    /// Call sites and handler references. Declarations in nested bodies are
    /// visible too.
    Function,
}

/// A successful resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub declaration: NodeIndex,
    /// The scope the declaration was found in.
    pub scope: NodeIndex,
    /// Where the declaration is visible.
    pub validity: NativeSpan,
}

/// Candidate declarations of one name inside one scope.
pub type Candidates = SmallVec<[NodeIndex; 4]>;

/// Resolves identifier occurrences against the declarations of one tree.
pub struct ScopeResolver<'a> {
    arena: &'a NodeArena,
    root: NodeIndex,
    wrapper_name: &'a str,
}

impl<'a> ScopeResolver<'a> {
    pub fn new(arena: &'a NodeArena, root: NodeIndex, wrapper_name: &'a str) -> Self {
        ScopeResolver {
            arena,
            root,
            wrapper_name,
        }
    }

    pub fn arena(&self) -> &'a NodeArena {
        self.arena
    }

    /// Nearest scope boundary strictly above `node`. The root acts as the
    /// outermost scope when the tree has no wrapper function.
    pub fn enclosing_scope(&self, node: NodeIndex) -> Option<NodeIndex> {
        if node == self.root {
            return None;
        }
        self.arena
            .nearest_ancestor(node, NodeKind::is_scope_boundary)
            .or(Some(self.root))
    }

    /// Whether `scope` is the outermost scope resolution may search.
    pub fn is_wrapper(&self, scope: NodeIndex) -> bool {
        if scope == self.root {
            return true;
        }
        matches!(self.arena.kind(scope), Some(NodeKind::Fun { name }) if name == self.wrapper_name)
    }

    /// Resolve the occurrence `node` in `namespace`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn resolve(&self, node: NodeIndex, namespace: Namespace) -> Option<Resolution> {
        let name = self.arena.kind(node)?.identifier()?;
        let occurrence = self.arena.span(node)?;

        let mut current = node;
        for _ in 0..MAX_SCOPE_CLIMB {
            let scope = self.enclosing_scope(current)?;
            let scope_span = self.arena.span(scope)?;

            let best = self
                .local_declarations(scope, name, namespace)
                .into_iter()
                .filter(|&decl| self.binding_span(decl).is_some_and(|b| b.precedes(&occurrence)))
                .filter(|&decl| self.arena.span(decl).is_some_and(|s| scope_span.contains_span(&s)))
                .filter_map(|decl| {
                    let validity = self.validity_scope(decl, scope)?;
                    validity
                        .contains_position(occurrence.start)
                        .then_some((decl, validity))
                })
                .max_by_key(|&(decl, _)| self.binding_span(decl).map(|s| s.start));

            if let Some((declaration, validity)) = best {
                trace!(name, ?declaration, ?scope, "resolved");
                return Some(Resolution {
                    declaration,
                    scope,
                    validity,
                });
            }
            if self.is_wrapper(scope) {
                break;
            }
            current = scope;
        }

        debug!(name, ?node, "unresolved");
        None
    }

    /// Declarations of `name` in the subtree of `scope`, in document order.
    ///
    /// The value scan stops at nested `Fun`/`FunLit` bodies; the function
    /// scan walks through them and collects every binder it finds.
    pub fn local_declarations(&self, scope: NodeIndex, name: &str, namespace: Namespace) -> Candidates {
        let mut found = Candidates::new();
        let mut stack: Vec<NodeIndex> = self.arena.children(scope).iter().rev().copied().collect();

        while let Some(idx) = stack.pop() {
            let Some(kind) = self.arena.kind(idx) else {
                continue;
            };
            match kind {
                NodeKind::Fun { name: fun_name } if fun_name == name => found.push(idx),
                NodeKind::Binder { name: binder_name, .. } if binder_name == name => found.push(idx),
                _ => {}
            }

            let opens_body = matches!(kind, NodeKind::Fun { .. } | NodeKind::FunLit);
            if opens_body && namespace == Namespace::Value {
                continue;
            }
            stack.extend(self.arena.children(idx).iter().rev().copied());
        }
        found
    }

    /// The part of a declaration that introduces its name. For functions
    /// that is `fun name`, so a body can refer to its own function.
    pub fn binding_span(&self, decl: NodeIndex) -> Option<NativeSpan> {
        let node = self.arena.get(decl)?;
        match &node.kind {
            NodeKind::Fun { name } => {
                let end = node
                    .span
                    .start
                    .advance(FUN_KEYWORD_WIDTH + utf16_len(name))
                    .min(node.span.end);
                Some(NativeSpan::new(node.span.start, end))
            }
            _ => Some(node.span),
        }
    }

    /// Where `decl`, found while resolving in `scope`, is visible.
    pub fn validity_scope(&self, decl: NodeIndex, scope: NodeIndex) -> Option<NativeSpan> {
        let start = self.arena.span(decl)?.start;
        let construct = match self.arena.kind(decl)? {
            NodeKind::Binder { role, .. } => match role {
                BinderRole::LoopVariable => self
                    .arena
                    .nearest_ancestor(decl, |k| matches!(k, NodeKind::Iteration)),
                BinderRole::FormBinding => self
                    .arena
                    .nearest_ancestor(decl, |k| matches!(k, NodeKind::Formlet))
                    .or_else(|| {
                        let binding = self
                            .arena
                            .nearest_ancestor(decl, |k| matches!(k, NodeKind::FormBinding))?;
                        Some(self.arena.parent(binding)).filter(|p| p.is_some())
                    }),
                BinderRole::UpdateCursor => self.arena.nearest_ancestor(decl, |k| {
                    matches!(k, NodeKind::DbUpdate | NodeKind::DbDelete)
                }),
                BinderRole::Let | BinderRole::Parameter => None,
            },
            _ => None,
        };

        if let Some(span) = construct.and_then(|c| self.arena.span(c)) {
            return Some(span);
        }
        let end = self.arena.span(scope)?.end;
        Some(NativeSpan::new(start, end.max(start)))
    }

    /// Validity scope of a declaration against its own nearest scope.
    pub fn declaration_validity(&self, decl: NodeIndex) -> Option<NativeSpan> {
        let scope = self.enclosing_scope(decl)?;
        self.validity_scope(decl, scope)
    }

    /// Number of parameters in the first parameter group of a function.
    pub fn parameter_count(&self, fun: NodeIndex) -> Option<usize> {
        let params = self
            .arena
            .children(fun)
            .iter()
            .copied()
            .find(|&c| matches!(self.arena.kind(c), Some(NodeKind::Params)))?;
        Some(self.arena.children(params).len())
    }
}

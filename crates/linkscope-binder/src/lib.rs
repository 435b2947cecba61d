//! Name resolution for Links parse trees.
//!
//! - `scope`: climbs from an occurrence to the declaration it binds to
//! - `index`: the per-document binding maps every feature queries
//! - `builtins`: the library functions that are always in scope

pub mod builtins;
pub use builtins::Builtin;

pub mod scope;
pub use scope::{Namespace, Resolution, ScopeResolver};

pub mod index;
pub use index::{BindingIndex, Declaration, DeclarationKind, Occurrence, OccurrenceKind};

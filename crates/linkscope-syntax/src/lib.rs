//! Syntax layer for the linkscope backend.
//!
//! This crate turns the Links parser's structured output into an arena tree
//! and maps parser-native positions onto editor positions:
//! - `raw`: the `[kind, label, span, children]` wire format
//! - `label`: one-time decoding of labels into `NodeKind`
//! - `adapter`: arena construction and the span repair passes
//! - `reconcile`: the position shift and per-classification narrowing

// Arena, node kinds and indices
pub mod node;
pub use node::{BinderRole, Literal, Node, NodeArena, NodeIndex, NodeKind, NodeShape};

pub mod label;
pub use label::decode_label;

// Structured parser output
pub mod raw;
pub use raw::{RawNode, decode_span, encode_span};

pub mod adapter;
pub use adapter::{SyntaxTree, TreeError};

mod repair;

// Native -> editor coordinates
pub mod reconcile;
pub use reconcile::{Classification, FUN_KEYWORD_WIDTH, PositionShift, Reconciler, narrow};

#[doc(hidden)]
pub mod fixtures;

//! Common types and utilities for the linkscope backend.
//!
//! This crate provides foundational types used across all linkscope crates:
//! - Editor positions (`Position`, `Range`, `Location`) and `LineMap`
//! - Parser-native positions (`NativePosition`, `NativeSpan`)
//! - Diagnostic categories, codes and message templates
//! - Analysis options (configuration)
//! - Limits and thresholds

// Position/Range types for line/column source locations
pub mod position;
pub use position::{LineMap, Location, NativePosition, NativeSpan, Position, Range};

// Diagnostic categories, codes and message templates
pub mod diagnostics;
pub use diagnostics::{DiagnosticCategory, DiagnosticMessage, format_message};

// Analysis options loaded from linkscope.json
pub mod config;
pub use config::{AnalysisOptions, PositionShiftConfig, RuntimeCheckOptions};

// Centralized limits and thresholds
pub mod limits;

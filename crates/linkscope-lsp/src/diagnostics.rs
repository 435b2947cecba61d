//! Structural diagnostics and conversion to LSP diagnostics.
//!
//! Three independent checks run over the binding index: undefined
//! identifiers, duplicate declarations and argument-count mismatches. Each
//! produces `Diagnostic`s anchored at tree nodes; anchors are reconciled and
//! narrowed to the identifier only at conversion time.

use linkscope_binder::{BindingIndex, OccurrenceKind, builtins};
use linkscope_common::diagnostics::{DiagnosticMessage, diagnostic_messages};
use linkscope_common::{
    AnalysisOptions, DiagnosticCategory, Location, NativePosition, Range, format_message,
};
use linkscope_syntax::{NodeArena, NodeIndex, NodeKind, Reconciler};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DIAGNOSTIC_SOURCE: &str = "linkscope";

/// Diagnostic severity level (matches LSP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl From<DiagnosticSeverity> for u8 {
    fn from(severity: DiagnosticSeverity) -> u8 {
        severity as u8
    }
}

impl TryFrom<u8> for DiagnosticSeverity {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, <DiagnosticSeverity as TryFrom<u8>>::Error> {
        match value {
            1 => Ok(Self::Error),
            2 => Ok(Self::Warning),
            3 => Ok(Self::Information),
            4 => Ok(Self::Hint),
            _ => Err("invalid diagnostic severity"),
        }
    }
}

impl From<DiagnosticCategory> for DiagnosticSeverity {
    fn from(category: DiagnosticCategory) -> Self {
        match category {
            DiagnosticCategory::Error => DiagnosticSeverity::Error,
            DiagnosticCategory::Warning => DiagnosticSeverity::Warning,
            DiagnosticCategory::Suggestion => DiagnosticSeverity::Hint,
            DiagnosticCategory::Message => DiagnosticSeverity::Information,
        }
    }
}

/// LSP diagnostic payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspDiagnostic {
    pub range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<DiagnosticSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_information: Option<Vec<LspDiagnosticRelatedInformation>>,
}

/// Related diagnostic information for LSP clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspDiagnosticRelatedInformation {
    pub location: Location,
    pub message: String,
}

impl LspDiagnostic {
    /// Build a diagnostic from a message definition; the hint becomes related
    /// information on the same range.
    pub fn from_message(
        definition: &DiagnosticMessage,
        args: &[&str],
        range: Range,
        uri: &str,
    ) -> Self {
        LspDiagnostic {
            range,
            severity: Some(definition.category.into()),
            code: Some(definition.code),
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: format_message(definition.message, args),
            related_information: Some(vec![LspDiagnosticRelatedInformation {
                location: Location::new(uri.to_string(), range),
                message: format_message(definition.hint, args),
            }]),
        }
    }
}

/// A structural diagnostic anchored at a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub anchor: NodeIndex,
    pub category: DiagnosticCategory,
    pub code: u32,
    pub message: String,
    /// Remediation hint.
    pub hint: String,
}

impl Diagnostic {
    fn new(anchor: NodeIndex, definition: &DiagnosticMessage, args: &[&str]) -> Self {
        Diagnostic {
            anchor,
            category: definition.category,
            code: definition.code,
            message: format_message(definition.message, args),
            hint: format_message(definition.hint, args),
        }
    }
}

/// Runs the structural checks of one document.
pub struct DiagnosticsEngine<'a> {
    arena: &'a NodeArena,
    index: &'a BindingIndex,
    options: &'a AnalysisOptions,
    reconciler: &'a Reconciler<'a>,
    uri: &'a str,
}

impl<'a> DiagnosticsEngine<'a> {
    pub fn new(
        arena: &'a NodeArena,
        index: &'a BindingIndex,
        options: &'a AnalysisOptions,
        reconciler: &'a Reconciler<'a>,
        uri: &'a str,
    ) -> Self {
        DiagnosticsEngine {
            arena,
            index,
            options,
            reconciler,
            uri,
        }
    }

    /// Run every structural check and convert the results, ordered by range.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn structural_diagnostics(&self) -> Vec<LspDiagnostic> {
        let mut found = self.check_undefined();
        found.extend(self.check_duplicates());
        found.extend(self.check_argument_counts());
        debug!(count = found.len(), "structural diagnostics");

        let mut converted: Vec<LspDiagnostic> = found.iter().map(|d| self.to_lsp(d)).collect();
        converted.sort_by(|a, b| {
            (a.range.start, a.range.end, a.code).cmp(&(b.range.start, b.range.end, b.code))
        });
        converted
    }

    /// Unresolved occurrences that are neither built-ins nor, for calls and
    /// handler references, the name of any function in the document.
    pub fn check_undefined(&self) -> Vec<Diagnostic> {
        self.index
            .unresolved()
            .filter(|o| !builtins::is_builtin(&o.name) && !self.options.is_extra_builtin(&o.name))
            .filter_map(|o| match o.kind {
                OccurrenceKind::Variable => Some(Diagnostic::new(
                    o.node,
                    &diagnostic_messages::UNDEFINED_VARIABLE,
                    &[o.name.as_str()],
                )),
                OccurrenceKind::Call | OccurrenceKind::HandlerReference => {
                    (!self.index.is_known_function(&o.name)).then(|| {
                        Diagnostic::new(o.node, &diagnostic_messages::UNDEFINED_FUNCTION, &[o.name.as_str()])
                    })
                }
            })
            .collect()
    }

    /// Declarations sharing a name and the end of their validity scope. Every
    /// member of such a group is reported.
    pub fn check_duplicates(&self) -> Vec<Diagnostic> {
        let mut groups: FxHashMap<(&str, NativePosition), Vec<NodeIndex>> = FxHashMap::default();
        for decl in self.index.all_declarations() {
            groups
                .entry((decl.name.as_str(), decl.validity.end))
                .or_default()
                .push(decl.node);
        }

        let mut out: Vec<Diagnostic> = groups
            .into_iter()
            .filter(|(_, nodes)| nodes.len() > 1)
            .flat_map(|((name, _), nodes)| {
                nodes.into_iter().map(move |node| {
                    Diagnostic::new(node, &diagnostic_messages::DUPLICATE_DECLARATION, &[name])
                })
            })
            .collect();
        out.sort_by_key(|d| d.anchor);
        out
    }

    /// Calls to a user function with the wrong number of arguments.
    pub fn check_argument_counts(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for occurrence in self.index.all_occurrences() {
            if occurrence.kind != OccurrenceKind::Call {
                continue;
            }
            let Some(declaration) = self.index.declaration_for(occurrence.node) else {
                continue;
            };
            let (Some(expected), Some(actual)) =
                (declaration.parameter_count, occurrence.argument_count)
            else {
                continue;
            };
            if expected == actual {
                continue;
            }
            if occurrence.call.is_some_and(|call| self.is_placement_handler(call)) {
                continue;
            }
            let expected = expected.to_string();
            let actual = actual.to_string();
            out.push(Diagnostic::new(
                occurrence.node,
                &diagnostic_messages::ARGUMENT_COUNT_MISMATCH,
                &[occurrence.name.as_str(), expected.as_str(), actual.as_str()],
            ));
        }
        out
    }

    /// `formlet => handler(args)`: the handler call is completed by the
    /// formlet's result, so its visible arguments are partial.
    fn is_placement_handler(&self, call: NodeIndex) -> bool {
        let parent = self.arena.parent(call);
        matches!(self.arena.kind(parent), Some(NodeKind::FormletPlacement))
            && self.arena.child_position(call) == Some(1)
    }

    /// Reconciled range of an anchor, narrowed to its identifier.
    pub fn anchor_range(&self, anchor: NodeIndex) -> Option<Range> {
        self.reconciler.name_range(self.arena, anchor).or_else(|| {
            self.arena
                .span(anchor)
                .map(|span| self.reconciler.reconcile_span(span))
        })
    }

    pub fn to_lsp(&self, diagnostic: &Diagnostic) -> LspDiagnostic {
        let range = self.anchor_range(diagnostic.anchor).unwrap_or_default();
        LspDiagnostic {
            range,
            severity: Some(diagnostic.category.into()),
            code: Some(diagnostic.code),
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: diagnostic.message.clone(),
            related_information: Some(vec![LspDiagnosticRelatedInformation {
                location: Location::new(self.uri.to_string(), range),
                message: diagnostic.hint.clone(),
            }]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkscope_common::Position;

    #[test]
    fn test_severity_serializes_as_number() {
        let json = serde_json::to_string(&DiagnosticSeverity::Warning).unwrap();
        assert_eq!(json, "2");
        let back: DiagnosticSeverity = serde_json::from_str("1").unwrap();
        assert_eq!(back, DiagnosticSeverity::Error);
        assert!(serde_json::from_str::<DiagnosticSeverity>("9").is_err());
    }

    #[test]
    fn test_from_message_carries_hint() {
        let range = Range::on_line(2, 0, 3);
        let diag = LspDiagnostic::from_message(
            &diagnostic_messages::UNDEFINED_VARIABLE,
            &["foo"],
            range,
            "file:///a.links",
        );
        assert_eq!(diag.code, Some(1001));
        assert_eq!(diag.message, "Variable 'foo' is not defined.");
        let related = diag.related_information.unwrap();
        assert_eq!(related[0].location.range.start, Position::new(2, 0));
        assert!(related[0].message.contains("'foo'"));
    }
}

//! Diagnostic categories, codes and message templates.
//!
//! Every structural check reports a primary message and a secondary
//! remediation hint. Templates use `{0}`, `{1}`, ... placeholders filled in
//! by `format_message`.

use serde::Serialize;

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// A diagnostic message definition with code, category, and message templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
    pub hint: &'static str,
}

pub mod diagnostic_codes {
    pub const UNDEFINED_VARIABLE: u32 = 1001;
    pub const UNDEFINED_FUNCTION: u32 = 1002;
    pub const DUPLICATE_DECLARATION: u32 = 2001;
    pub const ARGUMENT_COUNT_MISMATCH: u32 = 3001;
    pub const RUNTIME_ERROR: u32 = 4001;
}

pub mod diagnostic_messages {
    use super::{DiagnosticCategory, DiagnosticMessage, diagnostic_codes};

    pub const UNDEFINED_VARIABLE: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNDEFINED_VARIABLE,
        category: DiagnosticCategory::Error,
        message: "Variable '{0}' is not defined.",
        hint: "Declare '{0}' with 'var' before this point, or bind it as a parameter.",
    };

    pub const UNDEFINED_FUNCTION: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNDEFINED_FUNCTION,
        category: DiagnosticCategory::Error,
        message: "Function '{0}' is not defined.",
        hint: "Define 'fun {0}' in an enclosing scope or check the spelling.",
    };

    pub const DUPLICATE_DECLARATION: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::DUPLICATE_DECLARATION,
        category: DiagnosticCategory::Warning,
        message: "'{0}' is declared more than once in the same scope.",
        hint: "Later uses of '{0}' bind to the most recent declaration; rename one of them if that is not intended.",
    };

    pub const ARGUMENT_COUNT_MISMATCH: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::ARGUMENT_COUNT_MISMATCH,
        category: DiagnosticCategory::Error,
        message: "Function '{0}' expects {1} argument(s) but was called with {2}.",
        hint: "Change the call to pass {1} argument(s), or update the parameters of '{0}'.",
    };

    pub const RUNTIME_ERROR: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::RUNTIME_ERROR,
        category: DiagnosticCategory::Error,
        message: "Runtime error: {0}",
        hint: "Reported by running the document with the Links interpreter.",
    };

    pub const ALL: &[DiagnosticMessage] = &[
        UNDEFINED_VARIABLE,
        UNDEFINED_FUNCTION,
        DUPLICATE_DECLARATION,
        ARGUMENT_COUNT_MISMATCH,
        RUNTIME_ERROR,
    ];
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    diagnostic_messages::ALL.iter().find(|m| m.code == code)
}

use colored::Colorize;

use linkscope::common::position::utf16_to_byte_index;
use linkscope::lsp::{DiagnosticSeverity, LspDiagnostic};

/// Renders diagnostics for a terminal, with a source snippet under each.
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    /// `lines` is the document split into lines.
    pub fn render(&self, file: &str, lines: &[&str], diagnostics: &[LspDiagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(file, lines, diagnostic));
        }
        out
    }

    pub fn format_diagnostic(&self, file: &str, lines: &[&str], diagnostic: &LspDiagnostic) -> String {
        let start = diagnostic.range.start;
        let mut output = format!("{}:{}:{}", file, start.line + 1, start.character + 1);
        output.push_str(" - ");
        output.push_str(&self.format_severity(diagnostic.severity));
        if let Some(code) = diagnostic.code {
            output.push(' ');
            output.push_str(&self.format_code(code));
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message);

        if let Some(snippet) = self.format_snippet(lines, diagnostic) {
            output.push_str(&snippet);
        }
        for related in diagnostic.related_information.iter().flatten() {
            let prefix = if self.color {
                "  hint".dimmed().to_string()
            } else {
                "  hint".to_string()
            };
            output.push('\n');
            output.push_str(&format!("{}: {}", prefix, related.message));
        }
        output
    }

    /// Source line with the diagnostic's columns underlined.
    ///   5   print(mesg)
    ///             ~~~~
    fn format_snippet(&self, lines: &[&str], diagnostic: &LspDiagnostic) -> Option<String> {
        let range = diagnostic.range;
        let line_text = *lines.get(range.start.line as usize)?;
        let start = utf16_to_byte_index(line_text, range.start.character)?;
        let end = if range.end.line == range.start.line {
            utf16_to_byte_index(line_text, range.end.character).unwrap_or(line_text.len())
        } else {
            line_text.len()
        };

        let mut underline = String::new();
        for ch in line_text[..start].chars() {
            underline.push_str(if ch == '\t' { "    " } else { " " });
        }
        let marked = line_text.get(start..end.max(start)).unwrap_or_default();
        let mut tildes = String::new();
        for ch in marked.chars() {
            tildes.push_str(if ch == '\t' { "~~~~" } else { "~" });
        }
        if tildes.is_empty() {
            tildes.push('~');
        }
        if self.color {
            underline.push_str(&tildes.red().to_string());
        } else {
            underline.push_str(&tildes);
        }

        let display_line = line_text.replace('\t', "    ");
        Some(format!(
            "\n  {:>3}   {}\n        {}",
            range.start.line + 1,
            display_line,
            underline
        ))
    }

    fn format_severity(&self, severity: Option<DiagnosticSeverity>) -> String {
        let label = match severity {
            Some(DiagnosticSeverity::Error) | None => "error",
            Some(DiagnosticSeverity::Warning) => "warning",
            Some(DiagnosticSeverity::Information) => "info",
            Some(DiagnosticSeverity::Hint) => "hint",
        };
        if !self.color {
            return label.to_string();
        }
        match severity {
            Some(DiagnosticSeverity::Error) | None => label.red().bold().to_string(),
            Some(DiagnosticSeverity::Warning) => label.yellow().bold().to_string(),
            Some(DiagnosticSeverity::Information) => label.cyan().bold().to_string(),
            Some(DiagnosticSeverity::Hint) => label.blue().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        let label = format!("LS{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}

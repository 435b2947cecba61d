use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use std::io::{IsTerminal, Write};
use std::path::Path;
use tracing::info;

use linkscope::lsp::semantic_tokens::{SemanticTokensLegend, legend};
use linkscope::lsp::{
    DiagnosticSeverity, DocumentSymbolsProvider, FindReferences, GoToDefinition, HoverProvider,
    RenameProvider, SemanticTokensProvider,
};
use linkscope::{AnalysisOptions, Classification, DocumentAnalysis, LspDiagnostic, Range};

use crate::args::{CliArgs, ColorChoice, Command, DocumentArgs};
use crate::config::resolve_options;
use crate::reporter::Reporter;

/// Exit status when every document is free of errors.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status when `check` reported at least one error.
pub const EXIT_DIAGNOSTICS: i32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EncodedTokens {
    legend: SemanticTokensLegend,
    data: Vec<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifiedRange {
    range: Range,
    classification: Classification,
}

/// Read a document and its tree, then analyse it.
pub fn load_document(document: &DocumentArgs, options: &AnalysisOptions) -> Result<DocumentAnalysis> {
    let source = std::fs::read_to_string(&document.source)
        .with_context(|| format!("failed to read {}", document.source.display()))?;
    let tree_path = document.tree_path();
    let tree_json = std::fs::read_to_string(&tree_path)
        .with_context(|| format!("failed to read tree {}", tree_path.display()))?;
    let uri = document_uri(&document.source);
    linkscope::analyze_document(&uri, &source, &tree_json, options)
        .map_err(|err| anyhow!("{}: {err}", tree_path.display()))
}

fn document_uri(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

/// Run one command, writing results to `out`. Returns the exit status.
pub fn run(args: &CliArgs, out: &mut dyn Write) -> Result<i32> {
    let options = resolve_options(args)?;
    let analysis = load_document(args.command.document(), &options)?;
    info!(uri = %analysis.uri, diagnostics = analysis.diagnostics.len(), "analysed");

    match &args.command {
        Command::Check { document, json } => {
            let pending = analysis.spawn_runtime_check();
            let mut diagnostics = analysis.diagnostics.clone();
            if let Some(pending) = pending {
                diagnostics.extend(pending.wait());
            }
            if *json {
                write_json(out, &diagnostics)?;
            } else {
                let color = match args.color {
                    ColorChoice::Always => true,
                    ColorChoice::Never => false,
                    ColorChoice::Auto => std::io::stdout().is_terminal(),
                };
                write_report(out, &document.source, &analysis, &diagnostics, color)?;
            }
            let has_errors = diagnostics
                .iter()
                .any(|d| d.severity == Some(DiagnosticSeverity::Error));
            return Ok(if has_errors { EXIT_DIAGNOSTICS } else { EXIT_SUCCESS });
        }
        Command::Tokens { classify, .. } => {
            let provider = SemanticTokensProvider::new(&analysis);
            if *classify {
                let ranges: Vec<ClassifiedRange> = provider
                    .classify()
                    .into_iter()
                    .map(|(range, classification)| ClassifiedRange {
                        range,
                        classification,
                    })
                    .collect();
                write_json(out, &ranges)?;
            } else {
                let tokens = EncodedTokens {
                    legend: legend(),
                    data: provider.semantic_tokens(),
                };
                write_json(out, &tokens)?;
            }
        }
        Command::Definition { position, .. } => {
            write_json(out, &GoToDefinition::new(&analysis).definition(*position))?;
        }
        Command::References { position, .. } => {
            write_json(out, &FindReferences::new(&analysis).references(*position))?;
        }
        Command::Rename {
            position, new_name, ..
        } => {
            let edit = RenameProvider::new(&analysis)
                .provide_rename_edits(*position, new_name)
                .map_err(|reason| anyhow!("rename failed: {reason}"))?;
            write_json(out, &edit)?;
        }
        Command::Hover { position, .. } => {
            write_json(out, &HoverProvider::new(&analysis).hover(*position))?;
        }
        Command::Symbols { .. } => {
            write_json(out, &DocumentSymbolsProvider::new(&analysis).document_symbols())?;
        }
    }
    Ok(EXIT_SUCCESS)
}

fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    writeln!(out, "{text}").context("failed to write output")
}

fn write_report(
    out: &mut dyn Write,
    file: &Path,
    analysis: &DocumentAnalysis,
    diagnostics: &[LspDiagnostic],
    color: bool,
) -> Result<()> {
    if diagnostics.is_empty() {
        return writeln!(out, "No problems found.").context("failed to write output");
    }
    let lines: Vec<&str> = analysis.source.lines().collect();
    let reporter = Reporter::new(color);
    let rendered = reporter.render(&file.display().to_string(), &lines, diagnostics);
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Some(DiagnosticSeverity::Error))
        .count();
    let warnings = diagnostics.len() - errors;
    writeln!(out, "{rendered}\n\nFound {errors} error(s), {warnings} warning(s).")
        .context("failed to write output")
}

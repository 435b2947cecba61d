use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use linkscope::Position;

/// CLI arguments for the linkscope binary.
#[derive(Parser, Debug)]
#[command(
    name = "linkscope",
    version,
    about = "Name resolution, diagnostics and navigation for Links documents"
)]
pub struct CliArgs {
    /// Path to linkscope.json. Without it the file is searched for next to
    /// the document and in its parent directories.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Name of the synthetic function the parser wraps documents in.
    #[arg(long = "wrapper-name", global = true)]
    pub wrapper_name: Option<String>,

    /// Extra names to treat as library functions (comma separated).
    #[arg(long = "builtin", global = true, value_delimiter = ',')]
    pub extra_builtins: Vec<String>,

    /// Run the document with the interpreter and report runtime errors.
    #[arg(long = "runtime-check", global = true)]
    pub runtime_check: bool,

    /// When to colour human-readable output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// A source document and the parser's tree for it.
#[derive(Args, Debug, Clone)]
pub struct DocumentArgs {
    /// The Links source file.
    pub source: PathBuf,

    /// The parser's JSON tree. Defaults to `<source>.tree.json`.
    #[arg(long)]
    pub tree: Option<PathBuf>,
}

impl DocumentArgs {
    pub fn tree_path(&self) -> PathBuf {
        self.tree.clone().unwrap_or_else(|| {
            let mut path = self.source.clone().into_os_string();
            path.push(".tree.json");
            PathBuf::from(path)
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report diagnostics.
    Check {
        #[command(flatten)]
        document: DocumentArgs,
        /// Print diagnostics as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print semantic tokens as JSON.
    Tokens {
        #[command(flatten)]
        document: DocumentArgs,
        /// Print classified ranges instead of the encoded token array.
        #[arg(long)]
        classify: bool,
    },
    /// Print the declaration of the identifier at LINE:COL.
    Definition {
        #[command(flatten)]
        document: DocumentArgs,
        #[arg(value_parser = parse_position)]
        position: Position,
    },
    /// Print every reference to the identifier at LINE:COL.
    References {
        #[command(flatten)]
        document: DocumentArgs,
        #[arg(value_parser = parse_position)]
        position: Position,
    },
    /// Print the edits renaming the identifier at LINE:COL.
    Rename {
        #[command(flatten)]
        document: DocumentArgs,
        #[arg(value_parser = parse_position)]
        position: Position,
        new_name: String,
    },
    /// Print hover information for LINE:COL.
    Hover {
        #[command(flatten)]
        document: DocumentArgs,
        #[arg(value_parser = parse_position)]
        position: Position,
    },
    /// Print the document outline.
    Symbols {
        #[command(flatten)]
        document: DocumentArgs,
    },
}

impl Command {
    pub fn document(&self) -> &DocumentArgs {
        match self {
            Command::Check { document, .. }
            | Command::Tokens { document, .. }
            | Command::Definition { document, .. }
            | Command::References { document, .. }
            | Command::Rename { document, .. }
            | Command::Hover { document, .. }
            | Command::Symbols { document } => document,
        }
    }
}

/// Parse a 1-based `LINE:COL` into an editor position.
pub fn parse_position(value: &str) -> Result<Position, String> {
    let (line, column) = value
        .split_once(':')
        .ok_or_else(|| format!("expected LINE:COL, got '{value}'"))?;
    let line: u32 = line
        .trim()
        .parse()
        .map_err(|_| format!("invalid line in '{value}'"))?;
    let column: u32 = column
        .trim()
        .parse()
        .map_err(|_| format!("invalid column in '{value}'"))?;
    if line == 0 || column == 0 {
        return Err("lines and columns start at 1".to_string());
    }
    Ok(Position::new(line - 1, column - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position_is_one_based() {
        assert_eq!(parse_position("4:12"), Ok(Position::new(3, 11)));
        assert!(parse_position("0:1").is_err());
        assert!(parse_position("4").is_err());
        assert!(parse_position("a:1").is_err());
    }

    #[test]
    fn test_default_tree_path() {
        let args = CliArgs::try_parse_from(["linkscope", "symbols", "dir/page.links"]).unwrap();
        assert_eq!(
            args.command.document().tree_path(),
            PathBuf::from("dir/page.links.tree.json")
        );
    }

    #[test]
    fn test_global_overrides_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "linkscope",
            "check",
            "page.links",
            "--builtin",
            "alpha,beta",
            "--color",
            "never",
        ])
        .unwrap();
        assert_eq!(args.extra_builtins, vec!["alpha", "beta"]);
        assert_eq!(args.color, ColorChoice::Never);
    }
}

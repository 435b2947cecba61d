use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use linkscope::AnalysisOptions;
use linkscope::common::config::CONFIG_FILE_NAME;

use crate::args::CliArgs;

/// Load `linkscope.json` from `explicit`, or from the first directory at or
/// above the document that has one. No file means default options.
pub fn load_options(explicit: Option<&Path>, document: &Path) -> Result<AnalysisOptions> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config(document),
    };
    let Some(path) = path else {
        debug!("no {CONFIG_FILE_NAME} found, using defaults");
        return Ok(AnalysisOptions::default());
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let options = AnalysisOptions::from_json(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(options)
}

fn find_config(document: &Path) -> Option<PathBuf> {
    let start = document.parent()?;
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Command line flags take precedence over the config file.
pub fn apply_overrides(options: &mut AnalysisOptions, args: &CliArgs) {
    if let Some(name) = &args.wrapper_name {
        options.wrapper_name = name.clone();
    }
    for name in &args.extra_builtins {
        if !options.extra_builtins.contains(name) {
            options.extra_builtins.push(name.clone());
        }
    }
    if args.runtime_check {
        options.runtime_check.enabled = true;
    }
}

/// Options for the document named on the command line.
pub fn resolve_options(args: &CliArgs) -> Result<AnalysisOptions> {
    let document = &args.command.document().source;
    let mut options = load_options(args.config.as_deref(), document)?;
    apply_overrides(&mut options, args);
    Ok(options)
}

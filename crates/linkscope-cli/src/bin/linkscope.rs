use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;

use linkscope_cli::args::CliArgs;
use linkscope_cli::driver;

fn main() -> Result<()> {
    // Enabled by LINKSCOPE_LOG or RUST_LOG; LINKSCOPE_LOG_FORMAT=tree|json|text.
    linkscope::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let mut stdout = std::io::stdout().lock();
    let status = driver::run(&args, &mut stdout)?;
    stdout.flush().context("failed to flush output")?;
    drop(stdout);
    std::process::exit(status);
}

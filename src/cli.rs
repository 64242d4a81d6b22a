use crate::model::{InputSource, SplitConfig, SplitSummary};
use crate::splitter;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "ptp-log-splitter",
    version,
    about = "PTP Log Splitter",
    long_about = "Reads PTP logs and splits them into per-run files based on tokens like \
                  'ptp4l.N.config' or 'phc2sys.N.config'.\n\
                  Lines without a run token are included in all run files."
)]
pub struct Cli {
    /// Input file (default: stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file prefix (default: derived from input or 'split')
    #[arg(short, long, value_name = "PREFIX")]
    pub outprefix: Option<String>,

    /// Print a JSON summary of the written files to stdout
    #[arg(long)]
    pub json: bool,

    /// Log level used when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", value_name = "LEVEL")]
    pub log_level: Level,
}

/// Build a `SplitConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> SplitConfig {
    let input = match args.input.as_ref() {
        Some(path) => InputSource::File(path.clone()),
        None => InputSource::Stdin,
    };
    let out_prefix = match args.outprefix.as_deref() {
        Some(prefix) if !prefix.is_empty() => prefix.to_string(),
        _ => input.derived_prefix(),
    };
    SplitConfig { input, out_prefix }
}

pub fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    tracing::debug!(input = %cfg.input.display_name(), prefix = %cfg.out_prefix, "starting split");

    let summary = splitter::split(cfg)?;
    report(&args, &summary)
}

fn report(args: &Cli, summary: &SplitSummary) -> Result<()> {
    if let Some(path) = summary.fallback_path() {
        eprintln!(
            "No run tokens found in {}. Wrote all lines to {}",
            summary.input,
            path.display()
        );
    }
    if args.json {
        let out = serde_json::to_string_pretty(summary).context("serialize split summary")?;
        println!("{}", out);
    }
    Ok(())
}

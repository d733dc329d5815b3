#![forbid(unsafe_code)]

//! Deterministic decision-run validator entry point.
//!
//! Exit semantics:
//! - `0` => the run completed with a resolved run state
//! - `1` => fatal invariant violation or input failure (one diagnostic
//!   line on stderr)
//!
//! The validator is artifact-only: nothing is ever written to stdout,
//! and nothing is read from stdin.  All output lives under `runs/`.

use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;

use verdict_engine::{RunPipeline, ValidatorConfig};

fn main() {
    match run() {
        Ok(()) => {}
        Err(error) => {
            eprintln!("{error}");
            let _ = std::io::stderr().flush();
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<()> {
    let root = parse_args(std::env::args().skip(1))?;
    let timestamp_unix_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
    let pipeline = RunPipeline::new(ValidatorConfig::new(root, timestamp_unix_ms));
    pipeline.execute()?;
    Ok(())
}

fn parse_args<I>(args: I) -> anyhow::Result<PathBuf>
where
    I: IntoIterator<Item = String>,
{
    let mut root = PathBuf::from(".");
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--root" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("missing value for --root"))?;
                root = PathBuf::from(value);
            }
            other => {
                anyhow::bail!("unknown argument `{other}`");
            }
        }
    }
    Ok(root)
}

//! Minimal backtest entry point: `backtest <config.toml>`.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use coinlab_runner::{init_tracing, run_all, BacktestConfig};

fn main() -> Result<()> {
    init_tracing();

    let config_path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: backtest <config.toml>")?;
    let config = BacktestConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let outcomes = run_all(&config);
    let mut failures = 0;
    for (coin, outcome) in &outcomes {
        match outcome {
            Ok(result) => println!("{}", result.summary()),
            Err(e) => {
                eprintln!("{coin}: {e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} coins failed", outcomes.len());
    }
    Ok(())
}

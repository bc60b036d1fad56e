use std::{env, process};

use anyhow::{Context, Result};
use log::{error, info};
use runner::{RunConfig, run};

fn main() {
    env_logger::init();

    if let Err(e) = try_main() {
        error!("{e:#}");
        process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let Some(path) = env::args().nth(1) else {
        anyhow::bail!("usage: runner <config.json>");
    };

    let config = RunConfig::load(&path).with_context(|| format!("loading '{path}'"))?;
    let outcome = run(&config).context("run failed")?;

    info!(epochs = outcome.summary.epochs_run; "finished: {}", outcome.state);
    Ok(())
}

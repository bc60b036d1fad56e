use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};
use machine_learning::{diffusion::FeatureSequence, graph::Graph, training::SignTrainer};
use trainer::{
    EpochController, Result, RunOutcome, SinkErr,
    sink::{JsonLinesSink, LogSink, MetricSink},
    timing::timed,
};

use crate::{Adapter, RunConfig};

/// The resolved configuration file written to the output directory.
pub const CONFIG_FILE: &str = "run_config.json";

/// The per-epoch metrics file written to the output directory.
pub const METRICS_FILE: &str = "metrics.jsonl";

/// Executes one run with the default sinks.
pub fn run(config: &RunConfig) -> Result<RunOutcome> {
    run_with_sinks(config, Vec::new())
}

/// Executes one run: loads the graph, diffuses its features once, trains
/// until a stopping condition and reports to `sinks` besides the default
/// ones.
///
/// # Arguments
/// * `config` - The run configuration.
/// * `sinks` - Extra destinations for the epoch records.
///
/// # Returns
/// The outcome of the run, or the configuration, data or step failure that
/// prevented it from finishing.
pub fn run_with_sinks(config: &RunConfig, sinks: Vec<Box<dyn MetricSink>>) -> Result<RunOutcome> {
    let (sign_spec, controller_config) = Adapter::new().adapt(config)?;
    let scorer = config.dataset.scorer();

    let graph = Graph::load(&config.graph_path)?;
    info!(
        nodes = graph.num_nodes(),
        edges = graph.edges().len(),
        features = graph.num_features(),
        classes = graph.num_classes();
        "loaded {} graph",
        config.dataset
    );

    let (features, elapsed) = timed(|| FeatureSequence::precompute(&graph, config.k));
    let features = features?;
    info!(k = config.k; "transformation time (s): {:.4}", elapsed.as_secs_f64());

    let trainer = SignTrainer::new(&sign_spec, &graph, features, scorer)?;
    let mut controller = EpochController::new(controller_config, trainer).with_sink(LogSink::new());

    if let Some(dir) = &config.output_dir {
        for sink in output_sinks(config, dir) {
            controller.add_sink(sink);
        }
    }

    for sink in sinks {
        controller.add_sink(sink);
    }

    controller.run()
}

/// Writes the resolved configuration as pretty JSON into `dir`.
///
/// # Returns
/// The path of the written file.
pub fn persist_config(config: &RunConfig, dir: &Path) -> std::result::Result<PathBuf, SinkErr> {
    let path = dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Prepares the output directory. Nothing in it is required for the run to
/// go on, so failures are only logged.
fn output_sinks(config: &RunConfig, dir: &Path) -> Vec<Box<dyn MetricSink>> {
    if let Err(e) = fs::create_dir_all(dir) {
        warn!("cannot create output dir '{}': {e}", dir.display());
        return Vec::new();
    }

    match persist_config(config, dir) {
        Ok(path) => info!("run config written to '{}'", path.display()),
        Err(e) => warn!("cannot persist run config: {e}"),
    }

    match JsonLinesSink::create(dir.join(METRICS_FILE)) {
        Ok(sink) => vec![Box::new(sink) as Box<dyn MetricSink>],
        Err(e) => {
            warn!("cannot create metrics file: {e}");
            Vec::new()
        }
    }
}

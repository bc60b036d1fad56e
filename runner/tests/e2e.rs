use std::{
    fs,
    path::{Path, PathBuf},
};

use machine_learning::{
    MlErr,
    graph::{GraphSpec, Masks},
};
use runner::{CONFIG_FILE, METRICS_FILE, RunConfig, run, run_with_sinks};
use trainer::{RunState, TrainErr, sink::MemorySink};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("runner-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// A 5-node path with a 2-class labelling, written as a graph descriptor.
fn write_path_graph(dir: &Path) -> PathBuf {
    let spec = GraphSpec {
        num_nodes: 5,
        num_classes: 2,
        features: vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0], vec![0.0, 1.0]],
        edges: vec![(0, 1), (1, 0), (1, 2), (2, 1), (2, 3), (3, 2), (3, 4), (4, 3)],
        labels: vec![0, 0, 1, 1, 1],
        masks: Masks {
            train: vec![true, false, false, true, false],
            val: vec![false, true, false, false, true],
            test: vec![false, false, true, false, false],
        },
    };

    let path = dir.join("graph.json");
    fs::write(&path, serde_json::to_string(&spec).unwrap()).unwrap();
    path
}

fn config(graph_path: &Path, output_dir: Option<&Path>, epochs: usize) -> RunConfig {
    let json = serde_json::json!({
        "dataset": "cora",
        "graph_path": graph_path,
        "epochs": epochs,
        "hidden_channel": 4,
        "dropout": 0.1,
        "k": 2,
        "batch_size": 1,
        "eval_batch_size": 2,
        "optimizer": {"lr": 0.01, "weight_decay": 0.0},
        "early_stop": {"patience": 50},
        "output_dir": output_dir,
    });

    RunConfig::from_json(&json.to_string()).unwrap()
}

#[test]
fn run_writes_the_config_and_one_metrics_line_per_epoch() {
    let dir = scratch_dir("artifacts");
    let graph = write_path_graph(&dir);
    let out = dir.join("out");
    let config = config(&graph, Some(out.as_path()), 4);

    let memory = MemorySink::new();
    let outcome = run_with_sinks(&config, vec![Box::new(memory.clone())]).unwrap();

    assert_eq!(outcome.state, RunState::StoppedBudget);
    assert_eq!(outcome.records.len(), 4);
    assert_eq!(memory.records().len(), 4);
    assert_eq!(outcome.summary.trainable_params, 3 * (2 * 4 + 4) + (12 * 2 + 2));

    let record = &outcome.records[0];
    for key in ["val_loss", "train_f1", "val_f1", "test_f1"] {
        assert!(record.eval.metrics.get(key).is_some(), "missing {key}");
    }

    let persisted = RunConfig::load(out.join(CONFIG_FILE)).unwrap();
    assert_eq!(persisted, config);

    let metrics = fs::read_to_string(out.join(METRICS_FILE)).unwrap();
    assert_eq!(metrics.lines().count(), 5);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn same_seed_gives_the_same_losses() {
    let dir = scratch_dir("seed");
    let graph = write_path_graph(&dir);
    let config = config(&graph, None, 3);

    let losses = |outcome: trainer::RunOutcome| -> Vec<Option<f64>> {
        outcome.records.iter().map(|r| r.val_loss()).collect()
    };

    let a = losses(run(&config).unwrap());
    let b = losses(run(&config).unwrap());
    assert_eq!(a, b);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_graph_is_a_data_error() {
    let dir = scratch_dir("missing");
    let config = config(&dir.join("nope.json"), None, 1);

    assert!(matches!(run(&config), Err(TrainErr::Data(MlErr::Io(_)))));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn graph_without_val_nodes_fails_before_any_epoch() {
    let dir = scratch_dir("no-val");
    let graph = write_path_graph(&dir);
    let mut spec: GraphSpec = serde_json::from_str(&fs::read_to_string(&graph).unwrap()).unwrap();
    spec.masks.val = vec![false; 5];
    fs::write(&graph, serde_json::to_string(&spec).unwrap()).unwrap();

    let memory = MemorySink::new();
    let result = run_with_sinks(&config(&graph, None, 3), vec![Box::new(memory.clone())]);

    assert!(matches!(result, Err(TrainErr::Data(MlErr::EmptySplit("val")))));
    assert!(memory.records().is_empty());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn invalid_values_fail_before_loading_anything() {
    let dir = scratch_dir("invalid");
    let mut config = config(&dir.join("nope.json"), None, 1);
    config.batch_size = 0;

    assert!(matches!(run(&config), Err(TrainErr::Config(_))));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn demo_config_is_valid() {
    let config = RunConfig::load("../demos/run.json").unwrap();
    assert!(runner::Adapter::new().adapt(&config).is_ok());
    assert_eq!(config.dataset.scorer(), machine_learning::scoring::Scorer::MacroF1);
}

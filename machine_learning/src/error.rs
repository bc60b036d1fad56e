use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use ndarray::ShapeError;

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    EdgeOutOfBounds {
        edge: usize,
        node: usize,
        num_nodes: usize,
    },
    LabelOutOfBounds {
        node: usize,
        label: usize,
        num_classes: usize,
    },
    NoClasses,
    HopOutOfRange {
        hop: usize,
        hops: usize,
    },
    EmptyBatch,
    EmptySplit(&'static str),
    InvalidInit(String),
    Shape(ShapeError),
    Io(io::Error),
    Json(serde_json::Error),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch between {a} and {b}, got {got} and expected {expected}"
            ),
            MlErr::EdgeOutOfBounds {
                edge,
                node,
                num_nodes,
            } => write!(
                f,
                "edge {edge} references node {node} but the graph has {num_nodes} nodes"
            ),
            MlErr::LabelOutOfBounds {
                node,
                label,
                num_classes,
            } => write!(
                f,
                "node {node} has label {label} but there are only {num_classes} classes"
            ),
            MlErr::NoClasses => write!(f, "the graph must declare at least one class"),
            MlErr::HopOutOfRange { hop, hops } => {
                write!(f, "hop {hop} requested but only {hops} feature matrices exist")
            }
            MlErr::EmptyBatch => write!(f, "tried to run a step over an empty batch"),
            MlErr::EmptySplit(split) => write!(f, "the {split} mask selects no nodes"),
            MlErr::InvalidInit(msg) => write!(f, "invalid parameter initialization: {msg}"),
            MlErr::Shape(e) => write!(f, "shape error: {e}"),
            MlErr::Io(e) => write!(f, "io error: {e}"),
            MlErr::Json(e) => write!(f, "invalid graph descriptor: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Shape(e) => Some(e),
            MlErr::Io(e) => Some(e),
            MlErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for MlErr {
    fn from(value: ShapeError) -> Self {
        Self::Shape(value)
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

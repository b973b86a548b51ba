//! Pipeline-level error types.

use pl_core::{NodeId, PlError};

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("Port error: {0}")]
    Port(#[from] PlError),

    #[error("No such node: {node}")]
    NoSuchNode { node: NodeId },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    /// The port lookup failure behind this error, if that is what it is.
    pub fn as_port_error(&self) -> Option<&PlError> {
        match self {
            GraphError::Port(err) => Some(err),
            _ => None,
        }
    }
}

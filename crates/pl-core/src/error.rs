use core::fmt;

use thiserror::Error;

pub type PlResult<T> = Result<T, PlError>;

/// The three independent port name spaces of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PortKind {
    Input,
    MultiInput,
    Output,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKind::Input => write!(f, "input"),
            PortKind::MultiInput => write!(f, "multi-input"),
            PortKind::Output => write!(f, "output"),
        }
    }
}

/// Port lookup and registration failures.
///
/// These signal a malformed graph and are raised at the point of lookup.
/// A port refusing a binding is not an error; see the `accept_*` methods.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlError {
    #[error("not enough inputs: index {index} requested, {count} registered")]
    NotEnoughInputs { count: usize, index: usize },

    #[error("no such input: {name}")]
    NoSuchInput { name: String },

    #[error("not enough outputs: index {index} requested, {count} registered")]
    NotEnoughOutputs { count: usize, index: usize },

    #[error("no such output: {name}")]
    NoSuchOutput { name: String },

    #[error("duplicate {kind} name: {name}")]
    DuplicatePortName { kind: PortKind, name: String },

    #[error("{kind} {index} is not a {expected}")]
    PortTypeMismatch {
        kind: PortKind,
        index: usize,
        expected: &'static str,
    },
}

impl PlError {
    /// Error for an index lookup past the end of a port list.
    pub fn out_of_range(kind: PortKind, count: usize, index: usize) -> Self {
        match kind {
            PortKind::Input | PortKind::MultiInput => PlError::NotEnoughInputs { count, index },
            PortKind::Output => PlError::NotEnoughOutputs { count, index },
        }
    }

    /// Error for a name lookup that matched no registration.
    pub fn missing(kind: PortKind, name: impl Into<String>) -> Self {
        let name = name.into();
        match kind {
            PortKind::Input | PortKind::MultiInput => PlError::NoSuchInput { name },
            PortKind::Output => PlError::NoSuchOutput { name },
        }
    }
}

use crate::graph::NodeId;
use crate::value::{Value, ValueType};
use thiserror::Error;

/// Errors that can occur while encoding or decoding persisted graph data.
#[derive(Error, Debug, Clone)]
pub enum CodecError {
    #[error("unrecognized data signature, expected \"{expected}\"")]
    BadSignature { expected: &'static str },

    #[error("corrupt graph data: {0}")]
    Corrupt(String),

    #[error("node '{node}' references operation '{operation}', which is not registered")]
    UnresolvedOperation { node: NodeId, operation: String },
}

/// Errors raised by an operation entry point during invocation.
#[derive(Error, Debug, Clone)]
pub enum InvokeError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("parameter '{parameter}': expected {expected}, but found value '{found}'")]
    TypeMismatch {
        parameter: String,
        expected: ValueType,
        found: Value,
    },

    #[error("parameter '{0}' is not an output and cannot be written")]
    NotAnOutput(String),

    #[error("{0}")]
    Failed(String),
}

/// Errors that can occur while the execution engine walks the graph.
///
/// These propagate out of `execute` and `resolve`; the engine performs no
/// recovery, and the caller must discard the executor's in-flight state.
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    #[error("operation call failed on node '{node}': {source}")]
    Invocation {
        node: NodeId,
        #[source]
        source: InvokeError,
    },

    #[error("cyclic data dependency detected at node '{node}'")]
    CyclicGraph { node: NodeId },
}

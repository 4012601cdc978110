//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types from the kairo crate. Import
//! this module to get access to the core functionality without having to
//! import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use kairo::prelude::*;
//!
//! let mut registry = Registry::new();
//! let op = registry.register(
//!     Operation::build("noop").callable(false).run(|_ctx| Ok(())),
//! );
//! let mut graph = Graph::new();
//! graph.add_node(NodeInstance::new(op));
//! ```

// Graph model
pub use crate::graph::{Connection, CustomEditor, Graph, NodeId, NodeInstance, Socket};

// Operation registry
pub use crate::registry::{
    CallContext, Direction, Operation, OperationBuilder, OperationInfo, ParamSpec, Registry,
};

// Execution engine
pub use crate::engine::{Executor, Feedback, FeedbackSink, Severity};

// Values and per-node state
pub use crate::properties::PropertyBag;
pub use crate::value::{ExecutionPath, Value, ValueType};

// Error types
pub use crate::error::{CodecError, ExecutionError, InvokeError};

// Persistence entry points
pub use crate::codec::{decode, encode};

//! # Kairo - Node Graph Execution Engine
//!
//! **Kairo** lets a host application expose a library of typed node
//! operations (ordinary functions with named inputs and outputs) and lets a
//! user wire instances of those operations into a directed graph that can be
//! executed, partially re-executed, persisted, and reloaded.
//!
//! ## Core Workflow
//!
//! 1.  **Register Operations**: At startup, the host builds a [`Registry`]
//!     of [`Operation`]s. Each operation declares its parameters, menu
//!     metadata, and an entry point closure.
//! 2.  **Build a Graph**: Place [`NodeInstance`]s of those operations into a
//!     [`Graph`] and wire their sockets with [`Connection`]s. Inputs are
//!     single-assignment; connecting into a taken input displaces the old
//!     connection.
//! 3.  **Execute**: An [`Executor`] resolves each node's data dependencies
//!     bottom-up and walks execution edges from the start node, branching
//!     where operations signal alternate execution outputs and returning to
//!     branch points through a return-address stack.
//! 4.  **Persist**: [`codec::encode`] snapshots the graph and every property
//!     bag into a versioned binary stream; [`codec::decode`] rebuilds the
//!     graph later, re-binding operations by name against the registry.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kairo::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Expose host functionality as operations.
//!     let mut registry = Registry::new();
//!     let starter = registry.register(
//!         Operation::build("starter")
//!             .title("Starter")
//!             .menu("Helper")
//!             .description("Starts execution.")
//!             .exec_init(true)
//!             .run(|_ctx| Ok(())),
//!     );
//!     let value = registry.register(
//!         Operation::build("value")
//!             .title("Value")
//!             .menu("Input")
//!             .callable(false)
//!             .input_with_default("in", ValueType::Number, Value::Number(2.0))
//!             .output("out", ValueType::Number)
//!             .run(|ctx| {
//!                 let v = ctx.number("in")?;
//!                 ctx.set("out", Value::Number(v))
//!             }),
//!     );
//!     let show = registry.register(
//!         Operation::build("show")
//!             .title("Show Value")
//!             .menu("Helper")
//!             .input("x", ValueType::Number)
//!             .run(|ctx| {
//!                 println!("-> {}", ctx.number("x")?);
//!                 Ok(())
//!             }),
//!     );
//!
//!     // 2. Wire a graph: Starter -> Show, with Value feeding Show's input.
//!     let mut graph = Graph::new();
//!     let start = graph.add_node(NodeInstance::new(starter));
//!     let source = graph.add_node(NodeInstance::new(value));
//!     let sink = graph.add_node(NodeInstance::new(show));
//!     graph.connect(Connection::new(start, Socket::EXIT, sink, Socket::ENTER));
//!     graph.connect(Connection::new(source, "out", sink, "x"));
//!
//!     // 3. Execute from the initiator, printing feedback as it arrives.
//!     let mut executor = Executor::new(&mut graph, |fb: Feedback| {
//!         eprintln!("[{}] {}", fb.severity, fb.message);
//!     });
//!     executor.execute(None)?;
//!
//!     // 4. Persist and reload against the same registry.
//!     let bytes = kairo::codec::encode(&graph);
//!     let reloaded = kairo::codec::decode(&bytes, &registry)?;
//!     assert_eq!(reloaded.nodes().len(), graph.nodes().len());
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod engine;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod properties;
pub mod registry;
pub mod value;

pub use engine::{Executor, Feedback, FeedbackSink, Severity};
pub use graph::{Connection, CustomEditor, Graph, NodeId, NodeInstance, Socket};
pub use properties::PropertyBag;
pub use registry::{CallContext, Operation, OperationInfo, Registry};
pub use value::{ExecutionPath, Value, ValueType};

//! The execution engine.
//!
//! Execution combines two walks over the same graph: a pull-based dataflow
//! pass ([`Executor::resolve`]) that evaluates a node's data dependencies
//! bottom-up, and a push-based control-flow walk ([`Executor::execute`])
//! that follows execution edges from node to node, branching where an
//! operation signals a non-main execution output and backtracking through a
//! return-address stack when a side path runs out of edges.

use crate::error::ExecutionError;
use crate::graph::{Graph, NodeId};
use crate::registry::{CallContext, Direction};
use crate::value::{Value, ValueType};
use ahash::AHashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace};

mod feedback;

pub use feedback::{Feedback, FeedbackSink, Severity};

enum NextStep {
    /// A signaled non-main execution edge; the current node becomes a return
    /// address.
    Branch(NodeId),
    /// The main Exit edge.
    Main(NodeId),
    /// No outgoing execution edge applied.
    End,
}

/// Drives execution over a graph.
///
/// The executor borrows the graph exclusively for its lifetime; all engine
/// entry points run on the calling thread and operations are invoked
/// synchronously. When `execute` or `resolve` fails, in-flight queue and
/// stack state is meaningless and the executor should be discarded.
pub struct Executor<'g, S: FeedbackSink> {
    graph: &'g mut Graph,
    sink: S,
    break_requested: bool,
}

impl<'g> Executor<'g, fn(Feedback)> {
    /// An executor that discards all feedback.
    pub fn silent(graph: &'g mut Graph) -> Self {
        fn discard(_: Feedback) {}
        Self::new(graph, discard)
    }
}

impl<'g, S: FeedbackSink> Executor<'g, S> {
    pub fn new(graph: &'g mut Graph, sink: S) -> Self {
        Self {
            graph,
            sink,
            break_requested: false,
        }
    }

    pub fn graph(&self) -> &Graph {
        self.graph
    }

    /// Runs the control-flow walk from `start`, or from the graph's
    /// execution initiator when `start` is `None`. A graph without an
    /// initiator is a successful no-op.
    ///
    /// Each visited node is resolved, invoked, and then handed off: a
    /// signaled non-main execution edge is preferred (pushing the current
    /// node as a return address), else the main Exit edge, else a popped
    /// return address is re-entered with its back-executed marker set. An
    /// operation reporting breaking feedback stops the walk before the next
    /// node is invoked.
    pub fn execute(&mut self, start: Option<NodeId>) -> Result<(), ExecutionError> {
        self.break_requested = false;
        let start = start.or_else(|| self.graph.execution_initiator().map(|n| n.id()));
        let Some(start) = start else {
            debug!("execute: no start node and no execution initiator");
            return Ok(());
        };

        let mut queue = VecDeque::new();
        let mut return_stack: Vec<NodeId> = Vec::new();
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if self.break_requested {
                debug!(node = %current, "execution break requested, stopping");
                self.break_requested = false;
                return_stack.clear();
                return Ok(());
            }
            let Some(node) = self.graph.node_mut(current) else {
                continue;
            };
            node.feedback = Severity::Debug;
            debug!(node = %current, name = %node.name, "executing node");

            self.resolve(current)?;
            self.invoke(current)?;

            match self.next_step(current) {
                NextStep::Branch(next) => {
                    return_stack.push(current);
                    self.enqueue_forward(next, &mut queue);
                }
                NextStep::Main(next) => {
                    self.enqueue_forward(next, &mut queue);
                }
                NextStep::End => {
                    if let Some(back) = return_stack.pop() {
                        trace!(node = %back, "returning to branch point");
                        if let Some(node) = self.graph.node_mut(back) {
                            node.back_executed = true;
                        }
                        queue.push_back(back);
                    }
                }
            }
        }
        Ok(())
    }

    fn enqueue_forward(&mut self, next: NodeId, queue: &mut VecDeque<NodeId>) {
        if let Some(node) = self.graph.node_mut(next) {
            node.back_executed = false;
        }
        queue.push_back(next);
    }

    /// Picks the connection to follow out of a just-invoked node.
    fn next_step(&self, current: NodeId) -> NextStep {
        let Some(node) = self.graph.node(current) else {
            return NextStep::End;
        };
        let sockets = node.sockets();
        let mut main_exit = None;
        for connection in self.graph.connections_from(current) {
            let Some(socket) = sockets.iter().find(|s| s.name == connection.output_socket)
            else {
                continue;
            };
            if socket.is_input() || socket.value_type != ValueType::Execution {
                continue;
            }
            if socket.main_execution {
                if main_exit.is_none() {
                    main_exit = Some(connection.input_node);
                }
                continue;
            }
            let signaled = matches!(
                node.properties.get(&connection.output_socket),
                Some(Value::Exec(path)) if path.signaled
            );
            if signaled {
                trace!(node = %current, socket = %connection.output_socket, "taking branch");
                return NextStep::Branch(connection.input_node);
            }
        }
        match main_exit {
            Some(next) => NextStep::Main(next),
            None => NextStep::End,
        }
    }

    /// Recursively pulls a node's data dependencies: every input socket with
    /// an incoming data connection has its source resolved first, pure
    /// (non-callable) sources invoked, and the produced output copied into
    /// this node's property bag.
    ///
    /// Resolution is deliberately unmemoized; a source shared by several
    /// resolve paths is invoked once per path. A cycle in the data subgraph
    /// fails with `ExecutionError::CyclicGraph`.
    pub fn resolve(&mut self, node: NodeId) -> Result<(), ExecutionError> {
        let mut path = AHashSet::new();
        self.resolve_inner(node, &mut path)
    }

    fn resolve_inner(
        &mut self,
        id: NodeId,
        path: &mut AHashSet<NodeId>,
    ) -> Result<(), ExecutionError> {
        if !path.insert(id) {
            return Err(ExecutionError::CyclicGraph { node: id });
        }
        for input in self.input_names(id) {
            let Some((source, output_socket)) = self.data_edge_into(id, &input) else {
                continue;
            };
            trace!(node = %id, input = %input, source = %source, "resolving input");
            self.resolve_inner(source, path)?;
            let source_callable = self.graph.node(source).map(|n| n.callable).unwrap_or(true);
            if !source_callable {
                self.invoke(source)?;
            }
            self.copy_value(source, &output_socket, id, &input);
        }
        path.remove(&id);
        Ok(())
    }

    /// Binds the node's declared parameters from its property bag, calls the
    /// operation entry point, and writes produced output values back. All
    /// feedback collected during the call is forwarded to the sink; a
    /// breaking report latches the stop flag `execute` polls.
    pub fn invoke(&mut self, id: NodeId) -> Result<(), ExecutionError> {
        let Some(node) = self.graph.node(id) else {
            return Ok(());
        };
        let operation = Arc::clone(node.operation());
        let mut values: Vec<Value> = operation
            .params()
            .iter()
            .map(|p| node.properties.get(&p.name).cloned().unwrap_or(Value::Null))
            .collect();

        let mut feedback = Vec::new();
        let result = {
            let mut ctx = CallContext::new(id, operation.params(), &mut values, &mut feedback);
            operation.call(&mut ctx)
        };

        if result.is_ok() {
            if let Some(node) = self.graph.node_mut(id) {
                for (param, value) in operation.params().iter().zip(values) {
                    if param.direction == Direction::Output {
                        node.properties.set(&param.name, value);
                    }
                }
            }
        }

        let worst = feedback.iter().map(|f| f.severity).max();
        if let Some(severity) = worst {
            if let Some(node) = self.graph.node_mut(id) {
                node.feedback = severity;
            }
        }
        for report in feedback {
            if report.breaking {
                debug!(node = %id, message = %report.message, "breaking feedback reported");
                self.break_requested = true;
            }
            self.sink.report(report);
        }

        result.map_err(|source| ExecutionError::Invocation { node: id, source })
    }

    /// Eagerly evaluates the data subgraphs feeding the nodes with the given
    /// display names: every node transitively reachable over incoming data
    /// connections is invoked, callable or not, independent of any
    /// control-flow walk.
    pub fn execute_resolving<N: AsRef<str>>(&mut self, names: &[N]) -> Result<(), ExecutionError> {
        let graph = &*self.graph;
        let targets: Vec<NodeId> = names
            .iter()
            .flat_map(|name| graph.find_by_name(name.as_ref()))
            .map(|n| n.id())
            .collect();
        for id in targets {
            let mut path = AHashSet::new();
            self.execute_resolving_inner(id, &mut path)?;
        }
        Ok(())
    }

    fn execute_resolving_inner(
        &mut self,
        id: NodeId,
        path: &mut AHashSet<NodeId>,
    ) -> Result<(), ExecutionError> {
        if !path.insert(id) {
            return Err(ExecutionError::CyclicGraph { node: id });
        }
        for input in self.input_names(id) {
            let Some((source, output_socket)) = self.data_edge_into(id, &input) else {
                continue;
            };
            self.resolve(source)?;
            self.invoke(source)?;
            self.execute_resolving_inner(source, path)?;
            self.copy_value(source, &output_socket, id, &input);
        }
        path.remove(&id);
        Ok(())
    }

    /// Whether `end` is reachable from `start` over data connections alone.
    pub fn has_impact(&self, start: NodeId, end: NodeId) -> bool {
        let mut visited = AHashSet::new();
        visited.insert(start);
        self.has_impact_inner(start, end, &mut visited)
    }

    fn has_impact_inner(
        &self,
        start: NodeId,
        end: NodeId,
        visited: &mut AHashSet<NodeId>,
    ) -> bool {
        for connection in self.graph.connections_from(start) {
            if self.graph.is_execution(connection) {
                continue;
            }
            if connection.input_node == end {
                return true;
            }
            if visited.insert(connection.input_node)
                && self.has_impact_inner(connection.input_node, end, visited)
            {
                return true;
            }
        }
        false
    }

    fn input_names(&self, id: NodeId) -> Vec<String> {
        self.graph
            .node(id)
            .map(|n| n.operation().inputs().map(|p| p.name.clone()).collect())
            .unwrap_or_default()
    }

    /// The data connection feeding an input socket, as `(source node, source
    /// output socket)`. Execution edges are not data dependencies.
    fn data_edge_into(&self, id: NodeId, input: &str) -> Option<(NodeId, String)> {
        match self.graph.connection_into(id, input) {
            Some(c) if !self.graph.is_execution(c) => {
                Some((c.output_node, c.output_socket.clone()))
            }
            _ => None,
        }
    }

    fn copy_value(&mut self, source: NodeId, output_socket: &str, dest: NodeId, input: &str) {
        let value = self
            .graph
            .node(source)
            .and_then(|n| n.properties.get(output_socket))
            .cloned()
            .unwrap_or(Value::Null);
        if let Some(node) = self.graph.node_mut(dest) {
            node.properties.set(input, value);
        }
    }
}

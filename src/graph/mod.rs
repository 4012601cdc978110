//! The graph model: node instances and the directed connections between
//! their sockets.

use crate::value::ValueType;
use ahash::AHashMap;
use itertools::Itertools;
use std::cell::RefCell;

mod connection;
mod node;

pub use connection::Connection;
pub use node::{CustomEditor, NodeId, NodeInstance, Socket};

/// The set of node instances and connections currently loaded.
///
/// The graph owns its nodes; removing a node cascades removal of every
/// connection touching it. Inputs are single-assignment: connecting into an
/// already-connected input displaces the previous connection.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<NodeInstance>,
    connections: Vec<Connection>,
    // Lazily rebuilt `(input node, input socket) -> connection index` lookup,
    // discarded on every structural change.
    input_index: RefCell<Option<AHashMap<(NodeId, String), usize>>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: NodeInstance) -> NodeId {
        let id = node.id();
        self.nodes.push(node);
        id
    }

    /// Removes a node and every connection incident to it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<NodeInstance> {
        let position = self.nodes.iter().position(|n| n.id() == id)?;
        self.connections
            .retain(|c| c.output_node != id && c.input_node != id);
        self.mark_dirty();
        Some(self.nodes.remove(position))
    }

    /// Drops all nodes and connections.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.mark_dirty();
    }

    pub fn nodes(&self) -> &[NodeInstance] {
        &self.nodes
    }

    /// Nodes in display-priority order, lower `order` first.
    pub fn nodes_by_order(&self) -> Vec<&NodeInstance> {
        self.nodes.iter().sorted_by_key(|n| n.order).collect()
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeInstance> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeInstance> {
        self.nodes.iter_mut().find(|n| n.id() == id)
    }

    /// All nodes carrying the given display name.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a NodeInstance> {
        self.nodes.iter().filter(move |n| n.name == name)
    }

    /// Adds a connection. If the destination input is already connected, the
    /// existing connection is removed first and returned, keeping each input
    /// the target of at most one connection.
    pub fn connect(&mut self, connection: Connection) -> Option<Connection> {
        let existing = self.connections.iter().position(|c| {
            c.input_node == connection.input_node && c.input_socket == connection.input_socket
        });
        let displaced = existing.map(|i| self.connections.remove(i));
        self.connections.push(connection);
        self.mark_dirty();
        displaced
    }

    /// Removes a connection by exact endpoints. Returns whether one existed.
    pub fn disconnect(&mut self, connection: &Connection) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c != connection);
        let removed = self.connections.len() != before;
        if removed {
            self.mark_dirty();
        }
        removed
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connections_from(&self, node: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.output_node == node)
    }

    /// The connection feeding a given input socket, if any.
    pub fn connection_into(&self, node: NodeId, socket: &str) -> Option<&Connection> {
        let mut index = self.input_index.borrow_mut();
        let index = index.get_or_insert_with(|| {
            self.connections
                .iter()
                .enumerate()
                .map(|(i, c)| ((c.input_node, c.input_socket.clone()), i))
                .collect()
        });
        index
            .get(&(node, socket.to_string()))
            .map(|&i| &self.connections[i])
    }

    /// A connection is an execution edge iff its output socket's type is the
    /// execution-path type. Unknown endpoints classify as data.
    pub fn is_execution(&self, connection: &Connection) -> bool {
        self.node(connection.output_node)
            .and_then(|n| n.socket(&connection.output_socket))
            .is_some_and(|s| s.value_type == ValueType::Execution)
    }

    /// The default execution start point: the first node flagged `exec_init`.
    pub fn execution_initiator(&self) -> Option<&NodeInstance> {
        self.nodes.iter().find(|n| n.exec_init)
    }

    fn mark_dirty(&mut self) {
        *self.input_index.borrow_mut() = None;
    }
}

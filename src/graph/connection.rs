use crate::graph::NodeId;

/// A directed edge from an output socket to an input socket.
///
/// Endpoints are stored by node id and socket name rather than by reference,
/// so a connection stays valid across graph reloads as long as both nodes
/// exist. Whether the edge is an execution edge or a data edge is a property
/// of the source socket's type and is answered by
/// [`Graph::is_execution`](crate::graph::Graph::is_execution).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub output_node: NodeId,
    pub output_socket: String,
    pub input_node: NodeId,
    pub input_socket: String,
}

impl Connection {
    pub fn new(
        output_node: NodeId,
        output_socket: impl Into<String>,
        input_node: NodeId,
        input_socket: impl Into<String>,
    ) -> Self {
        Self {
            output_node,
            output_socket: output_socket.into(),
            input_node,
            input_socket: input_socket.into(),
        }
    }
}

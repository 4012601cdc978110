//! The versioned binary persistence format.
//!
//! Layout (little-endian, strings as `(i32 length, UTF-8 bytes)`): the
//! `"NodeSystemP"` signature and an `i32` version, then a counted sequence
//! of node records, a counted sequence of connection records, and a trailing
//! graph extension block. Every record ends with a length-prefixed
//! extension block, so a reader decodes the fields it knows and skips the
//! rest; streams written by newer writers that append fields remain
//! loadable.
//!
//! Decoding builds a fresh [`Graph`] and re-binds every node to its
//! operation by name against the registry; on any failure the caller's
//! existing graph is untouched.

use crate::error::CodecError;
use crate::graph::{Connection, CustomEditor, Graph, NodeId, NodeInstance};
use crate::properties::PropertyBag;
use crate::registry::Registry;
use std::sync::Arc;
use tracing::debug;

pub(crate) mod wire;

use wire::{ByteReader, ByteWriter};

/// Recognition string at the head of every persisted graph.
pub const SIGNATURE: &str = "NodeSystemP";

/// Format version emitted by this writer.
pub const VERSION: i32 = 1000;

/// Serializes a graph and all its property bags to bytes.
pub fn encode(graph: &Graph) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.string(SIGNATURE);
    w.i32(VERSION);

    w.i32(graph.nodes().len() as i32);
    for node in graph.nodes() {
        encode_node(&mut w, node);
    }

    w.i32(graph.connections().len() as i32);
    for connection in graph.connections() {
        w.string(&connection.output_node.to_string());
        w.string(&connection.output_socket);
        w.string(&connection.input_node.to_string());
        w.string(&connection.input_socket);
        w.i32(0); // connection extension block
    }

    w.i32(0); // graph extension block
    w.into_bytes()
}

fn encode_node(w: &mut ByteWriter, node: &NodeInstance) {
    w.string(&node.id().to_string());
    w.f32(node.x);
    w.f32(node.y);
    w.bool(node.callable);
    w.bool(node.exec_init);
    w.string(&node.name);
    w.i32(node.order);
    match &node.custom_editor {
        Some(editor) => {
            w.string(&editor.assembly);
            w.string(&editor.type_name);
        }
        None => {
            w.string("");
            w.string("");
        }
    }
    w.string(node.operation().name());
    w.block(&node.properties.to_bytes());

    // Node extension block: tag and ARGB color.
    w.i32(8);
    w.i32(node.tag);
    w.i32(node.color);
}

/// Deserializes a byte stream into a fresh graph, re-binding each node's
/// operation by name against `registry`.
pub fn decode(bytes: &[u8], registry: &Registry) -> Result<Graph, CodecError> {
    let mut r = ByteReader::new(bytes);
    let signature = r.string()?;
    if signature != SIGNATURE {
        return Err(CodecError::BadSignature {
            expected: SIGNATURE,
        });
    }
    let version = r.i32()?;

    let node_count = count(r.i32()?, "node")?;
    debug!(version, node_count, "decoding graph");
    let mut graph = Graph::new();
    for _ in 0..node_count {
        let node = decode_node(&mut r, registry)?;
        graph.add_node(node);
    }

    let connection_count = count(r.i32()?, "connection")?;
    for _ in 0..connection_count {
        let output_guid = r.string()?;
        let output_socket = r.string()?;
        let input_guid = r.string()?;
        let input_socket = r.string()?;
        r.block()?; // connection extension block

        let output_node = endpoint(&graph, &output_guid)?;
        let input_node = endpoint(&graph, &input_guid)?;
        graph.connect(Connection::new(
            output_node,
            output_socket,
            input_node,
            input_socket,
        ));
    }

    r.block()?; // graph extension block
    Ok(graph)
}

fn decode_node(r: &mut ByteReader<'_>, registry: &Registry) -> Result<NodeInstance, CodecError> {
    let guid = r.string()?;
    let id = NodeId::parse(&guid)
        .map_err(|_| CodecError::Corrupt(format!("invalid node guid '{}'", guid)))?;
    let x = r.f32()?;
    let y = r.f32()?;
    let callable = r.bool()?;
    let exec_init = r.bool()?;
    let name = r.string()?;
    let order = r.i32()?;
    let editor_assembly = r.string()?;
    let editor_type_name = r.string()?;
    let custom_editor = if editor_type_name.is_empty() {
        None
    } else {
        Some(CustomEditor {
            assembly: editor_assembly,
            type_name: editor_type_name,
        })
    };
    let operation_name = r.string()?;
    let properties = PropertyBag::from_bytes(r.block()?)?;

    // Node extension block: tag if at least 4 bytes, color if at least 8,
    // anything further belongs to a newer writer.
    let extra = r.block()?;
    let mut er = ByteReader::new(extra);
    let mut tag = 0;
    let mut color = NodeInstance::DEFAULT_COLOR;
    if er.remaining() >= 4 {
        tag = er.i32()?;
        if er.remaining() >= 4 {
            color = er.i32()?;
        }
    }

    let operation = registry
        .resolve(&operation_name)
        .map(Arc::clone)
        .ok_or_else(|| CodecError::UnresolvedOperation {
            node: id,
            operation: operation_name.clone(),
        })?;

    Ok(NodeInstance::restore(
        operation,
        id,
        name,
        x,
        y,
        callable,
        exec_init,
        order,
        custom_editor,
        properties,
        tag,
        color,
    ))
}

fn endpoint(graph: &Graph, guid: &str) -> Result<NodeId, CodecError> {
    let id = NodeId::parse(guid)
        .map_err(|_| CodecError::Corrupt(format!("invalid connection endpoint guid '{}'", guid)))?;
    if graph.node(id).is_none() {
        return Err(CodecError::Corrupt(format!(
            "connection references unknown node '{}'",
            guid
        )));
    }
    Ok(id)
}

fn count(raw: i32, what: &str) -> Result<i32, CodecError> {
    if raw < 0 {
        return Err(CodecError::Corrupt(format!(
            "negative {} count {}",
            what, raw
        )));
    }
    Ok(raw)
}

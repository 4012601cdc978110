//! Tests for the binary persistence codec: round-tripping, extension-block
//! tolerance, and structural failure modes.
mod common;
use common::*;
use kairo::codec;
use kairo::prelude::*;

fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_bool(buf: &mut Vec<u8>, v: bool) {
    buf.push(v as u8);
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    put_i32(buf, s.len() as i32);
    buf.extend_from_slice(s.as_bytes());
}

fn sample_graph(registry: &Registry) -> (Graph, NodeId, NodeId, NodeId) {
    let mut graph = Graph::new();
    let start = place(&mut graph, registry, "starter");
    let v = place(&mut graph, registry, "value");
    let show = place(&mut graph, registry, "show");
    {
        let node = graph.node_mut(start).unwrap();
        node.x = 10.0;
        node.y = -4.5;
        node.order = 2;
        node.tag = 77;
        node.color = 0x11223344;
        node.custom_editor = Some(CustomEditor {
            assembly: "HostEditors".to_string(),
            type_name: "HostEditors.StartPanel".to_string(),
        });
    }
    set_property(&mut graph, v, "in", Value::Number(42.0));
    set_property(&mut graph, v, "note", Value::Str("kept by the editor".to_string()));
    wire(&mut graph, start, Socket::EXIT, show, Socket::ENTER);
    wire(&mut graph, v, "out", show, "x");
    (graph, start, v, show)
}

fn connection_tuples(graph: &Graph) -> Vec<(String, String, String, String)> {
    let mut tuples: Vec<_> = graph
        .connections()
        .iter()
        .map(|c| {
            (
                c.output_node.to_string(),
                c.output_socket.clone(),
                c.input_node.to_string(),
                c.input_socket.clone(),
            )
        })
        .collect();
    tuples.sort();
    tuples
}

#[test]
fn graphs_round_trip_through_the_codec() {
    let registry = math_registry();
    let (graph, start, v, _show) = sample_graph(&registry);

    let bytes = codec::encode(&graph);
    let restored = codec::decode(&bytes, &registry).unwrap();

    assert_eq!(restored.nodes().len(), graph.nodes().len());
    assert_eq!(connection_tuples(&restored), connection_tuples(&graph));

    for original in graph.nodes() {
        let node = restored.node(original.id()).expect("node id preserved");
        assert_eq!(node.name, original.name);
        assert_eq!(node.x, original.x);
        assert_eq!(node.y, original.y);
        assert_eq!(node.callable, original.callable);
        assert_eq!(node.exec_init, original.exec_init);
        assert_eq!(node.order, original.order);
        assert_eq!(node.tag, original.tag);
        assert_eq!(node.color, original.color);
        assert_eq!(node.custom_editor, original.custom_editor);
        assert_eq!(node.operation().name(), original.operation().name());
    }

    let restored_start = restored.node(start).unwrap();
    assert_eq!(
        restored_start.custom_editor.as_ref().unwrap().type_name,
        "HostEditors.StartPanel"
    );
    let restored_v = restored.node(v).unwrap();
    assert_eq!(restored_v.properties.get("in"), Some(&Value::Number(42.0)));
    assert_eq!(
        restored_v.properties.get("note"),
        Some(&Value::Str("kept by the editor".to_string()))
    );
}

#[test]
fn execution_markers_are_restored_as_idle_defaults() {
    let mut registry = math_registry();
    registry.register(
        Operation::build("branching")
            .exec_init(true)
            .exec_output("alt")
            .run(|ctx| ctx.signal("alt")),
    );
    let mut graph = Graph::new();
    let node = graph.add_node(NodeInstance::new(
        registry.resolve("branching").cloned().unwrap(),
    ));
    set_property(
        &mut graph,
        node,
        "alt",
        Value::Exec(ExecutionPath::signaled()),
    );

    let restored = codec::decode(&codec::encode(&graph), &registry).unwrap();

    // The signal itself is transient, but the one-entry-per-parameter
    // invariant still holds after a reload.
    assert_eq!(
        restored.node(node).unwrap().properties.get("alt"),
        Some(&Value::Exec(ExecutionPath::idle()))
    );
}

#[test]
fn streams_with_unknown_extension_bytes_still_load() {
    let registry = math_registry();
    let guid_a = "6f9619ff-8b86-d011-b42d-00cf4fc964ff";
    let guid_b = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

    let mut bytes = Vec::new();
    put_str(&mut bytes, "NodeSystemP");
    put_i32(&mut bytes, 1001); // a newer writer's version
    put_i32(&mut bytes, 2);

    // Node record with a 12-byte extension block: tag, color, and four
    // bytes this reader does not understand.
    let mut node = |guid: &str, name: &str, operation: &str, callable: bool| {
        put_str(&mut bytes, guid);
        put_f32(&mut bytes, 1.5);
        put_f32(&mut bytes, 2.5);
        put_bool(&mut bytes, callable);
        put_bool(&mut bytes, false);
        put_str(&mut bytes, name);
        put_i32(&mut bytes, 0);
        put_str(&mut bytes, "");
        put_str(&mut bytes, "");
        put_str(&mut bytes, operation);
        put_i32(&mut bytes, 0); // empty property bag
        put_i32(&mut bytes, 12);
        put_i32(&mut bytes, 5); // tag
        put_i32(&mut bytes, -1); // color
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    };
    node(guid_a, "Value", "value", false);
    node(guid_b, "Show Value", "show", true);

    put_i32(&mut bytes, 1);
    put_str(&mut bytes, guid_a);
    put_str(&mut bytes, "out");
    put_str(&mut bytes, guid_b);
    put_str(&mut bytes, "x");
    put_i32(&mut bytes, 5); // unknown connection extension
    bytes.extend_from_slice(&[1, 2, 3, 4, 5]);

    put_i32(&mut bytes, 7); // unknown graph extension
    bytes.extend_from_slice(&[9; 7]);

    let graph = codec::decode(&bytes, &registry).unwrap();

    assert_eq!(graph.nodes().len(), 2);
    let a = graph.node(NodeId::parse(guid_a).unwrap()).unwrap();
    assert_eq!(a.name, "Value");
    assert_eq!(a.tag, 5);
    assert_eq!(a.color, -1);
    assert_eq!(a.x, 1.5);
    assert!(!a.callable);
    assert_eq!(graph.connections().len(), 1);
    assert_eq!(graph.connections()[0].output_socket, "out");
}

#[test]
fn short_node_extension_blocks_are_tolerated() {
    let registry = math_registry();
    let guid = "6f9619ff-8b86-d011-b42d-00cf4fc964ff";

    let mut bytes = Vec::new();
    put_str(&mut bytes, "NodeSystemP");
    put_i32(&mut bytes, 1000);
    put_i32(&mut bytes, 1);
    put_str(&mut bytes, guid);
    put_f32(&mut bytes, 0.0);
    put_f32(&mut bytes, 0.0);
    put_bool(&mut bytes, false);
    put_bool(&mut bytes, false);
    put_str(&mut bytes, "Value");
    put_i32(&mut bytes, 0);
    put_str(&mut bytes, "");
    put_str(&mut bytes, "");
    put_str(&mut bytes, "value");
    put_i32(&mut bytes, 0);
    put_i32(&mut bytes, 4); // tag only, no color
    put_i32(&mut bytes, 123);
    put_i32(&mut bytes, 0); // no connections
    put_i32(&mut bytes, 0); // no graph extension

    let graph = codec::decode(&bytes, &registry).unwrap();
    let node = graph.node(NodeId::parse(guid).unwrap()).unwrap();
    assert_eq!(node.tag, 123);
    assert_eq!(node.color, NodeInstance::DEFAULT_COLOR);
}

#[test]
fn a_bad_signature_aborts_the_load() {
    let registry = math_registry();
    let mut bytes = Vec::new();
    put_str(&mut bytes, "NodeSystemX");
    put_i32(&mut bytes, 1000);
    put_i32(&mut bytes, 0);

    assert!(matches!(
        codec::decode(&bytes, &registry),
        Err(CodecError::BadSignature { .. })
    ));
}

#[test]
fn truncated_streams_fail_with_corrupt_data() {
    let registry = math_registry();
    let (graph, ..) = sample_graph(&registry);
    let bytes = codec::encode(&graph);

    let cut = &bytes[..bytes.len() / 2];
    assert!(matches!(
        codec::decode(cut, &registry),
        Err(CodecError::Corrupt(_))
    ));
}

#[test]
fn unresolved_operations_fail_the_load() {
    let registry = math_registry();
    let (graph, ..) = sample_graph(&registry);
    let bytes = codec::encode(&graph);

    let empty = Registry::new();
    match codec::decode(&bytes, &empty) {
        Err(CodecError::UnresolvedOperation { operation, .. }) => {
            assert!(["starter", "value", "show"].contains(&operation.as_str()));
        }
        other => panic!("expected an unresolved operation error, got {:?}", other),
    }
}

#[test]
fn the_writer_emits_the_current_version() {
    let graph = Graph::new();
    let bytes = codec::encode(&graph);

    // Signature string: 4-byte length + 11 bytes of "NodeSystemP".
    assert_eq!(&bytes[4..15], b"NodeSystemP");
    let version = i32::from_le_bytes(bytes[15..19].try_into().unwrap());
    assert_eq!(version, codec::VERSION);
}

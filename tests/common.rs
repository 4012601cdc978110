//! Common test utilities: a sample operation registry and graph wiring
//! helpers.
use kairo::prelude::*;

fn arith(name: &str, title: &str, f: fn(f64, f64) -> f64) -> Operation {
    Operation::build(name)
        .title(title)
        .menu("Operators")
        .category("Basic")
        .description("Combines two input values.")
        .callable(false)
        .input("a", ValueType::Number)
        .input("b", ValueType::Number)
        .output("result", ValueType::Number)
        .run(move |ctx| {
            let result = f(ctx.number("a")?, ctx.number("b")?);
            ctx.set("result", Value::Number(result))
        })
}

/// A small arithmetic operation library: a pure value source, the four
/// basic operators, a callable sink, and an execution starter.
#[allow(dead_code)]
pub fn math_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(
        Operation::build("starter")
            .title("Starter")
            .menu("Helper")
            .category("Basic")
            .description("Starts execution.")
            .exec_init(true)
            .run(|_ctx| Ok(())),
    );
    registry.register(
        Operation::build("value")
            .title("Value")
            .menu("Input")
            .category("Basic")
            .description("Outputs a simple value.")
            .callable(false)
            .input("in", ValueType::Number)
            .output("out", ValueType::Number)
            .run(|ctx| {
                let v = ctx.number("in")?;
                ctx.set("out", Value::Number(v))
            }),
    );
    registry.register(arith("add", "Add", |a, b| a + b));
    registry.register(arith("subtract", "Subtract", |a, b| a - b));
    registry.register(arith("multiply", "Multiply", |a, b| a * b));
    registry.register(arith("divide", "Divide", |a, b| a / b));
    registry.register(
        Operation::build("show")
            .title("Show Value")
            .menu("Helper")
            .category("Basic")
            .description("Consumes a value during an execution pass.")
            .input("x", ValueType::Number)
            .run(|_ctx| Ok(())),
    );
    registry
}

/// Places a fresh instance of a registered operation into the graph.
#[allow(dead_code)]
pub fn place(graph: &mut Graph, registry: &Registry, operation: &str) -> NodeId {
    let operation = registry
        .resolve(operation)
        .cloned()
        .expect("operation is registered");
    graph.add_node(NodeInstance::new(operation))
}

/// Connects an output socket to an input socket.
#[allow(dead_code)]
pub fn wire(
    graph: &mut Graph,
    from: NodeId,
    output: &str,
    to: NodeId,
    input: &str,
) -> Option<Connection> {
    graph.connect(Connection::new(from, output, to, input))
}

/// Sets a property bag entry on a node.
#[allow(dead_code)]
pub fn set_property(graph: &mut Graph, node: NodeId, key: &str, value: Value) {
    graph
        .node_mut(node)
        .expect("node exists")
        .properties
        .set(key, value);
}

/// Reads a property bag entry off a node.
#[allow(dead_code)]
pub fn property(graph: &Graph, node: NodeId, key: &str) -> Option<Value> {
    graph
        .node(node)
        .expect("node exists")
        .properties
        .get(key)
        .cloned()
}

use crate::engine::Severity;
use crate::properties::PropertyBag;
use crate::registry::{Direction, Operation};
use crate::value::ValueType;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Process-unique, stable node identifier. Assigned once at creation, never
/// reused, and preserved across serialization as the node's guid string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(uuid::Uuid);

impl NodeId {
    pub(crate) fn fresh() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(uuid::Uuid::parse_str(s)?))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A named, typed, directional attachment point on a node instance.
///
/// Sockets are never persisted; they are derived from the bound operation's
/// parameter list and the instance's `callable` flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Socket {
    pub name: String,
    pub value_type: ValueType,
    pub direction: Direction,
    /// Marks the implicit Enter/Exit execution sockets; the engine falls
    /// back to the main Exit connection when no branch is signaled.
    pub main_execution: bool,
}

impl Socket {
    /// Name of the implicit execution input socket on callable nodes.
    pub const ENTER: &'static str = "Enter";
    /// Name of the implicit main execution output socket on callable nodes.
    pub const EXIT: &'static str = "Exit";

    pub fn is_execution(&self) -> bool {
        self.value_type == ValueType::Execution
    }

    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }
}

/// Identity of a host-side custom editor control embedded in a node,
/// persisted opaquely so a reload can reconstruct it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEditor {
    pub assembly: String,
    pub type_name: String,
}

/// A placed, stateful instance of an operation within a graph.
pub struct NodeInstance {
    id: NodeId,
    operation: Arc<Operation>,
    /// Display name, used by `execute_resolving` lookups.
    pub name: String,
    pub x: f32,
    pub y: f32,
    /// Whether this instance participates in control flow. Copied from the
    /// operation at creation, persisted, and editable afterwards; callers
    /// that change it must call [`invalidate_sockets`](Self::invalidate_sockets).
    pub callable: bool,
    /// Whether this instance is a valid default execution start point.
    pub exec_init: bool,
    /// Display priority, lower first. Meaningful only to the host UI but
    /// part of persisted state.
    pub order: i32,
    /// Free-use tag, round-tripped through the node extension block.
    pub tag: i32,
    /// ARGB color, round-tripped through the node extension block.
    pub color: i32,
    pub custom_editor: Option<CustomEditor>,
    pub properties: PropertyBag,
    /// Last feedback severity the engine observed for this node. Transient,
    /// reset each time the node is dequeued for execution.
    pub feedback: Severity,
    /// Set when the node was re-entered via the return-address stack rather
    /// than a forward edge. Transient.
    pub back_executed: bool,
    sockets: RefCell<Option<Rc<[Socket]>>>,
}

impl NodeInstance {
    /// Default ARGB node color, matching the light-cyan of fresh nodes.
    pub const DEFAULT_COLOR: i32 = 0xFFE0_FFFFu32 as i32;

    /// Places a fresh instance of `operation`: assigns a new id, copies the
    /// structural flags, and default-fills the property bag with one entry
    /// per declared parameter.
    pub fn new(operation: Arc<Operation>) -> Self {
        let mut node = Self {
            id: NodeId::fresh(),
            name: operation.title.clone(),
            x: 0.0,
            y: 0.0,
            callable: operation.callable,
            exec_init: operation.exec_init,
            order: 0,
            tag: 0,
            color: Self::DEFAULT_COLOR,
            custom_editor: None,
            properties: PropertyBag::new(),
            feedback: Severity::Debug,
            back_executed: false,
            sockets: RefCell::new(None),
            operation,
        };
        node.fill_parameter_defaults();
        node
    }

    /// Rebuilds an instance from persisted state. The bag is taken as
    /// decoded from the stream; parameters it does not cover (execution
    /// markers are never persisted) are re-filled with their defaults so the
    /// one-entry-per-parameter invariant holds after load.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        operation: Arc<Operation>,
        id: NodeId,
        name: String,
        x: f32,
        y: f32,
        callable: bool,
        exec_init: bool,
        order: i32,
        custom_editor: Option<CustomEditor>,
        properties: PropertyBag,
        tag: i32,
        color: i32,
    ) -> Self {
        let mut node = Self {
            id,
            name,
            x,
            y,
            callable,
            exec_init,
            order,
            tag,
            color,
            custom_editor,
            properties,
            feedback: Severity::Debug,
            back_executed: false,
            sockets: RefCell::new(None),
            operation,
        };
        node.fill_parameter_defaults();
        node
    }

    fn fill_parameter_defaults(&mut self) {
        for param in self.operation.params() {
            if !self.properties.contains_key(&param.name) {
                self.properties.set(&param.name, param.initial_value());
            }
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn operation(&self) -> &Arc<Operation> {
        &self.operation
    }

    /// The sockets of this node, derived from the operation's parameters and
    /// the `callable` flag. Cached until [`invalidate_sockets`](Self::invalidate_sockets).
    pub fn sockets(&self) -> Rc<[Socket]> {
        if let Some(cached) = self.sockets.borrow().as_ref() {
            return Rc::clone(cached);
        }
        let derived: Rc<[Socket]> = self.derive_sockets().into();
        *self.sockets.borrow_mut() = Some(Rc::clone(&derived));
        derived
    }

    /// Discards the socket cache. Must be called after any structural change
    /// that affects derivation (the `callable` flag, the bound editor).
    pub fn invalidate_sockets(&self) {
        *self.sockets.borrow_mut() = None;
    }

    pub fn socket(&self, name: &str) -> Option<Socket> {
        self.sockets().iter().find(|s| s.name == name).cloned()
    }

    fn derive_sockets(&self) -> Vec<Socket> {
        let mut sockets = Vec::new();
        if self.callable {
            if !self.exec_init {
                sockets.push(Socket {
                    name: Socket::ENTER.to_string(),
                    value_type: ValueType::Execution,
                    direction: Direction::Input,
                    main_execution: true,
                });
            }
            sockets.push(Socket {
                name: Socket::EXIT.to_string(),
                value_type: ValueType::Execution,
                direction: Direction::Output,
                main_execution: true,
            });
        }
        for param in self.operation.inputs() {
            sockets.push(Socket {
                name: param.name.clone(),
                value_type: param.value_type,
                direction: Direction::Input,
                main_execution: false,
            });
        }
        for param in self.operation.outputs() {
            sockets.push(Socket {
                name: param.name.clone(),
                value_type: param.value_type,
                direction: Direction::Output,
                main_execution: false,
            });
        }
        sockets
    }
}

impl fmt::Debug for NodeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("operation", &self.operation.name())
            .field("callable", &self.callable)
            .field("exec_init", &self.exec_init)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

//! The operation registry.
//!
//! Hosts expose their callable functionality by registering [`Operation`]s
//! at startup: each one names an entry point, declares an ordered parameter
//! list, and carries the menu metadata graph-construction tooling needs.
//! Node instances reference operations by name, and persisted graphs re-bind
//! against the registry when loaded.

use crate::error::InvokeError;
use crate::value::{Value, ValueType};
use ahash::AHashMap;
use itertools::Itertools;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

mod call;

pub use call::CallContext;

/// Whether a parameter feeds a node (input socket) or is produced by it
/// (output socket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Input,
    Output,
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: String,
    pub direction: Direction,
    pub value_type: ValueType,
    /// Initial property bag value for fresh node instances. `None` falls
    /// back to the zero value of `value_type`.
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn initial_value(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| Value::default_for(self.value_type))
    }
}

/// The entry point signature every operation implements.
pub type OperationFn = dyn Fn(&mut CallContext<'_>) -> Result<(), InvokeError> + Send + Sync;

/// A host-supplied named function exposed as a node template.
pub struct Operation {
    name: String,
    pub title: String,
    pub menu: String,
    pub category: String,
    pub description: String,
    /// Callable operations participate in control flow and get Enter/Exit
    /// execution sockets on their node instances.
    pub callable: bool,
    /// Marks a valid default start point for `execute`.
    pub exec_init: bool,
    params: Vec<ParamSpec>,
    invoke: Box<OperationFn>,
}

impl Operation {
    /// Starts building an operation. `name` is the registry identity used to
    /// re-bind persisted nodes and must be unique within a registry.
    pub fn build(name: impl Into<String>) -> OperationBuilder {
        OperationBuilder::new(name.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters, in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params
            .iter()
            .filter(|p| p.direction == Direction::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params
            .iter()
            .filter(|p| p.direction == Direction::Output)
    }

    /// Full menu path for context-menu tooling, `"Menu/Title"`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.menu, self.title)
    }

    pub(crate) fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), InvokeError> {
        (self.invoke)(ctx)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("callable", &self.callable)
            .field("exec_init", &self.exec_init)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Operation`], mirroring how hosts annotate their functions.
pub struct OperationBuilder {
    name: String,
    title: Option<String>,
    menu: String,
    category: String,
    description: String,
    callable: bool,
    exec_init: bool,
    params: Vec<ParamSpec>,
}

impl OperationBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            title: None,
            menu: String::new(),
            category: "General".to_string(),
            description: String::new(),
            callable: true,
            exec_init: false,
            params: Vec::new(),
        }
    }

    /// Display caption; defaults to the registry name.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn menu(mut self, menu: impl Into<String>) -> Self {
        self.menu = menu.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn callable(mut self, callable: bool) -> Self {
        self.callable = callable;
        self
    }

    pub fn exec_init(mut self, exec_init: bool) -> Self {
        self.exec_init = exec_init;
        self
    }

    pub fn input(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            direction: Direction::Input,
            value_type,
            default: None,
        });
        self
    }

    pub fn input_with_default(
        mut self,
        name: impl Into<String>,
        value_type: ValueType,
        default: Value,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            direction: Direction::Input,
            value_type,
            default: Some(default),
        });
        self
    }

    pub fn output(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            direction: Direction::Output,
            value_type,
            default: None,
        });
        self
    }

    /// Declares a named execution output in addition to the implicit main
    /// Exit socket. Branching operations signal one of these to divert the
    /// control-flow walk.
    pub fn exec_output(self, name: impl Into<String>) -> Self {
        self.output(name, ValueType::Execution)
    }

    /// Finalizes the operation with its entry point.
    pub fn run<F>(self, entry: F) -> Operation
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        Operation {
            title: self.title.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            menu: self.menu,
            category: self.category,
            description: self.description,
            callable: self.callable,
            exec_init: self.exec_init,
            params: self.params,
            invoke: Box::new(entry),
        }
    }
}

/// Serializable metadata view of an operation, for tooling that builds node
/// palettes and context menus.
#[derive(Debug, Clone, Serialize)]
pub struct OperationInfo {
    pub name: String,
    pub title: String,
    pub menu: String,
    pub category: String,
    pub description: String,
    pub path: String,
    pub callable: bool,
    pub exec_init: bool,
    pub params: Vec<ParamSpec>,
}

impl From<&Operation> for OperationInfo {
    fn from(op: &Operation) -> Self {
        Self {
            name: op.name.clone(),
            title: op.title.clone(),
            menu: op.menu.clone(),
            category: op.category.clone(),
            description: op.description.clone(),
            path: op.path(),
            callable: op.callable,
            exec_init: op.exec_init,
            params: op.params.clone(),
        }
    }
}

/// The set of operations a host has exposed.
#[derive(Debug, Default)]
pub struct Registry {
    operations: AHashMap<String, Arc<Operation>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an operation, replacing any previous registration under the
    /// same name.
    pub fn register(&mut self, operation: Operation) -> Arc<Operation> {
        let operation = Arc::new(operation);
        self.operations
            .insert(operation.name.clone(), Arc::clone(&operation));
        operation
    }

    /// Looks an operation up by registry name.
    pub fn resolve(&self, name: &str) -> Option<&Arc<Operation>> {
        self.operations.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Operation>> {
        self.operations.values()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Metadata for every registered operation, sorted by menu path for
    /// stable palette construction.
    pub fn infos(&self) -> Vec<OperationInfo> {
        self.operations
            .values()
            .map(|op| OperationInfo::from(op.as_ref()))
            .sorted_by(|a, b| a.path.cmp(&b.path))
            .collect()
    }
}

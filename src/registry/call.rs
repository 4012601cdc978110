//! The argument view an operation entry point works against.

use crate::engine::{Feedback, Severity};
use crate::error::InvokeError;
use crate::graph::NodeId;
use crate::registry::{Direction, ParamSpec};
use crate::value::{ExecutionPath, Value, ValueType};

/// One invocation's bound arguments, in operation-declared order, plus the
/// feedback channel back to the engine.
///
/// Inputs are read with the typed accessors; outputs are written with
/// [`set`](CallContext::set) or the execution-signal helpers. Values written
/// to output parameters are copied back into the node's property bag by the
/// engine after the call returns.
pub struct CallContext<'a> {
    node: NodeId,
    params: &'a [ParamSpec],
    values: &'a mut [Value],
    feedback: &'a mut Vec<Feedback>,
}

impl<'a> CallContext<'a> {
    pub(crate) fn new(
        node: NodeId,
        params: &'a [ParamSpec],
        values: &'a mut [Value],
        feedback: &'a mut Vec<Feedback>,
    ) -> Self {
        debug_assert_eq!(params.len(), values.len());
        Self {
            node,
            params,
            values,
            feedback,
        }
    }

    /// The node instance being executed.
    pub fn node(&self) -> NodeId {
        self.node
    }

    fn position(&self, name: &str) -> Result<usize, InvokeError> {
        self.params
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| InvokeError::UnknownParameter(name.to_string()))
    }

    /// The raw value bound to a parameter.
    pub fn value(&self, name: &str) -> Result<&Value, InvokeError> {
        Ok(&self.values[self.position(name)?])
    }

    pub fn number(&self, name: &str) -> Result<f64, InvokeError> {
        match self.value(name)? {
            Value::Number(n) => Ok(*n),
            other => Err(self.mismatch(name, ValueType::Number, other)),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool, InvokeError> {
        match self.value(name)? {
            Value::Bool(b) => Ok(*b),
            other => Err(self.mismatch(name, ValueType::Bool, other)),
        }
    }

    pub fn string(&self, name: &str) -> Result<&str, InvokeError> {
        match self.value(name)? {
            Value::Str(s) => Ok(s.as_str()),
            other => Err(self.mismatch(name, ValueType::Str, other)),
        }
    }

    pub fn blob(&self, name: &str) -> Result<&[u8], InvokeError> {
        match self.value(name)? {
            Value::Blob(data) => Ok(data.as_slice()),
            other => Err(self.mismatch(name, ValueType::Blob, other)),
        }
    }

    fn mismatch(&self, name: &str, expected: ValueType, found: &Value) -> InvokeError {
        InvokeError::TypeMismatch {
            parameter: name.to_string(),
            expected,
            found: found.clone(),
        }
    }

    /// Writes an output parameter. Input parameters are rejected; the engine
    /// only copies output positions back into the property bag.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), InvokeError> {
        let position = self.position(name)?;
        if self.params[position].direction != Direction::Output {
            return Err(InvokeError::NotAnOutput(name.to_string()));
        }
        self.values[position] = value;
        Ok(())
    }

    /// Marks a named execution output as the branch to take.
    pub fn signal(&mut self, name: &str) -> Result<(), InvokeError> {
        self.set(name, Value::Exec(ExecutionPath::signaled()))
    }

    /// Clears the branch marker on a named execution output. Signals persist
    /// in the property bag across invocations, so a branch that should fire
    /// once must clear itself on subsequent calls.
    pub fn clear_signal(&mut self, name: &str) -> Result<(), InvokeError> {
        self.set(name, Value::Exec(ExecutionPath::idle()))
    }

    /// Reports in-band feedback to the host. Informational feedback does not
    /// affect control flow.
    pub fn report(&mut self, severity: Severity, message: impl Into<String>) {
        self.feedback.push(Feedback {
            message: message.into(),
            node: self.node,
            severity,
            tag: None,
            breaking: false,
        });
    }

    /// Reports feedback that halts the execution loop. This is the
    /// cooperative way to stop a run on a recoverable, in-band error,
    /// as opposed to returning an `InvokeError`.
    pub fn report_breaking(&mut self, severity: Severity, message: impl Into<String>) {
        self.feedback.push(Feedback {
            message: message.into(),
            node: self.node,
            severity,
            tag: None,
            breaking: true,
        });
    }

    /// Full-control feedback reporting, including the free-use tag.
    pub fn report_feedback(&mut self, feedback: Feedback) {
        self.feedback.push(feedback);
    }
}

//! Runtime values carried by sockets and stored in node property bags.

use crate::codec::wire::{ByteReader, ByteWriter};
use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The type tags a registered operation can declare for its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Number,
    Bool,
    Str,
    Blob,
    /// The distinguished control-flow type. Sockets of this type carry
    /// execution edges rather than data edges.
    Execution,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Number => "Number",
            ValueType::Bool => "Bool",
            ValueType::Str => "Str",
            ValueType::Blob => "Blob",
            ValueType::Execution => "Execution",
        };
        write!(f, "{}", name)
    }
}

/// The control-flow marker carried by execution-type sockets.
///
/// An operation drives a branch by marking the execution value on one of its
/// execution outputs as signaled; the engine follows the first signaled,
/// non-main execution connection it finds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPath {
    pub signaled: bool,
}

impl ExecutionPath {
    pub fn signaled() -> Self {
        Self { signaled: true }
    }

    pub fn idle() -> Self {
        Self { signaled: false }
    }
}

/// A dynamically typed value stored under a property bag key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(String),
    Blob(Vec<u8>),
    Exec(ExecutionPath),
    Null,
}

// Wire tags of the generic value codec. `Exec` has no tag: execution markers
// are transient engine state and never serialized.
const TAG_NULL: u8 = 0;
const TAG_NUMBER: u8 = 1;
const TAG_BOOL: u8 = 2;
const TAG_STR: u8 = 3;
const TAG_BLOB: u8 = 4;

impl Value {
    /// The zero value of a declared parameter type.
    pub fn default_for(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Number => Value::Number(0.0),
            ValueType::Bool => Value::Bool(false),
            ValueType::Str => Value::Str(String::new()),
            ValueType::Blob => Value::Blob(Vec::new()),
            ValueType::Execution => Value::Exec(ExecutionPath::idle()),
        }
    }

    /// The type tag of this value, or `None` for `Null`.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Number(_) => Some(ValueType::Number),
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Str(_) => Some(ValueType::Str),
            Value::Blob(_) => Some(ValueType::Blob),
            Value::Exec(_) => Some(ValueType::Execution),
            Value::Null => None,
        }
    }

    /// Whether this value participates in persistence. Execution markers are
    /// skipped silently by the property bag codec.
    pub fn is_serializable(&self) -> bool {
        !matches!(self, Value::Exec(_))
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) {
        match self {
            Value::Null => w.u8(TAG_NULL),
            Value::Number(n) => {
                w.u8(TAG_NUMBER);
                w.f64(*n);
            }
            Value::Bool(b) => {
                w.u8(TAG_BOOL);
                w.bool(*b);
            }
            Value::Str(s) => {
                w.u8(TAG_STR);
                w.string(s);
            }
            Value::Blob(data) => {
                w.u8(TAG_BLOB);
                w.i32(data.len() as i32);
                w.raw(data);
            }
            // Not serializable; callers filter these out before encoding.
            Value::Exec(_) => unreachable!("execution markers are never encoded"),
        }
    }

    pub(crate) fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        match r.u8()? {
            TAG_NULL => Ok(Value::Null),
            TAG_NUMBER => Ok(Value::Number(r.f64()?)),
            TAG_BOOL => Ok(Value::Bool(r.bool()?)),
            TAG_STR => Ok(Value::Str(r.string()?)),
            TAG_BLOB => {
                let len = r.i32()?;
                if len < 0 {
                    return Err(CodecError::Corrupt(format!("negative blob length {}", len)));
                }
                Ok(Value::Blob(r.take(len as usize)?.to_vec()))
            }
            tag => Err(CodecError::Corrupt(format!("unknown value tag {}", tag))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Blob(data) => write!(f, "<{} bytes>", data.len()),
            Value::Exec(path) => {
                write!(f, "{}", if path.signaled { "signaled" } else { "idle" })
            }
            Value::Null => write!(f, "null"),
        }
    }
}

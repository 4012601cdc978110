use crate::graph::NodeId;
use serde::Serialize;
use std::fmt;

/// Severity of an in-band feedback report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    #[default]
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// An in-band report raised by an operation during invocation.
///
/// Feedback is the cooperative alternative to failing the call: it reaches
/// the host through the sink the executor was built with, and only a report
/// with `breaking` set halts the execution loop.
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub message: String,
    pub node: NodeId,
    pub severity: Severity,
    /// Free-use tag for host-side routing.
    pub tag: Option<i32>,
    /// Halts the execution loop when set.
    pub breaking: bool,
}

/// Receives feedback reports as the engine drains them after each
/// invocation. Implemented for any `FnMut(Feedback)` closure.
pub trait FeedbackSink {
    fn report(&mut self, feedback: Feedback);
}

impl<F: FnMut(Feedback)> FeedbackSink for F {
    fn report(&mut self, feedback: Feedback) {
        self(feedback)
    }
}

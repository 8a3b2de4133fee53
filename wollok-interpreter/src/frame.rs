use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::error::{Result, RuntimeError};
use crate::instance::InstanceId;

/// A named non-local exit kind.
///
/// The set is closed: an interruption unwinds the frame stack until a
/// frame declares it can resume that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interruption {
    /// An early exit from the current method.
    Return,
    /// A thrown exception looking for a handler.
    Exception,
}

impl fmt::Display for Interruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Return => f.write_str("return"),
            Self::Exception => f.write_str("exception"),
        }
    }
}

/// One activation record of the evaluator.
///
/// Executor state (instruction pointer, pending sentences) lives with
/// the dispatcher that consumes frames, not here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    /// The local bindings within this frame.
    pub locals: IndexMap<String, InstanceId>,
    /// The operand stack of instance ids.
    pub operand_stack: Vec<InstanceId>,
    /// The interruption kinds this frame can resume from.
    pub resume: IndexSet<Interruption>,
}

impl Frame {
    /// Construct a new empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a frame that resumes from the given interruptions.
    pub fn resuming(interruptions: impl IntoIterator<Item = Interruption>) -> Self {
        Self {
            resume: interruptions.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Push an operand on top of the stack.
    pub fn push_operand(&mut self, operand: InstanceId) {
        self.operand_stack.push(operand);
    }

    /// Remove and return the top of the operand stack.
    ///
    /// Underflow is a fatal error, not a recoverable condition.
    pub fn pop_operand(&mut self) -> Result<InstanceId> {
        self.operand_stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// Search for a local binding.
    pub fn lookup_local(&self, name: impl AsRef<str>) -> Option<InstanceId> {
        self.locals.get(name.as_ref()).cloned()
    }

    /// Assign to a local binding.
    pub fn assign_local(&mut self, name: impl AsRef<str>, value: InstanceId) -> Option<()> {
        *self.locals.get_mut(name.as_ref())? = value;
        Some(())
    }
}

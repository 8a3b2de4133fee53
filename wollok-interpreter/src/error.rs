use thiserror::Error;

use wollok_core::error::ModelError;

use crate::frame::Interruption;
use crate::instance::InstanceId;

/// An error raised by the runtime.
///
/// All errors are fatal to the operation that raised them and surface
/// synchronously; recovery (such as restoring an earlier evaluation
/// snapshot) is the caller's decision.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// An instance lookup by id found no entry in the heap.
    #[error("access to undefined instance '{id}'")]
    UndefinedInstance { id: InstanceId },

    /// A pop from an empty operand stack.
    #[error("popped empty operand stack")]
    StackUnderflow,

    /// The frame stack was exhausted during an interruption unwind
    /// without finding a handler.
    #[error("unhandled {interruption} interruption: {detail}")]
    UnhandledInterruption {
        interruption: Interruption,
        detail: String,
    },

    /// A model or resolution failure reached through a runtime entry
    /// point.
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

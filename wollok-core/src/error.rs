use thiserror::Error;

use crate::ast::NodeId;

/// An error raised by the model or the resolver.
///
/// All errors are fatal to the operation that raised them and surface
/// synchronously; none are retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// An id lookup against the environment found no node.
    #[error("missing node: no node has id {id}")]
    MissingNode { id: NodeId },

    /// An FQN or QN traversal found no matching child for a segment.
    #[error("could not resolve reference '{name}'")]
    UnresolvedReference { name: String },

    /// A parent query on a node not reachable from the environment root.
    #[error("node {id} is not in the environment")]
    Orphan { id: NodeId },
}

pub type Result<T> = std::result::Result<T, ModelError>;

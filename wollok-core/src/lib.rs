//!
//! This is the core object model for the Wollok interpreter.
//!
//! It defines the staged abstract syntax tree (raw, filled and linked
//! refinements over one tree shape), the tree algorithms, the linked
//! environment index and the name resolution machinery built on it.
//!

use std::rc::Rc;

/// The staged node model: stages, kinds and per-kind attributes.
pub mod ast;
/// Memoising tables with a compute-on-miss contract.
pub mod cache;
/// The error taxonomy for the model and resolver.
pub mod error;
/// The linked environment and its lazy indices.
pub mod environment;
/// Hierarchy linearisation and method/constructor lookup.
pub mod hierarchy;
/// Fully qualified names and reference targeting.
pub mod resolve;
/// Children enumeration, traversal, transform and fold.
pub mod tree;
/// Small collection helpers shared across the model.
pub mod utils;

/// A shared handle to a node of the (immutable) tree.
pub type NodeRef<S> = Rc<ast::Node<S>>;

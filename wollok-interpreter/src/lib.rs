//!
//! This is the runtime state for the Wollok interpreter.
//!
//! It holds the evaluation (a frame stack plus an instance heap),
//! creates runtime instances with interned identities for primitive
//! values, and unwinds the frame stack on interruptions.
//!

use std::cell::RefCell;
use std::rc::Rc;

/// The error taxonomy for the runtime.
pub mod error;
/// The interpreter's main data structure.
pub mod evaluation;
/// Facilities for manipulating stack frames.
pub mod frame;
/// Facilities for manipulating runtime instances.
pub mod instance;

/// A strong and owning reference to a shared mutable value.
pub type WollokRef<T> = Rc<RefCell<T>>;

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use crate::WollokRef;

/// The prefix of interned number instance ids.
const NUMBER_PREFIX: &str = "N!";
/// The prefix of interned string instance ids.
const STRING_PREFIX: &str = "S!";
/// The prefix of freshly minted instance ids.
const OBJECT_PREFIX: &str = "O!";

static NEXT_FRESH_ID: AtomicU64 = AtomicU64::new(0);

/// The identity of a runtime instance.
///
/// Interned primitives derive their id from their value, so that two
/// structurally equal primitives share one instance; every other
/// instance gets a freshly minted id that cannot collide with the
/// interning prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceId(Rc<str>);

impl InstanceId {
    /// Mint a fresh id, unique across the process.
    pub fn fresh() -> Self {
        let count = NEXT_FRESH_ID.fetch_add(1, Ordering::Relaxed);
        Self(format!("{OBJECT_PREFIX}{count}").into())
    }

    /// The interned id of a number, from its canonical rendering.
    pub fn interned_number(rendered: &str) -> Self {
        Self(format!("{NUMBER_PREFIX}{rendered}").into())
    }

    /// The interned id of a string.
    pub fn interned_string(value: &str) -> Self {
        Self(format!("{STRING_PREFIX}{value}").into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The primitive payload a runtime instance may carry.
///
/// Snapshots copy the payload by reference: numbers and strings are
/// immutable, and list cells are treated as opaque shared state under
/// the caller's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub enum InnerValue {
    Number(f64),
    String(Rc<str>),
    List(WollokRef<Vec<InstanceId>>),
}

impl fmt::Display for InnerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value),
            Self::String(value) => f.write_str(value),
            Self::List(values) => {
                let rendered: Vec<String> = values
                    .borrow()
                    .iter()
                    .map(|id| id.as_str().to_owned())
                    .collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

/// A runtime object held in the evaluation's instance heap.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// The instance's identity; equals its key in the heap.
    pub id: InstanceId,
    /// The fully qualified name of the instance's module.
    pub module: String,
    /// The instance's fields, each holding another instance's id.
    pub fields: IndexMap<String, InstanceId>,
    /// The primitive payload, for instances of primitive modules.
    pub inner_value: Option<InnerValue>,
}

impl Instance {
    /// Search for a field binding.
    pub fn lookup_field(&self, name: impl AsRef<str>) -> Option<InstanceId> {
        self.fields.get(name.as_ref()).cloned()
    }

    /// Bind a field to another instance.
    pub fn set_field(&mut self, name: impl Into<String>, value: InstanceId) {
        self.fields.insert(name.into(), value);
    }
}

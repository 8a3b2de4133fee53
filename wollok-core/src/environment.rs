use std::iter;
use std::rc::Rc;

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use tracing::{debug, trace};

use crate::ast::{Kind, KindLike, Linked, Node, NodeId};
use crate::cache::Cache;
use crate::error::{ModelError, Result};
use crate::utils::divide_on;
use crate::NodeRef;

/// The indexed root of a linked tree.
///
/// It owns the tree and the lazy indices over it: node lookup by id,
/// node lookup by fully qualified name, and the derived parent
/// relation. The tree is immutable once linked, so index entries are
/// monotonic and handles can be shared freely.
pub struct Environment {
    root: NodeRef<Linked>,
    nodes: OnceCell<IndexMap<NodeId, NodeRef<Linked>>>,
    parents: Cache<NodeId, NodeId>,
    fqns: Cache<String, NodeId>,
}

impl Environment {
    /// Index a fully linked tree.
    ///
    /// The root must be an environment node with ids assigned to
    /// every node and scopes populated on every reference.
    pub fn new(root: Node<Linked>) -> Self {
        debug_assert!(root.is(Kind::Environment));
        debug!(packages = root.members().len(), "environment indexed");
        Self {
            root: Rc::new(root),
            nodes: OnceCell::new(),
            parents: Cache::new(),
            fqns: Cache::new(),
        }
    }

    /// The environment's root node.
    pub fn root(&self) -> &NodeRef<Linked> {
        &self.root
    }

    /// The top-level packages.
    pub fn members(&self) -> &[NodeRef<Linked>] {
        self.root.members()
    }

    fn nodes(&self) -> &IndexMap<NodeId, NodeRef<Linked>> {
        self.nodes.get_or_init(|| {
            iter::once(self.root.clone())
                .chain(self.root.descendants())
                .map(|node| (node.id(), node))
                .collect()
        })
    }

    /// Get the unique node with the given id.
    pub fn get_node_by_id(&self, id: NodeId) -> Result<NodeRef<Linked>> {
        self.nodes()
            .get(&id)
            .cloned()
            .ok_or(ModelError::MissingNode { id })
    }

    /// Get the node with the given fully qualified name.
    pub fn get_node_by_fqn(&self, fqn: &str) -> Result<NodeRef<Linked>> {
        let id = self.fqns.get_or_update(fqn.to_owned(), || {
            let (head, tail) = divide_on('.', fqn);
            let package = self
                .members()
                .iter()
                .find(|package| package.name() == Some(head))
                .ok_or_else(|| ModelError::UnresolvedReference {
                    name: fqn.to_owned(),
                })?;
            match tail {
                None => Ok(package.id()),
                Some(tail) => Ok(package.get_node_by_qn(self, tail)?.id()),
            }
        })?;
        self.get_node_by_id(id)
    }

    /// Get the parent of the node with the given id.
    ///
    /// The parent relation is derived, not stored: on a cache miss the
    /// tree is scanned from the root for the unique node whose
    /// children contain the queried one.
    pub fn parent_of(&self, id: NodeId) -> Result<NodeRef<Linked>> {
        let parent_id = self.parents.get_or_update(id, || {
            trace!(%id, "parent cache miss, scanning from root");
            iter::once(self.root.clone())
                .chain(self.root.descendants())
                .find(|node| node.children().iter().any(|child| child.id() == id))
                .map(|node| node.id())
                .ok_or(ModelError::Orphan { id })
        })?;
        self.get_node_by_id(parent_id)
    }
}

impl Node<Linked> {
    /// The unique node whose children contain this one.
    ///
    /// Fails for the environment root and for nodes not reachable
    /// from it.
    pub fn parent(&self, environment: &Environment) -> Result<NodeRef<Linked>> {
        environment.parent_of(self.id())
    }

    /// The nearest ancestor of the given kind or category, if any.
    pub fn closest_ancestor(
        &self,
        environment: &Environment,
        what: impl Into<KindLike>,
    ) -> Option<NodeRef<Linked>> {
        let what = what.into();
        let mut current = self.parent(environment).ok()?;
        loop {
            if current.is(what) {
                return Some(current);
            }
            current = current.parent(environment).ok()?;
        }
    }
}

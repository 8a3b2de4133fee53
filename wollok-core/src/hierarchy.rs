use indexmap::IndexSet;
use tracing::trace;

use crate::ast::{Kind, Linked, Node, NodeId, Stage};
use crate::environment::Environment;
use crate::error::{ModelError, Result};
use crate::NodeRef;

impl Node<Linked> {
    /// The superclass reference of this module, if it has one.
    pub fn superclass_reference(&self) -> Option<&NodeRef<Linked>> {
        match self {
            Self::Class(class) => class.superclass.as_ref(),
            Self::Singleton(singleton) => Some(&singleton.super_call.superclass),
            _ => None,
        }
    }

    /// The linearised ancestry of this module.
    ///
    /// Starts with the module itself, then inlines each mixin with
    /// its own ancestors in declared order, then the superclass
    /// chain. Every module appears exactly once, and the walk
    /// terminates on arbitrary inputs because visited ids are never
    /// re-entered.
    pub fn hierarchy(&self, environment: &Environment) -> Result<Vec<NodeRef<Linked>>> {
        let mut modules = Vec::new();
        let mut excluded = IndexSet::new();
        self.hierarchy_into(environment, &mut modules, &mut excluded)?;
        Ok(modules)
    }

    fn hierarchy_into(
        &self,
        environment: &Environment,
        modules: &mut Vec<NodeRef<Linked>>,
        excluded: &mut IndexSet<NodeId>,
    ) -> Result<()> {
        if !excluded.insert(self.id()) {
            return Ok(());
        }
        modules.push(environment.get_node_by_id(self.id())?);

        let mut parents = Vec::new();
        for mixin in self.mixins() {
            parents.push(resolve_module(mixin, environment)?);
        }
        // Mixins have no superclass of their own.
        if !self.is(Kind::Mixin) {
            if let Some(superclass) = self.superclass_reference() {
                parents.push(resolve_module(superclass, environment)?);
            }
        }

        for parent in parents {
            parent.hierarchy_into(environment, modules, excluded)?;
        }
        Ok(())
    }

    /// Whether the other module appears in this module's ancestry.
    pub fn inherits(&self, environment: &Environment, other: &Node<Linked>) -> Result<bool> {
        let other_id = other.id();
        Ok(self
            .hierarchy(environment)?
            .iter()
            .any(|module| module.id() == other_id))
    }

    /// Search the ancestry for the first concrete method accepting
    /// the given name and arity.
    pub fn lookup_method(
        &self,
        environment: &Environment,
        name: &str,
        arity: usize,
    ) -> Result<Option<NodeRef<Linked>>> {
        for module in self.hierarchy(environment)? {
            for member in module.methods() {
                let Some(method) = member.as_method() else {
                    continue;
                };
                if method.name == name
                    && (method.body.is_some() || method.is_native)
                    && method.matches_arity(arity)
                {
                    trace!(name, arity, module = ?module.name(), "method lookup hit");
                    return Ok(Some(member.clone()));
                }
            }
        }
        Ok(None)
    }
}

impl<S: Stage> Node<S> {
    /// Search this class's own constructors for one accepting the
    /// given arity. Constructors are not inherited.
    pub fn lookup_constructor(&self, arity: usize) -> Option<NodeRef<S>> {
        self.constructors()
            .find(|member| {
                member
                    .as_constructor()
                    .map_or(false, |constructor| constructor.matches_arity(arity))
            })
            .cloned()
    }
}

fn resolve_module(
    reference: &NodeRef<Linked>,
    environment: &Environment,
) -> Result<NodeRef<Linked>> {
    let reference = reference
        .as_reference()
        .ok_or_else(|| ModelError::UnresolvedReference {
            name: reference.name().unwrap_or_default().to_owned(),
        })?;
    reference.target(environment)
}

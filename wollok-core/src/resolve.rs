use crate::ast::{Category, Kind, Linked, Node, NodeId, Reference};
use crate::environment::Environment;
use crate::error::{ModelError, Result};
use crate::utils::divide_on;
use crate::NodeRef;

impl Node<Linked> {
    /// The entity's label within its container.
    ///
    /// Anonymous singletons receive a synthetic label derived from
    /// their superclass and id, so that it never clashes with a
    /// declared name.
    fn label(&self, environment: &Environment) -> Result<String> {
        match self {
            Self::Singleton(singleton) => match &singleton.name {
                Some(name) => Ok(name.clone()),
                None => {
                    let superclass = singleton.super_call.superclass.as_reference().ok_or_else(
                        || ModelError::UnresolvedReference {
                            name: singleton
                                .super_call
                                .superclass
                                .name()
                                .unwrap_or_default()
                                .to_owned(),
                        },
                    )?;
                    let supermodule = superclass.target(environment)?;
                    Ok(format!(
                        "{}#{}",
                        supermodule.fully_qualified_name(environment)?,
                        singleton.id,
                    ))
                }
            },
            _ => Ok(self.name().unwrap_or_default().replace(".#", "")),
        }
    }

    /// The dot-separated name of this entity from its top-level
    /// package down.
    pub fn fully_qualified_name(&self, environment: &Environment) -> Result<String> {
        let label = self.label(environment)?;
        let parent = self.parent(environment)?;
        if parent.is(Kind::Package) {
            Ok(format!(
                "{}.{}",
                parent.fully_qualified_name(environment)?,
                label,
            ))
        } else {
            Ok(label)
        }
    }

    /// Resolve a qualified name relative to this package.
    ///
    /// A `#` marks a synthetic name: the segment after it is an id
    /// and resolves directly through the environment.
    pub fn get_node_by_qn(&self, environment: &Environment, qn: &str) -> Result<NodeRef<Linked>> {
        if let Some((_, id)) = qn.split_once('#') {
            let id = id
                .parse::<u64>()
                .map_err(|_| ModelError::UnresolvedReference { name: qn.to_owned() })?;
            return environment.get_node_by_id(NodeId(id));
        }
        let mut current = environment.get_node_by_id(self.id())?;
        for step in qn.split('.') {
            current = current
                .children()
                .iter()
                .find(|child| child.is(Category::Entity) && child.name() == Some(step))
                .cloned()
                .ok_or_else(|| ModelError::UnresolvedReference { name: qn.to_owned() })?;
        }
        Ok(current)
    }
}

impl Reference<Linked> {
    /// The node this reference resolves to.
    ///
    /// The head of the (possibly dotted) name is looked up in the
    /// reference's scope; the remainder resolves as a qualified name
    /// within the node the head leads to.
    pub fn target(&self, environment: &Environment) -> Result<NodeRef<Linked>> {
        let (head, tail) = divide_on('.', &self.name);
        let id = self
            .scope
            .get(head)
            .copied()
            .ok_or_else(|| ModelError::UnresolvedReference {
                name: self.name.clone(),
            })?;
        let root = environment.get_node_by_id(id)?;
        match tail {
            None => Ok(root),
            Some(tail) => root.get_node_by_qn(environment, tail),
        }
    }
}

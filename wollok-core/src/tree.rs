use std::collections::VecDeque;
use std::rc::Rc;

use crate::ast::*;
use crate::NodeRef;

impl<S: Stage> Node<S> {
    /// All direct structural children, in declared attribute order.
    ///
    /// Walks every attribute value, descending into sequences and
    /// nested records, and collects any value that is itself a node.
    /// Holes of raw trees contribute nothing.
    pub fn children(&self) -> Vec<NodeRef<S>> {
        let mut children: Vec<NodeRef<S>> = Vec::new();
        match self {
            Self::Environment(it) => children.extend_from_slice(&it.members),
            Self::Package(it) => children.extend_from_slice(&it.members),
            Self::Class(it) => {
                if let Some(superclass) = S::fill(&it.superclass).and_then(Option::as_ref) {
                    children.push(superclass.clone());
                }
                children.extend_from_slice(&it.mixins);
                children.extend_from_slice(&it.members);
            }
            Self::Singleton(it) => {
                if let Some(call) = S::fill(&it.super_call) {
                    children.push(call.superclass.clone());
                    children.extend_from_slice(&call.args);
                }
                children.extend_from_slice(&it.mixins);
                children.extend_from_slice(&it.members);
            }
            Self::Mixin(it) => {
                children.extend_from_slice(&it.mixins);
                children.extend_from_slice(&it.members);
            }
            Self::Program(it) => children.push(it.body.clone()),
            Self::Describe(it) => children.extend_from_slice(&it.members),
            Self::Test(it) => children.push(it.body.clone()),
            Self::Field(it) => {
                if let Some(value) = S::fill(&it.value) {
                    children.push(value.clone());
                }
            }
            Self::Method(it) => {
                children.extend_from_slice(&it.parameters);
                if let Some(body) = &it.body {
                    children.push(body.clone());
                }
            }
            Self::Constructor(it) => {
                children.extend_from_slice(&it.parameters);
                if let Some(call) = &it.base_call {
                    children.extend_from_slice(&call.args);
                }
                if let Some(body) = S::fill(&it.body) {
                    children.push(body.clone());
                }
            }
            Self::Parameter(_) | Self::Reference(_) | Self::SelfExpr(_) => {}
            Self::Literal(it) => {
                if let LiteralValue::Singleton(singleton) = &it.value {
                    children.push(singleton.clone());
                }
            }
            Self::Body(it) => children.extend_from_slice(&it.sentences),
            Self::Catch(it) => {
                children.push(it.parameter.clone());
                if let Some(parameter_type) = &it.parameter_type {
                    children.push(parameter_type.clone());
                }
                children.push(it.body.clone());
            }
            Self::Send(it) => {
                children.push(it.receiver.clone());
                children.extend_from_slice(&it.args);
            }
            Self::Super(it) => children.extend_from_slice(&it.args),
            Self::New(it) => {
                children.push(it.instantiated.clone());
                children.extend_from_slice(&it.args);
            }
            Self::If(it) => {
                children.push(it.condition.clone());
                children.push(it.then_body.clone());
                if let Some(else_body) = S::fill(&it.else_body) {
                    children.push(else_body.clone());
                }
            }
            Self::Throw(it) => children.push(it.exception.clone()),
            Self::Try(it) => {
                children.push(it.body.clone());
                children.extend_from_slice(&it.catches);
                if let Some(always) = S::fill(&it.always) {
                    children.push(always.clone());
                }
            }
            Self::Variable(it) => {
                if let Some(value) = S::fill(&it.value) {
                    children.push(value.clone());
                }
            }
            Self::Return(it) => {
                if let Some(value) = &it.value {
                    children.push(value.clone());
                }
            }
            Self::Assignment(it) => {
                children.push(it.reference.clone());
                children.push(it.value.clone());
            }
        }
        children
    }

    /// A breadth-first traversal of the node's descendants.
    ///
    /// The node itself is excluded. Kind filtering composes through
    /// ordinary iterator adapters.
    pub fn descendants(&self) -> Descendants<S> {
        Descendants {
            queue: self.children().into(),
        }
    }

    /// Structural rewrite of the whole subtree.
    ///
    /// The rewrite applies bottom-up: a node is rewritten after its
    /// children have been rewritten.
    pub fn transform(&self, mut tx: impl FnMut(Node<S>) -> Node<S>) -> Node<S> {
        self.transform_with(&mut tx)
    }

    fn transform_with(&self, tx: &mut dyn FnMut(Node<S>) -> Node<S>) -> Node<S> {
        let rebuilt = match self {
            Self::Environment(it) => Self::Environment(Environment {
                id: it.id.clone(),
                members: step_all(&it.members, tx),
            }),
            Self::Package(it) => Self::Package(Package {
                id: it.id.clone(),
                name: it.name.clone(),
                members: step_all(&it.members, tx),
            }),
            Self::Class(it) => Self::Class(Class {
                id: it.id.clone(),
                name: it.name.clone(),
                superclass: S::map_fill(it.superclass.clone(), |superclass| {
                    superclass.map(|node| step(&node, tx))
                }),
                mixins: step_all(&it.mixins, tx),
                members: step_all(&it.members, tx),
            }),
            Self::Singleton(it) => Self::Singleton(Singleton {
                id: it.id.clone(),
                name: it.name.clone(),
                super_call: S::map_fill(it.super_call.clone(), |call| SuperCall {
                    superclass: step(&call.superclass, tx),
                    args: step_all(&call.args, tx),
                }),
                mixins: step_all(&it.mixins, tx),
                members: step_all(&it.members, tx),
            }),
            Self::Mixin(it) => Self::Mixin(Mixin {
                id: it.id.clone(),
                name: it.name.clone(),
                mixins: step_all(&it.mixins, tx),
                members: step_all(&it.members, tx),
            }),
            Self::Program(it) => Self::Program(Program {
                id: it.id.clone(),
                name: it.name.clone(),
                body: step(&it.body, tx),
            }),
            Self::Describe(it) => Self::Describe(Describe {
                id: it.id.clone(),
                name: it.name.clone(),
                members: step_all(&it.members, tx),
            }),
            Self::Test(it) => Self::Test(Test {
                id: it.id.clone(),
                name: it.name.clone(),
                body: step(&it.body, tx),
            }),
            Self::Field(it) => Self::Field(Field {
                id: it.id.clone(),
                name: it.name.clone(),
                is_read_only: it.is_read_only,
                value: S::map_fill(it.value.clone(), |value| step(&value, tx)),
            }),
            Self::Method(it) => Self::Method(Method {
                id: it.id.clone(),
                name: it.name.clone(),
                is_override: it.is_override,
                is_native: it.is_native,
                parameters: step_all(&it.parameters, tx),
                body: it.body.as_ref().map(|body| step(body, tx)),
            }),
            Self::Constructor(it) => Self::Constructor(Constructor {
                id: it.id.clone(),
                parameters: step_all(&it.parameters, tx),
                base_call: it.base_call.as_ref().map(|call| BaseCall {
                    calls_super: call.calls_super,
                    args: step_all(&call.args, tx),
                }),
                body: S::map_fill(it.body.clone(), |body| step(&body, tx)),
            }),
            Self::Parameter(it) => Self::Parameter(it.clone()),
            Self::Body(it) => Self::Body(Body {
                id: it.id.clone(),
                sentences: step_all(&it.sentences, tx),
            }),
            Self::Catch(it) => Self::Catch(Catch {
                id: it.id.clone(),
                parameter: step(&it.parameter, tx),
                parameter_type: it.parameter_type.as_ref().map(|node| step(node, tx)),
                body: step(&it.body, tx),
            }),
            Self::Reference(it) => Self::Reference(it.clone()),
            Self::SelfExpr(it) => Self::SelfExpr(it.clone()),
            Self::Literal(it) => Self::Literal(Literal {
                id: it.id.clone(),
                value: match &it.value {
                    LiteralValue::Singleton(singleton) => {
                        LiteralValue::Singleton(step(singleton, tx))
                    }
                    other => other.clone(),
                },
            }),
            Self::Send(it) => Self::Send(Send {
                id: it.id.clone(),
                receiver: step(&it.receiver, tx),
                message: it.message.clone(),
                args: step_all(&it.args, tx),
            }),
            Self::Super(it) => Self::Super(Super {
                id: it.id.clone(),
                args: step_all(&it.args, tx),
            }),
            Self::New(it) => Self::New(New {
                id: it.id.clone(),
                instantiated: step(&it.instantiated, tx),
                args: step_all(&it.args, tx),
            }),
            Self::If(it) => Self::If(If {
                id: it.id.clone(),
                condition: step(&it.condition, tx),
                then_body: step(&it.then_body, tx),
                else_body: S::map_fill(it.else_body.clone(), |body| step(&body, tx)),
            }),
            Self::Throw(it) => Self::Throw(Throw {
                id: it.id.clone(),
                exception: step(&it.exception, tx),
            }),
            Self::Try(it) => Self::Try(Try {
                id: it.id.clone(),
                body: step(&it.body, tx),
                catches: step_all(&it.catches, tx),
                always: S::map_fill(it.always.clone(), |body| step(&body, tx)),
            }),
            Self::Variable(it) => Self::Variable(Variable {
                id: it.id.clone(),
                name: it.name.clone(),
                is_read_only: it.is_read_only,
                value: S::map_fill(it.value.clone(), |value| step(&value, tx)),
            }),
            Self::Return(it) => Self::Return(Return {
                id: it.id.clone(),
                value: it.value.as_ref().map(|value| step(value, tx)),
            }),
            Self::Assignment(it) => Self::Assignment(Assignment {
                id: it.id.clone(),
                reference: step(&it.reference, tx),
                value: step(&it.value, tx),
            }),
        };
        tx(rebuilt)
    }

    /// Pre-order fold over the subtree.
    ///
    /// The accumulator visits the node itself first, then threads
    /// through its children left to right.
    pub fn reduce<T>(&self, initial: T, mut tx: impl FnMut(T, &Node<S>) -> T) -> T {
        self.reduce_with(initial, &mut tx)
    }

    fn reduce_with<T>(&self, acc: T, tx: &mut dyn FnMut(T, &Node<S>) -> T) -> T {
        let acc = tx(acc, self);
        self.children()
            .iter()
            .fold(acc, |acc, child| child.reduce_with(acc, tx))
    }
}

fn step<S: Stage>(node: &NodeRef<S>, tx: &mut dyn FnMut(Node<S>) -> Node<S>) -> NodeRef<S> {
    Rc::new(node.transform_with(tx))
}

fn step_all<S: Stage>(
    nodes: &[NodeRef<S>],
    tx: &mut dyn FnMut(Node<S>) -> Node<S>,
) -> Vec<NodeRef<S>> {
    nodes.iter().map(|node| step(node, tx)).collect()
}

/// A breadth-first iterator over a node's descendants.
pub struct Descendants<S: Stage> {
    queue: VecDeque<NodeRef<S>>,
}

impl<S: Stage> Iterator for Descendants<S> {
    type Item = NodeRef<S>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.children());
        Some(node)
    }
}

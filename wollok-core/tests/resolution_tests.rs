use std::rc::Rc;

use wollok_core::ast::{
    self, Category, Class, Kind, Linked, Literal, LiteralValue, Method, Mixin, Node, NodeId,
    Package, Parameter, Reference, Return, Scope, Singleton, SuperCall,
};
use wollok_core::environment::Environment;
use wollok_core::error::ModelError;
use wollok_core::NodeRef;

fn node(node: Node<Linked>) -> NodeRef<Linked> {
    Rc::new(node)
}

fn scope(entries: &[(&str, u64)]) -> Scope {
    entries
        .iter()
        .map(|(name, id)| (name.to_string(), NodeId(*id)))
        .collect()
}

fn reference(id: u64, name: &str, entries: &[(&str, u64)]) -> NodeRef<Linked> {
    node(Node::Reference(Reference {
        id: NodeId(id),
        name: name.to_owned(),
        scope: scope(entries),
    }))
}

fn empty_body(id: u64) -> NodeRef<Linked> {
    node(Node::Body(ast::Body {
        id: NodeId(id),
        sentences: vec![],
    }))
}

fn parameter(id: u64, name: &str, is_var_arg: bool) -> NodeRef<Linked> {
    node(Node::Parameter(Parameter {
        id: NodeId(id),
        name: name.to_owned(),
        is_var_arg,
    }))
}

fn method(id: u64, name: &str, parameters: Vec<NodeRef<Linked>>, body: u64) -> NodeRef<Linked> {
    node(Node::Method(Method {
        id: NodeId(id),
        name: name.to_owned(),
        is_override: false,
        is_native: false,
        parameters,
        body: Some(empty_body(body)),
    }))
}

fn abstract_method(id: u64, name: &str) -> NodeRef<Linked> {
    node(Node::Method(Method {
        id: NodeId(id),
        name: name.to_owned(),
        is_override: false,
        is_native: false,
        parameters: vec![],
        body: None,
    }))
}

fn native_method(id: u64, name: &str) -> NodeRef<Linked> {
    node(Node::Method(Method {
        id: NodeId(id),
        name: name.to_owned(),
        is_override: false,
        is_native: true,
        parameters: vec![],
        body: None,
    }))
}

fn class(
    id: u64,
    name: &str,
    superclass: Option<NodeRef<Linked>>,
    mixins: Vec<NodeRef<Linked>>,
    members: Vec<NodeRef<Linked>>,
) -> NodeRef<Linked> {
    node(Node::Class(Class {
        id: NodeId(id),
        name: name.to_owned(),
        superclass,
        mixins,
        members,
    }))
}

fn mixin(id: u64, name: &str, mixins: Vec<NodeRef<Linked>>, members: Vec<NodeRef<Linked>>) -> NodeRef<Linked> {
    node(Node::Mixin(Mixin {
        id: NodeId(id),
        name: name.to_owned(),
        mixins,
        members,
    }))
}

fn package(id: u64, name: &str, members: Vec<NodeRef<Linked>>) -> NodeRef<Linked> {
    node(Node::Package(Package {
        id: NodeId(id),
        name: name.to_owned(),
        members,
    }))
}

fn environment(members: Vec<NodeRef<Linked>>) -> Environment {
    Environment::new(Node::Environment(ast::Environment {
        id: NodeId(0),
        members,
    }))
}

/// One package with a nested package, a class hierarchy with mixins,
/// a singleton and an anonymous object literal:
///
/// ```text
/// package p {
///   package q { class C {} }
///   class A { sing(); native breathe() }
///   class B inherits A { fly(d); eat() }
///   mixin M3 { glide() }
///   mixin M1 mixed with M3 {}
///   mixin M2 {}
///   class Bird inherits B mixed with M1, M2 {
///     fly(d); abstract eat(); echo(a, *rest)
///   }
///   object pepita inherits Bird { sing() }
///   class Nest { owner() = object inherits A {} }
/// }
/// ```
fn sample_environment() -> Environment {
    let anonymous = node(Node::Singleton(Singleton {
        id: NodeId(18),
        name: None,
        super_call: SuperCall {
            superclass: reference(27, "A", &[("A", 10)]),
            args: vec![],
        },
        mixins: vec![],
        members: vec![],
    }));
    let owner_body = node(Node::Body(ast::Body {
        id: NodeId(71),
        sentences: vec![node(Node::Return(Return {
            id: NodeId(72),
            value: Some(node(Node::Literal(Literal {
                id: NodeId(73),
                value: LiteralValue::Singleton(anonymous),
            }))),
        }))],
    }));
    let nest = node(Node::Class(Class {
        id: NodeId(17),
        name: "Nest".to_owned(),
        superclass: None,
        mixins: vec![],
        members: vec![node(Node::Method(Method {
            id: NodeId(59),
            name: "owner".to_owned(),
            is_override: false,
            is_native: false,
            parameters: vec![],
            body: Some(owner_body),
        }))],
    }));

    environment(vec![package(
        1,
        "p",
        vec![
            package(2, "q", vec![class(3, "C", None, vec![], vec![])]),
            class(
                10,
                "A",
                None,
                vec![],
                vec![method(50, "sing", vec![], 70), native_method(58, "breathe")],
            ),
            class(
                11,
                "B",
                Some(reference(21, "A", &[("A", 10)])),
                vec![],
                vec![
                    method(51, "fly", vec![parameter(60, "d", false)], 74),
                    method(52, "eat", vec![], 75),
                ],
            ),
            mixin(15, "M3", vec![], vec![method(53, "glide", vec![], 76)]),
            mixin(13, "M1", vec![reference(22, "M3", &[("M3", 15)])], vec![]),
            mixin(14, "M2", vec![], vec![]),
            class(
                12,
                "Bird",
                Some(reference(23, "B", &[("B", 11)])),
                vec![
                    reference(24, "M1", &[("M1", 13)]),
                    reference(25, "M2", &[("M2", 14)]),
                ],
                vec![
                    method(54, "fly", vec![parameter(61, "d", false)], 77),
                    abstract_method(55, "eat"),
                    method(
                        56,
                        "echo",
                        vec![parameter(62, "a", false), parameter(63, "rest", true)],
                        78,
                    ),
                ],
            ),
            node(Node::Singleton(Singleton {
                id: NodeId(16),
                name: Some("pepita".to_owned()),
                super_call: SuperCall {
                    superclass: reference(26, "Bird", &[("Bird", 12)]),
                    args: vec![],
                },
                mixins: vec![],
                members: vec![method(57, "sing", vec![], 79)],
            })),
            nest,
        ],
    )])
}

fn ids(modules: &[NodeRef<Linked>]) -> Vec<u64> {
    modules.iter().map(|module| module.id().0).collect()
}

#[test]
fn nodes_resolve_by_id() {
    let env = sample_environment();
    let bird = env.get_node_by_id(NodeId(12)).unwrap();
    assert_eq!(bird.name(), Some("Bird"));

    let missing = env.get_node_by_id(NodeId(999));
    assert_eq!(missing, Err(ModelError::MissingNode { id: NodeId(999) }));
}

#[test]
fn fully_qualified_names_round_trip() {
    let env = sample_environment();

    let c = env.get_node_by_fqn("p.q.C").unwrap();
    assert_eq!(c.id(), NodeId(3));
    assert_eq!(c.fully_qualified_name(&env).unwrap(), "p.q.C");

    let p = env.get_node_by_fqn("p").unwrap();
    assert_eq!(p.id(), NodeId(1));
    assert_eq!(p.fully_qualified_name(&env).unwrap(), "p");

    let pepita = env.get_node_by_fqn("p.pepita").unwrap();
    assert_eq!(pepita.fully_qualified_name(&env).unwrap(), "p.pepita");
}

#[test]
fn unresolved_names_fail() {
    let env = sample_environment();
    assert!(matches!(
        env.get_node_by_fqn("p.q.Zzz"),
        Err(ModelError::UnresolvedReference { .. }),
    ));
    assert!(matches!(
        env.get_node_by_fqn("zzz"),
        Err(ModelError::UnresolvedReference { .. }),
    ));
}

#[test]
fn parents_are_derived_from_the_tree() {
    let env = sample_environment();
    let c = env.get_node_by_id(NodeId(3)).unwrap();

    let q = c.parent(&env).unwrap();
    assert_eq!(q.id(), NodeId(2));
    let p = q.parent(&env).unwrap();
    assert_eq!(p.id(), NodeId(1));
    let root = p.parent(&env).unwrap();
    assert!(root.is(Kind::Environment));

    assert_eq!(
        root.parent(&env),
        Err(ModelError::Orphan { id: NodeId(0) }),
    );

    let detached = class(999, "Detached", None, vec![], vec![]);
    assert_eq!(
        detached.parent(&env),
        Err(ModelError::Orphan { id: NodeId(999) }),
    );
}

#[test]
fn closest_ancestor_walks_up_by_kind() {
    let env = sample_environment();
    let c = env.get_node_by_id(NodeId(3)).unwrap();

    let q = c.closest_ancestor(&env, Kind::Package).unwrap();
    assert_eq!(q.id(), NodeId(2));
    let root = c.closest_ancestor(&env, Kind::Environment).unwrap();
    assert_eq!(root.id(), NodeId(0));
    assert_eq!(c.closest_ancestor(&env, Category::Module), None);

    let glide = env.get_node_by_id(NodeId(53)).unwrap();
    let m3 = glide.closest_ancestor(&env, Category::Module).unwrap();
    assert_eq!(m3.id(), NodeId(15));
}

#[test]
fn references_resolve_through_their_scope() {
    let env = sample_environment();

    let qualified = reference(100, "q.C", &[("q", 2)]);
    let target = qualified.as_reference().unwrap().target(&env).unwrap();
    assert_eq!(target.id(), NodeId(3));

    let direct = reference(101, "Bird", &[("Bird", 12)]);
    let target = direct.as_reference().unwrap().target(&env).unwrap();
    assert_eq!(target.id(), NodeId(12));

    let unscoped = reference(102, "Ghost", &[]);
    assert!(matches!(
        unscoped.as_reference().unwrap().target(&env),
        Err(ModelError::UnresolvedReference { .. }),
    ));
}

#[test]
fn anonymous_singletons_get_synthetic_names() {
    let env = sample_environment();
    let anonymous = env.get_node_by_id(NodeId(18)).unwrap();

    let fqn = anonymous.fully_qualified_name(&env).unwrap();
    assert_eq!(fqn, "p.A#18");

    let resolved = env.get_node_by_fqn(&fqn).unwrap();
    assert_eq!(resolved.id(), NodeId(18));
}

#[test]
fn hierarchy_inlines_mixins_before_the_superclass_chain() {
    let env = sample_environment();
    let bird = env.get_node_by_id(NodeId(12)).unwrap();

    let hierarchy = bird.hierarchy(&env).unwrap();
    assert_eq!(ids(&hierarchy), vec![12, 13, 15, 14, 11, 10]);
}

#[test]
fn singletons_inherit_through_their_super_call() {
    let env = sample_environment();
    let pepita = env.get_node_by_id(NodeId(16)).unwrap();

    let hierarchy = pepita.hierarchy(&env).unwrap();
    assert_eq!(ids(&hierarchy), vec![16, 12, 13, 15, 14, 11, 10]);

    let m3 = env.get_node_by_id(NodeId(15)).unwrap();
    assert!(pepita.inherits(&env, &m3).unwrap());
    assert!(!m3.inherits(&env, &pepita).unwrap());
}

#[test]
fn diamond_mixin_graphs_stay_duplicate_free() {
    let m3 = mixin(5, "M3", vec![], vec![]);
    let m1 = mixin(6, "M1", vec![reference(30, "M3", &[("M3", 5)])], vec![]);
    let m2 = mixin(7, "M2", vec![reference(31, "M3", &[("M3", 5)])], vec![]);
    let d = class(
        8,
        "D",
        None,
        vec![
            reference(32, "M1", &[("M1", 6)]),
            reference(33, "M2", &[("M2", 7)]),
        ],
        vec![],
    );
    let env = environment(vec![package(1, "p", vec![m3, m1, m2, d.clone()])]);

    let hierarchy = d.hierarchy(&env).unwrap();
    assert_eq!(ids(&hierarchy), vec![8, 6, 5, 7]);
}

#[test]
fn hierarchy_terminates_on_cyclic_inputs() {
    // A cycle is ill-formed input, but linearisation must still stop.
    let a = class(5, "A", Some(reference(30, "B", &[("B", 6)])), vec![], vec![]);
    let b = class(6, "B", Some(reference(31, "A", &[("A", 5)])), vec![], vec![]);
    let env = environment(vec![package(1, "p", vec![a.clone(), b])]);

    let hierarchy = a.hierarchy(&env).unwrap();
    assert_eq!(ids(&hierarchy), vec![5, 6]);
}

#[test]
fn method_lookup_follows_the_hierarchy() {
    let env = sample_environment();
    let bird = env.get_node_by_id(NodeId(12)).unwrap();

    // The override wins over the inherited definition.
    let fly = bird.lookup_method(&env, "fly", 1).unwrap().unwrap();
    assert_eq!(fly.id(), NodeId(54));

    // Mixin methods resolve before the superclass chain.
    let glide = bird.lookup_method(&env, "glide", 0).unwrap().unwrap();
    assert_eq!(glide.id(), NodeId(53));

    // A bodyless non-native method does not shadow a concrete one.
    let eat = bird.lookup_method(&env, "eat", 0).unwrap().unwrap();
    assert_eq!(eat.id(), NodeId(52));

    // Native methods count as concrete.
    let breathe = bird.lookup_method(&env, "breathe", 0).unwrap().unwrap();
    assert_eq!(breathe.id(), NodeId(58));

    assert_eq!(bird.lookup_method(&env, "quack", 0).unwrap(), None);
    assert_eq!(bird.lookup_method(&env, "fly", 3).unwrap(), None);
}

#[test]
fn varargs_methods_match_flexible_arities() {
    let env = sample_environment();
    let bird = env.get_node_by_id(NodeId(12)).unwrap();

    let echo = bird.lookup_method(&env, "echo", 1).unwrap().unwrap();
    assert_eq!(echo.id(), NodeId(56));
    let echo = bird.lookup_method(&env, "echo", 4).unwrap().unwrap();
    assert_eq!(echo.id(), NodeId(56));
    assert_eq!(bird.lookup_method(&env, "echo", 0).unwrap(), None);
}

#[test]
fn constructors_resolve_on_the_class_alone() {
    let unary = node(Node::Constructor(ast::Constructor {
        id: NodeId(90),
        parameters: vec![parameter(91, "energy", false)],
        base_call: None,
        body: empty_body(92),
    }));
    let variadic = node(Node::Constructor(ast::Constructor {
        id: NodeId(93),
        parameters: vec![parameter(94, "values", true)],
        base_call: None,
        body: empty_body(95),
    }));
    let bird = class(12, "Bird", None, vec![], vec![unary, variadic]);

    assert_eq!(bird.lookup_constructor(1).unwrap().id(), NodeId(90));
    assert_eq!(bird.lookup_constructor(0).unwrap().id(), NodeId(93));
    assert_eq!(bird.lookup_constructor(5).unwrap().id(), NodeId(93));
}

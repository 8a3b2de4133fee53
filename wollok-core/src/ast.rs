use std::fmt;

use indexmap::IndexMap;

use crate::NodeRef;

/// The unique identifier of a linked node.
///
/// Identifiers are assigned by the linker and are unique across one
/// whole environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The resolution scope of a linked reference.
///
/// Maps each name visible from the reference to the id of the node it
/// resolves to (for a dotted reference, the id the head segment
/// resolves to).
pub type Scope = IndexMap<String, NodeId>;

/// A refinement stage of the tree.
///
/// Stages share the structural tree shape and only differ in
/// attribute completeness: raw trees may have holes where the filler
/// has not yet populated syntactic defaults, and only linked trees
/// carry node ids and reference scopes.
pub trait Stage: Clone + fmt::Debug + PartialEq + 'static {
    /// The node identifier attribute: absent until linking.
    type Id: Clone + fmt::Debug + PartialEq;
    /// The reference scope attribute: absent until linking.
    type Scope: Clone + fmt::Debug + PartialEq;
    /// An attribute slot populated by the filler: a hole on raw trees.
    type Fill<T: Clone + fmt::Debug + PartialEq>: Clone + fmt::Debug + PartialEq;

    /// View a fillable slot as an optional value.
    fn fill<T: Clone + fmt::Debug + PartialEq>(slot: &Self::Fill<T>) -> Option<&T>;

    /// Rebuild a fillable slot, preserving holes.
    fn map_fill<T: Clone + fmt::Debug + PartialEq>(
        slot: Self::Fill<T>,
        f: impl FnOnce(T) -> T,
    ) -> Self::Fill<T>;
}

/// The stage of trees as produced by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Raw {}

/// The stage of trees whose syntactic defaults have been populated.
#[derive(Debug, Clone, PartialEq)]
pub enum Filled {}

/// The stage of trees with ids assigned and references scoped.
#[derive(Debug, Clone, PartialEq)]
pub enum Linked {}

impl Stage for Raw {
    type Id = ();
    type Scope = ();
    type Fill<T: Clone + fmt::Debug + PartialEq> = Option<T>;

    fn fill<T: Clone + fmt::Debug + PartialEq>(slot: &Option<T>) -> Option<&T> {
        slot.as_ref()
    }

    fn map_fill<T: Clone + fmt::Debug + PartialEq>(
        slot: Option<T>,
        f: impl FnOnce(T) -> T,
    ) -> Option<T> {
        slot.map(f)
    }
}

impl Stage for Filled {
    type Id = ();
    type Scope = ();
    type Fill<T: Clone + fmt::Debug + PartialEq> = T;

    fn fill<T: Clone + fmt::Debug + PartialEq>(slot: &T) -> Option<&T> {
        Some(slot)
    }

    fn map_fill<T: Clone + fmt::Debug + PartialEq>(slot: T, f: impl FnOnce(T) -> T) -> T {
        f(slot)
    }
}

impl Stage for Linked {
    type Id = NodeId;
    type Scope = Scope;
    type Fill<T: Clone + fmt::Debug + PartialEq> = T;

    fn fill<T: Clone + fmt::Debug + PartialEq>(slot: &T) -> Option<&T> {
        Some(slot)
    }

    fn map_fill<T: Clone + fmt::Debug + PartialEq>(slot: T, f: impl FnOnce(T) -> T) -> T {
        f(slot)
    }
}

/// The kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Environment,
    Package,
    Class,
    Singleton,
    Mixin,
    Program,
    Describe,
    Test,
    Field,
    Method,
    Constructor,
    Parameter,
    Body,
    Catch,
    Reference,
    SelfExpr,
    Literal,
    Send,
    Super,
    New,
    If,
    Throw,
    Try,
    Variable,
    Return,
    Assignment,
}

/// A category of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A top-level or package-level named program element.
    Entity,
    /// Something that can define methods and fields.
    Module,
    /// An evaluable expression.
    Expression,
    /// A statement within a body.
    Sentence,
}

impl Category {
    /// Whether the given kind belongs to this category.
    pub fn contains(self, kind: Kind) -> bool {
        match self {
            Self::Entity => matches!(
                kind,
                Kind::Package
                    | Kind::Class
                    | Kind::Singleton
                    | Kind::Mixin
                    | Kind::Program
                    | Kind::Describe
                    | Kind::Test
            ),
            Self::Module => matches!(kind, Kind::Class | Kind::Singleton | Kind::Mixin),
            Self::Expression => matches!(
                kind,
                Kind::Reference
                    | Kind::SelfExpr
                    | Kind::Literal
                    | Kind::Send
                    | Kind::Super
                    | Kind::New
                    | Kind::If
                    | Kind::Throw
                    | Kind::Try
            ),
            Self::Sentence => matches!(kind, Kind::Variable | Kind::Return | Kind::Assignment),
        }
    }
}

/// Either a specific kind or a whole category, for kind queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindLike {
    Kind(Kind),
    Category(Category),
}

impl From<Kind> for KindLike {
    fn from(kind: Kind) -> Self {
        Self::Kind(kind)
    }
}

impl From<Category> for KindLike {
    fn from(category: Category) -> Self {
        Self::Category(category)
    }
}

/// The root of a linked tree, holding the top-level packages.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment<S: Stage> {
    pub id: S::Id,
    /// The top-level packages.
    pub members: Vec<NodeRef<S>>,
}

/// A named container of entities.
///
/// Example:
/// ```text
/// package drawings {
///   class Circle { ... }
///   object canvas { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Package<S: Stage> {
    pub id: S::Id,
    pub name: String,
    /// The entities declared in this package, in declaration order.
    pub members: Vec<NodeRef<S>>,
}

/// A class definition.
///
/// Example:
/// ```text
/// class Ave inherits Animal mixed with Volador {
///   var energia = 100
///   method volar() { energia -= 10 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Class<S: Stage> {
    pub id: S::Id,
    pub name: String,
    /// The superclass reference; populated by the filler, and absent
    /// only on the root class of the hierarchy.
    pub superclass: S::Fill<Option<NodeRef<S>>>,
    /// The mixin references, in declaration order.
    pub mixins: Vec<NodeRef<S>>,
    /// Fields, methods and constructors, in declaration order.
    pub members: Vec<NodeRef<S>>,
}

/// The arguments a singleton passes to its superclass.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperCall<S: Stage> {
    pub superclass: NodeRef<S>,
    pub args: Vec<NodeRef<S>>,
}

/// A singleton object definition.
///
/// Example:
/// ```text
/// object pepita inherits Ave {
///   method cantar() = "pio pio"
/// }
/// ```
///
/// Anonymous singletons (object literals) have no name and receive a
/// synthetic fully qualified name derived from their superclass.
#[derive(Debug, Clone, PartialEq)]
pub struct Singleton<S: Stage> {
    pub id: S::Id,
    pub name: Option<String>,
    /// The superclass reference and arguments; populated by the filler.
    pub super_call: S::Fill<SuperCall<S>>,
    pub mixins: Vec<NodeRef<S>>,
    pub members: Vec<NodeRef<S>>,
}

/// A mixin definition: a composable module fragment with no
/// superclass of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Mixin<S: Stage> {
    pub id: S::Id,
    pub name: String,
    pub mixins: Vec<NodeRef<S>>,
    pub members: Vec<NodeRef<S>>,
}

/// A runnable program entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Program<S: Stage> {
    pub id: S::Id,
    pub name: String,
    pub body: NodeRef<S>,
}

/// A test suite entity, grouping tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Describe<S: Stage> {
    pub id: S::Id,
    pub name: String,
    pub members: Vec<NodeRef<S>>,
}

/// A single test entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Test<S: Stage> {
    pub id: S::Id,
    pub name: String,
    pub body: NodeRef<S>,
}

/// A field member of a module.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<S: Stage> {
    pub id: S::Id,
    pub name: String,
    pub is_read_only: bool,
    /// The initial value; populated by the filler.
    pub value: S::Fill<NodeRef<S>>,
}

/// A method member of a module.
///
/// Example:
/// ```text
/// method come(comida) { energia += comida.energia() }
/// method volar() native
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Method<S: Stage> {
    pub id: S::Id,
    pub name: String,
    pub is_override: bool,
    /// Whether the method is implemented by the interpreter itself.
    pub is_native: bool,
    pub parameters: Vec<NodeRef<S>>,
    /// The method body; absent on native and abstract methods.
    pub body: Option<NodeRef<S>>,
}

/// The delegation a constructor performs before its own body.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseCall<S: Stage> {
    /// Whether the delegation targets the superclass rather than a
    /// sibling constructor.
    pub calls_super: bool,
    pub args: Vec<NodeRef<S>>,
}

/// A constructor member of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct Constructor<S: Stage> {
    pub id: S::Id,
    pub parameters: Vec<NodeRef<S>>,
    pub base_call: Option<BaseCall<S>>,
    /// The constructor body; populated by the filler.
    pub body: S::Fill<NodeRef<S>>,
}

/// A parameter of a method or constructor.
///
/// At most one parameter may be varargs, and it is always the last.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter<S: Stage> {
    pub id: S::Id,
    pub name: String,
    pub is_var_arg: bool,
}

/// An ordered sequence of sentences.
#[derive(Debug, Clone, PartialEq)]
pub struct Body<S: Stage> {
    pub id: S::Id,
    pub sentences: Vec<NodeRef<S>>,
}

/// A single catch clause of a `try` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Catch<S: Stage> {
    pub id: S::Id,
    pub parameter: NodeRef<S>,
    /// The exception type this clause handles, if constrained.
    pub parameter_type: Option<NodeRef<S>>,
    pub body: NodeRef<S>,
}

/// A (possibly dotted) reference to a named node.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference<S: Stage> {
    pub id: S::Id,
    pub name: String,
    /// The resolution scope; populated by the linker.
    pub scope: S::Scope,
}

/// The `self` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfExpr<S: Stage> {
    pub id: S::Id,
}

/// The payload of a literal expression.
///
/// Object literals carry a whole anonymous singleton node.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue<S: Stage> {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
    Singleton(NodeRef<S>),
}

/// A literal expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal<S: Stage> {
    pub id: S::Id,
    pub value: LiteralValue<S>,
}

/// A message send.
///
/// Example:
/// ```text
/// pepita.come(alpiste)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Send<S: Stage> {
    pub id: S::Id,
    pub receiver: NodeRef<S>,
    pub message: String,
    pub args: Vec<NodeRef<S>>,
}

/// A `super` call within a method body.
#[derive(Debug, Clone, PartialEq)]
pub struct Super<S: Stage> {
    pub id: S::Id,
    pub args: Vec<NodeRef<S>>,
}

/// An instantiation expression.
///
/// Example:
/// ```text
/// new Circle(radius = 10)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct New<S: Stage> {
    pub id: S::Id,
    pub instantiated: NodeRef<S>,
    pub args: Vec<NodeRef<S>>,
}

/// A conditional expression.
#[derive(Debug, Clone, PartialEq)]
pub struct If<S: Stage> {
    pub id: S::Id,
    pub condition: NodeRef<S>,
    pub then_body: NodeRef<S>,
    /// The alternative body; populated (possibly empty) by the filler.
    pub else_body: S::Fill<NodeRef<S>>,
}

/// A `throw` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Throw<S: Stage> {
    pub id: S::Id,
    pub exception: NodeRef<S>,
}

/// A `try` expression with its catches and always-clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Try<S: Stage> {
    pub id: S::Id,
    pub body: NodeRef<S>,
    pub catches: Vec<NodeRef<S>>,
    /// The always-executed body; populated (possibly empty) by the filler.
    pub always: S::Fill<NodeRef<S>>,
}

/// A local variable declaration sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable<S: Stage> {
    pub id: S::Id,
    pub name: String,
    pub is_read_only: bool,
    /// The initial value; populated by the filler.
    pub value: S::Fill<NodeRef<S>>,
}

/// A return sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Return<S: Stage> {
    pub id: S::Id,
    pub value: Option<NodeRef<S>>,
}

/// An assignment sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<S: Stage> {
    pub id: S::Id,
    pub reference: NodeRef<S>,
    pub value: NodeRef<S>,
}

/// A node of the tree, tagged by kind and parameterised by stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<S: Stage> {
    Environment(Environment<S>),
    Package(Package<S>),
    Class(Class<S>),
    Singleton(Singleton<S>),
    Mixin(Mixin<S>),
    Program(Program<S>),
    Describe(Describe<S>),
    Test(Test<S>),
    Field(Field<S>),
    Method(Method<S>),
    Constructor(Constructor<S>),
    Parameter(Parameter<S>),
    Body(Body<S>),
    Catch(Catch<S>),
    Reference(Reference<S>),
    SelfExpr(SelfExpr<S>),
    Literal(Literal<S>),
    Send(Send<S>),
    Super(Super<S>),
    New(New<S>),
    If(If<S>),
    Throw(Throw<S>),
    Try(Try<S>),
    Variable(Variable<S>),
    Return(Return<S>),
    Assignment(Assignment<S>),
}

impl<S: Stage> Node<S> {
    /// Get the node's kind.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Environment(_) => Kind::Environment,
            Self::Package(_) => Kind::Package,
            Self::Class(_) => Kind::Class,
            Self::Singleton(_) => Kind::Singleton,
            Self::Mixin(_) => Kind::Mixin,
            Self::Program(_) => Kind::Program,
            Self::Describe(_) => Kind::Describe,
            Self::Test(_) => Kind::Test,
            Self::Field(_) => Kind::Field,
            Self::Method(_) => Kind::Method,
            Self::Constructor(_) => Kind::Constructor,
            Self::Parameter(_) => Kind::Parameter,
            Self::Body(_) => Kind::Body,
            Self::Catch(_) => Kind::Catch,
            Self::Reference(_) => Kind::Reference,
            Self::SelfExpr(_) => Kind::SelfExpr,
            Self::Literal(_) => Kind::Literal,
            Self::Send(_) => Kind::Send,
            Self::Super(_) => Kind::Super,
            Self::New(_) => Kind::New,
            Self::If(_) => Kind::If,
            Self::Throw(_) => Kind::Throw,
            Self::Try(_) => Kind::Try,
            Self::Variable(_) => Kind::Variable,
            Self::Return(_) => Kind::Return,
            Self::Assignment(_) => Kind::Assignment,
        }
    }

    /// Whether the node is of the given kind, or belongs to the given
    /// category.
    pub fn is(&self, what: impl Into<KindLike>) -> bool {
        match what.into() {
            KindLike::Kind(kind) => self.kind() == kind,
            KindLike::Category(category) => category.contains(self.kind()),
        }
    }

    /// Get the node's id attribute.
    pub fn id(&self) -> S::Id {
        match self {
            Self::Environment(it) => it.id.clone(),
            Self::Package(it) => it.id.clone(),
            Self::Class(it) => it.id.clone(),
            Self::Singleton(it) => it.id.clone(),
            Self::Mixin(it) => it.id.clone(),
            Self::Program(it) => it.id.clone(),
            Self::Describe(it) => it.id.clone(),
            Self::Test(it) => it.id.clone(),
            Self::Field(it) => it.id.clone(),
            Self::Method(it) => it.id.clone(),
            Self::Constructor(it) => it.id.clone(),
            Self::Parameter(it) => it.id.clone(),
            Self::Body(it) => it.id.clone(),
            Self::Catch(it) => it.id.clone(),
            Self::Reference(it) => it.id.clone(),
            Self::SelfExpr(it) => it.id.clone(),
            Self::Literal(it) => it.id.clone(),
            Self::Send(it) => it.id.clone(),
            Self::Super(it) => it.id.clone(),
            Self::New(it) => it.id.clone(),
            Self::If(it) => it.id.clone(),
            Self::Throw(it) => it.id.clone(),
            Self::Try(it) => it.id.clone(),
            Self::Variable(it) => it.id.clone(),
            Self::Return(it) => it.id.clone(),
            Self::Assignment(it) => it.id.clone(),
        }
    }

    /// Get the node's name, for the kinds that carry one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Package(it) => Some(it.name.as_str()),
            Self::Class(it) => Some(it.name.as_str()),
            Self::Singleton(it) => it.name.as_deref(),
            Self::Mixin(it) => Some(it.name.as_str()),
            Self::Program(it) => Some(it.name.as_str()),
            Self::Describe(it) => Some(it.name.as_str()),
            Self::Test(it) => Some(it.name.as_str()),
            Self::Field(it) => Some(it.name.as_str()),
            Self::Method(it) => Some(it.name.as_str()),
            Self::Parameter(it) => Some(it.name.as_str()),
            Self::Reference(it) => Some(it.name.as_str()),
            Self::Variable(it) => Some(it.name.as_str()),
            _ => None,
        }
    }

    /// The declared members of the node, for the kinds that hold some.
    pub fn members(&self) -> &[NodeRef<S>] {
        match self {
            Self::Environment(it) => it.members.as_slice(),
            Self::Package(it) => it.members.as_slice(),
            Self::Class(it) => it.members.as_slice(),
            Self::Singleton(it) => it.members.as_slice(),
            Self::Mixin(it) => it.members.as_slice(),
            Self::Describe(it) => it.members.as_slice(),
            _ => &[],
        }
    }

    /// The declared mixin references of the node, for modules.
    pub fn mixins(&self) -> &[NodeRef<S>] {
        match self {
            Self::Class(it) => it.mixins.as_slice(),
            Self::Singleton(it) => it.mixins.as_slice(),
            Self::Mixin(it) => it.mixins.as_slice(),
            _ => &[],
        }
    }

    /// The method members of the node.
    pub fn methods(&self) -> impl Iterator<Item = &NodeRef<S>> {
        self.members().iter().filter(|member| member.is(Kind::Method))
    }

    /// The field members of the node.
    pub fn fields(&self) -> impl Iterator<Item = &NodeRef<S>> {
        self.members().iter().filter(|member| member.is(Kind::Field))
    }

    /// The constructor members of the node.
    pub fn constructors(&self) -> impl Iterator<Item = &NodeRef<S>> {
        self.members()
            .iter()
            .filter(|member| member.is(Kind::Constructor))
    }

    /// The test members of the node.
    pub fn tests(&self) -> impl Iterator<Item = &NodeRef<S>> {
        self.members().iter().filter(|member| member.is(Kind::Test))
    }

    /// Downcast to a reference node.
    pub fn as_reference(&self) -> Option<&Reference<S>> {
        match self {
            Self::Reference(it) => Some(it),
            _ => None,
        }
    }

    /// Downcast to a method node.
    pub fn as_method(&self) -> Option<&Method<S>> {
        match self {
            Self::Method(it) => Some(it),
            _ => None,
        }
    }

    /// Downcast to a constructor node.
    pub fn as_constructor(&self) -> Option<&Constructor<S>> {
        match self {
            Self::Constructor(it) => Some(it),
            _ => None,
        }
    }

    /// Downcast to a parameter node.
    pub fn as_parameter(&self) -> Option<&Parameter<S>> {
        match self {
            Self::Parameter(it) => Some(it),
            _ => None,
        }
    }

    /// Downcast to a class node.
    pub fn as_class(&self) -> Option<&Class<S>> {
        match self {
            Self::Class(it) => Some(it),
            _ => None,
        }
    }

    /// Downcast to a singleton node.
    pub fn as_singleton(&self) -> Option<&Singleton<S>> {
        match self {
            Self::Singleton(it) => Some(it),
            _ => None,
        }
    }

    /// Downcast to a package node.
    pub fn as_package(&self) -> Option<&Package<S>> {
        match self {
            Self::Package(it) => Some(it),
            _ => None,
        }
    }
}

impl<S: Stage> Method<S> {
    /// Whether this method accepts a call with the given arity.
    ///
    /// A trailing varargs parameter absorbs any number of extra
    /// arguments, including zero.
    pub fn matches_arity(&self, arity: usize) -> bool {
        matches_arity(&self.parameters, arity)
    }
}

impl<S: Stage> Constructor<S> {
    /// Whether this constructor accepts a call with the given arity.
    pub fn matches_arity(&self, arity: usize) -> bool {
        matches_arity(&self.parameters, arity)
    }
}

fn matches_arity<S: Stage>(parameters: &[NodeRef<S>], arity: usize) -> bool {
    let count = parameters.len();
    let varargs = parameters
        .last()
        .and_then(|parameter| parameter.as_parameter())
        .map_or(false, |parameter| parameter.is_var_arg);
    (varargs && count - 1 <= arity) || count == arity
}

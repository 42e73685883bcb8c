//! The expression node type used to represent model equations.
//!
//! An [`Expr`] is a cheap-to-clone handle to an immutable, reference-counted [`Node`]. Cloning an
//! [`Expr`] never copies the tree; it only bumps a reference count, so the same subexpression can
//! be shared by any number of parent expressions (the tree is really a directed acyclic graph).
//! Nothing in this crate can mutate a node after it is constructed. Transformations, such as
//! parameter substitution, build new nodes and reuse unchanged subtrees.
//!
//! # Identity
//!
//! Every node carries an **id**, a hash of the node's kind, its payload (name, numeric value, or
//! operator), and the ids of its children. The id is computed once, when the node is built, and is
//! used to implement [`Hash`] and to quickly reject unequal expressions.
//!
//! The [`PartialEq`] and [`Eq`] implementations for [`Expr`] implement **structural equality**:
//! two expressions are equal if they have the same kind, the same payload, and equal children in
//! the same order. Object identity does not matter, so `Expr::parameter("a")` built twice gives two
//! equal expressions. Numeric values are compared by their bit patterns, which keeps equality
//! reflexive even for `NaN`.

mod iter;

use crate::{array::Matrix, op::{Associativity, BinOpKind, Precedence, UnaryOpKind}};
use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{Hash, Hasher},
    ops::{Add, Div, Mul, Neg, Sub},
    sync::Arc,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use iter::ExprIter;

/// A single node of an expression tree.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Node {
    /// A numeric constant, such as `2` or `8.314`.
    Scalar(f64),

    /// A constant column vector.
    Vector(Vec<f64>),

    /// A constant dense matrix.
    Matrix(Matrix),

    /// A named parameter whose value is looked up when the expression is processed.
    Parameter(String),

    /// A named value that is supplied when the model is solved. Processing passes it through
    /// unchanged.
    InputParameter(String),

    /// A state variable of the model, such as a concentration.
    Variable(String),

    /// An operator with one operand.
    Unary(UnaryOpKind, Expr),

    /// An operator with two operands, `[left, right]`.
    Binary(BinOpKind, [Expr; 2]),
}

/// The kind of a [`Node`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Scalar,
    Vector,
    Matrix,
    Parameter,
    InputParameter,
    Variable,
    Unary,
    Binary,
}

impl NodeKind {
    /// Returns the name of this kind, for use in messages.
    pub fn typename(&self) -> &'static str {
        match self {
            Self::Scalar => "Scalar",
            Self::Vector => "Vector",
            Self::Matrix => "Matrix",
            Self::Parameter => "Parameter",
            Self::InputParameter => "InputParameter",
            Self::Variable => "Variable",
            Self::Unary => "UnaryOperator",
            Self::Binary => "BinaryOperator",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.typename())
    }
}

impl Node {
    /// Returns the kind of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Scalar(_) => NodeKind::Scalar,
            Self::Vector(_) => NodeKind::Vector,
            Self::Matrix(_) => NodeKind::Matrix,
            Self::Parameter(_) => NodeKind::Parameter,
            Self::InputParameter(_) => NodeKind::InputParameter,
            Self::Variable(_) => NodeKind::Variable,
            Self::Unary(_, _) => NodeKind::Unary,
            Self::Binary(_, _) => NodeKind::Binary,
        }
    }

    /// Computes the structural id of this node from its kind, payload, and children's ids.
    fn structural_id(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.kind().hash(&mut hasher);
        match self {
            Self::Scalar(value) => value.to_bits().hash(&mut hasher),
            Self::Vector(values) => hash_floats(values, &mut hasher),
            Self::Matrix(matrix) => {
                matrix.shape().hash(&mut hasher);
                hash_floats(matrix.data(), &mut hasher);
            },
            Self::Parameter(name) | Self::InputParameter(name) | Self::Variable(name) => {
                name.hash(&mut hasher);
            },
            Self::Unary(op, operand) => {
                op.hash(&mut hasher);
                operand.id().hash(&mut hasher);
            },
            Self::Binary(op, [lhs, rhs]) => {
                op.hash(&mut hasher);
                lhs.id().hash(&mut hasher);
                rhs.id().hash(&mut hasher);
            },
        }
        hasher.finish()
    }
}

fn hash_floats(values: &[f64], hasher: &mut DefaultHasher) {
    values.len().hash(hasher);
    for value in values {
        value.to_bits().hash(hasher);
    }
}

fn floats_eq(lhs: &[f64], rhs: &[f64]) -> bool {
    lhs.len() == rhs.len()
        && lhs.iter().zip(rhs).all(|(l, r)| l.to_bits() == r.to_bits())
}

/// Checks if two nodes are **structurally** equal. See the [module-level documentation](self).
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(lhs), Self::Scalar(rhs)) => lhs.to_bits() == rhs.to_bits(),
            (Self::Vector(lhs), Self::Vector(rhs)) => floats_eq(lhs, rhs),
            (Self::Matrix(lhs), Self::Matrix(rhs)) => {
                lhs.shape() == rhs.shape() && floats_eq(lhs.data(), rhs.data())
            },
            (Self::Parameter(lhs), Self::Parameter(rhs))
                | (Self::InputParameter(lhs), Self::InputParameter(rhs))
                | (Self::Variable(lhs), Self::Variable(rhs)) => lhs == rhs,
            (Self::Unary(lhs_op, lhs), Self::Unary(rhs_op, rhs)) => lhs_op == rhs_op && lhs == rhs,
            (Self::Binary(lhs_op, lhs), Self::Binary(rhs_op, rhs)) => lhs_op == rhs_op && lhs == rhs,
            _ => false,
        }
    }
}

impl Eq for Node {}

#[derive(Debug)]
struct Inner {
    id: u64,
    node: Node,
}

/// Drops the subtrees owned only by this node with a worklist, so dropping a deep chain does not
/// overflow the stack.
impl Drop for Inner {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        take_children(&mut self.node, &mut stack);
        while let Some(expr) = stack.pop() {
            if let Ok(mut inner) = Arc::try_unwrap(expr.0) {
                take_children(&mut inner.node, &mut stack);
            }
        }
    }
}

/// Moves the children of the node onto the stack, leaving a leaf in its place.
fn take_children(node: &mut Node, stack: &mut Vec<Expr>) {
    match std::mem::replace(node, Node::Scalar(0.0)) {
        Node::Unary(_, operand) => stack.push(operand),
        Node::Binary(_, [lhs, rhs]) => stack.extend([lhs, rhs]),
        _ => {},
    }
}

/// A handle to an immutable, shared expression node.
///
/// For more information about this type, see the [module-level documentation](self).
///
/// Dropping an expression never recurses, but processing, formatting and comparing one recurse
/// once per level of nesting. Very deep trees (thousands of levels) need a larger thread stack.
#[derive(Clone)]
pub struct Expr(Arc<Inner>);

impl Expr {
    /// Creates an expression from the given node.
    pub fn new(node: Node) -> Self {
        let id = node.structural_id();
        Self(Arc::new(Inner { id, node }))
    }

    /// Creates a [`Node::Scalar`] expression.
    pub fn scalar(value: f64) -> Self {
        Self::new(Node::Scalar(value))
    }

    /// Creates a [`Node::Vector`] expression.
    pub fn vector(values: impl Into<Vec<f64>>) -> Self {
        Self::new(Node::Vector(values.into()))
    }

    /// Creates a [`Node::Matrix`] expression.
    pub fn matrix(matrix: Matrix) -> Self {
        Self::new(Node::Matrix(matrix))
    }

    /// Creates a [`Node::Parameter`] expression.
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::new(Node::Parameter(name.into()))
    }

    /// Creates a [`Node::InputParameter`] expression.
    pub fn input_parameter(name: impl Into<String>) -> Self {
        Self::new(Node::InputParameter(name.into()))
    }

    /// Creates a [`Node::Variable`] expression.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(Node::Variable(name.into()))
    }

    /// Creates a [`Node::Unary`] expression.
    pub fn unary(op: UnaryOpKind, operand: Expr) -> Self {
        Self::new(Node::Unary(op, operand))
    }

    /// Creates a [`Node::Binary`] expression.
    pub fn binary(op: BinOpKind, lhs: Expr, rhs: Expr) -> Self {
        Self::new(Node::Binary(op, [lhs, rhs]))
    }

    /// Returns the gradient of this expression, `grad(self)`.
    pub fn gradient(&self) -> Self {
        Self::unary(UnaryOpKind::Grad, self.clone())
    }

    /// Returns the divergence of this expression, `div(self)`.
    pub fn divergence(&self) -> Self {
        Self::unary(UnaryOpKind::Div, self.clone())
    }

    /// Returns the absolute value of this expression, `abs(self)`.
    pub fn abs(&self) -> Self {
        Self::unary(UnaryOpKind::Abs, self.clone())
    }

    /// Returns this expression raised to the given power.
    pub fn pow(&self, exp: impl Into<Expr>) -> Self {
        Self::binary(BinOpKind::Pow, self.clone(), exp.into())
    }

    /// Returns the structural id of this expression.
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Returns the node this expression points to.
    pub fn node(&self) -> &Node {
        &self.0.node
    }

    /// Returns the kind of the node this expression points to.
    pub fn kind(&self) -> NodeKind {
        self.node().kind()
    }

    /// Returns the children of this expression, in order. Leaves have no children, unary
    /// operators have one, and binary operators have two (left, then right).
    pub fn children(&self) -> &[Expr] {
        match self.node() {
            Node::Unary(_, operand) => std::slice::from_ref(operand),
            Node::Binary(_, children) => children,
            _ => &[],
        }
    }

    /// Returns true if both handles point to the same node in memory.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// If the expression is a parameter, input parameter, or variable, returns its name.
    pub fn name(&self) -> Option<&str> {
        match self.node() {
            Node::Parameter(name) | Node::InputParameter(name) | Node::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// If the expression is a [`Node::Scalar`], returns its value.
    pub fn as_scalar(&self) -> Option<f64> {
        match self.node() {
            Node::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    /// If the expression is a [`Node::Vector`], returns its entries.
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self.node() {
            Node::Vector(values) => Some(values),
            _ => None,
        }
    }

    /// If the expression is a [`Node::Matrix`], returns the matrix.
    pub fn as_matrix(&self) -> Option<&Matrix> {
        match self.node() {
            Node::Matrix(matrix) => Some(matrix),
            _ => None,
        }
    }

    /// Returns true if the expression is a [`Node::Parameter`].
    pub fn is_parameter(&self) -> bool {
        matches!(self.node(), Node::Parameter(_))
    }

    /// Returns an iterator that traverses the tree of expressions in left-to-right post-order
    /// (i.e. depth-first). Shared subexpressions are visited once per occurrence.
    pub fn post_order_iter(&self) -> ExprIter<'_> {
        ExprIter::new(self)
    }

    /// Returns the names of all parameters in this expression, in the order they are first
    /// visited, without duplicates.
    pub fn parameters(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for expr in self.post_order_iter() {
            if let Node::Parameter(name) = expr.node() {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
        }
        names
    }

    /// Returns true if any node in this expression is a [`Node::Parameter`].
    pub fn has_parameters(&self) -> bool {
        self.post_order_iter().any(Expr::is_parameter)
    }

    /// Returns the precedence of the expression, used to decide where parentheses are needed.
    fn precedence(&self) -> Precedence {
        match self.node() {
            Node::Unary(op, _) => op.precedence(),
            Node::Binary(op, _) => op.precedence(),
            Node::Scalar(value) if value.is_sign_negative() => Precedence::Neg,
            _ => Precedence::Atom,
        }
    }

    /// Writes this expression, wrapped in parentheses if `paren` is true.
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, paren: bool) -> fmt::Result {
        if paren {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.id() == other.id() && self.node() == other.node())
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.node(), f)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Scalar(value) => write!(f, "{}", value),
            Node::Vector(values) => {
                write!(f, "[")?;
                let mut iter = values.iter();
                if let Some(value) = iter.next() {
                    write!(f, "{}", value)?;
                    for value in iter {
                        write!(f, ", {}", value)?;
                    }
                }
                write!(f, "]")
            },
            Node::Matrix(matrix) => write!(f, "Matrix({}x{})", matrix.rows(), matrix.cols()),
            Node::Parameter(name) | Node::InputParameter(name) | Node::Variable(name) => {
                write!(f, "{}", name)
            },
            Node::Unary(UnaryOpKind::Neg, operand) => {
                write!(f, "-")?;
                operand.fmt_operand(f, operand.precedence() <= Precedence::Neg)
            },
            Node::Unary(op, operand) => write!(f, "{}({})", op.name(), operand),
            Node::Binary(op, [lhs, rhs]) => {
                let precedence = op.precedence();
                let (paren_lhs, paren_rhs) = match op.associativity() {
                    Associativity::Left => (lhs.precedence() < precedence, rhs.precedence() <= precedence),
                    Associativity::Right => (lhs.precedence() <= precedence, rhs.precedence() < precedence),
                };
                lhs.fmt_operand(f, paren_lhs)?;
                write!(f, " {} ", op.symbol())?;
                rhs.fmt_operand(f, paren_rhs)
            },
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::scalar(value)
    }
}

impl From<Matrix> for Expr {
    fn from(matrix: Matrix) -> Self {
        Self::matrix(matrix)
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

/// Implements a binary operator trait for all combinations of owned / borrowed [`Expr`]s, and for
/// [`Expr`]s mixed with `f64`s. No simplification is done; the result is always a new
/// [`Node::Binary`] node.
macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $kind:expr) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($kind, self, rhs)
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($kind, self, rhs.clone())
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($kind, self.clone(), rhs)
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($kind, self.clone(), rhs.clone())
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;

            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($kind, self, Expr::scalar(rhs))
            }
        }

        impl $trait<f64> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($kind, self.clone(), Expr::scalar(rhs))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($kind, Expr::scalar(self), rhs)
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($kind, Expr::scalar(self), rhs.clone())
            }
        }
    };
}

impl_binary_op!(Add, add, BinOpKind::Add);
impl_binary_op!(Sub, sub, BinOpKind::Sub);
impl_binary_op!(Mul, mul, BinOpKind::Mul);
impl_binary_op!(Div, div, BinOpKind::Div);

/// Negates this expression. No simplification is done, even for numeric operands.
impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOpKind::Neg, self)
    }
}

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOpKind::Neg, self.clone())
    }
}

#[cfg(feature = "serde")]
impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.node().serialize(serializer)
    }
}

/// The id is not serialized; it is recomputed when the node is rebuilt.
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Node::deserialize(deserializer).map(Expr::new)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use super::*;

    #[test]
    fn structural_equality() {
        let a = Expr::parameter("a") + Expr::variable("c").gradient();
        let b = Expr::parameter("a") + Expr::variable("c").gradient();
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn order_matters() {
        let a = Expr::parameter("a");
        let b = Expr::parameter("b");
        assert_ne!(&a - &b, &b - &a);
        assert_ne!(&a + &b, &b + &a);
    }

    #[test]
    fn kinds_are_distinct() {
        // same name, different kinds
        assert_ne!(Expr::parameter("x"), Expr::variable("x"));
        assert_ne!(Expr::parameter("x"), Expr::input_parameter("x"));
        assert_ne!(Expr::vector(vec![1.0]), Expr::scalar(1.0));
    }

    #[test]
    fn nan_is_reflexive() {
        let nan = Expr::scalar(f64::NAN);
        assert_eq!(nan, Expr::scalar(f64::NAN));
    }

    #[test]
    fn hash_set_dedup() {
        let set = [
            Expr::variable("c"),
            Expr::variable("c"),
            Expr::variable("d"),
        ].into_iter().collect::<HashSet<_>>();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn children_in_order() {
        let a = Expr::parameter("a");
        let b = Expr::parameter("b");
        let sum = &a + &b;
        assert_eq!(sum.kind(), NodeKind::Binary);
        assert_eq!(sum.children(), &[a.clone(), b][..]);

        let grad = a.gradient();
        assert_eq!(grad.kind(), NodeKind::Unary);
        assert_eq!(grad.children(), &[a][..]);

        assert!(Expr::scalar(3.0).children().is_empty());
    }

    #[test]
    fn mixed_with_numbers() {
        let expr = 2.0 * Expr::variable("c") - 1.0;
        assert_eq!(expr, Expr::binary(
            BinOpKind::Sub,
            Expr::binary(BinOpKind::Mul, Expr::scalar(2.0), Expr::variable("c")),
            Expr::scalar(1.0),
        ));
    }

    #[test]
    fn parameters_in_first_visit_order() {
        let a = Expr::parameter("a");
        let b = Expr::parameter("b");
        let expr = (&b * Expr::variable("c").gradient() + &a).divergence() * &b;
        assert_eq!(expr.parameters(), vec!["b", "a"]);
        assert!(expr.has_parameters());
        assert!(!Expr::variable("c").gradient().has_parameters());
    }

    #[test]
    fn fmt_precedence() {
        let a = Expr::parameter("a");
        let b = Expr::parameter("b");
        let c = Expr::variable("c");
        assert_eq!((&a + &b * &c).to_string(), "a + b * c");
        assert_eq!(((&a + &b) * &c).to_string(), "(a + b) * c");
        assert_eq!((&a - &b - &c).to_string(), "a - b - c");
        assert_eq!((&a - (&b - &c)).to_string(), "a - (b - c)");
        assert_eq!(a.pow(&b).pow(2.0).to_string(), "(a ^ b) ^ 2");
        assert_eq!(a.pow(b.pow(2.0)).to_string(), "a ^ b ^ 2");
        assert_eq!((-(&a + &b)).to_string(), "-(a + b)");
        assert_eq!((&a * c.gradient()).to_string(), "a * grad(c)");
        assert_eq!((&a * -1.0).to_string(), "a * -1");
    }

    #[test]
    fn fmt_arrays() {
        assert_eq!(Expr::vector(vec![1.0, 0.5, 2.0]).to_string(), "[1, 0.5, 2]");
        assert_eq!(Expr::matrix(Matrix::filled(5, 6, 1.0)).to_string(), "Matrix(5x6)");
    }

    #[test]
    fn drop_deep_chain() {
        let mut expr = Expr::parameter("a");
        for _ in 0..100_000 {
            expr = expr + 1.0;
        }
        drop(expr);
    }

    #[test]
    fn drop_keeps_shared_subtrees() {
        let shared = Expr::parameter("a") * Expr::variable("c");
        let parent = &shared + &shared;
        let copy = parent.children()[0].clone();
        drop(parent);
        assert_eq!(copy, shared);
        assert_eq!(copy.to_string(), "a * c");
        assert_eq!(shared.children()[1], Expr::variable("c"));
    }
}

//! The expression AST: a sum-of-products query tree.
//!
//! Smart constructors wrap their arguments as given and never simplify —
//! flattening (`none`-as-identity, singleton unwrapping) is the resolvers'
//! job (`vast-resolve`), not the AST's. A fresh [`Expr`] is exactly the
//! shape its constructor was called with.

use serde::{Deserialize, Serialize};

use vast_types::{Data, Offset, Type};

/// A leaf reference on either side of a [`Predicate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Extractor {
    /// An unresolved symbolic reference, e.g. `id.orig_h` as
    /// `["id", "orig_h"]`.
    Schema { key: Vec<String> },
    /// "Any field of this type within the event."
    Type(Type),
    /// A resolved, concrete reference: a type and the offset within it.
    Data { ty: Type, offset: Offset },
}

/// Either side of a [`Predicate`]: a leaf extractor or a literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Extractor(Extractor),
    Data(Data),
}

impl Operand {
    pub fn schema(key: Vec<String>) -> Self {
        Operand::Extractor(Extractor::Schema { key })
    }

    pub fn of_type(ty: Type) -> Self {
        Operand::Extractor(Extractor::Type(ty))
    }

    pub fn resolved(ty: Type, offset: Offset) -> Self {
        Operand::Extractor(Extractor::Data { ty, offset })
    }

    pub fn data(data: Data) -> Self {
        Operand::Data(data)
    }

    pub fn as_extractor(&self) -> Option<&Extractor> {
        match self {
            Operand::Extractor(e) => Some(e),
            Operand::Data(_) => None,
        }
    }

    pub fn as_data(&self) -> Option<&Data> {
        match self {
            Operand::Data(d) => Some(d),
            Operand::Extractor(_) => None,
        }
    }
}

/// Relational operators a [`Predicate`] may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Regex match (`~`).
    Match,
    /// Regex non-match (`!~`).
    NotMatch,
    /// Set membership (`∈`).
    In,
    /// Set non-membership (`∉`).
    NotIn,
}

/// A single relational comparison between two operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub lhs: Operand,
    pub op: RelOp,
    pub rhs: Operand,
}

/// A node in the query tree.
///
/// `None` is the absorbing/identity element flattening produces: absorbing
/// for conjunction (any `None` operand collapses the whole conjunction),
/// identity for disjunction (a `None` disjunct is simply dropped). See
/// `vast-resolve` for where that flattening actually happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    None,
    Conjunction(Vec<Expr>),
    Disjunction(Vec<Expr>),
    Negation(Box<Expr>),
    Predicate(Predicate),
}

impl Expr {
    pub fn none() -> Self {
        Expr::None
    }

    pub fn conjunction(operands: Vec<Expr>) -> Self {
        Expr::Conjunction(operands)
    }

    pub fn disjunction(operands: Vec<Expr>) -> Self {
        Expr::Disjunction(operands)
    }

    pub fn negation(inner: Expr) -> Self {
        Expr::Negation(Box::new(inner))
    }

    pub fn predicate(lhs: Operand, op: RelOp, rhs: Operand) -> Self {
        Expr::Predicate(Predicate { lhs, op, rhs })
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Expr::None)
    }
}

use std::fmt;

use crate::{
    symbol::{FieldName, Fqn, Var},
    ty::Type,
};

/// An assignable location: the left-hand side of an [`crate::stmt::Stmt::Assign`].
///
/// Every non-trivial subexpression has already been hoisted into a temporary by the lowering
/// (§4.1), so an `LValue` only ever addresses a single step of indirection — there is no
/// `a.b.c = x`, only `t = a.b; t.c = x`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LValue {
    Var(Var),
    Field { base: Var, field: FieldName },
    StaticField(Fqn),
    ArrayElem { base: Var, index: Var },
    /// `base[key] = value` for map-typed collections the frontend chooses to model structurally
    /// rather than via a model call.
    MapEntry { base: Var, key: Var },
}

impl fmt::Display for LValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LValue::Var(v) => write!(f, "{v}"),
            LValue::Field { base, field } => write!(f, "{base}.{field}"),
            LValue::StaticField(fqn) => write!(f, "{fqn}"),
            LValue::ArrayElem { base, index } => write!(f, "{base}[{index}]"),
            LValue::MapEntry { base, key } => write!(f, "{base}{{{key}}}"),
        }
    }
}

/// An operand to a [`Condition`]: either a materialized temporary/variable, or a literal used
/// in place (e.g. the implicit `0` in a boolean test `if t != 0 goto ...`).
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Var(Var),
    Literal(Literal),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Var(v) => write!(f, "{v}"),
            Operand::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

/// A relational comparison, as embedded in [`crate::stmt::Stmt::If`].
///
/// Jimple-style IRs (which this one follows) embed the comparison directly in the branch rather
/// than materializing a boolean first — `if t1 == t2 goto L` rather than `t3 := t1 == t2; if t3
/// != 0 goto L`. When a relational expression is used as a *value* rather than a branch condition
/// (§8 scenario 5), the lowering still goes through exactly this form, just followed by the
/// `t := 0 / goto / L: t := 1` boilerplate that materializes the boolean.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub op: RelOp,
    pub lhs: Operand,
    pub rhs: Operand,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelOp::Eq => "==",
            RelOp::Ne => "!=",
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// The right-hand side of an [`crate::stmt::Stmt::Assign`].
///
/// Like [`LValue`], every operand is already a `Var` — the lowering never nests expressions here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rhs {
    Var(Var),
    Field { base: Var, field: FieldName },
    StaticField(Fqn),
    ArrayElem { base: Var, index: Var },
    MapEntry { base: Var, key: Var },
    /// `new T`, or `new T[dims...]` when `dims` is non-empty.
    New { ty: Type, dims: Vec<Var> },
    Cast { ty: Type, value: Var },
    InstanceOf { value: Var, ty: Type },
    Binary { op: ArithOp, lhs: Var, rhs: Var },
    Unary { op: UnaryOp, value: Var },
    Literal(Literal),
    /// The value bound to a `catch` handler's exception parameter at handler entry.
    ///
    /// Modeled as its own `Rhs` variant (rather than, say, a literal placeholder) so the
    /// reaching-facts transfer (§4.2) can treat it like an incoming parameter: a fresh abstract
    /// instance of the declared exception type.
    CaughtException,
}

impl fmt::Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rhs::Var(v) => write!(f, "{v}"),
            Rhs::Field { base, field } => write!(f, "{base}.{field}"),
            Rhs::StaticField(fqn) => write!(f, "{fqn}"),
            Rhs::ArrayElem { base, index } => write!(f, "{base}[{index}]"),
            Rhs::MapEntry { base, key } => write!(f, "{base}{{{key}}}"),
            Rhs::New { ty, dims } => {
                write!(f, "new {ty}")?;
                for dim in dims {
                    write!(f, "[{dim}]")?;
                }
                Ok(())
            }
            Rhs::Cast { ty, value } => write!(f, "({ty}) {value}"),
            Rhs::InstanceOf { value, ty } => write!(f, "{value} instanceof {ty}"),
            Rhs::Binary { op, lhs, rhs } => write!(f, "{lhs} {op} {rhs}"),
            Rhs::Unary { op, value } => write!(f, "{op}{value}"),
            Rhs::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    And,
    Or,
    Xor,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
            ArithOp::Shl => "<<",
            ArithOp::Shr => ">>",
            ArithOp::UShr => ">>>",
            ArithOp::And => "&",
            ArithOp::Or => "|",
            ArithOp::Xor => "^",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    BitNot,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Neg => "-",
            UnaryOp::BitNot => "~",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Null,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::Bool(v) => write!(f, "{v}"),
            Literal::String(v) => write!(f, "{v:?}"),
            Literal::Null => f.write_str("null"),
        }
    }
}

impl Eq for Literal {}
impl std::hash::Hash for Literal {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Literal::Int(v) => v.hash(state),
            Literal::Float(v) => v.to_bits().hash(state),
            Literal::Bool(v) => v.hash(state),
            Literal::String(v) => v.hash(state),
            Literal::Null => {}
        }
    }
}

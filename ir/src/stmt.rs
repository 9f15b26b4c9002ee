use std::fmt;

use smallvec::SmallVec;

use crate::{
    expr::{Condition, LValue, Rhs},
    symbol::{Label, MethodSignature, Var},
};

/// How a call statement's target method is dispatched.
///
/// Determined during lowering by the receiver form and the callee's declaring-class modifiers
/// (§4.1): an invocation on an interface-typed receiver is `Interface`, a `super.foo()` call is
/// `Super`, a constructor or private-method call is `Direct`, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Virtual,
    Interface,
    Direct,
    Super,
    Static,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CallKind::Virtual => "virtual",
            CallKind::Interface => "interface",
            CallKind::Direct => "direct",
            CallKind::Super => "super",
            CallKind::Static => "static",
        };
        f.write_str(s)
    }
}

/// A call statement, carrying the two mandatory annotations the lowering attaches to every call
/// (§4.1): `signature` and `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallStmt {
    pub result: Option<Var>,
    pub receiver: Option<Var>,
    pub args: SmallVec<[Var; 4]>,
    pub signature: MethodSignature,
    pub kind: CallKind,
}

impl fmt::Display for CallStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = &self.result {
            write!(f, "{result} := ")?;
        }
        if let Some(receiver) = &self.receiver {
            write!(f, "{receiver}.")?;
        }
        write!(f, "call(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ") @signature `{}` @kind {}", self.signature, self.kind)
    }
}

/// Whether a `return` yields an object-typed value, a primitive, or nothing.
///
/// Mirrors the `@kind object` / `@kind void` textual annotation from §6; `Primitive` returns are
/// never serialized with a `@kind` annotation of their own since they carry no points-to facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    Void,
    Object,
    Primitive,
}

/// A single three-address statement.
///
/// Every statement kind here is the output of IR lowering (§4.1) and the sole input to the
/// reaching-facts transfer functions (§4.2) — there is deliberately no "complex" statement form;
/// anything more elaborate than these six shapes has already been decomposed.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { lhs: LValue, rhs: Rhs },
    Call(CallStmt),
    /// `if <condition> goto target` — the only conditional branch form.
    If { cond: Condition, target: Label },
    Goto(Label),
    Return { value: Option<Var>, kind: ReturnKind },
    Throw(Var),
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assign { lhs, rhs } => write!(f, "{lhs} := {rhs}"),
            Stmt::Call(call) => write!(f, "{call}"),
            Stmt::If { cond, target } => write!(f, "if {cond} goto {target}"),
            Stmt::Goto(target) => write!(f, "goto {target}"),
            Stmt::Return { value: Some(v), kind } => write!(f, "return {v} @kind {}", return_kind_str(*kind)),
            Stmt::Return { value: None, kind } => write!(f, "return @kind {}", return_kind_str(*kind)),
            Stmt::Throw(v) => write!(f, "throw {v}"),
        }
    }
}

fn return_kind_str(kind: ReturnKind) -> &'static str {
    match kind {
        ReturnKind::Void => "void",
        ReturnKind::Object => "object",
        ReturnKind::Primitive => "primitive",
    }
}

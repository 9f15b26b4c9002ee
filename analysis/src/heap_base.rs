//! The symbolic heap access-path algebra (§3): `root · accessList`.

use std::fmt;

use sa_ir::symbol::{FieldName, Fqn, Var};

/// The symbolic root of a [`HeapBase`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Root {
    This,
    Arg(u32),
    Global(Fqn),
    Ret,
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Root::This => write!(f, "This"),
            Root::Arg(i) => write!(f, "Arg({i})"),
            Root::Global(fqn) => write!(f, "Global({fqn})"),
            Root::Ret => write!(f, "Ret"),
        }
    }
}

/// One step of indirection appended to a [`HeapBase`]'s access list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Access {
    Field(FieldName),
    Array,
    /// `MapAcc(keyRhs?)`: `None` when the key is not statically known, which the call resolver and
    /// rule-extraction walk treat as "all related heap instances" rather than a precise key (§9,
    /// `SuMapAccess`'s key-less over-approximation).
    Map(Option<Var>),
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Field(name) => write!(f, ".{name}"),
            Access::Array => write!(f, "[]"),
            Access::Map(Some(key)) => write!(f, "{{{key}}}"),
            Access::Map(None) => write!(f, "{{*}}"),
        }
    }
}

/// A symbolic access path: a root plus an ordered sequence of accesses.
///
/// Composition (`make`) always appends to the access list and always preserves the root —
/// the invariant §3 calls out explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeapBase {
    pub root: Root,
    pub access: Vec<Access>,
}

impl HeapBase {
    pub fn new(root: Root) -> Self {
        Self { root, access: Vec::new() }
    }

    /// Append `suffix`, returning a new path. Associative: `a.make(b).make(c) == a.make(b+c)`
    /// when composed path-wise, and the root is never touched.
    pub fn make(&self, suffix: Access) -> HeapBase {
        let mut access = self.access.clone();
        access.push(suffix);
        HeapBase {
            root: self.root.clone(),
            access,
        }
    }
}

impl fmt::Display for HeapBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for step in &self.access {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_appends_without_touching_the_root() {
        let base = HeapBase::new(Root::Arg(0));
        let one_step = base.make(Access::Field("next".into()));
        let two_steps = one_step.make(Access::Field("value".into()));
        assert_eq!(two_steps.root, Root::Arg(0));
        assert_eq!(two_steps.access.len(), 2);
        // `make` never mutates its receiver.
        assert!(base.access.is_empty());
    }

    #[test]
    fn make_is_associative_with_incremental_composition() {
        let a = HeapBase::new(Root::This).make(Access::Field("a".into()));
        let via_two_calls = a.make(Access::Field("b".into())).make(Access::Array);
        let via_one_call = a.make(Access::Field("b".into()));
        let via_one_call = via_one_call.make(Access::Array);
        assert_eq!(via_two_calls, via_one_call);
    }

    #[test]
    fn display_renders_root_then_access_steps() {
        let base = HeapBase::new(Root::Arg(1)).make(Access::Field("f".into())).make(Access::Array);
        assert_eq!(base.to_string(), "Arg(1).f[]");
    }
}

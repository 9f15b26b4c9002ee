use std::{fmt, sync::Arc};

/// A cheaply-clonable interned-looking string.
///
/// This intentionally does *not* intern into a global table — the Design Notes for this engine
/// call out the original's `Context.init_context_length(0)` global as a mistake to avoid, and the
/// same principle applies here: every [`Name`] is an independent `Arc<str>`, so two work-units
/// analyzed on different threads never contend on a shared table.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Arc<str>);

impl Name {
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl std::borrow::Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A local variable or temporary name within a single method body.
///
/// Kept distinct from [`Name`] only for readability at use sites; the representation is identical.
pub type Var = Name;

/// A field name, unqualified (the declaring class is recovered from the instance's type, which is
/// external knowledge this crate does not resolve).
pub type FieldName = Name;

/// A fully-qualified name for a static field or other global slot, e.g. `java.lang.System.out`.
pub type Fqn = Name;

/// A method signature, e.g. `Lcom/example/Box;.set:(Ljava/lang/Object;)V`.
///
/// Opaque to this crate: signatures are produced and resolved by the external `Global`
/// interface (class loading and symbol resolution are out of scope, per §1).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodSignature(Arc<str>);

impl MethodSignature {
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl From<&str> for MethodSignature {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MethodSignature {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A label identifying a branch target: either synthesized by the lowering (`Do_start_0`,
/// `While_end_3`, ...) or carried over from a user-declared statement label.
pub type Label = Name;

use std::fmt;

use crate::{stmt::Stmt, symbol::Label, ty::Type};

/// A dense index into a [`crate::method::MethodBody::locations`] vector.
///
/// This is the identity used by [`crate::method::MethodBody`] consumers (the ICFG, the heap map's
/// `DefSite`, summary rule allocation sites) to refer to a program point without holding a
/// reference into the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationId(pub u32);

impl LocationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// One element of a lowered method body: either a label definition (a branch target with no
/// effect on the dataflow state) or a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationKind {
    Label(Label),
    Stmt(Stmt),
}

/// A single program point in the lowered IR.
///
/// `display_index` is the `lineCount + labelCount` value described in §4.1: the two counters
/// advance independently as statements and labels are emitted, and the sum is what gets printed
/// per the `#L<NNN>.` convention in §6. It is purely a presentation detail; `id` is the identity
/// used internally.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub display_index: u32,
    pub kind: LocationKind,
}

impl Location {
    pub fn label(&self) -> Option<&Label> {
        match &self.kind {
            LocationKind::Label(label) => Some(label),
            LocationKind::Stmt(_) => None,
        }
    }

    pub fn stmt(&self) -> Option<&Stmt> {
        match &self.kind {
            LocationKind::Stmt(stmt) => Some(stmt),
            LocationKind::Label(_) => None,
        }
    }
}

/// A `try`/`catch` protected range, recorded alongside the lowered body per the §4.1 contract
/// ("produce ... plus a list of catch clauses").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatchClause {
    /// First protected location, inclusive.
    pub start: LocationId,
    /// First unprotected location after the range, exclusive.
    pub end: LocationId,
    /// Entry point of the handler.
    pub handler: LocationId,
    pub exception_type: Type,
}

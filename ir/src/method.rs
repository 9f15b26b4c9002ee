use rustc_hash::FxHashMap;

use crate::{
    location::{CatchClause, Location, LocationId},
    symbol::{MethodSignature, Name, Var},
    ty::Type,
};

/// A lowered method body: the output of [`crate::lowering::lower_method`] and the sole input the
/// summary engine's work-units (HS-WU, PT-WU) consume.
#[derive(Debug, Clone)]
pub struct MethodBody {
    pub signature: MethodSignature,
    /// Ordered `(name, type)` pairs, matching [`crate::lowering::LowerInput::params`].
    pub params: Vec<(Name, Type)>,
    /// `Some(type)` for instance methods, `None` for static methods.
    pub this_type: Option<Type>,
    pub return_type: Type,
    /// Every local variable and temporary ever declared in this body, keyed by its final
    /// (post-shadow-reconciliation) name.
    pub locals: FxHashMap<Name, Type>,
    pub locations: Vec<Location>,
    pub catches: Vec<CatchClause>,
}

impl MethodBody {
    pub fn location(&self, id: LocationId) -> &Location {
        &self.locations[id.index()]
    }

    pub fn entry(&self) -> LocationId {
        LocationId(0)
    }

    pub fn type_of(&self, var: &Var) -> Option<&Type> {
        self.locals.get(var)
    }

    /// Index of `target` among `self.locations`, by label. Panics if `target` does not name a
    /// location in this body — an unresolved branch target is an internal invariant violation
    /// (§4.7), not a recoverable condition.
    pub fn resolve_label(&self, target: &crate::symbol::Label) -> LocationId {
        self.locations
            .iter()
            .find(|loc| loc.label() == Some(target))
            .map(|loc| loc.id)
            .unwrap_or_else(|| panic!("unresolved branch target `{target}`: lowering produced a dangling label"))
    }
}

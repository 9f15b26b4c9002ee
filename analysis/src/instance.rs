//! Abstract instances: allocation-site-keyed symbolic objects (§3).

use sa_ir::{location::LocationId, symbol::MethodSignature, ty::Type};

use crate::heap_base::Access;

/// Where an [`Instance`] was conceptually "created".
///
/// Allocation sites are the natural case (`new T` at some location in some method), but the
/// reaching-facts transfer also synthesizes instances at method entry (for `this` and object-typed
/// parameters) and at call sites (the unknown-object fallback, §4.4). Each gets its own variant so
/// two instances compare equal only when they denote the same conceptual origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefSite {
    Alloc {
        signature: MethodSignature,
        location: LocationId,
    },
    EntryThis {
        signature: MethodSignature,
    },
    EntryParam {
        signature: MethodSignature,
        index: u32,
    },
    /// Synthesized by the unknown-object fallback at a call site. `ordinal` distinguishes the
    /// several instances a single call can synthesize (the return value, plus one per clobbered
    /// reachable field).
    Synthetic {
        signature: MethodSignature,
        location: LocationId,
        ordinal: u32,
    },
    /// A value read off an `unknown` instance's field/array/map access that this method's own
    /// dataflow never saw written (§4.2's initial-facts rule extended one step: an opaque object's
    /// field is itself opaque). Keyed structurally by the base instance and the access step, so
    /// re-deriving the same read at a later fixpoint iteration — or from an unrelated statement —
    /// converges on the same instance instead of growing the lattice without bound.
    UnknownAccess {
        base: Box<Instance>,
        access: Access,
    },
}

/// `(type, defSite, unknown?)` — see §3. Two instances are equal iff the triple matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instance {
    pub ty: Type,
    pub def_site: DefSite,
    /// Marks a value whose allocation is outside the analyzed scope: an incoming non-`String`
    /// reference parameter, or a value synthesized by the unknown-object fallback.
    pub unknown: bool,
}

impl Instance {
    pub fn new(ty: Type, def_site: DefSite, unknown: bool) -> Self {
        Self { ty, def_site, unknown }
    }

    /// The value an unconstrained read of `access` off `base` (itself `unknown`) produces.
    /// Field-layout information isn't available to this crate, so the synthesized value's static
    /// type is left as the generic reference type — it's the identity, not the type, that matters
    /// for points-to purposes.
    pub fn unknown_access(base: Instance, access: Access) -> Self {
        Self {
            ty: Type::reference("java.lang.Object"),
            def_site: DefSite::UnknownAccess { base: Box::new(base), access },
            unknown: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(signature: &str, index: u32) -> Instance {
        Instance::new(
            Type::reference("java.lang.Object"),
            DefSite::EntryParam { signature: signature.into(), index },
            true,
        )
    }

    #[test]
    fn unknown_access_is_always_itself_unknown() {
        let base = param("Lscratch;.m:()V", 0);
        let derived = Instance::unknown_access(base, Access::Field("f".into()));
        assert!(derived.unknown);
    }

    #[test]
    fn unknown_access_reads_of_the_same_base_and_step_converge() {
        let first = Instance::unknown_access(param("Lscratch;.m:()V", 0), Access::Field("f".into()));
        let second = Instance::unknown_access(param("Lscratch;.m:()V", 0), Access::Field("f".into()));
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_access_through_a_different_step_is_a_distinct_instance() {
        let first = Instance::unknown_access(param("Lscratch;.m:()V", 0), Access::Field("f".into()));
        let second = Instance::unknown_access(param("Lscratch;.m:()V", 0), Access::Field("g".into()));
        assert_ne!(first, second);
    }
}

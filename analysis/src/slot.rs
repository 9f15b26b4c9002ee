//! Slots: the keys of the points-to table (§3).

use sa_ir::symbol::{FieldName, Fqn, Var};

use crate::instance::Instance;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Var(Var),
    Field(Instance, FieldName),
    StaticField(Fqn),
    Array(Instance),
    /// `Map(base, key)`. `key = None` represents an unresolved or absent key and is treated as
    /// "any key" — `SuMapAccess`'s key-less over-approximation (§9) collapses to this the moment a
    /// map is accessed without a statically known key instance.
    Map(Instance, Option<Instance>),
}

impl Slot {
    /// Whether `self` could alias `other` under the key-less over-approximation: identical except
    /// that one or both `Map` keys are `None`.
    pub fn may_alias(&self, other: &Slot) -> bool {
        match (self, other) {
            (Slot::Map(b1, k1), Slot::Map(b2, k2)) => {
                b1 == b2 && (k1.is_none() || k2.is_none() || k1 == k2)
            }
            _ => self == other,
        }
    }
}

#[cfg(test)]
mod tests {
    use sa_ir::location::LocationId;

    use super::*;
    use crate::instance::DefSite;

    fn instance() -> Instance {
        Instance::new(
            sa_ir::ty::Type::reference("scratch.Node"),
            DefSite::Alloc { signature: "Lscratch;.m:()V".into(), location: LocationId(0) },
            false,
        )
    }

    fn keyed(key: u32) -> Instance {
        Instance::new(
            sa_ir::ty::Type::reference("scratch.Key"),
            DefSite::Alloc { signature: "Lscratch;.m:()V".into(), location: LocationId(key) },
            false,
        )
    }

    #[test]
    fn key_less_map_slot_aliases_any_key() {
        let base = instance();
        let any = Slot::Map(base.clone(), None);
        let specific = Slot::Map(base, Some(keyed(1)));
        assert!(any.may_alias(&specific));
        assert!(specific.may_alias(&any));
    }

    #[test]
    fn distinct_keyed_map_slots_do_not_alias() {
        let base = instance();
        let a = Slot::Map(base.clone(), Some(keyed(1)));
        let b = Slot::Map(base, Some(keyed(2)));
        assert!(!a.may_alias(&b));
    }

    #[test]
    fn non_map_slots_fall_back_to_equality() {
        let a = Slot::Field(instance(), "f".into());
        let b = Slot::Field(instance(), "f".into());
        assert!(a.may_alias(&b));
        assert!(!a.may_alias(&Slot::Field(instance(), "g".into())));
    }
}

//! Reaching-facts and the `2^RFAFact` lattice (§4.2).
//!
//! The lattice here is concrete — a plain set with union as join — rather than going through the
//! teacher's generic `LatticeLike`/`DataFlowSolver` machinery (type-erased analysis states, unsafe
//! pointer bookkeeping): that machinery exists to let many independent, mutually-dependent
//! analyses share one solver, which this engine does not need. One dataflow, one join. See
//! DESIGN.md.

use rustc_hash::FxHashSet;

use crate::{instance::Instance, slot::Slot};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RFAFact {
    pub slot: Slot,
    pub instance: Instance,
}

impl RFAFact {
    pub fn new(slot: Slot, instance: Instance) -> Self {
        Self { slot, instance }
    }
}

/// The dataflow value at one program point: bottom is the empty set, join is union.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactSet(FxHashSet<RFAFact>);

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fact: RFAFact) -> bool {
        self.0.insert(fact)
    }

    pub fn contains(&self, fact: &RFAFact) -> bool {
        self.0.contains(fact)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RFAFact> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every instance currently bound to `slot`, or to a slot the key-less map over-approximation
    /// (§9) treats as an alias of it.
    pub fn instances_of<'a>(&'a self, slot: &'a Slot) -> impl Iterator<Item = &'a Instance> + 'a {
        self.0.iter().filter(move |f| f.slot.may_alias(slot)).map(|f| &f.instance)
    }

    /// Remove every fact binding `slot` (a strong update / kill).
    pub fn kill_slot(&mut self, slot: &Slot) {
        self.0.retain(|f| f.slot != *slot);
    }

    /// Join `other` into `self` in place, returning whether anything changed (used by the
    /// worklist to decide whether to re-enqueue successors).
    pub fn join_in_place(&mut self, other: &FactSet) -> bool {
        let before = self.0.len();
        self.0.extend(other.0.iter().cloned());
        self.0.len() != before
    }

    pub fn union(&self, other: &FactSet) -> FactSet {
        let mut out = self.clone();
        out.join_in_place(other);
        out
    }
}

impl FromIterator<RFAFact> for FactSet {
    fn from_iter<T: IntoIterator<Item = RFAFact>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        instance::{DefSite, Instance},
        slot::Slot,
    };
    use sa_ir::{location::LocationId, ty::Type};

    /// A small, finite generator for facts: few enough slots/instances that proptest's shrinker
    /// and the fixpoint's own convergence argument (§4.2: "no widening needed because the instance
    /// domain is bounded per method") both apply to the same kind of small finite lattice.
    fn arb_fact() -> impl Strategy<Value = RFAFact> {
        (0u32..4, 0u32..4).prop_map(|(slot_ord, inst_ord)| {
            let slot = Slot::Var(format!("v{slot_ord}").into());
            let instance = Instance::new(
                Type::reference("scratch.Widget"),
                DefSite::Alloc { signature: "Lscratch;.m:()V".into(), location: LocationId(inst_ord) },
                false,
            );
            RFAFact::new(slot, instance)
        })
    }

    fn arb_fact_set() -> impl Strategy<Value = FactSet> {
        prop::collection::vec(arb_fact(), 0..8).prop_map(|facts| facts.into_iter().collect())
    }

    proptest! {
        /// §8 invariant 4 (idempotence): joining a set with itself changes nothing — the lattice's
        /// join is `∪`, and `S ∪ S = S` for any set `S`.
        #[test]
        fn join_with_self_is_idempotent(set in arb_fact_set()) {
            let mut joined = set.clone();
            joined.join_in_place(&set);
            prop_assert_eq!(joined, set);
        }

        /// Join (`∪`) is commutative, which is what makes the worklist's join-on-every-predecessor
        /// order-independent (§5: "the fixpoint converges to the same fact set regardless of
        /// worklist order").
        #[test]
        fn union_is_commutative(a in arb_fact_set(), b in arb_fact_set()) {
            prop_assert_eq!(a.union(&b), b.union(&a));
        }

        /// Join is associative, so folding a predecessor list left-to-right or right-to-left (as
        /// `RfaResult::in_facts` does over `icfg.predecessors`) reaches the same result either way.
        #[test]
        fn union_is_associative(a in arb_fact_set(), b in arb_fact_set(), c in arb_fact_set()) {
            prop_assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
        }

        /// `kill_slot` followed by re-`insert`-ing the same facts restores exactly the killed facts
        /// — `kill_slot`'s only job is removing one slot's bindings, not disturbing any other.
        #[test]
        fn kill_then_reinsert_restores_the_original_set(set in arb_fact_set(), slot_ord in 0u32..4) {
            let slot = Slot::Var(format!("v{slot_ord}").into());
            let removed: Vec<RFAFact> = set.iter().filter(|f| f.slot == slot).cloned().collect();
            let mut killed = set.clone();
            killed.kill_slot(&slot);
            for fact in removed {
                killed.insert(fact);
            }
            prop_assert_eq!(killed, set);
        }
    }
}

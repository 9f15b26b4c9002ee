//! The per-work-unit `Instance -> HeapBase` map (§3, §4.3, §9).
//!
//! Treated as a **may-alias hint**, not a canonicalization (§9): an instance maps to at most one
//! symbolic path, first-writer wins, and nothing here re-derives or normalizes that path later.
//! This is what keeps cyclic object graphs (`x.next = x`) from looping a naive map update — a
//! second write to the same instance is simply ignored, and soundness is preserved because alias
//! evaluation always consults the points-to table (the [`crate::fact::FactSet`]), never this map.

use rustc_hash::FxHashMap;

use crate::{heap_base::HeapBase, instance::Instance};

#[derive(Debug, Default)]
pub struct HeapMap {
    paths: FxHashMap<Instance, HeapBase>,
}

impl HeapMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `instance -> base`, but only if `instance` has no path yet (first-writer wins).
    pub fn record_if_absent(&mut self, instance: Instance, base: HeapBase) {
        match self.paths.entry(instance) {
            std::collections::hash_map::Entry::Vacant(entry) => {
                log::trace!(target: "heap-map", "recording {:?} -> {base}", entry.key());
                entry.insert(base);
            }
            std::collections::hash_map::Entry::Occupied(entry) => {
                log::trace!(target: "heap-map", "ignoring {base} for {:?}, already mapped to {}", entry.key(), entry.get());
            }
        }
    }

    pub fn get(&self, instance: &Instance) -> Option<&HeapBase> {
        self.paths.get(instance)
    }

    /// Drop `instance`'s recorded path, if any — called when the slot it was reached through is
    /// overwritten (§4.3's kill step, "instances that used to live there are killed from the heap
    /// map").
    pub fn kill(&mut self, instance: &Instance) {
        if let Some(base) = self.paths.remove(instance) {
            log::trace!(target: "heap-map", "killing {instance:?}, was mapped to {base}");
        }
    }

    pub fn contains(&self, instance: &Instance) -> bool {
        self.paths.contains_key(instance)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use sa_ir::ty::Type;

    use super::*;
    use crate::{
        heap_base::Root,
        instance::DefSite,
    };

    fn instance(ordinal: u32) -> Instance {
        Instance::new(
            Type::reference("scratch.Node"),
            DefSite::Alloc {
                signature: "Lscratch/Node;.<init>:()V".into(),
                location: sa_ir::location::LocationId(ordinal),
            },
            false,
        )
    }

    #[test]
    fn first_writer_wins_on_cyclic_self_reference() {
        let mut map = HeapMap::new();
        let node = instance(0);
        map.record_if_absent(node.clone(), HeapBase::new(Root::This));
        // `x.next = x` would otherwise try to re-record the same instance under a longer path.
        map.record_if_absent(node.clone(), HeapBase::new(Root::This).make(crate::heap_base::Access::Field("next".into())));
        assert_eq!(map.get(&node).unwrap().access.len(), 0);
    }

    #[test]
    fn killing_removes_the_recorded_path() {
        let mut map = HeapMap::new();
        let node = instance(1);
        map.record_if_absent(node.clone(), HeapBase::new(Root::Ret));
        map.kill(&node);
        assert!(map.get(&node).is_none());
    }
}

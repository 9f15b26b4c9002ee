//! The call resolver (§4.4): three-tier call-site resolution consumed by the reaching-facts
//! transfer (§4.2) whenever it crosses a `Stmt::Call`.
//!
//! 1. Model calls (`ModelCallHandler`) get first refusal — hand-written transfer functions for
//!    runtime methods this crate chooses not to analyze structurally.
//! 2. Failing that, a published heap summary (`SummaryManager::get_heap_summary`) is applied by
//!    substituting the callee's `HeapBase` roots for the caller's actuals and replaying each rule
//!    against the caller's current facts.
//! 3. Failing that — no model, no summary (first visit, recursion, or a callee this crate never
//!    resolved) — the call is treated as fully opaque and every instance it could have touched is
//!    clobbered with a fresh `unknown` instance.
//!
//! Virtual dispatch is deliberately not enumerated here: `Global::get_method_or_resolve` is asked
//! for one target and the resolver trusts whatever comes back (or falls through to the
//! unknown-object case if it returns none). Modeling a real class hierarchy with several possible
//! receivers is out of this crate's scope — see DESIGN.md.

use sa_ir::{
    location::LocationId,
    stmt::CallStmt,
    symbol::{MethodSignature, Var},
    ty::Type,
};

use crate::{
    external::{Global, ModelCallHandler, SummaryManager},
    fact::{FactSet, RFAFact},
    heap_base::{Access, HeapBase, Root},
    instance::{DefSite, Instance},
    slot::Slot,
    summary::{HeapOp, Summary},
};

pub struct CallResolver<'a> {
    caller: &'a MethodSignature,
    global: &'a dyn Global,
    model_calls: &'a dyn ModelCallHandler,
    summaries: &'a dyn SummaryManager,
}

impl<'a> CallResolver<'a> {
    pub fn new(
        caller: &'a MethodSignature,
        global: &'a dyn Global,
        model_calls: &'a dyn ModelCallHandler,
        summaries: &'a dyn SummaryManager,
    ) -> Self {
        Self { caller, global, model_calls, summaries }
    }

    /// The facts flowing out of `call`, given the facts flowing in at `location`.
    pub fn resolve(&self, call: &CallStmt, location: LocationId, facts: &FactSet) -> FactSet {
        if self.model_calls.is_model_call(&call.signature) {
            log::trace!(target: "call-resolver", "`{}` at {location:?}: dispatching to a model call", call.signature);
            return self.model_calls.do_model_call(&call.signature, facts);
        }

        if let Some(summary) = self.summaries.get_heap_summary(&call.signature) {
            if !summary.incomplete {
                log::trace!(target: "call-resolver", "`{}` at {location:?}: applying its published heap summary ({} rules)", call.signature, summary.rules.len());
                return self.apply_summary(call, &summary, facts);
            }
            log::trace!(target: "call-resolver", "`{}` at {location:?}: heap summary is incomplete, falling back to unknown-object", call.signature);
        }

        log::debug!(target: "call-resolver", "`{}` at {location:?}: no model or usable summary, clobbering reachable instances as unknown", call.signature);
        self.unknown_object_fallback(call, location, facts)
    }

    fn apply_summary(&self, call: &CallStmt, summary: &Summary, facts: &FactSet) -> FactSet {
        let mut out = facts.clone();
        for rule in &summary.rules {
            if let crate::summary::SummaryRule::Heap(rule) = rule {
                let dst_slots = self.bind_base(call, &rule.dst, &out);

                match rule.op {
                    HeapOp::Clear => {
                        for slot in &dst_slots {
                            out.kill_slot(slot);
                        }
                    }
                    // A load/copy produces a fresh value at `dst`, so the prior bindings of `dst`
                    // don't survive it — a strong update.
                    HeapOp::Load | HeapOp::Copy => {
                        let Some(src) = &rule.src else { continue };
                        let src_instances = self.instances_at(call, src, &out);
                        for slot in &dst_slots {
                            out.kill_slot(slot);
                        }
                        for slot in &dst_slots {
                            for instance in &src_instances {
                                out.insert(RFAFact::new(slot.clone(), instance.clone()));
                            }
                        }
                    }
                    // A store writes through a path the resolver can't prove denotes exactly one
                    // concrete heap cell (the dst base may itself be an over-approximated
                    // key-less map slot, or alias other reachable paths) — a weak update.
                    HeapOp::Store => {
                        let Some(src) = &rule.src else { continue };
                        let src_instances = self.instances_at(call, src, &out);
                        for slot in dst_slots {
                            for instance in &src_instances {
                                out.insert(RFAFact::new(slot.clone(), instance.clone()));
                            }
                        }
                    }
                }
            }
        }
        out
    }

    fn instances_at(&self, call: &CallStmt, base: &HeapBase, facts: &FactSet) -> Vec<Instance> {
        self.bind_base(call, base, facts)
            .iter()
            .flat_map(|slot| facts.instances_of(slot).cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Resolve a callee-relative [`HeapBase`] to the set of caller [`Slot`]s it denotes, fanning
    /// out over every instance currently bound to each access step in turn.
    fn bind_base(&self, call: &CallStmt, base: &HeapBase, facts: &FactSet) -> Vec<Slot> {
        bind_heap_base(call, base, facts)
    }

    /// No model, no summary: every instance reachable through the receiver or an argument may
    /// have been mutated in ways this crate cannot see into, and the return value (if any) is a
    /// value this crate has never observed (§4.4 step 3).
    fn unknown_object_fallback(&self, call: &CallStmt, location: LocationId, facts: &FactSet) -> FactSet {
        let mut out = facts.clone();
        let resolved = self.global.get_method_or_resolve(&call.signature);
        let mut ordinal = 0u32;

        if let Some(result) = &call.result {
            let ty = resolved
                .as_ref()
                .map(|m| m.body().return_type.clone())
                .unwrap_or_else(|| Type::reference("java.lang.Object"));
            let instance = Instance::new(
                ty,
                DefSite::Synthetic { signature: self.caller.clone(), location, ordinal },
                true,
            );
            ordinal += 1;
            out.kill_slot(&Slot::Var(result.clone()));
            out.insert(RFAFact::new(Slot::Var(result.clone()), instance));
        }

        let roots: Vec<Var> = call.receiver.iter().chain(call.args.iter()).cloned().collect();
        for root_var in roots {
            let reachable: Vec<Instance> = facts.instances_of(&Slot::Var(root_var)).cloned().collect();
            for base_instance in reachable {
                let stale: Vec<Slot> = out
                    .iter()
                    .map(|f| f.slot.clone())
                    .filter(|slot| slot_is_rooted_at(slot, &base_instance))
                    .collect();
                if stale.is_empty() {
                    continue;
                }
                let fresh = Instance::new(
                    base_instance.ty.clone(),
                    DefSite::Synthetic { signature: self.caller.clone(), location, ordinal },
                    true,
                );
                ordinal += 1;
                for slot in stale {
                    out.kill_slot(&slot);
                    out.insert(RFAFact::new(slot, fresh.clone()));
                }
            }
        }

        out
    }
}

fn access_slot(instance: Instance, access: &Access) -> Slot {
    match access {
        Access::Field(name) => Slot::Field(instance, name.clone()),
        Access::Array => Slot::Array(instance),
        // The callee-side key variable has no referent in the caller's facts; binding a summary's
        // map access always over-approximates to "any key" (§9, `SuMapAccess`).
        Access::Map(_) => Slot::Map(instance, None),
    }
}

/// Resolve a callee-relative [`HeapBase`] to the set of caller [`Slot`]s it denotes at `call`,
/// binding `root` against the call's receiver/args/result and fanning out over every instance
/// bound to each access step in turn.
///
/// Shared between [`CallResolver::apply_summary`] (binding `HeapSummaryRule`s) and PT-WU's
/// cross-call rebinding (§4.6, binding `PTSummaryRule`s) — both rebind a callee-relative path the
/// same way, only what they do with the resulting slots differs.
pub(crate) fn bind_heap_base(call: &CallStmt, base: &HeapBase, facts: &FactSet) -> Vec<Slot> {
    let Some(root_slot) = resolve_root_slot(call, &base.root) else {
        return Vec::new();
    };

    let mut slots = vec![root_slot];
    for access in &base.access {
        slots = slots
            .into_iter()
            .flat_map(|slot| {
                facts
                    .instances_of(&slot)
                    .map(|instance| access_slot(instance.clone(), access))
                    .collect::<Vec<_>>()
            })
            .collect();
    }
    slots
}

fn resolve_root_slot(call: &CallStmt, root: &Root) -> Option<Slot> {
    match root {
        Root::This => call.receiver.clone().map(Slot::Var),
        Root::Arg(i) => call.args.get(*i as usize).cloned().map(Slot::Var),
        Root::Ret => call.result.clone().map(Slot::Var),
        Root::Global(fqn) => Some(Slot::StaticField(fqn.clone())),
    }
}

fn slot_is_rooted_at(slot: &Slot, instance: &Instance) -> bool {
    match slot {
        Slot::Field(base, _) | Slot::Array(base) => base == instance,
        Slot::Map(base, _) => base == instance,
        Slot::Var(_) | Slot::StaticField(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use sa_ir::{location::LocationId, stmt::CallKind};

    use super::*;

    fn call() -> CallStmt {
        CallStmt {
            result: Some("res".into()),
            receiver: Some("recv".into()),
            args: smallvec::smallvec!["a0".into(), "a1".into()],
            signature: "Lscratch/Callee;.m:()V".into(),
            kind: CallKind::Virtual,
        }
    }

    fn instance() -> Instance {
        Instance::new(
            Type::reference("scratch.Widget"),
            DefSite::Alloc { signature: "Lscratch;.other:()V".into(), location: LocationId(0) },
            false,
        )
    }

    #[test]
    fn this_root_binds_to_the_receiver() {
        let base = HeapBase::new(Root::This);
        let facts = FactSet::new();
        let slots = bind_heap_base(&call(), &base, &facts);
        assert_eq!(slots, vec![Slot::Var("recv".into())]);
    }

    #[test]
    fn arg_root_binds_to_the_matching_actual() {
        let base = HeapBase::new(Root::Arg(1));
        let facts = FactSet::new();
        let slots = bind_heap_base(&call(), &base, &facts);
        assert_eq!(slots, vec![Slot::Var("a1".into())]);
    }

    #[test]
    fn ret_root_binds_to_the_call_result() {
        let base = HeapBase::new(Root::Ret);
        let facts = FactSet::new();
        let slots = bind_heap_base(&call(), &base, &facts);
        assert_eq!(slots, vec![Slot::Var("res".into())]);
    }

    #[test]
    fn global_root_binds_to_a_static_field_slot_regardless_of_the_call() {
        let base = HeapBase::new(Root::Global("Lscratch/Cfg;.instance".into()));
        let facts = FactSet::new();
        let slots = bind_heap_base(&call(), &base, &facts);
        assert_eq!(slots, vec![Slot::StaticField("Lscratch/Cfg;.instance".into())]);
    }

    #[test]
    fn an_access_step_fans_out_over_every_instance_bound_to_the_root() {
        let base = HeapBase::new(Root::This).make(Access::Field("f".into()));
        let mut facts = FactSet::new();
        let bound = instance();
        facts.insert(RFAFact::new(Slot::Var("recv".into()), bound.clone()));
        let slots = bind_heap_base(&call(), &base, &facts);
        assert_eq!(slots, vec![Slot::Field(bound, "f".into())]);
    }

    #[test]
    fn an_unbound_root_produces_no_slots_to_fan_out_over() {
        let base = HeapBase::new(Root::This).make(Access::Field("f".into()));
        let facts = FactSet::new();
        assert!(bind_heap_base(&call(), &base, &facts).is_empty());
    }
}

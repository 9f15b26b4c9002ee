//! Reaching-facts analysis: the worklist fixpoint over the ICFG (§4.2).
//!
//! Context-insensitive, flow-sensitive, forward may-analysis. One `FactSet` per location; join is
//! set union; the transfer function is per-statement-kind. Calls delegate to [`CallResolver`]
//! rather than re-descending into the callee body — the whole point of a summary-based engine is
//! that a callee is visited exactly once, by its own work unit.

use std::time::Instant;

use rustc_hash::FxHashSet;
use sa_ir::{
    location::LocationId,
    method::MethodBody,
    stmt::Stmt,
    symbol::Var,
};

use crate::{
    config::DataFlowConfig,
    fact::{FactSet, RFAFact},
    heap_base::Access,
    icfg::Icfg,
    instance::{DefSite, Instance},
    resolver::CallResolver,
    slot::Slot,
};

/// The result of running the fixpoint to (near-)completion: per-location facts, plus whether the
/// configured timeout was hit before the worklist drained.
///
/// `out_facts[loc]` is, per the usual dataflow convention, the facts *after* `loc`'s statement has
/// run — never to be confused with what flows in. `entry_facts` is kept separately rather than
/// folded into `out_facts[entry]`, since the entry location's own statement (if the method's first
/// location is itself an assignment, not just a placeholder) still needs to see the bare seed as
/// its input, not its own output.
pub struct RfaResult {
    pub out_facts: Vec<FactSet>,
    pub entry_facts: FactSet,
    pub incomplete: bool,
}

impl RfaResult {
    pub fn at_exit(&self, body: &MethodBody) -> FactSet {
        let mut exit = FactSet::new();
        for location in &body.locations {
            if matches!(location.stmt(), Some(Stmt::Return { .. })) {
                exit.join_in_place(&self.out_facts[location.id.index()]);
            }
        }
        exit
    }

    /// The facts flowing *into* `loc`: the entry seed when `loc` is the method's entry, joined
    /// with every real predecessor's out-facts (relevant for a loop that branches back to the
    /// entry location itself).
    pub fn in_facts(&self, icfg: &Icfg, loc: LocationId) -> FactSet {
        let mut facts = FactSet::new();
        if loc == icfg.entry() {
            facts.join_in_place(&self.entry_facts);
        }
        for &pred in icfg.predecessors(loc) {
            facts.join_in_place(&self.out_facts[pred.index()]);
        }
        facts
    }
}

/// Run reaching-facts to a fixpoint (or until `config.fixpoint_timeout()` elapses).
pub fn run(body: &MethodBody, icfg: &Icfg, resolver: &CallResolver<'_>, config: &DataFlowConfig) -> RfaResult {
    let n = icfg.node_count();
    let mut out_facts = vec![FactSet::new(); n];
    let entry_facts = initial_facts(body);

    let mut worklist: Vec<LocationId> = (0..n as u32).map(LocationId).collect();
    let mut in_worklist: FxHashSet<LocationId> = worklist.iter().copied().collect();
    let started = Instant::now();
    let mut incomplete = false;

    log::trace!(target: "rfa", "starting fixpoint for `{}` over {n} locations", body.signature);

    while let Some(loc) = worklist.pop() {
        in_worklist.remove(&loc);

        if started.elapsed() > config.fixpoint_timeout() {
            log::warn!(target: "rfa", "fixpoint for `{}` timed out with {} locations still queued", body.signature, worklist.len() + 1);
            incomplete = true;
            break;
        }

        let mut in_facts = FactSet::new();
        if loc == icfg.entry() {
            in_facts.join_in_place(&entry_facts);
        }
        for &pred in icfg.predecessors(loc) {
            in_facts.join_in_place(&out_facts[pred.index()]);
        }

        let new_out = transfer(body, resolver, loc, &in_facts);
        if new_out != out_facts[loc.index()] {
            log::trace!(target: "rfa", "{loc:?} grew from {} to {} facts, re-enqueuing successors", out_facts[loc.index()].len(), new_out.len());
            out_facts[loc.index()] = new_out;
            for &succ in icfg.successors(loc) {
                if in_worklist.insert(succ) {
                    worklist.push(succ);
                }
            }
        } else {
            log::trace!(target: "rfa", "{loc:?} reached a fixpoint, nothing re-enqueued");
        }
    }

    log::debug!(target: "rfa", "fixpoint for `{}` finished over {n} locations (incomplete={incomplete})", body.signature);

    RfaResult { out_facts, entry_facts, incomplete }
}

/// Seed facts at method entry: a fresh `unknown` instance for `this` and for every object-typed,
/// non-`String` parameter (§4.2's initial-facts rule).
fn initial_facts(body: &MethodBody) -> FactSet {
    let mut facts = FactSet::new();

    if let Some(this_ty) = &body.this_type {
        let instance = Instance::new(
            this_ty.clone(),
            DefSite::EntryThis { signature: body.signature.clone() },
            true,
        );
        facts.insert(RFAFact::new(Slot::Var(Var::new("this")), instance));
    }

    for (index, (name, ty)) in body.params.iter().enumerate() {
        if ty.is_reference() && !ty.is_string() {
            let instance = Instance::new(
                ty.clone(),
                DefSite::EntryParam { signature: body.signature.clone(), index: index as u32 },
                true,
            );
            facts.insert(RFAFact::new(Slot::Var(name.clone()), instance));
        }
    }

    facts
}

/// The per-statement-kind transfer function. `in_facts` flows in; the returned set flows out.
fn transfer(body: &MethodBody, resolver: &CallResolver<'_>, loc: LocationId, in_facts: &FactSet) -> FactSet {
    let location = body.location(loc);
    let Some(stmt) = location.stmt() else {
        return in_facts.clone();
    };

    match stmt {
        Stmt::Assign { lhs, rhs } => transfer_assign(body, loc, lhs, rhs, in_facts),
        Stmt::Call(call) => resolver.resolve(call, loc, in_facts),
        // Branches, gotos, returns and throws move no heap facts of their own; a `Return` or
        // `Throw`'s operand is read, not written, so the facts flowing into it are exactly the
        // facts flowing out (the exit-facts union in `RfaResult::at_exit` is what actually
        // extracts the returned instances).
        Stmt::If { .. } | Stmt::Goto(_) | Stmt::Return { .. } | Stmt::Throw(_) => in_facts.clone(),
    }
}

/// Read whatever instances `slot` is currently known to hold; if none, and `base_instance` is
/// itself `unknown`, conjure up a fresh opaque value for this access rather than returning nothing
/// — an entirely external object's field is presumed to hold another external object, not
/// `null`, matching the conservative stance the initial-facts rule takes at method entry. A
/// concretely-allocated object's never-written field, by contrast, stays empty: that's a real
/// absence of information, not a deliberate over-approximation.
fn read_or_synthesize(facts: &FactSet, slot: &Slot, base_instance: Instance, access: Access) -> Vec<Instance> {
    let known: Vec<Instance> = facts.instances_of(slot).cloned().collect();
    if known.is_empty() && base_instance.unknown {
        vec![Instance::unknown_access(base_instance, access)]
    } else {
        known
    }
}

fn transfer_assign(
    body: &MethodBody,
    loc: LocationId,
    lhs: &sa_ir::expr::LValue,
    rhs: &sa_ir::expr::Rhs,
    in_facts: &FactSet,
) -> FactSet {
    use sa_ir::expr::{LValue, Rhs};

    let mut out = in_facts.clone();

    let rhs_instances: Vec<Instance> = match rhs {
        Rhs::Var(v) => out.instances_of(&Slot::Var(v.clone())).cloned().collect(),
        Rhs::Field { base, field } => {
            let bases: Vec<Instance> = out.instances_of(&Slot::Var(base.clone())).cloned().collect();
            bases
                .into_iter()
                .flat_map(|base_instance| read_or_synthesize(&out, &Slot::Field(base_instance.clone(), field.clone()), base_instance, Access::Field(field.clone())))
                .collect()
        }
        Rhs::StaticField(fqn) => out.instances_of(&Slot::StaticField(fqn.clone())).cloned().collect(),
        Rhs::ArrayElem { base, .. } => {
            let bases: Vec<Instance> = out.instances_of(&Slot::Var(base.clone())).cloned().collect();
            bases
                .into_iter()
                .flat_map(|base_instance| read_or_synthesize(&out, &Slot::Array(base_instance.clone()), base_instance, Access::Array))
                .collect()
        }
        Rhs::MapEntry { base, key } => {
            let bases: Vec<Instance> = out.instances_of(&Slot::Var(base.clone())).cloned().collect();
            let key_instance = out.instances_of(&Slot::Var(key.clone())).next().cloned();
            bases
                .into_iter()
                .flat_map(|base_instance| {
                    read_or_synthesize(
                        &out,
                        &Slot::Map(base_instance.clone(), key_instance.clone()),
                        base_instance,
                        Access::Map(None),
                    )
                })
                .collect()
        }
        // Casts are transparent to points-to: a cast never changes which instances a value
        // denotes, only the static type used to read it. `InstanceOf` and arithmetic/literal
        // results carry no instances at all.
        Rhs::Cast { value, .. } => out.instances_of(&Slot::Var(value.clone())).cloned().collect(),
        Rhs::New { ty, .. } => {
            vec![Instance::new(
                ty.clone(),
                DefSite::Alloc { signature: body.signature.clone(), location: loc },
                false,
            )]
        }
        Rhs::CaughtException => {
            let ty = body
                .catches
                .iter()
                .find(|c| c.handler == loc)
                .map(|c| c.exception_type.clone())
                .unwrap_or_else(|| sa_ir::ty::Type::reference("java.lang.Throwable"));
            vec![Instance::new(ty, DefSite::Alloc { signature: body.signature.clone(), location: loc }, true)]
        }
        Rhs::InstanceOf { .. } | Rhs::Binary { .. } | Rhs::Unary { .. } | Rhs::Literal(_) => Vec::new(),
    };

    match lhs {
        LValue::Var(v) => {
            out.kill_slot(&Slot::Var(v.clone()));
            for instance in rhs_instances {
                out.insert(RFAFact::new(Slot::Var(v.clone()), instance));
            }
        }
        LValue::Field { base, field } => {
            let bases: Vec<Instance> = out.instances_of(&Slot::Var(base.clone())).cloned().collect();
            for base_instance in bases {
                let slot = Slot::Field(base_instance, field.clone());
                for instance in &rhs_instances {
                    out.insert(RFAFact::new(slot.clone(), instance.clone()));
                }
            }
        }
        LValue::StaticField(fqn) => {
            let slot = Slot::StaticField(fqn.clone());
            out.kill_slot(&slot);
            for instance in rhs_instances {
                out.insert(RFAFact::new(slot.clone(), instance));
            }
        }
        LValue::ArrayElem { base, .. } => {
            let bases: Vec<Instance> = out.instances_of(&Slot::Var(base.clone())).cloned().collect();
            for base_instance in bases {
                let slot = Slot::Array(base_instance);
                for instance in &rhs_instances {
                    out.insert(RFAFact::new(slot.clone(), instance.clone()));
                }
            }
        }
        LValue::MapEntry { base, key } => {
            let bases: Vec<Instance> = out.instances_of(&Slot::Var(base.clone())).cloned().collect();
            let key_instance = out.instances_of(&Slot::Var(key.clone())).next().cloned();
            for base_instance in bases {
                let slot = Slot::Map(base_instance, key_instance.clone());
                for instance in &rhs_instances {
                    out.insert(RFAFact::new(slot.clone(), instance.clone()));
                }
            }
        }
    }

    out
}

//! HS-WU: the heap-summary work unit (§4.3, §4.5).
//!
//! One work unit per method: build the ICFG, run reaching-facts to a fixpoint, then walk every
//! location reachable from the entry exactly once (in the order [`Icfg::reachable_from_entry`]
//! gives) extracting heap rules as they're read (RHS) and written (LHS), maintaining a [`HeapMap`]
//! in lockstep so a value loaded two steps deep (`t := b.f; u := t.g`) still resolves to the
//! symbolic path `Arg(0).f.g` by the time it's stored or returned. The walk is single-pass: §4.5
//! calls for "visit once", relying on the fixpoint having already stabilized the facts at every
//! location.

use sa_ir::{
    expr::{LValue, Rhs},
    location::LocationId,
    stmt::Stmt,
    symbol::Var,
};

use crate::{
    config::DataFlowConfig,
    external::{Global, ModelCallHandler, SummaryManager},
    fact::FactSet,
    heap_base::{Access, HeapBase, Root},
    heap_map::HeapMap,
    icfg::Icfg,
    instance::{DefSite, Instance},
    resolver::CallResolver,
    rfa::{self, RfaResult},
    slot::Slot,
    summary::{HeapOp, HeapSummaryRule, Summary, SummaryRule},
};

/// Run HS-WU for `method` and publish its heap summary. Returns the summary it published so
/// callers (e.g. tests) don't have to round-trip through the `SummaryManager` to inspect it.
pub fn run(
    method: &dyn crate::external::JawaMethod,
    global: &dyn Global,
    model_calls: &dyn ModelCallHandler,
    summaries: &dyn SummaryManager,
    config: &DataFlowConfig,
) -> Summary {
    let body = method.body();
    let icfg = Icfg::build(body);
    let resolver = CallResolver::new(&body.signature, global, model_calls, summaries);
    let rfa_result = rfa::run(body, &icfg, &resolver, config);

    let mut summary = Summary::new(body.signature.clone());
    summary.incomplete = rfa_result.incomplete;
    if rfa_result.incomplete {
        log::warn!(target: "hs-wu", "fixpoint for `{}` hit its timeout; publishing a conservative summary", body.signature);
    }

    let (_heap_map, rules) = walk(body, &icfg, &rfa_result);
    summary.rules = rules;

    summaries.publish_heap_summary(body.signature.clone(), summary.clone());
    summary
}

/// The single-pass extraction walk (§4.5): builds the [`HeapMap`] and the ordered
/// [`HeapSummaryRule`]s together, since a rule's `dst`/`src` both need whatever path the map has
/// recorded for their instances *so far* (the walk never revisits a location). Exposed so PT-WU
/// (§4.6) can reuse the same heap-path bookkeeping instead of re-deriving it.
pub(crate) fn walk(
    body: &sa_ir::method::MethodBody,
    icfg: &Icfg,
    rfa_result: &RfaResult,
) -> (HeapMap, Vec<SummaryRule>) {
    let mut heap_map = HeapMap::new();
    let mut rules = Vec::new();
    for &loc in &icfg.reachable_from_entry() {
        extract_rules_at(body, icfg, rfa_result, loc, &mut heap_map, &mut rules);
    }
    (heap_map, rules)
}

fn extract_rules_at(
    body: &sa_ir::method::MethodBody,
    icfg: &Icfg,
    rfa_result: &RfaResult,
    loc: LocationId,
    heap_map: &mut HeapMap,
    rules: &mut Vec<SummaryRule>,
) {
    let Some(stmt) = body.location(loc).stmt() else { return };
    let in_facts = rfa_result.in_facts(icfg, loc);
    let out_facts = &rfa_result.out_facts[loc.index()];

    match stmt {
        Stmt::Assign { lhs, rhs } => extract_assign(body, &in_facts, out_facts, lhs, rhs, heap_map, rules),
        Stmt::Return { value: Some(v), .. } => {
            for src in heap_bases_of_var(body, &in_facts, heap_map, v) {
                rules.push(SummaryRule::Heap(HeapSummaryRule {
                    op: HeapOp::Copy,
                    dst: HeapBase::new(Root::Ret),
                    src: Some(src),
                }));
            }
        }
        _ => {}
    }
}

fn extract_assign(
    body: &sa_ir::method::MethodBody,
    in_facts: &FactSet,
    out_facts: &FactSet,
    lhs: &LValue,
    rhs: &Rhs,
    heap_map: &mut HeapMap,
    rules: &mut Vec<SummaryRule>,
) {
    match lhs {
        // A load: `v := <heap path>`. Record the symbolic path for every instance the RHS could
        // now denote — read from `out_facts`, since `v`'s new binding is exactly this statement's
        // effect and isn't visible yet in the facts flowing in.
        LValue::Var(v) => {
            if let Some(access) = access_of_rhs(rhs) {
                if let Some(base_var) = base_var_of_rhs(rhs) {
                    for base in heap_bases_of_var(body, in_facts, heap_map, base_var) {
                        let path = base.make(access.clone());
                        for instance in out_facts.instances_of(&Slot::Var(v.clone())) {
                            heap_map.record_if_absent(instance.clone(), path.clone());
                        }
                    }
                }
            } else if let Rhs::StaticField(fqn) = rhs {
                let path = HeapBase::new(Root::Global(fqn.clone()));
                for instance in out_facts.instances_of(&Slot::Var(v.clone())) {
                    heap_map.record_if_absent(instance.clone(), path.clone());
                }
            }
        }
        // A store: `<heap path> := v`. Emit one rule per (dst path, src path) pair. Both halves
        // are read before this statement executes, so `in_facts` is the right set for both.
        LValue::Field { base, field } => {
            emit_store(body, in_facts, heap_map, base, Access::Field(field.clone()), rhs, rules)
        }
        LValue::ArrayElem { base, .. } => emit_store(body, in_facts, heap_map, base, Access::Array, rhs, rules),
        LValue::MapEntry { base, .. } => emit_store(body, in_facts, heap_map, base, Access::Map(None), rhs, rules),
        LValue::StaticField(fqn) => {
            if let Rhs::Var(src_var) = rhs {
                let dst = HeapBase::new(Root::Global(fqn.clone()));
                for src in heap_bases_of_var(body, in_facts, heap_map, src_var) {
                    rules.push(SummaryRule::Heap(HeapSummaryRule { op: HeapOp::Store, dst: dst.clone(), src: Some(src) }));
                }
            }
        }
    }
}

fn emit_store(
    body: &sa_ir::method::MethodBody,
    in_facts: &FactSet,
    heap_map: &mut HeapMap,
    base_var: &Var,
    access: Access,
    rhs: &Rhs,
    rules: &mut Vec<SummaryRule>,
) {
    let Rhs::Var(src_var) = rhs else { return };
    let dst_bases = heap_bases_of_var(body, in_facts, heap_map, base_var);
    let src_bases = heap_bases_of_var(body, in_facts, heap_map, src_var);
    for dst in &dst_bases {
        let path = dst.make(access.clone());
        for src in &src_bases {
            rules.push(SummaryRule::Heap(HeapSummaryRule { op: HeapOp::Store, dst: path.clone(), src: Some(src.clone()) }));
        }
    }
}

/// `Field`/`ArrayElem`/`MapEntry` reads decompose into "the access step" plus "the var the step is
/// taken off of"; this pulls out the former (the latter is [`base_var_of_rhs`]).
fn access_of_rhs(rhs: &Rhs) -> Option<Access> {
    match rhs {
        Rhs::Field { field, .. } => Some(Access::Field(field.clone())),
        Rhs::ArrayElem { .. } => Some(Access::Array),
        Rhs::MapEntry { .. } => Some(Access::Map(None)),
        _ => None,
    }
}

fn base_var_of_rhs(rhs: &Rhs) -> Option<&Var> {
    match rhs {
        Rhs::Field { base, .. } | Rhs::ArrayElem { base, .. } | Rhs::MapEntry { base, .. } => Some(base),
        _ => None,
    }
}

/// The symbolic heap base(s) reachable through `var`, for every instance `var` could currently
/// hold: either the instance is itself an entry formal (`This`/`Arg(i)`), or the walk has already
/// recorded a path for it in `heap_map`.
pub(crate) fn heap_bases_of_var(body: &sa_ir::method::MethodBody, facts: &FactSet, heap_map: &HeapMap, var: &Var) -> Vec<HeapBase> {
    facts
        .instances_of(&Slot::Var(var.clone()))
        .filter_map(|instance| heap_base_of_instance(body, heap_map, instance))
        .collect()
}

pub(crate) fn heap_base_of_instance(body: &sa_ir::method::MethodBody, heap_map: &HeapMap, instance: &Instance) -> Option<HeapBase> {
    match &instance.def_site {
        DefSite::EntryThis { signature } if *signature == body.signature => Some(HeapBase::new(Root::This)),
        DefSite::EntryParam { signature, index } if *signature == body.signature => Some(HeapBase::new(Root::Arg(*index))),
        _ => heap_map.get(instance).cloned(),
    }
}

//! PT-WU (§4.6): the points-to work unit, layered atop HS-WU.
//!
//! Where HS-WU only tracks heap mutation, PT-WU additionally resolves a caller-supplied set of
//! `pointsToResolve` queries — `(location, slot, trackHeap?)` triples some earlier work unit
//! queued because it needs to know what `slot` denotes at that program point — using the exact
//! same fixpoint and heap-path bookkeeping HS-WU performs. A query resolves one of two ways:
//! - **directly**, when the instances found don't trace back to an entry formal (a local
//!   allocation, or an `unknown` instance synthesized by this method's own call resolver) — these
//!   are facts about *this* method alone, so they're recorded straight into the shared [`PtStore`];
//! - **by substitution**, when an instance traces back to `This`/`Arg(i)`/a global — emitted as a
//!   [`PTSummaryRule`] so a caller can answer the same query against its own actuals without
//!   re-running this method's fixpoint (§3, §4.4's cross-call rebinding).
//!
//! `track_heap` distinguishes a direct points-to query (just the instances currently bound to the
//! slot) from a reachability query (every instance transitively reachable from them, per the
//! current `HeapMap`) — the latter walks the full transitive closure of `Field`/`Array`/`Map`
//! slots rooted at the seeds, not just one hop.
//!
//! In addition to resolving its own queued queries, the extraction walk also rebinds any
//! already-published PT summary of a callee at each call site (§4.6's last paragraph): the
//! callee's rules are re-bound to this method's actuals exactly as `CallResolver` rebinds heap
//! rules, and the result is either re-emitted as a fresh `PTSummaryRule` (if it still terminates
//! at one of *this* method's own symbolic roots) or resolved straight into the shared `PtStore`
//! (if it bottoms out in a local-to-this-method instance).

use rustc_hash::FxHashSet;
use sa_ir::{location::LocationId, stmt::Stmt};

use crate::{
    config::DataFlowConfig,
    context::Context,
    external::{Global, JawaMethod, ModelCallHandler, SummaryManager},
    fact::FactSet,
    heap_map::HeapMap,
    hswu,
    icfg::Icfg,
    instance::Instance,
    ptstore::{PTQuery, PtStore},
    resolver::{bind_heap_base, CallResolver},
    rfa,
    slot::Slot,
    summary::{PTSummaryRule, Summary, SummaryRule},
};

/// One query PT-WU is asked to resolve.
pub struct PtQuery {
    pub location: LocationId,
    pub slot: Slot,
    pub track_heap: bool,
}

pub fn run(
    method: &dyn JawaMethod,
    queries: &[PtQuery],
    global: &dyn Global,
    model_calls: &dyn ModelCallHandler,
    summaries: &dyn SummaryManager,
    store: &PtStore,
    config: &DataFlowConfig,
) -> Summary {
    let body = method.body();
    let icfg = Icfg::build(body);
    let resolver = CallResolver::new(&body.signature, global, model_calls, summaries);
    let rfa_result = rfa::run(body, &icfg, &resolver, config);
    let (heap_map, _heap_rules) = hswu::walk(body, &icfg, &rfa_result);

    let mut summary = Summary::new(body.signature.clone());
    summary.incomplete = rfa_result.incomplete;

    log::trace!(target: "pt-wu", "`{}`: resolving {} queued points-to queries", body.signature, queries.len());
    for query in queries {
        resolve_query(body, &rfa_result, &heap_map, query, store, &mut summary.rules);
    }

    for &loc in &icfg.reachable_from_entry() {
        if let Some(Stmt::Call(call)) = body.location(loc).stmt() {
            if let Some(callee_summary) = summaries.get_pt_summary(&call.signature) {
                if callee_summary.incomplete {
                    log::trace!(target: "pt-wu", "`{}` at {loc:?}: callee `{}`'s PT summary is incomplete, skipping cross-call rebinding", body.signature, call.signature);
                    continue;
                }
                let in_facts = rfa_result.in_facts(&icfg, loc);
                for rule in &callee_summary.rules {
                    if let SummaryRule::PointsTo(rule) = rule {
                        log::trace!(target: "pt-wu", "`{}` at {loc:?}: rebinding a PT rule from callee `{}`", body.signature, call.signature);
                        rebind_cross_call(body, &heap_map, call, rule, &in_facts, store, &mut summary.rules);
                    }
                }
            }
        }
    }

    log::debug!(target: "pt-wu", "`{}`: publishing a PT summary with {} rules (incomplete={})", body.signature, summary.rules.len(), summary.incomplete);
    summaries.publish_pt_summary(body.signature.clone(), summary.clone());
    summary
}

fn resolve_query(
    body: &sa_ir::method::MethodBody,
    rfa_result: &rfa::RfaResult,
    heap_map: &HeapMap,
    query: &PtQuery,
    store: &PtStore,
    rules: &mut Vec<SummaryRule>,
) {
    let out_facts = &rfa_result.out_facts[query.location.index()];
    let direct: Vec<Instance> = out_facts.instances_of(&query.slot).cloned().collect();

    let instances = if query.track_heap {
        close_over_heap(out_facts, &direct)
    } else {
        direct.clone()
    };

    let context = Context::at(body.signature.clone(), query.location);
    emit_or_resolve(body, heap_map, &instances, &context, &query.slot, query.track_heap, store, rules);
}

/// Re-bind one of a callee's already-published PT rules against `call`'s actuals, in the style of
/// `CallResolver::apply_summary` for heap rules: the rule's `base` is resolved through `in_facts`
/// (the facts flowing into the call) via [`bind_heap_base`], and every instance that resolution
/// reaches is either re-emitted as a fresh rule rooted at one of *this* method's own symbolic
/// roots, or — if it bottoms out in something local to this method — recorded directly into the
/// shared store under the callee's original `(context, slot)` query identity. The original
/// `context`/`slot` travel unchanged: they name *which* query this is an answer to, regardless of
/// how many call frames separate the asker from the method that finally resolves it.
fn rebind_cross_call(
    body: &sa_ir::method::MethodBody,
    heap_map: &HeapMap,
    call: &sa_ir::stmt::CallStmt,
    rule: &PTSummaryRule,
    in_facts: &FactSet,
    store: &PtStore,
    rules: &mut Vec<SummaryRule>,
) {
    let slots = bind_heap_base(call, &rule.base, in_facts);
    let instances: Vec<Instance> = slots
        .iter()
        .flat_map(|slot| in_facts.instances_of(slot).cloned().collect::<Vec<_>>())
        .collect();
    if instances.is_empty() {
        return;
    }
    let resolved = if rule.track_heap { close_over_heap(in_facts, &instances) } else { instances };
    emit_or_resolve(body, heap_map, &resolved, &rule.context, &rule.slot, rule.track_heap, store, rules);
}

/// For each of `instances`, either emit a fresh [`PTSummaryRule`] keyed by `(context, slot)` if
/// the instance is reachable from one of this method's own symbolic roots, or record it straight
/// into the shared [`PtStore`] as a final answer.
fn emit_or_resolve(
    body: &sa_ir::method::MethodBody,
    heap_map: &HeapMap,
    instances: &[Instance],
    context: &Context,
    slot: &Slot,
    track_heap: bool,
    store: &PtStore,
    rules: &mut Vec<SummaryRule>,
) {
    let ptquery = PTQuery { context: context.clone(), slot: slot.clone() };
    let mut local = Vec::new();
    for instance in instances {
        match hswu::heap_base_of_instance(body, heap_map, instance) {
            Some(base) => {
                log::trace!(target: "pt-wu", "emitting a PT rule for {slot:?}: rooted at {base}");
                rules.push(SummaryRule::PointsTo(PTSummaryRule {
                    base,
                    context: context.clone(),
                    slot: slot.clone(),
                    track_heap,
                }));
            }
            None => local.push(instance.clone()),
        }
    }
    if !local.is_empty() {
        log::trace!(target: "pt-wu", "resolving {slot:?} directly into the shared store ({} local instances)", local.len());
        store.record(ptquery, local);
    }
}

/// The full transitive closure of every instance reachable from `seeds` through `Field`/`Array`/
/// `Map` slots recorded in `facts` (§4.6: "pull all related heap instances reachable through the
/// slot's transitive closure"). Fixpoints on a plain worklist over the (finite, per-method)
/// instance domain — the same bound that lets RFA itself skip widening (§4.2).
fn close_over_heap(facts: &FactSet, seeds: &[Instance]) -> Vec<Instance> {
    let mut seen: FxHashSet<Instance> = seeds.iter().cloned().collect();
    let mut frontier: Vec<Instance> = seeds.to_vec();

    while let Some(current) = frontier.pop() {
        for fact in facts.iter() {
            let rooted = match &fact.slot {
                Slot::Field(base, _) | Slot::Array(base) => *base == current,
                Slot::Map(base, _) => *base == current,
                Slot::Var(_) | Slot::StaticField(_) => false,
            };
            if rooted && seen.insert(fact.instance.clone()) {
                frontier.push(fact.instance.clone());
            }
        }
    }

    seen.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rustc_hash::FxHashSet;
    use sa_ir::{location::LocationId, ty::Type};

    use super::*;
    use crate::instance::DefSite;

    fn instance(ordinal: u32) -> Instance {
        Instance::new(
            Type::reference("scratch.Node"),
            DefSite::Alloc {
                signature: "Lscratch/Node;.<init>:()V".into(),
                location: LocationId(ordinal),
            },
            false,
        )
    }

    #[test]
    fn close_over_heap_follows_a_multi_hop_chain() {
        let mut facts = FactSet::new();
        let a = instance(0);
        let b = instance(1);
        let c = instance(2);
        facts.insert(crate::fact::RFAFact::new(Slot::Field(a.clone(), "next".into()), b.clone()));
        facts.insert(crate::fact::RFAFact::new(Slot::Field(b.clone(), "next".into()), c.clone()));

        let closure = close_over_heap(&facts, &[a.clone()]);
        assert!(closure.contains(&a));
        assert!(closure.contains(&b));
        assert!(closure.contains(&c));
        assert_eq!(closure.len(), 3);
    }

    #[test]
    fn close_over_heap_terminates_on_a_cycle() {
        let mut facts = FactSet::new();
        let a = instance(0);
        let b = instance(1);
        facts.insert(crate::fact::RFAFact::new(Slot::Field(a.clone(), "next".into()), b.clone()));
        facts.insert(crate::fact::RFAFact::new(Slot::Field(b.clone(), "next".into()), a.clone()));

        let closure = close_over_heap(&facts, &[a.clone()]);
        assert_eq!(closure.len(), 2);
    }

    #[test]
    fn close_over_heap_ignores_unrelated_instances() {
        let mut facts = FactSet::new();
        let a = instance(0);
        let unrelated = instance(99);
        facts.insert(crate::fact::RFAFact::new(Slot::Var("x".into()), unrelated.clone()));

        let closure = close_over_heap(&facts, &[a.clone()]);
        assert_eq!(closure, vec![a]);
    }

    /// Builds a `facts` set with a random `next`-field edge between each of `N` instances, so the
    /// proptest below exercises arbitrarily shaped (including cyclic) heap graphs rather than just
    /// the hand-picked chain/cycle fixtures above.
    fn arb_heap_graph() -> impl Strategy<Value = (FactSet, Vec<Instance>)> {
        const N: u32 = 6;
        prop::collection::vec(prop::option::of(0..N), N as usize).prop_map(|edges| {
            let nodes: Vec<Instance> = (0..N).map(instance).collect();
            let mut facts = FactSet::new();
            for (from, to) in edges.into_iter().enumerate() {
                if let Some(to) = to {
                    facts.insert(crate::fact::RFAFact::new(
                        Slot::Field(nodes[from].clone(), "next".into()),
                        nodes[to as usize].clone(),
                    ));
                }
            }
            (facts, nodes)
        })
    }

    proptest! {
        /// Closing over the heap twice is the same as closing over it once: the first closure
        /// already contains everything reachable from the seeds, so re-seeding with its own output
        /// can't discover anything new (§8 invariant 4, applied to PT-WU's heap-reachability query
        /// rather than HS-WU's summary application).
        #[test]
        fn close_over_heap_is_idempotent((facts, nodes) in arb_heap_graph(), seed_ord in 0u32..6) {
            let seeds = vec![nodes[seed_ord as usize].clone()];
            let once = close_over_heap(&facts, &seeds);
            let twice = close_over_heap(&facts, &once);
            let once_set: FxHashSet<_> = once.into_iter().collect();
            let twice_set: FxHashSet<_> = twice.into_iter().collect();
            prop_assert_eq!(once_set, twice_set);
        }
    }
}

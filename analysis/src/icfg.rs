//! The intraprocedural control-flow graph (§2 row 4).
//!
//! Nodes are [`LocationId`]s. Edges are derived once from a [`MethodBody`]'s linear statement
//! list, plus one additional edge per protected location into each of its catch handlers — an
//! exception may transfer control to the handler after any statement in the guarded range, so the
//! reaching-facts fixpoint needs that edge to see handler-bound facts. No interprocedural edges are
//! ever added here: per §4.4, the call resolver never re-descends into a callee body, so all
//! cross-method effect comes from summaries, not ICFG edges.

use rustc_hash::FxHashMap;
use sa_ir::{
    location::LocationId,
    method::MethodBody,
    stmt::Stmt,
};
use smallvec::SmallVec;

pub struct Icfg {
    successors: Vec<SmallVec<[LocationId; 2]>>,
    predecessors: Vec<SmallVec<[LocationId; 2]>>,
}

impl Icfg {
    pub fn build(body: &MethodBody) -> Self {
        let n = body.locations.len();
        let mut successors: Vec<SmallVec<[LocationId; 2]>> = vec![SmallVec::new(); n];

        for location in &body.locations {
            let idx = location.id.index();
            let fallthrough = if idx + 1 < n { Some(LocationId((idx + 1) as u32)) } else { None };
            match location.stmt() {
                None => {
                    // Label: pure fallthrough.
                    if let Some(next) = fallthrough {
                        successors[idx].push(next);
                    }
                }
                Some(Stmt::Goto(target)) => {
                    successors[idx].push(body.resolve_label(target));
                }
                Some(Stmt::If { target, .. }) => {
                    if let Some(next) = fallthrough {
                        successors[idx].push(next);
                    }
                    successors[idx].push(body.resolve_label(target));
                }
                Some(Stmt::Return { .. }) | Some(Stmt::Throw(_)) => {
                    // Exit node: no intraprocedural successor.
                }
                Some(Stmt::Assign { .. }) | Some(Stmt::Call(_)) => {
                    if let Some(next) = fallthrough {
                        successors[idx].push(next);
                    }
                }
            }
        }

        for catch in &body.catches {
            for idx in catch.start.index()..catch.end.index() {
                if idx < n {
                    successors[idx].push(catch.handler);
                }
            }
        }

        let mut predecessors: Vec<SmallVec<[LocationId; 2]>> = vec![SmallVec::new(); n];
        for (idx, succs) in successors.iter().enumerate() {
            for &succ in succs {
                predecessors[succ.index()].push(LocationId(idx as u32));
            }
        }

        Self { successors, predecessors }
    }

    pub fn successors(&self, loc: LocationId) -> &[LocationId] {
        &self.successors[loc.index()]
    }

    pub fn predecessors(&self, loc: LocationId) -> &[LocationId] {
        &self.predecessors[loc.index()]
    }

    pub fn entry(&self) -> LocationId {
        LocationId(0)
    }

    pub fn node_count(&self) -> usize {
        self.successors.len()
    }

    /// All nodes reachable from the entry, in a stable entry-first order (used by the §4.5
    /// extraction walk).
    pub fn reachable_from_entry(&self) -> Vec<LocationId> {
        let mut seen: FxHashMap<LocationId, ()> = FxHashMap::default();
        let mut order = Vec::new();
        let mut stack = vec![self.entry()];
        while let Some(loc) = stack.pop() {
            if seen.insert(loc, ()).is_some() {
                continue;
            }
            order.push(loc);
            for &succ in self.successors(loc).iter().rev() {
                if !seen.contains_key(&succ) {
                    stack.push(succ);
                }
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use sa_ir::{
        expr::{Condition, Literal, Operand, RelOp},
        location::{CatchClause, Location, LocationKind},
        method::MethodBody,
        stmt::{ReturnKind, Stmt},
        ty::Type,
    };

    use super::*;

    /// `if (c) { t := 1; } L_skip: return;` — a two-way branch merging back before the return.
    fn branchy_body() -> MethodBody {
        MethodBody {
            signature: "Lscratch;.m:()V".into(),
            params: Vec::new(),
            this_type: None,
            return_type: Type::Void,
            locals: Default::default(),
            locations: vec![
                Location {
                    id: LocationId(0),
                    display_index: 0,
                    kind: LocationKind::Stmt(Stmt::If {
                        cond: Condition { op: RelOp::Ne, lhs: Operand::Literal(Literal::Int(0)), rhs: Operand::Literal(Literal::Int(0)) },
                        target: "L_skip".into(),
                    }),
                },
                Location {
                    id: LocationId(1),
                    display_index: 1,
                    kind: LocationKind::Stmt(Stmt::Assign {
                        lhs: sa_ir::expr::LValue::Var("t".into()),
                        rhs: sa_ir::expr::Rhs::Literal(Literal::Int(1)),
                    }),
                },
                Location { id: LocationId(2), display_index: 2, kind: LocationKind::Label("L_skip".into()) },
                Location {
                    id: LocationId(3),
                    display_index: 3,
                    kind: LocationKind::Stmt(Stmt::Return { value: None, kind: ReturnKind::Void }),
                },
            ],
            catches: Vec::new(),
        }
    }

    #[test]
    fn if_stmt_gets_both_a_fallthrough_and_a_target_edge() {
        let icfg = Icfg::build(&branchy_body());
        assert_eq!(icfg.successors(LocationId(0)), &[LocationId(1), LocationId(2)]);
    }

    #[test]
    fn the_merge_point_sees_both_predecessors() {
        let icfg = Icfg::build(&branchy_body());
        let mut preds = icfg.predecessors(LocationId(2)).to_vec();
        preds.sort();
        assert_eq!(preds, vec![LocationId(0), LocationId(1)]);
    }

    #[test]
    fn return_is_an_exit_node() {
        let icfg = Icfg::build(&branchy_body());
        assert!(icfg.successors(LocationId(3)).is_empty());
    }

    #[test]
    fn reachable_from_entry_visits_every_node_entry_first() {
        let icfg = Icfg::build(&branchy_body());
        assert_eq!(
            icfg.reachable_from_entry(),
            vec![LocationId(0), LocationId(1), LocationId(2), LocationId(3)]
        );
    }

    #[test]
    fn a_catch_range_adds_an_edge_into_the_handler_for_every_protected_location() {
        let mut body = branchy_body();
        body.catches.push(CatchClause {
            start: LocationId(0),
            end: LocationId(2),
            handler: LocationId(3),
            exception_type: Type::reference("java.lang.Exception"),
        });
        let icfg = Icfg::build(&body);
        assert!(icfg.successors(LocationId(0)).contains(&LocationId(3)));
        assert!(icfg.successors(LocationId(1)).contains(&LocationId(3)));
        assert!(!icfg.successors(LocationId(2)).contains(&LocationId(3)));
    }
}

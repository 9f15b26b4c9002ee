//! Summaries and summary rules (§3, §4.5, §4.6).

use sa_ir::symbol::MethodSignature;

use crate::{context::Context, heap_base::HeapBase, slot::Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapOp {
    Load,
    Store,
    Clear,
    Copy,
}

/// One heap-transfer rule: the output of HS-WU (§3, §4.5).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeapSummaryRule {
    pub op: HeapOp,
    pub dst: HeapBase,
    /// Absent for `Clear`, which only names the killed path.
    pub src: Option<HeapBase>,
}

/// "To resolve the query `slot` at `context` in the caller, substitute `base` evaluated in the
/// caller context" — the output of PT-WU (§3, §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PTSummaryRule {
    pub base: HeapBase,
    pub context: Context,
    pub slot: Slot,
    pub track_heap: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SummaryRule {
    Heap(HeapSummaryRule),
    PointsTo(PTSummaryRule),
}

/// `(methodSignature, ordered rules)` (§3). Immutable once published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub signature: MethodSignature,
    pub rules: Vec<SummaryRule>,
    /// Set when the fixpoint hit its timeout (§4.2): callers must treat this summary as
    /// conservative, the same as if no summary existed at all.
    pub incomplete: bool,
}

impl Summary {
    pub fn new(signature: MethodSignature) -> Self {
        Self {
            signature,
            rules: Vec::new(),
            incomplete: false,
        }
    }
}

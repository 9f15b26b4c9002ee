//! The external collaborator interfaces (§6): class/symbol resolution, hand-written model calls,
//! and summary storage are all out of this crate's scope, consumed only through these traits.
//!
//! `InMemorySummaryManager` is the one concrete implementation this crate ships, so the engine and
//! its own tests can run without a real class-loading/model-call subsystem plugged in —
//! analogous to the teacher shipping both the generic `DataFlowSolver` and concrete analyses
//! (`SparseConstantPropagation`, `Liveness`) that exercise it.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use sa_ir::{method::MethodBody, symbol::{MethodSignature, Name}, ty::Type};

use crate::{fact::FactSet, summary::Summary};

/// Class/method lookup and package resolution. Treated as read-only by the core.
pub trait Global: Send + Sync {
    fn get_class_or_resolve(&self, ty: &Type) -> Option<Type>;
    fn get_method_or_resolve(&self, signature: &MethodSignature) -> Option<Arc<dyn JawaMethod>>;
}

/// A resolved, lowered method, as the core consumes it (§6).
pub trait JawaMethod: Send + Sync {
    fn signature(&self) -> &MethodSignature;
    fn params(&self) -> &[(Name, Type)];
    fn this_type(&self) -> Option<&Type>;
    fn declaring_class(&self) -> &Type;
    fn body(&self) -> &MethodBody;
}

/// Hand-written transfer functions for runtime methods the call resolver special-cases ahead of
/// summary lookup (§4.4 step 2).
pub trait ModelCallHandler: Send + Sync {
    fn is_model_call(&self, signature: &MethodSignature) -> bool;

    /// Apply the model's transfer function, producing the facts that flow out of the call.
    fn do_model_call(&self, signature: &MethodSignature, facts: &FactSet) -> FactSet;
}

/// Append-only summary storage, keyed by method signature, shared across work units (§3, §5).
pub trait SummaryManager: Send + Sync {
    fn get_heap_summary(&self, signature: &MethodSignature) -> Option<Arc<Summary>>;
    fn get_pt_summary(&self, signature: &MethodSignature) -> Option<Arc<Summary>>;
    fn publish_heap_summary(&self, signature: MethodSignature, summary: Summary);
    fn publish_pt_summary(&self, signature: MethodSignature, summary: Summary);
}

/// The reference `SummaryManager`: two `parking_lot::RwLock`-guarded maps, matching the
/// single-writer-per-key concurrency model of §5 — readers never block on each other, and writers
/// only ever insert (summaries are immutable once published, so there is nothing to contend over
/// beyond the insertion itself).
#[derive(Default)]
pub struct InMemorySummaryManager {
    heap: RwLock<FxHashMap<MethodSignature, Arc<Summary>>>,
    points_to: RwLock<FxHashMap<MethodSignature, Arc<Summary>>>,
}

impl InMemorySummaryManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SummaryManager for InMemorySummaryManager {
    fn get_heap_summary(&self, signature: &MethodSignature) -> Option<Arc<Summary>> {
        self.heap.read().get(signature).cloned()
    }

    fn get_pt_summary(&self, signature: &MethodSignature) -> Option<Arc<Summary>> {
        self.points_to.read().get(signature).cloned()
    }

    fn publish_heap_summary(&self, signature: MethodSignature, summary: Summary) {
        log::debug!(target: "summary-manager", "published heap summary for `{signature}` with {} rules", summary.rules.len());
        self.heap.write().insert(signature, Arc::new(summary));
    }

    fn publish_pt_summary(&self, signature: MethodSignature, summary: Summary) {
        log::debug!(target: "summary-manager", "published PT summary for `{signature}` with {} rules", summary.rules.len());
        self.points_to.write().insert(signature, Arc::new(summary));
    }
}

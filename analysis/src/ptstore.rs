//! `PTStore`: the shared points-to result accumulator (§3, §5).
//!
//! Two halves, each behind its own `parking_lot::RwLock` so a reader resolving one query never
//! blocks a writer recording another (§5's single-writer-per-key concurrency model):
//! - `properties`, a typed key→value property map work units can stash auxiliary results in
//!   (mirroring the "shared property map" the spec calls out alongside the resolved result set);
//! - `resolved`, the accumulated `(Context, Slot) -> {Instance}` answers PT-WU has computed so far.

use std::any::Any;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{context::Context, instance::Instance, slot::Slot};

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct PTQuery {
    pub context: Context,
    pub slot: Slot,
}

/// The points-to analysis result: every query PT-WU has resolved, mapped to the instances it
/// found. A query absent from this map simply hasn't been resolved yet (or was never queued) —
/// absence is not itself an answer.
#[derive(Debug, Default)]
pub struct PtaResult {
    answers: FxHashMap<PTQuery, Vec<Instance>>,
}

impl PtaResult {
    pub fn record(&mut self, query: PTQuery, instances: Vec<Instance>) {
        self.answers.entry(query).or_default().extend(instances);
    }

    pub fn get(&self, query: &PTQuery) -> Option<&[Instance]> {
        self.answers.get(query).map(Vec::as_slice)
    }
}

/// A named slot in the shared property map. Work units key their auxiliary state by a string tag
/// plus `Any`, the same pattern the teacher's solver uses for per-analysis scratch state, just
/// without the unsafe type-erased pointer bookkeeping — `Box<dyn Any>` downcasts safely.
#[derive(Default)]
pub struct PropertyMap {
    properties: FxHashMap<String, Box<dyn Any + Send + Sync>>,
}

impl PropertyMap {
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.properties.insert(key.into(), Box::new(value));
    }

    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.properties.get(key).and_then(|v| v.downcast_ref::<T>())
    }
}

#[derive(Default)]
pub struct PtStore {
    properties: RwLock<PropertyMap>,
    resolved: RwLock<PtaResult>,
}

impl PtStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, query: PTQuery, instances: Vec<Instance>) {
        self.resolved.write().record(query, instances);
    }

    pub fn get(&self, query: &PTQuery) -> Option<Vec<Instance>> {
        self.resolved.read().get(query).map(|s| s.to_vec())
    }

    pub fn with_properties<R>(&self, f: impl FnOnce(&PropertyMap) -> R) -> R {
        f(&self.properties.read())
    }

    pub fn with_properties_mut<R>(&self, f: impl FnOnce(&mut PropertyMap) -> R) -> R {
        f(&mut self.properties.write())
    }
}

//! Per-work-unit configuration (§1 ambient addition, grounded on `hir-analysis/src/config.rs`'s
//! `DataFlowConfig`).
//!
//! Every knob here is a plain field on a value threaded explicitly into each work-unit — never
//! module-global state (§9, "process-wide context-length knob": the source's
//! `Context.init_context_length(0)` is exactly the kind of global this config replaces).

use std::time::Duration;

const DEFAULT_FIXPOINT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct DataFlowConfig {
    /// Call-string length. Fixed at zero for this engine (§3, §9) but kept as an explicit field
    /// rather than a constant, matching the Design Notes' "replace global state" directive.
    context_length: u8,
    fixpoint_timeout: Duration,
    track_points_to: bool,
}

impl Default for DataFlowConfig {
    fn default() -> Self {
        Self {
            context_length: 0,
            fixpoint_timeout: DEFAULT_FIXPOINT_TIMEOUT,
            track_points_to: false,
        }
    }
}

impl DataFlowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub const fn context_length(&self) -> u8 {
        self.context_length
    }

    pub const fn fixpoint_timeout(&self) -> Duration {
        self.fixpoint_timeout
    }

    pub fn set_fixpoint_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.fixpoint_timeout = timeout;
        self
    }

    pub const fn track_points_to(&self) -> bool {
        self.track_points_to
    }

    /// Enable PT-WU's per-point query resolution for this work unit (§4.6). HS-WU-only work units
    /// leave this `false` and skip PT query bookkeeping entirely.
    pub fn set_track_points_to(&mut self, yes: bool) -> &mut Self {
        self.track_points_to = yes;
        self
    }
}

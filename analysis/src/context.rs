//! The call-string abstraction, flattened to length zero (§3, §9 "process-wide context-length
//! knob").
//!
//! The source analysis carries a process-global `Context.init_context_length(0)`. Here the length
//! is instead a field on [`crate::config::DataFlowConfig`], and `Context` itself is just the
//! sentinel `(signature, point)` pair the spec describes — never a real call string, since no
//! context ever grows past that sentinel.

use sa_ir::{location::LocationId, symbol::MethodSignature};

/// Distinguishes the synthetic entry point (where parameter facts are seeded) from an ordinary
/// program point within the method, without implying any actual call-string depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextPoint {
    Entry,
    At(LocationId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Context {
    pub signature: MethodSignature,
    pub point: ContextPoint,
}

impl Context {
    pub fn entry(signature: MethodSignature) -> Self {
        Self {
            signature,
            point: ContextPoint::Entry,
        }
    }

    pub fn at(signature: MethodSignature, location: LocationId) -> Self {
        Self {
            signature,
            point: ContextPoint::At(location),
        }
    }
}

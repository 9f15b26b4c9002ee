//! Fatal, work-unit-aborting errors (§7). Timeouts and missing callees are deliberately *not*
//! represented here: per the propagation policy, those never escape a work unit — they're
//! absorbed into a conservative summary (flagged `incomplete`) and logged, not returned as `Err`.
//! `AnalysisError` exists for the one genuinely work-unit-aborting condition this crate surfaces
//! outside of `panic!`/`unreachable!` invariant violations.

use std::time::Duration;

use sa_ir::symbol::MethodSignature;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("fixpoint for `{signature}` did not complete within {elapsed:?}")]
    Timeout { signature: MethodSignature, elapsed: Duration },
}

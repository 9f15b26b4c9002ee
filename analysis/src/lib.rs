//! Summary-based interprocedural points-to and heap-dataflow analysis, context-insensitive
//! (call-string length zero) over lowered [`sa_ir::method::MethodBody`]s (§1–§9).
//!
//! [`rfa`] is the per-method reaching-facts fixpoint; [`resolver::CallResolver`] is what it
//! delegates to at a call site; [`hswu`] and [`ptwu`] are the two work units built on top, each
//! publishing its results through a [`external::SummaryManager`] so a callee is only ever analyzed
//! once, regardless of how many call sites reach it.

pub mod config;
pub mod context;
pub mod error;
pub mod external;
pub mod fact;
pub mod heap_base;
pub mod heap_map;
pub mod hswu;
pub mod icfg;
pub mod instance;
pub mod ptstore;
pub mod ptwu;
pub mod resolver;
pub mod rfa;
pub mod slot;
pub mod summary;

pub use config::DataFlowConfig;
pub use context::{Context, ContextPoint};
pub use error::AnalysisError;
pub use fact::{FactSet, RFAFact};
pub use heap_base::{Access, HeapBase, Root};
pub use heap_map::HeapMap;
pub use icfg::Icfg;
pub use instance::{DefSite, Instance};
pub use resolver::CallResolver;
pub use slot::Slot;
pub use summary::{HeapOp, HeapSummaryRule, PTSummaryRule, Summary, SummaryRule};

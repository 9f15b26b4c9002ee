//! The IR model and AST-to-IR lowering for the summary-based points-to/heap dataflow engine.
//!
//! This crate owns the representation only: the three-address [`stmt::Stmt`] form, the
//! [`method::MethodBody`] container, and the [`lowering`] pass that produces one from a
//! [`ast::Stmt`] tree. Everything downstream of a lowered body — the ICFG, the reaching-facts
//! worklist, the heap algebra, summaries — lives in the `sa-analysis` crate.

pub mod ast;
pub mod error;
pub mod expr;
pub mod location;
pub mod lowering;
pub mod method;
pub mod print;
pub mod stmt;
pub mod symbol;
pub mod ty;

pub use error::LoweringError;
pub use lowering::{lower_method, LowerInput};
pub use method::MethodBody;

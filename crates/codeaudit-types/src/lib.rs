//! CodeAudit shared types
//!
//! Data model shared by every crate in the workspace: queued work items,
//! custom rule definitions, static-analysis results, oracle reports and the
//! final aggregate report, plus the error taxonomy.

#![warn(missing_docs)]

pub mod common;
pub mod error;
pub mod report;

pub use common::*;
pub use error::*;
pub use report::*;

//! Custom rule evaluation engine
//!
//! Evaluates user-authored rules against one source file. Rules are decoded
//! once into a compiled form; a rule that fails to compile or evaluate is
//! logged and skipped, never fatal to the run.

pub mod engine;

pub use engine::{CompiledRule, RuleEngine};

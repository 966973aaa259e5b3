//! CodeAudit submission pipeline
//!
//! The orchestrating state machine: receives work items from a queue,
//! drives router -> rule engine -> oracles -> aggregation -> persistence,
//! and manages status transitions and queue acknowledgement under an
//! at-least-once delivery model.

pub mod aggregate;
pub mod pipeline;
pub mod provider;
pub mod queue;
pub mod storage;
pub mod worker;

pub use aggregate::aggregate;
pub use pipeline::{Disposition, Pipeline};
pub use provider::{JsonRuleProvider, RuleProvider, StaticRuleProvider};
pub use queue::{Delivery, JobQueue, MemoryQueue};
pub use storage::{
    JsonResultStore, LocalSourceStore, MemoryResultStore, MemorySourceStore, ResultStore,
    SourceStore,
};
pub use worker::Worker;

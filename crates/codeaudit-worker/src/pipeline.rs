//! The submission processing state machine
//!
//! Drives one work item through fetch -> static analysis -> custom rules
//! -> oracles -> aggregation -> persistence, and decides how the queue
//! delivery is settled:
//!
//! - malformed payloads and permanent fetch failures are acknowledged
//!   (redelivery cannot fix them);
//! - any failure after the fetch leaves status `failed` and negative-
//!   acknowledges so the broker may redeliver (at-least-once contract);
//! - oracle failures are recovered locally with default reports and never
//!   fail the pipeline.

use crate::aggregate::aggregate;
use crate::provider::RuleProvider;
use crate::queue::Delivery;
use crate::storage::{ResultStore, SourceStore};
use codeaudit_adapters::{RefactoringOracle, ReviewOracle, SecurityOracle};
use codeaudit_analysis::LanguageRouter;
use codeaudit_rules::RuleEngine;
use codeaudit_types::{
    AuditError, RefactoringReport, ReviewReport, SecurityReport, StaticAnalysis, SubmissionStatus,
    WorkItem,
};
use std::sync::Arc;

/// How a handled delivery should be settled with the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Remove the message
    Ack,
    /// Return the message for redelivery
    Nack,
}

/// The orchestrating pipeline; one instance is shared by all worker tasks.
pub struct Pipeline {
    router: LanguageRouter,
    rules: Arc<dyn RuleProvider>,
    review: Arc<dyn ReviewOracle>,
    security: Arc<dyn SecurityOracle>,
    refactoring: Arc<dyn RefactoringOracle>,
    sources: Arc<dyn SourceStore>,
    results: Arc<dyn ResultStore>,
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators
    pub fn new(
        router: LanguageRouter,
        rules: Arc<dyn RuleProvider>,
        review: Arc<dyn ReviewOracle>,
        security: Arc<dyn SecurityOracle>,
        refactoring: Arc<dyn RefactoringOracle>,
        sources: Arc<dyn SourceStore>,
        results: Arc<dyn ResultStore>,
    ) -> Self {
        Pipeline {
            router,
            rules,
            review,
            security,
            refactoring,
            sources,
            results,
        }
    }

    /// Handle one queue delivery end to end
    pub async fn handle(&self, delivery: &Delivery) -> Disposition {
        let item: WorkItem = match serde_json::from_str(&delivery.payload) {
            Ok(item) => item,
            Err(e) => {
                // A payload that does not decode can never succeed; drop it.
                tracing::error!("malformed queue payload in delivery {}: {e}", delivery.id);
                return Disposition::Ack;
            }
        };
        self.process(&item).await
    }

    /// Process one decoded work item
    pub async fn process(&self, item: &WorkItem) -> Disposition {
        let submission_id = item.submission_id.as_str();
        tracing::info!("processing submission {submission_id}");

        let source = match self.sources.fetch(&item.source_locator).await {
            Ok(source) => source,
            Err(e) if e.is_permanent() => {
                tracing::error!("source for {submission_id} is gone: {e}");
                self.mark_failed(submission_id).await;
                return Disposition::Ack;
            }
            Err(e) => {
                tracing::error!("transient fetch failure for {submission_id}: {e}");
                self.mark_failed(submission_id).await;
                return Disposition::Nack;
            }
        };

        match self.run(item, &source).await {
            Ok(score) => {
                tracing::info!("completed submission {submission_id} (score: {score:.2}/100)");
                Disposition::Ack
            }
            Err(e) => {
                tracing::error!("processing failed for {submission_id}: {e}");
                self.mark_failed(submission_id).await;
                Disposition::Nack
            }
        }
    }

    /// Steps 2-7: analysis through persistence. Any error here surfaces to
    /// `process`, which settles the delivery as a redeliverable failure.
    async fn run(&self, item: &WorkItem, source: &str) -> Result<f64, AuditError> {
        let submission_id = item.submission_id.as_str();

        self.results
            .update_status(submission_id, SubmissionStatus::Processing)
            .await
            .map_err(AuditError::Storage)?;

        let mut static_analysis =
            self.router
                .analyze(source, &item.source_locator, Some(&item.language));
        tracing::debug!(
            "static analysis complete for {submission_id} ({})",
            static_analysis.language
        );

        // Snapshot the rule set once; it is read-only for this item.
        let rules = self.rules.enabled_rules().await.map_err(AuditError::Storage)?;
        if !rules.is_empty() {
            let engine = RuleEngine::new(&rules);
            let violations = engine.evaluate(source, &static_analysis.language, &static_analysis);
            tracing::debug!(
                "custom rules checked for {submission_id}: {} violations",
                violations.len()
            );
            static_analysis.custom_rule_violations = violations;
        }

        // The oracles are mutually independent; run them concurrently and
        // wait for all three before aggregating.
        let (review, security, refactoring) = tokio::join!(
            self.call_review(source, &static_analysis),
            self.call_security(source, &static_analysis),
            self.call_refactoring(source, &static_analysis),
        );

        let report = aggregate(item, static_analysis, review, security, refactoring);
        let overall_score = report.overall_score;

        self.results.save(&report).await.map_err(AuditError::Storage)?;
        self.results
            .update_status(submission_id, SubmissionStatus::Completed)
            .await
            .map_err(AuditError::Storage)?;

        Ok(overall_score)
    }

    async fn call_review(&self, source: &str, analysis: &StaticAnalysis) -> ReviewReport {
        match self.review.process(source, analysis).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("review oracle failed, using defaults: {e}");
                ReviewReport::default()
            }
        }
    }

    async fn call_security(&self, source: &str, analysis: &StaticAnalysis) -> SecurityReport {
        match self.security.process(source, analysis).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("security oracle failed, using defaults: {e}");
                SecurityReport::default()
            }
        }
    }

    async fn call_refactoring(
        &self,
        source: &str,
        analysis: &StaticAnalysis,
    ) -> RefactoringReport {
        match self.refactoring.process(source, analysis).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("refactoring oracle failed, using defaults: {e}");
                RefactoringReport::default()
            }
        }
    }

    /// Best-effort terminal failure mark; a store that is itself failing
    /// must not mask the original error.
    async fn mark_failed(&self, submission_id: &str) {
        if let Err(e) = self
            .results
            .update_status(submission_id, SubmissionStatus::Failed)
            .await
        {
            tracing::error!("could not record failed status for {submission_id}: {e}");
        }
    }
}

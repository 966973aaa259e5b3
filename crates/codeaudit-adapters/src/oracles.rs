//! Oracle traits and their LLM-backed implementations
//!
//! Transport failures (network, timeout, HTTP errors) surface as
//! [`OracleError`] for the pipeline to recover from. A response that
//! arrives but cannot be decoded as the expected JSON shape is recovered
//! here: the oracle returns its documented default report with the raw
//! text preserved where it is still useful.

use crate::ai::AiClient;
use crate::prompts;
use async_trait::async_trait;
use codeaudit_types::{
    OracleError, RefactoringReport, ReviewReport, SecurityReport, StaticAnalysis,
};
use std::sync::Arc;

/// Semantic code-review oracle
#[async_trait]
pub trait ReviewOracle: Send + Sync {
    /// Review one source file with its static analysis as context
    async fn process(
        &self,
        source: &str,
        analysis: &StaticAnalysis,
    ) -> Result<ReviewReport, OracleError>;
}

/// Security analysis oracle
#[async_trait]
pub trait SecurityOracle: Send + Sync {
    /// Assess one source file with its static analysis as context
    async fn process(
        &self,
        source: &str,
        analysis: &StaticAnalysis,
    ) -> Result<SecurityReport, OracleError>;
}

/// Refactoring suggestion oracle
#[async_trait]
pub trait RefactoringOracle: Send + Sync {
    /// Suggest refactorings for one source file
    async fn process(
        &self,
        source: &str,
        analysis: &StaticAnalysis,
    ) -> Result<RefactoringReport, OracleError>;
}

/// LLM-backed review oracle
pub struct LlmReviewOracle {
    client: Arc<AiClient>,
}

impl LlmReviewOracle {
    /// Create an oracle sharing the given client
    pub fn new(client: Arc<AiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReviewOracle for LlmReviewOracle {
    async fn process(
        &self,
        source: &str,
        analysis: &StaticAnalysis,
    ) -> Result<ReviewReport, OracleError> {
        let context = prompts::review_context(source, analysis);
        let response = self
            .client
            .chat(prompts::REVIEW_SYSTEM_PROMPT, &context)
            .await?;
        Ok(parse_review_response(&response))
    }
}

/// LLM-backed security oracle
pub struct LlmSecurityOracle {
    client: Arc<AiClient>,
}

impl LlmSecurityOracle {
    /// Create an oracle sharing the given client
    pub fn new(client: Arc<AiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecurityOracle for LlmSecurityOracle {
    async fn process(
        &self,
        source: &str,
        analysis: &StaticAnalysis,
    ) -> Result<SecurityReport, OracleError> {
        let context = prompts::security_context(source, analysis);
        let response = self
            .client
            .chat(prompts::SECURITY_SYSTEM_PROMPT, &context)
            .await?;
        Ok(parse_security_response(&response))
    }
}

/// LLM-backed refactoring oracle
pub struct LlmRefactoringOracle {
    client: Arc<AiClient>,
}

impl LlmRefactoringOracle {
    /// Create an oracle sharing the given client
    pub fn new(client: Arc<AiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RefactoringOracle for LlmRefactoringOracle {
    async fn process(
        &self,
        source: &str,
        analysis: &StaticAnalysis,
    ) -> Result<RefactoringReport, OracleError> {
        let context = prompts::refactoring_context(source, analysis);
        let response = self
            .client
            .chat(prompts::REFACTORING_SYSTEM_PROMPT, &context)
            .await?;
        Ok(parse_refactoring_response(&response))
    }
}

/// Extract a JSON object from a model response: a fenced ```json block
/// first, then the outermost brace pair.
fn extract_json(response: &str) -> Option<String> {
    if let Some(start) = response.find("```json") {
        let json_start = start + "```json".len();
        if let Some(end) = response[json_start..].find("```") {
            return Some(response[json_start..json_start + end].trim().to_string());
        }
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end > start {
        Some(response[start..=end].to_string())
    } else {
        None
    }
}

fn parse_review_response(response: &str) -> ReviewReport {
    if let Some(json) = extract_json(response) {
        match serde_json::from_str::<ReviewReport>(&json) {
            Ok(report) => return report,
            Err(e) => tracing::warn!("review response failed strict decode: {}", e),
        }
    }
    tracing::info!("using fallback review report");
    ReviewReport {
        suggestions: vec![response.chars().take(500).collect()],
        error: Some("Failed to parse oracle response as JSON".to_string()),
        ..ReviewReport::default()
    }
}

fn parse_security_response(response: &str) -> SecurityReport {
    if let Some(json) = extract_json(response) {
        match serde_json::from_str::<SecurityReport>(&json) {
            Ok(report) => return report,
            Err(e) => tracing::warn!("security response failed strict decode: {}", e),
        }
    }
    tracing::info!("using fallback security report");
    SecurityReport {
        error: Some("Failed to parse oracle response as JSON".to_string()),
        ..SecurityReport::default()
    }
}

fn parse_refactoring_response(response: &str) -> RefactoringReport {
    if let Some(json) = extract_json(response) {
        match serde_json::from_str::<RefactoringReport>(&json) {
            Ok(report) => return report,
            Err(e) => tracing::warn!("refactoring response failed strict decode: {}", e),
        }
    }
    tracing::info!("using fallback refactoring report");
    RefactoringReport {
        summary: response.chars().take(500).collect(),
        error: Some("Failed to parse oracle response as JSON".to_string()),
        ..RefactoringReport::default()
    }
}

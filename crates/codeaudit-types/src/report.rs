//! Oracle report shapes and the final aggregate report
//!
//! The three AI oracles return JSON that may be malformed or missing
//! fields. Each report decodes strictly with serde defaults so that a
//! partially valid response never produces a partially trusted value: a
//! field either decodes or takes its documented default.

use crate::common::{RuleViolation, StaticAnalysis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One issue raised by the semantic review oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewIssue {
    /// 1-based line, when the oracle attributes one
    #[serde(default)]
    pub line: Option<u32>,
    /// error / warning / info
    #[serde(default)]
    pub severity: Option<String>,
    /// Description of the issue
    pub message: String,
    /// performance / design / style / logic
    #[serde(default)]
    pub category: Option<String>,
}

/// Semantic code-review report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    /// Overall quality score, 0-100 (default 70 when omitted)
    #[serde(default = "default_review_score")]
    pub overall_score: f64,
    /// Issues found
    #[serde(default)]
    pub issues: Vec<ReviewIssue>,
    /// Actionable improvement suggestions
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Things done well
    #[serde(default)]
    pub positive_aspects: Vec<String>,
    /// Set when the oracle response could not be used as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_review_score() -> f64 {
    70.0
}

impl Default for ReviewReport {
    fn default() -> Self {
        ReviewReport {
            overall_score: 70.0,
            issues: Vec::new(),
            suggestions: Vec::new(),
            positive_aspects: Vec::new(),
            error: None,
        }
    }
}

/// One vulnerability raised by the security oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityVulnerability {
    /// critical / high / medium / low
    #[serde(default)]
    pub severity: Option<String>,
    /// injection / crypto / auth / data-exposure / ...
    #[serde(default)]
    pub category: Option<String>,
    /// Explanation of the risk
    pub description: String,
    /// 1-based line, when applicable
    #[serde(default)]
    pub line: Option<u32>,
    /// How to fix
    #[serde(default)]
    pub recommendation: Option<String>,
}

/// Security analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityReport {
    /// Security score, 0-100, higher is safer. Optional in the wire shape;
    /// [`SecurityReport::resolved_score`] derives one from the
    /// vulnerability list when the oracle omits it.
    #[serde(default)]
    pub security_score: Option<f64>,
    /// Vulnerabilities found
    #[serde(default)]
    pub vulnerabilities: Vec<SecurityVulnerability>,
    /// General security improvements
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Set when the oracle response could not be used as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SecurityReport {
    /// Score reported by the oracle, or derived from severities when
    /// absent: 100 minus 20 per critical and 10 per high, floored at 0.
    /// With no vulnerability data either, the neutral default 75.
    pub fn resolved_score(&self) -> f64 {
        if let Some(score) = self.security_score {
            return score;
        }
        if self.vulnerabilities.is_empty() {
            return 75.0;
        }
        let critical = self.count_severity("critical");
        let high = self.count_severity("high");
        (100.0 - 20.0 * critical as f64 - 10.0 * high as f64).max(0.0)
    }

    fn count_severity(&self, severity: &str) -> usize {
        self.vulnerabilities
            .iter()
            .filter(|v| v.severity.as_deref() == Some(severity))
            .count()
    }
}

impl Default for SecurityReport {
    fn default() -> Self {
        SecurityReport {
            security_score: Some(75.0),
            vulnerabilities: Vec::new(),
            recommendations: Vec::new(),
            error: None,
        }
    }
}

/// One refactoring suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefactoringSuggestion {
    /// extract-method / simplify / rename / pattern / performance
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// high / medium / low
    #[serde(default)]
    pub priority: Option<String>,
    /// What to refactor
    pub description: String,
    /// Why this improves the code
    #[serde(default)]
    pub rationale: Option<String>,
}

/// Refactoring analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefactoringReport {
    /// Refactoring score, 0-100 (default 70 when omitted)
    #[serde(default = "default_refactoring_score")]
    pub refactoring_score: f64,
    /// Concrete suggestions
    #[serde(default)]
    pub suggestions: Vec<RefactoringSuggestion>,
    /// Overall recommendation text
    #[serde(default = "default_refactoring_summary")]
    pub summary: String,
    /// Set when the oracle response could not be used as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_refactoring_score() -> f64 {
    70.0
}

fn default_refactoring_summary() -> String {
    "No major refactorings needed".to_string()
}

impl Default for RefactoringReport {
    fn default() -> Self {
        RefactoringReport {
            refactoring_score: 70.0,
            suggestions: Vec::new(),
            summary: default_refactoring_summary(),
            error: None,
        }
    }
}

/// The pipeline's final artifact: one immutable report per submission.
///
/// Raw per-source results are retained for audit and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Submission this report belongs to
    pub submission_id: String,
    /// Weighted overall score, 0-100, two decimals
    pub overall_score: f64,
    /// Semantic review score
    pub quality_score: f64,
    /// Security score
    pub security_score: f64,
    /// Maintainability index from static analysis
    pub maintainability_score: f64,
    /// Literal sum of review issues, vulnerabilities and rule violations
    pub issues_count: usize,
    /// Deterministic human-readable summary
    pub summary: String,
    /// Static analysis result, including merged rule violations
    pub static_analysis: StaticAnalysis,
    /// Raw semantic review report
    pub review: ReviewReport,
    /// Raw security report
    pub security: SecurityReport,
    /// Raw refactoring report
    pub refactoring: RefactoringReport,
    /// When aggregation finished
    pub completed_at: DateTime<Utc>,
}

impl AggregateReport {
    /// Rule violations merged into the static result by the pipeline
    pub fn rule_violations(&self) -> &[RuleViolation] {
        &self.static_analysis.custom_rule_violations
    }
}

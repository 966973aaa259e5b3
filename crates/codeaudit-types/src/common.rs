//! Core data model: work items, rules, violations and static analysis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of queued work: a submitted source file awaiting review.
///
/// Serialized as the queue message payload. `source_locator` is opaque to
/// the pipeline and only meaningful to the source store that resolves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique submission identifier
    pub submission_id: String,
    /// Opaque reference resolvable by the source store
    pub source_locator: String,
    /// Language tag supplied at intake, or "unknown"
    #[serde(default = "default_language")]
    pub language: String,
    /// When the item was enqueued
    #[serde(default = "Utc::now")]
    pub enqueued_at: DateTime<Utc>,
}

fn default_language() -> String {
    "unknown".to_string()
}

/// Lifecycle status of a submission.
///
/// Transitions run `Pending -> Processing -> {Completed, Failed}`.
/// `Completed` never reverts; a `Failed` item returns to `Processing`
/// when the broker redelivers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Queued, not yet picked up by a worker
    Pending,
    /// A worker is running the pipeline
    Processing,
    /// Report persisted successfully
    Completed,
    /// Terminal failure
    Failed,
}

impl SubmissionStatus {
    /// Whether this status ends a processing attempt
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Completed | SubmissionStatus::Failed)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Processing => "processing",
            SubmissionStatus::Completed => "completed",
            SubmissionStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Severity of a rule violation or finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Should be fixed
    Warning,
    /// Must be fixed
    Error,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Warning
    }
}

/// Evaluation strategy of a custom rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Per-line regular expression match
    Pattern,
    /// Declared identifiers must match an anchored pattern
    Naming,
    /// Per-function cyclomatic complexity threshold
    Complexity,
    /// Literal substrings that must not appear
    Forbidden,
}

/// Kind-specific rule configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Complexity rules: maximum allowed cyclomatic complexity (default 10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_complexity: Option<u32>,
    /// Forbidden rules: literal substrings to reject
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forbidden_items: Vec<String>,
}

/// One user-authored rule, as stored by configuration storage.
///
/// Read-only to the rule engine; decoded once into a compiled form before
/// evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Rule name, used in violation records
    pub name: String,
    /// Disabled rules are never evaluated
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Language tag this rule applies to, or "all"
    #[serde(default = "default_rule_language")]
    pub language: String,
    /// Evaluation strategy
    pub kind: RuleKind,
    /// Regex for pattern/naming rules; unused otherwise
    #[serde(default)]
    pub pattern: String,
    /// Severity attached to violations; per-kind default when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Message template included in violations
    #[serde(default)]
    pub message: String,
    /// Kind-specific configuration
    #[serde(default)]
    pub config: RuleConfig,
}

impl RuleDefinition {
    /// Severity for violations of this rule: the configured one, or the
    /// kind default. Forbidden rules are errors, everything else warns.
    pub fn effective_severity(&self) -> Severity {
        self.severity.unwrap_or(match self.kind {
            RuleKind::Forbidden => Severity::Error,
            _ => Severity::Warning,
        })
    }
}

fn default_enabled() -> bool {
    true
}

fn default_rule_language() -> String {
    "all".to_string()
}

/// One custom-rule match against a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    /// Name of the rule that matched
    pub rule_name: String,
    /// 1-based line number, when known
    pub line: Option<u32>,
    /// Severity copied from the rule
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Matched text, truncated to 100 characters
    pub matched_text: String,
}

/// A function declaration found by structural analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    /// Declared identifier
    pub name: String,
    /// 1-based declaration line
    pub line: u32,
    /// Cyclomatic complexity of the function body
    pub complexity: u32,
}

/// A class (or interface) declaration found by structural analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Declared identifier
    pub name: String,
    /// 1-based declaration line
    pub line: u32,
}

/// A syntax problem reported by the parser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxIssue {
    /// 1-based line, when the parser can attribute one
    pub line: Option<u32>,
    /// Parser message
    pub message: String,
}

/// A finding from the static security pattern scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityIssue {
    /// low / medium / high
    pub severity: String,
    /// 1-based line
    pub line: u32,
    /// What was found
    pub description: String,
}

/// Result of routed static analysis for one source file.
///
/// This is the contract every per-language analyzer fulfils; unsupported
/// languages get a degraded-but-valid instance (see the language router).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticAnalysis {
    /// Resolved language tag
    pub language: String,
    /// Whether the source parsed without errors
    pub syntax_valid: bool,
    /// Parser errors, when any
    #[serde(default)]
    pub syntax_errors: Vec<SyntaxIssue>,
    /// Function declarations with per-function complexity
    #[serde(default)]
    pub functions: Vec<FunctionInfo>,
    /// Class declarations
    #[serde(default)]
    pub classes: Vec<ClassInfo>,
    /// Maintainability index, 0-100, higher is better
    pub maintainability_index: f64,
    /// Findings from the security pattern scan
    #[serde(default)]
    pub security_issues: Vec<SecurityIssue>,
    /// Set when analysis was degraded (e.g. unsupported language)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Custom-rule violations merged in by the pipeline
    #[serde(default)]
    pub custom_rule_violations: Vec<RuleViolation>,
}

impl StaticAnalysis {
    /// Degraded result used when no analyzer is registered for a language:
    /// syntax assumed valid, neutral maintainability, explanatory error.
    pub fn unsupported(language: &str) -> Self {
        StaticAnalysis {
            language: language.to_string(),
            syntax_valid: true,
            syntax_errors: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            maintainability_index: 65.0,
            security_issues: Vec::new(),
            error: Some(format!("No analyzer available for language: {language}")),
            custom_rule_violations: Vec::new(),
        }
    }
}

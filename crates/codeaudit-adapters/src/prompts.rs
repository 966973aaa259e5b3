//! System prompts and context builders for the oracles

use codeaudit_types::StaticAnalysis;

/// Source excerpts sent to a model are capped at this many characters.
pub const SOURCE_EXCERPT_LIMIT: usize = 3000;

/// System prompt for the semantic review oracle
pub const REVIEW_SYSTEM_PROMPT: &str = "\
You are an expert code reviewer with deep knowledge of software engineering best practices.

Analyze code for quality, design, readability, performance, potential bugs and documentation.

Provide constructive, actionable feedback as JSON:
{
  \"overall_score\": <0-100>,
  \"issues\": [{\"line\": <line>, \"severity\": \"error|warning|info\", \"message\": \"...\", \"category\": \"performance|design|style|logic\"}],
  \"suggestions\": [\"...\"],
  \"positive_aspects\": [\"...\"]
}

Be specific and focus on teaching.";

/// System prompt for the security oracle
pub const SECURITY_SYSTEM_PROMPT: &str = "\
You are a security expert specializing in code security analysis.

Look for injection, XSS/CSRF, insecure auth, hardcoded secrets, unsafe
deserialization, path traversal and cryptographic issues.

Return findings as JSON:
{
  \"security_score\": <0-100, higher is safer>,
  \"vulnerabilities\": [{\"severity\": \"critical|high|medium|low\", \"category\": \"...\", \"description\": \"...\", \"line\": <line>, \"recommendation\": \"...\"}],
  \"recommendations\": [\"...\"]
}

Be thorough but avoid false positives.";

/// System prompt for the refactoring oracle
pub const REFACTORING_SYSTEM_PROMPT: &str = "\
You are a code refactoring expert who helps improve code structure and quality.

Suggest method extraction, complexity reduction, deduplication, naming and
design-pattern improvements.

Return suggestions as JSON:
{
  \"refactoring_score\": <0-100>,
  \"suggestions\": [{\"type\": \"extract-method|simplify|rename|pattern|performance\", \"priority\": \"high|medium|low\", \"description\": \"...\", \"rationale\": \"...\"}],
  \"summary\": \"...\"
}

Provide practical, implementable suggestions.";

fn excerpt(source: &str) -> String {
    source.chars().take(SOURCE_EXCERPT_LIMIT).collect()
}

/// User prompt for the review oracle: source plus static-analysis context
pub fn review_context(source: &str, analysis: &StaticAnalysis) -> String {
    let high_complexity = analysis.functions.iter().filter(|f| f.complexity > 10).count();
    format!(
        "Code to review:\n```\n{}\n```\n\nStatic analysis results:\n\
         - Syntax valid: {}\n\
         - High complexity functions: {}\n\
         - Maintainability index: {:.1}\n\
         - Language: {}\n\n\
         Please provide a comprehensive code review in the JSON format specified.",
        excerpt(source),
        analysis.syntax_valid,
        high_complexity,
        analysis.maintainability_index,
        analysis.language,
    )
}

/// User prompt for the security oracle: source plus scanner findings
pub fn security_context(source: &str, analysis: &StaticAnalysis) -> String {
    let findings = serde_json::to_string_pretty(
        &analysis.security_issues.iter().take(5).collect::<Vec<_>>(),
    )
    .unwrap_or_else(|_| "[]".to_string());
    format!(
        "Code to analyze:\n```\n{}\n```\n\nLanguage: {}\n\n\
         Automated security scan found {} potential issues:\n{}\n\n\
         Perform a comprehensive security assessment and return results in the JSON format specified.",
        excerpt(source),
        analysis.language,
        analysis.security_issues.len(),
        findings,
    )
}

/// User prompt for the refactoring oracle: source plus complexity context
pub fn refactoring_context(source: &str, analysis: &StaticAnalysis) -> String {
    let high: Vec<_> = analysis.functions.iter().filter(|f| f.complexity > 10).collect();
    let detail = if high.is_empty() {
        "None".to_string()
    } else {
        serde_json::to_string_pretty(&high.iter().take(3).collect::<Vec<_>>())
            .unwrap_or_else(|_| "[]".to_string())
    };
    format!(
        "Code to refactor:\n```\n{}\n```\n\nComplexity analysis:\n\
         - Functions with high complexity: {}\n{}\n\n\
         Language: {}\nMaintainability Index: {:.1}\n\n\
         Suggest practical refactorings to improve this code in the JSON format specified.",
        excerpt(source),
        high.len(),
        detail,
        analysis.language,
        analysis.maintainability_index,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_source_is_truncated() {
        let analysis = StaticAnalysis::unsupported("python");
        let prompt = review_context(&"x".repeat(10_000), &analysis);
        assert!(prompt.len() < 10_000);
    }
}

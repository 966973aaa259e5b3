//! The per-language static analyzer contract and its tree-sitter implementation

use crate::language::SupportedLanguage;
use crate::{security, structure};
use codeaudit_types::StaticAnalysis;

/// One registered per-language analyzer.
///
/// Implementations must never panic on arbitrary input; a file that cannot
/// be analyzed yields a degraded result with the `error` field set.
pub trait StaticAnalyzer: Send + Sync {
    /// Canonical tag of the language this analyzer handles
    fn language(&self) -> &str;

    /// Analyze one source file
    fn analyze(&self, source: &str, path: &str) -> StaticAnalysis;
}

/// Tree-sitter backed analyzer: syntax check, structural summary with
/// per-function cyclomatic complexity, maintainability index and the
/// security pattern scan.
pub struct TreeSitterAnalyzer {
    language: SupportedLanguage,
}

impl TreeSitterAnalyzer {
    /// Create an analyzer for the given language
    pub fn new(language: SupportedLanguage) -> Self {
        Self { language }
    }
}

impl StaticAnalyzer for TreeSitterAnalyzer {
    fn language(&self) -> &str {
        self.language.tag()
    }

    fn analyze(&self, source: &str, path: &str) -> StaticAnalysis {
        let tag = self.language.tag();

        let summary = match structure::analyze_structure(self.language, source) {
            Some(summary) => summary,
            None => {
                tracing::warn!("structural analysis unavailable for {path} ({tag})");
                let mut degraded = StaticAnalysis::unsupported(tag);
                degraded.error = Some(format!("Structural analysis failed for {tag}"));
                degraded.security_issues = security::scan(tag, source);
                return degraded;
            }
        };

        let maintainability_index = structure::maintainability_index(source, &summary.functions);

        StaticAnalysis {
            language: tag.to_string(),
            syntax_valid: summary.syntax_valid,
            syntax_errors: summary.syntax_errors,
            functions: summary.functions,
            classes: summary.classes,
            maintainability_index,
            security_issues: security::scan(tag, source),
            error: None,
            custom_rule_violations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_analysis_end_to_end() {
        let analyzer = TreeSitterAnalyzer::new(SupportedLanguage::Python);
        let result = analyzer.analyze("def run(flag):\n    if flag:\n        eval(flag)\n", "run.py");
        assert!(result.syntax_valid);
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].complexity, 2);
        assert_eq!(result.security_issues.len(), 1);
        assert!(result.error.is_none());
        assert!(result.maintainability_index > 0.0 && result.maintainability_index <= 100.0);
    }

    #[test]
    fn syntax_errors_reported_not_fatal() {
        let analyzer = TreeSitterAnalyzer::new(SupportedLanguage::Python);
        let result = analyzer.analyze("def broken(:\n", "broken.py");
        assert!(!result.syntax_valid);
        assert!(!result.syntax_errors.is_empty());
    }
}

//! Multi-source score aggregation

use chrono::Utc;
use codeaudit_types::{
    AggregateReport, RefactoringReport, ReviewReport, SecurityReport, StaticAnalysis, WorkItem,
};

const REVIEW_WEIGHT: f64 = 0.4;
const SECURITY_WEIGHT: f64 = 0.4;
const MAINTAINABILITY_WEIGHT: f64 = 0.2;

/// Clamp a score into the valid 0-100 range
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Combine the independently computed signals into one report.
///
/// Overall = review x 0.4 + security x 0.4 + maintainability x 0.2, every
/// input clamped to [0, 100] before weighting and the result rounded to
/// two decimals. `issues_count` is the literal sum of review issues,
/// vulnerabilities and rule violations.
pub fn aggregate(
    item: &WorkItem,
    static_analysis: StaticAnalysis,
    review: ReviewReport,
    security: SecurityReport,
    refactoring: RefactoringReport,
) -> AggregateReport {
    let quality_score = clamp_score(review.overall_score);
    let security_score = clamp_score(security.resolved_score());
    let maintainability_score = clamp_score(static_analysis.maintainability_index);

    let weighted = quality_score * REVIEW_WEIGHT
        + security_score * SECURITY_WEIGHT
        + maintainability_score * MAINTAINABILITY_WEIGHT;
    let overall_score = clamp_score((weighted * 100.0).round() / 100.0);

    let issues_count = review.issues.len()
        + security.vulnerabilities.len()
        + static_analysis.custom_rule_violations.len();

    let summary = summarize(
        overall_score,
        review.issues.len(),
        security.vulnerabilities.len(),
    );

    AggregateReport {
        submission_id: item.submission_id.clone(),
        overall_score,
        quality_score,
        security_score,
        maintainability_score,
        issues_count,
        summary,
        static_analysis,
        review,
        security,
        refactoring,
        completed_at: Utc::now(),
    }
}

fn summarize(overall_score: f64, issues: usize, vulnerabilities: usize) -> String {
    let verdict = if overall_score >= 80.0 {
        "The code is of good quality with minor improvements needed."
    } else if overall_score >= 60.0 {
        "The code is acceptable but has room for improvement."
    } else {
        "The code needs significant improvements."
    };
    format!(
        "Overall Score: {overall_score:.2}/100. \
         Found {issues} code quality issues and {vulnerabilities} security concerns. \
         {verdict}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use codeaudit_types::{RuleViolation, SecurityVulnerability, Severity};

    fn item() -> WorkItem {
        WorkItem {
            submission_id: "s-1".to_string(),
            source_locator: "uploads/s-1.py".to_string(),
            language: "python".to_string(),
            enqueued_at: Utc::now(),
        }
    }

    fn static_with_mi(mi: f64) -> StaticAnalysis {
        let mut analysis = StaticAnalysis::unsupported("python");
        analysis.maintainability_index = mi;
        analysis.error = None;
        analysis
    }

    fn review_with_score(score: f64) -> ReviewReport {
        ReviewReport {
            overall_score: score,
            ..ReviewReport::default()
        }
    }

    fn security_with_score(score: f64) -> SecurityReport {
        SecurityReport {
            security_score: Some(score),
            ..SecurityReport::default()
        }
    }

    #[test]
    fn weighted_example_from_design() {
        // 90 x 0.4 + 80 x 0.4 + 70 x 0.2 = 82.00
        let report = aggregate(
            &item(),
            static_with_mi(70.0),
            review_with_score(90.0),
            security_with_score(80.0),
            RefactoringReport::default(),
        );
        assert_eq!(report.overall_score, 82.0);
        assert_eq!(report.quality_score, 90.0);
        assert_eq!(report.security_score, 80.0);
        assert_eq!(report.maintainability_score, 70.0);
    }

    #[test]
    fn out_of_range_scores_clamped_before_weighting() {
        let report = aggregate(
            &item(),
            static_with_mi(200.0),
            review_with_score(150.0),
            security_with_score(-20.0),
            RefactoringReport::default(),
        );
        // 100 x 0.4 + 0 x 0.4 + 100 x 0.2
        assert_eq!(report.overall_score, 60.0);
        assert!(report.overall_score >= 0.0 && report.overall_score <= 100.0);
    }

    #[test]
    fn issues_count_is_literal_sum() {
        let mut static_analysis = static_with_mi(70.0);
        static_analysis.custom_rule_violations = vec![RuleViolation {
            rule_name: "no-eval".to_string(),
            line: Some(1),
            severity: Severity::Error,
            message: "Forbidden item found: 'eval('".to_string(),
            matched_text: "eval(x)".to_string(),
        }];
        let mut review = review_with_score(90.0);
        review.issues = serde_json::from_str(r#"[{"message":"a"},{"message":"b"}]"#).unwrap();
        let mut security = security_with_score(80.0);
        security.vulnerabilities = vec![SecurityVulnerability {
            severity: Some("high".to_string()),
            category: None,
            description: "weak hash".to_string(),
            line: None,
            recommendation: None,
        }];

        let report = aggregate(
            &item(),
            static_analysis,
            review,
            security,
            RefactoringReport::default(),
        );
        assert_eq!(report.issues_count, 4);
        assert!(report.summary.contains("2 code quality issues"));
        assert!(report.summary.contains("1 security concerns"));
    }

    #[test]
    fn summary_bands() {
        assert!(summarize(85.0, 0, 0).contains("good quality"));
        assert!(summarize(80.0, 0, 0).contains("good quality"));
        assert!(summarize(65.0, 0, 0).contains("room for improvement"));
        assert!(summarize(59.9, 0, 0).contains("significant improvements"));
    }

    #[test]
    fn defaults_apply_when_sources_are_defaulted() {
        // Defaulted reports carry 70 / 75; neutral maintainability is 65.
        let report = aggregate(
            &item(),
            StaticAnalysis::unsupported("cobol"),
            ReviewReport::default(),
            SecurityReport::default(),
            RefactoringReport::default(),
        );
        // 70 x 0.4 + 75 x 0.4 + 65 x 0.2 = 71.00
        assert_eq!(report.overall_score, 71.0);
    }
}

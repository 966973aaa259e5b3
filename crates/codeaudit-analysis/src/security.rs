//! Line-level security pattern scan
//!
//! A cheap, black-box stand-in for an external scanner: a fixed table of
//! dangerous substrings per language, checked verbatim against every line.
//! The AI security oracle does the deeper assessment; these findings give
//! it concrete context.

use codeaudit_types::SecurityIssue;

struct SecurityPattern {
    needle: &'static str,
    severity: &'static str,
    description: &'static str,
}

const COMMON_PATTERNS: &[SecurityPattern] = &[
    SecurityPattern {
        needle: "password =",
        severity: "medium",
        description: "Possible hardcoded password",
    },
    SecurityPattern {
        needle: "api_key =",
        severity: "medium",
        description: "Possible hardcoded API key",
    },
    SecurityPattern {
        needle: "secret =",
        severity: "medium",
        description: "Possible hardcoded secret",
    },
];

const PYTHON_PATTERNS: &[SecurityPattern] = &[
    SecurityPattern {
        needle: "eval(",
        severity: "high",
        description: "Use of eval() with dynamic input",
    },
    SecurityPattern {
        needle: "exec(",
        severity: "high",
        description: "Use of exec() with dynamic input",
    },
    SecurityPattern {
        needle: "pickle.loads(",
        severity: "high",
        description: "Unsafe deserialization via pickle",
    },
    SecurityPattern {
        needle: "os.system(",
        severity: "high",
        description: "Shell command execution via os.system",
    },
    SecurityPattern {
        needle: "shell=True",
        severity: "high",
        description: "subprocess invoked with shell=True",
    },
    SecurityPattern {
        needle: "hashlib.md5(",
        severity: "low",
        description: "Weak hash algorithm MD5",
    },
];

const JAVASCRIPT_PATTERNS: &[SecurityPattern] = &[
    SecurityPattern {
        needle: "eval(",
        severity: "high",
        description: "Use of eval() with dynamic input",
    },
    SecurityPattern {
        needle: "new Function(",
        severity: "high",
        description: "Dynamic code construction via Function",
    },
    SecurityPattern {
        needle: ".innerHTML",
        severity: "medium",
        description: "Direct innerHTML assignment (XSS risk)",
    },
    SecurityPattern {
        needle: "document.write(",
        severity: "medium",
        description: "document.write with dynamic content (XSS risk)",
    },
];

const JAVA_PATTERNS: &[SecurityPattern] = &[
    SecurityPattern {
        needle: "Runtime.getRuntime().exec",
        severity: "high",
        description: "Shell command execution via Runtime.exec",
    },
    SecurityPattern {
        needle: "createStatement(",
        severity: "medium",
        description: "Raw SQL statement (prefer prepared statements)",
    },
    SecurityPattern {
        needle: "MessageDigest.getInstance(\"MD5\")",
        severity: "low",
        description: "Weak hash algorithm MD5",
    },
];

fn patterns_for(language: &str) -> &'static [SecurityPattern] {
    match language {
        "python" => PYTHON_PATTERNS,
        "javascript" | "typescript" => JAVASCRIPT_PATTERNS,
        "java" => JAVA_PATTERNS,
        _ => &[],
    }
}

/// Scan every line of `source` for the common and language-specific
/// patterns; one issue per (line, pattern) hit, in line order.
pub fn scan(language: &str, source: &str) -> Vec<SecurityIssue> {
    let language_patterns = patterns_for(language);
    let mut issues = Vec::new();

    for (index, line) in source.lines().enumerate() {
        for pattern in COMMON_PATTERNS.iter().chain(language_patterns) {
            if line.contains(pattern.needle) {
                issues.push(SecurityIssue {
                    severity: pattern.severity.to_string(),
                    line: index as u32 + 1,
                    description: pattern.description.to_string(),
                });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_eval_flagged() {
        let issues = scan("python", "x = 1\ny = eval(user_input)\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 2);
        assert_eq!(issues[0].severity, "high");
    }

    #[test]
    fn common_patterns_apply_everywhere() {
        let issues = scan("go", "password = \"hunter2\"\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, "medium");
    }

    #[test]
    fn clean_source_produces_no_issues() {
        assert!(scan("python", "def add(a, b):\n    return a + b\n").is_empty());
    }
}

//! Rule compilation and evaluation

use codeaudit_types::{RuleDefinition, RuleKind, RuleViolation, Severity, StaticAnalysis};
use regex::Regex;

const MATCHED_TEXT_LIMIT: usize = 100;

/// A rule decoded into its evaluation strategy.
///
/// Compilation happens once per rule set; invalid patterns are rejected
/// here so evaluation itself cannot fail.
pub struct CompiledRule {
    name: String,
    language: String,
    severity: Severity,
    message: String,
    check: RuleCheck,
}

enum RuleCheck {
    /// Per-line regex search
    Pattern(Regex),
    /// Anchored prefix match against declared identifiers
    Naming(Regex),
    /// Per-function cyclomatic complexity threshold
    Complexity { max_complexity: u32 },
    /// Literal substrings that must not appear on any line
    Forbidden { items: Vec<String> },
}

impl CompiledRule {
    fn compile(definition: &RuleDefinition) -> Option<Self> {
        let check = match definition.kind {
            RuleKind::Pattern => {
                if definition.pattern.is_empty() {
                    tracing::warn!("rule '{}' has no pattern, skipping", definition.name);
                    return None;
                }
                match Regex::new(&definition.pattern) {
                    Ok(regex) => RuleCheck::Pattern(regex),
                    Err(e) => {
                        tracing::warn!(
                            "invalid regex pattern in rule '{}', skipping: {}",
                            definition.name,
                            e
                        );
                        return None;
                    }
                }
            }
            RuleKind::Naming => {
                if definition.pattern.is_empty() {
                    tracing::warn!("rule '{}' has no pattern, skipping", definition.name);
                    return None;
                }
                // Prefix semantics: the identifier must match from its
                // first character, like a `match` rather than a `search`.
                match Regex::new(&format!(r"\A(?:{})", definition.pattern)) {
                    Ok(regex) => RuleCheck::Naming(regex),
                    Err(e) => {
                        tracing::warn!(
                            "invalid regex pattern in rule '{}', skipping: {}",
                            definition.name,
                            e
                        );
                        return None;
                    }
                }
            }
            RuleKind::Complexity => RuleCheck::Complexity {
                max_complexity: definition.config.max_complexity.unwrap_or(10),
            },
            RuleKind::Forbidden => RuleCheck::Forbidden {
                items: definition.config.forbidden_items.clone(),
            },
        };

        Some(CompiledRule {
            name: definition.name.clone(),
            language: definition.language.clone(),
            severity: definition.effective_severity(),
            message: definition.message.clone(),
            check,
        })
    }

    fn applies_to(&self, language: &str) -> bool {
        self.language == "all" || self.language == language
    }

    fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.message.is_empty() {
            fallback
        } else {
            &self.message
        }
    }

    fn violation(&self, line: Option<u32>, message: String, matched_text: &str) -> RuleViolation {
        RuleViolation {
            rule_name: self.name.clone(),
            line,
            severity: self.severity,
            message,
            matched_text: truncate(matched_text),
        }
    }
}

/// Evaluates a compiled rule set against source files.
///
/// Evaluation is a pure function of (rules, source, static analysis):
/// the same inputs always yield the same violation list, concatenated in
/// rule-definition order with line order within each rule.
pub struct RuleEngine {
    rules: Vec<CompiledRule>,
}

impl RuleEngine {
    /// Compile a rule set, dropping disabled and malformed rules
    pub fn new(definitions: &[RuleDefinition]) -> Self {
        let rules = definitions
            .iter()
            .filter(|d| d.enabled)
            .filter_map(CompiledRule::compile)
            .collect();
        RuleEngine { rules }
    }

    /// Number of rules that survived compilation
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules survived compilation
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every applicable rule against one source file.
    ///
    /// `analysis` supplies the structural context (declarations and
    /// per-function complexity) that naming and complexity rules need.
    pub fn evaluate(
        &self,
        source: &str,
        language: &str,
        analysis: &StaticAnalysis,
    ) -> Vec<RuleViolation> {
        let mut violations = Vec::new();

        for rule in self.rules.iter().filter(|r| r.applies_to(language)) {
            match &rule.check {
                RuleCheck::Pattern(regex) => check_pattern(rule, regex, source, &mut violations),
                RuleCheck::Naming(regex) => check_naming(rule, regex, analysis, &mut violations),
                RuleCheck::Complexity { max_complexity } => {
                    check_complexity(rule, *max_complexity, analysis, &mut violations)
                }
                RuleCheck::Forbidden { items } => {
                    check_forbidden(rule, items, source, &mut violations)
                }
            }
        }

        violations
    }
}

fn check_pattern(rule: &CompiledRule, regex: &Regex, source: &str, out: &mut Vec<RuleViolation>) {
    for (index, line) in source.lines().enumerate() {
        if regex.is_match(line) {
            out.push(rule.violation(
                Some(index as u32 + 1),
                rule.message_or("Pattern matched").to_string(),
                line.trim(),
            ));
        }
    }
}

fn check_naming(
    rule: &CompiledRule,
    regex: &Regex,
    analysis: &StaticAnalysis,
    out: &mut Vec<RuleViolation>,
) {
    // Syntax errors are surfaced by the syntax-check stage; identifiers in
    // a broken tree are not worth reporting on.
    if !analysis.syntax_valid {
        return;
    }

    let fallback = "Naming violation";
    let mut found: Vec<RuleViolation> = Vec::new();

    for function in &analysis.functions {
        if !regex.is_match(&function.name) {
            found.push(rule.violation(
                Some(function.line),
                format!("{}: '{}'", rule.message_or(fallback), function.name),
                &function.name,
            ));
        }
    }
    for class in &analysis.classes {
        if !regex.is_match(&class.name) {
            found.push(rule.violation(
                Some(class.line),
                format!("{}: '{}'", rule.message_or(fallback), class.name),
                &class.name,
            ));
        }
    }

    found.sort_by_key(|v| v.line);
    out.extend(found);
}

fn check_complexity(
    rule: &CompiledRule,
    max_complexity: u32,
    analysis: &StaticAnalysis,
    out: &mut Vec<RuleViolation>,
) {
    for function in &analysis.functions {
        if function.complexity > max_complexity {
            out.push(rule.violation(
                Some(function.line),
                format!(
                    "{}: {} exceeds {}",
                    rule.message_or("High complexity"),
                    function.complexity,
                    max_complexity
                ),
                &function.name,
            ));
        }
    }
}

fn check_forbidden(
    rule: &CompiledRule,
    items: &[String],
    source: &str,
    out: &mut Vec<RuleViolation>,
) {
    for (index, line) in source.lines().enumerate() {
        for item in items {
            if line.contains(item.as_str()) {
                out.push(rule.violation(
                    Some(index as u32 + 1),
                    format!("{}: '{}'", rule.message_or("Forbidden item found"), item),
                    line.trim(),
                ));
            }
        }
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(MATCHED_TEXT_LIMIT).collect()
}

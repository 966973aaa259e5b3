//! Structural analysis: declarations, complexity and maintainability

use crate::language::SupportedLanguage;
use codeaudit_types::{ClassInfo, FunctionInfo, SyntaxIssue};
use tree_sitter::{Node, Parser};

/// Cap on collected parser errors; a badly broken file would otherwise
/// produce one issue per token.
const MAX_SYNTAX_ISSUES: usize = 10;

/// Structural summary of one parsed source file
#[derive(Debug, Clone, Default)]
pub struct StructuralSummary {
    /// Whether the parse tree is free of error nodes
    pub syntax_valid: bool,
    /// Collected parser errors (bounded)
    pub syntax_errors: Vec<SyntaxIssue>,
    /// Function declarations with cyclomatic complexity
    pub functions: Vec<FunctionInfo>,
    /// Class declarations
    pub classes: Vec<ClassInfo>,
}

/// Parse `source` with the grammar for `language` and extract declarations.
///
/// Returns `None` when the parser cannot be constructed or produces no
/// tree; callers degrade to an analysis without structure in that case.
pub fn analyze_structure(language: SupportedLanguage, source: &str) -> Option<StructuralSummary> {
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(language.grammar()) {
        tracing::error!("failed to load {} grammar: {}", language.tag(), e);
        return None;
    }
    let tree = parser.parse(source, None)?;
    let root = tree.root_node();

    let mut summary = StructuralSummary {
        syntax_valid: !root.has_error(),
        ..Default::default()
    };

    collect(root, source, language, &mut summary);
    Some(summary)
}

fn collect(node: Node, source: &str, language: SupportedLanguage, summary: &mut StructuralSummary) {
    let kind = node.kind();

    if (node.is_error() || node.is_missing()) && summary.syntax_errors.len() < MAX_SYNTAX_ISSUES {
        summary.syntax_errors.push(SyntaxIssue {
            line: Some(node.start_position().row as u32 + 1),
            message: if node.is_missing() {
                format!("missing {kind}")
            } else {
                "syntax error".to_string()
            },
        });
    }

    if language.function_kinds().contains(&kind) {
        if let Some(name) = identifier(node, source) {
            summary.functions.push(FunctionInfo {
                name,
                line: node.start_position().row as u32 + 1,
                complexity: cyclomatic_complexity(node, language),
            });
        }
    } else if language.class_kinds().contains(&kind) {
        if let Some(name) = identifier(node, source) {
            summary.classes.push(ClassInfo {
                name,
                line: node.start_position().row as u32 + 1,
            });
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, source, language, summary);
    }
}

fn identifier(node: Node, source: &str) -> Option<String> {
    let name_node = node.child_by_field_name("name")?;
    name_node
        .utf8_text(source.as_bytes())
        .ok()
        .map(|s| s.to_string())
}

/// Decision-point count plus one, over the function's whole subtree
fn cyclomatic_complexity(node: Node, language: SupportedLanguage) -> u32 {
    let mut count = 1u32;
    count_decisions(node, language, &mut count);
    count
}

fn count_decisions(node: Node, language: SupportedLanguage, count: &mut u32) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if language.decision_kinds().contains(&child.kind()) {
            *count += 1;
        }
        count_decisions(child, language, count);
    }
}

/// Maintainability index, 0-100, higher is better.
///
/// Variant of the classic formula without the Halstead term:
/// `171 - 0.23 * total_complexity - 16.2 * ln(loc)`, normalized to 0-100.
pub fn maintainability_index(source: &str, functions: &[FunctionInfo]) -> f64 {
    let loc = source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count()
        .max(1) as f64;
    let total_complexity: u32 = functions.iter().map(|f| f.complexity).sum();

    let raw = 171.0 - 0.23 * total_complexity as f64 - 16.2 * loc.ln();
    (raw * 100.0 / 171.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYTHON_SOURCE: &str = r#"
class ReportBuilder:
    def build(self, items):
        if not items:
            return None
        out = []
        for item in items:
            if item.ok:
                out.append(item)
        return out

def helper():
    return 1
"#;

    #[test]
    fn python_declarations_extracted() {
        let summary = analyze_structure(SupportedLanguage::Python, PYTHON_SOURCE).unwrap();
        assert!(summary.syntax_valid);
        let names: Vec<_> = summary.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["build", "helper"]);
        assert_eq!(summary.classes.len(), 1);
        assert_eq!(summary.classes[0].name, "ReportBuilder");
    }

    #[test]
    fn complexity_counts_branches() {
        let summary = analyze_structure(SupportedLanguage::Python, PYTHON_SOURCE).unwrap();
        let build = summary.functions.iter().find(|f| f.name == "build").unwrap();
        // 1 + two ifs + one for
        assert_eq!(build.complexity, 4);
        let helper = summary.functions.iter().find(|f| f.name == "helper").unwrap();
        assert_eq!(helper.complexity, 1);
    }

    #[test]
    fn broken_python_flagged_invalid() {
        let summary =
            analyze_structure(SupportedLanguage::Python, "def broken(:\n    pass\n").unwrap();
        assert!(!summary.syntax_valid);
        assert!(!summary.syntax_errors.is_empty());
    }

    #[test]
    fn javascript_functions_extracted() {
        let source = "function add(a, b) { return a + b; }\nclass Box {}\n";
        let summary = analyze_structure(SupportedLanguage::JavaScript, source).unwrap();
        assert_eq!(summary.functions.len(), 1);
        assert_eq!(summary.functions[0].name, "add");
        assert_eq!(summary.classes[0].name, "Box");
    }

    #[test]
    fn java_methods_extracted() {
        let source = r#"
public class Main {
    public static void main(String[] args) {
        if (args.length > 0) {
            System.out.println(args[0]);
        }
    }
}
"#;
        let summary = analyze_structure(SupportedLanguage::Java, source).unwrap();
        assert_eq!(summary.classes[0].name, "Main");
        assert_eq!(summary.functions[0].name, "main");
        assert_eq!(summary.functions[0].complexity, 2);
    }

    #[test]
    fn maintainability_bounded() {
        let mi = maintainability_index("", &[]);
        assert!(mi >= 0.0 && mi <= 100.0);
        let heavy: Vec<FunctionInfo> = (0..50)
            .map(|i| FunctionInfo {
                name: format!("f{i}"),
                line: 1,
                complexity: 30,
            })
            .collect();
        let mi = maintainability_index("line\n".repeat(500).as_str(), &heavy);
        assert!(mi >= 0.0 && mi <= 100.0);
    }
}

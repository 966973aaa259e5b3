//! Supported languages and their tree-sitter grammar bindings

use tree_sitter::Language;

/// Languages with a bundled tree-sitter grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedLanguage {
    /// Python
    Python,
    /// JavaScript (also used for TypeScript submissions)
    JavaScript,
    /// Java
    Java,
}

impl SupportedLanguage {
    /// The tree-sitter grammar for this language
    pub fn grammar(&self) -> Language {
        match self {
            SupportedLanguage::Python => tree_sitter_python::language(),
            SupportedLanguage::JavaScript => tree_sitter_javascript::language(),
            SupportedLanguage::Java => tree_sitter_java::language(),
        }
    }

    /// Canonical language tag
    pub fn tag(&self) -> &'static str {
        match self {
            SupportedLanguage::Python => "python",
            SupportedLanguage::JavaScript => "javascript",
            SupportedLanguage::Java => "java",
        }
    }

    /// Node kinds that declare a function or method
    pub fn function_kinds(&self) -> &'static [&'static str] {
        match self {
            SupportedLanguage::Python => &["function_definition"],
            SupportedLanguage::JavaScript => &[
                "function_declaration",
                "generator_function_declaration",
                "method_definition",
            ],
            SupportedLanguage::Java => &["method_declaration", "constructor_declaration"],
        }
    }

    /// Node kinds that declare a class or interface
    pub fn class_kinds(&self) -> &'static [&'static str] {
        match self {
            SupportedLanguage::Python => &["class_definition"],
            SupportedLanguage::JavaScript => &["class_declaration"],
            SupportedLanguage::Java => &["class_declaration", "interface_declaration"],
        }
    }

    /// Node kinds that add a decision point for cyclomatic complexity
    pub fn decision_kinds(&self) -> &'static [&'static str] {
        match self {
            SupportedLanguage::Python => &[
                "if_statement",
                "elif_clause",
                "for_statement",
                "while_statement",
                "except_clause",
                "conditional_expression",
                "boolean_operator",
                "case_clause",
            ],
            SupportedLanguage::JavaScript => &[
                "if_statement",
                "for_statement",
                "for_in_statement",
                "while_statement",
                "do_statement",
                "switch_case",
                "catch_clause",
                "ternary_expression",
            ],
            SupportedLanguage::Java => &[
                "if_statement",
                "for_statement",
                "enhanced_for_statement",
                "while_statement",
                "do_statement",
                "switch_label",
                "catch_clause",
                "ternary_expression",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_stable() {
        assert_eq!(SupportedLanguage::Python.tag(), "python");
        assert_eq!(SupportedLanguage::JavaScript.tag(), "javascript");
        assert_eq!(SupportedLanguage::Java.tag(), "java");
    }
}

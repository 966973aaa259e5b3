//! Static analysis for CodeAudit
//!
//! Per-language analyzers built on tree-sitter (syntax check, structural
//! summary, cyclomatic complexity, maintainability index, security pattern
//! scan) and the language router that dispatches a source file to the right
//! analyzer.

pub mod analyzer;
pub mod language;
pub mod router;
pub mod security;
pub mod structure;

pub use analyzer::{StaticAnalyzer, TreeSitterAnalyzer};
pub use language::SupportedLanguage;
pub use router::LanguageRouter;

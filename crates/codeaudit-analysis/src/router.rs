//! Language detection and analyzer dispatch

use crate::analyzer::{StaticAnalyzer, TreeSitterAnalyzer};
use crate::language::SupportedLanguage;
use codeaudit_types::StaticAnalysis;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Arc;

lazy_static! {
    static ref EXTENSION_MAP: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("py", "python");
        map.insert("js", "javascript");
        map.insert("jsx", "javascript");
        map.insert("ts", "typescript");
        map.insert("tsx", "typescript");
        map.insert("java", "java");
        map.insert("rs", "rust");
        map.insert("cpp", "cpp");
        map.insert("c", "c");
        map.insert("go", "go");
        map.insert("rb", "ruby");
        map.insert("php", "php");
        map
    };
}

/// Routes a source file to the analyzer registered for its language.
///
/// Unregistered languages resolve to a degraded default result instead of
/// an error: analysis never fails merely because a language is unsupported.
pub struct LanguageRouter {
    analyzers: HashMap<String, Arc<dyn StaticAnalyzer>>,
}

impl Default for LanguageRouter {
    fn default() -> Self {
        let mut router = LanguageRouter {
            analyzers: HashMap::new(),
        };
        router.register("python", Arc::new(TreeSitterAnalyzer::new(SupportedLanguage::Python)));
        let javascript = Arc::new(TreeSitterAnalyzer::new(SupportedLanguage::JavaScript));
        router.register("javascript", javascript.clone());
        // TypeScript rides on the JavaScript grammar; good enough for the
        // structural checks we run.
        router.register("typescript", javascript);
        router.register("java", Arc::new(TreeSitterAnalyzer::new(SupportedLanguage::Java)));
        router
    }
}

impl LanguageRouter {
    /// Router with the built-in analyzers registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an analyzer for a language tag
    pub fn register(&mut self, tag: &str, analyzer: Arc<dyn StaticAnalyzer>) {
        self.analyzers.insert(tag.to_string(), analyzer);
    }

    /// Detect the language of a file from its extension, falling back to
    /// coarse content heuristics, then `"unknown"`.
    pub fn detect_language(&self, file_path: &str, source: &str) -> &'static str {
        if let Some(extension) = file_path.rsplit_once('.').map(|(_, ext)| ext) {
            if let Some(language) = EXTENSION_MAP.get(extension.to_lowercase().as_str()) {
                return language;
            }
        }
        if !source.is_empty() {
            return detect_from_content(source);
        }
        "unknown"
    }

    /// Run static analysis, resolving the language first when the caller
    /// does not supply one (or supplies `"unknown"`).
    pub fn analyze(&self, source: &str, file_path: &str, language: Option<&str>) -> StaticAnalysis {
        let language = match language {
            Some(tag) if tag != "unknown" => tag.to_string(),
            _ => self.detect_language(file_path, source).to_string(),
        };

        match self.analyzers.get(&language) {
            Some(analyzer) => {
                tracing::debug!("analyzing {file_path} as {language}");
                let mut result = analyzer.analyze(source, file_path);
                result.language = language;
                result
            }
            None => {
                tracing::info!("no analyzer registered for {language}, returning degraded result");
                StaticAnalysis::unsupported(&language)
            }
        }
    }
}

/// Keyword heuristics for files without a recognizable extension
fn detect_from_content(source: &str) -> &'static str {
    if source.contains("def ") && source.contains("import ") {
        "python"
    } else if source.contains("function ") || source.contains("const ") || source.contains("let ")
    {
        "javascript"
    } else if source.contains("public class ") || source.contains("public static void main") {
        "java"
    } else {
        "unknown"
    }
}

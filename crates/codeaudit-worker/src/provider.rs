//! Rule providers: where the pipeline snapshots enabled rules from

use async_trait::async_trait;
use codeaudit_types::{RuleDefinition, StorageError};
use std::path::PathBuf;

/// Supplies the enabled rule definitions for one evaluation pass.
///
/// The pipeline snapshots the rule set once per work item; the snapshot is
/// read-only for the rest of that item's processing.
#[async_trait]
pub trait RuleProvider: Send + Sync {
    /// Enabled rules applicable to this deployment
    async fn enabled_rules(&self) -> Result<Vec<RuleDefinition>, StorageError>;
}

/// Fixed rule set, used by tests and embedded deployments
pub struct StaticRuleProvider {
    rules: Vec<RuleDefinition>,
}

impl StaticRuleProvider {
    /// Provider returning exactly `rules` (disabled ones filtered out)
    pub fn new(rules: Vec<RuleDefinition>) -> Self {
        StaticRuleProvider { rules }
    }

    /// Provider with no rules
    pub fn empty() -> Self {
        StaticRuleProvider { rules: Vec::new() }
    }
}

#[async_trait]
impl RuleProvider for StaticRuleProvider {
    async fn enabled_rules(&self) -> Result<Vec<RuleDefinition>, StorageError> {
        Ok(self.rules.iter().filter(|r| r.enabled).cloned().collect())
    }
}

/// Rules loaded from a JSON array file on every snapshot, so edits to the
/// file take effect for subsequent work items without a restart.
///
/// Entries are decoded individually: one rule with an unrecognized kind or
/// shape is logged and skipped, it never invalidates the rest of the file.
pub struct JsonRuleProvider {
    path: PathBuf,
}

impl JsonRuleProvider {
    /// Provider reading from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonRuleProvider { path: path.into() }
    }
}

#[async_trait]
impl RuleProvider for JsonRuleProvider {
    async fn enabled_rules(&self) -> Result<Vec<RuleDefinition>, StorageError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(self.path.display().to_string())
            } else {
                StorageError::Io(e.to_string())
            }
        })?;
        let entries: Vec<serde_json::Value> = serde_json::from_str(&raw)
            .map_err(|e| StorageError::Decode(format!("{}: {e}", self.path.display())))?;

        let mut rules = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<RuleDefinition>(entry) {
                Ok(rule) => {
                    if rule.enabled {
                        rules.push(rule);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "skipping rule entry {index} in {}: {e}",
                        self.path.display()
                    );
                }
            }
        }
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_filters_disabled() {
        let rules: Vec<RuleDefinition> = serde_json::from_str(
            r#"[
                {"name":"on","kind":"pattern","pattern":"TODO"},
                {"name":"off","kind":"pattern","pattern":"TODO","enabled":false}
            ]"#,
        )
        .unwrap();
        let provider = StaticRuleProvider::new(rules);
        let enabled = provider.enabled_rules().await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].name, "on");
    }

    #[tokio::test]
    async fn json_provider_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"[{"name":"no-eval","kind":"forbidden","config":{"forbidden_items":["eval("]}}]"#,
        )
        .unwrap();

        let provider = JsonRuleProvider::new(&path);
        let rules = provider.enabled_rules().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].config.forbidden_items, vec!["eval("]);
    }

    #[tokio::test]
    async fn unknown_rule_kind_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"[
                {"name":"no-todo","kind":"pattern","pattern":"TODO"},
                {"name":"metrics","kind":"metrics","pattern":"x"},
                {"name":"missing-kind"}
            ]"#,
        )
        .unwrap();

        let provider = JsonRuleProvider::new(&path);
        let rules = provider.enabled_rules().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "no-todo");
    }
}

//! Rule catalog
//!
//! Resolves caller-supplied rule references against the configured
//! registry packs and the custom rules directory, and backs the read-only
//! rules listing endpoint. Resolution is strict: a reference that is
//! neither a configured pack nor a catalogued rule file fails with
//! `InvalidConfig` rather than falling back silently.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use sastra_core::config::EngineConfig;

use crate::domain::errors::ScanError;
use crate::domain::invocation::RuleConfig;

/// Rule pack used when a request carries no config reference
const DEFAULT_PACK: &str = "auto";

/// Catalog of rule references the service accepts
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    packs: Vec<String>,
    rules_dir: PathBuf,
}

/// One custom rule file on disk
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CustomRuleFile {
    pub name: String,
    pub path: String,
    pub size_bytes: u64,
}

/// Read-only listing served by the rules endpoint
#[derive(Debug, Clone, serde::Serialize)]
pub struct RuleListing {
    pub rule_packs: Vec<String>,
    pub custom_rules: Vec<CustomRuleFile>,
}

impl RuleCatalog {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            packs: config.rule_packs.clone(),
            rules_dir: config.rules_dir.clone(),
        }
    }

    /// Resolve a caller reference to an engine-ready rule config.
    ///
    /// Accepted forms: a configured pack identifier, or the bare filename
    /// of a `.yml`/`.yaml` file inside the custom rules directory. Paths
    /// pointing anywhere else are rejected; the rules directory is the
    /// only caller-visible rule location.
    pub fn resolve(&self, reference: Option<&str>) -> Result<RuleConfig, ScanError> {
        let reference = match reference {
            None => return Ok(RuleConfig::Registry(DEFAULT_PACK.to_string())),
            Some(r) => r.trim(),
        };

        if reference.is_empty() {
            return Ok(RuleConfig::Registry(DEFAULT_PACK.to_string()));
        }

        if self.packs.iter().any(|p| p == reference) {
            return Ok(RuleConfig::Registry(reference.to_string()));
        }

        if let Some(file) = self.lookup_custom_file(reference)? {
            return Ok(RuleConfig::File(file));
        }

        Err(ScanError::InvalidConfig(format!(
            "Unknown rule config '{reference}'; see the rules endpoint for accepted values"
        )))
    }

    /// Enumerate configured packs and custom rule files
    pub fn list(&self) -> RuleListing {
        RuleListing {
            rule_packs: self.packs.clone(),
            custom_rules: self.custom_rule_files(),
        }
    }

    fn lookup_custom_file(&self, reference: &str) -> Result<Option<PathBuf>, ScanError> {
        // Accept "essentials.yml" and the configured-directory-relative
        // form "rules/custom/essentials.yml"; nothing with traversal.
        let name = match Path::new(reference).file_name().and_then(|n| n.to_str()) {
            Some(name) if !reference.contains("..") => name,
            _ => {
                return Err(ScanError::InvalidConfig(format!(
                    "Rule config '{reference}' is not a valid rule file reference"
                )));
            }
        };

        if !is_rule_file(name) {
            return Ok(None);
        }

        let dir_relative = self.rules_dir.join(name);
        if reference != name && Path::new(reference) != dir_relative {
            return Ok(None);
        }

        if dir_relative.is_file() {
            Ok(Some(dir_relative))
        } else {
            Ok(None)
        }
    }

    fn custom_rule_files(&self) -> Vec<CustomRuleFile> {
        let entries = match std::fs::read_dir(&self.rules_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return vec![],
            Err(e) => {
                warn!(dir = %self.rules_dir.display(), error = %e, "Failed to read rules directory");
                return vec![];
            }
        };

        let mut files: Vec<CustomRuleFile> = entries
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let name = entry.file_name().to_str()?.to_string();
                if !is_rule_file(&name) || !entry.file_type().ok()?.is_file() {
                    return None;
                }
                let size_bytes = entry.metadata().ok()?.len();
                Some(CustomRuleFile {
                    path: self.rules_dir.join(&name).display().to_string(),
                    name,
                    size_bytes,
                })
            })
            .collect();

        files.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = files.len(), "Enumerated custom rule files");
        files
    }
}

fn is_rule_file(name: &str) -> bool {
    name.ends_with(".yml") || name.ends_with(".yaml")
}

//! Rule sets loaded from TOML files.
//!
//! ```toml
//! version = 2
//!
//! [[rules]]
//! id = "region.pune"
//! name = "region_multiplier"
//! priority = 0
//! predicate = { kind = "equals", field = "region", value = "pune" }
//! effect = { multiplier = "1.15" }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::domain::{Rule, RuleSet};
use crate::error::{ConfigurationError, Result};
use crate::port::outbound::RuleSource;

#[derive(Debug, Deserialize)]
struct RuleFile {
    version: u64,
    #[serde(default)]
    rules: Vec<Rule>,
}

/// Parse a rule file's contents.
pub fn parse_rule_set(content: &str) -> Result<RuleSet> {
    let file: RuleFile = toml::from_str(content)
        .map_err(|e| ConfigurationError::RuleSource(format!("invalid rule file: {e}")))?;
    Ok(RuleSet::new(file.version, file.rules)?)
}

/// Rule source re-reading a TOML file on every fetch.
#[derive(Debug, Clone)]
pub struct TomlRuleSource {
    path: PathBuf,
    name: String,
}

impl TomlRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("file:{}", path.display());
        Self { path, name }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuleSource for TomlRuleSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<RuleSet> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ConfigurationError::RuleSource(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let set = parse_rule_set(&content)?;
        debug!(
            path = %self.path.display(),
            version = set.version(),
            rules = set.len(),
            "Rule file loaded",
        );
        Ok(set)
    }
}

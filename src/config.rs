//! Pipeline settings. Every field has a default, so a YAML file only needs the
//! keys it wants to change.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::PrepareError;
use crate::schema::{builtin, ColumnGroup, ColumnMatcher, IndexOverride, RenameRule, RuleScope};

/// What to do when two columns end up with the same name.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    #[default]
    Fail,
    /// Append `_2`, `_3`, ... to later duplicates.
    Suffix,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct PrepareConfig {
    pub delimiter: char,
    pub substitute: char,
    pub encoding: String,
    pub project_column: String,
    pub status_column: String,
    pub excluded_statuses: Vec<String>,
    pub index_overrides: Vec<IndexOverride>,
    pub rules: Vec<RenameRule>,
    pub photo_group: ColumnGroup,
    pub check_group: ColumnGroup,
    pub on_collision: CollisionPolicy,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            substitute: ',',
            encoding: "utf-8".into(),
            project_column: builtin::PROJECT_COLUMN.into(),
            status_column: builtin::STATUS_COLUMN.into(),
            excluded_statuses: builtin::excluded_statuses(),
            index_overrides: Vec::new(),
            rules: builtin::rename_rules(),
            photo_group: builtin::photo_group(),
            check_group: builtin::check_group(),
            on_collision: CollisionPolicy::Fail,
        }
    }
}

impl PrepareConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(text).context("parsing pipeline config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("loading config {}", path.display()))
    }

    /// Reject settings that would make the output unreadable or that cannot
    /// be compiled.
    pub fn validate(&self) -> Result<(), PrepareError> {
        if !self.delimiter.is_ascii() {
            return Err(PrepareError::InvalidConfig(format!(
                "delimiter {:?} must be a single ASCII character",
                self.delimiter
            )));
        }
        if self.delimiter == self.substitute {
            return Err(PrepareError::InvalidConfig(format!(
                "substitute {:?} is the same as the delimiter",
                self.substitute
            )));
        }
        if encoding_rs::Encoding::for_label(self.encoding.as_bytes()).is_none() {
            return Err(PrepareError::UnknownEncoding(self.encoding.clone()));
        }
        for rule in &self.rules {
            if rule.pattern.is_empty() {
                return Err(PrepareError::InvalidConfig(
                    "rename rule with an empty pattern".into(),
                ));
            }
            if rule.regex {
                compile(&rule.pattern)?;
            }
            if rule.scope == RuleScope::IndexedColumns && rule.indices.is_empty() {
                return Err(PrepareError::InvalidConfig(format!(
                    "indexed rule `{}` lists no indices",
                    rule.pattern
                )));
            }
        }
        for group in [&self.photo_group, &self.check_group] {
            for m in &group.matchers {
                if let ColumnMatcher::Regex { pattern } = m {
                    compile(pattern)?;
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn compile(pattern: &str) -> Result<Regex, PrepareError> {
    Regex::new(pattern).map_err(|source| PrepareError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

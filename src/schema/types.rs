// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// Where a rename rule applies.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RuleScope {
    /// Substitute the first match of `pattern` in every column name.
    #[default]
    AllColumns,
    /// Rename the single column whose current name equals `pattern`.
    NamedColumn,
    /// Substitute only in the columns at `indices` (positions in the raw header).
    IndexedColumns,
}

/// One ordered substitution over column names.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct RenameRule {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
    #[serde(default)]
    pub scope: RuleScope,
    /// Treat `pattern` as a regular expression instead of a literal substring.
    #[serde(default)]
    pub regex: bool,
    /// Only read for `indexed-columns`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indices: Vec<usize>,
}

impl RenameRule {
    pub fn literal(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            scope: RuleScope::AllColumns,
            regex: false,
            indices: Vec::new(),
        }
    }

    pub fn regex(pattern: &str, replacement: &str) -> Self {
        Self {
            regex: true,
            ..Self::literal(pattern, replacement)
        }
    }

    pub fn named(from: &str, to: &str) -> Self {
        Self {
            scope: RuleScope::NamedColumn,
            ..Self::literal(from, to)
        }
    }

    pub fn indexed(indices: &[usize], pattern: &str, replacement: &str) -> Self {
        Self {
            scope: RuleScope::IndexedColumns,
            indices: indices.to_vec(),
            ..Self::literal(pattern, replacement)
        }
    }
}

/// Gives a name to the column at `index` of the raw header, typically one the
/// export tool left blank. `expect` pins the override to the header text seen
/// at that position so a reordered export does not rename the wrong column.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct IndexOverride {
    pub index: usize,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(tag = "match", rename_all = "kebab-case")]
pub enum ColumnMatcher {
    /// Case-insensitive substring test.
    Contains { needle: String },
    /// Regular expression, matched as written.
    Regex { pattern: String },
}

/// A bucket of columns removed together.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct ColumnGroup {
    pub name: String,
    pub matchers: Vec<ColumnMatcher>,
}

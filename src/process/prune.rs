use regex::Regex;
use tracing::{debug, info};

use crate::config::compile;
use crate::error::Result;
use crate::schema::{ColumnGroup, ColumnMatcher};
use crate::table::Table;

enum Matcher {
    /// Stored lower-case.
    Contains(String),
    Regex(Regex),
}

/// A compiled `ColumnGroup`, ready to test post-rename column names.
pub struct ColumnPredicate {
    name: String,
    matchers: Vec<Matcher>,
}

impl ColumnPredicate {
    pub fn compile(group: &ColumnGroup) -> Result<Self> {
        let matchers = group
            .matchers
            .iter()
            .map(|m| match m {
                ColumnMatcher::Contains { needle } => Ok(Matcher::Contains(needle.to_lowercase())),
                ColumnMatcher::Regex { pattern } => compile(pattern).map(Matcher::Regex),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: group.name.clone(),
            matchers,
        })
    }

    pub fn matches(&self, column: &str) -> bool {
        let lower = column.to_lowercase();
        self.matchers.iter().any(|m| match m {
            Matcher::Contains(needle) => lower.contains(needle.as_str()),
            Matcher::Regex(re) => re.is_match(column),
        })
    }
}

/// Remove every column `predicate` matches. Returns the dropped names.
pub fn drop_columns_matching(table: &mut Table, predicate: &ColumnPredicate) -> Vec<String> {
    let dropped = table.retain_columns(|c| !predicate.matches(&c.name));
    if dropped.is_empty() {
        debug!(group = %predicate.name, "no columns matched");
    } else {
        info!(group = %predicate.name, ?dropped, "dropped {} columns", dropped.len());
    }
    dropped
}

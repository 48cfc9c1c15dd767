use std::{fmt, str::FromStr};
use tracing::{info, warn};

use crate::error::{PrepareError, Result};
use crate::process::utils::fold_label;
use crate::table::Table;

/// Which projects to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFilter {
    All,
    /// Case-insensitive allow-list; names may be in any case.
    Only(Vec<String>),
}

impl ProjectFilter {
    pub fn only<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut folded = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if name.eq_ignore_ascii_case("all") {
                return Ok(ProjectFilter::All);
            }
            folded.push(fold_label(name));
        }
        if folded.is_empty() {
            return Err(PrepareError::EmptyProjectFilter);
        }
        Ok(ProjectFilter::Only(folded))
    }

    fn admits(&self, project: &str) -> bool {
        match self {
            ProjectFilter::All => true,
            ProjectFilter::Only(names) => {
                let key = fold_label(project);
                names.iter().any(|n| fold_label(n) == key)
            }
        }
    }
}

impl Default for ProjectFilter {
    fn default() -> Self {
        ProjectFilter::Only(vec![crate::schema::builtin::DEFAULT_PROJECT.to_string()])
    }
}

/// `all` (any case) or a comma-separated list of project names.
impl FromStr for ProjectFilter {
    type Err = PrepareError;

    fn from_str(s: &str) -> Result<Self> {
        ProjectFilter::only(s.split(','))
    }
}

impl fmt::Display for ProjectFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectFilter::All => write!(f, "all"),
            ProjectFilter::Only(names) => write!(f, "{}", names.join(",")),
        }
    }
}

/// Keep rows whose project is on the allow-list. A missing project column
/// leaves the table untouched.
pub fn filter_by_project(table: &mut Table, column: &str, filter: &ProjectFilter) {
    if *filter == ProjectFilter::All {
        info!("project filter is `all`, keeping {} rows", table.n_rows());
        return;
    }
    let Some(col) = table.column(column) else {
        warn!(column, "project column not found, skipping project filter");
        return;
    };

    let keep: Vec<bool> = col.values.iter().map(|v| filter.admits(v)).collect();
    let before = table.n_rows();
    table.retain_rows(&keep);
    info!(
        %filter,
        kept = table.n_rows(),
        dropped = before - table.n_rows(),
        "filtered by project"
    );
}

/// Drop rows whose status, lower-cased, contains any of `excluded`
/// (already lower-case). A missing status column leaves the table untouched.
pub fn filter_approved(table: &mut Table, column: &str, excluded: &[String]) {
    let Some(col) = table.column(column) else {
        warn!(column, "status column not found, skipping approval filter");
        return;
    };

    let excluded: Vec<String> = excluded.iter().map(|s| s.to_lowercase()).collect();
    let keep: Vec<bool> = col
        .values
        .iter()
        .map(|status| {
            let status = status.to_lowercase();
            !excluded.iter().any(|bad| status.contains(bad.as_str()))
        })
        .collect();

    let before = table.n_rows();
    table.retain_rows(&keep);
    info!(
        kept = table.n_rows(),
        dropped = before - table.n_rows(),
        "filtered by approval status"
    );
}

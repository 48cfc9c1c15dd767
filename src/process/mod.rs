// src/process/mod.rs
//! The preparation chain:
//! load → filter rows → rename → sanitize values → drop column groups → persist.

pub mod filter;
pub mod load;
pub mod prune;
pub mod rename;
pub mod sanitize;
pub mod utils;
pub mod write;

use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::PrepareConfig;
use crate::error::{PrepareError, Result};
use crate::table::Table;

pub use filter::ProjectFilter;

/// Arguments for one `prepare_data` run.
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub project_filter: ProjectFilter,
    pub remove_photo_columns: bool,
    pub remove_check_columns: bool,
    pub config: PrepareConfig,
}

impl PrepareOptions {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            project_filter: ProjectFilter::default(),
            remove_photo_columns: true,
            remove_check_columns: true,
            config: PrepareConfig::default(),
        }
    }

    pub fn project_filter(mut self, filter: ProjectFilter) -> Self {
        self.project_filter = filter;
        self
    }

    pub fn remove_photo_columns(mut self, yes: bool) -> Self {
        self.remove_photo_columns = yes;
        self
    }

    pub fn remove_check_columns(mut self, yes: bool) -> Self {
        self.remove_check_columns = yes;
        self
    }

    pub fn config(mut self, config: PrepareConfig) -> Self {
        self.config = config;
        self
    }
}

/// Result of a run that did not fail outright. A missing input is reported
/// here rather than as an error so callers can print it and carry on.
#[derive(Debug)]
pub enum PrepareOutcome {
    Prepared(Table),
    InputMissing { path: PathBuf, message: String },
}

impl PrepareOutcome {
    pub fn table(&self) -> Option<&Table> {
        match self {
            PrepareOutcome::Prepared(t) => Some(t),
            PrepareOutcome::InputMissing { .. } => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            PrepareOutcome::Prepared(t) => Some(t),
            PrepareOutcome::InputMissing { .. } => None,
        }
    }
}

/// Load, clean and write one survey export, returning the cleaned table.
#[tracing::instrument(level = "info", skip(opts), fields(input = %opts.input_path.display()))]
pub fn prepare_data(opts: &PrepareOptions) -> Result<PrepareOutcome> {
    let start = Instant::now();
    let cfg = &opts.config;
    cfg.validate()?;

    let mut table = match load::load_with(&opts.input_path, cfg) {
        Ok(t) => t,
        Err(PrepareError::InputNotFound { path }) => {
            let message = format!("input file {} does not exist", path.display());
            warn!("{}", message);
            return Ok(PrepareOutcome::InputMissing { path, message });
        }
        Err(e) => return Err(e),
    };

    transform(&mut table, opts)?;
    write::persist(&table, &opts.output_path, cfg.delimiter)?;

    info!(
        rows = table.n_rows(),
        columns = table.n_columns(),
        output = %opts.output_path.display(),
        elapsed = ?start.elapsed(),
        "prepared"
    );
    Ok(PrepareOutcome::Prepared(table))
}

/// Every in-memory step between load and persist.
pub fn transform(table: &mut Table, opts: &PrepareOptions) -> Result<()> {
    let cfg = &opts.config;

    filter::filter_by_project(table, &cfg.project_column, &opts.project_filter);
    filter::filter_approved(table, &cfg.status_column, &cfg.excluded_statuses);

    rename::rename_columns(table, cfg)?;
    sanitize::escape_delimiter_conflicts(table, cfg.delimiter, cfg.substitute);
    // "a;b" and "a,b" meet here
    let names = rename::resolve_collisions(table.headers(), cfg.on_collision)?;
    table.set_headers(names)?;

    // group predicates test renamed names
    if opts.remove_photo_columns {
        let photo = prune::ColumnPredicate::compile(&cfg.photo_group)?;
        prune::drop_columns_matching(table, &photo);
    }
    if opts.remove_check_columns {
        let checks = prune::ColumnPredicate::compile(&cfg.check_group)?;
        prune::drop_columns_matching(table, &checks);
    }
    Ok(())
}

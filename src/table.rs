use crate::error::{PrepareError, Result};

/// One named column and its cell values, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub values: Vec<String>,
}

/// An untyped, column-major survey table. Every column holds exactly
/// `n_rows` values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from a header and row-major records.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column {
                name,
                values: Vec::with_capacity(rows.len()),
            })
            .collect();

        let n_rows = rows.len();
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(PrepareError::Shape(format!(
                    "row {} has {} cells, expected {}",
                    idx,
                    row.len(),
                    columns.len()
                )));
            }
            for (col, cell) in columns.iter_mut().zip(row) {
                col.values.push(cell);
            }
        }

        Ok(Self { columns, n_rows })
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        self.column(column)
            .and_then(|c| c.values.get(row))
            .map(String::as_str)
    }

    /// Row-major view, in original order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        (0..self.n_rows).map(move |r| {
            self.columns
                .iter()
                .map(|c| c.values[r].as_str())
                .collect()
        })
    }

    /// Replace every column name at once. `names` must line up with the
    /// current column order.
    pub(crate) fn set_headers(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.columns.len() {
            return Err(PrepareError::Shape(format!(
                "{} names for {} columns",
                names.len(),
                self.columns.len()
            )));
        }
        for (col, name) in self.columns.iter_mut().zip(names) {
            col.name = name;
        }
        Ok(())
    }

    /// Keep rows where `keep[i]` is true; relative order is preserved.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.n_rows);
        for col in &mut self.columns {
            let mut flags = keep.iter();
            col.values.retain(|_| *flags.next().unwrap_or(&false));
        }
        self.n_rows = keep.iter().filter(|k| **k).count();
    }

    /// Keep columns for which `f` returns true, returning the names dropped.
    pub(crate) fn retain_columns<F>(&mut self, mut f: F) -> Vec<String>
    where
        F: FnMut(&Column) -> bool,
    {
        let mut dropped = Vec::new();
        self.columns.retain(|c| {
            let keep = f(c);
            if !keep {
                dropped.push(c.name.clone());
            }
            keep
        });
        dropped
    }
}

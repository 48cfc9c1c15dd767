use tracing::{debug, info, warn};

use crate::table::Table;

/// Replace `delimiter` with `substitute` in every column name and in every
/// cell of every column that contains it at least once. Returns the names of
/// the columns whose values were touched.
pub fn escape_delimiter_conflicts(table: &mut Table, delimiter: char, substitute: char) -> Vec<String> {
    let mut touched = Vec::new();
    for col in table.columns_mut() {
        if col.name.contains(delimiter) {
            let renamed = col.name.replace(delimiter, &substitute.to_string());
            warn!(column = %col.name, renamed = %renamed, "delimiter in column name");
            col.name = renamed;
        }
        if !col.values.iter().any(|v| v.contains(delimiter)) {
            continue;
        }
        let mut cells = 0usize;
        for value in col.values.iter_mut().filter(|v| v.contains(delimiter)) {
            *value = value.replace(delimiter, &substitute.to_string());
            cells += 1;
        }
        debug!(column = %col.name, cells, "escaped delimiter");
        touched.push(col.name.clone());
    }
    if !touched.is_empty() {
        info!(
            columns = ?touched,
            "replaced {:?} with {:?} inside values",
            delimiter,
            substitute
        );
    }
    touched
}

use csv::{QuoteStyle, WriterBuilder};
use std::{
    io::{self, BufWriter, ErrorKind, Write},
    path::Path,
};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{PrepareError, Result};
use crate::table::Table;

/// Write header and rows with `delimiter`, unquoted and without an index
/// column. Data goes to a temporary file beside `path` that replaces `path`
/// only once fully written, so a failed write leaves any old output intact.
#[tracing::instrument(level = "debug", skip(table, path), fields(path = %path.as_ref().display()))]
pub fn persist<P: AsRef<Path>>(table: &Table, path: P, delimiter: char) -> Result<()> {
    let path = path.as_ref();
    let fail = |source: io::Error| PrepareError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(fail)?;

    if table.n_columns() == 1 {
        // the csv writer quotes a lone empty field to keep the record visible
        write_single_column(table, tmp.as_file_mut()).map_err(fail)?;
    } else {
        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter as u8)
            .quote_style(QuoteStyle::Never)
            .has_headers(false)
            .from_writer(tmp.as_file_mut());

        if table.n_columns() > 0 {
            wtr.write_record(table.headers()).map_err(csv_io).map_err(fail)?;
            for row in table.rows() {
                wtr.write_record(&row).map_err(csv_io).map_err(fail)?;
            }
        }
        wtr.flush().map_err(fail)?;
    }
    tmp.as_file().sync_all().map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;

    info!(
        rows = table.n_rows(),
        columns = table.n_columns(),
        "wrote {}",
        path.display()
    );
    Ok(())
}

fn write_single_column<W: Write>(table: &Table, out: W) -> io::Result<()> {
    let mut out = BufWriter::new(out);
    let column = &table.columns()[0];
    writeln!(out, "{}", column.name)?;
    for value in &column.values {
        writeln!(out, "{}", value)?;
    }
    out.flush()
}

fn csv_io(err: csv::Error) -> io::Error {
    io::Error::new(ErrorKind::Other, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::load::load;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn sample() -> Table {
        Table::from_rows(
            vec!["Project".into(), "lat".into(), "note".into()],
            vec![
                vec!["funaction".into(), "46.01".into(), "a, b".into()],
                vec!["funaction".into(), "45.90".into(), "".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn writes_unquoted_semicolon_rows() -> Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("fundata.csv");
        persist(&sample(), &out, ';')?;
        let text = fs::read_to_string(&out)?;
        assert_eq!(
            text,
            "Project;lat;note\nfunaction;46.01;a, b\nfunaction;45.90;\n"
        );
        Ok(())
    }

    #[test]
    fn round_trips_through_load() -> Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("round.csv");
        let table = sample();
        persist(&table, &out, ';')?;
        assert_eq!(load(&out)?, table);
        Ok(())
    }

    #[test]
    fn replaces_existing_output() -> Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("fundata.csv");
        fs::write(&out, "old content that is longer than the new one\n".repeat(10))?;
        persist(&sample(), &out, ';')?;
        assert!(fs::read_to_string(&out)?.starts_with("Project;lat;note\n"));
        let leftovers = fs::read_dir(dir.path())?.count();
        assert_eq!(leftovers, 1);
        Ok(())
    }

    #[test]
    fn single_column_empty_cells_stay_unquoted() -> Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("one.csv");
        let table = Table::from_rows(
            vec!["a".into()],
            vec![vec!["".into()], vec!["x".into()]],
        )?;
        persist(&table, &out, ';')?;
        assert_eq!(fs::read_to_string(&out)?, "a\n\nx\n");
        Ok(())
    }

    #[test]
    fn unwritable_target_is_write_failure() -> Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("missing-subdir").join("fundata.csv");
        let err = persist(&sample(), &out, ';').unwrap_err();
        assert!(matches!(err, PrepareError::WriteFailure { .. }));
        Ok(())
    }
}

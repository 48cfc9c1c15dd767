use csv::{ReaderBuilder, Trim};
use encoding_rs::Encoding;
use std::{fs, io::ErrorKind, path::Path};
use tracing::{debug, info, warn};

use crate::config::PrepareConfig;
use crate::error::{PrepareError, Result};
use crate::process::utils::clean_header;
use crate::table::Table;

/// Read a `;`-separated UTF-8 export with a header row.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Table> {
    load_with(path, &PrepareConfig::default())
}

/// Read an export using the delimiter and text encoding from `cfg`.
#[tracing::instrument(level = "debug", skip(path, cfg), fields(path = %path.as_ref().display()))]
pub fn load_with<P: AsRef<Path>>(path: P, cfg: &PrepareConfig) -> Result<Table> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PrepareError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => PrepareError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => PrepareError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let encoding = Encoding::for_label(cfg.encoding.as_bytes())
        .ok_or_else(|| PrepareError::UnknownEncoding(cfg.encoding.clone()))?;
    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        warn!(
            encoding = used.name(),
            "input contained bytes that are not valid {}, replaced with U+FFFD",
            used.name()
        );
    }

    let table = parse(&text, cfg.delimiter, path)?;
    info!(
        rows = table.n_rows(),
        columns = table.n_columns(),
        "loaded {}",
        path.display()
    );
    Ok(table)
}

/// Parse delimited text into a table, first record as header.
pub(crate) fn parse(text: &str, delimiter: char, path: &Path) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| parse_error(path, 1, e))?
        .iter()
        .map(clean_header)
        .collect();
    let width = headers.len();
    debug!(?headers, "parsed header");

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line());
            parse_error(path, line, e)
        })?;
        let line = record.position().map_or(0, |p| p.line());

        if record.len() > width {
            return Err(PrepareError::RaggedRow {
                line,
                expected: width,
                found: record.len(),
            });
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.len() < width {
            warn!(
                line,
                found = row.len(),
                expected = width,
                "short record, padding with empty cells"
            );
            row.resize(width, String::new());
        }
        rows.push(row);
    }

    Table::from_rows(headers, rows)
}

fn parse_error(path: &Path, line: u64, err: csv::Error) -> PrepareError {
    PrepareError::Parse {
        path: path.to_path_buf(),
        line,
        message: err.to_string(),
    }
}

//! Row source.
//!
//! Rows are `url[,id[,model]]`. Blank lines and `#` comments are ignored,
//! as is a header whose first cell is `url`. Rows whose URL fails
//! validation are logged and counted, never resolved.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::app::normalize_seed_url;
use crate::resolve::RowContext;

/// One row ready for resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    /// 1-based line number in the source, for log messages
    pub line: usize,
    /// Normalized seed URL
    pub url: String,
    pub context: RowContext,
}

/// Every usable row plus the number of rejected ones.
#[derive(Debug, Default)]
pub struct RowBatch {
    pub rows: Vec<InputRow>,
    pub skipped: usize,
}

/// Where rows come from.
pub trait RowSource {
    fn read_rows(&mut self) -> Result<RowBatch>;
}

/// CSV rows from a file, or stdin for `-`.
pub struct CsvRowSource {
    path: PathBuf,
}

impl CsvRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }
}

impl RowSource for CsvRowSource {
    fn read_rows(&mut self) -> Result<RowBatch> {
        let batch = if self.is_stdin() {
            info!("Reading rows from stdin");
            parse_rows(io::stdin().lock())?
        } else {
            let file = open_input(&self.path)?;
            parse_rows(file)
                .with_context(|| format!("Failed to read {}", self.path.display()))?
        };
        info!(
            "Loaded {} row{} ({} skipped)",
            batch.rows.len(),
            if batch.rows.len() == 1 { "" } else { "s" },
            batch.skipped
        );
        Ok(batch)
    }
}

fn open_input(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open input file {}", path.display()))
}

/// Parses `url[,id[,model]]` records from any reader.
pub fn parse_rows<R: Read>(reader: R) -> Result<RowBatch> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut batch = RowBatch::default();
    for (index, record) in csv_reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable row {}: {e}", index + 1);
                batch.skipped += 1;
                continue;
            }
        };

        let line = record
            .position()
            .and_then(|p| usize::try_from(p.line()).ok())
            .unwrap_or(index + 1);
        let raw_url = record.get(0).unwrap_or_default();
        if raw_url.is_empty() {
            continue;
        }
        if index == 0 && raw_url.eq_ignore_ascii_case("url") {
            continue;
        }

        match normalize_seed_url(raw_url) {
            Ok(url) => batch.rows.push(InputRow {
                line,
                url,
                context: RowContext {
                    id: optional_cell(&record, 1),
                    model: optional_cell(&record, 2),
                },
            }),
            Err(reason) => {
                warn!("Skipping row {line} ({reason}): {raw_url}");
                batch.skipped += 1;
            }
        }
    }
    Ok(batch)
}

fn optional_cell(record: &csv::StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
}

//! CSV/TSV parser with delimiter detection and column typing.

use std::io::{BufRead, BufReader};

use indexmap::IndexMap;

use crate::dataset::{Dataset, Value};
use crate::error::{DashboardError, Result};
use crate::schema::{ColumnSchema, ColumnType, TableSchema};

use super::infer::{convert_cell, convert_cell_or_text, infer_column_type, is_null_value};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Fixed types by column name; these columns skip inference and keep
    /// cells that do not fit as text.
    pub column_types: IndexMap<String, ColumnType>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
            column_types: IndexMap::new(),
        }
    }
}

impl ParserConfig {
    /// Use a fixed delimiter instead of auto-detection.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Stop after `max_rows` data rows.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Read columns with the types they have in `schema`.
    pub fn with_column_types(mut self, schema: &TableSchema) -> Self {
        self.column_types = schema
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.column_type))
            .collect();
        self
    }
}

/// Parses delimited text into typed datasets.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse raw bytes. Returns the dataset and the delimiter that was used.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<(Dataset, u8)> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        let (headers, rows) = self.read_records(bytes, delimiter)?;
        let dataset = type_columns(headers, rows, &self.config.column_types)?;
        Ok((dataset, delimiter))
    }

    /// Read header and string records.
    fn read_records(&self, bytes: &[u8], delimiter: u8) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.trim().to_string()).collect()
        } else {
            let mut peek = csv::ReaderBuilder::new()
                .delimiter(delimiter)
                .has_headers(false)
                .quote(self.config.quote)
                .flexible(true)
                .from_reader(bytes);
            match peek.records().next() {
                Some(Ok(record)) => (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect(),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(DashboardError::Schema("No data rows found".to_string())),
            }
        };

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(DashboardError::Schema("No columns found".to_string()));
        }
        if let Some(dup) = first_duplicate(&headers) {
            return Err(DashboardError::Unreadable(format!("duplicate column name '{dup}'")));
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            if record.iter().all(|c| c.is_empty()) {
                continue;
            }
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();

            // Pad short rows with nulls, drop overflow cells
            if row.len() != expected_cols {
                log::warn!(
                    "row {} has {} cells, expected {}; padding/truncating",
                    row_idx + 1,
                    row.len(),
                    expected_cols
                );
            }
            row.resize(expected_cols, String::new());

            rows.push(row);
        }

        if rows.is_empty() {
            return Err(DashboardError::Schema("No data rows found".to_string()));
        }

        Ok((headers, rows))
    }
}

/// Infer a type per column, unless `fixed` names one, and convert every cell.
fn type_columns(
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    fixed: &IndexMap<String, ColumnType>,
) -> Result<Dataset> {
    let mut columns = Vec::with_capacity(headers.len());
    let mut pinned = Vec::with_capacity(headers.len());
    for (idx, name) in headers.into_iter().enumerate() {
        let column_type = match fixed.get(&name) {
            Some(t) => *t,
            None => infer_column_type(rows.iter().map(|r| r[idx].as_str())),
        };
        pinned.push(fixed.contains_key(&name));
        let nullable = rows.iter().any(|r| is_null_value(&r[idx]));
        columns.push(ColumnSchema::new(name, idx, column_type).with_nullable(nullable));
    }

    let typed_rows = rows
        .into_iter()
        .enumerate()
        .map(|(row_idx, row)| {
            row.iter()
                .zip(&columns)
                .zip(&pinned)
                .map(|((raw, col), &pinned)| {
                    if pinned {
                        return Ok(convert_cell_or_text(raw, col.column_type));
                    }
                    convert_cell(raw, col.column_type).ok_or_else(|| {
                        DashboardError::Unreadable(format!(
                            "row {}, column '{}': cannot read '{}' as {:?}",
                            row_idx + 1,
                            col.name,
                            raw,
                            col.column_type
                        ))
                    })
                })
                .collect::<Result<Vec<Value>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Dataset::new(TableSchema::with_columns(columns), typed_rows)
}

fn first_duplicate(headers: &[String]) -> Option<&str> {
    let mut seen = std::collections::HashSet::new();
    headers
        .iter()
        .find(|h| !seen.insert(h.as_str()))
        .map(|h| h.as_str())
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(DashboardError::Schema("No columns found".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tab breaks ties
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

/// Short format name for a delimiter.
pub fn format_name(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}

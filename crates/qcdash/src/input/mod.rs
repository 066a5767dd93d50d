//! Input parsing and data source handling.
//!
//! Entry points take either a path or an in-memory upload; both end in a typed
//! [`Dataset`] plus [`SourceMetadata`].

mod infer;
#[cfg(feature = "parquet")]
mod columnar;
mod parser;
mod source;

use std::path::Path;

pub use infer::is_null_value;
pub use parser::{Parser, ParserConfig};
pub use source::{SourceMetadata, content_hash};

use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::schema::{ColumnSchema, TableSchema};

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// CSV, TSV or another single-character delimited text.
    Delimited,
    /// Apache Parquet.
    Parquet,
}

impl InputFormat {
    /// Pick a format from a file name's extension.
    pub fn from_extension(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "tsv" | "txt" | "tab" => Ok(InputFormat::Delimited),
            "parquet" | "pq" => Ok(InputFormat::Parquet),
            other => Err(DashboardError::UnsupportedFormat(format!(
                "unsupported file extension '.{other}'"
            ))),
        }
    }

    /// Pick a format from the buffer contents.
    pub fn sniff(contents: &[u8]) -> Self {
        if contents.len() >= 8 && contents.starts_with(b"PAR1") && contents.ends_with(b"PAR1") {
            InputFormat::Parquet
        } else {
            InputFormat::Delimited
        }
    }
}

/// Read a file from disk, choosing the reader by extension.
pub fn load_path(path: impl AsRef<Path>, config: &ParserConfig) -> Result<(Dataset, SourceMetadata)> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let format = InputFormat::from_extension(&name)?;

    let contents = std::fs::read(path).map_err(|e| DashboardError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let (dataset, mut source) = load_contents(&contents, name, format, config)?;
    source.path = Some(path.to_path_buf());
    Ok((dataset, source))
}

/// Read an uploaded buffer.
///
/// A recognised extension on `name` picks the reader; otherwise the buffer is
/// sniffed for the Parquet magic number and treated as delimited text if absent.
pub fn load_bytes(
    contents: &[u8],
    name: Option<&str>,
    config: &ParserConfig,
) -> Result<(Dataset, SourceMetadata)> {
    let format = name
        .and_then(|n| InputFormat::from_extension(n).ok())
        .unwrap_or_else(|| InputFormat::sniff(contents));
    let name = name.unwrap_or("upload").to_string();
    load_contents(contents, name, format, config)
}

fn load_contents(
    contents: &[u8],
    name: String,
    format: InputFormat,
    config: &ParserConfig,
) -> Result<(Dataset, SourceMetadata)> {
    let (dataset, format_name) = match format {
        InputFormat::Delimited => {
            let (dataset, delimiter) = Parser::with_config(config.clone()).parse_bytes(contents)?;
            (dataset, parser::format_name(delimiter))
        }
        #[cfg(feature = "parquet")]
        InputFormat::Parquet => (columnar::read_parquet(contents)?, "parquet"),
        #[cfg(not(feature = "parquet"))]
        InputFormat::Parquet => {
            return Err(DashboardError::UnsupportedFormat(
                "Parquet support not enabled. Rebuild with --features parquet".to_string(),
            ));
        }
    };

    let source = SourceMetadata::new(
        name,
        None,
        contents,
        format_name,
        dataset.row_count(),
        dataset.column_count(),
    );
    log::debug!(
        "parsed {} ({}): {} rows x {} columns",
        source.file,
        source.format,
        source.row_count,
        source.column_count
    );
    Ok((dataset, source))
}

/// Re-type `dataset`'s columns to the types the same names have in `target`.
///
/// Columns that `target` does not name, or that already have its type, are
/// left alone. Cells that cannot take the target type are kept as text.
pub fn conform_types(dataset: Dataset, target: &TableSchema) -> Result<Dataset> {
    let targets: Vec<Option<ColumnSchema>> = dataset
        .schema()
        .columns
        .iter()
        .map(|c| {
            target
                .get_column(&c.name)
                .filter(|t| t.column_type != c.column_type)
                .map(|t| {
                    ColumnSchema::new(c.name.clone(), c.position, t.column_type)
                        .with_nullable(c.nullable)
                })
        })
        .collect();

    if targets.iter().all(Option::is_none) {
        return Ok(dataset);
    }

    let (mut schema, mut rows) = dataset.into_parts();
    for (idx, retyped) in targets.into_iter().enumerate() {
        let Some(retyped) = retyped else { continue };
        log::debug!(
            "re-typing column '{}' from {:?} to {:?}",
            retyped.name,
            schema.columns[idx].column_type,
            retyped.column_type
        );
        for row in &mut rows {
            row[idx] = infer::conform_cell(&row[idx], retyped.column_type);
        }
        schema.columns[idx] = retyped;
    }

    Dataset::new(schema, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;
    use crate::schema::ColumnType;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InputFormat::from_extension("runs.CSV").unwrap(), InputFormat::Delimited);
        assert_eq!(InputFormat::from_extension("runs.tsv").unwrap(), InputFormat::Delimited);
        assert_eq!(InputFormat::from_extension("runs.parquet").unwrap(), InputFormat::Parquet);
        assert!(matches!(
            InputFormat::from_extension("runs.xlsx"),
            Err(DashboardError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_sniff_magic_number() {
        assert_eq!(InputFormat::sniff(b"PAR1....PAR1"), InputFormat::Parquet);
        assert_eq!(InputFormat::sniff(b"Sample_Name,Q30\n"), InputFormat::Delimited);
        assert_eq!(InputFormat::sniff(b"PAR1"), InputFormat::Delimited);
    }

    #[test]
    fn test_load_bytes_sniffs_delimited() {
        let (ds, source) =
            load_bytes(b"Sample_Name\tQ30\nS1\t91.0\n", None, &ParserConfig::default()).unwrap();
        assert_eq!(ds.row_count(), 1);
        assert_eq!(source.format, "tsv");
        assert_eq!(source.file, "upload");
    }

    #[test]
    fn test_load_bytes_unknown_extension_falls_back_to_sniffing() {
        let (ds, _) =
            load_bytes(b"a,b\n1,2\n", Some("export.dat"), &ParserConfig::default()).unwrap();
        assert_eq!(ds.column_count(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_path("/definitely/not/here.csv", &ParserConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn test_conform_types_follows_reference_schema() {
        let (ds, _) =
            load_bytes(b"QC_Pass,Reads\ntrue,12\nfalse,13\n", None, &ParserConfig::default()).unwrap();
        assert_eq!(ds.schema().columns[0].column_type, ColumnType::Boolean);

        let reference = TableSchema::with_columns(vec![
            ColumnSchema::new("Reads", 0, ColumnType::Float),
            ColumnSchema::new("QC_Pass", 1, ColumnType::String),
        ]);
        let conformed = conform_types(ds, &reference).unwrap();
        assert_eq!(conformed.schema().columns[0].column_type, ColumnType::String);
        assert_eq!(conformed.schema().columns[1].column_type, ColumnType::Float);
        assert_eq!(conformed.get(0, 0), Some(&Value::Text("true".into())));
        assert_eq!(conformed.get(1, 1), Some(&Value::Float(13.0)));
    }
}

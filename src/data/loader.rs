use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use super::model::{PaperTable, RawPaper};
use super::normalize::normalize;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a dataset could not be loaded. Individual malformed cells are never
/// reported here; they degrade to missing values during normalization.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset file '{}' not found", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("expected a top-level JSON array of record objects")]
    NotRecords,
    #[error("reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl LoadError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Whether the source itself is absent (as opposed to unreadable).
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound(_))
    }
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// Required columns, canonical name first, then accepted aliases.
const COLUMNS: [(&str, &[&str]); 8] = [
    ("title", &[]),
    ("authors", &[]),
    ("journal", &[]),
    ("source", &["source_x"]),
    ("publish_time", &[]),
    ("abstract", &[]),
    ("doi", &[]),
    ("has_full_text", &[]),
];

/// Position of every required column in a header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex([usize; 8]);

impl ColumnIndex {
    fn resolve(headers: &[&str]) -> Result<Self, LoadError> {
        let mut positions = [0usize; 8];
        for (slot, &(name, aliases)) in COLUMNS.iter().enumerate() {
            positions[slot] = headers
                .iter()
                .position(|h| {
                    let h = h.trim();
                    h.eq_ignore_ascii_case(name)
                        || aliases.iter().any(|a| h.eq_ignore_ascii_case(a))
                })
                .ok_or(LoadError::MissingColumn(name))?;
        }
        Ok(ColumnIndex(positions))
    }

    /// Assemble a raw row, with `cell(i)` returning the text at header position `i`.
    fn raw_paper(&self, mut cell: impl FnMut(usize) -> Option<String>) -> RawPaper {
        raw_from_slots(|slot| cell(self.0[slot]))
    }
}

/// Assemble a raw row, with `cell(slot)` indexed in [`COLUMNS`] order.
fn raw_from_slots(mut cell: impl FnMut(usize) -> Option<String>) -> RawPaper {
    RawPaper {
        title: cell(0),
        authors: cell(1),
        journal: cell(2),
        source: cell(3),
        publish_time: cell(4),
        abstract_text: cell(5),
        doi: cell(6),
        has_full_text: cell(7),
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and normalize a paper metadata file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – CORD-19 `metadata.csv` layout (recommended)
/// * `.json`    – `[{ "title": ..., "authors": ..., ... }, ...]`
/// * `.parquet` – any column types; every required column is cast to text
pub fn load_file(path: &Path) -> Result<PaperTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!("Read {} rows from {}", rows.len(), path.display());
    Ok(normalize(rows, Some(path.to_path_buf())))
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|e| LoadError::io(path, e))
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Header row with column names; extra columns are ignored, short rows are
/// padded with missing values and invalid UTF-8 is replaced rather than
/// rejected.
fn read_csv(path: &Path) -> Result<Vec<RawPaper>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(open(path)?);

    let header_record = reader.headers()?.clone();
    let headers: Vec<&str> = header_record.iter().collect();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        rows.push(columns.raw_paper(|i| {
            record
                .get(i)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        }));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "title": "...", "authors": "A, B", "journal": null, "source_x": "PMC", ... },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<Vec<RawPaper>, LoadError> {
    let root: JsonValue = serde_json::from_reader(std::io::BufReader::new(open(path)?))?;
    let records = root.as_array().ok_or(LoadError::NotRecords)?;

    let objects: Vec<&Map<String, JsonValue>> = records
        .iter()
        .map(|rec| rec.as_object().ok_or(LoadError::NotRecords))
        .collect::<Result<_, _>>()?;

    if objects.is_empty() {
        return Ok(Vec::new());
    }
    // A key present in any record counts; records without it read as null.
    let mut keys: Vec<&str> = Vec::new();
    for key in objects.iter().flat_map(|obj| obj.keys().map(String::as_str)) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    let columns = ColumnIndex::resolve(&keys)?;

    Ok(objects
        .iter()
        .map(|obj| columns.raw_paper(|i| obj.get(keys[i]).and_then(json_to_text)))
        .collect())
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Dates, timestamps and booleans are cast
/// to text and parsed by the normalizer like any other source.
fn read_parquet(path: &Path) -> Result<Vec<RawPaper>, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let columns = ColumnIndex::resolve(&names)?;
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        let text_columns = columns
            .0
            .iter()
            .map(|&i| cast(batch.column(i), &DataType::Utf8))
            .collect::<Result<Vec<_>, _>>()?;
        let strings: Vec<_> = text_columns.iter().map(|c| c.as_string::<i32>()).collect();

        for row in 0..batch.num_rows() {
            rows.push(raw_from_slots(|slot| {
                let arr = strings[slot];
                (!arr.is_null(row)).then(|| arr.value(row).to_string())
            }));
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_columns_with_alias_and_case() {
        let headers = [
            "cord_uid", "Title", "doi", "source_x", "abstract", "publish_time", "authors",
            "journal", "has_full_text",
        ];
        let idx = ColumnIndex::resolve(&headers).unwrap();
        assert_eq!(idx.0, [1, 6, 7, 3, 5, 4, 2, 8]);
    }

    #[test]
    fn missing_column_names_the_column() {
        let headers = ["title", "authors", "journal", "source", "publish_time", "abstract", "doi"];
        let err = ColumnIndex::resolve(&headers).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("has_full_text")));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("papers.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }

    #[test]
    fn absent_file_is_not_found() {
        let err = load_file(Path::new("/definitely/not/here/metadata.csv")).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn json_scalars_become_text() {
        assert_eq!(json_to_text(&JsonValue::Null), None);
        assert_eq!(json_to_text(&JsonValue::Bool(true)).as_deref(), Some("true"));
        assert_eq!(json_to_text(&serde_json::json!(2020)).as_deref(), Some("2020"));
        assert_eq!(json_to_text(&serde_json::json!("x")).as_deref(), Some("x"));
    }
}

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{DataError, DataResult};
use super::model::{CellValue, Row, Table};

/// Cell texts read as missing, matching the Pandas CSV defaults we care about.
const NULL_TOKENS: [&str; 8] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw customer table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` / `.txt` – delimited text, delimiter sniffed from the header
/// * `.json`                  – `[{ "Income": 58138, "Education": "Graduation", ... }, ...]`
/// * `.parquet` / `.pq`       – flat columns of strings, numbers, bools or dates
pub fn load_file(path: &Path) -> DataResult<Table> {
    if !path.exists() {
        return Err(DataError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "tsv" | "txt" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => {
            return Err(DataError::UnsupportedFormat {
                extension: other.to_string(),
            })
        }
    };

    log::debug!(
        "Read {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

fn open(path: &Path) -> DataResult<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DataError::read_failure(path, e),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Delimited text with a header row. The public Kaggle export of this dataset
/// is tab-separated, re-saved copies are usually comma-separated, so the
/// delimiter is picked from the header line.
fn load_csv(path: &Path) -> DataResult<Table> {
    let mut header_line = String::new();
    BufReader::new(open(path)?)
        .read_line(&mut header_line)
        .map_err(|e| DataError::read_failure(path, e))?;
    let delimiter = sniff_delimiter(&header_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(open(path)?);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DataError::read_failure(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| DataError::read_failure(path, format!("CSV row {row_no}: {e}")))?;

        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), guess_cell_type(value)))
            .collect();
        rows.push(row);
    }

    Ok(Table::new(headers, rows))
}

fn sniff_delimiter(header: &str) -> u8 {
    [b'\t', b';', b',']
        .into_iter()
        .map(|d| (d, header.bytes().filter(|&b| b == d).count()))
        .filter(|&(_, n)| n > 0)
        .fold(None, |best: Option<(u8, usize)>, (d, n)| match best {
            // Earlier candidates win ties.
            Some((_, top)) if top >= n => best,
            _ => Some((d, n)),
        })
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

pub(crate) fn guess_cell_type(raw: &str) -> CellValue {
    let s = raw.trim();
    if NULL_TOKENS.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => return CellValue::Bool(true),
        "false" | "False" | "FALSE" => return CellValue::Bool(false),
        _ => {}
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path) -> DataResult<Table> {
    let text = std::io::read_to_string(open(path)?).map_err(|e| DataError::read_failure(path, e))?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| DataError::read_failure(path, e))?;

    let records = root
        .as_array()
        .ok_or_else(|| DataError::read_failure(path, "expected top-level JSON array"))?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataError::read_failure(path, format!("row {i} is not a JSON object")))?;

        let mut row = Row::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(Table::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => guess_cell_type(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> DataResult<Table> {
    let file = open(path)?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| DataError::read_failure(path, e))?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(|e| DataError::read_failure(path, e))?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| DataError::read_failure(path, e))?;
        for row_idx in 0..batch.num_rows() {
            let row: Row = columns
                .iter()
                .enumerate()
                .map(|(col_idx, name)| (name.clone(), extract_cell(batch.column(col_idx), row_idx)))
                .collect();
            rows.push(row);
        }
    }

    Ok(Table::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        other => CellValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn csv_cells_are_typed() {
        let file = write_temp(
            ".csv",
            "Year_Birth,Income,Education,Dt_Customer\n1970,58138.5,Graduation,2012-09-04\n1985,,PhD,2013-01-01\n",
        );
        let table = load_file(file.path()).unwrap();

        assert_eq!(table.columns, vec!["Year_Birth", "Income", "Education", "Dt_Customer"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "Year_Birth"), &CellValue::Integer(1970));
        assert_eq!(table.value(0, "Income"), &CellValue::Float(58138.5));
        assert_eq!(table.value(1, "Income"), &CellValue::Null);
        assert_eq!(
            table.value(0, "Dt_Customer"),
            &CellValue::String("2012-09-04".into())
        );
    }

    #[test]
    fn tab_separated_files_are_detected() {
        let file = write_temp(".csv", "ID\tIncome\tEducation\n5524\t58138\tGraduation\n");
        let table = load_file(file.path()).unwrap();

        assert_eq!(table.columns, vec!["ID", "Income", "Education"]);
        assert_eq!(table.value(0, "Income"), &CellValue::Integer(58138));
    }

    #[test]
    fn json_records_load() {
        let file = write_temp(
            ".json",
            r#"[{"Income": 50000, "Education": "Basic"}, {"Income": null, "Country": "SP"}]"#,
        );
        let table = load_file(file.path()).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.has_column("Country"));
        assert_eq!(table.value(1, "Income"), &CellValue::Null);
        assert_eq!(table.value(0, "Country"), &CellValue::Null);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_file(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }

    #[test]
    fn missing_extensionless_file_is_not_found() {
        let err = load_file(Path::new("no/such/marketing_campaign_data")).unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_temp(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat { ref extension } if extension == "xlsx"));
    }

    #[test]
    fn malformed_json_is_a_read_failure() {
        let file = write_temp(".json", "{ not json");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, DataError::ReadFailure { .. }));
    }

    #[test]
    fn ragged_csv_is_a_read_failure() {
        let file = write_temp(".csv", "a,b\n1,2\n3\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, DataError::ReadFailure { .. }));
    }

    #[test]
    fn null_tokens_and_whitespace() {
        assert_eq!(guess_cell_type(" NA "), CellValue::Null);
        assert_eq!(guess_cell_type("nan"), CellValue::Null);
        assert_eq!(guess_cell_type(" 42 "), CellValue::Integer(42));
        assert_eq!(guess_cell_type("2n Cycle"), CellValue::String("2n Cycle".into()));
    }

    #[test]
    fn boolean_spellings() {
        assert_eq!(guess_cell_type("true"), CellValue::Bool(true));
        assert_eq!(guess_cell_type("True"), CellValue::Bool(true));
        assert_eq!(guess_cell_type("TRUE"), CellValue::Bool(true));
        assert_eq!(guess_cell_type("False"), CellValue::Bool(false));
        assert_eq!(guess_cell_type("FALSE"), CellValue::Bool(false));
    }

    #[test]
    fn delimiter_ties_prefer_tab_then_semicolon() {
        assert_eq!(sniff_delimiter("a\tb,c"), b'\t');
        assert_eq!(sniff_delimiter("a;b,c"), b';');
        assert_eq!(sniff_delimiter("a\tb;c"), b'\t');
        assert_eq!(sniff_delimiter("a,b,c;d"), b',');
        assert_eq!(sniff_delimiter("single"), b',');
    }
}

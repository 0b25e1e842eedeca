//! Loader tests across the supported file formats.

use std::io::Write;
use std::sync::Arc;

use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

use campaign_lens::data::loader::load_file;
use campaign_lens::data::pipeline::{clean, CleaningConfig};
use campaign_lens::data::schema::{CAMPAIGN_COLUMNS, SPEND_COLUMNS, TENURE_DAYS, TOTAL_ACCEPTED};
use campaign_lens::data::{CellValue, DataError};

mod common;

/// Write the reference customer plus one null-income row as Parquet.
fn write_parquet() -> tempfile::NamedTempFile {
    let mut fields = vec![
        Field::new("Year_Birth", DataType::Int64, false),
        Field::new("Income", DataType::Float64, true),
        Field::new("Dt_Customer", DataType::Date32, true),
        Field::new("Marital_Status", DataType::Utf8, false),
        Field::new("Education", DataType::Utf8, false),
    ];
    for col in SPEND_COLUMNS.iter().chain(CAMPAIGN_COLUMNS.iter()) {
        fields.push(Field::new(*col, DataType::Int64, false));
    }
    let schema = Arc::new(Schema::new(fields));

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let enrolled = NaiveDate::from_ymd_opt(2013, 6, 15).unwrap();
    let days = (enrolled - epoch).num_days() as i32;

    let mut columns: Vec<Arc<dyn arrow::array::Array>> = vec![
        Arc::new(Int64Array::from(vec![1970, 1980])),
        Arc::new(Float64Array::from(vec![Some(50_000.0), None])),
        Arc::new(Date32Array::from(vec![Some(days), Some(days)])),
        Arc::new(StringArray::from(vec!["Married", "Single"])),
        Arc::new(StringArray::from(vec!["Basic", "PhD"])),
    ];
    for col in SPEND_COLUMNS {
        let wines = if col == "MntWines" { 100 } else { 0 };
        columns.push(Arc::new(Int64Array::from(vec![wines, 5])));
    }
    for col in CAMPAIGN_COLUMNS {
        let response = if col == "Response" { 1 } else { 0 };
        columns.push(Arc::new(Int64Array::from(vec![response, 0])));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
    let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    file
}

#[test]
fn test_parquet_cells_are_typed() {
    let file = write_parquet();
    let table = load_file(file.path()).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.columns[0], "Year_Birth");
    assert_eq!(table.value(0, "Income"), &CellValue::Float(50_000.0));
    assert_eq!(table.value(1, "Income"), &CellValue::Null);
    assert_eq!(
        table.value(0, "Dt_Customer"),
        &CellValue::Date(NaiveDate::from_ymd_opt(2013, 6, 15).unwrap())
    );
}

#[test]
fn test_parquet_dates_skip_string_parsing() {
    let file = write_parquet();
    let table = clean(file.path(), &CleaningConfig::default()).unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.value(0, TENURE_DAYS), &CellValue::Integer(564));
}

#[test]
fn test_json_records_clean_like_csv() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"[{{"Year_Birth": 1970, "Income": 50000, "Dt_Customer": "2013-06-15",
            "Marital_Status": "Married", "Education": "Basic",
            "MntWines": 100, "MntFruits": 0, "MntMeatProducts": 0, "MntFishProducts": 0,
            "MntSweetProducts": 0, "MntGoldProds": 0,
            "AcceptedCmp1": 0, "AcceptedCmp2": 0, "AcceptedCmp3": 0, "AcceptedCmp4": 0,
            "AcceptedCmp5": 0, "Response": 1}}]"#
    )
    .unwrap();

    let from_json = clean(file.path(), &CleaningConfig::default()).unwrap();
    assert_eq!(from_json.len(), 1);
    assert_eq!(from_json.value(0, TENURE_DAYS), &CellValue::Integer(564));
}

#[test]
fn test_json_boolean_flags_are_summed() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"[{{"Year_Birth": 1970, "Income": 50000, "Dt_Customer": "2013-06-15",
            "Marital_Status": "Married", "Education": "Basic",
            "MntWines": 100, "MntFruits": 0, "MntMeatProducts": 0, "MntFishProducts": 0,
            "MntSweetProducts": 0, "MntGoldProds": 0,
            "AcceptedCmp1": true, "AcceptedCmp2": false, "AcceptedCmp3": false,
            "AcceptedCmp4": false, "AcceptedCmp5": false, "Response": true}}]"#
    )
    .unwrap();

    let table = clean(file.path(), &CleaningConfig::default()).unwrap();
    assert_eq!(table.value(0, TOTAL_ACCEPTED), &CellValue::Integer(2));
}

#[test]
fn test_csv_row_count_and_nulls() {
    let file = common::marketing_csv();
    let table = load_file(file.path()).unwrap();

    assert_eq!(table.len(), common::marketing_rows().len());
    assert_eq!(table.value(1, "Income"), &CellValue::Null);
    assert_eq!(table.value(4, "Dt_Customer"), &CellValue::String("not a date".into()));
}

#[test]
fn test_unsupported_extension() {
    let file = tempfile::Builder::new().suffix(".xls").tempfile().unwrap();
    let err = load_file(file.path()).unwrap_err();
    assert!(matches!(err, DataError::UnsupportedFormat { .. }));
}

//! Cleaning and feature engineering for the marketing-campaign table.
//!
//! Every step is a total function `Table -> Table`: rows may be dropped,
//! never added, and surviving rows keep their input order.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::error::{DataError, DataResult};
use super::loader::load_file;
use super::model::{CellValue, Table};
use super::schema::{
    missing_columns, AGE, CAMPAIGN_COLUMNS, DT_CUSTOMER, EDUCATION, INCOME, MARITAL_STATUS,
    SPEND_COLUMNS, TENURE_DAYS, TOTAL_ACCEPTED, TOTAL_SPEND, YEAR_BIRTH,
};

/// Dataset-specific constants. The defaults match the collection period of
/// the dataset and must not be replaced by the current date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub reference_year: i64,
    pub reference_date: NaiveDate,
    /// Rows with `Age >= max_age` are dropped.
    pub max_age: i64,
    /// Rows with `Income >= max_income` are dropped.
    pub max_income: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            reference_year: 2014,
            reference_date: NaiveDate::from_ymd_opt(2014, 12, 31).unwrap_or_default(),
            max_age: 100,
            max_income: 600_000.0,
        }
    }
}

/// What a run of [`clean_table`] did to the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub dropped_null_income: usize,
    pub dropped_outliers: usize,
    /// Non-empty cells that could not be read as a number or date.
    pub degraded_cells: usize,
    pub day_first_fallback: bool,
    pub unparsed_dates: usize,
}

impl CleaningReport {
    pub fn rows_out(&self) -> usize {
        self.rows_in - self.dropped_null_income - self.dropped_outliers
    }
}

/// Load `path` and run the full cleaning pipeline over it.
pub fn clean(path: &Path, config: &CleaningConfig) -> DataResult<Table> {
    let raw = load_file(path)?;
    let (table, report) = clean_table(raw, config)?;
    log::info!(
        "Cleaned {}: {} rows in, {} out ({} null income, {} outliers, {} degraded cells{})",
        path.display(),
        report.rows_in,
        report.rows_out(),
        report.dropped_null_income,
        report.dropped_outliers,
        report.degraded_cells,
        if report.day_first_fallback {
            ", day-first dates"
        } else {
            ""
        }
    );
    Ok(table)
}

/// Run steps 1–8 over an already-loaded table.
pub fn clean_table(raw: Table, config: &CleaningConfig) -> DataResult<(Table, CleaningReport)> {
    let missing = missing_columns(&raw);
    if !missing.is_empty() {
        return Err(DataError::SchemaError { missing });
    }

    let mut report = CleaningReport {
        rows_in: raw.len(),
        ..Default::default()
    };

    let table = drop_null_income(raw, &mut report);
    let table = derive_age(table, config.reference_year, &mut report);
    let table = derive_row_sum(table, &SPEND_COLUMNS, TOTAL_SPEND, &mut report);
    let table = derive_row_sum(table, &CAMPAIGN_COLUMNS, TOTAL_ACCEPTED, &mut report);
    let table = derive_tenure(table, config.reference_date, &mut report);
    let table = map_categories(table, MARITAL_STATUS, marital_category);
    let table = map_categories(table, EDUCATION, education_category);
    let table = remove_outliers(table, config, &mut report);

    Ok((table, report))
}

/// Count a non-empty cell that fails numeric conversion.
fn note_degraded(value: &CellValue, column: &str, report: &mut CleaningReport) {
    if !value.is_null() {
        log::debug!("{column}: cannot read {value:?} as a number");
        report.degraded_cells += 1;
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

fn drop_null_income(mut table: Table, report: &mut CleaningReport) -> Table {
    let before = table.len();
    table.rows.retain(|row| {
        let income = row.get(INCOME).unwrap_or(&CellValue::Null);
        if income.as_f64().is_some() {
            return true;
        }
        if !income.is_null() {
            log::debug!("{INCOME}: cannot read {income:?} as a number");
            report.degraded_cells += 1;
        }
        false
    });
    report.dropped_null_income = before - table.len();
    table
}

fn derive_age(mut table: Table, reference_year: i64, report: &mut CleaningReport) -> Table {
    for row in &mut table.rows {
        let birth = row.get(YEAR_BIRTH).cloned().unwrap_or(CellValue::Null);
        let age = match birth.as_i64().and_then(|year| reference_year.checked_sub(year)) {
            Some(age) => CellValue::Integer(age),
            None => {
                note_degraded(&birth, YEAR_BIRTH, report);
                CellValue::Null
            }
        };
        row.insert(AGE.to_string(), age);
    }
    table.add_column(AGE);
    table
}

/// Row-wise sum over `sources`; missing cells are skipped like `DataFrame.sum(axis=1)`.
fn derive_row_sum(
    mut table: Table,
    sources: &[&str],
    target: &str,
    report: &mut CleaningReport,
) -> Table {
    for row in &mut table.rows {
        let mut total = 0.0;
        for col in sources {
            let value = row.get(*col).unwrap_or(&CellValue::Null);
            match value.as_f64() {
                Some(v) => total += v,
                None => note_degraded(value, col, report),
            }
        }
        row.insert(target.to_string(), CellValue::from_number(total));
    }
    table.add_column(target);
    table
}

fn derive_tenure(mut table: Table, reference: NaiveDate, report: &mut CleaningReport) -> Table {
    let raw = table.column_values(DT_CUSTOMER);
    let (dates, fallback) = parse_enrollment_dates(&raw);
    report.day_first_fallback = fallback;

    for (row, date) in table.rows.iter_mut().zip(dates) {
        let (dt, tenure) = match date {
            Some(d) => (
                CellValue::Date(d),
                CellValue::Integer((reference - d).num_days()),
            ),
            None => {
                report.unparsed_dates += 1;
                (CellValue::Null, CellValue::Null)
            }
        };
        row.insert(DT_CUSTOMER.to_string(), dt);
        row.insert(TENURE_DAYS.to_string(), tenure);
    }
    table.add_column(TENURE_DAYS);
    table
}

fn map_categories(mut table: Table, column: &str, mapping: fn(&str) -> Option<&'static str>) -> Table {
    for row in &mut table.rows {
        if let Some(CellValue::String(raw)) = row.get_mut(column) {
            if let Some(mapped) = mapping(raw) {
                *raw = mapped.to_string();
            }
        }
    }
    table
}

fn remove_outliers(mut table: Table, config: &CleaningConfig, report: &mut CleaningReport) -> Table {
    let before = table.len();
    table.rows.retain(|row| {
        let age_ok = row
            .get(AGE)
            .and_then(CellValue::as_i64)
            .is_some_and(|age| (0..config.max_age).contains(&age));
        let income_ok = row
            .get(INCOME)
            .and_then(CellValue::as_f64)
            .is_some_and(|income| income < config.max_income);
        age_ok && income_ok
    });
    report.dropped_outliers = before - table.len();
    table
}

// ---------------------------------------------------------------------------
// Category consolidation
// ---------------------------------------------------------------------------

/// Consolidated marital status, `None` for values left as-is.
pub fn marital_category(raw: &str) -> Option<&'static str> {
    match raw {
        "Married" | "Together" => Some("Partner"),
        "Single" | "Divorced" | "Widow" | "Alone" => Some("Single"),
        "Absurd" | "YOLO" => Some("Other"),
        _ => None,
    }
}

/// Consolidated education level, `None` for values left as-is.
pub fn education_category(raw: &str) -> Option<&'static str> {
    match raw {
        "Basic" => Some("Undergraduate"),
        "2n Cycle" | "Master" => Some("Master"),
        "Graduation" => Some("Graduate"),
        "PhD" => Some("PhD"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Formats tried once strict ISO parsing has failed for the whole column.
/// Day-first forms win over month-first ones when both would match.
const DAY_FIRST_DATE_FORMATS: [&str; 16] = [
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%m-%y",
    "%d/%m/%y",
    "%d.%m.%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m-%d-%Y",
    "%m/%d/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%Y%m%d",
];

const TIME_SUFFIXES: [&str; 3] = [" %H:%M:%S", " %H:%M", "T%H:%M:%S"];

/// Parse the enrollment-date column. Returns the parsed dates and whether
/// the day-first fallback had to be used.
pub fn parse_enrollment_dates(values: &[CellValue]) -> (Vec<Option<NaiveDate>>, bool) {
    let strict: Vec<Option<NaiveDate>> = values.iter().map(parse_date_strict).collect();
    if strict.iter().any(Option::is_some) || values.is_empty() {
        return (strict, false);
    }

    let heuristic = values
        .iter()
        .map(|v| match v {
            CellValue::Date(d) => Some(*d),
            CellValue::String(s) => parse_date_day_first(s),
            CellValue::Integer(i) => parse_date_day_first(&i.to_string()),
            _ => None,
        })
        .collect();
    (heuristic, true)
}

fn parse_date_strict(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// Day-first heuristic parse of a single date string, with an optional
/// time-of-day suffix.
pub fn parse_date_day_first(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DAY_FIRST_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DAY_FIRST_DATE_FORMATS {
        for suffix in TIME_SUFFIXES {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, &format!("{fmt}{suffix}")) {
                return Some(dt.date());
            }
        }
    }
    None
}

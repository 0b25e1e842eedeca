use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the customer table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common Pandas dtypes.
/// Filter selections live in `BTreeSet`s, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.2}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell. `NaN` counts as missing, booleans as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_nan() => None,
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    /// Integer view of the cell; floats qualify only when integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null) || matches!(self, CellValue::Float(v) if v.is_nan())
    }

    /// Wrap an arithmetic result, keeping integral values as `Integer`
    /// the way a Pandas sum over int columns stays int.
    pub fn from_number(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            CellValue::Integer(value as i64)
        } else {
            CellValue::Float(value)
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// One customer record: column name → value.
pub type Row = BTreeMap<String, CellValue>;

/// A loaded table with a stable column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column names in file order; derived columns are appended.
    pub columns: Vec<String>,
    /// All rows, in input order.
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Table { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Register a column name (no-op when it already exists).
    pub fn add_column(&mut self, column: &str) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
    }

    /// Cell at `(row, column)`, `Null` when the row lacks the column.
    pub fn value(&self, row: usize, column: &str) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&CellValue::Null)
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, column: &str) -> Vec<CellValue> {
        self.rows
            .iter()
            .map(|r| r.get(column).cloned().unwrap_or(CellValue::Null))
            .collect()
    }

    /// Sorted set of distinct values in a column.
    pub fn unique_values(&self, column: &str) -> BTreeSet<CellValue> {
        self.rows
            .iter()
            .map(|r| r.get(column).cloned().unwrap_or(CellValue::Null))
            .collect()
    }
}

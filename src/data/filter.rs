use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::model::{CellValue, Row, Table};
use super::schema::FILTER_COLUMNS;

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
pub type FilterState = BTreeMap<String, BTreeSet<CellValue>>;

/// Initialise a [`FilterState`] with all values selected for every sidebar
/// column present in the table.
pub fn init_filter_state(table: &Table) -> FilterState {
    FILTER_COLUMNS
        .iter()
        .filter(|col| table.has_column(col))
        .map(|col| (col.to_string(), table.unique_values(col)))
        .collect()
}

// ---------------------------------------------------------------------------
// TableView – a filtered, read-only window over the base table
// ---------------------------------------------------------------------------

/// Rows of an immutable base table that passed a filter. Each view owns its
/// own index list; the base is shared and never mutated.
#[derive(Debug, Clone)]
pub struct TableView {
    base: Arc<Table>,
    indices: Vec<usize>,
}

impl TableView {
    /// A view over every row of `base`.
    pub fn all(base: &Arc<Table>) -> Self {
        TableView {
            base: Arc::clone(base),
            indices: (0..base.len()).collect(),
        }
    }

    pub fn base(&self) -> &Table {
        &self.base
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.indices.iter().map(move |&i| &self.base.rows[i])
    }

    /// Values of one column over the visible rows.
    pub fn values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows()
            .map(move |row| row.get(column).unwrap_or(&CellValue::Null))
    }

    /// Numeric values of one column over the visible rows, nulls skipped.
    pub fn numbers(&self, column: &str) -> Vec<f64> {
        self.values(column).filter_map(CellValue::as_f64).collect()
    }
}

/// Derive the view of `base` that passes all active filters.
///
/// A row passes a column filter when:
/// * The column does not exist in the table → passes (no constraint)
/// * The filter set for that column is empty → nothing selected → fails
/// * The row's value for that column is in the selected set → passes
pub fn derive_view(base: &Arc<Table>, filters: &FilterState) -> TableView {
    let active: Vec<(&String, &BTreeSet<CellValue>)> = filters
        .iter()
        .filter(|(col, _)| base.has_column(col))
        .collect();

    let indices = base
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            active.iter().all(|(col, selected)| {
                let value = row.get(col.as_str()).unwrap_or(&CellValue::Null);
                selected.contains(value)
            })
        })
        .map(|(i, _)| i)
        .collect();

    TableView {
        base: Arc::clone(base),
        indices,
    }
}

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use campaign_lens::config::DashboardConfig;
use campaign_lens::data::cache::TableCache;
use campaign_lens::data::filter::{derive_view, init_filter_state, FilterState, TableView};
use campaign_lens::data::pipeline::CleaningConfig;
use campaign_lens::data::schema::EDUCATION;
use campaign_lens::data::{CellValue, Table};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Dashboard sections shown below the KPI row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Campaigns,
    Spending,
    Segmentation,
    Data,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Campaigns, Tab::Spending, Tab::Segmentation, Tab::Data];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Campaigns => "📢 Campaign Performance",
            Tab::Spending => "💰 Spending Analysis",
            Tab::Segmentation => "👥 Customer Segmentation",
            Tab::Data => "🗒 Data",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Memo of the cleaned table per source.
    cache: TableCache,

    cleaning: CleaningConfig,

    /// Source currently shown (or last attempted).
    pub source: PathBuf,

    /// Cleaned base table (None until a load succeeds).
    pub table: Option<Arc<Table>>,

    /// Per-column filter selections.
    pub filters: FilterState,

    /// Rows passing the current filters.
    pub view: Option<TableView>,

    /// Education → colour, shared by the scatter legend and trend lines.
    pub education_colors: Option<ColorMap>,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            cache: TableCache::new(),
            cleaning: config.cleaning,
            source: config.data_path,
            table: None,
            filters: FilterState::default(),
            view: None,
            education_colors: None,
            tab: Tab::default(),
            status_message: None,
        }
    }

    /// Load (or fetch from cache) the cleaned table for `path`.
    ///
    /// On failure the previous table is discarded: a fatal data error means
    /// nothing downstream may render.
    pub fn load(&mut self, path: &Path) {
        self.source = path.to_path_buf();
        match self.cache.get_or_load(path, &self.cleaning) {
            Ok(table) => {
                log::info!(
                    "Showing {} customers from {}",
                    table.len(),
                    path.display()
                );
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load data: {e}");
                self.status_message = Some(e.to_string());
                self.table = None;
                self.view = None;
                self.filters.clear();
                self.education_colors = None;
            }
        }
    }

    /// Drop the cached table and load the current source again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        let source = self.source.clone();
        self.load(&source);
    }

    /// Ingest a cleaned table, initialise filters and colours.
    fn set_table(&mut self, table: Arc<Table>) {
        self.filters = init_filter_state(&table);
        self.education_colors = Some(ColorMap::new(EDUCATION, &table.unique_values(EDUCATION)));
        self.view = Some(TableView::all(&table));
        self.table = Some(table);
        self.status_message = None;
    }

    /// Derive a fresh view from the base table after a filter change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.view = Some(derive_view(table, &self.filters));
        }
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let selected = self.filters.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: &str) {
        if let Some(table) = &self.table {
            self.filters
                .insert(column.to_string(), table.unique_values(column));
            self.refilter();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: &str) {
        self.filters.insert(column.to_string(), BTreeSet::new());
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_lens::data::schema::MARITAL_STATUS;
    use std::io::Write;

    fn state_with_data() -> (AppState, tempfile::NamedTempFile) {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Year_Birth,Income,Dt_Customer,Marital_Status,Education,MntWines,MntFruits,MntMeatProducts,MntFishProducts,MntSweetProducts,MntGoldProds,AcceptedCmp1,AcceptedCmp2,AcceptedCmp3,AcceptedCmp4,AcceptedCmp5,Response").unwrap();
        writeln!(file, "1970,50000,2013-06-15,Married,Basic,100,0,0,0,0,0,0,0,0,0,0,1").unwrap();
        writeln!(file, "1980,60000,2013-01-01,Single,PhD,50,5,0,0,0,0,1,0,0,0,0,0").unwrap();
        writeln!(file, "1990,,2013-01-01,Single,PhD,50,5,0,0,0,0,1,0,0,0,0,0").unwrap();

        let mut state = AppState::new(DashboardConfig::default());
        state.load(file.path());
        (state, file)
    }

    #[test]
    fn four_tabs_with_distinct_titles() {
        assert_eq!(Tab::ALL.len(), 4);
        assert_eq!(Tab::ALL[3], Tab::Data);
        let titles: std::collections::BTreeSet<_> = Tab::ALL.iter().map(|t| t.title()).collect();
        assert_eq!(titles.len(), Tab::ALL.len());
    }

    #[test]
    fn load_initialises_filters_and_view() {
        let (state, _file) = state_with_data();

        assert!(state.status_message.is_none());
        assert_eq!(state.table.as_ref().map(|t| t.len()), Some(2));
        assert_eq!(state.view.as_ref().map(TableView::len), Some(2));
        assert_eq!(state.filters[MARITAL_STATUS].len(), 2);
    }

    #[test]
    fn toggling_filters_derives_new_view() {
        let (mut state, _file) = state_with_data();
        let partner = CellValue::String("Partner".into());

        state.toggle_filter_value(MARITAL_STATUS, &partner);
        assert_eq!(state.view.as_ref().map(TableView::len), Some(1));

        state.select_none(EDUCATION);
        assert_eq!(state.view.as_ref().map(TableView::len), Some(0));

        state.select_all(EDUCATION);
        state.toggle_filter_value(MARITAL_STATUS, &partner);
        assert_eq!(state.view.as_ref().map(TableView::len), Some(2));
        assert_eq!(state.table.as_ref().map(|t| t.len()), Some(2));
    }

    #[test]
    fn missing_file_reports_and_clears() {
        let (mut state, _file) = state_with_data();
        state.load(Path::new("no/such/file.csv"));

        assert!(state.table.is_none());
        assert!(state.view.is_none());
        let message = state.status_message.unwrap_or_default();
        assert!(message.contains("File not found"));
    }
}

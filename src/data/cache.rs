use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::DataResult;
use super::model::Table;
use super::pipeline::{clean, CleaningConfig};

// ---------------------------------------------------------------------------
// Single-entry memo of the cleaned table
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    config: CleaningConfig,
    table: Arc<Table>,
}

/// Memoizes [`clean`] for the most recently requested source.
///
/// The published table is shared read-only through an `Arc`; asking for a
/// different path (or cleaning config) replaces the entry. Failed loads are
/// never cached.
#[derive(Debug, Default)]
pub struct TableCache {
    entry: Option<CacheEntry>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cleaned table for `path`, running the pipeline on a miss.
    pub fn get_or_load(&mut self, path: &Path, config: &CleaningConfig) -> DataResult<Arc<Table>> {
        if let Some(entry) = &self.entry {
            if entry.path == path && entry.config == *config {
                log::debug!("Cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.table));
            }
        }

        log::debug!("Cache miss for {}", path.display());
        let table = Arc::new(clean(path, config)?);
        self.entry = Some(CacheEntry {
            path: path.to_path_buf(),
            config: config.clone(),
            table: Arc::clone(&table),
        });
        Ok(table)
    }

    /// Whether a table for `path` is currently cached.
    pub fn contains(&self, path: &Path) -> bool {
        self.entry.as_ref().is_some_and(|e| e.path == path)
    }

    /// Drop the cached table so the next request reloads from disk.
    pub fn invalidate(&mut self) {
        if let Some(entry) = self.entry.take() {
            log::info!("Invalidated cached table for {}", entry.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::DataError;
    use std::io::Write;
    use tempfile::Builder;

    const HEADER: &str = "Year_Birth,Income,Dt_Customer,Marital_Status,Education,MntWines,MntFruits,MntMeatProducts,MntFishProducts,MntSweetProducts,MntGoldProds,AcceptedCmp1,AcceptedCmp2,AcceptedCmp3,AcceptedCmp4,AcceptedCmp5,Response";

    fn dataset(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file
    }

    #[test]
    fn repeated_requests_share_one_table() {
        let file = dataset(&["1970,50000,2013-06-15,Married,Basic,100,0,0,0,0,0,0,0,0,0,0,1"]);
        let mut cache = TableCache::new();
        let config = CleaningConfig::default();

        let first = cache.get_or_load(file.path(), &config).unwrap();
        let second = cache.get_or_load(file.path(), &config).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.contains(file.path()));
    }

    #[test]
    fn new_path_replaces_entry() {
        let a = dataset(&["1970,50000,2013-06-15,Married,Basic,100,0,0,0,0,0,0,0,0,0,0,1"]);
        let b = dataset(&[
            "1980,40000,2013-06-15,Single,PhD,10,0,0,0,0,0,0,0,0,0,0,0",
            "1981,41000,2013-06-15,Single,PhD,10,0,0,0,0,0,0,0,0,0,0,0",
        ]);
        let mut cache = TableCache::new();
        let config = CleaningConfig::default();

        cache.get_or_load(a.path(), &config).unwrap();
        let table_b = cache.get_or_load(b.path(), &config).unwrap();

        assert_eq!(table_b.len(), 2);
        assert!(cache.contains(b.path()));
        assert!(!cache.contains(a.path()));
    }

    #[test]
    fn new_config_on_same_path_misses() {
        let file = dataset(&["1970,50000,2013-06-15,Married,Basic,100,0,0,0,0,0,0,0,0,0,0,1"]);
        let mut cache = TableCache::new();
        let strict = CleaningConfig {
            max_income: 45_000.0,
            ..CleaningConfig::default()
        };

        let first = cache.get_or_load(file.path(), &CleaningConfig::default()).unwrap();
        let second = cache.get_or_load(file.path(), &strict).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());

        let third = cache.get_or_load(file.path(), &strict).unwrap();
        assert!(Arc::ptr_eq(&second, &third));
    }

    #[test]
    fn invalidate_forces_reload() {
        let file = dataset(&["1970,50000,2013-06-15,Married,Basic,100,0,0,0,0,0,0,0,0,0,0,1"]);
        let mut cache = TableCache::new();
        let config = CleaningConfig::default();

        let first = cache.get_or_load(file.path(), &config).unwrap();
        cache.invalidate();
        let second = cache.get_or_load(file.path(), &config).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn errors_are_not_cached() {
        let mut cache = TableCache::new();
        let missing = Path::new("no/such/marketing.csv");

        let err = cache
            .get_or_load(missing, &CleaningConfig::default())
            .unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
        assert!(!cache.contains(missing));
    }
}

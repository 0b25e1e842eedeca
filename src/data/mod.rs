/// Data layer: loading, cleaning, caching, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → raw Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  null-income drop, derived columns, category
///   └──────────┘  consolidation, outlier removal
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  Arc<Table> memoized per source
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  sidebar selections → TableView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  KPIs, group means, histograms, trends
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod schema;
pub mod stats;

pub use error::DataError;
pub use model::{CellValue, Row, Table};

//! Campaign Lens: marketing-campaign analytics.
//!
//! The library half holds everything below the UI: loading, the cleaning
//! pipeline, the memo cache, filtered views and aggregate queries.

pub mod config;
pub mod data;

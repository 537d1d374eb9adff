//! # Command Center Dataset Crate
//!
//! This crate is the only place that touches the engineered-features file.
//!
//! ## Architectural Principles
//!
//! - **Schema First:** The header row is inspected once and turned into a
//!   `DataSchema`. Every row is then coerced into a typed `TradePeriodRecord`;
//!   nothing downstream probes for columns.
//! - **Load and Derive Once:** Sorting, regime bucketing and the running
//!   `cumulative_pnl` are computed in a single pass at load time. A `Dataset`
//!   is immutable afterwards and shared behind an `Arc`.
//! - **Explicit Cache:** `DatasetCache` owns the loaded data, its load instant
//!   and its TTL, and reloads through `get_or_reload()`.
//!
//! ## Public API
//!
//! - `DataSource`: ordered candidate paths; the first existing file wins.
//! - `Dataset`: the loaded, derived record set plus file metadata.
//! - `DatasetCache`: the time-bounded read-through cache.
//! - `write_csv` / `to_csv_bytes`: the filtered-subset export.
//! - `DatasetError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod cache;
pub mod dataset;
pub mod error;
pub mod export;
pub mod loader;
pub mod source;

// Re-export the key components to create a clean, public-facing API.
pub use cache::DatasetCache;
pub use dataset::Dataset;
pub use error::DatasetError;
pub use export::{to_csv_bytes, write_csv};
pub use loader::{read_records, LoadedRecords};
pub use source::{load_dataset, DataSource};

//! # Command Center Analytics Engine
//!
//! This crate turns a set of `TradePeriodRecord`s into the numbers the
//! dashboard shows: KPI tiles, regime insights and chart datasets.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of files, HTTP or the cache.
//!   It depends only on `core-types`.
//! - **Stateless Calculation:** The `AnalyticsEngine` and the functions in
//!   `charts` take record slices as input and return plain serializable
//!   structs. Rendering is someone else's job.
//!
//! ## Public API
//!
//! - `DashboardFilter`: the date-range and regime selection.
//! - `AnalyticsEngine`: KPI and regime-insight calculation.
//! - `KpiSummary`, `RegimeInsights`: its outputs.
//! - `charts`: one function per chart dataset.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod charts;
pub mod engine;
pub mod error;
pub mod filter;
pub mod summary;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use filter::{regime_options, DashboardFilter};
pub use summary::{KpiSummary, RegimeInsights};

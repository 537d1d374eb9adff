//! # Command Center Core Types
//!
//! The shared vocabulary of the workspace: the `TradePeriodRecord` row produced
//! by the dataset loader, the sentiment `Regime` buckets and the `DataSchema`
//! describing which optional columns a source file carried.
//!
//! This crate has no knowledge of files, HTTP or configuration.

pub mod enums;
pub mod error;
pub mod schema;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{PositionSide, Regime, RegimeFilter};
pub use error::CoreError;
pub use schema::{DataSchema, RegimeSource, WinRateColumn};
pub use structs::TradePeriodRecord;

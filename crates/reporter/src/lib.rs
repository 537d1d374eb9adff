//! # Command Center Reporter
//!
//! Renders the plain-text executive summary that the dashboard offers as a
//! download, and the money formatting shared by every text surface.

pub mod format;
pub mod report;

pub use format::{
    format_grouped, format_leverage, format_millions, format_optional_usd, format_percent,
    format_usd, NOT_AVAILABLE,
};
pub use report::ExecutiveReport;

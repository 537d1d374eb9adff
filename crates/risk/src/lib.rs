//! # Command Center Risk Crate
//!
//! What-if evaluation of trading rules against historical periods, plus the
//! small position-level calculators shown next to it.
//!
//! ## Public API
//!
//! - `RiskRule`: a predicate deciding whether a period would have been blocked.
//! - `LeverageCapRule`: the "Anti-Fragile Leverage Cap" rule.
//! - `evaluate`: replays any rule over a record set into a `SimulationResult`.
//! - `Oracle`: the threshold-based outlook, available when a model artifact exists.
//! - `liquidation_price`: the liquidation level of a leveraged position.

pub mod error;
pub mod leverage_cap;
pub mod liquidation;
pub mod oracle;

pub use error::RiskError;
pub use leverage_cap::{evaluate, LeverageCapRule, SimulationResult};
pub use liquidation::{liquidation_price, MAX_LEVERAGE};
pub use oracle::{Oracle, OracleInput, Outlook, Prediction};

use core_types::TradePeriodRecord;

/// A rule that would have kept the trader out of some periods.
pub trait RiskRule {
    /// Returns true if the rule blocks trading in this period.
    fn blocks(&self, record: &TradePeriodRecord) -> bool;
}

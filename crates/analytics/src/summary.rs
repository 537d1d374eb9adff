use core_types::Regime;
use rust_decimal::Decimal;
use serde::Serialize;

/// The four headline tiles of the dashboard, over the filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub net_pnl: Decimal,
    /// Mean of the detected win-rate column as a fraction; `None` when the
    /// file has no such column or every value is missing.
    pub win_rate: Option<f64>,
    pub total_volume: Decimal,
    /// `None` for an empty selection.
    pub avg_leverage: Option<f64>,
    pub record_count: usize,
}

impl KpiSummary {
    pub fn empty() -> Self {
        Self {
            net_pnl: Decimal::ZERO,
            win_rate: None,
            total_volume: Decimal::ZERO,
            avg_leverage: None,
            record_count: 0,
        }
    }
}

impl Default for KpiSummary {
    fn default() -> Self {
        Self::empty()
    }
}

/// How PnL behaved per sentiment family over the filtered subset.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RegimeInsights {
    /// The most frequent regime. Ties go to the regime earlier in bin order.
    pub dominant_regime: Option<Regime>,
    /// Mean `net_pnl` over Extreme Fear and Fear records.
    pub avg_pnl_fear: Option<Decimal>,
    /// Mean `net_pnl` over Greed and Extreme Greed records.
    pub avg_pnl_greed: Option<Decimal>,
}

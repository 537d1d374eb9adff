use crate::enums::Regime;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

/// One row of aggregated trading activity for a single time bucket.
///
/// Records are produced by the dataset loader in one load-and-derive pass and
/// are never mutated afterwards. `regime` and `cumulative_pnl` are derived
/// fields; `cumulative_pnl` is only meaningful inside the chronologically
/// sorted set it was computed over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradePeriodRecord {
    pub date: NaiveDateTime,
    pub net_pnl: Decimal,
    pub sentiment_score: f64,
    pub avg_leverage: f64,
    pub total_volume: Decimal,
    pub max_adverse_excursion: f64,
    pub trade_frequency: f64,
    pub regime: Option<Regime>,
    pub cluster_label: Option<String>,
    pub win_rate: Option<f64>,
    pub cumulative_pnl: Decimal,
    /// Values of `DataSchema::extra_columns`, index-aligned.
    #[serde(skip)]
    pub extra_fields: Vec<String>,
}

impl TradePeriodRecord {
    /// Creates a record with the fields the risk rule looks at and neutral
    /// values everywhere else. The regime is bucketed from the sentiment score.
    pub fn new(date: NaiveDateTime, net_pnl: Decimal, sentiment_score: f64, avg_leverage: f64) -> Self {
        Self {
            date,
            net_pnl,
            sentiment_score,
            avg_leverage,
            total_volume: Decimal::ZERO,
            max_adverse_excursion: 0.0,
            trade_frequency: 0.0,
            regime: Regime::from_sentiment(sentiment_score),
            cluster_label: None,
            win_rate: None,
            cumulative_pnl: net_pnl,
            extra_fields: Vec::new(),
        }
    }
}

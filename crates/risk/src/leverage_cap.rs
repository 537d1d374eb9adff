use crate::error::RiskError;
use crate::RiskRule;
use configuration::SimulatorSettings;
use core_types::TradePeriodRecord;
use rust_decimal::Decimal;
use serde::Serialize;

/// Blocks periods that are both greedy and over-leveraged.
///
/// A period is blocked when `sentiment_score > greed_threshold` and
/// `avg_leverage > leverage_cap`. Both comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeverageCapRule {
    greed_threshold: f64,
    leverage_cap: f64,
}

impl LeverageCapRule {
    /// Creates a rule, rejecting thresholds that cannot describe a real market.
    pub fn new(greed_threshold: f64, leverage_cap: f64) -> Result<Self, RiskError> {
        if !greed_threshold.is_finite() || !(0.0..=100.0).contains(&greed_threshold) {
            return Err(RiskError::InvalidParameters(format!(
                "greed_threshold must be within 0..=100, got {}",
                greed_threshold
            )));
        }
        if !leverage_cap.is_finite() || leverage_cap <= 0.0 {
            return Err(RiskError::InvalidParameters(format!(
                "leverage_cap must be greater than 0, got {}",
                leverage_cap
            )));
        }
        Ok(Self {
            greed_threshold,
            leverage_cap,
        })
    }

    /// Creates a rule from user overrides, falling back to the `[simulator]`
    /// settings for anything not given.
    pub fn from_settings(
        defaults: &SimulatorSettings,
        greed_threshold: Option<f64>,
        leverage_cap: Option<f64>,
    ) -> Result<Self, RiskError> {
        Self::new(
            greed_threshold.unwrap_or(defaults.greed_threshold),
            leverage_cap.unwrap_or(defaults.leverage_cap),
        )
    }

    pub fn greed_threshold(&self) -> f64 {
        self.greed_threshold
    }

    pub fn leverage_cap(&self) -> f64 {
        self.leverage_cap
    }
}

impl RiskRule for LeverageCapRule {
    fn blocks(&self, record: &TradePeriodRecord) -> bool {
        record.sentiment_score > self.greed_threshold && record.avg_leverage > self.leverage_cap
    }
}

/// What a rule would have changed, had it been enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SimulationResult {
    pub blocked_count: usize,
    /// Losses the blocked periods would not have incurred. Never negative.
    pub avoided_loss: Decimal,
    /// Profits the blocked periods would not have earned. Never negative.
    pub missed_profit: Decimal,
    /// `avoided_loss - missed_profit`. Positive means the rule helped.
    pub net_impact: Decimal,
}

/// Replays a rule over a record set.
///
/// Pass the full dataset: a rule judges history, not the current display
/// selection. Blocking nothing yields an all-zero result. Totals saturate at
/// the `Decimal` range.
pub fn evaluate<R: RiskRule + ?Sized>(rule: &R, records: &[TradePeriodRecord]) -> SimulationResult {
    let mut result = SimulationResult::default();

    for record in records.iter().filter(|r| rule.blocks(r)) {
        result.blocked_count += 1;
        if record.net_pnl.is_sign_negative() {
            result.avoided_loss = result.avoided_loss.saturating_sub(record.net_pnl);
        } else {
            result.missed_profit = result.missed_profit.saturating_add(record.net_pnl);
        }
    }
    result.net_impact = result.avoided_loss.saturating_sub(result.missed_profit);

    tracing::debug!(
        blocked = result.blocked_count,
        net_impact = %result.net_impact,
        "Rule evaluated."
    );
    result
}

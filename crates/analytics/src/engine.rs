use crate::summary::{KpiSummary, RegimeInsights};
use core_types::{Regime, TradePeriodRecord};
use rust_decimal::Decimal;

/// A stateless calculator for the dashboard's headline numbers.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the KPI tiles over an already filtered selection.
    ///
    /// An empty selection yields zero sums and no averages. Sums saturate at
    /// the `Decimal` range instead of overflowing.
    pub fn kpis(&self, records: &[TradePeriodRecord]) -> KpiSummary {
        if records.is_empty() {
            return KpiSummary::empty();
        }

        let net_pnl = saturating_sum(records.iter().map(|r| r.net_pnl));
        let total_volume = saturating_sum(records.iter().map(|r| r.total_volume));
        let avg_leverage = mean(records.iter().map(|r| r.avg_leverage));
        let win_rate = mean(records.iter().filter_map(|r| r.win_rate));

        KpiSummary {
            net_pnl,
            win_rate,
            total_volume,
            avg_leverage,
            record_count: records.len(),
        }
    }

    /// Finds the dominant regime and the average PnL per sentiment family.
    pub fn regime_insights(&self, records: &[TradePeriodRecord]) -> RegimeInsights {
        let mut counts = [0usize; Regime::ALL.len()];
        for regime in records.iter().filter_map(|r| r.regime) {
            if let Some(slot) = Regime::ALL.iter().position(|r| *r == regime) {
                counts[slot] += 1;
            }
        }

        // Strictly greater keeps the earliest regime on ties.
        let mut dominant: Option<(Regime, usize)> = None;
        for (regime, count) in Regime::ALL.iter().zip(counts) {
            if count > 0 && dominant.is_none_or(|(_, best)| count > best) {
                dominant = Some((*regime, count));
            }
        }

        RegimeInsights {
            dominant_regime: dominant.map(|(regime, _)| regime),
            avg_pnl_fear: mean_pnl(records, Regime::is_fear),
            avg_pnl_greed: mean_pnl(records, Regime::is_greed),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

fn mean_pnl(records: &[TradePeriodRecord], family: fn(&Regime) -> bool) -> Option<Decimal> {
    let (sum, n) = records
        .iter()
        .filter(|r| r.regime.as_ref().is_some_and(family))
        .fold((Decimal::ZERO, 0usize), |(sum, n), r| (sum + r.net_pnl, n + 1));
    (n > 0).then(|| sum / Decimal::from(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(day: u32, pnl: Decimal, sentiment: f64, leverage: f64) -> TradePeriodRecord {
        let date = NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        TradePeriodRecord::new(date, pnl, sentiment, leverage)
    }

    #[test]
    fn kpis_sum_and_average_the_selection() {
        let mut a = record(1, dec!(100), 50.0, 2.0);
        a.total_volume = dec!(1_500_000);
        a.win_rate = Some(0.6);
        let mut b = record(2, dec!(-40), 50.0, 4.0);
        b.total_volume = dec!(500_000);
        let mut c = record(3, dec!(15), 50.0, 3.0);
        c.win_rate = Some(0.4);

        let kpis = AnalyticsEngine::new().kpis(&[a, b, c]);
        assert_eq!(kpis.net_pnl, dec!(75));
        assert_eq!(kpis.total_volume, dec!(2_000_000));
        assert_eq!(kpis.avg_leverage, Some(3.0));
        assert_eq!(kpis.win_rate, Some(0.5));
        assert_eq!(kpis.record_count, 3);
    }

    #[test]
    fn kpi_sums_saturate_instead_of_overflowing() {
        let mut a = record(1, Decimal::MAX, 50.0, 2.0);
        a.total_volume = Decimal::MAX;
        let mut b = record(2, Decimal::MAX, 50.0, 2.0);
        b.total_volume = Decimal::MAX;

        let kpis = AnalyticsEngine::new().kpis(&[a, b]);
        assert_eq!(kpis.net_pnl, Decimal::MAX);
        assert_eq!(kpis.total_volume, Decimal::MAX);
    }

    #[test]
    fn kpis_of_nothing_are_zero() {
        let kpis = AnalyticsEngine::new().kpis(&[]);
        assert_eq!(kpis, KpiSummary::empty());
    }

    #[test]
    fn win_rate_is_none_without_values() {
        let kpis = AnalyticsEngine::new().kpis(&[record(1, dec!(1), 50.0, 1.0)]);
        assert_eq!(kpis.win_rate, None);
    }

    #[test]
    fn insights_split_by_sentiment_family() {
        let records = vec![
            record(1, dec!(-100), 10.0, 1.0), // Extreme Fear
            record(2, dec!(50), 30.0, 1.0),   // Fear
            record(3, dec!(20), 60.0, 1.0),   // Greed
            record(4, dec!(40), 90.0, 1.0),   // Extreme Greed
            record(5, dec!(7), 50.0, 1.0),    // Neutral
        ];
        let insights = AnalyticsEngine::new().regime_insights(&records);
        assert_eq!(insights.avg_pnl_fear, Some(dec!(-25)));
        assert_eq!(insights.avg_pnl_greed, Some(dec!(30)));
    }

    #[test]
    fn dominant_regime_ties_go_to_bin_order() {
        let records = vec![
            record(1, dec!(1), 90.0, 1.0),
            record(2, dec!(1), 30.0, 1.0),
            record(3, dec!(1), 95.0, 1.0),
            record(4, dec!(1), 35.0, 1.0),
        ];
        let insights = AnalyticsEngine::new().regime_insights(&records);
        assert_eq!(insights.dominant_regime, Some(Regime::Fear));
    }

    #[test]
    fn insights_of_nothing_are_empty() {
        let insights = AnalyticsEngine::new().regime_insights(&[]);
        assert_eq!(insights, RegimeInsights::default());
    }
}

use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{Regime, RegimeFilter, TradePeriodRecord};
use serde::Serialize;

/// The dashboard's display selection: an inclusive range of calendar days
/// and a regime.
///
/// Both ends are whole days, so a record at `end 23:00` is inside the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub regime: RegimeFilter,
}

impl DashboardFilter {
    pub fn new(start: NaiveDate, end: NaiveDate, regime: RegimeFilter) -> Result<Self, AnalyticsError> {
        if start > end {
            return Err(AnalyticsError::InvalidFilter(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end, regime })
    }

    /// Builds a filter from optional user input, defaulting each missing
    /// bound to the dataset's own bound.
    pub fn with_defaults(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        regime: RegimeFilter,
        bounds: (NaiveDate, NaiveDate),
    ) -> Result<Self, AnalyticsError> {
        Self::new(start.unwrap_or(bounds.0), end.unwrap_or(bounds.1), regime)
    }

    /// Resolves optional user input against `records` and applies it.
    ///
    /// Missing bounds default to the first and last day present in `records`.
    pub fn select(
        records: &[TradePeriodRecord],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        regime: RegimeFilter,
    ) -> Result<(Self, Vec<TradePeriodRecord>), AnalyticsError> {
        let days = records.iter().map(|r| r.date.date());
        let bounds = days
            .clone()
            .min()
            .zip(days.max())
            .ok_or_else(|| AnalyticsError::InvalidFilter("there are no records to select from".to_string()))?;
        let filter = Self::with_defaults(start, end, regime, bounds)?;
        let selected = filter.apply(records);
        Ok((filter, selected))
    }

    pub fn matches(&self, record: &TradePeriodRecord) -> bool {
        let day = record.date.date();
        day >= self.start && day <= self.end && self.regime.matches(record.regime)
    }

    /// Returns the matching records, in their original order.
    pub fn apply(&self, records: &[TradePeriodRecord]) -> Vec<TradePeriodRecord> {
        let selected: Vec<_> = records.iter().filter(|r| self.matches(r)).cloned().collect();
        tracing::debug!(
            start = %self.start,
            end = %self.end,
            regime = %self.regime,
            selected = selected.len(),
            total = records.len(),
            "Applied dashboard filter."
        );
        selected
    }
}

/// The regime selector's choices: `All`, then each present regime.
pub fn regime_options(present: &[Regime]) -> Vec<RegimeFilter> {
    std::iter::once(RegimeFilter::All)
        .chain(present.iter().copied().map(RegimeFilter::Only))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn record(d: u32, hour: u32, sentiment: f64) -> TradePeriodRecord {
        TradePeriodRecord::new(day(d).and_hms_opt(hour, 0, 0).unwrap(), dec!(1), sentiment, 1.0)
    }

    #[test]
    fn end_day_is_included_in_full() {
        let records = vec![record(1, 0, 50.0), record(2, 18, 50.0), record(3, 0, 50.0)];
        let filter = DashboardFilter::new(day(1), day(2), RegimeFilter::All).unwrap();
        let selected = filter.apply(&records);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[1].date.date(), day(2));
    }

    #[test]
    fn regime_selection_narrows_the_range() {
        let records = vec![record(1, 0, 10.0), record(2, 0, 80.0), record(3, 0, 90.0)];
        let filter =
            DashboardFilter::new(day(1), day(3), RegimeFilter::Only(Regime::ExtremeGreed)).unwrap();
        assert_eq!(filter.apply(&records).len(), 2);
    }

    #[test]
    fn unlabelled_records_only_match_all() {
        let records = vec![record(1, 0, 150.0)];
        let all = DashboardFilter::new(day(1), day(1), RegimeFilter::All).unwrap();
        let fear = DashboardFilter::new(day(1), day(1), RegimeFilter::Only(Regime::Fear)).unwrap();
        assert_eq!(all.apply(&records).len(), 1);
        assert!(fear.apply(&records).is_empty());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = DashboardFilter::new(day(5), day(4), RegimeFilter::All).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidFilter(_)));
    }

    #[test]
    fn missing_bounds_default_to_the_dataset() {
        let filter =
            DashboardFilter::with_defaults(None, Some(day(9)), RegimeFilter::All, (day(1), day(30))).unwrap();
        assert_eq!(filter.start, day(1));
        assert_eq!(filter.end, day(9));
    }

    #[test]
    fn select_defaults_to_the_records_own_range() {
        let records = vec![record(7, 0, 50.0), record(3, 12, 50.0), record(5, 0, 50.0)];
        let (filter, selected) =
            DashboardFilter::select(&records, Some(day(4)), None, RegimeFilter::All).unwrap();
        assert_eq!(filter.start, day(4));
        assert_eq!(filter.end, day(7));
        assert_eq!(selected.len(), 2);

        let err = DashboardFilter::select(&[], None, None, RegimeFilter::All).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidFilter(_)));
    }

    #[test]
    fn options_start_with_all() {
        let options = regime_options(&[Regime::Greed, Regime::Fear]);
        assert_eq!(
            options,
            vec![
                RegimeFilter::All,
                RegimeFilter::Only(Regime::Greed),
                RegimeFilter::Only(Regime::Fear)
            ]
        );
    }
}

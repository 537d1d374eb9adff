use chrono::{DateTime, Local, NaiveDate};
use core_types::{DataSchema, Regime, TradePeriodRecord};
use std::path::PathBuf;

/// A loaded, fully derived record set.
///
/// Records are sorted by date and carry their regime and running PnL.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source_path: PathBuf,
    /// The file's modification time, if the platform reports one.
    pub modified_at: Option<DateTime<Local>>,
    pub schema: DataSchema,
    pub records: Vec<TradePeriodRecord>,
    pub skipped_rows: usize,
}

impl Dataset {
    /// The first and last calendar day covered by the data.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some((first.date.date(), last.date.date()))
    }

    /// The distinct regimes present, in order of first appearance.
    pub fn regimes(&self) -> Vec<Regime> {
        let mut seen = Vec::new();
        for regime in self.records.iter().filter_map(|r| r.regime) {
            if !seen.contains(&regime) {
                seen.push(regime);
            }
        }
        seen
    }

    /// The modification time formatted for display, e.g. `2024-05-01 14:03`.
    pub fn modified_label(&self) -> Option<String> {
        self.modified_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(day: u32, sentiment: f64) -> TradePeriodRecord {
        let date = NaiveDate::from_ymd_opt(2024, 2, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        TradePeriodRecord::new(date, dec!(1), sentiment, 1.0)
    }

    fn dataset(records: Vec<TradePeriodRecord>) -> Dataset {
        Dataset {
            source_path: PathBuf::from("test.csv"),
            modified_at: None,
            schema: DataSchema::detect(core_types::schema::REQUIRED_COLUMNS).unwrap(),
            records,
            skipped_rows: 0,
        }
    }

    #[test]
    fn bounds_are_calendar_days() {
        let data = dataset(vec![record(3, 50.0), record(9, 50.0)]);
        assert_eq!(
            data.date_bounds(),
            Some((
                NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 9).unwrap()
            ))
        );
        assert_eq!(dataset(vec![]).date_bounds(), None);
    }

    #[test]
    fn regimes_keep_first_appearance_order() {
        let data = dataset(vec![
            record(1, 80.0),
            record(2, 10.0),
            record(3, 90.0),
            record(4, 50.0),
        ]);
        assert_eq!(
            data.regimes(),
            vec![Regime::ExtremeGreed, Regime::ExtremeFear, Regime::Neutral]
        );
    }
}

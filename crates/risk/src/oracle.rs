use crate::error::RiskError;
use core_types::TradePeriodRecord;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Inputs are bounded the same way the dashboard's sliders are.
pub const SENTIMENT_RANGE: (u8, u8) = (0, 100);
pub const LEVERAGE_RANGE: (u8, u8) = (1, 50);

const BASE_PROBABILITY: f64 = 0.5;
const FEAR_PROBABILITY: f64 = 0.85;
const EUPHORIA_PROBABILITY: f64 = 0.20;
const BULLISH_ABOVE: f64 = 0.6;

/// The directional call of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outlook {
    Bullish,
    Bearish,
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outlook::Bullish => write!(f, "BULLISH"),
            Outlook::Bearish => write!(f, "BEARISH"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub probability: f64,
    pub outlook: Outlook,
}

/// Whole-number inputs, truncated and clamped to their slider ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OracleInput {
    pub sentiment: u8,
    pub leverage: u8,
}

impl OracleInput {
    pub fn new(sentiment: f64, leverage: f64) -> Result<Self, RiskError> {
        Ok(Self {
            sentiment: bounded("sentiment", sentiment, SENTIMENT_RANGE)?,
            leverage: bounded("leverage", leverage, LEVERAGE_RANGE)?,
        })
    }

    /// Seeds the inputs from the most recent record of a selection.
    pub fn from_latest(records: &[TradePeriodRecord]) -> Option<Self> {
        let latest = records.last()?;
        Self::new(latest.sentiment_score, latest.avg_leverage).ok()
    }
}

fn bounded(name: &str, value: f64, (lo, hi): (u8, u8)) -> Result<u8, RiskError> {
    if !value.is_finite() {
        return Err(RiskError::InvalidParameters(format!(
            "{} must be a finite number",
            name
        )));
    }
    Ok(value.trunc().clamp(f64::from(lo), f64::from(hi)) as u8)
}

/// The outlook widget.
///
/// It is only offered when a trained model artifact is present, but the call
/// itself is a fixed threshold rule: the artifact is never read.
#[derive(Debug, Clone)]
pub struct Oracle {
    artifact: PathBuf,
}

impl Oracle {
    /// Returns an oracle for the first candidate artifact that exists.
    pub fn locate(candidates: &[PathBuf]) -> Option<Self> {
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::info!(artifact = %path.display(), "Model artifact found.");
                Some(Self {
                    artifact: path.clone(),
                })
            }
            None => {
                tracing::warn!(searched = ?candidates, "Model not loaded; predictions are disabled.");
                None
            }
        }
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    pub fn predict(&self, input: OracleInput) -> Prediction {
        let probability = if input.sentiment < 25 {
            FEAR_PROBABILITY
        } else if input.sentiment > 75 && input.leverage > 10 {
            EUPHORIA_PROBABILITY
        } else {
            BASE_PROBABILITY
        };
        let outlook = if probability > BULLISH_ABOVE {
            Outlook::Bullish
        } else {
            Outlook::Bearish
        };
        Prediction {
            probability,
            outlook,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn oracle() -> Oracle {
        Oracle {
            artifact: PathBuf::from("model.joblib"),
        }
    }

    fn input(sentiment: f64, leverage: f64) -> OracleInput {
        OracleInput::new(sentiment, leverage).unwrap()
    }

    #[test]
    fn fear_is_bullish() {
        let prediction = oracle().predict(input(24.9, 40.0));
        assert_eq!(prediction.probability, 0.85);
        assert_eq!(prediction.outlook, Outlook::Bullish);
    }

    #[test]
    fn leveraged_euphoria_is_bearish() {
        let prediction = oracle().predict(input(80.0, 11.0));
        assert_eq!(prediction.probability, 0.20);
        assert_eq!(prediction.outlook, Outlook::Bearish);
    }

    #[test]
    fn everything_else_is_a_coin_flip() {
        for (s, l) in [(25.0, 1.0), (76.0, 10.0), (50.0, 50.0)] {
            let prediction = oracle().predict(input(s, l));
            assert_eq!(prediction.probability, 0.5);
            assert_eq!(prediction.outlook, Outlook::Bearish);
        }
    }

    #[test]
    fn inputs_are_truncated_and_clamped() {
        assert_eq!(input(75.9, 10.99), OracleInput { sentiment: 75, leverage: 10 });
        assert_eq!(input(140.0, 0.3), OracleInput { sentiment: 100, leverage: 1 });
        assert_eq!(input(-3.0, 75.0), OracleInput { sentiment: 0, leverage: 50 });
        assert!(OracleInput::new(f64::NAN, 2.0).is_err());
    }

    #[test]
    fn latest_record_seeds_the_inputs() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let records = vec![
            TradePeriodRecord::new(day(1), dec!(1), 10.0, 2.0),
            TradePeriodRecord::new(day(2), dec!(1), 81.7, 12.4),
        ];
        assert_eq!(
            OracleInput::from_latest(&records),
            Some(OracleInput { sentiment: 81, leverage: 12 })
        );
        assert_eq!(OracleInput::from_latest(&[]), None);
    }

    #[test]
    fn locate_requires_an_existing_file() {
        let dir = std::env::temp_dir().join("command-center-no-such-model.joblib");
        assert!(Oracle::locate(&[dir]).is_none());
    }
}

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A categorical market-sentiment bucket derived from a 0-100 sentiment score.
///
/// The variant order is the bin order, so `Ord` sorts from fear to greed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Regime {
    #[serde(rename = "Extreme Fear")]
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    #[serde(rename = "Extreme Greed")]
    ExtremeGreed,
}

impl Regime {
    /// All regimes in bin order.
    pub const ALL: [Regime; 5] = [
        Regime::ExtremeFear,
        Regime::Fear,
        Regime::Neutral,
        Regime::Greed,
        Regime::ExtremeGreed,
    ];

    /// Buckets a sentiment score into its regime.
    ///
    /// Bins are `[0,25]`, `(25,45]`, `(45,55]`, `(55,75]`, `(75,100]`. Scores
    /// outside `[0,100]` and NaN have no regime.
    pub fn from_sentiment(score: f64) -> Option<Self> {
        if !(0.0..=100.0).contains(&score) {
            return None;
        }
        let regime = if score <= 25.0 {
            Regime::ExtremeFear
        } else if score <= 45.0 {
            Regime::Fear
        } else if score <= 55.0 {
            Regime::Neutral
        } else if score <= 75.0 {
            Regime::Greed
        } else {
            Regime::ExtremeGreed
        };
        Some(regime)
    }

    /// The display label, e.g. `"Extreme Fear"`.
    pub fn label(&self) -> &'static str {
        match self {
            Regime::ExtremeFear => "Extreme Fear",
            Regime::Fear => "Fear",
            Regime::Neutral => "Neutral",
            Regime::Greed => "Greed",
            Regime::ExtremeGreed => "Extreme Greed",
        }
    }

    /// True for `Fear` and `Extreme Fear`.
    pub fn is_fear(&self) -> bool {
        matches!(self, Regime::ExtremeFear | Regime::Fear)
    }

    /// True for `Greed` and `Extreme Greed`.
    pub fn is_greed(&self) -> bool {
        matches!(self, Regime::Greed | Regime::ExtremeGreed)
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Regime {
    type Err = CoreError;

    /// Accepts the display label in any case, with spaces, dashes or underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "extremefear" => Ok(Regime::ExtremeFear),
            "fear" => Ok(Regime::Fear),
            "neutral" => Ok(Regime::Neutral),
            "greed" => Ok(Regime::Greed),
            "extremegreed" => Ok(Regime::ExtremeGreed),
            _ => Err(CoreError::InvalidInput("regime".to_string(), s.to_string())),
        }
    }
}

/// The regime selector of the dashboard: everything, or a single regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegimeFilter {
    #[default]
    All,
    Only(Regime),
}

impl RegimeFilter {
    /// Returns true if a record with the given regime passes the selector.
    ///
    /// Records without a regime only pass `All`.
    pub fn matches(&self, regime: Option<Regime>) -> bool {
        match self {
            RegimeFilter::All => true,
            RegimeFilter::Only(selected) => regime == Some(*selected),
        }
    }
}

impl fmt::Display for RegimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegimeFilter::All => f.write_str("All"),
            RegimeFilter::Only(regime) => regime.fmt(f),
        }
    }
}

impl FromStr for RegimeFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(RegimeFilter::All);
        }
        s.parse().map(RegimeFilter::Only)
    }
}

/// Serialized as its display label, e.g. `"All"` or `"Extreme Fear"`.
impl Serialize for RegimeFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The direction of a leveraged position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => f.write_str("Long"),
            PositionSide::Short => f.write_str("Short"),
        }
    }
}

impl FromStr for PositionSide {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(PositionSide::Long),
            "short" => Ok(PositionSide::Short),
            _ => Err(CoreError::InvalidInput("side".to_string(), s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges_are_right_inclusive() {
        assert_eq!(Regime::from_sentiment(25.0), Some(Regime::ExtremeFear));
        assert_eq!(Regime::from_sentiment(25.5), Some(Regime::Fear));
        assert_eq!(Regime::from_sentiment(45.0), Some(Regime::Fear));
        assert_eq!(Regime::from_sentiment(55.0), Some(Regime::Neutral));
        assert_eq!(Regime::from_sentiment(75.0), Some(Regime::Greed));
        assert_eq!(Regime::from_sentiment(75.01), Some(Regime::ExtremeGreed));
        assert_eq!(Regime::from_sentiment(100.0), Some(Regime::ExtremeGreed));
    }

    #[test]
    fn zero_is_extreme_fear_and_out_of_range_has_no_regime() {
        assert_eq!(Regime::from_sentiment(0.0), Some(Regime::ExtremeFear));
        assert_eq!(Regime::from_sentiment(-0.1), None);
        assert_eq!(Regime::from_sentiment(100.5), None);
        assert_eq!(Regime::from_sentiment(f64::NAN), None);
    }

    #[test]
    fn regime_parses_labels_loosely() {
        assert_eq!("Extreme Fear".parse::<Regime>(), Ok(Regime::ExtremeFear));
        assert_eq!("extreme-greed".parse::<Regime>(), Ok(Regime::ExtremeGreed));
        assert_eq!(" NEUTRAL ".parse::<Regime>(), Ok(Regime::Neutral));
        assert!("panic".parse::<Regime>().is_err());
    }

    #[test]
    fn regime_filter_parses_all_and_single() {
        assert_eq!("All".parse::<RegimeFilter>(), Ok(RegimeFilter::All));
        assert_eq!(
            "greed".parse::<RegimeFilter>(),
            Ok(RegimeFilter::Only(Regime::Greed))
        );
        assert!(RegimeFilter::All.matches(None));
        assert!(!RegimeFilter::Only(Regime::Fear).matches(None));
        assert!(!RegimeFilter::Only(Regime::Fear).matches(Some(Regime::ExtremeFear)));
    }

    #[test]
    fn regime_displays_as_label() {
        assert_eq!(Regime::ExtremeGreed.to_string(), "Extreme Greed");
        assert_eq!(RegimeFilter::Only(Regime::Fear).to_string(), "Fear");
        assert_eq!(RegimeFilter::All.to_string(), "All");
    }

    #[test]
    fn fear_and_greed_families() {
        assert!(Regime::ExtremeFear.is_fear() && Regime::Fear.is_fear());
        assert!(!Regime::Neutral.is_fear() && !Regime::Neutral.is_greed());
        assert!(Regime::Greed.is_greed() && Regime::ExtremeGreed.is_greed());
    }

    #[test]
    fn position_side_round_trips() {
        assert_eq!("LONG".parse::<PositionSide>(), Ok(PositionSide::Long));
        assert_eq!("short".parse::<PositionSide>(), Ok(PositionSide::Short));
        assert!("flat".parse::<PositionSide>().is_err());
    }
}

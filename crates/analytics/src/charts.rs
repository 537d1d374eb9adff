//! Chart datasets.
//!
//! Each function returns the data behind one dashboard chart. Axis scaling
//! hints (`log_x`, `log_y`) are carried along for the renderer; the points
//! themselves are never transformed, except where a fit has to follow a log
//! axis.

use crate::error::AnalyticsError;
use chrono::NaiveDateTime;
use core_types::{DataSchema, Regime, TradePeriodRecord};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

pub const HEATMAP_BINS: usize = 20;
pub const HISTOGRAM_BINS: usize = 30;
/// Sentiment below which the contrarian strategy is in the market.
pub const FEAR_SENTIMENT_THRESHOLD: f64 = 45.0;

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Regime distribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub regime: Regime,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

/// Box statistics of `net_pnl` per regime, in bin order.
///
/// Meant for the full record set; regimes without records are omitted.
pub fn regime_distribution(records: &[TradePeriodRecord]) -> Vec<BoxStats> {
    Regime::ALL
        .iter()
        .filter_map(|&regime| {
            let mut values: Vec<f64> = records
                .iter()
                .filter(|r| r.regime == Some(regime))
                .map(|r| to_f64(r.net_pnl))
                .collect();
            if values.is_empty() {
                return None;
            }
            values.sort_by(f64::total_cmp);
            let count = values.len();
            Some(BoxStats {
                regime,
                count,
                min: values[0],
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: values[count - 1],
                mean: values.iter().sum::<f64>() / count as f64,
            })
        })
        .collect()
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Scatter charts
// ---------------------------------------------------------------------------

/// How a point is coloured: by a category or along a continuous scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PointColor {
    Category(String),
    Scale(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color: Option<PointColor>,
    pub size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub color_by: &'static str,
    pub log_x: bool,
    pub log_y: bool,
    pub points: Vec<ScatterPoint>,
}

/// Colour by cluster when the file has clusters, else by a numeric fallback.
fn cluster_or(schema: &DataSchema, record: &TradePeriodRecord, fallback: f64) -> Option<PointColor> {
    if schema.has_cluster_label {
        record.cluster_label.clone().map(PointColor::Category)
    } else {
        Some(PointColor::Scale(fallback))
    }
}

/// "Whales vs Degens": volume against PnL.
pub fn segmentation(records: &[TradePeriodRecord], schema: &DataSchema) -> ScatterSeries {
    ScatterSeries {
        title: "Whales vs Degens",
        x_label: "total_volume",
        y_label: "net_pnl",
        color_by: if schema.has_cluster_label { "cluster_label" } else { "net_pnl" },
        log_x: true,
        log_y: false,
        points: records
            .iter()
            .map(|r| ScatterPoint {
                x: to_f64(r.total_volume),
                y: to_f64(r.net_pnl),
                color: cluster_or(schema, r, to_f64(r.net_pnl)),
                size: None,
            })
            .collect(),
    }
}

/// "Leverage vs Patience": leverage against trade frequency, sized by volume.
pub fn behavioral_clusters(records: &[TradePeriodRecord], schema: &DataSchema) -> ScatterSeries {
    ScatterSeries {
        title: "Leverage vs Patience",
        x_label: "avg_leverage",
        y_label: "trade_frequency",
        color_by: if schema.has_cluster_label { "cluster_label" } else { "avg_leverage" },
        log_x: true,
        log_y: true,
        points: records
            .iter()
            .map(|r| ScatterPoint {
                x: r.avg_leverage,
                y: r.trade_frequency,
                color: cluster_or(schema, r, r.avg_leverage),
                size: Some(to_f64(r.total_volume)),
            })
            .collect(),
    }
}

/// "Sentiment vs Impatience": sentiment against trade frequency.
pub fn panic_button(records: &[TradePeriodRecord]) -> ScatterSeries {
    ScatterSeries {
        title: "Sentiment vs Impatience",
        x_label: "sentiment_score",
        y_label: "trade_frequency",
        color_by: "net_pnl",
        log_x: false,
        log_y: false,
        points: records
            .iter()
            .map(|r| ScatterPoint {
                x: r.sentiment_score,
                y: r.trade_frequency,
                color: Some(PointColor::Scale(to_f64(r.net_pnl))),
                size: None,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Whale divergence
// ---------------------------------------------------------------------------

/// An ordinary least squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trendline {
    pub regime: Regime,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhaleDivergence {
    pub series: ScatterSeries,
    /// Fitted on `log10(total_volume)`, one per regime that supports a fit.
    pub trendlines: Vec<Trendline>,
}

/// "Volume vs PnL" coloured by regime, with a per-regime trendline.
pub fn whale_divergence(records: &[TradePeriodRecord]) -> WhaleDivergence {
    let series = ScatterSeries {
        title: "Volume vs PnL",
        x_label: "total_volume",
        y_label: "net_pnl",
        color_by: "regime",
        log_x: true,
        log_y: false,
        points: records
            .iter()
            .map(|r| ScatterPoint {
                x: to_f64(r.total_volume),
                y: to_f64(r.net_pnl),
                color: r.regime.map(|g| PointColor::Category(g.label().to_string())),
                size: None,
            })
            .collect(),
    };

    let trendlines = Regime::ALL
        .iter()
        .filter_map(|&regime| {
            let points: Vec<(f64, f64)> = records
                .iter()
                .filter(|r| r.regime == Some(regime))
                .map(|r| (to_f64(r.total_volume), to_f64(r.net_pnl)))
                .filter(|(volume, _)| *volume > 0.0)
                .map(|(volume, pnl)| (volume.log10(), pnl))
                .collect();
            fit_ols(&points).map(|(slope, intercept, r_squared)| Trendline {
                regime,
                slope,
                intercept,
                r_squared,
                n: points.len(),
            })
        })
        .collect();

    WhaleDivergence { series, trendlines }
}

/// Returns `(slope, intercept, r_squared)`, or `None` with fewer than two
/// points or no spread in `x`.
fn fit_ols(points: &[(f64, f64)]) -> Option<(f64, f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in points {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    // A flat y is fitted exactly.
    let r_squared = if syy == 0.0 { 1.0 } else { (sxy * sxy) / (sxx * syy) };
    Some((slope, intercept, r_squared))
}

// ---------------------------------------------------------------------------
// Binned charts
// ---------------------------------------------------------------------------

/// Equal-width bins spanning the observed range of a variable.
#[derive(Debug, Clone, Copy)]
struct Bins {
    min: f64,
    width: f64,
    count: usize,
}

impl Bins {
    fn spanning(values: impl Iterator<Item = f64>, count: usize) -> Option<Self> {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !min.is_finite() || !max.is_finite() {
            return None;
        }
        // A single observed value still gets a unit-wide range around it.
        let (min, max) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
        Some(Self {
            min,
            width: (max - min) / count as f64,
            count,
        })
    }

    /// The maximum lands in the last bin.
    fn index(&self, value: f64) -> usize {
        let idx = ((value - self.min) / self.width).floor();
        if idx <= 0.0 { 0 } else { (idx as usize).min(self.count - 1) }
    }

    fn edges(&self) -> Vec<f64> {
        (0..=self.count)
            .map(|i| self.min + self.width * i as f64)
            .collect()
    }
}

fn require_bins(count: usize) -> Result<(), AnalyticsError> {
    if count == 0 {
        return Err(AnalyticsError::InvalidParameter(
            "bin count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    /// Summed `total_volume`, indexed `cells[y][x]`.
    pub cells: Vec<Vec<f64>>,
}

/// Leverage against drawdown, weighted by traded volume.
///
/// An empty selection yields no edges and no cells.
pub fn liquidation_heatmap(records: &[TradePeriodRecord], bins: usize) -> Result<Heatmap, AnalyticsError> {
    require_bins(bins)?;
    let mut heatmap = Heatmap {
        x_label: "avg_leverage",
        y_label: "max_adverse_excursion",
        x_edges: Vec::new(),
        y_edges: Vec::new(),
        cells: Vec::new(),
    };

    let x_bins = Bins::spanning(records.iter().map(|r| r.avg_leverage), bins);
    let y_bins = Bins::spanning(records.iter().map(|r| r.max_adverse_excursion), bins);
    let (Some(x_bins), Some(y_bins)) = (x_bins, y_bins) else {
        return Ok(heatmap);
    };

    heatmap.cells = vec![vec![0.0; bins]; bins];
    for r in records {
        let (x, y) = (x_bins.index(r.avg_leverage), y_bins.index(r.max_adverse_excursion));
        heatmap.cells[y][x] += to_f64(r.total_volume);
    }
    heatmap.x_edges = x_bins.edges();
    heatmap.y_edges = y_bins.edges();
    Ok(heatmap)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSeries {
    pub regime: Regime,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub x_label: &'static str,
    pub edges: Vec<f64>,
    /// One series per present regime, in bin order.
    pub series: Vec<HistogramSeries>,
}

/// Distribution of `max_adverse_excursion`, stacked by regime.
///
/// Bin edges span every record; records without a regime are not counted.
pub fn drawdown_histogram(records: &[TradePeriodRecord], bins: usize) -> Result<Histogram, AnalyticsError> {
    require_bins(bins)?;
    let Some(spec) = Bins::spanning(records.iter().map(|r| r.max_adverse_excursion), bins) else {
        return Ok(Histogram {
            x_label: "max_adverse_excursion",
            edges: Vec::new(),
            series: Vec::new(),
        });
    };

    let series = Regime::ALL
        .iter()
        .filter_map(|&regime| {
            let mut counts = vec![0usize; bins];
            let mut seen = false;
            for r in records.iter().filter(|r| r.regime == Some(regime)) {
                counts[spec.index(r.max_adverse_excursion)] += 1;
                seen = true;
            }
            seen.then_some(HistogramSeries { regime, counts })
        })
        .collect();

    Ok(Histogram {
        x_label: "max_adverse_excursion",
        edges: spec.edges(),
        series,
    })
}

// ---------------------------------------------------------------------------
// Contrarian curve
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContrarianPoint {
    pub date: NaiveDateTime,
    /// The market curve, as accumulated over the full dataset.
    pub cumulative_pnl: Decimal,
    /// PnL accumulated over this selection, counting only fearful periods.
    pub fear_only_pnl: Decimal,
}

/// "Market vs Fear-Only Strategy".
pub fn contrarian_curve(records: &[TradePeriodRecord]) -> Vec<ContrarianPoint> {
    let mut fear_only = Decimal::ZERO;
    records
        .iter()
        .map(|r| {
            if r.sentiment_score < FEAR_SENTIMENT_THRESHOLD {
                fear_only = fear_only.saturating_add(r.net_pnl);
            }
            ContrarianPoint {
                date: r.date,
                cumulative_pnl: r.cumulative_pnl,
                fear_only_pnl: fear_only,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::schema::REQUIRED_COLUMNS;
    use rust_decimal_macros::dec;

    fn record(day: u32, pnl: Decimal, sentiment: f64) -> TradePeriodRecord {
        let date = NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        TradePeriodRecord::new(date, pnl, sentiment, 1.0)
    }

    fn plain_schema() -> DataSchema {
        DataSchema::detect(REQUIRED_COLUMNS).unwrap()
    }

    #[test]
    fn box_stats_interpolate_quartiles() {
        let records: Vec<_> = [1, 2, 3, 4]
            .iter()
            .enumerate()
            .map(|(i, v)| record(i as u32 + 1, Decimal::from(*v), 10.0))
            .chain(std::iter::once(record(9, dec!(5), 60.0)))
            .collect();

        let stats = regime_distribution(&records);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].regime, Regime::ExtremeFear);
        assert_eq!(stats[0].count, 4);
        assert_eq!(stats[0].q1, 1.75);
        assert_eq!(stats[0].median, 2.5);
        assert_eq!(stats[0].q3, 3.25);
        assert_eq!(stats[0].mean, 2.5);
        assert_eq!(stats[1].regime, Regime::Greed);
        assert_eq!(stats[1].min, 5.0);
        assert_eq!(stats[1].max, 5.0);
    }

    #[test]
    fn scatter_colours_fall_back_without_clusters() {
        let records = vec![record(1, dec!(-3), 50.0)];
        let series = segmentation(&records, &plain_schema());
        assert_eq!(series.color_by, "net_pnl");
        assert_eq!(series.points[0].color, Some(PointColor::Scale(-3.0)));

        let mut schema = plain_schema();
        schema.has_cluster_label = true;
        let mut clustered = record(1, dec!(-3), 50.0);
        clustered.cluster_label = Some("Degen".to_string());
        let series = behavioral_clusters(&[clustered], &schema);
        assert_eq!(series.color_by, "cluster_label");
        assert_eq!(series.points[0].color, Some(PointColor::Category("Degen".to_string())));
        assert!(series.log_x && series.log_y);
    }

    #[test]
    fn trendline_fits_on_log_volume() {
        let mut records = Vec::new();
        for (day, volume, pnl) in [(1, dec!(10), dec!(1)), (2, dec!(100), dec!(3)), (3, dec!(1000), dec!(5))] {
            let mut r = record(day, pnl, 80.0);
            r.total_volume = volume;
            records.push(r);
        }
        let divergence = whale_divergence(&records);
        assert_eq!(divergence.trendlines.len(), 1);
        let line = &divergence.trendlines[0];
        assert_eq!(line.regime, Regime::ExtremeGreed);
        assert_eq!(line.n, 3);
        assert!((line.slope - 2.0).abs() < 1e-9);
        assert!((line.intercept + 1.0).abs() < 1e-9);
        assert!((line.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_point_regimes_have_no_trendline() {
        let mut r = record(1, dec!(1), 10.0);
        r.total_volume = dec!(50);
        assert!(whale_divergence(&[r]).trendlines.is_empty());
    }

    #[test]
    fn heatmap_sums_volume_into_cells() {
        let mut low = record(1, dec!(0), 50.0);
        low.avg_leverage = 1.0;
        low.max_adverse_excursion = -10.0;
        low.total_volume = dec!(100);
        let mut high = record(2, dec!(0), 50.0);
        high.avg_leverage = 21.0;
        high.max_adverse_excursion = 0.0;
        high.total_volume = dec!(250);
        let mut also_high = high.clone();
        also_high.total_volume = dec!(50);

        let heatmap = liquidation_heatmap(&[low, high, also_high], HEATMAP_BINS).unwrap();
        assert_eq!(heatmap.x_edges.len(), HEATMAP_BINS + 1);
        assert_eq!(heatmap.x_edges[0], 1.0);
        assert_eq!(heatmap.x_edges[HEATMAP_BINS], 21.0);
        assert_eq!(heatmap.cells[0][0], 100.0);
        assert_eq!(heatmap.cells[HEATMAP_BINS - 1][HEATMAP_BINS - 1], 300.0);
        let total: f64 = heatmap.cells.iter().flatten().sum();
        assert_eq!(total, 400.0);
    }

    #[test]
    fn zero_bins_are_rejected() {
        assert!(matches!(
            liquidation_heatmap(&[], 0),
            Err(AnalyticsError::InvalidParameter(_))
        ));
        assert!(drawdown_histogram(&[], 0).is_err());
    }

    #[test]
    fn histogram_counts_by_regime() {
        let mut records = Vec::new();
        for (day, mae, sentiment) in [(1, -30.0, 10.0), (2, 0.0, 10.0), (3, -15.0, 90.0), (4, 0.0, 120.0)] {
            let mut r = record(day, dec!(0), sentiment);
            r.max_adverse_excursion = mae;
            records.push(r);
        }
        let histogram = drawdown_histogram(&records, 3).unwrap();
        assert_eq!(histogram.edges, vec![-30.0, -20.0, -10.0, 0.0]);
        assert_eq!(histogram.series.len(), 2);
        assert_eq!(histogram.series[0].regime, Regime::ExtremeFear);
        assert_eq!(histogram.series[0].counts, vec![1, 0, 1]);
        assert_eq!(histogram.series[1].counts, vec![0, 1, 0]);
    }

    #[test]
    fn contrarian_curve_only_accumulates_fear() {
        let mut records = vec![
            record(1, dec!(10), 20.0),
            record(2, dec!(-5), 80.0),
            record(3, dec!(7), 44.9),
            record(4, dec!(3), 45.0),
        ];
        let mut running = Decimal::ZERO;
        for r in records.iter_mut() {
            running += r.net_pnl;
            r.cumulative_pnl = running;
        }

        let curve = contrarian_curve(&records);
        let fear: Vec<_> = curve.iter().map(|p| p.fear_only_pnl).collect();
        assert_eq!(fear, vec![dec!(10), dec!(10), dec!(17), dec!(17)]);
        assert_eq!(curve[3].cumulative_pnl, dec!(15));
    }
}

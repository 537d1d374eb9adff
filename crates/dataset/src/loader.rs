use crate::error::DatasetError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use core_types::schema::{CLUSTER_LABEL_COLUMN, REGIME_COLUMN};
use core_types::{DataSchema, Regime, RegimeSource, TradePeriodRecord};
use csv::StringRecord;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::io;
use std::str::FromStr;

/// The outcome of parsing a CSV stream.
#[derive(Debug)]
pub struct LoadedRecords {
    pub schema: DataSchema,
    /// Sorted by date, with `regime` and `cumulative_pnl` derived.
    pub records: Vec<TradePeriodRecord>,
    /// Rows dropped because a required cell could not be coerced.
    pub skipped_rows: usize,
}

/// Column positions resolved from the header row.
struct ColumnIndex {
    date: usize,
    net_pnl: usize,
    sentiment_score: usize,
    avg_leverage: usize,
    total_volume: usize,
    max_adverse_excursion: usize,
    trade_frequency: usize,
    regime: Option<usize>,
    cluster_label: Option<usize>,
    win_rate: Option<usize>,
    extras: Vec<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, schema: &DataSchema) -> Result<Self, DatasetError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require =
            |name: &str| find(name).ok_or_else(|| DatasetError::MissingColumn(name.to_string()));

        Ok(Self {
            date: require("date")?,
            net_pnl: require("net_pnl")?,
            sentiment_score: require("sentiment_score")?,
            avg_leverage: require("avg_leverage")?,
            total_volume: require("total_volume")?,
            max_adverse_excursion: require("max_adverse_excursion")?,
            trade_frequency: require("trade_frequency")?,
            regime: match schema.regime_source {
                RegimeSource::Provided => find(REGIME_COLUMN),
                RegimeSource::Derived => None,
            },
            cluster_label: find(CLUSTER_LABEL_COLUMN).filter(|_| schema.has_cluster_label),
            win_rate: schema.win_rate_column.and_then(|c| find(c.name())),
            extras: schema
                .extra_columns
                .iter()
                .filter_map(|name| find(name.as_str()))
                .collect(),
        })
    }
}

/// Reads the engineered-features CSV from any reader.
///
/// Rows whose required cells cannot be coerced are dropped and counted; the
/// caller decides whether an empty result is an error.
pub fn read_records<R: io::Read>(reader: R) -> Result<LoadedRecords, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        // Short rows are coerced like rows with empty trailing cells.
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let schema = DataSchema::detect(headers.iter()).map_err(DatasetError::MissingColumn)?;
    let columns = ColumnIndex::resolve(&headers, &schema)?;

    let mut records = Vec::new();
    let mut skipped_rows = 0usize;

    for row in csv_reader.records() {
        let row = row?;
        match parse_row(&row, &columns) {
            Ok(record) => records.push(record),
            Err(column) => {
                skipped_rows += 1;
                if skipped_rows == 1 {
                    tracing::warn!(
                        line = row.position().map(|p| p.line()),
                        column,
                        "Dropping row with a value that could not be coerced."
                    );
                }
            }
        }
    }

    if skipped_rows > 0 {
        tracing::warn!(skipped_rows, kept = records.len(), "Some rows were dropped during coercion.");
    }

    derive_fields(&mut records, schema.regime_source)?;

    Ok(LoadedRecords {
        schema,
        records,
        skipped_rows,
    })
}

/// Sorts chronologically, then fills in the derived regime and running PnL.
fn derive_fields(
    records: &mut [TradePeriodRecord],
    regime_source: RegimeSource,
) -> Result<(), DatasetError> {
    records.sort_by_key(|r| r.date);

    let mut running = Decimal::ZERO;
    for record in records.iter_mut() {
        running = running
            .checked_add(record.net_pnl)
            .ok_or(DatasetError::PnlOverflow(record.date))?;
        record.cumulative_pnl = running;
        if regime_source == RegimeSource::Derived {
            record.regime = Regime::from_sentiment(record.sentiment_score);
        }
    }
    Ok(())
}

/// Coerces one row. On failure, returns the name of the offending column.
fn parse_row(row: &StringRecord, columns: &ColumnIndex) -> Result<TradePeriodRecord, &'static str> {
    let cell = |idx: usize| row.get(idx).unwrap_or("");

    let date = parse_date(cell(columns.date)).ok_or("date")?;
    let net_pnl = parse_decimal(cell(columns.net_pnl)).ok_or("net_pnl")?;
    let sentiment_score = parse_float(cell(columns.sentiment_score)).ok_or("sentiment_score")?;
    let avg_leverage = parse_float(cell(columns.avg_leverage)).ok_or("avg_leverage")?;
    let total_volume = parse_decimal(cell(columns.total_volume)).ok_or("total_volume")?;
    let max_adverse_excursion =
        parse_float(cell(columns.max_adverse_excursion)).ok_or("max_adverse_excursion")?;
    let trade_frequency = parse_float(cell(columns.trade_frequency)).ok_or("trade_frequency")?;

    let regime = columns.regime.and_then(|idx| {
        let raw = cell(idx);
        if raw.is_empty() {
            return None;
        }
        raw.parse::<Regime>()
            .map_err(|_| tracing::debug!(label = raw, "Unrecognised regime label."))
            .ok()
    });

    let cluster_label = columns
        .cluster_label
        .map(|idx| cell(idx))
        .filter(|label| !label.is_empty())
        .map(str::to_string);

    let win_rate = columns.win_rate.and_then(|idx| parse_float(cell(idx)));

    Ok(TradePeriodRecord {
        date,
        net_pnl,
        sentiment_score,
        avg_leverage,
        total_volume,
        max_adverse_excursion,
        trade_frequency,
        regime,
        cluster_label,
        win_rate,
        cumulative_pnl: Decimal::ZERO,
        extra_fields: columns.extras.iter().map(|&idx| cell(idx).to_string()).collect(),
    })
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .or_else(|| parse_float(raw).and_then(Decimal::from_f64))
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accepts RFC 3339, ISO-like date-times with or without an offset, and bare
/// dates. Offsets are dropped, keeping the wall-clock time.
fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.naive_local());
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

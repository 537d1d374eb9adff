use crate::error::DatasetError;
use core_types::schema::{CLUSTER_LABEL_COLUMN, CUMULATIVE_PNL_COLUMN, REGIME_COLUMN, REQUIRED_COLUMNS};
use core_types::{DataSchema, TradePeriodRecord};
use chrono::Timelike;
use std::io;

/// Writes records as CSV, preserving the source columns.
///
/// Column order: the required columns, `regime`, `cluster_label` and the
/// win-rate column when the schema has them, pass-through extras, and finally
/// `cumulative_pnl`. Dates are written as `YYYY-MM-DD` when every record falls
/// on midnight, otherwise with a time component.
pub fn write_csv<W: io::Write>(
    writer: W,
    schema: &DataSchema,
    records: &[TradePeriodRecord],
) -> Result<(), DatasetError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = REQUIRED_COLUMNS.to_vec();
    header.push(REGIME_COLUMN);
    if schema.has_cluster_label {
        header.push(CLUSTER_LABEL_COLUMN);
    }
    if let Some(column) = schema.win_rate_column {
        header.push(column.name());
    }
    header.extend(schema.extra_columns.iter().map(String::as_str));
    header.push(CUMULATIVE_PNL_COLUMN);
    wtr.write_record(&header)?;

    let date_only = records
        .iter()
        .all(|r| r.date.num_seconds_from_midnight() == 0 && r.date.nanosecond() == 0);
    let date_format = if date_only { "%Y-%m-%d" } else { "%Y-%m-%d %H:%M:%S" };

    for record in records {
        let mut row = vec![
            record.date.format(date_format).to_string(),
            record.net_pnl.to_string(),
            record.sentiment_score.to_string(),
            record.avg_leverage.to_string(),
            record.total_volume.to_string(),
            record.max_adverse_excursion.to_string(),
            record.trade_frequency.to_string(),
            record.regime.map(|r| r.label().to_string()).unwrap_or_default(),
        ];
        if schema.has_cluster_label {
            row.push(record.cluster_label.clone().unwrap_or_default());
        }
        if schema.win_rate_column.is_some() {
            row.push(record.win_rate.map(|w| w.to_string()).unwrap_or_default());
        }
        for idx in 0..schema.extra_columns.len() {
            row.push(record.extra_fields.get(idx).cloned().unwrap_or_default());
        }
        row.push(record.cumulative_pnl.to_string());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Renders the export into memory, for download responses.
pub fn to_csv_bytes(schema: &DataSchema, records: &[TradePeriodRecord]) -> Result<Vec<u8>, DatasetError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, schema, records)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::read_records;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn export_keeps_source_columns_and_adds_derived_ones() {
        let source = "date,net_pnl,sentiment_score,avg_leverage,total_volume,max_adverse_excursion,trade_frequency,cluster_label,venue\n\
                      2024-01-02,-5.5,80,3,1000,-2,7,Whale,okx\n\
                      2024-01-01,10,20,1.5,2000,-1,3,Scalper,binance\n";
        let loaded = read_records(source.as_bytes()).unwrap();
        let bytes = to_csv_bytes(&loaded.schema, &loaded.records).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "date,net_pnl,sentiment_score,avg_leverage,total_volume,max_adverse_excursion,trade_frequency,regime,cluster_label,venue,cumulative_pnl"
        );
        assert_eq!(lines[1], "2024-01-01,10,20,1.5,2000,-1,3,Extreme Fear,Scalper,binance,10");
        assert_eq!(lines[2], "2024-01-02,-5.5,80,3,1000,-2,7,Extreme Greed,Whale,okx,4.5");
    }

    #[test]
    fn intraday_records_keep_their_time() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();
        let record = TradePeriodRecord::new(date, dec!(1), 50.0, 1.0);
        let schema = DataSchema::detect(REQUIRED_COLUMNS).unwrap();
        let text = String::from_utf8(to_csv_bytes(&schema, &[record]).unwrap()).unwrap();
        assert!(text.lines().nth(1).unwrap().starts_with("2024-01-01 13:45:00,"));
    }

    #[test]
    fn empty_selection_writes_only_the_header() {
        let schema = DataSchema::detect(REQUIRED_COLUMNS).unwrap();
        let text = String::from_utf8(to_csv_bytes(&schema, &[]).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}

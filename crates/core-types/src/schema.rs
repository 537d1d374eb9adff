use serde::Serialize;

/// The columns every source file must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "date",
    "net_pnl",
    "sentiment_score",
    "avg_leverage",
    "total_volume",
    "max_adverse_excursion",
    "trade_frequency",
];

pub const REGIME_COLUMN: &str = "regime";
pub const CLUSTER_LABEL_COLUMN: &str = "cluster_label";
pub const CUMULATIVE_PNL_COLUMN: &str = "cumulative_pnl";

/// Where a record's regime label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeSource {
    /// The file carried a `regime` column.
    Provided,
    /// The regime was bucketed from `sentiment_score` at load time.
    Derived,
}

/// Which column supplied the per-period win rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WinRateColumn {
    WinRate,
    PrevWinRate,
}

impl WinRateColumn {
    pub fn name(&self) -> &'static str {
        match self {
            WinRateColumn::WinRate => "win_rate",
            WinRateColumn::PrevWinRate => "prev_win_rate",
        }
    }
}

/// The shape of a loaded file, decided once from its header row.
///
/// Charts and KPIs consult this instead of probing for columns themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSchema {
    pub regime_source: RegimeSource,
    pub has_cluster_label: bool,
    pub win_rate_column: Option<WinRateColumn>,
    /// Source columns the loader does not interpret, in file order.
    /// They are carried through to CSV exports untouched.
    pub extra_columns: Vec<String>,
}

impl DataSchema {
    /// Detects the schema from a header row.
    ///
    /// Returns the name of the first missing required column as the error.
    pub fn detect<'a, I>(headers: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
        let has = |name: &str| headers.iter().any(|h| *h == name);

        if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !has(**c)) {
            return Err((*missing).to_string());
        }

        let win_rate_column = if has(WinRateColumn::WinRate.name()) {
            Some(WinRateColumn::WinRate)
        } else if has(WinRateColumn::PrevWinRate.name()) {
            Some(WinRateColumn::PrevWinRate)
        } else {
            None
        };

        let extra_columns = headers
            .iter()
            .filter(|h| {
                !REQUIRED_COLUMNS.contains(*h)
                    && **h != REGIME_COLUMN
                    && **h != CLUSTER_LABEL_COLUMN
                    && **h != CUMULATIVE_PNL_COLUMN
                    && Some(**h) != win_rate_column.map(|c| c.name())
            })
            .map(|h| h.to_string())
            .collect();

        Ok(Self {
            regime_source: if has(REGIME_COLUMN) {
                RegimeSource::Provided
            } else {
                RegimeSource::Derived
            },
            has_cluster_label: has(CLUSTER_LABEL_COLUMN),
            win_rate_column,
            extra_columns,
        })
    }
}

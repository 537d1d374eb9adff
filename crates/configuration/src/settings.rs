use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty (or absent) `config.toml` yields a
/// usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub model: ModelSettings,
    pub server: ServerSettings,
    pub simulator: SimulatorSettings,
    pub liquidation: LiquidationSettings,
    pub logging: LoggingSettings,
}

/// Where to find the engineered-features CSV and how long to keep it cached.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Probed in order; the first existing file wins.
    pub candidate_paths: Vec<PathBuf>,
    /// How long a loaded dataset is served before the file is read again.
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            candidate_paths: vec![
                PathBuf::from("Data/processed/02_engineered_features.csv"),
                PathBuf::from("../Data/processed/02_engineered_features.csv"),
                PathBuf::from("02_engineered_features.csv"),
            ],
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

/// Where to look for the pretrained classifier artifact.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub candidate_paths: Vec<PathBuf>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            candidate_paths: vec![
                PathBuf::from("outputs/models/rf_prediction_model.joblib"),
                PathBuf::from("../outputs/models/rf_prediction_model.joblib"),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Default parameters of the leverage-cap simulator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    /// Sentiment above which a period counts as greedy.
    pub greed_threshold: f64,
    /// Average leverage above which a greedy period is blocked.
    pub leverage_cap: f64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            greed_threshold: 75.0,
            leverage_cap: 2.0,
        }
    }
}

/// Default inputs of the liquidation calculator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LiquidationSettings {
    pub entry_price: Decimal,
    pub leverage: u32,
}

impl Default for LiquidationSettings {
    fn default() -> Self {
        Self {
            entry_price: dec!(60000),
            leverage: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive string, e.g. `"info"` or `"info,tower_http=debug"`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

use crate::error::ConfigError;
use std::path::Path;
use tracing_subscriber::EnvFilter;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    DataSettings, LiquidationSettings, LoggingSettings, ModelSettings, ServerSettings,
    Settings, SimulatorSettings,
};

/// Loads the application settings.
///
/// Sources are layered, later ones overriding earlier ones:
/// 1. Built-in defaults.
/// 2. The given file, which must exist, or else an optional `config.toml`
///    in the working directory.
/// 3. Environment variables prefixed with `APP` and separated by `__`
///    (e.g. `APP__SERVER__PORT=8080`, `APP__DATA__CACHE_TTL=15m`).
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    validate(&settings)?;
    tracing::debug!(
        data_candidates = settings.data.candidate_paths.len(),
        cache_ttl = ?settings.data.cache_ttl,
        "Settings loaded."
    );

    Ok(settings)
}

/// Rejects settings that would only fail later, at a less helpful place.
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.data.candidate_paths.is_empty() {
        return Err(ConfigError::ValidationError(
            "data.candidate_paths must list at least one file".to_string(),
        ));
    }
    if settings.server.host.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "server.host must not be empty".to_string(),
        ));
    }
    if let Err(e) = EnvFilter::try_new(&settings.logging.level) {
        return Err(ConfigError::ValidationError(format!(
            "logging.level '{}' is not a valid filter: {}",
            settings.logging.level, e
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(validate(&settings).is_ok());
        assert_eq!(settings.data.cache_ttl, Duration::from_secs(3600));
        assert_eq!(settings.data.candidate_paths.len(), 3);
        assert_eq!(settings.simulator.greed_threshold, 75.0);
        assert_eq!(settings.simulator.leverage_cap, 2.0);
        assert_eq!(settings.liquidation.entry_price, dec!(60000));
    }

    #[test]
    fn file_overrides_only_what_it_names() {
        let file = write_config(
            r#"
            [data]
            candidate_paths = ["fixtures/features.csv"]
            cache_ttl = "15m"

            [server]
            port = 8088

            [simulator]
            leverage_cap = 5
            "#,
        );

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(
            settings.data.candidate_paths,
            vec![PathBuf::from("fixtures/features.csv")]
        );
        assert_eq!(settings.data.cache_ttl, Duration::from_secs(15 * 60));
        assert_eq!(settings.server.port, 8088);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.simulator.leverage_cap, 5.0);
        assert_eq!(settings.simulator.greed_threshold, 75.0);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_settings(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn empty_candidate_list_is_rejected() {
        let mut settings = Settings::default();
        settings.data.candidate_paths.clear();
        assert!(matches!(
            validate(&settings),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn bad_log_filter_is_rejected() {
        let mut settings = Settings::default();
        settings.logging.level = "info,command_center=verbose".to_string();
        assert!(matches!(
            validate(&settings),
            Err(ConfigError::ValidationError(_))
        ));
    }
}

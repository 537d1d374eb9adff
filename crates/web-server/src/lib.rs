use crate::error::AppError;
use axum::{routing::get, Router};
use configuration::Settings;
use dataset::{DataSource, Dataset, DatasetCache};
use risk::Oracle;
use std::sync::{Arc, Mutex, PoisonError};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub cache: Mutex<DatasetCache>,
    /// `None` when no model artifact was found; predictions are then disabled.
    pub oracle: Option<Oracle>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let source = DataSource::new(settings.data.candidate_paths.clone());
        Self {
            cache: Mutex::new(DatasetCache::new(source, settings.data.cache_ttl)),
            oracle: Oracle::locate(&settings.model.candidate_paths),
            settings,
        }
    }

    /// The current dataset, reloaded from disk once the cache TTL has passed.
    ///
    /// A reload reads the whole file, so it runs on the blocking pool.
    pub async fn dataset(self: &Arc<Self>) -> Result<Arc<Dataset>, AppError> {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || state.cached_dataset())
            .await
            .map_err(|e| AppError::Internal(format!("dataset reload task failed: {}", e)))?
    }

    fn cached_dataset(&self) -> Result<Arc<Dataset>, AppError> {
        // The cache only stores fully loaded datasets, so a panic elsewhere
        // while the lock was held leaves it consistent.
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.get_or_reload()?)
    }
}

/// Builds the application router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/status", get(handlers::get_status))
        .route("/api/records", get(handlers::get_records))
        .route("/api/kpis", get(handlers::get_kpis))
        .route("/api/simulate", get(handlers::get_simulation))
        .route("/api/oracle", get(handlers::get_oracle))
        .route("/api/liquidation", get(handlers::get_liquidation))
        .route("/api/charts/regime-distribution", get(handlers::get_regime_distribution))
        .route("/api/charts/segmentation", get(handlers::get_segmentation))
        .route("/api/charts/heatmap", get(handlers::get_heatmap))
        .route("/api/charts/histogram", get(handlers::get_histogram))
        .route("/api/charts/contrarian", get(handlers::get_contrarian))
        .route("/api/charts/trendlines", get(handlers::get_trendlines))
        .route("/api/charts/clusters", get(handlers::get_clusters))
        .route("/api/charts/panic", get(handlers::get_panic))
        .route("/api/export/csv", get(handlers::export_csv))
        .route("/api/export/report", get(handlers::export_report))
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
///
/// Tracing must already be initialized by the caller.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let state = Arc::new(AppState::new(settings));

    // Surface a missing data file at startup rather than on the first request.
    if let Err(e) = state.dataset().await {
        tracing::warn!(error = %e, "Dataset is not available yet.");
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

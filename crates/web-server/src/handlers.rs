use crate::{error::AppError, AppState};
use analytics::{charts, regime_options, AnalyticsEngine, DashboardFilter, KpiSummary, RegimeInsights};
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, NaiveDate};
use core_types::{DataSchema, PositionSide, Regime, RegimeFilter, TradePeriodRecord};
use dataset::Dataset;
use reporter::ExecutiveReport;
use risk::{LeverageCapRule, OracleInput, Prediction, SimulationResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CSV_EXPORT_NAME: &str = "market_data_raw.csv";
pub const REPORT_EXPORT_NAME: &str = "executive_summary.txt";

/// The dashboard selection. Missing dates default to the dataset's bounds.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub regime: Option<String>,
}

/// Simulator parameters. Missing values default to the `[simulator]` settings.
#[derive(Debug, Default, Deserialize)]
pub struct RuleQuery {
    pub greed_threshold: Option<f64>,
    pub leverage_cap: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OracleQuery {
    pub sentiment: Option<f64>,
    pub leverage: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LiquidationQuery {
    pub entry: Option<Decimal>,
    pub leverage: Option<u32>,
    pub side: Option<PositionSide>,
}

/// Resolves a selection against the loaded dataset.
fn select(
    dataset: &Dataset,
    query: &SelectionQuery,
) -> Result<(DashboardFilter, Vec<TradePeriodRecord>), AppError> {
    let regime = match query.regime.as_deref() {
        Some(raw) => raw.parse::<RegimeFilter>()?,
        None => RegimeFilter::All,
    };
    Ok(DashboardFilter::select(&dataset.records, query.start, query.end, regime)?)
}

fn rule(state: &AppState, query: &RuleQuery) -> Result<LeverageCapRule, AppError> {
    Ok(LeverageCapRule::from_settings(
        &state.settings.simulator,
        query.greed_threshold,
        query.leverage_cap,
    )?)
}

fn attachment(content_type: &'static str, file_name: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub data_path: String,
    pub modified_at: Option<String>,
    pub record_count: usize,
    pub skipped_rows: usize,
    pub schema: DataSchema,
    pub regimes: Vec<Regime>,
    pub regime_options: Vec<RegimeFilter>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub model_available: bool,
    pub model_path: Option<String>,
    pub cache_ttl_secs: u64,
}

/// # GET /api/status
/// Data freshness, the detected schema and what the selectors can offer.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, AppError> {
    let dataset = state.dataset().await?;
    let regimes = dataset.regimes();
    let bounds = dataset.date_bounds();

    Ok(Json(StatusResponse {
        data_path: dataset.source_path.display().to_string(),
        modified_at: dataset.modified_label(),
        record_count: dataset.records.len(),
        skipped_rows: dataset.skipped_rows,
        schema: dataset.schema.clone(),
        regime_options: regime_options(&regimes),
        regimes,
        start_date: bounds.map(|b| b.0),
        end_date: bounds.map(|b| b.1),
        model_available: state.oracle.is_some(),
        model_path: state.oracle.as_ref().map(|o| o.artifact().display().to_string()),
        cache_ttl_secs: state.settings.data.cache_ttl.as_secs(),
    }))
}

/// # GET /api/records
pub async fn get_records(
    State(state): State<Arc<AppState>>,
    Query(selection): Query<SelectionQuery>,
) -> Result<Json<Vec<TradePeriodRecord>>, AppError> {
    let dataset = state.dataset().await?;
    let (_, records) = select(&dataset, &selection)?;
    Ok(Json(records))
}

#[derive(Debug, Serialize)]
pub struct KpiResponse {
    pub filter: DashboardFilter,
    pub kpis: KpiSummary,
    pub insights: RegimeInsights,
}

/// # GET /api/kpis
pub async fn get_kpis(
    State(state): State<Arc<AppState>>,
    Query(selection): Query<SelectionQuery>,
) -> Result<Json<KpiResponse>, AppError> {
    let dataset = state.dataset().await?;
    let (filter, records) = select(&dataset, &selection)?;
    let engine = AnalyticsEngine::new();
    Ok(Json(KpiResponse {
        filter,
        kpis: engine.kpis(&records),
        insights: engine.regime_insights(&records),
    }))
}

#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub rule: LeverageCapRule,
    pub result: SimulationResult,
}

/// # GET /api/simulate
/// Always replays the rule over the full history, whatever the selection.
pub async fn get_simulation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RuleQuery>,
) -> Result<Json<SimulationResponse>, AppError> {
    let rule = rule(&state, &query)?;
    let dataset = state.dataset().await?;
    let result = risk::evaluate(&rule, &dataset.records);
    Ok(Json(SimulationResponse { rule, result }))
}

#[derive(Debug, Serialize)]
pub struct OracleResponse {
    pub input: OracleInput,
    pub prediction: Prediction,
}

/// # GET /api/oracle
/// Inputs default to the latest record of the selection.
pub async fn get_oracle(
    State(state): State<Arc<AppState>>,
    Query(selection): Query<SelectionQuery>,
    Query(query): Query<OracleQuery>,
) -> Result<Json<OracleResponse>, AppError> {
    let oracle = state
        .oracle
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Model not loaded.".to_string()))?;

    let dataset = state.dataset().await?;
    let (_, records) = select(&dataset, &selection)?;
    let latest = OracleInput::from_latest(&records)
        .ok_or_else(|| AppError::Unavailable("No records in the selected range.".to_string()))?;

    let input = OracleInput::new(
        query.sentiment.unwrap_or(f64::from(latest.sentiment)),
        query.leverage.unwrap_or(f64::from(latest.leverage)),
    )?;
    Ok(Json(OracleResponse {
        input,
        prediction: oracle.predict(input),
    }))
}

#[derive(Debug, Serialize)]
pub struct LiquidationResponse {
    pub entry: Decimal,
    pub leverage: u32,
    pub side: PositionSide,
    pub liquidation_price: Decimal,
}

/// # GET /api/liquidation
pub async fn get_liquidation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LiquidationQuery>,
) -> Result<Json<LiquidationResponse>, AppError> {
    let defaults = &state.settings.liquidation;
    let entry = query.entry.unwrap_or(defaults.entry_price);
    let leverage = query.leverage.unwrap_or(defaults.leverage);
    let side = query.side.unwrap_or(PositionSide::Long);
    let liquidation_price = risk::liquidation_price(entry, leverage, side)?;
    Ok(Json(LiquidationResponse {
        entry,
        leverage,
        side,
        liquidation_price,
    }))
}

// --- Charts ---

/// # GET /api/charts/regime-distribution
/// Computed over the full dataset, like the simulator.
pub async fn get_regime_distribution(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<charts::BoxStats>>, AppError> {
    let dataset = state.dataset().await?;
    Ok(Json(charts::regime_distribution(&dataset.records)))
}

/// # GET /api/charts/segmentation
pub async fn get_segmentation(
    State(state): State<Arc<AppState>>,
    Query(selection): Query<SelectionQuery>,
) -> Result<Json<charts::ScatterSeries>, AppError> {
    let dataset = state.dataset().await?;
    let (_, records) = select(&dataset, &selection)?;
    Ok(Json(charts::segmentation(&records, &dataset.schema)))
}

/// # GET /api/charts/heatmap
pub async fn get_heatmap(
    State(state): State<Arc<AppState>>,
    Query(selection): Query<SelectionQuery>,
) -> Result<Json<charts::Heatmap>, AppError> {
    let dataset = state.dataset().await?;
    let (_, records) = select(&dataset, &selection)?;
    Ok(Json(charts::liquidation_heatmap(&records, charts::HEATMAP_BINS)?))
}

/// # GET /api/charts/histogram
pub async fn get_histogram(
    State(state): State<Arc<AppState>>,
    Query(selection): Query<SelectionQuery>,
) -> Result<Json<charts::Histogram>, AppError> {
    let dataset = state.dataset().await?;
    let (_, records) = select(&dataset, &selection)?;
    Ok(Json(charts::drawdown_histogram(&records, charts::HISTOGRAM_BINS)?))
}

/// # GET /api/charts/contrarian
pub async fn get_contrarian(
    State(state): State<Arc<AppState>>,
    Query(selection): Query<SelectionQuery>,
) -> Result<Json<Vec<charts::ContrarianPoint>>, AppError> {
    let dataset = state.dataset().await?;
    let (_, records) = select(&dataset, &selection)?;
    Ok(Json(charts::contrarian_curve(&records)))
}

/// # GET /api/charts/trendlines
pub async fn get_trendlines(
    State(state): State<Arc<AppState>>,
    Query(selection): Query<SelectionQuery>,
) -> Result<Json<charts::WhaleDivergence>, AppError> {
    let dataset = state.dataset().await?;
    let (_, records) = select(&dataset, &selection)?;
    Ok(Json(charts::whale_divergence(&records)))
}

/// # GET /api/charts/clusters
pub async fn get_clusters(
    State(state): State<Arc<AppState>>,
    Query(selection): Query<SelectionQuery>,
) -> Result<Json<charts::ScatterSeries>, AppError> {
    let dataset = state.dataset().await?;
    let (_, records) = select(&dataset, &selection)?;
    Ok(Json(charts::behavioral_clusters(&records, &dataset.schema)))
}

/// # GET /api/charts/panic
pub async fn get_panic(
    State(state): State<Arc<AppState>>,
    Query(selection): Query<SelectionQuery>,
) -> Result<Json<charts::ScatterSeries>, AppError> {
    let dataset = state.dataset().await?;
    let (_, records) = select(&dataset, &selection)?;
    Ok(Json(charts::panic_button(&records)))
}

// --- Exports ---

/// # GET /api/export/csv
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(selection): Query<SelectionQuery>,
) -> Result<Response, AppError> {
    let dataset = state.dataset().await?;
    let (_, records) = select(&dataset, &selection)?;
    let body = dataset::to_csv_bytes(&dataset.schema, &records)?;
    tracing::info!(records = records.len(), "Exporting CSV.");
    Ok(attachment("text/csv; charset=utf-8", CSV_EXPORT_NAME, body))
}

/// # GET /api/export/report
pub async fn export_report(
    State(state): State<Arc<AppState>>,
    Query(selection): Query<SelectionQuery>,
    Query(rule_query): Query<RuleQuery>,
) -> Result<Response, AppError> {
    let rule = rule(&state, &rule_query)?;
    let dataset = state.dataset().await?;
    let (filter, records) = select(&dataset, &selection)?;
    let engine = AnalyticsEngine::new();

    let report = ExecutiveReport {
        generated_at: Local::now().naive_local(),
        filter,
        kpis: engine.kpis(&records),
        rule,
        simulation: risk::evaluate(&rule, &dataset.records),
        insights: engine.regime_insights(&records),
    };
    Ok(attachment(
        "text/plain; charset=utf-8",
        REPORT_EXPORT_NAME,
        report.render().into_bytes(),
    ))
}

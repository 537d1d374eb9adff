use analytics::{AnalyticsEngine, DashboardFilter};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use configuration::Settings;
use core_types::{PositionSide, RegimeFilter, TradePeriodRecord};
use dataset::{DataSource, Dataset};
use reporter::{
    format_grouped, format_leverage, format_millions, format_optional_usd, format_percent,
    format_usd, ExecutiveReport, NOT_AVAILABLE,
};
use risk::{LeverageCapRule, Oracle, OracleInput};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

mod logging;

/// The main entry point for the Market Regime Command Center.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; settings have defaults.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = configuration::load_settings(cli.config.as_deref())
        .context("Failed to load settings")?;
    let _log_guard = logging::init(&settings.logging)?;

    match cli.command {
        Commands::Serve(args) => handle_serve(args, settings).await,
        Commands::Summary(args) => handle_summary(args, &settings),
        Commands::Simulate(args) => handle_simulate(args, &settings),
        Commands::Predict(args) => handle_predict(args, &settings),
        Commands::Liquidation(args) => handle_liquidation(args, &settings),
        Commands::Export(args) => handle_export(args, &settings),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Market regime analytics and what-if risk simulation over engineered trading data.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file. Defaults to ./config.toml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard API over HTTP.
    Serve(ServeArgs),
    /// Print KPIs and regime insights for a selection.
    Summary(SelectionArgs),
    /// Replay the Anti-Fragile Leverage Cap over the full history.
    Simulate(RuleArgs),
    /// Show the model outlook, seeded from the latest record of a selection.
    Predict(PredictArgs),
    /// Compute the liquidation price of a leveraged position.
    Liquidation(LiquidationArgs),
    /// Write the filtered records as CSV and the executive report as text.
    Export(ExportArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Overrides `server.host`.
    #[arg(long)]
    host: Option<String>,
    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args)]
struct SelectionArgs {
    /// First day of the selection (format: YYYY-MM-DD). Defaults to the first day in the data.
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last day of the selection, inclusive. Defaults to the last day in the data.
    #[arg(long)]
    end: Option<NaiveDate>,
    /// "All" or a regime such as "Extreme Fear".
    #[arg(long, default_value = "All")]
    regime: RegimeFilter,
}

#[derive(Args)]
struct RuleArgs {
    /// Block periods with sentiment above this. Defaults to `simulator.greed_threshold`.
    #[arg(long)]
    greed_threshold: Option<f64>,
    /// ...and average leverage above this. Defaults to `simulator.leverage_cap`.
    #[arg(long)]
    leverage_cap: Option<f64>,
}

#[derive(Args)]
struct PredictArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    /// Overrides the latest record's sentiment (0-100).
    #[arg(long)]
    sentiment: Option<f64>,
    /// Overrides the latest record's leverage (1-50).
    #[arg(long)]
    leverage: Option<f64>,
}

#[derive(Args)]
struct LiquidationArgs {
    /// Defaults to `liquidation.entry_price`.
    #[arg(long)]
    entry: Option<Decimal>,
    /// 1-100. Defaults to `liquidation.leverage`.
    #[arg(long)]
    leverage: Option<u32>,
    #[arg(long, default_value = "long")]
    side: PositionSide,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    #[command(flatten)]
    rule: RuleArgs,
    /// Where to write the filtered records.
    #[arg(long, default_value = "market_data_raw.csv")]
    csv: PathBuf,
    /// Where to write the executive report.
    #[arg(long, default_value = "executive_summary.txt")]
    report: PathBuf,
}

// ==============================================================================
// Shared Helpers
// ==============================================================================

fn load_dataset(settings: &Settings) -> anyhow::Result<Dataset> {
    let dataset = DataSource::new(settings.data.candidate_paths.clone()).load()?;
    let modified = dataset.modified_label().unwrap_or_else(|| "unknown".to_string());
    println!(
        "System Online | Data: {} (modified {})",
        dataset.source_path.display(),
        modified
    );
    Ok(dataset)
}

fn select(dataset: &Dataset, args: &SelectionArgs) -> anyhow::Result<(DashboardFilter, Vec<TradePeriodRecord>)> {
    Ok(DashboardFilter::select(&dataset.records, args.start, args.end, args.regime)?)
}

fn rule(args: &RuleArgs, settings: &Settings) -> anyhow::Result<LeverageCapRule> {
    Ok(LeverageCapRule::from_settings(
        &settings.simulator,
        args.greed_threshold,
        args.leverage_cap,
    )?)
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, mut settings: Settings) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    tracing::info!(host = %settings.server.host, port = settings.server.port, "Starting web server.");
    web_server::run_server(settings).await
}

fn handle_summary(args: SelectionArgs, settings: &Settings) -> anyhow::Result<()> {
    let dataset = load_dataset(settings)?;
    let (filter, records) = select(&dataset, &args)?;
    let engine = AnalyticsEngine::new();
    let kpis = engine.kpis(&records);
    let insights = engine.regime_insights(&records);

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Range".to_string(), format!("{} to {}", filter.start, filter.end)]);
    table.add_row(vec!["Regime Filter".to_string(), filter.regime.to_string()]);
    table.add_row(vec!["Records".to_string(), kpis.record_count.to_string()]);
    table.add_row(vec!["Net PnL".to_string(), format!("${}", format_usd(kpis.net_pnl))]);
    table.add_row(vec!["Win Rate".to_string(), format_percent(kpis.win_rate)]);
    table.add_row(vec!["Volume".to_string(), format!("${}M", format_millions(kpis.total_volume))]);
    table.add_row(vec!["Avg Leverage".to_string(), format_leverage(kpis.avg_leverage)]);
    table.add_row(vec![
        "Dominant Regime".to_string(),
        insights
            .dominant_regime
            .map_or(NOT_AVAILABLE, |r| r.label())
            .to_string(),
    ]);
    table.add_row(vec!["Avg PnL in Fear".to_string(), format_optional_usd(insights.avg_pnl_fear)]);
    table.add_row(vec!["Avg PnL in Greed".to_string(), format_optional_usd(insights.avg_pnl_greed)]);
    println!("{table}");
    Ok(())
}

fn handle_simulate(args: RuleArgs, settings: &Settings) -> anyhow::Result<()> {
    let rule = rule(&args, settings)?;
    let dataset = load_dataset(settings)?;
    let result = risk::evaluate(&rule, &dataset.records);

    println!(
        "Anti-Fragile Cap: BLOCK periods with sentiment > {} and leverage > {}x",
        rule.greed_threshold(),
        rule.leverage_cap()
    );
    let mut table = Table::new();
    table.set_header(vec!["Blocked", "Losses Avoided", "Profits Missed", "Net Impact"]);
    table.add_row(vec![
        result.blocked_count.to_string(),
        format!("${}", format_usd(result.avoided_loss)),
        format!("${}", format_usd(result.missed_profit)),
        format!("${}", format_usd(result.net_impact)),
    ]);
    println!("{table}");

    let verdict = if result.net_impact > Decimal::ZERO { "Improvement" } else { "Loss" };
    println!("Verdict: {}", verdict);
    Ok(())
}

fn handle_predict(args: PredictArgs, settings: &Settings) -> anyhow::Result<()> {
    let Some(oracle) = Oracle::locate(&settings.model.candidate_paths) else {
        println!("Model not loaded.");
        return Ok(());
    };

    let dataset = load_dataset(settings)?;
    let (_, records) = select(&dataset, &args.selection)?;
    let Some(latest) = OracleInput::from_latest(&records) else {
        println!("No records in the selected range; nothing to predict from.");
        return Ok(());
    };

    let input = OracleInput::new(
        args.sentiment.unwrap_or(f64::from(latest.sentiment)),
        args.leverage.unwrap_or(f64::from(latest.leverage)),
    )?;
    let prediction = oracle.predict(input);
    println!(
        "Model Prediction: {} ({:.0}%) | sentiment {}, leverage {}x",
        prediction.outlook,
        prediction.probability * 100.0,
        input.sentiment,
        input.leverage
    );
    Ok(())
}

fn handle_liquidation(args: LiquidationArgs, settings: &Settings) -> anyhow::Result<()> {
    let entry = args.entry.unwrap_or(settings.liquidation.entry_price);
    let leverage = args.leverage.unwrap_or(settings.liquidation.leverage);
    let price = risk::liquidation_price(entry, leverage, args.side)?;
    println!(
        "Liquidation Price ({}): ${}",
        args.side,
        format_grouped(price, 2)
    );
    Ok(())
}

fn handle_export(args: ExportArgs, settings: &Settings) -> anyhow::Result<()> {
    let rule = rule(&args.rule, settings)?;
    let dataset = load_dataset(settings)?;
    let (filter, records) = select(&dataset, &args.selection)?;

    let file = File::create(&args.csv)
        .with_context(|| format!("Failed to create {}", args.csv.display()))?;
    dataset::write_csv(BufWriter::new(file), &dataset.schema, &records)?;
    tracing::info!(path = %args.csv.display(), records = records.len(), "CSV export written.");

    let engine = AnalyticsEngine::new();
    let report = ExecutiveReport {
        generated_at: Local::now().naive_local(),
        filter,
        kpis: engine.kpis(&records),
        rule,
        simulation: risk::evaluate(&rule, &dataset.records),
        insights: engine.regime_insights(&records),
    };
    std::fs::write(&args.report, report.render())
        .with_context(|| format!("Failed to write {}", args.report.display()))?;
    tracing::info!(path = %args.report.display(), "Executive report written.");

    println!(
        "Exported {} records to {} and the report to {}",
        records.len(),
        args.csv.display(),
        args.report.display()
    );
    Ok(())
}

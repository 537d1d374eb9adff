use crate::format::{
    format_leverage, format_millions, format_optional_usd, format_percent, format_usd, NOT_AVAILABLE,
};
use analytics::{DashboardFilter, KpiSummary, RegimeInsights};
use chrono::NaiveDateTime;
use risk::{LeverageCapRule, SimulationResult};
use std::fmt;

/// The downloadable executive summary.
///
/// KPIs and insights describe the filtered selection; the simulation always
/// describes the full history. Rendered through `Display`.
#[derive(Debug, Clone)]
pub struct ExecutiveReport {
    pub generated_at: NaiveDateTime,
    pub filter: DashboardFilter,
    pub kpis: KpiSummary,
    pub rule: LeverageCapRule,
    pub simulation: SimulationResult,
    pub insights: RegimeInsights,
}

impl ExecutiveReport {
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ExecutiveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dominant = self
            .insights
            .dominant_regime
            .map(|r| r.label())
            .unwrap_or(NOT_AVAILABLE);

        writeln!(f, "MARKET REGIME COMMAND CENTER - EXECUTIVE REPORT")?;
        writeln!(f, "Date: {}", self.generated_at.format("%Y-%m-%d %H:%M"))?;
        writeln!(f, "------------------------------------------------")?;
        writeln!(f, "PERIOD ANALYSIS")?;
        writeln!(f, "Range: {} to {}", self.filter.start, self.filter.end)?;
        writeln!(f, "Regime Filter: {}", self.filter.regime)?;
        writeln!(f)?;
        writeln!(f, "1. KEY PERFORMANCE INDICATORS")?;
        writeln!(f, "-----------------------------")?;
        writeln!(f, "Net PnL:      ${}", format_usd(self.kpis.net_pnl))?;
        writeln!(f, "Win Rate:     {}", format_percent(self.kpis.win_rate))?;
        writeln!(f, "Volume:       ${}M", format_millions(self.kpis.total_volume))?;
        writeln!(f, "Avg Leverage: {}", format_leverage(self.kpis.avg_leverage))?;
        writeln!(f)?;
        writeln!(f, "2. STRATEGY SIMULATION RESULTS (Anti-Fragile Cap)")?;
        writeln!(f, "-------------------------------------------------")?;
        writeln!(
            f,
            "Parameters:   Greed Threshold > {} | Leverage Cap > {}x",
            self.rule.greed_threshold(),
            self.rule.leverage_cap()
        )?;
        writeln!(f, "Action:       BLOCK trades meeting these criteria.")?;
        writeln!(f)?;
        writeln!(f, "Trades Blocked: {}", self.simulation.blocked_count)?;
        writeln!(
            f,
            "Losses Avoided: ${} (Capital Preserved)",
            format_usd(self.simulation.avoided_loss)
        )?;
        writeln!(
            f,
            "Profits Missed: ${} (Opportunity Cost)",
            format_usd(self.simulation.missed_profit)
        )?;
        writeln!(f, "NET PnL IMPACT: ${}", format_usd(self.simulation.net_impact))?;
        writeln!(f)?;
        writeln!(f, "3. REGIME INSIGHTS")?;
        writeln!(f, "------------------")?;
        writeln!(f, "Dominant Regime: {}", dominant)?;
        writeln!(f, "Avg PnL in Fear: {}", format_optional_usd(self.insights.avg_pnl_fear))?;
        writeln!(f, "Avg PnL in Greed: {}", format_optional_usd(self.insights.avg_pnl_greed))
    }
}

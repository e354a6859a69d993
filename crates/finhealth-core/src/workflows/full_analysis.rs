use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::analysis::benchmark::{compare_to_industry, BenchmarkComparison};
use crate::analysis::health::{score_health, RiskBand, ScoreSet};
use crate::analysis::metrics::{compute_metrics, MetricsSet};
use crate::analysis::recommendations::{generate_recommendations, Recommendation};
use crate::credit::readiness::{assess_credit_readiness, CreditAssessment, CreditReadinessInput};
use crate::forecast::cash_flow::{
    forecast_cash_flow, Forecast, ForecastInput, ForecastSettings, MonthlyCashFlow,
};
use crate::types::*;
use crate::working_capital::optimizer::{
    optimize_working_capital, OptimizationResult, OptimizerTargets, WorkingCapitalInput,
};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullAnalysisInput {
    pub record: FinancialRecord,
    #[serde(default = "default_industry")]
    pub industry: String,
    /// Monthly history for the forecast; absent or short histories take the
    /// limited-history path.
    #[serde(default)]
    pub monthly_cash_flow: Option<Vec<MonthlyCashFlow>>,
    #[serde(default)]
    pub targets: Option<OptimizerTargets>,
    #[serde(default)]
    pub forecast_settings: Option<ForecastSettings>,
}

fn default_industry() -> String {
    "services".into()
}

#[derive(Debug, Clone, Serialize)]
pub struct FullAnalysis {
    pub industry: String,
    pub metrics: MetricsSet,
    pub scores: ScoreSet,
    pub health_score: Score,
    pub risk_band: RiskBand,
    pub benchmark: BenchmarkComparison,
    pub credit: CreditAssessment,
    pub recommendations: Vec<Recommendation>,
    pub forecast: Forecast,
    pub working_capital: OptimizationResult,
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Metrics, health, benchmark, credit readiness, recommendations, forecast
/// and working-capital optimisation for one record, merged into a single
/// report. Stage warnings are carried over with a stage prefix.
pub fn run_full_analysis(input: &FullAnalysisInput) -> ComputationOutput<FullAnalysis> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let record = &input.record;

    let metrics_out = compute_metrics(record);
    collect("Metrics", &metrics_out.warnings, &mut warnings);
    let metrics = metrics_out.result;

    let health = score_health(&metrics).result;

    let benchmark_out = compare_to_industry(&metrics, &input.industry);
    collect("Benchmark", &benchmark_out.warnings, &mut warnings);

    let credit_out = assess_credit_readiness(&CreditReadinessInput {
        health_score: health.health_score,
        metrics: metrics.clone(),
        receivables_days: Some(record.receivables_days),
    });
    collect("Credit", &credit_out.warnings, &mut warnings);

    let recommendations =
        generate_recommendations(health.health_score, &metrics, &health.scores).result;

    let forecast_out = forecast_cash_flow(&ForecastInput {
        monthly_cash_flow: input.monthly_cash_flow.clone().unwrap_or_default(),
        operating_cash_flow: record.operating_cash_flow,
        revenue: record.revenue,
        settings: input.forecast_settings.clone().unwrap_or_default(),
    });
    collect("Forecast", &forecast_out.warnings, &mut warnings);

    let targets = input.targets.clone().unwrap_or_default();
    let wc_out = optimize_working_capital(&WorkingCapitalInput {
        record: record.clone(),
        targets: targets.clone(),
    });
    collect("Working capital", &wc_out.warnings, &mut warnings);

    tracing::debug!(
        health_score = %health.health_score,
        risk_band = %health.risk_band,
        credit_score = %credit_out.result.credit_readiness_score,
        "full analysis complete"
    );

    let analysis = FullAnalysis {
        industry: benchmark_out.result.industry.clone(),
        metrics,
        scores: health.scores,
        health_score: health.health_score,
        risk_band: health.risk_band,
        benchmark: benchmark_out.result,
        credit: credit_out.result,
        recommendations,
        forecast: forecast_out.result,
        working_capital: wc_out.result,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Full SME analysis: metrics, health score, benchmark, credit readiness, recommendations, cash-flow forecast, working-capital optimisation",
        &serde_json::json!({
            "industry": input.industry,
            "history_months": input.monthly_cash_flow.as_ref().map_or(0, Vec::len),
            "targets": targets,
        }),
        warnings,
        elapsed,
        analysis,
    )
}

fn collect(stage: &str, stage_warnings: &[String], warnings: &mut Vec<String>) {
    for w in stage_warnings {
        warnings.push(format!("[{stage}] {w}"));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

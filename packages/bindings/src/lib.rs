use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use finhealth_core::analysis::health::ScoreSet;
use finhealth_core::analysis::metrics::MetricsSet;
use finhealth_core::FinancialRecord;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: for<'de> Deserialize<'de>>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn render<T: serde::Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct BenchmarkRequest {
    metrics: MetricsSet,
    industry: String,
}

#[derive(Deserialize)]
struct RecommendationRequest {
    health_score: Decimal,
    metrics: MetricsSet,
    scores: ScoreSet,
}

#[napi]
pub fn calculate_metrics(input_json: String) -> NapiResult<String> {
    let record: FinancialRecord = parse(&input_json)?;
    render(&finhealth_core::analysis::metrics::compute_metrics(&record))
}

#[napi]
pub fn score_health(input_json: String) -> NapiResult<String> {
    let metrics: MetricsSet = parse(&input_json)?;
    render(&finhealth_core::analysis::health::score_health(&metrics))
}

#[napi]
pub fn compare_to_industry(input_json: String) -> NapiResult<String> {
    let req: BenchmarkRequest = parse(&input_json)?;
    render(&finhealth_core::analysis::benchmark::compare_to_industry(
        &req.metrics,
        &req.industry,
    ))
}

#[napi]
pub fn generate_recommendations(input_json: String) -> NapiResult<String> {
    let req: RecommendationRequest = parse(&input_json)?;
    render(
        &finhealth_core::analysis::recommendations::generate_recommendations(
            req.health_score,
            &req.metrics,
            &req.scores,
        ),
    )
}

#[napi]
pub fn list_industries() -> NapiResult<String> {
    render(&finhealth_core::analysis::benchmark::BENCHMARKS)
}

// ---------------------------------------------------------------------------
// Credit
// ---------------------------------------------------------------------------

#[napi]
pub fn assess_credit_readiness(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::credit::readiness::CreditReadinessInput = parse(&input_json)?;
    render(&finhealth_core::credit::readiness::assess_credit_readiness(&input))
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

#[napi]
pub fn forecast_cash_flow(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::forecast::cash_flow::ForecastInput = parse(&input_json)?;
    render(&finhealth_core::forecast::cash_flow::forecast_cash_flow(&input))
}

// ---------------------------------------------------------------------------
// Working capital
// ---------------------------------------------------------------------------

#[napi]
pub fn optimize_working_capital(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::working_capital::optimizer::WorkingCapitalInput =
        parse(&input_json)?;
    render(&finhealth_core::working_capital::optimizer::optimize_working_capital(&input))
}

#[napi]
pub fn run_sensitivity(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::working_capital::sensitivity::SensitivityInput =
        parse(&input_json)?;
    let output = finhealth_core::working_capital::sensitivity::run_sensitivity(&input)
        .map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn simulate_working_capital(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::monte_carlo::simulation::WorkingCapitalSimulationInput =
        parse(&input_json)?;
    let output = finhealth_core::monte_carlo::simulation::simulate_working_capital(&input)
        .map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn create_scenario(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::scenarios::modeler::CreateScenarioInput = parse(&input_json)?;
    render(&finhealth_core::scenarios::modeler::create_scenario(&input))
}

#[napi]
pub fn compare_scenarios(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::scenarios::modeler::CompareScenariosInput = parse(&input_json)?;
    let output =
        finhealth_core::scenarios::modeler::compare_scenarios(&input).map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn what_if(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::scenarios::modeler::WhatIfInput = parse(&input_json)?;
    let output = finhealth_core::scenarios::modeler::what_if(&input).map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_income_tax(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::tax::rules::IncomeTaxInput = parse(&input_json)?;
    render(&finhealth_core::tax::rules::calculate_income_tax(&input))
}

#[napi]
pub fn check_tax_compliance(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::tax::compliance::ComplianceInput = parse(&input_json)?;
    render(&finhealth_core::tax::compliance::check_compliance(&input))
}

#[napi]
pub fn validate_deductions(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::tax::compliance::DeductionClaimsInput = parse(&input_json)?;
    let output =
        finhealth_core::tax::compliance::validate_deductions(&input).map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn identify_penalty_risks(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::tax::compliance::PenaltyRiskInput = parse(&input_json)?;
    render(&finhealth_core::tax::compliance::identify_penalty_risks(&input))
}

#[napi]
pub fn assess_filing_readiness(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::tax::compliance::FilingReadinessInput = parse(&input_json)?;
    render(&finhealth_core::tax::compliance::assess_filing_readiness(&input))
}

#[napi]
pub fn suggest_tax_optimizations(input_json: String) -> NapiResult<String> {
    let record: FinancialRecord = parse(&input_json)?;
    render(&finhealth_core::tax::compliance::suggest_tax_optimizations(&record))
}

#[napi]
pub fn get_gst_rate_for_category(category: String) -> NapiResult<String> {
    render(&finhealth_core::tax::gst::gst_rate_for_category(&category))
}

#[napi]
pub fn calculate_gst_liability(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::tax::gst::GstLiabilityInput = parse(&input_json)?;
    let output =
        finhealth_core::tax::gst::calculate_gst_liability(&input).map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Workflows
// ---------------------------------------------------------------------------

#[napi]
pub fn run_full_analysis(input_json: String) -> NapiResult<String> {
    let input: finhealth_core::workflows::full_analysis::FullAnalysisInput = parse(&input_json)?;
    render(&finhealth_core::workflows::full_analysis::run_full_analysis(&input))
}

use clap::Args;
use serde_json::{json, Value};

use finhealth_core::analysis::{benchmark, health, metrics, recommendations};
use finhealth_core::FinancialRecord;

use crate::input;

/// Arguments shared by commands that take a single financial record
#[derive(Args)]
pub struct RecordArgs {
    /// Path to a JSON/YAML financial record (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for industry benchmarking
#[derive(Args)]
pub struct BenchmarkArgs {
    /// Path to a JSON/YAML financial record (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Industry key (retail, manufacturing, services, technology,
    /// hospitality, agriculture, logistics, ecommerce)
    #[arg(long)]
    pub industry: String,
}

pub fn run_metrics(args: RecordArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: FinancialRecord = input::load(args.input.as_deref(), "metrics")?;
    let result = metrics::compute_metrics(&record);
    Ok(serde_json::to_value(result)?)
}

pub fn run_health(args: RecordArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: FinancialRecord = input::load(args.input.as_deref(), "health scoring")?;
    let m = metrics::compute_metrics(&record);
    let mut result = health::score_health(&m.result);
    result.warnings.extend(m.warnings);
    Ok(serde_json::to_value(result)?)
}

pub fn run_recommend(args: RecordArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: FinancialRecord = input::load(args.input.as_deref(), "recommendations")?;
    let m = metrics::derive_metrics(&record);
    let h = health::assess_health(&m);
    let result = recommendations::generate_recommendations(h.health_score, &m, &h.scores);
    Ok(serde_json::to_value(result)?)
}

pub fn run_benchmark(args: BenchmarkArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: FinancialRecord = input::load(args.input.as_deref(), "benchmarking")?;
    let m = metrics::derive_metrics(&record);
    let result = benchmark::compare_to_industry(&m, &args.industry);
    Ok(serde_json::to_value(result)?)
}

pub fn run_industries() -> Result<Value, Box<dyn std::error::Error>> {
    let list: Vec<Value> = benchmark::BENCHMARKS
        .iter()
        .map(|b| {
            json!({
                "key": b.key,
                "name": b.name,
                "gross_margin": b.gross_margin,
                "net_margin": b.net_margin,
                "current_ratio": b.current_ratio,
                "debt_to_equity": b.debt_to_equity,
                "cash_conversion_cycle": b.cash_conversion_cycle,
            })
        })
        .collect();
    Ok(json!({ "result": list }))
}

mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::analysis::{BenchmarkArgs, RecordArgs};
use commands::forecast::ForecastArgs;
use commands::scenarios::{CompareArgs, ScenarioArgs, WhatIfArgs};
use commands::tax::{
    ComplianceArgs, DeductionArgs, FilingReadinessArgs, GstLiabilityArgs, GstRateArgs,
    IncomeTaxArgs, OptimizationArgs, PenaltyArgs,
};
use commands::working_capital::{MonteCarloArgs, OptimizeArgs, SensitivityArgs};
use commands::workflows::AnalyzeArgs;

/// Financial health scoring for small and medium businesses
#[derive(Parser)]
#[command(
    name = "finhealth",
    version,
    about = "Financial health scoring for small and medium businesses",
    long_about = "Scores an SME's financial health from a single period of financial data, \
                  benchmarks it against its industry, assesses credit readiness, forecasts \
                  cash flow and models working-capital scenarios. Inputs are JSON (or YAML) \
                  from --input or stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute liquidity, profitability, cash flow and leverage ratios
    Metrics(RecordArgs),
    /// Score financial health and classify the risk band
    Health(RecordArgs),
    /// Improvement recommendations for weak areas
    Recommend(RecordArgs),
    /// Compare ratios against an industry benchmark
    Benchmark(BenchmarkArgs),
    /// Assess credit readiness and rank financing products
    Credit(RecordArgs),
    /// Six-month cash flow forecast
    Forecast(ForecastArgs),
    /// Working capital optimisation against target day counts
    Optimize(OptimizeArgs),
    /// Sweep one record field and measure the working capital response
    Sensitivity(SensitivityArgs),
    /// Monte Carlo simulation of the cash conversion cycle
    MonteCarlo(MonteCarloArgs),
    /// Optimise a single named scenario built from a base record
    Scenario(ScenarioArgs),
    /// Compare named scenarios against a base record
    Scenarios(CompareArgs),
    /// Evaluate candidate values for one record field
    WhatIf(WhatIfArgs),
    /// Run the full analysis workflow
    Analyze(AnalyzeArgs),
    /// Check tax compliance and filing deadlines
    TaxCompliance(ComplianceArgs),
    /// Validate claimed tax deductions
    TaxDeductions(DeductionArgs),
    /// Identify tax penalty risks
    TaxPenalties(PenaltyArgs),
    /// Assess readiness to file a tax return
    FilingReadiness(FilingReadinessArgs),
    /// Suggest tax optimisation strategies
    TaxOptimize(OptimizationArgs),
    /// Look up the GST rate for a supply category
    GstRate(GstRateArgs),
    /// GST liability on GST-inclusive revenue with the CGST/SGST split
    GstLiability(GstLiabilityArgs),
    /// Progressive slab income tax
    IncomeTax(IncomeTaxArgs),
    /// List the industry benchmarks
    Industries,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finhealth=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Metrics(args) => commands::analysis::run_metrics(args),
        Commands::Health(args) => commands::analysis::run_health(args),
        Commands::Recommend(args) => commands::analysis::run_recommend(args),
        Commands::Benchmark(args) => commands::analysis::run_benchmark(args),
        Commands::Credit(args) => commands::credit::run_credit(args),
        Commands::Forecast(args) => commands::forecast::run_forecast(args),
        Commands::Optimize(args) => commands::working_capital::run_optimize(args),
        Commands::Sensitivity(args) => commands::working_capital::run_sensitivity_sweep(args),
        Commands::MonteCarlo(args) => commands::working_capital::run_monte_carlo(args),
        Commands::Scenario(args) => commands::scenarios::run_scenario(args),
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args),
        Commands::WhatIf(args) => commands::scenarios::run_what_if(args),
        Commands::Analyze(args) => commands::workflows::run_analyze(args),
        Commands::TaxCompliance(args) => commands::tax::run_compliance(args),
        Commands::TaxDeductions(args) => commands::tax::run_deductions(args),
        Commands::TaxPenalties(args) => commands::tax::run_penalty_risks(args),
        Commands::FilingReadiness(args) => commands::tax::run_filing_readiness(args),
        Commands::TaxOptimize(args) => commands::tax::run_optimizations(args),
        Commands::GstRate(args) => commands::tax::run_gst_rate(args),
        Commands::GstLiability(args) => commands::tax::run_gst_liability(args),
        Commands::IncomeTax(args) => commands::tax::run_income_tax(args),
        Commands::Industries => commands::analysis::run_industries(),
        Commands::Version => {
            println!("finhealth {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

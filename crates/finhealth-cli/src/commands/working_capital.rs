use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use finhealth_core::monte_carlo::simulation::{
    simulate_working_capital, WorkingCapitalSimulationInput,
};
use finhealth_core::working_capital::optimizer::{
    optimize_working_capital, OptimizerTargets, WorkingCapitalInput,
};
use finhealth_core::working_capital::sensitivity::{run_sensitivity, SensitivityInput};
use finhealth_core::FinancialRecord;

use crate::input;

/// Arguments for working capital optimisation
#[derive(Args)]
pub struct OptimizeArgs {
    /// Path to a JSON/YAML optimiser input: `{"record": {...}, "targets": {...}}`,
    /// with `targets` optional (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a one-variable sensitivity sweep
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SensitivityArgs {
    /// Path to a JSON/YAML financial record (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Record field to sweep (e.g. receivables_days, current_assets)
    #[arg(long)]
    pub variable: String,

    /// Half-width of the sweep as a fraction of the base value
    #[arg(long, default_value = "0.20")]
    pub range: Decimal,
}

/// Arguments for the working capital Monte Carlo simulation
#[derive(Args)]
pub struct MonteCarloArgs {
    /// Path to a JSON/YAML financial record (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Number of draws
    #[arg(long, default_value_t = 1000)]
    pub iterations: u32,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// COGS share used to cost each simulated cycle
    #[arg(long, default_value = "0.7")]
    pub cogs_ratio: Decimal,
}

pub fn run_optimize(args: OptimizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let wc_input: WorkingCapitalInput =
        input::load(args.input.as_deref(), "working capital optimisation")?;
    let result = optimize_working_capital(&wc_input);
    Ok(serde_json::to_value(result)?)
}

pub fn run_sensitivity_sweep(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: FinancialRecord = input::load(args.input.as_deref(), "sensitivity analysis")?;
    let result = run_sensitivity(&SensitivityInput {
        record,
        variable: args.variable,
        range_percent: args.range,
    })?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_monte_carlo(args: MonteCarloArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: FinancialRecord = input::load(args.input.as_deref(), "Monte Carlo simulation")?;
    let result = simulate_working_capital(&WorkingCapitalSimulationInput {
        record,
        iterations: args.iterations,
        seed: args.seed,
        targets: OptimizerTargets {
            cogs_ratio: args.cogs_ratio,
            ..Default::default()
        },
    })?;
    Ok(serde_json::to_value(result)?)
}

use clap::Args;
use serde_json::Value;

use finhealth_core::forecast::cash_flow::{forecast_cash_flow, ForecastInput};

use crate::input;

/// Arguments for the cash flow forecast
#[derive(Args)]
pub struct ForecastArgs {
    /// Path to a JSON/YAML forecast input (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Seed for the limited-history projection
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run_forecast(args: ForecastArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut fc_input: ForecastInput = input::load(args.input.as_deref(), "forecasting")?;
    if args.seed.is_some() {
        fc_input.settings.seed = args.seed;
    }
    let result = forecast_cash_flow(&fc_input);
    Ok(serde_json::to_value(result)?)
}

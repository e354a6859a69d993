use clap::Args;
use serde_json::Value;

use finhealth_core::workflows::full_analysis::{run_full_analysis, FullAnalysisInput};

use crate::input;

/// Arguments for the full analysis workflow
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to a JSON/YAML analysis input (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Industry key; overrides the one in the input
    #[arg(long)]
    pub industry: Option<String>,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut fa_input: FullAnalysisInput = input::load(args.input.as_deref(), "full analysis")?;
    if let Some(industry) = args.industry {
        fa_input.industry = industry;
    }
    let result = run_full_analysis(&fa_input);
    Ok(serde_json::to_value(result)?)
}

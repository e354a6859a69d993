use clap::Args;
use serde_json::Value;

use finhealth_core::scenarios::modeler::{
    compare_scenarios, create_scenario, what_if, CompareScenariosInput, CreateScenarioInput,
    WhatIfInput,
};

use crate::input;

/// Arguments for a single named scenario
#[derive(Args)]
pub struct ScenarioArgs {
    /// Path to a JSON/YAML scenario: `{"base": {...}, "changes": {"name": ..., <field>: <value>}}`,
    /// with optional `targets` (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for ranking several scenarios
#[derive(Args)]
pub struct CompareArgs {
    /// Path to a JSON/YAML comparison: `{"base": {...}, "scenarios": [{...}, ...]}`,
    /// with optional `targets` (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a what-if sweep over one record field
#[derive(Args)]
pub struct WhatIfArgs {
    /// Path to a JSON/YAML what-if input: `{"base": {...}, "variable": "...", "values": [...]}`,
    /// with optional `targets` (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_scenario(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sc_input: CreateScenarioInput = input::load(args.input.as_deref(), "scenario")?;
    let result = create_scenario(&sc_input);
    Ok(serde_json::to_value(result)?)
}

pub fn run_scenarios(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sc_input: CompareScenariosInput =
        input::load(args.input.as_deref(), "scenario comparison")?;
    let result = compare_scenarios(&sc_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_what_if(args: WhatIfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let wi_input: WhatIfInput = input::load(args.input.as_deref(), "what-if analysis")?;
    let result = what_if(&wi_input)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_input(name: &str, json: &str) -> String {
        let file = format!("finhealth-{}-{name}.json", std::process::id());
        let path = std::env::temp_dir().join(file);
        fs::write(&path, json).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_scenario_command_builds_named_scenario() {
        let path = write_input(
            "scenario",
            r#"{ "base": { "revenue": 365000 }, "changes": { "name": "Lean", "receivables_days": 20 } }"#,
        );
        let value = run_scenario(ScenarioArgs { input: Some(path.clone()) }).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(value["result"]["scenario_name"], "Lean");
        let days = value["result"]["changes"]["receivables_days"].as_str().unwrap();
        assert_eq!(days.parse::<rust_decimal::Decimal>().unwrap(), rust_decimal::Decimal::from(20));
    }

    #[test]
    fn test_scenario_command_requires_input_file() {
        let missing = ScenarioArgs {
            input: Some("/nonexistent/finhealth-scenario.json".into()),
        };
        assert!(run_scenario(missing).is_err());
    }
}

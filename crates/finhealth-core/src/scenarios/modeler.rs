use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::types::*;
use crate::working_capital::optimizer::{optimize, OptimizationResult, OptimizerTargets};
use crate::{FinHealthError, FinHealthResult};

const DEFAULT_SCENARIO_NAME: &str = "Custom Scenario";

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Named field overrides. Every key other than `name` must carry a number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScenarioInput {
    pub base: FinancialRecord,
    pub changes: ScenarioChanges,
    #[serde(default)]
    pub targets: OptimizerTargets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareScenariosInput {
    pub base: FinancialRecord,
    pub scenarios: Vec<ScenarioChanges>,
    #[serde(default)]
    pub targets: OptimizerTargets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfInput {
    pub base: FinancialRecord,
    pub variable: String,
    pub values: Vec<Decimal>,
    #[serde(default)]
    pub targets: OptimizerTargets,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub changes: ScenarioChanges,
    pub results: OptimizationResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedScenario {
    pub rank: usize,
    pub scenario_name: String,
    pub optimal_working_capital: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub scenarios: Vec<ScenarioResult>,
    /// Ascending by optimal working capital; the first entry is the best.
    pub ranking: Vec<RankedScenario>,
    pub best_scenario: String,
    pub worst_scenario: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfPoint {
    pub value: Decimal,
    pub working_capital: Money,
    pub ccc: Days,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfResult {
    pub variable: RecordField,
    pub analysis: Vec<WhatIfPoint>,
    pub optimal_value: Decimal,
    pub recommendation: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Apply the overrides to a copy of the base record and optimise it.
pub fn create_scenario(input: &CreateScenarioInput) -> ComputationOutput<ScenarioResult> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let result = build_scenario(&input.base, &input.changes, &input.targets, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Scenario: shallow merge of overrides into the base record, then working capital optimisation",
        &serde_json::json!({ "targets": input.targets }),
        warnings,
        elapsed,
        result,
    )
}

/// Build every scenario and rank them by optimal working capital, lowest
/// first. Ties keep input order.
pub fn compare_scenarios(
    input: &CompareScenariosInput,
) -> FinHealthResult<ComputationOutput<ScenarioComparison>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    if input.scenarios.is_empty() {
        return Err(FinHealthError::InsufficientData(
            "At least one scenario is required".into(),
        ));
    }

    let scenarios: Vec<ScenarioResult> = input
        .scenarios
        .iter()
        .map(|changes| build_scenario(&input.base, changes, &input.targets, &mut warnings))
        .collect();

    let mut order: Vec<usize> = (0..scenarios.len()).collect();
    order.sort_by(|a, b| {
        scenarios[*a]
            .results
            .optimal_working_capital
            .cmp(&scenarios[*b].results.optimal_working_capital)
    });

    let ranking: Vec<RankedScenario> = order
        .iter()
        .enumerate()
        .map(|(pos, idx)| RankedScenario {
            rank: pos + 1,
            scenario_name: scenarios[*idx].scenario_name.clone(),
            optimal_working_capital: scenarios[*idx].results.optimal_working_capital,
        })
        .collect();

    let best_scenario = ranking
        .first()
        .map(|r| r.scenario_name.clone())
        .unwrap_or_default();
    // First scenario in input order holding the maximum.
    let worst_scenario = scenarios
        .iter()
        .fold(None::<&ScenarioResult>, |acc, s| match acc {
            Some(w) if w.results.optimal_working_capital >= s.results.optimal_working_capital => {
                Some(w)
            }
            _ => Some(s),
        })
        .map(|s| s.scenario_name.clone())
        .unwrap_or_default();

    tracing::debug!(
        scenarios = scenarios.len(),
        best = %best_scenario,
        worst = %worst_scenario,
        "scenarios ranked"
    );

    let output = ScenarioComparison {
        scenarios,
        ranking,
        best_scenario,
        worst_scenario,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Scenario comparison ranked by optimal working capital (ascending)",
        &serde_json::json!({
            "targets": input.targets,
            "scenario_count": input.scenarios.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Re-optimise the base record once per candidate value of one field and
/// name the value giving the lowest optimal working capital.
pub fn what_if(input: &WhatIfInput) -> FinHealthResult<ComputationOutput<WhatIfResult>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    let variable: RecordField = input.variable.parse()?;
    if input.values.is_empty() {
        return Err(FinHealthError::InsufficientData(
            "At least one value is required for what-if analysis".into(),
        ));
    }

    let analysis: Vec<WhatIfPoint> = input
        .values
        .iter()
        .map(|value| {
            let record = input.base.with_field(variable, *value);
            let result = optimize(&record, &input.targets);
            WhatIfPoint {
                value: *value,
                working_capital: result.optimal_working_capital,
                ccc: result.current_ccc,
            }
        })
        .collect();

    let best = analysis
        .iter()
        .fold(None::<&WhatIfPoint>, |acc, p| match acc {
            Some(b) if b.working_capital <= p.working_capital => Some(b),
            _ => Some(p),
        });
    let (optimal_value, best_wc) = match best {
        Some(p) => (p.value, p.working_capital),
        None => (Decimal::ZERO, Decimal::ZERO),
    };

    let output = WhatIfResult {
        variable,
        recommendation: format!(
            "Optimal value: {optimal_value} (Working Capital: {})",
            best_wc.round_dp(0)
        ),
        optimal_value,
        analysis,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "What-if analysis: one scenario per candidate value, minimising optimal working capital",
        &serde_json::json!({
            "variable": variable,
            "values": input.values.len(),
            "targets": input.targets,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn build_scenario(
    base: &FinancialRecord,
    changes: &ScenarioChanges,
    targets: &OptimizerTargets,
    warnings: &mut Vec<String>,
) -> ScenarioResult {
    let mut record = base.clone();
    for (key, value) in &changes.fields {
        match key.parse::<RecordField>() {
            Ok(field) => record = record.with_field(field, *value),
            Err(_) => {
                let msg = format!("Unknown field '{key}' ignored in scenario");
                tracing::warn!("{msg}");
                warnings.push(msg);
            }
        }
    }

    ScenarioResult {
        scenario_name: changes
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_SCENARIO_NAME.to_string()),
        changes: changes.clone(),
        results: optimize(&record, targets),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base() -> FinancialRecord {
        FinancialRecord {
            revenue: dec!(1000000),
            current_assets: dec!(250000),
            current_liabilities: dec!(150000),
            inventory: dec!(50000),
            ..Default::default()
        }
    }

    fn changes(name: Option<&str>, fields: &[(&str, Decimal)]) -> ScenarioChanges {
        ScenarioChanges {
            name: name.map(String::from),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }

    #[test]
    fn test_create_scenario_merges_overrides() {
        let out = create_scenario(&CreateScenarioInput {
            base: base(),
            changes: changes(Some("Tight"), &[("receivables_days", dec!(30))]),
            targets: OptimizerTargets::default(),
        });
        let r = out.result;
        assert_eq!(r.scenario_name, "Tight");
        assert_eq!(r.results.current_ccc, dec!(30));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_unknown_field_is_ignored_with_warning() {
        let out = create_scenario(&CreateScenarioInput {
            base: base(),
            changes: changes(None, &[("ebitda", dec!(5))]),
            targets: OptimizerTargets::default(),
        });
        assert_eq!(out.result.scenario_name, "Custom Scenario");
        assert_eq!(out.result.results.current_ccc, dec!(45));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_changes_parse_from_json() {
        let c: ScenarioChanges =
            serde_json::from_str(r#"{"name": "Lean", "inventory": 20000, "cash": 5000}"#).unwrap();
        assert_eq!(c.name.as_deref(), Some("Lean"));
        assert_eq!(c.fields.get("inventory"), Some(&dec!(20000)));
        assert_eq!(c.fields.len(), 2);
    }

    #[test]
    fn test_compare_ranks_ascending() {
        let out = compare_scenarios(&CompareScenariosInput {
            base: base(),
            scenarios: vec![
                changes(Some("Baseline"), &[]),
                changes(Some("Lean"), &[("current_assets", dec!(200000))]),
                changes(Some("Heavy"), &[("current_assets", dec!(300000))]),
            ],
            targets: OptimizerTargets::default(),
        })
        .unwrap();
        let r = out.result;
        let names: Vec<&str> = r.ranking.iter().map(|x| x.scenario_name.as_str()).collect();
        assert_eq!(names, vec!["Lean", "Baseline", "Heavy"]);
        assert_eq!(r.best_scenario, "Lean");
        assert_eq!(r.worst_scenario, "Heavy");
        assert_eq!(r.ranking[0].rank, 1);
        assert_eq!(r.scenarios[0].scenario_name, "Baseline");
    }

    #[test]
    fn test_compare_ties_keep_input_order() {
        let out = compare_scenarios(&CompareScenariosInput {
            base: base(),
            scenarios: vec![changes(Some("A"), &[]), changes(Some("B"), &[])],
            targets: OptimizerTargets::default(),
        })
        .unwrap();
        assert_eq!(out.result.best_scenario, "A");
        assert_eq!(out.result.worst_scenario, "A");
        assert_eq!(out.result.ranking[1].scenario_name, "B");
    }

    #[test]
    fn test_compare_requires_scenarios() {
        let err = compare_scenarios(&CompareScenariosInput {
            base: base(),
            scenarios: vec![],
            targets: OptimizerTargets::default(),
        });
        assert!(matches!(err, Err(FinHealthError::InsufficientData(_))));
    }

    #[test]
    fn test_what_if_picks_minimum() {
        let out = what_if(&WhatIfInput {
            base: base(),
            variable: "current_liabilities".into(),
            values: vec![dec!(100000), dec!(200000), dec!(150000)],
            targets: OptimizerTargets::default(),
        })
        .unwrap();
        let r = out.result;
        assert_eq!(r.analysis.len(), 3);
        assert_eq!(r.optimal_value, dec!(200000));
        assert!(r.recommendation.starts_with("Optimal value: 200000"));
        assert_eq!(r.analysis[0].ccc, dec!(45));
    }

    #[test]
    fn test_what_if_rejects_bad_input() {
        let mut input = WhatIfInput {
            base: base(),
            variable: "nonsense".into(),
            values: vec![dec!(1)],
            targets: OptimizerTargets::default(),
        };
        assert!(matches!(
            what_if(&input),
            Err(FinHealthError::InvalidVariable { .. })
        ));
        input.variable = "cash".into();
        input.values.clear();
        assert!(matches!(
            what_if(&input),
            Err(FinHealthError::InsufficientData(_))
        ));
    }
}

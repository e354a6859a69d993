use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::math::round2;
use crate::types::*;
use crate::{FinHealthError, FinHealthResult};

const SWEEP_POINTS: u32 = 11;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    pub record: FinancialRecord,
    /// Snake_case name of the record field to sweep.
    pub variable: String,
    /// Half-width of the sweep as a fraction of the base value.
    #[serde(default = "default_range_percent")]
    pub range_percent: Rate,
}

fn default_range_percent() -> Rate {
    dec!(0.20)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensitivityLevel {
    High,
    Moderate,
    Low,
}

impl SensitivityLevel {
    fn from_coefficient(coefficient: Decimal) -> Self {
        let c = coefficient.abs();
        if c > dec!(1.0) {
            Self::High
        } else if c > dec!(0.5) {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn interpretation(&self) -> &'static str {
        match self {
            Self::High => "High sensitivity - Small changes have large impact",
            Self::Moderate => "Moderate sensitivity - Changes have noticeable impact",
            Self::Low => "Low sensitivity - Changes have minimal impact",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub value: Decimal,
    pub working_capital: Money,
    pub cash_conversion_cycle: Days,
    pub change_percent: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub variable: RecordField,
    pub base_value: Decimal,
    pub range_percent: Rate,
    pub sensitivity_coefficient: Decimal,
    pub level: SensitivityLevel,
    pub interpretation: String,
    pub results: Vec<SensitivityPoint>,
}

/// Sweep one record field across base +/- range in eleven even steps and
/// measure how working capital responds.
///
/// Each step evaluates an overridden copy of the record; the caller's record
/// is never touched.
pub fn run_sensitivity(input: &SensitivityInput) -> FinHealthResult<ComputationOutput<SensitivityResult>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let variable: RecordField = input.variable.parse()?;
    if input.range_percent < Decimal::ZERO {
        return Err(FinHealthError::InvalidInput {
            field: "range_percent".into(),
            reason: "must not be negative".into(),
        });
    }

    let base = input.record.get(variable);
    if base.is_zero() {
        warnings.push(format!(
            "Base value of {variable} is 0; the sweep collapses to a single point"
        ));
    }

    let low = base * (Decimal::ONE - input.range_percent);
    let high = base * (Decimal::ONE + input.range_percent);
    let step = (high - low) / Decimal::from(SWEEP_POINTS - 1);

    let mut results = Vec::with_capacity(SWEEP_POINTS as usize);
    let mut wc_values = Vec::with_capacity(SWEEP_POINTS as usize);
    for k in 0..SWEEP_POINTS {
        let value = low + step * Decimal::from(k);
        let scenario = input.record.with_field(variable, value);
        let wc = round2(scenario.working_capital());
        wc_values.push(wc);
        results.push(SensitivityPoint {
            value: round2(value),
            working_capital: wc,
            cash_conversion_cycle: round2(scenario.cash_conversion_cycle()),
            change_percent: if base > Decimal::ZERO {
                round2((value - base) / base * dec!(100))
            } else {
                Decimal::ZERO
            },
        });
    }

    let width = (high - low).abs();
    let coefficient = match (wc_values.iter().max(), wc_values.iter().min()) {
        (Some(max), Some(min)) if !width.is_zero() => ((*max - *min) / width).round_dp(4),
        _ => Decimal::ZERO,
    };
    let level = SensitivityLevel::from_coefficient(coefficient);
    tracing::debug!(variable = %variable, coefficient = %coefficient, "sensitivity computed");

    let output = SensitivityResult {
        variable,
        base_value: base,
        range_percent: input.range_percent,
        sensitivity_coefficient: coefficient,
        level,
        interpretation: level.interpretation().to_string(),
        results,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "One-at-a-time sensitivity of working capital over an 11-point sweep",
        &serde_json::json!({
            "variable": variable,
            "range_percent": input.range_percent.to_string(),
            "points": SWEEP_POINTS,
            "thresholds": { "high": "> 1.0", "moderate": "> 0.5" },
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(variable: &str) -> SensitivityInput {
        SensitivityInput {
            record: FinancialRecord {
                revenue: dec!(1000000),
                current_assets: dec!(250000),
                current_liabilities: dec!(150000),
                inventory: dec!(50000),
                ..Default::default()
            },
            variable: variable.into(),
            range_percent: default_range_percent(),
        }
    }

    #[test]
    fn test_current_assets_sweep() {
        let r = run_sensitivity(&input("current_assets")).unwrap().result;
        assert_eq!(r.results.len(), 11);
        assert_eq!(r.results[0].value, dec!(200000));
        assert_eq!(r.results[0].working_capital, dec!(50000));
        assert_eq!(r.results[0].change_percent, dec!(-20));
        assert_eq!(r.results[5].value, dec!(250000));
        assert_eq!(r.results[5].change_percent, dec!(0));
        assert_eq!(r.results[10].working_capital, dec!(150000));
        assert_eq!(r.sensitivity_coefficient, dec!(1));
        assert_eq!(r.level, SensitivityLevel::Moderate);
    }

    #[test]
    fn test_liabilities_sweep_moves_wc_one_for_one() {
        let r = run_sensitivity(&input("current_liabilities")).unwrap().result;
        assert_eq!(r.results[0].working_capital, dec!(130000));
        assert_eq!(r.results[10].working_capital, dec!(70000));
        assert_eq!(r.sensitivity_coefficient, dec!(1));
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(SensitivityLevel::from_coefficient(dec!(1.01)), SensitivityLevel::High);
        assert_eq!(SensitivityLevel::from_coefficient(dec!(-1.5)), SensitivityLevel::High);
        assert_eq!(SensitivityLevel::from_coefficient(dec!(0.51)), SensitivityLevel::Moderate);
        assert_eq!(SensitivityLevel::from_coefficient(dec!(0.5)), SensitivityLevel::Low);
    }

    #[test]
    fn test_day_sweep_moves_ccc_only() {
        let r = run_sensitivity(&input("receivables_days")).unwrap().result;
        assert_eq!(r.results[0].cash_conversion_cycle, dec!(36));
        assert_eq!(r.results[10].cash_conversion_cycle, dec!(54));
        assert_eq!(r.sensitivity_coefficient, dec!(0));
        assert_eq!(r.level, SensitivityLevel::Low);
    }

    #[test]
    fn test_unknown_variable_rejected() {
        match run_sensitivity(&input("ebitda")) {
            Err(FinHealthError::InvalidVariable { name, .. }) => assert_eq!(name, "ebitda"),
            other => panic!("Expected InvalidVariable, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_range_rejected() {
        let mut i = input("cash");
        i.range_percent = dec!(-0.1);
        assert!(matches!(
            run_sensitivity(&i),
            Err(FinHealthError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_zero_base_gives_zero_coefficient() {
        let out = run_sensitivity(&input("cash")).unwrap();
        assert_eq!(out.result.sensitivity_coefficient, dec!(0));
        assert!(out.result.results.iter().all(|p| p.change_percent.is_zero()));
        assert_eq!(out.warnings.len(), 1);
    }
}

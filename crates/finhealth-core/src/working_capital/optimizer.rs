use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::math::round2;
use crate::types::*;

const DAYS_PER_YEAR: Decimal = dec!(365);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Target day counts and the COGS share used to cost inventory and payables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerTargets {
    pub receivables_days: Days,
    pub inventory_days: Days,
    pub payables_days: Days,
    pub cogs_ratio: Rate,
}

impl Default for OptimizerTargets {
    fn default() -> Self {
        Self {
            receivables_days: dec!(30),
            inventory_days: dec!(20),
            payables_days: dec!(45),
            cogs_ratio: dec!(0.7),
        }
    }
}

impl OptimizerTargets {
    pub fn cash_conversion_cycle(&self) -> Days {
        self.receivables_days + self.inventory_days - self.payables_days
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingCapitalInput {
    pub record: FinancialRecord,
    #[serde(default)]
    pub targets: OptimizerTargets,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lever {
    Receivables,
    Inventory,
    Payables,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeverRecommendation {
    pub area: Lever,
    pub current_days: Days,
    pub target_days: Days,
    pub day_delta: Days,
    pub cash_impact: Money,
    pub action: String,
    pub impact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub current_working_capital: Money,
    pub optimal_working_capital: Money,
    pub potential_savings: Money,
    pub current_ccc: Days,
    pub optimal_ccc: Days,
    pub ccc_improvement: Days,
    pub optimal_receivables: Money,
    pub optimal_inventory: Money,
    pub optimal_payables: Money,
    pub recommendations: Vec<LeverRecommendation>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Working-capital position at the target day counts versus today, with a
/// cash-impact estimate per lever that is off target.
pub fn optimize_working_capital(
    input: &WorkingCapitalInput,
) -> ComputationOutput<OptimizationResult> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    if input.record.revenue <= Decimal::ZERO {
        warnings.push("Revenue is zero or negative; daily revenue and cash impacts are 0".into());
    }
    for (name, days) in [
        ("receivables_days", input.record.receivables_days),
        ("inventory_days", input.record.inventory_days),
        ("payables_days", input.record.payables_days),
    ] {
        if days < Decimal::ZERO {
            warnings.push(format!("{name} is negative ({days})"));
        }
    }

    let result = optimize(&input.record, &input.targets);

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Working capital optimisation against target receivable, inventory and payable days",
        &serde_json::json!({
            "targets": input.targets,
            "days_per_year": DAYS_PER_YEAR.to_string(),
        }),
        warnings,
        elapsed,
        result,
    )
}

pub(crate) fn daily_revenue(record: &FinancialRecord) -> Money {
    if record.revenue > Decimal::ZERO {
        record.revenue / DAYS_PER_YEAR
    } else {
        Decimal::ZERO
    }
}

/// Envelope-free optimisation, shared with the scenario modeler.
pub fn optimize(record: &FinancialRecord, targets: &OptimizerTargets) -> OptimizationResult {
    let dr = daily_revenue(record);
    let cogs = targets.cogs_ratio;

    let optimal_receivables = dr * targets.receivables_days;
    let optimal_inventory = dr * targets.inventory_days * cogs;
    let optimal_payables = dr * targets.payables_days * cogs;

    // Swap today's receivables, inventory and payables for their targeted
    // amounts and keep every other current item as it is.
    let other_current_assets =
        record.current_assets - record.inventory - dr * record.receivables_days;
    let other_current_liabilities = record.current_liabilities - dr * record.payables_days * cogs;
    let optimal_current_assets = optimal_receivables + optimal_inventory + other_current_assets;
    let optimal_current_liabilities = optimal_payables + other_current_liabilities;
    let optimal_wc = optimal_current_assets - optimal_current_liabilities;

    let current_wc = record.working_capital();
    let current_ccc = record.cash_conversion_cycle();
    let optimal_ccc = targets.cash_conversion_cycle();

    let mut recommendations = Vec::new();

    if record.receivables_days > targets.receivables_days {
        let delta = record.receivables_days - targets.receivables_days;
        let cash = round2(dr * delta);
        recommendations.push(LeverRecommendation {
            area: Lever::Receivables,
            current_days: record.receivables_days,
            target_days: targets.receivables_days,
            day_delta: delta,
            cash_impact: cash,
            action: format!("Reduce receivables collection period by {delta} days"),
            impact: format!("Free up {} in cash", cash.round_dp(0)),
        });
    }

    if record.inventory_days > targets.inventory_days {
        let delta = record.inventory_days - targets.inventory_days;
        let cash = round2(dr * delta * cogs);
        recommendations.push(LeverRecommendation {
            area: Lever::Inventory,
            current_days: record.inventory_days,
            target_days: targets.inventory_days,
            day_delta: delta,
            cash_impact: cash,
            action: format!("Reduce inventory holding period by {delta} days"),
            impact: format!("Free up {} in cash", cash.round_dp(0)),
        });
    }

    if record.payables_days < targets.payables_days {
        let delta = targets.payables_days - record.payables_days;
        let cash = round2(dr * delta * cogs);
        recommendations.push(LeverRecommendation {
            area: Lever::Payables,
            current_days: record.payables_days,
            target_days: targets.payables_days,
            day_delta: delta,
            cash_impact: cash,
            action: format!("Negotiate to extend payment terms by {delta} days"),
            impact: format!("Retain {} in cash longer", cash.round_dp(0)),
        });
    }

    OptimizationResult {
        current_working_capital: round2(current_wc),
        optimal_working_capital: round2(optimal_wc),
        potential_savings: round2(current_wc - optimal_wc),
        current_ccc: round2(current_ccc),
        optimal_ccc: round2(optimal_ccc),
        ccc_improvement: round2(current_ccc - optimal_ccc),
        optimal_receivables: round2(optimal_receivables),
        optimal_inventory: round2(optimal_inventory),
        optimal_payables: round2(optimal_payables),
        recommendations,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_record() -> FinancialRecord {
        FinancialRecord {
            revenue: dec!(1000000),
            current_assets: dec!(250000),
            current_liabilities: dec!(150000),
            inventory: dec!(50000),
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_optimisation() {
        let r = optimize(&sample_record(), &OptimizerTargets::default());
        assert_eq!(r.current_working_capital, dec!(100000));
        assert_eq!(r.optimal_working_capital, dec!(18493.15));
        assert_eq!(r.potential_savings, dec!(81506.85));
        assert_eq!(r.current_ccc, dec!(45));
        assert_eq!(r.optimal_ccc, dec!(5));
        assert_eq!(r.ccc_improvement, dec!(40));
        assert_eq!(r.optimal_receivables, dec!(82191.78));
    }

    #[test]
    fn test_lever_cash_impacts() {
        let r = optimize(&sample_record(), &OptimizerTargets::default());
        let areas: Vec<Lever> = r.recommendations.iter().map(|l| l.area).collect();
        assert_eq!(areas, vec![Lever::Receivables, Lever::Inventory, Lever::Payables]);
        assert_eq!(r.recommendations[0].cash_impact, dec!(41095.89));
        assert_eq!(r.recommendations[1].cash_impact, dec!(19178.08));
        assert_eq!(r.recommendations[2].cash_impact, dec!(28767.12));
        assert_eq!(r.recommendations[0].day_delta, dec!(15));
        assert_eq!(
            r.recommendations[2].action,
            "Negotiate to extend payment terms by 15 days"
        );
    }

    #[test]
    fn test_on_target_levers_are_silent() {
        let record = FinancialRecord {
            receivables_days: dec!(25),
            inventory_days: dec!(20),
            payables_days: dec!(60),
            ..sample_record()
        };
        assert!(optimize(&record, &OptimizerTargets::default())
            .recommendations
            .is_empty());
    }

    #[test]
    fn test_zero_revenue_has_no_cash_impact() {
        let record = FinancialRecord {
            revenue: Decimal::ZERO,
            ..sample_record()
        };
        let out = optimize_working_capital(&WorkingCapitalInput {
            record,
            targets: OptimizerTargets::default(),
        });
        assert_eq!(out.result.optimal_working_capital, dec!(50000));
        assert!(out
            .result
            .recommendations
            .iter()
            .all(|l| l.cash_impact == Decimal::ZERO));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_custom_targets() {
        let targets = OptimizerTargets {
            receivables_days: dec!(45),
            inventory_days: dec!(30),
            payables_days: dec!(30),
            cogs_ratio: dec!(0.7),
        };
        let r = optimize(&sample_record(), &targets);
        assert_eq!(r.optimal_ccc, dec!(45));
        assert_eq!(r.ccc_improvement, dec!(0));
        assert!(r.recommendations.is_empty());
    }
}

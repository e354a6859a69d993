use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use super::metrics::MetricsSet;
use crate::math::{bounded, clamp_score, round2};
use crate::types::*;

const WEIGHT_LIQUIDITY: Decimal = dec!(0.30);
const WEIGHT_PROFITABILITY: Decimal = dec!(0.25);
const WEIGHT_CASH_FLOW: Decimal = dec!(0.25);
const WEIGHT_DEBT_HEALTH: Decimal = dec!(0.20);

const IDEAL_CURRENT_RATIO: Decimal = dec!(2.0);
const IDEAL_QUICK_RATIO: Decimal = dec!(1.5);
/// Points lost per unit of ratio above the ideal.
const EXCESS_PENALTY: Decimal = dec!(20);
const CCC_CEILING_DAYS: Decimal = dec!(90);

const SAFE_THRESHOLD: Decimal = dec!(70);
const WATCH_THRESHOLD: Decimal = dec!(40);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Safe,
    Watch,
    Critical,
}

impl RiskBand {
    /// Classify a health score: Safe at 70 and above, Watch from 40, Critical below.
    pub fn from_score(score: Score) -> Self {
        if score >= SAFE_THRESHOLD {
            Self::Safe
        } else if score >= WATCH_THRESHOLD {
            Self::Watch
        } else {
            Self::Critical
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Safe => "Safe",
            Self::Watch => "Watch",
            Self::Critical => "Critical",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub liquidity_score: Score,
    pub profitability_score: Score,
    pub cash_flow_score: Score,
    pub debt_health_score: Score,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub scores: ScoreSet,
    pub health_score: Score,
    pub risk_band: RiskBand,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score a metrics set into four sub-scores, a weighted health score and a
/// risk band. Deterministic and infallible.
pub fn score_health(metrics: &MetricsSet) -> ComputationOutput<HealthAssessment> {
    let start = Instant::now();
    let assessment = assess_health(metrics);
    tracing::debug!(
        health_score = %assessment.health_score,
        risk_band = %assessment.risk_band,
        "health score computed"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Weighted health score: piecewise-linear sub-scores clamped to [0, 100]",
        &serde_json::json!({
            "weights": {
                "liquidity": WEIGHT_LIQUIDITY.to_string(),
                "profitability": WEIGHT_PROFITABILITY.to_string(),
                "cash_flow": WEIGHT_CASH_FLOW.to_string(),
                "debt_health": WEIGHT_DEBT_HEALTH.to_string(),
            },
            "ideal_current_ratio": IDEAL_CURRENT_RATIO.to_string(),
            "ideal_quick_ratio": IDEAL_QUICK_RATIO.to_string(),
            "risk_bands": { "safe": ">= 70", "watch": ">= 40", "critical": "< 40" },
        }),
        Vec::new(),
        elapsed,
        assessment,
    )
}

/// Envelope-free scoring used by the credit and workflow modules.
pub fn assess_health(metrics: &MetricsSet) -> HealthAssessment {
    let scores = ScoreSet {
        liquidity_score: liquidity_score(metrics),
        profitability_score: profitability_score(metrics),
        cash_flow_score: cash_flow_score(metrics),
        debt_health_score: debt_health_score(metrics),
    };

    let health_score = round2(
        scores.liquidity_score * WEIGHT_LIQUIDITY
            + scores.profitability_score * WEIGHT_PROFITABILITY
            + scores.cash_flow_score * WEIGHT_CASH_FLOW
            + scores.debt_health_score * WEIGHT_DEBT_HEALTH,
    );

    HealthAssessment {
        risk_band: RiskBand::from_score(health_score),
        health_score,
        scores,
    }
}

// ---------------------------------------------------------------------------
// Scoring curves
// ---------------------------------------------------------------------------

/// Linear up to the ideal, then a fixed penalty per unit beyond it.
fn ideal_ratio_curve(value: Decimal, ideal: Decimal) -> Score {
    let value = bounded(value);
    if value <= ideal {
        clamp_score(value / ideal * dec!(100))
    } else {
        clamp_score(dec!(100) - (value - ideal) * EXCESS_PENALTY)
    }
}

/// Maps a margin of -5% to 0 and +5% to 100.
fn margin_curve(margin: Rate) -> Score {
    clamp_score((bounded(margin) + dec!(5)) * dec!(10))
}

fn liquidity_score(m: &MetricsSet) -> Score {
    let cr = ideal_ratio_curve(m.current_ratio, IDEAL_CURRENT_RATIO);
    let qr = ideal_ratio_curve(m.quick_ratio, IDEAL_QUICK_RATIO);
    round2(cr * dec!(0.6) + qr * dec!(0.4))
}

fn profitability_score(m: &MetricsSet) -> Score {
    let nm = margin_curve(m.net_profit_margin);
    let gm = clamp_score(bounded(m.gross_profit_margin) * dec!(2));
    round2(nm * dec!(0.6) + gm * dec!(0.4))
}

fn cash_flow_score(m: &MetricsSet) -> Score {
    let cfm = margin_curve(m.cash_flow_margin);
    let cfc = clamp_score(bounded(m.cash_flow_coverage) * dec!(50));
    let ccc = clamp_score(dec!(100) - bounded(m.cash_conversion_cycle) / CCC_CEILING_DAYS * dec!(100));
    round2(cfm * dec!(0.4) + cfc * dec!(0.3) + ccc * dec!(0.3))
}

fn debt_health_score(m: &MetricsSet) -> Score {
    let dte = clamp_score(dec!(100) - bounded(m.debt_to_equity) * dec!(50));
    let dta = clamp_score(dec!(100) - bounded(m.debt_to_assets));
    let ic = clamp_score(bounded(m.interest_coverage) * dec!(20));
    round2(dte * dec!(0.3) + dta * dec!(0.3) + ic * dec!(0.4))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::metrics::derive_metrics;
    use rust_decimal_macros::dec;

    fn reference_metrics() -> MetricsSet {
        derive_metrics(&FinancialRecord {
            revenue: dec!(1000000),
            current_assets: dec!(250000),
            current_liabilities: dec!(150000),
            inventory: dec!(50000),
            net_profit: dec!(50000),
            total_debt: dec!(100000),
            equity: dec!(200000),
            operating_cash_flow: dec!(80000),
            ..Default::default()
        })
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert_eq!(
            WEIGHT_LIQUIDITY + WEIGHT_PROFITABILITY + WEIGHT_CASH_FLOW + WEIGHT_DEBT_HEALTH,
            dec!(1)
        );
    }

    #[test]
    fn test_reference_record_score() {
        let a = assess_health(&reference_metrics());
        assert_eq!(a.scores.liquidity_score, dec!(85.57));
        assert_eq!(a.scores.profitability_score, dec!(60.00));
        assert_eq!(a.scores.cash_flow_score, dec!(62.95));
        assert_eq!(a.scores.debt_health_score, dec!(52.50));
        assert_eq!(a.health_score, dec!(66.91));
        assert_eq!(a.risk_band, RiskBand::Watch);
    }

    #[test]
    fn test_all_zero_metrics_are_critical() {
        let a = assess_health(&MetricsSet::default());
        assert_eq!(a.scores.liquidity_score, dec!(0));
        assert_eq!(a.scores.profitability_score, dec!(30));
        assert_eq!(a.scores.cash_flow_score, dec!(50));
        assert_eq!(a.scores.debt_health_score, dec!(60));
        assert_eq!(a.health_score, dec!(32));
        assert_eq!(a.risk_band, RiskBand::Critical);
    }

    #[test]
    fn test_pathological_ratios_stay_in_range() {
        let m = MetricsSet {
            current_ratio: dec!(500),
            quick_ratio: dec!(-20),
            net_profit_margin: dec!(-900),
            gross_profit_margin: dec!(900),
            cash_flow_margin: dec!(1000),
            cash_flow_coverage: dec!(-3),
            cash_conversion_cycle: dec!(-400),
            debt_to_equity: dec!(1000),
            debt_to_assets: dec!(-50),
            interest_coverage: dec!(99),
            ..Default::default()
        };
        let a = assess_health(&m);
        for s in [
            a.scores.liquidity_score,
            a.scores.profitability_score,
            a.scores.cash_flow_score,
            a.scores.debt_health_score,
            a.health_score,
        ] {
            assert!(s >= dec!(0) && s <= dec!(100), "score {s} out of range");
        }
    }

    #[test]
    fn test_extreme_record_scores_without_overflow() {
        let m = derive_metrics(&FinancialRecord {
            revenue: dec!(0.01),
            net_profit: dec!(1000000000000000000000000),
            operating_cash_flow: dec!(-1000000000000000000000000),
            current_assets: Decimal::MAX,
            current_liabilities: dec!(0.0001),
            ..Default::default()
        });
        let a = assess_health(&m);
        assert!(a.health_score >= dec!(0) && a.health_score <= dec!(100));
        assert_eq!(m.net_profit_margin, crate::math::RATIO_LIMIT * dec!(100));
    }

    #[test]
    fn test_unbounded_metrics_set_is_scored() {
        let m = MetricsSet {
            current_ratio: Decimal::MAX,
            quick_ratio: Decimal::MIN,
            net_profit_margin: Decimal::MAX,
            gross_profit_margin: Decimal::MIN,
            cash_flow_margin: Decimal::MIN,
            cash_flow_coverage: Decimal::MAX,
            cash_conversion_cycle: Decimal::MIN,
            debt_to_equity: Decimal::MIN,
            debt_to_assets: Decimal::MAX,
            interest_coverage: Decimal::MAX,
            ..Default::default()
        };
        let a = assess_health(&m);
        assert!(a.health_score >= dec!(0) && a.health_score <= dec!(100));
    }

    #[test]
    fn test_risk_band_boundaries() {
        assert_eq!(RiskBand::from_score(dec!(70)), RiskBand::Safe);
        assert_eq!(RiskBand::from_score(dec!(69.99)), RiskBand::Watch);
        assert_eq!(RiskBand::from_score(dec!(40)), RiskBand::Watch);
        assert_eq!(RiskBand::from_score(dec!(39.99)), RiskBand::Critical);
    }

    #[test]
    fn test_current_ratio_above_ideal_is_penalised() {
        assert_eq!(ideal_ratio_curve(dec!(2), IDEAL_CURRENT_RATIO), dec!(100));
        assert_eq!(ideal_ratio_curve(dec!(3), IDEAL_CURRENT_RATIO), dec!(80));
        assert_eq!(ideal_ratio_curve(dec!(10), IDEAL_CURRENT_RATIO), dec!(0));
    }
}

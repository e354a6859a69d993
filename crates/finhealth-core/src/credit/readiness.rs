use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::analysis::metrics::MetricsSet;
use crate::math::{bounded, round2};
use crate::types::*;

const FINANCIAL_HEALTH_CAP: Decimal = dec!(40);
const DEBT_CAPACITY_CAP: Decimal = dec!(25);
const CASH_FLOW_CAP: Decimal = dec!(20);
const PROFITABILITY_CAP: Decimal = dec!(15);

/// Interest coverage at which debt capacity is maxed out.
const TARGET_INTEREST_COVERAGE: Decimal = dec!(5);

const BASE_SUITABILITY: Decimal = dec!(50);
const RECOMMENDED_SUITABILITY: Decimal = dec!(70);
const MAX_OPTIONS: usize = 4;

// ---------------------------------------------------------------------------
// Product catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    WorkingCapital,
    TermLoan,
    InvoiceFinancing,
    EquipmentLoan,
    CreditLine,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancingProduct {
    pub id: u32,
    pub provider: &'static str,
    pub product: &'static str,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub min_score: Score,
    pub interest_rate: &'static str,
    pub max_amount: Money,
    pub tenure: &'static str,
    pub features: [&'static str; 3],
}

pub static FINANCING_PRODUCTS: [FinancingProduct; 5] = [
    FinancingProduct {
        id: 1,
        provider: "ABC Bank",
        product: "Working Capital Loan",
        product_type: ProductType::WorkingCapital,
        min_score: dec!(60),
        interest_rate: "10-12%",
        max_amount: dec!(5000000),
        tenure: "12-36 months",
        features: ["Quick disbursement", "Flexible repayment", "No collateral up to 2L"],
    },
    FinancingProduct {
        id: 2,
        provider: "XYZ NBFC",
        product: "Business Term Loan",
        product_type: ProductType::TermLoan,
        min_score: dec!(50),
        interest_rate: "12-15%",
        max_amount: dec!(10000000),
        tenure: "24-60 months",
        features: ["Longer tenure", "Fixed interest rate", "Business expansion"],
    },
    FinancingProduct {
        id: 3,
        provider: "QuickFin",
        product: "Invoice Financing",
        product_type: ProductType::InvoiceFinancing,
        min_score: dec!(55),
        interest_rate: "1-2% per month",
        max_amount: dec!(2000000),
        tenure: "30-90 days",
        features: ["Instant liquidity", "Based on receivables", "No fixed EMI"],
    },
    FinancingProduct {
        id: 4,
        provider: "Growth Capital",
        product: "Equipment Financing",
        product_type: ProductType::EquipmentLoan,
        min_score: dec!(65),
        interest_rate: "11-13%",
        max_amount: dec!(7500000),
        tenure: "36-60 months",
        features: ["Asset-backed", "Tax benefits", "Up to 90% funding"],
    },
    FinancingProduct {
        id: 5,
        provider: "SME Finance Co",
        product: "Emergency Credit Line",
        product_type: ProductType::CreditLine,
        min_score: dec!(40),
        interest_rate: "14-18%",
        max_amount: dec!(1000000),
        tenure: "6-12 months",
        features: ["Quick approval", "Emergency funding", "Minimal documentation"],
    },
];

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditReadinessInput {
    pub health_score: Score,
    pub metrics: MetricsSet,
    /// Receivables days of the underlying record; drives the invoice
    /// financing bonus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receivables_days: Option<Days>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ReadinessLevel {
    pub fn from_score(score: Score) -> Self {
        if score >= dec!(75) {
            Self::Excellent
        } else if score >= dec!(60) {
            Self::Good
        } else if score >= dec!(45) {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => {
                "Strong credit profile. Eligible for premium financing options with favorable terms."
            }
            Self::Good => {
                "Solid credit profile. Eligible for most financing options with competitive rates."
            }
            Self::Fair => {
                "Moderate credit profile. Some financing options available, may need to improve metrics."
            }
            Self::Poor => {
                "Weak credit profile. Limited options available. Focus on improving financial health first."
            }
        }
    }

    pub fn next_steps(&self) -> &'static [&'static str] {
        match self {
            Self::Excellent => &[
                "Compare financing options and negotiate terms",
                "Prepare required documentation",
                "Consider multiple lenders for best rates",
            ],
            Self::Good => &[
                "Review financing options carefully",
                "Prepare financial statements and business plan",
                "Consider improving metrics for better terms",
            ],
            Self::Fair => &[
                "Focus on improving cash flow and profitability",
                "Reduce debt levels if possible",
                "Consider alternative financing options",
                "Build relationship with potential lenders",
            ],
            Self::Poor => &[
                "Prioritize improving financial health",
                "Implement cost reduction strategies",
                "Improve cash flow management",
                "Delay financing until metrics improve",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditComponents {
    pub financial_health: Score,
    pub debt_capacity: Score,
    pub cash_flow_stability: Score,
    pub profitability: Score,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancingOption {
    #[serde(flatten)]
    pub product: FinancingProduct,
    pub suitability_score: Score,
    pub recommended: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditAssessment {
    pub credit_readiness_score: Score,
    pub readiness_level: ReadinessLevel,
    pub description: String,
    pub components: CreditComponents,
    pub recommended_financing: Vec<FinancingOption>,
    pub next_steps: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Credit-readiness score, level and ranked financing options.
pub fn assess_credit_readiness(input: &CreditReadinessInput) -> ComputationOutput<CreditAssessment> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    if input.health_score < Decimal::ZERO || input.health_score > dec!(100) {
        warnings.push(format!(
            "Health score {} is outside 0-100; components are still capped",
            input.health_score
        ));
    }

    let assessment = assess(input);
    if assessment.recommended_financing.is_empty() {
        warnings.push("No financing product is available at this credit readiness score".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Credit readiness: four capped components (40/25/20/15) plus suitability-ranked product catalog",
        &serde_json::json!({
            "component_caps": {
                "financial_health": FINANCIAL_HEALTH_CAP.to_string(),
                "debt_capacity": DEBT_CAPACITY_CAP.to_string(),
                "cash_flow_stability": CASH_FLOW_CAP.to_string(),
                "profitability": PROFITABILITY_CAP.to_string(),
            },
            "level_thresholds": { "excellent": 75, "good": 60, "fair": 45 },
            "recommended_suitability": RECOMMENDED_SUITABILITY.to_string(),
            "max_options": MAX_OPTIONS,
        }),
        warnings,
        elapsed,
        assessment,
    )
}

pub(crate) fn assess(input: &CreditReadinessInput) -> CreditAssessment {
    let m = &input.metrics;

    let financial_health = (bounded(input.health_score) / dec!(100) * FINANCIAL_HEALTH_CAP)
        .min(FINANCIAL_HEALTH_CAP);
    let debt_capacity = if m.interest_coverage > Decimal::ZERO {
        (bounded(m.interest_coverage) / TARGET_INTEREST_COVERAGE * DEBT_CAPACITY_CAP)
            .min(DEBT_CAPACITY_CAP)
    } else {
        Decimal::ZERO
    };
    let cash_flow_stability = ((bounded(m.cash_flow_margin) + dec!(5)) * dec!(2))
        .max(Decimal::ZERO)
        .min(CASH_FLOW_CAP);
    let profitability = ((bounded(m.net_profit_margin) + dec!(5)) * dec!(1.5))
        .max(Decimal::ZERO)
        .min(PROFITABILITY_CAP);

    let credit_score =
        round2(financial_health + debt_capacity + cash_flow_stability + profitability);
    let level = ReadinessLevel::from_score(credit_score);

    let mut options: Vec<FinancingOption> = FINANCING_PRODUCTS
        .iter()
        .filter(|p| credit_score >= p.min_score)
        .map(|p| {
            let suitability = suitability(p, input);
            FinancingOption {
                product: p.clone(),
                suitability_score: suitability,
                recommended: suitability >= RECOMMENDED_SUITABILITY,
            }
        })
        .collect();
    // Stable: equal suitability keeps catalog order.
    options.sort_by(|a, b| b.suitability_score.cmp(&a.suitability_score));
    options.truncate(MAX_OPTIONS);

    tracing::debug!(
        credit_score = %credit_score,
        options = options.len(),
        "credit readiness assessed"
    );

    CreditAssessment {
        credit_readiness_score: credit_score,
        readiness_level: level,
        description: level.description().to_string(),
        components: CreditComponents {
            financial_health: round2(financial_health),
            debt_capacity: round2(debt_capacity),
            cash_flow_stability: round2(cash_flow_stability),
            profitability: round2(profitability),
        },
        recommended_financing: options,
        next_steps: level.next_steps().iter().map(|s| s.to_string()).collect(),
    }
}

fn suitability(product: &FinancingProduct, input: &CreditReadinessInput) -> Score {
    let health = bounded(input.health_score);
    let mut score = BASE_SUITABILITY;

    if health >= product.min_score + dec!(20) {
        score += dec!(30);
    } else if health >= product.min_score + dec!(10) {
        score += dec!(20);
    } else if health >= product.min_score {
        score += dec!(10);
    }

    let receivables_days = input.receivables_days.unwrap_or(Decimal::ZERO);
    match product.product_type {
        ProductType::WorkingCapital if input.metrics.current_ratio < dec!(1.5) => {
            score += dec!(20)
        }
        ProductType::InvoiceFinancing if receivables_days > dec!(45) => score += dec!(15),
        ProductType::CreditLine if health < dec!(50) => score += dec!(10),
        _ => {}
    }

    score.min(dec!(100))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reference_input() -> CreditReadinessInput {
        CreditReadinessInput {
            health_score: dec!(66.91),
            metrics: MetricsSet {
                current_ratio: dec!(1.67),
                quick_ratio: dec!(1.33),
                net_profit_margin: dec!(5),
                cash_flow_margin: dec!(8),
                cash_flow_coverage: dec!(0.53),
                cash_conversion_cycle: dec!(45),
                debt_to_equity: dec!(0.5),
                ..Default::default()
            },
            receivables_days: Some(dec!(45)),
        }
    }

    #[test]
    fn test_reference_components() {
        let a = assess(&reference_input());
        assert_eq!(a.components.financial_health, dec!(26.76));
        assert_eq!(a.components.debt_capacity, dec!(0));
        assert_eq!(a.components.cash_flow_stability, dec!(20));
        assert_eq!(a.components.profitability, dec!(15));
        assert_eq!(a.credit_readiness_score, dec!(61.76));
        assert_eq!(a.readiness_level, ReadinessLevel::Good);
        assert_eq!(a.next_steps.len(), 3);
    }

    #[test]
    fn test_reference_financing_ranking() {
        let a = assess(&reference_input());
        let products: Vec<&str> = a
            .recommended_financing
            .iter()
            .map(|o| o.product.product)
            .collect();
        assert_eq!(
            products,
            vec![
                "Emergency Credit Line",
                "Business Term Loan",
                "Invoice Financing",
                "Working Capital Loan"
            ]
        );
        let scores: Vec<Decimal> = a
            .recommended_financing
            .iter()
            .map(|o| o.suitability_score)
            .collect();
        assert_eq!(scores, vec![dec!(80), dec!(70), dec!(70), dec!(60)]);
        assert!(a.recommended_financing[2].recommended);
        assert!(!a.recommended_financing[3].recommended);
    }

    #[test]
    fn test_components_are_capped() {
        let input = CreditReadinessInput {
            health_score: dec!(150),
            metrics: MetricsSet {
                interest_coverage: dec!(50),
                cash_flow_margin: dec!(90),
                net_profit_margin: dec!(90),
                ..Default::default()
            },
            receivables_days: None,
        };
        let a = assess(&input);
        assert_eq!(a.credit_readiness_score, dec!(100));
        assert_eq!(a.readiness_level, ReadinessLevel::Excellent);
        assert_eq!(a.recommended_financing.len(), MAX_OPTIONS);
        assert!(a
            .recommended_financing
            .iter()
            .all(|o| o.suitability_score <= dec!(100)));
    }

    #[test]
    fn test_extreme_metrics_saturate_components() {
        let input = CreditReadinessInput {
            health_score: Decimal::MAX,
            metrics: MetricsSet {
                interest_coverage: Decimal::MAX,
                cash_flow_margin: Decimal::MIN,
                net_profit_margin: Decimal::MAX,
                ..Default::default()
            },
            receivables_days: None,
        };
        let a = assess(&input);
        assert_eq!(a.components.debt_capacity, DEBT_CAPACITY_CAP);
        assert_eq!(a.components.cash_flow_stability, dec!(0));
        assert_eq!(a.components.profitability, PROFITABILITY_CAP);
    }

    #[test]
    fn test_poor_profile_gets_no_products() {
        let input = CreditReadinessInput {
            health_score: dec!(20),
            metrics: MetricsSet {
                cash_flow_margin: dec!(-10),
                net_profit_margin: dec!(-10),
                ..Default::default()
            },
            receivables_days: None,
        };
        let out = assess_credit_readiness(&input);
        assert_eq!(out.result.credit_readiness_score, dec!(8));
        assert_eq!(out.result.readiness_level, ReadinessLevel::Poor);
        assert!(out.result.recommended_financing.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_business_need_bonuses() {
        let mut input = reference_input();
        input.metrics.current_ratio = dec!(1.2);
        input.receivables_days = Some(dec!(60));
        let a = assess(&input);
        let wc = a
            .recommended_financing
            .iter()
            .find(|o| o.product.product_type == ProductType::WorkingCapital)
            .unwrap();
        assert_eq!(wc.suitability_score, dec!(80));
        let invoice = a
            .recommended_financing
            .iter()
            .find(|o| o.product.product_type == ProductType::InvoiceFinancing)
            .unwrap();
        assert_eq!(invoice.suitability_score, dec!(85));
    }
}

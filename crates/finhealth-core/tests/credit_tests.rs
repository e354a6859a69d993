use finhealth_core::analysis::{health, metrics};
use finhealth_core::credit::readiness::{
    assess_credit_readiness, CreditReadinessInput, ProductType, ReadinessLevel,
    FINANCING_PRODUCTS,
};
use finhealth_core::FinancialRecord;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Credit readiness from a raw record
// ===========================================================================

fn reference_record() -> FinancialRecord {
    FinancialRecord {
        revenue: dec!(1000000),
        current_assets: dec!(250000),
        current_liabilities: dec!(150000),
        inventory: dec!(50000),
        net_profit: dec!(50000),
        total_debt: dec!(100000),
        equity: dec!(200000),
        operating_cash_flow: dec!(80000),
        ..Default::default()
    }
}

fn readiness_input(record: &FinancialRecord) -> CreditReadinessInput {
    let m = metrics::derive_metrics(record);
    let h = health::assess_health(&m);
    CreditReadinessInput {
        health_score: h.health_score,
        metrics: m,
        receivables_days: Some(record.receivables_days),
    }
}

#[test]
fn test_reference_record_is_good() {
    let out = assess_credit_readiness(&readiness_input(&reference_record()));
    let a = out.result;
    assert_eq!(a.credit_readiness_score, dec!(61.76));
    assert_eq!(a.readiness_level, ReadinessLevel::Good);
    assert_eq!(a.recommended_financing.len(), 4);
    assert_eq!(a.recommended_financing[0].product.product, "Emergency Credit Line");
}

#[test]
fn test_reference_components_sum_to_score() {
    let a = assess_credit_readiness(&readiness_input(&reference_record())).result;
    let sum = a.components.financial_health
        + a.components.debt_capacity
        + a.components.cash_flow_stability
        + a.components.profitability;
    assert_eq!(sum, a.credit_readiness_score);
}

#[test]
fn test_recommended_products_meet_their_minimum() {
    let a = assess_credit_readiness(&readiness_input(&reference_record())).result;
    for option in &a.recommended_financing {
        assert!(a.credit_readiness_score >= option.product.min_score);
        assert!(option.suitability_score <= dec!(100));
    }
    let ranked: Vec<Decimal> = a
        .recommended_financing
        .iter()
        .map(|o| o.suitability_score)
        .collect();
    let mut sorted = ranked.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(ranked, sorted);
}

#[test]
fn test_catalog_shape() {
    assert_eq!(FINANCING_PRODUCTS.len(), 5);
    let equipment = FINANCING_PRODUCTS
        .iter()
        .find(|p| p.product_type == ProductType::EquipmentLoan)
        .unwrap();
    assert_eq!(equipment.min_score, dec!(65));
}

#[test]
fn test_serialized_option_flattens_product() {
    let a = assess_credit_readiness(&readiness_input(&reference_record())).result;
    let json = serde_json::to_value(&a.recommended_financing[0]).unwrap();
    assert!(json.get("provider").is_some());
    assert!(json.get("type").is_some());
    assert!(json.get("suitability_score").is_some());
}

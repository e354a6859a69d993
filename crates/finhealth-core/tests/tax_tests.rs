use chrono::NaiveDate;
use finhealth_core::tax::compliance::{
    assess_filing_readiness, check_compliance, identify_penalty_risks, validate_deductions,
    CheckStatus, ComplianceInput, ComplianceStatus, DeductionClaim, DeductionClaimsInput,
    FilingReadinessInput, PenaltyRiskInput, ReadinessStatus, REQUIRED_DOCUMENTS,
};
use finhealth_core::tax::compliance::suggest_tax_optimizations;
use finhealth_core::tax::gst::{calculate_gst_liability, gst_rate_for_category, GstLiabilityInput};
use finhealth_core::tax::rules::{calculate_income_tax, Country, IncomeTaxInput};
use finhealth_core::FinancialRecord;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

// ===========================================================================
// Income tax
// ===========================================================================

#[test]
fn test_income_tax_breakdown_sums_to_total() {
    let out = calculate_income_tax(&IncomeTaxInput {
        income: dec!(2000000),
        country: "IN".into(),
    });
    let r = out.result;
    assert_eq!(r.total_tax, dec!(290000));
    let sum = r
        .breakdown
        .iter()
        .fold(rust_decimal::Decimal::ZERO, |acc, s| acc + s.tax);
    assert_eq!(sum, r.total_tax);
    assert_eq!(r.effective_rate, dec!(14.5));
}

#[test]
fn test_unknown_country_falls_back_to_india() {
    let out = calculate_income_tax(&IncomeTaxInput {
        income: dec!(1000000),
        country: "FR".into(),
    });
    assert_eq!(out.result.country, Country::India);
    assert_eq!(out.result.total_tax, dec!(50000));
    assert_eq!(out.warnings.len(), 1);
}

// ===========================================================================
// Compliance
// ===========================================================================

#[test]
fn test_clean_small_business_is_compliant() {
    let record = FinancialRecord {
        revenue: dec!(1500000),
        operating_expenses: dec!(300000),
        net_profit: dec!(-5000),
        ..Default::default()
    };
    let r = check_compliance(&ComplianceInput {
        record,
        gst_collected: false,
        as_of: NaiveDate::from_ymd_opt(2024, 2, 1),
    })
    .result;
    assert_eq!(r.compliance_score, 100);
    assert_eq!(r.overall_status, ComplianceStatus::Compliant);
    assert!(r.issues.is_empty());
    assert_eq!(r.recommendations.len(), 1);
    assert_eq!(r.recommendations[0].title, "Maintain Compliance Records");
    let names: Vec<&str> = r
        .checks_performed
        .iter()
        .map(|c| c.check_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "TDS Compliance",
            "GST Compliance",
            "Income Tax Compliance",
            "Filing Deadlines"
        ]
    );
    assert_eq!(r.checks_performed[3].status, CheckStatus::Compliant);
}

#[test]
fn test_close_gst_deadline_is_recorded_as_a_check() {
    let r = check_compliance(&ComplianceInput {
        record: FinancialRecord::default(),
        gst_collected: false,
        as_of: NaiveDate::from_ymd_opt(2024, 2, 15),
    })
    .result;
    assert_eq!(r.compliance_score, 90);
    assert_eq!(r.deadline_warnings.len(), 1);
    let deadlines = &r.checks_performed[3];
    assert_eq!(deadlines.check_name, "Filing Deadlines");
    assert_eq!(deadlines.status, CheckStatus::ReviewRequired);
    assert_eq!(deadlines.details["warnings"], serde_json::json!(1));
    assert_eq!(
        deadlines.details["upcoming_deadlines"][0]["days_remaining"],
        serde_json::json!(5)
    );
}

#[test]
fn test_registered_gst_collector_passes_gst_check() {
    let record = FinancialRecord {
        revenue: dec!(6000000),
        ..Default::default()
    };
    let r = check_compliance(&ComplianceInput {
        record,
        gst_collected: true,
        as_of: NaiveDate::from_ymd_opt(2024, 2, 1),
    })
    .result;
    assert_eq!(r.compliance_score, 100);
    assert_eq!(
        r.checks_performed[1].details["gst_registration_required"],
        serde_json::json!(true)
    );
}

#[test]
fn test_compliance_input_from_json() {
    let json = r#"{
        "record": { "revenue": 5000000, "operating_expenses": 100000, "net_profit": 10000 },
        "as_of": "2024-01-05"
    }"#;
    let input: ComplianceInput = serde_json::from_str(json).unwrap();
    assert!(!input.gst_collected);
    let r = check_compliance(&input).result;
    assert_eq!(r.compliance_score, 80);
    assert_eq!(r.overall_status, ComplianceStatus::Compliant);
    assert_eq!(r.issues.len(), 1);
}

// ===========================================================================
// Deductions, penalties, readiness
// ===========================================================================

#[test]
fn test_deduction_limits_at_boundary() {
    let r = validate_deductions(&DeductionClaimsInput {
        claims: vec![
            DeductionClaim {
                section: "24b".into(),
                amount: dec!(200000),
            },
            DeductionClaim {
                section: "80TTA".into(),
                amount: dec!(10001),
            },
        ],
    })
    .unwrap()
    .result;
    assert!(r.deduction_details[0].is_valid);
    assert!(!r.deduction_details[1].is_valid);
    assert_eq!(r.valid_deductions, dec!(200000));
    assert_eq!(r.invalid_deductions, dec!(10001));
}

#[test]
fn test_clean_profile_has_no_penalty_risks() {
    let risks = identify_penalty_risks(&PenaltyRiskInput {
        record: FinancialRecord {
            revenue: dec!(5000000),
            operating_expenses: dec!(400000),
            net_profit: dec!(200000),
            ..Default::default()
        },
        gst_registered: true,
        late_filings: 0,
    })
    .result;
    assert!(risks.is_empty());
}

#[test]
fn test_filing_readiness_counts_missing_documents() {
    let r = assess_filing_readiness(&FilingReadinessInput {
        record: FinancialRecord {
            revenue: dec!(900000),
            operating_expenses: dec!(200000),
            net_profit: dec!(0),
            ..Default::default()
        },
        documents: vec![REQUIRED_DOCUMENTS[0].to_string(), "Unrelated".into()],
    })
    .result;
    // Five missing documents and a zero net profit.
    assert_eq!(r.readiness_score, 100 - 5 * 15 - 10);
    assert_eq!(r.status, ReadinessStatus::NotReady);
    assert_eq!(r.missing_items.len(), 5);
    assert_eq!(r.warnings, vec!["Missing or zero value for net_profit".to_string()]);
}

// ===========================================================================
// Optimisation and GST
// ===========================================================================

#[test]
fn test_optimisations_for_profitable_business() {
    let record: FinancialRecord = serde_json::from_str(r#"{ "net_profit": 120000 }"#).unwrap();
    let out = suggest_tax_optimizations(&record);
    let strategies: Vec<&str> = out.result.iter().map(|o| o.strategy.as_str()).collect();
    assert_eq!(
        strategies,
        vec![
            "Maximize Section 80C Deductions",
            "Claim All Business Expenses",
            "Claim Depreciation on Assets"
        ]
    );
    assert_eq!(out.result[0].potential_saving, Some(dec!(36000)));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_gst_liability_from_json_with_category() {
    let input: GstLiabilityInput = serde_json::from_str(
        r#"{ "record": { "revenue": 1280000 }, "category": "luxury_goods" }"#,
    )
    .unwrap();
    let out = calculate_gst_liability(&input).unwrap();
    assert_eq!(out.result.gst_rate, dec!(28));
    assert_eq!(out.result.taxable_value, dec!(1000000));
    assert_eq!(out.result.cgst + out.result.sgst, out.result.total_gst);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_gst_liability_unknown_category_warns() {
    let out = calculate_gst_liability(&GstLiabilityInput {
        record: FinancialRecord {
            revenue: dec!(118),
            ..Default::default()
        },
        gst_rate: None,
        category: Some("widgets".into()),
    })
    .unwrap();
    assert_eq!(out.result.total_gst, dec!(18));
    assert_eq!(out.warnings.len(), 1);
    assert!(gst_rate_for_category("widgets").result.standard_rate_applied);
}

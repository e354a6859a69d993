use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::rules::{
    find_deduction, ADVANCE_TAX_THRESHOLD, CORPORATE_TAX_RATE, GST_REGISTRATION_THRESHOLD,
    GST_STANDARD_RATE, TDS_RATE, TDS_REVIEW_THRESHOLD,
};
use crate::math::{ratio_or_zero, round2};
use crate::types::*;
use crate::{FinHealthError, FinHealthResult};

const GST_FILING_DAY: u32 = 20;
const GST_WARNING_DAYS: i64 = 7;
const ITR_WARNING_DAYS: i64 = 30;

const CHECK_PENALTY: i32 = 20;
const DEADLINE_PENALTY: i32 = 10;
const MISSING_DOCUMENT_PENALTY: i32 = 15;
const MISSING_FIELD_PENALTY: i32 = 10;

pub const REQUIRED_DOCUMENTS: [&str; 6] = [
    "Financial Statements (P&L, Balance Sheet)",
    "Bank Statements",
    "GST Returns (if applicable)",
    "TDS Certificates",
    "Investment Proofs (for deductions)",
    "Previous Year Tax Return",
];

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Compliant,
    #[serde(rename = "Review Required")]
    ReviewRequired,
    #[serde(rename = "Non-Compliant")]
    NonCompliant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceIssue {
    pub severity: Severity,
    pub description: String,
    pub action: String,
}

// ---------------------------------------------------------------------------
// Compliance check
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceInput {
    pub record: FinancialRecord,
    #[serde(default)]
    pub gst_collected: bool,
    /// Reference date for deadline checks; today (UTC) when absent.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub check_name: String,
    pub status: CheckStatus,
    pub issues: Vec<ComplianceIssue>,
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineWarning {
    pub severity: Severity,
    pub description: String,
    pub deadline: NaiveDate,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingDeadline {
    pub filing: String,
    pub deadline: NaiveDate,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    Compliant,
    #[serde(rename = "Partially Compliant")]
    PartiallyCompliant,
    #[serde(rename = "Non-Compliant")]
    NonCompliant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceRecommendation {
    pub priority: Severity,
    pub title: String,
    pub description: String,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub overall_status: ComplianceStatus,
    pub compliance_score: i32,
    pub issues: Vec<ComplianceIssue>,
    pub deadline_warnings: Vec<DeadlineWarning>,
    pub upcoming_deadlines: Vec<UpcomingDeadline>,
    pub checks_performed: Vec<ComplianceCheck>,
    pub recommendations: Vec<ComplianceRecommendation>,
}

/// Run the TDS, GST, income-tax and filing-deadline checks.
///
/// The score starts at 100 and loses 20 per failed check and 10 when any
/// deadline is close.
pub fn check_compliance(input: &ComplianceInput) -> ComputationOutput<ComplianceReport> {
    let start = Instant::now();
    let as_of = input.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let record = &input.record;

    let mut checks = vec![
        tds_check(record),
        gst_check(record, input.gst_collected),
        income_tax_check(record),
    ];

    let mut score = 100;
    let mut issues = Vec::new();
    for check in &checks {
        if check.status != CheckStatus::Compliant {
            score -= CHECK_PENALTY;
            issues.extend(check.issues.iter().cloned());
        }
    }

    let (deadline_warnings, upcoming_deadlines) = deadline_check(as_of);
    if !deadline_warnings.is_empty() {
        score -= DEADLINE_PENALTY;
    }
    checks.push(ComplianceCheck {
        check_name: "Filing Deadlines".into(),
        status: if deadline_warnings.is_empty() {
            CheckStatus::Compliant
        } else {
            CheckStatus::ReviewRequired
        },
        issues: Vec::new(),
        details: serde_json::json!({
            "warnings": deadline_warnings.len(),
            "upcoming_deadlines": &upcoming_deadlines,
        }),
    });

    let overall_status = if score >= 80 {
        ComplianceStatus::Compliant
    } else if score >= 60 {
        ComplianceStatus::PartiallyCompliant
    } else {
        ComplianceStatus::NonCompliant
    };
    tracing::debug!(score, status = ?overall_status, "tax compliance checked");

    let recommendations = compliance_recommendations(&issues, &deadline_warnings);
    let report = ComplianceReport {
        overall_status,
        compliance_score: score,
        issues,
        deadline_warnings,
        upcoming_deadlines,
        checks_performed: checks,
        recommendations,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Rule-based tax compliance scoring (IN): TDS, GST, advance tax, filing deadlines",
        &serde_json::json!({
            "as_of": as_of,
            "tds_review_threshold": TDS_REVIEW_THRESHOLD.to_string(),
            "gst_registration_threshold": GST_REGISTRATION_THRESHOLD.to_string(),
            "corporate_tax_rate": CORPORATE_TAX_RATE.to_string(),
            "advance_tax_threshold": ADVANCE_TAX_THRESHOLD.to_string(),
        }),
        Vec::new(),
        elapsed,
        report,
    )
}

fn tds_check(record: &FinancialRecord) -> ComplianceCheck {
    let opex = record.operating_expenses;
    if opex > TDS_REVIEW_THRESHOLD {
        ComplianceCheck {
            check_name: "TDS Compliance".into(),
            status: CheckStatus::ReviewRequired,
            issues: vec![ComplianceIssue {
                severity: Severity::Medium,
                description: format!(
                    "Operating expenses exceed {TDS_REVIEW_THRESHOLD}. Ensure TDS is deducted on applicable payments."
                ),
                action: "Review TDS deductions on rent, professional fees, and contractor payments"
                    .into(),
            }],
            details: serde_json::json!({
                "tds_applicable": true,
                "estimated_tds": round2(opex * TDS_RATE),
            }),
        }
    } else {
        ComplianceCheck {
            check_name: "TDS Compliance".into(),
            status: CheckStatus::Compliant,
            issues: Vec::new(),
            details: serde_json::json!({ "tds_applicable": false }),
        }
    }
}

fn gst_check(record: &FinancialRecord, gst_collected: bool) -> ComplianceCheck {
    let revenue = record.revenue;
    if revenue > GST_REGISTRATION_THRESHOLD {
        let (status, issues) = if gst_collected {
            (CheckStatus::Compliant, Vec::new())
        } else {
            (
                CheckStatus::NonCompliant,
                vec![ComplianceIssue {
                    severity: Severity::High,
                    description: format!(
                        "Revenue exceeds GST threshold of {GST_REGISTRATION_THRESHOLD}. GST registration is mandatory."
                    ),
                    action: "Register for GST immediately and start collecting GST on sales".into(),
                }],
            )
        };
        ComplianceCheck {
            check_name: "GST Compliance".into(),
            status,
            issues,
            details: serde_json::json!({
                "gst_registration_required": true,
                "estimated_gst_liability": round2(revenue * GST_STANDARD_RATE),
            }),
        }
    } else {
        ComplianceCheck {
            check_name: "GST Compliance".into(),
            status: CheckStatus::Compliant,
            issues: Vec::new(),
            details: serde_json::json!({
                "gst_registration_required": false,
                "threshold_remaining": GST_REGISTRATION_THRESHOLD - revenue,
            }),
        }
    }
}

fn income_tax_check(record: &FinancialRecord) -> ComplianceCheck {
    let profit = record.net_profit;
    if profit <= Decimal::ZERO {
        return ComplianceCheck {
            check_name: "Income Tax Compliance".into(),
            status: CheckStatus::Compliant,
            issues: Vec::new(),
            details: serde_json::json!({
                "tax_liability": Decimal::ZERO,
                "loss_carried_forward": profit.abs(),
            }),
        };
    }

    let liability = round2(profit * CORPORATE_TAX_RATE);
    let mut check = ComplianceCheck {
        check_name: "Income Tax Compliance".into(),
        status: CheckStatus::Compliant,
        issues: Vec::new(),
        details: serde_json::json!({
            "estimated_tax_liability": liability,
            "effective_tax_rate": round2(ratio_or_zero(liability, profit) * dec!(100)),
        }),
    };
    if liability > ADVANCE_TAX_THRESHOLD {
        check.status = CheckStatus::ReviewRequired;
        check.issues.push(ComplianceIssue {
            severity: Severity::Medium,
            description: format!(
                "Estimated tax liability is {}. Advance tax payment required.",
                liability.round_dp(0)
            ),
            action: "Pay advance tax in quarterly installments to avoid interest".into(),
        });
    }
    check
}

/// GSTR-3B falls on the 20th; the ITR on July 31.
fn deadline_check(as_of: NaiveDate) -> (Vec<DeadlineWarning>, Vec<UpcomingDeadline>) {
    let mut warnings = Vec::new();
    let mut upcoming = Vec::new();

    if let Some(gst_deadline) = next_gst_deadline(as_of) {
        let days = (gst_deadline - as_of).num_days();
        if days <= GST_WARNING_DAYS {
            warnings.push(DeadlineWarning {
                severity: Severity::High,
                description: format!("GST return filing due in {days} days"),
                deadline: gst_deadline,
                action: "Prepare and file GSTR-3B immediately".into(),
            });
        }
        upcoming.push(UpcomingDeadline {
            filing: "GST Return (GSTR-3B)".into(),
            deadline: gst_deadline,
            days_remaining: days,
        });
    }

    let itr_year = if as_of.month() > 7 {
        as_of.year() + 1
    } else {
        as_of.year()
    };
    if let Some(itr_deadline) = NaiveDate::from_ymd_opt(itr_year, 7, 31) {
        let days = (itr_deadline - as_of).num_days();
        if days > 0 && days <= ITR_WARNING_DAYS {
            warnings.push(DeadlineWarning {
                severity: Severity::Medium,
                description: format!("Income Tax Return filing due in {days} days"),
                deadline: itr_deadline,
                action: "Prepare financial statements and file ITR".into(),
            });
        }
        upcoming.push(UpcomingDeadline {
            filing: "Income Tax Return".into(),
            deadline: itr_deadline,
            days_remaining: days,
        });
    }

    (warnings, upcoming)
}

fn next_gst_deadline(as_of: NaiveDate) -> Option<NaiveDate> {
    if as_of.day() <= GST_FILING_DAY {
        NaiveDate::from_ymd_opt(as_of.year(), as_of.month(), GST_FILING_DAY)
    } else if as_of.month() == 12 {
        NaiveDate::from_ymd_opt(as_of.year() + 1, 1, GST_FILING_DAY)
    } else {
        NaiveDate::from_ymd_opt(as_of.year(), as_of.month() + 1, GST_FILING_DAY)
    }
}

fn compliance_recommendations(
    issues: &[ComplianceIssue],
    deadlines: &[DeadlineWarning],
) -> Vec<ComplianceRecommendation> {
    let mut recs = Vec::new();

    let actions_for = |severity: Severity| -> Vec<String> {
        issues
            .iter()
            .filter(|i| i.severity == severity)
            .map(|i| i.action.clone())
            .collect()
    };

    let high = actions_for(Severity::High);
    if !high.is_empty() {
        recs.push(ComplianceRecommendation {
            priority: Severity::High,
            title: "Address Critical Compliance Issues".into(),
            description: format!(
                "You have {} critical compliance issue(s) that need immediate attention.",
                high.len()
            ),
            actions: high,
        });
    }

    let medium = actions_for(Severity::Medium);
    if !medium.is_empty() {
        recs.push(ComplianceRecommendation {
            priority: Severity::Medium,
            title: "Review Tax Obligations".into(),
            description: format!("You have {} tax obligation(s) to review.", medium.len()),
            actions: medium,
        });
    }

    if !deadlines.is_empty() {
        recs.push(ComplianceRecommendation {
            priority: Severity::High,
            title: "Upcoming Filing Deadlines".into(),
            description: format!("You have {} upcoming deadline(s).", deadlines.len()),
            actions: deadlines.iter().map(|d| d.action.clone()).collect(),
        });
    }

    recs.push(ComplianceRecommendation {
        priority: Severity::Low,
        title: "Maintain Compliance Records".into(),
        description: "Keep all tax-related documents organized and accessible.".into(),
        actions: vec![
            "Maintain digital copies of all invoices".into(),
            "Keep bank statements for at least 7 years".into(),
            "Document all business expenses with receipts".into(),
            "Maintain a tax calendar for deadlines".into(),
        ],
    });

    recs
}

// ---------------------------------------------------------------------------
// Deduction validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionClaim {
    pub section: String,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionClaimsInput {
    pub claims: Vec<DeductionClaim>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionCheck {
    pub section: String,
    pub amount: Money,
    pub is_valid: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionValidation {
    pub total_deductions: Money,
    pub valid_deductions: Money,
    pub invalid_deductions: Money,
    pub deduction_details: Vec<DeductionCheck>,
}

/// Check each claim against the section table and its statutory limit.
pub fn validate_deductions(
    input: &DeductionClaimsInput,
) -> FinHealthResult<ComputationOutput<DeductionValidation>> {
    let start = Instant::now();

    if let Some(bad) = input.claims.iter().find(|c| c.amount < Decimal::ZERO) {
        return Err(FinHealthError::InvalidInput {
            field: format!("claims[{}].amount", bad.section),
            reason: "deduction amounts must not be negative".into(),
        });
    }

    let mut result = DeductionValidation {
        total_deductions: Decimal::ZERO,
        valid_deductions: Decimal::ZERO,
        invalid_deductions: Decimal::ZERO,
        deduction_details: Vec::with_capacity(input.claims.len()),
    };

    for claim in &input.claims {
        let (is_valid, message) = match find_deduction(&claim.section) {
            None => (false, format!("Unknown deduction section: {}", claim.section)),
            Some(rule) => match rule.limit {
                Some(limit) if claim.amount > limit => {
                    (false, format!("Amount exceeds limit of {limit}"))
                }
                _ => (true, format!("Valid deduction under {}", rule.section)),
            },
        };

        result.total_deductions += claim.amount;
        if is_valid {
            result.valid_deductions += claim.amount;
        } else {
            result.invalid_deductions += claim.amount;
        }
        result.deduction_details.push(DeductionCheck {
            section: claim.section.clone(),
            amount: claim.amount,
            is_valid,
            message,
        });
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Deduction validation against IN section limits",
        &serde_json::json!({ "claims": input.claims.len() }),
        Vec::new(),
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Penalty risks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyRiskInput {
    pub record: FinancialRecord,
    #[serde(default)]
    pub gst_registered: bool,
    /// Late filings on record.
    #[serde(default)]
    pub late_filings: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyRisk {
    pub risk_type: String,
    pub severity: Severity,
    pub description: String,
    pub potential_penalty: String,
    pub mitigation: String,
}

pub fn identify_penalty_risks(input: &PenaltyRiskInput) -> ComputationOutput<Vec<PenaltyRisk>> {
    let start = Instant::now();
    let record = &input.record;
    let mut risks = Vec::new();

    if input.late_filings > 0 {
        risks.push(penalty(
            "Late Filing Penalty",
            Severity::High,
            "History of late filings detected",
            "5,000 - 10,000 per return",
            "Set up filing reminders and automate where possible",
        ));
    }
    if record.net_profit < Decimal::ZERO {
        risks.push(penalty(
            "Loss Reporting",
            Severity::Medium,
            "Business showing losses - ensure proper documentation",
            "Scrutiny and potential disallowance of losses",
            "Maintain detailed records of all expenses and business activities",
        ));
    }
    if record.revenue > GST_REGISTRATION_THRESHOLD && !input.gst_registered {
        risks.push(penalty(
            "GST Non-Registration",
            Severity::High,
            "Revenue exceeds GST threshold but not registered",
            "10% of tax amount + interest",
            "Register for GST immediately",
        ));
    }
    if record.operating_expenses > TDS_REVIEW_THRESHOLD {
        risks.push(penalty(
            "TDS Non-Deduction",
            Severity::Medium,
            "High operating expenses - ensure TDS compliance",
            "Interest @ 1% per month + disallowance of expense",
            "Review all payments and deduct TDS where applicable",
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Penalty risk screen: filing history, losses, GST registration, TDS",
        &serde_json::json!({
            "gst_registration_threshold": GST_REGISTRATION_THRESHOLD.to_string(),
            "tds_review_threshold": TDS_REVIEW_THRESHOLD.to_string(),
        }),
        Vec::new(),
        elapsed,
        risks,
    )
}

fn penalty(
    risk_type: &str,
    severity: Severity,
    description: &str,
    potential_penalty: &str,
    mitigation: &str,
) -> PenaltyRisk {
    PenaltyRisk {
        risk_type: risk_type.into(),
        severity,
        description: description.into(),
        potential_penalty: potential_penalty.into(),
        mitigation: mitigation.into(),
    }
}

// ---------------------------------------------------------------------------
// Tax optimisation
// ---------------------------------------------------------------------------

/// 30% of the 150000 Section 80C limit.
const MAX_80C_SAVING: Money = dec!(45000);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxOptimization {
    pub strategy: String,
    /// `None` when the saving depends on what the business spends.
    pub potential_saving: Option<Money>,
    pub description: String,
    pub action: String,
}

/// Deduction and expense strategies for a profitable business.
pub fn suggest_tax_optimizations(
    record: &FinancialRecord,
) -> ComputationOutput<Vec<TaxOptimization>> {
    let start = Instant::now();
    let mut warnings = Vec::new();
    let mut strategies = Vec::new();

    if record.net_profit > Decimal::ZERO {
        let saving =
            round2(record.net_profit.saturating_mul(CORPORATE_TAX_RATE)).min(MAX_80C_SAVING);
        strategies.push(TaxOptimization {
            strategy: "Maximize Section 80C Deductions".into(),
            potential_saving: Some(saving),
            description: format!(
                "Invest in ELSS, PPF, or life insurance to save up to {MAX_80C_SAVING}"
            ),
            action: "Invest 150000 in eligible instruments before March 31".into(),
        });
        strategies.push(TaxOptimization {
            strategy: "Claim All Business Expenses".into(),
            potential_saving: None,
            description: "Ensure all legitimate business expenses are claimed".into(),
            action: "Review and document: travel, meals, office supplies, software subscriptions"
                .into(),
        });
        strategies.push(TaxOptimization {
            strategy: "Claim Depreciation on Assets".into(),
            potential_saving: None,
            description:
                "Claim depreciation on business assets like computers, furniture, vehicles".into(),
            action: "Maintain asset register and claim depreciation as per IT rules".into(),
        });
    } else {
        warnings.push("No taxable profit; no optimisation strategies apply".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Tax optimisation strategies for a profitable business (IN)",
        &serde_json::json!({
            "corporate_tax_rate": CORPORATE_TAX_RATE.to_string(),
            "max_80c_saving": MAX_80C_SAVING.to_string(),
        }),
        warnings,
        elapsed,
        strategies,
    )
}

// ---------------------------------------------------------------------------
// Filing readiness
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingReadinessInput {
    pub record: FinancialRecord,
    /// Names of documents on hand, matched against the required checklist.
    #[serde(default)]
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    Available,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub item: String,
    pub status: DocumentStatus,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessStatus {
    #[serde(rename = "Ready to File")]
    Ready,
    #[serde(rename = "Almost Ready")]
    AlmostReady,
    #[serde(rename = "Not Ready")]
    NotReady,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingReadiness {
    pub is_ready: bool,
    pub readiness_score: i32,
    pub status: ReadinessStatus,
    pub missing_items: Vec<String>,
    pub warnings: Vec<String>,
    pub checklist: Vec<ChecklistItem>,
}

pub fn assess_filing_readiness(input: &FilingReadinessInput) -> ComputationOutput<FilingReadiness> {
    let start = Instant::now();
    let mut score = 100;
    let mut missing_items = Vec::new();
    let mut data_warnings = Vec::new();

    let checklist: Vec<ChecklistItem> = REQUIRED_DOCUMENTS
        .iter()
        .map(|doc| {
            let available = input.documents.iter().any(|d| d == doc);
            if !available {
                missing_items.push(doc.to_string());
                score -= MISSING_DOCUMENT_PENALTY;
            }
            ChecklistItem {
                item: doc.to_string(),
                status: if available {
                    DocumentStatus::Available
                } else {
                    DocumentStatus::Missing
                },
                required: true,
            }
        })
        .collect();

    for (name, value) in [
        ("revenue", input.record.revenue),
        ("operating_expenses", input.record.operating_expenses),
        ("net_profit", input.record.net_profit),
    ] {
        if value.is_zero() {
            data_warnings.push(format!("Missing or zero value for {name}"));
            score -= MISSING_FIELD_PENALTY;
        }
    }

    let status = if score >= 80 {
        ReadinessStatus::Ready
    } else if score >= 60 {
        ReadinessStatus::AlmostReady
    } else {
        ReadinessStatus::NotReady
    };

    let readiness = FilingReadiness {
        is_ready: status == ReadinessStatus::Ready,
        readiness_score: score,
        status,
        missing_items,
        warnings: data_warnings,
        checklist,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Filing readiness: document checklist and required-field completeness",
        &serde_json::json!({
            "required_documents": REQUIRED_DOCUMENTS,
            "missing_document_penalty": MISSING_DOCUMENT_PENALTY,
            "missing_field_penalty": MISSING_FIELD_PENALTY,
        }),
        Vec::new(),
        elapsed,
        readiness,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

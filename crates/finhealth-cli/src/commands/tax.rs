use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use finhealth_core::tax::compliance::{
    assess_filing_readiness, check_compliance, identify_penalty_risks, suggest_tax_optimizations,
    validate_deductions, ComplianceInput, DeductionClaimsInput, FilingReadinessInput,
    PenaltyRiskInput,
};
use finhealth_core::tax::gst::{calculate_gst_liability, gst_rate_for_category, GstLiabilityInput};
use finhealth_core::tax::rules::{calculate_income_tax, IncomeTaxInput};
use finhealth_core::FinancialRecord;

use crate::input;

/// Arguments for the tax compliance check
#[derive(Args)]
pub struct ComplianceArgs {
    /// Path to a JSON/YAML compliance input: `{"record": {...}, "gst_collected": bool,
    /// "as_of": "YYYY-MM-DD"}` (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Reference date for filing deadlines (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// Arguments for deduction validation
#[derive(Args)]
pub struct DeductionArgs {
    /// Path to a JSON/YAML claim list: `{"claims": [{"section": "80C", "amount": ...}]}`
    /// (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the penalty risk screen
#[derive(Args)]
pub struct PenaltyArgs {
    /// Path to a JSON/YAML input: `{"record": {...}, "gst_registered": bool,
    /// "late_filings": n}` (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for filing readiness
#[derive(Args)]
pub struct FilingReadinessArgs {
    /// Path to a JSON/YAML input: `{"record": {...}, "documents": ["Bank Statements", ...]}`
    /// (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for tax optimisation suggestions
#[derive(Args)]
pub struct OptimizationArgs {
    /// Path to a JSON/YAML financial record (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the GST category rate lookup
#[derive(Args)]
pub struct GstRateArgs {
    /// Supply category (essential_goods, standard_goods, luxury_goods, services,
    /// healthcare, education)
    #[arg(long)]
    pub category: String,
}

/// Arguments for GST liability
#[derive(Args)]
pub struct GstLiabilityArgs {
    /// Path to a JSON/YAML input: `{"record": {...}, "gst_rate": 0.18, "category": "..."}`,
    /// rate and category optional (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// GST rate as a fraction; overrides the input file
    #[arg(long)]
    pub rate: Option<Decimal>,
}

/// Arguments for slab income tax
#[derive(Args)]
pub struct IncomeTaxArgs {
    /// Path to a JSON/YAML input: `{"income": ..., "country": "IN"}` (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Taxable income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Country code (IN, US)
    #[arg(long, default_value = "IN")]
    pub country: String,
}

pub fn run_compliance(args: ComplianceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut tc_input: ComplianceInput = input::load(args.input.as_deref(), "tax compliance")?;
    if args.as_of.is_some() {
        tc_input.as_of = args.as_of;
    }
    let result = check_compliance(&tc_input);
    Ok(serde_json::to_value(result)?)
}

pub fn run_deductions(args: DeductionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let claims: DeductionClaimsInput = input::load(args.input.as_deref(), "deduction validation")?;
    let result = validate_deductions(&claims)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_penalty_risks(args: PenaltyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pr_input: PenaltyRiskInput = input::load(args.input.as_deref(), "penalty risk screening")?;
    let result = identify_penalty_risks(&pr_input);
    Ok(serde_json::to_value(result)?)
}

pub fn run_filing_readiness(
    args: FilingReadinessArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let fr_input: FilingReadinessInput =
        input::load(args.input.as_deref(), "filing readiness")?;
    let result = assess_filing_readiness(&fr_input);
    Ok(serde_json::to_value(result)?)
}

pub fn run_optimizations(args: OptimizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: FinancialRecord = input::load(args.input.as_deref(), "tax optimisation")?;
    let result = suggest_tax_optimizations(&record);
    Ok(serde_json::to_value(result)?)
}

pub fn run_gst_rate(args: GstRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = gst_rate_for_category(&args.category);
    Ok(serde_json::to_value(result)?)
}

pub fn run_gst_liability(args: GstLiabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut gst_input: GstLiabilityInput = input::load(args.input.as_deref(), "GST liability")?;
    if args.rate.is_some() {
        gst_input.gst_rate = args.rate;
    }
    let result = calculate_gst_liability(&gst_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_income_tax(args: IncomeTaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let it_input: IncomeTaxInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(income) = args.income {
        IncomeTaxInput {
            income,
            country: args.country,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--income, --input <file.json> or stdin required for income tax".into());
    };
    let result = calculate_income_tax(&it_input);
    Ok(serde_json::to_value(result)?)
}

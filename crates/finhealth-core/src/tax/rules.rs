//! Statutory tables: Indian business rules and individual slabs for India and
//! the United States.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

use crate::math::{ratio_or_zero, round2};
use crate::types::*;
use crate::FinHealthError;

pub const CORPORATE_TAX_RATE: Rate = dec!(0.30);
pub const GST_REGISTRATION_THRESHOLD: Money = dec!(4000000);
pub const GST_STANDARD_RATE: Rate = dec!(0.18);
/// Operating expenses above this warrant a TDS review.
pub const TDS_REVIEW_THRESHOLD: Money = dec!(500000);
pub const TDS_RATE: Rate = dec!(0.10);
pub const ADVANCE_TAX_THRESHOLD: Money = dec!(10000);

// ---------------------------------------------------------------------------
// Countries and slabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "IN")]
    India,
    #[serde(rename = "US")]
    UnitedStates,
}

impl Country {
    pub fn code(&self) -> &'static str {
        match self {
            Self::India => "IN",
            Self::UnitedStates => "US",
        }
    }

    pub fn slabs(&self) -> &'static [TaxSlab] {
        match self {
            Self::India => &IN_INDIVIDUAL_SLABS,
            Self::UnitedStates => &US_INDIVIDUAL_SLABS,
        }
    }
}

impl FromStr for Country {
    type Err = FinHealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "IN" | "INDIA" => Ok(Self::India),
            "US" | "USA" | "UNITED STATES" => Ok(Self::UnitedStates),
            other => Err(FinHealthError::InvalidInput {
                field: "country".into(),
                reason: format!("unsupported country '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxSlab {
    pub min: Money,
    /// `None` for the open top slab.
    pub max: Option<Money>,
    pub rate: Rate,
}

const fn slab(min: Money, max: Option<Money>, rate: Rate) -> TaxSlab {
    TaxSlab { min, max, rate }
}

/// New regime, FY 2024-25.
pub static IN_INDIVIDUAL_SLABS: [TaxSlab; 6] = [
    slab(dec!(0), Some(dec!(300000)), dec!(0.00)),
    slab(dec!(300000), Some(dec!(700000)), dec!(0.05)),
    slab(dec!(700000), Some(dec!(1000000)), dec!(0.10)),
    slab(dec!(1000000), Some(dec!(1200000)), dec!(0.15)),
    slab(dec!(1200000), Some(dec!(1500000)), dec!(0.20)),
    slab(dec!(1500000), None, dec!(0.30)),
];

pub static US_INDIVIDUAL_SLABS: [TaxSlab; 7] = [
    slab(dec!(0), Some(dec!(11000)), dec!(0.10)),
    slab(dec!(11000), Some(dec!(44725)), dec!(0.12)),
    slab(dec!(44725), Some(dec!(95375)), dec!(0.22)),
    slab(dec!(95375), Some(dec!(182100)), dec!(0.24)),
    slab(dec!(182100), Some(dec!(231250)), dec!(0.32)),
    slab(dec!(231250), Some(dec!(578125)), dec!(0.35)),
    slab(dec!(578125), None, dec!(0.37)),
];

// ---------------------------------------------------------------------------
// Deductions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DeductionRule {
    pub section: &'static str,
    pub name: &'static str,
    /// `None` means no statutory cap.
    pub limit: Option<Money>,
    pub description: &'static str,
}

pub static DEDUCTIONS: [DeductionRule; 7] = [
    DeductionRule {
        section: "80C",
        name: "Section 80C",
        limit: Some(dec!(150000)),
        description: "Life insurance, PPF, ELSS, EPF, NSC, Home Loan Principal",
    },
    DeductionRule {
        section: "80D",
        name: "Section 80D",
        limit: Some(dec!(25000)),
        description: "Health insurance premium",
    },
    DeductionRule {
        section: "80E",
        name: "Section 80E",
        limit: None,
        description: "Education loan interest",
    },
    DeductionRule {
        section: "80G",
        name: "Section 80G",
        limit: None,
        description: "Donations to charitable institutions",
    },
    DeductionRule {
        section: "24B",
        name: "Section 24(b)",
        limit: Some(dec!(200000)),
        description: "Home loan interest",
    },
    DeductionRule {
        section: "80CCD",
        name: "Section 80CCD(1B)",
        limit: Some(dec!(50000)),
        description: "Additional NPS contribution",
    },
    DeductionRule {
        section: "80TTA",
        name: "Section 80TTA",
        limit: Some(dec!(10000)),
        description: "Interest on savings account",
    },
];

pub fn find_deduction(section: &str) -> Option<&'static DeductionRule> {
    let key = section.trim();
    DEDUCTIONS.iter().find(|d| d.section.eq_ignore_ascii_case(key))
}

// ---------------------------------------------------------------------------
// Income tax
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeTaxInput {
    pub income: Money,
    /// Country code; unknown codes fall back to IN.
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "IN".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlabTax {
    pub min: Money,
    pub max: Option<Money>,
    pub rate: Rate,
    pub taxable_amount: Money,
    pub tax: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeTaxResult {
    pub country: Country,
    pub income: Money,
    pub total_tax: Money,
    /// Percent of income.
    pub effective_rate: Rate,
    pub breakdown: Vec<SlabTax>,
}

/// Progressive slab tax on individual income.
pub fn calculate_income_tax(input: &IncomeTaxInput) -> ComputationOutput<IncomeTaxResult> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let country = match input.country.parse::<Country>() {
        Ok(c) => c,
        Err(_) => {
            let msg = format!("Unknown country '{}'; using IN slabs", input.country);
            tracing::warn!("{msg}");
            warnings.push(msg);
            Country::India
        }
    };
    if input.income < Decimal::ZERO {
        warnings.push("Negative income; no tax due".into());
    }

    let result = slab_tax(input.income, country);

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Progressive slab income tax",
        &serde_json::json!({
            "country": country,
            "slabs": country.slabs(),
        }),
        warnings,
        elapsed,
        result,
    )
}

pub(crate) fn slab_tax(income: Money, country: Country) -> IncomeTaxResult {
    let mut breakdown = Vec::new();
    let mut total = Decimal::ZERO;

    for s in country.slabs() {
        if income <= s.min {
            break;
        }
        let upper = s.max.map_or(income, |m| m.min(income));
        let taxable = upper - s.min;
        let tax = taxable * s.rate;
        total += tax;
        breakdown.push(SlabTax {
            min: s.min,
            max: s.max,
            rate: s.rate,
            taxable_amount: round2(taxable),
            tax: round2(tax),
        });
    }

    IncomeTaxResult {
        country,
        income,
        total_tax: round2(total),
        effective_rate: round2(ratio_or_zero(total, income) * dec!(100)),
        breakdown,
    }
}

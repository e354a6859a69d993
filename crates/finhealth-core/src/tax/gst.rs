//! GST rates by supply category and liability on GST-inclusive revenue.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::rules::GST_STANDARD_RATE;
use crate::math::round2;
use crate::types::*;
use crate::{FinHealthError, FinHealthResult};

#[derive(Debug, Clone, Serialize)]
pub struct GstCategoryRate {
    pub category: &'static str,
    pub rate: Rate,
}

pub static GST_CATEGORY_RATES: [GstCategoryRate; 6] = [
    GstCategoryRate {
        category: "essential_goods",
        rate: dec!(0.05),
    },
    GstCategoryRate {
        category: "standard_goods",
        rate: dec!(0.18),
    },
    GstCategoryRate {
        category: "luxury_goods",
        rate: dec!(0.28),
    },
    GstCategoryRate {
        category: "services",
        rate: dec!(0.18),
    },
    GstCategoryRate {
        category: "healthcare",
        rate: dec!(0.00),
    },
    GstCategoryRate {
        category: "education",
        rate: dec!(0.00),
    },
];

fn category_rate(category: &str) -> Option<Rate> {
    let key = category.trim();
    GST_CATEGORY_RATES
        .iter()
        .find(|c| c.category.eq_ignore_ascii_case(key))
        .map(|c| c.rate)
}

// ---------------------------------------------------------------------------
// Category lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstRate {
    pub category: String,
    pub rate: Rate,
    /// True when the category is not in the table and the standard rate applies.
    pub standard_rate_applied: bool,
}

/// GST rate for a supply category. Unknown categories take the 18% standard rate.
pub fn gst_rate_for_category(category: &str) -> ComputationOutput<GstRate> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let (rate, standard_rate_applied) = match category_rate(category) {
        Some(rate) => (rate, false),
        None => {
            let msg = format!("Unknown GST category '{category}'; using the standard rate");
            tracing::warn!("{msg}");
            warnings.push(msg);
            (GST_STANDARD_RATE, true)
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "GST rate lookup by supply category",
        &serde_json::json!({
            "standard_rate": GST_STANDARD_RATE.to_string(),
            "categories": &GST_CATEGORY_RATES,
        }),
        warnings,
        elapsed,
        GstRate {
            category: category.trim().to_lowercase(),
            rate,
            standard_rate_applied,
        },
    )
}

// ---------------------------------------------------------------------------
// Liability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GstLiabilityInput {
    pub record: FinancialRecord,
    /// Explicit rate as a fraction; takes precedence over `category`.
    #[serde(default)]
    pub gst_rate: Option<Rate>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstLiability {
    pub taxable_value: Money,
    /// Percent.
    pub gst_rate: Rate,
    pub total_gst: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub igst: Money,
    pub total_value_with_gst: Money,
}

/// GST liability on revenue that already includes GST, split evenly into
/// CGST and SGST for an intra-state supply.
pub fn calculate_gst_liability(
    input: &GstLiabilityInput,
) -> FinHealthResult<ComputationOutput<GstLiability>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let rate = match (input.gst_rate, input.category.as_deref()) {
        (Some(rate), _) => rate,
        (None, Some(category)) => {
            let lookup = gst_rate_for_category(category);
            warnings.extend(lookup.warnings);
            lookup.result.rate
        }
        (None, None) => GST_STANDARD_RATE,
    };
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(FinHealthError::InvalidInput {
            field: "gst_rate".into(),
            reason: format!("must be a fraction between 0 and 1, got {rate}"),
        });
    }

    let revenue = input.record.revenue;
    if revenue <= Decimal::ZERO {
        warnings.push("Revenue is zero or negative; no GST liability".into());
    }
    let taxable_value = revenue / (Decimal::ONE + rate);
    let gst = taxable_value * rate;
    let half = gst / Decimal::TWO;

    let liability = GstLiability {
        taxable_value: round2(taxable_value),
        gst_rate: rate * dec!(100),
        total_gst: round2(gst),
        cgst: round2(half),
        sgst: round2(half),
        igst: Decimal::ZERO,
        total_value_with_gst: round2(revenue),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reverse GST calculation on GST-inclusive revenue, intra-state CGST/SGST split",
        &serde_json::json!({
            "gst_rate": rate.to_string(),
            "supply": "intra-state",
        }),
        warnings,
        elapsed,
        liability,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

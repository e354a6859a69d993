use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::math::{ratio_or_zero, round2};
use crate::types::*;

const PERCENT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Ratio set derived from one [`FinancialRecord`]. Every value is rounded to
/// two decimals and any ratio over a non-positive denominator is zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSet {
    // Liquidity
    pub current_ratio: Rate,
    pub quick_ratio: Rate,
    pub cash_ratio: Rate,
    // Profitability (percent of revenue / assets / equity)
    pub gross_profit_margin: Rate,
    pub net_profit_margin: Rate,
    pub operating_margin: Rate,
    pub return_on_assets: Rate,
    pub return_on_equity: Rate,
    // Cash flow
    pub operating_cash_flow: Money,
    pub cash_flow_margin: Rate,
    pub cash_flow_coverage: Rate,
    pub cash_conversion_cycle: Days,
    // Debt
    pub debt_to_equity: Rate,
    pub debt_to_assets: Rate,
    pub interest_coverage: Rate,
    pub total_debt: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the full ratio set for a financial record.
///
/// Never fails: zero or negative denominators force the affected ratio to
/// zero, and each such case is listed in the envelope's warnings.
pub fn compute_metrics(record: &FinancialRecord) -> ComputationOutput<MetricsSet> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    if record.current_liabilities <= Decimal::ZERO {
        warnings.push(
            "Current liabilities are zero or negative; liquidity ratios and cash flow coverage set to 0"
                .into(),
        );
    }
    if record.revenue <= Decimal::ZERO {
        warnings.push("Revenue is zero or negative; margin ratios set to 0".into());
    }
    if record.equity <= Decimal::ZERO {
        warnings.push("Equity is zero or negative; ROE and debt-to-equity set to 0".into());
    }
    if record.total_assets <= Decimal::ZERO {
        warnings.push("Total assets are zero or negative; ROA and debt-to-assets set to 0".into());
    }
    if record.interest_expense <= Decimal::ZERO {
        warnings.push("No interest expense reported; interest coverage set to 0".into());
    }
    for w in &warnings {
        tracing::warn!(target: "finhealth::metrics", "{w}");
    }

    let metrics = derive_metrics(record);

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Ratio analysis: liquidity, profitability, cash flow and leverage ratios, 2dp",
        &serde_json::json!({
            "zero_denominator_policy": "ratio = 0",
            "rounding_dp": 2,
            "percent_ratios": ["margins", "return_on_assets", "return_on_equity", "cash_flow_margin", "debt_to_assets"],
        }),
        warnings,
        elapsed,
        metrics,
    )
}

/// Envelope-free ratio derivation, shared with the scoring and workflow code.
pub fn derive_metrics(record: &FinancialRecord) -> MetricsSet {
    let cl = record.current_liabilities;
    let revenue = record.revenue;

    MetricsSet {
        current_ratio: round2(ratio_or_zero(record.current_assets, cl)),
        quick_ratio: round2(ratio_or_zero(record.current_assets - record.inventory, cl)),
        cash_ratio: round2(ratio_or_zero(record.cash, cl)),

        gross_profit_margin: round2(ratio_or_zero(record.gross_profit, revenue) * PERCENT),
        net_profit_margin: round2(ratio_or_zero(record.net_profit, revenue) * PERCENT),
        operating_margin: round2(ratio_or_zero(record.operating_profit, revenue) * PERCENT),
        return_on_assets: round2(ratio_or_zero(record.net_profit, record.total_assets) * PERCENT),
        return_on_equity: round2(ratio_or_zero(record.net_profit, record.equity) * PERCENT),

        operating_cash_flow: round2(record.operating_cash_flow),
        cash_flow_margin: round2(ratio_or_zero(record.operating_cash_flow, revenue) * PERCENT),
        cash_flow_coverage: round2(ratio_or_zero(record.operating_cash_flow, cl)),
        cash_conversion_cycle: round2(record.cash_conversion_cycle()),

        debt_to_equity: round2(ratio_or_zero(record.total_debt, record.equity)),
        debt_to_assets: round2(ratio_or_zero(record.total_debt, record.total_assets) * PERCENT),
        interest_coverage: round2(ratio_or_zero(record.ebit, record.interest_expense)),
        total_debt: round2(record.total_debt),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

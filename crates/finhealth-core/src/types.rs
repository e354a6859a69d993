use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FinHealthError;

/// All monetary values, in the single currency of the statement.
pub type Money = Decimal;

/// Ratios and percentages. Percentages are expressed as 0-100, not 0-1.
pub type Rate = Decimal;

/// Scores on a 0-100 scale.
pub type Score = Decimal;

/// Day counts (receivables, inventory, payables, cash conversion cycle).
pub type Days = Decimal;

const DEFAULT_RECEIVABLES_DAYS: Decimal = dec!(45);
const DEFAULT_PAYABLES_DAYS: Decimal = dec!(30);
const DEFAULT_INVENTORY_DAYS: Decimal = dec!(30);

// ---------------------------------------------------------------------------
// Financial record
// ---------------------------------------------------------------------------

/// A normalised financial statement. Absent fields deserialize to zero, except
/// the working-capital day counts which fall back to 45/30/30.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialRecord {
    pub revenue: Money,
    pub cost_of_goods_sold: Money,
    pub gross_profit: Money,
    pub operating_expenses: Money,
    pub operating_profit: Money,
    pub net_profit: Money,
    pub ebit: Money,
    pub interest_expense: Money,
    pub current_assets: Money,
    pub cash: Money,
    pub inventory: Money,
    pub current_liabilities: Money,
    pub total_assets: Money,
    pub total_debt: Money,
    pub equity: Money,
    pub operating_cash_flow: Money,
    pub receivables_days: Days,
    pub payables_days: Days,
    pub inventory_days: Days,
}

impl Default for FinancialRecord {
    fn default() -> Self {
        Self {
            revenue: Decimal::ZERO,
            cost_of_goods_sold: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            operating_expenses: Decimal::ZERO,
            operating_profit: Decimal::ZERO,
            net_profit: Decimal::ZERO,
            ebit: Decimal::ZERO,
            interest_expense: Decimal::ZERO,
            current_assets: Decimal::ZERO,
            cash: Decimal::ZERO,
            inventory: Decimal::ZERO,
            current_liabilities: Decimal::ZERO,
            total_assets: Decimal::ZERO,
            total_debt: Decimal::ZERO,
            equity: Decimal::ZERO,
            operating_cash_flow: Decimal::ZERO,
            receivables_days: DEFAULT_RECEIVABLES_DAYS,
            payables_days: DEFAULT_PAYABLES_DAYS,
            inventory_days: DEFAULT_INVENTORY_DAYS,
        }
    }
}

impl FinancialRecord {
    /// Read a single field by name.
    pub fn get(&self, field: RecordField) -> Decimal {
        match field {
            RecordField::Revenue => self.revenue,
            RecordField::CostOfGoodsSold => self.cost_of_goods_sold,
            RecordField::GrossProfit => self.gross_profit,
            RecordField::OperatingExpenses => self.operating_expenses,
            RecordField::OperatingProfit => self.operating_profit,
            RecordField::NetProfit => self.net_profit,
            RecordField::Ebit => self.ebit,
            RecordField::InterestExpense => self.interest_expense,
            RecordField::CurrentAssets => self.current_assets,
            RecordField::Cash => self.cash,
            RecordField::Inventory => self.inventory,
            RecordField::CurrentLiabilities => self.current_liabilities,
            RecordField::TotalAssets => self.total_assets,
            RecordField::TotalDebt => self.total_debt,
            RecordField::Equity => self.equity,
            RecordField::OperatingCashFlow => self.operating_cash_flow,
            RecordField::ReceivablesDays => self.receivables_days,
            RecordField::PayablesDays => self.payables_days,
            RecordField::InventoryDays => self.inventory_days,
        }
    }

    /// Return a copy of the record with one field replaced. The receiver is
    /// never modified.
    pub fn with_field(&self, field: RecordField, value: Decimal) -> Self {
        let mut next = self.clone();
        let slot = match field {
            RecordField::Revenue => &mut next.revenue,
            RecordField::CostOfGoodsSold => &mut next.cost_of_goods_sold,
            RecordField::GrossProfit => &mut next.gross_profit,
            RecordField::OperatingExpenses => &mut next.operating_expenses,
            RecordField::OperatingProfit => &mut next.operating_profit,
            RecordField::NetProfit => &mut next.net_profit,
            RecordField::Ebit => &mut next.ebit,
            RecordField::InterestExpense => &mut next.interest_expense,
            RecordField::CurrentAssets => &mut next.current_assets,
            RecordField::Cash => &mut next.cash,
            RecordField::Inventory => &mut next.inventory,
            RecordField::CurrentLiabilities => &mut next.current_liabilities,
            RecordField::TotalAssets => &mut next.total_assets,
            RecordField::TotalDebt => &mut next.total_debt,
            RecordField::Equity => &mut next.equity,
            RecordField::OperatingCashFlow => &mut next.operating_cash_flow,
            RecordField::ReceivablesDays => &mut next.receivables_days,
            RecordField::PayablesDays => &mut next.payables_days,
            RecordField::InventoryDays => &mut next.inventory_days,
        };
        *slot = value;
        next
    }

    /// Working capital = current assets - current liabilities.
    pub fn working_capital(&self) -> Money {
        self.current_assets.saturating_sub(self.current_liabilities)
    }

    /// Cash conversion cycle = receivables + inventory - payables days.
    pub fn cash_conversion_cycle(&self) -> Days {
        self.receivables_days
            .saturating_add(self.inventory_days)
            .saturating_sub(self.payables_days)
    }
}

/// Addressable fields of a [`FinancialRecord`], named by their snake_case keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Revenue,
    CostOfGoodsSold,
    GrossProfit,
    OperatingExpenses,
    OperatingProfit,
    NetProfit,
    Ebit,
    InterestExpense,
    CurrentAssets,
    Cash,
    Inventory,
    CurrentLiabilities,
    TotalAssets,
    TotalDebt,
    Equity,
    OperatingCashFlow,
    ReceivablesDays,
    PayablesDays,
    InventoryDays,
}

impl RecordField {
    pub const ALL: [RecordField; 19] = [
        Self::Revenue,
        Self::CostOfGoodsSold,
        Self::GrossProfit,
        Self::OperatingExpenses,
        Self::OperatingProfit,
        Self::NetProfit,
        Self::Ebit,
        Self::InterestExpense,
        Self::CurrentAssets,
        Self::Cash,
        Self::Inventory,
        Self::CurrentLiabilities,
        Self::TotalAssets,
        Self::TotalDebt,
        Self::Equity,
        Self::OperatingCashFlow,
        Self::ReceivablesDays,
        Self::PayablesDays,
        Self::InventoryDays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::CostOfGoodsSold => "cost_of_goods_sold",
            Self::GrossProfit => "gross_profit",
            Self::OperatingExpenses => "operating_expenses",
            Self::OperatingProfit => "operating_profit",
            Self::NetProfit => "net_profit",
            Self::Ebit => "ebit",
            Self::InterestExpense => "interest_expense",
            Self::CurrentAssets => "current_assets",
            Self::Cash => "cash",
            Self::Inventory => "inventory",
            Self::CurrentLiabilities => "current_liabilities",
            Self::TotalAssets => "total_assets",
            Self::TotalDebt => "total_debt",
            Self::Equity => "equity",
            Self::OperatingCashFlow => "operating_cash_flow",
            Self::ReceivablesDays => "receivables_days",
            Self::PayablesDays => "payables_days",
            Self::InventoryDays => "inventory_days",
        }
    }

    /// Comma-separated list of every valid field name, for error messages.
    pub fn allowed_names() -> String {
        Self::ALL
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = FinHealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == key)
            .ok_or_else(|| FinHealthError::InvalidVariable {
                name: s.to_string(),
                allowed: Self::allowed_names(),
            })
    }
}

// ---------------------------------------------------------------------------
// Output envelope
// ---------------------------------------------------------------------------

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

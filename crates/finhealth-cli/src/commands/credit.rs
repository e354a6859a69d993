use serde_json::Value;

use finhealth_core::analysis::{health, metrics};
use finhealth_core::credit::readiness::{assess_credit_readiness, CreditReadinessInput};
use finhealth_core::FinancialRecord;

use crate::commands::analysis::RecordArgs;
use crate::input;

/// Score credit readiness straight from a financial record: metrics and the
/// health score are derived first.
pub fn run_credit(args: RecordArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: FinancialRecord = input::load(args.input.as_deref(), "credit readiness")?;
    let m = metrics::derive_metrics(&record);
    let h = health::assess_health(&m);
    let result = assess_credit_readiness(&CreditReadinessInput {
        health_score: h.health_score,
        metrics: m,
        receivables_days: Some(record.receivables_days),
    });
    Ok(serde_json::to_value(result)?)
}

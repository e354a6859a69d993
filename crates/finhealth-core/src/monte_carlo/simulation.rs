use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use statrs::distribution::Uniform;
use std::time::Instant;

use crate::error::FinHealthError;
use crate::types::{ComputationMetadata, ComputationOutput, FinancialRecord};
use crate::working_capital::optimizer::{daily_revenue, OptimizerTargets};
use crate::FinHealthResult;

/// Each day count is drawn from +/- this share of its current value.
const DAY_SPREAD: f64 = 0.20;
const HIGH_VOLATILITY: f64 = 0.3;
const MEDIUM_VOLATILITY: f64 = 0.15;

// ---------------------------------------------------------------------------
// Helper: build ComputationOutput without requiring Decimal
// ---------------------------------------------------------------------------

fn with_metadata_f64<T: Serialize>(
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
            precision: "ieee754_f64".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingCapitalSimulationInput {
    pub record: FinancialRecord,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Fixed by default so identical inputs give identical statistics.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Only `cogs_ratio` is used; it costs each simulated cycle.
    #[serde(default)]
    pub targets: OptimizerTargets,
}

fn default_iterations() -> u32 {
    1000
}

fn default_seed() -> u64 {
    42
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityRisk {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: VolatilityRisk,
    pub wc_volatility: f64,
    pub ccc_volatility: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingCapitalSimulation {
    pub iterations: u32,
    pub seed: u64,
    pub working_capital: SeriesStatistics,
    pub cash_conversion_cycle: SeriesStatistics,
    pub risk_assessment: RiskAssessment,
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Uniform draw over +/- `DAY_SPREAD` of `center`. A zero center is constant.
enum DayDraw {
    Fixed(f64),
    Uniform(Uniform),
}

impl DayDraw {
    fn around(field: &str, center: f64) -> FinHealthResult<Self> {
        let a = center * (1.0 - DAY_SPREAD);
        let b = center * (1.0 + DAY_SPREAD);
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        if (max - min).abs() < f64::EPSILON {
            return Ok(Self::Fixed(center));
        }
        Uniform::new(min, max)
            .map(Self::Uniform)
            .map_err(|e| FinHealthError::InvalidInput {
                field: field.into(),
                reason: format!("Invalid Uniform parameters: {e}"),
            })
    }

    fn draw(&self, rng: &mut StdRng) -> f64 {
        match self {
            Self::Fixed(v) => *v,
            Self::Uniform(u) => rng.sample(u),
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Compute the percentile value from a **sorted** slice using linear interpolation.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Unrounded (mean, population std dev) plus the rounded summary.
fn describe(values: &mut [f64]) -> (f64, f64, SeriesStatistics) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let stats = SeriesStatistics {
        mean: round2(mean),
        std_dev: round2(std_dev),
        min: round2(values.first().copied().unwrap_or(0.0)),
        max: round2(values.last().copied().unwrap_or(0.0)),
        percentile_5: round2(percentile_sorted(values, 5.0)),
        percentile_95: round2(percentile_sorted(values, 95.0)),
    };
    (mean, std_dev, stats)
}

fn volatility(mean: f64, std_dev: f64) -> f64 {
    if mean > 0.0 {
        std_dev / mean
    } else {
        0.0
    }
}

fn assess_risk(wc_volatility: f64, ccc_volatility: f64) -> RiskAssessment {
    let (risk_level, recommendation) =
        if wc_volatility > HIGH_VOLATILITY || ccc_volatility > HIGH_VOLATILITY {
            (
                VolatilityRisk::High,
                "High variability detected. Focus on stabilizing working capital components.",
            )
        } else if wc_volatility > MEDIUM_VOLATILITY || ccc_volatility > MEDIUM_VOLATILITY {
            (
                VolatilityRisk::Medium,
                "Moderate variability. Monitor working capital closely.",
            )
        } else {
            (VolatilityRisk::Low, "Working capital is relatively stable.")
        };

    RiskAssessment {
        risk_level,
        wc_volatility: round4(wc_volatility),
        ccc_volatility: round4(ccc_volatility),
        recommendation: recommendation.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate cash conversion cycle and working-capital variability.
///
/// Receivable, inventory and payable days are drawn independently and
/// uniformly from +/-20% of their current values; working capital per draw is
/// `ccc * daily_revenue * cogs_ratio` (0.7 unless `targets` overrides it).
pub fn simulate_working_capital(
    input: &WorkingCapitalSimulationInput,
) -> FinHealthResult<ComputationOutput<WorkingCapitalSimulation>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.iterations == 0 {
        return Err(FinHealthError::InvalidInput {
            field: "iterations".into(),
            reason: "Must be at least 1".into(),
        });
    }

    let record = &input.record;
    let as_f64 = |v: rust_decimal::Decimal| v.to_f64().unwrap_or(0.0);
    let receivables = DayDraw::around("receivables_days", as_f64(record.receivables_days))?;
    let inventory = DayDraw::around("inventory_days", as_f64(record.inventory_days))?;
    let payables = DayDraw::around("payables_days", as_f64(record.payables_days))?;
    let dr = as_f64(daily_revenue(record));
    let cogs_ratio = as_f64(input.targets.cogs_ratio);
    if dr == 0.0 {
        warnings.push("Revenue is zero or negative; simulated working capital is 0".into());
    }

    let mut rng = StdRng::seed_from_u64(input.seed);
    let n = input.iterations as usize;
    let mut ccc_samples = Vec::with_capacity(n);
    let mut wc_samples = Vec::with_capacity(n);

    for _ in 0..n {
        let ccc = receivables.draw(&mut rng) + inventory.draw(&mut rng) - payables.draw(&mut rng);
        ccc_samples.push(ccc);
        wc_samples.push(ccc * dr * cogs_ratio);
    }

    let (wc_mean, wc_std, working_capital) = describe(&mut wc_samples);
    let (ccc_mean, ccc_std, cash_conversion_cycle) = describe(&mut ccc_samples);
    let risk_assessment = assess_risk(
        volatility(wc_mean, wc_std),
        volatility(ccc_mean, ccc_std),
    );
    tracing::debug!(
        iterations = n,
        risk = ?risk_assessment.risk_level,
        "working capital simulation complete"
    );

    let output = WorkingCapitalSimulation {
        iterations: input.iterations,
        seed: input.seed,
        working_capital,
        cash_conversion_cycle,
        risk_assessment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Monte Carlo simulation of cash conversion cycle and working capital",
        &serde_json::json!({
            "iterations": input.iterations,
            "seed": input.seed,
            "day_spread": DAY_SPREAD,
            "cogs_ratio": cogs_ratio,
            "distribution": "uniform",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

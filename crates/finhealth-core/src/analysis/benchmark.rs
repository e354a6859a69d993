use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::metrics::MetricsSet;
use crate::math::round2;
use crate::types::*;

const FALLBACK_INDUSTRY: &str = "services";

// ---------------------------------------------------------------------------
// Benchmark table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct IndustryBenchmark {
    pub key: &'static str,
    pub name: &'static str,
    pub gross_margin: Rate,
    pub net_margin: Rate,
    pub current_ratio: Rate,
    pub debt_to_equity: Rate,
    pub cash_conversion_cycle: Days,
    pub inventory_turnover: Rate,
}

const fn bench(
    key: &'static str,
    name: &'static str,
    gross_margin: Rate,
    net_margin: Rate,
    current_ratio: Rate,
    debt_to_equity: Rate,
    cash_conversion_cycle: Days,
    inventory_turnover: Rate,
) -> IndustryBenchmark {
    IndustryBenchmark {
        key,
        name,
        gross_margin,
        net_margin,
        current_ratio,
        debt_to_equity,
        cash_conversion_cycle,
        inventory_turnover,
    }
}

pub static BENCHMARKS: [IndustryBenchmark; 8] = [
    bench("retail", "Retail", dec!(30), dec!(5), dec!(1.5), dec!(1.2), dec!(45), dec!(8)),
    bench("manufacturing", "Manufacturing", dec!(35), dec!(8), dec!(1.8), dec!(1.5), dec!(60), dec!(6)),
    bench("services", "Services", dec!(50), dec!(12), dec!(1.3), dec!(0.8), dec!(30), dec!(0)),
    bench("technology", "Technology", dec!(60), dec!(15), dec!(2.0), dec!(0.5), dec!(40), dec!(12)),
    bench("hospitality", "Hospitality", dec!(40), dec!(6), dec!(1.2), dec!(1.8), dec!(20), dec!(15)),
    bench("agriculture", "Agriculture", dec!(25), dec!(10), dec!(1.4), dec!(1.3), dec!(90), dec!(4)),
    bench("logistics", "Logistics", dec!(20), dec!(5), dec!(1.3), dec!(1.6), dec!(35), dec!(10)),
    bench("ecommerce", "E-commerce", dec!(45), dec!(8), dec!(1.6), dec!(1.0), dec!(25), dec!(12)),
];

/// Case-insensitive lookup. Returns `None` for an unknown industry.
pub fn find_benchmark(industry: &str) -> Option<&'static IndustryBenchmark> {
    let key = industry.trim().to_lowercase();
    BENCHMARKS.iter().find(|b| b.key == key)
}

fn fallback_benchmark() -> &'static IndustryBenchmark {
    // "services" is always present in the table above.
    &BENCHMARKS[2]
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Performance {
    Above,
    Below,
    At,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonStatus {
    Good,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallPerformance {
    Strong,
    Average,
    Weak,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: String,
    pub company: Decimal,
    pub industry: Decimal,
    pub difference: Decimal,
    pub performance: Performance,
    pub status: ComparisonStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    /// Display name of the benchmark actually used.
    pub industry: String,
    pub comparisons: Vec<MetricComparison>,
    pub overall_performance: OverallPerformance,
    pub metrics_above_industry: usize,
    pub total_metrics: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare a metrics set against the named industry. Unknown industries fall
/// back to the services benchmark with a warning.
pub fn compare_to_industry(
    metrics: &MetricsSet,
    industry: &str,
) -> ComputationOutput<BenchmarkComparison> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let benchmark = match find_benchmark(industry) {
        Some(b) => b,
        None => {
            let msg = format!(
                "Unknown industry '{industry}'; using {FALLBACK_INDUSTRY} benchmarks"
            );
            tracing::warn!("{msg}");
            warnings.push(msg);
            fallback_benchmark()
        }
    };

    let comparison = compare_with(metrics, benchmark);

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Industry benchmark comparison over five ratios with per-metric tolerance bands",
        &serde_json::json!({
            "benchmark": benchmark,
            "tolerances": {
                "gross_margin": ">= 90% of benchmark",
                "net_margin": ">= 80% of benchmark",
                "current_ratio": ">= 80% of benchmark",
                "debt_to_equity": "<= 120% of benchmark",
                "cash_conversion_cycle": "<= 120% of benchmark",
            },
        }),
        warnings,
        elapsed,
        comparison,
    )
}

pub(crate) fn compare_with(
    metrics: &MetricsSet,
    benchmark: &IndustryBenchmark,
) -> BenchmarkComparison {
    let comparisons = vec![
        higher_is_better(
            "gross_margin",
            metrics.gross_profit_margin,
            benchmark.gross_margin,
            dec!(0.9),
        ),
        higher_is_better(
            "net_margin",
            metrics.net_profit_margin,
            benchmark.net_margin,
            dec!(0.8),
        ),
        higher_is_better(
            "current_ratio",
            metrics.current_ratio,
            benchmark.current_ratio,
            dec!(0.8),
        ),
        lower_is_better(
            "debt_to_equity",
            metrics.debt_to_equity,
            benchmark.debt_to_equity,
            dec!(1.2),
        ),
        lower_is_better(
            "cash_conversion_cycle",
            metrics.cash_conversion_cycle,
            benchmark.cash_conversion_cycle,
            dec!(1.2),
        ),
    ];

    let good = comparisons
        .iter()
        .filter(|c| c.status == ComparisonStatus::Good)
        .count();
    let total = comparisons.len();
    let good_dec = Decimal::from(good as u64);
    let total_dec = Decimal::from(total as u64);

    let overall_performance = if good_dec >= total_dec * dec!(0.7) {
        OverallPerformance::Strong
    } else if good_dec >= total_dec * dec!(0.4) {
        OverallPerformance::Average
    } else {
        OverallPerformance::Weak
    };

    BenchmarkComparison {
        industry: benchmark.name.to_string(),
        comparisons,
        overall_performance,
        metrics_above_industry: good,
        total_metrics: total,
    }
}

fn performance(company: Decimal, industry: Decimal) -> Performance {
    if company > industry {
        Performance::Above
    } else if company < industry {
        Performance::Below
    } else {
        Performance::At
    }
}

fn higher_is_better(
    metric: &str,
    company: Decimal,
    industry: Decimal,
    floor: Decimal,
) -> MetricComparison {
    MetricComparison {
        metric: metric.to_string(),
        company,
        industry,
        difference: round2(company.saturating_sub(industry)),
        performance: performance(company, industry),
        status: if company >= industry * floor {
            ComparisonStatus::Good
        } else {
            ComparisonStatus::Poor
        },
    }
}

fn lower_is_better(
    metric: &str,
    company: Decimal,
    industry: Decimal,
    ceiling: Decimal,
) -> MetricComparison {
    MetricComparison {
        metric: metric.to_string(),
        company,
        industry,
        difference: round2(company.saturating_sub(industry)),
        performance: performance(company, industry),
        status: if company <= industry * ceiling {
            ComparisonStatus::Good
        } else {
            ComparisonStatus::Poor
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

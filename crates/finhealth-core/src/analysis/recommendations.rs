use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::health::ScoreSet;
use super::metrics::MetricsSet;
use crate::types::*;

const MAX_RECOMMENDATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub impact: Priority,
    pub actions: Vec<String>,
}

/// Fixed-text improvement recommendations triggered by weak sub-scores.
///
/// At most five are returned, High priority first; ties keep rule order.
pub fn generate_recommendations(
    health_score: Score,
    metrics: &MetricsSet,
    scores: &ScoreSet,
) -> ComputationOutput<Vec<Recommendation>> {
    let start = Instant::now();
    let recs = recommend(health_score, metrics, scores);

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Rule-based recommendations from sub-score and ratio thresholds",
        &serde_json::json!({
            "sub_score_trigger": "< 60",
            "working_capital_trigger": "health_score < 70",
            "max_recommendations": MAX_RECOMMENDATIONS,
        }),
        Vec::new(),
        elapsed,
        recs,
    )
}

pub(crate) fn recommend(
    health_score: Score,
    metrics: &MetricsSet,
    scores: &ScoreSet,
) -> Vec<Recommendation> {
    let weak = dec!(60);
    let mut recs = Vec::new();

    if scores.liquidity_score < weak && metrics.current_ratio < dec!(1.0) {
        recs.push(rec(
            "Liquidity",
            Priority::High,
            "Improve Current Ratio",
            format!(
                "Your current ratio is {}, indicating potential liquidity issues. Consider reducing short-term liabilities or increasing liquid assets.",
                metrics.current_ratio
            ),
            &[
                "Accelerate receivables collection",
                "Negotiate extended payment terms with suppliers",
                "Consider short-term financing options",
            ],
        ));
    }

    if scores.profitability_score < weak && metrics.net_profit_margin < dec!(5) {
        recs.push(rec(
            "Profitability",
            Priority::High,
            "Increase Profit Margins",
            format!(
                "Net profit margin of {}% is below healthy levels. Focus on cost optimization and revenue enhancement.",
                metrics.net_profit_margin
            ),
            &[
                "Review and reduce operating expenses",
                "Optimize pricing strategy",
                "Improve operational efficiency",
                "Focus on high-margin products/services",
            ],
        ));
    }

    if scores.cash_flow_score < weak && metrics.cash_conversion_cycle > dec!(60) {
        recs.push(rec(
            "Cash Flow",
            Priority::Medium,
            "Optimize Cash Conversion Cycle",
            format!(
                "Cash conversion cycle of {} days is high. Faster conversion improves working capital.",
                metrics.cash_conversion_cycle
            ),
            &[
                "Implement stricter credit policies",
                "Offer early payment discounts",
                "Optimize inventory management",
                "Negotiate better payment terms",
            ],
        ));
    }

    if scores.debt_health_score < weak && metrics.debt_to_equity > dec!(2.0) {
        recs.push(rec(
            "Debt Management",
            Priority::High,
            "Reduce Debt Burden",
            format!(
                "Debt-to-equity ratio of {} indicates high leverage. Consider debt reduction strategies.",
                metrics.debt_to_equity
            ),
            &[
                "Prioritize debt repayment",
                "Consider debt restructuring",
                "Avoid taking on new debt",
                "Explore equity financing options",
            ],
        ));
    }

    if health_score < dec!(70) {
        recs.push(rec(
            "Working Capital",
            Priority::Medium,
            "Strengthen Working Capital Position",
            "Improve overall working capital management to enhance financial stability."
                .to_string(),
            &[
                "Monitor cash flow daily",
                "Maintain adequate cash reserves",
                "Implement cash flow forecasting",
                "Review all recurring expenses",
            ],
        ));
    }

    // Stable sort keeps rule order within a priority tier.
    recs.sort_by_key(|r| r.priority);
    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}

fn rec(
    category: &str,
    priority: Priority,
    title: &str,
    description: String,
    actions: &[&str],
) -> Recommendation {
    Recommendation {
        category: category.to_string(),
        priority,
        title: title.to_string(),
        description,
        impact: priority,
        actions: actions.iter().map(|a| a.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn weak_scores() -> ScoreSet {
        ScoreSet {
            liquidity_score: dec!(20),
            profitability_score: dec!(20),
            cash_flow_score: dec!(20),
            debt_health_score: dec!(20),
        }
    }

    #[test]
    fn test_every_rule_fires_and_high_comes_first() {
        let m = MetricsSet {
            current_ratio: dec!(0.8),
            net_profit_margin: dec!(-2),
            cash_conversion_cycle: dec!(75),
            debt_to_equity: dec!(3.1),
            ..Default::default()
        };
        let recs = recommend(dec!(25), &m, &weak_scores());
        let categories: Vec<&str> = recs.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(
            categories,
            vec!["Liquidity", "Profitability", "Debt Management", "Cash Flow", "Working Capital"]
        );
        assert!(recs[0].description.contains("0.8"));
    }

    #[test]
    fn test_healthy_company_gets_nothing() {
        let m = MetricsSet {
            current_ratio: dec!(2),
            net_profit_margin: dec!(12),
            ..Default::default()
        };
        let strong = ScoreSet {
            liquidity_score: dec!(90),
            profitability_score: dec!(90),
            cash_flow_score: dec!(90),
            debt_health_score: dec!(90),
        };
        assert!(recommend(dec!(90), &m, &strong).is_empty());
    }

    #[test]
    fn test_weak_score_without_ratio_trigger_is_skipped() {
        // Liquidity score is weak but current ratio is above 1.0.
        let m = MetricsSet {
            current_ratio: dec!(1.2),
            net_profit_margin: dec!(10),
            ..Default::default()
        };
        let recs = recommend(dec!(65), &m, &weak_scores());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, "Working Capital");
        assert_eq!(recs[0].priority, Priority::Medium);
    }
}

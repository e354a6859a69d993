//! Small numeric helpers shared across the engine.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

/// Largest ratio magnitude carried into scoring arithmetic.
pub(crate) const RATIO_LIMIT: Decimal = dec!(1000000000);

/// Clamp a ratio to `[-RATIO_LIMIT, RATIO_LIMIT]`.
pub(crate) fn bounded(value: Decimal) -> Decimal {
    value.max(-RATIO_LIMIT).min(RATIO_LIMIT)
}

/// Divide, yielding zero when the denominator is not strictly positive.
///
/// The quotient is bounded; a quotient too large for `Decimal` saturates
/// at the bound with the numerator's sign.
pub(crate) fn ratio_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match numerator.checked_div(denominator) {
        Some(q) => bounded(q),
        None if numerator.is_sign_negative() => -RATIO_LIMIT,
        None => RATIO_LIMIT,
    }
}

pub(crate) fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

pub(crate) fn clamp_score(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED)
}

pub(crate) fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let n = Decimal::from(values.len() as u64);
    match values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
    {
        Some(total) => total / n,
        None => values
            .iter()
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v / n)),
    }
}

/// Population standard deviation (divides by n).
pub(crate) fn std_dev(values: &[Decimal]) -> Decimal {
    if values.len() < 2 {
        return Decimal::ZERO;
    }
    let m = mean(values);
    let deviations: Vec<Decimal> = values.iter().map(|v| v.saturating_sub(m)).collect();
    // Squares are taken on deviations scaled into [-1, 1].
    let scale = deviations
        .iter()
        .map(|d| d.abs())
        .max()
        .unwrap_or(Decimal::ZERO);
    if scale.is_zero() {
        return Decimal::ZERO;
    }
    let variance = deviations
        .iter()
        .map(|d| {
            let r = *d / scale;
            r * r
        })
        .sum::<Decimal>()
        / Decimal::from(values.len() as u64);
    sqrt_decimal(variance).saturating_mul(scale)
}

/// Least-squares slope of `values` against their index 0..n.
pub(crate) fn linear_slope(values: &[Decimal]) -> Decimal {
    if values.len() < 2 {
        return Decimal::ZERO;
    }
    let n = Decimal::from(values.len() as u64);
    let x_mean = (n - Decimal::ONE) / Decimal::TWO;
    let y_mean = mean(values);
    let mut numerator = Decimal::ZERO;
    let mut denominator = Decimal::ZERO;
    for (i, y) in values.iter().enumerate() {
        let dx = Decimal::from(i as u64) - x_mean;
        numerator += dx * (*y - y_mean);
        denominator += dx * dx;
    }
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

fn sqrt_decimal(val: Decimal) -> Decimal {
    if val <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    val.sqrt().unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ratio_or_zero_guards_denominator() {
        assert_eq!(ratio_or_zero(dec!(10), dec!(0)), Decimal::ZERO);
        assert_eq!(ratio_or_zero(dec!(10), dec!(-5)), Decimal::ZERO);
        assert_eq!(ratio_or_zero(dec!(10), dec!(4)), dec!(2.5));
    }

    #[test]
    fn test_slope_of_straight_line() {
        let values = [dec!(100), dec!(110), dec!(120), dec!(130)];
        assert_eq!(linear_slope(&values), dec!(10));
    }

    #[test]
    fn test_population_std_dev() {
        let values = [dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)];
        assert_eq!(std_dev(&values).round_dp(6), dec!(2));
    }

    #[test]
    fn test_ratio_or_zero_saturates_extreme_quotients() {
        assert_eq!(ratio_or_zero(dec!(1000000000000000000000000), dec!(0.01)), RATIO_LIMIT);
        assert_eq!(ratio_or_zero(dec!(-1000000000000000000000000), dec!(0.01)), -RATIO_LIMIT);
        assert_eq!(ratio_or_zero(Decimal::MAX, dec!(0.0000001)), RATIO_LIMIT);
    }

    #[test]
    fn test_std_dev_of_huge_swings() {
        let values = [dec!(500000000000000), dec!(-500000000000000), dec!(500000000000000)];
        let sd = std_dev(&values);
        // sqrt(2/9) * 1e15
        assert!((sd - dec!(471404520791031.6)).abs() < dec!(1), "sd {sd}");
    }

    #[test]
    fn test_mean_of_near_max_values() {
        let values = [Decimal::MAX, Decimal::MAX];
        assert!(mean(&values) > dec!(70000000000000000000000000000));
    }

    #[test]
    fn test_clamp_score_bounds() {
        assert_eq!(clamp_score(dec!(-3)), Decimal::ZERO);
        assert_eq!(clamp_score(dec!(130)), dec!(100));
        assert_eq!(clamp_score(dec!(55.5)), dec!(55.5));
    }
}

use rust_decimal::prelude::*;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::config::{EXPENSE_RATIO_BRACKETS, TRANSFER_TAX_BRACKETS};
use crate::error::ImmoInvestError;
use crate::types::{Money, Percent, Ratio};
use crate::ImmoInvestResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Monthly rate (decimal) from an annual rate in percentage points.
pub fn monthly_rate(annual_rate_percent: Percent) -> Decimal {
    annual_rate_percent / Decimal::ONE_HUNDRED / MONTHS_PER_YEAR
}

/// (1 + r)^n via iterative multiplication; `None` once it leaves the
/// Decimal range.
fn compound(rate: Decimal, periods: u32) -> Option<Decimal> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    (0..periods).try_fold(Decimal::ONE, |factor, _| factor.checked_mul(one_plus_r))
}

fn periods(years: u32) -> ImmoInvestResult<u32> {
    years
        .checked_mul(12)
        .ok_or_else(|| overflow("amortization_years"))
}

fn overflow(field: &str) -> ImmoInvestError {
    ImmoInvestError::out_of_range(field, "valeur hors du domaine de calcul (dépassement numérique)")
}

/// Fixed-rate mortgage payment: P * r(1+r)^n / ((1+r)^n - 1)
///
/// Returns zero for a non-positive principal or a zero amortization, and a
/// straight-line payment when the rate is zero. Terms whose payment cannot be
/// represented yield `InvalidRange`.
pub fn monthly_payment(
    principal: Money,
    annual_rate_percent: Percent,
    years: u32,
) -> ImmoInvestResult<Money> {
    if principal <= Decimal::ZERO || years == 0 {
        return Ok(Decimal::ZERO);
    }

    let n = periods(years)?;
    if annual_rate_percent.is_zero() {
        return Ok(principal / Decimal::from(n));
    }

    let r = monthly_rate(annual_rate_percent);
    let factor = compound(r, n).ok_or_else(|| overflow("annual_rate_percent"))?;
    let denominator = factor
        .checked_sub(Decimal::ONE)
        .ok_or_else(|| overflow("annual_rate_percent"))?;
    if denominator.is_zero() {
        return Ok(principal / Decimal::from(n));
    }

    principal
        .checked_mul(r)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| overflow("principal"))
}

/// Interest-only monthly payment.
pub fn interest_only_payment(principal: Money, annual_rate_percent: Percent) -> Money {
    if principal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    // Divide last so round rates stay exact
    principal * annual_rate_percent / (Decimal::ONE_HUNDRED * MONTHS_PER_YEAR)
}

/// Largest principal a given monthly payment can amortize: the present value
/// of the annuity, i.e. the inverse of [`monthly_payment`].
pub fn max_principal(
    payment: Money,
    annual_rate_percent: Percent,
    years: u32,
) -> ImmoInvestResult<Money> {
    if payment <= Decimal::ZERO || years == 0 {
        return Ok(Decimal::ZERO);
    }

    let n = periods(years)?;
    if annual_rate_percent.is_zero() {
        return payment
            .checked_mul(Decimal::from(n))
            .ok_or_else(|| overflow("payment"));
    }

    let r = monthly_rate(annual_rate_percent);
    let factor = compound(r, n).ok_or_else(|| overflow("annual_rate_percent"))?;
    if factor.is_zero() {
        return Ok(Decimal::ZERO);
    }

    factor
        .checked_sub(Decimal::ONE)
        .and_then(|growth| payment.checked_mul(growth))
        .and_then(|v| r.checked_mul(factor).and_then(|d| v.checked_div(d)))
        .ok_or_else(|| overflow("payment"))
}

/// Progressive Québec transfer tax ("taxe de bienvenue").
pub fn transfer_tax(purchase_price: Money) -> Money {
    if purchase_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;
    for (upper, rate) in TRANSFER_TAX_BRACKETS {
        let ceiling = match upper {
            Some(u) => purchase_price.min(u),
            None => purchase_price,
        };
        if ceiling > lower {
            tax += (ceiling - lower) * rate;
        }
        match upper {
            Some(u) if purchase_price > u => lower = u,
            _ => break,
        }
    }
    tax
}

/// Operating expense ratio (percent of gross revenue) for a building size.
pub fn expense_ratio(unit_count: u32) -> ImmoInvestResult<Percent> {
    if unit_count == 0 {
        return Err(ImmoInvestError::missing(
            "unit_count",
            "le nombre de logements doit être un entier positif",
        ));
    }

    Ok(EXPENSE_RATIO_BRACKETS
        .iter()
        .find(|(max_units, _)| unit_count <= *max_units)
        .map(|(_, pct)| *pct)
        .unwrap_or(dec!(50)))
}

/// Compound a holding-period return to a yearly rate:
/// ((1 + roi/100)^(12/months) - 1) * 100.
/// `None` for a non-positive base or when the result overflows.
pub fn annualize_percent(roi_percent: Percent, months: Decimal) -> Ratio {
    if months <= Decimal::ZERO {
        return None;
    }
    let base = Decimal::ONE + roi_percent / Decimal::ONE_HUNDRED;
    if base <= Decimal::ZERO {
        return None;
    }
    // Very short periods blow the exponent up; unrepresentable results are None
    MONTHS_PER_YEAR
        .checked_div(months)
        .and_then(|exponent| base.checked_powd(exponent))
        .and_then(|growth| growth.checked_sub(Decimal::ONE))
        .and_then(|gain| gain.checked_mul(Decimal::ONE_HUNDRED))
}

/// Round to cents, half away from zero.
pub fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage to two decimals.
pub fn round_percent(value: Percent) -> Percent {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round an optional ratio to two decimals.
pub fn round_ratio(value: Ratio) -> Ratio {
    value.map(round_percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_known_value() {
        // 300k over 25 years at 5%: ~1,753.77
        let pmt = monthly_payment(dec!(300_000), dec!(5), 25).unwrap();
        assert!((pmt - dec!(1753.77)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_payment_zero_rate_is_straight_line() {
        assert_eq!(monthly_payment(dec!(120_000), dec!(0), 10).unwrap(), dec!(1000));
    }

    #[test]
    fn test_payment_degenerate_inputs() {
        assert_eq!(monthly_payment(dec!(0), dec!(5), 25).unwrap(), Decimal::ZERO);
        assert_eq!(monthly_payment(dec!(-10_000), dec!(5), 25).unwrap(), Decimal::ZERO);
        assert_eq!(monthly_payment(dec!(100_000), dec!(5), 0).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_annuity_identity() {
        // M * ((1+r)^n - 1) / (r (1+r)^n) == P
        for (p, rate, years) in [
            (dec!(250_000), dec!(4.5), 25u32),
            (dec!(80_000), dec!(7), 10),
            (dec!(1_000_000), dec!(2.25), 30),
        ] {
            let m = monthly_payment(p, rate, years).unwrap();
            let back = max_principal(m, rate, years).unwrap();
            assert!((back - p).abs() < dec!(0.0001), "{p} -> {back}");
        }
    }

    #[test]
    fn test_long_amortization_overflow_is_an_error() {
        let err = monthly_payment(dec!(100_000), dec!(5), 2000).unwrap_err();
        assert!(matches!(err, ImmoInvestError::InvalidRange { .. }));
        let err = max_principal(dec!(1_000), dec!(5), 2000).unwrap_err();
        assert!(matches!(err, ImmoInvestError::InvalidRange { .. }));
        assert!(monthly_payment(dec!(100_000), dec!(5), u32::MAX).is_err());
    }

    #[test]
    fn test_interest_only() {
        assert_eq!(interest_only_payment(dec!(120_000), dec!(6)), dec!(600));
    }

    #[test]
    fn test_transfer_tax_brackets() {
        assert_eq!(transfer_tax(dec!(40_000)), dec!(200));
        // 250 + 2000
        assert_eq!(transfer_tax(dec!(250_000)), dec!(2250));
        // 250 + 2000 + 1500
        assert_eq!(transfer_tax(dec!(350_000)), dec!(3750));
        // 250 + 2000 + 3750 + 2000
        assert_eq!(transfer_tax(dec!(600_000)), dec!(8000));
        assert_eq!(transfer_tax(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_expense_ratio_table() {
        assert_eq!(expense_ratio(1).unwrap(), dec!(30));
        assert_eq!(expense_ratio(2).unwrap(), dec!(30));
        assert_eq!(expense_ratio(3).unwrap(), dec!(35));
        assert_eq!(expense_ratio(4).unwrap(), dec!(35));
        assert_eq!(expense_ratio(6).unwrap(), dec!(45));
        assert_eq!(expense_ratio(7).unwrap(), dec!(50));
        assert_eq!(expense_ratio(48).unwrap(), dec!(50));
        assert!(expense_ratio(0).is_err());
    }

    #[test]
    fn test_expense_ratio_monotonic() {
        let mut previous = Decimal::ZERO;
        for units in 1..=30 {
            let pct = expense_ratio(units).unwrap();
            assert!(pct >= previous);
            previous = pct;
        }
    }

    #[test]
    fn test_annualize_six_months() {
        // 10% over 6 months -> 21% per year
        let a = annualize_percent(dec!(10), dec!(6)).unwrap();
        assert!((a - dec!(21)).abs() < dec!(0.0001), "got {a}");
    }

    #[test]
    fn test_annualize_total_loss() {
        assert_eq!(annualize_percent(dec!(-100), dec!(6)), None);
        assert_eq!(annualize_percent(dec!(10), Decimal::ZERO), None);
    }

    #[test]
    fn test_annualize_tiny_period_does_not_overflow() {
        assert_eq!(annualize_percent(dec!(30), dec!(0.05)), None);
        assert_eq!(annualize_percent(dec!(30), dec!(0.0000000000000000000000000001)), None);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_money(dec!(60.745)), dec!(60.75));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
    }
}

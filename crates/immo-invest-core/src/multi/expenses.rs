use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::revenue::RevenueAnalysis;
use super::ExpenseDetails;
use crate::error::ImmoInvestError;
use crate::types::{percent_ratio, CostBreakdown, Money, Ratio};
use crate::ImmoInvestResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseAnalysis {
    pub taxes: CostBreakdown,
    pub operating: CostBreakdown,
    pub maintenance: CostBreakdown,
    /// Fees plus the vacancy and bad-debt allowances
    pub management: CostBreakdown,
    pub total_expenses: Money,
    /// Total expenses over effective gross revenue, in percent
    pub expense_ratio: Ratio,
    pub expenses_per_unit: Money,
}

/// Sum the expense buckets.
///
/// The management bucket charges vacancy and bad debt as a percentage of
/// potential gross revenue, on top of the vacancy already deducted on the
/// revenue side. Both deductions are kept.
pub fn analyze_expenses(
    details: &ExpenseDetails,
    revenue: &RevenueAnalysis,
    unit_count: u32,
) -> ImmoInvestResult<ExpenseAnalysis> {
    let all_items = details
        .taxes
        .iter()
        .chain(details.operating.iter())
        .chain(details.maintenance.iter())
        .chain(details.management.fees.iter());
    for (name, amount) in all_items {
        if *amount < Decimal::ZERO {
            return Err(ImmoInvestError::out_of_range(
                &format!("expenses.{name}"),
                "une dépense ne peut pas être négative",
            ));
        }
    }
    let mgmt = &details.management;
    if mgmt.vacancy_loss_percent < Decimal::ZERO || mgmt.bad_debt_percent < Decimal::ZERO {
        return Err(ImmoInvestError::out_of_range(
            "expenses.management",
            "les pourcentages d'inoccupation et de mauvaises créances doivent être positifs",
        ));
    }

    let taxes = CostBreakdown::from_items(details.taxes.clone());
    let operating = CostBreakdown::from_items(details.operating.clone());
    let maintenance = CostBreakdown::from_items(details.maintenance.clone());

    let gross = revenue.potential_gross_revenue;
    let mut management_items = mgmt.fees.clone();
    if !mgmt.vacancy_loss_percent.is_zero() {
        management_items.insert(
            "vacancy_loss".into(),
            gross * mgmt.vacancy_loss_percent / Decimal::ONE_HUNDRED,
        );
    }
    if !mgmt.bad_debt_percent.is_zero() {
        management_items.insert(
            "bad_debt_loss".into(),
            gross * mgmt.bad_debt_percent / Decimal::ONE_HUNDRED,
        );
    }
    let management = CostBreakdown::from_items(management_items);

    let total_expenses = taxes.total + operating.total + maintenance.total + management.total;
    let expense_ratio = percent_ratio(total_expenses, revenue.effective_gross_revenue);
    let expenses_per_unit = if unit_count == 0 {
        Decimal::ZERO
    } else {
        total_expenses / Decimal::from(unit_count)
    };

    Ok(ExpenseAnalysis {
        taxes,
        operating,
        maintenance,
        management,
        total_expenses,
        expense_ratio,
        expenses_per_unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multi::revenue::{analyze_revenue, RevenueAnalysis};
    use crate::multi::{ManagementExpenses, RevenueDetails};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn revenue(gross: Decimal, vacancy: Decimal) -> RevenueAnalysis {
        analyze_revenue(&RevenueDetails {
            gross_rental_revenue: Some(gross),
            vacancy_rate: Some(vacancy),
            ..Default::default()
        })
        .unwrap()
    }

    fn map(items: &[(&str, Decimal)]) -> BTreeMap<String, Decimal> {
        items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_bucket_totals() {
        let details = ExpenseDetails {
            taxes: map(&[("municipal", dec!(3000)), ("school", dec!(400))]),
            operating: map(&[("insurance", dec!(1500))]),
            maintenance: map(&[("repairs", dec!(1000))]),
            management: ManagementExpenses::default(),
        };
        let e = analyze_expenses(&details, &revenue(dec!(40_000), Decimal::ZERO), 4).unwrap();
        assert_eq!(e.taxes.total, dec!(3400));
        assert_eq!(e.total_expenses, dec!(5900));
        assert_eq!(e.expenses_per_unit, dec!(1475));
        assert_eq!(e.expense_ratio, Some(dec!(14.75)));
    }

    #[test]
    fn test_management_folds_vacancy_and_bad_debt() {
        let details = ExpenseDetails {
            management: ManagementExpenses {
                fees: map(&[("gestion", dec!(2000))]),
                vacancy_loss_percent: dec!(3),
                bad_debt_percent: dec!(1),
            },
            ..Default::default()
        };
        // Revenue side also deducts 3% vacancy: the double count is kept.
        let rev = revenue(dec!(50_000), dec!(0.03));
        let e = analyze_expenses(&details, &rev, 5).unwrap();
        assert_eq!(e.management.items["vacancy_loss"], dec!(1500));
        assert_eq!(e.management.items["bad_debt_loss"], dec!(500));
        assert_eq!(e.management.total, dec!(4000));
        assert_eq!(rev.vacancy_loss, dec!(1500));
    }

    #[test]
    fn test_negative_expense_rejected() {
        let details = ExpenseDetails {
            operating: map(&[("insurance", dec!(-1))]),
            ..Default::default()
        };
        let err = analyze_expenses(&details, &revenue(dec!(10_000), Decimal::ZERO), 2).unwrap_err();
        assert!(matches!(err, ImmoInvestError::InvalidRange { .. }));
    }
}

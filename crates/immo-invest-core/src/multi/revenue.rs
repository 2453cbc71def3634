use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::RevenueDetails;
use crate::error::ImmoInvestError;
use crate::types::{Money, Rate};
use crate::ImmoInvestResult;

/// Where the vacancy rate applied to the revenue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VacancySource {
    /// Supplied by the caller
    Explicit,
    /// 1 − occupied / listed units
    Occupancy,
    /// No unit list to derive from
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRevenueLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    pub annual_rent: Money,
    pub occupied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueAnalysis {
    pub units: Vec<UnitRevenueLine>,
    /// Potential annual rent of every unit
    pub rental_revenue: Money,
    pub other_revenue: Money,
    pub potential_gross_revenue: Money,
    pub vacancy_rate: Rate,
    pub vacancy_source: VacancySource,
    pub vacancy_loss: Money,
    pub effective_gross_revenue: Money,
}

/// Potential rent, other revenue, vacancy loss and effective gross revenue.
pub fn analyze_revenue(details: &RevenueDetails) -> ImmoInvestResult<RevenueAnalysis> {
    if details.units.is_empty() && details.gross_rental_revenue.is_none() {
        return Err(ImmoInvestError::missing(
            "revenue.units",
            "fournir la liste des logements ou les revenus locatifs bruts",
        ));
    }

    let units: Vec<UnitRevenueLine> = details
        .units
        .iter()
        .map(|u| UnitRevenueLine {
            unit_type: u.unit_type.clone(),
            annual_rent: u
                .annual_rent
                .or_else(|| u.monthly_rent.map(|m| m * dec!(12)))
                .unwrap_or(Decimal::ZERO),
            occupied: u.occupied,
        })
        .collect();

    let rental_revenue = if units.is_empty() {
        details.gross_rental_revenue.unwrap_or(Decimal::ZERO)
    } else {
        units.iter().map(|u| u.annual_rent).sum()
    };
    if rental_revenue < Decimal::ZERO || units.iter().any(|u| u.annual_rent < Decimal::ZERO) {
        return Err(ImmoInvestError::out_of_range(
            "revenue",
            "les loyers ne peuvent pas être négatifs",
        ));
    }

    let other_revenue: Money = details.additional_revenues.iter().map(|r| r.annual_amount).sum();
    let potential_gross_revenue = rental_revenue + other_revenue;

    let (vacancy_rate, vacancy_source) = match details.vacancy_rate {
        Some(rate) => {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(ImmoInvestError::out_of_range(
                    "revenue.vacancy_rate",
                    "le taux d'inoccupation doit être entre 0 et 1",
                ));
            }
            (rate, VacancySource::Explicit)
        }
        None if !units.is_empty() => {
            let occupied = units.iter().filter(|u| u.occupied).count();
            let occupancy = Decimal::from(occupied as u64) / Decimal::from(units.len() as u64);
            (Decimal::ONE - occupancy, VacancySource::Occupancy)
        }
        None => (Decimal::ZERO, VacancySource::None),
    };

    let vacancy_loss = potential_gross_revenue * vacancy_rate;

    Ok(RevenueAnalysis {
        units,
        rental_revenue,
        other_revenue,
        potential_gross_revenue,
        vacancy_rate,
        vacancy_source,
        vacancy_loss,
        effective_gross_revenue: potential_gross_revenue - vacancy_loss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multi::{RevenueSource, UnitRevenue};

    fn unit(monthly: Decimal, occupied: bool) -> UnitRevenue {
        UnitRevenue {
            unit_type: Some("4 1/2".into()),
            monthly_rent: Some(monthly),
            annual_rent: None,
            occupied,
        }
    }

    #[test]
    fn test_monthly_and_annual_rent() {
        let details = RevenueDetails {
            units: vec![
                unit(dec!(1000), true),
                UnitRevenue {
                    unit_type: None,
                    monthly_rent: Some(dec!(999)),
                    annual_rent: Some(dec!(11_000)),
                    occupied: true,
                },
            ],
            gross_rental_revenue: None,
            additional_revenues: vec![RevenueSource {
                name: "stationnement".into(),
                annual_amount: dec!(1200),
            }],
            vacancy_rate: Some(dec!(0.05)),
        };
        let r = analyze_revenue(&details).unwrap();
        assert_eq!(r.rental_revenue, dec!(23_000));
        assert_eq!(r.potential_gross_revenue, dec!(24_200));
        assert_eq!(r.vacancy_loss, dec!(1210));
        assert_eq!(r.effective_gross_revenue, dec!(22_990));
        assert_eq!(r.vacancy_source, VacancySource::Explicit);
    }

    #[test]
    fn test_vacancy_derived_from_occupancy() {
        let details = RevenueDetails {
            units: vec![
                unit(dec!(800), true),
                unit(dec!(800), true),
                unit(dec!(800), true),
                unit(dec!(800), false),
            ],
            ..Default::default()
        };
        let r = analyze_revenue(&details).unwrap();
        assert_eq!(r.vacancy_rate, dec!(0.25));
        assert_eq!(r.vacancy_source, VacancySource::Occupancy);
        assert_eq!(r.vacancy_loss, dec!(9600));
    }

    #[test]
    fn test_gross_revenue_without_units() {
        let details = RevenueDetails {
            gross_rental_revenue: Some(dec!(20_640)),
            ..Default::default()
        };
        let r = analyze_revenue(&details).unwrap();
        assert_eq!(r.vacancy_rate, Decimal::ZERO);
        assert_eq!(r.vacancy_source, VacancySource::None);
        assert_eq!(r.effective_gross_revenue, dec!(20_640));
    }

    #[test]
    fn test_missing_revenue() {
        assert!(matches!(
            analyze_revenue(&RevenueDetails::default()).unwrap_err(),
            ImmoInvestError::MissingRequiredField { .. }
        ));
    }

    #[test]
    fn test_negative_vacancy_rejected() {
        let details = RevenueDetails {
            gross_rental_revenue: Some(dec!(10_000)),
            vacancy_rate: Some(dec!(-0.1)),
            ..Default::default()
        };
        assert!(matches!(
            analyze_revenue(&details).unwrap_err(),
            ImmoInvestError::InvalidRange { .. }
        ));
    }
}

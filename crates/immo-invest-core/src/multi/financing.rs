use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_AMORTIZATION_YEARS, DEFAULT_MORTGAGE_RATE_PERCENT, DEFAULT_TERM_YEARS,
    MAX_AMORTIZATION_YEARS, MAX_INTEREST_RATE_PERCENT,
};
use crate::error::ImmoInvestError;
use crate::formulas::{interest_only_payment, monthly_payment};
use crate::types::{Money, Percent, Rate};
use crate::ImmoInvestResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    #[default]
    ConventionalMortgage,
    SecondMortgage,
    SellerFinancing,
    PrivateInvestor,
}

/// One loan layered on the acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingInstrument {
    #[serde(default)]
    pub kind: InstrumentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub principal: Money,
    #[serde(alias = "interest_rate")]
    pub annual_rate_percent: Percent,
    #[serde(default)]
    pub amortization_years: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_years: Option<u32>,
    #[serde(default)]
    pub interest_only: bool,
}

impl FinancingInstrument {
    pub fn validate(&self, field: &str) -> ImmoInvestResult<()> {
        if self.principal < Decimal::ZERO {
            return Err(ImmoInvestError::out_of_range(
                &format!("{field}.principal"),
                "le capital ne peut pas être négatif",
            ));
        }
        if !self.interest_only && self.amortization_years == 0 {
            return Err(ImmoInvestError::out_of_range(
                &format!("{field}.amortization_years"),
                "l'amortissement doit être positif sauf pour un prêt à intérêt seulement",
            ));
        }
        validate_loan_terms(field, self.annual_rate_percent, self.amortization_years)
    }

    pub fn monthly_payment(&self) -> ImmoInvestResult<Money> {
        if self.interest_only {
            Ok(interest_only_payment(self.principal, self.annual_rate_percent))
        } else {
            monthly_payment(self.principal, self.annual_rate_percent, self.amortization_years)
        }
    }

    pub fn annual_payment(&self) -> ImmoInvestResult<Money> {
        Ok(self.monthly_payment()? * dec!(12))
    }
}

/// Rate within ±100 points and amortization of at most 50 years.
pub fn validate_loan_terms(
    field: &str,
    annual_rate_percent: Percent,
    amortization_years: u32,
) -> ImmoInvestResult<()> {
    if annual_rate_percent.abs() > MAX_INTEREST_RATE_PERCENT {
        return Err(ImmoInvestError::out_of_range(
            &format!("{field}.annual_rate_percent"),
            format!(
                "le taux doit être compris entre -{MAX_INTEREST_RATE_PERCENT} et \
                 {MAX_INTEREST_RATE_PERCENT} %"
            ),
        ));
    }
    if amortization_years > MAX_AMORTIZATION_YEARS {
        return Err(ImmoInvestError::out_of_range(
            &format!("{field}.amortization_years"),
            format!("l'amortissement ne peut pas dépasser {MAX_AMORTIZATION_YEARS} ans"),
        ));
    }
    Ok(())
}

/// Rate and amortization of the conventional first mortgage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageTerms {
    #[serde(default = "default_rate", alias = "interest_rate")]
    pub annual_rate_percent: Percent,
    #[serde(default = "default_amortization")]
    pub amortization_years: u32,
    #[serde(default = "default_term")]
    pub term_years: u32,
}

impl MortgageTerms {
    pub fn validate(&self, field: &str) -> ImmoInvestResult<()> {
        if self.amortization_years == 0 {
            return Err(ImmoInvestError::out_of_range(
                &format!("{field}.amortization_years"),
                "l'amortissement doit être positif",
            ));
        }
        validate_loan_terms(field, self.annual_rate_percent, self.amortization_years)
    }
}

impl Default for MortgageTerms {
    fn default() -> Self {
        MortgageTerms {
            annual_rate_percent: DEFAULT_MORTGAGE_RATE_PERCENT,
            amortization_years: DEFAULT_AMORTIZATION_YEARS,
            term_years: DEFAULT_TERM_YEARS,
        }
    }
}

fn default_rate() -> Percent {
    DEFAULT_MORTGAGE_RATE_PERCENT
}

fn default_amortization() -> u32 {
    DEFAULT_AMORTIZATION_YEARS
}

fn default_term() -> u32 {
    DEFAULT_TERM_YEARS
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiFinancing {
    /// Required, strictly between 0 and 1
    #[serde(default)]
    pub down_payment_percentage: Rate,
    #[serde(default)]
    pub mortgage: MortgageTerms,
    /// Second mortgage, seller financing, private investors...
    #[serde(default, alias = "creative_financing")]
    pub creative: Vec<FinancingInstrument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSchedule {
    pub kind: InstrumentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub amortization_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_years: Option<u32>,
    pub interest_only: bool,
    pub monthly_payment: Money,
    pub annual_payment: Money,
}

impl TryFrom<&FinancingInstrument> for InstrumentSchedule {
    type Error = ImmoInvestError;

    fn try_from(i: &FinancingInstrument) -> ImmoInvestResult<Self> {
        Ok(InstrumentSchedule {
            kind: i.kind,
            label: i.label.clone(),
            principal: i.principal,
            annual_rate_percent: i.annual_rate_percent,
            amortization_years: i.amortization_years,
            term_years: i.term_years,
            interest_only: i.interest_only,
            monthly_payment: i.monthly_payment()?,
            annual_payment: i.annual_payment()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingAnalysis {
    pub down_payment: Money,
    pub mortgage: InstrumentSchedule,
    pub creative: Vec<InstrumentSchedule>,
    /// Mortgage principal plus every creative principal
    pub total_financed: Money,
    pub monthly_debt_service: Money,
    pub annual_debt_service: Money,
}

pub fn validate_down_payment(down_payment_percentage: Rate) -> ImmoInvestResult<()> {
    if down_payment_percentage.is_zero() {
        return Err(ImmoInvestError::missing(
            "financing.down_payment_percentage",
            "le pourcentage de mise de fonds est requis",
        ));
    }
    if down_payment_percentage < Decimal::ZERO || down_payment_percentage >= Decimal::ONE {
        return Err(ImmoInvestError::out_of_range(
            "financing.down_payment_percentage",
            "le pourcentage de mise de fonds doit être entre 0 et 1",
        ));
    }
    Ok(())
}

/// Size the conventional mortgage from the down payment and amortize every
/// creative instrument independently.
pub fn analyze_financing(
    purchase_price: Money,
    financing: &MultiFinancing,
) -> ImmoInvestResult<FinancingAnalysis> {
    validate_down_payment(financing.down_payment_percentage)?;
    financing.mortgage.validate("financing.mortgage")?;
    for (i, instrument) in financing.creative.iter().enumerate() {
        instrument.validate(&format!("financing.creative[{i}]"))?;
    }

    let down_payment = purchase_price * financing.down_payment_percentage;
    let conventional = FinancingInstrument {
        kind: InstrumentKind::ConventionalMortgage,
        label: None,
        principal: purchase_price - down_payment,
        annual_rate_percent: financing.mortgage.annual_rate_percent,
        amortization_years: financing.mortgage.amortization_years,
        term_years: Some(financing.mortgage.term_years),
        interest_only: false,
    };
    let mortgage = InstrumentSchedule::try_from(&conventional)?;
    let creative = financing
        .creative
        .iter()
        .map(InstrumentSchedule::try_from)
        .collect::<ImmoInvestResult<Vec<_>>>()?;

    let total_financed =
        mortgage.principal + creative.iter().map(|c| c.principal).sum::<Decimal>();
    let monthly_debt_service =
        mortgage.monthly_payment + creative.iter().map(|c| c.monthly_payment).sum::<Decimal>();
    let annual_debt_service =
        mortgage.annual_payment + creative.iter().map(|c| c.annual_payment).sum::<Decimal>();

    Ok(FinancingAnalysis {
        down_payment,
        mortgage,
        creative,
        total_financed,
        monthly_debt_service,
        annual_debt_service,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn financing(dp: Decimal) -> MultiFinancing {
        MultiFinancing {
            down_payment_percentage: dp,
            mortgage: MortgageTerms {
                annual_rate_percent: dec!(0),
                amortization_years: 25,
                term_years: 5,
            },
            creative: vec![],
        }
    }

    #[test]
    fn test_conventional_sizing() {
        let f = analyze_financing(dec!(375_000), &financing(dec!(0.20))).unwrap();
        assert_eq!(f.down_payment, dec!(75_000));
        assert_eq!(f.mortgage.principal, dec!(300_000));
        // Zero rate: 300,000 over 300 months
        assert_eq!(f.mortgage.monthly_payment, dec!(1_000));
        assert_eq!(f.annual_debt_service, dec!(12_000));
    }

    #[test]
    fn test_creative_layers_add_debt_service() {
        let mut fin = financing(dec!(0.20));
        fin.creative = vec![
            FinancingInstrument {
                kind: InstrumentKind::SellerFinancing,
                label: Some("balance de vente".into()),
                principal: dec!(50_000),
                annual_rate_percent: dec!(6),
                amortization_years: 0,
                term_years: Some(5),
                interest_only: true,
            },
            FinancingInstrument {
                kind: InstrumentKind::PrivateInvestor,
                label: None,
                principal: dec!(30_000),
                annual_rate_percent: dec!(0),
                amortization_years: 10,
                term_years: None,
                interest_only: false,
            },
        ];
        let f = analyze_financing(dec!(375_000), &fin).unwrap();
        assert_eq!(f.creative[0].annual_payment, dec!(3000));
        assert_eq!(f.creative[1].annual_payment, dec!(3000));
        assert_eq!(f.annual_debt_service, dec!(18_000));
        assert_eq!(f.total_financed, dec!(380_000));
    }

    #[test]
    fn test_down_payment_required() {
        let err = analyze_financing(dec!(500_000), &financing(Decimal::ZERO)).unwrap_err();
        assert!(matches!(err, ImmoInvestError::MissingRequiredField { .. }));
        let err = analyze_financing(dec!(500_000), &financing(dec!(1))).unwrap_err();
        assert!(matches!(err, ImmoInvestError::InvalidRange { .. }));
    }

    #[test]
    fn test_amortized_instrument_needs_amortization() {
        let instrument = FinancingInstrument {
            kind: InstrumentKind::SecondMortgage,
            label: None,
            principal: dec!(10_000),
            annual_rate_percent: dec!(8),
            amortization_years: 0,
            term_years: None,
            interest_only: false,
        };
        assert!(instrument.validate("x").is_err());
    }

    #[test]
    fn test_out_of_domain_terms_are_rejected() {
        let mut fin = financing(dec!(0.20));
        fin.mortgage.annual_rate_percent = dec!(5);
        fin.mortgage.amortization_years = 2000;
        let err = analyze_financing(dec!(375_000), &fin).unwrap_err();
        assert!(matches!(err, ImmoInvestError::InvalidRange { ref field, .. }
            if field == "financing.mortgage.amortization_years"));

        let mut fin = financing(dec!(0.20));
        fin.creative = vec![FinancingInstrument {
            kind: InstrumentKind::PrivateInvestor,
            label: None,
            principal: dec!(10_000),
            annual_rate_percent: dec!(250),
            amortization_years: 10,
            term_years: None,
            interest_only: false,
        }];
        let err = analyze_financing(dec!(375_000), &fin).unwrap_err();
        assert!(matches!(err, ImmoInvestError::InvalidRange { ref field, .. }
            if field == "financing.creative[0].annual_rate_percent"));
    }

    #[test]
    fn test_longest_allowed_amortization_computes() {
        let mut fin = financing(dec!(0.20));
        fin.mortgage.annual_rate_percent = dec!(100);
        fin.mortgage.amortization_years = 50;
        let f = analyze_financing(dec!(375_000), &fin).unwrap();
        assert!(f.mortgage.monthly_payment > Decimal::ZERO);
    }
}

pub mod scenario;
pub mod sensitivity;

pub use scenario::{
    analyze_scenario, compare_scenarios, ComparisonRequest, ComparisonResult, ComparisonSummary,
    RankedScenario, ScenarioAnalysis,
};
pub use sensitivity::{
    sensitivity_analysis, SensitivityRequest, SensitivityResult, SensitivityVariant,
};

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{
    DEFAULT_MIN_VIABLE_CASHFLOW_PER_UNIT, DEFAULT_VIABILITY_PENALTY, DEFAULT_WEIGHT_CAP_RATE,
    DEFAULT_WEIGHT_CASHFLOW, DEFAULT_WEIGHT_CASH_ON_CASH,
};
use crate::error::ImmoInvestError;
use crate::flip::{analyze_flip, FlipAnalysis, FlipInput};
use crate::multi::{analyze_multi, MultiAnalysis, MultiInput};
use crate::types::{ComputationOutput, DealType, Money};
use crate::ImmoInvestResult;

/// Keys whose presence marks a deal as a FLIP.
const FLIP_MARKERS: [&str; 3] = ["selling_price", "sale_price", "final_price"];

/// Either kind of deal. Deserialized by shape: anything carrying a selling
/// price is a FLIP, the rest is a MULTI. An explicit `deal_type` wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Deal {
    Flip(FlipInput),
    Multi(MultiInput),
}

impl Deal {
    pub fn deal_type(&self) -> DealType {
        match self {
            Deal::Flip(_) => DealType::Flip,
            Deal::Multi(_) => DealType::Multi,
        }
    }

    pub fn from_value(value: serde_json::Value) -> ImmoInvestResult<Self> {
        let deal_type = classify(&value)?;
        Ok(match deal_type {
            DealType::Flip => Deal::Flip(serde_json::from_value(value)?),
            DealType::Multi => Deal::Multi(serde_json::from_value(value)?),
        })
    }

    pub fn to_value(&self) -> ImmoInvestResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn analyze(&self) -> ImmoInvestResult<ComputationOutput<DealAnalysis>> {
        Ok(match self {
            Deal::Flip(input) => map_output(analyze_flip(input)?, DealAnalysis::Flip),
            Deal::Multi(input) => map_output(analyze_multi(input)?, DealAnalysis::Multi),
        })
    }
}

fn map_output<T: Serialize>(
    out: ComputationOutput<T>,
    wrap: fn(T) -> DealAnalysis,
) -> ComputationOutput<DealAnalysis> {
    ComputationOutput {
        result: wrap(out.result),
        methodology: out.methodology,
        assumptions: out.assumptions,
        warnings: out.warnings,
        metadata: out.metadata,
    }
}

/// Classify a raw deal object without deserializing it.
pub fn classify(value: &serde_json::Value) -> ImmoInvestResult<DealType> {
    let obj = value.as_object().ok_or_else(|| {
        ImmoInvestError::SerializationError("un scénario doit être un objet JSON".into())
    })?;
    if let Some(explicit) = obj.get("deal_type") {
        return Ok(serde_json::from_value(explicit.clone())?);
    }
    if FLIP_MARKERS.iter().any(|k| obj.contains_key(*k)) {
        Ok(DealType::Flip)
    } else {
        Ok(DealType::Multi)
    }
}

impl<'de> Deserialize<'de> for Deal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Deal::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// A named deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub deal: Deal,
}

impl Scenario {
    pub fn new(name: impl Into<String>, deal: Deal) -> Self {
        Scenario {
            name: name.into(),
            deal,
        }
    }

    pub fn deal_type(&self) -> DealType {
        self.deal.deal_type()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DealAnalysis {
    Flip(FlipAnalysis),
    Multi(MultiAnalysis),
}

impl DealAnalysis {
    pub fn is_viable(&self) -> bool {
        match self {
            DealAnalysis::Flip(a) => a.summary.is_viable,
            DealAnalysis::Multi(a) => a.summary.is_viable,
        }
    }

    /// Every comparable metric this analysis defines.
    pub fn metrics(&self) -> BTreeMap<Criterion, Decimal> {
        let mut m = BTreeMap::new();
        let mut put = |c: Criterion, v: Option<Decimal>| {
            if let Some(v) = v {
                m.insert(c, v);
            }
        };
        match self {
            DealAnalysis::Flip(a) => {
                put(Criterion::Profit, Some(a.summary.profit));
                put(Criterion::Roi, a.summary.roi);
                put(Criterion::AnnualizedRoi, a.summary.annualized_roi);
            }
            DealAnalysis::Multi(a) => {
                put(Criterion::CashflowPerUnit, Some(a.summary.cashflow_per_unit));
                put(Criterion::CapRate, a.summary.cap_rate);
                put(Criterion::CashOnCash, a.summary.cash_on_cash);
                put(Criterion::NetOperatingIncome, Some(a.summary.net_operating_income));
                put(Criterion::Dscr, a.details.ratios.dscr);
            }
        }
        m
    }

    /// Weighted score used to rank heterogeneous deals.
    pub fn score(&self, options: &ComparisonOptions) -> Option<Decimal> {
        if let Some(criterion) = options.criterion {
            return self.metrics().get(&criterion).copied();
        }
        match self {
            DealAnalysis::Flip(a) => a.summary.roi,
            DealAnalysis::Multi(a) => {
                let s = &a.summary;
                let w = &options.weights;
                let mut score = s.cashflow_per_unit * w.cashflow_per_unit
                    + s.cap_rate.unwrap_or_default() * w.cap_rate
                    + s.cash_on_cash.unwrap_or_default() * w.cash_on_cash;
                if s.cashflow_per_unit < options.min_viable_cashflow_per_unit {
                    score -= options.viability_penalty;
                }
                Some(score)
            }
        }
    }
}

/// Metric a comparison can rank on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Profit,
    Roi,
    AnnualizedRoi,
    CashflowPerUnit,
    CapRate,
    CashOnCash,
    #[serde(alias = "noi")]
    NetOperatingIncome,
    Dscr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub cashflow_per_unit: Decimal,
    pub cap_rate: Decimal,
    pub cash_on_cash: Decimal,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            cashflow_per_unit: DEFAULT_WEIGHT_CASHFLOW,
            cap_rate: DEFAULT_WEIGHT_CAP_RATE,
            cash_on_cash: DEFAULT_WEIGHT_CASH_ON_CASH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonOptions {
    pub weights: ScoringWeights,
    pub min_viable_cashflow_per_unit: Money,
    pub viability_penalty: Decimal,
    /// Rank on this single metric instead of the weighted score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criterion: Option<Criterion>,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        ComparisonOptions {
            weights: ScoringWeights::default(),
            min_viable_cashflow_per_unit: DEFAULT_MIN_VIABLE_CASHFLOW_PER_UNIT,
            viability_penalty: DEFAULT_VIABILITY_PENALTY,
            criterion: None,
        }
    }
}

impl ComparisonOptions {
    pub fn ranked_by(criterion: Criterion) -> Self {
        ComparisonOptions {
            criterion: Some(criterion),
            ..Default::default()
        }
    }
}

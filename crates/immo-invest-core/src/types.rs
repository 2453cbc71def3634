use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Ratios expressed as decimals (0.20 = 20%): down payment, LTV inputs,
/// vacancy rate.
pub type Rate = Decimal;

/// Percentage points (5 = 5%): interest rates and every reported return metric.
pub type Percent = Decimal;

/// A ratio whose denominator may be zero. `None` serialises as `null`.
pub type Ratio = Option<Decimal>;

/// Investment strategy a deal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealType {
    /// Buy, renovate, resell.
    Flip,
    /// Income-generating multi-unit building.
    Multi,
}

/// Qualitative rating on a tiered threshold scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rating {
    Insufficient,
    Acceptable,
    Good,
    Excellent,
}

impl Rating {
    pub fn label(&self) -> &'static str {
        match self {
            Rating::Insufficient => "INSUFFICIENT",
            Rating::Acceptable => "ACCEPTABLE",
            Rating::Good => "GOOD",
            Rating::Excellent => "EXCELLENT",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Named cost categories with their derived total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub items: BTreeMap<String, Money>,
    pub total: Money,
}

impl CostBreakdown {
    pub fn from_items<I, K>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, Money)>,
        K: Into<String>,
    {
        let items: BTreeMap<String, Money> =
            items.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let total = items.values().copied().sum();
        CostBreakdown { items, total }
    }

    /// A single lump sum recorded under `label`.
    pub fn flat(label: &str, amount: Money) -> Self {
        Self::from_items([(label, amount)])
    }

    /// Build from a caller-supplied JSON map. Only numeric values are kept;
    /// strings, booleans and nested objects are ignored.
    pub fn from_json_map(map: &BTreeMap<String, serde_json::Value>) -> Self {
        Self::from_items(
            map.iter()
                .filter_map(|(k, v)| json_number_to_decimal(v).map(|d| (k.clone(), d))),
        )
    }

    /// Multiply every item (and the total) by `factor`.
    pub fn scaled(&self, factor: Decimal) -> Self {
        Self::from_items(self.items.iter().map(|(k, v)| (k.clone(), *v * factor)))
    }
}

/// A cost input: either a single amount or an itemized map trusted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostSpec {
    Flat(Money),
    Itemized(BTreeMap<String, serde_json::Value>),
}

impl CostSpec {
    pub fn to_breakdown(&self) -> CostBreakdown {
        match self {
            CostSpec::Flat(amount) => CostBreakdown::flat("total", *amount),
            CostSpec::Itemized(map) => CostBreakdown::from_json_map(map),
        }
    }
}

/// Result of a detailed analysis: headline metrics plus the full breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult<S, D> {
    pub summary: S,
    pub details: D,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
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
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// `numerator / denominator`, or `None` when the denominator is zero.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Ratio {
    if denominator.is_zero() {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// `numerator / denominator * 100`, or `None` when the denominator is zero.
pub fn percent_ratio(numerator: Decimal, denominator: Decimal) -> Ratio {
    ratio(numerator, denominator).map(|r| r * Decimal::ONE_HUNDRED)
}

/// Read a JSON number as a Decimal. Non-numbers yield `None`.
pub fn json_number_to_decimal(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => {
            let repr = n.to_string();
            Decimal::from_str(&repr)
                .or_else(|_| Decimal::from_scientific(&repr))
                .ok()
        }
        _ => None,
    }
}

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use super::scenario::{compare_scenarios, ComparisonResult};
use super::{ComparisonOptions, Criterion, Deal, Scenario};
use crate::error::ImmoInvestError;
use crate::types::{json_number_to_decimal, with_metadata, ComputationOutput, DealType, Percent};
use crate::ImmoInvestResult;

const DEFAULT_VARIATION_PERCENT: Percent = dec!(20);
const DEFAULT_STEPS: u32 = 2;

/// Request body of a sensitivity sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityRequest {
    pub scenario: Scenario,
    pub variable: String,
    #[serde(default = "default_variation")]
    pub variation_percent: Percent,
    #[serde(default = "default_steps")]
    pub steps: u32,
}

fn default_variation() -> Percent {
    DEFAULT_VARIATION_PERCENT
}

fn default_steps() -> u32 {
    DEFAULT_STEPS
}

impl SensitivityRequest {
    pub fn run(&self) -> ImmoInvestResult<ComputationOutput<SensitivityResult>> {
        sensitivity_analysis(&self.scenario, &self.variable, self.variation_percent, self.steps)
    }
}

/// One perturbed copy of the base scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityVariant {
    pub name: String,
    /// Signed change applied to the variable; zero for the base scenario
    pub percent_change: Percent,
    pub value: Decimal,
    pub scenario: Scenario,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub variable: String,
    pub base_value: Decimal,
    pub variation_percent: Percent,
    pub steps: u32,
    pub criterion: Criterion,
    /// Variants from -V% to +V%, base scenario last
    pub scenarios: Vec<SensitivityVariant>,
    pub comparison: ComparisonResult,
}

/// Sweep one input of a scenario over ±`variation_percent` in `steps`
/// increments per side and rank the variants.
///
/// `variable` is a dotted path into the deal, e.g. `purchase_price`,
/// `financing.mortgage.annual_rate_percent` or `revenue.units.0.monthly_rent`.
/// Variants that fail validation are left out of the ranking.
pub fn sensitivity_analysis(
    scenario: &Scenario,
    variable: &str,
    variation_percent: Percent,
    steps: u32,
) -> ImmoInvestResult<ComputationOutput<SensitivityResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if steps == 0 {
        return Err(ImmoInvestError::out_of_range(
            "steps",
            "le nombre de paliers doit être positif",
        ));
    }
    if variation_percent <= Decimal::ZERO {
        return Err(ImmoInvestError::out_of_range(
            "variation_percent",
            "la variation doit être positive",
        ));
    }

    let base_json = scenario.deal.to_value()?;
    let path = canonical_path(scenario.deal_type(), variable);
    let base_field = lookup(&base_json, &path).ok_or_else(|| {
        ImmoInvestError::missing(variable, "variable absente du scénario")
    })?;
    let integral = base_field.is_u64() || base_field.is_i64();
    let base_value = field_decimal(base_field)
        .ok_or_else(|| ImmoInvestError::out_of_range(variable, "la variable n'est pas numérique"))?;
    if base_value.is_zero() {
        return Err(ImmoInvestError::out_of_range(
            variable,
            "une variable nulle ne peut pas varier en pourcentage",
        ));
    }

    let criterion = match scenario.deal_type() {
        DealType::Flip => Criterion::Profit,
        DealType::Multi => Criterion::CashflowPerUnit,
    };
    let base_name = if scenario.name.is_empty() {
        "Base".to_string()
    } else {
        scenario.name.clone()
    };

    let mut variants = Vec::with_capacity(2 * steps as usize + 1);
    for pct in sweep(variation_percent, steps) {
        let mut value = base_value * (Decimal::ONE + pct / Decimal::ONE_HUNDRED);
        if integral {
            let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            if rounded != value {
                warnings.push(format!("{variable} arrondi à {rounded} pour la variation {pct} %"));
            }
            value = rounded;
        }
        let mut json = base_json.clone();
        if let Some(slot) = lookup_mut(&mut json, &path) {
            *slot = encode(value, integral)?;
        }
        let label = format!(
            "{base_name} ({}{} %)",
            if pct > Decimal::ZERO { "+" } else { "" },
            pct.round_dp(2).normalize()
        );
        variants.push(SensitivityVariant {
            name: label.clone(),
            percent_change: pct,
            value,
            scenario: Scenario::new(label, Deal::from_value(json)?),
        });
    }
    variants.push(SensitivityVariant {
        name: format!("{base_name} (base)"),
        percent_change: Decimal::ZERO,
        value: base_value,
        scenario: Scenario::new(format!("{base_name} (base)"), scenario.deal.clone()),
    });

    let mut ranked: Vec<Scenario> = Vec::with_capacity(variants.len());
    for variant in &variants {
        match variant.scenario.deal.analyze() {
            Ok(_) => ranked.push(variant.scenario.clone()),
            Err(e) => warnings.push(format!("{} écarté : {e}", variant.name)),
        }
    }
    if ranked.is_empty() {
        return Err(ImmoInvestError::InsufficientData(
            "aucune variante analysable".into(),
        ));
    }
    let comparison = compare_scenarios(&ranked, &ComparisonOptions::ranked_by(criterion))?;
    warnings.extend(comparison.warnings);

    tracing::debug!(variable, variants = variants.len(), "sensitivity sweep computed");

    let output = SensitivityResult {
        variable: variable.to_string(),
        base_value,
        variation_percent,
        steps,
        criterion,
        scenarios: variants,
        comparison: comparison.result,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "One-way sensitivity sweep",
        &serde_json::json!({
            "variable": variable,
            "variation_percent": variation_percent,
            "steps": steps,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// -V ... -V/S, +V/S ... +V
fn sweep(variation: Percent, steps: u32) -> Vec<Percent> {
    let s = Decimal::from(steps);
    let down = (1..=steps).rev().map(|i| -variation * Decimal::from(i) / s);
    let up = (1..=steps).map(|i| variation * Decimal::from(i) / s);
    down.chain(up).collect()
}

fn field_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        other => json_number_to_decimal(other),
    }
}

fn encode(value: Decimal, integral: bool) -> ImmoInvestResult<Value> {
    if integral {
        let n = value.to_i64().ok_or_else(|| {
            ImmoInvestError::SerializationError(format!("{value} hors des bornes entières"))
        })?;
        Ok(Value::from(n))
    } else {
        Ok(Value::String(value.normalize().to_string()))
    }
}

/// Input aliases accepted on deserialization, mapped to the serialized keys.
const FLIP_ALIASES: [(&str, &str); 3] = [
    ("initial_price", "purchase_price"),
    ("sale_price", "selling_price"),
    ("final_price", "selling_price"),
];

const MULTI_ALIASES: [(&str, &str); 5] = [
    ("price", "purchase_price"),
    ("units", "unit_count"),
    ("revenue_details", "revenue"),
    ("expense_details", "expenses"),
    ("financing_details", "financing"),
];

const NESTED_ALIASES: [(&str, &str); 2] = [
    ("interest_rate", "annual_rate_percent"),
    ("creative_financing", "creative"),
];

fn resolve<'a>(table: &[(&str, &'a str)], key: &'a str) -> &'a str {
    table
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key, |(_, canonical)| *canonical)
}

/// Rewrite a dotted path written with input aliases (`final_price`,
/// `units`, ...) onto the keys of the serialized deal.
fn canonical_path(deal_type: DealType, variable: &str) -> String {
    let top = match deal_type {
        DealType::Flip => &FLIP_ALIASES[..],
        DealType::Multi => &MULTI_ALIASES[..],
    };
    variable
        .split('.')
        .enumerate()
        .map(|(depth, key)| {
            if depth == 0 {
                resolve(top, key)
            } else {
                resolve(&NESTED_ALIASES, key)
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, key| match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn lookup_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.').try_fold(root, |node, key| match node {
        Value::Object(map) => map.get_mut(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(move |i| items.get_mut(i)),
        _ => None,
    })
}

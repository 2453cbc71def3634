use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{ComparisonOptions, Criterion, DealAnalysis, Scenario};
use crate::error::ImmoInvestError;
use crate::types::{with_metadata, ComputationOutput, DealType};
use crate::ImmoInvestResult;

/// Request body of a comparison: the scenarios plus optional scoring options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonRequest {
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub options: ComparisonOptions,
}

impl ComparisonRequest {
    pub fn run(&self) -> ImmoInvestResult<ComputationOutput<ComparisonResult>> {
        compare_scenarios(&self.scenarios, &self.options)
    }
}

/// One scenario with its analysis, as returned by the single-deal endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub scenario: Scenario,
    pub deal_type: DealType,
    pub analysis: DealAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedScenario {
    /// 1-based
    pub rank: usize,
    pub name: String,
    pub deal_type: DealType,
    pub score: Option<Decimal>,
    pub is_viable: bool,
    pub metrics: BTreeMap<Criterion, Decimal>,
    pub analysis: DealAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub total: usize,
    pub flip_count: usize,
    pub multi_count: usize,
    pub viable_count: usize,
    pub average_score: Option<Decimal>,
    pub max_score: Option<Decimal>,
    pub min_score: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub ranked_scenarios: Vec<RankedScenario>,
    pub best_overall: Option<String>,
    /// First scenario holding the maximum of each metric
    pub best_by_metric: BTreeMap<Criterion, String>,
    pub summary: ComparisonSummary,
}

/// Analyze a single named deal.
pub fn analyze_scenario(scenario: &Scenario) -> ImmoInvestResult<ComputationOutput<ScenarioAnalysis>> {
    let start = Instant::now();
    let out = scenario.deal.analyze()?;
    let result = ScenarioAnalysis {
        scenario: scenario.clone(),
        deal_type: scenario.deal_type(),
        analysis: out.result,
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &out.methodology,
        &out.assumptions,
        out.warnings,
        elapsed,
        result,
    ))
}

/// Analyze every scenario, score it and rank best first.
///
/// FLIP deals score on ROI; MULTI deals on a weighted blend of cashflow per
/// door, cap rate and cash-on-cash, penalized below the viable cashflow.
/// Ties keep their input order.
pub fn compare_scenarios(
    scenarios: &[Scenario],
    options: &ComparisonOptions,
) -> ImmoInvestResult<ComputationOutput<ComparisonResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if scenarios.is_empty() {
        return Err(ImmoInvestError::InsufficientData(
            "au moins un scénario est requis pour la comparaison".into(),
        ));
    }

    let mut ranked = Vec::with_capacity(scenarios.len());
    for (i, scenario) in scenarios.iter().enumerate() {
        let out = scenario.deal.analyze()?;
        let name = if scenario.name.is_empty() {
            format!("Scénario {}", i + 1)
        } else {
            scenario.name.clone()
        };
        warnings.extend(out.warnings.into_iter().map(|w| format!("{name} : {w}")));
        let analysis = out.result;
        let score = analysis.score(options);
        if score.is_none() {
            warnings.push(format!("{name} : aucun score pour le critère demandé"));
        }
        ranked.push(RankedScenario {
            rank: 0,
            name,
            deal_type: scenario.deal_type(),
            score,
            is_viable: analysis.is_viable(),
            metrics: analysis.metrics(),
            analysis,
        });
    }

    let best_by_metric = best_by_metric(&ranked);

    // Stable: equal scores keep input order. Unscored scenarios sink.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    for (i, r) in ranked.iter_mut().enumerate() {
        r.rank = i + 1;
    }

    let best_overall = ranked
        .first()
        .filter(|r| r.score.is_some())
        .map(|r| r.name.clone());
    let summary = summarize(&ranked);

    tracing::debug!(count = ranked.len(), ?best_overall, "scenarios compared");

    let output = ComparisonResult {
        ranked_scenarios: ranked,
        best_overall,
        best_by_metric,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Multi-scenario comparison (weighted score ranking)",
        options,
        warnings,
        elapsed,
        output,
    ))
}

/// Expects scenarios in input order: ties go to the earliest one.
fn best_by_metric(scenarios: &[RankedScenario]) -> BTreeMap<Criterion, String> {
    let mut best: BTreeMap<Criterion, (Decimal, &str)> = BTreeMap::new();
    for r in scenarios {
        for (criterion, value) in &r.metrics {
            match best.get(criterion) {
                Some((current, _)) if *current >= *value => {}
                _ => {
                    best.insert(*criterion, (*value, r.name.as_str()));
                }
            }
        }
    }
    best.into_iter()
        .map(|(c, (_, name))| (c, name.to_string()))
        .collect()
}

fn summarize(ranked: &[RankedScenario]) -> ComparisonSummary {
    let scores: Vec<Decimal> = ranked.iter().filter_map(|r| r.score).collect();
    let average_score = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<Decimal>() / Decimal::from(scores.len() as u64))
    };
    ComparisonSummary {
        total: ranked.len(),
        flip_count: ranked.iter().filter(|r| r.deal_type == DealType::Flip).count(),
        multi_count: ranked.iter().filter(|r| r.deal_type == DealType::Multi).count(),
        viable_count: ranked.iter().filter(|r| r.is_viable).count(),
        average_score,
        max_score: scores.iter().copied().max(),
        min_score: scores.iter().copied().min(),
    }
}

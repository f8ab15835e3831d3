use super::engine::weighted_total;
use super::policy::{round2, WeightPolicy};
use crate::cache::ScoreShape;
use crate::catalog::{Contestant, ContestantId, Criterion, CriterionId, JudgeId};
use std::collections::BTreeMap;

/// Mean score per (contestant, criterion); `None` when no judge scored it.
pub type AggregateScores = BTreeMap<ContestantId, BTreeMap<CriterionId, Option<f64>>>;

/// Average every judge's present scores, rounded to 2 decimals.
///
/// Only catalog contestants and criteria appear in the result.
pub fn aggregate(
    per_judge: &BTreeMap<JudgeId, ScoreShape>,
    criteria: &[Criterion],
    contestants: &[Contestant],
) -> AggregateScores {
    contestants
        .iter()
        .map(|contestant| {
            let means = criteria
                .iter()
                .map(|criterion| {
                    let present: Vec<f64> = per_judge
                        .values()
                        .filter_map(|shape| shape.score(&contestant.id, &criterion.id))
                        .map(|score| score.as_f64())
                        .collect();
                    let mean = if present.is_empty() {
                        None
                    } else {
                        Some(round2(present.iter().sum::<f64>() / present.len() as f64))
                    };
                    (criterion.id.clone(), mean)
                })
                .collect();
            (contestant.id.clone(), means)
        })
        .collect()
}

/// Overall `Fixed100` totals from aggregated means, in catalog order.
pub fn aggregate_totals(
    scores: &AggregateScores,
    criteria: &[Criterion],
    contestants: &[Contestant],
) -> Vec<(ContestantId, Option<f64>)> {
    contestants
        .iter()
        .map(|contestant| {
            let means = scores.get(&contestant.id);
            let total = weighted_total(
                criteria,
                |criterion| means.and_then(|m| m.get(criterion).copied().flatten()),
                WeightPolicy::Fixed100,
            );
            (contestant.id.clone(), total)
        })
        .collect()
}

use super::policy::WeightPolicy;
use crate::cache::ScoreShape;
use crate::catalog::{Contestant, ContestantId, Criterion, CriterionId};

/// Weighted total of one contestant's scores.
///
/// `score_of` yields the score for a criterion, `None` when absent. Absent
/// criteria contribute to neither numerator nor denominator. Returns `None`
/// under `PresentWeight` when nothing is scored (or the scored weights sum to
/// zero); `Fixed100` always yields a number.
pub fn weighted_total<F>(criteria: &[Criterion], score_of: F, policy: WeightPolicy) -> Option<f64>
where
    F: Fn(&CriterionId) -> Option<f64>,
{
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut any_present = false;

    for criterion in criteria {
        if let Some(score) = score_of(&criterion.id) {
            weighted_sum += score * criterion.weight;
            weight_sum += criterion.weight;
            any_present = true;
        }
    }

    match policy {
        WeightPolicy::Fixed100 => Some(weighted_sum / 100.0),
        WeightPolicy::PresentWeight => {
            if !any_present || weight_sum == 0.0 {
                None
            } else {
                Some(weighted_sum / weight_sum)
            }
        }
    }
}

/// Totals for every catalog contestant from a single judge's shape, in catalog order.
pub fn judge_totals(
    shape: &ScoreShape,
    contestants: &[Contestant],
    criteria: &[Criterion],
    policy: WeightPolicy,
) -> Vec<(ContestantId, Option<f64>)> {
    contestants
        .iter()
        .map(|contestant| {
            let total = weighted_total(
                criteria,
                |criterion| shape.score(&contestant.id, criterion).map(|s| s.as_f64()),
                policy,
            );
            (contestant.id.clone(), total)
        })
        .collect()
}

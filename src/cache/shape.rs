use super::input::{Score, ScoreInput};
use crate::catalog::{Contestant, ContestantId, Criterion, CriterionId};
use crate::store::{ContestantUpdate, PersistedScoreSheet, ScoreUpdate};
use std::collections::BTreeMap;

/// One contestant's working entry for a judge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContestantEntry {
    pub comments: String,
    pub scores: BTreeMap<CriterionId, Option<Score>>,
}

/// A judge's in-memory working set.
///
/// The set of contestant and criterion keys is fixed by `initialize`; every
/// mutation returns a new shape and never adds keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreShape {
    entries: BTreeMap<ContestantId, ContestantEntry>,
}

impl ScoreShape {
    /// Every contestant gets empty comments and every criterion an absent score.
    pub fn initialize(contestants: &[Contestant], criteria: &[Criterion]) -> Self {
        let empty_scores: BTreeMap<CriterionId, Option<Score>> =
            criteria.iter().map(|c| (c.id.clone(), None)).collect();

        let entries = contestants
            .iter()
            .map(|c| {
                (
                    c.id.clone(),
                    ContestantEntry {
                        comments: String::new(),
                        scores: empty_scores.clone(),
                    },
                )
            })
            .collect();

        Self { entries }
    }

    /// Overlay persisted comments and scores. Ids outside the shape are
    /// skipped; stored values that are not valid scores are treated as absent.
    pub fn hydrate(&self, persisted: &PersistedScoreSheet) -> Self {
        let mut merged = self.clone();

        for (contestant, entry) in merged.entries.iter_mut() {
            if let Some(comment) = persisted.comments.get(contestant) {
                entry.comments = comment.clone();
            }
            let Some(stored) = persisted.scores.get(contestant) else {
                continue;
            };
            for (criterion, slot) in entry.scores.iter_mut() {
                let Some(&value) = stored.get(criterion) else {
                    continue;
                };
                match Score::from_persisted(value) {
                    Some(score) => *slot = Some(score),
                    None => log::warn!(
                        "Ignoring invalid stored score {} for contestant {} criterion {}",
                        value,
                        contestant,
                        criterion
                    ),
                }
            }
        }

        merged
    }

    /// Apply raw input to one criterion. `None` when the input is rejected or
    /// the contestant/criterion is not part of the shape.
    pub fn set_score(
        &self,
        contestant: &ContestantId,
        criterion: &CriterionId,
        raw: &str,
    ) -> Option<Self> {
        let input = ScoreInput::parse(raw)?;
        let mut next = self.clone();
        let slot = next
            .entries
            .get_mut(contestant)?
            .scores
            .get_mut(criterion)?;
        *slot = match input {
            ScoreInput::Clear => None,
            ScoreInput::Set(score) => Some(score),
        };
        Some(next)
    }

    /// Replace a contestant's comment. An unknown contestant leaves the shape as is.
    pub fn set_comment(&self, contestant: &ContestantId, text: &str) -> Self {
        let mut next = self.clone();
        if let Some(entry) = next.entries.get_mut(contestant) {
            entry.comments = text.to_string();
        }
        next
    }

    pub fn entry(&self, contestant: &ContestantId) -> Option<&ContestantEntry> {
        self.entries.get(contestant)
    }

    pub fn score(&self, contestant: &ContestantId, criterion: &CriterionId) -> Option<Score> {
        self.entries.get(contestant)?.scores.get(criterion).copied()?
    }

    pub fn comments(&self, contestant: &ContestantId) -> &str {
        self.entries
            .get(contestant)
            .map(|e| e.comments.as_str())
            .unwrap_or("")
    }

    pub fn contestants(&self) -> impl Iterator<Item = &ContestantId> {
        self.entries.keys()
    }

    /// The store update for one contestant: its comment plus every present score.
    pub fn update_for(&self, contestant: &ContestantId) -> Option<ScoreUpdate> {
        let entry = self.entries.get(contestant)?;
        let scores = entry
            .scores
            .iter()
            .filter_map(|(criterion, score)| score.map(|s| (criterion.clone(), s.value())))
            .collect();

        let mut update = ScoreUpdate::new();
        update.insert(
            contestant.clone(),
            ContestantUpdate {
                comments: entry.comments.clone(),
                scores,
            },
        );
        Some(update)
    }
}

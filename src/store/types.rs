use crate::catalog::{ContestantId, CriterionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SHEET_VERSION: u32 = 1;

fn default_version() -> u32 {
    SHEET_VERSION
}

/// A judge's durable score sheet.
///
/// Absent keys mean absent scores. Values are kept as plain numbers because
/// the store does not validate them; the cache does on hydration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedScoreSheet {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub scores: BTreeMap<ContestantId, BTreeMap<CriterionId, f64>>,
    #[serde(default)]
    pub comments: BTreeMap<ContestantId, String>,
}

impl Default for PersistedScoreSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistedScoreSheet {
    pub fn new() -> Self {
        Self {
            version: SHEET_VERSION,
            scores: BTreeMap::new(),
            comments: BTreeMap::new(),
        }
    }

    /// Upsert every contestant in `update`, replacing each contestant's
    /// sub-document wholesale. Contestants not named in `update` are untouched.
    pub fn apply(&mut self, update: &ScoreUpdate) {
        for (contestant, entry) in update {
            let scores = entry
                .scores
                .iter()
                .map(|(criterion, score)| (criterion.clone(), f64::from(*score)))
                .collect();
            self.scores.insert(contestant.clone(), scores);
            self.comments.insert(contestant.clone(), entry.comments.clone());
        }
    }
}

/// One contestant's entry in a partial save:
/// `{"comments": "...", "<criterionId>": <score>, ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestantUpdate {
    #[serde(default)]
    pub comments: String,
    #[serde(flatten)]
    pub scores: BTreeMap<CriterionId, u8>,
}

/// Partial, per-contestant upsert for one judge.
pub type ScoreUpdate = BTreeMap<ContestantId, ContestantUpdate>;

#[cfg(test)]
mod tests {
    use super::*;

    fn update_for(contestant: &str, comments: &str, scores: &[(&str, u8)]) -> ScoreUpdate {
        let mut update = ScoreUpdate::new();
        update.insert(
            ContestantId::from(contestant),
            ContestantUpdate {
                comments: comments.to_string(),
                scores: scores
                    .iter()
                    .map(|(k, v)| (CriterionId::from(*k), *v))
                    .collect(),
            },
        );
        update
    }

    #[test]
    fn test_contestant_update_wire_shape() {
        let update = update_for("a", "steady", &[("c1", 80), ("c2", 90)]);
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"a": {"comments": "steady", "c1": 80, "c2": 90}})
        );
    }

    #[test]
    fn test_apply_replaces_only_named_contestant() {
        let mut sheet = PersistedScoreSheet::new();
        sheet.apply(&update_for("a", "first", &[("c1", 10), ("c2", 20)]));
        sheet.apply(&update_for("b", "other", &[("c1", 50)]));

        // c2 cleared for "a": the new sub-document omits it
        sheet.apply(&update_for("a", "second", &[("c1", 70)]));

        assert_eq!(sheet.scores["a"].len(), 1);
        assert_eq!(sheet.scores["a"]["c1"], 70.0);
        assert_eq!(sheet.comments["a"], "second");
        assert_eq!(sheet.scores["b"]["c1"], 50.0);
        assert_eq!(sheet.comments["b"], "other");
    }

    #[test]
    fn test_sheet_parses_without_version() {
        let sheet: PersistedScoreSheet =
            serde_json::from_str(r#"{"scores": {"1": {"5": 85}}, "comments": {"1": "ok"}}"#)
                .unwrap();
        assert_eq!(sheet.version, SHEET_VERSION);
        assert_eq!(sheet.scores["1"]["5"], 85.0);
    }

    #[test]
    fn test_empty_sheet_parse() {
        let sheet: PersistedScoreSheet = serde_json::from_str("{}").unwrap();
        assert!(sheet.scores.is_empty());
        assert!(sheet.comments.is_empty());
    }
}

use super::ids::{ContestantId, CriterionId, JudgeId};
use serde::{Deserialize, Serialize};

/// One scoring dimension.
///
/// `weight` is a percentage contribution in `[0, 100]`. Weights within a
/// sub-event do not have to sum to 100.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Criterion {
    pub id: CriterionId,
    pub name: String,
    #[serde(alias = "points")]
    pub weight: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Contestant {
    pub id: ContestantId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JudgeRole {
    #[default]
    Judge,
    Chairman,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Judge {
    pub id: JudgeId,
    pub name: String,
    #[serde(default, alias = "type")]
    pub role: JudgeRole,
    #[serde(default)]
    pub order: u32,
}

impl Judge {
    pub fn is_chairman(&self) -> bool {
        self.role == JudgeRole::Chairman
    }
}

/// Catalog for one sub-event, immutable for the length of a scoring session.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub contestants: Vec<Contestant>,
    #[serde(default)]
    pub judges: Vec<Judge>,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

impl Settings {
    pub fn contestant(&self, id: &ContestantId) -> Option<&Contestant> {
        self.contestants.iter().find(|c| &c.id == id)
    }

    pub fn judge(&self, id: &JudgeId) -> Option<&Judge> {
        self.judges.iter().find(|j| &j.id == id)
    }

    /// Judges in display order: the chairman first, then ascending `order`.
    /// Equal keys keep catalog order.
    pub fn display_judges(&self) -> Vec<&Judge> {
        let mut judges: Vec<&Judge> = self.judges.iter().collect();
        judges.sort_by_key(|j| (!j.is_chairman(), j.order));
        judges
    }

    /// Printed label for a judge: "Chairman of the Board" or "Judge N", where
    /// N counts regular judges in display order.
    pub fn judge_label(&self, id: &JudgeId) -> Option<String> {
        let judge = self.judge(id)?;
        if judge.is_chairman() {
            return Some("Chairman of the Board".to_string());
        }
        let position = self
            .display_judges()
            .into_iter()
            .filter(|j| !j.is_chairman())
            .position(|j| &j.id == id)?;
        Some(format!("Judge {}", position + 1))
    }
}

use crate::catalog::JudgeId;

/// How criterion weights normalize a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightPolicy {
    /// Divide by the sum of weights of criteria that have a score.
    PresentWeight,
    /// Divide by 100; absent criteria contribute nothing.
    Fixed100,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingMode {
    /// Scored contestants only, ties get distinct increasing ranks.
    Sequential,
    /// Everyone ranked, unscored last, equal totals share a rank ("1,1,3").
    Competition,
}

/// Which totals a screen or report shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreView {
    /// A judge's own ranking while scoring.
    Single(JudgeId),
    /// A judge's printed score sheet.
    Sheet(JudgeId),
    /// Mean across all judges.
    Aggregate,
}

impl ScoreView {
    pub fn weight_policy(&self) -> WeightPolicy {
        match self {
            ScoreView::Single(_) => WeightPolicy::PresentWeight,
            ScoreView::Sheet(_) | ScoreView::Aggregate => WeightPolicy::Fixed100,
        }
    }

    pub fn ranking_mode(&self) -> RankingMode {
        match self {
            ScoreView::Single(_) => RankingMode::Sequential,
            ScoreView::Sheet(_) | ScoreView::Aggregate => RankingMode::Competition,
        }
    }

    /// Printed views rank on the 2-decimal totals they display.
    pub fn ranks_on_rounded(&self) -> bool {
        !matches!(self, ScoreView::Single(_))
    }

    pub fn judge(&self) -> Option<&JudgeId> {
        match self {
            ScoreView::Single(judge) | ScoreView::Sheet(judge) => Some(judge),
            ScoreView::Aggregate => None,
        }
    }
}

/// Round to 2 decimals, for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

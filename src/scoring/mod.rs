pub mod aggregate;
pub mod engine;
pub mod policy;
pub mod rank;
pub mod sheet;
pub mod validation;

pub use aggregate::{aggregate, aggregate_totals, AggregateScores};
pub use engine::{judge_totals, weighted_total};
pub use policy::{round2, RankingMode, ScoreView, WeightPolicy};
pub use rank::{rank, RankedContestant, Ranking};
pub use sheet::{build_all_sheets, build_sheet, ScoreSheet, SheetColumn, SheetJudge, SheetRow};
pub use validation::validate_catalog;

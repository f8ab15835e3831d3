use super::aggregate::{aggregate, aggregate_totals};
use super::engine::judge_totals;
use super::policy::{round2, ScoreView};
use super::rank::rank;
use crate::cache::ScoreShape;
use crate::catalog::{ContestantId, CriterionId, JudgeId, Settings};
use anyhow::{bail, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct SheetColumn {
    pub criterion: CriterionId,
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub contestant: ContestantId,
    pub name: String,
    /// One cell per column; `None` when absent.
    pub cells: Vec<Option<f64>>,
    pub total: Option<f64>,
    /// `None` when the view leaves the contestant unranked.
    pub rank: Option<usize>,
    /// Only judge sheets carry comments.
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetJudge {
    pub id: JudgeId,
    pub name: String,
    pub label: String,
}

/// A rendered-ready score table for one view, rows in rank order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSheet {
    pub title: String,
    pub view: ScoreView,
    pub columns: Vec<SheetColumn>,
    pub rows: Vec<SheetRow>,
    /// The judge a per-judge sheet belongs to, or every judge for the aggregate.
    pub judges: Vec<SheetJudge>,
}

impl ScoreSheet {
    pub fn heading(&self) -> String {
        match self.view {
            ScoreView::Aggregate => "Overall Scores".to_string(),
            _ => self
                .judges
                .first()
                .map(|j| j.name.clone())
                .unwrap_or_default(),
        }
    }
}

fn sheet_judge(settings: &Settings, id: &JudgeId) -> Option<SheetJudge> {
    let judge = settings.judge(id)?;
    Some(SheetJudge {
        id: judge.id.clone(),
        name: judge.name.clone(),
        label: settings.judge_label(id)?,
    })
}

/// Build the sheet for `view` from the judges' shapes.
///
/// A judge with no shape in `sheets` counts as having scored nothing.
pub fn build_sheet(
    settings: &Settings,
    sheets: &BTreeMap<JudgeId, ScoreShape>,
    view: &ScoreView,
) -> Result<ScoreSheet> {
    let columns: Vec<SheetColumn> = settings
        .criteria
        .iter()
        .map(|c| SheetColumn {
            criterion: c.id.clone(),
            name: c.name.clone(),
            weight: c.weight,
        })
        .collect();

    let (cells, totals, comments, judges) = match view {
        ScoreView::Single(judge_id) | ScoreView::Sheet(judge_id) => {
            let Some(judge) = sheet_judge(settings, judge_id) else {
                bail!("Unknown judge '{}'", judge_id);
            };
            let empty;
            let shape = match sheets.get(judge_id) {
                Some(shape) => shape,
                None => {
                    empty = ScoreShape::initialize(&settings.contestants, &settings.criteria);
                    &empty
                }
            };
            let cells: BTreeMap<ContestantId, Vec<Option<f64>>> = settings
                .contestants
                .iter()
                .map(|contestant| {
                    let row: Vec<Option<f64>> = columns
                        .iter()
                        .map(|col| {
                            shape
                                .score(&contestant.id, &col.criterion)
                                .map(|s| s.as_f64())
                        })
                        .collect();
                    (contestant.id.clone(), row)
                })
                .collect();
            let comments: BTreeMap<ContestantId, String> = settings
                .contestants
                .iter()
                .map(|c| (c.id.clone(), shape.comments(&c.id).to_string()))
                .collect();
            let totals = judge_totals(
                shape,
                &settings.contestants,
                &settings.criteria,
                view.weight_policy(),
            );
            (cells, totals, Some(comments), vec![judge])
        }
        ScoreView::Aggregate => {
            let means = aggregate(sheets, &settings.criteria, &settings.contestants);
            let cells: BTreeMap<ContestantId, Vec<Option<f64>>> = means
                .iter()
                .map(|(contestant, by_criterion)| {
                    let row: Vec<Option<f64>> = columns
                        .iter()
                        .map(|col| by_criterion.get(&col.criterion).copied().flatten())
                        .collect();
                    (contestant.clone(), row)
                })
                .collect();
            let totals = aggregate_totals(&means, &settings.criteria, &settings.contestants);
            let judges: Vec<SheetJudge> = settings
                .display_judges()
                .into_iter()
                .filter_map(|j| sheet_judge(settings, &j.id))
                .collect();
            (cells, totals, None, judges)
        }
    };

    let ranked_on: Vec<(ContestantId, Option<f64>)> = if view.ranks_on_rounded() {
        totals
            .iter()
            .map(|(id, total)| (id.clone(), total.map(round2)))
            .collect()
    } else {
        totals.clone()
    };
    let ranking = rank(&ranked_on, view.ranking_mode());

    // Ranked contestants first, then the unranked in catalog order.
    let mut order: Vec<(ContestantId, Option<usize>)> = ranking
        .iter()
        .map(|e| (e.contestant.clone(), Some(e.rank)))
        .collect();
    for contestant in &settings.contestants {
        if ranking.rank_of(&contestant.id).is_none() {
            order.push((contestant.id.clone(), None));
        }
    }

    let rows = order
        .into_iter()
        .filter_map(|(id, rank)| {
            let contestant = settings.contestant(&id)?;
            let total = totals
                .iter()
                .find(|(c, _)| c == &id)
                .and_then(|(_, t)| *t);
            Some(SheetRow {
                name: contestant.name.clone(),
                cells: cells.get(&id).cloned().unwrap_or_default(),
                total,
                rank,
                comment: comments.as_ref().and_then(|c| c.get(&id).cloned()),
                contestant: id,
            })
        })
        .collect();

    Ok(ScoreSheet {
        title: settings.title.clone(),
        view: view.clone(),
        columns,
        rows,
        judges,
    })
}

/// Every judge's sheet in display order, followed by the overall sheet.
pub fn build_all_sheets(
    settings: &Settings,
    sheets: &BTreeMap<JudgeId, ScoreShape>,
) -> Result<Vec<ScoreSheet>> {
    let mut all = Vec::with_capacity(settings.judges.len() + 1);
    for judge in settings.display_judges() {
        all.push(build_sheet(
            settings,
            sheets,
            &ScoreView::Sheet(judge.id.clone()),
        )?);
    }
    all.push(build_sheet(settings, sheets, &ScoreView::Aggregate)?);
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Contestant, Criterion, Judge, JudgeRole};

    fn settings() -> Settings {
        Settings {
            title: "Finals".to_string(),
            contestants: vec![
                Contestant {
                    id: "a".into(),
                    name: "Alice".into(),
                },
                Contestant {
                    id: "b".into(),
                    name: "Bob".into(),
                },
                Contestant {
                    id: "c".into(),
                    name: "Cara".into(),
                },
            ],
            judges: vec![
                Judge {
                    id: "j1".into(),
                    name: "Ann".into(),
                    role: JudgeRole::Judge,
                    order: 1,
                },
                Judge {
                    id: "boss".into(),
                    name: "Ben".into(),
                    role: JudgeRole::Chairman,
                    order: 5,
                },
            ],
            criteria: vec![
                Criterion {
                    id: "c1".into(),
                    name: "Poise".into(),
                    weight: 60.0,
                },
                Criterion {
                    id: "c2".into(),
                    name: "Talent".into(),
                    weight: 40.0,
                },
            ],
        }
    }

    fn shape(settings: &Settings, entries: &[(&str, &str, &str)]) -> ScoreShape {
        entries.iter().fold(
            ScoreShape::initialize(&settings.contestants, &settings.criteria),
            |shape, (contestant, criterion, raw)| {
                shape
                    .set_score(&(*contestant).into(), &(*criterion).into(), raw)
                    .unwrap()
            },
        )
    }

    fn row_summary(sheet: &ScoreSheet) -> Vec<(String, Option<usize>)> {
        sheet
            .rows
            .iter()
            .map(|r| (r.contestant.to_string(), r.rank))
            .collect()
    }

    #[test]
    fn test_judge_sheet_competition_order() {
        let settings = settings();
        let mut sheets = BTreeMap::new();
        sheets.insert(
            JudgeId::from("j1"),
            shape(
                &settings,
                &[("a", "c1", "70"), ("b", "c1", "90"), ("c", "c1", "90")],
            )
            .set_comment(&"b".into(), "great"),
        );

        let sheet = build_sheet(&settings, &sheets, &ScoreView::Sheet("j1".into())).unwrap();

        assert_eq!(
            row_summary(&sheet),
            vec![
                ("b".to_string(), Some(1)),
                ("c".to_string(), Some(1)),
                ("a".to_string(), Some(3))
            ]
        );
        assert_eq!(sheet.rows[0].total, Some(54.0));
        assert_eq!(sheet.rows[0].cells, vec![Some(90.0), None]);
        assert_eq!(sheet.rows[0].comment.as_deref(), Some("great"));
        assert_eq!(sheet.judges[0].label, "Judge 1");
        assert_eq!(sheet.heading(), "Ann");
    }

    #[test]
    fn test_single_view_leaves_unscored_unranked() {
        let settings = settings();
        let mut sheets = BTreeMap::new();
        sheets.insert(JudgeId::from("j1"), shape(&settings, &[("b", "c1", "80")]));

        let sheet = build_sheet(&settings, &sheets, &ScoreView::Single("j1".into())).unwrap();

        assert_eq!(
            row_summary(&sheet),
            vec![
                ("b".to_string(), Some(1)),
                ("a".to_string(), None),
                ("c".to_string(), None)
            ]
        );
        assert_eq!(sheet.rows[0].total, Some(80.0));
        assert_eq!(sheet.rows[1].total, None);
    }

    #[test]
    fn test_missing_judge_shape_is_empty() {
        let settings = settings();
        let sheet = build_sheet(
            &settings,
            &BTreeMap::new(),
            &ScoreView::Sheet("boss".into()),
        )
        .unwrap();

        assert!(sheet.rows.iter().all(|r| r.total == Some(0.0)));
        assert!(sheet.rows.iter().all(|r| r.rank == Some(1)));
        assert_eq!(sheet.judges[0].label, "Chairman of the Board");
    }

    #[test]
    fn test_unknown_judge_is_error() {
        let settings = settings();
        let err = build_sheet(&settings, &BTreeMap::new(), &ScoreView::Sheet("zz".into()))
            .unwrap_err();
        assert!(err.to_string().contains("Unknown judge"));
    }

    #[test]
    fn test_aggregate_sheet() {
        let settings = settings();
        let mut sheets = BTreeMap::new();
        sheets.insert(
            JudgeId::from("j1"),
            shape(&settings, &[("a", "c1", "80"), ("a", "c2", "90")]),
        );
        sheets.insert(
            JudgeId::from("boss"),
            shape(&settings, &[("a", "c1", "80"), ("b", "c1", "100")]),
        );

        let sheet = build_sheet(&settings, &sheets, &ScoreView::Aggregate).unwrap();

        // a: c1 mean 80, c2 mean 90 -> 84; b: c1 100 -> 60; c: nothing -> 0
        assert_eq!(
            row_summary(&sheet),
            vec![
                ("a".to_string(), Some(1)),
                ("b".to_string(), Some(2)),
                ("c".to_string(), Some(3))
            ]
        );
        assert_eq!(sheet.rows[0].total, Some(84.0));
        assert_eq!(sheet.rows[1].total, Some(60.0));
        assert!(sheet.rows.iter().all(|r| r.comment.is_none()));
        assert_eq!(sheet.heading(), "Overall Scores");

        let labels: Vec<&str> = sheet.judges.iter().map(|j| j.label.as_str()).collect();
        assert_eq!(labels, vec!["Chairman of the Board", "Judge 1"]);
    }

    #[test]
    fn test_build_all_sheets_order() {
        let settings = settings();
        let all = build_all_sheets(&settings, &BTreeMap::new()).unwrap();

        let views: Vec<ScoreView> = all.iter().map(|s| s.view.clone()).collect();
        assert_eq!(
            views,
            vec![
                ScoreView::Sheet("boss".into()),
                ScoreView::Sheet("j1".into()),
                ScoreView::Aggregate
            ]
        );
    }
}

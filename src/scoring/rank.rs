use super::policy::RankingMode;
use crate::catalog::ContestantId;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedContestant {
    pub contestant: ContestantId,
    pub total: Option<f64>,
    pub rank: usize,
}

/// Contestants in rank order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    entries: Vec<RankedContestant>,
}

impl Ranking {
    pub fn entries(&self) -> &[RankedContestant] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedContestant> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `None` for contestants left out of the ranking.
    pub fn rank_of(&self, contestant: &ContestantId) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| &e.contestant == contestant)
            .map(|e| e.rank)
    }
}

/// Highest total first, null totals last.
fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Rank contestant totals given in source order. The sort is stable, so
/// equal totals keep source order.
pub fn rank(totals: &[(ContestantId, Option<f64>)], mode: RankingMode) -> Ranking {
    let mut sorted: Vec<(ContestantId, Option<f64>)> = match mode {
        RankingMode::Sequential => totals.iter().filter(|(_, t)| t.is_some()).cloned().collect(),
        RankingMode::Competition => totals.to_vec(),
    };
    sorted.sort_by(|a, b| descending(a.1, b.1));

    let mut entries: Vec<RankedContestant> = Vec::with_capacity(sorted.len());
    for (index, (contestant, total)) in sorted.into_iter().enumerate() {
        let rank = match (mode, entries.last()) {
            (RankingMode::Competition, Some(prev)) if prev.total == total => prev.rank,
            _ => index + 1,
        };
        entries.push(RankedContestant {
            contestant,
            total,
            rank,
        });
    }

    Ranking { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(values: &[(&str, Option<f64>)]) -> Vec<(ContestantId, Option<f64>)> {
        values
            .iter()
            .map(|(id, total)| (ContestantId::from(*id), *total))
            .collect()
    }

    fn ranks(ranking: &Ranking) -> Vec<(String, usize)> {
        ranking
            .iter()
            .map(|e| (e.contestant.to_string(), e.rank))
            .collect()
    }

    #[test]
    fn test_competition_shares_ranks() {
        let ranking = rank(
            &totals(&[("a", Some(90.0)), ("b", Some(70.0)), ("c", Some(90.0))]),
            RankingMode::Competition,
        );
        assert_eq!(
            ranks(&ranking),
            vec![
                ("a".to_string(), 1),
                ("c".to_string(), 1),
                ("b".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_sequential_breaks_ties_in_source_order() {
        let ranking = rank(
            &totals(&[("a", Some(90.0)), ("b", Some(70.0)), ("c", Some(90.0))]),
            RankingMode::Sequential,
        );
        assert_eq!(
            ranks(&ranking),
            vec![
                ("a".to_string(), 1),
                ("c".to_string(), 2),
                ("b".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_sequential_excludes_unscored() {
        let ranking = rank(
            &totals(&[("a", None), ("b", Some(50.0))]),
            RankingMode::Sequential,
        );
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking.rank_of(&"b".into()), Some(1));
        assert_eq!(ranking.rank_of(&"a".into()), None);
    }

    #[test]
    fn test_competition_ranks_unscored_last() {
        let ranking = rank(
            &totals(&[("a", None), ("b", Some(50.0)), ("c", None), ("d", Some(0.0))]),
            RankingMode::Competition,
        );
        assert_eq!(
            ranks(&ranking),
            vec![
                ("b".to_string(), 1),
                ("d".to_string(), 2),
                ("a".to_string(), 3),
                ("c".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_competition_is_idempotent() {
        let first = rank(
            &totals(&[
                ("a", Some(61.5)),
                ("b", Some(88.0)),
                ("c", None),
                ("d", Some(61.5)),
                ("e", Some(99.25)),
            ]),
            RankingMode::Competition,
        );
        let resorted: Vec<(ContestantId, Option<f64>)> = first
            .iter()
            .map(|e| (e.contestant.clone(), e.total))
            .collect();
        let second = rank(&resorted, RankingMode::Competition);

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank(&[], RankingMode::Competition).is_empty());
        assert!(rank(&[], RankingMode::Sequential).is_empty());
    }
}

use crate::catalog::Settings;
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

fn duplicates<'a, T, I>(section: &str, ids: I, errors: &mut Vec<String>)
where
    T: Eq + Hash + Display + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(format!("{}: duplicate id '{}'", section, id));
        }
    }
}

/// Validate a sub-event catalog before scoring against it.
/// Returns all validation errors at once (not just the first).
pub fn validate_catalog(settings: &Settings) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (i, criterion) in settings.criteria.iter().enumerate() {
        if !criterion.weight.is_finite() || !(0.0..=100.0).contains(&criterion.weight) {
            errors.push(format!(
                "criteria[{}].weight: must be between 0 and 100, got {}",
                i, criterion.weight
            ));
        }
    }

    duplicates(
        "contestants",
        settings.contestants.iter().map(|c| &c.id),
        &mut errors,
    );
    duplicates("judges", settings.judges.iter().map(|j| &j.id), &mut errors);
    duplicates("criteria", settings.criteria.iter().map(|c| &c.id), &mut errors);

    let chairmen = settings.judges.iter().filter(|j| j.is_chairman()).count();
    if chairmen > 1 {
        errors.push(format!(
            "judges: at most one chairman allowed, found {}",
            chairmen
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

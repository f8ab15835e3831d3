use crate::cache::ScoreShape;
use crate::catalog::{CatalogProvider, JudgeId, Settings, SubEventId};
use crate::store::ScoreStore;
use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeMap;

/// A sub-event's catalog with every judge's hydrated shape.
#[derive(Debug, Clone)]
pub struct SubEventScores {
    pub settings: Settings,
    pub sheets: BTreeMap<JudgeId, ScoreShape>,
}

/// Fetch the catalog, then every judge's scores in parallel.
///
/// A judge whose scores cannot be read contributes an empty shape so the
/// remaining sheets still render. Only a catalog failure is an error.
pub async fn fetch_sub_event_scores<C, S>(
    catalog: &C,
    store: &S,
    sub_event: &SubEventId,
) -> Result<SubEventScores>
where
    C: CatalogProvider,
    S: ScoreStore,
{
    let settings = catalog
        .get_settings(sub_event)
        .await
        .with_context(|| format!("Failed to load catalog for sub-event '{}'", sub_event))?;

    let empty = ScoreShape::initialize(&settings.contestants, &settings.criteria);

    let mut futures = FuturesUnordered::new();
    for judge in &settings.judges {
        let judge_id = judge.id.clone();
        futures.push(async move {
            let result = store.get_scores(&judge_id).await;
            (judge_id, result)
        });
    }

    let mut sheets = BTreeMap::new();
    while let Some((judge_id, result)) = futures.next().await {
        let shape = match result {
            Ok(persisted) => empty.hydrate(&persisted),
            Err(e) => {
                log::warn!("Could not load scores for judge {}: {:#}", judge_id, e);
                empty.clone()
            }
        };
        sheets.insert(judge_id, shape);
    }

    log::debug!(
        "Loaded {} judge sheet(s) for sub-event {}",
        sheets.len(),
        sub_event
    );

    Ok(SubEventScores { settings, sheets })
}

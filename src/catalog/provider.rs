use super::ids::SubEventId;
use super::types::Settings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Source of the contestants, judges and criteria for a sub-event.
pub trait CatalogProvider {
    fn get_settings(&self, sub_event: &SubEventId)
        -> impl Future<Output = Result<Settings>> + Send;
}

/// On-disk catalog layout: every sub-event keyed by id.
///
/// Example YAML:
/// ```yaml
/// sub_events:
///   finals:
///     title: Grand Finals
///     contestants:
///       - { id: ana, name: Ana }
///     judges:
///       - { id: j1, name: Ben, role: chairman }
///       - { id: j2, name: Cy, order: 1 }
///     criteria:
///       - { id: poise, name: Poise, weight: 60 }
///       - { id: talent, name: Talent, weight: 40 }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default)]
    pub sub_events: BTreeMap<SubEventId, Settings>,
}

/// Catalog backed by a YAML file that is re-read on every request.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and parse the whole catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or not valid YAML.
    pub fn load(&self) -> Result<CatalogFile> {
        if !self.path.exists() {
            anyhow::bail!("Catalog file not found at {}", self.path.display());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read catalog file at {}", self.path.display()))?;

        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse catalog: invalid YAML in {}", self.path.display()))
    }
}

impl CatalogProvider for FileCatalog {
    async fn get_settings(&self, sub_event: &SubEventId) -> Result<Settings> {
        let catalog = self.load()?;
        catalog
            .sub_events
            .get(sub_event)
            .cloned()
            .with_context(|| format!("Unknown sub-event '{}' in {}", sub_event, self.path.display()))
    }
}

/// Catalog held in memory, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    sub_events: BTreeMap<SubEventId, Settings>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sub_event(mut self, id: SubEventId, settings: Settings) -> Self {
        self.sub_events.insert(id, settings);
        self
    }
}

impl CatalogProvider for MemoryCatalog {
    async fn get_settings(&self, sub_event: &SubEventId) -> Result<Settings> {
        self.sub_events
            .get(sub_event)
            .cloned()
            .with_context(|| format!("Unknown sub-event '{}'", sub_event))
    }
}

use super::types::{PersistedScoreSheet, ScoreUpdate};
use super::ScoreStore;
use crate::catalog::JudgeId;
use anyhow::{anyhow, bail, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-memory score store that records every write.
///
/// Reads and writes can be switched to fail, to exercise the degraded paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: Mutex<BTreeMap<JudgeId, PersistedScoreSheet>>,
    writes: Mutex<Vec<(JudgeId, ScoreUpdate)>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(self, judge: JudgeId, sheet: PersistedScoreSheet) -> Self {
        if let Ok(mut sheets) = self.sheets.lock() {
            sheets.insert(judge, sheet);
        }
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every successful write so far, in order.
    pub fn writes(&self) -> Vec<(JudgeId, ScoreUpdate)> {
        self.writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }

    pub fn sheet(&self, judge: &JudgeId) -> Option<PersistedScoreSheet> {
        self.sheets.lock().ok()?.get(judge).cloned()
    }
}

impl ScoreStore for MemoryStore {
    async fn get_scores(&self, judge: &JudgeId) -> Result<PersistedScoreSheet> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("Score store unavailable");
        }
        let sheets = self
            .sheets
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        Ok(sheets.get(judge).cloned().unwrap_or_default())
    }

    async fn save_scores(&self, judge: &JudgeId, partial: ScoreUpdate) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("Score store unavailable");
        }
        {
            let mut sheets = self
                .sheets
                .lock()
                .map_err(|_| anyhow!("Memory store lock poisoned"))?;
            sheets.entry(judge.clone()).or_default().apply(&partial);
        }
        let mut writes = self
            .writes
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        writes.push((judge.clone(), partial));
        Ok(())
    }
}

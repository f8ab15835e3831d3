use crate::cache::ScoreShape;
use crate::catalog::{ContestantId, JudgeId};
use crate::store::ScoreStore;
use anyhow::{anyhow, Context, Result};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(1000);

/// The single pending timer for one judge.
struct Pending {
    generation: u64,
    /// Contestants edited since the last write.
    dirty: BTreeSet<ContestantId>,
    snapshot: ScoreShape,
    handle: JoinHandle<()>,
}

struct Inner<S> {
    store: Arc<S>,
    delay: Duration,
    pending: Mutex<HashMap<JudgeId, Pending>>,
    /// Held for the whole of a store write, one per judge.
    writing: Mutex<HashMap<JudgeId, Arc<AsyncMutex<()>>>>,
    next_generation: AtomicU64,
}

impl<S> Inner<S> {
    fn lock_pending(&self) -> MutexGuard<'_, HashMap<JudgeId, Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self, judge: &JudgeId) -> Arc<AsyncMutex<()>> {
        let mut writing = self.writing.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(writing.entry(judge.clone()).or_default())
    }
}

/// Debounces cache writes to the score store.
///
/// Each judge has at most one pending timer. Re-scheduling restarts it but
/// keeps every contestant edited in the window; on fire each of them gets its
/// own contestant-scoped write from the latest snapshot.
///
/// Writes for one judge never overlap. A debounced write already in flight
/// completes before a later `flush` or `drain` writes, so a slow store cannot
/// let an older snapshot land last.
pub struct AutosaveScheduler<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for AutosaveScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ScoreStore> AutosaveScheduler<S> {
    pub fn new(store: Arc<S>, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                delay,
                pending: Mutex::new(HashMap::new()),
                writing: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.inner.store
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    pub fn has_pending(&self, judge: &JudgeId) -> bool {
        self.inner.lock_pending().contains_key(judge)
    }

    /// Restart the judge's timer with `snapshot`, marking `contestant` dirty.
    pub fn schedule(&self, judge: &JudgeId, snapshot: ScoreShape, contestant: &ContestantId) {
        let mut pending = self.inner.lock_pending();

        let mut dirty = BTreeSet::new();
        if let Some(previous) = pending.remove(judge) {
            previous.handle.abort();
            dirty = previous.dirty;
        }
        dirty.insert(contestant.clone());

        log::debug!(
            "Autosave scheduled for judge {} ({} contestant(s) pending)",
            judge,
            dirty.len()
        );
        self.arm(&mut pending, judge, snapshot, dirty);
    }

    /// Cancel the timer and write `contestant` now. Other dirty contestants
    /// are re-armed on a fresh timer.
    pub async fn flush(
        &self,
        judge: &JudgeId,
        snapshot: ScoreShape,
        contestant: &ContestantId,
    ) -> Result<()> {
        let update = snapshot
            .update_for(contestant)
            .ok_or_else(|| anyhow!("Unknown contestant '{}'", contestant))?;

        let write_lock = self.inner.write_lock(judge);
        let _writing = write_lock.lock().await;
        {
            let mut pending = self.inner.lock_pending();
            if let Some(previous) = pending.remove(judge) {
                previous.handle.abort();
                let mut rest = previous.dirty;
                rest.remove(contestant);
                if !rest.is_empty() {
                    self.arm(&mut pending, judge, snapshot, rest);
                }
            }
        }

        self.inner
            .store
            .save_scores(judge, update)
            .await
            .with_context(|| format!("Failed to save scores for contestant {}", contestant))
    }

    /// Write everything pending for `judge` immediately.
    ///
    /// Every dirty contestant is attempted; the first failure is returned.
    pub async fn drain(&self, judge: &JudgeId) -> Result<()> {
        let write_lock = self.inner.write_lock(judge);
        let _writing = write_lock.lock().await;
        let taken = self.inner.lock_pending().remove(judge);
        let Some(previous) = taken else {
            return Ok(());
        };
        previous.handle.abort();

        let mut first_error = None;
        for contestant in &previous.dirty {
            if let Err(e) = write_contestant(&*self.inner.store, judge, &previous.snapshot, contestant).await
            {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn arm(
        &self,
        pending: &mut HashMap<JudgeId, Pending>,
        judge: &JudgeId,
        snapshot: ScoreShape,
        dirty: BTreeSet<ContestantId>,
    ) {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let handle = tokio::spawn(fire(Arc::clone(&self.inner), judge.clone(), generation));
        pending.insert(
            judge.clone(),
            Pending {
                generation,
                dirty,
                snapshot,
                handle,
            },
        );
    }
}

async fn write_contestant<S: ScoreStore>(
    store: &S,
    judge: &JudgeId,
    snapshot: &ScoreShape,
    contestant: &ContestantId,
) -> Result<()> {
    let Some(update) = snapshot.update_for(contestant) else {
        log::debug!("Skipping autosave for unknown contestant {}", contestant);
        return Ok(());
    };
    store
        .save_scores(judge, update)
        .await
        .with_context(|| format!("Failed to save scores for contestant {}", contestant))
}

/// Timer body. Only the generation still registered for the judge writes. It
/// takes the judge's write lock before detaching itself from the map, so a
/// flush either cancels it first or waits for its write to finish.
async fn fire<S: ScoreStore>(inner: Arc<Inner<S>>, judge: JudgeId, generation: u64) {
    tokio::time::sleep(inner.delay).await;

    let write_lock = inner.write_lock(&judge);
    let _writing = write_lock.lock().await;
    let taken = {
        let mut pending = inner.lock_pending();
        let current = pending.get(&judge).map(|p| p.generation) == Some(generation);
        if current {
            pending.remove(&judge)
        } else {
            None
        }
    };
    let Some(due) = taken else {
        return;
    };

    for contestant in &due.dirty {
        if let Err(e) = write_contestant(&*inner.store, &judge, &due.snapshot, contestant).await {
            log::warn!("Autosave failed for judge {}: {:#}", judge, e);
        }
    }
}

use crate::autosave::AutosaveScheduler;
use crate::cache::ScoreShape;
use crate::catalog::{CatalogProvider, ContestantId, CriterionId, JudgeId, Settings, SubEventId};
use crate::scoring::{judge_totals, rank, weighted_total, Ranking, ScoreView};
use crate::store::ScoreStore;
use anyhow::{bail, Context, Result};
use std::time::{Duration, Instant};

pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_secs(3);
pub const SAVE_SUCCESS_MESSAGE: &str = "Scores saved successfully!";
pub const SAVE_ERROR_MESSAGE: &str = "Error saving scores. Please try again.";

/// Who is scoring what. Passed in explicitly when a session opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub sub_event: SubEventId,
    pub judge: JudgeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// Transient status line text.
#[derive(Debug, Clone)]
pub struct FlashMessage {
    pub text: String,
    pub kind: FlashKind,
    pub shown_at: Instant,
}

/// One judge scoring one sub-event: catalog snapshot, working cache and the
/// autosave handle.
pub struct JudgeSession<S> {
    identity: SessionIdentity,
    settings: Settings,
    shape: ScoreShape,
    autosave: AutosaveScheduler<S>,
    flash: Option<FlashMessage>,
    flash_duration: Duration,
}

impl<S: ScoreStore> JudgeSession<S> {
    /// Load the catalog and hydrate the judge's cache.
    pub async fn open<C: CatalogProvider>(
        identity: SessionIdentity,
        catalog: &C,
        autosave: AutosaveScheduler<S>,
        flash_duration: Duration,
    ) -> Result<Self> {
        let settings = catalog
            .get_settings(&identity.sub_event)
            .await
            .context("Failed to load catalog")?;
        Self::from_settings(identity, settings, autosave, flash_duration).await
    }

    /// Hydrate the judge's cache against settings the caller already loaded.
    ///
    /// A failed score read is not fatal: the session starts from the empty
    /// shape and the failure is logged.
    pub async fn from_settings(
        identity: SessionIdentity,
        settings: Settings,
        autosave: AutosaveScheduler<S>,
        flash_duration: Duration,
    ) -> Result<Self> {
        if settings.judge(&identity.judge).is_none() {
            bail!(
                "Judge '{}' is not part of sub-event '{}'",
                identity.judge,
                identity.sub_event
            );
        }

        let empty = ScoreShape::initialize(&settings.contestants, &settings.criteria);
        let shape = match autosave.store().get_scores(&identity.judge).await {
            Ok(persisted) => empty.hydrate(&persisted),
            Err(e) => {
                log::warn!(
                    "Could not load scores for judge {}, starting empty: {:#}",
                    identity.judge,
                    e
                );
                empty
            }
        };

        Ok(Self {
            identity,
            settings,
            shape,
            autosave,
            flash: None,
            flash_duration,
        })
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn judge(&self) -> &JudgeId {
        &self.identity.judge
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn shape(&self) -> &ScoreShape {
        &self.shape
    }

    pub fn flash(&self) -> Option<&FlashMessage> {
        self.flash.as_ref()
    }

    pub fn has_pending_autosave(&self) -> bool {
        self.autosave.has_pending(&self.identity.judge)
    }

    /// Apply raw input. Returns `false` when the input was rejected; accepted
    /// changes schedule an autosave for the contestant.
    pub fn set_score(&mut self, contestant: &ContestantId, criterion: &CriterionId, raw: &str) -> bool {
        let Some(next) = self.shape.set_score(contestant, criterion, raw) else {
            return false;
        };
        self.shape = next;
        self.autosave
            .schedule(&self.identity.judge, self.shape.clone(), contestant);
        true
    }

    pub fn set_comment(&mut self, contestant: &ContestantId, text: &str) {
        if self.shape.entry(contestant).is_none() {
            return;
        }
        self.shape = self.shape.set_comment(contestant, text);
        self.autosave
            .schedule(&self.identity.judge, self.shape.clone(), contestant);
    }

    /// Explicit save of one contestant. Shows the outcome as a flash message
    /// and leaves the cache untouched either way.
    pub async fn save(&mut self, contestant: &ContestantId) -> Result<()> {
        let result = self
            .autosave
            .flush(&self.identity.judge, self.shape.clone(), contestant)
            .await;

        match &result {
            Ok(()) => self.show_flash(SAVE_SUCCESS_MESSAGE, FlashKind::Success),
            Err(e) => {
                log::warn!("Save failed for judge {}: {:#}", self.identity.judge, e);
                self.show_flash(SAVE_ERROR_MESSAGE, FlashKind::Error);
            }
        }
        result
    }

    /// The judge's own total for a contestant.
    pub fn total(&self, contestant: &ContestantId) -> Option<f64> {
        weighted_total(
            &self.settings.criteria,
            |criterion| self.shape.score(contestant, criterion).map(|s| s.as_f64()),
            self.view().weight_policy(),
        )
    }

    /// Ranking of the contestants this judge has scored.
    pub fn judge_ranking(&self) -> Ranking {
        let view = self.view();
        let totals = judge_totals(
            &self.shape,
            &self.settings.contestants,
            &self.settings.criteria,
            view.weight_policy(),
        );
        rank(&totals, view.ranking_mode())
    }

    pub fn show_flash(&mut self, text: &str, kind: FlashKind) {
        self.flash = Some(FlashMessage {
            text: text.to_string(),
            kind,
            shown_at: Instant::now(),
        });
    }

    /// Drop the flash message once it has been visible long enough.
    pub fn update_flash(&mut self) {
        if let Some(flash) = &self.flash {
            if flash.shown_at.elapsed() >= self.flash_duration {
                self.flash = None;
            }
        }
    }

    /// End the session, writing any pending autosave first.
    pub async fn close(self) -> Result<()> {
        self.autosave.drain(&self.identity.judge).await
    }

    fn view(&self) -> ScoreView {
        ScoreView::Single(self.identity.judge.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::DEFAULT_AUTOSAVE_DELAY;
    use crate::catalog::{Contestant, Criterion, Judge, JudgeRole, MemoryCatalog};
    use crate::store::{MemoryStore, PersistedScoreSheet};
    use std::sync::Arc;

    fn settings() -> Settings {
        Settings {
            title: "Heat 1".to_string(),
            contestants: vec![
                Contestant {
                    id: "a".into(),
                    name: "Alice".into(),
                },
                Contestant {
                    id: "b".into(),
                    name: "Bob".into(),
                },
            ],
            judges: vec![Judge {
                id: "j1".into(),
                name: "Ann".into(),
                role: JudgeRole::Judge,
                order: 1,
            }],
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

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new().with_sub_event("heat-1".into(), settings())
    }

    fn identity() -> SessionIdentity {
        SessionIdentity {
            sub_event: "heat-1".into(),
            judge: "j1".into(),
        }
    }

    async fn open(store: Arc<MemoryStore>) -> Result<JudgeSession<MemoryStore>> {
        JudgeSession::open(
            identity(),
            &catalog(),
            AutosaveScheduler::new(store, DEFAULT_AUTOSAVE_DELAY),
            DEFAULT_FLASH_DURATION,
        )
        .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_hydrates_from_store() {
        let mut persisted = PersistedScoreSheet::new();
        persisted
            .scores
            .insert("a".into(), [("c1".into(), 80.0)].into_iter().collect());
        persisted.comments.insert("a".into(), "poised".into());
        let store = Arc::new(MemoryStore::new().with_sheet("j1".into(), persisted));

        let session = open(store).await.unwrap();

        assert_eq!(session.total(&"a".into()), Some(80.0));
        assert_eq!(session.shape().comments(&"a".into()), "poised");
        assert_eq!(session.total(&"b".into()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_falls_back_when_store_fails() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_reads(true);

        let session = open(store).await.unwrap();
        assert!(session.judge_ranking().is_empty());
        assert_eq!(session.shape().contestants().count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_rejects_unknown_judge_and_sub_event() {
        let store = Arc::new(MemoryStore::new());
        let scheduler = AutosaveScheduler::new(store, DEFAULT_AUTOSAVE_DELAY);

        let wrong_judge = SessionIdentity {
            sub_event: "heat-1".into(),
            judge: "nobody".into(),
        };
        assert!(JudgeSession::open(wrong_judge, &catalog(), scheduler.clone(), DEFAULT_FLASH_DURATION)
            .await
            .is_err());

        let wrong_event = SessionIdentity {
            sub_event: "heat-9".into(),
            judge: "j1".into(),
        };
        assert!(JudgeSession::open(wrong_event, &catalog(), scheduler, DEFAULT_FLASH_DURATION)
            .await
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_settings_skips_catalog() {
        let mut persisted = PersistedScoreSheet::new();
        persisted
            .scores
            .insert("b".into(), [("c2".into(), 50.0)].into_iter().collect());
        let store = Arc::new(MemoryStore::new().with_sheet("j1".into(), persisted));
        let scheduler = AutosaveScheduler::new(store, DEFAULT_AUTOSAVE_DELAY);

        let session = JudgeSession::from_settings(
            identity(),
            settings(),
            scheduler.clone(),
            DEFAULT_FLASH_DURATION,
        )
        .await
        .unwrap();
        assert_eq!(session.total(&"b".into()), Some(50.0));

        let stranger = SessionIdentity {
            sub_event: "heat-1".into(),
            judge: "nobody".into(),
        };
        assert!(
            JudgeSession::from_settings(stranger, settings(), scheduler, DEFAULT_FLASH_DURATION)
                .await
                .is_err()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_autosave_and_rank() {
        let store = Arc::new(MemoryStore::new());
        let mut session = open(Arc::clone(&store)).await.unwrap();

        assert!(session.set_score(&"a".into(), &"c1".into(), "80"));
        assert!(session.set_score(&"a".into(), &"c2".into(), "90"));
        assert!(session.set_score(&"b".into(), &"c1".into(), "95"));
        assert!(!session.set_score(&"b".into(), &"c1".into(), "950"));
        assert!(session.has_pending_autosave());

        let ranking = session.judge_ranking();
        assert_eq!(ranking.rank_of(&"b".into()), Some(1));
        assert_eq!(ranking.rank_of(&"a".into()), Some(2));
        assert_eq!(session.total(&"b".into()), Some(95.0));

        tokio::time::sleep(DEFAULT_AUTOSAVE_DELAY * 2).await;

        assert_eq!(store.writes().len(), 2);
        let sheet = store.sheet(&"j1".into()).unwrap();
        assert_eq!(sheet.scores["b"]["c1"], 95.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_shows_flash() {
        let store = Arc::new(MemoryStore::new());
        let mut session = open(Arc::clone(&store)).await.unwrap();
        session.set_comment(&"a".into(), "steady");

        session.save(&"a".into()).await.unwrap();
        let flash = session.flash().unwrap();
        assert_eq!(flash.text, SAVE_SUCCESS_MESSAGE);
        assert_eq!(flash.kind, FlashKind::Success);
        assert_eq!(store.sheet(&"j1".into()).unwrap().comments["a"], "steady");

        store.set_fail_writes(true);
        assert!(session.save(&"a".into()).await.is_err());
        let flash = session.flash().unwrap();
        assert_eq!(flash.text, SAVE_ERROR_MESSAGE);
        assert_eq!(flash.kind, FlashKind::Error);
        // cache untouched
        assert_eq!(session.shape().comments(&"a".into()), "steady");
    }

    #[tokio::test(start_paused = true)]
    async fn test_flash_expires() {
        let store = Arc::new(MemoryStore::new());
        let mut session = JudgeSession::open(
            identity(),
            &catalog(),
            AutosaveScheduler::new(store, DEFAULT_AUTOSAVE_DELAY),
            Duration::ZERO,
        )
        .await
        .unwrap();

        session.show_flash("hello", FlashKind::Success);
        session.update_flash();
        assert!(session.flash().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_drains_pending() {
        let store = Arc::new(MemoryStore::new());
        let mut session = open(Arc::clone(&store)).await.unwrap();
        session.set_score(&"a".into(), &"c1".into(), "42");

        session.close().await.unwrap();

        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_comment_for_unknown_contestant_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let mut session = open(Arc::clone(&store)).await.unwrap();
        session.set_comment(&"zed".into(), "who?");
        assert!(!session.has_pending_autosave());
    }
}

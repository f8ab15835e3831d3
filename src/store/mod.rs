pub mod memory;
pub mod storage;
pub mod types;

pub use memory::MemoryStore;
pub use storage::{load_sheet, save_sheet, FileStore};
pub use types::{ContestantUpdate, PersistedScoreSheet, ScoreUpdate};

use crate::catalog::JudgeId;
use anyhow::Result;
use std::future::Future;

/// Durable persistence of raw score and comment entries, addressed by judge.
///
/// `save_scores` is a partial upsert: each contestant in `partial` replaces
/// that contestant's sub-document and nothing else.
pub trait ScoreStore: Send + Sync + 'static {
    fn get_scores(&self, judge: &JudgeId)
        -> impl Future<Output = Result<PersistedScoreSheet>> + Send;

    fn save_scores(
        &self,
        judge: &JudgeId,
        partial: ScoreUpdate,
    ) -> impl Future<Output = Result<()>> + Send;
}

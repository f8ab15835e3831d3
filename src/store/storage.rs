use super::types::{PersistedScoreSheet, ScoreUpdate, SHEET_VERSION};
use super::ScoreStore;
use crate::catalog::JudgeId;
use anyhow::{anyhow, Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Score store keeping one JSON sheet per judge under a directory.
///
/// Saves are read-modify-write; the mutex keeps two writes for the same store
/// from interleaving.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a judge's sheet.
    ///
    /// `[A-Za-z0-9-]` is kept as is; every other byte, `_` included, becomes
    /// `_XX` (uppercase hex). Distinct ids always get distinct file names and
    /// none can leave the store directory.
    pub fn sheet_path(&self, judge: &JudgeId) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(judge.as_str())))
    }
}

fn file_stem(id: &str) -> String {
    let mut stem = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("_{:02X}", byte));
        }
    }
    stem
}

/// Load a score sheet from a JSON file.
///
/// A missing file is an empty sheet. An unsupported version is an error.
pub fn load_sheet(path: &Path) -> Result<PersistedScoreSheet> {
    if !path.exists() {
        return Ok(PersistedScoreSheet::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open score sheet at {}", path.display()))?;

    let sheet: PersistedScoreSheet = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load score sheet at {}", path.display()))?;

    if sheet.version != SHEET_VERSION {
        anyhow::bail!("Unsupported score sheet version: {}", sheet.version);
    }

    Ok(sheet)
}

/// Save a score sheet atomically, creating the parent directory if needed.
pub fn save_sheet(path: &Path, sheet: &PersistedScoreSheet) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create score directory at {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, sheet).context("Failed to serialize score sheet")?;

    file.commit().context("Failed to save score sheet")?;

    Ok(())
}

impl ScoreStore for FileStore {
    async fn get_scores(&self, judge: &JudgeId) -> Result<PersistedScoreSheet> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("Score store lock poisoned"))?;
        load_sheet(&self.sheet_path(judge))
    }

    async fn save_scores(&self, judge: &JudgeId, partial: ScoreUpdate) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("Score store lock poisoned"))?;
        let path = self.sheet_path(judge);
        let mut sheet = load_sheet(&path)?;
        sheet.apply(&partial);
        save_sheet(&path, &sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ContestantId, CriterionId};
    use crate::store::types::ContestantUpdate;
    use std::env;

    fn temp_store(name: &str) -> FileStore {
        let dir = env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        FileStore::new(dir)
    }

    fn update(contestant: &str, comments: &str, scores: &[(&str, u8)]) -> ScoreUpdate {
        let mut update = ScoreUpdate::new();
        update.insert(
            ContestantId::from(contestant),
            ContestantUpdate {
                comments: comments.to_string(),
                scores: scores
                    .iter()
                    .map(|(k, v)| (CriterionId::from(*k), *v))
                    .collect(),
            },
        );
        update
    }

    #[test]
    fn test_sheet_path_escapes_id() {
        let store = FileStore::new(PathBuf::from("/data"));
        assert_eq!(
            store.sheet_path(&JudgeId::from("../etc/passwd")),
            PathBuf::from("/data/_2E_2E_2Fetc_2Fpasswd.json")
        );
        assert_eq!(
            store.sheet_path(&JudgeId::from("j_1")),
            PathBuf::from("/data/j_5F1.json")
        );
        assert_eq!(
            store.sheet_path(&JudgeId::from("judge-7")),
            PathBuf::from("/data/judge-7.json")
        );
    }

    #[test]
    fn test_load_missing_sheet_returns_empty() {
        let path = env::temp_dir().join("scorekeep_test_missing_sheet.json");
        let _ = std::fs::remove_file(&path);

        let sheet = load_sheet(&path).unwrap();
        assert_eq!(sheet.version, SHEET_VERSION);
        assert!(sheet.scores.is_empty());
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let path = env::temp_dir().join("scorekeep_test_bad_version.json");
        std::fs::write(&path, r#"{"version": 9, "scores": {}, "comments": {}}"#).unwrap();

        let err = load_sheet(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported score sheet version"));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_save_keeps_other_contestants() {
        let store = temp_store("scorekeep_test_store_merge");
        let judge = JudgeId::from("j1");

        store
            .save_scores(&judge, update("a", "good", &[("c1", 80), ("c2", 90)]))
            .await
            .unwrap();
        store
            .save_scores(&judge, update("b", "", &[("c1", 60)]))
            .await
            .unwrap();

        let sheet = store.get_scores(&judge).await.unwrap();
        assert_eq!(sheet.scores["a"]["c1"], 80.0);
        assert_eq!(sheet.scores["a"]["c2"], 90.0);
        assert_eq!(sheet.comments["a"], "good");
        assert_eq!(sheet.scores["b"]["c1"], 60.0);

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn test_sheets_are_judge_scoped() {
        let store = temp_store("scorekeep_test_store_judges");

        store
            .save_scores(&JudgeId::from("j1"), update("a", "", &[("c1", 10)]))
            .await
            .unwrap();

        let other = store.get_scores(&JudgeId::from("j2")).await.unwrap();
        assert!(other.scores.is_empty());

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_sheet_paths_never_collide() {
        let store = FileStore::new(PathBuf::from("/data"));
        for (a, b) in [("Zoë", "Zoé"), ("j.1", "j_1"), ("ann@x.org", "ann_x_org"), ("_2E", ".")] {
            assert_ne!(
                store.sheet_path(&JudgeId::from(a)),
                store.sheet_path(&JudgeId::from(b)),
                "{} and {} share a file",
                a,
                b
            );
        }
    }

    #[tokio::test]
    async fn test_similar_judge_ids_keep_separate_sheets() {
        let store = temp_store("scorekeep_test_store_similar_ids");

        store
            .save_scores(&JudgeId::from("Zoë"), update("a", "by Zoë", &[("c1", 99)]))
            .await
            .unwrap();

        let other = store.get_scores(&JudgeId::from("Zoé")).await.unwrap();
        assert!(other.scores.is_empty());
        assert!(other.comments.is_empty());

        let own = store.get_scores(&JudgeId::from("Zoë")).await.unwrap();
        assert_eq!(own.scores["a"]["c1"], 99.0);

        let _ = std::fs::remove_dir_all(store.dir());
    }
}

pub mod ids;
pub mod provider;
pub mod types;

pub use ids::{ContestantId, CriterionId, JudgeId, SubEventId};
pub use provider::{CatalogFile, CatalogProvider, FileCatalog, MemoryCatalog};
pub use types::{Contestant, Criterion, Judge, JudgeRole, Settings};

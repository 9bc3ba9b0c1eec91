// src/store/mod.rs
//! Feature state containers and their persisted snapshots

pub mod clock;
pub mod jd_analysis;
pub mod library;
pub mod project;
pub mod slice;
pub mod talent;

use serde::{Deserialize, Serialize};

pub use clock::{Clock, ManualClock, SystemClock};
pub use jd_analysis::JdAnalysisStore;
pub use library::LibraryStore;
pub use project::ProjectStore;
pub use slice::{Persisted, PersistedSlice};
pub use talent::TalentStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

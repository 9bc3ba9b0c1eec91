// src/store/library.rs
//! Talent-library file browser: current folder, history and file selection

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::StateMedium;
use crate::store::clock::Clock;
use crate::store::slice::{Persisted, PersistedSlice};
use crate::store::ViewMode;
use crate::types::oss::OssFile;

pub const STORAGE_KEY: &str = "component-library-storage";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub path: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    #[serde(default)]
    pub current_path: String,
    #[serde(default)]
    pub selected_files: Vec<String>,
    #[serde(default)]
    pub path_history: Vec<HistoryEntry>,
    #[serde(default = "no_history")]
    pub history_index: i64,
    #[serde(default = "list_view")]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub search_term: String,
}

fn no_history() -> i64 {
    -1
}

fn list_view() -> ViewMode {
    ViewMode::List
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryState {
    pub current_path: String,
    /// Fetched listing of `current_path`; never persisted
    pub files: Vec<OssFile>,
    pub selected_files: Vec<String>,
    pub path_history: Vec<HistoryEntry>,
    /// Position in `path_history`, -1 when empty
    pub history_index: i64,
    pub view_mode: ViewMode,
    pub search_term: String,
}

impl Default for LibraryState {
    fn default() -> Self {
        Self {
            current_path: String::new(),
            files: Vec::new(),
            selected_files: Vec::new(),
            path_history: Vec::new(),
            history_index: no_history(),
            view_mode: list_view(),
            search_term: String::new(),
        }
    }
}

impl Persisted<LibrarySnapshot> for LibraryState {
    fn snapshot(&self) -> LibrarySnapshot {
        LibrarySnapshot {
            current_path: self.current_path.clone(),
            selected_files: self.selected_files.clone(),
            path_history: self.path_history.clone(),
            history_index: self.history_index,
            view_mode: self.view_mode,
            search_term: self.search_term.clone(),
        }
    }

    fn restore(&mut self, snapshot: LibrarySnapshot) {
        let max_index = snapshot.path_history.len() as i64 - 1;
        self.current_path = snapshot.current_path;
        self.selected_files = snapshot.selected_files;
        self.path_history = snapshot.path_history;
        self.history_index = snapshot.history_index.clamp(-1, max_index);
        self.view_mode = snapshot.view_mode;
        self.search_term = snapshot.search_term;
    }
}

pub struct LibraryStore {
    state: LibraryState,
    slice: PersistedSlice<LibrarySnapshot>,
    clock: Arc<dyn Clock>,
}

impl LibraryStore {
    pub async fn open(medium: StateMedium, clock: Arc<dyn Clock>) -> Self {
        let slice = PersistedSlice::new(STORAGE_KEY, medium).with_clock(clock.clone());
        let mut state = LibraryState::default();
        slice.load_into(&mut state).await;
        Self {
            state,
            slice,
            clock,
        }
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    pub fn current_path(&self) -> &str {
        &self.state.current_path
    }

    async fn persist(&self) {
        self.slice.save_state(&self.state).await;
    }

    pub fn set_files(&mut self, files: Vec<OssFile>) {
        self.state.files = files;
    }

    /// Entries of the current listing whose name contains the search term
    pub fn filtered_files(&self) -> Vec<&OssFile> {
        let term = self.state.search_term.trim().to_lowercase();
        self.state
            .files
            .iter()
            .filter(|f| term.is_empty() || f.name.to_lowercase().contains(&term))
            .collect()
    }

    pub async fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.search_term = term.into();
        self.persist().await;
    }

    pub async fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.state.view_mode = view_mode;
        self.persist().await;
    }

    /// Open `path`, dropping any forward history and the selection
    pub async fn navigate_to(&mut self, path: impl Into<String>) {
        let path = path.into();
        let keep = (self.state.history_index + 1).max(0) as usize;
        self.state.path_history.truncate(keep);
        self.state.path_history.push(HistoryEntry {
            path: path.clone(),
            timestamp: self.clock.now_millis(),
        });
        self.state.history_index = self.state.path_history.len() as i64 - 1;
        self.state.current_path = path;
        self.state.selected_files.clear();
        self.persist().await;
    }

    pub async fn go_home(&mut self) {
        self.navigate_to("").await;
    }

    pub fn can_go_back(&self) -> bool {
        self.state.history_index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.state.history_index < self.state.path_history.len() as i64 - 1
    }

    pub async fn go_back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.move_in_history(self.state.history_index - 1).await;
        true
    }

    pub async fn go_forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.move_in_history(self.state.history_index + 1).await;
        true
    }

    async fn move_in_history(&mut self, index: i64) {
        if let Some(entry) = self.state.path_history.get(index as usize) {
            self.state.current_path = entry.path.clone();
            self.state.history_index = index;
            self.state.selected_files.clear();
            self.persist().await;
        }
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.state.selected_files.iter().any(|p| p == path)
    }

    pub async fn toggle_selection(&mut self, path: &str) -> bool {
        let selected = if self.is_selected(path) {
            self.state.selected_files.retain(|p| p != path);
            false
        } else {
            self.state.selected_files.push(path.to_string());
            true
        };
        self.persist().await;
        selected
    }

    pub async fn select_all(&mut self) {
        self.state.selected_files = self
            .filtered_files()
            .into_iter()
            .map(|f| f.path.clone())
            .collect();
        self.persist().await;
    }

    pub async fn clear_selection(&mut self) {
        self.state.selected_files.clear();
        self.persist().await;
    }

    pub fn selected_files(&self) -> &[String] {
        &self.state.selected_files
    }

    pub async fn reset_all(&mut self) {
        self.state = LibraryState::default();
        self.persist().await;
    }
}

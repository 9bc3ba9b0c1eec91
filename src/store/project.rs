// src/store/project.rs
//! Flat project list derived from the company tree, with filters and totals

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::StateMedium;
use crate::store::clock::Clock;
use crate::store::slice::{Persisted, PersistedSlice};
use crate::types::company::Company;

pub const STORAGE_KEY: &str = "project-store-v2";

const STATUS_ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: i64,
    pub company_id: i64,
    pub company_name: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub positions: usize,
    #[serde(default)]
    pub hired: u64,
    #[serde(default)]
    pub candidates: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFilters {
    pub status: String,
    #[serde(default)]
    pub search_term: String,
}

impl Default for ProjectFilters {
    fn default() -> Self {
        Self {
            status: STATUS_ALL.to_string(),
            search_term: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub total_positions: usize,
    pub total_hired: u64,
    pub total_candidates: u64,
    /// Percentage of candidates hired, 0 when there are none
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectState {
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub filters: ProjectFilters,
}

impl Persisted<ProjectState> for ProjectState {
    fn snapshot(&self) -> ProjectState {
        self.clone()
    }

    fn restore(&mut self, snapshot: ProjectState) {
        *self = snapshot;
    }
}

pub struct ProjectStore {
    state: ProjectState,
    slice: PersistedSlice<ProjectState>,
}

impl ProjectStore {
    pub async fn open(medium: StateMedium, clock: Arc<dyn Clock>) -> Self {
        let slice = PersistedSlice::new(STORAGE_KEY, medium).with_clock(clock);
        let mut state = ProjectState::default();
        slice.load_into(&mut state).await;
        Self { state, slice }
    }

    pub fn projects(&self) -> &[ProjectRecord] {
        &self.state.projects
    }

    pub fn filters(&self) -> &ProjectFilters {
        &self.state.filters
    }

    /// Rebuild the list from a freshly fetched company tree
    pub async fn sync_from_companies(&mut self, companies: &[Company]) {
        self.state.projects = companies
            .iter()
            .flat_map(|company| {
                company.projects.iter().map(move |project| ProjectRecord {
                    id: project.id,
                    company_id: company.id,
                    company_name: company.name.clone(),
                    name: project.name.clone(),
                    description: project.description.clone(),
                    status: project.status.clone(),
                    positions: project.positions.len(),
                    hired: project.counter("hired"),
                    candidates: project.counter("candidates"),
                    created_at: project.created_at.clone(),
                })
            })
            .collect();
        self.slice.save_state(&self.state).await;
    }

    pub async fn set_filters(&mut self, status: Option<String>, search_term: Option<String>) {
        if let Some(status) = status {
            self.state.filters.status = status;
        }
        if let Some(term) = search_term {
            self.state.filters.search_term = term;
        }
        self.slice.save_state(&self.state).await;
    }

    pub fn filtered(&self) -> Vec<&ProjectRecord> {
        let filters = &self.state.filters;
        let term = filters.search_term.trim().to_lowercase();

        self.state
            .projects
            .iter()
            .filter(|p| {
                filters.status == STATUS_ALL || p.status.as_deref() == Some(filters.status.as_str())
            })
            .filter(|p| {
                term.is_empty()
                    || p.name.to_lowercase().contains(&term)
                    || p.description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&term))
                        .unwrap_or(false)
            })
            .collect()
    }

    pub fn stats(&self) -> ProjectStats {
        let projects = &self.state.projects;
        let with_status =
            |status: &str| projects.iter().filter(|p| p.status.as_deref() == Some(status)).count();

        let total_hired: u64 = projects.iter().map(|p| p.hired).sum();
        let total_candidates: u64 = projects.iter().map(|p| p.candidates).sum();
        let success_rate = if total_candidates > 0 {
            total_hired as f64 / total_candidates as f64 * 100.0
        } else {
            0.0
        };

        ProjectStats {
            total_projects: projects.len(),
            active_projects: with_status("active"),
            completed_projects: with_status("completed"),
            total_positions: projects.iter().map(|p| p.positions).sum(),
            total_hired,
            total_candidates,
            success_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::clock::SystemClock;
    use serde_json::json;

    fn companies() -> Vec<Company> {
        serde_json::from_value(json!([
            {"id": 1, "name": "Acme", "projects": [
                {"id": 10, "name": "Infra rebuild", "status": "active", "hired": 1, "candidates": 4,
                 "positions": [{"id": 100, "name": "SRE"}, {"id": 101, "name": "DBA"}]},
                {"id": 11, "name": "Legacy", "status": "completed", "description": "old billing"}
            ]},
            {"id": 2, "name": "Globex", "projects": [
                {"id": 20, "name": "Mobile", "status": "paused", "hired": 1, "candidates": 4}
            ]}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_sync_filter_and_stats() {
        let medium = StateMedium::memory();
        let mut store = ProjectStore::open(medium.clone(), Arc::new(SystemClock)).await;
        store.sync_from_companies(&companies()).await;

        assert_eq!(store.projects().len(), 3);
        assert_eq!(store.projects()[0].company_name, "Acme");

        let stats = store.stats();
        assert_eq!(stats.total_projects, 3);
        assert_eq!(stats.active_projects, 1);
        assert_eq!(stats.completed_projects, 1);
        assert_eq!(stats.total_positions, 2);
        assert!((stats.success_rate - 25.0).abs() < f64::EPSILON);

        store.set_filters(None, Some("billing".into())).await;
        let names: Vec<&str> = store.filtered().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Legacy"]);

        store.set_filters(Some("paused".into()), Some(String::new())).await;
        assert_eq!(store.filtered()[0].id, 20);

        let reopened = ProjectStore::open(medium, Arc::new(SystemClock)).await;
        assert_eq!(reopened.filters().status, "paused");
        assert_eq!(reopened.projects().len(), 3);
    }
}

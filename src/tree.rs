// src/tree.rs
//! Expand/collapse and single-selection state over company → project → position

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::app_log;
use crate::store::Persisted;
use crate::types::company::{Company, Position, PositionScope, Project};

/// Expanded node ids survive between CLI invocations under this key
pub const STORAGE_KEY: &str = "navigation-tree";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeLevel {
    Company,
    Project,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    #[serde(default)]
    pub expanded_companies: BTreeSet<i64>,
    #[serde(default)]
    pub expanded_projects: BTreeSet<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NavigationTree {
    companies: Vec<Company>,
    expanded_companies: BTreeSet<i64>,
    expanded_projects: BTreeSet<i64>,
    selection: Option<PositionScope>,
}

impl NavigationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn selection(&self) -> Option<&PositionScope> {
        self.selection.as_ref()
    }

    pub fn is_expanded(&self, level: TreeLevel, id: i64) -> bool {
        match level {
            TreeLevel::Company => self.expanded_companies.contains(&id),
            TreeLevel::Project => self.expanded_projects.contains(&id),
        }
    }

    /// Flip membership of `id` in the level's expanded set. Returns the new state.
    pub fn toggle_expand(&mut self, level: TreeLevel, id: i64) -> bool {
        let set = match level {
            TreeLevel::Company => &mut self.expanded_companies,
            TreeLevel::Project => &mut self.expanded_projects,
        };
        if set.remove(&id) {
            false
        } else {
            set.insert(id);
            true
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded_companies.clear();
        self.expanded_projects.clear();
    }

    pub fn find_position(&self, position_id: i64) -> Option<(&Position, &Project, &Company)> {
        self.companies.iter().find_map(|company| {
            company.projects.iter().find_map(|project| {
                project
                    .positions
                    .iter()
                    .find(|p| p.id == position_id)
                    .map(|position| (position, project, company))
            })
        })
    }

    pub fn select_nodes(
        &mut self,
        position: &Position,
        project: &Project,
        company: &Company,
    ) -> PositionScope {
        let scope = PositionScope::from_nodes(position, project, company);
        app_log!(debug, "Selected position {}", scope.label());
        self.selection = Some(scope.clone());
        scope
    }

    /// Select by id; `None` when the position is not in the loaded tree
    pub fn select_position(&mut self, position_id: i64) -> Option<PositionScope> {
        let (position, project, company) = self.find_position(position_id)?;
        let (position, project, company) = (position.clone(), project.clone(), company.clone());
        Some(self.select_nodes(&position, &project, &company))
    }

    pub fn clear_selection(&mut self) -> Option<PositionScope> {
        self.selection.take()
    }

    /// Carry a previously persisted selection over, if it still resolves
    pub fn restore_selection(&mut self, scope: Option<PositionScope>) {
        self.selection = scope.filter(|s| self.scope_resolves(s));
    }

    fn scope_resolves(&self, scope: &PositionScope) -> bool {
        self.find_position(scope.position_id)
            .map(|(_, project, company)| {
                project.id == scope.project_id && company.id == scope.company_id
            })
            .unwrap_or(false)
    }

    /// Swap in freshly fetched data and drop any expansion or selection that
    /// points at something no longer present.
    pub fn replace_companies(&mut self, companies: Vec<Company>) {
        self.companies = companies;

        let company_ids: BTreeSet<i64> = self.companies.iter().map(|c| c.id).collect();
        let project_ids: BTreeSet<i64> = self
            .companies
            .iter()
            .flat_map(|c| c.projects.iter().map(|p| p.id))
            .collect();

        self.expanded_companies.retain(|id| company_ids.contains(id));
        self.expanded_projects.retain(|id| project_ids.contains(id));

        if let Some(scope) = self.selection.take() {
            if self.scope_resolves(&scope) {
                self.selection = Some(scope);
            } else {
                app_log!(info, "Selection {} no longer exists, cleared", scope.label());
            }
        }
    }
}

impl Persisted<TreeSnapshot> for NavigationTree {
    fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            expanded_companies: self.expanded_companies.clone(),
            expanded_projects: self.expanded_projects.clone(),
        }
    }

    fn restore(&mut self, snapshot: TreeSnapshot) {
        self.expanded_companies = snapshot.expanded_companies;
        self.expanded_projects = snapshot.expanded_projects;
    }
}

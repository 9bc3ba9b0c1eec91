// src/types/company.rs
//! Company → project → position hierarchy as served by `GET /companies`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::types::null_as_default;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub positions: Vec<Position>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Project {
    /// Numeric counter the backend may attach (`hired`, `candidates`, ...)
    pub fn counter(&self, name: &str) -> u64 {
        self.extra.get(name).and_then(Value::as_u64).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: i64,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Request body for creating or renaming any node of the tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityForm {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl EntityForm {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A selected position together with its ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionScope {
    pub position_id: i64,
    pub project_id: i64,
    pub company_id: i64,
    pub position_name: String,
    pub project_name: String,
    pub company_name: String,
}

impl PositionScope {
    pub fn from_nodes(position: &Position, project: &Project, company: &Company) -> Self {
        Self {
            position_id: position.id,
            project_id: project.id,
            company_id: company.id,
            position_name: position.name.clone(),
            project_name: project.name.clone(),
            company_name: company.name.clone(),
        }
    }

    pub fn label(&self) -> String {
        format!(
            "{} / {} / {}",
            self.company_name, self.project_name, self.position_name
        )
    }
}

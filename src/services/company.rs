// src/services/company.rs
//! Company / project / position maintenance. Every write is followed by a
//! full re-fetch of the tree; nothing is patched locally.

use crate::app_log;
use crate::core::ApiClient;
use crate::error::{require_non_empty, ApiError, ApiResult};
use crate::tree::NavigationTree;
use crate::types::company::{Company, EntityForm};
use crate::types::response::{ActionResponse, ApiEnvelope};

const COMPANIES_ENDPOINT: &str = "/companies";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Company,
    Project,
    Position,
}

impl Entity {
    fn path(&self, id: i64) -> String {
        match self {
            Entity::Company => format!("/companies/{}", id),
            Entity::Project => format!("/projects/{}", id),
            Entity::Position => format!("/positions/{}", id),
        }
    }

    /// Collection a new child of this entity is created in
    fn children_path(&self, id: i64) -> Option<String> {
        match self {
            Entity::Company => Some(format!("/companies/{}/projects", id)),
            Entity::Project => Some(format!("/projects/{}/positions", id)),
            Entity::Position => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompanyService {
    client: ApiClient,
}

impl CompanyService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Company>> {
        let envelope: ApiEnvelope<Vec<Company>> = self.client.get(COMPANIES_ENDPOINT).await?;
        let companies = envelope.into_data_or_default()?;
        app_log!(debug, "Fetched {} companies", companies.len());
        Ok(companies)
    }

    pub async fn refresh(&self, tree: &mut NavigationTree) -> ApiResult<()> {
        let companies = self.list().await?;
        tree.replace_companies(companies);
        Ok(())
    }

    pub async fn create_company(&self, tree: &mut NavigationTree, form: &EntityForm) -> ApiResult<()> {
        require_non_empty("company name", &form.name)?;
        let response: ActionResponse = self.client.post_json(COMPANIES_ENDPOINT, form).await?;
        response.check()?;
        app_log!(info, "Created company {}", form.name);
        self.refresh(tree).await
    }

    pub async fn create_project(
        &self,
        tree: &mut NavigationTree,
        company_id: i64,
        form: &EntityForm,
    ) -> ApiResult<()> {
        self.create_child(tree, Entity::Company, company_id, form).await
    }

    pub async fn create_position(
        &self,
        tree: &mut NavigationTree,
        project_id: i64,
        form: &EntityForm,
    ) -> ApiResult<()> {
        self.create_child(tree, Entity::Project, project_id, form).await
    }

    async fn create_child(
        &self,
        tree: &mut NavigationTree,
        parent: Entity,
        parent_id: i64,
        form: &EntityForm,
    ) -> ApiResult<()> {
        require_non_empty("name", &form.name)?;
        let Some(endpoint) = parent.children_path(parent_id) else {
            return Err(ApiError::validation("positions have no children"));
        };
        let response: ActionResponse = self.client.post_json(&endpoint, form).await?;
        response.check()?;
        app_log!(info, "Created {} under {:?} {}", form.name, parent, parent_id);
        self.refresh(tree).await
    }

    pub async fn update(
        &self,
        tree: &mut NavigationTree,
        entity: Entity,
        id: i64,
        form: &EntityForm,
    ) -> ApiResult<()> {
        require_non_empty("name", &form.name)?;
        let response: ActionResponse = self.client.put_json(&entity.path(id), form).await?;
        response.check()?;
        app_log!(info, "Updated {:?} {}", entity, id);
        self.refresh(tree).await
    }

    /// Deletes cascade on the backend; the re-fetch purges stale selection
    pub async fn delete(&self, tree: &mut NavigationTree, entity: Entity, id: i64) -> ApiResult<()> {
        let response: ActionResponse = self.client.delete(&entity.path(id)).await?;
        response.check()?;
        app_log!(info, "Deleted {:?} {}", entity, id);
        self.refresh(tree).await
    }
}

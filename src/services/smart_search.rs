// src/services/smart_search.rs
//! Keyword schemes pushed to the search automation queue

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::app_log;
use crate::core::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::types::company::PositionScope;
use crate::types::response::{ActionResponse, QueueStatus, TaskIdResponse};

const TRIGGER_ENDPOINT: &str = "/trigger";
const QUEUE_ENDPOINT: &str = "/trigger/queue";

/// Three keyword groups; each is sent as one space-joined string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordScheme {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub main: Vec<String>,
    #[serde(default)]
    pub position: Vec<String>,
    #[serde(default)]
    pub company: Vec<String>,
}

impl KeywordScheme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        [&self.main, &self.position, &self.company]
            .iter()
            .all(|group| group.iter().all(|k| k.trim().is_empty()))
    }

    pub fn validate(&self) -> ApiResult<()> {
        if self.is_empty() {
            return Err(ApiError::validation(
                "configure at least one keyword group",
            ));
        }
        Ok(())
    }

    fn joined(group: &[String]) -> String {
        group
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Serialize)]
struct TriggerPayload<'a> {
    keywords_main: String,
    keywords_position: String,
    keywords_company: String,
    task_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    company_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position_name: Option<&'a str>,
}

impl<'a> TriggerPayload<'a> {
    fn new(scheme: &KeywordScheme, task_id: &'a str, scope: Option<&'a PositionScope>) -> Self {
        Self {
            keywords_main: KeywordScheme::joined(&scheme.main),
            keywords_position: KeywordScheme::joined(&scheme.position),
            keywords_company: KeywordScheme::joined(&scheme.company),
            task_id,
            company_id: scope.map(|s| s.company_id),
            company_name: scope.map(|s| s.company_name.as_str()),
            project_id: scope.map(|s| s.project_id),
            project_name: scope.map(|s| s.project_name.as_str()),
            position_id: scope.map(|s| s.position_id),
            position_name: scope.map(|s| s.position_name.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmartSearchService {
    client: ApiClient,
}

impl SmartSearchService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn generate_task_id(&self) -> ApiResult<String> {
        let response: TaskIdResponse = self.client.post_empty("/generate_task_id").await?;
        Ok(response.task_id)
    }

    pub async fn cache_position_selection(
        &self,
        task_id: &str,
        scope: &PositionScope,
    ) -> ApiResult<()> {
        let response: ActionResponse = self
            .client
            .post_json(
                "/position_selection_cache",
                &json!({ "task_id": task_id, "position_info": scope }),
            )
            .await?;
        response.check()?;
        Ok(())
    }

    /// Enqueue a search for `scheme`. Generates a task id when none is given
    /// and caches the position scope under it first. Returns the task id.
    pub async fn trigger(
        &self,
        scheme: &KeywordScheme,
        task_id: Option<String>,
        scope: Option<&PositionScope>,
    ) -> ApiResult<String> {
        scheme.validate()?;

        let task_id = match task_id.filter(|t| !t.trim().is_empty()) {
            Some(task_id) => task_id,
            None => self.generate_task_id().await?,
        };
        if let Some(scope) = scope {
            self.cache_position_selection(&task_id, scope).await?;
        }

        let payload = TriggerPayload::new(scheme, &task_id, scope);
        let response: ActionResponse = self.client.post_json(TRIGGER_ENDPOINT, &payload).await?;
        response.check()?;
        app_log!(info, "Queued search '{}' as task {}", scheme.name, task_id);
        Ok(task_id)
    }

    pub async fn queue_status(&self) -> ApiResult<QueueStatus> {
        self.client.get(QUEUE_ENDPOINT).await
    }

    pub async fn clear_queue(&self) -> ApiResult<()> {
        let response: ActionResponse = self.client.delete(QUEUE_ENDPOINT).await?;
        response.check()?;
        app_log!(info, "Search queue cleared");
        Ok(())
    }
}

// src/services/drafts.rs
//! Resume upload and the draft review workflow

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

use crate::app_log;
use crate::core::{ApiClient, FsOps};
use crate::error::{ApiError, ApiResult};
use crate::types::draft::{DraftFieldPath, DraftResume};
use crate::types::response::{ActionResponse, ApiEnvelope, Pagination, UploadResponse};

const UPLOAD_ENDPOINT: &str = "/resume/upload_with_kimi";
const DRAFT_LIST_ENDPOINT: &str = "/resume/draft/list";
const BATCH_CONFIRM_ENDPOINT: &str = "/resume/draft/batch/confirm";
const BATCH_DELETE_ENDPOINT: &str = "/resume/draft/batch";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftListQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Default for DraftListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            status: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DraftPage {
    pub drafts: Vec<DraftResume>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone)]
pub struct DraftService {
    client: ApiClient,
}

impl DraftService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Upload a resume for parsing; returns the id of the draft it produced
    pub async fn upload(&self, path: &Path, position_id: Option<i64>) -> ApiResult<i64> {
        let file = FsOps::read_resume(path).await?;
        app_log!(info, "Uploading resume {} ({} bytes)", file.file_name, file.bytes.len());

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(file.content_type)?;
        let mut form = Form::new().part("resume_file", part);
        if let Some(position_id) = position_id {
            form = form.text("position_id", position_id.to_string());
        }

        let response: UploadResponse = self.client.post_multipart(UPLOAD_ENDPOINT, form).await?;
        if response.success == Some(false) {
            return Err(ApiError::Rejected(
                response.message.unwrap_or_else(|| "upload failed".to_string()),
            ));
        }
        response
            .draft_resume_id
            .ok_or_else(|| ApiError::Rejected("upload response carried no draft id".to_string()))
    }

    pub async fn list(&self, query: &DraftListQuery) -> ApiResult<DraftPage> {
        let envelope: ApiEnvelope<Vec<DraftResume>> =
            self.client.get_query(DRAFT_LIST_ENDPOINT, query).await?;
        let pagination = envelope.pagination.clone().unwrap_or_default();
        let drafts = envelope.into_data_or_default()?;
        Ok(DraftPage { drafts, pagination })
    }

    pub async fn get(&self, id: i64) -> ApiResult<DraftResume> {
        let envelope: ApiEnvelope<DraftResume> =
            self.client.get(&format!("/resume/draft/{}", id)).await?;
        envelope.into_data()
    }

    pub async fn update(&self, draft: &DraftResume) -> ApiResult<()> {
        let response: ActionResponse = self
            .client
            .put_json(&format!("/resume/draft/{}", draft.id), draft)
            .await?;
        response.check()?;
        Ok(())
    }

    /// Read, change one field locally, write the whole draft back
    pub async fn patch(&self, id: i64, path: &DraftFieldPath, value: Value) -> ApiResult<DraftResume> {
        let mut draft = self.get(id).await?;
        draft.apply(path, value)?;
        self.update(&draft).await?;
        app_log!(info, "Updated draft {} field {:?}", id, path);
        Ok(draft)
    }

    /// Confirm one draft, then return the re-fetched list
    pub async fn confirm(&self, id: i64, list: &DraftListQuery) -> ApiResult<DraftPage> {
        let response: ActionResponse = self
            .client
            .post_empty(&format!("/resume/draft/{}/confirm", id))
            .await?;
        response.check()?;
        app_log!(info, "Confirmed draft {}", id);
        self.list(list).await
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let response: ActionResponse = self
            .client
            .delete(&format!("/resume/draft/{}", id))
            .await?;
        response.check()?;
        Ok(())
    }

    pub async fn batch_confirm(&self, ids: &[i64], list: &DraftListQuery) -> ApiResult<DraftPage> {
        if ids.is_empty() {
            return Err(ApiError::validation("no drafts selected"));
        }
        let response: ActionResponse = self
            .client
            .post_json(BATCH_CONFIRM_ENDPOINT, &json!({ "draft_ids": ids }))
            .await?;
        response.check()?;
        app_log!(info, "Confirmed {} drafts", ids.len());
        self.list(list).await
    }

    pub async fn batch_delete(&self, ids: &[i64]) -> ApiResult<()> {
        if ids.is_empty() {
            return Err(ApiError::validation("no drafts selected"));
        }
        let response: ActionResponse = self
            .client
            .delete_json(BATCH_DELETE_ENDPOINT, &json!({ "draft_ids": ids }))
            .await?;
        response.check()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_omits_missing_status() {
        let query = DraftListQuery::default();
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value, json!({"page": 1, "page_size": 20}));

        let query = DraftListQuery {
            status: Some("pending".into()),
            ..DraftListQuery::default()
        };
        assert_eq!(serde_json::to_value(&query).unwrap()["status"], "pending");
    }
}

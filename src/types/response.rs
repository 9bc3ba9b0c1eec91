// src/types/response.rs
//! Response envelopes shared by the backend endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::types::null_as_default;

/// `{success, data, message}` wrapper most endpoints answer with.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> ApiEnvelope<T> {
    /// A body flagged `success: false` is a rejection even on HTTP 200
    pub fn check(&self) -> ApiResult<()> {
        if self.success == Some(false) {
            return Err(ApiError::Rejected(
                self.message
                    .clone()
                    .unwrap_or_else(|| "operation failed".to_string()),
            ));
        }
        Ok(())
    }

    pub fn into_data(self) -> ApiResult<T> {
        self.check()?;
        self.data
            .ok_or_else(|| ApiError::Rejected("response carried no data".to_string()))
    }

    /// For list endpoints where a missing `data` means nothing matched
    pub fn into_data_or_default(self) -> ApiResult<T>
    where
        T: Default,
    {
        self.check()?;
        Ok(self.data.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Body of write endpoints that only report an outcome.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ActionResponse {
    pub fn check(self) -> ApiResult<Self> {
        if self.success == Some(false) {
            return Err(ApiError::Rejected(
                self.message
                    .unwrap_or_else(|| "operation failed".to_string()),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchDeleteResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub draft_resume_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskIdResponse {
    pub task_id: String,
}

/// Queue state of the search automation. The backend shape is open so the
/// raw document is kept next to the fields we read.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QueueStatus {
    #[serde(default)]
    pub queue_length: Option<u64>,
    #[serde(default)]
    pub running: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

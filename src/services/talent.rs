// src/services/talent.rs
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;

use crate::app_log;
use crate::core::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::filter::CandidateQuery;
use crate::store::TalentStore;
use crate::types::candidate::Candidate;
use crate::types::response::{ActionResponse, ApiEnvelope, BatchDeleteResponse, Pagination};

const RESUME_LIST_ENDPOINT: &str = "/resume/list";
const RESUME_BATCH_ENDPOINT: &str = "/resume/batch";

#[derive(Serialize)]
struct ListParams<'a> {
    page: u32,
    page_size: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    search: &'a str,
    sort_order: &'static str,
}

/// One fetch worth of candidates. Position-scoped fetches carry no pagination.
#[derive(Debug, Clone, Default)]
pub struct CandidatePage {
    pub candidates: Vec<Candidate>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDeleteOutcome {
    pub deleted: Vec<i64>,
    pub failed: Vec<i64>,
    pub message: Option<String>,
}

impl BatchDeleteOutcome {
    fn from_response(requested: &[i64], response: BatchDeleteResponse) -> ApiResult<Self> {
        let failed: BTreeSet<i64> = response.failed_ids.iter().copied().collect();
        if response.success == Some(false) && failed.is_empty() {
            return Err(ApiError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "batch delete failed".to_string()),
            ));
        }

        let deleted = requested
            .iter()
            .copied()
            .filter(|id| !failed.contains(id))
            .collect();
        Ok(Self {
            deleted,
            failed: failed.into_iter().collect(),
            message: response.message,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddSummary {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct TalentService {
    client: ApiClient,
}

impl TalentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, query: &CandidateQuery) -> ApiResult<CandidatePage> {
        match query {
            CandidateQuery::Global {
                page,
                page_size,
                search,
                sort_order,
            } => {
                let params = ListParams {
                    page: *page,
                    page_size: *page_size,
                    search,
                    sort_order: sort_order.as_str(),
                };
                let envelope: ApiEnvelope<Vec<Candidate>> =
                    self.client.get_query(RESUME_LIST_ENDPOINT, &params).await?;
                let pagination = envelope.pagination.clone();
                let candidates = envelope.into_data_or_default()?;
                app_log!(info, "Fetched {} candidates (page {})", candidates.len(), page);
                Ok(CandidatePage {
                    candidates,
                    pagination: Some(pagination.unwrap_or_default()),
                })
            }
            CandidateQuery::Position { position_id } => {
                let endpoint = format!("/positions/{}/candidates", position_id);
                let envelope: ApiEnvelope<Vec<Candidate>> = self.client.get(&endpoint).await?;
                let candidates = envelope.into_data_or_default()?;
                app_log!(
                    info,
                    "Fetched {} candidates for position {}",
                    candidates.len(),
                    position_id
                );
                Ok(CandidatePage {
                    candidates,
                    pagination: None,
                })
            }
        }
    }

    /// Fetch whatever the store's current criteria select and load it in
    pub async fn refresh(&self, store: &mut TalentStore) -> ApiResult<usize> {
        let page = self.fetch(&store.query()).await?;
        let count = page.candidates.len();
        if let Some(pagination) = page.pagination {
            store
                .set_pagination(pagination.total_pages, pagination.total)
                .await;
        } else {
            store.set_pagination(1, count as u64).await;
        }
        store.set_candidates(page.candidates).await;
        Ok(count)
    }

    pub async fn detail(&self, id: i64) -> ApiResult<Candidate> {
        let envelope: ApiEnvelope<Candidate> = self.client.get(&format!("/resume/{}", id)).await?;
        envelope.into_data()
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let response: ActionResponse = self.client.delete(&format!("/resume/{}", id)).await?;
        response.check()?;
        app_log!(info, "Deleted candidate {}", id);
        Ok(())
    }

    pub async fn batch_delete(&self, ids: &[i64]) -> ApiResult<BatchDeleteOutcome> {
        if ids.is_empty() {
            return Err(ApiError::validation("no candidates selected"));
        }
        let query: Vec<(&str, i64)> = ids.iter().map(|id| ("resume_ids", *id)).collect();
        let response: BatchDeleteResponse =
            self.client.delete_query(RESUME_BATCH_ENDPOINT, &query).await?;
        let outcome = BatchDeleteOutcome::from_response(ids, response)?;
        if !outcome.failed.is_empty() {
            app_log!(warn, "Batch delete left {} candidates behind", outcome.failed.len());
        }
        Ok(outcome)
    }

    /// Delete the store's batch selection and drop what the backend removed
    pub async fn delete_selected(&self, store: &mut TalentStore) -> ApiResult<BatchDeleteOutcome> {
        let outcome = self.batch_delete(&store.selected_ids()).await?;
        for id in &outcome.deleted {
            store.remove_candidate(*id).await;
        }
        Ok(outcome)
    }

    pub async fn add_to_position(
        &self,
        position_id: i64,
        candidate_id: i64,
        notes: &str,
    ) -> ApiResult<()> {
        let endpoint = format!("/positions/{}/candidates/{}", position_id, candidate_id);
        let response: ActionResponse = self
            .client
            .post_json(&endpoint, &json!({ "notes": notes }))
            .await?;
        response.check()?;
        Ok(())
    }

    /// Every candidate into every position, one call per pair. A 401 stops
    /// the run; other failures are counted and skipped.
    pub async fn add_to_positions(
        &self,
        candidate_ids: &[i64],
        position_ids: &[i64],
        notes: &str,
    ) -> ApiResult<AddSummary> {
        if candidate_ids.is_empty() {
            return Err(ApiError::validation("no candidates selected"));
        }
        if position_ids.is_empty() {
            return Err(ApiError::validation("no positions selected"));
        }

        let mut summary = AddSummary::default();
        for position_id in position_ids {
            for candidate_id in candidate_ids {
                match self.add_to_position(*position_id, *candidate_id, notes).await {
                    Ok(()) => summary.succeeded += 1,
                    Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
                    Err(e) => {
                        app_log!(
                            warn,
                            "Adding candidate {} to position {} failed: {}",
                            candidate_id,
                            position_id,
                            e
                        );
                        summary.failed += 1;
                    }
                }
            }
        }
        app_log!(
            info,
            "Added {} of {} candidate/position pairs",
            summary.succeeded,
            summary.succeeded + summary.failed
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(success: Option<bool>, failed_ids: Vec<i64>) -> BatchDeleteResponse {
        BatchDeleteResponse {
            success,
            message: Some("done".into()),
            failed_ids,
        }
    }

    #[test]
    fn test_batch_outcome_keeps_failed_ids() {
        let outcome =
            BatchDeleteOutcome::from_response(&[1, 2, 3], response(Some(true), vec![2])).unwrap();
        assert_eq!(outcome.deleted, vec![1, 3]);
        assert_eq!(outcome.failed, vec![2]);
    }

    #[test]
    fn test_batch_outcome_partial_failure_is_not_rejection() {
        let outcome =
            BatchDeleteOutcome::from_response(&[1, 2], response(Some(false), vec![1, 2])).unwrap();
        assert!(outcome.deleted.is_empty());
    }

    #[test]
    fn test_batch_outcome_plain_failure_is_rejection() {
        let err = BatchDeleteOutcome::from_response(&[1], response(Some(false), vec![])).unwrap_err();
        assert!(matches!(err, ApiError::Rejected(_)));
    }

    #[test]
    fn test_list_params_skip_blank_search() {
        let params = ListParams {
            page: 1,
            page_size: 20,
            search: "",
            sort_order: "desc",
        };
        let value = serde_json::to_value(&params).unwrap();
        assert!(value.get("search").is_none());
        assert_eq!(value["sort_order"], "desc");
    }
}

// src/analysis/service.rs
//! Submits job descriptions for streamed analysis and keeps only the latest run

use reqwest::multipart::{Form, Part};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::analysis::consumer::{consume, StreamOutcome};
use crate::analysis::AnalysisError;
use crate::app_log;
use crate::core::{ApiClient, FsOps};
use crate::error::{require_non_empty, ApiResult};
use crate::store::jd_analysis::{JdAnalysisStore, SourceKind, WorkspaceMode};

const ANALYZE_ENDPOINT: &str = "/analyze_jd_stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisSource {
    /// A document on this machine, uploaded with the request
    Local(PathBuf),
    /// A path inside the backend's object storage
    Oss(String),
}

impl AnalysisSource {
    fn kind(&self) -> SourceKind {
        match self {
            AnalysisSource::Local(_) => SourceKind::Local,
            AnalysisSource::Oss(_) => SourceKind::Oss,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub source: AnalysisSource,
    pub supplementary_info: Option<String>,
}

impl AnalysisRequest {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            source: AnalysisSource::Local(path.into()),
            supplementary_info: None,
        }
    }

    pub fn oss(path: impl Into<String>) -> Self {
        Self {
            source: AnalysisSource::Oss(path.into()),
            supplementary_info: None,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        let info = info.into();
        self.supplementary_info = if info.trim().is_empty() { None } else { Some(info) };
        self
    }
}

#[derive(Debug)]
struct Inflight {
    request_id: String,
    cancel: CancellationToken,
}

/// At most one analysis counts at a time: starting a new one cancels the
/// previous run, and a run that finishes after being replaced is dropped.
#[derive(Clone)]
pub struct AnalysisService {
    client: ApiClient,
    store: Arc<Mutex<JdAnalysisStore>>,
    inflight: Arc<Mutex<Option<Inflight>>>,
}

impl AnalysisService {
    pub fn new(client: ApiClient, store: Arc<Mutex<JdAnalysisStore>>) -> Self {
        Self {
            client,
            store,
            inflight: Arc::new(Mutex::new(None)),
        }
    }

    pub fn store(&self) -> &Arc<Mutex<JdAnalysisStore>> {
        &self.store
    }

    pub async fn current_request_id(&self) -> Option<String> {
        self.inflight
            .lock()
            .await
            .as_ref()
            .map(|inflight| inflight.request_id.clone())
    }

    /// Stop the running analysis, if any
    pub async fn cancel(&self) -> bool {
        let Some(inflight) = self.inflight.lock().await.take() else {
            return false;
        };
        app_log!(info, "Cancelling analysis {}", inflight.request_id);
        inflight.cancel.cancel();
        self.store.lock().await.finish_analysis(false);
        true
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> Result<StreamOutcome, AnalysisError> {
        if let AnalysisSource::Oss(path) = &request.source {
            require_non_empty("oss path", path)?;
        }

        let request_id = Uuid::new_v4().to_string();
        let cancel = CancellationToken::new();
        {
            let mut inflight = self.inflight.lock().await;
            if let Some(previous) = inflight.replace(Inflight {
                request_id: request_id.clone(),
                cancel: cancel.clone(),
            }) {
                app_log!(info, "Analysis {} superseded by {}", previous.request_id, request_id);
                previous.cancel.cancel();
            }
        }

        {
            let mut store = self.store.lock().await;
            store.begin_analysis(request.source.kind());
            match &request.source {
                AnalysisSource::Local(path) => {
                    store.set_upload_path(path.display().to_string()).await
                }
                AnalysisSource::Oss(path) => store.set_selected_oss_path(path.clone()).await,
            }
            store
                .set_supplementary_info(request.supplementary_info.clone().unwrap_or_default())
                .await;
        }

        let result = self.run(&request, &request_id, &cancel).await;
        self.settle(&request_id, result).await
    }

    async fn run(
        &self,
        request: &AnalysisRequest,
        request_id: &str,
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, AnalysisError> {
        let form = build_form(request, request_id).await?;
        self.set_progress(request_id, 10).await;

        app_log!(info, "Submitting analysis {} ({:?})", request_id, request.source);
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AnalysisError::Cancelled),
            response = self.client.post_stream(ANALYZE_ENDPOINT, form) => response?,
        };
        self.set_progress(request_id, 30).await;

        let outcome = consume(response.bytes_stream(), request_id, cancel).await?;
        self.set_progress(request_id, 90).await;
        Ok(outcome)
    }

    async fn set_progress(&self, request_id: &str, progress: u8) {
        if self.is_current(request_id).await {
            self.store.lock().await.set_progress(progress);
        }
    }

    async fn is_current(&self, request_id: &str) -> bool {
        self.inflight
            .lock()
            .await
            .as_ref()
            .map(|inflight| inflight.request_id == request_id)
            .unwrap_or(false)
    }

    /// Apply a finished run to the store unless a newer run owns it now
    async fn settle(
        &self,
        request_id: &str,
        result: Result<StreamOutcome, AnalysisError>,
    ) -> Result<StreamOutcome, AnalysisError> {
        {
            let mut inflight = self.inflight.lock().await;
            match inflight.as_ref() {
                Some(current) if current.request_id == request_id => {
                    inflight.take();
                }
                Some(_) => {
                    app_log!(debug, "Dropping result of superseded analysis {}", request_id);
                    return Err(AnalysisError::Superseded);
                }
                // cancelled through `cancel`, which already reset the store
                None => return Err(AnalysisError::Cancelled),
            }
        }

        let mut store = self.store.lock().await;
        match result {
            Ok(outcome) => {
                store
                    .set_analysis_result(Some(outcome.result().clone()))
                    .await;
                store.set_mode(WorkspaceMode::Analyze).await;
                store.set_progress(100);
                store.finish_analysis(true);
                app_log!(
                    info,
                    "Analysis {} finished ({})",
                    request_id,
                    if outcome.is_complete() { "complete" } else { "partial" }
                );
                Ok(outcome)
            }
            Err(e) => {
                store.finish_analysis(false);
                if e.is_notice() {
                    app_log!(info, "Analysis {} stopped: {}", request_id, e);
                } else {
                    app_log!(error, "Analysis {} failed: {}", request_id, e);
                }
                Err(e)
            }
        }
    }
}

async fn build_form(request: &AnalysisRequest, request_id: &str) -> ApiResult<Form> {
    let mut form = match &request.source {
        AnalysisSource::Local(path) => {
            let upload = FsOps::read_upload(path).await?;
            let part = Part::bytes(upload.bytes)
                .file_name(upload.file_name)
                .mime_str(upload.content_type)?;
            Form::new().text("source", "local").part("file", part)
        }
        AnalysisSource::Oss(path) => Form::new()
            .text("source", "oss")
            .text("file_path", path.clone()),
    };

    if let Some(info) = &request.supplementary_info {
        form = form.text("supplementary_info", info.clone());
    }
    Ok(form.text("request_id", request_id.to_string()))
}

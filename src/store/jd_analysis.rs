// src/store/jd_analysis.rs
//! Job-description analysis workspace: last result, inputs and chat log

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::StateMedium;
use crate::store::clock::Clock;
use crate::store::slice::{Persisted, PersistedSlice};
use crate::types::analysis::AnalysisResult;

pub const STORAGE_KEY: &str = "jd-analysis-storage";
pub const DEFAULT_MODEL: &str = "glm-4-flash";
const DEFAULT_PANEL_WIDTH: u32 = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceMode {
    #[default]
    Upload,
    Analyze,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

/// Where the document under analysis comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Local,
    Oss,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JdSnapshot {
    #[serde(default)]
    pub analysis_result: Option<AnalysisResult>,
    #[serde(default)]
    pub selected_oss_path: String,
    #[serde(default)]
    pub supplementary_info: String,
    #[serde(default)]
    pub upload_path: String,
    #[serde(default)]
    pub current_mode: WorkspaceMode,
    #[serde(default = "default_model")]
    pub selected_model: String,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    #[serde(default = "default_panel_width")]
    pub right_panel_width: u32,
    #[serde(default)]
    pub is_right_panel_collapsed: bool,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_panel_width() -> u32 {
    DEFAULT_PANEL_WIDTH
}

#[derive(Debug, Clone, PartialEq)]
pub struct JdState {
    pub analysis_result: Option<AnalysisResult>,
    pub selected_oss_path: String,
    pub supplementary_info: String,
    pub upload_path: String,
    pub current_mode: WorkspaceMode,
    pub selected_model: String,
    pub chat_history: Vec<ChatMessage>,
    pub right_panel_width: u32,
    pub is_right_panel_collapsed: bool,
    // transient
    pub in_progress: Option<SourceKind>,
    pub progress: u8,
}

impl Default for JdState {
    fn default() -> Self {
        Self {
            analysis_result: None,
            selected_oss_path: String::new(),
            supplementary_info: String::new(),
            upload_path: String::new(),
            current_mode: WorkspaceMode::Upload,
            selected_model: default_model(),
            chat_history: Vec::new(),
            right_panel_width: DEFAULT_PANEL_WIDTH,
            is_right_panel_collapsed: false,
            in_progress: None,
            progress: 0,
        }
    }
}

impl Persisted<JdSnapshot> for JdState {
    fn snapshot(&self) -> JdSnapshot {
        JdSnapshot {
            analysis_result: self.analysis_result.clone(),
            selected_oss_path: self.selected_oss_path.clone(),
            supplementary_info: self.supplementary_info.clone(),
            upload_path: self.upload_path.clone(),
            current_mode: self.current_mode,
            selected_model: self.selected_model.clone(),
            chat_history: self.chat_history.clone(),
            right_panel_width: self.right_panel_width,
            is_right_panel_collapsed: self.is_right_panel_collapsed,
        }
    }

    fn restore(&mut self, s: JdSnapshot) {
        self.analysis_result = s.analysis_result;
        self.selected_oss_path = s.selected_oss_path;
        self.supplementary_info = s.supplementary_info;
        self.upload_path = s.upload_path;
        self.current_mode = s.current_mode;
        self.selected_model = s.selected_model;
        self.chat_history = s.chat_history;
        self.right_panel_width = s.right_panel_width;
        self.is_right_panel_collapsed = s.is_right_panel_collapsed;
    }
}

pub struct JdAnalysisStore {
    state: JdState,
    slice: PersistedSlice<JdSnapshot>,
    clock: Arc<dyn Clock>,
}

impl JdAnalysisStore {
    pub async fn open(medium: StateMedium, clock: Arc<dyn Clock>) -> Self {
        let slice = PersistedSlice::new(STORAGE_KEY, medium).with_clock(clock.clone());
        let mut state = JdState::default();
        slice.load_into(&mut state).await;
        Self {
            state,
            slice,
            clock,
        }
    }

    pub fn state(&self) -> &JdState {
        &self.state
    }

    pub fn analysis_result(&self) -> Option<&AnalysisResult> {
        self.state.analysis_result.as_ref()
    }

    async fn persist(&self) {
        self.slice.save_state(&self.state).await;
    }

    pub async fn set_analysis_result(&mut self, result: Option<AnalysisResult>) {
        if result.is_some() {
            self.state.is_right_panel_collapsed = false;
        }
        self.state.analysis_result = result;
        self.persist().await;
    }

    pub async fn set_selected_oss_path(&mut self, path: impl Into<String>) {
        self.state.selected_oss_path = path.into();
        self.persist().await;
    }

    pub async fn set_supplementary_info(&mut self, info: impl Into<String>) {
        self.state.supplementary_info = info.into();
        self.persist().await;
    }

    pub async fn set_upload_path(&mut self, path: impl Into<String>) {
        self.state.upload_path = path.into();
        self.persist().await;
    }

    pub async fn set_mode(&mut self, mode: WorkspaceMode) {
        self.state.current_mode = mode;
        self.persist().await;
    }

    pub async fn set_selected_model(&mut self, model: impl Into<String>) {
        self.state.selected_model = model.into();
        self.persist().await;
    }

    pub async fn set_right_panel(&mut self, width: u32, collapsed: bool) {
        self.state.right_panel_width = width;
        self.state.is_right_panel_collapsed = collapsed;
        self.persist().await;
    }

    fn now_rfc3339(&self) -> String {
        let now: DateTime<Utc> = Utc
            .timestamp_millis_opt(self.clock.now_millis())
            .single()
            .unwrap_or_default();
        now.to_rfc3339()
    }

    pub async fn add_chat_message(&mut self, role: ChatRole, content: impl Into<String>) {
        let model_used = match role {
            ChatRole::Assistant => Some(self.state.selected_model.clone()),
            ChatRole::User => None,
        };
        let message = ChatMessage {
            role,
            content: content.into(),
            timestamp: self.now_rfc3339(),
            model_used,
        };
        self.state.chat_history.push(message);
        self.persist().await;
    }

    pub async fn clear_chat_history(&mut self) {
        self.state.chat_history.clear();
        self.persist().await;
    }

    pub fn begin_analysis(&mut self, source: SourceKind) {
        self.state.in_progress = Some(source);
        self.state.progress = 0;
    }

    pub fn set_progress(&mut self, progress: u8) {
        self.state.progress = progress.min(100);
    }

    /// Clear the in-flight markers; progress survives only on success
    pub fn finish_analysis(&mut self, succeeded: bool) {
        self.state.in_progress = None;
        if !succeeded {
            self.state.progress = 0;
        }
    }

    pub async fn reset_analysis(&mut self) {
        self.state.analysis_result = None;
        self.state.supplementary_info.clear();
        self.state.progress = 0;
        self.persist().await;
    }

    pub async fn reset_chat(&mut self) {
        self.clear_chat_history().await;
    }

    /// Back to defaults except the panel layout and model choice
    pub async fn reset_all(&mut self) {
        let width = self.state.right_panel_width;
        let collapsed = self.state.is_right_panel_collapsed;
        let model = std::mem::take(&mut self.state.selected_model);
        self.state = JdState {
            right_panel_width: width,
            is_right_panel_collapsed: collapsed,
            selected_model: model,
            ..JdState::default()
        };
        self.persist().await;
    }
}

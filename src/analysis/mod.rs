// src/analysis/mod.rs
//! Streamed job-description analysis: decoding, consumption and orchestration

pub mod consumer;
pub mod decoder;
pub mod service;

use thiserror::Error;

use crate::error::ApiError;

pub use consumer::{consume, EventKind, StreamOutcome};
pub use decoder::{EventDecoder, RawEvent};
pub use service::{AnalysisRequest, AnalysisService, AnalysisSource};

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Stopped on request; partial results were discarded.
    #[error("analysis cancelled")]
    Cancelled,

    /// A newer request replaced this one before it completed.
    #[error("analysis superseded by a newer request")]
    Superseded,

    #[error("analysis returned no usable result, please retry")]
    NoResults,

    #[error("analysis result could not be assembled: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("analysis stream interrupted: {0}")]
    Stream(#[from] reqwest::Error),

    #[error("analysis stream interrupted: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Outcomes the user asked for or caused, as opposed to failures
    pub fn is_notice(&self) -> bool {
        matches!(self, AnalysisError::Cancelled | AnalysisError::Superseded)
    }
}

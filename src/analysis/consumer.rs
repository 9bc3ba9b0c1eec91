// src/analysis/consumer.rs
//! Reads an analysis stream to the end and assembles the result

use futures::{Stream, StreamExt};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::analysis::decoder::{EventDecoder, RawEvent};
use crate::analysis::AnalysisError;
use crate::app_log;
use crate::types::analysis::{AnalysisResult, Envelope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Keywords,
    Diagram,
}

impl EventKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "keywords_result" => Some(EventKind::Keywords),
            "diagram_result" => Some(EventKind::Diagram),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Keywords => "keywords_result",
            EventKind::Diagram => "diagram_result",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    Complete(AnalysisResult),
    /// Only one of the two events arrived intact
    Partial {
        result: AnalysisResult,
        missing: EventKind,
    },
}

impl StreamOutcome {
    pub fn result(&self) -> &AnalysisResult {
        match self {
            StreamOutcome::Complete(result) | StreamOutcome::Partial { result, .. } => result,
        }
    }

    pub fn into_result(self) -> AnalysisResult {
        match self {
            StreamOutcome::Complete(result) | StreamOutcome::Partial { result, .. } => result,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, StreamOutcome::Complete(_))
    }
}

#[derive(Debug, Default)]
struct Collected {
    keywords: Option<Map<String, Value>>,
    diagram: Option<Map<String, Value>>,
}

impl Collected {
    fn accept(&mut self, event: RawEvent, expected_request_id: &str) {
        let Some(kind) = EventKind::from_name(&event.name) else {
            app_log!(debug, "Ignoring stream event {}", event.name);
            return;
        };

        let envelope = match Envelope::from_json(&event.data) {
            Ok(envelope) => envelope,
            Err(e) => {
                app_log!(warn, "Skipping malformed {} payload: {}", kind.name(), e);
                return;
            }
        };

        if envelope.request_id() != Some(expected_request_id) {
            app_log!(
                debug,
                "Dropping {} for request {:?}, expecting {}",
                kind.name(),
                envelope.request_id(),
                expected_request_id
            );
            return;
        }

        app_log!(debug, "Received {}", kind.name());
        let body = envelope.into_body();
        match kind {
            EventKind::Keywords => self.keywords = Some(body),
            EventKind::Diagram => self.diagram = Some(body),
        }
    }

    fn into_outcome(self) -> Result<StreamOutcome, AnalysisError> {
        match (self.keywords, self.diagram) {
            (Some(keywords), Some(diagram)) => AnalysisResult::merge([keywords, diagram])
                .map(StreamOutcome::Complete)
                .map_err(AnalysisError::Malformed),
            (Some(keywords), None) => {
                app_log!(warn, "Analysis stream ended without diagram_result");
                AnalysisResult::merge([keywords])
                    .map(|result| StreamOutcome::Partial {
                        result,
                        missing: EventKind::Diagram,
                    })
                    .map_err(AnalysisError::Malformed)
            }
            (None, Some(diagram)) => {
                app_log!(warn, "Analysis stream ended without keywords_result");
                AnalysisResult::merge([diagram])
                    .map(|result| StreamOutcome::Partial {
                        result,
                        missing: EventKind::Keywords,
                    })
                    .map_err(AnalysisError::Malformed)
            }
            (None, None) => Err(AnalysisError::NoResults),
        }
    }
}

/// Consume `stream` in order until it ends or `cancel` fires.
///
/// Only payloads tagged with `expected_request_id` count. A later event of
/// the same kind replaces an earlier one. A transport error ends the run
/// with that error; cancellation discards everything collected so far.
pub async fn consume<S, B, E>(
    stream: S,
    expected_request_id: &str,
    cancel: &CancellationToken,
) -> Result<StreamOutcome, AnalysisError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<AnalysisError>,
{
    tokio::pin!(stream);
    let mut decoder = EventDecoder::new();
    let mut collected = Collected::default();

    loop {
        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AnalysisError::Cancelled),
            next = stream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                for event in decoder.push(chunk.as_ref()) {
                    collected.accept(event, expected_request_id);
                }
            }
            Some(Err(e)) => return Err(e.into()),
            None => break,
        }
    }

    for event in decoder.finish() {
        collected.accept(event, expected_request_id);
    }
    collected.into_outcome()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::io;

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Vec<u8>, io::Error>> {
        let owned: Vec<Result<Vec<u8>, io::Error>> =
            parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        stream::iter(owned)
    }

    const KEYWORDS: &str = "event: keywords_result\ndata: {\"request_id\":\"r1\",\"payload\":{\"job_title\":\"SRE\",\"skills\":[\"Linux\"]}}\n\n";
    const DIAGRAM: &str = "event: diagram_result\ndata: {\"request_id\":\"r1\",\"mermaid_code\":\"graph TD\",\"job_title\":\"Site Reliability\"}\n\n";

    #[tokio::test]
    async fn test_complete_merge_diagram_wins() {
        let outcome = consume(chunks(&[KEYWORDS, DIAGRAM]), "r1", &CancellationToken::new())
            .await
            .unwrap();
        assert!(outcome.is_complete());
        let result = outcome.into_result();
        assert_eq!(result.job_title.as_deref(), Some("Site Reliability"));
        assert_eq!(result.skills, vec!["Linux"]);
        assert_eq!(result.mermaid_code.as_deref(), Some("graph TD"));
    }

    #[tokio::test]
    async fn test_invalid_diagram_json_yields_partial() {
        let broken = "event: diagram_result\ndata: {\"request_id\":\"r1\",\"mermaid\n\n";
        let outcome = consume(chunks(&[KEYWORDS, broken]), "r1", &CancellationToken::new())
            .await
            .unwrap();
        match outcome {
            StreamOutcome::Partial { result, missing } => {
                assert_eq!(missing, EventKind::Diagram);
                assert_eq!(result.job_title.as_deref(), Some("SRE"));
                assert_eq!(result.mermaid_code, None);
            }
            other => panic!("expected partial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_foreign_request_id_is_discarded() {
        let foreign = KEYWORDS.replace("r1", "r0");
        let err = consume(chunks(&[&foreign]), "r1", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NoResults));
    }

    #[tokio::test]
    async fn test_later_duplicate_overwrites_and_unknown_events_ignored() {
        let second = "event: keywords_result\ndata: {\"request_id\":\"r1\",\"job_title\":\"Platform\"}\n";
        let noise = "event: progress\ndata: {\"pct\":50}\n";
        let outcome = consume(
            chunks(&[KEYWORDS, noise, second]),
            "r1",
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(outcome.result().job_title.as_deref(), Some("Platform"));
    }

    #[tokio::test]
    async fn test_byte_level_chunking() {
        let all = format!("{}{}", KEYWORDS, DIAGRAM);
        let bytes: Vec<Result<Vec<u8>, io::Error>> =
            all.bytes().map(|b| Ok(vec![b])).collect();
        let outcome = consume(stream::iter(bytes), "r1", &CancellationToken::new())
            .await
            .unwrap();
        assert!(outcome.is_complete());
    }

    #[tokio::test]
    async fn test_cancelled_token_discards_results() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = consume(chunks(&[KEYWORDS, DIAGRAM]), "r1", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Cancelled));
    }

    #[tokio::test]
    async fn test_transport_error_is_not_partial() {
        let parts: Vec<Result<Vec<u8>, io::Error>> = vec![
            Ok(KEYWORDS.as_bytes().to_vec()),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ];
        let err = consume(stream::iter(parts), "r1", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Io(_)));
    }
}

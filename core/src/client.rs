//! HTTP client for the workflow service
//!
//! The service exposes `POST /chat` (JSON body `{"user_query": ...}`) in two
//! shapes: a `text/event-stream` body of `data: {type, content}` frames, and
//! a buffered single-JSON variant that also carries workflow metadata. Plus
//! `GET /health` for a liveness probe.

use std::time::Duration;

use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::events::{parse_frame, WorkflowEvent};
use crate::frames::FrameDecoder;
use crate::SillageConfig;

/// Capacity of the update channel between the decode task and its consumer.
const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// Updates delivered while a chat turn is in flight.
///
/// `Failed` and `Done` are terminal: the decode task sends at most one of
/// them, last, then exits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatUpdate {
    /// Full current assistant text; replaces any previous one.
    Answer {
        /// Complete assistant text as of this update.
        content: String,
    },
    /// Workflow progress line for the activity feed.
    Log {
        /// Human-readable progress line.
        content: String,
    },
    /// The turn failed: transport error mid-stream or a workflow `error`
    /// event. No further updates follow.
    Failed {
        /// User-presentable error description.
        error: String,
    },
    /// The response stream ended. The protocol has no completion event of
    /// its own, so the decode task synthesizes this when the body runs dry.
    Done,
}

/// One clarification exchange from the workflow's interview step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    /// Question the workflow asked.
    #[serde(default)]
    pub question: String,
    /// The recorded answer.
    #[serde(default)]
    pub answer: String,
}

/// Metadata the buffered chat variant returns alongside the answer.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WorkflowMeta {
    /// The query after the clarification step rewrote it.
    pub clarified_query: Option<String>,
    /// Summary of what the research step found.
    pub research_result: Option<String>,
    /// Interview turns that led to the clarified query.
    pub conversation_history: Option<Vec<HistoryEntry>>,
}

impl WorkflowMeta {
    /// Whether there is anything worth showing.
    pub fn is_empty(&self) -> bool {
        self.clarified_query.is_none()
            && self.research_result.is_none()
            && self
                .conversation_history
                .as_ref()
                .is_none_or(Vec::is_empty)
    }
}

/// Response of the buffered (non-streaming) chat variant.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatResponse {
    /// Final assistant text. Absent when the workflow produced nothing.
    pub final_response: Option<String>,
    /// Workflow metadata fields, flattened beside the answer.
    #[serde(flatten)]
    pub meta: WorkflowMeta,
}

/// Errors raised before any stream update is produced.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never completed (connect failure, timeout, bad body).
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("workflow service returned {0}")]
    Status(reqwest::StatusCode),
}

/// Client for the workflow service endpoints.
#[derive(Clone)]
pub struct WorkflowClient {
    http: reqwest::Client,
    base_url: String,
}

impl WorkflowClient {
    /// Create a client for the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(120))
    }

    /// Create a client with an explicit whole-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to build HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Create a client from configuration.
    pub fn from_config(config: &SillageConfig) -> Self {
        Self::with_timeout(config.base_url(), config.request_timeout())
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    /// Probe the service's health endpoint.
    pub async fn health_check(&self) -> bool {
        match self
            .http
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Start a streaming chat turn.
    ///
    /// Fails fast on request errors and non-success statuses, before any
    /// update exists. On success a background task decodes the body into
    /// [`ChatUpdate`]s; dropping the receiver cancels the task (its next
    /// send fails), which aborts the transfer for superseded turns.
    pub async fn send_chat_streaming(
        &self,
        user_query: &str,
    ) -> Result<mpsc::Receiver<ChatUpdate>, ClientError> {
        let response = self
            .http
            .post(self.chat_url())
            .json(&serde_json::json!({ "user_query": user_query }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let mut stream = response.bytes_stream();

        tokio::spawn(async move {
            let mut decoder = FrameDecoder::new();

            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(error) => {
                        let _ = tx
                            .send(ChatUpdate::Failed {
                                error: error.to_string(),
                            })
                            .await;
                        return;
                    }
                };

                for frame in decoder.push(&String::from_utf8_lossy(&bytes)) {
                    let Some(event) = parse_frame(&frame) else {
                        continue;
                    };
                    match event {
                        WorkflowEvent::Answer { content } => {
                            if tx.send(ChatUpdate::Answer { content }).await.is_err() {
                                return;
                            }
                        }
                        WorkflowEvent::Log { content } => {
                            tracing::info!(step = %content, "workflow progress");
                            if tx.send(ChatUpdate::Log { content }).await.is_err() {
                                return;
                            }
                        }
                        WorkflowEvent::Error { content } => {
                            let _ = tx.send(ChatUpdate::Failed { error: content }).await;
                            return;
                        }
                        WorkflowEvent::Unknown { kind } => {
                            tracing::debug!(%kind, "ignoring unrecognized event type");
                        }
                    }
                }
            }

            if let Some(dropped) = decoder.finish() {
                tracing::debug!(bytes = dropped.len(), "stream ended mid-frame, tail dropped");
            }
            let _ = tx.send(ChatUpdate::Done).await;
        });

        Ok(rx)
    }

    /// Run a buffered chat turn and return the full response at once.
    pub async fn send_chat(&self, user_query: &str) -> Result<ChatResponse, ClientError> {
        let response = self
            .http
            .post(self.chat_url())
            .json(&serde_json::json!({ "user_query": user_query }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoint_urls() {
        let client = WorkflowClient::new("http://localhost:8000");
        assert_eq!(client.chat_url(), "http://localhost:8000/chat");
        assert_eq!(client.health_url(), "http://localhost:8000/health");
    }

    #[test]
    fn test_chat_response_deserializes_full_payload() {
        let raw = r#"{
            "final_response": "Try Eau de Citron.",
            "clarified_query": "fresh citrus scents for summer",
            "research_result": "top notes: bergamot, yuzu",
            "conversation_history": [
                {"question": "Day or evening wear?", "answer": "Daytime."}
            ]
        }"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(response.final_response.as_deref(), Some("Try Eau de Citron."));
        assert_eq!(
            response.meta.clarified_query.as_deref(),
            Some("fresh citrus scents for summer")
        );
        let history = response.meta.conversation_history.clone().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question, "Day or evening wear?");
        assert!(!response.meta.is_empty());
    }

    #[test]
    fn test_chat_response_tolerates_sparse_payload() {
        let response: ChatResponse = serde_json::from_str(r#"{"final_response": null}"#).unwrap();
        assert_eq!(response.final_response, None);
        assert!(response.meta.is_empty());

        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.final_response, None);
        assert!(response.meta.is_empty());
    }

    #[test]
    fn test_meta_is_empty_accounts_for_null_and_empty_history() {
        let meta = WorkflowMeta::default();
        assert!(meta.is_empty());

        let meta = WorkflowMeta {
            conversation_history: Some(Vec::new()),
            ..WorkflowMeta::default()
        };
        assert!(meta.is_empty());

        let meta = WorkflowMeta {
            research_result: Some("notes".to_string()),
            ..WorkflowMeta::default()
        };
        assert!(!meta.is_empty());
    }
}

//! Typed events carried by the response stream
//!
//! Each frame wraps a JSON payload behind a `data: ` prefix. The payload is
//! a `{type, content}` object; the `type` discriminates how the content is
//! used. Frames that don't carry the prefix (comments, keep-alives) and
//! payloads that don't parse are dropped without disturbing the rest of the
//! stream.

use serde::Deserialize;

/// Prefix every payload-bearing frame starts with.
const DATA_PREFIX: &str = "data: ";

/// One parsed event from the workflow stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// The full current assistant text. Each occurrence replaces the
    /// previous one; the last `Answer` wins.
    Answer {
        /// Complete assistant text as of this event.
        content: String,
    },
    /// Progress diagnostic from a workflow step. Never shown as a
    /// conversation message.
    Log {
        /// Human-readable progress line.
        content: String,
    },
    /// The workflow raised while producing the answer; the turn failed.
    Error {
        /// Error description from the service.
        content: String,
    },
    /// An event type this client doesn't know. Kept so callers can log it;
    /// otherwise ignored.
    Unknown {
        /// The unrecognized `type` value.
        kind: String,
    },
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: String,
}

/// Parse one frame into a [`WorkflowEvent`].
///
/// Returns `None` for frames without the `data: ` prefix and for payloads
/// that fail to parse; a malformed frame is logged and skipped rather than
/// ending the stream.
pub fn parse_frame(frame: &str) -> Option<WorkflowEvent> {
    let payload = frame.trim().strip_prefix(DATA_PREFIX)?;

    match serde_json::from_str::<RawEvent>(payload) {
        Ok(raw) => Some(match raw.kind.as_str() {
            "answer" => WorkflowEvent::Answer {
                content: raw.content,
            },
            "log" => WorkflowEvent::Log {
                content: raw.content,
            },
            "error" => WorkflowEvent::Error {
                content: raw.content,
            },
            _ => WorkflowEvent::Unknown { kind: raw.kind },
        }),
        Err(error) => {
            tracing::warn!(%error, frame = payload, "dropping malformed frame");
            None
        }
    }
}

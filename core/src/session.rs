//! Chat session: one turn at a time against the workflow service
//!
//! [`ChatSession`] owns everything a presentation layer may read (the
//! conversation log, the loading flag, the last error, workflow metadata,
//! the activity feed) and is the only writer of all of it. Stream updates
//! arrive over a channel from the decode task and are folded in by
//! [`poll`](ChatSession::poll) on the caller's schedule, so renderers never
//! race the network.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::client::{ChatUpdate, WorkflowClient, WorkflowMeta};
use crate::conversation::{Conversation, Message};
use crate::SillageConfig;

/// Shown when the buffered variant comes back without an answer.
const NO_RESPONSE_FALLBACK: &str = "The workflow service returned no response.";

/// Driver for chat turns and holder of the observable session state.
pub struct ChatSession {
    client: WorkflowClient,
    streaming: bool,
    conversation: Conversation,
    loading: bool,
    error: String,
    meta: Option<WorkflowMeta>,
    activity: Vec<String>,
    updates: Option<mpsc::Receiver<ChatUpdate>>,
}

impl ChatSession {
    /// Create a session from configuration.
    pub fn new(config: &SillageConfig) -> Self {
        Self::with_client(WorkflowClient::from_config(config), config.streaming)
    }

    /// Create a session around an existing client.
    pub fn with_client(client: WorkflowClient, streaming: bool) -> Self {
        Self {
            client,
            streaming,
            conversation: Conversation::new(),
            loading: false,
            error: String::new(),
            meta: None,
            activity: Vec::new(),
            updates: None,
        }
    }

    /// The conversation log, oldest message first.
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Whether a request is in flight. The input boundary disables on this.
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Last turn's error, empty when the turn succeeded.
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Workflow metadata from the last buffered turn, if any.
    pub fn meta(&self) -> Option<&WorkflowMeta> {
        self.meta.as_ref()
    }

    /// Workflow progress lines received during the current turn.
    pub fn activity(&self) -> &[String] {
        &self.activity
    }

    /// Most recent progress line, for a status bar.
    pub fn latest_activity(&self) -> Option<&str> {
        self.activity.last().map(String::as_str)
    }

    /// The message currently receiving answer events, if any.
    pub fn streaming_message(&self) -> Option<&Message> {
        self.conversation.streaming_message()
    }

    /// Whether the last message is still receiving answer events.
    pub fn is_streaming(&self) -> bool {
        self.conversation.is_streaming()
    }

    /// Probe the service's health endpoint.
    pub async fn health_check(&self) -> bool {
        self.client.health_check().await
    }

    /// Submit a user query, starting a new turn.
    ///
    /// Empty input is ignored. The UI disables input while `loading`, but a
    /// submit that arrives anyway is handled defensively: the previous
    /// turn's update channel is dropped, which cancels its decode task and
    /// transfer, and its still-streaming message is settled by the new
    /// turn. The request itself fails into [`error`](Self::error) rather
    /// than returning one; callers just render the session afterwards.
    pub async fn submit(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        self.updates = None;
        self.error.clear();
        self.meta = None;
        self.activity.clear();
        self.conversation.begin_turn(query);
        self.loading = true;

        if self.streaming {
            match self.client.send_chat_streaming(query).await {
                Ok(updates) => self.updates = Some(updates),
                Err(error) => self.fail_turn(error.to_string()),
            }
        } else {
            match self.client.send_chat(query).await {
                Ok(response) => {
                    let text = response
                        .final_response
                        .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string());
                    self.conversation.apply_answer(text);
                    self.conversation.settle();
                    if !response.meta.is_empty() {
                        self.meta = Some(response.meta);
                    }
                    self.loading = false;
                }
                Err(error) => self.fail_turn(error.to_string()),
            }
        }
    }

    /// Drain pending stream updates without blocking.
    ///
    /// Call once per render frame. Stops early when a terminal update closes
    /// the turn.
    pub fn poll(&mut self) {
        loop {
            let Some(updates) = self.updates.as_mut() else {
                return;
            };
            match updates.try_recv() {
                Ok(update) => {
                    if self.apply_update(update) {
                        self.updates = None;
                    }
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    // Decode task vanished without a terminal update; close
                    // the turn with what we have.
                    self.conversation.settle();
                    self.loading = false;
                    self.updates = None;
                    return;
                }
            }
        }
    }

    /// Fold one stream update into the session state.
    ///
    /// Returns true when the update ended the turn. Public so embedders with
    /// their own transport can drive the session the way
    /// [`poll`](Self::poll) does.
    pub fn apply_update(&mut self, update: ChatUpdate) -> bool {
        match update {
            ChatUpdate::Answer { content } => {
                if !self.conversation.apply_answer(content) {
                    tracing::warn!("answer update arrived with no turn open");
                }
                false
            }
            ChatUpdate::Log { content } => {
                self.activity.push(content);
                false
            }
            ChatUpdate::Failed { error } => {
                self.fail_turn(error);
                true
            }
            ChatUpdate::Done => {
                self.conversation.settle();
                self.loading = false;
                true
            }
        }
    }

    fn fail_turn(&mut self, error: String) {
        self.conversation.abort_turn();
        self.error = error;
        self.loading = false;
        self.updates = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use pretty_assertions::assert_eq;

    fn session_with_open_turn(query: &str) -> ChatSession {
        let mut session = ChatSession::with_client(WorkflowClient::new("http://localhost:8000"), true);
        session.conversation.begin_turn(query);
        session.loading = true;
        session
    }

    #[test]
    fn test_answer_updates_replace_text() {
        let mut session = session_with_open_turn("recommend something fresh");

        assert!(!session.apply_update(ChatUpdate::Answer {
            content: "A".to_string()
        }));
        assert!(!session.apply_update(ChatUpdate::Answer {
            content: "AB".to_string()
        }));

        let last = session.messages().last().unwrap();
        assert_eq!(last.text, "AB");
        assert!(last.streaming);
        assert!(session.loading());
    }

    #[test]
    fn test_log_updates_feed_activity_not_conversation() {
        let mut session = session_with_open_turn("q");
        let before = session.messages().len();

        session.apply_update(ChatUpdate::Log {
            content: "research done".to_string(),
        });

        assert_eq!(session.messages().len(), before);
        assert_eq!(session.latest_activity(), Some("research done"));
    }

    #[test]
    fn test_done_settles_and_clears_loading() {
        let mut session = session_with_open_turn("q");
        session.apply_update(ChatUpdate::Answer {
            content: "final".to_string(),
        });

        assert!(session.apply_update(ChatUpdate::Done));

        assert!(!session.loading());
        assert!(!session.is_streaming());
        assert_eq!(session.messages().last().unwrap().text, "final");
        assert!(session.error().is_empty());
    }

    #[test]
    fn test_failure_before_any_answer_drops_placeholder() {
        let mut session = session_with_open_turn("q");

        assert!(session.apply_update(ChatUpdate::Failed {
            error: "connection reset".to_string()
        }));

        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::User);
        assert_eq!(session.error(), "connection reset");
        assert!(!session.loading());
    }

    #[test]
    fn test_failure_after_partial_answer_keeps_it() {
        let mut session = session_with_open_turn("q");
        session.apply_update(ChatUpdate::Answer {
            content: "partial".to_string(),
        });

        session.apply_update(ChatUpdate::Failed {
            error: "workflow raised".to_string(),
        });

        let last = session.messages().last().unwrap();
        assert_eq!(last.text, "partial");
        assert!(!last.streaming);
        assert_eq!(session.error(), "workflow raised");
    }

    #[test]
    fn test_poll_without_open_channel_is_a_no_op() {
        let mut session = session_with_open_turn("q");
        session.poll();
        assert!(session.loading(), "poll alone must not end the turn");
    }
}

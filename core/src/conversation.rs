//! Conversation log and per-message streaming state
//!
//! The log is the single source of truth for what the user and assistant
//! have said. It is append-only except for the current turn's assistant
//! entry, whose text is replaced in place while the stream is live. All
//! mutation goes through [`Conversation`] methods; readers only ever see
//! shared slices, so the one-writer rule holds by construction.

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Typed by the user.
    User,
    /// Produced by the workflow service.
    Assistant,
}

/// One entry in the conversation log.
///
/// `text` is authoritative content; presentation layers derive whatever
/// partial view they want from it but never write back. While `streaming`
/// is true the text may still be replaced by the next answer event;
/// the flag drops to false exactly once and the message is then final.
#[derive(Clone, Debug)]
pub struct Message {
    /// Who authored this message.
    pub role: Role,
    /// Authoritative message content.
    pub text: String,
    /// Whether the text may still change.
    pub streaming: bool,
}

/// Ordered conversation log.
///
/// Invariant: at most one message is streaming, and when one is, it is the
/// last entry. Every method preserves this.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the log.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The message currently receiving answer events, if any.
    pub fn streaming_message(&self) -> Option<&Message> {
        self.messages.last().filter(|m| m.streaming)
    }

    /// Whether a turn is currently receiving answer events.
    pub fn is_streaming(&self) -> bool {
        self.streaming_message().is_some()
    }

    /// Start a new turn.
    ///
    /// Any message still streaming from a previous turn is settled first, so
    /// the one-streaming-message invariant survives overlapping turns. The
    /// user's message lands settled (user messages never stream), followed by
    /// an empty assistant placeholder that the stream will fill in.
    pub fn begin_turn(&mut self, user_text: impl Into<String>) -> usize {
        self.settle();
        self.messages.push(Message {
            role: Role::User,
            text: user_text.into(),
            streaming: false,
        });
        self.messages.push(Message {
            role: Role::Assistant,
            text: String::new(),
            streaming: true,
        });
        self.messages.len() - 1
    }

    /// Replace the streaming message's text with the latest full answer.
    ///
    /// The message stays streaming: later events may replace the text again,
    /// and the reveal layer keeps animating whatever is current. Returns
    /// false (and changes nothing) when no message is streaming.
    pub fn apply_answer(&mut self, content: impl Into<String>) -> bool {
        match self.messages.last_mut() {
            Some(message) if message.streaming => {
                message.text = content.into();
                true
            }
            _ => false,
        }
    }

    /// Finalize every message. Streaming flags drop and stay down.
    pub fn settle(&mut self) {
        for message in &mut self.messages {
            message.streaming = false;
        }
    }

    /// End a turn that failed.
    ///
    /// A placeholder that never received content is removed, so a failed
    /// request leaves only the user's message behind. A message that already
    /// holds a partial answer is kept and settled instead.
    pub fn abort_turn(&mut self) {
        match self.messages.last() {
            Some(message) if message.streaming && message.text.is_empty() => {
                self.messages.pop();
            }
            _ => self.settle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_invariant(log: &Conversation) {
        let streaming: Vec<usize> = log
            .messages()
            .iter()
            .enumerate()
            .filter(|(_, m)| m.streaming)
            .map(|(i, _)| i)
            .collect();
        assert!(streaming.len() <= 1, "more than one streaming message");
        if let Some(&idx) = streaming.first() {
            assert_eq!(idx, log.len() - 1, "streaming message is not last");
        }
    }

    #[test]
    fn test_begin_turn_appends_user_and_placeholder() {
        let mut log = Conversation::new();
        let idx = log.begin_turn("hello");

        assert_eq!(idx, 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.messages()[0].role, Role::User);
        assert_eq!(log.messages()[0].text, "hello");
        assert!(!log.messages()[0].streaming);
        assert_eq!(log.messages()[1].role, Role::Assistant);
        assert_eq!(log.messages()[1].text, "");
        assert!(log.messages()[1].streaming);
        assert_invariant(&log);
    }

    #[test]
    fn test_apply_answer_replaces_not_appends() {
        let mut log = Conversation::new();
        log.begin_turn("q");
        assert!(log.apply_answer("A"));
        assert!(log.apply_answer("AB"));

        let last = log.messages().last().unwrap();
        assert_eq!(last.text, "AB");
        assert!(last.streaming, "answer events keep the message streaming");
        assert_invariant(&log);
    }

    #[test]
    fn test_apply_answer_without_streaming_message_is_rejected() {
        let mut log = Conversation::new();
        assert!(!log.apply_answer("ghost"));

        log.begin_turn("q");
        log.settle();
        assert!(!log.apply_answer("late"));
        assert_eq!(log.messages().last().unwrap().text, "");
    }

    #[test]
    fn test_new_turn_settles_previous_stream() {
        let mut log = Conversation::new();
        log.begin_turn("first");
        log.apply_answer("partial answer");
        assert!(log.is_streaming());

        log.begin_turn("second");

        assert_eq!(log.len(), 4);
        assert!(!log.messages()[1].streaming, "stale stream was settled");
        assert_eq!(log.messages()[1].text, "partial answer");
        assert_eq!(log.messages()[2].text, "second");
        assert!(log.messages()[3].streaming);
        assert_invariant(&log);
    }

    #[test]
    fn test_settle_is_terminal() {
        let mut log = Conversation::new();
        log.begin_turn("q");
        log.apply_answer("done");
        log.settle();

        assert!(!log.is_streaming());
        assert_eq!(log.messages().last().unwrap().text, "done");
        assert_invariant(&log);
    }

    #[test]
    fn test_abort_turn_drops_empty_placeholder() {
        let mut log = Conversation::new();
        log.begin_turn("q");
        log.abort_turn();

        assert_eq!(log.len(), 1, "only the user message remains");
        assert_eq!(log.messages()[0].role, Role::User);
        assert_invariant(&log);
    }

    #[test]
    fn test_abort_turn_keeps_partial_answer() {
        let mut log = Conversation::new();
        log.begin_turn("q");
        log.apply_answer("half an ans");
        log.abort_turn();

        assert_eq!(log.len(), 2);
        let last = log.messages().last().unwrap();
        assert_eq!(last.text, "half an ans");
        assert!(!last.streaming);
        assert_invariant(&log);
    }

    #[test]
    fn test_invariant_across_many_turns() {
        let mut log = Conversation::new();
        for i in 0..5 {
            log.begin_turn(format!("question {i}"));
            log.apply_answer("a");
            log.apply_answer("ab");
            assert_invariant(&log);
        }
        log.settle();
        assert_invariant(&log);
        assert_eq!(log.len(), 10);
    }
}

//! Typewriter-style reveal of streaming answer text
//!
//! Presentation-only: the reveal watches a message's text and exposes a
//! growing prefix of it, one character per tick at a fixed cadence. It never
//! writes back into the message. Because the service replaces the whole
//! answer text on every event, the reveal restarts from the beginning
//! whenever the text it observes changes.

use std::time::Duration;

/// Default time per revealed character.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(15);

/// Incremental text reveal with a per-character cadence.
///
/// # Example
///
/// ```
/// use sillage_core::Reveal;
///
/// let mut reveal = Reveal::new();
/// reveal.observe("hi");
/// reveal.tick();
/// assert_eq!(reveal.visible_text(), "h");
/// reveal.tick();
/// assert_eq!(reveal.visible_text(), "hi");
/// assert!(reveal.is_complete());
/// ```
#[derive(Clone, Debug)]
pub struct Reveal {
    text: String,
    visible_chars: usize,
    tick_interval: Duration,
    carry: Duration,
}

impl Reveal {
    /// Create a reveal over empty text at the default cadence.
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_TICK_INTERVAL)
    }

    /// Create a reveal with a custom per-character interval.
    ///
    /// A zero interval is clamped to the default; it would otherwise stall
    /// the accumulator in [`advance`](Self::advance).
    pub fn with_interval(tick_interval: Duration) -> Self {
        let tick_interval = if tick_interval.is_zero() {
            DEFAULT_TICK_INTERVAL
        } else {
            tick_interval
        };
        Self {
            text: String::new(),
            visible_chars: 0,
            tick_interval,
            carry: Duration::ZERO,
        }
    }

    /// Point the reveal at the current authoritative text.
    ///
    /// Unchanged text is a no-op; any difference restarts the reveal from
    /// the first character, including mid-stream replacements that merely
    /// extend the previous answer.
    pub fn observe(&mut self, text: &str) {
        if self.text != text {
            self.text.clear();
            self.text.push_str(text);
            self.visible_chars = 0;
            self.carry = Duration::ZERO;
        }
    }

    /// Reveal one more character, saturating at the full text.
    pub fn tick(&mut self) {
        if self.visible_chars < self.total_chars() {
            self.visible_chars += 1;
        }
    }

    /// Advance by elapsed wall time, ticking once per interval.
    ///
    /// Leftover time below one interval carries over, so an irregular caller
    /// (a render loop) still averages out to the configured cadence.
    pub fn advance(&mut self, delta: Duration) {
        if self.is_complete() {
            self.carry = Duration::ZERO;
            return;
        }
        self.carry += delta;
        while self.carry >= self.tick_interval && !self.is_complete() {
            self.carry -= self.tick_interval;
            self.tick();
        }
    }

    /// The revealed prefix, cut on a character boundary.
    pub fn visible_text(&self) -> &str {
        let end = self
            .text
            .char_indices()
            .nth(self.visible_chars)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
        &self.text[..end]
    }

    /// Whether the whole text is visible.
    pub fn is_complete(&self) -> bool {
        self.visible_chars >= self.total_chars()
    }

    /// Show everything immediately.
    pub fn skip_to_end(&mut self) {
        self.visible_chars = self.total_chars();
        self.carry = Duration::ZERO;
    }

    /// The configured time per character.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    fn total_chars(&self) -> usize {
        self.text.chars().count()
    }
}

impl Default for Reveal {
    fn default() -> Self {
        Self::new()
    }
}

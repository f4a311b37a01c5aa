//! Main Application
//!
//! The App owns the TUI lifecycle: the event loop, the input line, scroll
//! state, and the reveal animation for the streaming answer. All chat state
//! lives in the [`ChatSession`]; the App just drains it once per frame and
//! renders what it sees.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, EventStream, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Style;
use ratatui::text::Text;
use ratatui::widgets::{Block, Paragraph};
use ratatui::{Frame, Terminal};

use sillage_core::{ChatSession, Reveal, SillageConfig, WorkflowMeta};

use crate::theme;
use crate::ui;

/// Time between animation frames.
const FRAME_DURATION: Duration = Duration::from_millis(33);

/// Time between loading-spinner steps.
const SPINNER_INTERVAL: Duration = Duration::from_millis(300);

/// Main application state.
pub struct App {
    /// Is the app still running?
    running: bool,
    /// Chat state: conversation, loading flag, error, metadata.
    session: ChatSession,
    /// Reveal animation for the streaming answer.
    reveal: Reveal,
    /// User input buffer.
    input_buffer: String,
    /// Scroll offset (lines from bottom, 0 = latest).
    scroll_offset: usize,
    /// Total rendered conversation lines (for scroll bounds).
    total_lines: usize,
    /// Visible conversation height from the last frame.
    viewport_height: usize,
    /// Whether the metadata panel is open.
    show_meta: bool,
    /// Loading-spinner frame.
    spinner_frame: u8,
    /// Time accumulated toward the next spinner step.
    spinner_elapsed: Duration,
    /// Result of the startup health probe.
    backend_healthy: Option<bool>,
    /// Last frame time (for animations).
    last_frame: Instant,
}

impl App {
    /// Create a new App instance.
    pub fn new(config: &SillageConfig) -> Self {
        Self {
            running: true,
            session: ChatSession::new(config),
            reveal: Reveal::with_interval(config.reveal_interval()),
            input_buffer: String::new(),
            scroll_offset: 0,
            total_lines: 0,
            viewport_height: 0,
            show_meta: false,
            spinner_frame: 0,
            spinner_elapsed: Duration::ZERO,
            backend_healthy: None,
            last_frame: Instant::now(),
        }
    }

    /// Main event loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        // Render immediately so the user sees UI before the probe returns.
        terminal.draw(|frame| self.draw(frame))?;
        self.backend_healthy = Some(self.session.health_check().await);

        while self.running {
            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        match event {
                            // Only handle Press events (not Release or Repeat)
                            Event::Key(key) if key.kind == KeyEventKind::Press => {
                                self.handle_key(key).await;
                            }
                            Event::Mouse(mouse) => self.handle_mouse(mouse),
                            _ => {}
                        }
                    }
                }

                _ = tokio::time::sleep(FRAME_DURATION) => {}
            }

            self.session.poll();
            self.update();
            terminal.draw(|frame| self.draw(frame))?;
        }

        Ok(())
    }

    /// Handle keyboard input.
    async fn handle_key(&mut self, key: event::KeyEvent) {
        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }

            // Submit; input is disabled while a request is in flight.
            KeyCode::Enter => {
                if !self.session.loading() && !self.input_buffer.trim().is_empty() {
                    let query = std::mem::take(&mut self.input_buffer);
                    self.session.submit(&query).await;
                    self.scroll_offset = 0;
                }
            }

            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }

            KeyCode::F(2) => self.show_meta = !self.show_meta,

            KeyCode::PageUp => {
                let page = (self.viewport_height / 2).max(1);
                let max_scroll = self.total_lines.saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + page).min(max_scroll);
            }
            KeyCode::PageDown => {
                let page = (self.viewport_height / 2).max(1);
                self.scroll_offset = self.scroll_offset.saturating_sub(page);
            }

            _ => {}
        }
    }

    /// Handle mouse input.
    fn handle_mouse(&mut self, mouse: event::MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                let max_scroll = self.total_lines.saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + 3).min(max_scroll);
            }
            MouseEventKind::ScrollDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(3);
            }
            _ => {}
        }
    }

    /// Advance animations from wall time.
    fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;

        if let Some(message) = self.session.streaming_message() {
            let text = message.text.clone();
            self.reveal.observe(&text);
            self.reveal.advance(delta);
        }

        if self.session.loading() {
            self.spinner_elapsed += delta;
            while self.spinner_elapsed >= SPINNER_INTERVAL {
                self.spinner_elapsed -= SPINNER_INTERVAL;
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
            }
        } else {
            self.spinner_frame = 0;
            self.spinner_elapsed = Duration::ZERO;
        }
    }

    /// Render the UI.
    fn draw(&mut self, frame: &mut Frame) {
        let [main_area, input_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let (conversation_area, meta_area) = if self.show_meta {
            let [left, right] =
                Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)])
                    .areas(main_area);
            (left, Some(right))
        } else {
            (main_area, None)
        };

        // Conversation, anchored to the bottom.
        let width = conversation_area.width.saturating_sub(2) as usize;
        let height = conversation_area.height.saturating_sub(2) as usize;
        let streaming_visible = self
            .session
            .streaming_message()
            .map(|_| self.reveal.visible_text());
        let all_lines = ui::conversation_lines(self.session.messages(), streaming_visible, width);

        self.total_lines = all_lines.len();
        self.viewport_height = height;
        self.scroll_offset = self
            .scroll_offset
            .min(self.total_lines.saturating_sub(height));

        let end = self.total_lines - self.scroll_offset;
        let start = end.saturating_sub(height);
        let visible = all_lines[start..end].to_vec();

        frame.render_widget(
            Paragraph::new(Text::from(visible))
                .block(Block::bordered().title(" Perfume Assistant ")),
            conversation_area,
        );

        if let Some(area) = meta_area {
            let inner = area.width.saturating_sub(2) as usize;
            let empty = WorkflowMeta::default();
            let meta = self.session.meta().unwrap_or(&empty);
            frame.render_widget(
                Paragraph::new(Text::from(ui::meta_lines(meta, inner)))
                    .block(Block::bordered().title(" Workflow ")),
                area,
            );
        }

        let input_style = if self.session.loading() {
            Style::default().fg(theme::DIM_GRAY)
        } else {
            Style::default().fg(theme::USER_GREEN)
        };
        frame.render_widget(
            Paragraph::new(format!("{}_", self.input_buffer))
                .style(input_style)
                .block(Block::bordered().title(" Ask about a scent ")),
            input_area,
        );

        frame.render_widget(
            Paragraph::new(ui::status_line(
                self.session.loading(),
                self.spinner_frame,
                self.session.error(),
                self.session.latest_activity(),
                self.backend_healthy,
            )),
            status_area,
        );
    }
}

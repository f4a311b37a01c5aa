//! Sillage Core - Headless chat pipeline for the perfume workflow service
//!
//! This crate drives one chat conversation against the workflow backend,
//! completely independent of any UI framework. It can back a TUI, a GUI, or
//! run headless for testing.
//!
//! # Architecture
//!
//! ```text
//! network bytes
//!      │
//!      ▼
//! FrameDecoder ──► parse_frame ──► ChatUpdate channel
//!                                       │
//!                                       ▼
//!                                  ChatSession ──► Conversation (truth)
//!                                                       │
//!                                                       ▼
//!                                                    Reveal (derived view)
//! ```
//!
//! The decode task is the only producer; [`ChatSession::poll`] folds its
//! updates into the conversation on the consumer's schedule. The [`Reveal`]
//! derives a growing prefix of the streaming message for display and never
//! writes back.
//!
//! # Wire protocol
//!
//! `POST /chat` with `{"user_query": ...}` returns either a single JSON
//! object (`final_response` plus workflow metadata) or a `text/event-stream`
//! body of `data: {"type": ..., "content": ...}` frames separated by blank
//! lines. `answer` frames carry the full replacement text; `log` frames a
//! progress diagnostic. `GET /health` answers liveness probes.
//!
//! # No UI dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework. It's pure session logic that can be used anywhere.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod conversation;
pub mod events;
pub mod frames;
pub mod reveal;
pub mod session;

// Re-exports for convenience
pub use client::{
    ChatResponse, ChatUpdate, ClientError, HistoryEntry, WorkflowClient, WorkflowMeta,
};
pub use config::{default_config_path, ConfigError, SillageConfig};
pub use conversation::{Conversation, Message, Role};
pub use events::{parse_frame, WorkflowEvent};
pub use frames::FrameDecoder;
pub use reveal::{Reveal, DEFAULT_TICK_INTERVAL};
pub use session::ChatSession;

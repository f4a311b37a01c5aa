//! Theme and Colors
//!
//! A muted palette that keeps the conversation readable and pushes the
//! chrome into the background.

use ratatui::style::Color;

/// Accent for assistant messages.
pub const ASSISTANT_VIOLET: Color = Color::Rgb(186, 140, 255);

/// User input green.
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System/dim text.
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Error red.
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Healthy-backend green.
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Workflow activity lines in the status bar.
pub const ACTIVITY_BLUE: Color = Color::Rgb(150, 180, 255);

/// Metadata panel headings.
pub const META_GOLD: Color = Color::Rgb(255, 223, 128);

//! Busy indicator for the TUI.
//!
//! Drawn in the header while a connect or query call is awaited.

use std::time::Instant;

/// Braille spinner frames for query execution.
const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Dot animation frames for connection work.
const DOT_FRAMES: &[&str] = &["", ".", "..", "..."];

/// Animation speed in milliseconds per frame.
const FRAME_DURATION_MS: u128 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerType {
    Braille,
    Dots,
}

/// Spinner state for animated indicators.
#[derive(Debug, Clone)]
pub struct Spinner {
    spinner_type: SpinnerType,
    start_time: Instant,
    label: String,
}

impl Spinner {
    pub fn new(spinner_type: SpinnerType, label: impl Into<String>) -> Self {
        Self {
            spinner_type,
            start_time: Instant::now(),
            label: label.into(),
        }
    }

    pub fn connecting() -> Self {
        Self::new(SpinnerType::Dots, "Connecting")
    }

    pub fn disconnecting() -> Self {
        Self::new(SpinnerType::Dots, "Disconnecting")
    }

    pub fn executing() -> Self {
        Self::new(SpinnerType::Braille, "Executing")
    }

    pub fn transaction() -> Self {
        Self::new(SpinnerType::Dots, "Working")
    }

    /// Returns the current frame of the animation.
    pub fn frame(&self) -> &'static str {
        let elapsed_ms = self.start_time.elapsed().as_millis();
        let frame_index = (elapsed_ms / FRAME_DURATION_MS) as usize;

        match self.spinner_type {
            SpinnerType::Braille => BRAILLE_FRAMES[frame_index % BRAILLE_FRAMES.len()],
            SpinnerType::Dots => DOT_FRAMES[frame_index % DOT_FRAMES.len()],
        }
    }

    /// Returns the display string for the spinner.
    pub fn display(&self) -> String {
        match self.spinner_type {
            SpinnerType::Braille => format!("{} {}", self.frame(), self.label),
            SpinnerType::Dots => format!("{}{}", self.label, self.frame()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

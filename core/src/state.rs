//! Transient UI state owned by the controller.

use crate::voice::Voice;

/// Placeholder shown in the text field at startup.
pub const DEFAULT_TEXT: &str = "Hello, text to speech!";

/// Engine status as tracked by the screen.
///
/// `Error` is declared for completeness; initialization failures are
/// swallowed and never move the status there.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    Initializing,
    #[default]
    Initialized,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Initializing => "initializing",
            Status::Initialized => "initialized",
            Status::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    pub text: String,
    pub speech_rate: f64,
    pub speech_pitch: f64,
    /// Empty until a voice is picked or discovered
    pub selected_voice_id: String,
    pub available_voices: Vec<Voice>,
    pub status: Status,
    /// Last absorbed error, only recorded under `ErrorPolicy::Surface`
    pub last_error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_text(DEFAULT_TEXT)
    }
}

impl AppState {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speech_rate: 1.0,
            speech_pitch: 1.0,
            selected_voice_id: String::new(),
            available_voices: Vec::new(),
            status: Status::Initialized,
            last_error: None,
        }
    }

    pub fn selected_voice(&self) -> Option<&Voice> {
        if self.selected_voice_id.is_empty() {
            return None;
        }
        self.available_voices
            .iter()
            .find(|v| v.id == self.selected_voice_id)
    }

    pub fn find_voice(&self, id: &str) -> Option<&Voice> {
        self.available_voices.iter().find(|v| v.id == id)
    }
}

//! The one place where failed actions are absorbed.

use crate::state::AppState;
use crate::SpeechError;
use serde::Deserialize;
use tracing::{error, warn};

/// What to do with an error that no caller handles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log and drop. The user only notices that the action did not happen.
    #[default]
    Swallow,
    /// Log and record the message in `AppState::last_error` for display.
    Surface,
}

impl ErrorPolicy {
    /// Absorb `err` raised while performing `action`.
    pub fn absorb(&self, state: &mut AppState, action: &str, err: &SpeechError) {
        match err {
            SpeechError::ServiceInit(_) => {
                error!(target: "speech_core", action = %action, error = %err, "Error initializing TTS")
            }
            _ => warn!(target: "speech_core", action = %action, error = %err, "Speech action failed"),
        }
        if *self == ErrorPolicy::Surface {
            state.last_error = Some(format!("{}: {}", action, err));
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "swallow" => Some(ErrorPolicy::Swallow),
            "surface" => Some(ErrorPolicy::Surface),
            _ => None,
        }
    }
}

// Speech Demo Core Library
// UI state and action handlers driving an external text-to-speech service

pub mod controller;
pub mod policy;
pub mod render;
pub mod service;
pub mod slider;
pub mod state;
pub mod voice;

// Export core types
pub use controller::SpeechDemoController;
pub use policy::ErrorPolicy;
pub use render::{render_screen, voice_rows, VoiceRow};
pub use service::SpeechService;
pub use slider::Slider;
pub use state::{AppState, Status};
pub use voice::{available_voices, EngineInfo, Voice, VoiceInfo};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Speech service initialization failed: {0}")]
    ServiceInit(String),

    #[error("Speech service call `{op}` failed: {reason}")]
    ServiceCall { op: &'static str, reason: String },

    #[error("No synthesis engine available")]
    NoEngines,

    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SpeechError {
    /// Shorthand for a failed service operation.
    pub fn call(op: &'static str, reason: impl Into<String>) -> Self {
        SpeechError::ServiceCall {
            op,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpeechError>;

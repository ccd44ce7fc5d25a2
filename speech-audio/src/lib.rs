// Local speech capabilities for the speech demo

// Shared audio utilities
#[cfg(feature = "tts")]
pub(crate) mod utils;

pub mod voices;

pub use voices::{parse_espeak_voices, piper_language, scan_piper_voices};

#[cfg(feature = "tts")]
pub mod tts;

#[cfg(feature = "tts")]
pub use tts::{CliSpeechConfig, CliSpeechService};

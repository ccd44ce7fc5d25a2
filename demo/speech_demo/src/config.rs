use std::fs;
use std::path::{Path, PathBuf};

use speech_audio::CliSpeechConfig;
use speech_core::state::DEFAULT_TEXT;
use speech_core::ErrorPolicy;

/// High-level configuration for the speech demo
#[derive(Clone, Debug)]
pub struct DemoConfig {
    /// Text shown in the text field at startup
    pub initial_text: String,
    pub error_policy: ErrorPolicy,
    pub tts: CliSpeechConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        // Engine detection already considers env vars
        Self {
            initial_text: std::env::var("SPEECH_DEMO_TEXT")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_TEXT.to_string()),
            error_policy: std::env::var("SPEECH_DEMO_ERROR_POLICY")
                .ok()
                .and_then(|s| ErrorPolicy::parse(&s))
                .unwrap_or_default(),
            tts: CliSpeechConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from a TOML file (path via SPEECH_DEMO_CONFIG or ./speech_demo.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let path =
            std::env::var("SPEECH_DEMO_CONFIG").unwrap_or_else(|_| "speech_demo.toml".into());
        Self::load_from(Path::new(&path), Self::default())
    }

    fn load_from(p: &Path, default: Self) -> Self {
        if !p.exists() {
            tracing::info!(target: "speech_demo", path = %p.display(), "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match Self::from_toml_str(&s, default.clone()) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(target: "speech_demo", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "speech_demo", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    pub fn from_toml_str(s: &str, base: Self) -> Result<Self, toml::de::Error> {
        toml::from_str::<DemoToml>(s).map(|t| t.overlay(base))
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct DemoToml {
    pub initial_text: Option<String>,
    pub error_policy: Option<ErrorPolicy>,
    pub tts: Option<TtsToml>,
}

impl DemoToml {
    fn overlay(self, mut base: DemoConfig) -> DemoConfig {
        if let Some(t) = self.initial_text {
            base.initial_text = t;
        }
        if let Some(p) = self.error_policy {
            base.error_policy = p;
        }
        if let Some(t) = self.tts {
            t.apply(&mut base.tts);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct TtsToml {
    pub piper_bin: Option<PathBuf>,
    pub piper_voice_dir: Option<PathBuf>,
    pub espeak_bin: Option<PathBuf>,
    pub player: Option<String>,
    pub timeout_ms: Option<u64>,
    pub temp_dir: Option<PathBuf>,
}
impl TtsToml {
    fn apply(self, t: &mut CliSpeechConfig) {
        if let Some(x) = self.piper_bin {
            t.piper_bin = Some(x);
        }
        if let Some(x) = self.piper_voice_dir {
            t.piper_voice_dir = Some(x);
        }
        if let Some(x) = self.espeak_bin {
            t.espeak_bin = Some(x);
        }
        if let Some(x) = self.player {
            t.player = Some(x).filter(|p| !p.is_empty());
        }
        if let Some(x) = self.timeout_ms {
            t.timeout_ms = x.max(1);
        }
        if let Some(x) = self.temp_dir {
            t.temp_dir = x;
        }
    }
}

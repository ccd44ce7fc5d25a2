//! Recording fake of the speech service shared by the integration tests.

use async_trait::async_trait;
use speech_core::{EngineInfo, Result, SpeechError, SpeechService, VoiceInfo};
use std::collections::HashSet;
use std::sync::Mutex;

/// One call observed by the fake.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Engines,
    SetDefaultEngine(String),
    Voices,
    SetDefaultVoice(String),
    SetDefaultLanguage(String),
    SetDefaultRate(f64),
    Stop,
    Speak(String),
}

#[derive(Default)]
pub struct RecordingService {
    pub engines: Vec<EngineInfo>,
    pub voices: Vec<VoiceInfo>,
    /// Operation names that fail when called
    pub failing: HashSet<&'static str>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingService {
    pub fn with_voices(voices: Vec<VoiceInfo>) -> Self {
        Self {
            engines: vec![EngineInfo::new("espeak-ng")],
            voices,
            ..Default::default()
        }
    }

    pub fn failing(mut self, op: &'static str) -> Self {
        self.failing.insert(op);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, op: &'static str, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.contains(op) {
            return Err(SpeechError::call(op, "rejected by fake"));
        }
        Ok(())
    }
}

#[async_trait]
impl SpeechService for RecordingService {
    async fn engines(&self) -> Result<Vec<EngineInfo>> {
        self.record("engines", Call::Engines)?;
        Ok(self.engines.clone())
    }

    async fn set_default_engine(&self, name: &str) -> Result<()> {
        self.record("set_default_engine", Call::SetDefaultEngine(name.to_string()))
    }

    async fn voices(&self) -> Result<Vec<VoiceInfo>> {
        self.record("voices", Call::Voices)?;
        Ok(self.voices.clone())
    }

    async fn set_default_voice(&self, id: &str) -> Result<()> {
        self.record("set_default_voice", Call::SetDefaultVoice(id.to_string()))
    }

    async fn set_default_language(&self, locale: &str) -> Result<()> {
        self.record(
            "set_default_language",
            Call::SetDefaultLanguage(locale.to_string()),
        )
    }

    async fn set_default_rate(&self, rate: f64) -> Result<()> {
        self.record("set_default_rate", Call::SetDefaultRate(rate))
    }

    async fn stop(&self) -> Result<()> {
        self.record("stop", Call::Stop)
    }

    async fn speak(&self, text: &str) -> Result<()> {
        self.record("speak", Call::Speak(text.to_string()))
    }
}

pub fn voice(id: &str, name: &str, language: &str) -> VoiceInfo {
    VoiceInfo {
        id: id.into(),
        name: name.into(),
        language: language.into(),
        network_connection_required: false,
        not_installed: false,
    }
}

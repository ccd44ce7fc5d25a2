//! Speech Demo Controller
//!
//! Owns the [`AppState`] and is the only thing that mutates it. Each handler
//! forwards the user's intent to the [`SpeechService`] and then reconciles
//! local state with the outcome. Service calls inside a handler are awaited
//! strictly in the order they are written.

use crate::policy::ErrorPolicy;
use crate::service::SpeechService;
use crate::slider::Slider;
use crate::state::{AppState, Status};
use crate::voice::{available_voices, Voice};
use crate::{Result, SpeechError};
use std::sync::Arc;
use tracing::{debug, info};

pub struct SpeechDemoController {
    service: Arc<dyn SpeechService>,
    state: AppState,
    policy: ErrorPolicy,
}

impl SpeechDemoController {
    pub fn new(service: Arc<dyn SpeechService>) -> Self {
        Self::with_state(service, AppState::default(), ErrorPolicy::default())
    }

    pub fn with_state(service: Arc<dyn SpeechService>, state: AppState, policy: ErrorPolicy) -> Self {
        Self {
            service,
            state,
            policy,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Hand an unhandled action error to the error policy.
    pub fn absorb(&mut self, action: &str, err: &SpeechError) {
        self.policy.absorb(&mut self.state, action, err);
    }

    /// Clear a surfaced error once the user has seen it.
    pub fn dismiss_error(&mut self) {
        self.state.last_error = None;
    }

    /// Discover engines and voices once at startup.
    ///
    /// Best effort: any failure is absorbed and the state keeps its prior
    /// values. The status is not moved to `Error`.
    pub async fn initialize(&mut self) {
        if let Err(e) = self.try_initialize().await {
            let err = match e {
                SpeechError::ServiceInit(_) => e,
                other => SpeechError::ServiceInit(other.to_string()),
            };
            self.absorb("initialize", &err);
        }
    }

    async fn try_initialize(&mut self) -> Result<()> {
        let engines = self.service.engines().await?;
        info!(target: "speech_core", engines = ?engines, "Available TTS engines");
        let engine = engines.first().ok_or(SpeechError::NoEngines)?;
        self.service.set_default_engine(&engine.name).await?;

        let voices = self.service.voices().await?;
        info!(target: "speech_core", count = voices.len(), "Available TTS voices");
        let usable = available_voices(&voices);

        // The default comes from the raw list, not the filtered one.
        if let Some(first) = voices.first() {
            self.service.set_default_voice(&first.id).await?;
            self.state.available_voices = usable;
            self.state.selected_voice_id = first.id.clone();
        }
        self.state.status = Status::Initialized;
        Ok(())
    }

    /// Speak the current text with the selected voice and rate.
    ///
    /// Issues stop, set-voice, set-rate, speak in that order and returns as
    /// soon as the utterance is queued.
    pub async fn read_text(&mut self) -> Result<()> {
        self.service.stop().await?;
        self.service
            .set_default_voice(&self.state.selected_voice_id)
            .await?;
        self.service.set_default_rate(self.state.speech_rate).await?;
        debug!(target: "speech_core", chars = self.state.text.len(), "Speaking text");
        self.service.speak(&self.state.text).await
    }

    /// Apply a rate slider value. Local state only changes once the service
    /// accepted it.
    pub async fn update_speech_rate(&mut self, rate: f64) -> Result<()> {
        let rate = snap_logged(Slider::RATE, "rate", rate);
        self.service.set_default_rate(rate).await?;
        self.state.speech_rate = rate;
        Ok(())
    }

    /// Apply a pitch slider value. Pitch is tracked for display only and is
    /// never sent to the service.
    pub fn update_speech_pitch(&mut self, pitch: f64) {
        self.state.speech_pitch = snap_logged(Slider::PITCH, "pitch", pitch);
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.state.text = text.into();
    }

    /// Select `voice` as the default voice.
    ///
    /// Switching the language is best effort; switching the voice is not.
    pub async fn on_voice_press(&mut self, voice: &Voice) -> Result<()> {
        if let Err(e) = self.service.set_default_language(&voice.language).await {
            self.absorb("set_default_language", &e);
        }
        self.service.set_default_voice(&voice.id).await?;
        self.state.selected_voice_id = voice.id.clone();
        Ok(())
    }
}

fn snap_logged(slider: Slider, what: &'static str, value: f64) -> f64 {
    let snapped = slider.snap(value);
    if !slider.accepts(value) {
        debug!(target: "speech_core", slider = what, value, snapped, "Snapped off-grid slider value");
    }
    snapped
}

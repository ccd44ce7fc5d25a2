//! Seam to the external text-to-speech service.
//!
//! Every operation is an independent async call. Callers sequence dependent
//! calls with `.await`; the service makes no ordering promise across callers.

use crate::voice::{EngineInfo, VoiceInfo};
use crate::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// List synthesis engines. Fails when the host has no synthesis capability.
    async fn engines(&self) -> Result<Vec<EngineInfo>>;

    async fn set_default_engine(&self, name: &str) -> Result<()>;

    /// List voices of the default engine, unfiltered.
    async fn voices(&self) -> Result<Vec<VoiceInfo>>;

    /// Set the voice used by later `speak` calls. An empty id clears it.
    async fn set_default_voice(&self, id: &str) -> Result<()>;

    async fn set_default_language(&self, locale: &str) -> Result<()>;

    async fn set_default_rate(&self, rate: f64) -> Result<()>;

    /// Halt any in-progress utterance.
    async fn stop(&self) -> Result<()>;

    /// Queue text for synthesis and playback. Returns once queued.
    async fn speak(&self, text: &str) -> Result<()>;
}

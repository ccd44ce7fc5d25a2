//! Speech service backed by local CLI engines
//!
//! Implements [`SpeechService`] on top of command-line synthesizers:
//! - Piper (higher quality, voices are `*.onnx` models in a directory)
//! - espeak-ng (widely available, voices listed by `espeak-ng --voices`)
//! - If neither is present, `engines()` fails and `speak` only logs the text
//!
//! Synthesized WAV files are played with the first available player
//! (aplay, paplay, ffplay) unless one is configured.
//!
//! Env overrides:
//! - PIPER_BIN, PIPER_VOICE_DIR
//! - ESPEAK_BIN
//! - TTS_PLAYER, TTS_TIMEOUT_MS, TTS_TEMP_DIR
//!
//! Emits tracing events on the `tts` target: start, done, error.

use crate::utils::{get_from_env_or_path, get_from_path, now_ms};
use crate::voices::{parse_espeak_voices, scan_piper_voices};
use async_trait::async_trait;
use speech_core::{EngineInfo, Result, SpeechError, SpeechService, VoiceInfo};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::{self, JoinHandle};
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

#[derive(Clone, Debug)]
pub struct CliSpeechConfig {
    pub temp_dir: PathBuf,
    /// Upper bound for synthesis plus playback of one utterance
    pub timeout_ms: u64,
    pub piper_bin: Option<PathBuf>,
    pub piper_voice_dir: Option<PathBuf>,
    pub espeak_bin: Option<PathBuf>,
    /// Preferred player binary name (aplay|paplay|ffplay)
    pub player: Option<String>,
}

impl Default for CliSpeechConfig {
    fn default() -> Self {
        let temp_dir = std::env::var("TTS_TEMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());
        let timeout_ms = std::env::var("TTS_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(20_000);

        let piper_bin = get_from_env_or_path("PIPER_BIN", "piper");
        let piper_voice_dir = std::env::var("PIPER_VOICE_DIR").ok().map(PathBuf::from);
        let espeak_bin =
            get_from_env_or_path("ESPEAK_BIN", "espeak-ng").or_else(|| get_from_path("espeak"));
        let player = std::env::var("TTS_PLAYER").ok().filter(|s| !s.is_empty());

        Self {
            temp_dir,
            timeout_ms,
            piper_bin,
            piper_voice_dir,
            espeak_bin,
            player,
        }
    }
}

impl CliSpeechConfig {
    /// Config with nothing detected, for callers that fill fields explicitly.
    pub fn empty() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            timeout_ms: 20_000,
            piper_bin: None,
            piper_voice_dir: None,
            espeak_bin: None,
            player: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Engine {
    Piper,
    Espeak,
}

impl Engine {
    fn name(&self) -> &'static str {
        match self {
            Engine::Piper => "piper",
            Engine::Espeak => "espeak-ng",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Engine::Piper => "Piper neural TTS",
            Engine::Espeak => "eSpeak NG",
        }
    }

    fn from_name(name: &str) -> Option<Engine> {
        match name {
            "piper" => Some(Engine::Piper),
            "espeak-ng" | "espeak" => Some(Engine::Espeak),
            _ => None,
        }
    }
}

/// Service-side defaults used by later `speak` calls.
#[derive(Clone, Debug)]
struct Defaults {
    engine: Option<Engine>,
    voice: String,
    language: String,
    rate: f64,
}

/// Everything one queued utterance needs, captured at `speak` time.
#[derive(Clone, Debug)]
struct Utterance {
    engine: Option<Engine>,
    voice: String,
    language: String,
    rate: f64,
    text: String,
}

pub struct CliSpeechService {
    cfg: CliSpeechConfig,
    /// Engines detected at construction, in preference order
    engines: Vec<Engine>,
    defaults: Mutex<Defaults>,
    inflight: Mutex<Vec<JoinHandle<()>>>,
    /// Serializes playback so queued utterances play in order
    playback: Arc<Mutex<()>>,
}

impl CliSpeechService {
    pub fn new(cfg: Option<CliSpeechConfig>) -> Self {
        let cfg = cfg.unwrap_or_default();
        // Log detected engines once
        if let Some(ref p) = cfg.piper_bin {
            info!(target: "tts", bin = ?p, voice_dir = ?cfg.piper_voice_dir, "Detected Piper binary");
        }
        if let Some(ref e) = cfg.espeak_bin {
            info!(target: "tts", bin = ?e, "Detected espeak-ng binary");
        }
        let engines = detected_engines(&cfg);
        Self {
            defaults: Mutex::new(Defaults {
                engine: engines.first().copied(),
                voice: String::new(),
                language: String::new(),
                rate: 1.0,
            }),
            inflight: Mutex::new(Vec::new()),
            playback: Arc::new(Mutex::new(())),
            cfg,
            engines,
        }
    }

    /// Number of utterances queued or playing.
    pub async fn pending(&self) -> usize {
        let mut inflight = self.inflight.lock().await;
        inflight.retain(|h| !h.is_finished());
        inflight.len()
    }

    async fn default_engine(&self) -> Result<Engine> {
        self.defaults.lock().await.engine.ok_or(SpeechError::NoEngines)
    }
}

/// Piper is listed first, but only when its voice directory holds at least
/// one loadable model.
fn detected_engines(cfg: &CliSpeechConfig) -> Vec<Engine> {
    let mut engines = Vec::new();
    if let (Some(_), Some(dir)) = (&cfg.piper_bin, &cfg.piper_voice_dir) {
        match scan_piper_voices(dir) {
            Ok(voices) if voices.iter().any(|v| v.is_usable()) => engines.push(Engine::Piper),
            Ok(_) => warn!(target: "tts", dir = ?dir, "No loadable Piper voices; skipping Piper"),
            Err(e) => warn!(target: "tts", dir = ?dir, error = %e, "Cannot read Piper voice dir"),
        }
    }
    if cfg.espeak_bin.is_some() {
        engines.push(Engine::Espeak);
    }
    engines
}

#[async_trait]
impl SpeechService for CliSpeechService {
    async fn engines(&self) -> Result<Vec<EngineInfo>> {
        if self.engines.is_empty() {
            return Err(SpeechError::NoEngines);
        }
        Ok(self
            .engines
            .iter()
            .map(|e| EngineInfo {
                name: e.name().to_string(),
                label: Some(e.label().to_string()),
            })
            .collect())
    }

    async fn set_default_engine(&self, name: &str) -> Result<()> {
        let engine = Engine::from_name(name)
            .filter(|e| self.engines.contains(e))
            .ok_or_else(|| SpeechError::UnknownEngine(name.to_string()))?;
        let mut defaults = self.defaults.lock().await;
        if defaults.engine != Some(engine) {
            // Voice ids are engine specific
            defaults.voice.clear();
        }
        defaults.engine = Some(engine);
        debug!(target: "tts", engine = engine.name(), "Default engine set");
        Ok(())
    }

    async fn voices(&self) -> Result<Vec<VoiceInfo>> {
        match self.default_engine().await? {
            Engine::Espeak => {
                let bin = self.cfg.espeak_bin.clone().ok_or(SpeechError::NoEngines)?;
                let output = Command::new(&bin)
                    .arg("--voices")
                    .stdin(Stdio::null())
                    .output()
                    .await?;
                if !output.status.success() {
                    return Err(SpeechError::call(
                        "voices",
                        format!(
                            "espeak-ng --voices failed: {}",
                            String::from_utf8_lossy(&output.stderr)
                        ),
                    ));
                }
                Ok(parse_espeak_voices(&String::from_utf8_lossy(&output.stdout)))
            }
            Engine::Piper => {
                let dir = self.cfg.piper_voice_dir.clone().ok_or_else(|| {
                    SpeechError::call("voices", "PIPER_VOICE_DIR is not set")
                })?;
                task::spawn_blocking(move || scan_piper_voices(&dir))
                    .await
                    .map_err(|e| SpeechError::call("voices", e.to_string()))?
                    .map_err(SpeechError::IoError)
            }
        }
    }

    async fn set_default_voice(&self, id: &str) -> Result<()> {
        self.defaults.lock().await.voice = id.to_string();
        Ok(())
    }

    async fn set_default_language(&self, locale: &str) -> Result<()> {
        self.defaults.lock().await.language = locale.to_string();
        Ok(())
    }

    async fn set_default_rate(&self, rate: f64) -> Result<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(SpeechError::InvalidValue(format!("rate {}", rate)));
        }
        self.defaults.lock().await.rate = rate;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut inflight = self.inflight.lock().await;
        let n = inflight.iter().filter(|h| !h.is_finished()).count();
        for handle in inflight.drain(..) {
            // Child processes are spawned with kill_on_drop
            handle.abort();
        }
        if n > 0 {
            info!(target: "tts", stopped = n, "Stopped in-progress speech");
        }
        Ok(())
    }

    async fn speak(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let utterance = {
            let d = self.defaults.lock().await;
            Utterance {
                engine: d.engine,
                voice: d.voice.clone(),
                language: d.language.clone(),
                rate: d.rate,
                text: text.to_string(),
            }
        };

        let cfg = self.cfg.clone();
        let playback = Arc::clone(&self.playback);
        let handle = tokio::spawn(async move {
            let _turn = playback.lock().await;
            let engine = utterance.engine.map(|e| e.name()).unwrap_or("none");
            info!(
                target: "tts",
                engine,
                voice = %utterance.voice,
                rate = utterance.rate,
                "tts.start"
            );
            match timeout(
                Duration::from_millis(cfg.timeout_ms),
                run_utterance(&cfg, &utterance),
            )
            .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(target: "tts", engine, error = %e, "tts.error"),
                Err(_) => {
                    error!(target: "tts", engine, timeout_ms = cfg.timeout_ms, "tts.error: timed out")
                }
            }
        });

        let mut inflight = self.inflight.lock().await;
        inflight.retain(|h| !h.is_finished());
        inflight.push(handle);
        Ok(())
    }
}

async fn run_utterance(cfg: &CliSpeechConfig, u: &Utterance) -> Result<()> {
    let Some(engine) = u.engine else {
        warn!(target: "tts", text = %u.text, "No TTS engine detected. Printing only.");
        return Ok(());
    };

    let t0 = now_ms();
    // Removed on drop, so stop, timeout and failed synthesis clean up too
    let wav: TempPath = tempfile::Builder::new()
        .prefix("tts_")
        .suffix(".wav")
        .tempfile_in(&cfg.temp_dir)?
        .into_temp_path();
    let wav_path: &Path = &wav;
    match engine {
        Engine::Piper => synth_with_piper(cfg, u, wav_path).await?,
        Engine::Espeak => synth_with_espeak(cfg, u, wav_path).await?,
    }
    let synthesis_ms = now_ms() - t0;

    let play_start = now_ms();
    match select_player(cfg.player.as_deref()) {
        Some(bin) => {
            play_wav_with(&bin, wav_path).await?;
            if let Err(e) = wav.close() {
                warn!(target: "tts", error = %e, "Failed to remove WAV");
            }
        }
        None => match wav.keep() {
            Ok(path) => {
                info!(target: "tts", path = ?path, "No audio player found; kept WAV on disk")
            }
            Err(e) => warn!(target: "tts", error = %e, "Failed to keep WAV"),
        },
    }
    let playback_ms = now_ms() - play_start;

    info!(
        target: "tts",
        engine = engine.name(),
        synthesis_ms,
        playback_ms,
        total_ms = now_ms() - t0,
        "tts.done"
    );
    Ok(())
}

fn resolve_piper_voice_path(cfg: &CliSpeechConfig, voice: &str) -> Option<PathBuf> {
    if voice.is_empty() {
        return None;
    }
    let direct = PathBuf::from(voice);
    if direct.extension().and_then(|e| e.to_str()) == Some("onnx") && direct.exists() {
        return Some(direct);
    }
    let candidate = cfg.piper_voice_dir.as_ref()?.join(format!("{}.onnx", voice));
    candidate.exists().then_some(candidate)
}

/// Piper reads text on stdin; speed is controlled by `--length_scale`.
async fn synth_with_piper(cfg: &CliSpeechConfig, u: &Utterance, out_wav: &Path) -> Result<()> {
    let piper = cfg
        .piper_bin
        .as_ref()
        .ok_or_else(|| SpeechError::call("speak", "Piper binary not found"))?;
    let model = resolve_piper_voice_path(cfg, &u.voice).ok_or_else(|| {
        SpeechError::call("speak", format!("Piper voice not found: {:?}", u.voice))
    })?;

    let length_scale = (1.0 / u.rate).clamp(0.5, 2.0);
    let mut cmd = Command::new(piper);
    cmd.arg("-m")
        .arg(&model)
        .arg("-f")
        .arg(out_wav)
        .arg("--length_scale")
        .arg(format!("{:.2}", length_scale))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(target: "tts", command = ?cmd, "Running piper");
    let mut child = cmd.spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(u.text.as_bytes()).await?;
    }
    let output = child.wait_with_output().await?;
    if !output.status.success() {
        return Err(SpeechError::call(
            "speak",
            format!("Piper failed: {}", String::from_utf8_lossy(&output.stderr)),
        ));
    }
    Ok(())
}

/// espeak-ng takes the voice with `-v`; the language stands in when no voice
/// is selected.
async fn synth_with_espeak(cfg: &CliSpeechConfig, u: &Utterance, out_wav: &Path) -> Result<()> {
    let espeak = cfg
        .espeak_bin
        .as_ref()
        .ok_or_else(|| SpeechError::call("speak", "espeak-ng not found"))?;
    let mut cmd = Command::new(espeak);
    let wpm = (160.0 * u.rate).round().clamp(80.0, 450.0) as i32;
    if !u.voice.is_empty() {
        cmd.arg("-v").arg(&u.voice);
    } else if !u.language.is_empty() {
        cmd.arg("-v").arg(&u.language);
    }
    cmd.arg("-s")
        .arg(wpm.to_string())
        .arg("-w")
        .arg(out_wav)
        .arg("--")
        .arg(&u.text)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    debug!(target: "tts", command = ?cmd, "Running espeak-ng");
    let output = cmd.output().await?;
    if !output.status.success() {
        return Err(SpeechError::call(
            "speak",
            format!(
                "espeak-ng failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ),
        ));
    }
    Ok(())
}

async fn play_wav_with(player_bin: &Path, wav_path: &Path) -> Result<()> {
    let name = player_bin
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let mut cmd = Command::new(player_bin);
    if name == "ffplay" {
        cmd.arg("-autoexit").arg("-nodisp").arg("-loglevel").arg("quiet");
    }
    cmd.arg(wav_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .kill_on_drop(true);
    let status = cmd.status().await?;
    if !status.success() {
        return Err(SpeechError::call(
            "speak",
            format!("{} exited with {}", name, status),
        ));
    }
    Ok(())
}

fn select_player(pref: Option<&str>) -> Option<PathBuf> {
    if let Some(bin) = pref.and_then(get_from_path) {
        return Some(bin);
    }
    get_from_path("aplay")
        .or_else(|| get_from_path("paplay"))
        .or_else(|| get_from_path("ffplay"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_names_round_trip() {
        for e in [Engine::Piper, Engine::Espeak] {
            assert_eq!(Engine::from_name(e.name()), Some(e));
        }
        assert_eq!(Engine::from_name("espeak"), Some(Engine::Espeak));
        assert_eq!(Engine::from_name("festival"), None);
    }

    #[test]
    fn test_piper_listed_only_with_loadable_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = CliSpeechConfig::empty();
        cfg.piper_bin = Some(PathBuf::from("/usr/bin/piper"));
        cfg.espeak_bin = Some(PathBuf::from("/usr/bin/espeak-ng"));
        assert_eq!(detected_engines(&cfg), vec![Engine::Espeak]);

        // Directory present but empty
        cfg.piper_voice_dir = Some(dir.path().to_path_buf());
        assert_eq!(detected_engines(&cfg), vec![Engine::Espeak]);

        // Model without its config is not loadable
        std::fs::write(dir.path().join("en_US-amy-low.onnx"), b"model").unwrap();
        assert_eq!(detected_engines(&cfg), vec![Engine::Espeak]);

        std::fs::write(dir.path().join("en_US-amy-low.onnx.json"), b"{}").unwrap();
        assert_eq!(detected_engines(&cfg), vec![Engine::Piper, Engine::Espeak]);

        // Unreadable directory falls back as well
        cfg.piper_voice_dir = Some(dir.path().join("missing"));
        assert_eq!(detected_engines(&cfg), vec![Engine::Espeak]);
    }

    #[test]
    fn test_piper_voice_requires_model_file() {
        let cfg = CliSpeechConfig {
            piper_voice_dir: Some(std::env::temp_dir()),
            ..CliSpeechConfig::empty()
        };
        assert!(resolve_piper_voice_path(&cfg, "").is_none());
        assert!(resolve_piper_voice_path(&cfg, "no_such-voice-xyz").is_none());
    }
}

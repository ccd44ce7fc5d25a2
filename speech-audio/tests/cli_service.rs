//! CliSpeechService behaviour that does not depend on installed engines
//!
//! Engines are never picked up from the environment here: every test builds
//! its config explicitly. Engines and players are stood in for by small shell
//! scripts where a real process is needed.

#![cfg(feature = "tts")]

use speech_audio::{CliSpeechConfig, CliSpeechService};
use speech_core::{SpeechError, SpeechService};
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use tokio::time::{sleep, Duration};

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join(name);
    std::fs::write(&script, format!("#!/bin/sh\n{}", body)).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// espeak-ng stand-in: writes a stub WAV to the `-w` path, then exits with
/// `status`.
#[cfg(unix)]
fn fake_espeak(dir: &Path, status: i32) -> PathBuf {
    write_script(
        dir,
        "fake-espeak-ng",
        &format!(
            "while [ $# -gt 0 ]; do\n\
             if [ \"$1\" = \"-w\" ]; then shift; printf 'RIFF' > \"$1\"; fi\n\
             shift\n\
             done\n\
             exit {}\n",
            status
        ),
    )
}

fn wav_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("wav"))
        .count()
}

#[tokio::test]
async fn test_no_engines_detected() {
    let svc = CliSpeechService::new(Some(CliSpeechConfig::empty()));

    assert!(matches!(svc.engines().await, Err(SpeechError::NoEngines)));
    assert!(matches!(svc.voices().await, Err(SpeechError::NoEngines)));
    assert!(matches!(
        svc.set_default_engine("espeak-ng").await,
        Err(SpeechError::UnknownEngine(_))
    ));
}

#[tokio::test]
async fn test_speak_without_engine_only_logs() {
    let svc = CliSpeechService::new(Some(CliSpeechConfig::empty()));

    svc.speak("hello there").await.unwrap();
    svc.stop().await.unwrap();
    assert_eq!(svc.pending().await, 0);
}

#[tokio::test]
async fn test_blank_text_is_not_queued() {
    let svc = CliSpeechService::new(Some(CliSpeechConfig::empty()));

    svc.speak("   ").await.unwrap();
    assert_eq!(svc.pending().await, 0);
}

#[tokio::test]
async fn test_rate_validation() {
    let svc = CliSpeechService::new(Some(CliSpeechConfig::empty()));

    svc.set_default_rate(1.5).await.unwrap();
    assert!(matches!(
        svc.set_default_rate(f64::NAN).await,
        Err(SpeechError::InvalidValue(_))
    ));
    assert!(svc.set_default_rate(0.0).await.is_err());
}

#[tokio::test]
async fn test_piper_engine_lists_directory_voices() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("en_US-amy-low.onnx"), b"model").unwrap();
    std::fs::write(dir.path().join("en_US-amy-low.onnx.json"), b"{}").unwrap();

    let cfg = CliSpeechConfig {
        piper_bin: Some(PathBuf::from("/nonexistent/piper")),
        piper_voice_dir: Some(dir.path().to_path_buf()),
        ..CliSpeechConfig::empty()
    };
    let svc = CliSpeechService::new(Some(cfg));

    let engines = svc.engines().await.unwrap();
    assert_eq!(engines.len(), 1);
    assert_eq!(engines[0].name, "piper");
    svc.set_default_engine("piper").await.unwrap();

    let voices = svc.voices().await.unwrap();
    assert_eq!(voices.len(), 1);
    assert_eq!(voices[0].id, "en_US-amy-low");
    assert_eq!(voices[0].language, "en-US");
}

#[tokio::test]
async fn test_piper_without_loadable_models_defers_to_espeak() {
    let voices = tempdir().unwrap();
    std::fs::write(voices.path().join("en_US-amy-low.onnx"), b"model").unwrap();

    let cfg = CliSpeechConfig {
        piper_bin: Some(PathBuf::from("/nonexistent/piper")),
        piper_voice_dir: Some(voices.path().to_path_buf()),
        espeak_bin: Some(PathBuf::from("/nonexistent/espeak-ng")),
        ..CliSpeechConfig::empty()
    };
    let svc = CliSpeechService::new(Some(cfg));

    let names: Vec<String> = svc.engines().await.unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["espeak-ng".to_string()]);
    assert!(matches!(
        svc.set_default_engine("piper").await,
        Err(SpeechError::UnknownEngine(_))
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_espeak_voices_from_cli_output() {
    let dir = tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "fake-espeak-ng",
        "echo 'Pty Language       Age/Gender VoiceName          File                 Other Languages'\n\
         echo ' 5  en-us           --/M      English_(America)  gmw/en-US            (en 3)'\n\
         echo ' 5  es              --/M      Spanish_(Spain)    roa/es'\n",
    );

    let cfg = CliSpeechConfig {
        espeak_bin: Some(script),
        ..CliSpeechConfig::empty()
    };
    let svc = CliSpeechService::new(Some(cfg));

    let engines = svc.engines().await.unwrap();
    assert_eq!(engines[0].name, "espeak-ng");
    svc.set_default_engine(&engines[0].name).await.unwrap();

    let voices = svc.voices().await.unwrap();
    let ids: Vec<&str> = voices.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["gmw/en-US", "roa/es"]);
    assert_eq!(voices[1].name, "Spanish (Spain)");
}

#[cfg(unix)]
#[tokio::test]
async fn test_temporary_wavs_removed_on_stop_timeout_and_failure() {
    let bin = tempdir().unwrap();
    let wavs = tempdir().unwrap();
    let player = write_script(bin.path(), "slow-player", "exec sleep 5\n");

    let cfg = CliSpeechConfig {
        espeak_bin: Some(fake_espeak(bin.path(), 0)),
        player: Some(player.to_string_lossy().into_owned()),
        temp_dir: wavs.path().to_path_buf(),
        ..CliSpeechConfig::empty()
    };

    // Interrupted while the player is still running
    let svc = CliSpeechService::new(Some(cfg.clone()));
    for _ in 0..3 {
        svc.speak("interrupt me").await.unwrap();
        sleep(Duration::from_millis(500)).await;
        assert_eq!(wav_files(wavs.path()), 1, "WAV exists during playback");
        svc.stop().await.unwrap();
        sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(wav_files(wavs.path()), 0, "WAVs left after stop");

    // Dropped by the utterance timeout
    let svc = CliSpeechService::new(Some(CliSpeechConfig {
        timeout_ms: 300,
        ..cfg.clone()
    }));
    svc.speak("too slow").await.unwrap();
    sleep(Duration::from_millis(800)).await;
    assert_eq!(svc.pending().await, 0);
    assert_eq!(wav_files(wavs.path()), 0, "WAVs left after timeout");

    // Synthesis fails after writing part of the file
    let svc = CliSpeechService::new(Some(CliSpeechConfig {
        espeak_bin: Some(fake_espeak(bin.path(), 1)),
        ..cfg
    }));
    svc.speak("broken engine").await.unwrap();
    sleep(Duration::from_millis(400)).await;
    assert_eq!(svc.pending().await, 0);
    assert_eq!(wav_files(wavs.path()), 0, "WAVs left after failed synthesis");
}

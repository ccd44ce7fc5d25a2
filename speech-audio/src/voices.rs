//! Voice discovery for the local engines.
//!
//! - espeak-ng: parses the table printed by `espeak-ng --voices`
//! - Piper: scans a directory of `*.onnx` voice models

use speech_core::VoiceInfo;
use std::path::Path;

/// Parse `espeak-ng --voices` output.
///
/// Columns: `Pty Language Age/Gender VoiceName File Other Languages`. The
/// voice file doubles as the id since it is what `-v` accepts. Lines that do
/// not have the five leading columns are skipped.
pub fn parse_espeak_voices(output: &str) -> Vec<VoiceInfo> {
    output
        .lines()
        .filter(|line| !line.trim_start().starts_with("Pty"))
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 5 || cols[0].parse::<i32>().is_err() {
                return None;
            }
            Some(VoiceInfo {
                id: cols[4].to_string(),
                name: cols[3].replace('_', " "),
                language: cols[1].to_string(),
                network_connection_required: false,
                not_installed: false,
            })
        })
        .collect()
}

/// Locale of a Piper model name: `en_US-lessac-medium` -> `en-US`.
pub fn piper_language(model_stem: &str) -> String {
    model_stem
        .split('-')
        .next()
        .unwrap_or_default()
        .replace('_', "-")
}

/// List Piper voice models in `dir`, sorted by id.
///
/// A model without its `<model>.onnx.json` companion cannot be loaded and is
/// reported as not installed.
pub fn scan_piper_voices(dir: &Path) -> std::io::Result<Vec<VoiceInfo>> {
    let mut voices = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("onnx") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let config = dir.join(format!("{}.onnx.json", stem));
        voices.push(VoiceInfo {
            id: stem.to_string(),
            name: stem.to_string(),
            language: piper_language(stem),
            network_connection_required: false,
            not_installed: !config.exists(),
        });
    }
    voices.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(voices)
}

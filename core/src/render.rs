//! Pure rendering of the screen from [`AppState`].

use crate::state::AppState;
use std::fmt::Write;

pub const SELECTED_BACKGROUND: &str = "#DDA0DD";
pub const UNSELECTED_BACKGROUND: &str = "#5F9EA0";

/// One entry of the voice list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceRow {
    /// List key, the voice id
    pub key: String,
    pub label: String,
    pub selected: bool,
    pub background: &'static str,
}

/// Rows for every available voice, in discovery order.
pub fn voice_rows(state: &AppState) -> Vec<VoiceRow> {
    state
        .available_voices
        .iter()
        .map(|v| {
            let selected = v.id == state.selected_voice_id;
            let name = if v.name.is_empty() { &v.id } else { &v.name };
            VoiceRow {
                key: v.id.clone(),
                label: format!("{} - {}", v.language, name),
                selected,
                background: if selected {
                    SELECTED_BACKGROUND
                } else {
                    UNSELECTED_BACKGROUND
                },
            }
        })
        .collect()
}

/// Render the whole screen as plain text.
pub fn render_screen(state: &AppState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Text to Speech Demo ({})", state.status.as_str());
    let _ = writeln!(out, "[Read Text]");
    let _ = writeln!(out, "> {}", state.text);
    let _ = writeln!(out, "Speech Rate: {:.2}", state.speech_rate);
    let _ = writeln!(out, "Speech Pitch: {:.2}", state.speech_pitch);
    match state.selected_voice() {
        Some(v) => {
            let name = if v.name.is_empty() { &v.id } else { &v.name };
            let _ = writeln!(out, "Voice: {} - {}", v.language, name);
        }
        None => {
            let _ = writeln!(out, "Voice: (engine default)");
        }
    }
    let rows = voice_rows(state);
    if rows.is_empty() {
        let _ = writeln!(out, "(no voices)");
    }
    for (i, row) in rows.iter().enumerate() {
        let marker = if row.selected { '*' } else { ' ' };
        let _ = writeln!(out, "{} {:>3}. {}", marker, i + 1, row.label);
    }
    if let Some(err) = &state.last_error {
        let _ = writeln!(out, "! {}", err);
    }
    out
}

//! Voice and engine records exchanged with the speech service.

use serde::{Deserialize, Serialize};

/// Synthesis engine as reported by the speech service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineInfo {
    pub name: String,
    /// Human readable label, if the engine has one
    #[serde(default)]
    pub label: Option<String>,
}

impl EngineInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
        }
    }
}

/// Raw voice record returned by discovery, before filtering.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    pub language: String,
    #[serde(default)]
    pub network_connection_required: bool,
    #[serde(default)]
    pub not_installed: bool,
}

impl VoiceInfo {
    /// A voice is usable when it is installed locally and needs no network.
    pub fn is_usable(&self) -> bool {
        !self.network_connection_required && !self.not_installed
    }
}

/// Voice shown in the selectable list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub language: String,
}

impl Voice {
    pub fn new(id: impl Into<String>, name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
        }
    }
}

impl From<&VoiceInfo> for Voice {
    fn from(v: &VoiceInfo) -> Self {
        Self {
            id: v.id.clone(),
            name: v.name.clone(),
            language: v.language.clone(),
        }
    }
}

/// Keep only usable voices, preserving discovery order.
pub fn available_voices(raw: &[VoiceInfo]) -> Vec<Voice> {
    raw.iter().filter(|v| v.is_usable()).map(Voice::from).collect()
}

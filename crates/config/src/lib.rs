use std::env;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ── Agent identity ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "Voxsh".to_string(),
        }
    }
}

// ── Speech input ─────────────────────────────────────────────────────────────

/// Settings handed to the speech-capture collaborator.  The pipeline itself
/// only ever sees the transcribed utterance string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Whisper model size: `tiny`, `base`, `small`, `medium`, `large`.
    pub model: String,
    /// Language hint passed to the recognizer.
    pub language: String,
    /// Recording window in seconds per utterance.
    pub record_secs: u64,
    pub sample_rate: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            model: "base".to_string(),
            language: "zh".to_string(),
            record_secs: 5,
            sample_rate: 16_000,
        }
    }
}

// ── Spoken feedback ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub voice: String,
    pub language: String,
    /// Words per minute for the fallback TTS engine.
    pub rate: u32,
    /// Playback volume in `0.0..=1.0`.
    pub volume: f32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            voice: "zh-cn-female-1".to_string(),
            language: "zh".to_string(),
            rate: 150,
            volume: 0.9,
        }
    }
}

// ── Execution engine ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// Hard bound on a single command's runtime.  Exceeding it yields a
    /// failure result, not a detached process.
    pub command_timeout_secs: u64,
    /// Captured stdout/stderr are truncated at this many bytes.
    pub max_output_bytes: usize,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 30,
            max_output_bytes: 5_000,
        }
    }
}

// ── Intent matching ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    /// Enable the keyword heuristic tier consulted when no catalogue
    /// template matches.
    pub enable_heuristic: bool,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            enable_heuristic: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub speech: SpeechConfig,
    pub feedback: FeedbackConfig,
    pub exec: ExecConfig,
    pub intent: IntentConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }

        // Speech model env override (takes precedence over config file).
        if let Ok(model) = env::var("VOXSH_SPEECH_MODEL") {
            if !model.is_empty() {
                config.speech.model = model;
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

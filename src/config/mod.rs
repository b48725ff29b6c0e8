//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::{ArgAction, Parser};
use std::path::PathBuf;

pub use defaults::{
    DEFAULT_MAX_DURATION_MS, DEFAULT_MIN_UTTERANCE_BYTES, DEFAULT_SILENCE_DURATION_MS,
    DEFAULT_SILENCE_THRESHOLD, DEFAULT_TICK_MS,
};

/// CLI options for the voicedesk listener and guardrail checker.
#[derive(Debug, Parser, Clone)]
#[command(about = "Voice-activated support desk listener", author, version)]
pub struct AppConfig {
    /// Preferred audio input device name
    #[arg(long, env = "VOICEDESK_INPUT_DEVICE")]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Classify a customer message and print the verdict as JSON
    #[arg(long = "check-user", value_name = "TEXT", conflicts_with = "check_reply")]
    pub check_user: Option<String>,

    /// Classify a candidate assistant reply and print the verdict as JSON
    #[arg(long = "check-reply", value_name = "TEXT")]
    pub check_reply: Option<String>,

    /// Extra phrase that hands the call to a human (repeatable)
    #[arg(long = "escalation-phrase", action = ArgAction::Append, value_name = "PHRASE")]
    pub escalation_phrases: Vec<String>,

    /// Extra case-insensitive regex for sensitive customer topics (repeatable)
    #[arg(long = "sensitive-pattern", action = ArgAction::Append, value_name = "REGEX")]
    pub sensitive_patterns: Vec<String>,

    /// RMS level (0..1) above which a block counts as speech
    #[arg(long = "silence-threshold", default_value_t = DEFAULT_SILENCE_THRESHOLD)]
    pub silence_threshold: f32,

    /// Continuous silence that ends an utterance (milliseconds)
    #[arg(long = "silence-duration-ms", default_value_t = DEFAULT_SILENCE_DURATION_MS)]
    pub silence_duration_ms: u64,

    /// Hard cap on a single utterance (milliseconds)
    #[arg(long = "max-duration-ms", default_value_t = DEFAULT_MAX_DURATION_MS)]
    pub max_duration_ms: u64,

    /// Utterances whose encoded size is at or below this are discarded (bytes)
    #[arg(long = "min-utterance-bytes", default_value_t = DEFAULT_MIN_UTTERANCE_BYTES)]
    pub min_utterance_bytes: usize,

    /// Analysis tick interval (milliseconds)
    #[arg(long = "tick-ms", default_value_t = DEFAULT_TICK_MS)]
    pub tick_ms: u64,

    /// Stop listening after this many seconds instead of waiting for Enter
    #[arg(long = "listen-secs")]
    pub listen_secs: Option<u64>,

    /// Directory where finished utterances are written as WAV files
    #[arg(long = "save-dir")]
    pub save_dir: Option<PathBuf>,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "VOICEDESK_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "VOICEDESK_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging checked message text (debug log only)
    #[arg(
        long = "log-content",
        env = "VOICEDESK_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}

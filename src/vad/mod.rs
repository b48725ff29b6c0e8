//! Voice activity detection: turns a continuous microphone stream into
//! discrete utterances without push-to-talk.
//!
//! [`VadRecorder`] is the state machine (idle → recording → idle) driven one
//! analysis tick at a time; [`spawn_listener`] runs it on a dedicated thread
//! at roughly display rate and is the single place a session is cancelled.

mod listener;
mod recorder;

pub use listener::{spawn_listener, ListenerHandle};
pub use recorder::VadRecorder;

use crate::config::AppConfig;
use std::fmt;
use std::time::Duration;

/// Thresholds and timers for one listening session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VadSettings {
    /// RMS level on a [0,1] scale at or below which a block counts as silence.
    pub silence_threshold: f32,
    /// Continuous silence that ends an utterance.
    pub silence_duration: Duration,
    /// Hard cap on one utterance, checked before silence.
    pub max_duration: Duration,
    /// Payloads of this size or smaller are dropped instead of delivered.
    pub min_payload_bytes: usize,
    /// Spacing between analysis ticks when driven by the listener thread.
    pub tick_interval: Duration,
}

impl Default for VadSettings {
    fn default() -> Self {
        Self {
            silence_threshold: 0.015,
            silence_duration: Duration::from_millis(1_500),
            max_duration: Duration::from_millis(15_000),
            min_payload_bytes: 1_000,
            tick_interval: Duration::from_millis(16),
        }
    }
}

impl From<&AppConfig> for VadSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            silence_threshold: cfg.silence_threshold,
            silence_duration: Duration::from_millis(cfg.silence_duration_ms),
            max_duration: Duration::from_millis(cfg.max_duration_ms),
            min_payload_bytes: cfg.min_utterance_bytes,
            tick_interval: Duration::from_millis(cfg.tick_ms),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordingState {
    /// Listening for speech onset.
    Idle,
    /// Capturing an utterance.
    Recording,
}

/// Why a recording span ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Silence { tail_ms: u64 },
    MaxDuration,
    ManualStop,
    DeviceLost,
}

impl StopReason {
    pub fn label(&self) -> &'static str {
        match self {
            StopReason::Silence { .. } => "silence",
            StopReason::MaxDuration => "max_duration",
            StopReason::ManualStop => "manual_stop",
            StopReason::DeviceLost => "device_lost",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One finished recording span, ready for a speech-to-text service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub payload: Vec<u8>,
    pub mime_type: &'static str,
    pub sample_rate: u32,
    pub duration_ms: u64,
    pub chunk_count: usize,
    pub stop_reason: StopReason,
}

pub type UtteranceCallback = Box<dyn FnMut(Utterance) + Send>;

/// Everything `start_listening` needs: the tuning plus where utterances go.
pub struct ListenOptions {
    pub settings: VadSettings,
    pub on_utterance: UtteranceCallback,
}

impl ListenOptions {
    pub fn new<F>(settings: VadSettings, on_utterance: F) -> Self
    where
        F: FnMut(Utterance) + Send + 'static,
    {
        Self {
            settings,
            on_utterance: Box::new(on_utterance),
        }
    }
}

impl fmt::Debug for ListenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenOptions")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

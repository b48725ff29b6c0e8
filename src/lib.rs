//! Hands-free voice capture and conversation guardrails for a voice support
//! desk.
//!
//! - [`vad`]: microphone listener that cuts speech into utterances
//! - [`guardrails`]: escalation and reply-safety classification
//! - [`audio`]: capture devices, level metering, WAV encoding

pub mod audio;
pub mod config;
pub mod error;
pub mod events;
pub mod guardrails;
mod lock;
pub mod telemetry;
pub mod vad;

pub(crate) use lock::lock_or_recover;
pub use error::RecorderError;
pub use events::RecorderEvent;
pub use guardrails::{GuardrailAction, GuardrailPolicy, GuardrailVerdict};
pub use vad::{
    spawn_listener, ListenOptions, ListenerHandle, RecordingState, StopReason, Utterance,
    VadRecorder, VadSettings,
};

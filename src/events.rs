//! Session events for whoever drives the recorder (UI controller, CLI).
//!
//! Serialized as newline-delimited JSON with an `"event"` tag. Errors travel
//! on the same channel as ordinary state updates so a caller can show the
//! message and offer a retry.

use crate::error::RecorderError;
use crate::vad::StopReason;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum RecorderEvent {
    #[serde(rename = "listening_started")]
    ListeningStarted { input: String, sample_rate: u32 },

    #[serde(rename = "recording_started")]
    RecordingStarted { volume: f32 },

    #[serde(rename = "utterance_ready")]
    UtteranceReady {
        bytes: usize,
        duration_ms: u64,
        mime_type: String,
        stop_reason: String,
    },

    /// Recording ended but the payload was too small to be worth transcribing.
    #[serde(rename = "utterance_discarded")]
    UtteranceDiscarded { bytes: usize, stop_reason: String },

    #[serde(rename = "listening_stopped")]
    ListeningStopped,

    #[serde(rename = "error")]
    Error {
        kind: String,
        message: String,
        retryable: bool,
    },
}

impl RecorderEvent {
    pub fn error(err: &RecorderError) -> Self {
        RecorderEvent::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }

    pub fn discarded(bytes: usize, reason: &StopReason) -> Self {
        RecorderEvent::UtteranceDiscarded {
            bytes,
            stop_reason: reason.label().to_string(),
        }
    }

    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            format!("{{\"event\":\"error\",\"kind\":\"serialize\",\"message\":\"{err}\",\"retryable\":false}}")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged() {
        let line = RecorderEvent::ListeningStopped.to_json_line();
        assert_eq!(line, r#"{"event":"listening_stopped"}"#);
    }

    #[test]
    fn error_event_carries_kind_and_message() {
        let event = RecorderEvent::error(&RecorderError::MicrophoneAccess("denied".into()));
        let value: serde_json::Value =
            serde_json::from_str(&event.to_json_line()).expect("valid json");
        assert_eq!(value["event"], "error");
        assert_eq!(value["kind"], "microphone_access");
        assert_eq!(value["message"], "microphone unavailable: denied");
        assert_eq!(value["retryable"], false);
    }

    #[test]
    fn discarded_event_uses_stop_label() {
        let event = RecorderEvent::discarded(120, &StopReason::ManualStop);
        assert_eq!(
            event,
            RecorderEvent::UtteranceDiscarded {
                bytes: 120,
                stop_reason: "manual_stop".to_string()
            }
        );
    }
}

use thiserror::Error;

/// Failures surfaced by the capture layer and the VAD recorder.
///
/// None of these abort the host: the recorder returns them from
/// `start_listening`, keeps the latest one in `error()`, and mirrors it onto
/// the event channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecorderError {
    #[error("microphone unavailable: {0}")]
    MicrophoneAccess(String),

    #[error("capture device lost: {0}")]
    DeviceLost(String),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to encode utterance: {0}")]
    Encode(String),
}

impl RecorderError {
    /// Stable label used in events and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RecorderError::MicrophoneAccess(_) => "microphone_access",
            RecorderError::DeviceLost(_) => "device_lost",
            RecorderError::UnsupportedFormat(_) => "unsupported_format",
            RecorderError::Encode(_) => "encode",
        }
    }

    /// Whether a fresh `start_listening` can succeed without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RecorderError::DeviceLost(_) | RecorderError::Encode(_))
    }
}

impl From<hound::Error> for RecorderError {
    fn from(err: hound::Error) -> Self {
        RecorderError::Encode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable_labels() {
        assert_eq!(
            RecorderError::MicrophoneAccess("denied".into()).kind(),
            "microphone_access"
        );
        assert_eq!(RecorderError::DeviceLost("gone".into()).kind(), "device_lost");
    }

    #[test]
    fn microphone_denial_is_not_retryable() {
        assert!(!RecorderError::MicrophoneAccess("denied".into()).is_retryable());
        assert!(RecorderError::DeviceLost("unplugged".into()).is_retryable());
    }

    #[test]
    fn display_includes_detail() {
        let err = RecorderError::MicrophoneAccess("permission denied".into());
        assert_eq!(err.to_string(), "microphone unavailable: permission denied");
    }
}

//! Microphone capture, loudness analysis, and utterance encoding.
//!
//! The VAD recorder talks to the platform only through [`AudioInput`] and
//! [`CaptureStream`]; [`CpalInput`] is the real microphone, tests substitute
//! scripted sources.

mod capture;
mod dispatch;
mod encode;
mod meter;
mod recorder;
#[cfg(test)]
mod tests;

pub use capture::{AudioInput, CaptureStream};
pub use encode::{encode_wav, WAV_MIME_TYPE};
pub use meter::{rms_level, LiveMeter};
pub use recorder::CpalInput;

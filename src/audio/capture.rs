//! Capability interface between the VAD recorder and the platform audio stack.
//!
//! The recorder only ever asks for a capture, reads blocks from it, and closes
//! it. Anything that can do that (a cpal device, a scripted test source) can
//! drive the state machine.

use crate::error::RecorderError;

/// Something that can hand out a live capture stream.
pub trait AudioInput {
    /// Acquire the microphone and begin capturing. Any resource acquired
    /// before a failure must be released before returning the error.
    fn open_capture(&mut self) -> Result<Box<dyn CaptureStream>, RecorderError>;

    fn name(&self) -> String {
        "unknown input".to_string()
    }
}

/// An open capture. Owned by exactly one listening session.
pub trait CaptureStream {
    /// Mono samples normalized to [-1,1] captured since the previous read, in
    /// arrival order. An empty block means nothing new arrived.
    ///
    /// Returns `RecorderError::DeviceLost` once the underlying device stops
    /// delivering.
    fn read(&mut self) -> Result<Vec<f32>, RecorderError>;

    /// Native rate of the samples returned by `read`.
    fn sample_rate(&self) -> u32;

    /// Stop capturing and release the device. Must be safe to call twice.
    fn close(&mut self);
}

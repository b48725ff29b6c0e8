//! System microphone capture via CPAL.
//!
//! Opens the selected input device, downmixes every callback to mono f32, and
//! buffers it until the VAD recorder drains it on its next tick.

use super::capture::{AudioInput, CaptureStream};
use super::dispatch::{CallbackStaging, CaptureBuffer};
use crate::error::RecorderError;
use crate::lock_or_recover;
use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SizedSample, StreamConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use tracing::{debug, warn};

/// Upper bound on undrained audio held for the analysis tick.
const MAX_BUFFERED_SECONDS: usize = 5;

/// Microphone source backed by the default CPAL host.
#[derive(Debug, Clone, Default)]
pub struct CpalInput {
    preferred_device: Option<String>,
}

impl CpalInput {
    /// Use `preferred_device` when given, otherwise the host's default input.
    pub fn new(preferred_device: Option<String>) -> Self {
        Self { preferred_device }
    }

    /// Input device names, for the `--list-input-devices` flag.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host.input_devices().context("no input devices available")?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn resolve_device(&self) -> Result<cpal::Device, RecorderError> {
        let host = cpal::default_host();
        match self.preferred_device.as_deref() {
            Some(name) => {
                let mut devices = host.input_devices().map_err(|err| {
                    RecorderError::MicrophoneAccess(format!(
                        "no input devices available ({err}). {}",
                        mic_permission_hint()
                    ))
                })?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| {
                        RecorderError::MicrophoneAccess(format!("input device '{name}' not found"))
                    })
            }
            None => host.default_input_device().ok_or_else(|| {
                RecorderError::MicrophoneAccess(format!(
                    "no default input device available. {}",
                    mic_permission_hint()
                ))
            }),
        }
    }
}

impl AudioInput for CpalInput {
    fn open_capture(&mut self) -> Result<Box<dyn CaptureStream>, RecorderError> {
        let device = self.resolve_device()?;
        let device_name = device
            .name()
            .unwrap_or_else(|_| "unknown input device".to_string());
        let default_config = device.default_input_config().map_err(|err| {
            RecorderError::MicrophoneAccess(format!(
                "cannot query '{device_name}': {err}. {}",
                mic_permission_hint()
            ))
        })?;
        let format = default_config.sample_format();
        let stream_config: StreamConfig = default_config.into();
        let sample_rate = stream_config.sample_rate.0;
        let channels = usize::from(stream_config.channels.max(1));

        debug!(
            device = %device_name,
            ?format,
            sample_rate,
            channels,
            "opening capture"
        );

        let max_samples = sample_rate as usize * MAX_BUFFERED_SECONDS;
        let shared = SharedCapture {
            buffer: Arc::new(Mutex::new(CaptureBuffer::new(max_samples))),
            max_samples,
            busy_callbacks: Arc::new(AtomicUsize::new(0)),
        };

        let stream = match format {
            SampleFormat::F32 => {
                build_stream::<f32>(&device, &stream_config, channels, &shared, |s| s)
            }
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, channels, &shared, |s| {
                s as f32 / 32_768.0
            }),
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, channels, &shared, |s| {
                (s as f32 - 32_768.0) / 32_768.0
            }),
            other => return Err(RecorderError::UnsupportedFormat(format!("{other:?}"))),
        }
        .map_err(|err| {
            RecorderError::MicrophoneAccess(format!(
                "failed to open '{device_name}': {err}. {}",
                mic_permission_hint()
            ))
        })?;

        // A stream that fails to start is dropped here, which releases the device.
        stream.play().map_err(|err| {
            RecorderError::MicrophoneAccess(format!(
                "failed to start '{device_name}': {err}. {}",
                mic_permission_hint()
            ))
        })?;

        Ok(Box::new(CpalCapture {
            stream: Some(stream),
            shared,
            sample_rate,
            device_name,
        }))
    }

    fn name(&self) -> String {
        self.preferred_device
            .clone()
            .unwrap_or_else(|| "default input".to_string())
    }
}

#[derive(Clone)]
struct SharedCapture {
    buffer: Arc<Mutex<CaptureBuffer>>,
    max_samples: usize,
    busy_callbacks: Arc<AtomicUsize>,
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    channels: usize,
    shared: &SharedCapture,
    convert: fn(T) -> f32,
) -> std::result::Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + Copy + 'static,
{
    let data_shared = shared.clone();
    let err_shared = shared.clone();
    let mut staging = CallbackStaging::new(shared.max_samples);
    device.build_input_stream(
        config,
        move |data: &[T], _| {
            staging.stage(data, channels, convert);
            // Never block the audio thread on the reader; staged samples
            // ride along with the next callback instead.
            match data_shared.buffer.try_lock() {
                Ok(mut buffer) => staging.flush_into(&mut buffer),
                Err(TryLockError::Poisoned(poisoned)) => {
                    staging.flush_into(&mut poisoned.into_inner())
                }
                Err(TryLockError::WouldBlock) => {
                    data_shared.busy_callbacks.fetch_add(1, Ordering::Relaxed);
                }
            }
        },
        move |err| {
            warn!(%err, "audio stream error");
            lock_or_recover(&err_shared.buffer, "capture buffer").mark_lost(err.to_string());
        },
        None,
    )
}

struct CpalCapture {
    stream: Option<cpal::Stream>,
    shared: SharedCapture,
    sample_rate: u32,
    device_name: String,
}

impl CaptureStream for CpalCapture {
    fn read(&mut self) -> Result<Vec<f32>, RecorderError> {
        if self.stream.is_none() {
            return Err(RecorderError::DeviceLost(format!(
                "'{}' already closed",
                self.device_name
            )));
        }
        lock_or_recover(&self.shared.buffer, "capture buffer")
            .take()
            .map_err(|reason| RecorderError::DeviceLost(format!("'{}': {reason}", self.device_name)))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn close(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };
        if let Err(err) = stream.pause() {
            debug!(%err, "failed to pause audio stream");
        }
        drop(stream);
        let dropped = lock_or_recover(&self.shared.buffer, "capture buffer").dropped_samples();
        debug!(
            device = %self.device_name,
            dropped_samples = dropped,
            busy_callbacks = self.shared.busy_callbacks.load(Ordering::Relaxed),
            "capture closed"
        );
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        self.close();
    }
}

fn mic_permission_hint() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "macOS: System Settings > Privacy & Security > Microphone (allow this terminal)."
    }
    #[cfg(target_os = "linux")]
    {
        "Linux: check PipeWire/PulseAudio permissions and that the source is not muted."
    }
    #[cfg(target_os = "windows")]
    {
        "Windows: Settings > Privacy & Security > Microphone (allow desktop apps)."
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        "Check OS microphone permissions."
    }
}

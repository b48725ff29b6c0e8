//! Recording state machine with loudness-based onset and silence-based end.
//!
//! Each tick reads the newest block from the capture, publishes its RMS level,
//! and moves between idle and recording:
//! - idle + loud block: start a recording span
//! - recording longer than `max_duration`: finalize, regardless of loudness
//! - recording + `silence_duration` of continuous quiet: finalize
//! - recording + loud block: reset the silence timer

use super::{ListenOptions, RecordingState, StopReason, Utterance, UtteranceCallback, VadSettings};
use crate::audio::{encode_wav, rms_level, AudioInput, CaptureStream, LiveMeter, WAV_MIME_TYPE};
use crate::error::RecorderError;
use crate::events::RecorderEvent;
use crossbeam_channel::Sender;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Upper bound on reads when flushing a capture at stop.
const MAX_FINAL_READS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Recording {
        started_at: Instant,
        silence_started_at: Option<Instant>,
    },
}

enum TickOutcome {
    Continue,
    Started,
    Finished(StopReason),
}

/// State owned by one listening session; dropped when listening stops.
struct ListeningSession {
    capture: Box<dyn CaptureStream>,
    settings: VadSettings,
    on_utterance: UtteranceCallback,
    phase: Phase,
    chunks: Vec<Vec<f32>>,
}

impl ListeningSession {
    /// Feed one non-empty block.
    fn advance(&mut self, block: Vec<f32>, is_speaking: bool, now: Instant) -> TickOutcome {
        match self.phase {
            Phase::Idle => {
                if !is_speaking {
                    return TickOutcome::Continue;
                }
                self.chunks.clear();
                self.chunks.push(block);
                self.phase = Phase::Recording {
                    started_at: now,
                    silence_started_at: None,
                };
                TickOutcome::Started
            }
            Phase::Recording {
                started_at,
                silence_started_at,
            } => {
                self.chunks.push(block);
                if let TickOutcome::Finished(reason) = self.check_max_duration(now) {
                    return TickOutcome::Finished(reason);
                }
                let silence_started_at = if is_speaking {
                    if silence_started_at.is_some() {
                        debug!("speech resumed");
                    }
                    None
                } else {
                    match silence_started_at {
                        None => {
                            debug!("silence started");
                            Some(now)
                        }
                        Some(since) => {
                            let tail = now.saturating_duration_since(since);
                            if tail >= self.settings.silence_duration {
                                return TickOutcome::Finished(StopReason::Silence {
                                    tail_ms: tail.as_millis() as u64,
                                });
                            }
                            Some(since)
                        }
                    }
                };
                self.phase = Phase::Recording {
                    started_at,
                    silence_started_at,
                };
                TickOutcome::Continue
            }
        }
    }

    /// A tick with no new audio says nothing about loudness; only the
    /// duration cap can end the span.
    fn check_max_duration(&self, now: Instant) -> TickOutcome {
        match self.phase {
            Phase::Recording { started_at, .. }
                if now.saturating_duration_since(started_at) >= self.settings.max_duration =>
            {
                TickOutcome::Finished(StopReason::MaxDuration)
            }
            _ => TickOutcome::Continue,
        }
    }

    /// Append whatever the capture buffered since the last tick, so a stop
    /// never cuts off audio that already arrived.
    fn drain_pending(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        for _ in 0..MAX_FINAL_READS {
            match self.capture.read() {
                Ok(block) if block.is_empty() => return,
                Ok(block) => self.chunks.push(block),
                Err(err) => {
                    debug!(%err, "final read failed");
                    return;
                }
            }
        }
    }
}

/// Voice-activity recorder over any [`AudioInput`].
///
/// Single-owner and single-threaded: `tick`, `start_listening`, and
/// `stop_listening` all take `&mut self`, so a stop can never interleave with
/// a half-finished tick. Use [`super::spawn_listener`] to drive it in real
/// time.
pub struct VadRecorder<I: AudioInput> {
    input: I,
    session: Option<ListeningSession>,
    meter: LiveMeter,
    events: Option<Sender<RecorderEvent>>,
    current_volume: f32,
    error: Option<RecorderError>,
}

impl<I: AudioInput> VadRecorder<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            session: None,
            meter: LiveMeter::new(),
            events: None,
            current_volume: 0.0,
            error: None,
        }
    }

    /// Publish volume to an existing meter instead of a private one.
    pub fn with_meter(mut self, meter: LiveMeter) -> Self {
        self.meter = meter;
        self
    }

    pub fn with_events(mut self, events: Sender<RecorderEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Acquire the microphone and start watching for speech.
    ///
    /// A call while already listening is a no-op: no second device is opened
    /// and the running session keeps its original options.
    pub fn start_listening(&mut self, options: ListenOptions) -> Result<(), RecorderError> {
        if self.session.is_some() {
            debug!("start requested while already listening; ignoring");
            return Ok(());
        }
        self.error = None;

        let capture = match self.input.open_capture() {
            Ok(capture) => capture,
            Err(err) => {
                warn!(%err, "microphone acquisition failed");
                self.fail(err.clone());
                return Err(err);
            }
        };
        let sample_rate = capture.sample_rate();
        self.session = Some(ListeningSession {
            capture,
            settings: options.settings,
            on_utterance: options.on_utterance,
            phase: Phase::Idle,
            chunks: Vec::new(),
        });
        self.set_volume(0.0);

        let input = self.input.name();
        info!(%input, sample_rate, "listening for speech");
        send_event(
            &self.events,
            RecorderEvent::ListeningStarted { input, sample_rate },
        );
        Ok(())
    }

    /// Stop listening and release the capture. Finalizes an in-progress
    /// recording the same way an automatic stop would. Safe to call at any
    /// time, including when already stopped.
    pub fn stop_listening(&mut self) {
        let Some(session) = self.session.as_mut() else {
            self.set_volume(0.0);
            return;
        };
        session.drain_pending();
        self.finish_recording(StopReason::ManualStop);
        self.release();
        info!("stopped listening");
        send_event(&self.events, RecorderEvent::ListeningStopped);
    }

    /// Run one analysis step at `now`. Does nothing unless listening.
    pub fn tick(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let block = match session.capture.read() {
            Ok(block) => block,
            Err(err) => {
                self.handle_capture_loss(err);
                return;
            }
        };

        let outcome = if block.is_empty() {
            // No device callback since the last tick: keep the last level
            // and leave the silence timer alone.
            session.check_max_duration(now)
        } else {
            let volume = rms_level(&block);
            let is_speaking = volume > session.settings.silence_threshold;
            let outcome = session.advance(block, is_speaking, now);
            self.set_volume(volume);
            outcome
        };

        match outcome {
            TickOutcome::Continue => {}
            TickOutcome::Started => {
                let volume = self.current_volume;
                debug!(volume, "speech detected; recording");
                send_event(&self.events, RecorderEvent::RecordingStarted { volume });
            }
            TickOutcome::Finished(reason) => self.finish_recording(reason),
        }
    }

    pub fn state(&self) -> RecordingState {
        match self.session.as_ref().map(|s| s.phase) {
            Some(Phase::Recording { .. }) => RecordingState::Recording,
            _ => RecordingState::Idle,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_volume(&self) -> f32 {
        self.current_volume
    }

    pub fn recording_started_at(&self) -> Option<Instant> {
        match self.session.as_ref()?.phase {
            Phase::Recording { started_at, .. } => Some(started_at),
            Phase::Idle => None,
        }
    }

    pub fn silence_started_at(&self) -> Option<Instant> {
        match self.session.as_ref()?.phase {
            Phase::Recording {
                silence_started_at, ..
            } => silence_started_at,
            Phase::Idle => None,
        }
    }

    /// Chunks captured so far in the current recording span.
    pub fn chunk_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.chunks.len())
    }

    /// The most recent failure, cleared by the next successful start.
    pub fn error(&self) -> Option<&RecorderError> {
        self.error.as_ref()
    }

    pub fn meter(&self) -> &LiveMeter {
        &self.meter
    }

    pub fn settings(&self) -> Option<&VadSettings> {
        self.session.as_ref().map(|s| &s.settings)
    }

    fn finish_recording(&mut self, reason: StopReason) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.phase == Phase::Idle {
            return;
        }
        session.phase = Phase::Idle;
        let chunk_count = session.chunks.len();
        let samples: Vec<f32> = session.chunks.drain(..).flatten().collect();
        let sample_rate = session.capture.sample_rate();

        let payload = match encode_wav(&samples, sample_rate) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%err, "dropping utterance that failed to encode");
                send_event(&self.events, RecorderEvent::error(&err));
                self.error = Some(err);
                return;
            }
        };

        if payload.len() <= session.settings.min_payload_bytes {
            debug!(
                bytes = payload.len(),
                reason = %reason,
                "utterance below size threshold; discarding"
            );
            send_event(
                &self.events,
                RecorderEvent::discarded(payload.len(), &reason),
            );
            return;
        }

        let utterance = Utterance {
            duration_ms: samples.len() as u64 * 1_000 / u64::from(sample_rate.max(1)),
            payload,
            mime_type: WAV_MIME_TYPE,
            sample_rate,
            chunk_count,
            stop_reason: reason,
        };
        info!(
            bytes = utterance.payload.len(),
            duration_ms = utterance.duration_ms,
            reason = %reason,
            "utterance complete"
        );
        send_event(
            &self.events,
            RecorderEvent::UtteranceReady {
                bytes: utterance.payload.len(),
                duration_ms: utterance.duration_ms,
                mime_type: utterance.mime_type.to_string(),
                stop_reason: reason.label().to_string(),
            },
        );
        (session.on_utterance)(utterance);
    }

    /// Device went away mid-session: keep what was captured, release
    /// everything, and require a fresh start.
    fn handle_capture_loss(&mut self, err: RecorderError) {
        warn!(%err, "capture lost");
        self.finish_recording(StopReason::DeviceLost);
        self.release();
        self.fail(err);
        send_event(&self.events, RecorderEvent::ListeningStopped);
    }

    fn release(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.capture.close();
        }
        self.set_volume(0.0);
    }

    fn fail(&mut self, err: RecorderError) {
        send_event(&self.events, RecorderEvent::error(&err));
        self.error = Some(err);
    }

    fn set_volume(&mut self, volume: f32) {
        self.current_volume = volume;
        self.meter.set_level(volume);
    }
}

impl<I: AudioInput> Drop for VadRecorder<I> {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.capture.close();
        }
    }
}

fn send_event(events: &Option<Sender<RecorderEvent>>, event: RecorderEvent) {
    if let Some(sender) = events {
        // A caller that stopped reading events does not stop the session.
        let _ = sender.try_send(event);
    }
}

use super::{ListenOptions, VadRecorder};
use crate::audio::{AudioInput, LiveMeter};
use crate::events::RecorderEvent;
use crossbeam_channel::{bounded, RecvTimeoutError, Receiver, Sender};
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

enum ListenerCommand {
    Stop,
}

/// Handle to a running listener thread.
///
/// Stopping (explicitly or by dropping the handle) finalizes any recording in
/// progress, releases the microphone, and joins the thread.
pub struct ListenerHandle {
    commands: Sender<ListenerCommand>,
    handle: Option<thread::JoinHandle<()>>,
    meter: LiveMeter,
}

impl ListenerHandle {
    /// Live volume for visualization; 0 once the session ends.
    pub fn meter(&self) -> &LiveMeter {
        &self.meter
    }

    /// False once the session ended on its own (microphone failure, device
    /// loss) or after `stop`.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        // The thread may already have exited; a closed channel is fine.
        let _ = self.commands.send(ListenerCommand::Stop);
        if handle.join().is_err() {
            warn!("listener thread panicked");
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Open `input` and run the VAD recorder on its own thread, ticking every
/// `options.settings.tick_interval`.
///
/// All recorder state lives on that one thread; stop requests arrive through
/// the same channel wait that paces the ticks, so no tick runs after a stop.
/// Microphone failures are reported on `events` and end the thread.
pub fn spawn_listener<I>(
    input: I,
    options: ListenOptions,
    events: Option<Sender<RecorderEvent>>,
) -> ListenerHandle
where
    I: AudioInput + Send + 'static,
{
    let (tx, rx) = bounded(1);
    let meter = LiveMeter::new();
    let thread_meter = meter.clone();
    let handle = thread::spawn(move || run_listener(input, options, events, thread_meter, rx));
    ListenerHandle {
        commands: tx,
        handle: Some(handle),
        meter,
    }
}

fn run_listener<I: AudioInput>(
    input: I,
    options: ListenOptions,
    events: Option<Sender<RecorderEvent>>,
    meter: LiveMeter,
    commands: Receiver<ListenerCommand>,
) {
    let tick_interval = options.settings.tick_interval;
    let mut recorder = VadRecorder::new(input).with_meter(meter);
    if let Some(events) = events {
        recorder = recorder.with_events(events);
    }
    if recorder.start_listening(options).is_err() {
        return;
    }

    let mut ticks = 0u64;
    loop {
        match commands.recv_timeout(tick_interval) {
            Err(RecvTimeoutError::Timeout) => {
                recorder.tick(Instant::now());
                ticks += 1;
                if !recorder.is_listening() {
                    break;
                }
            }
            Ok(ListenerCommand::Stop) | Err(RecvTimeoutError::Disconnected) => {
                recorder.stop_listening();
                break;
            }
        }
    }
    debug!(ticks, "listener exiting");
}

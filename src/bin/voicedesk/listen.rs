use anyhow::{bail, Context, Result};
use crossbeam_channel::{after, bounded, never, select, unbounded, Receiver};
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use voicedesk::audio::CpalInput;
use voicedesk::config::AppConfig;
use voicedesk::{spawn_listener, ListenOptions, RecorderEvent, Utterance};

/// Max pending recorder events before the listener starts dropping them.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Listen on the microphone until Enter, EOF on stdin, or `--listen-secs`.
///
/// Events are printed to stdout as JSON lines; finished utterances are
/// written to `--save-dir` when one is given.
pub(crate) fn run(config: &AppConfig) -> Result<()> {
    let (event_tx, event_rx) = bounded::<RecorderEvent>(EVENT_CHANNEL_CAPACITY);
    let (utterance_tx, utterance_rx) = unbounded::<Utterance>();
    let options = ListenOptions::new(config.vad_settings(), move |utterance| {
        // Receiver outlives the listener; a send only fails during teardown.
        let _ = utterance_tx.send(utterance);
    });

    let input = CpalInput::new(config.input_device.clone());
    let listener = spawn_listener(input, options, Some(event_tx));
    let stdin_rx = spawn_stdin_watcher();
    let deadline = config
        .listen_secs
        .map(|secs| after(Duration::from_secs(secs)))
        .unwrap_or_else(never);
    let mut saver = UtteranceSaver::new(config.save_dir.clone());
    let mut fatal: Option<String> = None;

    eprintln!("Listening. Press Enter to stop.");
    loop {
        select! {
            recv(event_rx) -> event => {
                let Ok(event) = event else { break };
                println!("{}", event.to_json_line());
                if let RecorderEvent::Error { kind, message, .. } = &event {
                    if kind == "microphone_access" {
                        fatal = Some(message.clone());
                    }
                }
                if matches!(event, RecorderEvent::ListeningStopped) {
                    break;
                }
            }
            recv(utterance_rx) -> utterance => {
                if let Ok(utterance) = utterance {
                    saver.save(&utterance)?;
                }
            }
            recv(stdin_rx) -> _ => break,
            recv(deadline) -> _ => {
                info!("listen time elapsed");
                break;
            }
        }
    }

    listener.stop();
    // Stopping may finalize one last utterance.
    for event in event_rx.try_iter() {
        println!("{}", event.to_json_line());
    }
    for utterance in utterance_rx.try_iter() {
        saver.save(&utterance)?;
    }
    info!(saved = saver.count, "listen session ended");

    if let Some(message) = fatal {
        bail!(message);
    }
    Ok(())
}

fn spawn_stdin_watcher() -> Receiver<()> {
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let mut line = String::new();
        if let Err(err) = io::stdin().lock().read_line(&mut line) {
            warn!(%err, "stdin read failed; stopping");
        }
        let _ = tx.send(());
    });
    rx
}

struct UtteranceSaver {
    dir: Option<PathBuf>,
    count: usize,
}

impl UtteranceSaver {
    fn new(dir: Option<PathBuf>) -> Self {
        Self { dir, count: 0 }
    }

    fn save(&mut self, utterance: &Utterance) -> Result<()> {
        self.count += 1;
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let path = dir.join(format!("utterance-{:03}.wav", self.count));
        fs::write(&path, &utterance.payload)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(
            path = %path.display(),
            bytes = utterance.payload.len(),
            reason = %utterance.stop_reason,
            "utterance saved"
        );
        eprintln!("saved {}", path.display());
        Ok(())
    }
}

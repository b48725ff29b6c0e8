use crate::config::AppConfig;
use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<bool> = OnceLock::new();

/// Where the JSON trace log goes: `$VOICEDESK_TRACE_LOG` or the temp dir.
pub fn tracing_log_path() -> PathBuf {
    env::var("VOICEDESK_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("voicedesk_trace.jsonl"))
}

/// Install the file subscriber once, if `--logs` asked for it.
///
/// Returns whether file logging is active. A log file that cannot be opened,
/// or a subscriber already installed elsewhere, leaves it off rather than
/// failing the run.
pub fn init_tracing(config: &AppConfig) -> bool {
    let enabled = config.logs && !config.no_logs;
    if !enabled {
        return false;
    }

    *TRACING_INIT.get_or_init(|| install_file_subscriber(&tracing_log_path()))
}

fn install_file_subscriber(path: &Path) -> bool {
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("voicedesk: trace log disabled ({}): {err}", path.display());
            return false;
        }
    };
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(file)
        .with_current_span(false)
        .with_span_list(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}

//! voicedesk: hands-free listener and guardrail checker for a voice support
//! desk.

mod cli_utils;
mod listen;

use anyhow::Result;
use voicedesk::config::AppConfig;
use voicedesk::telemetry::{init_tracing, tracing_log_path};

use crate::cli_utils::{list_input_devices, print_check, Speaker};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    if init_tracing(&config) {
        tracing::debug!(log = %tracing_log_path().display(), "=== voicedesk started ===");
    }

    if config.list_input_devices {
        return list_input_devices();
    }
    if let Some(text) = &config.check_user {
        return print_check(&config, Speaker::Customer, text);
    }
    if let Some(text) = &config.check_reply {
        return print_check(&config, Speaker::Assistant, text);
    }

    listen::run(&config)
}

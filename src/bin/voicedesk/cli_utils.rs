use anyhow::Result;
use serde_json::json;
use tracing::info;
use voicedesk::audio::CpalInput;
use voicedesk::config::AppConfig;

pub(crate) fn list_input_devices() -> Result<()> {
    // Support VOICEDESK_TEST_DEVICES for testing
    let devices = if let Ok(raw) = std::env::var("VOICEDESK_TEST_DEVICES") {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        }
    } else {
        CpalInput::list_devices().unwrap_or_else(|err| {
            eprintln!("Failed to list audio input devices: {err}");
            Vec::new()
        })
    };

    if devices.is_empty() {
        println!("No audio input devices detected.");
    } else {
        println!("Available audio input devices:");
        for name in devices {
            println!("  - {name}");
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Speaker {
    Customer,
    Assistant,
}

impl Speaker {
    fn label(self) -> &'static str {
        match self {
            Speaker::Customer => "customer",
            Speaker::Assistant => "assistant",
        }
    }
}

/// Classify one line and print `{"speaker", "verdict", "action"}` as JSON.
pub(crate) fn print_check(config: &AppConfig, speaker: Speaker, text: &str) -> Result<()> {
    let policy = config.guardrail_policy()?;
    let verdict = match speaker {
        Speaker::Customer => policy.check_user_message(text),
        Speaker::Assistant => policy.check_ai_response(text),
    };
    if config.log_content {
        info!(speaker = speaker.label(), text, ?verdict, "guardrail check");
    } else {
        info!(
            speaker = speaker.label(),
            chars = text.chars().count(),
            ?verdict,
            "guardrail check"
        );
    }
    let report = json!({
        "speaker": speaker.label(),
        "verdict": &verdict,
        "action": verdict.action(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

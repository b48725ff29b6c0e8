use serde_json::Value;
use std::process::{Command, Stdio};

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn voicedesk_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_voicedesk").expect("voicedesk test binary not built")
}

fn voicedesk() -> Command {
    let mut command = Command::new(voicedesk_bin());
    command
        .env_remove("VOICEDESK_LOGS")
        .env_remove("VOICEDESK_INPUT_DEVICE")
        .stdin(Stdio::null());
    command
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn voicedesk_help_mentions_flags() {
    let output = voicedesk()
        .arg("--help")
        .output()
        .expect("run voicedesk --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("voicedesk"));
    assert!(combined.contains("--silence-threshold"));
    assert!(combined.contains("--check-user"));
}

#[test]
fn voicedesk_list_input_devices_prints_message() {
    let output = voicedesk()
        .arg("--list-input-devices")
        .output()
        .expect("run voicedesk --list-input-devices");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(
        combined.contains("audio input devices")
            || combined.contains("Failed to list audio input devices")
    );
}

#[test]
fn voicedesk_lists_test_devices() {
    let output = voicedesk()
        .arg("--list-input-devices")
        .env("VOICEDESK_TEST_DEVICES", "Desk Mic, Headset")
        .output()
        .expect("run voicedesk --list-input-devices");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("  - Desk Mic"));
    assert!(stdout.contains("  - Headset"));
}

#[test]
fn voicedesk_check_user_escalates_manager_request() {
    let output = voicedesk()
        .args(["--check-user", "I want to speak to a manager right now"])
        .output()
        .expect("run voicedesk --check-user");
    assert!(output.status.success(), "{}", combined_output(&output));
    let report = stdout_json(&output);
    assert_eq!(report["speaker"], "customer");
    assert_eq!(report["verdict"]["isAllowed"], true);
    assert_eq!(report["verdict"]["shouldEscalate"], true);
    assert!(report["verdict"]["reason"]
        .as_str()
        .is_some_and(|reason| reason.contains("manager")));
    assert_eq!(report["action"]["action"], "escalate");
}

#[test]
fn voicedesk_check_user_forwards_plain_question() {
    let output = voicedesk()
        .args(["--check-user", "What time do you close today?"])
        .output()
        .expect("run voicedesk --check-user");
    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["verdict"]["shouldEscalate"], false);
    assert!(report["verdict"].get("reason").is_none());
    assert_eq!(report["action"]["action"], "forward");
}

#[test]
fn voicedesk_check_reply_refuses_guarantee() {
    let output = voicedesk()
        .args(["--check-reply", "I guarantee you'll get a refund"])
        .output()
        .expect("run voicedesk --check-reply");
    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["speaker"], "assistant");
    assert_eq!(report["verdict"]["isAllowed"], false);
    assert_eq!(report["verdict"]["shouldEscalate"], false);
    assert_eq!(report["action"]["action"], "refuse");
}

#[test]
fn voicedesk_custom_escalation_phrase_applies() {
    let output = voicedesk()
        .args([
            "--escalation-phrase",
            "billing team",
            "--check-user",
            "Put me through to the Billing Team",
        ])
        .output()
        .expect("run voicedesk with custom phrase");
    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(
        report["verdict"]["reason"],
        "Customer requested escalation: \"billing team\""
    );
}

#[test]
fn voicedesk_rejects_invalid_threshold() {
    let output = voicedesk()
        .args(["--silence-threshold", "1.5", "--check-user", "hello"])
        .output()
        .expect("run voicedesk with bad threshold");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--silence-threshold"));
}

#[test]
fn voicedesk_rejects_unknown_flag() {
    let output = voicedesk()
        .arg("--definitely-not-a-flag")
        .output()
        .expect("run voicedesk with unknown flag");
    assert!(!output.status.success());
}

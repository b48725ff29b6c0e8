use super::*;

#[test]
fn manager_request_escalates_but_stays_allowed() {
    let verdict = check_user_message("I want to speak to a manager right now");
    assert!(verdict.is_allowed);
    assert!(verdict.should_escalate);
    let reason = verdict.reason.expect("escalation carries a reason");
    assert!(reason.contains("manager"), "reason was {reason:?}");
    assert!(reason.starts_with("Customer requested escalation: \""));
}

#[test]
fn ordinary_question_passes() {
    let verdict = check_user_message("What time do you close today?");
    assert_eq!(verdict, GuardrailVerdict::pass());
    assert_eq!(verdict.action(), GuardrailAction::Forward);
}

#[test]
fn closing_time_question_is_allowed_without_escalation() {
    let verdict = check_user_message("What time do you close tonight?");
    assert!(verdict.is_allowed);
    assert!(!verdict.should_escalate);
}

#[test]
fn phrase_match_ignores_case() {
    let verdict = check_user_message("This is UNACCEPTABLE.");
    assert!(verdict.should_escalate);
    assert_eq!(
        verdict.reason.as_deref(),
        Some("Customer requested escalation: \"unacceptable\"")
    );
}

#[test]
fn first_listed_phrase_wins() {
    // "supervisor" precedes "lawyer" in the phrase list.
    let verdict = check_user_message("my lawyer says get me a supervisor");
    assert_eq!(
        verdict.reason.as_deref(),
        Some("Customer requested escalation: \"supervisor\"")
    );
}

#[test]
fn phrases_are_checked_before_patterns() {
    let verdict = check_user_message("emergency, I need a real person");
    assert_eq!(
        verdict.reason.as_deref(),
        Some("Customer requested escalation: \"real person\"")
    );
}

#[test]
fn large_refund_is_sensitive() {
    let verdict = check_user_message("I need a refund of $450 today");
    assert!(verdict.is_allowed);
    assert!(verdict.should_escalate);
    assert_eq!(
        verdict.reason.as_deref(),
        Some(r"Sensitive topic detected: refund.*\$?\d{3,}")
    );
}

#[test]
fn small_refund_is_not_sensitive() {
    let verdict = check_user_message("Can I get a refund of $45?");
    assert_eq!(verdict, GuardrailVerdict::pass());
}

#[test]
fn sensitive_patterns_ignore_case() {
    let verdict = check_user_message("Please CANCEL my ACCOUNT");
    assert_eq!(
        verdict.reason.as_deref(),
        Some("Sensitive topic detected: cancel.*account")
    );
}

#[test]
fn guarantee_is_blocked_without_escalation() {
    let verdict = check_ai_response("I guarantee you'll get a refund");
    assert!(!verdict.is_allowed);
    assert!(!verdict.should_escalate);
    assert_eq!(
        verdict.reason.as_deref(),
        Some("AI made dangerous promise: i guarantee")
    );
    assert_eq!(
        verdict.action(),
        GuardrailAction::Refuse {
            reply: refusal_response(),
            reason: "AI made dangerous promise: i guarantee".to_string(),
        }
    );
}

#[test]
fn order_status_reply_passes() {
    let verdict = check_ai_response("Your order #12345 is on its way");
    assert_eq!(verdict, GuardrailVerdict::pass());
}

#[test]
fn order_status_lookup_reply_is_allowed() {
    let verdict = check_ai_response("Let me check your order status");
    assert!(verdict.is_allowed);
    assert!(!verdict.should_escalate);
    assert_eq!(verdict.action(), GuardrailAction::Forward);
}

#[test]
fn forbidden_topic_blocks_and_escalates() {
    let verdict = check_ai_response("Here is some Legal Advice for your case.");
    assert!(!verdict.is_allowed);
    assert!(verdict.should_escalate);
    assert_eq!(
        verdict.reason.as_deref(),
        Some("AI attempted to discuss forbidden topic: legal advice")
    );
    assert!(matches!(
        verdict.action(),
        GuardrailAction::Escalate { reply, .. } if reply == escalation_response()
    ));
}

#[test]
fn forbidden_topic_outranks_dangerous_promise() {
    let verdict = check_ai_response("I guarantee this medical diagnosis is right");
    assert!(verdict.should_escalate);
    assert_eq!(
        verdict.reason.as_deref(),
        Some("AI attempted to discuss forbidden topic: medical diagnosis")
    );
}

#[test]
fn promise_pattern_spans_words() {
    let verdict = check_ai_response("I promise you a full refund.");
    assert_eq!(
        verdict.reason.as_deref(),
        Some("AI made dangerous promise: i promise.*refund")
    );
}

#[test]
fn verdict_serializes_camel_case() {
    let json = serde_json::to_value(check_user_message("I am furious")).expect("json");
    assert_eq!(json["isAllowed"], true);
    assert_eq!(json["shouldEscalate"], true);
    assert_eq!(json["reason"], "Customer requested escalation: \"furious\"");

    let json = serde_json::to_value(GuardrailVerdict::pass()).expect("json");
    assert!(json.get("reason").is_none());
}

#[test]
fn action_serializes_with_tag() {
    let json = serde_json::to_value(check_user_message("get me a supervisor").action())
        .expect("json");
    assert_eq!(json["action"], "escalate");
    assert_eq!(json["reply"], escalation_response());

    let json = serde_json::to_value(GuardrailAction::Forward).expect("json");
    assert_eq!(json["action"], "forward");
}

#[test]
fn custom_phrases_extend_defaults() {
    let policy = GuardrailPolicy::default().with_escalation_phrases(["  Billing Team ", ""]);
    assert_eq!(
        policy.escalation_phrases().last().map(String::as_str),
        Some("billing team")
    );
    let verdict = policy.check_user_message("put me through to the billing team");
    assert_eq!(
        verdict.reason.as_deref(),
        Some("Customer requested escalation: \"billing team\"")
    );
    // Built-ins still apply.
    assert!(policy.check_user_message("supervisor please").should_escalate);
}

#[test]
fn duplicate_custom_phrase_is_ignored() {
    let base = GuardrailPolicy::default().escalation_phrases().len();
    let policy = GuardrailPolicy::default().with_escalation_phrases(["Supervisor"]);
    assert_eq!(policy.escalation_phrases().len(), base);
}

#[test]
fn custom_patterns_compile_case_insensitive() {
    let policy = GuardrailPolicy::default()
        .with_sensitive_patterns([r"chargeback"])
        .expect("valid pattern");
    let verdict = policy.check_user_message("I'll file a CHARGEBACK");
    assert_eq!(
        verdict.reason.as_deref(),
        Some("Sensitive topic detected: chargeback")
    );
}

#[test]
fn invalid_custom_pattern_is_rejected() {
    assert!(GuardrailPolicy::default()
        .with_sensitive_patterns([r"refund(("])
        .is_err());
}

#[test]
fn pattern_keeps_source() {
    let pattern = Pattern::new(r"urgent.*help").expect("valid");
    assert_eq!(pattern.source(), r"urgent.*help");
    assert!(pattern.is_match("URGENT, please help"));
    assert_eq!(format!("{pattern:?}"), "Pattern(\"urgent.*help\")");
}

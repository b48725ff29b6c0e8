//! Escalation and reply-safety checks for the support conversation.
//!
//! Two questions, answered from static lists:
//! - does this customer line call for a human? ([`check_user_message`])
//! - may this AI reply be spoken? ([`check_ai_response`])
//!
//! Lists are scanned in declaration order and the first hit decides the
//! reason; plain phrases are always tried before regex patterns.

mod policy;
#[cfg(test)]
mod tests;

pub use policy::{GuardrailPolicy, Pattern};

use serde::Serialize;
use std::sync::OnceLock;

const ESCALATION_RESPONSE: &str = "I understand this is important to you. Let me connect you with a team member who can better assist you. They'll have all the context from our conversation. Please hold for just a moment.";

const REFUSAL_RESPONSE: &str = "I'm not able to help with that specific request, but I'd be happy to assist you with something else or connect you with a specialist.";

/// Outcome of one check. Created per line; carries no identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailVerdict {
    pub is_allowed: bool,
    pub should_escalate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GuardrailVerdict {
    pub fn pass() -> Self {
        Self {
            is_allowed: true,
            should_escalate: false,
            reason: None,
        }
    }

    pub(crate) fn new(is_allowed: bool, should_escalate: bool, reason: String) -> Self {
        Self {
            is_allowed,
            should_escalate,
            reason: Some(reason),
        }
    }

    /// What the conversation handler should do with the checked line.
    pub fn action(&self) -> GuardrailAction {
        let reason = self.reason.clone().unwrap_or_default();
        match (self.is_allowed, self.should_escalate) {
            (_, true) => GuardrailAction::Escalate {
                reply: escalation_response(),
                reason,
            },
            (false, false) => GuardrailAction::Refuse {
                reply: refusal_response(),
                reason,
            },
            (true, false) => GuardrailAction::Forward,
        }
    }
}

/// Handler-side decision derived from a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GuardrailAction {
    /// Pass the line on unchanged.
    Forward,
    /// Speak `reply` and hand the call to a human; record `reason` with the
    /// handoff.
    Escalate { reply: &'static str, reason: String },
    /// Speak `reply` instead of the blocked text.
    Refuse { reply: &'static str, reason: String },
}

fn default_policy() -> &'static GuardrailPolicy {
    static POLICY: OnceLock<GuardrailPolicy> = OnceLock::new();
    POLICY.get_or_init(GuardrailPolicy::default)
}

/// Check a customer utterance against the default policy.
pub fn check_user_message(text: &str) -> GuardrailVerdict {
    default_policy().check_user_message(text)
}

/// Check a candidate AI reply against the default policy.
pub fn check_ai_response(text: &str) -> GuardrailVerdict {
    default_policy().check_ai_response(text)
}

/// Reply spoken when handing off to a human.
pub fn escalation_response() -> &'static str {
    ESCALATION_RESPONSE
}

/// Reply spoken in place of a blocked AI answer.
pub fn refusal_response() -> &'static str {
    REFUSAL_RESPONSE
}

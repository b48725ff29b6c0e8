use super::GuardrailVerdict;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// Phrases that mean the customer wants, or needs, a human.
const ESCALATION_PHRASES: &[&str] = &[
    "speak to manager",
    "speak to a manager",
    "talk to a manager",
    "speak to human",
    "speak to a human",
    "talk to a person",
    "real person",
    "supervisor",
    "complaint",
    "lawsuit",
    "lawyer",
    "very angry",
    "furious",
    "unacceptable",
];

/// Topics that warrant human review even when asked politely.
const SENSITIVE_PATTERNS: &[&str] = &[
    r"refund.*\$?\d{3,}",
    r"cancel.*account",
    r"delete.*data",
    r"emergency",
    r"urgent.*help",
];

/// Subjects the assistant must never speak about.
const FORBIDDEN_TOPICS: &[&str] = &[
    "competitor pricing",
    "internal company information",
    "employee personal details",
    "legal advice",
    "medical diagnosis",
    "financial investment advice",
    "political opinions",
    "illegal activities",
];

/// Commitments only a human agent may make.
const DANGEROUS_PROMISES: &[&str] = &[
    r"i guarantee",
    r"i promise.*refund",
    r"100% sure",
    r"legally.*entitled",
];

/// Case-insensitive regex that remembers the source it was built from, so
/// verdicts can name the rule that fired.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(source).case_insensitive(true).build()?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

fn builtin_patterns(sources: &[&str]) -> Vec<Pattern> {
    sources
        .iter()
        .map(|source| Pattern::new(source).expect("built-in guardrail pattern should compile"))
        .collect()
}

fn lowercase_all(phrases: &[&str]) -> Vec<String> {
    phrases.iter().map(|p| p.to_lowercase()).collect()
}

/// The rule lists behind the checks. `Default` is the shipped policy.
#[derive(Debug, Clone)]
pub struct GuardrailPolicy {
    escalation_phrases: Vec<String>,
    sensitive_patterns: Vec<Pattern>,
    forbidden_topics: Vec<String>,
    dangerous_promises: Vec<Pattern>,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self {
            escalation_phrases: lowercase_all(ESCALATION_PHRASES),
            sensitive_patterns: builtin_patterns(SENSITIVE_PATTERNS),
            forbidden_topics: lowercase_all(FORBIDDEN_TOPICS),
            dangerous_promises: builtin_patterns(DANGEROUS_PROMISES),
        }
    }
}

impl GuardrailPolicy {
    /// Append site-specific escalation phrases after the built-in ones, so
    /// built-in phrases still win ties.
    pub fn with_escalation_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for phrase in phrases {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if !phrase.is_empty() && !self.escalation_phrases.contains(&phrase) {
                self.escalation_phrases.push(phrase);
            }
        }
        self
    }

    /// Append extra sensitive-topic patterns after the built-in ones.
    pub fn with_sensitive_patterns<I, S>(mut self, sources: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for source in sources {
            self.sensitive_patterns.push(Pattern::new(source.as_ref())?);
        }
        Ok(self)
    }

    pub fn escalation_phrases(&self) -> &[String] {
        &self.escalation_phrases
    }

    pub fn sensitive_patterns(&self) -> &[Pattern] {
        &self.sensitive_patterns
    }

    /// Allowed either way; escalates on the first escalation phrase, then on
    /// the first sensitive pattern.
    pub fn check_user_message(&self, text: &str) -> GuardrailVerdict {
        let lowered = text.to_lowercase();
        if let Some(phrase) = first_phrase(&self.escalation_phrases, &lowered) {
            return GuardrailVerdict::new(
                true,
                true,
                format!("Customer requested escalation: \"{phrase}\""),
            );
        }
        if let Some(pattern) = first_pattern(&self.sensitive_patterns, text) {
            return GuardrailVerdict::new(
                true,
                true,
                format!("Sensitive topic detected: {}", pattern.source()),
            );
        }
        GuardrailVerdict::pass()
    }

    /// Forbidden topics block and escalate; dangerous promises only block.
    pub fn check_ai_response(&self, text: &str) -> GuardrailVerdict {
        let lowered = text.to_lowercase();
        if let Some(topic) = first_phrase(&self.forbidden_topics, &lowered) {
            return GuardrailVerdict::new(
                false,
                true,
                format!("AI attempted to discuss forbidden topic: {topic}"),
            );
        }
        if let Some(pattern) = first_pattern(&self.dangerous_promises, text) {
            return GuardrailVerdict::new(
                false,
                false,
                format!("AI made dangerous promise: {}", pattern.source()),
            );
        }
        GuardrailVerdict::pass()
    }
}

fn first_phrase<'a>(phrases: &'a [String], lowered: &str) -> Option<&'a str> {
    phrases
        .iter()
        .map(String::as_str)
        .find(|phrase| lowered.contains(phrase))
}

fn first_pattern<'a>(patterns: &'a [Pattern], text: &str) -> Option<&'a Pattern> {
    patterns.iter().find(|pattern| pattern.is_match(text))
}

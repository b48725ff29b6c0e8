use super::defaults::{
    MAX_DURATION_HARD_LIMIT_MS, MAX_LISTEN_SECS, MAX_MIN_UTTERANCE_BYTES, MAX_PHRASE_BYTES,
    MAX_TICK_MS, MIN_MAX_DURATION_MS, MIN_SILENCE_DURATION_MS, MIN_TICK_MS,
};
use super::AppConfig;
use crate::guardrails::GuardrailPolicy;
use crate::vad::VadSettings;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize phrases and paths.
    pub fn validate(&mut self) -> Result<()> {
        if !(self.silence_threshold > 0.0 && self.silence_threshold < 1.0) {
            bail!(
                "--silence-threshold must be between 0 and 1 (exclusive), got {}",
                self.silence_threshold
            );
        }
        if !(MIN_MAX_DURATION_MS..=MAX_DURATION_HARD_LIMIT_MS).contains(&self.max_duration_ms) {
            bail!(
                "--max-duration-ms must be between {MIN_MAX_DURATION_MS} and {MAX_DURATION_HARD_LIMIT_MS} ms, got {}",
                self.max_duration_ms
            );
        }
        if self.silence_duration_ms < MIN_SILENCE_DURATION_MS
            || self.silence_duration_ms > self.max_duration_ms
        {
            bail!(
                "--silence-duration-ms must be >={MIN_SILENCE_DURATION_MS} and <= --max-duration-ms ({})",
                self.max_duration_ms
            );
        }
        if self.min_utterance_bytes > MAX_MIN_UTTERANCE_BYTES {
            bail!(
                "--min-utterance-bytes must be at most {MAX_MIN_UTTERANCE_BYTES}, got {}",
                self.min_utterance_bytes
            );
        }
        if !(MIN_TICK_MS..=MAX_TICK_MS).contains(&self.tick_ms) {
            bail!(
                "--tick-ms must be between {MIN_TICK_MS} and {MAX_TICK_MS}, got {}",
                self.tick_ms
            );
        }
        if let Some(secs) = self.listen_secs {
            if !(1..=MAX_LISTEN_SECS).contains(&secs) {
                bail!("--listen-secs must be between 1 and {MAX_LISTEN_SECS}, got {secs}");
            }
        }

        for phrase in &mut self.escalation_phrases {
            let trimmed = phrase.trim();
            if trimmed.is_empty() {
                bail!("--escalation-phrase cannot be blank");
            }
            if trimmed.len() > MAX_PHRASE_BYTES {
                bail!("--escalation-phrase exceeds {MAX_PHRASE_BYTES} bytes");
            }
            *phrase = trimmed.to_string();
        }
        for pattern in &self.sensitive_patterns {
            if pattern.trim().is_empty() {
                bail!("--sensitive-pattern cannot be blank");
            }
        }
        // Compile once here so a bad regex fails at startup, not mid-call.
        self.guardrail_policy()?;

        if let Some(dir) = &self.save_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create --save-dir {}", dir.display()))?;
            let canonical = dir
                .canonicalize()
                .with_context(|| format!("failed to resolve --save-dir {}", dir.display()))?;
            if !canonical.is_dir() {
                bail!("--save-dir {} is not a directory", canonical.display());
            }
            self.save_dir = Some(canonical);
        }

        Ok(())
    }

    /// Recorder tuning derived from the CLI values.
    pub fn vad_settings(&self) -> VadSettings {
        VadSettings::from(self)
    }

    /// Default guardrail lists plus any phrases and patterns given on the
    /// command line.
    pub fn guardrail_policy(&self) -> Result<GuardrailPolicy> {
        GuardrailPolicy::default()
            .with_escalation_phrases(&self.escalation_phrases)
            .with_sensitive_patterns(&self.sensitive_patterns)
            .context("invalid --sensitive-pattern")
    }
}

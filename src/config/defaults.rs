pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.015;
pub const DEFAULT_SILENCE_DURATION_MS: u64 = 1_500;
pub const DEFAULT_MAX_DURATION_MS: u64 = 15_000;
pub const DEFAULT_MIN_UTTERANCE_BYTES: usize = 1_000;
pub const DEFAULT_TICK_MS: u64 = 16;

pub(super) const MIN_SILENCE_DURATION_MS: u64 = 100;
pub(super) const MIN_MAX_DURATION_MS: u64 = 500;
pub(super) const MAX_DURATION_HARD_LIMIT_MS: u64 = 120_000;
pub(super) const MAX_MIN_UTTERANCE_BYTES: usize = 1024 * 1024;
pub(super) const MIN_TICK_MS: u64 = 5;
pub(super) const MAX_TICK_MS: u64 = 100;
pub(super) const MAX_LISTEN_SECS: u64 = 3_600;
pub(super) const MAX_PHRASE_BYTES: usize = 200;

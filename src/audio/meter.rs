use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const SILENT_LEVEL: f32 = 0.0;

/// Latest loudness sample, shared with whatever renders the volume indicator.
///
/// Written on every analysis tick and read from any thread without locking.
#[derive(Clone, Debug)]
pub struct LiveMeter {
    level_bits: Arc<AtomicU32>,
}

impl LiveMeter {
    pub fn new() -> Self {
        Self {
            level_bits: Arc::new(AtomicU32::new(SILENT_LEVEL.to_bits())),
        }
    }

    pub fn set_level(&self, level: f32) {
        let level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            SILENT_LEVEL
        };
        self.level_bits.store(level.to_bits(), Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.set_level(SILENT_LEVEL);
    }

    pub fn level(&self) -> f32 {
        f32::from_bits(self.level_bits.load(Ordering::Relaxed))
    }
}

impl Default for LiveMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// Root-mean-square amplitude of a block of normalized PCM, clamped to [0,1].
pub fn rms_level(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return SILENT_LEVEL;
    }
    let energy: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    let rms = energy.sqrt();
    if rms.is_finite() {
        rms.min(1.0)
    } else {
        SILENT_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_meter_defaults_to_silence() {
        let meter = LiveMeter::new();
        assert_eq!(meter.level(), 0.0);
    }

    #[test]
    fn live_meter_clamps_and_shares_level() {
        let meter = LiveMeter::new();
        let reader = meter.clone();
        meter.set_level(1.7);
        assert_eq!(reader.level(), 1.0);
        meter.set_level(f32::NAN);
        assert_eq!(reader.level(), 0.0);
    }

    #[test]
    fn rms_level_handles_empty() {
        assert_eq!(rms_level(&[]), 0.0);
    }

    #[test]
    fn rms_level_of_constant_block_is_its_magnitude() {
        let level = rms_level(&[0.5, -0.5, 0.5, -0.5]);
        assert!((level - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rms_level_never_exceeds_one() {
        assert_eq!(rms_level(&[4.0, -4.0]), 1.0);
    }
}

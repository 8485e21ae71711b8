//! Square generator

use super::fixed::{full_scale, Sample};

/// Square wave toggling every half period.
#[derive(Debug, Clone)]
pub struct SquareGenerator {
    sample_rate: f64,
    frequency: f64,
    intensity: f64,
    level: Sample,
    high: bool,
    index: u32,
    half_period: u32,
}

impl SquareGenerator {
    pub fn new(sample_rate: f64, frequency: f64, intensity: f64) -> Self {
        Self {
            sample_rate,
            frequency,
            intensity,
            level: full_scale(intensity as f32),
            high: true,
            index: 0,
            half_period: half_period(sample_rate, frequency),
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Restarts the half-period count; the current level is held.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
        self.half_period = half_period(self.sample_rate, frequency);
        self.index = 0;
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f64) {
        self.intensity = intensity;
        self.level = full_scale(intensity as f32);
    }

    pub fn process(&mut self, out: &mut [Sample]) {
        for sample in out.iter_mut() {
            *sample = if self.high { self.level } else { -self.level };
            if self.half_period == 0 {
                continue;
            }
            self.index += 1;
            if self.index == self.half_period {
                self.index = 0;
                self.high = !self.high;
            }
        }
    }
}

/// Half period in samples, 0 when the generator is not running.
fn half_period(sample_rate: f64, frequency: f64) -> u32 {
    if frequency > 0.0 {
        (sample_rate / (2.0 * frequency)) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::fixed::SAMPLE_MAX;

    #[test]
    fn test_square_toggles_every_half_period() {
        // 4 samples per half period
        let mut square = SquareGenerator::new(8000.0, 1000.0, 1.0);
        let mut out = [0; 16];
        square.process(&mut out);

        assert_eq!(&out[0..4], &[SAMPLE_MAX; 4]);
        assert_eq!(&out[4..8], &[-SAMPLE_MAX; 4]);
        assert_eq!(&out[8..12], &[SAMPLE_MAX; 4]);
        assert_eq!(&out[12..16], &[-SAMPLE_MAX; 4]);
    }

    #[test]
    fn test_square_intensity_keeps_sign() {
        let mut square = SquareGenerator::new(8000.0, 1000.0, 1.0);
        let mut out = [0; 5];
        square.process(&mut out);
        assert!(out[4] < 0);

        square.set_intensity(0.5);
        let mut next = [0; 1];
        square.process(&mut next);
        assert_eq!(next[0], -full_scale(0.5));
    }

    #[test]
    fn test_square_frequency_change_resets_counter() {
        let mut square = SquareGenerator::new(8000.0, 1000.0, 1.0);
        let mut out = [0; 3];
        square.process(&mut out);

        // Half period becomes 2 samples, counted from now
        square.set_frequency(2000.0);
        let mut next = [0; 4];
        square.process(&mut next);
        assert_eq!(next, [SAMPLE_MAX, SAMPLE_MAX, -SAMPLE_MAX, -SAMPLE_MAX]);
    }

    #[test]
    fn test_square_zero_frequency_holds() {
        let mut square = SquareGenerator::new(8000.0, 0.0, 0.25);
        let mut out = [0; 32];
        square.process(&mut out);
        assert!(out.iter().all(|&s| s == full_scale(0.25)));
    }
}

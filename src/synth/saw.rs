//! Descending saw generator

use super::fixed::{full_scale, Sample};

/// Saw wave stepping down from `+peak` to `-peak`, then wrapping.
#[derive(Debug, Clone)]
pub struct SawGenerator {
    sample_rate: f64,
    frequency: f64,
    intensity: f64,
    peak: Sample,
    step: Sample,
    current: Sample,
}

impl SawGenerator {
    pub fn new(sample_rate: f64, frequency: f64, intensity: f64) -> Self {
        let peak = full_scale(intensity as f32);
        let mut saw = Self {
            sample_rate,
            frequency,
            intensity,
            peak,
            step: 0,
            current: peak,
        };
        saw.update_step();
        saw
    }

    fn update_step(&mut self) {
        self.step = ((2 * self.peak as i64) as f64 * (self.frequency / self.sample_rate)) as Sample;
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// The current level is kept; only the slope changes.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
        self.update_step();
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f64) {
        self.intensity = intensity;
        self.peak = full_scale(intensity as f32);
        self.current = self.current.clamp(-self.peak, self.peak);
        self.update_step();
    }

    pub fn process(&mut self, out: &mut [Sample]) {
        for sample in out.iter_mut() {
            *sample = self.current;
            self.current -= self.step;
            if self.current < -self.peak {
                // Carry the excess over the wrap to stay phase continuous
                let underflow = -self.peak - self.current;
                self.current = self.peak - underflow;
            }
        }
    }
}

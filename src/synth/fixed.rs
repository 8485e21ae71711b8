//! Fixed-point sample formats
//!
//! Signals travel between stages as Q8.23 integers (1 sign bit, 8 integer
//! bits, 23 fractional bits). Filter coefficients use Q3.28.

/// One audio sample in Q8.23.
pub type Sample = i32;

/// Full-scale positive Q8.23 value.
pub const SAMPLE_MAX: Sample = (1 << 23) - 1;

/// Full-scale negative Q8.23 value.
pub const SAMPLE_MIN: Sample = -(1 << 23);

/// Fractional bits of a filter coefficient.
pub const COEFF_FRAC_BITS: u32 = 28;

/// Clamp a wide intermediate value into the Q8.23 range.
#[inline]
pub fn saturate(value: i64) -> Sample {
    value.clamp(SAMPLE_MIN as i64, SAMPLE_MAX as i64) as Sample
}

/// Convert a real-valued coefficient to Q3.28, rounding half away from zero.
#[inline]
pub fn to_q3_28(value: f64) -> i32 {
    let scaled = value * (1u64 << COEFF_FRAC_BITS) as f64;
    let rounding = if value > 0.0 { 0.5 } else { -0.5 };
    (scaled + rounding) as i32
}

/// Amplitude in Q8.23 for an intensity in [0, 1].
#[inline]
pub fn full_scale(intensity: f32) -> Sample {
    (intensity * SAMPLE_MAX as f32) as Sample
}

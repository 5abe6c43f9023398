//! Precomputed daily noise table used to perturb the solar intensity curve.
//!
//! Octave-summed Perlin samples, one per minute of day, normalized to 0.0-1.0.
//! The table is a pure function of its parameters, so a fixed seed gives a
//! reproducible day profile.

use noise::{NoiseFn, Perlin};

/// Frequency of the base octave in cycles per table length.
const BASE_FREQUENCY: f64 = 4.0;

/// Generate a smooth pseudo-random signal of `len` samples in 0.0-1.0.
///
/// # Arguments
/// - `len`: Number of samples (minutes per day for the solar table)
/// - `octave_count`: Number of Perlin octaves summed per sample
/// - `amplitude`: Amplitude of the first octave
/// - `persistence`: Amplitude falloff per octave
/// - `seed`: Perlin permutation seed
pub fn daily_noise(len: usize, octave_count: u32, amplitude: f64, persistence: f64, seed: u32) -> Vec<f64> {
    let perlin = Perlin::new(seed);
    let mut samples = Vec::with_capacity(len);

    for i in 0..len {
        let x = i as f64 / len as f64;

        let mut total = 0.0;
        let mut total_amplitude = 0.0;
        let mut frequency = BASE_FREQUENCY;
        let mut octave_amplitude = amplitude;

        for octave in 0..octave_count {
            let raw = perlin.get([x * frequency, octave as f64 + 0.5]);
            let scaled_val = (raw + 1.0) / 2.0; // normalize to 0.0-1.0
            total += scaled_val * octave_amplitude;
            total_amplitude += octave_amplitude;

            frequency *= 2.0;
            octave_amplitude *= persistence;
        }

        samples.push((total / total_amplitude).clamp(0.0, 1.0));
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        MINUTES_PER_DAY, NOISE_AMPLITUDE, NOISE_OCTAVE_COUNT, NOISE_PERSISTENCE, NOISE_TABLE_SEED,
    };
    use approx::assert_abs_diff_eq;
    use more_asserts::assert_lt;

    fn default_table() -> Vec<f64> {
        daily_noise(
            MINUTES_PER_DAY as usize,
            NOISE_OCTAVE_COUNT,
            NOISE_AMPLITUDE,
            NOISE_PERSISTENCE,
            NOISE_TABLE_SEED,
        )
    }

    #[test]
    fn stays_in_unit_interval() {
        let table = default_table();
        assert_eq!(table.len(), 1440);
        for sample in table {
            assert!((0.0..=1.0).contains(&sample));
        }
    }

    #[test]
    fn same_seed_same_table() {
        let a = default_table();
        let b = default_table();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(x, y);
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let a = default_table();
        let b = daily_noise(
            MINUTES_PER_DAY as usize,
            NOISE_OCTAVE_COUNT,
            NOISE_AMPLITUDE,
            NOISE_PERSISTENCE,
            NOISE_TABLE_SEED + 1,
        );
        let identical = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
        assert_lt!(identical, a.len());
    }

    #[test]
    fn neighboring_minutes_change_smoothly() {
        let table = default_table();
        for window in table.windows(2) {
            assert_lt!((window[1] - window[0]).abs(), 0.1);
        }
    }
}

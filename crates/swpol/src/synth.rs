//! Forward model: synthetic detector traces from a known Stokes vector.
//!
//! Inverts the demodulation in [`extract_stokes`](crate::extract_stokes):
//! the intensity reaching the detector is a 2nd/4th-harmonic trig polynomial
//! of the waveplate angle ωt whose coefficients are retardance-weighted
//! combinations of the Stokes components. Deterministic given a seed, so
//! fixtures and round-trip tests are reproducible.

use std::f64::consts::{FRAC_PI_2, PI};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::math::linspace;
use crate::StokesVector;

/// Configuration for trace synthesis.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Multiplicative detector gain applied to the noiseless waveform.
    pub signal_level: f64,
    /// Standard deviation of per-sample additive Gaussian noise (volts).
    pub noise_level: f64,
    /// ADC quantization step in millivolts; zero disables quantization.
    pub quantization_mv: f64,
    /// Constant detector bias added after noise (volts).
    pub bias: f64,
    /// Waveplate retardance in radians.
    pub retardance: f64,
    /// Reference phase offset in waveplate revolutions.
    ///
    /// The extractor's `phase_offset` is in radians; a matched pair uses
    /// `phase_offset = 2π · phase_offset_rev`.
    pub phase_offset_rev: f64,
    /// RNG seed for reproducible noise.
    pub seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            signal_level: 1.0,
            noise_level: 0.0,
            quantization_mv: 0.0,
            bias: 0.0,
            retardance: FRAC_PI_2,
            phase_offset_rev: 0.0,
            seed: 0,
        }
    }
}

/// Evaluate the rotating-waveplate detector model at the given sample times.
///
/// Returns one voltage per entry of `times`. Gaussian noise of standard
/// deviation `noise_level` is added per sample from a `StdRng` seeded with
/// `config.seed`; with `quantization_mv > 0` the result is rounded to the
/// nearest quantization step (volts ↔ millivolts conversion included).
pub fn synthesize_trace(
    stokes: &StokesVector,
    angular_velocity: f64,
    times: &[f64],
    config: &SynthConfig,
) -> Vec<f64> {
    let [s0, s1, s2, s3] = stokes.0;
    let cd = config.retardance.cos();
    let sd = config.retardance.sin();

    let a = s0 / 2.0 + (1.0 + cd) * s1 / 4.0;
    let b = -s3 * sd / 2.0;
    let c = (1.0 - cd) * s1 / 4.0;
    let d = (1.0 - cd) * s2 / 4.0;

    let phase2 = 4.0 * PI * config.phase_offset_rev;
    let phase4 = 8.0 * PI * config.phase_offset_rev;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut trace = Vec::with_capacity(times.len());
    for &t in times {
        let wt = angular_velocity * t;
        let clean = a
            + b * (2.0 * wt - phase2).sin()
            + c * (4.0 * wt - phase4).cos()
            + d * (4.0 * wt - phase4).sin();
        let noise: f64 = rng.sample(StandardNormal);
        trace.push(clean * config.signal_level + config.noise_level * noise + config.bias);
    }

    if config.quantization_mv > 0.0 {
        for v in &mut trace {
            *v = (*v * 1000.0 / config.quantization_mv).round() * config.quantization_mv / 1000.0;
        }
    }

    trace
}

/// Uniform sample times covering one full rotation, endpoints included.
///
/// Matches the angular grid the extractor builds, so a chunk synthesized at
/// these times round-trips through demodulation.
pub fn rotation_times(angular_velocity: f64, n_samples: usize) -> Vec<f64> {
    linspace(0.0, 2.0 * PI / angular_velocity, n_samples)
}

//! Stokes-vector extraction by harmonic demodulation of one rotation chunk.
//!
//! A rotating waveplate in front of a fixed polarizer modulates the detected
//! intensity at the 2nd and 4th harmonics of the rotation frequency. A chunk
//! spanning exactly one rotation is demodulated by trapezoidal quadrature
//! against the harmonic basis; the Stokes components follow from
//! retardance-weighted combinations of the five integrals.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::diagnostics::Warning;
use crate::math::{rotation_grid, trapezoid, trapezoid_with};
use crate::{InputError, StokesVector};

/// Relative gate on the rejected 2nd-harmonic residual before a
/// misalignment warning is recorded.
const ALIGNMENT_RESIDUAL_GATE: f64 = 1e-3;

/// Sign applied to the reference phase offset inside the harmonic basis.
///
/// The two deployed wirings of the instrument disagree on which way the
/// reference offset enters the demodulation phase; both are selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetSign {
    /// Basis phase `θ − φ`.
    #[default]
    Subtract,
    /// Basis phase `θ + φ`.
    Add,
}

/// Configuration for Stokes extraction.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StokesConfig {
    /// Waveplate retardance in radians.
    ///
    /// Multiples of π make the demodulation singular (division by
    /// `1 − cos δ` or `sin δ`); callers must keep the retardance away from
    /// them or the output is non-finite.
    pub retardance: f64,
    /// Waveplate reference angle at the first chunk sample, in radians.
    pub phase_offset: f64,
    /// Which way `phase_offset` enters the harmonic basis.
    pub offset_sign: OffsetSign,
}

impl Default for StokesConfig {
    fn default() -> Self {
        Self {
            retardance: FRAC_PI_2,
            phase_offset: 0.0,
            offset_sign: OffsetSign::default(),
        }
    }
}

/// One demodulated rotation: the normalized state plus quality diagnostics.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StokesEstimate {
    /// Stokes vector normalized so that S0 = 1 (except in the degenerate
    /// zero-intensity case, where the raw components are kept).
    pub stokes: StokesVector,
    /// Total intensity before normalization.
    pub raw_intensity: f64,
    /// Residual integral at the rejected 2nd harmonic (cos 2θ term).
    pub alignment_residual: f64,
    /// Advisory warnings recorded during extraction.
    pub warnings: Vec<Warning>,
}

/// Demodulate one waveplate rotation of detector samples into a Stokes
/// vector.
///
/// The chunk is assumed to span exactly one rotation, angle 0 to 2π mapped
/// linearly across the sample index (the grid the trapezoidal quadrature is
/// evaluated on). The returned vector is normalized by its total intensity;
/// a zero raw intensity is substituted with 1 and recorded as
/// [`Warning::DegenerateNormalization`].
pub fn extract_stokes(
    chunk: &[f64],
    config: &StokesConfig,
) -> Result<StokesEstimate, InputError> {
    if chunk.len() < 2 {
        return Err(InputError::TooFewSamples {
            needed: 2,
            got: chunk.len(),
        });
    }
    if let Some((index, &value)) = chunk.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(InputError::NonFiniteSample { index, value });
    }

    let wt = rotation_grid(chunk.len());
    let phi = match config.offset_sign {
        OffsetSign::Subtract => config.phase_offset,
        OffsetSign::Add => -config.phase_offset,
    };

    let a0 = trapezoid(chunk, &wt) / (2.0 * PI);
    let n0 = trapezoid_with(chunk, &wt, |t| (2.0 * (t - phi)).cos()) / PI;
    let b0 = trapezoid_with(chunk, &wt, |t| (2.0 * (t - phi)).sin()) / PI;
    let c0 = trapezoid_with(chunk, &wt, |t| (4.0 * (t - phi)).cos()) / PI;
    let d0 = trapezoid_with(chunk, &wt, |t| (4.0 * (t - phi)).sin()) / PI;

    let cd = config.retardance.cos();
    let sd = config.retardance.sin();

    let s0 = 2.0 * (a0 - c0 * (1.0 + cd) / (1.0 - cd));
    let s1 = 4.0 * c0 / (1.0 - cd);
    let s2 = 4.0 * d0 / (1.0 - cd);
    let s3 = -2.0 * b0 / sd;

    let mut warnings = Vec::new();
    let norm = if s0 == 0.0 {
        warnings.push(Warning::DegenerateNormalization { raw_intensity: s0 }.logged());
        1.0
    } else {
        s0
    };

    let polarized_magnitude = (s1 * s1 + s2 * s2 + s3 * s3).sqrt();
    if n0 > ALIGNMENT_RESIDUAL_GATE * polarized_magnitude {
        warnings.push(
            Warning::Misalignment {
                residual: n0,
                polarized_magnitude,
            }
            .logged(),
        );
    }

    Ok(StokesEstimate {
        stokes: StokesVector([s0 / norm, s1 / norm, s2 / norm, s3 / norm]),
        raw_intensity: s0,
        alignment_residual: n0,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{rotation_times, synthesize_trace, SynthConfig};
    use approx::assert_relative_eq;

    const W0: f64 = 2.0 * PI * 40.0;

    fn assert_recovers(
        truth: StokesVector,
        synth_cfg: &SynthConfig,
        stokes_cfg: &StokesConfig,
    ) -> StokesEstimate {
        let times = rotation_times(W0, 2001);
        let chunk = synthesize_trace(&truth, W0, &times, synth_cfg);
        let est = extract_stokes(&chunk, stokes_cfg).expect("synthetic chunk is valid");
        for k in 0..4 {
            assert_relative_eq!(est.stokes.0[k], truth.0[k], epsilon = 1e-6);
        }
        est
    }

    #[test]
    fn recovers_synthesized_state() {
        let truth = StokesVector::new(1.0, 0.3, -0.2, 0.5);
        let est = assert_recovers(truth, &SynthConfig::default(), &StokesConfig::default());
        assert!(
            est.warnings.is_empty(),
            "clean round trip should not warn, got {:?}",
            est.warnings
        );
    }

    #[test]
    fn recovers_with_nonquarter_retardance() {
        let truth = StokesVector::new(1.0, -0.4, 0.1, 0.25);
        let synth_cfg = SynthConfig {
            retardance: 1.2,
            ..SynthConfig::default()
        };
        let stokes_cfg = StokesConfig {
            retardance: 1.2,
            ..StokesConfig::default()
        };
        assert_recovers(truth, &synth_cfg, &stokes_cfg);
    }

    #[test]
    fn recovers_with_matched_phase_offset() {
        let truth = StokesVector::new(1.0, 0.2, 0.4, -0.3);
        let offset_rev = 0.05;
        let synth_cfg = SynthConfig {
            phase_offset_rev: offset_rev,
            ..SynthConfig::default()
        };
        let stokes_cfg = StokesConfig {
            phase_offset: 2.0 * PI * offset_rev,
            ..StokesConfig::default()
        };
        assert_recovers(truth, &synth_cfg, &stokes_cfg);
    }

    #[test]
    fn added_offset_convention_recovers_mirrored_reference() {
        // A waveform synthesized with a *negative* reference offset carries
        // basis phase θ + φ, which is what the `Add` convention demodulates.
        let truth = StokesVector::new(1.0, 0.2, 0.4, -0.3);
        let offset_rev = 0.05;
        let synth_cfg = SynthConfig {
            phase_offset_rev: -offset_rev,
            ..SynthConfig::default()
        };
        let stokes_cfg = StokesConfig {
            phase_offset: 2.0 * PI * offset_rev,
            offset_sign: OffsetSign::Add,
            ..StokesConfig::default()
        };
        assert_recovers(truth, &synth_cfg, &stokes_cfg);
    }

    #[test]
    fn output_is_unit_normalized() {
        let truth = StokesVector::new(3.5, 0.9, -0.3, 0.6);
        let times = rotation_times(W0, 1501);
        let chunk = synthesize_trace(&truth, W0, &times, &SynthConfig::default());
        let est = extract_stokes(&chunk, &StokesConfig::default()).expect("valid chunk");
        assert_eq!(est.stokes.0[0], 1.0);
        assert_relative_eq!(est.raw_intensity, 3.5, epsilon = 1e-6);
    }

    #[test]
    fn zero_chunk_substitutes_unit_normalization() {
        let chunk = vec![0.0; 256];
        let est = extract_stokes(&chunk, &StokesConfig::default()).expect("valid chunk");
        assert_eq!(est.stokes.0, [0.0; 4]);
        assert_eq!(est.raw_intensity, 0.0);
        assert!(
            est.warnings
                .iter()
                .any(|w| matches!(w, Warning::DegenerateNormalization { .. })),
            "zero chunk must record the degenerate-normalization warning"
        );
    }

    #[test]
    fn residual_second_harmonic_records_misalignment() {
        // A pure cos 2θ component should be rejected by the basis; planting
        // one leaves the residual integral nonzero.
        let wt = crate::math::rotation_grid(1001);
        let chunk: Vec<f64> = wt.iter().map(|t| 1.0 + 0.5 * (2.0 * t).cos()).collect();
        let est = extract_stokes(&chunk, &StokesConfig::default()).expect("valid chunk");
        assert_relative_eq!(est.alignment_residual, 0.5, epsilon = 1e-6);
        assert!(
            est.warnings
                .iter()
                .any(|w| matches!(w, Warning::Misalignment { .. })),
            "expected a misalignment warning, got {:?}",
            est.warnings
        );
    }

    #[test]
    fn too_short_chunk_is_rejected() {
        let err = extract_stokes(&[1.0], &StokesConfig::default()).unwrap_err();
        assert_eq!(err, InputError::TooFewSamples { needed: 2, got: 1 });
    }

    #[test]
    fn non_finite_sample_is_rejected() {
        let chunk = vec![0.1, f64::NAN, 0.3];
        match extract_stokes(&chunk, &StokesConfig::default()) {
            Err(InputError::NonFiniteSample { index: 1, .. }) => (),
            other => panic!("expected NonFiniteSample at index 1, got {other:?}"),
        }
    }
}

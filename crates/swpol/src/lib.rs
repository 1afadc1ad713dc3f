//! swpol — Stokes polarimetry data reduction for rotating-waveplate traces.
//!
//! Reduces photodetector voltage traces recorded while a waveplate spins in
//! front of a fixed polarizer. The reduction stages are:
//!
//! 1. **Trigger** – rising-edge detection with hold-off on the rotation
//!    reference channel, segmenting a long trace into per-rotation chunks.
//! 2. **Stokes** – harmonic demodulation of one chunk (trapezoidal
//!    quadrature against the 2nd/4th-harmonic basis) into a Stokes vector.
//! 3. **Ellipse** – polarization-ellipse point synthesis from a Stokes
//!    vector for geometric inspection.
//! 4. **Synth** – forward model producing synthetic detector traces from a
//!    known state, for validation of the other stages.
//!
//! # Public API
//! The surface is intentionally small:
//! - [`extract_stokes`], [`find_triggers`], [`polarization_ellipse`] and
//!   [`synthesize_trace`] as the stage entry points
//! - [`reduce_trace`] composing trigger detection and per-rotation extraction
//! - per-stage config structs with `Default` impls for tuning
//!
//! All functions borrow their inputs and return freshly allocated outputs;
//! caller-owned data is never mutated. Numerical degeneracies are reported
//! as structured [`Warning`] values on the results (mirrored to `tracing`),
//! never as panics.

mod diagnostics;
mod ellipse;
mod math;
mod pipeline;
mod stokes;
mod synth;
mod trigger;

pub use diagnostics::Warning;
pub use ellipse::{polarization_ellipse, EllipseConfig, PolarizationEllipse};
pub use pipeline::{reduce_trace, ReduceConfig, RotationEstimate, TraceReduction};
pub use stokes::{extract_stokes, OffsetSign, StokesConfig, StokesEstimate};
pub use synth::{rotation_times, synthesize_trace, SynthConfig};
pub use trigger::{find_triggers, TriggerConfig};

// ── Error type ─────────────────────────────────────────────────────────────

/// Structurally invalid inputs rejected at the API boundary.
///
/// Numerical degeneracies (zero normalization, out-of-range components) are
/// *not* errors; they follow the substitute-and-warn policy and surface as
/// [`Warning`] values instead.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// Too few waveform samples for the requested operation.
    TooFewSamples { needed: usize, got: usize },
    /// A waveform sample is NaN or infinite.
    NonFiniteSample { index: usize, value: f64 },
    /// Too few ellipse points requested.
    TooFewPoints { needed: usize, got: usize },
    /// Detector and trigger traces differ in length.
    MismatchedLengths { signal: usize, trigger: usize },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewSamples { needed, got } => {
                write!(f, "too few samples: need {}, got {}", needed, got)
            }
            Self::NonFiniteSample { index, value } => {
                write!(f, "non-finite sample {} at index {}", value, index)
            }
            Self::TooFewPoints { needed, got } => {
                write!(f, "too few ellipse points: need {}, got {}", needed, got)
            }
            Self::MismatchedLengths { signal, trigger } => {
                write!(
                    f,
                    "trace length mismatch: detector {}, trigger {}",
                    signal, trigger
                )
            }
        }
    }
}

impl std::error::Error for InputError {}

// ── Types ──────────────────────────────────────────────────────────────────

/// Stokes 4-vector `(S0, S1, S2, S3)` describing a beam's intensity and
/// polarization state.
///
/// `S0` is the total intensity; `S1`, `S2`, `S3` are the horizontal/vertical,
/// diagonal and circular polarized components. Stored as `[S0, S1, S2, S3]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StokesVector(pub [f64; 4]);

impl StokesVector {
    /// Build from the four components.
    pub const fn new(s0: f64, s1: f64, s2: f64, s3: f64) -> Self {
        Self([s0, s1, s2, s3])
    }

    /// Total intensity `S0`.
    pub fn intensity(&self) -> f64 {
        self.0[0]
    }

    /// Magnitude of the polarized part, `√(S1² + S2² + S3²)`.
    pub fn polarized_magnitude(&self) -> f64 {
        let [_, s1, s2, s3] = self.0;
        (s1 * s1 + s2 * s2 + s3 * s3).sqrt()
    }

    /// Degree of polarization, `√(S1² + S2² + S3²) / S0`.
    ///
    /// At most 1 for a physical state; larger values are noise artifacts.
    pub fn degree_of_polarization(&self) -> f64 {
        self.polarized_magnitude() / self.intensity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn stokes_accessors() {
        let s = StokesVector::new(2.0, 0.6, 0.0, 0.8);
        assert_relative_eq!(s.intensity(), 2.0);
        assert_relative_eq!(s.polarized_magnitude(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.degree_of_polarization(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn input_error_messages_embed_payloads() {
        let msg = InputError::TooFewSamples { needed: 2, got: 1 }.to_string();
        assert!(msg.contains('2') && msg.contains('1'), "got: {msg}");

        let msg = InputError::MismatchedLengths {
            signal: 10,
            trigger: 8,
        }
        .to_string();
        assert!(msg.contains("10") && msg.contains('8'), "got: {msg}");
    }
}

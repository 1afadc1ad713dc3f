//! Structured reduction warnings.
//!
//! Numerical degeneracies never abort a reduction: the affected quantity is
//! substituted (unit normalization, sign-clipped component) and a [`Warning`]
//! is recorded on the result so callers and tests can assert on it. Each
//! warning is also mirrored to `tracing` when recorded.

/// Advisory diagnostic attached to a reduction result.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Warning {
    /// Raw total intensity was zero; the estimate was normalized by 1
    /// instead of dividing by S0.
    DegenerateNormalization {
        /// Total intensity before normalization.
        raw_intensity: f64,
    },
    /// Large residual at the rejected 2nd harmonic. The demodulation basis
    /// should leave cos 2θ empty; energy there indicates waveplate or
    /// detector misalignment. Informational only.
    Misalignment {
        /// cos 2θ residual integral.
        residual: f64,
        /// Magnitude of the polarized part the residual was gated against.
        polarized_magnitude: f64,
    },
    /// A normalized Stokes component exceeded unit magnitude (a noise
    /// artifact) and was clipped to ±1.
    ComponentClipped {
        /// Component index (0 = S0 … 3 = S3).
        component: usize,
        /// Offending value before clipping.
        value: f64,
    },
}

impl Warning {
    /// Mirror the warning to `tracing` and hand it back, so call sites can
    /// write `warnings.push(w.logged())`.
    pub(crate) fn logged(self) -> Self {
        match self {
            Self::DegenerateNormalization { raw_intensity } => {
                tracing::warn!(
                    "zero total intensity (raw S0 = {}); substituting unit normalization",
                    raw_intensity
                );
            }
            Self::Misalignment {
                residual,
                polarized_magnitude,
            } => {
                tracing::warn!(
                    "large cos(2w) residual {} vs polarized magnitude {}; check alignment",
                    residual,
                    polarized_magnitude
                );
            }
            Self::ComponentClipped { component, value } => {
                tracing::warn!("S[{}] = {} exceeds unit magnitude; clipping", component, value);
            }
        }
        self
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DegenerateNormalization { raw_intensity } => {
                write!(f, "degenerate normalization (raw S0 = {})", raw_intensity)
            }
            Self::Misalignment { residual, .. } => {
                write!(f, "alignment residual {} at the 2nd harmonic", residual)
            }
            Self::ComponentClipped { component, value } => {
                write!(f, "component S{} clipped from {}", component, value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_embeds_context_values() {
        let msg = Warning::ComponentClipped {
            component: 1,
            value: 1.5,
        }
        .to_string();
        assert!(msg.contains("S1") && msg.contains("1.5"), "got: {msg}");
    }

    #[test]
    fn warnings_serialize_with_payloads() {
        let w = Warning::DegenerateNormalization { raw_intensity: 0.0 };
        let json = serde_json::to_string(&w).expect("warning should serialize");
        assert!(
            json.contains("degenerate_normalization"),
            "snake_case tag expected, got: {json}"
        );
    }
}

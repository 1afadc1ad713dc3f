//! Trace-reduction orchestration: triggers → per-rotation chunks → Stokes.

use crate::stokes::{extract_stokes, StokesConfig, StokesEstimate};
use crate::trigger::{find_triggers, TriggerConfig};
use crate::InputError;

/// Configuration for full-trace reduction.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReduceConfig {
    /// Trigger detection on the rotation reference channel.
    pub trigger: TriggerConfig,
    /// Per-rotation Stokes extraction.
    pub stokes: StokesConfig,
}

/// One reduced rotation: its chunk bounds and demodulated state.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RotationEstimate {
    /// First sample index of the rotation chunk (at its trigger).
    pub start: usize,
    /// Last sample index of the chunk, inclusive (the next trigger).
    pub end: usize,
    /// Demodulated polarization state for this rotation.
    pub estimate: StokesEstimate,
}

/// Reduction of a full multi-rotation acquisition.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TraceReduction {
    /// Per-rotation estimates in trace order.
    pub rotations: Vec<RotationEstimate>,
    /// Trigger indices found on the reference channel.
    pub triggers: Vec<usize>,
}

/// Reduce a detector trace against its rotation reference channel.
///
/// Finds rotation triggers, slices the detector trace between consecutive
/// triggers (both boundary samples included, so each chunk spans the full
/// 0..2π angular grid) and demodulates each chunk. Fewer than two triggers
/// yields an empty reduction, not an error.
pub fn reduce_trace(
    signal: &[f64],
    trigger_trace: &[f64],
    config: &ReduceConfig,
) -> Result<TraceReduction, InputError> {
    if signal.len() != trigger_trace.len() {
        return Err(InputError::MismatchedLengths {
            signal: signal.len(),
            trigger: trigger_trace.len(),
        });
    }

    let triggers = find_triggers(trigger_trace, &config.trigger);
    let mut rotations = Vec::with_capacity(triggers.len().saturating_sub(1));
    for pair in triggers.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let estimate = extract_stokes(&signal[start..=end], &config.stokes)?;
        rotations.push(RotationEstimate {
            start,
            end,
            estimate,
        });
    }
    tracing::info!(
        "{} rotation(s) reduced from {} trigger(s)",
        rotations.len(),
        triggers.len()
    );
    Ok(TraceReduction {
        rotations,
        triggers,
    })
}

//! Rotation-trigger detection on the reference channel.
//!
//! The instrument marks each waveplate rotation with a voltage step on a
//! dedicated channel. Rising edges on that channel segment the detector
//! trace into the per-rotation chunks consumed by the Stokes extractor.

/// Configuration for rising-edge trigger detection.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Minimum forward difference `trace[i+1] − trace[i]` for an edge
    /// (strictly greater-than).
    pub threshold: f64,
    /// Hold-off window in samples after a recorded edge; zero disables
    /// suppression. Choose it shorter than a rotation period or real
    /// triggers are swallowed.
    pub debounce: usize,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            debounce: 0,
        }
    }
}

/// Scan a trigger-channel trace for rising edges.
///
/// Returns the indices `i` where `trace[i+1] − trace[i] > threshold` while
/// the hold-off counter is idle, in ascending order. The counter decays by
/// one per sample and is re-armed to `debounce` after each recorded edge, so
/// consecutive triggers are separated by at least `debounce` samples and the
/// first edge of a burst wins. Traces shorter than two samples have no
/// edges.
pub fn find_triggers(trace: &[f64], config: &TriggerConfig) -> Vec<usize> {
    let mut triggers = Vec::new();
    let mut holdoff = 0usize;
    for i in 0..trace.len().saturating_sub(1) {
        holdoff = holdoff.saturating_sub(1);
        if trace[i + 1] - trace[i] > config.threshold && holdoff == 0 {
            triggers.push(i);
            holdoff = config.debounce;
        }
    }
    tracing::debug!("{} trigger(s) found", triggers.len());
    triggers
}

//! Polarization-ellipse synthesis from a Stokes vector.
//!
//! The tip of the electric-field vector of a polarized beam traces an
//! ellipse whose orientation ψ and ellipticity χ follow from the normalized
//! Stokes components. Points are generated over both branches of the rotated
//! ellipse in one continuous boundary traversal, then shrunk by the degree
//! of polarization so partially polarized states draw smaller figures.

use crate::diagnostics::Warning;
use crate::math::linspace;
use crate::{InputError, StokesVector};

/// Configuration for ellipse point generation.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EllipseConfig {
    /// Points per branch; the output traversal holds `2 * n_points`
    /// coordinates.
    pub n_points: usize,
    /// Rescale the polarized part to unit magnitude before computing the
    /// shape angles. The final DOP scaling of the coordinates is applied
    /// either way.
    pub scale_by_dop: bool,
}

impl Default for EllipseConfig {
    fn default() -> Self {
        Self {
            n_points: 200,
            scale_by_dop: true,
        }
    }
}

/// Polarization-ellipse boundary points plus the shape parameters behind
/// them.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PolarizationEllipse {
    /// x coordinates of the boundary traversal (`2 * n_points` values).
    pub x: Vec<f64>,
    /// y coordinates of the boundary traversal (`2 * n_points` values).
    pub y: Vec<f64>,
    /// Orientation angle ψ of the major axis, radians.
    pub orientation: f64,
    /// Ellipticity angle χ, radians.
    pub ellipticity: f64,
    /// Degree of polarization used for the final coordinate scaling.
    pub degree_of_polarization: f64,
    /// Advisory warnings recorded during generation.
    pub warnings: Vec<Warning>,
}

/// Generate the polarization ellipse traced by a Stokes vector.
///
/// The input is normalized by its first component (zero intensity gets the
/// same substitute-and-warn policy as extraction); components pushed past
/// unit magnitude by noise are clipped to their sign with a recorded
/// [`Warning::ComponentClipped`]. The boundary is traversed upper branch
/// first in increasing x, then lower branch in decreasing x, so consecutive
/// points stay adjacent on the curve and no chord crosses the interior.
///
/// A fully unpolarized input (zero degree of polarization) has no defined
/// shape angles when `scale_by_dop` is set and yields non-finite
/// coordinates; callers should gate on
/// [`StokesVector::degree_of_polarization`] first.
pub fn polarization_ellipse(
    stokes: &StokesVector,
    config: &EllipseConfig,
) -> Result<PolarizationEllipse, InputError> {
    if config.n_points < 2 {
        return Err(InputError::TooFewPoints {
            needed: 2,
            got: config.n_points,
        });
    }

    let mut warnings = Vec::new();
    let [s0, s1, s2, s3] = stokes.0;
    let norm = if s0 == 0.0 {
        warnings.push(Warning::DegenerateNormalization { raw_intensity: s0 }.logged());
        1.0
    } else {
        s0
    };
    let mut s = [s0 / norm, s1 / norm, s2 / norm, s3 / norm];

    // DOP from the normalized, pre-clip components.
    let dop = (s[1] * s[1] + s[2] * s[2] + s[3] * s[3]).sqrt();

    for (k, component) in s.iter_mut().enumerate() {
        if component.abs() > 1.0 {
            warnings.push(
                Warning::ComponentClipped {
                    component: k,
                    value: *component,
                }
                .logged(),
            );
            *component = component.signum();
        }
    }

    let (p1, p2, p3) = if config.scale_by_dop {
        (s[1] / dop, s[2] / dop, s[3] / dop)
    } else {
        (s[1], s[2], s[3])
    };

    let orientation = 0.5 * p2.atan2(p1);
    let ellipticity = 0.5 * p3.asin();

    // Unrotated ellipse with semi-major axis 1 along x; branch height
    // ba·√(1 − x²) with ba = tan χ.
    let ba = ellipticity.tan();
    let (sin_psi, cos_psi) = orientation.sin_cos();

    let n = config.n_points;
    let xs = linspace(-1.0, 1.0, n);
    let mut upper = Vec::with_capacity(n);
    let mut lower = Vec::with_capacity(n);
    for &x in &xs {
        // The grid ends can overshoot ±1 by one ulp; clamp the radicand.
        let h = ba * (1.0 - x * x).max(0.0).sqrt();
        upper.push(rotate(x, h, cos_psi, sin_psi));
        lower.push(rotate(x, -h, cos_psi, sin_psi));
    }

    let mut x_out = Vec::with_capacity(2 * n);
    let mut y_out = Vec::with_capacity(2 * n);
    for &[px, py] in upper.iter().chain(lower.iter().rev()) {
        x_out.push(px * dop);
        y_out.push(py * dop);
    }

    Ok(PolarizationEllipse {
        x: x_out,
        y: y_out,
        orientation,
        ellipticity,
        degree_of_polarization: dop,
        warnings,
    })
}

/// Rotate `(x, y)` by ψ about the origin.
#[inline]
fn rotate(x: f64, y: f64, cos_psi: f64, sin_psi: f64) -> [f64; 2] {
    [x * cos_psi - y * sin_psi, x * sin_psi + y * cos_psi]
}

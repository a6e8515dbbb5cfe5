//! Raw projection formulas on the unit sphere.
//!
//! Inputs are rotated longitude/latitude in radians; outputs are planar
//! coordinates with y pointing up.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4};

/// Latitude where Mercator's square world ends (`atan(sinh(pi))`).
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_779_806_59;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RawProjection {
    ConicEqualArea { n: f64, c: f64, r0: f64 },
    Orthographic,
    NaturalEarth,
    Stereographic,
    Gnomonic,
    Mercator,
}

impl RawProjection {
    /// Albers-style conic equal-area with standard parallels in degrees.
    pub fn conic_equal_area(parallel0: f64, parallel1: f64) -> Self {
        let sy0 = parallel0.to_radians().sin();
        let n = (sy0 + parallel1.to_radians().sin()) / 2.0;
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        RawProjection::ConicEqualArea {
            n,
            c,
            r0: c.sqrt() / n,
        }
    }

    /// Default parallels 0° and 60°.
    pub fn conic_equal_area_default() -> Self {
        Self::conic_equal_area(0.0, FRAC_PI_3.to_degrees())
    }

    /// Angular radius (degrees) of the visible cap for azimuthal projections.
    pub fn clip_angle(&self) -> Option<f64> {
        match self {
            RawProjection::Orthographic => Some(90.0),
            RawProjection::Stereographic => Some(142.0),
            RawProjection::Gnomonic => Some(60.0),
            _ => None,
        }
    }

    pub fn is_azimuthal(&self) -> bool {
        self.clip_angle().is_some()
    }

    pub fn forward(&self, lambda: f64, phi: f64) -> Option<[f64; 2]> {
        let xy = match *self {
            RawProjection::ConicEqualArea { n, c, r0 } => {
                let r = (c - 2.0 * n * phi.sin()).max(0.0).sqrt() / n;
                let x = lambda * n;
                [r * x.sin(), r0 - r * x.cos()]
            }
            RawProjection::Orthographic => {
                let cy = phi.cos();
                [cy * lambda.sin(), phi.sin()]
            }
            RawProjection::NaturalEarth => {
                let phi2 = phi * phi;
                let phi4 = phi2 * phi2;
                [
                    lambda
                        * (0.8707 - 0.131979 * phi2
                            + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4))),
                    phi * (1.007226
                        + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4))),
                ]
            }
            RawProjection::Stereographic => {
                let cy = phi.cos();
                let k = 1.0 + lambda.cos() * cy;
                if k <= f64::EPSILON {
                    return None;
                }
                [cy * lambda.sin() / k, phi.sin() / k]
            }
            RawProjection::Gnomonic => {
                let cy = phi.cos();
                let k = lambda.cos() * cy;
                if k <= f64::EPSILON {
                    return None;
                }
                [cy * lambda.sin() / k, phi.sin() / k]
            }
            RawProjection::Mercator => {
                let max = MERCATOR_MAX_LAT_DEG.to_radians();
                let phi = phi.clamp(-max, max);
                [lambda, (FRAC_PI_4 + phi / 2.0).tan().ln()]
            }
        };
        if xy[0].is_finite() && xy[1].is_finite() {
            Some(xy)
        } else {
            None
        }
    }

    /// Whether rotated `(lambda, phi)` lies inside the drawable domain.
    pub fn is_visible(&self, lambda: f64, phi: f64) -> bool {
        match self.clip_angle() {
            Some(angle) => phi.cos() * lambda.cos() >= angle.to_radians().cos() - 1e-9,
            None => phi.abs() <= FRAC_PI_2 + 1e-9,
        }
    }
}

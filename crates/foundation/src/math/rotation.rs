use std::f64::consts::{PI, TAU};

/// Three-axis rotation of the sphere.
///
/// Angles follow the `[lambda, phi, gamma]` convention: `lambda` spins around
/// the polar axis (added to longitude), then `phi` tilts around the
/// y axis (moves latitude), then `gamma` rolls around the view axis. To bring
/// a point `[lon, lat]` to the center of a view, rotate by `[-lon, -lat]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rotation {
    lambda: f64,
    phi: f64,
    gamma: f64,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Rotation {
    pub fn identity() -> Self {
        Self {
            lambda: 0.0,
            phi: 0.0,
            gamma: 0.0,
        }
    }

    pub fn from_degrees(lambda: f64, phi: f64, gamma: f64) -> Self {
        Self {
            lambda: lambda.to_radians(),
            phi: phi.to_radians(),
            gamma: gamma.to_radians(),
        }
    }

    /// Rotation that moves `center` (`[lon, lat]` degrees) to `[0, 0]`.
    pub fn centering(center: [f64; 2]) -> Self {
        Self::from_degrees(-center[0], -center[1], 0.0)
    }

    pub fn degrees(&self) -> [f64; 3] {
        [
            self.lambda.to_degrees(),
            self.phi.to_degrees(),
            self.gamma.to_degrees(),
        ]
    }

    /// Rotates `(lon, lat)` given in radians.
    pub fn apply(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lon = wrap_pi(lon + self.lambda);
        if self.phi == 0.0 && self.gamma == 0.0 {
            return (lon, lat);
        }
        let (sin_dp, cos_dp) = self.phi.sin_cos();
        let (sin_dg, cos_dg) = self.gamma.sin_cos();

        let cos_lat = lat.cos();
        let x = lon.cos() * cos_lat;
        let y = lon.sin() * cos_lat;
        let z = lat.sin();
        let k = z * cos_dp + x * sin_dp;
        (
            (y * cos_dg - k * sin_dg).atan2(x * cos_dp - z * sin_dp),
            clamped_asin(k * cos_dg + y * sin_dg),
        )
    }

    /// Inverse of [`Rotation::apply`].
    pub fn invert(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (lon, lat) = if self.phi == 0.0 && self.gamma == 0.0 {
            (lon, lat)
        } else {
            let (sin_dp, cos_dp) = self.phi.sin_cos();
            let (sin_dg, cos_dg) = self.gamma.sin_cos();

            let cos_lat = lat.cos();
            let x = lon.cos() * cos_lat;
            let y = lon.sin() * cos_lat;
            let z = lat.sin();
            let k = z * cos_dg - y * sin_dg;
            (
                (y * cos_dg + z * sin_dg).atan2(x * cos_dp + k * sin_dp),
                clamped_asin(k * cos_dp - x * sin_dp),
            )
        };
        (wrap_pi(lon - self.lambda), lat)
    }
}

fn wrap_pi(lon: f64) -> f64 {
    if lon > PI {
        lon - TAU
    } else if lon < -PI {
        lon + TAU
    } else {
        lon
    }
}

fn clamped_asin(v: f64) -> f64 {
    v.clamp(-1.0, 1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::Rotation;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn centering_moves_point_to_origin() {
        let center = [-122.4, 37.8];
        let r = Rotation::centering(center);
        let (lon, lat) = r.apply(center[0].to_radians(), center[1].to_radians());
        assert_close(lon, 0.0, 1e-12);
        assert_close(lat, 0.0, 1e-12);
    }

    #[test]
    fn axis_order_is_longitude_then_latitude() {
        // Swapping the two angles would move the centroid somewhere else.
        let r = Rotation::from_degrees(37.8, -122.4, 0.0);
        let (lon, lat) = r.apply((-122.4f64).to_radians(), 37.8f64.to_radians());
        assert!(lon.abs() > 1e-3 || lat.abs() > 1e-3);
    }

    #[test]
    fn invert_round_trips() {
        let r = Rotation::from_degrees(40.0, -25.0, 10.0);
        let (lon, lat) = (1.1, -0.4);
        let (rl, rp) = r.apply(lon, lat);
        let (il, ip) = r.invert(rl, rp);
        assert_close(il, lon, 1e-12);
        assert_close(ip, lat, 1e-12);
    }

    #[test]
    fn identity_wraps_longitude_only() {
        let r = Rotation::from_degrees(90.0, 0.0, 0.0);
        let (lon, lat) = r.apply(170f64.to_radians(), 0.3);
        assert_close(lon.to_degrees(), -100.0, 1e-9);
        assert_close(lat, 0.3, 0.0);
        assert_eq!(Rotation::identity().degrees(), [0.0, 0.0, 0.0]);
    }
}

//! Spherical geometry on the unit sphere.
//!
//! Positions are `[longitude, latitude]` pairs in degrees, the same order
//! GeoJSON uses. Cartesian vectors use x towards (0°, 0°), y towards
//! (90°E, 0°) and z towards the north pole.

use super::Vec3;

/// Numerical tolerance for "same point" / "degenerate" checks (radians).
pub const EPSILON: f64 = 1e-9;

pub fn lon_lat_to_unit(lon_deg: f64, lat_deg: f64) -> Vec3 {
    let lon = lon_deg.to_radians();
    let lat = lat_deg.to_radians();
    let cos_lat = lat.cos();
    Vec3::new(cos_lat * lon.cos(), cos_lat * lon.sin(), lat.sin())
}

pub fn position_to_unit(p: [f64; 2]) -> Vec3 {
    lon_lat_to_unit(p[0], p[1])
}

/// Inverse of [`lon_lat_to_unit`]. The vector need not be normalized.
pub fn unit_to_lon_lat(v: Vec3) -> [f64; 2] {
    let lon = v.y.atan2(v.x).to_degrees();
    let lat = v.z.atan2((v.x * v.x + v.y * v.y).sqrt()).to_degrees();
    [lon, lat]
}

/// Great-circle distance between two unit vectors (radians).
pub fn angular_distance(a: Vec3, b: Vec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}

/// Point at fraction `t` along the great-circle arc from `a` to `b`.
pub fn interpolate(a: Vec3, b: Vec3, t: f64) -> Vec3 {
    let omega = angular_distance(a, b);
    if omega < EPSILON {
        return a;
    }
    let sin_omega = omega.sin();
    if sin_omega.abs() < EPSILON {
        // Antipodal endpoints: any great circle works, fall back to a lerp.
        return (a.scale(1.0 - t) + b.scale(t)).normalized().unwrap_or(a);
    }
    let wa = ((1.0 - t) * omega).sin() / sin_omega;
    let wb = (t * omega).sin() / sin_omega;
    a.scale(wa) + b.scale(wb)
}

/// Signed spherical excess of triangle `abc`.
///
/// Positive when the vertices turn counter-clockwise seen from outside the
/// sphere.
pub fn spherical_triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f64 {
    let numerator = a.dot(b.cross(c));
    let denominator = 1.0 + a.dot(b) + b.dot(c) + c.dot(a);
    2.0 * numerator.atan2(denominator)
}

/// Area-weighted centroid accumulator over polygon rings.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CentroidAccumulator {
    weighted: Vec3,
    weight: f64,
    vertices: Vec3,
    vertex_count: usize,
}

impl Default for CentroidAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl CentroidAccumulator {
    pub fn new() -> Self {
        Self {
            weighted: Vec3::ZERO,
            weight: 0.0,
            vertices: Vec3::ZERO,
            vertex_count: 0,
        }
    }

    /// Adds one ring, fanned into triangles from its first vertex.
    pub fn add_ring(&mut self, ring: &[[f64; 2]]) {
        let points: Vec<Vec3> = ring.iter().map(|p| position_to_unit(*p)).collect();
        let open = match points.split_last() {
            Some((last, rest)) if !rest.is_empty() && angular_distance(*last, rest[0]) < EPSILON => {
                rest
            }
            _ => points.as_slice(),
        };
        for v in open {
            self.vertices += *v;
            self.vertex_count += 1;
        }
        if open.len() < 3 {
            return;
        }
        let origin = open[0];
        for pair in open[1..].windows(2) {
            let area = spherical_triangle_area(origin, pair[0], pair[1]);
            if let Some(mid) = (origin + pair[0] + pair[1]).normalized() {
                self.weighted += mid.scale(area);
                self.weight += area;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    /// Centroid as `[lon, lat]`, or `None` if nothing was accumulated.
    ///
    /// Degenerate (zero-area) input falls back to the mean vertex direction.
    pub fn centroid(&self) -> Option<[f64; 2]> {
        if self.weight.abs() > EPSILON {
            if let Some(v) = self.weighted.scale(1.0 / self.weight).normalized() {
                return Some(unit_to_lon_lat(v));
            }
        }
        if self.vertex_count == 0 {
            return None;
        }
        self.vertices.normalized().map(unit_to_lon_lat)
    }
}

/// Closed ring approximating the small circle of `radius_deg` around `center`.
///
/// The ring runs clockwise seen from outside the sphere, the same winding used
/// for cell boundaries. A zero radius yields a degenerate ring on the center.
pub fn small_circle(center: [f64; 2], radius_deg: f64, step_deg: f64) -> Vec<[f64; 2]> {
    let c = position_to_unit(center);
    let pole = Vec3::new(0.0, 0.0, 1.0);
    let east = pole
        .cross(c)
        .normalized()
        .unwrap_or(Vec3::new(0.0, 1.0, 0.0));
    let north = c.cross(east);

    let r = radius_deg.to_radians();
    let (sin_r, cos_r) = r.sin_cos();
    let step = step_deg.abs().max(0.1);
    let steps = (360.0 / step).ceil() as usize;

    let mut ring = Vec::with_capacity(steps + 1);
    for i in 0..steps {
        let t = -(i as f64 * 360.0 / steps as f64).to_radians();
        let dir = east.scale(t.cos()) + north.scale(t.sin());
        ring.push(unit_to_lon_lat(c.scale(cos_r) + dir.scale(sin_r)));
    }
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

/// Width in degrees of the smallest longitude interval covering all `lons`.
///
/// Handles sets straddling the antimeridian: `[179, -179]` spans 2°, not 358°.
pub fn longitude_extent(lons: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = lons
        .iter()
        .filter(|l| l.is_finite())
        .map(|l| normalize_longitude(*l))
        .collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut largest_gap = sorted[0] + 360.0 - sorted[sorted.len() - 1];
    for pair in sorted.windows(2) {
        largest_gap = largest_gap.max(pair[1] - pair[0]);
    }
    Some((360.0 - largest_gap).max(0.0))
}

/// Wraps a longitude into `[-180, 180)`.
pub fn normalize_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn unit_round_trip() {
        let p = unit_to_lon_lat(lon_lat_to_unit(-73.5, 45.25));
        assert_close(p[0], -73.5, 1e-9);
        assert_close(p[1], 45.25, 1e-9);
    }

    #[test]
    fn quarter_circle_distance() {
        let a = lon_lat_to_unit(0.0, 0.0);
        let b = lon_lat_to_unit(90.0, 0.0);
        assert_close(angular_distance(a, b), std::f64::consts::FRAC_PI_2, 1e-12);
        let mid = unit_to_lon_lat(interpolate(a, b, 0.5));
        assert_close(mid[0], 45.0, 1e-9);
        assert_close(mid[1], 0.0, 1e-9);
    }

    #[test]
    fn octant_triangle_is_an_eighth_of_the_sphere() {
        let a = lon_lat_to_unit(0.0, 0.0);
        let b = lon_lat_to_unit(90.0, 0.0);
        let c = lon_lat_to_unit(0.0, 90.0);
        assert_close(spherical_triangle_area(a, b, c), std::f64::consts::FRAC_PI_2, 1e-12);
        assert_close(spherical_triangle_area(a, c, b), -std::f64::consts::FRAC_PI_2, 1e-12);
    }

    #[test]
    fn centroid_is_independent_of_winding() {
        let ring = vec![[10.0, 10.0], [20.0, 10.0], [20.0, 20.0], [10.0, 20.0], [10.0, 10.0]];
        let mut reversed = ring.clone();
        reversed.reverse();

        let mut ccw = CentroidAccumulator::new();
        ccw.add_ring(&ring);
        let mut cw = CentroidAccumulator::new();
        cw.add_ring(&reversed);

        let a = ccw.centroid().unwrap();
        let b = cw.centroid().unwrap();
        assert_close(a[0], 15.0, 0.1);
        assert_close(a[1], 15.0, 0.3);
        assert_close(a[0], b[0], 1e-9);
        assert_close(a[1], b[1], 1e-9);
    }

    #[test]
    fn empty_accumulator_has_no_centroid() {
        assert!(CentroidAccumulator::new().centroid().is_none());
    }

    #[test]
    fn small_circle_points_lie_at_radius() {
        let center = [30.0, 60.0];
        let ring = small_circle(center, 12.5, 6.0);
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring.len(), 61);
        let c = position_to_unit(center);
        for p in &ring {
            let d = angular_distance(c, position_to_unit(*p)).to_degrees();
            assert_close(d, 12.5, 1e-9);
        }
    }

    #[test]
    fn small_circle_is_clockwise() {
        let ring = small_circle([0.0, 0.0], 10.0, 10.0);
        let c = lon_lat_to_unit(0.0, 0.0);
        let a = position_to_unit(ring[0]);
        let b = position_to_unit(ring[1]);
        assert!(spherical_triangle_area(c, a, b) < 0.0);
    }

    #[test]
    fn longitude_extent_wraps_antimeridian() {
        assert_close(longitude_extent(&[179.0, -179.0]).unwrap(), 2.0, 1e-12);
        assert_close(longitude_extent(&[-10.0, 10.0, 5.0]).unwrap(), 20.0, 1e-12);
        assert_close(longitude_extent(&[42.0]).unwrap(), 0.0, 1e-12);
        assert!(longitude_extent(&[]).is_none());
    }

    #[test]
    fn normalize_longitude_range() {
        assert_close(normalize_longitude(190.0), -170.0, 1e-12);
        assert_close(normalize_longitude(-180.0), -180.0, 1e-12);
        assert_close(normalize_longitude(180.0), -180.0, 1e-12);
        assert_close(normalize_longitude(-540.0), -180.0, 1e-12);
    }
}

use std::fmt::Write as _;

use formats::GeoObject;

use crate::projection::{PathSink, Projection};

/// Radius of the circle drawn for point geometries.
pub const POINT_RADIUS: f64 = 4.5;

/// Renders geographic objects to SVG path data through a [`Projection`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPath {
    projection: Projection,
}

impl GeoPath {
    pub fn new(projection: Projection) -> Self {
        Self { projection }
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// SVG `d` attribute for `object`. Empty when nothing is visible.
    pub fn path<T: GeoObject + ?Sized>(&self, object: &T) -> String {
        let mut sink = SvgPathSink::default();
        self.projection.stream(object, &mut sink);
        sink.finish()
    }
}

#[derive(Debug, Default)]
struct SvgPathSink {
    out: String,
}

impl SvgPathSink {
    fn finish(self) -> String {
        self.out
    }

    fn push(&mut self, command: char, p: [f64; 2]) {
        // Writing into a String cannot fail.
        let _ = write!(self.out, "{command}{},{}", fmt_coord(p[0]), fmt_coord(p[1]));
    }
}

impl PathSink for SvgPathSink {
    fn move_to(&mut self, p: [f64; 2]) {
        self.push('M', p);
    }

    fn line_to(&mut self, p: [f64; 2]) {
        self.push('L', p);
    }

    fn close(&mut self) {
        self.out.push('Z');
    }

    fn point(&mut self, p: [f64; 2]) {
        let r = fmt_coord(POINT_RADIUS);
        let d = fmt_coord(2.0 * POINT_RADIUS);
        self.push('M', [p[0], p[1] - POINT_RADIUS]);
        let _ = write!(self.out, "a{r},{r} 0 1,1 0,{d}a{r},{r} 0 1,1 0,-{d}Z");
    }
}

/// Three decimals, trailing zeros trimmed, no negative zero.
fn fmt_coord(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let mut s = format!("{rounded:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::{GeoPath, fmt_coord};
    use crate::projection::Projection;
    use crate::raw::RawProjection;
    use formats::{Feature, FeatureCollection, Geometry};
    use pretty_assertions::assert_eq;

    fn square(lon: f64, lat: f64, size: f64) -> Geometry {
        Geometry::Polygon(vec![vec![
            [lon, lat],
            [lon, lat + size],
            [lon + size, lat + size],
            [lon + size, lat],
            [lon, lat],
        ]])
    }

    #[test]
    fn coordinates_are_compact() {
        assert_eq!(fmt_coord(12.0), "12");
        assert_eq!(fmt_coord(1.23456), "1.235");
        assert_eq!(fmt_coord(-0.0001), "0");
        assert_eq!(fmt_coord(-2.5), "-2.5");
    }

    #[test]
    fn sphere_is_a_single_closed_ring() {
        let path = GeoPath::new(
            Projection::new(RawProjection::Orthographic).fit_size([100.0, 100.0], &Geometry::Sphere),
        );
        let d = path.path(&Geometry::Sphere);
        assert!(d.starts_with('M'));
        assert!(d.ends_with('Z'));
        assert_eq!(d.matches('M').count(), 1);
    }

    #[test]
    fn visible_polygon_closes() {
        let path = GeoPath::new(
            Projection::new(RawProjection::Orthographic).fit_size([100.0, 100.0], &Geometry::Sphere),
        );
        let d = path.path(&square(-5.0, -5.0, 10.0));
        assert_eq!(d.matches('M').count(), 1);
        assert!(d.ends_with('Z'));
    }

    #[test]
    fn empty_collection_renders_empty_path() {
        let path = GeoPath::new(Projection::new(RawProjection::Mercator));
        assert_eq!(path.path(&FeatureCollection::empty()), "");
    }

    #[test]
    fn polygon_across_antimeridian_is_cut_on_cylindrical_maps() {
        let path = GeoPath::new(
            Projection::new(RawProjection::NaturalEarth).fit_size([200.0, 100.0], &Geometry::Sphere),
        );
        let d = path.path(&Feature::new(square(170.0, 0.0, 20.0)));
        assert_eq!(d.matches('M').count(), 2, "{d}");
        assert_eq!(d.matches('Z').count(), 2, "{d}");
    }

    #[test]
    fn half_hidden_polygon_is_clipped_on_the_globe() {
        let path = GeoPath::new(
            Projection::new(RawProjection::Orthographic).fit_size([100.0, 100.0], &Geometry::Sphere),
        );
        let d = path.path(&square(80.0, -5.0, 20.0));
        assert_eq!(d.matches('M').count(), 1, "{d}");
        assert!(d.ends_with('Z'), "{d}");
    }

    #[test]
    fn clipped_line_stays_open() {
        let path = GeoPath::new(
            Projection::new(RawProjection::Orthographic).fit_size([100.0, 100.0], &Geometry::Sphere),
        );
        let d = path.path(&Geometry::LineString(vec![[60.0, 0.0], [120.0, 0.0]]));
        assert_eq!(d.matches('M').count(), 1);
        assert!(!d.contains('Z'));
    }

    #[test]
    fn points_draw_as_circles() {
        let path = GeoPath::new(
            Projection::new(RawProjection::Orthographic)
                .with_scale(1.0)
                .with_translate([50.0, 50.0]),
        );
        let d = path.path(&Geometry::Point([0.0, 0.0]));
        assert_eq!(d, "M50,45.5a4.5,4.5 0 1,1 0,9a4.5,4.5 0 1,1 0,-9Z");
    }
}

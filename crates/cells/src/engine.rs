//! Cell geometry engine: pure functions from cell ids to spherical features.

use foundation::math::{CentroidAccumulator, longitude_extent, small_circle};
use formats::{Feature, FeatureCollection, Geometry};
use h3o::CellIndex;
use once_cell::sync::Lazy;

use crate::cell::CellId;

/// The bounding circle's radius is the larger bounding-box side divided by
/// this. Slightly under 2 so the circle leaves a margin around the cells.
pub const BOUNDING_RADIUS_DIVISOR: f64 = 1.9;

/// Angular step between bounding circle vertices (degrees).
pub const CIRCLE_STEP_DEG: f64 = 6.0;

/// Centroid used for the bounding circle of an empty set.
pub const DEFAULT_CENTROID: [f64; 2] = [0.0, 0.0];

static BASE_CELLS: Lazy<FeatureCollection> = Lazy::new(|| {
    FeatureCollection::new(
        CellIndex::base_cells()
            .map(|c| cell_feature(CellId::from(c)))
            .collect(),
    )
});

/// Whole-globe outline.
pub fn outline() -> Geometry {
    Geometry::Sphere
}

pub fn cell_feature(cell: CellId) -> Feature {
    Feature::new(Geometry::Polygon(vec![cell.boundary_ring()]))
        .with_property("id", cell.to_string())
        .with_property("pentagon", cell.is_pentagon())
}

/// The cell id a feature produced by this module carries.
pub fn feature_cell_id(feature: &Feature) -> Option<&str> {
    feature.property("id").and_then(|v| v.as_str())
}

/// One polygon feature per cell, in input order.
pub fn areas(cells: &[CellId]) -> FeatureCollection {
    FeatureCollection::new(cells.iter().map(|c| cell_feature(*c)).collect())
}

/// The 122 resolution-0 cells tiling the globe.
pub fn hexes() -> &'static FeatureCollection {
    &BASE_CELLS
}

/// Spherical, area-weighted centroid of every polygon in `geom`.
///
/// `None` for a collection without polygons.
pub fn centroid(geom: &FeatureCollection) -> Option<[f64; 2]> {
    let mut acc = CentroidAccumulator::new();
    for feature in geom.iter() {
        let Some(g) = &feature.geometry else {
            continue;
        };
        g.for_each_line(&mut |ring, closed| {
            if closed {
                acc.add_ring(ring);
            }
        });
    }
    acc.centroid()
}

/// Vertex-based extent of a collection: `(longitude span, latitude span)`.
///
/// Longitudes are measured along the shortest covering arc, so cells on both
/// sides of the antimeridian do not span the whole globe.
pub fn extent(geom: &FeatureCollection) -> Option<(f64, f64)> {
    let mut lons = Vec::new();
    let mut lat_min = f64::INFINITY;
    let mut lat_max = f64::NEG_INFINITY;
    for feature in geom.iter() {
        let Some(g) = &feature.geometry else {
            continue;
        };
        g.for_each_line(&mut |ring, _| {
            for p in ring {
                lons.push(p[0]);
                lat_min = lat_min.min(p[1]);
                lat_max = lat_max.max(p[1]);
            }
        });
    }
    let lon_span = longitude_extent(&lons)?;
    Some((lon_span, (lat_max - lat_min).abs()))
}

/// Radius (degrees) of the highlight circle around `geom`.
pub fn bounding_radius(geom: &FeatureCollection) -> Option<f64> {
    let (lon_span, lat_span) = extent(geom)?;
    Some(lon_span.max(lat_span) / BOUNDING_RADIUS_DIVISOR)
}

/// Circular cap centered on the centroid of `geom`, enclosing it with margin.
///
/// An empty collection has no meaningful circle and yields `None`; callers
/// omit the layer.
pub fn bounding_sphere(geom: &FeatureCollection) -> Option<Feature> {
    let center = centroid(geom)?;
    let radius = bounding_radius(geom)?;
    let ring = small_circle(center, radius, CIRCLE_STEP_DEG);
    Some(
        Feature::new(Geometry::Polygon(vec![ring]))
            .with_property("center", vec![center[0], center[1]])
            .with_property("radius", radius),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellSet;
    use foundation::math::{angular_distance, position_to_unit};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn cells(ids: &[&str]) -> Vec<CellId> {
        CellSet::parse(ids).expect("valid cells").unique()
    }

    #[test]
    fn outline_is_the_sphere() {
        assert_eq!(outline(), Geometry::Sphere);
    }

    #[test]
    fn empty_areas_has_no_features() {
        let fc = areas(&[]);
        assert!(fc.is_empty());
        assert!(centroid(&fc).is_none());
        assert!(bounding_sphere(&fc).is_none());
    }

    #[test]
    fn areas_tags_each_feature_with_its_cell() {
        let ids = ["80e1fffffffffff", "8035fffffffffff", "8009fffffffffff"];
        let fc = areas(&cells(&ids));
        assert_eq!(fc.len(), 3);
        for (feature, id) in fc.iter().zip(ids) {
            assert_eq!(feature_cell_id(feature), Some(id));
            assert_eq!(feature.geometry.as_ref().map(|g| g.kind()), Some("Polygon"));
        }
        assert_eq!(fc.features[2].property("pentagon"), Some(&true.into()));
        assert_eq!(fc.features[0].property("pentagon"), Some(&false.into()));
    }

    #[test]
    fn hexes_cover_all_base_cells() {
        let fc = hexes();
        assert_eq!(fc.len(), 122);
        let pentagons = fc
            .iter()
            .filter(|f| f.property("pentagon").and_then(|v| v.as_bool()) == Some(true))
            .count();
        assert_eq!(pentagons, 12);
    }

    #[test]
    fn centroid_of_single_cell_is_its_center() {
        let cell: CellId = "85283473fffffff".parse().unwrap();
        let c = centroid(&areas(&[cell])).unwrap();
        let center = h3o::LatLng::from(cell.index());
        let d = angular_distance(
            position_to_unit(c),
            position_to_unit([center.lng(), center.lat()]),
        )
        .to_degrees();
        assert!(d < 0.05, "centroid {c:?} is {d}° from the cell center");
    }

    #[test]
    fn bounding_circle_radius_follows_extent() {
        let fc = areas(&cells(&["80e1fffffffffff", "8035fffffffffff"]));
        let (lon_span, lat_span) = extent(&fc).unwrap();
        let circle = bounding_sphere(&fc).expect("circle");
        let radius = circle.property("radius").and_then(|v| v.as_f64()).unwrap();
        assert_close(radius, lon_span.max(lat_span) / BOUNDING_RADIUS_DIVISOR, 1e-12);

        let center = centroid(&fc).unwrap();
        let Some(Geometry::Polygon(rings)) = &circle.geometry else {
            panic!("circle must be a polygon");
        };
        for p in &rings[0] {
            let d = angular_distance(position_to_unit(center), position_to_unit(*p)).to_degrees();
            assert_close(d, radius, 1e-6);
        }
    }
}

//! Turns a projection choice, a viewport and the current cells into a path
//! generator: fitted to the whole sphere, then rotated so the cells' centroid
//! sits in the middle of the view.

use cells::{DEFAULT_CENTROID, centroid};
use foundation::ViewportSize;
use formats::{FeatureCollection, Geometry};
use tracing::debug;

use crate::catalog::ProjectionDef;
use crate::path::GeoPath;
use crate::projection::Projection;

/// Projection for `def` sized to `viewport` and centered on `cells`.
pub fn build_projection(def: &ProjectionDef, viewport: ViewportSize, cells: &FeatureCollection) -> Projection {
    let center = centroid(cells).unwrap_or(DEFAULT_CENTROID);
    let projection = def
        .build()
        .fit_size(viewport.as_array(), &Geometry::Sphere)
        .rotate([-center[0], -center[1]]);

    debug!(
        projection = def.id,
        width = viewport.width,
        height = viewport.height,
        center_lon = center[0],
        center_lat = center[1],
        scale = projection.scale(),
        "built projection"
    );
    projection
}

pub fn build(def: &ProjectionDef, viewport: ViewportSize, cells: &FeatureCollection) -> GeoPath {
    GeoPath::new(build_projection(def, viewport, cells))
}

#[cfg(test)]
mod tests {
    use super::{build, build_projection};
    use crate::catalog::ProjectionCatalog;
    use cells::{CellSet, areas};
    use foundation::ViewportSize;
    use formats::FeatureCollection;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn empty_cells_center_on_null_island() {
        let def = ProjectionCatalog::builtin().resolve("orthographic").unwrap();
        let viewport = ViewportSize::new(1600.0, 1000.0);
        let p = build_projection(&def, viewport, &FeatureCollection::empty());
        let xy = p.project([0.0, 0.0]).unwrap();
        assert_close(xy[0], 800.0, 1e-6);
        assert_close(xy[1], 500.0, 1e-6);
    }

    #[test]
    fn cells_centroid_lands_mid_view() {
        let def = ProjectionCatalog::builtin().resolve("orthographic").unwrap();
        let cells = CellSet::parse(&["85283473fffffff"]).unwrap();
        let geom = areas(cells.as_slice());
        let center = cells::centroid(&geom).unwrap();
        let p = build_projection(&def, ViewportSize::new(1000.0, 1000.0), &geom);
        let xy = p.project(center).unwrap();
        assert_close(xy[0], 500.0, 1e-6);
        assert_close(xy[1], 500.0, 1e-6);
    }

    #[test]
    fn every_catalog_projection_draws_the_sphere() {
        let viewport = ViewportSize::new(1500.0, 1000.0);
        for def in ProjectionCatalog::builtin().iter() {
            let path = build(def, viewport, &FeatureCollection::empty());
            let d = path.path(&cells::outline());
            assert!(d.starts_with('M'), "{}: {d}", def.id);
        }
    }
}

//! SVG document output for a composed map or its placeholder.

use std::fmt::Write as _;

use worldmap::{LoadingReason, MapView};

const STYLE: &str = "\
.outline { fill: none; stroke: #888; stroke-width: 0.25%; }
.sphere { fill: #f4f6f8; stroke: none; }
.land { fill: none; stroke: #2a5d84; stroke-width: 0.15%; }
.hexes { fill: none; stroke: #b8c2cc; stroke-width: 0.10%; }
.areas { fill: rgba(230, 80, 40, 0.35); stroke: #e65028; stroke-width: 0.25%; }
.bbox { fill: none; stroke: #e65028; stroke-width: 0.25%; }";

pub fn render_map(view: &MapView) -> String {
    let path = &view.path;
    let g = &view.geometries;

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        r#"<svg id="map" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="{}">"#,
        view.viewbox_attr()
    );
    let _ = writeln!(out, "  <style>\n{STYLE}\n  </style>");
    let _ = writeln!(out, "  <defs>");
    let _ = writeln!(out, r#"    <path id="outline" d="{}" />"#, path.path(&g.outline));
    let _ = writeln!(out, r##"    <clipPath id="clip"><use xlink:href="#outline" /></clipPath>"##);
    let _ = writeln!(out, "  </defs>");
    let _ = writeln!(out, r#"  <g clip-path="url(#clip)">"#);
    let _ = writeln!(out, r##"    <use xlink:href="#outline" class="sphere" />"##);
    let _ = writeln!(out, r#"    <path d="{}" class="hexes" />"#, path.path(g.hexes));
    let _ = writeln!(out, r#"    <path d="{}" class="land" />"#, path.path(g.land.as_ref()));
    if let Some(circle) = &g.bounding_circle {
        let _ = writeln!(out, r#"    <path d="{}" class="bbox" />"#, path.path(circle));
    }
    let _ = writeln!(out, r#"    <path d="{}" class="areas" />"#, path.path(g.areas.as_ref()));
    let _ = writeln!(out, "  </g>");
    let _ = writeln!(out, r##"  <use xlink:href="#outline" class="outline" />"##);
    out.push_str("</svg>\n");
    out
}

/// Spinner placeholder carrying the reason as its title.
pub fn render_placeholder(reason: &LoadingReason) -> String {
    format!(
        concat!(
            r#"<svg id="map" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 50 50" class="spinner">"#,
            "\n  <title>{}</title>",
            "\n  <circle cx=\"25\" cy=\"25\" r=\"20\" fill=\"none\" stroke=\"#2a5d84\" stroke-width=\"2\" />",
            "\n</svg>\n"
        ),
        escape(&reason.to_string())
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::{render_map, render_placeholder};
    use projection::ProjectionCatalog;
    use runtime::ClientRect;
    use streaming::{LandGeometryState, LoadError};
    use worldmap::{LoadingReason, View, WorldMap, WorldMapConfig};

    #[test]
    fn map_document_has_every_layer() {
        let mut map = WorldMap::new(WorldMapConfig::default(), ProjectionCatalog::standard()).unwrap();
        map.set_cells(&["8035fffffffffff"]).unwrap();
        map.connected();
        map.updated();
        map.animation_frame(ClientRect::new(960.0, 500.0));
        let source = map.land_source().clone();
        map.set_land_state(&source, LandGeometryState::Ready(Default::default()));

        let View::Map(view) = map.view() else {
            panic!("expected map view");
        };
        let svg = render_map(&view);
        for class in ["sphere", "hexes", "land", "bbox", "areas", "outline"] {
            assert!(svg.contains(&format!("class=\"{class}\"")), "missing {class}");
        }
        assert!(svg.contains("viewBox=\"0 0 1920 1000\""));
        assert!(svg.contains("<clipPath id=\"clip\">"));
    }

    #[test]
    fn placeholder_names_the_reason() {
        let svg = render_placeholder(&LoadingReason::LandUnavailable(LoadError::not_found(
            "collection 'land' not in document",
        )));
        assert!(svg.contains("<title>land geometry unavailable: not-found error:"));
        assert!(svg.contains("class=\"spinner\""));
    }
}

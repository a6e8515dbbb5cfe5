//! TopoJSON decoding.
//!
//! A topology stores shared boundaries once, as `arcs`, and describes each
//! named object as lists of arc indices. Decoding stitches arcs back into
//! GeoJSON-shaped rings and lines.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::geometry::{Feature, FeatureCollection, Geometry, Position, Ring};

#[derive(Debug)]
pub enum TopologyError {
    Json(serde_json::Error),
    NotATopology { found: String },
    MissingObject { name: String },
    InvalidArc { index: i64 },
}

impl std::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyError::Json(e) => write!(f, "invalid topology JSON: {e}"),
            TopologyError::NotATopology { found } => {
                write!(f, "expected a Topology document, found type '{found}'")
            }
            TopologyError::MissingObject { name } => {
                write!(f, "topology has no collection '{name}'")
            }
            TopologyError::InvalidArc { index } => write!(f, "arc index {index} out of range"),
        }
    }
}

impl std::error::Error for TopologyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TopologyError::Json(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct TopoObject {
    pub id: Option<Value>,
    pub properties: Option<Map<String, Value>>,
    /// `None` when the member's `type` is null or absent.
    pub geometry: Option<TopoGeometry>,
}

impl TryFrom<Map<String, Value>> for TopoObject {
    type Error = serde_json::Error;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = map.remove("id").filter(|v| !v.is_null());
        let properties = match map.remove("properties") {
            None | Some(Value::Null) => None,
            Some(v) => Some(serde_json::from_value(v)?),
        };
        let geometry = match map.get("type") {
            None | Some(Value::Null) => None,
            Some(_) => Some(serde_json::from_value(Value::Object(map))?),
        };
        Ok(Self {
            id,
            properties,
            geometry,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum TopoGeometry {
    GeometryCollection { geometries: Vec<TopoObject> },
    Point { coordinates: Vec<f64> },
    MultiPoint { coordinates: Vec<Vec<f64>> },
    LineString { arcs: Vec<i64> },
    MultiLineString { arcs: Vec<Vec<i64>> },
    Polygon { arcs: Vec<Vec<i64>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub objects: BTreeMap<String, TopoObject>,
}

impl Topology {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TopologyError> {
        let value: Value = serde_json::from_slice(bytes).map_err(TopologyError::Json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, TopologyError> {
        let found = value
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or("<none>")
            .to_string();
        if found != "Topology" {
            return Err(TopologyError::NotATopology { found });
        }
        serde_json::from_value(value).map_err(TopologyError::Json)
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(|k| k.as_str())
    }

    /// Converts the named object into a feature collection.
    ///
    /// A `GeometryCollection` yields one feature per member; any other object
    /// yields a single-feature collection.
    pub fn feature_collection(&self, name: &str) -> Result<FeatureCollection, TopologyError> {
        let object = self
            .objects
            .get(name)
            .ok_or_else(|| TopologyError::MissingObject {
                name: name.to_string(),
            })?;

        let arcs = self.decode_arcs();
        let features = match &object.geometry {
            Some(TopoGeometry::GeometryCollection { geometries }) => geometries
                .iter()
                .map(|g| self.feature(g, &arcs))
                .collect::<Result<Vec<_>, _>>()?,
            _ => vec![self.feature(object, &arcs)?],
        };
        Ok(FeatureCollection::new(features))
    }

    fn decode_arcs(&self) -> Vec<Vec<Position>> {
        self.arcs
            .iter()
            .map(|arc| match &self.transform {
                Some(t) => {
                    let (mut x, mut y) = (0.0, 0.0);
                    arc.iter()
                        .map(|p| {
                            x += p.first().copied().unwrap_or(0.0);
                            y += p.get(1).copied().unwrap_or(0.0);
                            [
                                x * t.scale[0] + t.translate[0],
                                y * t.scale[1] + t.translate[1],
                            ]
                        })
                        .collect()
                }
                None => arc.iter().map(|p| untransformed(p)).collect(),
            })
            .collect()
    }

    fn point(&self, p: &[f64]) -> Position {
        match &self.transform {
            Some(t) => [
                p.first().copied().unwrap_or(0.0) * t.scale[0] + t.translate[0],
                p.get(1).copied().unwrap_or(0.0) * t.scale[1] + t.translate[1],
            ],
            None => untransformed(p),
        }
    }

    fn feature(&self, object: &TopoObject, arcs: &[Vec<Position>]) -> Result<Feature, TopologyError> {
        let geometry = match &object.geometry {
            None | Some(TopoGeometry::GeometryCollection { .. }) => None,
            Some(TopoGeometry::Point { coordinates }) => {
                Some(Geometry::Point(self.point(coordinates)))
            }
            Some(TopoGeometry::MultiPoint { coordinates }) => Some(Geometry::MultiPoint(
                coordinates.iter().map(|p| self.point(p)).collect(),
            )),
            Some(TopoGeometry::LineString { arcs: indices }) => {
                Some(Geometry::LineString(line(indices, arcs)?))
            }
            Some(TopoGeometry::MultiLineString { arcs: lines }) => Some(Geometry::MultiLineString(
                lines
                    .iter()
                    .map(|l| line(l, arcs))
                    .collect::<Result<_, _>>()?,
            )),
            Some(TopoGeometry::Polygon { arcs: rings }) => {
                Some(Geometry::Polygon(polygon(rings, arcs)?))
            }
            Some(TopoGeometry::MultiPolygon { arcs: polys }) => Some(Geometry::MultiPolygon(
                polys
                    .iter()
                    .map(|p| polygon(p, arcs))
                    .collect::<Result<_, _>>()?,
            )),
        };

        let id = match &object.id {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Ok(Feature {
            id,
            properties: object.properties.clone().unwrap_or_default(),
            geometry,
        })
    }
}

fn untransformed(p: &[f64]) -> Position {
    [
        p.first().copied().unwrap_or(0.0),
        p.get(1).copied().unwrap_or(0.0),
    ]
}

/// Concatenates arcs, dropping each arc's first point after the first arc
/// (it repeats the previous arc's last point). Negative indices (`!i`)
/// reference arc `i` traversed backwards.
fn stitch(indices: &[i64], arcs: &[Vec<Position>]) -> Result<Vec<Position>, TopologyError> {
    let mut points: Vec<Position> = Vec::new();
    for &index in indices {
        let (arc_index, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(arc_index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(TopologyError::InvalidArc { index })?;

        if !points.is_empty() {
            points.pop();
        }
        if reversed {
            points.extend(arc.iter().rev());
        } else {
            points.extend(arc.iter());
        }
    }
    Ok(points)
}

fn line(indices: &[i64], arcs: &[Vec<Position>]) -> Result<Vec<Position>, TopologyError> {
    let mut points = stitch(indices, arcs)?;
    if points.len() == 1 {
        points.push(points[0]);
    }
    Ok(points)
}

fn ring(indices: &[i64], arcs: &[Vec<Position>]) -> Result<Ring, TopologyError> {
    let mut points = stitch(indices, arcs)?;
    while !points.is_empty() && points.len() < 4 {
        points.push(points[0]);
    }
    Ok(points)
}

fn polygon(rings: &[Vec<i64>], arcs: &[Vec<Position>]) -> Result<Vec<Ring>, TopologyError> {
    rings.iter().map(|r| ring(r, arcs)).collect()
}

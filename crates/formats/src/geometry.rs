use serde_json::{Map, Value, json};

/// `[longitude, latitude]` in degrees.
pub type Position = [f64; 2];

/// A closed sequence of positions (first == last).
pub type Ring = Vec<Position>;

/// Spherical geometry in GeoJSON shape, plus the whole-globe `Sphere` marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Sphere,
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Sphere => "Sphere",
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Visits every polygon ring (`closed == true`) and line (`closed == false`).
    pub fn for_each_line(&self, f: &mut dyn FnMut(&[Position], bool)) {
        match self {
            Geometry::Sphere | Geometry::Point(_) | Geometry::MultiPoint(_) => {}
            Geometry::LineString(line) => f(line, false),
            Geometry::MultiLineString(lines) => lines.iter().for_each(|l| f(l, false)),
            Geometry::Polygon(rings) => rings.iter().for_each(|r| f(r, true)),
            Geometry::MultiPolygon(polys) => polys
                .iter()
                .flat_map(|rings| rings.iter())
                .for_each(|r| f(r, true)),
        }
    }

    pub fn to_geojson_value(&self) -> Value {
        match self {
            Geometry::Sphere => json!({ "type": "Sphere" }),
            Geometry::Point(p) => json!({ "type": "Point", "coordinates": p }),
            Geometry::MultiPoint(ps) => json!({ "type": "MultiPoint", "coordinates": ps }),
            Geometry::LineString(l) => json!({ "type": "LineString", "coordinates": l }),
            Geometry::MultiLineString(ls) => {
                json!({ "type": "MultiLineString", "coordinates": ls })
            }
            Geometry::Polygon(rings) => json!({ "type": "Polygon", "coordinates": rings }),
            Geometry::MultiPolygon(polys) => {
                json!({ "type": "MultiPolygon", "coordinates": polys })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            properties: Map::new(),
            geometry: Some(geometry),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn to_geojson_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), Value::String("Feature".to_string()));
        if let Some(id) = &self.id {
            obj.insert("id".to_string(), Value::String(id.clone()));
        }
        obj.insert(
            "properties".to_string(),
            Value::Object(self.properties.clone()),
        );
        obj.insert(
            "geometry".to_string(),
            self.geometry
                .as_ref()
                .map(Geometry::to_geojson_value)
                .unwrap_or(Value::Null),
        );
        Value::Object(obj)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn to_geojson_value(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features.iter().map(Feature::to_geojson_value).collect::<Vec<_>>(),
        })
    }
}

/// Anything a path generator can draw: a bare geometry, a feature, or a
/// collection of features.
pub trait GeoObject {
    fn for_each_geometry(&self, f: &mut dyn FnMut(&Geometry));
}

impl GeoObject for Geometry {
    fn for_each_geometry(&self, f: &mut dyn FnMut(&Geometry)) {
        f(self)
    }
}

impl GeoObject for Feature {
    fn for_each_geometry(&self, f: &mut dyn FnMut(&Geometry)) {
        if let Some(g) = &self.geometry {
            f(g)
        }
    }
}

impl GeoObject for FeatureCollection {
    fn for_each_geometry(&self, f: &mut dyn FnMut(&Geometry)) {
        for feature in &self.features {
            feature.for_each_geometry(f);
        }
    }
}

impl<T: GeoObject> GeoObject for Option<T> {
    fn for_each_geometry(&self, f: &mut dyn FnMut(&Geometry)) {
        if let Some(inner) = self {
            inner.for_each_geometry(f)
        }
    }
}

use runtime::LandPolicy;
use serde::Deserialize;
use streaming::LandSource;

use crate::error::ConfigError;

pub const DEFAULT_LAND_SRC: &str = "https://cdn.jsdelivr.net/npm/world-atlas@2/land-110m.json";
pub const DEFAULT_LAND_COLLECTION: &str = "land";
pub const DEFAULT_PROJECTION: &str = "orthographic";
pub const DEFAULT_VIEWBOX_HEIGHT: f64 = 1000.0;

/// Host-supplied configuration of a world map. Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldMapConfig {
    pub land_src: String,
    pub land_collection: String,
    pub projection: String,
    pub viewbox_height: f64,
    pub land_policy: LandPolicy,
}

impl Default for WorldMapConfig {
    fn default() -> Self {
        Self {
            land_src: DEFAULT_LAND_SRC.to_string(),
            land_collection: DEFAULT_LAND_COLLECTION.to_string(),
            projection: DEFAULT_PROJECTION.to_string(),
            viewbox_height: DEFAULT_VIEWBOX_HEIGHT,
            land_policy: LandPolicy::default(),
        }
    }
}

impl WorldMapConfig {
    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(payload).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.viewbox_height.is_finite() && self.viewbox_height > 0.0) {
            return Err(ConfigError::ViewboxHeight(self.viewbox_height));
        }
        Ok(())
    }

    /// Trimmed land source; incomplete when either field is blank.
    pub fn land_source(&self) -> LandSource {
        LandSource::new(&self.land_src, &self.land_collection)
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_LAND_SRC, WorldMapConfig};
    use crate::error::ConfigError;
    use pretty_assertions::assert_eq;
    use runtime::LandPolicy;

    #[test]
    fn empty_document_yields_defaults() {
        let config = WorldMapConfig::from_json("{}").unwrap();
        assert_eq!(config, WorldMapConfig::default());
        assert_eq!(config.land_source().url(), DEFAULT_LAND_SRC);
        assert_eq!(config.land_source().collection(), "land");
    }

    #[test]
    fn partial_overrides() {
        let config = WorldMapConfig::from_json(
            r#"{ "projection": "mercator", "land_policy": "optional", "land_collection": " countries " }"#,
        )
        .unwrap();
        assert_eq!(config.projection, "mercator");
        assert_eq!(config.land_policy, LandPolicy::Optional);
        assert_eq!(config.land_source().collection(), "countries");
        assert_eq!(config.viewbox_height, 1000.0);
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(matches!(
            WorldMapConfig::from_json(r#"{ "landSrc": "x" }"#),
            Err(ConfigError::Json(_))
        ));
        assert_eq!(
            WorldMapConfig::from_json(r#"{ "viewbox_height": 0 }"#),
            Err(ConfigError::ViewboxHeight(0.0))
        );
    }
}

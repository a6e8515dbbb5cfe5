use std::fmt;

use once_cell::sync::Lazy;

use crate::projection::Projection;
use crate::raw::RawProjection;

/// A named projection the map can switch to.
#[derive(Debug, Copy, Clone)]
pub struct ProjectionDef {
    pub id: &'static str,
    pub name: &'static str,
    builder: fn() -> Projection,
}

impl ProjectionDef {
    pub const fn new(id: &'static str, name: &'static str, builder: fn() -> Projection) -> Self {
        Self { id, name, builder }
    }

    /// A fresh, unfitted and unrotated projection.
    pub fn build(&self) -> Projection {
        (self.builder)()
    }
}

impl PartialEq for ProjectionDef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name
    }
}

impl Eq for ProjectionDef {}

/// Catalog entry returned for a requested id.
pub type ResolvedProjectionDef = ProjectionDef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProjection {
    pub id: String,
}

impl fmt::Display for UnknownProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown projection id '{}'", self.id)
    }
}

impl std::error::Error for UnknownProjection {}

static BUILTIN: Lazy<ProjectionCatalog> = Lazy::new(ProjectionCatalog::standard);

/// Ordered set of selectable projections.
#[derive(Debug, Clone, Default)]
pub struct ProjectionCatalog {
    defs: Vec<ProjectionDef>,
}

impl ProjectionCatalog {
    pub fn new(defs: Vec<ProjectionDef>) -> Self {
        Self { defs }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            ProjectionDef::new("conicEqualArea", "Conic equal-area", || {
                Projection::new(RawProjection::conic_equal_area_default())
            }),
            ProjectionDef::new("orthographic", "Orthographic", || {
                Projection::new(RawProjection::Orthographic)
            }),
            ProjectionDef::new("naturalEarth", "Natural Earth", || {
                Projection::new(RawProjection::NaturalEarth)
            }),
            ProjectionDef::new("stereographic", "Stereographic", || {
                Projection::new(RawProjection::Stereographic)
            }),
            ProjectionDef::new("gnomonic", "Gnomonic", || {
                Projection::new(RawProjection::Gnomonic)
            }),
            ProjectionDef::new("mercator", "Mercator", || {
                Projection::new(RawProjection::Mercator)
            }),
        ])
    }

    /// Shared instance of [`ProjectionCatalog::standard`].
    pub fn builtin() -> &'static ProjectionCatalog {
        &BUILTIN
    }

    pub fn get(&self, id: &str) -> Option<&ProjectionDef> {
        self.defs.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn resolve(&self, id: &str) -> Result<ResolvedProjectionDef, UnknownProjection> {
        self.get(id).copied().ok_or_else(|| UnknownProjection { id: id.to_string() })
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.defs.iter().map(|d| d.id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProjectionDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectionCatalog;
    use crate::raw::RawProjection;
    use pretty_assertions::assert_eq;

    #[test]
    fn standard_catalog_lists_six_projections_in_order() {
        let ids: Vec<_> = ProjectionCatalog::builtin().ids().collect();
        assert_eq!(
            ids,
            vec![
                "conicEqualArea",
                "orthographic",
                "naturalEarth",
                "stereographic",
                "gnomonic",
                "mercator"
            ]
        );
    }

    #[test]
    fn resolves_known_ids() {
        let def = ProjectionCatalog::builtin().resolve("mercator").unwrap();
        assert_eq!(def.name, "Mercator");
        assert_eq!(def.build().raw(), RawProjection::Mercator);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let err = ProjectionCatalog::builtin().resolve("robinson").unwrap_err();
        assert_eq!(err.id, "robinson");
        assert_eq!(err.to_string(), "unknown projection id 'robinson'");
        assert!(!ProjectionCatalog::builtin().contains("Mercator"));
    }

    #[test]
    fn custom_catalog() {
        let standard = ProjectionCatalog::standard();
        let only_globe = ProjectionCatalog::new(vec![*standard.get("orthographic").unwrap()]);
        assert_eq!(only_globe.len(), 1);
        assert!(only_globe.resolve("mercator").is_err());
    }
}

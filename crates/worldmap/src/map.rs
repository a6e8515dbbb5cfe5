//! The embeddable world map core.
//!
//! Hosts push inputs (cells, projection id, land source), layout events and
//! land state snapshots in; the map validates, keeps derived state current
//! and answers with either a placeholder reason or a fully composed map.

use std::fmt;
use std::sync::Arc;

use cells::{CellId, CellSet, areas, bounding_sphere, hexes, outline};
use foundation::ViewportSize;
use formats::{Feature, FeatureCollection, Geometry};
use projection::{GeoPath, ProjectionCatalog, ProjectionDef, build};
use runtime::{ClientRect, GateInputs, GateState, LandPolicy, LayoutMeasurer, Memo, RenderGate};
use serde_json::{Value, json};
use streaming::{LandGeometryState, LandSource, LoadError};
use tracing::debug;

use crate::config::WorldMapConfig;
use crate::error::InputError;

/// Why the placeholder is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadingReason {
    MeasuringViewport,
    LoadingLand,
    LandUnavailable(LoadError),
    LandUnconfigured,
}

impl fmt::Display for LoadingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadingReason::MeasuringViewport => f.write_str("measuring viewport"),
            LoadingReason::LoadingLand => f.write_str("loading land geometry"),
            LoadingReason::LandUnavailable(e) => write!(f, "land geometry unavailable: {e}"),
            LoadingReason::LandUnconfigured => f.write_str("no land geometry source configured"),
        }
    }
}

/// Everything the renderer draws, back to front.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableGeometries {
    pub outline: Geometry,
    pub hexes: &'static FeatureCollection,
    pub land: Arc<FeatureCollection>,
    /// `None` for an empty cell set.
    pub bounding_circle: Option<Feature>,
    pub areas: Arc<FeatureCollection>,
}

impl DrawableGeometries {
    pub fn to_geojson_value(&self) -> Value {
        json!({
            "outline": self.outline.to_geojson_value(),
            "hexes": self.hexes.to_geojson_value(),
            "land": self.land.to_geojson_value(),
            "bounding_circle": self.bounding_circle.as_ref().map(Feature::to_geojson_value),
            "areas": self.areas.to_geojson_value(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub viewbox: ViewportSize,
    pub path: GeoPath,
    pub geometries: DrawableGeometries,
}

impl MapView {
    /// SVG `viewBox` attribute value.
    pub fn viewbox_attr(&self) -> String {
        format!("0 0 {} {}", self.viewbox.width, self.viewbox.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading(LoadingReason),
    Map(MapView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoPanel {
    pub unique_cells: Vec<CellId>,
    pub projection: ProjectionDef,
}

impl InfoPanel {
    pub fn summary(&self) -> String {
        let cells = self
            .unique_cells
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Areas (H3-indexes): [ {cells} ]\n{} projection ({})",
            self.projection.name, self.projection.id
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CellGeometries {
    areas: Arc<FeatureCollection>,
    bounding_circle: Option<Feature>,
}

pub struct WorldMap {
    catalog: ProjectionCatalog,
    land_policy: LandPolicy,
    cells: CellSet,
    projection_id: String,
    land_source: LandSource,
    /// Latest loader snapshot and the source it was taken for.
    land: (LandSource, LandGeometryState),
    measurer: LayoutMeasurer,
    gate: RenderGate,
    unique_cells: Memo<CellSet, Vec<CellId>>,
    cell_geometries: Memo<Vec<CellId>, CellGeometries>,
    resolved_projection: Memo<String, ProjectionDef>,
}

impl WorldMap {
    pub fn new(config: WorldMapConfig, catalog: ProjectionCatalog) -> Result<Self, InputError> {
        config.validate()?;
        let mut map = Self {
            catalog,
            land_policy: config.land_policy,
            cells: CellSet::default(),
            projection_id: String::new(),
            land_source: config.land_source(),
            land: (config.land_source(), LandGeometryState::Unstarted),
            measurer: LayoutMeasurer::new(config.viewbox_height),
            gate: RenderGate::new(config.land_policy),
            unique_cells: Memo::new(),
            cell_geometries: Memo::new(),
            resolved_projection: Memo::new(),
        };
        map.set_projection(&config.projection)?;
        map.update_cells(CellSet::default());
        Ok(map)
    }

    /// Replaces the cell list. Rejects the whole list on the first invalid id.
    pub fn set_cells<S: AsRef<str>>(&mut self, cells: &[S]) -> Result<(), InputError> {
        let cells = CellSet::parse(cells)?;
        self.update_cells(cells);
        Ok(())
    }

    /// Replaces the cell list from its JSON array form.
    pub fn set_cells_json(&mut self, payload: &str) -> Result<(), InputError> {
        let cells = CellSet::from_json(payload)?;
        self.update_cells(cells);
        Ok(())
    }

    fn update_cells(&mut self, cells: CellSet) {
        let before = self.unique_cells.recomputations();
        let unique = self.unique_cells.get_or_update(&cells, CellSet::unique);
        let unique_len = unique.len();
        self.cell_geometries.get_or_update(unique, |cells| {
            let areas = areas(cells);
            let bounding_circle = bounding_sphere(&areas);
            CellGeometries {
                areas: Arc::new(areas),
                bounding_circle,
            }
        });
        if self.unique_cells.recomputations() != before {
            debug!(cells = cells.len(), unique = unique_len, "cell set derived");
        }
        self.cells = cells;
    }

    /// Selects a projection from the catalog. Unknown ids are rejected and
    /// leave the current projection in place.
    pub fn set_projection(&mut self, id: &str) -> Result<(), InputError> {
        let catalog = &self.catalog;
        let def = self
            .resolved_projection
            .try_get_or_update(&id.to_string(), |id| catalog.resolve(id))?;
        debug!(projection = def.id, "projection resolved");
        self.projection_id = id.to_string();
        Ok(())
    }

    /// Records the land source the host is loading from. Returns the
    /// normalized source to hand to the loader.
    ///
    /// A changed source invalidates the current land snapshot; with required
    /// land it also puts the map back on the placeholder.
    pub fn set_land_source(&mut self, url: &str, collection: &str) -> LandSource {
        let source = LandSource::new(url, collection);
        if source != self.land_source {
            self.land_source = source.clone();
            if self.land_policy == LandPolicy::Required {
                self.gate.reset();
            }
            self.evaluate_gate();
        }
        source
    }

    /// Applies a loader state snapshot taken for `source`.
    ///
    /// Snapshots for any source other than the current one are dropped.
    /// Returns whether the snapshot was applied.
    pub fn set_land_state(&mut self, source: &LandSource, state: LandGeometryState) -> bool {
        if *source != self.land_source {
            debug!(
                snapshot = source.url(),
                current = self.land_source.url(),
                state = state.name(),
                "dropping land state for a replaced source"
            );
            return false;
        }
        self.land = (source.clone(), state);
        self.evaluate_gate();
        true
    }

    pub fn connected(&mut self) {
        self.measurer.connected();
        self.gate.reset();
        self.evaluate_gate();
    }

    /// Returns `true` when the host must run an animation frame and report
    /// the surface box through [`WorldMap::animation_frame`].
    pub fn updated(&mut self) -> bool {
        self.measurer.updated()
    }

    pub fn animation_frame(&mut self, rect: ClientRect) {
        if self.measurer.animation_frame(rect).is_some() {
            self.evaluate_gate();
        }
    }

    pub fn resize(&mut self, rect: ClientRect) {
        if self.measurer.resize(rect).is_some() {
            self.evaluate_gate();
        }
    }

    pub fn disconnected(&mut self) {
        self.measurer.disconnected();
        self.gate.reset();
    }

    fn evaluate_gate(&mut self) -> GateState {
        let land = self.land_state();
        let inputs = GateInputs::new(self.measurer.measure().is_some(), land.is_ready());
        let land = land.name();
        let state = self.gate.evaluate(inputs);
        debug!(
            viewport_known = inputs.viewport_known,
            land_ready = inputs.land_ready,
            land,
            gate = ?state,
            "render gate evaluated"
        );
        state
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn viewport(&self) -> Option<ViewportSize> {
        self.measurer.measure()
    }

    /// Loader snapshot for the current land source; `Unstarted` until one
    /// arrives for it.
    pub fn land_state(&self) -> &LandGeometryState {
        static UNSTARTED: LandGeometryState = LandGeometryState::Unstarted;
        if self.land.0 == self.land_source {
            &self.land.1
        } else {
            &UNSTARTED
        }
    }

    pub fn land_source(&self) -> &LandSource {
        &self.land_source
    }

    pub fn cells(&self) -> &CellSet {
        &self.cells
    }

    pub fn unique_cells(&self) -> &[CellId] {
        self.unique_cells.get().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn projection(&self) -> Option<&ProjectionDef> {
        self.resolved_projection.get()
    }

    pub fn projection_id(&self) -> &str {
        &self.projection_id
    }

    /// How often the unique cell list and the projection were re-derived.
    pub fn recomputations(&self) -> (u64, u64) {
        (
            self.unique_cells.recomputations(),
            self.resolved_projection.recomputations(),
        )
    }

    pub fn info(&self) -> Option<InfoPanel> {
        Some(InfoPanel {
            unique_cells: self.unique_cells().to_vec(),
            projection: *self.projection()?,
        })
    }

    pub fn geometries(&self) -> DrawableGeometries {
        let (areas, bounding_circle) = match self.cell_geometries.get() {
            Some(g) => (Arc::clone(&g.areas), g.bounding_circle.clone()),
            None => (Arc::new(FeatureCollection::empty()), None),
        };
        DrawableGeometries {
            outline: outline(),
            hexes: hexes(),
            land: self
                .land_state()
                .features()
                .cloned()
                .unwrap_or_else(|| Arc::new(FeatureCollection::empty())),
            bounding_circle,
            areas,
        }
    }

    pub fn view(&self) -> View {
        if !self.gate.is_ready() {
            return View::Loading(self.loading_reason());
        }
        let (Some(viewbox), Some(def)) = (self.measurer.measure(), self.projection()) else {
            return View::Loading(self.loading_reason());
        };
        let geometries = self.geometries();
        let path = build(def, viewbox, &geometries.areas);
        View::Map(MapView {
            viewbox,
            path,
            geometries,
        })
    }

    fn loading_reason(&self) -> LoadingReason {
        if self.measurer.measure().is_none() {
            return LoadingReason::MeasuringViewport;
        }
        match self.land_state() {
            LandGeometryState::Failed(e) => LoadingReason::LandUnavailable(e.clone()),
            _ if !self.land_source.is_complete() => LoadingReason::LandUnconfigured,
            _ => LoadingReason::LoadingLand,
        }
    }
}

impl fmt::Debug for WorldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldMap")
            .field("cells", &self.cells.len())
            .field("projection", &self.projection_id)
            .field("land", &self.land_state().name())
            .field("viewport", &self.measurer.measure())
            .field("gate", &self.gate.state())
            .finish()
    }
}

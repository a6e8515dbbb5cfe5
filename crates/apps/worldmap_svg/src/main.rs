mod svg;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use projection::ProjectionCatalog;
use runtime::{ClientRect, LandPolicy};
use streaming::{
    FileTopologySource, HttpTopologySource, LandGeometryController, LandGeometryState, LandSource,
    LoadError, TopologySource,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use worldmap::{View, WorldMap, WorldMapConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Render H3 cells on a projected world map as SVG")]
struct Args {
    /// H3 cell ids to highlight
    cells: Vec<String>,

    /// Cell ids as a JSON array, e.g. '["80e1fffffffffff"]' (replaces positional cells)
    #[arg(long)]
    cells_json: Option<String>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Projection id (env: WORLDMAP_PROJECTION)
    #[arg(long)]
    projection: Option<String>,

    /// Topology document URL or file path (env: WORLDMAP_LAND_SRC)
    #[arg(long)]
    land_src: Option<String>,

    /// Object name inside the topology document (env: WORLDMAP_LAND_COLL)
    #[arg(long)]
    land_coll: Option<String>,

    /// Draw the map even when land geometry cannot be loaded
    #[arg(long)]
    land_optional: bool,

    /// Width of the drawing surface
    #[arg(long, default_value_t = 960.0)]
    width: f64,

    /// Height of the drawing surface
    #[arg(long, default_value_t = 500.0)]
    height: f64,

    /// Overall deadline for loading land geometry
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Output file (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WorldMapConfig::from_json(&tokio::fs::read_to_string(path).await?)?,
        None => WorldMapConfig::default(),
    };
    if let Some(p) = args.projection.clone().or_else(|| env::var("WORLDMAP_PROJECTION").ok()) {
        config.projection = p;
    }
    if let Some(src) = args.land_src.clone().or_else(|| env::var("WORLDMAP_LAND_SRC").ok()) {
        config.land_src = src;
    }
    if let Some(coll) = args.land_coll.clone().or_else(|| env::var("WORLDMAP_LAND_COLL").ok()) {
        config.land_collection = coll;
    }
    if args.land_optional {
        config.land_policy = LandPolicy::Optional;
    }

    let mut map = WorldMap::new(config.clone(), ProjectionCatalog::standard())?;
    match &args.cells_json {
        Some(json) => map.set_cells_json(json)?,
        None => map.set_cells(args.cells.as_slice())?,
    }

    map.connected();
    if map.updated() {
        map.animation_frame(ClientRect::new(args.width, args.height));
    }

    let source = map.set_land_source(&config.land_src, &config.land_collection);
    if source.is_complete() {
        let deadline = Duration::from_secs(args.timeout_secs);
        let state = if is_remote(source.url()) {
            load_land(HttpTopologySource::new(), source.clone(), deadline).await
        } else {
            load_land(FileTopologySource::default(), source.clone(), deadline).await
        };
        map.set_land_state(&source, state);
    } else {
        warn!("no land source configured");
    }

    if let Some(panel) = map.info() {
        eprintln!("{}", panel.summary());
    }

    let (document, outcome): (String, Result<(), Box<dyn std::error::Error>>) = match map.view() {
        View::Map(view) => (svg::render_map(&view), Ok(())),
        View::Loading(reason) => {
            let document = svg::render_placeholder(&reason);
            (document, Err(format!("map not drawn: {reason}").into()))
        }
    };

    match &args.out {
        Some(path) => {
            tokio::fs::write(path, document).await?;
            info!("wrote {}", path.display());
        }
        None => print!("{document}"),
    }
    outcome
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

async fn load_land<S: TopologySource + 'static>(
    topology: S,
    source: LandSource,
    deadline: Duration,
) -> LandGeometryState {
    let mut controller = LandGeometryController::new(topology);
    let mut updates = controller.subscribe();
    controller.set_source(source);

    // The watch borrow must end before `updates` is dropped.
    let state = match tokio::time::timeout(deadline, updates.wait_for(LandGeometryState::is_settled)).await {
        Ok(Ok(state)) => state.clone(),
        Ok(Err(_)) => LandGeometryState::Failed(LoadError::network("land loader stopped")),
        Err(_) => LandGeometryState::Failed(LoadError::network(format!(
            "timed out after {}s",
            deadline.as_secs()
        ))),
    };
    state
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::load_land;
    use streaming::{BoxFuture, LandSource, LoadError, LoadErrorKind, MemoryTopologySource, TopologySource};

    const LAND: &str = r#"{
        "type": "Topology",
        "arcs": [[[0, 0], [10, 0], [10, 10], [0, 0]]],
        "objects": { "land": { "type": "Polygon", "arcs": [[0]] } }
    }"#;

    struct Stalled;

    impl TopologySource for Stalled {
        fn fetch(&self, _url: &str) -> BoxFuture<'_, Result<Vec<u8>, LoadError>> {
            Box::pin(std::future::pending())
        }
    }

    #[tokio::test]
    async fn waits_for_land_to_settle() {
        let topology = MemoryTopologySource::new().with_document("mem://land", LAND);
        let state = load_land(topology, LandSource::new("mem://land", "land"), Duration::from_secs(5)).await;
        assert_eq!(state.features().map(|fc| fc.len()), Some(1));
    }

    #[tokio::test]
    async fn deadline_turns_into_a_network_failure() {
        let state = load_land(Stalled, LandSource::new("mem://slow", "land"), Duration::from_millis(20)).await;
        let err = state.error().expect("failed state");
        assert_eq!(err.kind(), LoadErrorKind::Network);
        assert!(err.message.contains("timed out"));
    }
}

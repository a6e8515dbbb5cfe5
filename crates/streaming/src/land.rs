//! Land geometry lifecycle: Unstarted → Pending → Ready | Failed.
//!
//! The loader itself performs no I/O. Every fetch attempt is described by a
//! [`LoadTicket`]; only the outcome of the ticket carrying the current
//! generation may commit, so results of superseded attempts are dropped no
//! matter when they arrive.

use std::sync::Arc;

use formats::FeatureCollection;
use tracing::{info, warn};

use crate::error::LoadError;

/// Where land outlines come from: a topology document and the name of the
/// object inside it. Both fields are trimmed; empty means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LandSource {
    url: String,
    collection: String,
}

impl LandSource {
    pub fn new(url: impl AsRef<str>, collection: impl AsRef<str>) -> Self {
        Self {
            url: url.as_ref().trim().to_string(),
            collection: collection.as_ref().trim().to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn is_complete(&self) -> bool {
        !self.url.is_empty() && !self.collection.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LandGeometryState {
    #[default]
    Unstarted,
    Pending,
    Ready(Arc<FeatureCollection>),
    Failed(LoadError),
}

impl LandGeometryState {
    pub fn name(&self) -> &'static str {
        match self {
            LandGeometryState::Unstarted => "unstarted",
            LandGeometryState::Pending => "pending",
            LandGeometryState::Ready(_) => "ready",
            LandGeometryState::Failed(_) => "failed",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LandGeometryState::Ready(_))
    }

    /// Ready or failed: no fetch outstanding.
    pub fn is_settled(&self) -> bool {
        matches!(self, LandGeometryState::Ready(_) | LandGeometryState::Failed(_))
    }

    pub fn features(&self) -> Option<&Arc<FeatureCollection>> {
        match self {
            LandGeometryState::Ready(fc) => Some(fc),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LandGeometryState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// One fetch attempt. Hand it to the fetcher and back to [`LandGeometryLoader::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub source: LandSource,
}

#[derive(Debug, Default)]
pub struct LandGeometryLoader {
    source: LandSource,
    generation: u64,
    state: LandGeometryState,
}

impl LandGeometryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> &LandSource {
        &self.source
    }

    pub fn state(&self) -> &LandGeometryState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Updates the source. Returns a ticket when a fetch must start.
    ///
    /// An unchanged source is a no-op. An incomplete source returns the
    /// loader to `Unstarted` and invalidates any attempt in flight.
    pub fn set_source(&mut self, source: LandSource) -> Option<LoadTicket> {
        if source == self.source && self.state != LandGeometryState::Unstarted {
            return None;
        }
        self.source = source;
        if !self.source.is_complete() {
            if self.state != LandGeometryState::Unstarted {
                self.generation += 1;
                self.state = LandGeometryState::Unstarted;
                info!(generation = self.generation, "land source cleared");
            }
            return None;
        }
        Some(self.start())
    }

    /// Restarts the fetch for the current source, if it is complete.
    pub fn reload(&mut self) -> Option<LoadTicket> {
        self.source.is_complete().then(|| self.start())
    }

    fn start(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LandGeometryState::Pending;
        info!(
            generation = self.generation,
            url = %self.source.url,
            collection = %self.source.collection,
            "land fetch started"
        );
        LoadTicket {
            generation: self.generation,
            source: self.source.clone(),
        }
    }

    /// Applies a fetch outcome. Returns `false` (state untouched) when the
    /// ticket has been superseded.
    pub fn commit(
        &mut self,
        ticket: &LoadTicket,
        outcome: Result<FeatureCollection, LoadError>,
    ) -> bool {
        if ticket.generation != self.generation {
            warn!(
                stale = ticket.generation,
                current = self.generation,
                url = %ticket.source.url,
                "discarding superseded land fetch"
            );
            return false;
        }
        self.state = match outcome {
            Ok(fc) => {
                info!(generation = ticket.generation, features = fc.len(), "land ready");
                LandGeometryState::Ready(Arc::new(fc))
            }
            Err(e) => {
                warn!(generation = ticket.generation, error = %e, "land fetch failed");
                LandGeometryState::Failed(e)
            }
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{LandGeometryLoader, LandGeometryState, LandSource};
    use crate::error::{LoadError, LoadErrorKind};
    use formats::{Feature, FeatureCollection, Geometry};
    use pretty_assertions::assert_eq;

    fn one_feature() -> FeatureCollection {
        FeatureCollection::new(vec![Feature::new(Geometry::Point([1.0, 2.0]))])
    }

    #[test]
    fn source_fields_are_trimmed() {
        let s = LandSource::new("  https://example.test/land.json \n", " land ");
        assert_eq!(s.url(), "https://example.test/land.json");
        assert_eq!(s.collection(), "land");
        assert!(s.is_complete());
        assert!(!LandSource::new("https://example.test/land.json", "   ").is_complete());
    }

    #[test]
    fn incomplete_source_stays_unstarted() {
        let mut loader = LandGeometryLoader::new();
        assert!(loader.set_source(LandSource::new("", "land")).is_none());
        assert_eq!(loader.state(), &LandGeometryState::Unstarted);
        assert_eq!(loader.generation(), 0);
    }

    #[test]
    fn complete_source_goes_pending_then_ready() {
        let mut loader = LandGeometryLoader::new();
        let ticket = loader.set_source(LandSource::new("a.json", "land")).unwrap();
        assert_eq!(loader.state(), &LandGeometryState::Pending);
        assert!(loader.commit(&ticket, Ok(one_feature())));
        assert_eq!(loader.state().features().map(|fc| fc.len()), Some(1));
    }

    #[test]
    fn unchanged_source_does_not_refetch() {
        let mut loader = LandGeometryLoader::new();
        let ticket = loader.set_source(LandSource::new("a.json", "land")).unwrap();
        loader.commit(&ticket, Ok(one_feature()));
        assert!(loader.set_source(LandSource::new(" a.json", "land ")).is_none());
        assert!(loader.state().is_ready());
    }

    #[test]
    fn superseded_outcome_is_discarded() {
        let mut loader = LandGeometryLoader::new();
        let first = loader.set_source(LandSource::new("a.json", "land")).unwrap();
        let second = loader.set_source(LandSource::new("b.json", "land")).unwrap();
        assert!(second.generation > first.generation);

        assert!(loader.commit(&second, Err(LoadError::not_found("404"))));
        assert!(!loader.commit(&first, Ok(one_feature())));

        let err = loader.state().error().unwrap();
        assert_eq!(err.kind(), LoadErrorKind::NotFound);
    }

    #[test]
    fn failure_then_reload_retries() {
        let mut loader = LandGeometryLoader::new();
        let ticket = loader.set_source(LandSource::new("a.json", "land")).unwrap();
        loader.commit(&ticket, Err(LoadError::network("connection reset")));
        assert_eq!(loader.state().name(), "failed");

        let retry = loader.reload().unwrap();
        assert_eq!(retry.source, ticket.source);
        assert_eq!(loader.state(), &LandGeometryState::Pending);
        assert!(!loader.commit(&ticket, Ok(one_feature())));
        assert!(loader.commit(&retry, Ok(one_feature())));
        assert!(loader.state().is_ready());
    }

    #[test]
    fn clearing_the_source_drops_land_and_pending_fetch() {
        let mut loader = LandGeometryLoader::new();
        let ticket = loader.set_source(LandSource::new("a.json", "land")).unwrap();
        assert!(loader.set_source(LandSource::new("a.json", "")).is_none());
        assert_eq!(loader.state(), &LandGeometryState::Unstarted);
        assert!(!loader.commit(&ticket, Ok(one_feature())));
        assert!(loader.reload().is_none());
    }
}

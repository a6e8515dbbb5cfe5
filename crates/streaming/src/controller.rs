use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::land::{LandGeometryLoader, LandGeometryState, LandSource, LoadTicket};
use crate::source::{TopologySource, fetch_land};

/// Drives a [`LandGeometryLoader`] on the Tokio runtime.
///
/// At most one fetch runs at a time: a new source or a reload aborts the
/// task in flight, and the loader's generation check drops any result that
/// still slips through. State changes are published on a watch channel.
///
/// Methods that start a fetch must be called from within a Tokio runtime.
pub struct LandGeometryController<S: TopologySource + 'static> {
    source: Arc<S>,
    loader: Arc<Mutex<LandGeometryLoader>>,
    tx: watch::Sender<LandGeometryState>,
    task: Option<JoinHandle<()>>,
}

impl<S: TopologySource + 'static> LandGeometryController<S> {
    pub fn new(source: S) -> Self {
        let (tx, _rx) = watch::channel(LandGeometryState::Unstarted);
        Self {
            source: Arc::new(source),
            loader: Arc::new(Mutex::new(LandGeometryLoader::new())),
            tx,
            task: None,
        }
    }

    pub fn set_source(&mut self, source: LandSource) {
        let (ticket, changed) = {
            let mut loader = self.loader.lock();
            let before = loader.generation();
            let ticket = loader.set_source(source);
            (ticket, (loader.generation() != before).then(|| loader.state().clone()))
        };
        if let Some(state) = changed {
            self.abort_in_flight();
            self.tx.send_replace(state);
        }
        if let Some(ticket) = ticket {
            self.spawn(ticket);
        }
    }

    /// Refetches the current source. No-op while the source is incomplete.
    pub fn reload(&mut self) {
        let ticket = self.loader.lock().reload();
        if let Some(ticket) = ticket {
            self.abort_in_flight();
            self.tx.send_replace(LandGeometryState::Pending);
            self.spawn(ticket);
        }
    }

    pub fn state(&self) -> LandGeometryState {
        self.tx.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.loader.lock().generation()
    }

    pub fn subscribe(&self) -> watch::Receiver<LandGeometryState> {
        self.tx.subscribe()
    }

    fn abort_in_flight(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                debug!("aborting superseded land fetch");
            }
            task.abort();
        }
    }

    fn spawn(&mut self, ticket: LoadTicket) {
        let source = Arc::clone(&self.source);
        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            let outcome = fetch_land(source.as_ref(), &ticket).await;
            let mut loader = loader.lock();
            if loader.commit(&ticket, outcome) {
                tx.send_replace(loader.state().clone());
            }
        }));
    }
}

impl<S: TopologySource + 'static> Drop for LandGeometryController<S> {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use log::{debug, info};
use threadpool::ThreadPool;

use crate::data::feature_collection::FeatureCollection;
use crate::data::fetcher::{fetch_collection, Fetcher};
use crate::errors::error_types::{ErrorTypes, WORKER_LOST};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Parks,
    Trails,
}

impl DatasetKind {
    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::Parks => "parks",
            DatasetKind::Trails => "trails",
        }
    }
}

/// Both collections of a successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct Datasets {
    pub parks: FeatureCollection,
    pub trails: FeatureCollection,
}

type FetchOutcome = (DatasetKind, Result<FeatureCollection, ErrorTypes>);

/// The two dataset fetches in flight.
///
/// The first failure of either fetch fails the whole load; a partial result
/// is never returned.
pub struct PendingLoad {
    receiver: Receiver<FetchOutcome>,
    parks: Option<FeatureCollection>,
    trails: Option<FeatureCollection>,
    outcome: Option<Result<Datasets, ErrorTypes>>,
    settled: bool,
}

impl PendingLoad {
    /// Starts both fetches concurrently on `pool`.
    pub fn start(
        pool: &ThreadPool,
        fetcher: Arc<dyn Fetcher>,
        parks_location: &str,
        trails_location: &str,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();

        for (kind, location) in [
            (DatasetKind::Parks, parks_location.to_string()),
            (DatasetKind::Trails, trails_location.to_string()),
        ] {
            let sender = sender.clone();
            let fetcher = Arc::clone(&fetcher);
            pool.execute(move || {
                let result = fetch_collection(fetcher.as_ref(), kind.name(), &location);
                debug!("{} fetch finished, ok: {}", kind.name(), result.is_ok());
                let _ = sender.send((kind, result));
            });
        }

        Self {
            receiver,
            parks: None,
            trails: None,
            outcome: None,
            settled: false,
        }
    }

    /// Non-blocking check; returns the outcome once both fetches finished or
    /// one of them failed.
    pub fn poll(&mut self) -> Option<Result<Datasets, ErrorTypes>> {
        if self.settled {
            return None;
        }
        while self.outcome.is_none() {
            match self.receiver.try_recv() {
                Ok(outcome) => self.accept(outcome),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.outcome = Some(Err(worker_lost())),
            }
        }
        let outcome = self.outcome.take();
        self.settled = outcome.is_some();
        outcome
    }

    /// Blocks until the load settles.
    pub fn wait(mut self) -> Result<Datasets, ErrorTypes> {
        while self.outcome.is_none() {
            match self.receiver.recv() {
                Ok(outcome) => self.accept(outcome),
                Err(_) => self.outcome = Some(Err(worker_lost())),
            }
        }
        self.outcome.take().unwrap_or_else(|| Err(worker_lost()))
    }

    fn accept(&mut self, (kind, result): FetchOutcome) {
        match result {
            Err(err) => self.outcome = Some(Err(err)),
            Ok(collection) => {
                info!("Fetched {} {} features", collection.len(), collection.name());
                match kind {
                    DatasetKind::Parks => self.parks = Some(collection),
                    DatasetKind::Trails => self.trails = Some(collection),
                }
            }
        }

        if self.outcome.is_none() && self.parks.is_some() && self.trails.is_some() {
            if let (Some(parks), Some(trails)) = (self.parks.take(), self.trails.take()) {
                self.outcome = Some(Ok(Datasets { parks, trails }));
            }
        }
    }
}

fn worker_lost() -> ErrorTypes {
    ErrorTypes::new(
        WORKER_LOST,
        "A dataset fetch stopped without reporting a result".to_string(),
    )
}

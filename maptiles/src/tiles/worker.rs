//! Fetch worker threads.
//!
//! Each worker blocks on the request queue, resolves requests through the
//! shared [`TileFetcher`] and posts every outcome, success or failure, to
//! the data queue. Workers run until the request queue is shut down; a
//! fetch in progress is allowed to finish.

use crate::provider::FetchError;
use crate::tiles::fetcher::TileFetcher;
use crate::tiles::queue::{DataQueue, Dequeued, RequestQueue, TileResult};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// The per-thread side of the pool.
#[derive(Clone)]
pub struct FetchWorker {
    fetcher: Arc<TileFetcher>,
    requests: Arc<RequestQueue>,
    results: Arc<DataQueue>,
}

impl FetchWorker {
    pub fn new(
        fetcher: Arc<TileFetcher>,
        requests: Arc<RequestQueue>,
        results: Arc<DataQueue>,
    ) -> Self {
        Self {
            fetcher,
            requests,
            results,
        }
    }

    /// Handle one dequeue: report shed requests as failed, then fetch the
    /// remaining request, if any.
    pub fn process(&self, dequeued: Dequeued) {
        if !dequeued.shed.is_empty() {
            warn!(
                dropped = dequeued.shed.len(),
                bound = self.requests.max_len(),
                "Too many tiles requested, dropping oldest requests"
            );
            for request in dequeued.shed {
                self.results
                    .push(TileResult::failure(request.key, FetchError::QueueOverflow));
            }
        }

        let Some(request) = dequeued.request else {
            return;
        };

        let result = match self.fetcher.fetch(&request) {
            Ok(pixels) => TileResult::success(request.key, pixels),
            Err(e) => {
                warn!(key = %request.key, error = %e, "Tile fetch failed");
                TileResult::failure(request.key, e)
            }
        };
        self.results.push(result);
    }

    /// Process requests until the queue shuts down.
    pub fn run(&self) {
        let name = thread::current().name().unwrap_or("tiles").to_string();
        debug!(thread = %name, "Tile worker started");

        while let Some(dequeued) = self.requests.wait_next() {
            self.process(dequeued);
        }

        debug!(thread = %name, "Tile worker stopped");
    }
}

/// A fixed set of worker threads named `tiles<N>`.
pub struct WorkerPool {
    requests: Arc<RequestQueue>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `threads` workers. Zero is allowed and spawns none.
    ///
    /// If a spawn fails, the workers already started are stopped again.
    pub fn start(threads: usize, worker: FetchWorker) -> io::Result<Self> {
        let mut pool = Self {
            requests: Arc::clone(&worker.requests),
            handles: Vec::with_capacity(threads),
        };

        for i in 0..threads {
            let worker = worker.clone();
            let spawned = thread::Builder::new()
                .name(format!("tiles{}", i))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => pool.handles.push(handle),
                Err(e) => {
                    pool.shutdown();
                    return Err(e);
                }
            }
        }

        info!(
            source = %worker.fetcher.source().name,
            threads = threads,
            "Tile worker pool started"
        );
        Ok(pool)
    }

    /// Number of running worker threads.
    pub fn thread_count(&self) -> usize {
        self.handles.len()
    }

    /// Stop and join all workers.
    pub fn shutdown(&mut self) {
        self.requests.shutdown();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("Tile worker panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

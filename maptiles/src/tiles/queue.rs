//! Request and result queues between the owning thread and fetch workers.
//!
//! ```text
//!   get_tile ──push──▶ RequestQueue ──wait_next──▶ worker
//!                                                    │
//!   update ◀──drain── DataQueue ◀──────push──────────┘
//! ```
//!
//! The request queue has a soft bound. Pushing never fails; instead the
//! dequeuing worker sheds the oldest requests that exceed the bound and
//! reports them as failed.

use crate::codec::TilePixels;
use crate::provider::FetchError;
use crate::tiles::state::TileKey;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Default bound of the request queue.
pub const DEFAULT_MAX_TILES_IN_QUEUE: usize = 250;

/// A tile to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    pub key: TileKey,
    pub tx: u32,
    pub ty: u32,
    pub tz: u8,
}

impl TileRequest {
    pub fn new(key: TileKey) -> Self {
        Self {
            tx: key.tx(),
            ty: key.ty(),
            tz: key.tz(),
            key,
        }
    }
}

/// Outcome of a fetch, posted by a worker.
#[derive(Debug, Clone)]
pub struct TileResult {
    pub key: TileKey,
    pub outcome: Result<TilePixels, FetchError>,
}

impl TileResult {
    pub fn success(key: TileKey, pixels: TilePixels) -> Self {
        Self {
            key,
            outcome: Ok(pixels),
        }
    }

    pub fn failure(key: TileKey, error: FetchError) -> Self {
        Self {
            key,
            outcome: Err(error),
        }
    }

    /// Decoded pixels, if the fetch succeeded with a non-empty image.
    ///
    /// An empty payload counts as a failure.
    pub fn pixels(self) -> Option<TilePixels> {
        self.outcome.ok().filter(|pixels| !pixels.rgba.is_empty())
    }
}

/// What a worker gets from [`RequestQueue::try_next`] or
/// [`RequestQueue::wait_next`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Dequeued {
    /// Oldest requests dropped because the queue was over its bound
    pub shed: Vec<TileRequest>,
    /// The request to process, if any remained
    pub request: Option<TileRequest>,
}

#[derive(Debug, Default)]
struct RequestState {
    requests: VecDeque<TileRequest>,
    aborted: bool,
}

/// FIFO of pending requests, shared by all workers of a pool.
#[derive(Debug)]
pub struct RequestQueue {
    state: Mutex<RequestState>,
    available: Condvar,
    max_len: usize,
}

impl RequestQueue {
    /// Create a queue with the given soft bound.
    pub fn new(max_len: usize) -> Self {
        Self {
            state: Mutex::new(RequestState::default()),
            available: Condvar::new(),
            max_len,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RequestState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a request and wake one waiting worker.
    pub fn push(&self, request: TileRequest) {
        self.lock().requests.push_back(request);
        self.available.notify_one();
    }

    /// Number of queued requests.
    pub fn len(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().requests.is_empty()
    }

    /// The soft bound.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Take the next request without blocking.
    ///
    /// Returns `None` when the queue is empty.
    pub fn try_next(&self) -> Option<Dequeued> {
        let mut state = self.lock();
        if state.requests.is_empty() {
            return None;
        }
        Some(self.take(&mut state))
    }

    /// Block until a request is available or the queue is shut down.
    ///
    /// Returns `None` once [`shutdown`](Self::shutdown) has been called.
    pub fn wait_next(&self) -> Option<Dequeued> {
        let mut state = self.lock();
        loop {
            if state.aborted {
                return None;
            }
            if !state.requests.is_empty() {
                return Some(self.take(&mut state));
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn take(&self, state: &mut RequestState) -> Dequeued {
        let excess = state.requests.len().saturating_sub(self.max_len);
        let shed = state.requests.drain(..excess).collect();
        Dequeued {
            shed,
            request: state.requests.pop_front(),
        }
    }

    /// Wake all workers and make [`wait_next`](Self::wait_next) return `None`.
    ///
    /// Queued requests are left in place.
    pub fn shutdown(&self) {
        self.lock().aborted = true;
        self.available.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.lock().aborted
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TILES_IN_QUEUE)
    }
}

/// Results posted by workers, drained by the owning thread.
#[derive(Debug, Default)]
pub struct DataQueue {
    results: Mutex<VecDeque<TileResult>>,
}

impl DataQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<TileResult>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, result: TileResult) {
        self.lock().push_back(result);
    }

    /// Take one result, oldest first.
    pub fn pop(&self) -> Option<TileResult> {
        self.lock().pop_front()
    }

    /// Take all queued results, oldest first.
    pub fn drain(&self) -> Vec<TileResult> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn request(x: u32) -> TileRequest {
        TileRequest::new(TileKey::new("src", x, 0, 10))
    }

    #[test]
    fn test_fifo_order() {
        let queue = RequestQueue::new(10);
        queue.push(request(1));
        queue.push(request(2));

        assert_eq!(queue.try_next().unwrap().request, Some(request(1)));
        assert_eq!(queue.try_next().unwrap().request, Some(request(2)));
        assert!(queue.try_next().is_none());
    }

    #[test]
    fn test_sheds_oldest_excess() {
        let queue = RequestQueue::new(3);
        for x in 0..5 {
            queue.push(request(x));
        }
        assert_eq!(queue.len(), 5);

        let dequeued = queue.try_next().unwrap();
        assert_eq!(dequeued.shed, vec![request(0), request(1)]);
        assert_eq!(dequeued.request, Some(request(2)));
        assert_eq!(queue.len(), 2);

        let dequeued = queue.try_next().unwrap();
        assert!(dequeued.shed.is_empty());
        assert_eq!(dequeued.request, Some(request(3)));
    }

    #[test]
    fn test_zero_bound_sheds_everything() {
        let queue = RequestQueue::new(0);
        queue.push(request(0));
        queue.push(request(1));

        let dequeued = queue.try_next().unwrap();
        assert_eq!(dequeued.shed.len(), 2);
        assert_eq!(dequeued.request, None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wait_next_wakes_on_push() {
        let queue = Arc::new(RequestQueue::new(10));
        let worker_queue = Arc::clone(&queue);
        let handle = thread::spawn(move || worker_queue.wait_next());

        thread::sleep(Duration::from_millis(20));
        queue.push(request(7));

        let dequeued = handle.join().unwrap().unwrap();
        assert_eq!(dequeued.request, Some(request(7)));
    }

    #[test]
    fn test_shutdown_releases_waiters() {
        let queue = Arc::new(RequestQueue::new(10));
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let q = Arc::clone(&queue);
                thread::spawn(move || q.wait_next())
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        queue.shutdown();

        for handle in handles {
            assert!(handle.join().unwrap().is_none());
        }
        assert!(queue.is_shutdown());
    }

    #[test]
    fn test_data_queue_drain_order() {
        let data = DataQueue::new();
        data.push(TileResult::failure(
            TileKey::new("src", 0, 0, 0),
            FetchError::QueueOverflow,
        ));
        data.push(TileResult::failure(
            TileKey::new("src", 1, 0, 0),
            FetchError::QueueOverflow,
        ));
        assert_eq!(data.len(), 2);

        let drained = data.drain();
        assert_eq!(drained[0].key, TileKey::new("src", 0, 0, 0));
        assert_eq!(drained[1].key, TileKey::new("src", 1, 0, 0));
        assert!(data.is_empty());
    }

    #[test]
    fn test_empty_payload_is_failure() {
        let result = TileResult::success(
            TileKey::new("src", 0, 0, 0),
            TilePixels {
                width: 0,
                height: 0,
                rgba: Vec::new(),
            },
        );
        assert!(result.pixels().is_none());
    }
}

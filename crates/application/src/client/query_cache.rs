use std::future::Future;
use std::sync::Arc;

use brokerdesk_core::{AppError, AppResult};
use tokio::sync::{Mutex, OnceCell};

/// Read state handed to views.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot<V> {
    /// Last successfully fetched (or optimistically edited) value.
    pub data: Option<V>,
    /// A fetch is in flight.
    pub is_loading: bool,
    /// Error of the last fetch, cleared by the next success.
    pub error: Option<AppError>,
}

type InFlight<V> = Arc<OnceCell<AppResult<V>>>;

struct CacheState<V> {
    data: Option<V>,
    error: Option<AppError>,
    generation: u64,
    in_flight: Option<(u64, InFlight<V>)>,
    stale: bool,
}

/// Cached value of one query key.
///
/// Concurrent fetches share one request. Bumping the generation through
/// [`QueryCache::cancel_in_flight`] or [`QueryCache::invalidate`] makes a
/// fetch that is already running discard its result.
pub struct QueryCache<V> {
    key: String,
    state: Mutex<CacheState<V>>,
}

impl<V: Clone + Send + Sync + 'static> QueryCache<V> {
    /// Creates an empty cache for a key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: Mutex::new(CacheState {
                data: None,
                error: None,
                generation: 0,
                in_flight: None,
                stale: true,
            }),
        }
    }

    /// Returns the cache key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the current read state without fetching.
    pub async fn snapshot(&self) -> QuerySnapshot<V> {
        let state = self.state.lock().await;
        QuerySnapshot {
            data: state.data.clone(),
            is_loading: state
                .in_flight
                .as_ref()
                .is_some_and(|(generation, _)| *generation == state.generation),
            error: state.error.clone(),
        }
    }

    /// Returns whether the next read should fetch.
    pub async fn is_stale(&self) -> bool {
        self.state.lock().await.stale
    }

    /// Runs the loader, or joins the fetch already in flight.
    ///
    /// Errors are stored and returned; nothing is retried.
    pub async fn fetch<F, Fut>(&self, loader: F) -> AppResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<V>>,
    {
        let (generation, cell) = {
            let mut state = self.state.lock().await;
            let generation = state.generation;
            let cell = match &state.in_flight {
                Some((in_flight, cell)) if *in_flight == generation => Arc::clone(cell),
                _ => {
                    let cell = Arc::new(OnceCell::new());
                    state.in_flight = Some((generation, Arc::clone(&cell)));
                    cell
                }
            };
            (generation, cell)
        };

        let result = cell.get_or_init(loader).await.clone();

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(key = %self.key, "discarding superseded fetch");
            return result;
        }

        match &result {
            Ok(value) => {
                state.data = Some(value.clone());
                state.error = None;
            }
            Err(error) => {
                tracing::warn!(key = %self.key, %error, "query failed");
                state.error = Some(error.clone());
            }
        }
        state.stale = false;
        if state
            .in_flight
            .as_ref()
            .is_some_and(|(in_flight, _)| *in_flight == generation)
        {
            state.in_flight = None;
        }
        result
    }

    /// Makes the fetch in flight unable to overwrite the cache.
    pub async fn cancel_in_flight(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.in_flight = None;
    }

    /// Marks the value stale and supersedes the fetch in flight.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.in_flight = None;
        state.stale = true;
    }

    /// Edits the cached value in place and returns the closure's output.
    ///
    /// Returns `None` when nothing has been fetched yet.
    pub async fn update<R>(&self, edit: impl FnOnce(&mut V) -> R) -> Option<R> {
        let mut state = self.state.lock().await;
        state.data.as_mut().map(edit)
    }

    /// Replaces the cached value.
    pub async fn set(&self, value: V) {
        self.state.lock().await.data = Some(value);
    }
}

//! World state and the viewport window cache.
//!
//! The world is a square torus of `world_size` cells. The backend serves fixed
//! `VIEWPORT_EDGE`-sized windows of it, addressed by their top-left origin.
//! Origins are kept in `[0, world_size - edge]` on both axes.
//!
//! Fetching goes through a small state machine so that at most one request is
//! outstanding: `Idle` starts a fetch, `InFlight` hands callers the pending
//! result, `Cached` serves the last window until it is invalidated.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cell::CellGrid;
use crate::error::FetchError;
use crate::source::{MinimapResponse, TerrainSource, ViewportResponse};

/// Edge length of a fetched window, in cells.
pub const VIEWPORT_EDGE: usize = 100;

/// Move one axis of an origin by `delta`, wrapping around the world.
///
/// The raw position is reduced modulo the world size. A residue past the last
/// valid origin lies in the seam gap; it is folded back in the direction of
/// travel so crossing the seam continues from the opposite side.
pub fn wrap_axis(current: u32, delta: i64, world_size: u32, edge: usize) -> u32 {
    let world = world_size as i64;
    let edge = edge as i64;
    if world <= edge {
        return 0;
    }
    let max_pos = world - edge;
    let r = (current as i64 + delta).rem_euclid(world);

    let folded = if r <= max_pos {
        r
    } else if delta >= 0 {
        r % (max_pos + 1)
    } else {
        max_pos - (world - r) % (max_pos + 1)
    };
    folded as u32
}

/// One fetched window, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportWindow {
    pub cells: CellGrid,
    /// Origin the window was requested for.
    pub origin: (u32, u32),
    /// World size reported alongside the window, if any.
    pub world_size: Option<u32>,
    /// Backend simulation timestamp.
    pub timestamp: Option<f64>,
    pub fetched_at: DateTime<Utc>,
    /// Increases with every fetch started; newer windows supersede older ones.
    pub request_id: u64,
}

impl ViewportWindow {
    fn from_response(response: ViewportResponse, origin: (u32, u32), request_id: u64) -> Self {
        let world_size = response.world_size();
        Self {
            cells: CellGrid::from_rows(response.viewport),
            origin,
            world_size,
            timestamp: response.timestamp,
            fetched_at: Utc::now(),
            request_id,
        }
    }
}

type Shared = Option<Result<Arc<ViewportWindow>, FetchError>>;

enum FetchState {
    Idle,
    InFlight {
        request_id: u64,
        result: watch::Receiver<Shared>,
    },
    Cached(Arc<ViewportWindow>),
}

impl FetchState {
    fn in_flight_id(&self) -> Option<u64> {
        match self {
            FetchState::InFlight { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }
}

struct Inner {
    world_size: u32,
    origin: (u32, u32),
    state: FetchState,
    next_request_id: u64,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resets the slot if the fetching future is dropped before it finishes.
struct InFlightGuard<'a> {
    inner: &'a Mutex<Inner>,
    request_id: u64,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = lock(self.inner);
        if inner.state.in_flight_id() == Some(self.request_id) {
            debug!(request_id = self.request_id, "viewport fetch dropped, slot cleared");
            inner.state = FetchState::Idle;
        }
    }
}

enum Role {
    Leader {
        request_id: u64,
        origin: (u32, u32),
        publish: watch::Sender<Shared>,
    },
    Follower(watch::Receiver<Shared>),
}

pub struct ViewportState<S> {
    source: Arc<S>,
    edge: usize,
    inner: Mutex<Inner>,
}

impl<S: TerrainSource> ViewportState<S> {
    pub fn new(source: Arc<S>, world_size: u32) -> Self {
        Self::with_edge(source, world_size, VIEWPORT_EDGE)
    }

    pub fn with_edge(source: Arc<S>, world_size: u32, edge: usize) -> Self {
        Self {
            source,
            edge,
            inner: Mutex::new(Inner {
                world_size: world_size.max(1),
                origin: (0, 0),
                state: FetchState::Idle,
                next_request_id: 0,
            }),
        }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn edge(&self) -> usize {
        self.edge
    }

    pub fn world_size(&self) -> u32 {
        lock(&self.inner).world_size
    }

    pub fn origin(&self) -> (u32, u32) {
        lock(&self.inner).origin
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.inner).state.in_flight_id().is_some()
    }

    pub fn cached(&self) -> Option<Arc<ViewportWindow>> {
        match &lock(&self.inner).state {
            FetchState::Cached(window) => Some(Arc::clone(window)),
            _ => None,
        }
    }

    /// Shift the origin by `(dx, dy)` cells with wraparound. Drops the cache.
    pub fn move_by(&self, dx: i64, dy: i64) -> (u32, u32) {
        let mut inner = lock(&self.inner);
        let (x, y) = inner.origin;
        let world = inner.world_size;
        inner.origin = (
            wrap_axis(x, dx, world, self.edge),
            wrap_axis(y, dy, world, self.edge),
        );
        inner.state = FetchState::Idle;
        inner.origin
    }

    /// Adopt a world size reported by the backend. Zero is ignored.
    pub fn set_world_size(&self, world_size: u32) {
        let mut inner = lock(&self.inner);
        Self::apply_world_size(&mut inner, world_size, self.edge);
    }

    fn apply_world_size(inner: &mut Inner, world_size: u32, edge: usize) {
        if world_size == 0 || world_size == inner.world_size {
            return;
        }
        info!(from = inner.world_size, to = world_size, "world size changed");
        inner.world_size = world_size;
        let (x, y) = inner.origin;
        let origin = (wrap_axis(x, 0, world_size, edge), wrap_axis(y, 0, world_size, edge));
        if origin != inner.origin {
            inner.origin = origin;
            inner.state = FetchState::Idle;
        }
    }

    /// Forget the cached window. An outstanding fetch keeps running but its
    /// result no longer populates the cache.
    pub fn invalidate(&self) {
        lock(&self.inner).state = FetchState::Idle;
    }

    /// The window at the current origin, fetching it if needed. Concurrent
    /// callers share a single outstanding request.
    pub async fn window(&self) -> Result<Arc<ViewportWindow>, FetchError> {
        let role = {
            let mut guard = lock(&self.inner);
            let inner = &mut *guard;
            match &inner.state {
                FetchState::Cached(window) => return Ok(Arc::clone(window)),
                FetchState::InFlight { result, .. } => Role::Follower(result.clone()),
                FetchState::Idle => {
                    let request_id = inner.next_request_id;
                    inner.next_request_id += 1;
                    let (publish, result) = watch::channel(None);
                    inner.state = FetchState::InFlight { request_id, result };
                    Role::Leader {
                        request_id,
                        origin: inner.origin,
                        publish,
                    }
                }
            }
        };

        match role {
            Role::Follower(mut result) => {
                // A closed channel means the leader was dropped mid-fetch.
                let shared = match result.wait_for(Option::is_some).await {
                    Ok(shared) => shared.clone(),
                    Err(_) => None,
                };
                shared.unwrap_or(Err(FetchError::Abandoned))
            }
            Role::Leader {
                request_id,
                origin,
                publish,
            } => {
                let result = self.lead(request_id, origin).await;
                // Nobody listening is fine.
                let _ = publish.send(Some(result.clone()));
                result
            }
        }
    }

    async fn lead(&self, request_id: u64, origin: (u32, u32)) -> Result<Arc<ViewportWindow>, FetchError> {
        let mut guard = InFlightGuard {
            inner: &self.inner,
            request_id,
            armed: true,
        };
        info!(request_id, x = origin.0, y = origin.1, "fetching viewport");

        let result = self
            .source
            .fetch_viewport(origin, self.edge)
            .await
            .map(|response| Arc::new(ViewportWindow::from_response(response, origin, request_id)));
        guard.armed = false;

        let mut inner = lock(&self.inner);
        if let Ok(window) = &result {
            if let Some(size) = window.world_size {
                Self::apply_world_size(&mut inner, size, self.edge);
            }
        }

        if inner.state.in_flight_id() != Some(request_id) {
            debug!(request_id, "viewport result superseded, not cached");
            return result;
        }

        inner.state = match &result {
            Ok(window) if inner.origin == origin => {
                info!(request_id, rows = window.cells.height, "viewport cached");
                FetchState::Cached(Arc::clone(window))
            }
            Ok(_) => FetchState::Idle,
            Err(err) => {
                warn!(request_id, error = %err, "viewport fetch failed");
                FetchState::Idle
            }
        };
        result
    }

    /// Fetch the whole-world snapshot and adopt its world size.
    pub async fn fetch_minimap(&self, resolution: u32) -> Result<MinimapResponse, FetchError> {
        let response = self.source.fetch_minimap(resolution).await;
        match &response {
            Ok(minimap) => {
                if let Some(size) = minimap.world_size() {
                    self.set_world_size(size);
                }
            }
            Err(err) => warn!(error = %err, "minimap fetch failed"),
        }
        response
    }
}

//! Interactive session: everything the viewer mutates in response to input,
//! timers and fetch completions, kept free of any windowing code.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::cell::{CellGrid, CellInfo, Selection};
use crate::compositor::{Compositor, FrameInput};
use crate::config::ViewerConfig;
use crate::error::FetchError;
use crate::minimap::{click_to_delta, MinimapCompositor, ViewMarker};
use crate::settings::VisualizationSettings;
use crate::source::{MinimapResponse, TerrainSource};
use crate::surface::Surface;
use crate::viewport::{ViewportState, ViewportWindow};

/// Fixed-interval timer. Fires immediately the first time.
#[derive(Clone, Debug)]
pub struct RefreshSchedule {
    interval: Duration,
    last: Option<Instant>,
}

impl RefreshSchedule {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn due(&self, now: Instant) -> bool {
        match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn delta(&self, step: i64) -> (i64, i64) {
        match self {
            Direction::Left => (-step, 0),
            Direction::Right => (step, 0),
            Direction::Up => (0, -step),
            Direction::Down => (0, step),
        }
    }
}

/// Settings the keyboard can flip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    Rivers,
    Contours,
    Clouds,
    Precipitation,
    Elevation,
    Moisture,
    Wireframe,
}

/// Fetches the caller should start this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingFetches {
    pub viewport: bool,
    pub minimap: bool,
}

pub struct Session<S> {
    state: Arc<ViewportState<S>>,
    compositor: Compositor,
    minimap: MinimapCompositor,
    settings: VisualizationSettings,
    canvas: (u32, u32),
    move_step: u32,

    window: Option<Arc<ViewportWindow>>,
    last_applied: Option<u64>,
    minimap_grid: CellGrid,
    selection: Selection,

    viewport_refresh: RefreshSchedule,
    minimap_refresh: RefreshSchedule,
    viewport_dirty: bool,
    tick: u64,
}

impl<S: TerrainSource> Session<S> {
    pub fn new(state: Arc<ViewportState<S>>, config: &ViewerConfig) -> Self {
        let compositor = Compositor::new().with_viewport_edge(state.edge());
        Self {
            state,
            compositor,
            minimap: MinimapCompositor::new(config.minimap_size),
            settings: config.settings.clone().normalized(),
            canvas: (config.canvas_width, config.canvas_height),
            move_step: config.move_step,
            window: None,
            last_applied: None,
            minimap_grid: CellGrid::default(),
            selection: Selection::default(),
            viewport_refresh: RefreshSchedule::new(config.viewport_refresh()),
            minimap_refresh: RefreshSchedule::new(config.minimap_refresh()),
            viewport_dirty: true,
            tick: 0,
        }
    }

    pub fn state(&self) -> &Arc<ViewportState<S>> {
        &self.state
    }

    pub fn settings(&self) -> &VisualizationSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: VisualizationSettings) {
        self.settings = settings.normalized();
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn window(&self) -> Option<&Arc<ViewportWindow>> {
        self.window.as_ref()
    }

    pub fn minimap_grid(&self) -> &CellGrid {
        &self.minimap_grid
    }

    pub fn canvas(&self) -> (u32, u32) {
        self.canvas
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn set_viewport_refresh(&mut self, interval: Duration) {
        self.viewport_refresh.set_interval(interval);
    }

    pub fn cycle_color_mode(&mut self) {
        let next = self.settings.color_mode.next();
        self.settings = self.settings.with_color_mode(next);
    }

    pub fn toggle(&mut self, toggle: Toggle) {
        let s = &mut self.settings;
        let flag = match toggle {
            Toggle::Rivers => &mut s.show_rivers,
            Toggle::Contours => &mut s.contour_lines,
            Toggle::Clouds => &mut s.show_clouds,
            Toggle::Precipitation => &mut s.show_precipitation,
            Toggle::Elevation => &mut s.show_elevation,
            Toggle::Moisture => &mut s.show_moisture,
            Toggle::Wireframe => &mut s.wireframe,
        };
        *flag = !*flag;
    }

    pub fn zoom(&mut self, factor: f64) {
        self.settings = self.settings.zoomed(factor);
    }

    /// The cell under a canvas pixel in the window currently on screen.
    pub fn resolve(&self, px: f64, py: f64) -> Option<CellInfo> {
        let window = self.window.as_ref()?;
        let geometry = self.compositor.geometry(&self.settings, self.canvas.0, self.canvas.1)?;
        let (lx, ly) = geometry.cell_at(px, py)?;
        let cell = window.cells.get(lx, ly)?;

        let world_size = self.state.world_size().max(1) as u64;
        let world = (
            ((window.origin.0 as u64 + lx as u64) % world_size) as u32,
            ((window.origin.1 as u64 + ly as u64) % world_size) as u32,
        );
        Some(CellInfo {
            cell: cell.clone(),
            local: (lx, ly),
            world,
            pointer: (px, py),
        })
    }

    pub fn pointer_moved(&mut self, px: f64, py: f64) {
        self.selection.hovered = self.resolve(px, py);
    }

    pub fn pointer_left(&mut self) {
        self.selection.hovered = None;
    }

    /// Select the clicked cell; clicking the selected cell again clears it.
    /// Clicks that miss every cell are ignored.
    pub fn click(&mut self, px: f64, py: f64) {
        let Some(info) = self.resolve(px, py) else {
            return;
        };
        let reselect = self
            .selection
            .selected
            .as_ref()
            .is_some_and(|current| current.same_cell(&info));
        self.selection.selected = if reselect { None } else { Some(info) };
    }

    pub fn move_view(&mut self, dx: i64, dy: i64) -> (u32, u32) {
        let origin = self.state.move_by(dx, dy);
        self.viewport_dirty = true;
        origin
    }

    pub fn step(&mut self, direction: Direction) -> (u32, u32) {
        let (dx, dy) = direction.delta(self.move_step as i64);
        self.move_view(dx, dy)
    }

    pub fn marker(&self) -> ViewMarker {
        ViewMarker {
            origin: self.state.origin(),
            world_size: self.state.world_size(),
            viewport_edge: self.state.edge(),
        }
    }

    /// Centre the view on the world cell under a minimap click.
    pub fn minimap_click(&mut self, px: f64, py: f64) -> Option<(u32, u32)> {
        let (dx, dy) = click_to_delta((px, py), self.minimap.size(), &self.marker())?;
        Some(self.move_view(dx, dy))
    }

    /// Decide which fetches to start now. A due viewport refresh drops the
    /// cached window first so the next fetch goes to the backend.
    pub fn poll_refresh(&mut self, now: Instant) -> PendingFetches {
        if self.viewport_refresh.due(now) {
            self.viewport_refresh.mark(now);
            self.state.invalidate();
            self.viewport_dirty = true;
        }
        let minimap = self.minimap_refresh.due(now);
        if minimap {
            self.minimap_refresh.mark(now);
        }
        PendingFetches {
            viewport: std::mem::take(&mut self.viewport_dirty),
            minimap,
        }
    }

    /// Take a finished viewport fetch. Older results than the one on screen
    /// are dropped; failures leave the current window in place.
    pub fn apply_viewport(&mut self, result: Result<Arc<ViewportWindow>, FetchError>) -> bool {
        match result {
            Ok(window) => {
                if self.last_applied.is_some_and(|id| window.request_id <= id) {
                    debug!(request_id = window.request_id, "ignoring stale viewport");
                    return false;
                }
                self.last_applied = Some(window.request_id);
                self.window = Some(window);
                true
            }
            Err(err) => {
                warn!(error = %err, "viewport fetch failed, keeping previous view");
                false
            }
        }
    }

    pub fn apply_minimap(&mut self, result: Result<MinimapResponse, FetchError>) -> bool {
        match result {
            Ok(response) => {
                self.minimap_grid = CellGrid::from_rows(response.minimap);
                true
            }
            Err(err) => {
                warn!(error = %err, "minimap fetch failed, keeping previous snapshot");
                false
            }
        }
    }

    /// Advance the animation clock by one frame.
    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Draw the main view. Without a window only the background is drawn.
    pub fn render(&self, surface: &mut Surface) {
        let empty = CellGrid::default();
        let (window, origin) = match &self.window {
            Some(w) => (&w.cells, w.origin),
            None => (&empty, (0, 0)),
        };
        self.compositor.render(
            surface,
            &FrameInput {
                window,
                settings: &self.settings,
                origin,
                world_size: self.state.world_size(),
                selection: &self.selection,
                tick: self.tick,
            },
        );
    }

    pub fn render_minimap(&mut self, surface: &mut Surface, now: DateTime<Utc>) {
        let marker = self.marker();
        self.minimap
            .render(surface, &self.minimap_grid, &self.compositor, &self.settings, &marker, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ColorMode;
    use crate::source::testing::FakeSource;

    fn config() -> ViewerConfig {
        ViewerConfig {
            canvas_width: 40,
            canvas_height: 40,
            settings: VisualizationSettings {
                zoom_level: 1.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn session(source: FakeSource) -> Session<FakeSource> {
        let state = Arc::new(ViewportState::with_edge(Arc::new(source), 1000, 4));
        Session::new(state, &config())
    }

    async fn loaded() -> Session<FakeSource> {
        let mut session = session(FakeSource::default());
        let window = session.state().window().await;
        assert!(session.apply_viewport(window));
        session
    }

    #[tokio::test]
    async fn test_pointer_resolves_cell() {
        let mut session = loaded().await;
        session.pointer_moved(15.0, 25.0);
        let hovered = session.selection().hovered.clone().unwrap();
        assert_eq!(hovered.local, (1, 2));
        assert_eq!(hovered.world, (1, 2));
        assert_eq!((hovered.cell.x, hovered.cell.y), (1, 2));

        session.pointer_left();
        assert!(session.selection().hovered.is_none());
    }

    #[tokio::test]
    async fn test_click_toggles_selection() {
        let mut session = loaded().await;
        session.click(5.0, 5.0);
        assert_eq!(session.selection().selected.as_ref().map(|c| c.world), Some((0, 0)));
        session.click(35.0, 5.0);
        assert_eq!(session.selection().selected.as_ref().map(|c| c.world), Some((3, 0)));
        session.click(36.0, 6.0);
        assert!(session.selection().selected.is_none());
    }

    #[tokio::test]
    async fn test_click_outside_window_is_ignored() {
        let mut session = loaded().await;
        session.click(5.0, 5.0);
        session.click(-3.0, 5.0);
        session.click(5.0, 400.0);
        assert_eq!(session.selection().selected.as_ref().map(|c| c.world), Some((0, 0)));
    }

    #[test]
    fn test_pointer_without_window_resolves_nothing() {
        let mut session = session(FakeSource::default());
        session.pointer_moved(5.0, 5.0);
        assert!(session.selection().is_empty());
    }

    #[tokio::test]
    async fn test_stale_result_is_ignored() {
        let mut session = loaded().await;
        let current = session.window().cloned().unwrap();

        let older = Arc::new(ViewportWindow {
            request_id: 0,
            ..(*current).clone()
        });
        let newer = Arc::new(ViewportWindow {
            request_id: current.request_id + 5,
            ..(*current).clone()
        });
        assert!(!session.apply_viewport(Ok(older)));
        assert!(session.apply_viewport(Ok(Arc::clone(&newer))));
        assert_eq!(session.window().map(|w| w.request_id), Some(newer.request_id));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_window() {
        let mut session = loaded().await;
        assert!(!session.apply_viewport(Err(FetchError::Abandoned)));
        assert!(session.window().is_some());
    }

    #[test]
    fn test_arrow_keys_move_by_step() {
        let mut session = session(FakeSource::default());
        let now = Instant::now();
        session.poll_refresh(now);

        assert_eq!(session.step(Direction::Right), (10, 0));
        assert_eq!(session.step(Direction::Down), (10, 10));
        assert_eq!(session.step(Direction::Left), (0, 10));

        let pending = session.poll_refresh(now);
        assert!(pending.viewport);
        assert!(!session.poll_refresh(now).viewport);
    }

    #[test]
    fn test_refresh_schedule() {
        let start = Instant::now();
        let mut schedule = RefreshSchedule::new(Duration::from_secs(30));
        assert!(schedule.due(start));
        schedule.mark(start);
        assert!(!schedule.due(start + Duration::from_secs(29)));
        assert!(schedule.due(start + Duration::from_secs(30)));
    }

    #[test]
    fn test_first_poll_fetches_both() {
        let mut session = session(FakeSource::default());
        let now = Instant::now();
        assert_eq!(
            session.poll_refresh(now),
            PendingFetches {
                viewport: true,
                minimap: true
            }
        );
        assert_eq!(session.poll_refresh(now), PendingFetches::default());
        let later = now + Duration::from_secs(31);
        assert_eq!(
            session.poll_refresh(later),
            PendingFetches {
                viewport: true,
                minimap: false
            }
        );
    }

    #[test]
    fn test_minimap_click_centres_view() {
        let mut session = session(FakeSource::default());
        // 150 px minimap over a 1000-cell world: pixel 75 is cell 500.
        assert_eq!(session.minimap_click(75.0, 75.0), Some((498, 498)));
    }

    #[test]
    fn test_keyboard_settings() {
        let mut session = session(FakeSource::default());
        session.cycle_color_mode();
        assert_eq!(session.settings().color_mode, ColorMode::Heightmap);
        session.toggle(Toggle::Clouds);
        assert!(session.settings().show_clouds);
        session.toggle(Toggle::Rivers);
        assert!(!session.settings().show_rivers);
        session.zoom(100.0);
        assert_eq!(session.settings().zoom_level, 5.0);
    }

    #[tokio::test]
    async fn test_minimap_data_renders() {
        let mut session = session(FakeSource::default());
        let minimap = session.state().fetch_minimap(3).await;
        assert!(session.apply_minimap(minimap));
        assert_eq!(session.minimap_grid().width, 3);

        let mut surface = Surface::new(150, 150);
        session.render_minimap(&mut surface, Utc::now());
        let expected = session
            .compositor
            .color_of(&crate::cell::TerrainCell::default(), session.settings());
        assert_eq!(surface.pixel(140, 140), Some(expected));
    }
}

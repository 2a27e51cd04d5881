//! Minimap: a cached low-resolution raster of the whole world plus a
//! rectangle marking the part the main view shows.

use chrono::{DateTime, Duration, Utc};
use image::RgbaImage;
use tracing::info;

use crate::cell::CellGrid;
use crate::color::Rgba;
use crate::compositor::{Compositor, BACKGROUND};
use crate::geometry::PixelRect;
use crate::settings::{ColorMode, VisualizationSettings};
use crate::surface::Surface;

/// Edge of the minimap bitmap, in pixels.
pub const MINIMAP_SIZE: u32 = 150;
/// Age after which the cached bitmap is re-rendered even if nothing changed.
pub const STALENESS_MINUTES: i64 = 10;

const INDICATOR_COLOR: Rgba = Rgba::new(255, 215, 0, 0.9);
const INDICATOR_WIDTH: f64 = 2.0;

struct MinimapCache {
    image: RgbaImage,
    rendered_at: DateTime<Utc>,
    mode: ColorMode,
}

/// Where the main view sits in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewMarker {
    pub origin: (u32, u32),
    pub world_size: u32,
    pub viewport_edge: usize,
}

pub struct MinimapCompositor {
    size: u32,
    cache: Option<MinimapCache>,
    renders: u64,
}

impl Default for MinimapCompositor {
    fn default() -> Self {
        Self::new(MINIMAP_SIZE)
    }
}

impl MinimapCompositor {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            cache: None,
            renders: 0,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// How many times the terrain raster has been rebuilt.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn needs_render(&self, mode: ColorMode, now: DateTime<Utc>) -> bool {
        match &self.cache {
            None => true,
            Some(cache) => cache.mode != mode || now - cache.rendered_at > Duration::minutes(STALENESS_MINUTES),
        }
    }

    /// Draw the minimap into `surface`. The terrain comes from the cache unless
    /// it is missing, stale or was drawn in another colour mode; the view
    /// marker is drawn fresh every time. An empty grid draws nothing.
    pub fn render(
        &mut self,
        surface: &mut Surface,
        grid: &CellGrid,
        compositor: &Compositor,
        settings: &VisualizationSettings,
        marker: &ViewMarker,
        now: DateTime<Utc>,
    ) {
        if grid.is_empty() || surface.is_empty() {
            return;
        }

        if self.needs_render(settings.color_mode, now) {
            info!(
                mode = settings.color_mode.name(),
                rows = grid.height,
                "rendering minimap terrain"
            );
            self.rasterize(surface, grid, compositor, settings);
            self.cache = Some(MinimapCache {
                image: surface.snapshot(),
                rendered_at: now,
                mode: settings.color_mode,
            });
            self.renders += 1;
        } else if let Some(cache) = &self.cache {
            surface.restore(&cache.image);
        }

        if let Some(r) = indicator_rect(settings, marker, self.size) {
            surface.stroke_rect(r.x, r.y, r.width, r.height, INDICATOR_WIDTH, INDICATOR_COLOR);
        }
    }

    fn rasterize(&self, surface: &mut Surface, grid: &CellGrid, compositor: &Compositor, settings: &VisualizationSettings) {
        surface.clear(BACKGROUND);
        let cell_w = self.size as f64 / grid.width as f64;
        let cell_h = self.size as f64 / grid.height as f64;
        for (x, y, cell) in grid.iter() {
            let color = compositor.color_of(cell, settings).opaque();
            surface.fill_rect(x as f64 * cell_w, y as f64 * cell_h, cell_w + 1.0, cell_h + 1.0, color);
        }
    }
}

/// The part of the fetched window the main view shows, in minimap pixels.
/// Zooming in shrinks it around the window's centre.
pub fn indicator_rect(settings: &VisualizationSettings, marker: &ViewMarker, minimap_size: u32) -> Option<PixelRect> {
    if marker.world_size == 0 || marker.viewport_edge == 0 {
        return None;
    }
    let zoom = settings.clone().normalized().zoom_level;
    let edge = marker.viewport_edge as f64;
    let visible = edge / zoom;
    let px_per_cell = minimap_size as f64 / marker.world_size as f64;
    let center_offset = (edge - visible) / 2.0;

    Some(PixelRect {
        x: (marker.origin.0 as f64 + center_offset) * px_per_cell,
        y: (marker.origin.1 as f64 + center_offset) * px_per_cell,
        width: visible * px_per_cell,
        height: visible * px_per_cell,
    })
}

/// Movement that centres the fetched window on the world cell under a
/// minimap click.
pub fn click_to_delta(click: (f64, f64), minimap_size: u32, marker: &ViewMarker) -> Option<(i64, i64)> {
    if minimap_size == 0 || marker.world_size == 0 || !(click.0.is_finite() && click.1.is_finite()) {
        return None;
    }
    let world = marker.world_size as f64;
    let size = minimap_size as f64;
    let half = (marker.viewport_edge / 2) as i64;
    let world_x = (click.0 / size * world).floor() as i64;
    let world_y = (click.1 / size * world).floor() as i64;
    Some((
        world_x - half - marker.origin.0 as i64,
        world_y - half - marker.origin.1 as i64,
    ))
}

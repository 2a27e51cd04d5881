//! Layer compositor: owns the layer registry and draws one frame of the main view.

use tracing::debug;

use crate::cell::{CellGrid, Selection, TerrainCell};
use crate::color::{Rgb, Rgba};
use crate::geometry::FrameGeometry;
use crate::layers::{ColorLayer, FrameContext};
use crate::overlays::OverlayLayer;
use crate::settings::VisualizationSettings;
use crate::surface::Surface;
use crate::viewport::VIEWPORT_EDGE;

/// Canvas colour behind the raster.
pub const BACKGROUND: Rgb = Rgb::new(0, 0, 0);
const WIREFRAME_COLOR: Rgba = Rgba::new(0, 0, 0, 0.2);
const WIREFRAME_WIDTH: f64 = 0.5;

/// Per-frame inputs. The compositor keeps no state between frames.
pub struct FrameInput<'a> {
    pub window: &'a CellGrid,
    pub settings: &'a VisualizationSettings,
    pub origin: (u32, u32),
    pub world_size: u32,
    pub selection: &'a Selection,
    pub tick: u64,
}

pub struct Compositor {
    color_layers: Vec<ColorLayer>,
    overlays: Vec<OverlayLayer>,
    viewport_edge: usize,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    /// Registry with every colour layer and every overlay in draw order.
    pub fn new() -> Self {
        Self::with_layers(ColorLayer::all(), OverlayLayer::ordered())
    }

    pub fn with_layers(color_layers: Vec<ColorLayer>, overlays: Vec<OverlayLayer>) -> Self {
        Self {
            color_layers,
            overlays,
            viewport_edge: VIEWPORT_EDGE,
        }
    }

    pub fn with_viewport_edge(mut self, viewport_edge: usize) -> Self {
        self.viewport_edge = viewport_edge;
        self
    }

    pub fn viewport_edge(&self) -> usize {
        self.viewport_edge
    }

    /// The registered layer for the settings' colour mode, or the terrain layer.
    pub fn active_color_layer(&self, settings: &VisualizationSettings) -> ColorLayer {
        match self.color_layers.iter().find(|l| l.applies_to(settings)) {
            Some(layer) => *layer,
            None => {
                debug!(
                    mode = settings.color_mode.name(),
                    "no layer registered for colour mode, using terrain"
                );
                ColorLayer::Terrain
            }
        }
    }

    /// Colour a single cell exactly as the main raster would.
    pub fn color_of(&self, cell: &TerrainCell, settings: &VisualizationSettings) -> Rgb {
        let settings = settings.clone().normalized();
        self.active_color_layer(&settings).color_of(cell, &settings)
    }

    pub fn geometry(&self, settings: &VisualizationSettings, canvas_width: u32, canvas_height: u32) -> Option<FrameGeometry> {
        let zoom = settings.clone().normalized().zoom_level;
        FrameGeometry::new(self.viewport_edge, zoom, canvas_width, canvas_height)
    }

    /// Draw one frame. Returns the geometry used, or `None` when nothing could
    /// be drawn (empty canvas or empty window).
    pub fn render(&self, surface: &mut Surface, input: &FrameInput) -> Option<FrameGeometry> {
        if surface.is_empty() {
            return None;
        }
        surface.clear(BACKGROUND);
        if input.window.is_empty() {
            return None;
        }

        let settings = input.settings.clone().normalized();
        let geometry = self.geometry(&settings, surface.width(), surface.height())?;
        let layer = self.active_color_layer(&settings);

        let frame = FrameContext {
            window: input.window,
            settings: &settings,
            geometry,
            origin: input.origin,
            world_size: input.world_size,
            selection: input.selection,
            tick: input.tick,
        };

        let wireframe = settings.wireframe && geometry.shows_details();
        for (x, y, cell) in input.window.iter() {
            let fill = geometry.fill_rect(x, y);
            let color = layer.color_of(cell, &settings).opaque();
            surface.fill_rect(fill.x, fill.y, fill.width, fill.height, color);

            if wireframe {
                let r = geometry.cell_rect(x, y);
                surface.stroke_rect(r.x, r.y, r.width, r.height, WIREFRAME_WIDTH, WIREFRAME_COLOR);
            }
        }

        if layer.has_decoration() {
            layer.decorate(surface, &frame);
        }

        for overlay in &self.overlays {
            if overlay.should_render(&settings, input.selection) {
                overlay.render(surface, &frame);
            }
        }

        Some(geometry)
    }
}

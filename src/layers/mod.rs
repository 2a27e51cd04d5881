//! Colour-mapping layers for the base raster.
//!
//! Each layer is a pure function from a cell and the settings to a colour.
//! Exactly one is active per frame, chosen by the settings' colour mode. A layer
//! may also decorate the frame after rasterisation (wind draws arrows).

pub mod climate;
pub mod elevation;
pub mod grass;
pub mod wind;

use crate::cell::{CellGrid, Selection, TerrainCell};
use crate::color::Rgb;
use crate::geometry::FrameGeometry;
use crate::settings::{ColorMode, VisualizationSettings};
use crate::surface::Surface;

/// Everything a layer needs to draw one frame.
pub struct FrameContext<'a> {
    pub window: &'a CellGrid,
    pub settings: &'a VisualizationSettings,
    pub geometry: FrameGeometry,
    /// World coordinate of the window's top-left cell.
    pub origin: (u32, u32),
    /// Edge length of the toroidal world.
    pub world_size: u32,
    pub selection: &'a Selection,
    /// Monotonic frame counter, drives animated overlays.
    pub tick: u64,
}

impl FrameContext<'_> {
    /// Wrapped world coordinate of a window-local cell index.
    pub fn world_coord(&self, x: usize, y: usize) -> (u32, u32) {
        let size = self.world_size.max(1) as u64;
        (
            ((self.origin.0 as u64 + x as u64) % size) as u32,
            ((self.origin.1 as u64 + y as u64) % size) as u32,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorLayer {
    /// Plain land / elevation / water, also the fallback layer.
    Terrain,
    Heightmap,
    Moisture,
    Temperature,
    Humidity,
    Wind,
    Grass,
    Pressure,
    Cloud,
}

impl ColorLayer {
    pub fn for_mode(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Default => ColorLayer::Terrain,
            ColorMode::Heightmap => ColorLayer::Heightmap,
            ColorMode::Moisture => ColorLayer::Moisture,
            ColorMode::Temperature => ColorLayer::Temperature,
            ColorMode::Humidity => ColorLayer::Humidity,
            ColorMode::Wind => ColorLayer::Wind,
            ColorMode::Grass => ColorLayer::Grass,
            ColorMode::Pressure => ColorLayer::Pressure,
            ColorMode::Cloud => ColorLayer::Cloud,
        }
    }

    pub fn all() -> Vec<ColorLayer> {
        ColorMode::all().iter().copied().map(Self::for_mode).collect()
    }

    pub fn mode(&self) -> ColorMode {
        match self {
            ColorLayer::Terrain => ColorMode::Default,
            ColorLayer::Heightmap => ColorMode::Heightmap,
            ColorLayer::Moisture => ColorMode::Moisture,
            ColorLayer::Temperature => ColorMode::Temperature,
            ColorLayer::Humidity => ColorMode::Humidity,
            ColorLayer::Wind => ColorMode::Wind,
            ColorLayer::Grass => ColorMode::Grass,
            ColorLayer::Pressure => ColorMode::Pressure,
            ColorLayer::Cloud => ColorMode::Cloud,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            ColorLayer::Terrain => "terrain",
            other => other.mode().name(),
        }
    }

    /// True iff this layer is the one selected by the colour mode.
    pub fn applies_to(&self, settings: &VisualizationSettings) -> bool {
        settings.color_mode == self.mode()
    }

    pub fn color_of(&self, cell: &TerrainCell, settings: &VisualizationSettings) -> Rgb {
        match self {
            ColorLayer::Terrain => elevation::terrain_color(cell, settings),
            ColorLayer::Heightmap => elevation::heightmap_color(cell, settings),
            ColorLayer::Moisture => climate::moisture_color(cell),
            ColorLayer::Temperature => climate::temperature_color(cell),
            ColorLayer::Humidity => climate::humidity_color(cell),
            ColorLayer::Wind => wind::wind_color(cell),
            ColorLayer::Grass => grass::grass_color(cell),
            ColorLayer::Pressure => climate::pressure_color(cell),
            ColorLayer::Cloud => climate::cloud_color(cell),
        }
    }

    pub fn has_decoration(&self) -> bool {
        matches!(self, ColorLayer::Wind)
    }

    /// Mode-specific marks drawn after the base raster.
    pub fn decorate(&self, surface: &mut Surface, frame: &FrameContext) {
        if let ColorLayer::Wind = self {
            wind::draw_arrows(surface, frame);
        }
    }
}

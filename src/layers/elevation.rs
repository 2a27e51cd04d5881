//! Default terrain colouring and the blue-white-brown heightmap ramp.

use crate::cell::{CellKind, TerrainCell};
use crate::color::{normalize, Rgb};
use crate::settings::VisualizationSettings;

/// Altitude range the ramps are normalised over, in metres.
pub const ALTITUDE_MIN: f64 = -200.0;
pub const ALTITUDE_MAX: f64 = 2200.0;

const SPRING: Rgb = Rgb::new(0, 0, 255);
const RIVER_DEEP: Rgb = Rgb::new(0, 64, 192);
const RIVER_SHALLOW: Rgb = Rgb::new(0, 128, 255);
const FLAT_GRAY: Rgb = Rgb::new(200, 200, 200);

/// Water height at which a river is drawn in the deep shade.
pub const DEEP_RIVER_HEIGHT: f64 = 2.0;

pub fn normalized_altitude(cell: &TerrainCell) -> f64 {
    normalize(cell.altitude, ALTITUDE_MIN, ALTITUDE_MAX)
}

/// River shade keyed on water height; shared with the river overlay.
pub fn river_shade(cell: &TerrainCell) -> Rgb {
    if cell.water_height >= DEEP_RIVER_HEIGHT {
        RIVER_DEEP
    } else {
        RIVER_SHALLOW
    }
}

/// Subtract `scale * amount` from `base`, never going below `floor`.
fn darken(base: f64, amount: f64, scale: f64, floor: f64) -> f64 {
    (base - amount * scale).floor().max(floor)
}

pub fn terrain_color(cell: &TerrainCell, settings: &VisualizationSettings) -> Rgb {
    let darken_factor = normalized_altitude(cell) * settings.exaggerate_height;

    match cell.kind {
        CellKind::Spring if settings.show_rivers => return SPRING,
        CellKind::River if settings.show_rivers => return river_shade(cell),
        CellKind::Mud if settings.show_moisture => {
            return Rgb::from_channels(
                darken(120.0, darken_factor, 80.0, 40.0),
                darken(60.0, darken_factor, 40.0, 20.0),
                0.0,
            );
        }
        CellKind::Earth if settings.show_moisture => {
            return Rgb::from_channels(
                darken(180.0, darken_factor, 185.0, 25.0),
                darken(120.0, darken_factor, 140.0, 10.0),
                darken(60.0, darken_factor, 83.0, 7.0),
            );
        }
        _ => {}
    }

    if settings.show_elevation {
        // White lowlands, black peaks.
        let adjusted = darken_factor.min(1.0);
        let value = 255.0 - adjusted * 255.0;
        return Rgb::from_channels(value, value, value);
    }

    FLAT_GRAY
}

pub fn heightmap_color(cell: &TerrainCell, settings: &VisualizationSettings) -> Rgb {
    let adjusted = (normalized_altitude(cell) * settings.exaggerate_height).clamp(0.0, 1.0);

    if adjusted < 0.5 {
        let f = adjusted * 2.0;
        return Rgb::from_channels(255.0 * f, 255.0 * f, 255.0);
    }

    let f = (adjusted - 0.5) * 2.0;
    Rgb::from_channels(
        255.0 - (255.0 - 102.0) * f,
        255.0 - (255.0 - 51.0) * f,
        255.0 - 255.0 * f,
    )
}

//! Wind speed colouring and per-cell direction arrows.

use std::f64::consts::PI;

use crate::cell::TerrainCell;
use crate::color::{Rgb, Rgba};
use crate::layers::FrameContext;
use crate::surface::Surface;

/// Speed at which the ramp saturates.
pub const MAX_WIND_SPEED: f64 = 15.0;
/// Arrows need this many pixels per cell to be legible.
pub const MIN_ARROW_CELL_PX: f64 = 8.0;
const CALM_SPEED: f64 = 0.1;
const ARROW_COLOR: Rgba = Rgba::new(40, 40, 40, 0.8);

pub fn normalized_speed(cell: &TerrainCell) -> f64 {
    (cell.wind_speed.unwrap_or(0.0) / MAX_WIND_SPEED).clamp(0.0, 1.0)
}

/// Pale lavender → slate blue → purple.
pub fn wind_color(cell: &TerrainCell) -> Rgb {
    let s = normalized_speed(cell);

    if s < 0.33 {
        let f = s * 3.0;
        return Rgb::from_channels(230.0 - (230.0 - 173.0) * f, 230.0 - (230.0 - 216.0) * f, 230.0);
    }

    if s < 0.66 {
        let f = (s - 0.33) * 3.0;
        return Rgb::from_channels(
            173.0 - (173.0 - 65.0) * f,
            216.0 - (216.0 - 105.0) * f,
            230.0 - (230.0 - 225.0) * f,
        );
    }

    let f = (s - 0.66) * 3.0;
    Rgb::from_channels(
        65.0 + (128.0 - 65.0) * f,
        105.0 - 105.0 * f,
        225.0 - (225.0 - 128.0) * f,
    )
}

/// Segments of one arrow: shaft then the two head strokes, all starting at the tip
/// for the head. `direction` is a compass bearing (0° north, clockwise).
pub fn arrow_segments(
    center: (f64, f64),
    cell_px: f64,
    speed: f64,
    direction: f64,
) -> [((f64, f64), (f64, f64)); 3] {
    let length = cell_px * (0.3 + speed * 0.6) * 0.45;
    // Compass bearing to screen angle: north is up, y grows downwards.
    let angle = (direction - 90.0).to_radians();
    let (cos, sin) = (angle.cos(), angle.sin());

    let tip = (center.0 + cos * length, center.1 + sin * length);
    let tail = (center.0 - cos * length * 0.3, center.1 - sin * length * 0.3);

    let head = length * 0.4;
    let spread = PI / 6.0;
    let barb = |offset: f64| {
        (
            tip.0 - head * (angle + offset).cos(),
            tip.1 - head * (angle + offset).sin(),
        )
    };

    [(tail, tip), (tip, barb(-spread)), (tip, barb(spread))]
}

pub fn draw_arrows(surface: &mut Surface, frame: &FrameContext) {
    let g = &frame.geometry;
    if g.cell_width < MIN_ARROW_CELL_PX || g.cell_height < MIN_ARROW_CELL_PX {
        return;
    }

    let cell_px = g.cell_width.min(g.cell_height);
    let line_width = (g.cell_width * 0.08).max(1.0);

    for (x, y, cell) in frame.window.iter() {
        let speed = cell.wind_speed.unwrap_or(0.0);
        if speed <= CALM_SPEED {
            continue;
        }
        let direction = cell.wind_direction.unwrap_or(0.0);
        let segments = arrow_segments(g.cell_center(x, y), cell_px, normalized_speed(cell), direction);
        for (from, to) in segments {
            surface.stroke_line(from, to, line_width, ARROW_COLOR);
        }
    }
}

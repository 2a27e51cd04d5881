//! Contour lines: outline every cell whose altitude sits on a multiple of the interval.

use crate::cell::TerrainCell;
use crate::color::Rgba;
use crate::layers::FrameContext;
use crate::surface::Surface;

const CONTOUR_COLOR: Rgba = Rgba::new(0, 0, 0, 0.5);
const CONTOUR_WIDTH: f64 = 0.5;

/// Half-up rounding, so `-0.5` rounds to `0` rather than away from zero.
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

pub fn is_contour(cell: &TerrainCell, interval: f64) -> bool {
    if !(interval.is_finite() && interval > 0.0) || !cell.altitude.is_finite() {
        return false;
    }
    round_half_up(cell.altitude / interval) * interval == round_half_up(cell.altitude)
}

pub fn render(surface: &mut Surface, frame: &FrameContext) {
    let g = &frame.geometry;
    if !g.shows_details() {
        return;
    }
    let interval = frame.settings.contour_interval;
    for (x, y, cell) in frame.window.iter() {
        if is_contour(cell, interval) {
            let r = g.cell_rect(x, y);
            surface.stroke_rect(r.x, r.y, r.width, r.height, CONTOUR_WIDTH, CONTOUR_COLOR);
        }
    }
}

//! Weather overlays: translucent cloud cover and animated rain streaks.

use crate::color::{Rgb, Rgba};
use crate::layers::FrameContext;
use crate::surface::Surface;

const CLOUD_MIN_DENSITY: f64 = 0.1;
const CLOUD_MAX_ALPHA: f64 = 0.7;

const RAIN_MIN_RATE: f64 = 0.05;
const RAIN_COLOR: Rgb = Rgb::new(100, 149, 237);
/// Vertical period of the streak animation, in pixels.
const RAIN_PERIOD: u64 = 20;

pub fn cloud_alpha(density: f64) -> Option<f64> {
    (density >= CLOUD_MIN_DENSITY).then(|| (density * 0.8).min(CLOUD_MAX_ALPHA))
}

pub fn render_clouds(surface: &mut Surface, frame: &FrameContext) {
    let g = &frame.geometry;
    for (x, y, cell) in frame.window.iter() {
        let Some(alpha) = cloud_alpha(cell.cloud_density) else {
            continue;
        };
        let r = g.fill_rect(x, y);
        surface.fill_rect(r.x, r.y, r.width, r.height, Rgb::new(255, 255, 255).with_alpha(alpha));
    }
}

/// Streak layout for one cell: `(x offset, start y offset)` per streak and the
/// streak colour, or `None` when the cell is dry.
pub fn rain_streaks(rate: f64, cell_width: f64, tick: u64) -> Option<(Vec<(f64, f64)>, Rgba)> {
    if rate.is_nan() || rate < RAIN_MIN_RATE {
        return None;
    }
    let intensity = (rate * 2.0).min(1.0);
    let count = (intensity * 3.0).floor() as u64 + 1;
    let offset = tick.wrapping_mul(2) % RAIN_PERIOD;

    let streaks = (0..count)
        .map(|i| {
            let dx = cell_width / (count + 1) as f64 * (i + 1) as f64;
            let dy = ((offset + i * 7) % RAIN_PERIOD) as f64 - 10.0;
            (dx, dy)
        })
        .collect();
    Some((streaks, RAIN_COLOR.with_alpha(0.3 + 0.4 * intensity)))
}

pub fn render_precipitation(surface: &mut Surface, frame: &FrameContext) {
    let g = &frame.geometry;
    for (x, y, cell) in frame.window.iter() {
        let Some((streaks, color)) = rain_streaks(cell.precipitation_rate, g.cell_width, frame.tick) else {
            continue;
        };
        let r = g.cell_rect(x, y);
        for (dx, dy) in streaks {
            let from = (r.x + dx, r.y + dy);
            surface.stroke_line(from, (from.0 - 3.0, from.1 + 10.0), 1.0, color);
        }
    }
}

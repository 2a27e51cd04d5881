//! River network: line segments joining centres of connected cells of the same river.

use crate::cell::TerrainCell;
use crate::layers::elevation::river_shade;
use crate::layers::FrameContext;
use crate::surface::Surface;

const RIVER_ALPHA: f64 = 0.9;

/// Stroke width grows with water height, capped at three times the base width.
pub fn river_line_width(cell: &TerrainCell, cell_px: f64) -> f64 {
    let depth = if cell.water_height > 0.0 {
        cell.water_height.clamp(1.0, 3.0)
    } else {
        1.0
    };
    (cell_px * 0.15).max(1.0) * depth
}

pub fn render(surface: &mut Surface, frame: &FrameContext) {
    let g = &frame.geometry;
    if !g.shows_details() {
        return;
    }
    let cell_px = g.cell_width.min(g.cell_height);

    for (x, y, cell) in frame.window.iter() {
        if !cell.kind.is_watercourse() || cell.river_name.is_none() {
            continue;
        }
        let color = river_shade(cell).with_alpha(RIVER_ALPHA);
        let width = river_line_width(cell, cell_px);
        let from = g.cell_center(x, y);

        // Right and down neighbours only, so each link is drawn once.
        for (nx, ny) in [(x + 1, y), (x, y + 1)] {
            let Some(neighbor) = frame.window.get(nx, ny) else {
                continue;
            };
            if cell.shares_river_with(neighbor) {
                surface.stroke_line(from, g.cell_center(nx, ny), width, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellGrid, CellKind, Selection};
    use crate::color::Rgb;
    use crate::geometry::FrameGeometry;
    use crate::settings::VisualizationSettings;

    fn river(name: &str) -> TerrainCell {
        TerrainCell {
            kind: CellKind::River,
            river_name: Some(name.to_string()),
            water_height: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_line_width_scales_with_depth() {
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        let mut cell = river("A");
        cell.water_height = 0.0;
        assert!(close(river_line_width(&cell, 20.0), 3.0));
        cell.water_height = 2.0;
        assert!(close(river_line_width(&cell, 20.0), 6.0));
        cell.water_height = 10.0;
        assert!(close(river_line_width(&cell, 20.0), 9.0));
        // Base width never drops under one pixel.
        assert!(close(river_line_width(&cell, 2.0), 3.0));
    }

    #[test]
    fn test_connects_only_same_named_rivers() {
        let land = TerrainCell::default();
        let window = CellGrid::from_rows(vec![
            vec![river("A"), river("A"), river("B")],
            vec![land.clone(), land.clone(), land],
        ]);
        let settings = VisualizationSettings::default();
        let selection = Selection::default();
        let frame = FrameContext {
            window: &window,
            settings: &settings,
            geometry: FrameGeometry::new(3, 1.0, 30, 30).unwrap(),
            origin: (0, 0),
            world_size: 100,
            selection: &selection,
            tick: 0,
        };
        let mut surface = Surface::new(30, 30);
        surface.clear(Rgb::new(0, 0, 0));
        render(&mut surface, &frame);

        // Midpoint between the two A cells is painted.
        assert_ne!(surface.pixel(10, 5), Some(Rgb::new(0, 0, 0)));
        // Between A and B nothing is drawn.
        assert_eq!(surface.pixel(20, 5), Some(Rgb::new(0, 0, 0)));
        // No link down into land.
        assert_eq!(surface.pixel(5, 15), Some(Rgb::new(0, 0, 0)));
    }
}

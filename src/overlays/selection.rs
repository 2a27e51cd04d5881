//! Hover and selection outlines. Matching is by wrapped world coordinate, so a
//! highlight follows its cell when the window moves.

use crate::cell::CellInfo;
use crate::color::Rgba;
use crate::layers::FrameContext;
use crate::surface::Surface;

const SELECTED_COLOR: Rgba = Rgba::new(255, 215, 0, 1.0);
const SELECTED_WIDTH: f64 = 3.0;
const HOVER_COLOR: Rgba = Rgba::new(255, 255, 255, 1.0);
const HOVER_WIDTH: f64 = 2.0;

fn outline(surface: &mut Surface, frame: &FrameContext, target: &CellInfo, width: f64, color: Rgba) {
    let g = &frame.geometry;
    for (x, y, _) in frame.window.iter() {
        if frame.world_coord(x, y) == target.world {
            let r = g.cell_rect(x, y);
            surface.stroke_rect(r.x, r.y, r.width, r.height, width, color);
        }
    }
}

pub fn render(surface: &mut Surface, frame: &FrameContext) {
    // Hover goes last so the pointer stays visible over a selected cell.
    if let Some(selected) = &frame.selection.selected {
        outline(surface, frame, selected, SELECTED_WIDTH, SELECTED_COLOR);
    }
    if let Some(hovered) = &frame.selection.hovered {
        outline(surface, frame, hovered, HOVER_WIDTH, HOVER_COLOR);
    }
}

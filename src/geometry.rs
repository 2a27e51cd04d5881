//! Pixel geometry of a frame: how zoom maps viewport cells onto the canvas,
//! and the inverse mapping from a pointer position back to a cell.

/// Axis-aligned rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Cell sizing for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameGeometry {
    /// Edge length of the fetched viewport window, in cells.
    pub viewport_edge: usize,
    /// Cells spanning the canvas at the current zoom (`viewport_edge / zoom`).
    pub visible_cells: f64,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl FrameGeometry {
    /// Returns `None` when there is nothing to draw into or nothing to draw.
    pub fn new(viewport_edge: usize, zoom_level: f64, canvas_width: u32, canvas_height: u32) -> Option<Self> {
        if viewport_edge == 0 || canvas_width == 0 || canvas_height == 0 {
            return None;
        }
        let zoom = if zoom_level.is_finite() && zoom_level > 0.0 {
            zoom_level
        } else {
            1.0
        };
        let visible_cells = viewport_edge as f64 / zoom;
        Some(Self {
            viewport_edge,
            visible_cells,
            cell_width: canvas_width as f64 / visible_cells,
            cell_height: canvas_height as f64 / visible_cells,
        })
    }

    /// Authoritative cell boundary, used for strokes and hit-testing.
    pub fn cell_rect(&self, x: usize, y: usize) -> PixelRect {
        PixelRect {
            x: x as f64 * self.cell_width,
            y: y as f64 * self.cell_height,
            width: self.cell_width,
            height: self.cell_height,
        }
    }

    /// Fill extent with a one-pixel overscan so neighbouring cells never show seams.
    pub fn fill_rect(&self, x: usize, y: usize) -> PixelRect {
        PixelRect {
            width: (self.cell_width + 1.0).ceil(),
            height: (self.cell_height + 1.0).ceil(),
            ..self.cell_rect(x, y)
        }
    }

    pub fn cell_center(&self, x: usize, y: usize) -> (f64, f64) {
        (
            (x as f64 + 0.5) * self.cell_width,
            (y as f64 + 0.5) * self.cell_height,
        )
    }

    /// Cells are large enough for outlines and line overlays.
    pub fn shows_details(&self) -> bool {
        self.cell_width >= 0.5 && self.cell_height >= 0.5
    }

    /// Invert the forward transform: the cell whose boundary contains the pointer.
    pub fn cell_at(&self, px: f64, py: f64) -> Option<(usize, usize)> {
        if !(px.is_finite() && py.is_finite()) {
            return None;
        }
        let cx = (px / self.cell_width).floor();
        let cy = (py / self.cell_height).floor();
        let edge = self.viewport_edge as f64;
        if cx < 0.0 || cy < 0.0 || cx >= edge || cy >= edge {
            return None;
        }
        Some((cx as usize, cy as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_zoom_five_sizes_cells() {
        let g = FrameGeometry::new(100, 5.0, 800, 600).unwrap();
        assert_eq!(g.visible_cells, 20.0);
        assert_eq!(g.cell_width, 40.0);
        assert_eq!(g.cell_height, 30.0);
    }

    #[test]
    fn test_canvas_centre_uses_floor_rule() {
        // Even split: centre pixel sits exactly on the boundary of cell 10.
        let g = FrameGeometry::new(100, 5.0, 800, 800).unwrap();
        assert_eq!(g.cell_at(400.0, 400.0), Some((10, 10)));
        // One pixel up-left lands in cell 9.
        assert_eq!(g.cell_at(399.0, 399.0), Some((9, 9)));

        let g = FrameGeometry::new(100, 5.0, 780, 780).unwrap();
        assert_eq!(g.cell_at(390.0, 390.0), Some((10, 10)));
    }

    #[test]
    fn test_degenerate_inputs_have_no_geometry() {
        assert!(FrameGeometry::new(0, 1.0, 800, 800).is_none());
        assert!(FrameGeometry::new(100, 1.0, 0, 800).is_none());
        let g = FrameGeometry::new(100, 0.0, 100, 100).unwrap();
        assert_eq!(g.visible_cells, 100.0);
    }

    #[test]
    fn test_pointer_outside_window_is_rejected() {
        let g = FrameGeometry::new(10, 1.0, 100, 100).unwrap();
        assert_eq!(g.cell_at(-0.1, 5.0), None);
        assert_eq!(g.cell_at(100.0, 5.0), None);
        assert_eq!(g.cell_at(f64::NAN, 5.0), None);
        assert_eq!(g.cell_at(99.9, 99.9), Some((9, 9)));
    }

    #[test]
    fn test_overscan_does_not_move_hit_boundary() {
        let g = FrameGeometry::new(100, 2.0, 500, 500).unwrap();
        let fill = g.fill_rect(3, 3);
        let cell = g.cell_rect(3, 3);
        assert!(fill.width > cell.width);
        // A pixel inside the overscan belongs to the next cell.
        assert_eq!(g.cell_at(cell.x + cell.width + 0.5, cell.y), Some((4, 3)));
    }

    #[test]
    fn test_centre_of_every_cell_resolves_back() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let edge = rng.gen_range(1..=120);
            let zoom = rng.gen_range(1.0..=5.0);
            let w = rng.gen_range(1..=1600);
            let h = rng.gen_range(1..=1600);
            let g = FrameGeometry::new(edge, zoom, w, h).unwrap();
            let cx = rng.gen_range(0..edge);
            let cy = rng.gen_range(0..edge);
            let (px, py) = g.cell_center(cx, cy);
            assert_eq!(g.cell_at(px, py), Some((cx, cy)), "edge={edge} zoom={zoom} {w}x{h}");
        }
    }
}

//! Software pixel surface the compositors draw into.
//!
//! Coordinates are fractional canvas pixels. A pixel is covered by a shape when
//! its centre lies inside it, so adjacent rectangles sharing an edge never
//! overlap or leave a gap.

use std::path::Path;

use image::{ImageBuffer, Rgba as Pixel, RgbaImage};

use crate::color::{Rgb, Rgba};
use crate::font;

pub struct Surface {
    img: RgbaImage,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: ImageBuffer::from_pixel(width, height, Pixel([0, 0, 0, 0])),
        }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn is_empty(&self) -> bool {
        self.img.width() == 0 || self.img.height() == 0
    }

    pub fn image(&self) -> &RgbaImage {
        &self.img
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let p = self.img.get_pixel(x, y);
        Some(Rgb::new(p[0], p[1], p[2]))
    }

    pub fn clear(&mut self, color: Rgb) {
        let fill = Pixel([color.r, color.g, color.b, 255]);
        for pixel in self.img.pixels_mut() {
            *pixel = fill;
        }
    }

    /// Copy of the current pixels, for caching.
    pub fn snapshot(&self) -> RgbaImage {
        self.img.clone()
    }

    /// Put a previously taken snapshot back at the origin.
    pub fn restore(&mut self, snapshot: &RgbaImage) {
        if snapshot.dimensions() == self.img.dimensions() {
            self.img.copy_from_slice(snapshot.as_raw());
        } else {
            self.blit(snapshot, 0, 0);
        }
    }

    /// Copy `src` onto this surface with its top-left corner at `(x, y)`, clipped.
    pub fn blit(&mut self, src: &RgbaImage, x: i64, y: i64) {
        for (sx, sy, p) in src.enumerate_pixels() {
            let dx = x + sx as i64;
            let dy = y + sy as i64;
            if dx >= 0 && dy >= 0 && dx < self.width() as i64 && dy < self.height() as i64 {
                self.img.put_pixel(dx as u32, dy as u32, *p);
            }
        }
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgba) {
        let a = color.a.clamp(0.0, 1.0);
        if a >= 1.0 {
            self.img.put_pixel(x, y, Pixel([color.r, color.g, color.b, 255]));
            return;
        }
        let dst = self.img.get_pixel(x, y);
        let mix = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a)).round() as u8;
        let out_alpha = a * 255.0 + dst[3] as f32 * (1.0 - a);
        let out = Pixel([
            mix(color.r, dst[0]),
            mix(color.g, dst[1]),
            mix(color.b, dst[2]),
            out_alpha.round().clamp(0.0, 255.0) as u8,
        ]);
        self.img.put_pixel(x, y, out);
    }

    /// Pixel index range whose centres fall in `[start, start + len)`, clipped to `limit`.
    fn span(start: f64, len: f64, limit: u32) -> Option<(u32, u32)> {
        if !(start.is_finite() && len.is_finite()) || len <= 0.0 {
            return None;
        }
        let first = (start - 0.5).ceil().max(0.0);
        let last = (start + len - 0.5).ceil().min(limit as f64);
        (first < last).then(|| (first as u32, last as u32))
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        if color.is_transparent() {
            return;
        }
        let (Some((x0, x1)), Some((y0, y1))) = (
            Self::span(x, w, self.width()),
            Self::span(y, h, self.height()),
        ) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color);
            }
        }
    }

    /// Stroke a rectangle outline centred on its edges. Hairlines are widened
    /// to one pixel so they always cover at least one pixel row.
    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, line_width: f64, color: Rgba) {
        let lw = line_width.max(1.0);
        let half = lw / 2.0;
        // Top and bottom bands span the corners; sides fill in between.
        self.fill_rect(x - half, y - half, w + lw, lw, color);
        self.fill_rect(x - half, y + h - half, w + lw, lw, color);
        self.fill_rect(x - half, y + half, lw, h - lw, color);
        self.fill_rect(x + w - half, y + half, lw, h - lw, color);
    }

    /// Stroke a straight segment with round caps.
    pub fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), line_width: f64, color: Rgba) {
        if color.is_transparent() || self.is_empty() {
            return;
        }
        let half = line_width.max(1.0) / 2.0;
        let min_x = from.0.min(to.0) - half;
        let min_y = from.1.min(to.1) - half;
        let max_x = from.0.max(to.0) + half;
        let max_y = from.1.max(to.1) + half;
        let (Some((x0, x1)), Some((y0, y1))) = (
            Self::span(min_x, max_x - min_x, self.width()),
            Self::span(min_y, max_y - min_y, self.height()),
        ) else {
            return;
        };

        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len_sq = dx * dx + dy * dy;
        for py in y0..y1 {
            for px in x0..x1 {
                let cx = px as f64 + 0.5;
                let cy = py as f64 + 0.5;
                let t = if len_sq > 0.0 {
                    (((cx - from.0) * dx + (cy - from.1) * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let nx = from.0 + dx * t - cx;
                let ny = from.1 + dy * t - cy;
                if nx * nx + ny * ny <= half * half {
                    self.blend(px, py, color);
                }
            }
        }
    }

    /// Draw text with the built-in 5x7 bitmap font, `scale` pixels per font dot.
    pub fn draw_text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgba) {
        let scale = scale.max(1) as i64;
        let mut cx = x;
        for ch in text.chars() {
            if let Some(rows) = font::glyph(ch) {
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..font::GLYPH_WIDTH {
                        if bits & (0b10000 >> col) == 0 {
                            continue;
                        }
                        let px = cx + col as i64 * scale;
                        let py = y + row as i64 * scale;
                        self.fill_rect(px as f64, py as f64, scale as f64, scale as f64, color);
                    }
                }
            }
            cx += font::ADVANCE as i64 * scale;
        }
    }

    /// Pixel buffer in minifb's `0RGB` layout, composited over `background`.
    pub fn to_0rgb(&self, background: Rgb) -> Vec<u32> {
        self.img
            .pixels()
            .map(|p| {
                let a = p[3] as f32 / 255.0;
                let mix = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a)).round() as u32;
                let r = mix(p[0], background.r);
                let g = mix(p[1], background.g);
                let b = mix(p[2], background.b);
                (r << 16) | (g << 8) | b
            })
            .collect()
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        self.img.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::new(255, 0, 0, 1.0);

    #[test]
    fn test_fill_rect_covers_pixel_centres() {
        let mut s = Surface::new(10, 10);
        s.fill_rect(2.0, 2.0, 3.0, 3.0, RED);
        assert_eq!(s.pixel(2, 2), Some(Rgb::new(255, 0, 0)));
        assert_eq!(s.pixel(4, 4), Some(Rgb::new(255, 0, 0)));
        assert_eq!(s.pixel(5, 5), Some(Rgb::new(0, 0, 0)));
        assert_eq!(s.pixel(1, 2), Some(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn test_adjacent_fractional_rects_leave_no_seam() {
        let mut s = Surface::new(10, 1);
        s.clear(Rgb::new(0, 0, 0));
        let w = 10.0 / 3.0;
        for i in 0..3 {
            s.fill_rect(i as f64 * w, 0.0, w, 1.0, RED);
        }
        for x in 0..10 {
            assert_eq!(s.pixel(x, 0), Some(Rgb::new(255, 0, 0)), "gap at {x}");
        }
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut s = Surface::new(4, 4);
        s.fill_rect(-10.0, -10.0, 100.0, 100.0, RED);
        s.fill_rect(f64::NAN, 0.0, 1.0, 1.0, RED);
        assert_eq!(s.pixel(3, 3), Some(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn test_alpha_blend_over_opaque() {
        let mut s = Surface::new(1, 1);
        s.clear(Rgb::new(0, 0, 0));
        s.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::new(255, 255, 255, 0.5));
        let p = s.pixel(0, 0).unwrap();
        assert!((127..=128).contains(&p.r));
        assert_eq!(s.image().get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_stroke_rect_leaves_interior() {
        let mut s = Surface::new(20, 20);
        s.clear(Rgb::new(0, 0, 0));
        s.stroke_rect(5.0, 5.0, 10.0, 10.0, 2.0, RED);
        assert_eq!(s.pixel(5, 5), Some(Rgb::new(255, 0, 0)));
        assert_eq!(s.pixel(14, 10), Some(Rgb::new(255, 0, 0)));
        assert_eq!(s.pixel(10, 10), Some(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn test_stroke_line_hits_endpoints() {
        let mut s = Surface::new(20, 20);
        s.clear(Rgb::new(0, 0, 0));
        s.stroke_line((2.5, 2.5), (17.5, 17.5), 1.0, RED);
        assert_eq!(s.pixel(2, 2), Some(Rgb::new(255, 0, 0)));
        assert_eq!(s.pixel(17, 17), Some(Rgb::new(255, 0, 0)));
        assert_eq!(s.pixel(10, 10), Some(Rgb::new(255, 0, 0)));
        assert_eq!(s.pixel(17, 2), Some(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut s = Surface::new(5, 5);
        s.fill_rect(0.0, 0.0, 2.0, 2.0, RED);
        let snap = s.snapshot();
        s.clear(Rgb::new(9, 9, 9));
        s.restore(&snap);
        assert_eq!(s.image(), &snap);
    }

    #[test]
    fn test_to_0rgb_layout() {
        let mut s = Surface::new(1, 1);
        s.clear(Rgb::new(1, 2, 3));
        assert_eq!(s.to_0rgb(Rgb::new(0, 0, 0)), vec![0x0001_0203]);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let mut s = Surface::new(20, 10);
        s.clear(Rgb::new(0, 0, 0));
        s.draw_text(0, 0, "I", 1, RED);
        // Middle stroke of the I glyph
        assert_eq!(s.pixel(2, 3), Some(Rgb::new(255, 0, 0)));
    }
}

//! Grass density colouring with per-species green hues.

use crate::cell::{GrassType, TerrainCell};
use crate::color::Rgb;

const BARE_THRESHOLD: f64 = 0.05;
const SPARSE_THRESHOLD: f64 = 0.3;
const LUSH_THRESHOLD: f64 = 0.7;

/// Bare soil colour that sparse grass blends away from.
const SOIL: Rgb = Rgb::new(139, 90, 43);

fn base_hue(grass_type: GrassType) -> Rgb {
    match grass_type {
        GrassType::CoolSeason => Rgb::new(46, 139, 87),
        GrassType::WarmSeason => Rgb::new(107, 142, 35),
        GrassType::DroughtResistant => Rgb::new(85, 107, 47),
        GrassType::Wetland => Rgb::new(0, 128, 0),
        GrassType::Generic => Rgb::new(34, 139, 34),
    }
}

pub fn grass_color(cell: &TerrainCell) -> Rgb {
    let density = cell.grass_density.unwrap_or(0.0).clamp(0.0, 1.0);

    if density < BARE_THRESHOLD {
        // Damp soil reads a little lighter.
        let moisture = cell.moisture.clamp(0.0, 1.0);
        let brown = 139.0 + (moisture * 50.0).floor();
        return Rgb::from_channels(brown, brown * 0.7, brown * 0.4);
    }

    let hue = base_hue(cell.grass_type.unwrap_or(GrassType::Generic));
    let (r, g, b) = (hue.r as f64, hue.g as f64, hue.b as f64);

    if density < SPARSE_THRESHOLD {
        let f = density / SPARSE_THRESHOLD;
        let blend = |soil: u8, green: f64| soil as f64 + (green - soil as f64) * f;
        return Rgb::from_channels(blend(SOIL.r, r), blend(SOIL.g, g), blend(SOIL.b, b));
    }

    if density < LUSH_THRESHOLD {
        let f = (density - SPARSE_THRESHOLD) / (LUSH_THRESHOLD - SPARSE_THRESHOLD);
        return Rgb::from_channels(r * (1.0 - f * 0.3), g, b * (1.0 - f * 0.3));
    }

    let f = (density - LUSH_THRESHOLD) / (1.0 - LUSH_THRESHOLD);
    Rgb::from_channels(
        r * (0.7 - f * 0.4),
        g * (1.0 - f * 0.2),
        b * (0.7 - f * 0.4),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grass(density: Option<f64>, grass_type: Option<GrassType>, moisture: f64) -> TerrainCell {
        TerrainCell {
            grass_density: density,
            grass_type,
            moisture,
            ..Default::default()
        }
    }

    #[test]
    fn test_bare_soil_follows_moisture() {
        assert_eq!(grass_color(&grass(None, None, 0.0)), Rgb::new(139, 97, 55));
        assert_eq!(grass_color(&grass(Some(0.01), None, 1.0)), Rgb::new(189, 132, 75));
    }

    #[test]
    fn test_sparse_grass_starts_at_soil() {
        assert_eq!(grass_color(&grass(Some(0.05), Some(GrassType::Wetland), 0.0)), Rgb::new(115, 96, 35));
    }

    #[test]
    fn test_mid_density_is_full_hue() {
        for t in [
            GrassType::CoolSeason,
            GrassType::WarmSeason,
            GrassType::DroughtResistant,
            GrassType::Wetland,
            GrassType::Generic,
        ] {
            assert_eq!(grass_color(&grass(Some(0.3), Some(t), 0.0)), base_hue(t));
        }
    }

    #[test]
    fn test_dense_grass_darkens() {
        let c = grass_color(&grass(Some(1.0), None, 0.0));
        assert_eq!(c, Rgb::new(10, 111, 10));
        let lush = grass_color(&grass(Some(0.7), None, 0.0));
        assert!(c.r <= lush.r && c.g <= lush.g);
    }
}

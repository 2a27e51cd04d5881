//! Visualization settings: overlay toggles, numeric tunables and the active colour mode.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;

/// Base-raster colour mapping strategy. Exactly one is active per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum ColorMode {
    #[default]
    Default,
    Heightmap,
    Moisture,
    Temperature,
    Humidity,
    Wind,
    Grass,
    Pressure,
    Cloud,
}

impl ColorMode {
    pub fn name(&self) -> &'static str {
        match self {
            ColorMode::Default => "default",
            ColorMode::Heightmap => "heightmap",
            ColorMode::Moisture => "moisture",
            ColorMode::Temperature => "temperature",
            ColorMode::Humidity => "humidity",
            ColorMode::Wind => "wind",
            ColorMode::Grass => "grass",
            ColorMode::Pressure => "pressure",
            ColorMode::Cloud => "cloud",
        }
    }

    pub fn all() -> &'static [ColorMode] {
        &[
            ColorMode::Default,
            ColorMode::Heightmap,
            ColorMode::Moisture,
            ColorMode::Temperature,
            ColorMode::Humidity,
            ColorMode::Wind,
            ColorMode::Grass,
            ColorMode::Pressure,
            ColorMode::Cloud,
        ]
    }

    pub fn next(&self) -> ColorMode {
        let all = Self::all();
        let idx = all.iter().position(|m| m == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    /// Parse a mode name, falling back to `Default` for anything unrecognised.
    pub fn parse_lossy(name: &str) -> ColorMode {
        name.parse().unwrap_or_else(|_| {
            warn!(mode = name, "unknown colour mode, using default");
            ColorMode::Default
        })
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|m| m.name() == lowered)
            .ok_or_else(|| format!("unknown colour mode: {s}"))
    }
}

impl From<String> for ColorMode {
    fn from(name: String) -> Self {
        ColorMode::parse_lossy(&name)
    }
}

pub const EXAGGERATION_RANGE: (f64, f64) = (0.5, 3.0);
pub const CONTOUR_INTERVAL_RANGE: (f64, f64) = (25.0, 250.0);
pub const ZOOM_RANGE: (f64, f64) = (1.0, 5.0);

/// Per-frame visualization configuration. Replace rather than mutate.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualizationSettings {
    pub show_rivers: bool,
    pub show_moisture: bool,
    pub show_elevation: bool,
    pub show_clouds: bool,
    pub show_precipitation: bool,
    pub contour_lines: bool,
    pub wireframe: bool,
    /// Height exaggeration factor, 1.0 is neutral.
    pub exaggerate_height: f64,
    /// Altitude step between contour lines.
    pub contour_interval: f64,
    /// World cells visible across the canvas = viewport edge / zoom level.
    pub zoom_level: f64,
    pub color_mode: ColorMode,
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        Self {
            show_rivers: true,
            show_moisture: true,
            show_elevation: true,
            show_clouds: false,
            show_precipitation: false,
            contour_lines: false,
            wireframe: false,
            exaggerate_height: 1.0,
            contour_interval: 100.0,
            // 45 of the 100 fetched cells across the canvas
            zoom_level: 100.0 / 45.0,
            color_mode: ColorMode::Default,
        }
    }
}

fn clamp_or(value: f64, (min, max): (f64, f64), fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

impl VisualizationSettings {
    /// Return a copy with every tunable clamped into its supported range.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        self.exaggerate_height = clamp_or(
            self.exaggerate_height,
            EXAGGERATION_RANGE,
            defaults.exaggerate_height,
        );
        self.contour_interval = clamp_or(
            self.contour_interval,
            CONTOUR_INTERVAL_RANGE,
            defaults.contour_interval,
        );
        self.zoom_level = clamp_or(self.zoom_level, ZOOM_RANGE, defaults.zoom_level);
        self
    }

    pub fn with_color_mode(&self, color_mode: ColorMode) -> Self {
        Self {
            color_mode,
            ..self.clone()
        }
    }

    /// Multiply the zoom level by `factor`, staying inside the zoom range.
    pub fn zoomed(&self, factor: f64) -> Self {
        Self {
            zoom_level: clamp_or(self.zoom_level * factor, ZOOM_RANGE, self.zoom_level),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_modes() {
        for mode in ColorMode::all() {
            assert_eq!(mode.name().parse::<ColorMode>(), Ok(*mode));
        }
        assert_eq!("Wind".parse::<ColorMode>(), Ok(ColorMode::Wind));
    }

    #[test]
    fn test_unknown_mode_falls_back_to_default() {
        assert_eq!(ColorMode::parse_lossy("infrared"), ColorMode::Default);
        let settings: VisualizationSettings =
            serde_json::from_str(r#"{"colorMode": "infrared"}"#).unwrap();
        assert_eq!(settings.color_mode, ColorMode::Default);
    }

    #[test]
    fn test_mode_cycle_visits_every_mode() {
        let mut mode = ColorMode::Default;
        for _ in 0..ColorMode::all().len() {
            mode = mode.next();
        }
        assert_eq!(mode, ColorMode::Default);
    }

    #[test]
    fn test_normalized_clamps_tunables() {
        let settings = VisualizationSettings {
            exaggerate_height: 10.0,
            contour_interval: 1.0,
            zoom_level: f64::NAN,
            ..Default::default()
        }
        .normalized();
        assert_eq!(settings.exaggerate_height, 3.0);
        assert_eq!(settings.contour_interval, 25.0);
        assert_eq!(settings.zoom_level, 100.0 / 45.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: VisualizationSettings =
            serde_json::from_str(r#"{"showClouds": true, "zoomLevel": 2.0}"#).unwrap();
        assert!(settings.show_clouds);
        assert!(settings.show_rivers);
        assert_eq!(settings.zoom_level, 2.0);
        assert_eq!(settings.contour_interval, 100.0);
    }

    #[test]
    fn test_zoom_stays_in_range() {
        let settings = VisualizationSettings::default();
        assert_eq!(settings.zoomed(100.0).zoom_level, 5.0);
        assert_eq!(settings.zoomed(0.01).zoom_level, 1.0);
    }
}

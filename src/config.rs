//! Viewer configuration: backend location, window sizes and refresh cadence.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::minimap::MINIMAP_SIZE;
use crate::settings::VisualizationSettings;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Configuration for the viewer
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Base URL of the terrain backend (e.g., "http://localhost:5000")
    pub api_url: String,
    /// Main canvas size in pixels
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Minimap edge in pixels
    pub minimap_size: u32,
    /// Resolution requested from the minimap endpoint
    pub minimap_resolution: u32,
    /// World edge assumed until the backend reports one
    pub world_size: u32,
    /// Seconds between viewport refetches
    pub viewport_refresh_secs: u64,
    /// Seconds between minimap refetches
    pub minimap_refresh_secs: u64,
    /// Cells moved per arrow key press
    pub move_step: u32,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Initial visualization settings
    pub settings: VisualizationSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            canvas_width: 800,
            canvas_height: 800,
            minimap_size: MINIMAP_SIZE,
            minimap_resolution: 150,
            world_size: 2000,
            viewport_refresh_secs: 30,
            minimap_refresh_secs: 300,
            move_step: 10,
            request_timeout_secs: 30,
            settings: VisualizationSettings::default(),
        }
    }
}

impl ViewerConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ViewerConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.normalized())
    }

    /// Clamp tunables and replace zero sizes and intervals with defaults.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        let nonzero_u32 = |v: u32, d: u32| if v == 0 { d } else { v };
        let nonzero_u64 = |v: u64, d: u64| if v == 0 { d } else { v };

        self.canvas_width = nonzero_u32(self.canvas_width, defaults.canvas_width);
        self.canvas_height = nonzero_u32(self.canvas_height, defaults.canvas_height);
        self.minimap_size = nonzero_u32(self.minimap_size, defaults.minimap_size);
        self.minimap_resolution = nonzero_u32(self.minimap_resolution, defaults.minimap_resolution);
        self.world_size = nonzero_u32(self.world_size, defaults.world_size);
        self.viewport_refresh_secs = nonzero_u64(self.viewport_refresh_secs, defaults.viewport_refresh_secs);
        self.minimap_refresh_secs = nonzero_u64(self.minimap_refresh_secs, defaults.minimap_refresh_secs);
        self.request_timeout_secs = nonzero_u64(self.request_timeout_secs, defaults.request_timeout_secs);
        self.settings = self.settings.normalized();
        self
    }

    pub fn viewport_refresh(&self) -> Duration {
        Duration::from_secs(self.viewport_refresh_secs)
    }

    pub fn minimap_refresh(&self) -> Duration {
        Duration::from_secs(self.minimap_refresh_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ColorMode;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{"api_url": "http://sim:8080", "settings": {"colorMode": "wind", "contourLines": true}}"#;
        let config: ViewerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.api_url, "http://sim:8080");
        assert_eq!(config.canvas_width, 800);
        assert_eq!(config.settings.color_mode, ColorMode::Wind);
        assert!(config.settings.contour_lines);
        assert!(config.settings.show_rivers);
    }

    #[test]
    fn test_normalized_fixes_bad_values() {
        let config = ViewerConfig {
            canvas_width: 0,
            viewport_refresh_secs: 0,
            settings: VisualizationSettings {
                zoom_level: 40.0,
                contour_interval: 1.0,
                ..Default::default()
            },
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.canvas_width, 800);
        assert_eq!(config.viewport_refresh(), Duration::from_secs(30));
        assert_eq!(config.settings.zoom_level, 5.0);
        assert_eq!(config.settings.contour_interval, 25.0);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = ViewerConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_reads_file() {
        let path = std::env::temp_dir().join(format!("terrain_viewer_cfg_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"move_step": 25}"#).unwrap();
        let config = ViewerConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.move_step, 25);
        assert_eq!(config.minimap_size, 150);
    }
}

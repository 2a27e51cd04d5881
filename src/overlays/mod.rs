//! Overlay layers drawn over the base raster without touching cell colours.
//!
//! Overlays are toggled independently and always run in registration order;
//! the selection highlight must come last so it stays on top.

pub mod contours;
pub mod rivers;
pub mod selection;
pub mod weather;

use crate::cell::Selection;
use crate::layers::FrameContext;
use crate::settings::VisualizationSettings;
use crate::surface::Surface;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayLayer {
    Rivers,
    Contours,
    Clouds,
    Precipitation,
    Selection,
}

impl OverlayLayer {
    /// Draw order the compositor registers overlays in.
    pub fn ordered() -> Vec<OverlayLayer> {
        vec![
            OverlayLayer::Rivers,
            OverlayLayer::Contours,
            OverlayLayer::Clouds,
            OverlayLayer::Precipitation,
            OverlayLayer::Selection,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            OverlayLayer::Rivers => "rivers",
            OverlayLayer::Contours => "contours",
            OverlayLayer::Clouds => "clouds",
            OverlayLayer::Precipitation => "precipitation",
            OverlayLayer::Selection => "selection",
        }
    }

    pub fn should_render(&self, settings: &VisualizationSettings, selection: &Selection) -> bool {
        match self {
            OverlayLayer::Rivers => settings.show_rivers,
            OverlayLayer::Contours => settings.contour_lines && settings.show_elevation,
            OverlayLayer::Clouds => settings.show_clouds,
            OverlayLayer::Precipitation => settings.show_precipitation,
            OverlayLayer::Selection => !selection.is_empty(),
        }
    }

    pub fn render(&self, surface: &mut Surface, frame: &FrameContext) {
        match self {
            OverlayLayer::Rivers => rivers::render(surface, frame),
            OverlayLayer::Contours => contours::render(surface, frame),
            OverlayLayer::Clouds => weather::render_clouds(surface, frame),
            OverlayLayer::Precipitation => weather::render_precipitation(surface, frame),
            OverlayLayer::Selection => selection::render(surface, frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_order() {
        assert_eq!(
            OverlayLayer::ordered(),
            vec![
                OverlayLayer::Rivers,
                OverlayLayer::Contours,
                OverlayLayer::Clouds,
                OverlayLayer::Precipitation,
                OverlayLayer::Selection,
            ]
        );
    }

    #[test]
    fn test_contours_need_elevation() {
        let selection = Selection::default();
        let settings = VisualizationSettings {
            contour_lines: true,
            show_elevation: false,
            ..Default::default()
        };
        assert!(!OverlayLayer::Contours.should_render(&settings, &selection));
        let settings = VisualizationSettings {
            show_elevation: true,
            ..settings
        };
        assert!(OverlayLayer::Contours.should_render(&settings, &selection));
    }

    #[test]
    fn test_default_settings_enable_only_rivers() {
        let settings = VisualizationSettings::default();
        let selection = Selection::default();
        let enabled: Vec<_> = OverlayLayer::ordered()
            .into_iter()
            .filter(|o| o.should_render(&settings, &selection))
            .collect();
        assert_eq!(enabled, vec![OverlayLayer::Rivers]);
    }
}

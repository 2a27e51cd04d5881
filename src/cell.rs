//! Terrain cell records as delivered by the simulation backend, plus the
//! hovered/selected cell descriptors derived from pointer events.

use serde::Deserialize;

use crate::tilemap::Tilemap;

/// Classification of a cell. The backend treats this as an open set, so any
/// unrecognised tag is kept verbatim in `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum CellKind {
    River,
    Spring,
    Mud,
    Earth,
    Land,
    Other(String),
}

impl From<String> for CellKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "river" => CellKind::River,
            "spring" => CellKind::Spring,
            "mud" => CellKind::Mud,
            "earth" => CellKind::Earth,
            "land" | "" => CellKind::Land,
            _ => CellKind::Other(tag),
        }
    }
}

impl CellKind {
    pub fn name(&self) -> &str {
        match self {
            CellKind::River => "river",
            CellKind::Spring => "spring",
            CellKind::Mud => "mud",
            CellKind::Earth => "earth",
            CellKind::Land => "land",
            CellKind::Other(tag) => tag,
        }
    }

    /// Rivers and springs both carry flowing water.
    pub fn is_watercourse(&self) -> bool {
        matches!(self, CellKind::River | CellKind::Spring)
    }
}

impl Default for CellKind {
    fn default() -> Self {
        CellKind::Land
    }
}

/// Grass species family, used to pick the green base hue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum GrassType {
    CoolSeason,
    WarmSeason,
    DroughtResistant,
    Wetland,
    Generic,
}

impl From<String> for GrassType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "cool_season" => GrassType::CoolSeason,
            "warm_season" => GrassType::WarmSeason,
            "drought_resistant" => GrassType::DroughtResistant,
            "wetland" => GrassType::Wetland,
            _ => GrassType::Generic,
        }
    }
}

/// One grid cell of simulated terrain.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TerrainCell {
    #[serde(default)]
    pub id: i64,
    pub x: i64,
    pub y: i64,

    // Elevation
    pub altitude: f64,
    #[serde(default)]
    pub terrain_height: f64,
    #[serde(default)]
    pub water_height: f64,
    #[serde(default)]
    pub distance_from_water: f64,

    // Moisture
    #[serde(default)]
    pub base_moisture: f64,
    #[serde(default)]
    pub added_moisture: f64,
    #[serde(default)]
    pub moisture: f64,

    // Atmosphere
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub air_humidity: f64,
    #[serde(default)]
    pub cloud_density: f64,
    #[serde(default)]
    pub precipitation_rate: f64,
    #[serde(default)]
    pub ground_wetness: f64,
    #[serde(default)]
    pub atmospheric_pressure: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub wind_direction: Option<f64>,

    // Vegetation
    #[serde(default)]
    pub grass_density: Option<f64>,
    #[serde(default)]
    pub grass_type: Option<GrassType>,
    #[serde(default)]
    pub grass_health: Option<f64>,
    #[serde(default)]
    pub grass_dormant: Option<f64>,

    #[serde(rename = "type", default)]
    pub kind: CellKind,
    #[serde(default)]
    pub river_name: Option<String>,
}

impl TerrainCell {
    /// True when both cells are watercourses belonging to the same named river.
    pub fn shares_river_with(&self, other: &TerrainCell) -> bool {
        other.kind.is_watercourse()
            && self.river_name.is_some()
            && self.river_name == other.river_name
    }
}

/// Matrix of cells as delivered by either fetch contract.
pub type CellGrid = Tilemap<TerrainCell>;

/// A cell under the pointer, resolved from a pixel position.
#[derive(Clone, Debug, PartialEq)]
pub struct CellInfo {
    pub cell: TerrainCell,
    /// Index inside the fetched viewport window.
    pub local: (usize, usize),
    /// Wrapped world coordinate of the cell.
    pub world: (u32, u32),
    /// Pointer position on the canvas that produced this info.
    pub pointer: (f64, f64),
}

impl CellInfo {
    pub fn same_cell(&self, other: &CellInfo) -> bool {
        self.world == other.world
    }

    /// Tooltip lines shown next to the pointer.
    pub fn describe(&self) -> Vec<String> {
        let c = &self.cell;
        let mut lines = vec![
            format!("Position: ({}, {})", self.world.0, self.world.1),
            format!("Type: {}", c.kind.name()),
        ];
        if let Some(river) = &c.river_name {
            lines.push(format!("River: {river}"));
        }
        lines.push(format!("Altitude: {:.2}", c.altitude));
        lines.push(format!("Terrain Height: {:.2}", c.terrain_height));
        lines.push(format!("Water Height: {:.2}", c.water_height));
        lines.push(format!("Base Moisture: {:.2}", c.base_moisture));
        lines.push(format!("Moisture: {:.2}", c.moisture));
        lines.push(format!("Temperature: {:.1}C", c.temperature));
        lines.push(format!("Air Humidity: {:.1}%", c.air_humidity * 100.0));
        match c.atmospheric_pressure {
            Some(p) => lines.push(format!("Pressure: {p:.0} hPa")),
            None => lines.push("Pressure: N/A hPa".to_string()),
        }
        lines
    }
}

/// Hovered and selected cells for the current frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub hovered: Option<CellInfo>,
    pub selected: Option<CellInfo>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.hovered.is_none() && self.selected.is_none()
    }
}

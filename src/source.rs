//! Backend data contracts and their HTTP implementation.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::cell::TerrainCell;
use crate::error::FetchError;

/// Response to a viewport fetch: `height` rows of `width` cells, `[y][x]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportResponse {
    pub viewport: Vec<Vec<TerrainCell>>,
    #[serde(default)]
    pub world_size: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

impl ViewportResponse {
    /// Advertised world size, if present and usable.
    pub fn world_size(&self) -> Option<u32> {
        self.world_size.and_then(world_size_from)
    }
}

/// Down-sampled whole-world grid.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimapResponse {
    pub minimap: Vec<Vec<TerrainCell>>,
    #[serde(default)]
    pub resolution: Option<u32>,
    #[serde(default)]
    pub world_size: Option<f64>,
}

impl MinimapResponse {
    pub fn world_size(&self) -> Option<u32> {
        self.world_size.and_then(world_size_from)
    }
}

/// Simulation parameters the backend advertises.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Simulation tick in milliseconds.
    #[serde(default)]
    pub update_interval: Option<f64>,
}

impl BackendConfig {
    /// Refresh cadence matching the simulation tick, at least one second.
    pub fn refresh_interval(&self) -> Option<Duration> {
        let ms = self.update_interval.filter(|ms| ms.is_finite() && *ms > 0.0)?;
        Some(Duration::from_secs(((ms / 1000.0).round() as u64).max(1)))
    }
}

/// Zero, negative and non-finite sizes mean "not reported".
fn world_size_from(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 1.0 && value <= u32::MAX as f64).then(|| value as u32)
}

/// The two fetches the viewer depends on.
pub trait TerrainSource: Send + Sync + 'static {
    fn fetch_viewport(
        &self,
        origin: (u32, u32),
        edge: usize,
    ) -> impl Future<Output = Result<ViewportResponse, FetchError>> + Send;

    fn fetch_minimap(&self, resolution: u32) -> impl Future<Output = Result<MinimapResponse, FetchError>> + Send;
}

pub struct HttpTerrainSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTerrainSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "GET");

        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn fetch_config(&self) -> Result<BackendConfig, FetchError> {
        self.get_json("/api/config", &[]).await
    }
}

impl TerrainSource for HttpTerrainSource {
    async fn fetch_viewport(&self, origin: (u32, u32), edge: usize) -> Result<ViewportResponse, FetchError> {
        let query = [
            ("x", origin.0.to_string()),
            ("y", origin.1.to_string()),
            ("width", edge.to_string()),
            ("height", edge.to_string()),
        ];
        self.get_json("/api/viewport", &query).await
    }

    async fn fetch_minimap(&self, resolution: u32) -> Result<MinimapResponse, FetchError> {
        self.get_json("/api/minimap", &[("resolution", resolution.to_string())]).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_viewport_response() {
        let json = r#"{
            "viewport": [[{"id": 1, "x": 0, "y": 0, "altitude": 10.0, "type": "river", "river_name": "Ash"}]],
            "worldSize": 1000,
            "timestamp": 1717171717
        }"#;
        let resp: ViewportResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.viewport.len(), 1);
        assert_eq!(resp.viewport[0][0].river_name.as_deref(), Some("Ash"));
        assert_eq!(resp.world_size(), Some(1000));
        assert_eq!(resp.timestamp, Some(1717171717.0));
    }

    #[test]
    fn test_missing_or_zero_world_size_is_ignored() {
        let resp: ViewportResponse = serde_json::from_str(r#"{"viewport": []}"#).unwrap();
        assert_eq!(resp.world_size(), None);
        let resp: ViewportResponse = serde_json::from_str(r#"{"viewport": [], "worldSize": 0}"#).unwrap();
        assert_eq!(resp.world_size(), None);
    }

    #[test]
    fn test_parse_minimap_response() {
        let cell = r#"{"x": 0, "y": 0, "altitude": 5.0}"#;
        let json = format!(r#"{{"minimap": [[{cell}, {cell}], [{cell}, {cell}]], "resolution": 2, "worldSize": 400}}"#);
        let resp: MinimapResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(resp.minimap.len(), 2);
        assert_eq!(resp.resolution, Some(2));
        assert_eq!(resp.world_size(), Some(400));
    }

    #[test]
    fn test_backend_refresh_interval() {
        let cfg: BackendConfig = serde_json::from_str(r#"{"updateInterval": 2500}"#).unwrap();
        assert_eq!(cfg.refresh_interval(), Some(Duration::from_secs(3)));
        let cfg: BackendConfig = serde_json::from_str(r#"{"updateInterval": 100}"#).unwrap();
        assert_eq!(cfg.refresh_interval(), Some(Duration::from_secs(1)));
        assert_eq!(BackendConfig::default().refresh_interval(), None);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let source = HttpTerrainSource::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.base_url(), "http://localhost:5000");
    }
}

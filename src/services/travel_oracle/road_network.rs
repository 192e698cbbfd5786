//! Travel Oracle tier 2 — an OSRM-like `/table` service over HTTP.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::types::Coordinates;

use super::TravelMatrix;

#[derive(Debug, Clone)]
pub struct RoadNetworkConfig {
    /// Base URL of the road-network service, e.g. `http://localhost:5000`.
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl RoadNetworkConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_seconds: 20,
        }
    }
}

/// HTTP client for the road-network duration table and the nearest-edge
/// snapping endpoint used to align a crew's base to the drivable network.
pub struct RoadNetworkClient {
    client: Client,
    config: RoadNetworkConfig,
}

impl RoadNetworkClient {
    pub fn new(config: RoadNetworkConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("failed to build road network HTTP client");

        Self { client, config }
    }

    /// Full pairwise duration table for `points`, in seconds.
    pub async fn table(&self, points: &[Coordinates]) -> Result<TravelMatrix> {
        let n = points.len();
        if n == 0 {
            return Ok(TravelMatrix {
                durations: Vec::new(),
                size: 0,
            });
        }
        if n == 1 {
            return Ok(TravelMatrix {
                durations: vec![vec![0]],
                size: 1,
            });
        }

        let coords: Vec<String> = points
            .iter()
            .map(|c| format!("{},{}", c.lng, c.lat))
            .collect();
        let url = format!(
            "{}/table/v1/driving/{}?annotations=duration",
            self.config.base_url,
            coords.join(";")
        );

        debug!("requesting road network duration table for {} points", n);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("failed to reach road network service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("road network service returned {}: {}", status, body);
        }

        let parsed: TableResponse = response
            .json()
            .await
            .context("failed to parse road network table response")?;

        if parsed.code != "Ok" {
            anyhow::bail!("road network service returned code {}", parsed.code);
        }

        let mut durations = vec![vec![0u64; n]; n];
        for (i, row) in parsed.durations.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                durations[i][j] = cell.map(|d| d.max(0.0).round() as u64).unwrap_or(0);
            }
        }

        Ok(TravelMatrix { durations, size: n })
    }

    /// Snap a single point to the nearest drivable edge. Used to align a
    /// crew's configured base before building the day's first leg; callers
    /// fall back to the unsnapped point on any error.
    pub async fn nearest(&self, point: Coordinates) -> Result<Coordinates> {
        let url = format!(
            "{}/nearest/v1/driving/{},{}",
            self.config.base_url, point.lng, point.lat
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("failed to reach road network nearest-edge endpoint")?;

        if !response.status().is_success() {
            anyhow::bail!("road network nearest returned {}", response.status());
        }

        let parsed: NearestResponse = response
            .json()
            .await
            .context("failed to parse road network nearest response")?;

        let waypoint = parsed
            .waypoints
            .into_iter()
            .next()
            .context("road network nearest returned no waypoints")?;

        Ok(Coordinates::new(waypoint.location[1], waypoint.location[0]))
    }
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    code: String,
    durations: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct NearestResponse {
    waypoints: Vec<Waypoint>,
}

#[derive(Debug, Deserialize)]
struct Waypoint {
    location: [f64; 2],
}

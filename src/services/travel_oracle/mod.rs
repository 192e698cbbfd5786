//! Travel Oracle (C1) — turns a list of stops into a pairwise duration matrix.
//!
//! Three tiers in preference order: legs extracted from an already-solved
//! external-optimizer route, an OSRM-like road-network table, and a
//! great-circle estimate. The first tier is produced as a side effect of a
//! successful Route Optimizer Client call (`OptimizerSolution::leg_durations`);
//! this module owns the fallback chain used whenever that call fails or was
//! never made — tier 2 then tier 3 — so callers always get a usable matrix.

pub mod great_circle;
pub mod road_network;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::types::{Coordinates, TravelSource};

pub use great_circle::GreatCircleOracle;
pub use road_network::{RoadNetworkClient, RoadNetworkConfig};

/// Pairwise travel-time matrix, seconds, indexed the same way as the input
/// point slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelMatrix {
    pub durations: Vec<Vec<u64>>,
    pub size: usize,
}

impl TravelMatrix {
    pub fn duration(&self, from: usize, to: usize) -> u64 {
        self.durations[from][to]
    }
}

#[async_trait]
pub trait TravelOracle: Send + Sync {
    /// Build the full pairwise duration matrix for `points`. Never returns a
    /// negative duration; `points[i] == points[i+1]` always yields 0.
    async fn durations(&self, points: &[Coordinates]) -> Result<(TravelMatrix, TravelSource)>;
}

/// Tier-2-then-tier-3 fallback chain. Tier 1 (external-optimizer legs) is not
/// represented here: it is consumed by the Crew Dispatcher directly from a
/// solved route, before this chain is ever asked for anything.
pub struct ChainedTravelOracle {
    road_network: Option<RoadNetworkClient>,
    great_circle: GreatCircleOracle,
}

impl ChainedTravelOracle {
    pub fn new(road_network: Option<RoadNetworkClient>, great_circle: GreatCircleOracle) -> Self {
        Self {
            road_network,
            great_circle,
        }
    }
}

#[async_trait]
impl TravelOracle for ChainedTravelOracle {
    async fn durations(&self, points: &[Coordinates]) -> Result<(TravelMatrix, TravelSource)> {
        if let Some(client) = &self.road_network {
            match client.table(points).await {
                Ok(matrix) => return Ok((matrix, TravelSource::RoadNetworkTable)),
                Err(err) => warn!(error = %err, "road network table unavailable, falling back to great-circle"),
            }
        }

        Ok((self.great_circle.durations(points), TravelSource::GreatCircle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn falls_back_to_great_circle_without_road_network() {
        let chain = ChainedTravelOracle::new(None, GreatCircleOracle::default());
        let points = vec![Coordinates::new(50.0, 14.0), Coordinates::new(49.2, 16.6)];
        let (matrix, source) = chain.durations(&points).await.unwrap();
        assert_eq!(source, TravelSource::GreatCircle);
        assert!(matrix.duration(0, 1) > 0);
    }
}

//! Travel Oracle tier 3 — Haversine distance divided by a configured average
//! speed. Pure computation: never fails, never blocks.

use anyhow::Result;
use async_trait::async_trait;

use crate::services::geo::haversine_distance;
use crate::types::{Coordinates, TravelSource};

use super::{TravelMatrix, TravelOracle};

/// Great-circle travel-time estimator. The last-resort tier of the Travel
/// Oracle chain — always available, deterministic for fixed inputs.
#[derive(Debug, Clone, Copy)]
pub struct GreatCircleOracle {
    /// Average road speed in km/h used to convert distance to time.
    pub average_speed_kmh: f64,
}

impl GreatCircleOracle {
    pub fn new(average_speed_kmh: f64) -> Self {
        Self { average_speed_kmh }
    }

    /// Build the full pairwise duration matrix for `points`, in seconds.
    /// Zero for identical points; never negative.
    pub fn durations(&self, points: &[Coordinates]) -> TravelMatrix {
        let n = points.len();
        let mut durations = vec![vec![0u64; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let km = haversine_distance(&points[i], &points[j]);
                let hours = km / self.average_speed_kmh;
                durations[i][j] = (hours * 3600.0).round() as u64;
            }
        }

        TravelMatrix { durations, size: n }
    }
}

impl Default for GreatCircleOracle {
    fn default() -> Self {
        Self::new(30.0)
    }
}

#[async_trait]
impl TravelOracle for GreatCircleOracle {
    async fn durations(&self, points: &[Coordinates]) -> Result<(TravelMatrix, TravelSource)> {
        Ok((GreatCircleOracle::durations(self, points), TravelSource::GreatCircle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_for_identical_points() {
        let oracle = GreatCircleOracle::default();
        let p = Coordinates::new(50.0, 14.0);
        let matrix = oracle.durations(&[p, p]);
        assert_eq!(matrix.duration(0, 1), 0);
        assert_eq!(matrix.duration(1, 0), 0);
    }

    #[test]
    fn non_negative_and_symmetric() {
        let oracle = GreatCircleOracle::default();
        let a = Coordinates::new(50.0755, 14.4378);
        let b = Coordinates::new(49.1951, 16.6068);
        let matrix = oracle.durations(&[a, b]);
        assert!(matrix.duration(0, 1) > 0);
        assert_eq!(matrix.duration(0, 1), matrix.duration(1, 0));
    }

    #[test]
    fn short_hop_rounds_to_nearest_second() {
        // ~1.11 km at 60 km/h => 66.7s, well under the two-minute sanity bound.
        let oracle = GreatCircleOracle::new(60.0);
        let base = Coordinates::new(0.0, 0.0);
        let a = Coordinates::new(0.0, 0.01);
        let matrix = oracle.durations(&[base, a]);
        assert!(matrix.duration(0, 1) > 0 && matrix.duration(0, 1) < 120);
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let oracle = GreatCircleOracle::default();
        let a = Coordinates::new(50.0755, 14.4378);
        let b = Coordinates::new(49.1951, 16.6068);
        let m1 = oracle.durations(&[a, b]);
        let m2 = oracle.durations(&[a, b]);
        assert_eq!(m1.durations, m2.durations);
    }
}

//! Assignment — the engine's sole output: one OS bound to one crew for one day.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{CrewId, Numos};

/// Tags which tier of the Travel Oracle produced the durations used to
/// compute this Assignment's timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelSource {
    ExternalOptimizer,
    RoadNetworkTable,
    GreatCircle,
}

/// Created once per (OS, day) and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub numos: Numos,
    pub crew_id: CrewId,
    pub arrival: NaiveDateTime,
    pub finish: NaiveDateTime,
    pub base_return: NaiveDateTime,
    pub travel_source: TravelSource,
    /// Winning route's total distance/duration, when sequencing went through
    /// the external optimizer and it reported them. `None` for fallback
    /// schedules and for solvers that omit route-level totals.
    pub route_distance_meters: Option<f64>,
    pub route_duration_seconds: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_source_serializes_screaming_snake() {
        let json = serde_json::to_string(&TravelSource::GreatCircle).unwrap();
        assert_eq!(json, "\"GREAT_CIRCLE\"");
        let json = serde_json::to_string(&TravelSource::RoadNetworkTable).unwrap();
        assert_eq!(json, "\"ROAD_NETWORK_TABLE\"");
        let json = serde_json::to_string(&TravelSource::ExternalOptimizer).unwrap();
        assert_eq!(json, "\"EXTERNAL_OPTIMIZER\"");
    }
}

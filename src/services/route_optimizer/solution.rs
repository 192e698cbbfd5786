//! Route Optimizer Client (C2) response parsing — VROOM-shaped `routes[].steps[]`.

use anyhow::Result;

/// One sequenced step within a single vehicle's route.
#[derive(Debug, Clone)]
pub struct SolvedStep {
    pub job_id: u32,
    /// Seconds elapsed since the vehicle's time window start. Includes every
    /// prior stop's service (and any waiting) time, so it is NOT the right
    /// quantity to diff for a pure travel leg.
    pub arrival_seconds: i64,
    /// Cumulative pure travel time since route start, as VROOM reports it in
    /// `step.duration` — excludes service and waiting time at every prior
    /// stop. Diffing consecutive values yields the travel-only leg duration.
    pub travel_seconds: i64,
}

/// One vehicle's solved route.
#[derive(Debug, Clone)]
pub struct SolvedRoute {
    pub vehicle_id: u32,
    pub steps: Vec<SolvedStep>,
    /// Arrival back at the vehicle's `end` location, when the solver reports
    /// one. Needed to derive the final return-to-base leg.
    pub end_arrival_seconds: Option<i64>,
    /// Cumulative pure travel time at the `end` step, mirroring
    /// `SolvedStep::travel_seconds` for the return-to-base leg.
    pub end_travel_seconds: Option<i64>,
    /// Route-level totals VROOM reports alongside the steps, echoed onto the
    /// resulting Assignments (`distancia_vroom`/`duracao_vroom` in the
    /// original).
    pub distance_meters: Option<f64>,
    pub duration_seconds: Option<f64>,
}

/// Full solver response: zero or more solved routes plus the job ids the
/// solver could not place.
#[derive(Debug, Clone, Default)]
pub struct OptimizerSolution {
    pub routes: Vec<SolvedRoute>,
    pub unassigned_job_ids: Vec<u32>,
}

impl OptimizerSolution {
    pub fn is_empty(&self) -> bool {
        self.routes.iter().all(|r| r.steps.is_empty())
    }

    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let mut routes = Vec::new();

        if let Some(raw_routes) = value["routes"].as_array() {
            for raw_route in raw_routes {
                let vehicle_id = raw_route["vehicle"].as_u64().unwrap_or(0) as u32;
                let mut steps = Vec::new();
                let mut end_arrival_seconds = None;
                let mut end_travel_seconds = None;
                if let Some(raw_steps) = raw_route["steps"].as_array() {
                    for step in raw_steps {
                        match step["type"].as_str() {
                            Some("job") => {
                                let Some(job_id) = step["job"].as_u64() else {
                                    continue;
                                };
                                let Some(arrival) = step["arrival"].as_i64() else {
                                    continue;
                                };
                                let travel = step["duration"].as_i64().unwrap_or(0);
                                steps.push(SolvedStep {
                                    job_id: job_id as u32,
                                    arrival_seconds: arrival,
                                    travel_seconds: travel,
                                });
                            }
                            Some("end") => {
                                end_arrival_seconds = step["arrival"].as_i64();
                                end_travel_seconds = step["duration"].as_i64();
                            }
                            _ => {}
                        }
                    }
                }
                routes.push(SolvedRoute {
                    vehicle_id,
                    steps,
                    end_arrival_seconds,
                    end_travel_seconds,
                    distance_meters: raw_route["distance"].as_f64(),
                    duration_seconds: raw_route["duration"].as_f64(),
                });
            }
        }

        let unassigned_job_ids = value["unassigned"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|u| u["id"].as_u64().map(|id| id as u32))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            routes,
            unassigned_job_ids,
        })
    }

    /// Route-level distance/duration totals for `vehicle_id`, when the
    /// solver reported them.
    pub fn route_totals(&self, vehicle_id: u32) -> Option<(Option<f64>, Option<f64>)> {
        let route = self.routes.iter().find(|r| r.vehicle_id == vehicle_id)?;
        Some((route.distance_meters, route.duration_seconds))
    }

    /// Per-leg travel durations derived from the single route's cumulative
    /// `step.duration`: the highest-preference tier of the Travel Oracle
    /// when a route has already been solved. Legs run
    /// depot -> step0 -> step1 -> ... -> depot; consecutive deltas of the
    /// cumulative travel time are the pure travel time for the corresponding
    /// leg. Diffing `arrival` instead would double-count every prior stop's
    /// service (and waiting) time, since VROOM's `arrival` already includes
    /// it — `duration` does not. The final entry is the return-to-base leg,
    /// present only when the solver reported an `end` step.
    pub fn leg_durations(&self, vehicle_id: u32) -> Option<Vec<u64>> {
        let route = self.routes.iter().find(|r| r.vehicle_id == vehicle_id)?;
        if route.steps.is_empty() {
            return Some(Vec::new());
        }

        let mut legs = Vec::with_capacity(route.steps.len() + 1);
        let mut prev_travel = 0i64;
        for step in &route.steps {
            legs.push((step.travel_seconds - prev_travel).max(0) as u64);
            prev_travel = step.travel_seconds;
        }
        if let Some(end_travel) = route.end_travel_seconds {
            legs.push((end_travel - prev_travel).max(0) as u64);
        }
        Some(legs)
    }
}

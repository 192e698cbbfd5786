//! Crew Dispatcher (C6) — for one crew, combines the Priority Scorer (C3),
//! Candidate Selector (C4), Route Optimizer Client (C2), and Schedule
//! Builder (C5) into that crew's route for the day.
//!
//! Pipeline: eligibility filter over the Backlog -> score -> select up to
//! the crew's remaining capacity -> try the external solver for ordering and
//! leg durations, falling back to the Travel Oracle chain and a local
//! schedule when the solver is unavailable or returns nothing usable ->
//! emit Assignments.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::engine::backlog::Backlog;
use crate::engine::errors::DispatchError;
use crate::services::candidate_selector;
use crate::services::priority::{self, PriorityContext};
use crate::services::route_optimizer::{OptimizerJob, OptimizerVehicle, RouteOptimizerClient};
use crate::services::schedule_builder::{self, ScheduleBuilderConfig};
use crate::services::travel_oracle::{RoadNetworkClient, TravelMatrix, TravelOracle};
use crate::types::{Assignment, Coordinates, Crew, Numos, ServiceOrder, TravelSource};

#[derive(Debug, Clone)]
pub struct CrewDispatcherConfig {
    /// Per-crew daily Assignment cap (`K`).
    pub k: usize,
    pub global_base: Coordinates,
    pub schedule: ScheduleBuilderConfig,
    /// Seed for the Candidate Selector's GA/SA/ACO pipeline. Fixed per run so
    /// that dispatching the same Backlog twice reproduces the same subset
    /// (§5, P8) rather than drawing fresh entropy each call.
    pub selector_seed: u64,
}

pub struct CrewDispatcher<'a> {
    optimizer: Option<&'a RouteOptimizerClient>,
    travel: &'a (dyn TravelOracle + Sync),
    config: &'a CrewDispatcherConfig,
    /// Used once per dispatch to snap the crew's base to the drivable
    /// network before sequencing; errors are swallowed and the raw
    /// coordinate is used unchanged.
    road_network: Option<&'a RoadNetworkClient>,
}

/// Result of dispatching one crew for one round. Always returned, even when
/// it carries zero assignments — a crew contributing nothing is valid.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub assignments: Vec<Assignment>,
    pub empty_route: bool,
    pub solver_bad_request: bool,
}

impl DispatchOutcome {
    fn empty() -> Self {
        Self::default()
    }

    pub fn dispatched_numos(&self) -> Vec<Numos> {
        self.assignments.iter().map(|a| a.numos).collect()
    }
}

impl<'a> CrewDispatcher<'a> {
    pub fn new(
        optimizer: Option<&'a RouteOptimizerClient>,
        travel: &'a (dyn TravelOracle + Sync),
        config: &'a CrewDispatcherConfig,
    ) -> Self {
        Self {
            optimizer,
            travel,
            config,
            road_network: None,
        }
    }

    /// Attach the road-network client used for base snapping (§B).
    pub fn with_road_network(mut self, road_network: &'a RoadNetworkClient) -> Self {
        self.road_network = Some(road_network);
        self
    }

    /// Run one crew's pipeline against the current Backlog snapshot.
    /// `already_assigned_today` tracks prior rounds for the same crew on the
    /// same day (multi-round Variant A).
    pub async fn dispatch(&self, crew: &Crew, backlog: &Backlog, already_assigned_today: usize) -> DispatchOutcome {
        let shift_start = crew.reference_date.and_time(crew.shift_start);
        let shift_end = crew.reference_date.and_time(crew.shift_end);

        let remaining_capacity = self.config.k.saturating_sub(already_assigned_today);
        if remaining_capacity == 0 {
            return DispatchOutcome::empty();
        }

        // 1. Eligibility.
        let eligible: Vec<&ServiceOrder> = backlog
            .eligible(shift_start)
            .into_iter()
            .filter(|os| {
                let ok = os.location.is_plausible();
                if !ok {
                    warn!(numos = os.numos, "dropping OS with implausible coordinates");
                }
                ok
            })
            .collect();
        if eligible.is_empty() {
            return DispatchOutcome::empty();
        }

        // 2. Score.
        let scores: Vec<f64> = eligible
            .iter()
            .map(|os| {
                let wait_minutes = (shift_start - os.requested_at).num_seconds() as f64 / 60.0;
                priority::score(
                    os,
                    shift_start,
                    PriorityContext {
                        base_priority: 1.0,
                        violation_penalty: 0.0,
                        wait_minutes: wait_minutes.max(0.0),
                    },
                )
            })
            .collect();

        // 3. Select, then order the subset by descending score so both the
        // solver's job list and the fallback's stop order reflect priority.
        let chosen_idx = candidate_selector::select(&scores, remaining_capacity, self.config.selector_seed);
        if chosen_idx.is_empty() {
            return DispatchOutcome::empty();
        }
        let mut ordered: Vec<&ServiceOrder> = chosen_idx.iter().map(|&i| eligible[i]).collect();
        ordered.sort_by(|a, b| {
            let sa = scores[eligible.iter().position(|os| os.numos == a.numos).unwrap()];
            let sb = scores[eligible.iter().position(|os| os.numos == b.numos).unwrap()];
            sb.partial_cmp(&sa).unwrap()
        });

        let mut base = crew.effective_base(self.config.global_base);
        if let Some(client) = self.road_network {
            if let Ok(snapped) = client.nearest(base).await {
                base = snapped;
            }
        }

        // 4. Sequence & time.
        let (result, travel_source, solver_bad_request, route_distance_meters, route_duration_seconds) =
            self.sequence_and_time(crew, &base, &ordered, shift_start, shift_end).await;

        if result.stops.is_empty() {
            return DispatchOutcome {
                assignments: Vec::new(),
                empty_route: ordered.is_empty(),
                solver_bad_request,
            };
        }

        // 5. Emit.
        let assignments = result
            .stops
            .iter()
            .map(|stop| Assignment {
                numos: stop.numos,
                crew_id: crew.id.clone(),
                arrival: stop.arrival,
                finish: stop.finish,
                base_return: result.base_return,
                travel_source,
                route_distance_meters,
                route_duration_seconds,
            })
            .collect();

        DispatchOutcome {
            assignments,
            empty_route: false,
            solver_bad_request,
        }
    }

    async fn sequence_and_time(
        &self,
        crew: &Crew,
        base: &Coordinates,
        ordered: &[&ServiceOrder],
        shift_start: NaiveDateTime,
        shift_end: NaiveDateTime,
    ) -> (schedule_builder::ScheduleResult, TravelSource, bool, Option<f64>, Option<f64>) {
        if let Some(client) = self.optimizer {
            let vehicle = OptimizerVehicle::new(0, *base, shift_start, shift_end);
            let jobs: Vec<OptimizerJob> = ordered
                .iter()
                .enumerate()
                .map(|(idx, os)| OptimizerJob::new(idx as u32, os.location, os.service_seconds() as u32))
                .collect();

            match client.route(vehicle, jobs).await {
                Ok(solution) if !solution.is_empty() => {
                    if let Some(legs) = solution.leg_durations(0) {
                        if legs.len() == ordered.len() + 1 {
                            let matrix = chain_matrix(&legs);
                            let result = schedule_builder::build_schedule(crew, ordered, &matrix, &self.config.schedule);
                            let (distance, duration) = solution.route_totals(0).unwrap_or((None, None));
                            return (result, TravelSource::ExternalOptimizer, false, distance, duration);
                        }
                    }
                    debug!("optimizer solution shape did not match the request, falling back");
                }
                Ok(_) => debug!("optimizer returned an empty route, falling back"),
                Err(err) => warn!(error = %err, "route optimizer call failed, falling back"),
            }
        }

        let points: Vec<Coordinates> = std::iter::once(*base)
            .chain(ordered.iter().map(|os| os.location))
            .chain(std::iter::once(*base))
            .collect();

        let (matrix, source) = self
            .travel
            .durations(&points)
            .await
            .unwrap_or_else(|_| (flat_zero_matrix(points.len()), TravelSource::GreatCircle));

        let result = schedule_builder::build_schedule(crew, ordered, &matrix, &self.config.schedule);
        (result, source, false, None, None)
    }
}

/// A matrix where only `(i, i+1)` is meaningful, built from a flat sequence
/// of leg durations. All the Schedule Builder ever queries.
fn chain_matrix(legs: &[u64]) -> TravelMatrix {
    let size = legs.len() + 1;
    let mut durations = vec![vec![0u64; size]; size];
    for (i, &leg) in legs.iter().enumerate() {
        durations[i][i + 1] = leg;
    }
    TravelMatrix { durations, size }
}

fn flat_zero_matrix(size: usize) -> TravelMatrix {
    TravelMatrix {
        durations: vec![vec![0u64; size]; size],
        size,
    }
}

/// Maps a `DispatchError` onto a log line, matching the error taxonomy's
/// propagation policy: nothing here ever aborts the day.
pub fn log_crew_error(crew_id: &str, err: &DispatchError) {
    match err {
        DispatchError::TransientNetwork(_) => debug!(crew = crew_id, "recovered via fallback"),
        DispatchError::SolverBadRequest(_) | DispatchError::EmptyRoute { .. } => {
            warn!(crew = crew_id, error = %err, "solver issue, used fallback schedule")
        }
        DispatchError::InfeasibleShift { .. } => debug!(crew = crew_id, "no feasible schedule this round"),
        DispatchError::DataQuality { .. } => warn!(crew = crew_id, error = %err, "OS dropped for data quality"),
        DispatchError::Fatal(_) => warn!(crew = crew_id, error = %err, "crew skipped for the day"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::travel_oracle::GreatCircleOracle;
    use crate::types::{Numos, ServiceOrderType};
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::HashSet;

    fn crew() -> Crew {
        Crew {
            id: "E1".to_string(),
            reference_date: NaiveDate::from_ymd_opt(2026, 1, 26).unwrap(),
            shift_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            shift_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            pause_start: None,
            pause_end: None,
            base: None,
        }
    }

    fn os(numos: Numos, order_type: ServiceOrderType, lng: f64) -> ServiceOrder {
        ServiceOrder {
            numos,
            order_type,
            location: Coordinates::new(0.0, lng),
            requested_at: NaiveDate::from_ymd_opt(2026, 1, 20).unwrap().and_hms_opt(7, 0, 0).unwrap(),
            due_at: None,
            execution_minutes: 30,
            extra_minutes: 0,
            eusd: None,
            service_code: None,
        }
    }

    fn dispatcher_config() -> CrewDispatcherConfig {
        CrewDispatcherConfig {
            k: 15,
            global_base: Coordinates::new(0.0, 0.0),
            schedule: ScheduleBuilderConfig {
                daytime_codes: [739, 741].into_iter().collect::<HashSet<_>>(),
                daytime_window: (NaiveTime::from_hms_opt(8, 0, 0).unwrap(), NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
                overrun_fraction: 0.01,
            },
            selector_seed: 42,
        }
    }

    #[tokio::test]
    async fn zero_remaining_capacity_yields_empty_outcome() {
        let travel = GreatCircleOracle::new(60.0);
        let config = dispatcher_config();
        let dispatcher = CrewDispatcher::new(None, &travel, &config);
        let mut backlog = Backlog::new();
        backlog.insert(os(1, ServiceOrderType::Technical, 0.01));

        let outcome = dispatcher.dispatch(&crew(), &backlog, 15).await;
        assert!(outcome.assignments.is_empty());
        assert!(!outcome.empty_route);
    }

    #[tokio::test]
    async fn dispatches_eligible_orders_via_fallback_oracle() {
        let travel = GreatCircleOracle::new(60.0);
        let config = dispatcher_config();
        let dispatcher = CrewDispatcher::new(None, &travel, &config);
        let mut backlog = Backlog::new();
        backlog.insert(os(1, ServiceOrderType::Technical, 0.01));
        backlog.insert(os(2, ServiceOrderType::Technical, 0.02));

        let outcome = dispatcher.dispatch(&crew(), &backlog, 0).await;
        assert_eq!(outcome.assignments.len(), 2);
        assert!(outcome
            .assignments
            .iter()
            .all(|a| a.travel_source == TravelSource::GreatCircle));
    }

    #[tokio::test]
    async fn empty_backlog_yields_empty_outcome() {
        let travel = GreatCircleOracle::new(60.0);
        let config = dispatcher_config();
        let dispatcher = CrewDispatcher::new(None, &travel, &config);
        let backlog = Backlog::new();

        let outcome = dispatcher.dispatch(&crew(), &backlog, 0).await;
        assert!(outcome.assignments.is_empty());
    }
}

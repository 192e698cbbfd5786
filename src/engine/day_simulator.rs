//! Day Simulator (C7) — orchestrates every crew of one day against a shared
//! Backlog, in rounds, until capacity or eligibility is exhausted.
//!
//! Two variants coexist, matching the source's two competing designs (§9,
//! open question: both are implementable, the default is a dispatcher
//! setting, not a single canonical choice):
//!
//! - [`DispatchStrategy::PerCrewRounds`] (Variant A): crews are visited in
//!   shift-start order, round after round, each round calling the Crew
//!   Dispatcher (C6) against the current Backlog snapshot and removing its
//!   winners before the next crew goes.
//! - [`DispatchStrategy::GroupedMultiVehicle`] (Variant B): crews sharing an
//!   identical shift start are solved together as one multi-vehicle problem
//!   via the Route Optimizer Client's `route_multi`; a group whose solve
//!   fails or comes back empty drops to per-crew rounds for that group only.
//!   Either way, a final per-crew round pass mops up any capacity the
//!   grouped solve did not use.
//!
//! A day's state machine is `LOADED -> ROUND_IN_PROGRESS* -> (ELIGIBLE_EMPTY
//! | SATURATED) -> DAY_DONE`; [`run_day`](DaySimulator::run_day) walks it to
//! completion and returns the terminal [`DayOutcome`].

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use tracing::info;

use crate::engine::backlog::Backlog;
use crate::engine::crew_dispatcher::{CrewDispatcher, CrewDispatcherConfig, DispatchOutcome};
use crate::services::candidate_selector;
use crate::services::priority::{self, PriorityContext};
use crate::services::route_optimizer::{OptimizerJob, OptimizerVehicle, RouteOptimizerClient};
use crate::services::travel_oracle::{RoadNetworkClient, TravelOracle};
use crate::types::{Assignment, Crew, CrewId, Numos, TravelSource};

/// Per-round concurrency model (§5). Sequential is the simplest and the one
/// forced in tests that need bit-for-bit reproducibility; Parallel solves
/// the crews of a round concurrently against an immutable Backlog snapshot
/// and reconciles collisions by crew id afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStrategy {
    Sequential,
    Parallel,
}

/// Which of the two day-level designs (§9) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayVariant {
    PerCrewRounds,
    GroupedMultiVehicle,
}

#[derive(Debug, Clone)]
pub struct DaySimulatorConfig {
    pub dispatcher: CrewDispatcherConfig,
    pub concurrency: DispatchStrategy,
    pub variant: DayVariant,
}

/// Outcome of simulating one day to completion: every Assignment produced,
/// plus the §7 end-of-day summary counters.
#[derive(Debug, Clone)]
pub struct DayOutcome {
    pub day: NaiveDate,
    pub assignments: Vec<Assignment>,
    pub rounds_run: usize,
    pub crews_served: usize,
    pub crews_total: usize,
    /// OS whose `requested_at` falls on this reference day.
    pub new_pending: usize,
    /// OS carried over from a prior day, still unassigned after today.
    pub carried_pending: usize,
    pub empty_route_crews: Vec<CrewId>,
    pub solver_bad_request_crews: Vec<CrewId>,
}

impl DayOutcome {
    /// §7's per-day stdout summary: crews served, assignments per crew,
    /// pending counts (new vs. backlog), and any fallback/bad-request events.
    pub fn summary(&self) -> String {
        let mut per_crew: HashMap<&str, usize> = HashMap::new();
        // One route's distance/duration totals repeat across its stops; any
        // non-`None` value seen for a crew is that round's echoed total.
        let mut route_echo: HashMap<&str, (Option<f64>, Option<f64>)> = HashMap::new();
        for a in &self.assignments {
            *per_crew.entry(a.crew_id.as_str()).or_insert(0) += 1;
            if a.route_distance_meters.is_some() || a.route_duration_seconds.is_some() {
                route_echo.insert(a.crew_id.as_str(), (a.route_distance_meters, a.route_duration_seconds));
            }
        }
        let mut lines = vec![format!(
            "day {}: {} assignments across {}/{} crews in {} round(s)",
            self.day,
            self.assignments.len(),
            self.crews_served,
            self.crews_total,
            self.rounds_run
        )];
        let mut crews: Vec<&&str> = per_crew.keys().collect();
        crews.sort();
        for crew_id in crews {
            let mut line = format!("  crew {crew_id}: {} assignment(s)", per_crew[crew_id]);
            if let Some((distance, duration)) = route_echo.get(crew_id) {
                if let Some(d) = distance {
                    line.push_str(&format!(", {:.0}m", d));
                }
                if let Some(s) = duration {
                    line.push_str(&format!(", {:.0}s", s));
                }
            }
            lines.push(line);
        }
        lines.push(format!(
            "  pending: {} new, {} carried over",
            self.new_pending, self.carried_pending
        ));
        if !self.empty_route_crews.is_empty() {
            lines.push(format!("  empty_route: {}", self.empty_route_crews.join(", ")));
        }
        if !self.solver_bad_request_crews.is_empty() {
            lines.push(format!(
                "  solver_bad_request: {}",
                self.solver_bad_request_crews.join(", ")
            ));
        }
        lines.join("\n")
    }
}

pub struct DaySimulator<'a> {
    optimizer: Option<&'a RouteOptimizerClient>,
    travel: &'a (dyn TravelOracle + Sync),
    config: &'a DaySimulatorConfig,
    road_network: Option<&'a RoadNetworkClient>,
}

impl<'a> DaySimulator<'a> {
    pub fn new(
        optimizer: Option<&'a RouteOptimizerClient>,
        travel: &'a (dyn TravelOracle + Sync),
        config: &'a DaySimulatorConfig,
    ) -> Self {
        Self {
            optimizer,
            travel,
            config,
            road_network: None,
        }
    }

    /// Attach the road-network client used for per-crew base snapping (§B).
    pub fn with_road_network(mut self, road_network: &'a RoadNetworkClient) -> Self {
        self.road_network = Some(road_network);
        self
    }

    /// Run one day to completion against `backlog`, mutating it in place as
    /// Assignments are removed (I3: removal is monotonic within the run).
    pub async fn run_day(&self, day: NaiveDate, crews: &[Crew], backlog: &mut Backlog) -> DayOutcome {
        let mut sorted_crews = crews.to_vec();
        sorted_crews.sort_by(|a, b| a.shift_start.cmp(&b.shift_start).then(a.id.cmp(&b.id)));

        let mut already_assigned: HashMap<CrewId, usize> =
            sorted_crews.iter().map(|c| (c.id.clone(), 0)).collect();
        let mut assignments = Vec::new();
        let mut empty_route_crews = Vec::new();
        let mut solver_bad_request_crews = Vec::new();
        let mut rounds_run = 0usize;

        if self.config.variant == DayVariant::GroupedMultiVehicle {
            self.run_grouped_multi_vehicle(&sorted_crews, backlog, &mut already_assigned, &mut assignments)
                .await;
        }
        // Either variant finishes with a per-crew round pass: Variant A runs
        // it as the whole day; Variant B uses it to mop up any capacity the
        // grouped solve left on the table (including groups whose solve
        // failed and were never assigned anything above).
        let remaining_crews = sorted_crews.clone();

        let mut dispatcher = CrewDispatcher::new(self.optimizer, self.travel, &self.config.dispatcher);
        if let Some(road_network) = self.road_network {
            dispatcher = dispatcher.with_road_network(road_network);
        }
        let k = self.config.dispatcher.k;

        loop {
            let earliest_shift_start = remaining_crews
                .iter()
                .map(|c| c.reference_date.and_time(c.shift_start))
                .min();
            let Some(earliest) = earliest_shift_start else {
                break;
            };
            if backlog.eligible(earliest).is_empty() {
                break; // ELIGIBLE_EMPTY
            }
            if remaining_crews
                .iter()
                .all(|c| already_assigned[&c.id] >= k)
            {
                break; // SATURATED: every crew already at capacity
            }

            rounds_run += 1;
            let round_outcomes = self
                .run_round(&dispatcher, &remaining_crews, backlog, &already_assigned)
                .await;

            let mut any_progress = false;
            let mut claimed: Vec<Numos> = Vec::new();
            for (crew, outcome) in round_outcomes {
                let fresh: Vec<Assignment> = outcome
                    .assignments
                    .into_iter()
                    .filter(|a| !claimed.contains(&a.numos))
                    .collect();
                if !fresh.is_empty() {
                    any_progress = true;
                    claimed.extend(fresh.iter().map(|a| a.numos));
                    *already_assigned.get_mut(&crew.id).unwrap() += fresh.len();
                    assignments.extend(fresh);
                }
                if outcome.empty_route {
                    empty_route_crews.push(crew.id.clone());
                }
                if outcome.solver_bad_request {
                    solver_bad_request_crews.push(crew.id.clone());
                }
            }
            backlog.remove(&claimed);

            if !any_progress {
                break; // SATURATED: a round with no crew able to make progress
            }
        }

        let (new_pending, carried_pending) = backlog.pending_breakdown(day);
        let crews_served = already_assigned.values().filter(|&&n| n > 0).count();

        let outcome = DayOutcome {
            day,
            assignments,
            rounds_run,
            crews_served,
            crews_total: sorted_crews.len(),
            new_pending,
            carried_pending,
            empty_route_crews,
            solver_bad_request_crews,
        };

        info!(
            day = %day,
            assignments = outcome.assignments.len(),
            crews_served = outcome.crews_served,
            crews_total = outcome.crews_total,
            new_pending = outcome.new_pending,
            carried_pending = outcome.carried_pending,
            "day complete"
        );

        outcome
    }

    /// Dispatch every crew of one round, sequentially or concurrently
    /// against a shared snapshot depending on `self.config.concurrency`.
    /// Either way the caller reconciles collisions deterministically by
    /// crew id (earlier-id wins, per §5's ordering guarantee).
    async fn run_round(
        &self,
        dispatcher: &CrewDispatcher<'_>,
        crews: &[Crew],
        backlog: &Backlog,
        already_assigned: &HashMap<CrewId, usize>,
    ) -> Vec<(Crew, DispatchOutcome)> {
        match self.config.concurrency {
            DispatchStrategy::Sequential => {
                let mut results = Vec::with_capacity(crews.len());
                for crew in crews {
                    let prior = already_assigned[&crew.id];
                    let outcome = dispatcher.dispatch(crew, backlog, prior).await;
                    results.push((crew.clone(), outcome));
                }
                results
            }
            DispatchStrategy::Parallel => {
                let futures = crews.iter().map(|crew| {
                    let prior = already_assigned[&crew.id];
                    async move { (crew.clone(), dispatcher.dispatch(crew, backlog, prior).await) }
                });
                join_all(futures).await
            }
        }
    }

    /// Variant B: group crews by identical shift start, submit one
    /// multi-vehicle problem per group. Groups with no optimizer configured,
    /// or whose solve fails or comes back empty, are simply left for the
    /// per-crew round loop that always runs after this.
    async fn run_grouped_multi_vehicle(
        &self,
        crews: &[Crew],
        backlog: &mut Backlog,
        already_assigned: &mut HashMap<CrewId, usize>,
        assignments: &mut Vec<Assignment>,
    ) {
        let Some(client) = self.optimizer else {
            return;
        };

        let mut groups: HashMap<chrono::NaiveDateTime, Vec<Crew>> = HashMap::new();
        for crew in crews {
            groups
                .entry(crew.reference_date.and_time(crew.shift_start))
                .or_default()
                .push(crew.clone());
        }
        let mut group_starts: Vec<chrono::NaiveDateTime> = groups.keys().copied().collect();
        group_starts.sort();

        for shift_start in group_starts {
            let group = groups.remove(&shift_start).unwrap();
            let k = self.config.dispatcher.k;
            let total_capacity: usize = group
                .iter()
                .map(|c| k.saturating_sub(already_assigned[&c.id]))
                .sum();
            if total_capacity == 0 {
                continue;
            }

            let eligible = backlog.eligible(shift_start);
            if eligible.is_empty() {
                continue;
            }

            let scores: Vec<f64> = eligible
                .iter()
                .map(|os| {
                    let wait_minutes = (shift_start - os.requested_at).num_seconds() as f64 / 60.0;
                    priority::score(
                        os,
                        shift_start,
                        PriorityContext {
                            wait_minutes: wait_minutes.max(0.0),
                            ..Default::default()
                        },
                    )
                })
                .collect();
            let pool = candidate_selector::prefilter(&scores, total_capacity);

            let jobs: Vec<OptimizerJob> = pool
                .iter()
                .enumerate()
                .map(|(local_id, &i)| {
                    OptimizerJob::new(local_id as u32, eligible[i].location, eligible[i].service_seconds() as u32)
                        .with_capacity()
                })
                .collect();

            let vehicles: Vec<OptimizerVehicle> = group
                .iter()
                .enumerate()
                .map(|(vid, crew)| {
                    let remaining = k.saturating_sub(already_assigned[&crew.id]) as u32;
                    let base = crew.effective_base(self.config.dispatcher.global_base);
                    let shift_end = crew.reference_date.and_time(crew.shift_end);
                    OptimizerVehicle::new(vid as u32, base, shift_start, shift_end).with_capacity(remaining)
                })
                .collect();

            match client.route_multi(vehicles, jobs).await {
                Ok(solution) if !solution.is_empty() => {
                    let mut claimed = Vec::new();
                    for (vid, crew) in group.iter().enumerate() {
                        let Some(route) = solution.routes.iter().find(|r| r.vehicle_id == vid as u32) else {
                            continue;
                        };
                        for step in &route.steps {
                            let Some(&os_idx) = pool.get(step.job_id as usize) else {
                                continue;
                            };
                            let os = eligible[os_idx];
                            let arrival = shift_start + Duration::seconds(step.arrival_seconds);
                            let finish = arrival + Duration::seconds(os.service_seconds());
                            let base_return = route
                                .end_arrival_seconds
                                .map(|s| shift_start + Duration::seconds(s))
                                .unwrap_or(finish);
                            let (route_distance_meters, route_duration_seconds) =
                                solution.route_totals(vid as u32).unwrap_or((None, None));
                            assignments.push(Assignment {
                                numos: os.numos,
                                crew_id: crew.id.clone(),
                                arrival,
                                finish,
                                base_return,
                                travel_source: TravelSource::ExternalOptimizer,
                                route_distance_meters,
                                route_duration_seconds,
                            });
                            claimed.push(os.numos);
                            *already_assigned.get_mut(&crew.id).unwrap() += 1;
                        }
                    }
                    backlog.remove(&claimed);
                }
                _ => {}
            }
        }
    }
}

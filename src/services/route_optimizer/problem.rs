//! Route Optimizer Client (C2) request construction — VROOM-shaped job/vehicle
//! JSON.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::types::Coordinates;

/// One job to be sequenced. `id` must be unique within a single request.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizerJob {
    pub id: u32,
    pub location: [f64; 2],
    pub service: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<[u32; 1]>,
}

impl OptimizerJob {
    pub fn new(id: u32, location: Coordinates, service_seconds: u32) -> Self {
        Self {
            id,
            location: location.as_lon_lat(),
            service: service_seconds,
            delivery: None,
        }
    }

    /// A job that consumes one unit of a vehicle's capacity, used by the
    /// multi-vehicle solve to enforce the per-crew daily limit.
    pub fn with_capacity(mut self) -> Self {
        self.delivery = Some([1]);
        self
    }
}

/// One vehicle available to the solver. `start`/`end` are both the crew's
/// base; `time_window` is seconds elapsed since the group's shift start.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizerVehicle {
    pub id: u32,
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub time_window: [i64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<[u32; 1]>,
}

impl OptimizerVehicle {
    pub fn new(id: u32, base: Coordinates, shift_start: NaiveDateTime, shift_end: NaiveDateTime) -> Self {
        let horizon = (shift_end - shift_start).num_seconds().max(0);
        Self {
            id,
            start: base.as_lon_lat(),
            end: base.as_lon_lat(),
            time_window: [0, horizon],
            capacity: None,
        }
    }

    /// Cap the number of jobs this vehicle may be assigned.
    pub fn with_capacity(mut self, limit: u32) -> Self {
        self.capacity = Some([limit]);
        self
    }
}

/// Solver options. `g: false` turns off VROOM's geometry computation, which
/// this client never needs — only the timing and ordering of the solution.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizerOptions {
    pub g: bool,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self { g: false }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizerRequest {
    pub jobs: Vec<OptimizerJob>,
    pub vehicles: Vec<OptimizerVehicle>,
    pub options: OptimizerOptions,
}

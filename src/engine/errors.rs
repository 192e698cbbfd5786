//! Error taxonomy for the dispatch engine.
//!
//! Every failure the Crew Dispatcher and Day Simulator can surface is mapped
//! onto one of these variants so a caller can decide, without inspecting a
//! message string, whether to retry, skip the OS, skip the crew, or abort the
//! whole run.

use thiserror::Error;

use crate::types::Numos;

pub type DispatchResult<T> = Result<T, DispatchError>;

#[derive(Error, Debug)]
pub enum DispatchError {
    /// The Travel Oracle or Route Optimizer Client could not be reached, or
    /// the reply was not valid JSON. Retryable; the caller falls back to the
    /// next Travel Oracle tier or a later retry of the optimizer call.
    #[error("transient network failure: {0}")]
    TransientNetwork(#[source] anyhow::Error),

    /// The route optimizer accepted the connection but rejected the request
    /// body itself (malformed job/vehicle payload, unsupported option). Not
    /// retryable without changing the request.
    #[error("route optimizer rejected the request: {0}")]
    SolverBadRequest(String),

    /// A solved route came back with zero steps for a vehicle that was given
    /// jobs to place. Distinct from an empty pool: the solver ran, but
    /// produced nothing usable.
    #[error("route optimizer returned an empty route for crew {crew_id}")]
    EmptyRoute { crew_id: String },

    /// No candidate selection fits within the crew's remaining shift time,
    /// even after dropping to a single OS. The crew's round ends with zero
    /// assignments.
    #[error("no feasible schedule for crew {crew_id} within its shift")]
    InfeasibleShift { crew_id: String },

    /// A Service Order carries data the engine cannot reconcile (for example
    /// coordinates outside a plausible range, or an unparseable service
    /// code). The OS is skipped for the day rather than aborting the run.
    #[error("data quality issue on OS {numos}: {reason}")]
    DataQuality { numos: Numos, reason: String },

    /// Unrecoverable: configuration is missing or self-contradictory, or an
    /// invariant the engine depends on has been violated. Aborts the run.
    #[error("fatal engine error: {0}")]
    Fatal(String),
}

impl DispatchError {
    /// Whether the caller should retry the same operation rather than give
    /// up on the crew or OS it concerns.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DispatchError::TransientNetwork(_))
    }

    /// Whether this failure concerns a single crew's round rather than the
    /// whole day.
    pub fn is_crew_scoped(&self) -> bool {
        matches!(
            self,
            DispatchError::EmptyRoute { .. } | DispatchError::InfeasibleShift { .. }
        )
    }
}

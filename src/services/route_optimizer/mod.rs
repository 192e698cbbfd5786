//! Route Optimizer Client (C2) — HTTP client for the external VROOM-like
//! solver. Treated strictly as a black box: the engine builds a jobs/vehicles
//! problem, POSTs it, and parses whatever comes back. Any transport or
//! solver-side failure is recovered by the caller via the Travel Oracle
//! fallback chain and a locally computed schedule.

pub mod problem;
pub mod solution;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

pub use problem::{OptimizerJob, OptimizerOptions, OptimizerRequest, OptimizerVehicle};
pub use solution::{OptimizerSolution, SolvedRoute, SolvedStep};

#[derive(Debug, Clone)]
pub struct RouteOptimizerConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl RouteOptimizerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_seconds: 30,
        }
    }
}

pub struct RouteOptimizerClient {
    client: Client,
    config: RouteOptimizerConfig,
}

impl RouteOptimizerClient {
    pub fn new(config: RouteOptimizerConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("failed to build route optimizer HTTP client");

        Self { client, config }
    }

    /// Sequence a single vehicle across `jobs`.
    pub async fn route(&self, vehicle: OptimizerVehicle, jobs: Vec<OptimizerJob>) -> Result<OptimizerSolution> {
        self.solve(OptimizerRequest {
            jobs,
            vehicles: vec![vehicle],
            options: OptimizerOptions::default(),
        })
        .await
    }

    /// Sequence several vehicles sharing the same shift start across a
    /// common job pool (the grouped multi-vehicle solve).
    pub async fn route_multi(
        &self,
        vehicles: Vec<OptimizerVehicle>,
        jobs: Vec<OptimizerJob>,
    ) -> Result<OptimizerSolution> {
        self.solve(OptimizerRequest {
            jobs,
            vehicles,
            options: OptimizerOptions::default(),
        })
        .await
    }

    async fn solve(&self, request: OptimizerRequest) -> Result<OptimizerSolution> {
        debug!(
            jobs = request.jobs.len(),
            vehicles = request.vehicles.len(),
            "dispatching route optimizer request"
        );

        let response = self
            .client
            .post(&self.config.base_url)
            .json(&request)
            .send()
            .await
            .context("failed to reach route optimizer")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("route optimizer returned {}: {}", status, body);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("failed to parse route optimizer response")?;

        OptimizerSolution::from_json(&body)
    }
}

//! dispatch-sim — daily field-service dispatch and routing simulation engine.
//!
//! The loaders, result sinks, and full service wiring a production
//! deployment would have around this engine are out-of-scope external
//! collaborators (§1 of the specification this crate implements). This
//! binary is a thin demonstration harness: it runs the Day Simulator over an
//! in-process fixture and prints the per-day summary to stdout.

mod cli;
mod defaults;
mod engine;
mod fixture;
mod services;
mod types;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engine::backlog::Backlog;
use engine::crew_dispatcher::CrewDispatcherConfig;
use engine::day_simulator::{DaySimulator, DaySimulatorConfig, DayVariant, DispatchStrategy};
use engine::EngineConfig;
use services::route_optimizer::{RouteOptimizerClient, RouteOptimizerConfig};
use services::schedule_builder::ScheduleBuilderConfig;
use services::travel_oracle::{ChainedTravelOracle, GreatCircleOracle, RoadNetworkClient, RoadNetworkConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let config = EngineConfig::from_env()?;
    init_tracing(&config.logs_dir);

    let (days, grouped) = match cli.command {
        Some(cli::Command::Simulate { days, grouped }) => (days.max(1), grouped),
        None => (1, false),
    };
    run_simulation(&config, days, grouped).await
}

async fn run_simulation(config: &EngineConfig, days: u32, grouped: bool) -> Result<()> {
    info!("starting dispatch-sim demonstration run for {} day(s)", days);

    let road_network = config
        .road_network_url
        .as_ref()
        .map(|url| RoadNetworkClient::new(RoadNetworkConfig::new(url.clone())));
    let snapping_road_network = config
        .road_network_url
        .as_ref()
        .map(|url| RoadNetworkClient::new(RoadNetworkConfig::new(url.clone())));
    let great_circle = GreatCircleOracle::new(config.average_speed_kmh);
    let travel = ChainedTravelOracle::new(road_network, great_circle);

    let optimizer = config
        .route_optimizer_url
        .as_ref()
        .map(|url| RouteOptimizerClient::new(RouteOptimizerConfig::new(url.clone())));

    let simulator_config = DaySimulatorConfig {
        dispatcher: CrewDispatcherConfig {
            k: config.crew_daily_limit as usize,
            global_base: config.fallback_base,
            schedule: ScheduleBuilderConfig {
                daytime_codes: config.daytime_codes.clone(),
                daytime_window: config.daytime_window,
                overrun_fraction: config.overrun_fraction,
            },
            selector_seed: config.selector_seed,
        },
        concurrency: DispatchStrategy::Sequential,
        variant: if grouped {
            DayVariant::GroupedMultiVehicle
        } else {
            DayVariant::PerCrewRounds
        },
    };

    let mut simulator = DaySimulator::new(optimizer.as_ref(), &travel, &simulator_config);
    if let Some(client) = &snapping_road_network {
        simulator = simulator.with_road_network(client);
    }

    let start_day = NaiveDate::from_ymd_opt(2026, 1, 26).expect("valid static fixture date");
    let mut backlog = Backlog::new();
    backlog.insert_all(fixture::sample_backlog(start_day));

    for offset in 0..days {
        let day = start_day + Duration::days(offset as i64);
        let crews = fixture::sample_crews(day);

        let outcome = simulator.run_day(day, &crews, &mut backlog).await;
        println!("{}", outcome.summary());
        backlog.carry_forward();
    }

    Ok(())
}

fn init_tracing(logs_dir: &str) {
    std::fs::create_dir_all(logs_dir).ok();

    let file_appender = RollingFileAppender::new(Rotation::DAILY, logs_dir, "dispatch-sim.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // Leaked deliberately: the guard must outlive the subscriber, and this
    // process runs the simulation once and exits.
    Box::leak(Box::new(guard));

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,dispatch_sim=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();
}

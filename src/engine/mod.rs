//! The dispatch-and-scheduling engine: the day-by-day assignment core this
//! crate exists to implement. Everything under `services` is a leaf
//! collaborator (travel oracle, optimizer client, scorer, selector,
//! schedule builder); this module wires them into the Crew Dispatcher (C6),
//! the Day Simulator (C7), and the Backlog (C8) that owns state across days.

pub mod backlog;
pub mod config;
pub mod crew_dispatcher;
pub mod day_simulator;
pub mod errors;

pub use backlog::Backlog;
pub use config::EngineConfig;
pub use crew_dispatcher::{CrewDispatcher, CrewDispatcherConfig, DispatchOutcome};
pub use day_simulator::{DayOutcome, DaySimulator, DispatchStrategy};
pub use errors::{DispatchError, DispatchResult};

//! Literal defaults used by the in-process demonstration fixture (§A.4).
//! These are not engine configuration (see `engine::config::EngineConfig`
//! for §6's environment knobs) — they just seed the `Simulate` command's
//! built-in sample day when no fixture file is supplied.

use chrono::NaiveTime;

pub const DEFAULT_SERVICE_DURATION_MINUTES: u32 = 30;

pub fn default_work_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).expect("valid static default work start")
}

pub fn default_work_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).expect("valid static default work end")
}

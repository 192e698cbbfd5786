//! Schedule Builder (C5) — walks an already-sequenced stop list and turns
//! travel and service durations into concrete arrival/finish timestamps for
//! one crew's shift.
//!
//! Three rules sit on top of a plain cursor walk:
//! - a single pause window that partially consumes whichever leg (travel or
//!   service) it falls inside, rather than simply snapping the cursor to the
//!   pause's end,
//! - daytime-window snapping for commercial OS whose `service_code` is in
//!   the configured daytime set (`codserv` 739/741 by default), applied to
//!   the arrival time after the pause-aware travel advance,
//! - a shift-overrun cutoff with a small tolerance fraction: once a stop's
//!   finish would exceed `shift_end * (1 + overrun_fraction)`, it and
//!   everything after it are dropped from this day's schedule.

use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::services::travel_oracle::TravelMatrix;
use crate::types::{Crew, Numos, ServiceOrder};

#[derive(Debug, Clone)]
pub struct ScheduleBuilderConfig {
    pub daytime_codes: HashSet<i32>,
    pub daytime_window: (NaiveTime, NaiveTime),
    pub overrun_fraction: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduledStop {
    pub numos: Numos,
    pub arrival: NaiveDateTime,
    pub finish: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct ScheduleResult {
    pub stops: Vec<ScheduledStop>,
    pub base_return: NaiveDateTime,
    /// True when one or more trailing stops were dropped for overrunning
    /// the shift (with tolerance).
    pub truncated: bool,
}

/// Build a schedule for `ordered` (already sequenced) service orders.
/// `travel` must be sized `ordered.len() + 2`: index 0 is the crew's base,
/// indices `1..=ordered.len()` are the stops in order, and the last index is
/// the base again.
pub fn build_schedule(
    crew: &Crew,
    ordered: &[&ServiceOrder],
    travel: &TravelMatrix,
    config: &ScheduleBuilderConfig,
) -> ScheduleResult {
    let shift_start = crew.reference_date.and_time(crew.shift_start);
    let shift_end = crew.reference_date.and_time(crew.shift_end);

    if ordered.is_empty() {
        return ScheduleResult {
            stops: Vec::new(),
            base_return: shift_start,
            truncated: false,
        };
    }

    let shift_seconds = (shift_end - shift_start).num_seconds().max(0);
    let limit = shift_start + Duration::seconds((shift_seconds as f64 * (1.0 + config.overrun_fraction)) as i64);

    let pause = match (crew.pause_start, crew.pause_end) {
        (Some(start), Some(end)) if end > start => Some((
            crew.reference_date.and_time(start),
            crew.reference_date.and_time(end),
        )),
        _ => None,
    };

    let mut now = shift_start;
    let mut stops = Vec::with_capacity(ordered.len());
    let mut truncated = false;
    let mut last_index = 0usize;

    for (i, os) in ordered.iter().enumerate() {
        let travel_seconds = travel.duration(i, i + 1) as i64;
        let mut arrival = advance_with_pause(now, travel_seconds, pause);

        if os.order_type.is_commercial() {
            if let Some(code) = os.service_code {
                if config.daytime_codes.contains(&code) {
                    arrival = snap_to_daytime_window(arrival, config.daytime_window);
                }
            }
        }

        let finish = advance_with_pause(arrival, os.service_seconds(), pause);

        if finish > limit {
            truncated = true;
            break;
        }

        stops.push(ScheduledStop {
            numos: os.numos,
            arrival,
            finish,
        });
        now = finish;
        last_index = i + 1;
    }

    let base_return = if stops.is_empty() {
        shift_start
    } else {
        let return_leg = travel.duration(last_index, travel.size - 1) as i64;
        advance_with_pause(now, return_leg, pause)
    };

    ScheduleResult {
        stops,
        base_return,
        truncated,
    }
}

/// Advance `t` by `delta_seconds`, deferring into `pause` (if given) rather
/// than running straight through it:
///
/// - no overlap between `[t, t+delta]` and the pause: plain addition,
/// - `t` already inside the pause: the whole delta is consumed after it ends,
/// - `t` precedes the pause but the advance reaches into it: the portion up
///   to the pause start is consumed before it, the rest after it ends.
fn advance_with_pause(t: NaiveDateTime, delta_seconds: i64, pause: Option<(NaiveDateTime, NaiveDateTime)>) -> NaiveDateTime {
    let Some((pause_start, pause_end)) = pause else {
        return t + Duration::seconds(delta_seconds);
    };

    let naive_end = t + Duration::seconds(delta_seconds);
    if !intersects(t, naive_end, pause_start, pause_end) {
        return naive_end;
    }

    if t < pause_start {
        let consumed_before = (pause_start - t).num_seconds();
        pause_end + Duration::seconds(delta_seconds - consumed_before)
    } else {
        pause_end + Duration::seconds(delta_seconds)
    }
}

/// Push `dt` forward to the next occurrence of `[window.0, window.1)`,
/// rolling to the following day if `dt` is already past `window.1`.
fn snap_to_daytime_window(dt: NaiveDateTime, window: (NaiveTime, NaiveTime)) -> NaiveDateTime {
    let (start, end) = window;
    let t = dt.time();
    if t < start {
        dt.date().and_time(start)
    } else if t >= end {
        (dt.date() + Duration::days(1)).and_time(start)
    } else {
        dt
    }
}

fn intersects(a_start: NaiveDateTime, a_end: NaiveDateTime, b_start: NaiveDateTime, b_end: NaiveDateTime) -> bool {
    a_start.max(b_start) <= a_end.min(b_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinates, ServiceOrderType};
    use chrono::NaiveDate;

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

    fn os(numos: Numos, order_type: ServiceOrderType, service_minutes: u32) -> ServiceOrder {
        ServiceOrder {
            numos,
            order_type,
            location: Coordinates::new(0.0, 0.0),
            requested_at: NaiveDate::from_ymd_opt(2026, 1, 20)
                .unwrap()
                .and_hms_opt(7, 0, 0)
                .unwrap(),
            due_at: None,
            execution_minutes: service_minutes,
            extra_minutes: 0,
            eusd: None,
            service_code: None,
        }
    }

    fn config() -> ScheduleBuilderConfig {
        ScheduleBuilderConfig {
            daytime_codes: [739, 741].into_iter().collect(),
            daytime_window: (NaiveTime::from_hms_opt(8, 0, 0).unwrap(), NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
            overrun_fraction: 0.01,
        }
    }

    fn flat_matrix(n: usize, seconds: u64) -> TravelMatrix {
        let mut durations = vec![vec![seconds; n]; n];
        for i in 0..n {
            durations[i][i] = 0;
        }
        TravelMatrix { durations, size: n }
    }

    #[test]
    fn empty_list_returns_shift_start_as_base_return() {
        let crew = crew();
        let result = build_schedule(&crew, &[], &flat_matrix(2, 0), &config());
        assert!(result.stops.is_empty());
        assert!(!result.truncated);
    }

    #[test]
    fn sequential_stops_advance_cursor() {
        let crew = crew();
        let a = os(1, ServiceOrderType::Technical, 30);
        let b = os(2, ServiceOrderType::Technical, 30);
        let matrix = flat_matrix(4, 600); // 10 min legs
        let result = build_schedule(&crew, &[&a, &b], &matrix, &config());

        assert_eq!(result.stops.len(), 2);
        assert_eq!(result.stops[0].arrival.time(), NaiveTime::from_hms_opt(8, 10, 0).unwrap());
        assert_eq!(result.stops[0].finish.time(), NaiveTime::from_hms_opt(8, 40, 0).unwrap());
        assert_eq!(result.stops[1].arrival.time(), NaiveTime::from_hms_opt(8, 50, 0).unwrap());
        assert!(!result.truncated);
    }

    #[test]
    fn daytime_snap_pushes_early_commercial_arrival_forward() {
        let mut crew = crew();
        crew.shift_start = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let mut commercial = os(1, ServiceOrderType::Commercial, 30);
        commercial.service_code = Some(739);
        let matrix = flat_matrix(3, 300); // 5 min leg, arrival at 06:05
        let result = build_schedule(&crew, &[&commercial], &matrix, &config());

        assert_eq!(result.stops[0].arrival.time(), NaiveTime::from_hms_opt(8, 0, 0).unwrap());
    }

    #[test]
    fn non_daytime_service_code_is_unaffected() {
        let mut crew = crew();
        crew.shift_start = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let mut commercial = os(1, ServiceOrderType::Commercial, 30);
        commercial.service_code = Some(100);
        let matrix = flat_matrix(3, 300);
        let result = build_schedule(&crew, &[&commercial], &matrix, &config());

        assert_eq!(result.stops[0].arrival.time(), NaiveTime::from_hms_opt(6, 5, 0).unwrap());
    }

    #[test]
    fn pause_partially_consumed_when_travel_crosses_into_it() {
        let mut crew = crew();
        crew.pause_start = Some(NaiveTime::from_hms_opt(8, 5, 0).unwrap());
        crew.pause_end = Some(NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        let job = os(1, ServiceOrderType::Technical, 20);
        let matrix = flat_matrix(3, 600); // 10 min leg: 5 min before the pause, 5 min after
        let result = build_schedule(&crew, &[&job], &matrix, &config());

        // consumes 08:00->08:05 before the pause, then the remaining 5 min after 08:30
        assert_eq!(result.stops[0].arrival.time(), NaiveTime::from_hms_opt(8, 35, 0).unwrap());
    }

    #[test]
    fn pause_consumes_whole_delta_when_cursor_already_inside_it() {
        let mut crew = crew();
        crew.shift_start = NaiveTime::from_hms_opt(8, 31, 0).unwrap();
        crew.pause_start = Some(NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        crew.pause_end = Some(NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        let job = os(1, ServiceOrderType::Technical, 20);
        let matrix = flat_matrix(3, 60); // cursor starts inside the pause; 1 min leg
        let result = build_schedule(&crew, &[&job], &matrix, &config());

        assert_eq!(result.stops[0].arrival.time(), NaiveTime::from_hms_opt(9, 1, 0).unwrap());
    }

    #[test]
    fn overrun_beyond_tolerance_truncates_trailing_stops() {
        let mut crew = crew();
        crew.shift_start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        crew.shift_end = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        let job = os(1, ServiceOrderType::Technical, 120);
        let matrix = flat_matrix(3, 0);
        let result = build_schedule(&crew, &[&job], &matrix, &config());

        assert!(result.truncated);
        assert!(result.stops.is_empty());
    }

    #[test]
    fn within_tolerance_is_not_truncated() {
        let mut crew = crew();
        crew.shift_start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        // 60 minute shift; 1% tolerance = 36 extra seconds
        crew.shift_end = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let job = os(1, ServiceOrderType::Technical, 60);
        let matrix = flat_matrix(3, 30); // finishes at 09:00:30, within 36s tolerance
        let result = build_schedule(&crew, &[&job], &matrix, &config());

        assert!(!result.truncated);
        assert_eq!(result.stops.len(), 1);
    }

    #[test]
    fn base_return_uses_return_leg_from_last_stop() {
        let crew = crew();
        let job = os(1, ServiceOrderType::Technical, 30);
        let matrix = flat_matrix(3, 600);
        let result = build_schedule(&crew, &[&job], &matrix, &config());

        // arrival 08:10, finish 08:40, + 10 min return = 08:50
        assert_eq!(result.base_return.time(), NaiveTime::from_hms_opt(8, 50, 0).unwrap());
    }

    #[test]
    fn zero_duration_service_leaves_arrival_and_finish_equal() {
        let crew = crew();
        let mut job = os(1, ServiceOrderType::Technical, 0);
        job.execution_minutes = 0;
        job.extra_minutes = 0;
        let matrix = flat_matrix(3, 0);
        let result = build_schedule(&crew, &[&job], &matrix, &config());

        assert_eq!(result.stops[0].finish, result.stops[0].arrival);
    }
}

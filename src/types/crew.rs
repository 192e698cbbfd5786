//! Crew (posádka) — one workforce unit scheduled for one shift on one day.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::Coordinates;

/// Unique crew identifier (`equipe` / `nome` in the source column dictionary).
pub type CrewId = String;

/// Identity + shift for a single crew on a single day. Immutable for the
/// duration of that day's simulation: one Crew entity per (crew, day).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crew {
    pub id: CrewId,
    pub reference_date: NaiveDate,
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,
    pub pause_start: Option<NaiveTime>,
    pub pause_end: Option<NaiveTime>,
    /// Crew-specific base. Falls back to the engine's configured global base
    /// (`BASE_LON`/`BASE_LAT`) when absent.
    pub base: Option<Coordinates>,
}

impl Crew {
    /// Shift length in seconds. Zero if `shift_end` is not after `shift_start`
    /// (same-day shifts only; no overnight shifts, no DST crossings within a shift).
    pub fn shift_seconds(&self) -> i64 {
        (self.shift_end - self.shift_start).num_seconds().max(0)
    }

    pub fn has_pause(&self) -> bool {
        matches!((self.pause_start, self.pause_end), (Some(a), Some(b)) if b > a)
    }

    /// Resolve the crew's effective base, falling back to `global_base` when
    /// the crew itself carries none.
    pub fn effective_base(&self, global_base: Coordinates) -> Coordinates {
        self.base.unwrap_or(global_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crew(shift_start: &str, shift_end: &str) -> Crew {
        Crew {
            id: "crew-1".to_string(),
            reference_date: NaiveDate::from_ymd_opt(2026, 1, 26).unwrap(),
            shift_start: NaiveTime::parse_from_str(shift_start, "%H:%M").unwrap(),
            shift_end: NaiveTime::parse_from_str(shift_end, "%H:%M").unwrap(),
            pause_start: None,
            pause_end: None,
            base: None,
        }
    }

    #[test]
    fn shift_seconds_standard_day() {
        let c = crew("08:00", "17:00");
        assert_eq!(c.shift_seconds(), 9 * 3600);
    }

    #[test]
    fn has_pause_requires_both_ends_in_order() {
        let mut c = crew("08:00", "17:00");
        assert!(!c.has_pause());
        c.pause_start = Some(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert!(!c.has_pause());
        c.pause_end = Some(NaiveTime::from_hms_opt(11, 0, 0).unwrap());
        assert!(!c.has_pause(), "pause_end before pause_start is not a pause");
        c.pause_end = Some(NaiveTime::from_hms_opt(13, 0, 0).unwrap());
        assert!(c.has_pause());
    }

    #[test]
    fn effective_base_prefers_crew_base() {
        let mut c = crew("08:00", "17:00");
        let global = Coordinates::new(50.0755, 14.4378);
        assert_eq!(c.effective_base(global).lat, global.lat);
        c.base = Some(Coordinates::new(49.0, 16.0));
        assert_eq!(c.effective_base(global).lat, 49.0);
    }
}

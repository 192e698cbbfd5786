//! Service Order (OS) — the unit of work dispatched to a crew.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Coordinates;

/// Unique, numeric OS identifier (`numos` in the source column dictionary).
pub type Numos = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOrderType {
    Technical,
    Commercial,
}

impl ServiceOrderType {
    pub fn is_commercial(&self) -> bool {
        matches!(self, ServiceOrderType::Commercial)
    }
}

/// A single service order. Created by the (out-of-scope) loader, consumed at
/// most once by the engine; if not consumed on day D it remains in the
/// backlog for day D+1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrder {
    pub numos: Numos,
    pub order_type: ServiceOrderType,
    pub location: Coordinates,
    /// `data_sol` — when the OS entered the backlog.
    pub requested_at: NaiveDateTime,
    /// `data_venc` — commercial-only deadline.
    pub due_at: Option<NaiveDateTime>,
    /// `TE` — execution duration in minutes.
    pub execution_minutes: u32,
    /// `TD` — optional extra minutes on top of `execution_minutes`.
    pub extra_minutes: u32,
    /// `EUSD` — externally supplied value proxy.
    pub eusd: Option<f64>,
    /// `codserv` — commercial service code; governs the daytime window rule.
    pub service_code: Option<i32>,
}

impl ServiceOrder {
    /// Total on-site service duration in seconds: `(TE + TD) * 60`.
    pub fn service_seconds(&self) -> i64 {
        (self.execution_minutes as i64 + self.extra_minutes as i64) * 60
    }

    /// The engine stays silent on a due date preceding the request date —
    /// rejection of that case is a load-time (loader) concern, not an engine
    /// one. This is purely descriptive, used by callers who want to log the
    /// anomaly without filtering the OS out.
    pub fn has_inverted_deadline(&self) -> bool {
        self.due_at.is_some_and(|due| due < self.requested_at)
    }

    /// True when this OS is eligible for a crew whose shift starts at
    /// `shift_start`: it must have entered the backlog no later than that
    /// shift start.
    pub fn eligible_for(&self, shift_start: NaiveDateTime) -> bool {
        self.requested_at <= shift_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn base_os() -> ServiceOrder {
        ServiceOrder {
            numos: 1,
            order_type: ServiceOrderType::Technical,
            location: Coordinates::new(50.0, 14.0),
            requested_at: dt("2026-01-26 07:00"),
            due_at: None,
            execution_minutes: 30,
            extra_minutes: 0,
            eusd: None,
            service_code: None,
        }
    }

    #[test]
    fn service_seconds_includes_extra() {
        let mut os = base_os();
        os.extra_minutes = 10;
        assert_eq!(os.service_seconds(), 40 * 60);
    }

    #[test]
    fn eligible_for_uses_shift_start_inclusive() {
        let os = base_os();
        assert!(os.eligible_for(dt("2026-01-26 07:00")));
        assert!(os.eligible_for(dt("2026-01-26 08:00")));
        assert!(!os.eligible_for(dt("2026-01-26 06:59")));
    }

    #[test]
    fn inverted_deadline_detected() {
        let mut os = base_os();
        os.due_at = Some(dt("2026-01-25 07:00"));
        assert!(os.has_inverted_deadline());
        os.due_at = Some(dt("2026-01-27 07:00"));
        assert!(!os.has_inverted_deadline());
    }
}

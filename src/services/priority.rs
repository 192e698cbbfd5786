//! Priority Scorer (C3) — a single, pure scoring function over a Service
//! Order and the day's shift start.

use chrono::NaiveDateTime;

use crate::types::{ServiceOrder, ServiceOrderType};

/// Extra, caller-supplied terms not carried on `ServiceOrder` itself: a base
/// priority weight, an accumulated SLA-violation penalty, and a small
/// wait-time tiebreak term (minutes the OS has already waited this run, e.g.
/// queued behind an earlier round's full crew capacity).
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityContext {
    pub base_priority: f64,
    pub violation_penalty: f64,
    pub wait_minutes: f64,
}

/// Score a Service Order against a shift start. Higher is more urgent. The
/// formula branches on OS type:
///
/// - commercial: `base + 3.0*urgency + 0.5*pending_days + eusd_score - 0.5*violation`
/// - technical:  `base + 2.5*pending_days + eusd_score - 0.5*violation`
/// - unknown:    `base + 1.0*pending_days + 0.8*eusd_score - 0.5*violation`
///
/// plus `0.001 * waiting_time_minutes` in every branch, as a small tie-break term.
pub fn score(os: &ServiceOrder, shift_start: NaiveDateTime, ctx: PriorityContext) -> f64 {
    let eusd_score = os
        .eusd
        .filter(|v| *v > 0.0)
        .map(|v| (1.0 + v).ln())
        .unwrap_or(0.0);

    let pending_days = ((shift_start - os.requested_at).num_seconds() as f64 / 86400.0).max(0.0);

    let base = ctx.base_priority;
    let violation = ctx.violation_penalty;

    let mut total = if os.order_type.is_commercial() {
        let urgency = os
            .due_at
            .map(|due| -((due - shift_start).num_seconds() as f64 / 86400.0))
            .unwrap_or(0.0);
        base + 3.0 * urgency + 0.5 * pending_days + eusd_score - 0.5 * violation
    } else if matches!(os.order_type, ServiceOrderType::Technical) {
        base + 2.5 * pending_days + eusd_score - 0.5 * violation
    } else {
        base + 1.0 * pending_days + 0.8 * eusd_score - 0.5 * violation
    };

    total += 0.001 * ctx.wait_minutes;
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinates;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn os(order_type: ServiceOrderType) -> ServiceOrder {
        ServiceOrder {
            numos: 1,
            order_type,
            location: Coordinates::new(50.0, 14.0),
            requested_at: dt("2026-01-20 07:00"),
            due_at: None,
            execution_minutes: 30,
            extra_minutes: 0,
            eusd: None,
            service_code: None,
        }
    }

    #[test]
    fn eusd_score_is_zero_when_absent_or_nonpositive() {
        let mut o = os(ServiceOrderType::Technical);
        o.eusd = None;
        let shift = dt("2026-01-26 08:00");
        let s1 = score(&o, shift, PriorityContext::default());
        o.eusd = Some(0.0);
        let s2 = score(&o, shift, PriorityContext::default());
        assert_eq!(s1, s2);
    }

    #[test]
    fn commercial_urgency_dominates_for_near_deadlines() {
        let shift = dt("2026-01-26 08:00");
        let mut near = os(ServiceOrderType::Commercial);
        near.due_at = Some(dt("2026-01-26 09:00"));
        let mut far = os(ServiceOrderType::Commercial);
        far.due_at = Some(dt("2026-02-26 09:00"));

        let s_near = score(&near, shift, PriorityContext::default());
        let s_far = score(&far, shift, PriorityContext::default());
        assert!(s_near > s_far);
    }

    #[test]
    fn technical_uses_two_point_five_weight_on_pending_days() {
        let shift = dt("2026-01-30 08:00");
        let o = os(ServiceOrderType::Technical);
        let pending_days = (shift - o.requested_at).num_seconds() as f64 / 86400.0;
        let s = score(&o, shift, PriorityContext::default());
        assert!((s - 2.5 * pending_days).abs() < 1e-9);
    }

    #[test]
    fn wait_minutes_adds_small_tiebreak() {
        let shift = dt("2026-01-26 08:00");
        let o = os(ServiceOrderType::Technical);
        let base = score(&o, shift, PriorityContext::default());
        let waited = score(
            &o,
            shift,
            PriorityContext {
                wait_minutes: 1000.0,
                ..Default::default()
            },
        );
        assert!((waited - base - 1.0).abs() < 1e-9);
    }

    #[test]
    fn violation_penalty_reduces_score() {
        let shift = dt("2026-01-26 08:00");
        let o = os(ServiceOrderType::Commercial);
        let clean = score(&o, shift, PriorityContext::default());
        let violated = score(
            &o,
            shift,
            PriorityContext {
                violation_penalty: 2.0,
                ..Default::default()
            },
        );
        assert!(violated < clean);
    }
}

//! In-process demonstration fixture for the `Simulate` CLI command (§A.4).
//! Not a loader: the real parquet-backed loaders are out-of-scope external
//! collaborators (§1). This only exists so the crate is runnable end to end
//! without them, seeded with the kind of day §8's scenario 1 describes.

use chrono::{NaiveDate, NaiveDateTime};

use crate::defaults::{default_work_end, default_work_start};
use crate::types::{Coordinates, Crew, ServiceOrder, ServiceOrderType};

pub fn sample_crews(day: NaiveDate) -> Vec<Crew> {
    vec![
        Crew {
            id: "E1".to_string(),
            reference_date: day,
            shift_start: default_work_start(),
            shift_end: default_work_end(),
            pause_start: None,
            pause_end: None,
            base: None,
        },
        Crew {
            id: "E2".to_string(),
            reference_date: day,
            shift_start: default_work_start(),
            shift_end: default_work_end(),
            pause_start: chrono::NaiveTime::from_hms_opt(12, 0, 0),
            pause_end: chrono::NaiveTime::from_hms_opt(12, 30, 0),
            base: Some(Coordinates::new(50.0755, 14.4378)),
        },
    ]
}

pub fn sample_backlog(day: NaiveDate) -> Vec<ServiceOrder> {
    let requested_at = |hour: u32| -> NaiveDateTime { day.and_hms_opt(hour, 0, 0).unwrap() };

    vec![
        ServiceOrder {
            numos: 1001,
            order_type: ServiceOrderType::Technical,
            location: Coordinates::new(50.0855, 14.4478),
            requested_at: requested_at(7),
            due_at: None,
            execution_minutes: 30,
            extra_minutes: 0,
            eusd: None,
            service_code: None,
        },
        ServiceOrder {
            numos: 1002,
            order_type: ServiceOrderType::Commercial,
            location: Coordinates::new(50.0955, 14.4578),
            requested_at: requested_at(6),
            due_at: Some(day.and_hms_opt(18, 0, 0).unwrap()),
            execution_minutes: 20,
            extra_minutes: 10,
            eusd: Some(120.0),
            service_code: Some(739),
        },
        ServiceOrder {
            numos: 1003,
            order_type: ServiceOrderType::Technical,
            location: Coordinates::new(50.1055, 14.4678),
            requested_at: requested_at(5),
            due_at: None,
            execution_minutes: 45,
            extra_minutes: 0,
            eusd: None,
            service_code: None,
        },
        ServiceOrder {
            numos: 1004,
            order_type: ServiceOrderType::Commercial,
            location: Coordinates::new(49.1951, 16.6068),
            requested_at: requested_at(7),
            due_at: Some(day.and_hms_opt(9, 0, 0).unwrap()),
            execution_minutes: 25,
            extra_minutes: 0,
            eusd: Some(40.0),
            service_code: None,
        },
    ]
}

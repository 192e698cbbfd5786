//! Core data model: Crew, Service Order, and Assignment.

pub mod assignment;
pub mod coordinates;
pub mod crew;
pub mod service_order;

pub use assignment::*;
pub use coordinates::*;
pub use crew::*;
pub use service_order::*;

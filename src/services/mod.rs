//! Leaf collaborators of the dispatch engine: the Priority Scorer (C3), the
//! Candidate Selector (C4), the Schedule Builder (C5), the Travel Oracle
//! (C1), and the Route Optimizer Client (C2). `geo` is the shared
//! Haversine helper the great-circle tier builds on.

pub mod candidate_selector;
pub mod geo;
pub mod priority;
pub mod route_optimizer;
pub mod schedule_builder;
pub mod travel_oracle;

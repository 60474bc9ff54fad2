pub mod overlap;
pub mod planner;

pub use overlap::{check_overlap, clamp_int, next_free_address, OverlapRange, PlacementRange};
pub use planner::{AddressPlanner, NamedOverlap, PlannerLayout, PlannerWarning};

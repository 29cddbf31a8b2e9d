pub mod auto;
pub mod manual;
pub mod ordering;
pub mod rounds;
pub mod timeline;
pub mod types;

pub use auto::{apply_schedule, auto_schedule_matches};
pub use manual::{schedule_match, ManualSlot};
pub use ordering::{apply_ordering, calculate_match_order};
pub use types::{AutoScheduleOutcome, OrderedMatch, OrderingOutcome, PlanningWindow, SchedulerOptions};

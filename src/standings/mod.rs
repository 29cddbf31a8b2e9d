pub mod advancement;
pub mod aggregation;
pub mod ranking;
pub mod recalculation;

pub use advancement::{qualifiers, Qualifier};
pub use aggregation::{compute_roster_standings, compute_standings};
pub use ranking::rank_standings;
pub use recalculation::{group_standings, recalculate, Recalculation};

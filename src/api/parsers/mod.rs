pub mod games;
pub mod snapshot;

pub use games::normalize_games;
pub use snapshot::{parse_snapshot, parse_snapshot_str};

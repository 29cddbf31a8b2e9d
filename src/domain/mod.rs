pub mod models;
mod snapshot;
pub mod time;
pub mod validation;

pub use models::*;
pub use validation::validate_snapshot;

pub mod settings;

pub use settings::{AppConfig, SchedulingSettings, StandingsSettings, StorageSettings};

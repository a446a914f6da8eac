//! HTTP API handlers for dugout-ra

pub mod differential;
pub mod health;
pub mod ingest;
pub mod reset;
pub mod trend;

pub use differential::{get_batting_differential, get_pitching_differential};
pub use health::health_routes;
pub use ingest::{ingest_batting, ingest_pitching};
pub use reset::reset_records;
pub use trend::get_metric_trend;

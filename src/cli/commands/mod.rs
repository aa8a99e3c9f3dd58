//! CLI command implementations

mod config_gen;
mod maintenance;
mod retention;
mod stats;

pub use config_gen::generate_config;
pub use maintenance::{publish_due, record_event, run_cleanup};
pub use retention::{set_retention, show_retention};
pub use stats::show_stats;

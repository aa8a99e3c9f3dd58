//! Event analytics
//!
//! - `snapshot`: nested per-CTA / per-page rollup types
//! - `engine`: [`AggregationEngine`], building snapshots from an `EventStore`
//! - `dashboard`: highlights derived from a snapshot

pub mod dashboard;
mod engine;
mod snapshot;

pub use dashboard::{CtaHighlight, CtaRate, DashboardStats, TopPage};
pub use engine::{AggregationEngine, EventInput};
pub use snapshot::{CtaRollup, PageRollup, Snapshot};

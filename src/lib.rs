//! ctapulse - CTA lifecycle, analytics retention and event rollups
//!
//! # Architecture
//! - `lifecycle`: status transitions, effective phase, slugs
//! - `services`: [`services::CtaService`], the CTA operations over a store
//! - `retention`: retention categories, grace periods, reporting clamps
//! - `analytics`: snapshot and dashboard aggregation over recorded events
//! - `cleanup`: the scheduled job deleting expired events and old trash
//! - `storage`: store traits, SeaORM and in-memory backends
//! - `config` / `system`: static configuration and logging setup
//! - `cli`: command-line entry points for schedulers and operators

pub mod analytics;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod retention;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;

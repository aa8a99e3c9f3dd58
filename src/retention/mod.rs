//! Analytics retention
//!
//! - `settings`: the stored retention choice and its grace period
//! - `policy`: pure rules (narrowing detection, cleanup days, report clamping)
//! - `manager`: atomic updates against a [`SettingsStore`](crate::storage::SettingsStore)

mod manager;
pub mod policy;
mod settings;

pub use manager::RetentionPolicyManager;
pub use policy::{
    DEFAULT_REPORTING_DAYS, apply_retention_change, effective_cleanup_days,
    effective_reporting_range, expire_grace, retention_floor,
};
pub use settings::{
    AnalyticsSettings, FALLBACK_RETENTION_DAYS, RawAnalyticsSettings, RetentionCategory,
    RetentionGrace, RetentionTier,
};

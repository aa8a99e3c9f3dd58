use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::policy;
use super::settings::{AnalyticsSettings, RetentionCategory, RetentionTier};
use crate::errors::{CtaError, Result};
use crate::storage::SettingsStore;
use crate::utils::TimeWindow;

/// Owns the stored retention setting
///
/// Changes go through a single atomic read-modify-write on the settings
/// store, so two concurrent narrowings cannot lose a widened baseline.
pub struct RetentionPolicyManager {
    store: Arc<dyn SettingsStore>,
    tier: RetentionTier,
}

impl RetentionPolicyManager {
    pub fn new(store: Arc<dyn SettingsStore>, tier: RetentionTier) -> Self {
        Self { store, tier }
    }

    pub fn tier(&self) -> RetentionTier {
        self.tier
    }

    pub async fn current(&self) -> Result<AnalyticsSettings> {
        self.store.load_analytics().await
    }

    /// Persist a new retention choice, deriving the grace period
    ///
    /// Categories the tier does not allow are rejected here; the stored value
    /// is still normalized on read if one slips in some other way.
    pub async fn change_retention(
        &self,
        requested: AnalyticsSettings,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsSettings> {
        if !self.tier.allows(requested.retention) {
            return Err(CtaError::validation(format!(
                "Retention '{}' is not available for the {} tier",
                requested.retention, self.tier
            )));
        }
        if requested.retention == RetentionCategory::Custom
            && !requested.retention_custom_days.is_some_and(|d| d > 0)
        {
            return Err(CtaError::validation(
                "Custom retention needs a positive number of days",
            ));
        }

        let updated = self
            .store
            .modify_analytics(&|current: &AnalyticsSettings| {
                policy::apply_retention_change(current, &requested, now)
            })
            .await?;

        match updated.grace {
            Some(grace) => info!(
                "Retention changed to {} days, keeping {} days until {}",
                updated.configured_days(),
                grace.previous_days,
                grace.grace_until
            ),
            None => info!("Retention changed to {}", updated.retention),
        }
        Ok(updated)
    }

    /// Clear a finished grace period. Returns the settings now in effect.
    pub async fn expire_grace(&self, now: DateTime<Utc>) -> Result<AnalyticsSettings> {
        let current = self.store.load_analytics().await?;
        if current.grace.is_none() || current.is_mid_grace(now) {
            return Ok(current);
        }

        let updated = self
            .store
            .modify_analytics(&|settings: &AnalyticsSettings| policy::expire_grace(settings, now))
            .await?;
        debug!("Retention grace period ended at {}", now);
        Ok(updated)
    }

    pub fn effective_cleanup_days(&self, settings: &AnalyticsSettings) -> u32 {
        policy::effective_cleanup_days(settings, self.tier)
    }

    pub fn effective_reporting_range(
        &self,
        settings: &AnalyticsSettings,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> TimeWindow {
        policy::effective_reporting_range(settings, self.tier, start, end, now)
    }
}

//! Store seams
//!
//! Engines receive these as `Arc<dyn …>` constructor arguments, so the SeaORM
//! backend and the in-memory backend are interchangeable.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::models::{Cta, CtaEventCount, DailyCount, EventType, NewEvent, PageEventCount};
use crate::errors::Result;
use crate::retention::AnalyticsSettings;
use crate::utils::TimeWindow;

/// 对分析设置的读-改-写回调
pub type SettingsUpdate<'a> = &'a (dyn Fn(&AnalyticsSettings) -> AnalyticsSettings + Send + Sync);

#[async_trait]
pub trait CtaStore: Send + Sync {
    /// Insert a new CTA and return its id. `cta.id` is ignored.
    async fn insert_cta(&self, cta: &Cta) -> Result<i64>;

    async fn get_cta(&self, id: i64) -> Result<Option<Cta>>;

    /// Overwrite an existing CTA. Returns `false` when the id is unknown.
    async fn save_cta(&self, cta: &Cta) -> Result<bool>;

    /// Hard delete. Returns `false` when the id is unknown.
    async fn delete_cta(&self, id: i64) -> Result<bool>;

    /// Slugs equal to `base` or of the form `base-…`, optionally skipping one id
    async fn slugs_with_base(&self, base: &str, exclude_id: Option<i64>) -> Result<Vec<String>>;

    /// Scheduled CTAs whose start date is on or before `today`
    async fn scheduled_due(&self, today: NaiveDate) -> Result<Vec<Cta>>;

    /// Permanently delete trashed CTAs with `trashed_at < cutoff`
    async fn purge_trashed_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    /// CTAs that count toward limits: not demo, not in trash
    async fn count_countable(&self) -> Result<u64>;

    /// Titles for the given ids; unknown ids are absent from the map
    async fn titles(&self, ids: &[i64]) -> Result<HashMap<i64, String>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn record_event(&self, event: &NewEvent) -> Result<i64>;

    /// Delete events with `occurred_at < cutoff`
    async fn delete_events_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    /// Delete events with `from <= occurred_at < until`
    async fn delete_events_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<u64>;

    // 以下查询的窗口均为闭区间 [start, end]

    async fn count_events(&self, event_type: EventType, window: TimeWindow) -> Result<u64>;

    async fn last_event_at(
        &self,
        event_type: EventType,
        window: TimeWindow,
    ) -> Result<Option<DateTime<Utc>>>;

    /// Per UTC calendar day, ascending
    async fn daily_counts(&self, event_type: EventType, window: TimeWindow)
    -> Result<Vec<DailyCount>>;

    async fn counts_by_cta(&self, window: TimeWindow) -> Result<Vec<CtaEventCount>>;

    /// Only events that carry a page
    async fn counts_by_page(&self, window: TimeWindow) -> Result<Vec<PageEventCount>>;

    /// Distinct non-null visitor ids
    async fn distinct_visitors(&self, event_type: EventType, window: TimeWindow) -> Result<u64>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Stored analytics settings, or defaults when none were saved yet
    async fn load_analytics(&self) -> Result<AnalyticsSettings>;

    /// Atomically read, transform and write the analytics settings
    ///
    /// Concurrent writers must not interleave between the read and the write.
    /// A backend that detects a lost race returns
    /// [`CtaError::SettingsConflict`](crate::errors::CtaError::SettingsConflict).
    async fn modify_analytics(&self, update: SettingsUpdate<'_>) -> Result<AnalyticsSettings>;
}

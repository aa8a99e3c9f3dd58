//! Event aggregation engine
//!
//! 五个聚合各自独立查询同一时间窗口，再在内存里拼成嵌套结构。

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use super::dashboard::{self, DashboardStats};
use super::snapshot::{CtaRollup, PageRollup, Snapshot};
use crate::errors::Result;
use crate::retention::{AnalyticsSettings, RetentionTier, effective_reporting_range};
use crate::storage::models::{EventType, NewEvent};
use crate::storage::{CtaStore, EventStore};
use crate::utils::{TimeWindow, parse_datetime_lenient};

/// Raw event as reported by a page
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventInput {
    pub cta_id: i64,
    pub event_type: String,
    /// RFC3339; missing or malformed means "now"
    pub occurred_at: Option<String>,
    pub page_url: Option<String>,
    pub page_title: Option<String>,
    pub visitor_id: Option<i64>,
}

impl EventInput {
    pub fn into_new_event(self, now: DateTime<Utc>) -> NewEvent {
        let occurred_at = self
            .occurred_at
            .as_deref()
            .and_then(parse_datetime_lenient)
            .unwrap_or(now);

        let mut event = NewEvent::new(self.cta_id, EventType::normalize(&self.event_type), occurred_at);
        if let Some(url) = self.page_url.as_deref() {
            event = event.with_page(url, self.page_title.as_deref());
        }
        if let Some(visitor) = self.visitor_id {
            event = event.with_visitor(visitor);
        }
        event
    }
}

fn rollup_entry<'a>(
    ctas: &'a mut BTreeMap<i64, CtaRollup>,
    titles: &HashMap<i64, String>,
    cta_id: i64,
) -> &'a mut CtaRollup {
    ctas.entry(cta_id).or_insert_with(|| CtaRollup {
        title: titles.get(&cta_id).cloned().unwrap_or_default(),
        ..CtaRollup::default()
    })
}

pub struct AggregationEngine {
    events: Arc<dyn EventStore>,
    ctas: Arc<dyn CtaStore>,
    tier: RetentionTier,
}

impl AggregationEngine {
    pub fn new(events: Arc<dyn EventStore>, ctas: Arc<dyn CtaStore>, tier: RetentionTier) -> Self {
        Self { events, ctas, tier }
    }

    pub async fn record(&self, event: &NewEvent) -> Result<i64> {
        self.events.record_event(event).await
    }

    /// Normalize an externally reported event and record it
    pub async fn record_input(&self, input: EventInput, now: DateTime<Utc>) -> Result<i64> {
        let event = input.into_new_event(now);
        self.record(&event).await
    }

    /// Roll up the events in `[start, end]` (no retention clamping)
    pub async fn build_snapshot(&self, window: TimeWindow) -> Result<Snapshot> {
        debug!(
            "Analytics: build_snapshot from {} to {}",
            window.start, window.end
        );

        let total_clicks = self.events.count_events(EventType::Click, window).await?;
        let last_click = self.events.last_event_at(EventType::Click, window).await?;
        let clicks_by_date = self
            .events
            .daily_counts(EventType::Click, window)
            .await?
            .into_iter()
            .map(|d| (d.date, d.count))
            .collect();

        let by_cta = self.events.counts_by_cta(window).await?;
        let by_page = self.events.counts_by_page(window).await?;

        let ids: Vec<i64> = by_cta
            .iter()
            .map(|r| r.cta_id)
            .chain(by_page.iter().map(|r| r.cta_id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let titles = self.ctas.titles(&ids).await?;

        let mut snapshot = Snapshot {
            total_clicks,
            last_click,
            clicks_by_date,
            ..Snapshot::default()
        };

        for row in by_cta {
            match row.event_type {
                EventType::Click => {
                    rollup_entry(&mut snapshot.ctas, &titles, row.cta_id).clicks += row.count
                }
                EventType::Impression => {
                    rollup_entry(&mut snapshot.ctas, &titles, row.cta_id).impressions += row.count
                }
                _ => {}
            }
        }

        for row in by_page {
            if !matches!(row.event_type, EventType::Click | EventType::Impression) {
                continue;
            }
            let page = rollup_entry(&mut snapshot.ctas, &titles, row.cta_id)
                .pages
                .entry(row.page_url_hash)
                .or_insert_with(|| PageRollup {
                    url: row.page_url.clone(),
                    ..PageRollup::default()
                });
            if page.title.is_empty()
                && let Some(title) = row.page_title
            {
                page.title = title;
            }
            match row.event_type {
                EventType::Click => page.clicks += row.count,
                _ => page.impressions += row.count,
            }
        }

        Ok(snapshot)
    }

    /// Snapshot over a window clamped to what retention still keeps
    pub async fn build_reporting_snapshot(
        &self,
        settings: &AnalyticsSettings,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Snapshot> {
        let window = effective_reporting_range(settings, self.tier, start, end, now);
        self.build_snapshot(window).await
    }

    /// Dashboard numbers: a 7 day snapshot plus 14/30 day totals and highlights
    pub async fn build_dashboard_stats(
        &self,
        settings: &AnalyticsSettings,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats> {
        let window_for = |days: i64| {
            effective_reporting_range(
                settings,
                self.tier,
                Some(now - Duration::days(days)),
                Some(now),
                now,
            )
        };
        let week = window_for(7);
        let fortnight = window_for(14);
        let month = window_for(30);

        let snapshot = self.build_snapshot(week).await?;

        let clicks_14d = self.events.count_events(EventType::Click, fortnight).await?;
        let impressions_14d = self
            .events
            .count_events(EventType::Impression, fortnight)
            .await?;
        let clicks_30d = self.events.count_events(EventType::Click, month).await?;
        let impressions_30d = self
            .events
            .count_events(EventType::Impression, month)
            .await?;

        let unique_impression_visitors = self
            .events
            .distinct_visitors(EventType::Impression, week)
            .await?;
        let unique_click_visitors = self
            .events
            .distinct_visitors(EventType::Click, week)
            .await?;

        let stats = DashboardStats {
            window_start: week.start,
            window_end: week.end,
            clicks_7d: snapshot.total_clicks,
            impressions_7d: snapshot.total_impressions(),
            click_through_rate_7d: dashboard::rate(
                snapshot.total_clicks,
                snapshot.total_impressions(),
            ),
            clicks_14d,
            impressions_14d,
            clicks_30d,
            impressions_30d,
            top_page: dashboard::top_page(&snapshot),
            most_impressed: dashboard::most_impressed(&snapshot),
            most_clicked: dashboard::most_clicked(&snapshot),
            best_ctr: dashboard::best_ctr(&snapshot),
            unique_impression_visitors,
            unique_click_visitors,
            snapshot,
        };

        info!(
            "Analytics: dashboard for {} .. {}: {} clicks / {} impressions",
            stats.window_start, stats.window_end, stats.clicks_7d, stats.impressions_7d
        );
        Ok(stats)
    }
}

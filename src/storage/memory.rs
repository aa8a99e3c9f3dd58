//! In-process storage backend
//!
//! Keeps everything behind `parking_lot` locks. Used by tests and by
//! embedders that do not need persistence. Semantics match the SeaORM backend,
//! including slug/uuid uniqueness.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};

use super::models::{
    Cta, CtaEventCount, CtaStatus, DailyCount, Event, EventType, NewEvent, PageEventCount,
};
use super::traits::{CtaStore, EventStore, SettingsStore, SettingsUpdate};
use crate::errors::{CtaError, Result};
use crate::retention::AnalyticsSettings;
use crate::utils::TimeWindow;

#[derive(Default)]
struct CtaTable {
    rows: BTreeMap<i64, Cta>,
    next_id: i64,
}

#[derive(Default)]
struct EventTable {
    rows: Vec<Event>,
    next_id: i64,
}

#[derive(Default)]
pub struct MemoryStorage {
    ctas: RwLock<CtaTable>,
    events: RwLock<EventTable>,
    settings: Mutex<AnalyticsSettings>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有事件（按写入顺序），测试用
    pub fn events(&self) -> Vec<Event> {
        self.events.read().rows.clone()
    }

    fn events_matching<'a>(
        rows: &'a [Event],
        event_type: Option<EventType>,
        window: TimeWindow,
    ) -> impl Iterator<Item = &'a Event> + 'a {
        rows.iter().filter(move |e| {
            window.contains(e.occurred_at) && event_type.is_none_or(|t| e.event_type == t)
        })
    }
}

fn check_unique(table: &CtaTable, cta: &Cta, self_id: Option<i64>) -> Result<()> {
    for (id, existing) in &table.rows {
        if Some(*id) == self_id {
            continue;
        }
        if existing.slug == cta.slug {
            return Err(CtaError::database_operation(format!(
                "UNIQUE constraint failed: ctas.slug ({})",
                cta.slug
            )));
        }
        if existing.uuid == cta.uuid {
            return Err(CtaError::database_operation(format!(
                "UNIQUE constraint failed: ctas.uuid ({})",
                cta.uuid
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl CtaStore for MemoryStorage {
    async fn insert_cta(&self, cta: &Cta) -> Result<i64> {
        let mut table = self.ctas.write();
        check_unique(&table, cta, None)?;

        table.next_id += 1;
        let id = table.next_id;
        let mut row = cta.clone();
        row.id = id;
        table.rows.insert(id, row);
        Ok(id)
    }

    async fn get_cta(&self, id: i64) -> Result<Option<Cta>> {
        Ok(self.ctas.read().rows.get(&id).cloned())
    }

    async fn save_cta(&self, cta: &Cta) -> Result<bool> {
        let mut table = self.ctas.write();
        if !table.rows.contains_key(&cta.id) {
            return Ok(false);
        }
        check_unique(&table, cta, Some(cta.id))?;
        table.rows.insert(cta.id, cta.clone());
        Ok(true)
    }

    async fn delete_cta(&self, id: i64) -> Result<bool> {
        Ok(self.ctas.write().rows.remove(&id).is_some())
    }

    async fn slugs_with_base(&self, base: &str, exclude_id: Option<i64>) -> Result<Vec<String>> {
        let prefix = format!("{}-", base);
        Ok(self
            .ctas
            .read()
            .rows
            .values()
            .filter(|c| Some(c.id) != exclude_id)
            .filter(|c| c.slug == base || c.slug.starts_with(&prefix))
            .map(|c| c.slug.clone())
            .collect())
    }

    async fn scheduled_due(&self, today: NaiveDate) -> Result<Vec<Cta>> {
        Ok(self
            .ctas
            .read()
            .rows
            .values()
            .filter(|c| c.status == CtaStatus::Scheduled)
            .filter(|c| c.schedule_start.is_some_and(|start| start <= today))
            .cloned()
            .collect())
    }

    async fn purge_trashed_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut table = self.ctas.write();
        let before = table.rows.len();
        table.rows.retain(|_, c| {
            !(c.status == CtaStatus::Trash && c.trashed_at.is_some_and(|at| at < cutoff))
        });
        Ok((before - table.rows.len()) as u64)
    }

    async fn count_countable(&self) -> Result<u64> {
        Ok(self
            .ctas
            .read()
            .rows
            .values()
            .filter(|c| !c.is_demo && c.status != CtaStatus::Trash)
            .count() as u64)
    }

    async fn titles(&self, ids: &[i64]) -> Result<HashMap<i64, String>> {
        let table = self.ctas.read();
        Ok(ids
            .iter()
            .filter_map(|id| table.rows.get(id).map(|c| (*id, c.title.clone())))
            .collect())
    }
}

#[async_trait]
impl EventStore for MemoryStorage {
    async fn record_event(&self, event: &NewEvent) -> Result<i64> {
        let mut table = self.events.write();
        table.next_id += 1;
        let id = table.next_id;
        table.rows.push(Event {
            id,
            cta_id: event.cta_id,
            event_type: event.event_type,
            occurred_at: event.occurred_at,
            page_url: event.page_url.clone(),
            page_url_hash: event.page_url_hash.clone(),
            page_title: event.page_title.clone(),
            visitor_id: event.visitor_id,
        });
        Ok(id)
    }

    async fn delete_events_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut table = self.events.write();
        let before = table.rows.len();
        table.rows.retain(|e| e.occurred_at >= cutoff);
        Ok((before - table.rows.len()) as u64)
    }

    async fn delete_events_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<u64> {
        let mut table = self.events.write();
        let before = table.rows.len();
        table
            .rows
            .retain(|e| !(e.occurred_at >= from && e.occurred_at < until));
        Ok((before - table.rows.len()) as u64)
    }

    async fn count_events(&self, event_type: EventType, window: TimeWindow) -> Result<u64> {
        let table = self.events.read();
        Ok(Self::events_matching(&table.rows, Some(event_type), window).count() as u64)
    }

    async fn last_event_at(
        &self,
        event_type: EventType,
        window: TimeWindow,
    ) -> Result<Option<DateTime<Utc>>> {
        let table = self.events.read();
        Ok(Self::events_matching(&table.rows, Some(event_type), window)
            .map(|e| e.occurred_at)
            .max())
    }

    async fn daily_counts(
        &self,
        event_type: EventType,
        window: TimeWindow,
    ) -> Result<Vec<DailyCount>> {
        let table = self.events.read();
        let mut by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for event in Self::events_matching(&table.rows, Some(event_type), window) {
            *by_day.entry(event.occurred_at.date_naive()).or_default() += 1;
        }
        Ok(by_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect())
    }

    async fn counts_by_cta(&self, window: TimeWindow) -> Result<Vec<CtaEventCount>> {
        let table = self.events.read();
        let mut groups: BTreeMap<(i64, EventType), u64> = BTreeMap::new();
        for event in Self::events_matching(&table.rows, None, window) {
            *groups.entry((event.cta_id, event.event_type)).or_default() += 1;
        }
        Ok(groups
            .into_iter()
            .map(|((cta_id, event_type), count)| CtaEventCount {
                cta_id,
                event_type,
                count,
            })
            .collect())
    }

    async fn counts_by_page(&self, window: TimeWindow) -> Result<Vec<PageEventCount>> {
        let table = self.events.read();
        let mut groups: BTreeMap<(i64, String, EventType), PageEventCount> = BTreeMap::new();
        for event in Self::events_matching(&table.rows, None, window) {
            let (Some(hash), Some(url)) = (&event.page_url_hash, &event.page_url) else {
                continue;
            };
            let row = groups
                .entry((event.cta_id, hash.clone(), event.event_type))
                .or_insert_with(|| PageEventCount {
                    cta_id: event.cta_id,
                    page_url_hash: hash.clone(),
                    page_url: url.clone(),
                    page_title: None,
                    event_type: event.event_type,
                    count: 0,
                });
            // 与 SQL 后端一致：MIN(page_url)、MAX(page_title)
            if *url < row.page_url {
                row.page_url = url.clone();
            }
            if event.page_title > row.page_title {
                row.page_title = event.page_title.clone();
            }
            row.count += 1;
        }
        Ok(groups.into_values().collect())
    }

    async fn distinct_visitors(&self, event_type: EventType, window: TimeWindow) -> Result<u64> {
        let table = self.events.read();
        let visitors: HashSet<i64> = Self::events_matching(&table.rows, Some(event_type), window)
            .filter_map(|e| e.visitor_id)
            .collect();
        Ok(visitors.len() as u64)
    }
}

#[async_trait]
impl SettingsStore for MemoryStorage {
    async fn load_analytics(&self) -> Result<AnalyticsSettings> {
        Ok(*self.settings.lock())
    }

    async fn modify_analytics(&self, update: SettingsUpdate<'_>) -> Result<AnalyticsSettings> {
        let mut guard = self.settings.lock();
        let next = update(&*guard);
        *guard = next;
        Ok(next)
    }
}

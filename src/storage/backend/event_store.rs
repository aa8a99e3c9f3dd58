//! EventStore for SeaOrmStorage
//!
//! 删除按批进行（先查 id 再 `IN` 删除），避免长事务锁表。

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};
use tracing::{debug, warn};

use super::SeaOrmStorage;
use super::converters::new_event_to_active_model;
use crate::errors::Result;
use crate::storage::models::{CtaEventCount, DailyCount, EventType, NewEvent, PageEventCount};
use crate::storage::traits::EventStore;
use crate::utils::TimeWindow;
use migration::entities::cta_event;

/// 防止无限循环
const MAX_DELETE_ITERATIONS: u32 = 1000;

// ============ 查询结果类型 ============

#[derive(Debug, FromQueryResult)]
struct DayRow {
    label: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct CtaTypeRow {
    cta_id: i64,
    event_type: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct PageRow {
    cta_id: i64,
    page_url_hash: String,
    event_type: String,
    page_url: Option<String>,
    page_title: Option<String>,
    count: i64,
}

fn in_window(window: TimeWindow) -> Condition {
    Condition::all()
        .add(cta_event::Column::OccurredAt.gte(window.start))
        .add(cta_event::Column::OccurredAt.lte(window.end))
}

fn of_type(event_type: EventType) -> Condition {
    Condition::all().add(cta_event::Column::EventType.eq(event_type.as_ref()))
}

impl SeaOrmStorage {
    /// 分批删除满足条件的事件
    async fn delete_events_matching(&self, condition: Condition, label: &str) -> Result<u64> {
        let mut total_deleted = 0u64;
        let mut iterations = 0;

        loop {
            if iterations >= MAX_DELETE_ITERATIONS {
                warn!(
                    "Event cleanup ({}) reached max iterations {} (deleted {} rows)",
                    label, MAX_DELETE_ITERATIONS, total_deleted
                );
                break;
            }

            let ids: Vec<i64> = cta_event::Entity::find()
                .select_only()
                .column(cta_event::Column::Id)
                .filter(condition.clone())
                .order_by_asc(cta_event::Column::Id)
                .limit(self.cleanup_batch_size)
                .into_tuple()
                .all(&self.db)
                .await?;

            if ids.is_empty() {
                break;
            }

            let deleted = cta_event::Entity::delete_many()
                .filter(cta_event::Column::Id.is_in(ids))
                .exec(&self.db)
                .await?
                .rows_affected;

            total_deleted += deleted;
            iterations += 1;

            debug!(
                "Event cleanup ({}) batch {}: deleted {} rows (total {})",
                label, iterations, deleted, total_deleted
            );

            if deleted < self.cleanup_batch_size {
                break;
            }

            // 短暂暂停，避免对数据库造成过大压力
            tokio::time::sleep(StdDuration::from_millis(50)).await;
        }

        Ok(total_deleted)
    }
}

#[async_trait]
impl EventStore for SeaOrmStorage {
    async fn record_event(&self, event: &NewEvent) -> Result<i64> {
        let model = new_event_to_active_model(event);
        let result = cta_event::Entity::insert(model).exec(&self.db).await?;
        Ok(result.last_insert_id)
    }

    async fn delete_events_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let condition = Condition::all().add(cta_event::Column::OccurredAt.lt(cutoff));
        self.delete_events_matching(condition, "before").await
    }

    async fn delete_events_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<u64> {
        if from >= until {
            return Ok(0);
        }
        let condition = Condition::all()
            .add(cta_event::Column::OccurredAt.gte(from))
            .add(cta_event::Column::OccurredAt.lt(until));
        self.delete_events_matching(condition, "between").await
    }

    async fn count_events(&self, event_type: EventType, window: TimeWindow) -> Result<u64> {
        let count = cta_event::Entity::find()
            .filter(of_type(event_type))
            .filter(in_window(window))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn last_event_at(
        &self,
        event_type: EventType,
        window: TimeWindow,
    ) -> Result<Option<DateTime<Utc>>> {
        let latest = cta_event::Entity::find()
            .filter(of_type(event_type))
            .filter(in_window(window))
            .order_by_desc(cta_event::Column::OccurredAt)
            .one(&self.db)
            .await?;
        Ok(latest.map(|e| e.occurred_at))
    }

    async fn daily_counts(
        &self,
        event_type: EventType,
        window: TimeWindow,
    ) -> Result<Vec<DailyCount>> {
        let day_expr = self.day_expr("occurred_at");
        let rows = cta_event::Entity::find()
            .select_only()
            .column_as(day_expr.clone(), "label")
            .column_as(cta_event::Column::Id.count(), "count")
            .filter(of_type(event_type))
            .filter(in_window(window))
            .group_by(day_expr)
            .order_by_asc(Expr::cust("label"))
            .into_model::<DayRow>()
            .all(&self.db)
            .await?;

        let mut days = Vec::with_capacity(rows.len());
        for row in rows {
            match NaiveDate::parse_from_str(&row.label, "%Y-%m-%d") {
                Ok(date) => days.push(DailyCount {
                    date,
                    count: row.count.max(0) as u64,
                }),
                Err(e) => warn!("Skipping unparseable day label '{}': {}", row.label, e),
            }
        }
        Ok(days)
    }

    async fn counts_by_cta(&self, window: TimeWindow) -> Result<Vec<CtaEventCount>> {
        let rows = cta_event::Entity::find()
            .select_only()
            .column(cta_event::Column::CtaId)
            .column(cta_event::Column::EventType)
            .column_as(cta_event::Column::Id.count(), "count")
            .filter(in_window(window))
            .group_by(cta_event::Column::CtaId)
            .group_by(cta_event::Column::EventType)
            .into_model::<CtaTypeRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| CtaEventCount {
                cta_id: row.cta_id,
                event_type: EventType::normalize(&row.event_type),
                count: row.count.max(0) as u64,
            })
            .collect())
    }

    async fn counts_by_page(&self, window: TimeWindow) -> Result<Vec<PageEventCount>> {
        let rows = cta_event::Entity::find()
            .select_only()
            .column(cta_event::Column::CtaId)
            .column(cta_event::Column::PageUrlHash)
            .column(cta_event::Column::EventType)
            .column_as(cta_event::Column::PageUrl.min(), "page_url")
            .column_as(cta_event::Column::PageTitle.max(), "page_title")
            .column_as(cta_event::Column::Id.count(), "count")
            .filter(in_window(window))
            .filter(cta_event::Column::PageUrlHash.is_not_null())
            .group_by(cta_event::Column::CtaId)
            .group_by(cta_event::Column::PageUrlHash)
            .group_by(cta_event::Column::EventType)
            .into_model::<PageRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| PageEventCount {
                cta_id: row.cta_id,
                page_url_hash: row.page_url_hash,
                page_url: row.page_url.unwrap_or_default(),
                page_title: row.page_title,
                event_type: EventType::normalize(&row.event_type),
                count: row.count.max(0) as u64,
            })
            .collect())
    }

    async fn distinct_visitors(&self, event_type: EventType, window: TimeWindow) -> Result<u64> {
        let count: Option<i64> = cta_event::Entity::find()
            .select_only()
            .column_as(Expr::cust("COUNT(DISTINCT visitor_id)"), "count")
            .filter(of_type(event_type))
            .filter(in_window(window))
            .filter(cta_event::Column::VisitorId.is_not_null())
            .into_tuple()
            .one(&self.db)
            .await?;
        Ok(count.unwrap_or(0).max(0) as u64)
    }
}

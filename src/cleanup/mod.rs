//! 数据清理任务
//!
//! 由外部调度器（cron 等）调用：按保留期删除过期事件，并永久删除
//! 在回收站里放置过久的 CTA。所有删除都是按时间戳的范围删除，
//! 重复或并发执行只会多做几次空操作。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::Result;
use crate::retention::{AnalyticsSettings, RetentionPolicyManager};
use crate::storage::{CtaStore, EventStore};
use crate::utils::days_ago;

/// 清理报告
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// 删除的事件数量
    pub events_deleted: u64,
    /// 永久删除的 CTA 数量
    pub ctas_purged: u64,
    /// 本次运行是否结束了宽限期
    pub grace_expired: bool,
}

pub struct CleanupJob {
    events: Arc<dyn EventStore>,
    ctas: Arc<dyn CtaStore>,
    policy: Arc<RetentionPolicyManager>,
}

impl CleanupJob {
    pub fn new(
        events: Arc<dyn EventStore>,
        ctas: Arc<dyn CtaStore>,
        policy: Arc<RetentionPolicyManager>,
    ) -> Self {
        Self {
            events,
            ctas,
            policy,
        }
    }

    /// Delete events that fall outside the retention window
    ///
    /// While a grace period is active the deletion is split in two:
    /// events recorded since the change are pruned to the new window, while
    /// events from before the change are only deleted when they were already
    /// outside the previous window at the time of the change.
    pub async fn run_event_cleanup(
        &self,
        settings: &AnalyticsSettings,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let days = self.policy.effective_cleanup_days(settings);
        if days == 0 {
            debug!("Event cleanup skipped: retention is unlimited");
            return Ok(0);
        }

        let cutoff = days_ago(now, days);

        let deleted = match settings.grace {
            Some(grace) if grace.previous_days > days => {
                let since_change = if grace.changed_at < cutoff {
                    self.events
                        .delete_events_between(grace.changed_at, cutoff)
                        .await?
                } else {
                    0
                };
                // 旧窗口以变更时刻为锚点，宽限期内不随 now 前移
                let previous_cutoff = days_ago(grace.changed_at, grace.previous_days);
                let outside_previous = self.events.delete_events_before(previous_cutoff).await?;

                debug!(
                    "Event cleanup in grace period ({} -> {} days): {} since change, {} outside previous window",
                    grace.previous_days, days, since_change, outside_previous
                );
                since_change + outside_previous
            }
            _ => self.events.delete_events_before(cutoff).await?,
        };

        info!(
            "Event cleanup removed {} events (retention {} days)",
            deleted, days
        );
        Ok(deleted)
    }

    /// Permanently delete CTAs trashed more than `retention_days` ago
    ///
    /// Demo CTAs never reach the trash, so nothing here filters them.
    pub async fn run_trash_cleanup(&self, retention_days: u32, now: DateTime<Utc>) -> Result<u64> {
        let cutoff = days_ago(now, retention_days);
        let purged = self.ctas.purge_trashed_before(cutoff).await?;
        info!(
            "Trash cleanup purged {} CTAs trashed before {}",
            purged, cutoff
        );
        Ok(purged)
    }

    /// Expire a finished grace period, then run both cleanups
    ///
    /// Storage errors abort the run and are returned to the scheduler.
    pub async fn run_all(
        &self,
        trash_retention_days: u32,
        now: DateTime<Utc>,
    ) -> Result<CleanupReport> {
        let before = self.policy.current().await?;
        let settings = self.policy.expire_grace(now).await?;

        let report = CleanupReport {
            grace_expired: before.grace.is_some() && settings.grace.is_none(),
            events_deleted: self.run_event_cleanup(&settings, now).await?,
            ctas_purged: self.run_trash_cleanup(trash_retention_days, now).await?,
        };

        info!(
            "Data cleanup completed: events {}, trashed CTAs {}{}",
            report.events_deleted,
            report.ctas_purged,
            if report.grace_expired {
                ", grace period ended"
            } else {
                ""
            }
        );
        Ok(report)
    }
}

//! SettingsStore for SeaOrmStorage
//!
//! 分析设置存为 `app_settings` 表中 key = "analytics" 的一行 JSON。
//! 修改在事务中完成：加行锁读取（SQLite 没有行锁，依赖数据库级写锁），
//! 再以 version 做 compare-and-swap 写回。

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
    sea_query::Expr,
};
use tracing::{debug, warn};

use super::SeaOrmStorage;
use crate::errors::{CtaError, Result};
use crate::retention::AnalyticsSettings;
use crate::storage::traits::{SettingsStore, SettingsUpdate};
use migration::entities::app_setting;

pub(crate) const ANALYTICS_SETTINGS_KEY: &str = "analytics";

fn parse_settings(raw: &str) -> AnalyticsSettings {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Stored analytics settings are not valid JSON ({}), using defaults", e);
        AnalyticsSettings::default()
    })
}

#[async_trait]
impl SettingsStore for SeaOrmStorage {
    async fn load_analytics(&self) -> Result<AnalyticsSettings> {
        let row = app_setting::Entity::find_by_id(ANALYTICS_SETTINGS_KEY)
            .one(&self.db)
            .await?;
        Ok(row
            .map(|r| parse_settings(&r.value))
            .unwrap_or_default())
    }

    async fn modify_analytics(&self, update: SettingsUpdate<'_>) -> Result<AnalyticsSettings> {
        let txn = self.db.begin().await?;

        let mut query = app_setting::Entity::find_by_id(ANALYTICS_SETTINGS_KEY);
        if !self.is_sqlite() {
            query = query.lock_exclusive();
        }
        let row = query.one(&txn).await?;

        let current = row
            .as_ref()
            .map(|r| parse_settings(&r.value))
            .unwrap_or_default();
        let next = update(&current);
        let value = serde_json::to_string(&next)?;
        let now = Utc::now();

        match row {
            Some(existing) => {
                let result = app_setting::Entity::update_many()
                    .col_expr(app_setting::Column::Value, Expr::value(value))
                    .col_expr(
                        app_setting::Column::Version,
                        Expr::value(existing.version + 1),
                    )
                    .col_expr(app_setting::Column::UpdatedAt, Expr::value(now))
                    .filter(app_setting::Column::Key.eq(ANALYTICS_SETTINGS_KEY))
                    .filter(app_setting::Column::Version.eq(existing.version))
                    .exec(&txn)
                    .await?;

                if result.rows_affected == 0 {
                    txn.rollback().await?;
                    return Err(CtaError::settings_conflict(format!(
                        "analytics settings changed concurrently (version {})",
                        existing.version
                    )));
                }
                debug!(
                    "Analytics settings updated to version {}",
                    existing.version + 1
                );
            }
            None => {
                let model = app_setting::ActiveModel {
                    key: Set(ANALYTICS_SETTINGS_KEY.to_string()),
                    value: Set(value),
                    version: Set(1),
                    updated_at: Set(now),
                };
                app_setting::Entity::insert(model).exec(&txn).await?;
                debug!("Analytics settings created");
            }
        }

        txn.commit().await?;
        Ok(next)
    }
}

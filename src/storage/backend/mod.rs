//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod cta_store;
mod event_store;
mod settings_store;

use sea_orm::{DatabaseConnection, DbBackend, sea_query::Expr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{CtaError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{cta_to_active_model, model_to_cta, new_event_to_active_model};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(CtaError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
///
/// Implements [`CtaStore`](crate::storage::CtaStore),
/// [`EventStore`](crate::storage::EventStore) and
/// [`SettingsStore`](crate::storage::SettingsStore).
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// 清理事件时每批删除的行数
    cleanup_batch_size: u64,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str, config: &DatabaseConfig) -> Result<Self> {
        if database_url.is_empty() {
            return Err(CtaError::database_config("DATABASE_URL 未设置"));
        }

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url, config).await?
        } else {
            connect_generic(database_url, backend_name, config).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            cleanup_batch_size: 10_000,
        };

        // 运行迁移
        run_migrations(&storage.db).await?;

        info!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn with_cleanup_batch_size(mut self, batch_size: u64) -> Self {
        self.cleanup_batch_size = batch_size.max(1);
        self
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    fn is_sqlite(&self) -> bool {
        self.db.get_database_backend() == DbBackend::Sqlite
    }

    /// 按 UTC 日期分组用的表达式
    fn day_expr(&self, column: &str) -> Expr {
        match self.db.get_database_backend() {
            DbBackend::Sqlite => Expr::cust(format!("strftime('%Y-%m-%d', {})", column)),
            DbBackend::MySql => Expr::cust(format!("DATE_FORMAT({}, '%Y-%m-%d')", column)),
            _ => Expr::cust(format!("TO_CHAR({}, 'YYYY-MM-DD')", column)),
        }
    }
}

//! Persistence
//!
//! Engines depend on the traits in [`traits`]; [`SeaOrmStorage`] and
//! [`MemoryStorage`] implement all three.

use std::sync::Arc;

use crate::config::StaticConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;
pub mod traits;

pub use backend::SeaOrmStorage;
pub use memory::MemoryStorage;
pub use traits::{CtaStore, EventStore, SettingsStore, SettingsUpdate};

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &StaticConfig) -> Result<Arc<SeaOrmStorage>> {
        let database_url = &config.database.database_url;

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;

        let storage = SeaOrmStorage::new(database_url, &backend_type, &config.database)
            .await?
            .with_cleanup_batch_size(config.retention.cleanup_batch_size);
        Ok(Arc::new(storage))
    }
}

//! CtaStore for SeaOrmStorage

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::{cta_to_active_model, model_to_cta};
use crate::errors::Result;
use crate::storage::models::{Cta, CtaStatus};
use crate::storage::traits::CtaStore;
use migration::entities::cta;

#[async_trait]
impl CtaStore for SeaOrmStorage {
    async fn insert_cta(&self, record: &Cta) -> Result<i64> {
        let model = cta_to_active_model(record, true)?;
        let result = cta::Entity::insert(model).exec(&self.db).await?;
        debug!("Inserted CTA {} ({})", result.last_insert_id, record.slug);
        Ok(result.last_insert_id)
    }

    async fn get_cta(&self, id: i64) -> Result<Option<Cta>> {
        let model = cta::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_cta))
    }

    async fn save_cta(&self, record: &Cta) -> Result<bool> {
        let model = cta_to_active_model(record, false)?;
        let result = cta::Entity::update_many()
            .set(model)
            .filter(cta::Column::Id.eq(record.id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_cta(&self, id: i64) -> Result<bool> {
        let result = cta::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn slugs_with_base(&self, base: &str, exclude_id: Option<i64>) -> Result<Vec<String>> {
        let mut query = cta::Entity::find()
            .select_only()
            .column(cta::Column::Slug)
            .filter(
                Condition::any()
                    .add(cta::Column::Slug.eq(base))
                    .add(cta::Column::Slug.starts_with(format!("{}-", base))),
            );
        if let Some(id) = exclude_id {
            query = query.filter(cta::Column::Id.ne(id));
        }

        let slugs: Vec<String> = query.into_tuple().all(&self.db).await?;
        Ok(slugs)
    }

    async fn scheduled_due(&self, today: NaiveDate) -> Result<Vec<Cta>> {
        let models = cta::Entity::find()
            .filter(cta::Column::Status.eq(CtaStatus::Scheduled.as_ref()))
            .filter(cta::Column::ScheduleStart.lte(today))
            .order_by_asc(cta::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_cta).collect())
    }

    async fn purge_trashed_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = cta::Entity::delete_many()
            .filter(cta::Column::Status.eq(CtaStatus::Trash.as_ref()))
            .filter(cta::Column::TrashedAt.lt(cutoff))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn count_countable(&self) -> Result<u64> {
        let count = cta::Entity::find()
            .filter(cta::Column::IsDemo.eq(false))
            .filter(cta::Column::Status.ne(CtaStatus::Trash.as_ref()))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn titles(&self, ids: &[i64]) -> Result<HashMap<i64, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i64, String)> = cta::Entity::find()
            .select_only()
            .column(cta::Column::Id)
            .column(cta::Column::Title)
            .filter(cta::Column::Id.is_in(ids.to_vec()))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().collect())
    }
}

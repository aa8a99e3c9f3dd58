//! CTA entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ctas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub uuid: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    pub name: String,
    /// draft / scheduled / published / archived / trash
    pub status: String,
    /// always / date_range
    pub targeting: String,
    pub cta_type: String,
    /// JSON sections, merged with defaults on read
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text")]
    pub style: String,
    #[sea_orm(column_type = "Text")]
    pub behavior: String,
    pub schedule_start: Option<Date>,
    pub schedule_end: Option<Date>,
    pub is_enabled: bool,
    pub is_demo: bool,
    pub trashed_at: Option<DateTimeUtc>,
    pub published_at: Option<DateTimeUtc>,
    pub first_active_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

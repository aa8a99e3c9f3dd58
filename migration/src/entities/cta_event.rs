//! Append-only CTA analytics event

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "cta_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Not a foreign key: events may outlive their CTA
    pub cta_id: i64,
    pub event_type: String,
    pub occurred_at: DateTimeUtc,
    #[sea_orm(column_type = "Text", nullable)]
    pub page_url: Option<String>,
    /// xxh64 of the normalized page URL (16 hex chars)
    pub page_url_hash: Option<String>,
    pub page_title: Option<String>,
    pub visitor_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

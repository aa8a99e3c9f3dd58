//! CTA 事件表迁移
//!
//! cta_events 是只追加的日志，保存曝光/点击等事件。
//! cta_id 不加外键约束：CTA 被硬删除后事件允许成为孤儿记录。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CtaEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CtaEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CtaEvents::CtaId).big_integer().not_null())
                    .col(
                        ColumnDef::new(CtaEvents::EventType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CtaEvents::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CtaEvents::PageUrl).text().null())
                    .col(ColumnDef::new(CtaEvents::PageUrlHash).string_len(16).null())
                    .col(ColumnDef::new(CtaEvents::PageTitle).string_len(255).null())
                    .col(ColumnDef::new(CtaEvents::VisitorId).big_integer().null())
                    .to_owned(),
            )
            .await?;

        // 时间范围查询与保留期清理
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cta_events_occurred_at")
                    .table(CtaEvents::Table)
                    .col(CtaEvents::OccurredAt)
                    .to_owned(),
            )
            .await?;

        // 按 CTA + 类型分组
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cta_events_cta_type_time")
                    .table(CtaEvents::Table)
                    .col(CtaEvents::CtaId)
                    .col(CtaEvents::EventType)
                    .col(CtaEvents::OccurredAt)
                    .to_owned(),
            )
            .await?;

        // 按页面分组
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cta_events_page_hash")
                    .table(CtaEvents::Table)
                    .col(CtaEvents::PageUrlHash)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_cta_events_page_hash").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_cta_events_cta_type_time").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_cta_events_occurred_at").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CtaEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CtaEvents {
    #[sea_orm(iden = "cta_events")]
    Table,
    Id,
    CtaId,
    EventType,
    OccurredAt,
    PageUrl,
    PageUrlHash,
    PageTitle,
    VisitorId,
}

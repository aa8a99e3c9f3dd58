//! CTA 表迁移
//!
//! 创建 ctas 表，保存推广单元本身：
//! - 身份 (id, uuid, slug)
//! - 生命周期 (status, schedule_start/end, trashed_at, published_at, first_active_at)
//! - 内容/样式/行为（JSON 文本，读取时与默认值合并）

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ctas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ctas::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Ctas::Uuid)
                            .string_len(36)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Ctas::Slug)
                            .string_len(200)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Ctas::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Ctas::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Ctas::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Ctas::Targeting).string_len(20).not_null())
                    .col(ColumnDef::new(Ctas::CtaType).string_len(20).not_null())
                    .col(ColumnDef::new(Ctas::Content).text().not_null())
                    .col(ColumnDef::new(Ctas::Style).text().not_null())
                    .col(ColumnDef::new(Ctas::Behavior).text().not_null())
                    .col(ColumnDef::new(Ctas::ScheduleStart).date().null())
                    .col(ColumnDef::new(Ctas::ScheduleEnd).date().null())
                    .col(
                        ColumnDef::new(Ctas::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Ctas::IsDemo)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Ctas::TrashedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Ctas::PublishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Ctas::FirstActiveAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Ctas::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Ctas::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 回收站清理按 (status, trashed_at) 查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ctas_status_trashed_at")
                    .table(Ctas::Table)
                    .col(Ctas::Status)
                    .col(Ctas::TrashedAt)
                    .to_owned(),
            )
            .await?;

        // 定时发布按 (status, schedule_start) 查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ctas_status_schedule_start")
                    .table(Ctas::Table)
                    .col(Ctas::Status)
                    .col(Ctas::ScheduleStart)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_ctas_status_schedule_start")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_ctas_status_trashed_at").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Ctas::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Ctas {
    #[sea_orm(iden = "ctas")]
    Table,
    Id,
    Uuid,
    Slug,
    Title,
    Name,
    Status,
    Targeting,
    CtaType,
    Content,
    Style,
    Behavior,
    ScheduleStart,
    ScheduleEnd,
    IsEnabled,
    IsDemo,
    TrashedAt,
    PublishedAt,
    FirstActiveAt,
    CreatedAt,
    UpdatedAt,
}

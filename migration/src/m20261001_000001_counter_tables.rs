//! 计数核心表迁移
//!
//! - gac_path_counter: 原始路径 → 浏览量
//! - gac_item_total: 内容条目 → 浏览量汇总
//! - gac_state: 令牌、游标、统计等运行状态

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GacPathCounter::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GacPathCounter::PagepathHash)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GacPathCounter::Pagepath)
                            .string_len(2048)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(GacPathCounter::Pageviews)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // 排行榜查询按 pageviews 倒序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_path_counter_pageviews")
                    .table(GacPathCounter::Table)
                    .col(GacPathCounter::Pageviews)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GacItemTotal::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GacItemTotal::Nid)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GacItemTotal::PageviewTotal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_item_total_pageviews")
                    .table(GacItemTotal::Table)
                    .col(GacItemTotal::PageviewTotal)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GacState::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GacState::Key)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GacState::Value).text().not_null())
                    .col(
                        ColumnDef::new(GacState::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GacState::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GacItemTotal::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GacPathCounter::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum GacPathCounter {
    Table,
    PagepathHash,
    Pagepath,
    Pageviews,
}

#[derive(DeriveIden)]
enum GacItemTotal {
    Table,
    Nid,
    PageviewTotal,
}

#[derive(DeriveIden)]
enum GacState {
    Table,
    Key,
    Value,
    UpdatedAt,
}

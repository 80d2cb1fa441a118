//! 设置、查询缓存与任务队列表

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GacSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GacSettings::Key)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GacSettings::Value).text().not_null())
                    .col(
                        ColumnDef::new(GacSettings::ValueType)
                            .string()
                            .not_null()
                            .default("string"),
                    )
                    .col(
                        ColumnDef::new(GacSettings::IsSensitive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GacSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GacQueryCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GacQueryCache::Cid)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GacQueryCache::Data).text().not_null())
                    .col(
                        ColumnDef::new(GacQueryCache::Expire)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GacQueryCache::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_query_cache_expire")
                    .table(GacQueryCache::Table)
                    .col(GacQueryCache::Expire)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GacQueue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GacQueue::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GacQueue::Payload).text().not_null())
                    .col(
                        ColumnDef::new(GacQueue::Created)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GacQueue::Expire)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // 领取任务时按 (expire, id) 扫描
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_queue_expire_id")
                    .table(GacQueue::Table)
                    .col(GacQueue::Expire)
                    .col(GacQueue::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GacQueue::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GacQueryCache::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GacSettings::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum GacSettings {
    Table,
    Key,
    Value,
    ValueType,
    IsSensitive,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GacQueryCache {
    Table,
    Cid,
    Data,
    Expire,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GacQueue {
    Table,
    Id,
    Payload,
    Created,
    Expire,
}

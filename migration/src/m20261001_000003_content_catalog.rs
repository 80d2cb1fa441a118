//! 内容目录表
//!
//! 宿主站点通过 Admin API 登记内容条目及其路径别名，
//! 汇总时据此计算每个条目的别名集合。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContentItem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentItem::Nid)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContentItem::Bundle).string_len(64).not_null())
                    .col(
                        ColumnDef::new(ContentItem::RevisionId)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContentItem::Title)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ContentItem::Published)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_content_item_published")
                    .table(ContentItem::Table)
                    .col(ContentItem::Published)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContentAlias::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentAlias::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContentAlias::Path).string_len(255).not_null())
                    .col(ColumnDef::new(ContentAlias::Alias).string_len(255).not_null())
                    .col(
                        ColumnDef::new(ContentAlias::Langcode)
                            .string_len(12)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个路径在每种语言下只有一个别名
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_content_alias_path_lang")
                    .table(ContentAlias::Table)
                    .col(ContentAlias::Path)
                    .col(ContentAlias::Langcode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_content_alias_alias")
                    .table(ContentAlias::Table)
                    .col(ContentAlias::Alias)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContentAlias::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContentItem::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ContentItem {
    Table,
    Nid,
    Bundle,
    RevisionId,
    Title,
    Published,
}

#[derive(DeriveIden)]
enum ContentAlias {
    Table,
    Id,
    Path,
    Alias,
    Langcode,
}

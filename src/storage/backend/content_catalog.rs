//! 内容目录的数据库实现（`content_item` / `content_alias`）

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::OnConflict,
};
use tracing::info;

use crate::config::{LanguageConfig, SiteConfig};
use crate::counter::{ContentCatalog, ContentItem, ContentRegistry, PathAlias};
use crate::errors::{CounterError, Result};
use migration::entities::{content_alias, content_item};

#[derive(Clone)]
pub struct SeaOrmContentCatalog {
    db: DatabaseConnection,
    site: SiteConfig,
}

impl SeaOrmContentCatalog {
    pub(super) fn new(db: DatabaseConnection, site: SiteConfig) -> Self {
        Self { db, site }
    }

    /// 批量登记内容条目（按 nid 覆盖）
    pub async fn upsert_items(&self, items: &[ContentItem]) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await.map_err(|e| {
            CounterError::database_operation(format!("Failed to begin transaction: {}", e))
        })?;

        for item in items {
            let model = content_item::ActiveModel {
                nid: Set(item.nid),
                bundle: Set(item.bundle.clone()),
                revision_id: Set(item.revision_id),
                title: Set(item.title.clone()),
                published: Set(item.published),
            };
            content_item::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(content_item::Column::Nid)
                        .update_columns([
                            content_item::Column::Bundle,
                            content_item::Column::RevisionId,
                            content_item::Column::Title,
                            content_item::Column::Published,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(|e| {
                    CounterError::database_operation(format!(
                        "Failed to save content item {}: {}",
                        item.nid, e
                    ))
                })?;
        }

        txn.commit().await.map_err(|e| {
            CounterError::database_operation(format!("Failed to commit transaction: {}", e))
        })?;

        info!("Registered {} content items", items.len());
        Ok(items.len())
    }

    /// 批量登记路径别名（按 path + langcode 覆盖）
    pub async fn upsert_aliases(&self, aliases: &[PathAlias]) -> Result<usize> {
        if aliases.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await.map_err(|e| {
            CounterError::database_operation(format!("Failed to begin transaction: {}", e))
        })?;

        for alias in aliases {
            let model = content_alias::ActiveModel {
                path: Set(alias.path.clone()),
                alias: Set(alias.alias.clone()),
                langcode: Set(alias.langcode.clone()),
                ..Default::default()
            };
            content_alias::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([content_alias::Column::Path, content_alias::Column::Langcode])
                        .update_column(content_alias::Column::Alias)
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(|e| {
                    CounterError::database_operation(format!(
                        "Failed to save alias '{}': {}",
                        alias.alias, e
                    ))
                })?;
        }

        txn.commit().await.map_err(|e| {
            CounterError::database_operation(format!("Failed to commit transaction: {}", e))
        })?;

        info!("Registered {} path aliases", aliases.len());
        Ok(aliases.len())
    }
}

#[async_trait]
impl ContentRegistry for SeaOrmContentCatalog {
    async fn register_items(&self, items: &[ContentItem]) -> Result<usize> {
        self.upsert_items(items).await
    }

    async fn register_aliases(&self, aliases: &[PathAlias]) -> Result<usize> {
        self.upsert_aliases(aliases).await
    }
}

fn to_item(m: content_item::Model) -> ContentItem {
    ContentItem {
        nid: m.nid,
        bundle: m.bundle,
        revision_id: m.revision_id,
        title: m.title,
        published: m.published,
    }
}

#[async_trait]
impl ContentCatalog for SeaOrmContentCatalog {
    fn is_front_page(&self, nid: i64) -> bool {
        self.site.front_page_item == Some(nid)
    }

    fn languages(&self) -> &[LanguageConfig] {
        &self.site.languages
    }

    fn default_language(&self) -> &str {
        &self.site.default_language
    }

    async fn get_item(&self, nid: i64) -> Result<Option<ContentItem>> {
        let row = content_item::Entity::find_by_id(nid)
            .one(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to query item {}: {}", nid, e))
            })?;
        Ok(row.map(to_item))
    }

    async fn published_items(&self) -> Result<Vec<ContentItem>> {
        let rows = content_item::Entity::find()
            .filter(content_item::Column::Published.eq(true))
            .order_by_asc(content_item::Column::Nid)
            .all(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to query items: {}", e))
            })?;
        Ok(rows.into_iter().map(to_item).collect())
    }

    async fn count_published(&self) -> Result<u64> {
        content_item::Entity::find()
            .filter(content_item::Column::Published.eq(true))
            .count(&self.db)
            .await
            .map_err(|e| CounterError::database_operation(format!("Failed to count items: {}", e)))
    }

    async fn alias_for_path(&self, path: &str, langcode: &str) -> Result<Option<String>> {
        let row = content_alias::Entity::find()
            .filter(content_alias::Column::Path.eq(path))
            .filter(content_alias::Column::Langcode.eq(langcode))
            .one(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to query alias: {}", e))
            })?;
        Ok(row.map(|m| m.alias))
    }

    async fn path_for_alias(&self, alias: &str) -> Result<Option<String>> {
        let rows = content_alias::Entity::find()
            .filter(content_alias::Column::Alias.eq(alias))
            .order_by_asc(content_alias::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to query alias: {}", e))
            })?;

        let default_lang = self.site.default_language.as_str();
        let preferred = rows
            .iter()
            .find(|m| m.langcode == default_lang)
            .or_else(|| rows.first());
        Ok(preferred.map(|m| m.path.clone()))
    }
}

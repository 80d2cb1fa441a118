//! 计数镜像字段表 `gac_counter_field`
//!
//! 表在运行时按需创建/删除：至少一个内容类型启用镜像字段时存在，
//! 全部关闭时删除。写入前总是检查表是否存在，不存在视为空操作。

use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityName, EntityTrait, Schema, Set,
    sea_query::OnConflict,
};
use tracing::info;

use super::retry::{self, RetryConfig};
use crate::errors::{CounterError, Result};
use migration::entities::{CounterFieldEntity, counter_field};
use migration::{SchemaManager, Table};

/// 镜像值的定位信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorKey {
    pub entity_id: i64,
    pub revision_id: i64,
    pub bundle: String,
    pub langcode: String,
}

#[derive(Clone)]
pub struct MirrorField {
    db: DatabaseConnection,
    retry_config: RetryConfig,
}

impl MirrorField {
    pub(super) fn new(db: DatabaseConnection, retry_config: RetryConfig) -> Self {
        Self { db, retry_config }
    }

    pub async fn exists(&self) -> Result<bool> {
        SchemaManager::new(&self.db)
            .has_table(CounterFieldEntity.table_name())
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to inspect schema: {}", e))
            })
    }

    /// 创建镜像表，已存在时不做任何事
    pub async fn install(&self) -> Result<()> {
        if self.exists().await? {
            return Ok(());
        }

        let schema = Schema::new(self.db.get_database_backend());
        let mut stmt = schema.create_table_from_entity(CounterFieldEntity);
        stmt.if_not_exists();

        SchemaManager::new(&self.db)
            .create_table(stmt)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!(
                    "Failed to create counter field table: {}",
                    e
                ))
            })?;

        info!("Counter field table created");
        Ok(())
    }

    /// 删除镜像表
    pub async fn uninstall(&self) -> Result<()> {
        if !self.exists().await? {
            return Ok(());
        }

        SchemaManager::new(&self.db)
            .drop_table(
                Table::drop()
                    .table(CounterFieldEntity)
                    .if_exists()
                    .to_owned(),
            )
            .await
            .map_err(|e| {
                CounterError::database_operation(format!(
                    "Failed to drop counter field table: {}",
                    e
                ))
            })?;

        info!("Counter field table dropped");
        Ok(())
    }

    /// 写入镜像值；表不存在时返回 `Ok(false)`
    pub async fn upsert(&self, key: &MirrorKey, value: i64) -> Result<bool> {
        if !self.exists().await? {
            return Ok(false);
        }

        let db = &self.db;
        retry::with_retry(
            &format!("upsert_counter_field({})", key.entity_id),
            self.retry_config,
            || {
                let model = counter_field::ActiveModel {
                    entity_id: Set(key.entity_id),
                    revision_id: Set(key.revision_id),
                    bundle: Set(key.bundle.clone()),
                    langcode: Set(key.langcode.clone()),
                    delta: Set(0),
                    deleted: Set(false),
                    value: Set(value),
                };
                async move {
                    CounterFieldEntity::insert(model)
                        .on_conflict(
                            OnConflict::columns([
                                counter_field::Column::EntityId,
                                counter_field::Column::RevisionId,
                                counter_field::Column::Bundle,
                            ])
                            .update_columns([
                                counter_field::Column::Langcode,
                                counter_field::Column::Delta,
                                counter_field::Column::Deleted,
                                counter_field::Column::Value,
                            ])
                            .to_owned(),
                        )
                        .exec_without_returning(db)
                        .await
                }
            },
        )
        .await
        .map_err(|e| {
            CounterError::database_operation(format!(
                "Failed to mirror total for item {}: {}",
                key.entity_id, e
            ))
        })?;

        Ok(true)
    }

    pub async fn get(&self, entity_id: i64, revision_id: i64, bundle: &str) -> Result<Option<i64>> {
        if !self.exists().await? {
            return Ok(None);
        }
        let row = CounterFieldEntity::find_by_id((entity_id, revision_id, bundle.to_string()))
            .one(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to query counter field: {}", e))
            })?;
        Ok(row.map(|m| m.value))
    }
}

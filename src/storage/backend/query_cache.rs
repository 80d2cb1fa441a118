//! 报表查询缓存 `gac_query_cache`

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::OnConflict,
};
use tracing::debug;

use crate::errors::{CounterError, Result};
use migration::entities::query_cache;

#[derive(Clone)]
pub struct QueryCache {
    db: DatabaseConnection,
}

impl QueryCache {
    pub(super) fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 读取未过期的缓存数据
    pub async fn get(&self, cid: &str, now: i64) -> Result<Option<String>> {
        let row = query_cache::Entity::find_by_id(cid)
            .filter(query_cache::Column::Expire.gt(now))
            .one(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to read query cache: {}", e))
            })?;
        Ok(row.map(|m| m.data))
    }

    pub async fn set(&self, cid: &str, data: &str, expire: i64) -> Result<()> {
        let model = query_cache::ActiveModel {
            cid: Set(cid.to_string()),
            data: Set(data.to_string()),
            expire: Set(expire),
            created_at: Set(chrono::Utc::now()),
        };

        query_cache::Entity::insert(model)
            .on_conflict(
                OnConflict::column(query_cache::Column::Cid)
                    .update_columns([
                        query_cache::Column::Data,
                        query_cache::Column::Expire,
                        query_cache::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to write query cache: {}", e))
            })?;
        Ok(())
    }

    /// 删除已过期条目，返回删除数量
    pub async fn purge_expired(&self, now: i64) -> Result<u64> {
        let result = query_cache::Entity::delete_many()
            .filter(query_cache::Column::Expire.lte(now))
            .exec(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to purge query cache: {}", e))
            })?;
        if result.rows_affected > 0 {
            debug!("Purged {} expired query cache entries", result.rows_affected);
        }
        Ok(result.rows_affected)
    }
}

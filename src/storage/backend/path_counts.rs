//! 原始路径计数表 `gac_path_counter`

use std::collections::{HashMap, HashSet};

use moka::sync::Cache;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::OnConflict,
};
use tracing::debug;

use super::retry::{self, RetryConfig};
use crate::errors::{CounterError, Result};
use migration::entities::path_counter;

/// 单批 INSERT 的行数上限
const UPSERT_BATCH_SIZE: usize = 500;

const COUNT_CACHE_KEY: &str = "path_counter:count";

/// 待写入的一行，`path` 与 `path_hash` 均为已规范化的存储形式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCountRow {
    pub path_hash: String,
    pub path: String,
    pub pageviews: i64,
}

#[derive(Clone)]
pub struct PathCounterRepository {
    db: DatabaseConnection,
    retry_config: RetryConfig,
    count_cache: Cache<String, u64>,
}

impl PathCounterRepository {
    pub(super) fn new(
        db: DatabaseConnection,
        retry_config: RetryConfig,
        count_cache: Cache<String, u64>,
    ) -> Self {
        Self {
            db,
            retry_config,
            count_cache,
        }
    }

    /// 按 `path_hash` 覆盖写入，返回写入的不同路径数
    ///
    /// 同一批中重复的哈希以最后一行为准。
    pub async fn upsert_many(&self, rows: &[PathCountRow]) -> Result<usize> {
        let mut latest: HashMap<&str, &PathCountRow> = HashMap::with_capacity(rows.len());
        let mut order: Vec<&str> = Vec::with_capacity(rows.len());
        for row in rows {
            if latest.insert(row.path_hash.as_str(), row).is_none() {
                order.push(row.path_hash.as_str());
            }
        }

        let models: Vec<path_counter::ActiveModel> = order
            .iter()
            .filter_map(|hash| latest.get(hash))
            .map(|row| path_counter::ActiveModel {
                pagepath_hash: Set(row.path_hash.clone()),
                pagepath: Set(row.path.clone()),
                pageviews: Set(row.pageviews),
            })
            .collect();

        let db = &self.db;
        for batch in models.chunks(UPSERT_BATCH_SIZE) {
            retry::with_retry("upsert_path_counts", self.retry_config, || {
                let batch = batch.to_vec();
                async move {
                    path_counter::Entity::insert_many(batch)
                        .on_conflict(
                            OnConflict::column(path_counter::Column::PagepathHash)
                                .update_columns([
                                    path_counter::Column::Pagepath,
                                    path_counter::Column::Pageviews,
                                ])
                                .to_owned(),
                        )
                        .exec_without_returning(db)
                        .await
                }
            })
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to save path counts: {}", e))
            })?;
        }

        if !models.is_empty() {
            self.count_cache.invalidate(COUNT_CACHE_KEY);
        }
        debug!("Upserted {} path counter rows", models.len());
        Ok(models.len())
    }

    pub async fn get(&self, path_hash: &str) -> Result<Option<path_counter::Model>> {
        path_counter::Entity::find_by_id(path_hash)
            .one(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to query path counter: {}", e))
            })
    }

    /// 对一组路径哈希求和，重复的哈希只计一次
    pub async fn sum_by_hashes(&self, hashes: &[String]) -> Result<i64> {
        let unique: HashSet<&String> = hashes.iter().collect();
        if unique.is_empty() {
            return Ok(0);
        }

        let views: Vec<i64> = path_counter::Entity::find()
            .select_only()
            .column(path_counter::Column::Pageviews)
            .filter(path_counter::Column::PagepathHash.is_in(unique.into_iter().cloned()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to sum pageviews: {}", e))
            })?;

        Ok(views.into_iter().sum())
    }

    /// 浏览量最高的路径
    pub async fn top(&self, limit: u64) -> Result<Vec<(String, i64)>> {
        let rows = path_counter::Entity::find()
            .order_by_desc(path_counter::Column::Pageviews)
            .order_by_asc(path_counter::Column::Pagepath)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to query top paths: {}", e))
            })?;

        Ok(rows.into_iter().map(|m| (m.pagepath, m.pageviews)).collect())
    }

    /// 已存储路径数（缓存 30 秒）
    pub async fn count(&self) -> Result<u64> {
        if let Some(count) = self.count_cache.get(COUNT_CACHE_KEY) {
            return Ok(count);
        }

        let count = path_counter::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to count paths: {}", e))
            })?;

        self.count_cache.insert(COUNT_CACHE_KEY.to_string(), count);
        Ok(count)
    }
}

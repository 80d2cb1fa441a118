//! 内容条目汇总表 `gac_item_total`

use moka::sync::Cache;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::OnConflict,
};

use super::retry::{self, RetryConfig};
use crate::errors::{CounterError, Result};
use migration::entities::item_total;

const ALL_KEY: &str = "item_total:all";
const POSITIVE_KEY: &str = "item_total:positive";

#[derive(Clone)]
pub struct ItemTotalRepository {
    db: DatabaseConnection,
    retry_config: RetryConfig,
    count_cache: Cache<String, u64>,
}

impl ItemTotalRepository {
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

    /// 写入条目的汇总值（按 nid 覆盖）
    pub async fn upsert(&self, nid: i64, total: i64) -> Result<()> {
        let db = &self.db;
        retry::with_retry(&format!("upsert_item_total({})", nid), self.retry_config, || async move {
            let model = item_total::ActiveModel {
                nid: Set(nid),
                pageview_total: Set(total),
            };
            item_total::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(item_total::Column::Nid)
                        .update_column(item_total::Column::PageviewTotal)
                        .to_owned(),
                )
                .exec_without_returning(db)
                .await
        })
        .await
        .map_err(|e| {
            CounterError::database_operation(format!(
                "Failed to save total for item {}: {}",
                nid, e
            ))
        })?;

        self.count_cache.invalidate(ALL_KEY);
        self.count_cache.invalidate(POSITIVE_KEY);
        Ok(())
    }

    pub async fn get(&self, nid: i64) -> Result<Option<i64>> {
        let row = item_total::Entity::find_by_id(nid)
            .one(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to query item total: {}", e))
            })?;
        Ok(row.map(|m| m.pageview_total))
    }

    /// 浏览量最高的条目 `(nid, total)`
    pub async fn top(&self, limit: u64) -> Result<Vec<(i64, i64)>> {
        let rows = item_total::Entity::find()
            .order_by_desc(item_total::Column::PageviewTotal)
            .order_by_asc(item_total::Column::Nid)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to query top items: {}", e))
            })?;
        Ok(rows.into_iter().map(|m| (m.nid, m.pageview_total)).collect())
    }

    /// 已存储汇总的条目数（缓存 30 秒）
    pub async fn count_all(&self) -> Result<u64> {
        if let Some(count) = self.count_cache.get(ALL_KEY) {
            return Ok(count);
        }
        let count = item_total::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to count item totals: {}", e))
            })?;
        self.count_cache.insert(ALL_KEY.to_string(), count);
        Ok(count)
    }

    /// 浏览量大于 0 的条目数（缓存 30 秒）
    pub async fn count_positive(&self) -> Result<u64> {
        if let Some(count) = self.count_cache.get(POSITIVE_KEY) {
            return Ok(count);
        }
        let count = item_total::Entity::find()
            .filter(item_total::Column::PageviewTotal.gt(0))
            .count(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to count item totals: {}", e))
            })?;
        self.count_cache.insert(POSITIVE_KEY.to_string(), count);
        Ok(count)
    }
}

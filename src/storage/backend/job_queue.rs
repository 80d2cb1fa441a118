//! 数据库任务队列 `gac_queue`
//!
//! `expire = 0` 表示可领取；领取时写入租约到期时间。
//! 处理成功后删除；失败的条目保留租约，到期后可再次被领取。

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::Expr,
};
use tracing::{debug, info};

use crate::errors::{CounterError, Result};
use migration::entities::queue_item;

/// 已领取的队列条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedJob {
    pub id: i64,
    pub payload: String,
    pub created: i64,
}

#[derive(Clone)]
pub struct JobQueue {
    db: DatabaseConnection,
}

impl JobQueue {
    pub(super) fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn push(&self, payload: &str, now: i64) -> Result<()> {
        let model = queue_item::ActiveModel {
            payload: Set(payload.to_string()),
            created: Set(now),
            expire: Set(0),
            ..Default::default()
        };
        queue_item::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| CounterError::queue(format!("Failed to enqueue job: {}", e)))?;
        Ok(())
    }

    /// 按入队顺序领取下一个可用条目
    ///
    /// 领取通过条件更新完成，并发领取同一条目时只有一方成功。
    pub async fn claim_next(&self, now: i64, lease_secs: i64) -> Result<Option<QueuedJob>> {
        loop {
            let candidate = queue_item::Entity::find()
                .filter(claimable(now))
                .order_by_asc(queue_item::Column::Id)
                .one(&self.db)
                .await
                .map_err(|e| CounterError::queue(format!("Failed to read queue: {}", e)))?;

            let Some(item) = candidate else {
                return Ok(None);
            };

            let result = queue_item::Entity::update_many()
                .col_expr(queue_item::Column::Expire, Expr::value(now + lease_secs))
                .filter(queue_item::Column::Id.eq(item.id))
                .filter(queue_item::Column::Expire.eq(item.expire))
                .exec(&self.db)
                .await
                .map_err(|e| CounterError::queue(format!("Failed to claim job: {}", e)))?;

            if result.rows_affected == 1 {
                return Ok(Some(QueuedJob {
                    id: item.id,
                    payload: item.payload,
                    created: item.created,
                }));
            }
            debug!("Queue item {} claimed elsewhere, trying next", item.id);
        }
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        queue_item::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| CounterError::queue(format!("Failed to delete job {}: {}", id, e)))?;
        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        queue_item::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| CounterError::queue(format!("Failed to count queue: {}", e)))
    }

    /// 分批删除全部条目，返回删除数量
    pub async fn purge(&self, batch_size: u64) -> Result<u64> {
        let batch_size = batch_size.max(1);
        let mut removed = 0;
        loop {
            let ids: Vec<i64> = queue_item::Entity::find()
                .select_only()
                .column(queue_item::Column::Id)
                .order_by_asc(queue_item::Column::Id)
                .limit(batch_size)
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| CounterError::queue(format!("Failed to read queue: {}", e)))?;

            if ids.is_empty() {
                break;
            }

            let result = queue_item::Entity::delete_many()
                .filter(queue_item::Column::Id.is_in(ids))
                .exec(&self.db)
                .await
                .map_err(|e| CounterError::queue(format!("Failed to purge queue: {}", e)))?;
            removed += result.rows_affected;
        }

        info!("Purged {} queue items", removed);
        Ok(removed)
    }
}

fn claimable(now: i64) -> Condition {
    Condition::any()
        .add(queue_item::Column::Expire.eq(0))
        .add(queue_item::Column::Expire.lt(now))
}

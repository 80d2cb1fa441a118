use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
    sea_query::OnConflict,
};

use crate::errors::{CounterError, Result};
use crate::storage::StateStore;
use migration::entities::counter_state;

/// `gac_state` 表上的状态存储
#[derive(Clone)]
pub struct SeaOrmStateStore {
    db: DatabaseConnection,
}

impl SeaOrmStateStore {
    pub(super) fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn upsert_statement(key: &str, value: &str) -> sea_orm::Insert<counter_state::ActiveModel> {
    let model = counter_state::ActiveModel {
        key: Set(key.to_string()),
        value: Set(value.to_string()),
        updated_at: Set(chrono::Utc::now()),
    };
    counter_state::Entity::insert(model).on_conflict(
        OnConflict::column(counter_state::Column::Key)
            .update_columns([counter_state::Column::Value, counter_state::Column::UpdatedAt])
            .to_owned(),
    )
}

#[async_trait]
impl StateStore for SeaOrmStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = counter_state::Entity::find_by_id(key)
            .one(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to read state '{}': {}", key, e))
            })?;
        Ok(row.map(|m| m.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        upsert_statement(key, value)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to write state '{}': {}", key, e))
            })?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        counter_state::Entity::delete_by_id(key)
            .exec(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!(
                    "Failed to delete state '{}': {}",
                    key, e
                ))
            })?;
        Ok(())
    }

    /// 在单个事务中写入多个键
    async fn set_many(&self, pairs: &[(&str, String)]) -> Result<()> {
        let txn = self.db.begin().await.map_err(|e| {
            CounterError::database_operation(format!("Failed to begin transaction: {}", e))
        })?;

        for (key, value) in pairs {
            upsert_statement(key, value)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| {
                    CounterError::database_operation(format!(
                        "Failed to write state '{}': {}",
                        key, e
                    ))
                })?;
        }

        txn.commit().await.map_err(|e| {
            CounterError::database_operation(format!("Failed to commit transaction: {}", e))
        })?;
        Ok(())
    }

    async fn delete_many(&self, keys: &[&str]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        counter_state::Entity::delete_many()
            .filter(counter_state::Column::Key.is_in(keys.iter().copied()))
            .exec(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to delete state keys: {}", e))
            })?;
        Ok(())
    }
}

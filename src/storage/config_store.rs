use sea_orm::{DatabaseConnection, EntityTrait, Set, sea_query::OnConflict};
use std::collections::HashMap;

use crate::config::ValueType;
use crate::errors::{CounterError, Result};
use migration::entities::counter_setting;

/// 设置项的完整信息
#[derive(Debug, Clone)]
pub struct ConfigItem {
    pub key: String,
    pub value: String,
    pub value_type: ValueType,
    pub is_sensitive: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<counter_setting::Model> for ConfigItem {
    fn from(m: counter_setting::Model) -> Self {
        Self {
            value_type: m.value_type.parse().unwrap_or(ValueType::String),
            key: m.key,
            value: m.value,
            is_sensitive: m.is_sensitive,
            updated_at: m.updated_at,
        }
    }
}

/// `gac_settings` 表的读写
pub struct ConfigStore {
    db: DatabaseConnection,
}

impl ConfigStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_all(&self) -> Result<HashMap<String, ConfigItem>> {
        let records = counter_setting::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to query settings: {}", e))
            })?;

        Ok(records
            .into_iter()
            .map(|r| (r.key.clone(), ConfigItem::from(r)))
            .collect())
    }

    /// 写入设置（不存在则插入，存在则覆盖值）
    pub async fn set(
        &self,
        key: &str,
        value: &str,
        value_type: ValueType,
        is_sensitive: bool,
    ) -> Result<()> {
        let model = counter_setting::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            value_type: Set(value_type.to_string()),
            is_sensitive: Set(is_sensitive),
            updated_at: Set(chrono::Utc::now()),
        };

        counter_setting::Entity::insert(model)
            .on_conflict(
                OnConflict::column(counter_setting::Column::Key)
                    .update_columns([
                        counter_setting::Column::Value,
                        counter_setting::Column::ValueType,
                        counter_setting::Column::IsSensitive,
                        counter_setting::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| {
                CounterError::database_operation(format!("Failed to save setting '{}': {}", key, e))
            })?;

        Ok(())
    }

    /// 原子性插入设置（如果不存在）
    ///
    /// 返回值:
    /// - `Ok(true)`: 插入成功
    /// - `Ok(false)`: 已存在，未插入
    pub async fn insert_if_not_exists(
        &self,
        key: &str,
        value: &str,
        value_type: ValueType,
        is_sensitive: bool,
    ) -> Result<bool> {
        let model = counter_setting::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            value_type: Set(value_type.to_string()),
            is_sensitive: Set(is_sensitive),
            updated_at: Set(chrono::Utc::now()),
        };

        let result = counter_setting::Entity::insert(model)
            .on_conflict(
                OnConflict::column(counter_setting::Column::Key)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.db)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(sea_orm::DbErr::RecordNotInserted) => Ok(false),
            Err(e) => {
                let err_str = e.to_string().to_lowercase();
                if err_str.contains("no rows") || err_str.contains("record not inserted") {
                    Ok(false)
                } else {
                    Err(CounterError::database_operation(format!(
                        "Failed to insert setting '{}': {}",
                        key, e
                    )))
                }
            }
        }
    }
}

//! 键值状态存储
//!
//! 令牌、分页游标、统计数据等运行状态通过 `StateStore` 读写，
//! 生产环境使用数据库实现，测试使用内存实现。

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::Result;

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn set_many(&self, pairs: &[(&str, String)]) -> Result<()> {
        for (key, value) in pairs {
            self.set(key, value).await?;
        }
        Ok(())
    }

    async fn delete_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.delete(key).await?;
        }
        Ok(())
    }
}

/// 内存实现，用于测试和一次性 CLI 调用
#[derive(Default)]
pub struct MemoryStateStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前全部键值的快照
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.lock().clone()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStateStore::new();
        assert!(store.get("a").await.unwrap().is_none());

        store.set("a", "1").await.unwrap();
        store
            .set_many(&[("b", "2".to_string()), ("c", "3".to_string())])
            .await
            .unwrap();
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));

        store.delete_many(&["a", "b", "missing"]).await.unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("c").map(String::as_str), Some("3"));
    }
}

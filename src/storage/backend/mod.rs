//! SeaORM storage backend
//!
//! 计数表、状态、查询缓存、任务队列与内容目录均存放在同一个数据库中，
//! 支持 SQLite、MySQL/MariaDB 和 PostgreSQL。

mod connection;
mod content_catalog;
mod item_totals;
mod job_queue;
mod mirror_field;
mod path_counts;
mod query_cache;
pub mod retry;
mod state_store;

use std::time::Duration;

use moka::sync::Cache;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{CounterError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use content_catalog::SeaOrmContentCatalog;
pub use item_totals::ItemTotalRepository;
pub use job_queue::{JobQueue, QueuedJob};
pub use mirror_field::{MirrorField, MirrorKey};
pub use path_counts::{PathCountRow, PathCounterRepository};
pub use query_cache::QueryCache;
pub use state_store::SeaOrmStateStore;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(CounterError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// 统计 COUNT 缓存（TTL 30秒）
    count_cache: Cache<String, u64>,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    /// 连接数据库并运行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.database_url.trim();
        if database_url.is_empty() {
            return Err(CounterError::database_config("database_url is not set"));
        }

        let backend_name = infer_backend_from_url(database_url)?;
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name, config.pool_size, config.timeout).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name,
            count_cache: Cache::builder()
                .time_to_live(Duration::from_secs(30))
                .max_capacity(16)
                .build(),
            retry_config: retry::RetryConfig::from_database_config(config),
        };

        run_migrations(&storage.db).await?;

        info!(
            "{} storage initialized",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 获取数据库连接（设置管理等需要直接访问数据库的场景）
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    // ============================================================
    // 各表的访问入口
    // ============================================================

    pub fn path_counters(&self) -> PathCounterRepository {
        PathCounterRepository::new(
            self.db.clone(),
            self.retry_config,
            self.count_cache.clone(),
        )
    }

    pub fn item_totals(&self) -> ItemTotalRepository {
        ItemTotalRepository::new(
            self.db.clone(),
            self.retry_config,
            self.count_cache.clone(),
        )
    }

    pub fn mirror_field(&self) -> MirrorField {
        MirrorField::new(self.db.clone(), self.retry_config)
    }

    pub fn query_cache(&self) -> QueryCache {
        QueryCache::new(self.db.clone())
    }

    pub fn job_queue(&self) -> JobQueue {
        JobQueue::new(self.db.clone())
    }

    pub fn state_store(&self) -> SeaOrmStateStore {
        SeaOrmStateStore::new(self.db.clone())
    }

    /// 使用站点配置构建内容目录
    pub fn content_catalog(&self, site: &crate::config::SiteConfig) -> SeaOrmContentCatalog {
        SeaOrmContentCatalog::new(self.db.clone(), site.clone())
    }
}

//! 启动准备
//!
//! 服务模式与 CLI 共用：连接数据库、写入默认设置、组装计数服务与队列驱动。

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::analytics::{AnalyticsApi, GoogleAnalyticsApi};
use crate::config::StaticConfig;
use crate::counter::{ContentRegistry, CounterService};
use crate::queue::QueueDriver;
use crate::storage::SeaOrmStorage;

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub service: Arc<CounterService>,
    pub driver: Arc<QueueDriver>,
    pub registry: Arc<dyn ContentRegistry>,
}

pub async fn prepare_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    let api: Arc<dyn AnalyticsApi> = Arc::new(GoogleAnalyticsApi::new(&config.api));

    let storage = SeaOrmStorage::connect(&config.database)
        .await
        .context("Failed to initialize storage")?;

    let service = CounterService::from_storage(&storage, api, config);
    service
        .settings()
        .init_defaults()
        .await
        .context("Failed to initialize default settings")?;

    let service = Arc::new(service);
    let driver = Arc::new(QueueDriver::new(service.clone()));
    let registry: Arc<dyn ContentRegistry> = Arc::new(storage.content_catalog(&config.site));

    debug!("Startup prepared in {:?}", start_time.elapsed());
    info!("Using {} storage backend", storage.backend_name());

    Ok(StartupContext {
        storage: Arc::new(storage),
        service,
        driver,
        registry,
    })
}

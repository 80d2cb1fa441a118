//! Admin API cron 与队列

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use chrono::Utc;
use tracing::info;

use crate::queue::QueueDriver;

use super::helpers::api_result;
use super::types::{CronQuery, PurgeResponse};

/// POST /cron[?force=true]
pub async fn run_cron(
    driver: web::Data<Arc<QueueDriver>>,
    query: web::Query<CronQuery>,
) -> HttpResponse {
    info!("Admin API: cron triggered (force={})", query.force);
    api_result(driver.run_cron(Utc::now(), query.force).await)
}

/// DELETE /queue
pub async fn purge_queue(driver: web::Data<Arc<QueueDriver>>) -> HttpResponse {
    api_result(
        driver
            .purge_queue()
            .await
            .map(|purged| PurgeResponse { purged }),
    )
}

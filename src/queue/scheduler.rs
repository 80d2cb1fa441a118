//! 服务模式下的后台 cron
//!
//! 以固定间隔调用 `run_cron`，是否真正执行由间隔闸门决定。

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, warn};

use super::driver::QueueDriver;

pub fn spawn_scheduler(driver: Arc<QueueDriver>, tick_secs: u64) -> JoinHandle<()> {
    let period = Duration::from_secs(tick_secs.max(1));
    debug!("Cron scheduler started, ticking every {:?}", period);

    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match driver.run_cron(Utc::now(), false).await {
                Ok(report) if report.ran => {
                    debug!(
                        "Scheduled cron finished: {} processed, {} failed",
                        report.processed, report.failed
                    );
                }
                Ok(_) => {}
                Err(e) => warn!("Scheduled cron failed: {}", e),
            }
        }
    })
}

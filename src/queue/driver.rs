//! 定时任务与队列处理
//!
//! 每次 cron 先检查间隔闸门，再按配额入队 fetch 任务、为每个已发布条目入队
//! count 任务，最后在 `queue_time` 秒内按入队顺序处理队列。

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::job::Job;
use crate::counter::CounterService;
use crate::errors::Result;
use crate::storage::JobQueue;

/// 清空队列时每批删除的条数
pub const PURGE_BATCH_SIZE: u64 = 500;

/// 本轮应入队的 fetch 游标
///
/// 从当前游标到 `ceil(total_paths / chunk)` 页（至少一页），数量不超过当日剩余配额。
pub fn plan_fetch_indices(cursor: u64, total_paths: u64, chunk: u64, remaining_quota: u64) -> Vec<u64> {
    let pages = total_paths.div_ceil(chunk.max(1)).max(1);
    let end = pages.max(cursor + 1);
    (cursor..end).take(remaining_quota as usize).collect()
}

/// 一次 cron 的执行结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CronReport {
    /// 间隔未到时为 false，其余字段均为 0
    pub ran: bool,
    pub fetch_jobs: usize,
    pub count_jobs: usize,
    pub processed: usize,
    pub failed: usize,
}

/// 一次队列处理的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub processed: usize,
    pub failed: usize,
}

pub struct QueueDriver {
    service: Arc<CounterService>,
    queue: JobQueue,
}

impl QueueDriver {
    pub fn new(service: Arc<CounterService>) -> Self {
        let queue = service.job_queue().clone();
        Self { service, queue }
    }

    pub fn service(&self) -> &Arc<CounterService> {
        &self.service
    }

    pub async fn enqueue(&self, job: Job, now: i64) -> Result<()> {
        let payload = serde_json::to_string(&job)?;
        self.queue.push(&payload, now).await
    }

    /// 执行一次 cron；`force` 跳过间隔闸门
    pub async fn run_cron(&self, now: DateTime<Utc>, force: bool) -> Result<CronReport> {
        let state = self.service.state();
        let ts = now.timestamp();

        let next = state.cron_next_execution().await?;
        if !force && ts < next {
            debug!("Cron skipped, next execution at {}", next);
            return Ok(CronReport::default());
        }

        let settings = self.service.load_settings().await?;
        state
            .set_cron_next_execution(ts + i64::from(settings.cron_interval) * 60)
            .await?;

        let mut report = CronReport {
            ran: true,
            ..Default::default()
        };

        let purged = self.service.purge_expired_reports(ts).await?;
        if purged > 0 {
            debug!("Removed {} expired report cache entries", purged);
        }

        // fetch 任务
        let calls_today = state.api_calls_on(now.date_naive()).await?;
        let remaining = settings.api_dayquota.saturating_sub(calls_today);
        let indices = plan_fetch_indices(
            state.data_step().await?,
            state.total_paths().await?,
            u64::from(settings.chunk_to_fetch),
            u64::from(remaining),
        );
        if indices.is_empty() {
            let message = format!(
                "Daily API quota of {} calls reached, no fetch jobs queued",
                settings.api_dayquota
            );
            warn!("{}", message);
            self.service.notices().warning(message);
        }
        for index in indices {
            self.enqueue(Job::Fetch { index }, ts).await?;
            report.fetch_jobs += 1;
        }

        // count 任务
        for item in self.service.catalog().published_items().await? {
            self.enqueue(Job::Count { nid: item.nid }, ts).await?;
            report.count_jobs += 1;
        }

        info!(
            "Cron queued {} fetch jobs and {} count jobs",
            report.fetch_jobs, report.count_jobs
        );

        let processed = self
            .process_queue(Duration::from_secs(settings.queue_time))
            .await?;
        report.processed = processed.processed;
        report.failed = processed.failed;

        Ok(report)
    }

    /// 在时间预算内按入队顺序处理队列
    ///
    /// 失败的任务保留租约，到期后重新可领取；处理继续进行。
    pub async fn process_queue(&self, budget: Duration) -> Result<ProcessReport> {
        let started = Instant::now();
        let lease = i64::try_from(budget.as_secs()).unwrap_or(i64::MAX).max(1);
        let mut report = ProcessReport::default();

        while started.elapsed() < budget {
            let Some(item) = self.queue.claim_next(Utc::now().timestamp(), lease).await? else {
                break;
            };

            let job: Job = match serde_json::from_str(&item.payload) {
                Ok(job) => job,
                Err(e) => {
                    // 无法解析的条目永远不会成功，直接丢弃
                    warn!("Dropping malformed queue item {}: {}", item.id, e);
                    self.queue.delete(item.id).await?;
                    report.failed += 1;
                    continue;
                }
            };

            match self.run_job(job).await {
                Ok(()) => {
                    self.queue.delete(item.id).await?;
                    debug!("Job {} done", job);
                    report.processed += 1;
                }
                Err(e) => {
                    error!("Job {} failed: {}", job, e);
                    report.failed += 1;
                }
            }
        }

        if report.processed + report.failed > 0 {
            info!(
                "Processed {} queue items, {} failed",
                report.processed, report.failed
            );
        }
        Ok(report)
    }

    async fn run_job(&self, job: Job) -> Result<()> {
        match job {
            Job::Fetch { index } => self.service.fetch(index, Utc::now()).await.map(|_| ()),
            Job::Count { nid } => self.service.count(nid).await.map(|_| ()),
        }
    }

    pub async fn purge_queue(&self) -> Result<u64> {
        self.queue.purge(PURGE_BATCH_SIZE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_covers_all_pages() {
        assert_eq!(plan_fetch_indices(0, 2500, 1000, 100), vec![0, 1, 2]);
        assert_eq!(plan_fetch_indices(1, 2500, 1000, 100), vec![1, 2]);
    }

    #[test]
    fn test_plan_at_least_one_page() {
        assert_eq!(plan_fetch_indices(0, 0, 1000, 100), vec![0]);
        // 游标越过已知页数时仍拉取游标所在页
        assert_eq!(plan_fetch_indices(5, 100, 1000, 100), vec![5]);
    }

    #[test]
    fn test_plan_respects_quota() {
        assert_eq!(plan_fetch_indices(0, 10_000, 100, 3), vec![0, 1, 2]);
        assert!(plan_fetch_indices(0, 10_000, 100, 0).is_empty());
    }
}

//! 分页拉取报表
//!
//! 每次拉取一页 `chunk_to_fetch` 行，起点由游标决定：
//! `pointer = index * chunk + 1`。响应按完整参数集缓存；
//! 命中缓存时不再写入统计状态，避免重复计数。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use super::auth::Feed;
use super::state::CounterState;
use crate::analytics::{AnalyticsApi, DateRange, ReportQuery, ResultPage};
use crate::config::CounterSettings;
use crate::errors::{CounterError, Result};
use crate::storage::QueryCache;

/// 游标 `index` 对应的 1 起始行号
pub fn pointer(index: u64, chunk: u64) -> u64 {
    index.saturating_mul(chunk).saturating_add(1)
}

/// 拉取完第 `index` 页后的下一个游标；已到末尾则回到 0
pub fn next_cursor(index: u64, chunk: u64, total_results: u64) -> u64 {
    if pointer(index, chunk).saturating_add(chunk) <= total_results {
        index + 1
    } else {
        0
    }
}

/// 一次拉取的结果来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Cached(ResultPage),
    Fresh(ResultPage),
}

impl FetchOutcome {
    pub fn page(&self) -> &ResultPage {
        match self {
            FetchOutcome::Cached(page) | FetchOutcome::Fresh(page) => page,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, FetchOutcome::Fresh(_))
    }
}

pub struct ReportFetcher {
    api: Arc<dyn AnalyticsApi>,
    state: CounterState,
    cache: QueryCache,
}

impl ReportFetcher {
    pub fn new(api: Arc<dyn AnalyticsApi>, state: CounterState, cache: QueryCache) -> Self {
        Self { api, state, cache }
    }

    /// 清理过期的报表缓存
    pub async fn purge_expired(&self, now: i64) -> Result<u64> {
        self.cache.purge_expired(now).await
    }

    /// 第 `index` 页的查询参数
    pub fn build_query(settings: &CounterSettings, index: u64, today: chrono::NaiveDate) -> ReportQuery {
        let chunk = u64::from(settings.chunk_to_fetch.max(1));
        let range = DateRange::resolve(settings, today);
        ReportQuery {
            profile_id: settings.profile_id.clone(),
            start_date: range.start_str(),
            end_date: range.end_str(),
            start_index: pointer(index, chunk),
            max_results: chunk,
        }
    }

    /// 拉取第 `index` 页并推进游标
    pub async fn fetch_chunk(
        &self,
        settings: &CounterSettings,
        feed: &Feed,
        index: u64,
        now: DateTime<Utc>,
    ) -> Result<FetchOutcome> {
        if settings.profile_id.trim().is_empty() {
            return Err(CounterError::configuration(
                "No analytics view selected; set profile_id first",
            ));
        }

        let query = Self::build_query(settings, index, now.date_naive());
        let outcome = self.request(settings, feed, &query, now).await?;
        self.apply(&outcome, settings, index, now).await?;
        Ok(outcome)
    }

    async fn request(
        &self,
        settings: &CounterSettings,
        feed: &Feed,
        query: &ReportQuery,
        now: DateTime<Utc>,
    ) -> Result<FetchOutcome> {
        let cid = query.cache_id();
        let ts = now.timestamp();

        if settings.cache_length > 0
            && let Some(data) = self.cache.get(&cid, ts).await?
        {
            match serde_json::from_str::<ResultPage>(&data) {
                Ok(page) => {
                    debug!("Report served from cache: {}", cid);
                    return Ok(FetchOutcome::Cached(page));
                }
                Err(e) => warn!("Discarding unreadable cache entry {}: {}", cid, e),
            }
        }

        let page = self.api.query_report(feed.access_token(), query).await?;
        if page.has_error() {
            let message = page.error.unwrap_or_default();
            error!("Problem fetching data from analytics: {}", message);
            return Err(CounterError::api_response(message));
        }

        if settings.cache_length > 0 {
            let expire = ts.saturating_add(i64::try_from(settings.cache_length).unwrap_or(i64::MAX));
            self.cache
                .set(&cid, &serde_json::to_string(&page)?, expire)
                .await?;
        }

        Ok(FetchOutcome::Fresh(page))
    }

    /// 状态写入的唯一入口：统计只随实时拉取更新，游标两种情况都推进
    async fn apply(
        &self,
        outcome: &FetchOutcome,
        settings: &CounterSettings,
        index: u64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let page = outcome.page();

        if let FetchOutcome::Fresh(page) = outcome {
            self.state.record_fresh_page(page, now.timestamp()).await?;
            self.state.record_api_call(now.date_naive()).await?;
        }

        let chunk = u64::from(settings.chunk_to_fetch.max(1));
        let first = pointer(index, chunk);
        let size = page.rows.len() as u64;
        info!(
            "Retrieved {} items from analytics data for paths {} - {}",
            size,
            first,
            (first + size).saturating_sub(1)
        );

        self.state
            .set_data_step(next_cursor(index, chunk, page.total_results))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_formula() {
        for chunk in [1u64, 100, 1000] {
            for i in 0..20u64 {
                assert_eq!(pointer(i, chunk), i * chunk + 1);
            }
        }
    }

    #[test]
    fn test_next_cursor_advances_while_rows_remain() {
        assert_eq!(next_cursor(0, 100, 250), 1);
        assert_eq!(next_cursor(1, 100, 250), 0);
        // 恰好整除时最后一页之后归零
        assert_eq!(next_cursor(0, 100, 200), 1);
        assert_eq!(next_cursor(1, 100, 200), 0);
        assert_eq!(next_cursor(0, 100, 0), 0);
    }

    #[test]
    fn test_chunk_two_of_hundred() {
        assert_eq!(pointer(2, 100), 201);
        assert_eq!(next_cursor(2, 100, 250), 0);
        assert_eq!(next_cursor(2, 100, 500), 3);
    }

    #[test]
    fn test_build_query() {
        let settings = CounterSettings {
            profile_id: "42".into(),
            chunk_to_fetch: 100,
            ..Default::default()
        };
        let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let query = ReportFetcher::build_query(&settings, 2, today);
        assert_eq!(query.start_index, 201);
        assert_eq!(query.max_results, 100);
        assert_eq!(query.start_date, "2026-10-16");
        assert_eq!(query.end_date, "2026-10-18");
    }
}

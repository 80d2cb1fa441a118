//! 运行状态的强类型访问
//!
//! 所有 key 以 `google_analytics_counter.` 为前缀。撤销认证时清空
//! `REVOCABLE_KEYS` 中的九项；每日 API 调用计数单独保存，不随撤销清空。

use std::sync::Arc;

use chrono::NaiveDate;

use crate::analytics::ResultPage;
use crate::errors::Result;
use crate::storage::StateStore;

pub mod state_keys {
    pub const ACCESS_TOKEN: &str = "google_analytics_counter.access_token";
    pub const REFRESH_TOKEN: &str = "google_analytics_counter.refresh_token";
    pub const EXPIRES_AT: &str = "google_analytics_counter.expires_at";
    pub const DATA_STEP: &str = "google_analytics_counter.data_step";
    pub const TOTAL_PAGEVIEWS: &str = "google_analytics_counter.total_pageviews";
    pub const TOTAL_PATHS: &str = "google_analytics_counter.total_paths";
    pub const DATA_LAST_REFRESHED: &str = "google_analytics_counter.data_last_refreshed";
    pub const MOST_RECENT_QUERY: &str = "google_analytics_counter.most_recent_query";
    pub const CRON_NEXT_EXECUTION: &str = "google_analytics_counter.cron_next_execution";

    pub const API_CALLS_DATE: &str = "google_analytics_counter.api_calls_date";
    pub const API_CALLS_COUNT: &str = "google_analytics_counter.api_calls_count";

    pub const PENDING_AUTH_STATE: &str = "google_analytics_counter.pending_auth_state";
}

/// 撤销认证时清空的状态
pub const REVOCABLE_KEYS: [&str; 9] = [
    state_keys::ACCESS_TOKEN,
    state_keys::REFRESH_TOKEN,
    state_keys::EXPIRES_AT,
    state_keys::DATA_STEP,
    state_keys::TOTAL_PAGEVIEWS,
    state_keys::TOTAL_PATHS,
    state_keys::DATA_LAST_REFRESHED,
    state_keys::MOST_RECENT_QUERY,
    state_keys::CRON_NEXT_EXECUTION,
];

/// 已保存的 OAuth 令牌
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
}

#[derive(Clone)]
pub struct CounterState {
    store: Arc<dyn StateStore>,
}

impl CounterState {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    async fn text(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .get(key)
            .await?
            .filter(|v| !v.trim().is_empty()))
    }

    async fn number<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>> {
        Ok(self.text(key).await?.and_then(|v| v.trim().parse().ok()))
    }

    // ============================================================
    // 令牌
    // ============================================================

    pub async fn tokens(&self) -> Result<StoredTokens> {
        Ok(StoredTokens {
            access_token: self.text(state_keys::ACCESS_TOKEN).await?,
            refresh_token: self.text(state_keys::REFRESH_TOKEN).await?,
            expires_at: self.number(state_keys::EXPIRES_AT).await?,
        })
    }

    pub async fn has_access_token(&self) -> Result<bool> {
        Ok(self.text(state_keys::ACCESS_TOKEN).await?.is_some())
    }

    /// 保存访问令牌与过期时间；`refresh_token` 为 `None` 时保留原值
    pub async fn save_tokens(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at: i64,
    ) -> Result<()> {
        let mut pairs = vec![
            (state_keys::ACCESS_TOKEN, access_token.to_string()),
            (state_keys::EXPIRES_AT, expires_at.to_string()),
        ];
        if let Some(refresh) = refresh_token {
            pairs.push((state_keys::REFRESH_TOKEN, refresh.to_string()));
        }
        self.store.set_many(&pairs).await
    }

    pub async fn set_pending_auth_state(&self, value: &str) -> Result<()> {
        self.store.set(state_keys::PENDING_AUTH_STATE, value).await
    }

    /// 取出并删除待完成的授权 state，只能使用一次
    pub async fn take_pending_auth_state(&self) -> Result<Option<String>> {
        let value = self.text(state_keys::PENDING_AUTH_STATE).await?;
        if value.is_some() {
            self.store.delete(state_keys::PENDING_AUTH_STATE).await?;
        }
        Ok(value)
    }

    pub async fn clear_revocable(&self) -> Result<()> {
        self.store.delete_many(&REVOCABLE_KEYS).await
    }

    // ============================================================
    // 分页游标与统计
    // ============================================================

    pub async fn data_step(&self) -> Result<u64> {
        Ok(self.number(state_keys::DATA_STEP).await?.unwrap_or(0))
    }

    pub async fn set_data_step(&self, step: u64) -> Result<()> {
        self.store
            .set(state_keys::DATA_STEP, &step.to_string())
            .await
    }

    pub async fn total_pageviews(&self) -> Result<i64> {
        Ok(self.number(state_keys::TOTAL_PAGEVIEWS).await?.unwrap_or(0))
    }

    /// 尚未有过实时拉取时为 `None`
    pub async fn recorded_total_pageviews(&self) -> Result<Option<i64>> {
        self.number(state_keys::TOTAL_PAGEVIEWS).await
    }

    pub async fn total_paths(&self) -> Result<u64> {
        Ok(self.number(state_keys::TOTAL_PATHS).await?.unwrap_or(0))
    }

    pub async fn data_last_refreshed(&self) -> Result<Option<i64>> {
        self.number(state_keys::DATA_LAST_REFRESHED).await
    }

    pub async fn most_recent_query(&self) -> Result<Option<String>> {
        self.text(state_keys::MOST_RECENT_QUERY).await
    }

    /// 记录一次实时拉取的统计信息
    ///
    /// 服务端未给出数据刷新时间时，以本次拉取时间代替。
    pub async fn record_fresh_page(&self, page: &ResultPage, now: i64) -> Result<()> {
        let refreshed = page.data_last_refreshed.unwrap_or(now);
        self.store
            .set_many(&[
                (state_keys::TOTAL_PAGEVIEWS, page.total_pageviews.to_string()),
                (state_keys::TOTAL_PATHS, page.total_results.to_string()),
                (state_keys::DATA_LAST_REFRESHED, refreshed.to_string()),
                (state_keys::MOST_RECENT_QUERY, page.self_link.clone()),
            ])
            .await
    }

    // ============================================================
    // 调度与配额
    // ============================================================

    pub async fn cron_next_execution(&self) -> Result<i64> {
        Ok(self
            .number(state_keys::CRON_NEXT_EXECUTION)
            .await?
            .unwrap_or(0))
    }

    pub async fn set_cron_next_execution(&self, at: i64) -> Result<()> {
        self.store
            .set(state_keys::CRON_NEXT_EXECUTION, &at.to_string())
            .await
    }

    /// 当日已用的 API 调用次数
    pub async fn api_calls_on(&self, day: NaiveDate) -> Result<u32> {
        let stored_day = self.text(state_keys::API_CALLS_DATE).await?;
        if stored_day.as_deref() != Some(day.to_string().as_str()) {
            return Ok(0);
        }
        Ok(self.number(state_keys::API_CALLS_COUNT).await?.unwrap_or(0))
    }

    /// 记录一次 API 调用，跨日自动归零
    pub async fn record_api_call(&self, day: NaiveDate) -> Result<u32> {
        let count = self.api_calls_on(day).await?.saturating_add(1);
        self.store
            .set_many(&[
                (state_keys::API_CALLS_DATE, day.to_string()),
                (state_keys::API_CALLS_COUNT, count.to_string()),
            ])
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStateStore;

    fn state() -> (Arc<MemoryStateStore>, CounterState) {
        let store = Arc::new(MemoryStateStore::new());
        (store.clone(), CounterState::new(store))
    }

    #[test]
    fn test_revocable_keys_are_namespaced_and_unique() {
        let mut keys = REVOCABLE_KEYS.to_vec();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 9);
        assert!(keys.iter().all(|k| k.starts_with("google_analytics_counter.")));
        assert!(!keys.contains(&state_keys::API_CALLS_COUNT));
    }

    #[tokio::test]
    async fn test_save_tokens_keeps_refresh_token() {
        let (_, state) = state();
        state.save_tokens("a1", Some("r1"), 100).await.unwrap();
        state.save_tokens("a2", None, 200).await.unwrap();
        let tokens = state.tokens().await.unwrap();
        assert_eq!(tokens.access_token.as_deref(), Some("a2"));
        assert_eq!(tokens.refresh_token.as_deref(), Some("r1"));
        assert_eq!(tokens.expires_at, Some(200));
    }

    #[tokio::test]
    async fn test_pending_auth_state_is_single_use() {
        let (_, state) = state();
        assert_eq!(state.take_pending_auth_state().await.unwrap(), None);
        state.set_pending_auth_state("abc").await.unwrap();
        assert_eq!(
            state.take_pending_auth_state().await.unwrap().as_deref(),
            Some("abc")
        );
        assert_eq!(state.take_pending_auth_state().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_api_calls_reset_on_new_day() {
        let (_, state) = state();
        let day1 = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        state.record_api_call(day1).await.unwrap();
        assert_eq!(state.record_api_call(day1).await.unwrap(), 2);
        assert_eq!(state.api_calls_on(day2).await.unwrap(), 0);
        assert_eq!(state.record_api_call(day2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_revocable_keeps_quota_counter() {
        let (store, state) = state();
        let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        state.save_tokens("a", Some("r"), 1).await.unwrap();
        state.set_data_step(3).await.unwrap();
        state.record_api_call(day).await.unwrap();

        state.clear_revocable().await.unwrap();

        let snapshot = store.snapshot();
        assert!(REVOCABLE_KEYS.iter().all(|k| !snapshot.contains_key(*k)));
        assert_eq!(state.api_calls_on(day).await.unwrap(), 1);
    }
}

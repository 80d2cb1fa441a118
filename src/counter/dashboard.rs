//! 管理面板摘要

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use super::format::format_number;

/// 尚未执行过查询时的提示
pub const NO_QUERY_PLACEHOLDER: &str = "No query has been run yet or the analytics service is not running queries from this system.";

/// 数据刷新时间未知时的提示
pub const REFRESH_UNAVAILABLE: &str = "unavailable";

/// 前二十排行的条数
pub const TOP_LIMIT: u64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopPath {
    pub path: String,
    pub pageviews: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopItem {
    pub nid: i64,
    pub pageviews: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CronStatus {
    /// Unix 时间戳，0 表示从未调度
    pub next_execution: i64,
    pub next_execution_display: String,
    pub overdue: bool,
}

/// 面板的原始数据，由服务层收集
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub authenticated: bool,
    pub total_pageviews: i64,
    pub total_paths: u64,
    pub date_range: String,
    pub most_recent_query: Option<String>,
    pub data_last_refreshed: Option<i64>,
    pub quota_url: Option<String>,
    pub stored_paths: u64,
    pub published_items: u64,
    pub items_with_pageviews: u64,
    pub items_stored: u64,
    pub queued_jobs: u64,
    pub top_paths: Vec<(String, i64)>,
    pub top_items: Vec<(i64, i64)>,
    pub cron_next_execution: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub authenticated: bool,
    pub total_pageviews: String,
    pub total_paths: String,
    pub date_range: String,
    pub most_recent_query: String,
    pub data_last_refreshed: String,
    pub quota_url: Option<String>,
    pub stored_paths: String,
    pub published_items: String,
    pub items_with_pageviews: String,
    pub items_stored: String,
    pub queued_jobs: String,
    pub top_paths: Vec<TopPath>,
    pub top_items: Vec<TopItem>,
    pub cron: CronStatus,
}

fn format_timestamp(ts: i64) -> Option<String> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|dt: DateTime<Utc>| dt.format("%b %d, %Y %I:%M:%S%P").to_string())
}

fn count(n: u64) -> String {
    format_number(i64::try_from(n).unwrap_or(i64::MAX))
}

impl DashboardSummary {
    pub fn build(data: DashboardData, now: i64) -> Self {
        let data_last_refreshed = data
            .data_last_refreshed
            .and_then(format_timestamp)
            .unwrap_or_else(|| REFRESH_UNAVAILABLE.to_string());

        let cron = CronStatus {
            next_execution: data.cron_next_execution,
            next_execution_display: if data.cron_next_execution > 0 {
                format_timestamp(data.cron_next_execution).unwrap_or_default()
            } else {
                "never".to_string()
            },
            overdue: data.cron_next_execution <= now,
        };

        Self {
            authenticated: data.authenticated,
            total_pageviews: format_number(data.total_pageviews),
            total_paths: count(data.total_paths),
            date_range: data.date_range,
            most_recent_query: data
                .most_recent_query
                .unwrap_or_else(|| NO_QUERY_PLACEHOLDER.to_string()),
            data_last_refreshed,
            quota_url: data.quota_url,
            stored_paths: count(data.stored_paths),
            published_items: count(data.published_items),
            items_with_pageviews: count(data.items_with_pageviews),
            items_stored: count(data.items_stored),
            queued_jobs: count(data.queued_jobs),
            top_paths: data
                .top_paths
                .into_iter()
                .map(|(path, pageviews)| TopPath {
                    path,
                    pageviews: format_number(pageviews),
                })
                .collect(),
            top_items: data
                .top_items
                .into_iter()
                .map(|(nid, pageviews)| TopItem {
                    nid,
                    pageviews: format_number(pageviews),
                })
                .collect(),
            cron,
        }
    }
}

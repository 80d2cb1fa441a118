//! 统计接口的请求与响应类型

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_128;

/// 单页报表查询参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportQuery {
    /// 视图 ID（不含 `ga:` 前缀）
    pub profile_id: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`
    pub end_date: String,
    /// 1 起始
    pub start_index: u64,
    pub max_results: u64,
}

impl ReportQuery {
    pub const METRIC: &'static str = "ga:pageviews";
    pub const DIMENSION: &'static str = "ga:pagePath";

    /// 请求参数（顺序固定，也用于生成缓存键）
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ids", format!("ga:{}", self.profile_id)),
            ("metrics", Self::METRIC.to_string()),
            ("dimensions", Self::DIMENSION.to_string()),
            ("start-date", self.start_date.clone()),
            ("end-date", self.end_date.clone()),
            ("start-index", self.start_index.to_string()),
            ("max-results", self.max_results.to_string()),
        ]
    }

    /// 查询缓存键：完整参数集的哈希
    pub fn cache_id(&self) -> String {
        let canonical = self
            .query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("gac_report_{:032x}", xxh3_128(canonical.as_bytes()))
    }
}

/// 一页报表结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPage {
    /// `(pagePath, pageviews)`
    pub rows: Vec<(String, i64)>,
    pub total_results: u64,
    pub total_pageviews: i64,
    pub data_last_refreshed: Option<i64>,
    pub self_link: String,
    pub error: Option<String>,
}

impl ResultPage {
    pub fn has_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

/// 报表接口原始响应
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawReport {
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub totals_for_all_results: std::collections::HashMap<String, String>,
    #[serde(default)]
    pub data_last_refreshed: Option<i64>,
    #[serde(default)]
    pub self_link: String,
    #[serde(default)]
    pub error: Option<RawApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawApiError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
}

impl From<RawReport> for ResultPage {
    fn from(raw: RawReport) -> Self {
        let rows = raw
            .rows
            .into_iter()
            .filter_map(|row| {
                let mut cols = row.into_iter();
                let path = cols.next()?;
                let views = cols.next()?.trim().parse().unwrap_or(0);
                Some((path, views))
            })
            .collect();

        let total_pageviews = raw
            .totals_for_all_results
            .get(ReportQuery::METRIC)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);

        let error = raw.error.map(|e| match e.code {
            Some(code) => format!("{} ({})", e.message, code),
            None => e.message,
        });

        ResultPage {
            rows,
            total_results: raw.total_results,
            total_pageviews,
            data_last_refreshed: raw.data_last_refreshed,
            self_link: raw.self_link,
            error,
        }
    }
}

/// OAuth 客户端凭据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl ClientCredentials {
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty()
            && !self.client_secret.trim().is_empty()
            && !self.redirect_uri.trim().is_empty()
    }
}

/// 令牌端点返回的授权结果
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// 刷新授权时通常不返回
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// 秒
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// 令牌端点的错误响应
#[derive(Debug, Deserialize)]
pub(crate) struct TokenError {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebProperty {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub web_property_id: String,
}

/// 管理接口的列表响应
#[derive(Debug, Deserialize)]
pub(crate) struct ItemList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> ReportQuery {
        ReportQuery {
            profile_id: "12345".into(),
            start_date: "2026-10-16".into(),
            end_date: "2026-10-18".into(),
            start_index: 201,
            max_results: 100,
        }
    }

    #[test]
    fn test_query_pairs() {
        let pairs = query().query_pairs();
        assert_eq!(pairs[0], ("ids", "ga:12345".to_string()));
        assert!(pairs.contains(&("start-index", "201".to_string())));
        assert!(pairs.contains(&("max-results", "100".to_string())));
    }

    #[test]
    fn test_cache_id_depends_on_every_parameter() {
        let base = query();
        let mut other = query();
        other.start_index = 301;
        assert_eq!(base.cache_id(), query().cache_id());
        assert_ne!(base.cache_id(), other.cache_id());
        assert!(base.cache_id().starts_with("gac_report_"));
    }

    #[test]
    fn test_raw_report_conversion() {
        let raw: RawReport = serde_json::from_str(
            r#"{
                "rows": [["/node/1", "12"], ["/about", "3"], ["/broken"]],
                "totalResults": 250,
                "totalsForAllResults": {"ga:pageviews": "15"},
                "selfLink": "https://example.test/data/ga?start-index=1"
            }"#,
        )
        .unwrap();
        let page = ResultPage::from(raw);
        assert_eq!(page.rows, vec![("/node/1".into(), 12), ("/about".into(), 3)]);
        assert_eq!(page.total_results, 250);
        assert_eq!(page.total_pageviews, 15);
        assert!(page.data_last_refreshed.is_none());
        assert!(!page.has_error());
    }

    #[test]
    fn test_raw_error_is_kept() {
        let raw: RawReport = serde_json::from_str(
            r#"{"error": {"code": 403, "message": "User does not have permission"}}"#,
        )
        .unwrap();
        let page = ResultPage::from(raw);
        assert!(page.has_error());
        assert_eq!(
            page.error.as_deref(),
            Some("User does not have permission (403)")
        );
    }

    #[test]
    fn test_token_grant_defaults() {
        let grant: TokenGrant =
            serde_json::from_str(r#"{"access_token": "abc", "token_type": "Bearer"}"#).unwrap();
        assert_eq!(grant.expires_in, 3600);
        assert!(grant.refresh_token.is_none());
    }
}

//! 统计服务客户端
//!
//! `AnalyticsApi` 抽象报表、OAuth 令牌与管理接口，生产实现基于 ureq，
//! 同步请求放在 `spawn_blocking` 中执行。

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use ureq::Agent;
use url::Url;

use super::types::{
    ClientCredentials, ItemList, Profile, RawReport, ReportQuery, ResultPage, TokenError,
    TokenGrant, WebProperty,
};
use crate::config::ApiConfig;
use crate::errors::{CounterError, Result};

/// 只读统计权限
pub const ANALYTICS_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    /// 拉取一页报表；响应中的 `error` 字段原样保留，由调用方决定如何处理
    async fn query_report(&self, access_token: &str, query: &ReportQuery) -> Result<ResultPage>;

    /// 用授权码换取令牌
    async fn exchange_code(&self, creds: &ClientCredentials, code: &str) -> Result<TokenGrant>;

    /// 用刷新令牌换取新的访问令牌
    async fn refresh_token(
        &self,
        creds: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<TokenGrant>;

    async fn web_properties(&self, access_token: &str) -> Result<Vec<WebProperty>>;

    async fn profiles(&self, access_token: &str) -> Result<Vec<Profile>>;
}

/// 构建授权跳转地址
pub fn authorize_url(auth_url: &str, creds: &ClientCredentials, state: &str) -> Result<Url> {
    let mut url = Url::parse(auth_url)
        .map_err(|e| CounterError::configuration(format!("Invalid auth_url '{}': {}", auth_url, e)))?;
    url.query_pairs_mut()
        .append_pair("client_id", &creds.client_id)
        .append_pair("redirect_uri", &creds.redirect_uri)
        .append_pair("scope", ANALYTICS_SCOPE)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("approval_prompt", "force")
        .append_pair("state", state);
    Ok(url)
}

/// 全局 HTTP Agent（ureq 的 Agent 是 Send + Sync）
static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent(timeout_secs: u64) -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            // 4xx/5xx 的响应体里带有错误详情，需要读出来
            .http_status_as_error(false)
            .build()
            .into()
    })
}

/// 基于 ureq 的统计服务客户端
#[derive(Debug, Clone)]
pub struct GoogleAnalyticsApi {
    base_url: String,
    token_url: String,
    timeout_secs: u64,
}

impl GoogleAnalyticsApi {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    pub(crate) fn report_url(&self, query: &ReportQuery) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/data/ga", self.base_url)).map_err(|e| {
            CounterError::configuration(format!("Invalid api base_url '{}': {}", self.base_url, e))
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.query_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        Ok(url)
    }

    fn management_url(&self, path: &str) -> String {
        format!("{}/management/{}", self.base_url, path)
    }

    /// 在阻塞线程池中执行同步请求
    async fn blocking<T, F>(f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(f).await.map_err(|e| {
            warn!("Analytics request task failed: {}", e);
            CounterError::network(format!("Request task failed: {}", e))
        })?
    }

    fn get_json_sync<T: DeserializeOwned>(agent: &Agent, url: &str, token: &str) -> Result<T> {
        let resp = agent
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .call()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.into_body().read_to_string().unwrap_or_default();
            return Err(CounterError::api_response(format!(
                "GET {} returned {}: {}",
                url, status, body
            )));
        }

        resp.into_body()
            .read_json()
            .map_err(|e| CounterError::api_response(format!("Invalid response from {}: {}", url, e)))
    }

    fn token_request_sync(
        agent: &Agent,
        token_url: &str,
        form: Vec<(&'static str, String)>,
    ) -> Result<TokenGrant> {
        let resp = agent.post(token_url).send_form(form)?;
        let status = resp.status();
        let body = resp.into_body().read_to_string()?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                CounterError::authentication(format!("Invalid token response: {}", e))
            });
        }

        let message = match serde_json::from_str::<TokenError>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {}", err.error, desc),
                None => err.error,
            },
            Err(_) => format!("token endpoint returned {}", status),
        };
        Err(CounterError::authentication(message))
    }
}

#[async_trait]
impl AnalyticsApi for GoogleAnalyticsApi {
    async fn query_report(&self, access_token: &str, query: &ReportQuery) -> Result<ResultPage> {
        let url = self.report_url(query)?;
        let token = access_token.to_string();
        let timeout = self.timeout_secs;
        debug!("Requesting report: {}", url);

        Self::blocking(move || {
            let agent = get_agent(timeout);
            let resp = agent
                .get(url.as_str())
                .header("Authorization", format!("Bearer {}", token))
                .call()?;
            let status = resp.status();
            let body = resp.into_body().read_to_string()?;

            match serde_json::from_str::<RawReport>(&body) {
                Ok(raw) => {
                    let mut page = ResultPage::from(raw);
                    if !status.is_success() && !page.has_error() {
                        page.error = Some(format!("HTTP {}", status));
                    }
                    Ok(page)
                }
                Err(e) if status.is_success() => Err(CounterError::api_response(format!(
                    "Invalid report response: {}",
                    e
                ))),
                Err(_) => Err(CounterError::api_response(format!(
                    "Report request returned {}",
                    status
                ))),
            }
        })
        .await
    }

    async fn exchange_code(&self, creds: &ClientCredentials, code: &str) -> Result<TokenGrant> {
        let form = vec![
            ("code", code.to_string()),
            ("client_id", creds.client_id.clone()),
            ("client_secret", creds.client_secret.clone()),
            ("redirect_uri", creds.redirect_uri.clone()),
            ("grant_type", "authorization_code".to_string()),
        ];
        let token_url = self.token_url.clone();
        let timeout = self.timeout_secs;
        Self::blocking(move || Self::token_request_sync(get_agent(timeout), &token_url, form)).await
    }

    async fn refresh_token(
        &self,
        creds: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<TokenGrant> {
        let form = vec![
            ("refresh_token", refresh_token.to_string()),
            ("client_id", creds.client_id.clone()),
            ("client_secret", creds.client_secret.clone()),
            ("grant_type", "refresh_token".to_string()),
        ];
        let token_url = self.token_url.clone();
        let timeout = self.timeout_secs;
        Self::blocking(move || Self::token_request_sync(get_agent(timeout), &token_url, form)).await
    }

    async fn web_properties(&self, access_token: &str) -> Result<Vec<WebProperty>> {
        let url = self.management_url("accounts/~all/webproperties");
        let token = access_token.to_string();
        let timeout = self.timeout_secs;
        Self::blocking(move || {
            let list: ItemList<WebProperty> = Self::get_json_sync(get_agent(timeout), &url, &token)?;
            Ok(list.items)
        })
        .await
    }

    async fn profiles(&self, access_token: &str) -> Result<Vec<Profile>> {
        let url = self.management_url("accounts/~all/webproperties/~all/profiles");
        let token = access_token.to_string();
        let timeout = self.timeout_secs;
        Self::blocking(move || {
            let list: ItemList<Profile> = Self::get_json_sync(get_agent(timeout), &url, &token)?;
            Ok(list.items)
        })
        .await
    }
}

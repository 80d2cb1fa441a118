//! OAuth 令牌管理
//!
//! 取得可用访问令牌的顺序：
//! 1. 未过期的已存访问令牌
//! 2. 刷新令牌换取新访问令牌
//! 3. 回调携带的授权码换取全部令牌
//!
//! 每一步失败都只记录提示并返回 `None`，不做重试。
//!
//! 浏览器跳转回来的授权码必须带上 `begin` 时生成的一次性 state。

use std::collections::HashMap;
use std::sync::Arc;

use rand::RngExt;
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use url::Url;

use super::notices::Notices;
use super::state::CounterState;
use crate::analytics::{AnalyticsApi, ClientCredentials, authorize_url};
use crate::config::CounterSettings;
use crate::errors::{CounterError, Result};

/// 已认证的报表访问句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    access_token: String,
}

impl Feed {
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// 视图下拉选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyOption {
    /// 所属媒体资源名称；未认证时为 `None`
    pub group: Option<String>,
    pub value: String,
    pub label: String,
}

impl PropertyOption {
    fn unauthenticated() -> Self {
        Self {
            group: None,
            value: "unauthenticated".to_string(),
            label: "Unauthenticated".to_string(),
        }
    }
}

/// 生成授权 state（16 bytes，hex 编码）
fn generate_auth_state() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn credentials(settings: &CounterSettings) -> ClientCredentials {
    ClientCredentials {
        client_id: settings.client_id.clone(),
        client_secret: settings.client_secret.clone(),
        redirect_uri: settings.redirect_uri.clone(),
    }
}

pub struct AuthManager {
    api: Arc<dyn AnalyticsApi>,
    state: CounterState,
    notices: Arc<Notices>,
    auth_url: String,
}

impl AuthManager {
    pub fn new(
        api: Arc<dyn AnalyticsApi>,
        state: CounterState,
        notices: Arc<Notices>,
        auth_url: impl Into<String>,
    ) -> Self {
        Self {
            api,
            state,
            notices,
            auth_url: auth_url.into(),
        }
    }

    /// 是否保存了访问令牌（不检查是否过期）
    pub async fn is_authenticated(&self) -> Result<bool> {
        self.state.has_access_token().await
    }

    /// 获取可用的报表句柄
    ///
    /// 认证失败只产生提示并返回 `Ok(None)`；状态存储本身出错时返回 `Err`。
    pub async fn obtain_feed(
        &self,
        settings: &CounterSettings,
        authorization_code: Option<&str>,
        now: i64,
    ) -> Result<Option<Feed>> {
        let tokens = self.state.tokens().await?;

        if let (Some(access_token), Some(expires_at)) = (&tokens.access_token, tokens.expires_at)
            && now < expires_at
        {
            return Ok(Some(Feed {
                access_token: access_token.clone(),
            }));
        }

        if let Some(refresh_token) = tokens.refresh_token {
            debug!("Access token expired, refreshing");
            return match self
                .api
                .refresh_token(&credentials(settings), &refresh_token)
                .await
            {
                Ok(grant) => {
                    let expires_at = now.saturating_add(grant.expires_in);
                    self.state
                        .save_tokens(&grant.access_token, grant.refresh_token.as_deref(), expires_at)
                        .await?;
                    Ok(Some(Feed {
                        access_token: grant.access_token,
                    }))
                }
                Err(e) => {
                    self.notices.error(format!(
                        "There was an authentication error. Message: {}",
                        e.message()
                    ));
                    Ok(None)
                }
            };
        }

        if let Some(code) = authorization_code.map(str::trim).filter(|c| !c.is_empty()) {
            return match self.api.exchange_code(&credentials(settings), code).await {
                Ok(grant) => {
                    let expires_at = now.saturating_add(grant.expires_in);
                    self.state
                        .save_tokens(&grant.access_token, grant.refresh_token.as_deref(), expires_at)
                        .await?;
                    self.notices.status("You have been successfully authenticated.");
                    Ok(Some(Feed {
                        access_token: grant.access_token,
                    }))
                }
                Err(e) => {
                    self.notices.error(format!(
                        "There was an authentication error. Message: {}",
                        e.message()
                    ));
                    Ok(None)
                }
            };
        }

        Ok(None)
    }

    /// 授权跳转地址；客户端凭据不完整时拒绝
    ///
    /// 每次调用生成新的 state 并覆盖之前未完成的授权。
    pub async fn authorization_url(&self, settings: &CounterSettings) -> Result<Url> {
        let creds = credentials(settings);
        if !creds.is_complete() {
            return Err(CounterError::configuration(
                "client_id, client_secret and redirect_uri must be set before authenticating",
            ));
        }
        let state = generate_auth_state();
        let url = authorize_url(&self.auth_url, &creds, &state)?;
        self.state.set_pending_auth_state(&state).await?;
        Ok(url)
    }

    /// 完成浏览器跳转：校验 state 后用授权码换取令牌
    pub async fn complete_redirect(
        &self,
        settings: &CounterSettings,
        code: &str,
        state: &str,
        now: i64,
    ) -> Result<bool> {
        let pending = self.state.take_pending_auth_state().await?;
        let matches = pending
            .as_deref()
            .is_some_and(|expected| bool::from(expected.as_bytes().ct_eq(state.as_bytes())));
        if !matches {
            warn!("OAuth redirect rejected: no matching pending authorization");
            return Err(CounterError::authentication(
                "No pending authorization matches this redirect, start the authentication again",
            ));
        }
        Ok(self.obtain_feed(settings, Some(code), now).await?.is_some())
    }

    /// 清空令牌与抓取状态
    pub async fn revoke(&self) -> Result<()> {
        self.state.clear_revocable().await?;
        self.notices
            .status("Analytics authentication has been revoked.");
        Ok(())
    }

    /// 列出可选视图，按媒体资源分组
    pub async fn web_property_options(
        &self,
        settings: &CounterSettings,
        now: i64,
    ) -> Result<Vec<PropertyOption>> {
        let Some(feed) = self.obtain_feed(settings, None, now).await? else {
            return Ok(vec![PropertyOption::unauthenticated()]);
        };

        let properties = self.api.web_properties(feed.access_token()).await?;
        let profiles = self.api.profiles(feed.access_token()).await?;

        let names: HashMap<&str, &str> = properties
            .iter()
            .map(|p| (p.id.as_str(), p.name.as_str()))
            .collect();

        let mut options: Vec<PropertyOption> = profiles
            .iter()
            .map(|profile| PropertyOption {
                group: Some(
                    names
                        .get(profile.web_property_id.as_str())
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| profile.web_property_id.clone()),
                ),
                value: profile.id.clone(),
                label: format!("{} ({})", profile.name, profile.id),
            })
            .collect();
        options.sort_by(|a, b| a.group.cmp(&b.group));
        Ok(options)
    }
}

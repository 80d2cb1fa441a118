//! Admin API 类型定义

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{CounterSettings, StartDate};
use crate::counter::Notice;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 认证设置视图，不回显密钥
#[derive(Serialize, Clone, Debug)]
pub struct AuthSettingsView {
    pub authenticated: bool,
    pub client_id: String,
    pub client_secret_set: bool,
    pub redirect_uri: String,
    pub profile_id: String,
    pub profile_id_prefill: String,
    pub project_name: String,
}

impl AuthSettingsView {
    pub fn new(settings: &CounterSettings, authenticated: bool) -> Self {
        Self {
            authenticated,
            client_id: settings.client_id.clone(),
            client_secret_set: !settings.client_secret.is_empty(),
            redirect_uri: settings.redirect_uri.clone(),
            profile_id: settings.profile_id.clone(),
            profile_id_prefill: settings.profile_id_prefill.clone(),
            project_name: settings.project_name.clone(),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct GeneralSettingsView {
    pub cron_interval: u32,
    pub chunk_to_fetch: u32,
    pub api_dayquota: u32,
    pub cache_length_hours: u64,
    pub queue_time: u64,
    pub start_date: StartDate,
    pub start_date_options: Vec<&'static str>,
    pub advanced_date_checkbox: bool,
    pub fixed_start_date: Option<String>,
    pub fixed_end_date: Option<String>,
}

impl From<&CounterSettings> for GeneralSettingsView {
    fn from(settings: &CounterSettings) -> Self {
        Self {
            cron_interval: settings.cron_interval,
            chunk_to_fetch: settings.chunk_to_fetch,
            api_dayquota: settings.api_dayquota,
            cache_length_hours: settings.cache_length / 3600,
            queue_time: settings.queue_time,
            start_date: settings.start_date,
            start_date_options: StartDate::options(),
            advanced_date_checkbox: settings.advanced_date_checkbox,
            fixed_start_date: settings.fixed_start_date.map(|d| d.to_string()),
            fixed_end_date: settings.fixed_end_date.map(|d| d.to_string()),
        }
    }
}

/// bundle → 是否启用镜像字段
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TypesSettings {
    pub bundles: BTreeMap<String, bool>,
}

#[derive(Serialize, Clone, Debug)]
pub struct AuthUrlResponse {
    pub authorization_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct AuthCallbackResponse {
    pub authenticated: bool,
    pub notices: Vec<Notice>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct CronQuery {
    #[serde(default)]
    pub force: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct PurgeResponse {
    pub purged: u64,
}

#[derive(Serialize, Clone, Debug)]
pub struct RegisteredResponse {
    pub registered: usize,
}

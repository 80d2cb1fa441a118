//! 运行时设置
//!
//! `SettingsManager` 负责 `gac_settings` 表的初始化、读取和校验后写入；
//! `CounterSettings` 是一次加载得到的强类型快照，各服务按调用传入。

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::definitions::{
    ALL_CONFIGS, CACHE_LENGTH_MAX_HOURS, bundle_toggle_key, get_def, is_bundle_toggle_key, keys,
};
use super::types::{StartDate, ValueType};
use super::validators::{parse_bool, validate_config_value};
use crate::errors::{CounterError, Result};
use crate::storage::ConfigStore;

/// 强类型设置快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterSettings {
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub redirect_uri: String,
    pub profile_id: String,
    pub profile_id_prefill: String,
    pub project_name: String,
    /// 分钟
    pub cron_interval: u32,
    pub chunk_to_fetch: u32,
    pub api_dayquota: u32,
    /// 秒
    pub cache_length: u64,
    /// 秒
    pub queue_time: u64,
    pub start_date: StartDate,
    pub advanced_date_checkbox: bool,
    pub fixed_start_date: Option<NaiveDate>,
    pub fixed_end_date: Option<NaiveDate>,
    /// 启用了镜像计数字段的内容类型
    pub enabled_bundles: Vec<String>,
}

impl CounterSettings {
    /// 从 key → value 映射构建，缺失或无法解析的值回退到默认值
    pub fn from_values(values: &HashMap<String, String>) -> Self {
        let raw = |key: &str| -> String {
            values.get(key).cloned().unwrap_or_else(|| {
                get_def(key)
                    .map(|def| def.default_value.to_string())
                    .unwrap_or_default()
            })
        };
        let int = |key: &str| -> i64 {
            raw(key).trim().parse().unwrap_or_else(|_| {
                get_def(key)
                    .and_then(|def| def.default_value.parse().ok())
                    .unwrap_or(0)
            })
        };
        let date = |key: &str| NaiveDate::parse_from_str(&raw(key), "%Y-%m-%d").ok();

        let mut enabled_bundles: Vec<String> = values
            .iter()
            .filter(|(k, v)| is_bundle_toggle_key(k) && parse_bool(v).unwrap_or(false))
            .filter_map(|(k, _)| k.strip_prefix(keys::TYPES_PREFIX).map(String::from))
            .collect();
        enabled_bundles.sort();

        Self {
            client_id: raw(keys::AUTH_CLIENT_ID),
            client_secret: raw(keys::AUTH_CLIENT_SECRET),
            redirect_uri: raw(keys::AUTH_REDIRECT_URI),
            profile_id: raw(keys::AUTH_PROFILE_ID),
            profile_id_prefill: raw(keys::AUTH_PROFILE_ID_PREFILL),
            project_name: raw(keys::AUTH_PROJECT_NAME),
            cron_interval: int(keys::GENERAL_CRON_INTERVAL).clamp(0, 10000) as u32,
            chunk_to_fetch: int(keys::GENERAL_CHUNK_TO_FETCH).clamp(1, 10000) as u32,
            api_dayquota: int(keys::GENERAL_API_DAYQUOTA).clamp(1, 10000) as u32,
            cache_length: int(keys::GENERAL_CACHE_LENGTH).max(0) as u64,
            queue_time: int(keys::GENERAL_QUEUE_TIME).max(1) as u64,
            start_date: raw(keys::GENERAL_START_DATE).parse().unwrap_or_default(),
            advanced_date_checkbox: parse_bool(&raw(keys::GENERAL_ADVANCED_DATE_CHECKBOX))
                .unwrap_or(false),
            fixed_start_date: date(keys::GENERAL_FIXED_START_DATE),
            fixed_end_date: date(keys::GENERAL_FIXED_END_DATE),
            enabled_bundles,
        }
    }

    /// OAuth 流程所需的客户端凭据是否齐全
    pub fn has_client_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.redirect_uri.is_empty()
    }

    /// 统计服务控制台中本项目的配额页面
    pub fn project_quota_url(&self) -> Option<String> {
        if self.project_name.is_empty() {
            return None;
        }
        Some(format!(
            "https://console.developers.google.com/apis/api/analytics.googleapis.com/quotas?project={}",
            self.project_name
        ))
    }
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self::from_values(&HashMap::new())
    }
}

/// 认证设置更新请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettingsUpdate {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub profile_id: Option<String>,
    pub profile_id_prefill: Option<String>,
    pub project_name: Option<String>,
}

/// 常规设置更新请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralSettingsUpdate {
    pub cron_interval: Option<i64>,
    pub chunk_to_fetch: Option<i64>,
    pub api_dayquota: Option<i64>,
    /// 小时，存储时换算为秒
    pub cache_length_hours: Option<i64>,
    pub queue_time: Option<i64>,
    pub start_date: Option<String>,
    pub advanced_date_checkbox: Option<bool>,
    pub fixed_start_date: Option<String>,
    pub fixed_end_date: Option<String>,
}

/// 设置管理器
pub struct SettingsManager {
    store: ConfigStore,
}

impl SettingsManager {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            store: ConfigStore::new(db),
        }
    }

    /// 写入缺失设置项的默认值，返回新写入的数量
    pub async fn init_defaults(&self) -> Result<usize> {
        let mut inserted = 0;
        for def in ALL_CONFIGS {
            if self
                .store
                .insert_if_not_exists(def.key, def.default_value, def.value_type, def.is_sensitive)
                .await?
            {
                inserted += 1;
            }
        }
        if inserted > 0 {
            info!("Initialized {} default settings", inserted);
        } else {
            debug!("All settings already present");
        }
        Ok(inserted)
    }

    pub async fn load(&self) -> Result<CounterSettings> {
        let values: HashMap<String, String> = self
            .store
            .get_all()
            .await?
            .into_iter()
            .map(|(k, item)| (k, item.value))
            .collect();
        Ok(CounterSettings::from_values(&values))
    }

    /// 校验后写入单个设置
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_config_value(key, value)
            .map_err(|e| CounterError::validation(format!("Invalid value for '{}': {}", key, e)))?;

        let (value_type, is_sensitive) = match get_def(key) {
            Some(def) => (def.value_type, def.is_sensitive),
            None => (ValueType::Bool, false),
        };
        self.store.set(key, value, value_type, is_sensitive).await
    }

    /// 更新认证设置
    ///
    /// 已认证时不允许修改客户端凭据，需先撤销认证。
    pub async fn update_auth(
        &self,
        update: AuthSettingsUpdate,
        authenticated: bool,
    ) -> Result<CounterSettings> {
        let current = self.load().await?;

        if authenticated {
            let locked = [
                (&update.client_id, &current.client_id, "client_id"),
                (&update.client_secret, &current.client_secret, "client_secret"),
                (&update.redirect_uri, &current.redirect_uri, "redirect_uri"),
            ];
            for (new, old, name) in locked {
                if let Some(new) = new
                    && new != old
                {
                    return Err(CounterError::configuration(format!(
                        "{} cannot be changed while authenticated; revoke authentication first",
                        name
                    )));
                }
            }
        }

        let pairs = [
            (keys::AUTH_CLIENT_ID, update.client_id),
            (keys::AUTH_CLIENT_SECRET, update.client_secret),
            (keys::AUTH_REDIRECT_URI, update.redirect_uri),
            (keys::AUTH_PROFILE_ID, update.profile_id),
            (keys::AUTH_PROFILE_ID_PREFILL, update.profile_id_prefill),
            (keys::AUTH_PROJECT_NAME, update.project_name),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                self.set(key, value.trim()).await?;
            }
        }

        self.load().await
    }

    /// 更新常规设置
    ///
    /// 所有字段先整体校验再写入，任一字段不合法则不写入任何字段。
    pub async fn update_general(&self, update: GeneralSettingsUpdate) -> Result<CounterSettings> {
        let mut pairs: Vec<(&'static str, String)> = Vec::new();

        let ints = [
            (keys::GENERAL_CRON_INTERVAL, update.cron_interval),
            (keys::GENERAL_CHUNK_TO_FETCH, update.chunk_to_fetch),
            (keys::GENERAL_API_DAYQUOTA, update.api_dayquota),
            (keys::GENERAL_QUEUE_TIME, update.queue_time),
        ];
        for (key, value) in ints {
            if let Some(value) = value {
                pairs.push((key, value.to_string()));
            }
        }

        if let Some(hours) = update.cache_length_hours {
            if !(0..=CACHE_LENGTH_MAX_HOURS).contains(&hours) {
                return Err(CounterError::validation(format!(
                    "cache_length_hours must be between 0 and {}, got {}",
                    CACHE_LENGTH_MAX_HOURS, hours
                )));
            }
            pairs.push((keys::GENERAL_CACHE_LENGTH, (hours * 3600).to_string()));
        }

        if let Some(start_date) = update.start_date {
            pairs.push((keys::GENERAL_START_DATE, start_date));
        }

        let current = self.load().await?;
        let advanced = update
            .advanced_date_checkbox
            .unwrap_or(current.advanced_date_checkbox);
        pairs.push((keys::GENERAL_ADVANCED_DATE_CHECKBOX, advanced.to_string()));

        if advanced {
            let start = update
                .fixed_start_date
                .or_else(|| current.fixed_start_date.map(|d| d.to_string()))
                .unwrap_or_default();
            let end = update
                .fixed_end_date
                .or_else(|| current.fixed_end_date.map(|d| d.to_string()))
                .unwrap_or_default();
            if start.is_empty() || end.is_empty() {
                return Err(CounterError::validation(
                    "fixed_start_date and fixed_end_date are required when advanced dates are enabled",
                ));
            }
            if let (Ok(s), Ok(e)) = (
                NaiveDate::parse_from_str(&start, "%Y-%m-%d"),
                NaiveDate::parse_from_str(&end, "%Y-%m-%d"),
            ) && s > e
            {
                return Err(CounterError::validation(
                    "fixed_start_date must not be after fixed_end_date",
                ));
            }
            pairs.push((keys::GENERAL_FIXED_START_DATE, start));
            pairs.push((keys::GENERAL_FIXED_END_DATE, end));
        } else {
            // 未勾选时清空固定日期
            pairs.push((keys::GENERAL_FIXED_START_DATE, String::new()));
            pairs.push((keys::GENERAL_FIXED_END_DATE, String::new()));
        }

        for (key, value) in &pairs {
            validate_config_value(key, value).map_err(|e| {
                CounterError::validation(format!("Invalid value for '{}': {}", key, e))
            })?;
        }
        for (key, value) in &pairs {
            self.set(key, value).await?;
        }

        self.load().await
    }

    /// 设置内容类型的镜像字段开关
    pub async fn set_bundle_enabled(&self, bundle: &str, enabled: bool) -> Result<()> {
        let bundle = bundle.trim();
        if bundle.is_empty()
            || !bundle
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(CounterError::validation(format!(
                "Invalid content type name '{}'",
                bundle
            )));
        }
        self.set(&bundle_toggle_key(bundle), &enabled.to_string())
            .await
    }

    /// 撤销认证时清空的凭据类设置
    pub async fn clear_credentials(&self) -> Result<()> {
        for key in [
            keys::AUTH_CLIENT_ID,
            keys::AUTH_CLIENT_SECRET,
            keys::AUTH_REDIRECT_URI,
            keys::AUTH_PROFILE_ID,
            keys::AUTH_PROJECT_NAME,
        ] {
            self.set(key, "").await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = CounterSettings::default();
        assert_eq!(settings.chunk_to_fetch, 1000);
        assert_eq!(settings.cron_interval, 30);
        assert_eq!(settings.cache_length, 86400);
        assert_eq!(settings.queue_time, 120);
        assert_eq!(settings.start_date, StartDate::OneDay);
        assert!(settings.enabled_bundles.is_empty());
        assert!(!settings.has_client_credentials());
    }

    #[test]
    fn test_invalid_stored_values_fall_back() {
        let settings = CounterSettings::from_values(&values(&[
            (keys::GENERAL_CHUNK_TO_FETCH, "abc"),
            (keys::GENERAL_START_DATE, "yesterday"),
            (keys::GENERAL_FIXED_START_DATE, "not-a-date"),
        ]));
        assert_eq!(settings.chunk_to_fetch, 1000);
        assert_eq!(settings.start_date, StartDate::OneDay);
        assert!(settings.fixed_start_date.is_none());
    }

    #[test]
    fn test_enabled_bundles_sorted() {
        let settings = CounterSettings::from_values(&values(&[
            ("types.page", "true"),
            ("types.article", "1"),
            ("types.blog", "false"),
        ]));
        assert_eq!(settings.enabled_bundles, vec!["article", "page"]);
    }

    #[test]
    fn test_project_quota_url() {
        let mut settings = CounterSettings::default();
        assert!(settings.project_quota_url().is_none());
        settings.project_name = "my-project".into();
        assert_eq!(
            settings.project_quota_url().unwrap(),
            "https://console.developers.google.com/apis/api/analytics.googleapis.com/quotas?project=my-project"
        );
    }
}

//! 运行时设置定义 - 单一数据源
//!
//! 所有存储在 `gac_settings` 表中的设置项都在这里定义：
//! key、值类型、默认值、取值范围与分类。
//!
//! 内容类型开关（`types.{bundle}`）是动态 key，不在 `ALL_CONFIGS` 中，
//! 由 `is_bundle_toggle_key` 识别。

use super::types::{StartDate, ValueType};

/// 设置分类常量
pub mod categories {
    pub const AUTH: &str = "auth";
    pub const GENERAL: &str = "general";
    pub const TYPES: &str = "types";
}

/// 设置项完整定义
pub struct ConfigDef {
    /// 设置键，如 "general.chunk_to_fetch"
    pub key: &'static str,
    pub value_type: ValueType,
    pub default_value: &'static str,
    /// 是否敏感（如 client secret）
    pub is_sensitive: bool,
    /// 整数类型的闭区间取值范围
    pub range: Option<(i64, i64)>,
    pub category: &'static str,
    pub description: &'static str,
}

/// Key 常量
pub mod keys {
    // OAuth 认证
    pub const AUTH_CLIENT_ID: &str = "auth.client_id";
    pub const AUTH_CLIENT_SECRET: &str = "auth.client_secret";
    pub const AUTH_REDIRECT_URI: &str = "auth.redirect_uri";
    pub const AUTH_PROFILE_ID: &str = "auth.profile_id";
    pub const AUTH_PROFILE_ID_PREFILL: &str = "auth.profile_id_prefill";
    pub const AUTH_PROJECT_NAME: &str = "auth.project_name";

    // 抓取参数
    pub const GENERAL_CRON_INTERVAL: &str = "general.cron_interval";
    pub const GENERAL_CHUNK_TO_FETCH: &str = "general.chunk_to_fetch";
    pub const GENERAL_API_DAYQUOTA: &str = "general.api_dayquota";
    pub const GENERAL_CACHE_LENGTH: &str = "general.cache_length";
    pub const GENERAL_QUEUE_TIME: &str = "general.queue_time";
    pub const GENERAL_START_DATE: &str = "general.start_date";
    pub const GENERAL_ADVANCED_DATE_CHECKBOX: &str = "general.advanced_date_checkbox";
    pub const GENERAL_FIXED_START_DATE: &str = "general.fixed_start_date";
    pub const GENERAL_FIXED_END_DATE: &str = "general.fixed_end_date";

    /// 内容类型开关前缀
    pub const TYPES_PREFIX: &str = "types.";
}

/// cache_length 的上限（小时）
pub const CACHE_LENGTH_MAX_HOURS: i64 = 730;

pub static ALL_CONFIGS: &[ConfigDef] = &[
    ConfigDef {
        key: keys::AUTH_CLIENT_ID,
        value_type: ValueType::String,
        default_value: "",
        is_sensitive: false,
        range: None,
        category: categories::AUTH,
        description: "OAuth client ID of the analytics API project",
    },
    ConfigDef {
        key: keys::AUTH_CLIENT_SECRET,
        value_type: ValueType::String,
        default_value: "",
        is_sensitive: true,
        range: None,
        category: categories::AUTH,
        description: "OAuth client secret of the analytics API project",
    },
    ConfigDef {
        key: keys::AUTH_REDIRECT_URI,
        value_type: ValueType::String,
        default_value: "",
        is_sensitive: false,
        range: None,
        category: categories::AUTH,
        description: "Redirect URI registered for the OAuth client",
    },
    ConfigDef {
        key: keys::AUTH_PROFILE_ID,
        value_type: ValueType::String,
        default_value: "",
        is_sensitive: false,
        range: None,
        category: categories::AUTH,
        description: "Analytics view (profile) to query",
    },
    ConfigDef {
        key: keys::AUTH_PROFILE_ID_PREFILL,
        value_type: ValueType::String,
        default_value: "",
        is_sensitive: false,
        range: None,
        category: categories::AUTH,
        description: "View ID copied into the selected view when authentication begins",
    },
    ConfigDef {
        key: keys::AUTH_PROJECT_NAME,
        value_type: ValueType::String,
        default_value: "",
        is_sensitive: false,
        range: None,
        category: categories::AUTH,
        description: "API project name, used for the quota console link",
    },
    ConfigDef {
        key: keys::GENERAL_CRON_INTERVAL,
        value_type: ValueType::Int,
        default_value: "30",
        is_sensitive: false,
        range: Some((0, 10000)),
        category: categories::GENERAL,
        description: "Minimum minutes between cron runs that do work",
    },
    ConfigDef {
        key: keys::GENERAL_CHUNK_TO_FETCH,
        value_type: ValueType::Int,
        default_value: "1000",
        is_sensitive: false,
        range: Some((1, 10000)),
        category: categories::GENERAL,
        description: "Number of paths requested per API call",
    },
    ConfigDef {
        key: keys::GENERAL_API_DAYQUOTA,
        value_type: ValueType::Int,
        default_value: "10000",
        is_sensitive: false,
        range: Some((1, 10000)),
        category: categories::GENERAL,
        description: "Maximum API calls per day",
    },
    ConfigDef {
        key: keys::GENERAL_CACHE_LENGTH,
        value_type: ValueType::Int,
        default_value: "86400",
        is_sensitive: false,
        range: Some((0, CACHE_LENGTH_MAX_HOURS * 3600)),
        category: categories::GENERAL,
        description: "Seconds an API response stays cached",
    },
    ConfigDef {
        key: keys::GENERAL_QUEUE_TIME,
        value_type: ValueType::Int,
        default_value: "120",
        is_sensitive: false,
        range: Some((1, 10000)),
        category: categories::GENERAL,
        description: "Seconds the queue may run during one cron invocation",
    },
    ConfigDef {
        key: keys::GENERAL_START_DATE,
        value_type: ValueType::Enum,
        default_value: "-1 day",
        is_sensitive: false,
        range: None,
        category: categories::GENERAL,
        description: "Relative start of the reporting date range",
    },
    ConfigDef {
        key: keys::GENERAL_ADVANCED_DATE_CHECKBOX,
        value_type: ValueType::Bool,
        default_value: "false",
        is_sensitive: false,
        range: None,
        category: categories::GENERAL,
        description: "Use fixed start and end dates instead of the relative start date",
    },
    ConfigDef {
        key: keys::GENERAL_FIXED_START_DATE,
        value_type: ValueType::Date,
        default_value: "",
        is_sensitive: false,
        range: None,
        category: categories::GENERAL,
        description: "Fixed start date (YYYY-MM-DD)",
    },
    ConfigDef {
        key: keys::GENERAL_FIXED_END_DATE,
        value_type: ValueType::Date,
        default_value: "",
        is_sensitive: false,
        range: None,
        category: categories::GENERAL,
        description: "Fixed end date (YYYY-MM-DD)",
    },
];

/// 根据 key 查找设置定义
pub fn get_def(key: &str) -> Option<&'static ConfigDef> {
    ALL_CONFIGS.iter().find(|def| def.key == key)
}

/// 是否为内容类型开关 key（`types.{bundle}`）
pub fn is_bundle_toggle_key(key: &str) -> bool {
    key.strip_prefix(keys::TYPES_PREFIX)
        .is_some_and(|bundle| !bundle.is_empty())
}

/// 内容类型开关 key
pub fn bundle_toggle_key(bundle: &str) -> String {
    format!("{}{}", keys::TYPES_PREFIX, bundle)
}

/// 枚举类型设置的可选值
pub fn enum_options(key: &str) -> Option<Vec<&'static str>> {
    match key {
        keys::GENERAL_START_DATE => Some(StartDate::options()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for def in ALL_CONFIGS {
            assert!(seen.insert(def.key), "duplicate key {}", def.key);
        }
    }

    #[test]
    fn test_defaults_are_within_range() {
        for def in ALL_CONFIGS {
            if let Some((min, max)) = def.range {
                let value: i64 = def.default_value.parse().unwrap();
                assert!(value >= min && value <= max, "{} out of range", def.key);
            }
        }
    }

    #[test]
    fn test_bundle_toggle_key() {
        assert!(is_bundle_toggle_key("types.article"));
        assert!(!is_bundle_toggle_key("types."));
        assert!(!is_bundle_toggle_key("general.queue_time"));
        assert_eq!(bundle_toggle_key("page"), "types.page");
    }
}

//! 设置值验证模块
//!
//! 基于 `definitions` 中的类型与范围验证设置值。

use chrono::NaiveDate;

use super::ValueType;
use super::definitions::{enum_options, get_def, is_bundle_toggle_key};

/// 根据设置 key 验证值是否合法
pub fn validate_config_value(key: &str, value: &str) -> Result<(), String> {
    if is_bundle_toggle_key(key) {
        return parse_bool(value).map(|_| ());
    }

    let def = get_def(key).ok_or_else(|| format!("Unknown setting '{}'", key))?;

    match def.value_type {
        ValueType::String => Ok(()),
        ValueType::Bool => parse_bool(value).map(|_| ()),
        ValueType::Int => {
            let parsed: i64 = value
                .trim()
                .parse()
                .map_err(|_| format!("'{}' is not an integer", value))?;
            if let Some((min, max)) = def.range
                && (parsed < min || parsed > max)
            {
                return Err(format!(
                    "{} must be between {} and {}, got {}",
                    key, min, max, parsed
                ));
            }
            Ok(())
        }
        ValueType::Enum => {
            let options = enum_options(key).unwrap_or_default();
            if options.contains(&value) {
                Ok(())
            } else {
                Err(format!(
                    "Invalid value '{}'. Valid options: {}",
                    value,
                    options.join(", ")
                ))
            }
        }
        ValueType::Date => {
            if value.is_empty() {
                return Ok(());
            }
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| format!("'{}' is not a date in YYYY-MM-DD format", value))
        }
    }
}

/// 宽松解析 bool 值
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(format!("'{}' is not a boolean", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys;

    #[test]
    fn test_int_range() {
        assert!(validate_config_value(keys::GENERAL_CHUNK_TO_FETCH, "1").is_ok());
        assert!(validate_config_value(keys::GENERAL_CHUNK_TO_FETCH, "10000").is_ok());
        assert!(validate_config_value(keys::GENERAL_CHUNK_TO_FETCH, "0").is_err());
        assert!(validate_config_value(keys::GENERAL_CHUNK_TO_FETCH, "10001").is_err());
        assert!(validate_config_value(keys::GENERAL_CRON_INTERVAL, "0").is_ok());
        assert!(validate_config_value(keys::GENERAL_CRON_INTERVAL, "abc").is_err());
    }

    #[test]
    fn test_enum_options() {
        assert!(validate_config_value(keys::GENERAL_START_DATE, "-1 week").is_ok());
        assert!(validate_config_value(keys::GENERAL_START_DATE, "2005-01-01").is_ok());
        assert!(validate_config_value(keys::GENERAL_START_DATE, "-2 weeks").is_err());
    }

    #[test]
    fn test_dates() {
        assert!(validate_config_value(keys::GENERAL_FIXED_START_DATE, "").is_ok());
        assert!(validate_config_value(keys::GENERAL_FIXED_START_DATE, "2024-02-29").is_ok());
        assert!(validate_config_value(keys::GENERAL_FIXED_END_DATE, "2023-02-29").is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(validate_config_value("general.nope", "1").is_err());
    }

    #[test]
    fn test_bundle_toggle_values() {
        assert!(validate_config_value("types.article", "true").is_ok());
        assert!(validate_config_value("types.article", "maybe").is_err());
    }
}

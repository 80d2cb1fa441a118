//! 配置类型定义模块

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// 配置值类型枚举
///
/// 用于标识配置项在数据库中的类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Int,
    Bool,
    Enum,
    /// `YYYY-MM-DD` 日期，允许为空
    Date,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::Enum => write!(f, "enum"),
            Self::Date => write!(f, "date"),
        }
    }
}

impl std::str::FromStr for ValueType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "int" => Ok(Self::Int),
            "bool" => Ok(Self::Bool),
            "enum" => Ok(Self::Enum),
            "date" => Ok(Self::Date),
            _ => Err(format!("Unknown value type: {}", s)),
        }
    }
}

/// 相对起始日期选项
///
/// 序列化值即为存储在设置表中的字符串。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter)]
pub enum StartDate {
    #[default]
    #[serde(rename = "-1 day")]
    OneDay,
    #[serde(rename = "-1 week")]
    OneWeek,
    #[serde(rename = "-1 month")]
    OneMonth,
    #[serde(rename = "-3 months")]
    ThreeMonths,
    #[serde(rename = "-6 months")]
    SixMonths,
    #[serde(rename = "-1 year")]
    OneYear,
    /// 统计服务上线以来的全部数据
    #[serde(rename = "2005-01-01")]
    Since2005,
}

impl StartDate {
    /// 所有可选值（用于校验与 Admin API 展示）
    pub fn options() -> Vec<&'static str> {
        Self::iter().map(|v| v.as_str()).collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "-1 day",
            Self::OneWeek => "-1 week",
            Self::OneMonth => "-1 month",
            Self::ThreeMonths => "-3 months",
            Self::SixMonths => "-6 months",
            Self::OneYear => "-1 year",
            Self::Since2005 => "2005-01-01",
        }
    }
}

impl std::fmt::Display for StartDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StartDate {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter().find(|v| v.as_str() == s).ok_or_else(|| {
            format!(
                "Invalid start date: '{}'. Valid: {}",
                s,
                Self::options().join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_date_roundtrip() {
        for option in StartDate::options() {
            let parsed: StartDate = option.parse().unwrap();
            assert_eq!(parsed.to_string(), option);
        }
    }

    #[test]
    fn test_start_date_rejects_unknown() {
        assert!("-2 weeks".parse::<StartDate>().is_err());
    }

    #[test]
    fn test_value_type_roundtrip() {
        for vt in ["string", "int", "bool", "enum", "date"] {
            let parsed: ValueType = vt.parse().unwrap();
            assert_eq!(parsed.to_string(), vt);
        }
    }
}

//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::CounterError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 统计服务错误
/// - 4000-4099: 存储与队列错误
/// - 5000-5099: 设置错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,

    AuthFailed = 2000,

    AnalyticsRequestFailed = 3000,
    AnalyticsUnreachable = 3001,

    DatabaseError = 4000,
    QueueError = 4001,

    SettingsInvalid = 5000,
    SettingsLocked = 5001,
}

impl From<&CounterError> for ErrorCode {
    fn from(err: &CounterError) -> Self {
        match err {
            CounterError::Authentication(_) => ErrorCode::AuthFailed,
            CounterError::ApiResponse(_) => ErrorCode::AnalyticsRequestFailed,
            CounterError::Network(_) => ErrorCode::AnalyticsUnreachable,
            CounterError::Configuration(_) => ErrorCode::SettingsLocked,
            CounterError::Validation(_) => ErrorCode::SettingsInvalid,
            CounterError::NotFound(_) => ErrorCode::NotFound,
            CounterError::Queue(_) => ErrorCode::QueueError,
            CounterError::DatabaseConfig(_)
            | CounterError::DatabaseConnection(_)
            | CounterError::DatabaseOperation(_) => ErrorCode::DatabaseError,
            CounterError::Serialization(_) | CounterError::FileOperation(_) => {
                ErrorCode::InternalServerError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::AuthFailed).unwrap(), "2000");
        assert_eq!(serde_json::to_string(&ErrorCode::Success).unwrap(), "0");
    }

    #[test]
    fn test_from_counter_error() {
        let err = CounterError::validation("bad");
        assert_eq!(ErrorCode::from(&err), ErrorCode::SettingsInvalid);
        let err = CounterError::database_operation("down");
        assert_eq!(ErrorCode::from(&err), ErrorCode::DatabaseError);
    }
}

use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum CounterError {
    Authentication(String),
    ApiResponse(String),
    Configuration(String),
    Validation(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Serialization(String),
    Network(String),
    NotFound(String),
    Queue(String),
    FileOperation(String),
}

impl CounterError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            CounterError::Authentication(_) => "E001",
            CounterError::ApiResponse(_) => "E002",
            CounterError::Configuration(_) => "E003",
            CounterError::Validation(_) => "E004",
            CounterError::DatabaseConfig(_) => "E005",
            CounterError::DatabaseConnection(_) => "E006",
            CounterError::DatabaseOperation(_) => "E007",
            CounterError::Serialization(_) => "E008",
            CounterError::Network(_) => "E009",
            CounterError::NotFound(_) => "E010",
            CounterError::Queue(_) => "E011",
            CounterError::FileOperation(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            CounterError::Authentication(_) => "Authentication Error",
            CounterError::ApiResponse(_) => "Analytics API Error",
            CounterError::Configuration(_) => "Configuration Error",
            CounterError::Validation(_) => "Validation Error",
            CounterError::DatabaseConfig(_) => "Database Configuration Error",
            CounterError::DatabaseConnection(_) => "Database Connection Error",
            CounterError::DatabaseOperation(_) => "Database Operation Error",
            CounterError::Serialization(_) => "Serialization Error",
            CounterError::Network(_) => "Network Error",
            CounterError::NotFound(_) => "Resource Not Found",
            CounterError::Queue(_) => "Queue Error",
            CounterError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            CounterError::Authentication(msg)
            | CounterError::ApiResponse(msg)
            | CounterError::Configuration(msg)
            | CounterError::Validation(msg)
            | CounterError::DatabaseConfig(msg)
            | CounterError::DatabaseConnection(msg)
            | CounterError::DatabaseOperation(msg)
            | CounterError::Serialization(msg)
            | CounterError::Network(msg)
            | CounterError::NotFound(msg)
            | CounterError::Queue(msg)
            | CounterError::FileOperation(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码（Admin API 使用）
    pub fn http_status(&self) -> StatusCode {
        match self {
            CounterError::Authentication(_) => StatusCode::UNAUTHORIZED,
            CounterError::Configuration(_) | CounterError::Validation(_) => StatusCode::BAD_REQUEST,
            CounterError::NotFound(_) => StatusCode::NOT_FOUND,
            CounterError::ApiResponse(_) | CounterError::Network(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for CounterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CounterError {}

// 便捷的构造函数
impl CounterError {
    pub fn authentication<T: Into<String>>(msg: T) -> Self {
        CounterError::Authentication(msg.into())
    }

    pub fn api_response<T: Into<String>>(msg: T) -> Self {
        CounterError::ApiResponse(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        CounterError::Configuration(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        CounterError::Validation(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        CounterError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        CounterError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        CounterError::DatabaseOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        CounterError::Serialization(msg.into())
    }

    pub fn network<T: Into<String>>(msg: T) -> Self {
        CounterError::Network(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        CounterError::NotFound(msg.into())
    }

    pub fn queue<T: Into<String>>(msg: T) -> Self {
        CounterError::Queue(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        CounterError::FileOperation(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for CounterError {
    fn from(err: sea_orm::DbErr) -> Self {
        CounterError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for CounterError {
    fn from(err: std::io::Error) -> Self {
        CounterError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for CounterError {
    fn from(err: serde_json::Error) -> Self {
        CounterError::Serialization(err.to_string())
    }
}

impl From<ureq::Error> for CounterError {
    fn from(err: ureq::Error) -> Self {
        CounterError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CounterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_unique() {
        let errors = [
            CounterError::authentication(""),
            CounterError::api_response(""),
            CounterError::configuration(""),
            CounterError::validation(""),
            CounterError::database_config(""),
            CounterError::database_connection(""),
            CounterError::database_operation(""),
            CounterError::serialization(""),
            CounterError::network(""),
            CounterError::not_found(""),
            CounterError::queue(""),
            CounterError::file_operation(""),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_uses_simple_format() {
        let err = CounterError::authentication("token expired");
        assert_eq!(err.to_string(), "Authentication Error: token expired");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            CounterError::validation("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CounterError::authentication("x").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            CounterError::api_response("x").http_status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            CounterError::database_operation("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_db_err() {
        let err: CounterError = sea_orm::DbErr::Custom("boom".into()).into();
        assert!(matches!(err, CounterError::DatabaseOperation(_)));
    }
}

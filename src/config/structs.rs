use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含基础设施配置：
/// - server: 服务器地址、端口
/// - database: 数据库连接配置
/// - logging: 日志配置
/// - api: 外部统计接口地址与 Admin Token
/// - site: 站点语言与首页条目
/// - scheduler: 后台 cron 调度
///
/// 运行时配置（OAuth 凭据、抓取参数等）存储在数据库中，
/// 通过 Admin API 管理，使用 `SettingsManager` 读取。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：GAC，分隔符：__
    /// 示例：GAC__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 GAC，分隔符 __
            .add_source(
                Environment::with_prefix("GAC")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 外部统计接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Admin API Bearer Token，留空则禁用 Admin API
    #[serde(default)]
    pub admin_token: String,
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

/// 站点语言
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageConfig {
    pub code: String,
    /// URL 前缀，如 "fr"；默认语言通常为空
    #[serde(default)]
    pub prefix: String,
}

/// 站点配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// 作为首页的内容条目 ID
    #[serde(default)]
    pub front_page_item: Option<i64>,
    #[serde(default = "default_language_code")]
    pub default_language: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<LanguageConfig>,
}

/// 后台调度配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_scheduler_enabled")]
    pub enabled: bool,
    /// 检查 cron 的间隔（秒），是否真正执行由 cron_interval 决定
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite://gacounter.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/analytics/v3".to_string()
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_url() -> String {
    "https://accounts.google.com/o/oauth2/token".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_language_code() -> String {
    "en".to_string()
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![LanguageConfig {
        code: default_language_code(),
        prefix: String::new(),
    }]
}

fn default_scheduler_enabled() -> bool {
    true
}

fn default_tick_secs() -> u64 {
    60
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            admin_token: String::new(),
            base_url: default_api_base_url(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            front_page_item: None,
            default_language: default_language_code(),
            languages: default_languages(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_scheduler_enabled(),
            tick_secs: default_tick_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.site.default_language, "en");
        assert_eq!(config.site.languages.len(), 1);
        assert!(config.site.front_page_item.is_none());
        assert!(config.api.admin_token.is_empty());
    }

    #[test]
    fn test_sample_config_roundtrips_through_toml() {
        let sample = toml::to_string_pretty(&StaticConfig::default()).unwrap();
        assert!(sample.contains("[server]"));
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.api.base_url, default_api_base_url());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [site]
            front_page_item = 1
            languages = [{ code = "en" }, { code = "fr", prefix = "fr" }]
            "#,
        )
        .unwrap();
        assert_eq!(parsed.site.front_page_item, Some(1));
        assert_eq!(parsed.site.languages[1].prefix, "fr");
        assert_eq!(parsed.site.languages[0].prefix, "");
        assert_eq!(parsed.database.retry_count, 3);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[server]\nport = 9999\n").unwrap();
        let config = StaticConfig::load(Some(path.to_str().unwrap()));
        assert_eq!(config.server.port, 9999);
    }
}
